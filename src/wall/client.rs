//! HTTP client for the VK `wall.get` method.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::models::RawPost;
use crate::config::Config;
use crate::constants::{TOKEN_GUIDANCE_URL, USER_AGENT};

/// API error codes that mean the access token was not accepted.
const AUTH_ERROR_CODES: &[i64] = &[5, 28];

#[derive(Debug, Error)]
pub enum WallError {
    #[error("Invalid access token ({message}). How to get your own token: {guidance}")]
    InvalidCredentials { message: String, guidance: String },
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("wall request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode wall response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl WallError {
    /// Whether this error means the credentials were rejected.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::InvalidCredentials { .. } => true,
            Self::Api { code, .. } => AUTH_ERROR_CODES.contains(code),
            Self::Http(e) => e.status() == Some(reqwest::StatusCode::UNAUTHORIZED),
            Self::Decode(_) => false,
        }
    }

    /// Re-signal an authentication failure as [`WallError::InvalidCredentials`].
    /// Other errors are returned unchanged.
    #[must_use]
    pub fn into_credentials_error(self) -> Self {
        if !self.is_auth_failure() || matches!(self, Self::InvalidCredentials { .. }) {
            return self;
        }
        Self::InvalidCredentials {
            message: self.to_string(),
            guidance: TOKEN_GUIDANCE_URL.to_string(),
        }
    }
}

/// One page of a wall: the wall's total post count plus the raw items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WallResponse {
    pub count: u64,
    #[serde(default)]
    pub items: Vec<RawPost>,
}

/// The remote wall API.
#[async_trait]
pub trait WallApi: Send + Sync {
    /// Fetch `count` posts of the wall belonging to `domain`, starting at
    /// `offset` (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API reports an error.
    async fn get_wall(&self, domain: &str, offset: u64, count: u64)
        -> Result<WallResponse, WallError>;
}

/// `wall.get` envelope: exactly one of `response` or `error` is present.
#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<WallResponse>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

/// [`WallApi`] implementation talking to the VK method endpoint.
#[derive(Clone)]
pub struct VkClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    api_version: String,
}

impl VkClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            api_version: config.api_version.clone(),
        })
    }
}

#[async_trait]
impl WallApi for VkClient {
    async fn get_wall(
        &self,
        domain: &str,
        offset: u64,
        count: u64,
    ) -> Result<WallResponse, WallError> {
        let url = format!("{}/wall.get", self.base_url);
        debug!(domain = %domain, offset, count, "Requesting wall page");

        let body = self
            .http
            .get(&url)
            .query(&[
                ("domain", domain.to_string()),
                ("offset", offset.to_string()),
                ("count", count.to_string()),
                ("access_token", self.access_token.clone()),
                ("v", self.api_version.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let envelope: Envelope = serde_json::from_slice(&body)?;
        match envelope {
            Envelope {
                error: Some(error), ..
            } => Err(WallError::Api {
                code: error.error_code,
                message: error.error_msg,
            }),
            Envelope {
                response: Some(response),
                ..
            } => Ok(response),
            Envelope { .. } => Err(WallError::Api {
                code: 0,
                message: "response contained neither `response` nor `error`".to_string(),
            }),
        }
    }
}
