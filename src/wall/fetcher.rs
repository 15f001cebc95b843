use tracing::debug;

use super::client::{WallApi, WallError};
use super::models::{NormalizedPost, RawPost};
use crate::constants::POSTS_PER_PAGE;

/// A fetched page: normalized posts index-aligned with their raw items.
#[derive(Debug, Clone, Default)]
pub struct WallPage {
    pub posts: Vec<NormalizedPost>,
    pub raw: Vec<RawPost>,
}

impl WallPage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Pairs of normalized post and raw item, in wall order.
    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedPost, &RawPost)> {
        self.posts.iter().zip(&self.raw)
    }
}

/// Page Fetcher for a single wall.
pub struct PageFetcher<'a> {
    api: &'a dyn WallApi,
    domain: &'a str,
}

impl<'a> PageFetcher<'a> {
    #[must_use]
    pub fn new(api: &'a dyn WallApi, domain: &'a str) -> Self {
        Self { api, domain }
    }

    /// Learn the wall's total post count.
    ///
    /// This is the only call whose authentication failures are translated
    /// into [`WallError::InvalidCredentials`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn probe_total(&self) -> Result<u64, WallError> {
        self.api
            .get_wall(self.domain, 0, POSTS_PER_PAGE)
            .await
            .map(|response| response.count)
            .map_err(WallError::into_credentials_error)
    }

    /// Fetch and normalize `count` posts starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns the API error unchanged, or a decode error if an item lacks
    /// its required fields.
    pub async fn fetch(&self, offset: u64, count: u64) -> Result<WallPage, WallError> {
        let count = count.min(POSTS_PER_PAGE);
        let response = self.api.get_wall(self.domain, offset, count).await?;

        let posts = response
            .items
            .iter()
            .map(NormalizedPost::from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(offset, fetched = posts.len(), "Fetched wall page");
        Ok(WallPage {
            posts,
            raw: response.items,
        })
    }
}
