//! Post persistence and the on-disk layout of an archive run.
//!
//! ```text
//! <domain>_<YYYY-MM-DD>/
//!   post_<id>_<YYYY-MM-DD>/
//!     post_<YYYY-MM-DD>.txt
//!     raw_response_item.json
//!     attachments/
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{debug, warn};

use super::attachments::materialize;
use crate::config::Config;
use crate::constants::{USER_AGENT, WALL_SITE};
use crate::fs_utils::{ensure_dir, write_file};
use crate::wall::{NormalizedPost, RawPost};

/// File name of the verbatim API item inside each post directory.
pub const RAW_JSON_FILE: &str = "raw_response_item.json";

/// Name of the per-post attachment subdirectory.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Separator placed between a post's text and the text it reposts.
pub const REPOST_SEPARATOR: &str = "--- REPOST ---";

/// Calendar date (`YYYY-MM-DD`, local time) of a Unix timestamp.
///
/// # Errors
///
/// Returns an error if the timestamp is out of range.
pub fn local_date(timestamp: i64) -> Result<String> {
    let utc = DateTime::from_timestamp(timestamp, 0)
        .with_context(|| format!("Timestamp {timestamp} is out of range"))?;
    Ok(utc.with_timezone(&Local).format("%Y-%m-%d").to_string())
}

#[must_use]
pub fn post_dir_name(post_id: i64, date: &str) -> String {
    format!("post_{post_id}_{date}")
}

#[must_use]
pub fn post_text_file_name(date: &str) -> String {
    format!("post_{date}.txt")
}

#[must_use]
pub fn permalink(site: &str, owner_id: i64, post_id: i64) -> String {
    format!("https://{site}/wall{owner_id}_{post_id}")
}

/// Permalink, blank line, post text and, when the repost text is not
/// empty, the repost block.
#[must_use]
pub fn render_post_text(site: &str, post: &NormalizedPost) -> String {
    let mut text = format!("{}\n\n{}", permalink(site, post.owner_id, post.id), post.text);
    if let Some(repost) = post.repost_text.as_deref().filter(|t| !t.is_empty()) {
        text.push_str("\n\n");
        text.push_str(REPOST_SEPARATOR);
        text.push('\n');
        text.push_str(repost);
    }
    text
}

/// What was written for one post.
#[derive(Debug, Clone, Default)]
pub struct PersistedPost {
    pub dir: PathBuf,
    pub attachments_written: usize,
    pub attachment_failures: usize,
}

/// Writes accepted posts to disk.
#[derive(Clone)]
pub struct PostPersister {
    http: reqwest::Client,
    site: String,
    download_attachments: bool,
}

impl PostPersister {
    #[must_use]
    pub fn new(http: reqwest::Client, download_attachments: bool) -> Self {
        Self {
            http,
            site: WALL_SITE.to_string(),
            download_attachments,
        }
    }

    /// Build a persister with its own HTTP client for attachment downloads.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(http, config.download_attachments))
    }

    /// Persist one post under `base_dir`.
    ///
    /// Attachment failures are logged and counted; they never fail the post.
    ///
    /// # Errors
    ///
    /// Returns an error if the post directory, text file or JSON file
    /// cannot be written.
    pub async fn persist(
        &self,
        post: &NormalizedPost,
        base_dir: &Path,
        raw: &RawPost,
    ) -> Result<PersistedPost> {
        let date = local_date(post.date)?;
        let dir = base_dir.join(post_dir_name(post.id, &date));
        ensure_dir(&dir, "post").await?;

        let text_path = dir.join(post_text_file_name(&date));
        write_file(&text_path, render_post_text(&self.site, post), "post text").await?;

        let json = serde_json::to_string_pretty(raw).context("Failed to serialize raw post")?;
        write_file(&dir.join(RAW_JSON_FILE), json, "raw post").await?;

        let mut persisted = PersistedPost {
            dir,
            ..PersistedPost::default()
        };
        if self.download_attachments {
            self.save_attachments(post, &mut persisted).await?;
        }

        debug!(
            post_id = post.id,
            dir = %persisted.dir.display(),
            attachments = persisted.attachments_written,
            "Saved post"
        );
        Ok(persisted)
    }

    async fn save_attachments(&self, post: &NormalizedPost, persisted: &mut PersistedPost) -> Result<()> {
        let attachments = post.all_attachments();
        if attachments.is_empty() {
            return Ok(());
        }

        let dir = persisted.dir.join(ATTACHMENTS_DIR);
        ensure_dir(&dir, "attachments").await?;

        for attachment in attachments {
            match materialize(&self.http, attachment, &dir, post.id).await {
                Ok(Some(_)) => persisted.attachments_written += 1,
                Ok(None) => {}
                Err(e) => {
                    warn!(post_id = post.id, kind = attachment.kind(), "Error downloading attachment: {e:#}");
                    persisted.attachment_failures += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, repost_text: Option<&str>) -> NormalizedPost {
        NormalizedPost {
            id: 17,
            owner_id: -29534144,
            date: 1_700_000_000,
            text: text.to_string(),
            is_repost: repost_text.is_some(),
            repost_text: repost_text.map(ToString::to_string),
            ..NormalizedPost::default()
        }
    }

    #[test]
    fn test_permalink() {
        assert_eq!(permalink("vk.com", -1, 2), "https://vk.com/wall-1_2");
        assert_eq!(permalink("vk.com", 10, 20), "https://vk.com/wall10_20");
    }

    #[test]
    fn test_render_plain_post() {
        assert_eq!(
            render_post_text("vk.com", &post("hello", None)),
            "https://vk.com/wall-29534144_17\n\nhello"
        );
    }

    #[test]
    fn test_render_repost_block() {
        assert_eq!(
            render_post_text("vk.com", &post("mine", Some("theirs"))),
            "https://vk.com/wall-29534144_17\n\nmine\n\n--- REPOST ---\ntheirs"
        );
    }

    #[test]
    fn test_empty_repost_text_has_no_block() {
        assert_eq!(
            render_post_text("vk.com", &post("mine", Some(""))),
            "https://vk.com/wall-29534144_17\n\nmine"
        );
    }

    #[test]
    fn test_layout_names() {
        assert_eq!(post_dir_name(5, "2024-01-02"), "post_5_2024-01-02");
        assert_eq!(post_text_file_name("2024-01-02"), "post_2024-01-02.txt");
    }

    #[test]
    fn test_local_date_format() {
        let date = local_date(1_700_000_000).unwrap();
        let expected = DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .with_timezone(&Local)
            .date_naive()
            .to_string();
        assert_eq!(date, expected);
        assert_eq!(date.len(), 10);
        assert!(local_date(i64::MAX).is_err());
    }

    #[tokio::test]
    async fn test_persist_writes_text_and_json() {
        let temp = tempfile::TempDir::new().unwrap();
        let persister = PostPersister::new(reqwest::Client::new(), true);
        let raw = serde_json::json!({"id": 17, "owner_id": -29534144, "date": 1_700_000_000, "text": "привет"});
        let post = NormalizedPost::from_raw(&raw).unwrap();

        let persisted = persister.persist(&post, temp.path(), &raw).await.unwrap();
        let date = local_date(post.date).unwrap();

        assert_eq!(persisted.dir, temp.path().join(format!("post_17_{date}")));
        let text = std::fs::read_to_string(persisted.dir.join(format!("post_{date}.txt"))).unwrap();
        assert_eq!(text, "https://vk.com/wall-29534144_17\n\nпривет");

        let json = std::fs::read_to_string(persisted.dir.join(RAW_JSON_FILE)).unwrap();
        assert!(json.contains("привет"));
        assert!(json.contains("\n  \"id\": 17"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, raw);

        // No attachments, so no attachments directory even when enabled.
        assert!(!persisted.dir.join(ATTACHMENTS_DIR).exists());
    }

    #[tokio::test]
    async fn test_persist_twice_is_idempotent() {
        let temp = tempfile::TempDir::new().unwrap();
        let persister = PostPersister::new(reqwest::Client::new(), false);
        let raw = serde_json::json!({"id": 1, "owner_id": 1, "date": 0, "text": "x"});
        let post = NormalizedPost::from_raw(&raw).unwrap();

        persister.persist(&post, temp.path(), &raw).await.unwrap();
        persister.persist(&post, temp.path(), &raw).await.unwrap();
    }
}
