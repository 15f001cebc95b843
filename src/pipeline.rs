//! Pagination Driver: walks the wall page by page, filtering and saving
//! posts until the post budget or the wall itself is exhausted.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use tracing::{debug, info};

use crate::archive::{local_date, PostPersister};
use crate::config::Config;
use crate::constants::POSTS_PER_PAGE;
use crate::filter::PostFilter;
use crate::fs_utils::ensure_dir;
use crate::progress::ProgressReporter;
use crate::wall::{PageFetcher, WallApi};

/// Outcome of one archive run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub base_dir: PathBuf,
    pub wall_total: u64,
    /// `min(post budget, wall total)`: the number of posts the run examines at most.
    pub target: u64,
    pub pages_fetched: u64,
    pub examined: u64,
    pub saved: u64,
    pub rejected: u64,
    pub attachment_failures: u64,
}

/// Archive the configured wall.
///
/// # Errors
///
/// Returns [`crate::wall::WallError::InvalidCredentials`] if the token is
/// rejected by the initial probe. Any later fetch error, or a failure to
/// write a post, ends the run; output already written stays in place.
pub async fn run_archive(
    config: &Config,
    api: &dyn WallApi,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let persister = PostPersister::from_config(config)?;
    run_with_persister(config, api, &persister, progress).await
}

/// [`run_archive`] with a caller-provided persister.
///
/// # Errors
///
/// See [`run_archive`].
pub async fn run_with_persister(
    config: &Config,
    api: &dyn WallApi,
    persister: &PostPersister,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let fetcher = PageFetcher::new(api, &config.domain);

    let wall_total = fetcher.probe_total().await?;
    info!(domain = %config.domain, wall_total, "Wall total post count");

    let budget = resolve_budget(config.post_number, wall_total);

    // The newest post names the run directory.
    let first_page = fetcher.fetch(0, POSTS_PER_PAGE).await?;
    let latest = first_page
        .posts
        .first()
        .map_or_else(|| Local::now().timestamp(), |post| post.date);
    let base_dir = config
        .output_dir
        .join(format!("{}_{}", config.domain, local_date(latest)?));
    ensure_dir(&base_dir, "run").await?;
    info!(base_dir = %base_dir.display(), "Archiving into");

    let mut summary = RunSummary {
        base_dir,
        wall_total,
        target: budget.min(wall_total),
        ..RunSummary::default()
    };

    progress.start(summary.target);
    let result = drive(
        &fetcher,
        &config.post_filter,
        persister,
        progress,
        budget,
        &mut summary,
    )
    .await;
    progress.finish();
    result?;

    info!(
        examined = summary.examined,
        saved = summary.saved,
        rejected = summary.rejected,
        attachment_failures = summary.attachment_failures,
        "Archive run complete"
    );
    Ok(summary)
}

/// Posts to consider: the configured number, or the whole wall when 0.
#[must_use]
pub const fn resolve_budget(post_number: u64, wall_total: u64) -> u64 {
    if post_number == 0 {
        wall_total
    } else {
        post_number
    }
}

async fn drive(
    fetcher: &PageFetcher<'_>,
    filter: &PostFilter,
    persister: &PostPersister,
    progress: &dyn ProgressReporter,
    budget: u64,
    summary: &mut RunSummary,
) -> Result<()> {
    let base_dir = summary.base_dir.clone();
    let mut offset = 0;

    while offset < budget && offset < summary.wall_total {
        let page = fetcher.fetch(offset, POSTS_PER_PAGE).await?;
        summary.pages_fetched += 1;
        offset += POSTS_PER_PAGE;

        for (post, raw) in page.iter() {
            if filter.is_eligible(post) {
                let persisted = persister.persist(post, &base_dir, raw).await?;
                summary.saved += 1;
                summary.attachment_failures += persisted.attachment_failures as u64;
            } else {
                debug!(post_id = post.id, "Post rejected by content policy");
                summary.rejected += 1;
            }

            summary.examined += 1;
            progress.advance();

            if summary.examined >= summary.target {
                return Ok(());
            }
        }
    }

    Ok(())
}
