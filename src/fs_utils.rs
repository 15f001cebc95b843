use std::path::Path;

use anyhow::{Context, Result};
use tracing::trace;

/// Create a directory and its parents. Succeeds if it already exists.
pub async fn ensure_dir(dir: &Path, purpose: &str) -> Result<()> {
    tokio::fs::create_dir_all(dir).await.with_context(|| {
        format!(
            "Failed to create directory ({purpose}): {}",
            dir.display()
        )
    })
}

/// Write a whole file, replacing any previous contents.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>, purpose: &str) -> Result<()> {
    let contents = contents.as_ref();
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write file ({purpose}): {}", path.display()))?;
    trace!(path = %path.display(), bytes = contents.len(), purpose = %purpose, "Wrote file");
    Ok(())
}
