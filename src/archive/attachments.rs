//! Attachment materialization: one file per attachment in a post's
//! `attachments/` directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::fs_utils::write_file;
use crate::wall::{AttachmentRef, Doc, Photo, Video};

/// Persist the best available representation of one attachment.
///
/// Returns the path written, or `None` when there was nothing to write
/// (unsupported type, or the download did not return a success status).
///
/// # Errors
///
/// Returns an error if the download or the file write fails. Callers log
/// it and continue with the next attachment.
pub async fn materialize(
    http: &reqwest::Client,
    attachment: &AttachmentRef,
    dest_dir: &Path,
    post_id: i64,
) -> Result<Option<PathBuf>> {
    match attachment {
        AttachmentRef::Photo { photo } => save_photo(http, photo, dest_dir).await,
        AttachmentRef::Doc { doc } => save_doc(http, doc, dest_dir).await,
        AttachmentRef::Video { video } => save_video_info(video, dest_dir).await.map(Some),
        AttachmentRef::Other => {
            trace!(post_id, "Skipping unsupported attachment type");
            Ok(None)
        }
    }
}

async fn save_photo(http: &reqwest::Client, photo: &Photo, dest_dir: &Path) -> Result<Option<PathBuf>> {
    let size = photo
        .largest_size()
        .with_context(|| format!("Photo {} has no size variants", photo.id))?;

    let path = dest_dir.join(photo_file_name(photo));
    Ok(download_to(http, &size.url, &path).await?.then_some(path))
}

async fn save_doc(http: &reqwest::Client, doc: &Doc, dest_dir: &Path) -> Result<Option<PathBuf>> {
    let url = doc
        .url
        .as_deref()
        .with_context(|| format!("Document {} has no download URL", doc.id))?;

    let path = dest_dir.join(doc_file_name(doc));
    Ok(download_to(http, url, &path).await?.then_some(path))
}

async fn save_video_info(video: &Video, dest_dir: &Path) -> Result<PathBuf> {
    let path = dest_dir.join(video_info_file_name(video));
    write_file(&path, render_video_info(video), "video info").await?;
    Ok(path)
}

/// Download `url` into `path`.
///
/// Returns `false` without touching the filesystem when the server does
/// not answer with a success status.
///
/// # Errors
///
/// Returns an error if the request or the body read fails, or the file
/// cannot be written.
pub async fn download_to(http: &reqwest::Client, url: &str, path: &Path) -> Result<bool> {
    let response = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {url}"))?;

    if !response.status().is_success() {
        debug!(url = %url, status = %response.status(), "Download returned non-success status, skipping");
        return Ok(false);
    }

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body of {url}"))?;
    write_file(path, &bytes, "attachment").await?;
    Ok(true)
}

#[must_use]
pub fn photo_file_name(photo: &Photo) -> String {
    format!("photo_{}.jpg", photo.id)
}

#[must_use]
pub fn doc_file_name(doc: &Doc) -> String {
    match doc.ext.as_deref().filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("doc_{}.{ext}", doc.id),
        None => format!("doc_{}", doc.id),
    }
}

#[must_use]
pub fn video_info_file_name(video: &Video) -> String {
    format!("video_{}_info.txt", video.id)
}

/// Plain-text sidecar describing a video that cannot be downloaded.
#[must_use]
pub fn render_video_info(video: &Video) -> String {
    let unknown = || "Unknown".to_string();

    let mut info = format!(
        "Video ID: {}\nTitle: {}\nDuration: {} seconds\nViews: {}\n",
        video.id,
        video.title.as_deref().unwrap_or("No title"),
        video.duration.map_or_else(unknown, |d| d.to_string()),
        video.views.map_or_else(unknown, |v| v.to_string()),
    );
    if let Some(description) = &video.description {
        info.push_str(&format!("Description: {description}\n"));
    }
    info
}
