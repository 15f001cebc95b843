//! Wall retrieval: API transport, normalization and paging.

pub mod client;
pub mod fetcher;
pub mod models;

pub use client::{VkClient, WallApi, WallError, WallResponse};
pub use fetcher::{PageFetcher, WallPage};
pub use models::{AttachmentRef, Doc, NormalizedPost, Photo, PhotoSize, RawPost, Video};
