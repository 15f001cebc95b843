//! Writing accepted posts and their attachments to local storage.

pub mod attachments;
pub mod persist;

pub use attachments::{download_to, materialize};
pub use persist::{local_date, PersistedPost, PostPersister};
