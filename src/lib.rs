//! VK Wall Archiver library.
//!
//! Pages through a public VK wall, filters posts by a content policy, and
//! saves every accepted post (text, raw API item and attachments) into its
//! own directory on local storage.

pub mod archive;
pub mod config;
pub mod constants;
pub mod filter;
pub mod fs_utils;
pub mod pipeline;
pub mod progress;
pub mod wall;

pub use pipeline::{run_archive, RunSummary};
