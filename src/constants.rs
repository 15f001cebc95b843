//! Shared constants used across the application.

/// VK API version sent with every `wall.get` request.
pub const API_VERSION: &str = "5.131";

/// Default base URL of the VK method endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.vk.com/method";

/// Maximum number of posts `wall.get` returns per call.
pub const POSTS_PER_PAGE: u64 = 100;

/// Host used when building post permalinks.
pub const WALL_SITE: &str = "vk.com";

/// Where users can learn how to obtain a valid access token.
pub const TOKEN_GUIDANCE_URL: &str = "https://dev.vk.com/api/access-token/getting-started";

/// User agent string for API and attachment requests.
pub const USER_AGENT: &str = concat!("vk-wall-archiver/", env!("CARGO_PKG_VERSION"));
