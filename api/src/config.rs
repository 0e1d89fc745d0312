//! Client configuration: backend base URL and derived media host.

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Quiet period for the navbar user search.
pub const NAVBAR_SEARCH_DELAY_MS: u64 = 280;
/// Quiet period for the messaging sidebar user search.
pub const MESSAGES_SEARCH_DELAY_MS: u64 = 300;
/// Interval between message refreshes for the active conversation.
pub const MESSAGE_POLL_INTERVAL_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// REST root every endpoint path is appended to, without a trailing slash.
    pub base_url: String,
    /// Host that relative media references (avatars, post images) resolve against.
    pub media_base_url: String,
}

impl ApiConfig {
    /// Build a config from a REST base URL, deriving the media host by
    /// stripping a trailing `/api` segment.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let media_base_url = base_url.strip_suffix("/api").unwrap_or(&base_url).to_owned();
        Self { base_url, media_base_url }
    }

    /// Absolute URL for an endpoint path such as `/posts/feed/`.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Resolve an avatar or image reference. Absolute URLs pass through.
    #[must_use]
    pub fn media_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_owned();
        }
        if reference.starts_with('/') {
            format!("{}{reference}", self.media_base_url)
        } else {
            format!("{}/{reference}", self.media_base_url)
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
