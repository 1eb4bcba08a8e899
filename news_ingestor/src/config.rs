use std::time::Duration;

use serde::Deserialize;

/// Upper bound on titles returned for one query, whatever `page_size` says.
pub const MAX_HEADLINES: usize = 10;

/// `[news]` section of the service configuration.
///
/// The API key is never read from the file; see `NEWS_API_KEY`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    /// Articles requested per query, capped at [`MAX_HEADLINES`].
    pub page_size: u32,
    pub language: String,
    /// Country filter for top headlines.
    pub country: String,
    pub requests_per_second: u32,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            page_size: 10,
            language: "en".to_string(),
            country: "us".to_string(),
            requests_per_second: 2,
            timeout_secs: 30,
        }
    }
}

impl NewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn headline_limit(&self) -> usize {
        (self.page_size as usize).min(MAX_HEADLINES)
    }
}
