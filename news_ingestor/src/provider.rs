use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::{config::MAX_HEADLINES, error::NewsError};

#[async_trait]
pub trait NewsProvider {
    /// Titles of the most recent articles matching `query`, newest first.
    async fn headlines(&self, query: &str) -> Result<Vec<String>, NewsError>;

    /// Top headlines, passed through as the vendor returned them.
    async fn top_headlines(&self) -> Result<serde_json::Value, NewsError>;
}

pub type SharedNewsProvider = Arc<dyn NewsProvider + Send + Sync>;

/// At most [`MAX_HEADLINES`] headlines for `query`, or an empty list when
/// anything goes wrong.
///
/// News is decoration for a forecast; a missing key or an upstream outage
/// must not fail the prediction.
pub async fn recent_headlines(provider: &(dyn NewsProvider + Send + Sync), query: &str) -> Vec<String> {
    match provider.headlines(query).await {
        Ok(mut titles) => {
            titles.truncate(MAX_HEADLINES);
            titles
        }
        Err(e) => {
            warn!(%query, error = %e, "news unavailable, continuing without headlines");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::error::{ApiSnafu, MissingApiKeySnafu};

    struct Fixed;

    #[async_trait]
    impl NewsProvider for Fixed {
        async fn headlines(&self, query: &str) -> Result<Vec<String>, NewsError> {
            Ok(vec![format!("{query} beats estimates")])
        }

        async fn top_headlines(&self) -> Result<Value, NewsError> {
            Ok(json!({"status": "ok", "articles": []}))
        }
    }

    struct Flood;

    #[async_trait]
    impl NewsProvider for Flood {
        async fn headlines(&self, query: &str) -> Result<Vec<String>, NewsError> {
            Ok((0..25).map(|i| format!("{query} headline {i}")).collect())
        }

        async fn top_headlines(&self) -> Result<Value, NewsError> {
            Ok(json!({"status": "ok", "articles": []}))
        }
    }

    struct Down;

    #[async_trait]
    impl NewsProvider for Down {
        async fn headlines(&self, _query: &str) -> Result<Vec<String>, NewsError> {
            ApiSnafu { message: "429 Too Many Requests" }.fail()
        }

        async fn top_headlines(&self) -> Result<Value, NewsError> {
            MissingApiKeySnafu.fail()
        }
    }

    #[tokio::test]
    async fn passes_headlines_through() {
        assert_eq!(recent_headlines(&Fixed, "AAPL").await, vec!["AAPL beats estimates"]);
    }

    #[tokio::test]
    async fn long_lists_are_cut_to_the_first_ten() {
        let titles = recent_headlines(&Flood, "MSFT").await;
        assert_eq!(titles.len(), MAX_HEADLINES);
        assert_eq!(titles[0], "MSFT headline 0");
        assert_eq!(titles[9], "MSFT headline 9");
    }

    #[tokio::test]
    async fn errors_become_empty() {
        assert!(recent_headlines(&Down, "AAPL").await.is_empty());
        assert!(matches!(Down.top_headlines().await, Err(NewsError::MissingApiKey { .. })));
    }
}
