//! NewsAPI.org client (`/v2/everything`, `/v2/top-headlines`).

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use shared_utils::env::optional_env_var;
use snafu::{OptionExt, ResultExt};
use tracing::{debug, warn};

use crate::{
    config::NewsConfig,
    error::{ApiSnafu, ClientBuildSnafu, MissingApiKeySnafu, NewsError, RequestSnafu},
    provider::NewsProvider,
};

pub const API_KEY_VAR: &str = "NEWS_API_KEY";

#[derive(Deserialize, Debug)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize, Debug)]
struct Article {
    title: Option<String>,
}

/// Error body NewsAPI returns alongside 4xx/5xx statuses.
#[derive(Deserialize, Debug)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

pub struct NewsApiClient {
    client: Client,
    config: NewsConfig,
    api_key: Option<SecretString>,
    limiter: DefaultDirectRateLimiter,
}

impl NewsApiClient {
    /// Reads the key from `NEWS_API_KEY`. A missing key is not an error here;
    /// requests fail with [`NewsError::MissingApiKey`] instead.
    pub fn new(config: NewsConfig) -> Result<Self, NewsError> {
        let api_key = optional_env_var(API_KEY_VAR).map(|k| SecretString::new(k.into()));
        if api_key.is_none() {
            warn!("{API_KEY_VAR} is not set; news headlines will be empty");
        }
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: NewsConfig, api_key: Option<SecretString>) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context(ClientBuildSnafu)?;
        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(nonzero!(1u32));

        Ok(Self {
            client,
            api_key,
            limiter: RateLimiter::direct(Quota::per_second(rate)),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, NewsError> {
        let key = self.api_key.as_ref().context(MissingApiKeySnafu)?;

        self.limiter.until_ready().await;
        let response = self
            .client
            .get(self.url(path))
            .header("X-Api-Key", key.expose_secret())
            .query(query)
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        ApiSnafu {
            message: describe_error(status, &body),
        }
        .fail()
    }
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{status} {code}: {message}"),
        _ => format!("{status}: {body}"),
    }
}

fn titles(response: EverythingResponse, limit: usize) -> Vec<String> {
    response
        .articles
        .into_iter()
        .filter_map(|a| a.title)
        .take(limit)
        .collect()
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn headlines(&self, query: &str) -> Result<Vec<String>, NewsError> {
        let limit = self.config.headline_limit();
        let params = [
            ("q", query.to_string()),
            ("language", self.config.language.clone()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", limit.to_string()),
        ];
        let body: EverythingResponse = self
            .get("everything", &params)
            .await?
            .json()
            .await
            .context(RequestSnafu)?;

        let out = titles(body, limit);
        debug!(%query, count = out.len(), "fetched headlines");
        Ok(out)
    }

    async fn top_headlines(&self) -> Result<serde_json::Value, NewsError> {
        let params = [("country", self.config.country.clone())];
        self.get("top-headlines", &params)
            .await?
            .json()
            .await
            .context(RequestSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_titles_and_skips_missing() {
        let body = r#"{
          "status": "ok",
          "totalResults": 4,
          "articles": [
            {"source": {"id": null, "name": "Reuters"}, "title": "Apple unveils new chip"},
            {"source": {"id": null, "name": "CNBC"}, "title": null},
            {"source": {"id": null, "name": "Bloomberg"}, "title": "Apple shares climb"},
            {"source": {"id": null, "name": "WSJ"}, "title": "Apple supplier warns"}
          ]
        }"#;
        let parsed: EverythingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            titles(parsed, 2),
            vec!["Apple unveils new chip".to_string(), "Apple shares climb".to_string()]
        );
    }

    #[test]
    fn formats_vendor_errors() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let msg = describe_error(reqwest::StatusCode::UNAUTHORIZED, body);
        assert_eq!(msg, "401 Unauthorized apiKeyInvalid: Your API key is invalid.");

        let msg = describe_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(msg, "502 Bad Gateway: upstream down");
    }

    #[tokio::test]
    async fn requests_without_key_fail_fast() {
        let client = NewsApiClient::with_api_key(NewsConfig::default(), None).unwrap();
        assert!(matches!(
            client.headlines("AAPL").await,
            Err(NewsError::MissingApiKey { .. })
        ));
        assert!(matches!(
            client.top_headlines().await,
            Err(NewsError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn builds_versioned_urls() {
        let config = NewsConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let client = NewsApiClient::with_api_key(config, None).unwrap();
        assert_eq!(client.url("everything"), "http://localhost:9000/v2/everything");
    }
}
