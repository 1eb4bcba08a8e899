//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching time-series bar data from any market data vendor (e.g., Yahoo, Alpaca).
//!
//! Each concrete provider implementation should implement [`DataProvider`] to handle
//! vendor-specific API logic and validation.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers; see [`build_provider`].
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(
//!         &self,
//!         _params: BarsRequestParams,
//!     ) -> Result<Vec<BarSeries>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod alpaca_rest;
pub mod yahoo_chart;

use std::{num::NonZeroU32, sync::Arc, time::Duration};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching time-series bar data from a market data provider.
///
/// Implement this trait for each concrete data vendor.
#[async_trait]
pub trait DataProvider {
    /// Fetches time-series bar data for the given request parameters.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BarSeries>)` - A vector of bar series, one per symbol. A symbol
    ///   the vendor does not know yields an empty series rather than an error.
    /// * `Err(ProviderError)` - If the request fails.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError>;
}

/// Shared handle used by the rest of the workspace.
pub type SharedProvider = Arc<dyn DataProvider + Send + Sync>;

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid API key).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },
}

/// Which vendor serves bars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Alpaca,
}

/// `[market]` section of the service configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub provider: ProviderKind,
    /// Overrides the vendor's default endpoint (useful for proxies and tests).
    pub base_url: Option<String>,
    /// Calendar days of daily history requested per prediction.
    pub history_days: i64,
    pub requests_per_second: u32,
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            base_url: None,
            history_days: 730,
            requests_per_second: 4,
            timeout_secs: 30,
        }
    }
}

impl MarketConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Direct (unkeyed) limiter shared by every request a provider makes.
pub(crate) fn rate_limiter(per_second: u32) -> DefaultDirectRateLimiter {
    let rate = NonZeroU32::new(per_second).unwrap_or(nonzero!(1u32));
    RateLimiter::direct(Quota::per_second(rate))
}

/// Build and return a shared data provider for the configured vendor.
pub fn build_provider(config: &MarketConfig) -> Result<SharedProvider, ProviderInitError> {
    match config.provider {
        ProviderKind::Yahoo => {
            let p = yahoo_chart::YahooChartProvider::new(config)?;
            Ok(Arc::new(p))
        }
        ProviderKind::Alpaca => {
            let p = alpaca_rest::AlpacaProvider::new(config)?;
            Ok(Arc::new(p))
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;

    use crate::models::asset::AssetClass;

    use super::*;

    struct StaticProvider;

    #[async_trait]
    impl DataProvider for StaticProvider {
        async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
            Ok(params.symbols.iter().map(BarSeries::empty).collect())
        }
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let provider: SharedProvider = Arc::new(StaticProvider);

        let params = BarsRequestParams {
            symbols: vec!["SPY".to_string(), "^GSPC".to_string()],
            start: Utc::now(),
            end: Utc::now(),
            asset_class: AssetClass::UsEquity,
        };

        let result = provider.fetch_bars(params).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].symbol, "^GSPC");
    }

    #[test]
    fn market_config_defaults_fill_missing_keys() {
        let cfg: MarketConfig = toml::from_str("provider = \"alpaca\"").unwrap();
        assert_eq!(cfg.provider, ProviderKind::Alpaca);
        assert_eq!(cfg.history_days, 730);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn yahoo_builds_without_credentials() {
        assert!(build_provider(&MarketConfig::default()).is_ok());
    }
}
