use std::path::{Path, PathBuf};

use headline_sentiment::SentimentConfig;
use market_data_ingestor::providers::MarketConfig;
use news_ingestor::NewsConfig;
use price_forecaster::ForecastConfig;
use serde::Deserialize;
use shared_utils::config::{ConfigError, load_toml};

/// `[server]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Directory served for `/` and every non-API path.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            static_dir: PathBuf::from("frontend"),
        }
    }
}

/// Whole service configuration. Every section and key is optional.
///
/// Secrets are read from the environment, never from this file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub market: MarketConfig,
    pub news: NewsConfig,
    pub sentiment: SentimentConfig,
    pub forecast: ForecastConfig,
}

impl AppConfig {
    /// Reads `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => load_toml(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use headline_sentiment::SentimentBackend;
    use market_data_ingestor::providers::ProviderKind;
    use price_forecaster::FeatureSet;

    use super::*;

    #[test]
    fn defaults_without_file() {
        let cfg = AppConfig::load(None).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");
        assert_eq!(cfg.market.provider, ProviderKind::Yahoo);
        assert_eq!(cfg.forecast.lookback, 60);
    }

    #[test]
    fn file_overrides_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [server]
            bind = "0.0.0.0:8080"

            [market]
            history_days = 365

            [sentiment]
            backend = "lexicon"

            [forecast]
            feature_set = "reduced"
            reuse_model = false
            "#
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.server.static_dir, PathBuf::from("frontend"));
        assert_eq!(cfg.market.history_days, 365);
        assert_eq!(cfg.sentiment.backend, SentimentBackend::Lexicon);
        assert_eq!(cfg.forecast.feature_set, FeatureSet::Reduced);
        assert!(!cfg.forecast.reuse_model);
        assert_eq!(cfg.news.page_size, 10);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
