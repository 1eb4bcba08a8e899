use std::sync::Arc;

use headline_sentiment::{SentimentError, build_analyzer};
use market_data_ingestor::providers::{ProviderInitError, build_provider};
use news_ingestor::{NewsError, newsapi::NewsApiClient};
use price_forecaster::{ForecastError, ForecastService, PricePredictor};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("market data provider: {0}")]
    Market(#[from] ProviderInitError),
    #[error("news client: {0}")]
    News(#[from] NewsError),
    #[error("sentiment backend: {0}")]
    Sentiment(#[from] SentimentError),
    #[error("forecaster: {0}")]
    Forecast(#[from] ForecastError),
}

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}

impl AppState {
    pub fn new(service: ForecastService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Builds the production clients. Missing news or sentiment credentials
    /// degrade those features instead of failing here.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let market = build_provider(&config.market)?;
        let news = Arc::new(NewsApiClient::new(config.news.clone())?);
        let sentiment = build_analyzer(&config.sentiment)?;
        let predictor = PricePredictor::from_config(&config.forecast)?;

        Ok(Self::new(ForecastService::new(
            market,
            news,
            sentiment,
            predictor,
            config.market.history_days,
        )))
    }
}
