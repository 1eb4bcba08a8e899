//! The forecasting pipeline behind the HTTP routes.

use headline_sentiment::{SentimentScore, SharedAnalyzer};
use market_data_ingestor::{
    history::fetch_daily_history,
    providers::SharedProvider,
    trends::{MarketTrend, market_trends},
};
use news_ingestor::{SharedNewsProvider, recent_headlines};
use serde::Serialize;
use snafu::ResultExt;
use tracing::{info, instrument};

use crate::{
    error::{ForecastError, NewsSnafu, SentimentSnafu, UpstreamProviderSnafu},
    features::{FeatureTable, build_features},
    predictor::{PricePredictor, Trend},
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartData {
    /// `YYYY-MM-DD` session dates.
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Forecast {
    pub symbol: String,
    pub predicted_price: f64,
    pub current_price: f64,
    pub trend: Trend,
    pub confidence: f64,
    pub news: Vec<String>,
    pub sentiment: SentimentScore,
}

pub struct ForecastService {
    market: SharedProvider,
    news: SharedNewsProvider,
    sentiment: SharedAnalyzer,
    predictor: PricePredictor,
    history_days: i64,
}

impl ForecastService {
    pub fn new(
        market: SharedProvider,
        news: SharedNewsProvider,
        sentiment: SharedAnalyzer,
        predictor: PricePredictor,
        history_days: i64,
    ) -> Self {
        Self {
            market,
            news,
            sentiment,
            predictor,
            history_days,
        }
    }

    /// Daily history for `symbol` turned into the predictor's feature table.
    pub async fn history(&self, symbol: &str) -> Result<FeatureTable, ForecastError> {
        let series = fetch_daily_history(self.market.as_ref(), symbol, self.history_days)
            .await
            .context(UpstreamProviderSnafu)?;
        build_features(&series, self.predictor.feature_set(), self.predictor.lookback())
    }

    /// Closing prices of the usable feature rows.
    pub async fn chart(&self, symbol: &str) -> Result<ChartData, ForecastError> {
        let table = self.history(symbol).await?;
        Ok(ChartData {
            dates: table.rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect(),
            prices: table.rows.iter().map(|r| r.close).collect(),
        })
    }

    /// Recent headlines; empty when news is unavailable.
    pub async fn news(&self, symbol: &str) -> Vec<String> {
        recent_headlines(self.news.as_ref(), symbol).await
    }

    pub async fn top_news(&self) -> Result<serde_json::Value, ForecastError> {
        self.news.top_headlines().await.context(NewsSnafu)
    }

    pub async fn trends(&self) -> Vec<MarketTrend> {
        market_trends(self.market.as_ref()).await
    }

    #[instrument(skip(self))]
    pub async fn forecast(&self, symbol: &str) -> Result<Forecast, ForecastError> {
        let (table, news) = tokio::join!(self.history(symbol), self.news(symbol));
        let table = table?;

        let sentiment = self.sentiment.analyze(&news).await.context(SentimentSnafu)?;
        let prediction = self.predictor.predict(&table, &sentiment).await?;
        info!(
            rows = table.len(),
            headlines = news.len(),
            trend = ?prediction.trend,
            "forecast ready"
        );

        Ok(Forecast {
            symbol: symbol.to_string(),
            predicted_price: prediction.predicted_price,
            current_price: prediction.current_price,
            trend: prediction.trend,
            confidence: prediction.confidence,
            news,
            sentiment,
        })
    }
}
