use headline_sentiment::SentimentError;
use market_data_ingestor::providers::ProviderError;
use news_ingestor::NewsError;
use snafu::{Backtrace, Snafu};

use crate::{features::Column, model::ModelError, scaler::ScalingError};

/// Errors that can fail a forecast or one of its lookups.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ForecastError {
    /// Too little history after feature warm-up; never truncated silently.
    #[snafu(display(
        "Not enough historical data for {symbol}: {rows} usable rows, need at least {required}"
    ))]
    InsufficientData {
        symbol: String,
        rows: usize,
        required: usize,
        backtrace: Backtrace,
    },

    /// A missing or non-finite value reached the model input.
    #[snafu(display("Data quality check failed: {message}"))]
    DataQuality {
        message: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Feature table has no {column} column"))]
    MissingColumn {
        column: Column,
        backtrace: Backtrace,
    },

    #[snafu(display("Market data request failed: {source}"))]
    UpstreamProvider {
        #[snafu(backtrace)]
        source: ProviderError,
    },

    #[snafu(display("News request failed: {source}"))]
    News {
        #[snafu(backtrace)]
        source: NewsError,
    },

    #[snafu(display("Sentiment analysis failed: {source}"))]
    Sentiment {
        #[snafu(backtrace)]
        source: SentimentError,
    },

    #[snafu(display("Invalid forecast configuration: {message}"))]
    InvalidConfig {
        message: String,
        backtrace: Backtrace,
    },

    #[snafu(display("Model error: {source}"))]
    Model { source: ModelError },

    #[snafu(display("Scaling error: {source}"))]
    Scaling { source: ScalingError },
}
