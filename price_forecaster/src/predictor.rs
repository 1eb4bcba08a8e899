//! One next-session forecast from a feature table.

use std::sync::Arc;

use headline_sentiment::SentimentScore;
use ndarray::{Array2, s};
use serde::Serialize;
use snafu::{OptionExt, ResultExt, ensure};
use tracing::{debug, error};

use crate::{
    config::ForecastConfig,
    error::{
        DataQualitySnafu, ForecastError, InsufficientDataSnafu, InvalidConfigSnafu, MissingColumnSnafu,
        ModelSnafu, ScalingSnafu,
    },
    features::{Column, FeatureSet, FeatureTable},
    model::{ModelHandle, SequenceModel},
    scaler::MinMaxScaler,
    windows::{last_window, training_set},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// `Up` only for a strict rise; an unchanged forecast is `Down`.
    pub fn between(current: f64, predicted: f64) -> Self {
        if predicted > current { Trend::Up } else { Trend::Down }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    pub current_price: f64,
    pub predicted_price: f64,
    pub trend: Trend,
    /// Positive-sentiment share × 100. Not a statistical confidence.
    pub confidence: f64,
}

pub struct PricePredictor {
    feature_set: FeatureSet,
    lookback: usize,
    model: Arc<ModelHandle>,
}

impl PricePredictor {
    /// Fails when `lookback` is zero.
    pub fn new(
        feature_set: FeatureSet,
        lookback: usize,
        model: Arc<ModelHandle>,
    ) -> Result<Self, ForecastError> {
        ensure!(
            lookback > 0,
            InvalidConfigSnafu {
                message: "lookback must be at least 1",
            }
        );
        Ok(Self {
            feature_set,
            lookback,
            model,
        })
    }

    pub fn from_config(config: &ForecastConfig) -> Result<Self, ForecastError> {
        Self::new(
            config.feature_set,
            config.lookback,
            Arc::new(ModelHandle::from_config(config)),
        )
    }

    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Forecasts the close after the table's last row.
    ///
    /// Failures are logged with the symbol before being returned.
    pub async fn predict(
        &self,
        table: &FeatureTable,
        sentiment: &SentimentScore,
    ) -> Result<PredictionResult, ForecastError> {
        let result = self.try_predict(table, sentiment).await;
        if let Err(e) = &result {
            error!(symbol = %table.symbol, error = %snafu::Report::from_error(e), "prediction failed");
        }
        result
    }

    async fn try_predict(
        &self,
        table: &FeatureTable,
        sentiment: &SentimentScore,
    ) -> Result<PredictionResult, ForecastError> {
        let columns = self.feature_set.model_columns();
        let matrix = feature_matrix(table, &columns, sentiment.positive)?;

        let rows = matrix.nrows();
        let required = self.feature_set.min_rows(self.lookback);
        ensure!(
            rows >= required,
            InsufficientDataSnafu {
                symbol: table.symbol.clone(),
                rows,
                required,
            }
        );

        // The latest row is held out of the scaler fit and the training windows.
        let train = matrix.slice(s![..rows - 1, ..]);
        let scaler = MinMaxScaler::fit(&columns, train).context(ScalingSnafu)?;
        let scaled_train = scaler.transform(train).context(ScalingSnafu)?;
        let data = training_set(scaled_train.view(), self.lookback, 0);
        ensure!(
            !data.is_empty(),
            InsufficientDataSnafu {
                symbol: table.symbol.clone(),
                rows,
                required: self.lookback + 2,
            }
        );

        let artifact = self
            .model
            .fitted(&columns, self.lookback, data)
            .await
            .context(ModelSnafu)?;

        // Every row already carries the current score, so the tail needs no patching.
        let scaled_all = scaler.transform(matrix.view()).context(ScalingSnafu)?;
        let window = last_window(scaled_all.view(), self.lookback).context(InsufficientDataSnafu {
            symbol: table.symbol.clone(),
            rows,
            required: self.lookback,
        })?;
        let scaled_pred = artifact.model.predict(window).context(ModelSnafu)?;

        let predicted_price = scaler
            .inverse_value(&columns, Column::Close, scaled_pred)
            .context(ScalingSnafu)?;
        let current_price = matrix[[rows - 1, 0]];

        debug!(
            symbol = %table.symbol,
            current_price,
            predicted_price,
            "forecast complete"
        );
        Ok(PredictionResult {
            current_price,
            predicted_price,
            trend: Trend::between(current_price, predicted_price),
            confidence: sentiment.positive * 100.0,
        })
    }
}

/// Rows × `columns`, with `sentiment` broadcast into the Sentiment column.
///
/// Rejects tables missing a column and any non-finite value.
fn feature_matrix(table: &FeatureTable, columns: &[Column], sentiment: f64) -> Result<Array2<f64>, ForecastError> {
    for &column in columns {
        if column != Column::Sentiment && !table.feature_set.contains(column) {
            return MissingColumnSnafu { column }.fail();
        }
    }

    let mut matrix = Array2::zeros((table.len(), columns.len()));
    for (i, row) in table.rows.iter().enumerate() {
        for (j, &column) in columns.iter().enumerate() {
            let value = match column {
                Column::Sentiment => sentiment,
                _ => row.get(column).context(MissingColumnSnafu { column })?,
            };
            ensure!(
                value.is_finite(),
                DataQualitySnafu {
                    message: format!("{column} is {value} on {}", row.date),
                }
            );
            matrix[[i, j]] = value;
        }
    }
    Ok(matrix)
}
