//! Engineered daily features.
//!
//! The column schema is closed: [`Column`] names every value the model can
//! see and [`FeatureSet`] fixes their order. `Close` is always column 0, which
//! the inverse scaling of a prediction relies on.

use std::fmt;

use chrono::NaiveDate;
use market_data_ingestor::models::bar::{Bar, BarSeries};
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::error::{ForecastError, InsufficientDataSnafu};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Close,
    Change,
    Volatility,
    Volume,
    Ma7,
    Ma14,
    Ma30,
    Sentiment,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Close => "Close",
            Column::Change => "Change",
            Column::Volatility => "Volatility",
            Column::Volume => "Volume",
            Column::Ma7 => "MA7",
            Column::Ma14 => "MA14",
            Column::Ma30 => "MA30",
            Column::Sentiment => "Sentiment",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const FULL: [Column; 7] = [
    Column::Close,
    Column::Change,
    Column::Volatility,
    Column::Volume,
    Column::Ma7,
    Column::Ma14,
    Column::Ma30,
];

const REDUCED: [Column; 3] = [Column::Close, Column::Change, Column::Volatility];

/// Longest moving-average window.
const MA_WINDOW: usize = 30;

/// Minimum usable rows for the full set, independent of the lookback.
const FULL_MIN_ROWS: usize = 120;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    #[default]
    Full,
    Reduced,
}

impl FeatureSet {
    /// Market columns in model order, without `Sentiment`.
    pub fn columns(self) -> &'static [Column] {
        match self {
            FeatureSet::Full => &FULL,
            FeatureSet::Reduced => &REDUCED,
        }
    }

    /// Model input ordering: the market columns followed by `Sentiment`.
    pub fn model_columns(self) -> Vec<Column> {
        let mut cols = self.columns().to_vec();
        cols.push(Column::Sentiment);
        cols
    }

    pub fn contains(self, column: Column) -> bool {
        self.columns().contains(&column)
    }

    /// Rows needed after warm-up: one full window plus the held-out latest row.
    pub fn min_rows(self, lookback: usize) -> usize {
        match self {
            FeatureSet::Full => FULL_MIN_ROWS.max(lookback + 1),
            FeatureSet::Reduced => lookback + 1,
        }
    }

    /// Leading bars whose derived values are undefined.
    fn warmup(self) -> usize {
        match self {
            FeatureSet::Full => MA_WINDOW - 1,
            FeatureSet::Reduced => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingAverages {
    pub ma7: f64,
    pub ma14: f64,
    pub ma30: f64,
}

/// One trading day of features.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    /// Close-to-close percent change, as a fraction.
    pub change: f64,
    /// Intraday range, high minus low.
    pub volatility: f64,
    /// Day-over-day percent change of volume, as a fraction.
    pub volume: f64,
    /// Present once 30 sessions of history exist; always present in a
    /// [`FeatureSet::Full`] table.
    pub moving_averages: Option<MovingAverages>,
}

impl FeatureRow {
    /// Value of a market column. `Sentiment` is not stored per row.
    pub fn get(&self, column: Column) -> Option<f64> {
        let ma = self.moving_averages;
        match column {
            Column::Close => Some(self.close),
            Column::Change => Some(self.change),
            Column::Volatility => Some(self.volatility),
            Column::Volume => Some(self.volume),
            Column::Ma7 => ma.map(|m| m.ma7),
            Column::Ma14 => ma.map(|m| m.ma14),
            Column::Ma30 => ma.map(|m| m.ma30),
            Column::Sentiment => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTable {
    pub symbol: String,
    pub feature_set: FeatureSet,
    /// Oldest first.
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }
}

fn pct_change(prev: f64, curr: f64) -> f64 {
    (curr - prev) / prev
}

fn trailing_mean(bars: &[Bar], end: usize, window: usize) -> f64 {
    let slice = &bars[end + 1 - window..=end];
    slice.iter().map(|b| b.close).sum::<f64>() / window as f64
}

/// Derives the feature table for `series`.
///
/// Leading rows without a defined value are dropped: the first bar (no
/// previous close) and, for the full set, the bars before the first 30-day
/// average. A zero previous close or volume yields a non-finite change that
/// is kept for the predictor to reject.
pub fn build_features(
    series: &BarSeries,
    feature_set: FeatureSet,
    lookback: usize,
) -> Result<FeatureTable, ForecastError> {
    let bars = &series.bars;
    let first = feature_set.warmup();

    let rows: Vec<FeatureRow> = (first.max(1)..bars.len())
        .map(|i| {
            let (prev, bar) = (&bars[i - 1], &bars[i]);
            let moving_averages = (i + 1 >= MA_WINDOW).then(|| MovingAverages {
                ma7: trailing_mean(bars, i, 7),
                ma14: trailing_mean(bars, i, 14),
                ma30: trailing_mean(bars, i, MA_WINDOW),
            });
            FeatureRow {
                date: bar.date,
                close: bar.close,
                change: pct_change(prev.close, bar.close),
                volatility: bar.high - bar.low,
                volume: pct_change(prev.volume, bar.volume),
                moving_averages,
            }
        })
        .collect();

    let required = feature_set.min_rows(lookback);
    ensure!(
        rows.len() >= required,
        InsufficientDataSnafu {
            symbol: series.symbol.clone(),
            rows: rows.len(),
            required,
        }
    );

    Ok(FeatureTable {
        symbol: series.symbol.clone(),
        feature_set,
        rows,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;
    use chrono::{Days, TimeZone, Utc};

    use super::*;

    /// Deterministic daily series with a gentle trend and a cycle.
    pub(crate) fn synthetic_series(symbol: &str, n: usize) -> BarSeries {
        let start = Utc.with_ymd_and_hms(2023, 1, 3, 14, 30, 0).unwrap();
        let bars = (0..n)
            .map(|i| {
                let x = i as f64;
                let close = 100.0 + 0.15 * x + 6.0 * (x / 9.0).sin();
                let timestamp = start + Days::new(i as u64);
                Bar {
                    timestamp,
                    date: timestamp.date_naive(),
                    open: close - 0.4,
                    high: close + 1.0 + 0.3 * (x / 4.0).cos().abs(),
                    low: close - 1.2,
                    close,
                    volume: 1_000_000.0 + 25_000.0 * ((i % 11) as f64),
                    trade_count: None,
                    vwap: None,
                }
            })
            .collect();
        BarSeries {
            symbol: symbol.to_string(),
            bars,
        }
    }

    #[test]
    fn full_set_drops_moving_average_warmup() {
        let series = synthetic_series("SPY", 160);
        let table = build_features(&series, FeatureSet::Full, 60).unwrap();

        assert_eq!(table.len(), 160 - 29);
        assert_eq!(table.rows[0].date, series.bars[29].date);
        assert!(table.rows.iter().all(|r| r.moving_averages.is_some()));

        let row = &table.rows[0];
        let expected_ma30 = series.bars[..30].iter().map(|b| b.close).sum::<f64>() / 30.0;
        assert_relative_eq!(row.get(Column::Ma30).unwrap(), expected_ma30, epsilon = 1e-9);
        let expected_ma7 = series.bars[23..30].iter().map(|b| b.close).sum::<f64>() / 7.0;
        assert_relative_eq!(row.get(Column::Ma7).unwrap(), expected_ma7, epsilon = 1e-9);
    }

    #[test]
    fn derived_columns_match_bars() {
        let series = synthetic_series("SPY", 80);
        let table = build_features(&series, FeatureSet::Reduced, 60).unwrap();

        assert_eq!(table.len(), 79);
        let (prev, bar) = (&series.bars[0], &series.bars[1]);
        let row = &table.rows[0];
        assert_relative_eq!(row.change, bar.close / prev.close - 1.0, epsilon = 1e-12);
        assert_relative_eq!(row.volatility, bar.high - bar.low);
        assert_relative_eq!(row.volume, bar.volume / prev.volume - 1.0, epsilon = 1e-12);
        assert!(row.moving_averages.is_none());
        assert!(table.rows[28].moving_averages.is_some());
    }

    #[test]
    fn short_history_is_rejected_not_truncated() {
        let series = synthetic_series("TINY", 100);
        let err = build_features(&series, FeatureSet::Full, 60).unwrap_err();
        match err {
            ForecastError::InsufficientData {
                symbol,
                rows,
                required,
                ..
            } => {
                assert_eq!(symbol, "TINY");
                assert_eq!(rows, 71);
                assert_eq!(required, 120);
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = build_features(&synthetic_series("TINY", 61), FeatureSet::Reduced, 60).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { rows: 60, required: 61, .. }));
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = build_features(&BarSeries::empty("NOPE"), FeatureSet::Reduced, 60).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { rows: 0, .. }));
    }

    #[test]
    fn zero_volume_keeps_non_finite_row() {
        let mut series = synthetic_series("ZV", 140);
        series.bars[70].volume = 0.0;
        let table = build_features(&series, FeatureSet::Full, 60).unwrap();
        assert_eq!(table.len(), 140 - 29);
        assert!(table.rows.iter().any(|r| !r.volume.is_finite()));
    }

    #[test]
    fn model_columns_end_with_sentiment() {
        assert_eq!(
            FeatureSet::Reduced.model_columns(),
            vec![Column::Close, Column::Change, Column::Volatility, Column::Sentiment]
        );
        assert_eq!(FeatureSet::Full.model_columns()[0], Column::Close);
        assert_eq!(FeatureSet::Full.min_rows(60), 120);
        assert_eq!(FeatureSet::Full.min_rows(200), 201);
        assert!(!FeatureSet::Reduced.contains(Column::Ma7));
    }
}
