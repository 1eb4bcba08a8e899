//! Daily history lookups used by the forecasting pipeline.

use chrono::{Duration, Utc};
use tracing::debug;

use crate::{
    models::{bar::BarSeries, request_params::BarsRequestParams},
    providers::{DataProvider, ProviderError},
};

/// Fetches roughly `days` calendar days of daily bars ending now.
///
/// The returned series is ordered oldest first. An unknown symbol yields an
/// empty series; callers decide whether that is an error.
pub async fn fetch_daily_history(
    provider: &(dyn DataProvider + Send + Sync),
    symbol: &str,
    days: i64,
) -> Result<BarSeries, ProviderError> {
    let end = Utc::now();
    let start = end - Duration::days(days.max(1));
    let params = BarsRequestParams::daily(symbol, start, end);

    let mut series = provider
        .fetch_bars(params)
        .await?
        .into_iter()
        .find(|s| s.symbol == symbol)
        .unwrap_or_else(|| BarSeries::empty(symbol));

    series.bars.sort_by_key(|b| b.timestamp);
    series.bars.dedup_by_key(|b| b.date);
    debug!(%symbol, days, bars = series.len(), "fetched daily history");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};

    use super::*;
    use crate::{
        models::bar::Bar,
        session::{DEFAULT_EXCHANGE_TZ, session_date},
    };

    fn bar(ts: DateTime<Utc>, close: f64) -> Bar {
        Bar {
            timestamp: ts,
            date: session_date(ts, DEFAULT_EXCHANGE_TZ),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
            trade_count: None,
            vwap: None,
        }
    }

    struct Unordered;

    #[async_trait]
    impl DataProvider for Unordered {
        async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
            let d1 = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
            let d2 = Utc.with_ymd_and_hms(2024, 6, 4, 13, 30, 0).unwrap();
            Ok(vec![BarSeries {
                symbol: params.symbols[0].clone(),
                bars: vec![bar(d2, 2.0), bar(d1, 1.0), bar(d2, 2.0)],
            }])
        }
    }

    struct Nothing;

    #[async_trait]
    impl DataProvider for Nothing {
        async fn fetch_bars(&self, _params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn history_is_sorted_and_deduplicated() {
        let series = fetch_daily_history(&Unordered, "SPY", 30).await.unwrap();
        let closes: Vec<f64> = series.bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn missing_series_is_empty() {
        let series = fetch_daily_history(&Nothing, "ZZZZ", 30).await.unwrap();
        assert_eq!(series.symbol, "ZZZZ");
        assert!(series.is_empty());
    }
}
