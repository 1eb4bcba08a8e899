//! Yahoo Finance chart API (`/v8/finance/chart/{symbol}`).
//!
//! Needs no credentials and serves both equities and indices, which makes it
//! the default provider. One HTTP request is made per symbol.

mod response;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::DefaultDirectRateLimiter;
use reqwest::{Client, StatusCode};
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InternalSnafu, MarketConfig, ProviderError,
        ProviderInitError, ReqwestSnafu, rate_limiter,
    },
    session::{exchange_tz, session_date},
};

use self::response::{ChartEnvelope, ChartResult};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stock-forecaster/1.0";

const DAILY_INTERVAL: &str = "1d";

/// Error code Yahoo uses for unknown or delisted symbols.
const NOT_FOUND: &str = "Not Found";

pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl YahooChartProvider {
    pub fn new(config: &MarketConfig) -> Result<Self, ProviderInitError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone().unwrap_or_else(|| BASE_URL.to_string()),
            limiter: rate_limiter(config.requests_per_second),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            symbol.replace('^', "%5E")
        )
    }

    async fn fetch_symbol(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BarSeries, ProviderError> {
        let query = [
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", DAILY_INTERVAL.to_string()),
            ("includePrePost", "false".to_string()),
        ];

        self.limiter.until_ready().await;
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;
        series_from_body(symbol, status, &body)
    }
}

/// Maps one chart response to a series. Unknown symbols become empty series.
fn series_from_body(symbol: &str, status: StatusCode, body: &str) -> Result<BarSeries, ProviderError> {
    // Yahoo reports failures inside the envelope, usually with a 4xx status.
    let envelope: ChartEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => {
            return InternalSnafu {
                message: format!("malformed chart response for {symbol}: {e}"),
            }
            .fail();
        }
        Err(_) => {
            return ApiSnafu {
                message: format!("{status}: {body}"),
            }
            .fail();
        }
    };

    if let Some(err) = envelope.chart.error {
        if err.code == NOT_FOUND {
            warn!(%symbol, description = %err.description, "yahoo: unknown symbol");
            return Ok(BarSeries::empty(symbol));
        }
        return ApiSnafu {
            message: format!("{}: {}", err.code, err.description),
        }
        .fail();
    }

    match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => into_bar_series(symbol, result),
        None => Ok(BarSeries::empty(symbol)),
    }
}

/// Zips Yahoo's column arrays into bars, skipping rows with any missing field.
fn into_bar_series(symbol: &str, result: ChartResult) -> Result<BarSeries, ProviderError> {
    let tz = exchange_tz(result.meta.exchange_timezone_name.as_deref());
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(BarSeries::empty(symbol));
    };

    let n = result.timestamp.len();
    if [&quote.open, &quote.high, &quote.low, &quote.close, &quote.volume]
        .iter()
        .any(|col| col.len() != n)
    {
        return InternalSnafu {
            message: format!("column lengths disagree with {n} timestamps for {symbol}"),
        }
        .fail();
    }

    let mut bars = Vec::with_capacity(n);
    let mut skipped = 0usize;
    for i in 0..n {
        let row = (
            DateTime::<Utc>::from_timestamp(result.timestamp[i], 0),
            quote.open[i],
            quote.high[i],
            quote.low[i],
            quote.close[i],
            quote.volume[i],
        );
        let (Some(timestamp), Some(open), Some(high), Some(low), Some(close), Some(volume)) = row
        else {
            skipped += 1;
            continue;
        };
        bars.push(Bar {
            timestamp,
            date: session_date(timestamp, tz),
            open,
            high,
            low,
            close,
            volume,
            trade_count: None,
            vwap: None,
        });
    }
    if skipped > 0 {
        debug!(%symbol, skipped, "yahoo: dropped incomplete rows");
    }

    Ok(BarSeries {
        symbol: symbol.to_string(),
        bars,
    })
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        let mut out = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            let series = self.fetch_symbol(symbol, params.start, params.end).await?;
            debug!(%symbol, bars = series.len(), "yahoo: fetched chart");
            out.push(series);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const CHART: &str = r#"{
      "chart": {
        "result": [{
          "meta": {"symbol": "SPY", "exchangeTimezoneName": "America/New_York", "regularMarketPrice": 531.2},
          "timestamp": [1717421400, 1717507800, 1717594200],
          "indicators": {"quote": [{
            "open":   [529.0, 530.1, null],
            "high":   [531.0, 532.5, 534.0],
            "low":    [527.5, 529.0, 531.1],
            "close":  [530.5, 531.9, 533.7],
            "volume": [46835700, 40298900, 51005900]
          }]}
        }],
        "error": null
      }
    }"#;

    #[test]
    fn parses_chart_and_skips_incomplete_rows() {
        let envelope: ChartEnvelope = serde_json::from_str(CHART).unwrap();
        let result = envelope.chart.result.unwrap().into_iter().next().unwrap();
        let series = into_bar_series("SPY", result).unwrap();

        assert_eq!(series.len(), 2);
        let first = &series.bars[0];
        // 1717421400 = 2024-06-03 13:30Z = 09:30 New York
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(first.close, 530.5);
        assert_eq!(first.volume, 46_835_700.0);
        assert!(first.vwap.is_none());
    }

    #[test]
    fn mismatched_columns_are_internal_errors() {
        let body = CHART.replace("[530.5, 531.9, 533.7]", "[530.5, 531.9]");
        let envelope: ChartEnvelope = serde_json::from_str(&body).unwrap();
        let result = envelope.chart.result.unwrap().into_iter().next().unwrap();
        let err = into_bar_series("SPY", result).unwrap_err();
        assert!(matches!(err, ProviderError::Internal { .. }));
    }

    #[test]
    fn unknown_symbol_is_an_empty_series() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let series = series_from_body("NOPE", StatusCode::NOT_FOUND, body).unwrap();
        assert_eq!(series.symbol, "NOPE");
        assert!(series.is_empty());
    }

    #[test]
    fn other_envelope_errors_are_api_errors() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let err = series_from_body("SPY", StatusCode::BAD_REQUEST, body).unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }), "{err}");

        let err = series_from_body("SPY", StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Internal { .. }), "{err}");
        let err = series_from_body("SPY", StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }), "{err}");
    }

    #[test]
    fn successful_body_becomes_bars() {
        let series = series_from_body("SPY", StatusCode::OK, CHART).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn index_symbols_are_escaped() {
        let provider = YahooChartProvider::new(&MarketConfig::default()).unwrap();
        assert_eq!(
            provider.chart_url("^GSPC"),
            "https://query1.finance.yahoo.com/v8/finance/chart/%5EGSPC"
        );
    }
}
