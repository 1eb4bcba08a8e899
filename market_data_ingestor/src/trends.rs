//! Headline index moves for the dashboard.

use chrono::{Duration, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{error, warn};

use crate::{
    models::{
        asset::AssetClass,
        bar::BarSeries,
        request_params::BarsRequestParams,
    },
    providers::{DataProvider, ProviderError},
};

/// Calendar days requested so a long weekend still leaves two sessions.
const LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketTrend {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub change_percent: f64,
}

/// Tracked indices in display order.
pub fn tracked_indices() -> IndexMap<&'static str, &'static str> {
    IndexMap::from([
        ("^DJI", "Dow Jones Industrial Average"),
        ("^IXIC", "NASDAQ Composite"),
        ("^GSPC", "S&P 500"),
    ])
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Latest close and its move against the previous session's close.
///
/// With a single bar the move is measured from that session's open.
pub fn trend_from_series(name: &str, series: &BarSeries) -> Option<MarketTrend> {
    let last = series.last()?;
    let reference = match series.bars.len() {
        1 => last.open,
        n => series.bars[n - 2].close,
    };
    if reference == 0.0 {
        return None;
    }
    Some(MarketTrend {
        symbol: series.symbol.clone(),
        name: name.to_string(),
        current_price: round2(last.close),
        change_percent: round2((last.close - reference) / reference * 100.0),
    })
}

async fn try_market_trends(
    provider: &(dyn DataProvider + Send + Sync),
) -> Result<Vec<MarketTrend>, ProviderError> {
    let indices = tracked_indices();
    let end = Utc::now();
    let params = BarsRequestParams {
        symbols: indices.keys().map(|s| s.to_string()).collect(),
        start: end - Duration::days(LOOKBACK_DAYS),
        end,
        asset_class: AssetClass::Index,
    };

    let mut by_symbol: IndexMap<String, BarSeries> = provider
        .fetch_bars(params)
        .await?
        .into_iter()
        .map(|s| (s.symbol.clone(), s))
        .collect();

    let mut trends = Vec::with_capacity(indices.len());
    for (symbol, name) in &indices {
        let Some(series) = by_symbol.shift_remove(*symbol) else {
            warn!(%symbol, "no bars returned for index");
            continue;
        };
        match trend_from_series(name, &series) {
            Some(t) => trends.push(t),
            None => warn!(%symbol, "not enough bars to compute a trend"),
        }
    }
    Ok(trends)
}

/// Current level and daily move of each tracked index.
///
/// Any provider failure is logged and yields an empty list.
pub async fn market_trends(provider: &(dyn DataProvider + Send + Sync)) -> Vec<MarketTrend> {
    match try_market_trends(provider).await {
        Ok(trends) => trends,
        Err(e) => {
            error!(error = %e, "failed to fetch market trends");
            Vec::new()
        }
    }
}
