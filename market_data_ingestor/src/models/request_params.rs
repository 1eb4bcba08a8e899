use chrono::{DateTime, Utc};

use crate::models::asset::AssetClass;

/// Vendor-agnostic request for daily bars.
///
/// This is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations. Every
/// provider answers with one bar per trading session.
#[derive(Clone, Debug, PartialEq)]
pub struct BarsRequestParams {
    /// List of symbols to request (e.g., `["AAPL"]`, `["^GSPC"]`).
    pub symbols: Vec<String>,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (exclusive, UTC).
    pub end: DateTime<Utc>,

    /// The asset class for the requested symbols.
    ///
    /// This helps providers route the request to the correct API or endpoint.
    pub asset_class: AssetClass,
}

impl BarsRequestParams {
    /// Daily bars for one symbol over `[start, end)`.
    pub fn daily(symbol: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let symbol = symbol.into();
        Self {
            asset_class: AssetClass::from_symbol(&symbol),
            symbols: vec![symbol],
            start,
            end,
        }
    }
}
