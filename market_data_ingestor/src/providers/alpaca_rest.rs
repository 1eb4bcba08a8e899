//! Alpaca Market Data v2 (`/v2/stocks/bars`).
//!
//! Credentials come from `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY`. Alpaca only
//! serves equities, so index tickers are rejected during validation.

mod params;
pub mod provider;
mod response;

pub use provider::AlpacaProvider;
