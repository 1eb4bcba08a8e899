//! Financial news headlines.
//!
//! [`NewsProvider`] is the seam the forecasting pipeline depends on;
//! [`newsapi::NewsApiClient`] implements it against NewsAPI.org.

pub mod config;
pub mod error;
pub mod newsapi;
pub mod provider;

pub use config::{MAX_HEADLINES, NewsConfig};
pub use error::NewsError;
pub use provider::{NewsProvider, SharedNewsProvider, recent_headlines};
