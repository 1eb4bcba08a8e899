//! Daily market data for the forecaster.
//!
//! Providers implement [`providers::DataProvider`] and return canonical
//! [`models::bar::BarSeries`] values; [`history`] and [`trends`] build the
//! request shapes the rest of the workspace actually needs on top of that
//! trait.

pub mod history;
pub mod models;
pub mod providers;
pub mod session;
pub mod trends;
