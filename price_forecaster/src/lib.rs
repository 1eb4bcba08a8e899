//! Next-session close forecasting.
//!
//! Daily bars become a typed feature table ([`features`]), which is min-max
//! scaled ([`scaler`]), cut into fixed-length windows ([`windows`]) and fed
//! to a sequence model ([`model`]). [`predictor::PricePredictor`] runs one
//! forecast; [`service::ForecastService`] wires in market data, news and
//! sentiment.

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod scaler;
pub mod service;
pub mod windows;

pub use config::ForecastConfig;
pub use error::ForecastError;
pub use features::{Column, FeatureRow, FeatureSet, FeatureTable, build_features};
pub use predictor::{PredictionResult, PricePredictor, Trend};
pub use service::{ChartData, Forecast, ForecastService};
