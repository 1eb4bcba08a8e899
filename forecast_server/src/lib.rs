//! HTTP API and static pages for the stock forecaster.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, StartupError};
