use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use price_forecaster::ForecastError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Any pipeline failure, reported as `500 {"error": "..."}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] ForecastError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
