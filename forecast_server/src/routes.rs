use std::path::Path;

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    routing::get,
};
use price_forecaster::{ChartData, Forecast};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct SymbolNews {
    pub symbol: String,
    pub news: Vec<String>,
}

/// API routes plus static files from `static_dir` for everything else
/// (`/` serves `index.html`).
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/api/market-trends", get(market_trends))
        .route("/api/news/top-news", get(top_news))
        .route("/api/news/{symbol}", get(symbol_news))
        .route("/api/stock-chart/{symbol}", get(stock_chart))
        .route("/api/predict/{symbol}", get(predict))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn market_trends(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "trends": state.service.trends().await }))
}

async fn top_news(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.service.top_news().await?))
}

async fn symbol_news(State(state): State<AppState>, UrlPath(symbol): UrlPath<String>) -> Json<SymbolNews> {
    let news = state.service.news(&symbol).await;
    Json(SymbolNews {
        symbol: symbol.to_uppercase(),
        news,
    })
}

async fn stock_chart(
    State(state): State<AppState>,
    UrlPath(symbol): UrlPath<String>,
) -> Result<Json<ChartData>, ApiError> {
    Ok(Json(state.service.chart(&symbol).await?))
}

async fn predict(
    State(state): State<AppState>,
    UrlPath(symbol): UrlPath<String>,
) -> Result<Json<Forecast>, ApiError> {
    Ok(Json(state.service.forecast(&symbol).await?))
}
