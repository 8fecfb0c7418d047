//! HTTP API for the On-Road Engine.
//!
//! This module exposes a minimal REST API around the price engine
//! using the [`axum`](https://crates.io/crates/axum) framework.  The
//! handlers hold no state of their own: every request reads the same
//! immutable [`OnRoadEngine`].

use crate::city::{CityDirectory, CityRecord};
use crate::config::ServerConfig;
use crate::engine::OnRoadEngine;
use crate::error::PriceError;
use crate::models::{BatchQuoteRequest, BatchQuoteResult, PriceBreakdown, QuoteRequest};
use crate::tariff::{load_tariff_file, TariffTable};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state shared across requests.
pub struct AppState {
    pub engine: OnRoadEngine,
}

/// Error body returned for rejected requests.
#[derive(Debug)]
pub struct ApiError(PriceError);

impl From<PriceError> for ApiError {
    fn from(err: PriceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({"error": self.0.to_string()}));
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchQuoteResponse {
    pub results: Vec<BatchQuoteResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CitySearch {
    pub q: Option<String>,
}

/// Build the engine described by `config`: the built-in tariff table,
/// or the JSON file it points at.
pub fn build_engine(config: &ServerConfig) -> Result<OnRoadEngine> {
    let tariffs = match &config.tariff_file {
        Some(path) => Arc::new(
            load_tariff_file(path).with_context(|| format!("loading tariffs from {}", path.display()))?,
        ),
        None => TariffTable::builtin(),
    };
    Ok(engine_for_tariffs(tariffs))
}

/// Engine over `tariffs` whose city fallback matches the table's own
/// default jurisdiction.
pub fn engine_for_tariffs(tariffs: Arc<TariffTable>) -> OnRoadEngine {
    let cities = CityDirectory::builtin_with_default(tariffs.default_jurisdiction());
    OnRoadEngine::new(tariffs, cities, Default::default())
}

/// Build the API router around an engine.
pub fn build_router(engine: OnRoadEngine) -> Router {
    let state = Arc::new(AppState { engine });
    Router::new()
        .route("/api/on-road-price", post(quote_handler))
        .route("/api/on-road-price/batch", post(batch_handler))
        .route("/api/cities", get(cities_handler))
        .route("/api/cities/popular", get(popular_cities_handler))
        .with_state(state)
}

/// Handler for POST /api/on-road-price
async fn quote_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<PriceBreakdown>, ApiError> {
    let breakdown = app_state.engine.quote_request(&request)?;
    Ok(Json(breakdown))
}

/// Handler for POST /api/on-road-price/batch
async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<BatchQuoteRequest>,
) -> Json<BatchQuoteResponse> {
    let results = app_state.engine.quote_batch(&request);
    Json(BatchQuoteResponse { results })
}

/// Handler for GET /api/cities?q=
async fn cities_handler(
    State(app_state): State<Arc<AppState>>,
    Query(search): Query<CitySearch>,
) -> Json<Vec<CityRecord>> {
    let cities = app_state.engine.cities();
    let hits = match search.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => cities.search(q),
        _ => cities.all_sorted(),
    };
    Json(hits.into_iter().copied().collect())
}

/// Handler for GET /api/cities/popular
async fn popular_cities_handler(State(app_state): State<Arc<AppState>>) -> Json<Vec<CityRecord>> {
    Json(app_state.engine.cities().popular().into_iter().copied().collect())
}

/// Launch the API server.  This function builds the engine and router
/// from `config` and binds to the configured address.  It blocks until
/// the server terminates (e.g. when interrupted).
pub async fn serve(config: ServerConfig) -> Result<()> {
    let engine = build_engine(&config)?;
    let router = build_router(engine);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
