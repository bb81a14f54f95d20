//! HTTP surface of the quote service.
//!
//! - `GET /quotes?symbols=AAPL,MSFT` — JSON array of resolved quotes, in request order.
//! - `GET /health` — number of cached symbols and the age of each entry.
//!
//! The resolver is blocking (it may sleep on the rate limiter), so every batch runs on
//! tokio's blocking pool and never stalls the async workers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use quote_common::health::HealthReport;
use quote_common::symbols::parse_csv;
use quote_common::{QuoteError, QuoteRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::batch::BatchResolver;

/// Errors answered to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Core failure.
    #[error("{0}")]
    Quote(#[from] QuoteError),
    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),
    /// Unexpected server-side failure.
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) | ApiError::Quote(QuoteError::NoSymbolsProvided) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Quote(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Result alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    batch: Arc<BatchResolver>,
}

impl AppState {
    /// State serving `batch`.
    pub fn new(batch: Arc<BatchResolver>) -> Self {
        Self { batch }
    }
}

#[derive(Debug, Deserialize)]
struct QuotesQuery {
    symbols: Option<String>,
}

async fn get_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuotesQuery>,
) -> ApiResult<Json<Vec<QuoteRecord>>> {
    let csv = query
        .symbols
        .ok_or_else(|| ApiError::BadRequest("Missing symbols parameter".to_string()))?;
    let symbols = parse_csv(&csv);
    if symbols.is_empty() {
        return Err(ApiError::BadRequest("No valid symbols provided".to_string()));
    }

    let batch = Arc::clone(&state.batch);
    let records = tokio::task::spawn_blocking(move || batch.resolve_symbols(&symbols))
        .await
        .map_err(|e| {
            error!("Batch worker failed: {}", e);
            ApiError::Internal(e.to_string())
        })??;
    Ok(Json(records))
}

async fn get_health(State(state): State<AppState>) -> Json<HealthReport> {
    let resolver = state.batch.resolver();
    let now = resolver.clock().now();
    Json(HealthReport::ok(resolver.cache().ages(now)))
}

/// Router exposing the quote routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/quotes", get(get_quotes))
        .route("/health", get(get_health))
        .with_state(state)
}

/// Serve `state` on `bind_addr` until Ctrl+C.
pub async fn serve(bind_addr: &str, state: AppState) -> quote_common::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Quote server running on http://{}", listener.local_addr()?);
    info!("Usage: GET /quotes?symbols=AAPL,MSFT,TSLA");

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received. Shutting down server...");
}
