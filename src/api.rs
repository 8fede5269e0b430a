// REST API - presentation boundary for prize intervals
//
// GET /api/v1/prizes_interval  → {"min": [...], "max": [...]}
// GET /api/health              → {"status": "OK"}
//
// An empty result is an error at this boundary: the store is empty or no
// producer has won twice, which means the CSV import did not go through.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::intervals::{show_prize_intervals, IntervalPolicy};
use crate::repository::PrizeRepository;

pub const EMPTY_STORE_MESSAGE: &str =
    "Database is empty. Your CSV file must be empty or with some issues, fix it and run the application later.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error ocurred.";

pub type SharedRepository = Arc<Mutex<dyn PrizeRepository + Send>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: SharedRepository,
    pub policy: IntervalPolicy,
}

impl AppState {
    pub fn new<R: PrizeRepository + Send + 'static>(repo: R, policy: IntervalPolicy) -> Self {
        let repo: SharedRepository = Arc::new(Mutex::new(repo));
        AppState { repo, policy }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}

/// GET /api/v1/prizes_interval - Producers with the smallest and largest gap
async fn get_prize_interval_summary(State(state): State<AppState>) -> Response {
    let report = match state.repo.lock() {
        Ok(repo) => show_prize_intervals(&*repo, state.policy),
        Err(_) => {
            error!("Repository lock poisoned");
            return error_response(UNEXPECTED_ERROR_MESSAGE);
        }
    };

    if !report.is_ok() {
        return error_response(UNEXPECTED_ERROR_MESSAGE);
    }

    if report.intervals.is_empty() {
        return error_response(EMPTY_STORE_MESSAGE);
    }

    (StatusCode::OK, Json(report.intervals)).into_response()
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/prizes_interval", get(get_prize_interval_summary))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
