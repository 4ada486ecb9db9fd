//! HTTP surface: routes, extractors and error responses.

mod diets;
mod error;
mod extract;
mod programs;
mod workouts;

pub use error::ErrorBody;
pub use extract::{JsonBody, ValidQuery};

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::db::Collection;
use crate::models::Audit;
use crate::services::{DietService, ProgramService, WorkoutService};

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub diets: DietService,
    pub programs: ProgramService,
    pub workouts: WorkoutService,
}

impl AppState {
    /// Services over one pool. `audit` is stamped onto created diets.
    pub fn new(pool: SqlitePool, audit: Audit) -> Self {
        Self {
            diets: DietService::new(Collection::new(pool.clone()), audit),
            programs: ProgramService::new(Collection::new(pool.clone())),
            workouts: WorkoutService::new(Collection::new(pool)),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/diets", post(diets::create).get(diets::list))
        .route(
            "/organization/{org_id}/diets",
            get(diets::list_for_organization),
        )
        .route(
            "/diets/{id}",
            get(diets::find_one).put(diets::update).patch(diets::update),
        )
        .route("/programs", get(programs::list))
        .route("/programs/{id}", get(programs::find_one))
        .route("/workouts", get(workouts::list))
        .route("/workouts/{id}", get(workouts::find_one))
        .route("/workouts/{id}/stats", patch(workouts::update_stats))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
