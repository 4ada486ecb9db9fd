use axum::{
    extract::{Path, State},
    Json,
};

use super::extract::{JsonBody, ValidQuery};
use super::AppState;
use crate::error::Result;
use crate::models::Workout;
use crate::services::{ListWorkoutsQuery, Page, UpdateWorkoutStats};

pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListWorkoutsQuery>,
) -> Result<Json<Page<Workout>>> {
    Ok(Json(state.workouts.list(&query).await?))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Workout>> {
    Ok(Json(state.workouts.find_one(&uid).await?))
}

pub async fn update_stats(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    JsonBody(delta): JsonBody<UpdateWorkoutStats>,
) -> Result<Json<Workout>> {
    Ok(Json(state.workouts.update_stats(&uid, delta).await?))
}
