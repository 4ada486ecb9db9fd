use axum::{
    extract::{Path, State},
    Json,
};

use super::extract::ValidQuery;
use super::AppState;
use crate::error::Result;
use crate::models::Program;
use crate::services::{ListProgramsQuery, Page};

pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListProgramsQuery>,
) -> Result<Json<Page<Program>>> {
    Ok(Json(state.programs.list(&query).await?))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Program>> {
    Ok(Json(state.programs.find_one(&id).await?))
}
