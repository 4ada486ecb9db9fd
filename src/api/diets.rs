use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::extract::{JsonBody, ValidQuery};
use super::AppState;
use crate::error::Result;
use crate::models::Diet;
use crate::services::{CreateDiet, ListDietsQuery, Page, Pagination, UpdateDiet};

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateDiet>,
) -> Result<(StatusCode, Json<Diet>)> {
    let diet = state.diets.create(input).await?;
    Ok((StatusCode::CREATED, Json(diet)))
}

pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ListDietsQuery>,
) -> Result<Json<Page<Diet>>> {
    Ok(Json(state.diets.list(&query).await?))
}

pub async fn list_for_organization(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    ValidQuery(pagination): ValidQuery<Pagination>,
) -> Result<Json<Page<Diet>>> {
    let query = ListDietsQuery::for_organization(org_id, pagination);
    Ok(Json(state.diets.list(&query).await?))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(diet_id): Path<String>,
) -> Result<Json<Diet>> {
    Ok(Json(state.diets.find_one(&diet_id).await?))
}

/// Serves both `PUT` and `PATCH`.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateDiet>,
) -> Result<Json<Diet>> {
    Ok(Json(state.diets.update(&id, input).await?))
}
