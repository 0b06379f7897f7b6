//! Municipality endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};

use roll_core::{Municipality, MunicipalityPatch};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /municipalities - list every municipality
async fn list_municipalities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Municipality>>, ApiError> {
    let municipalities = state
        .repo
        .list_municipalities()
        .await
        .map_err(ApiError::database)?;
    Ok(Json(municipalities))
}

/// POST /municipalities - create a municipality; all fields required
async fn create_municipality(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Municipality>, JsonRejection>,
) -> Result<(StatusCode, Json<Municipality>), ApiError> {
    // Missing or mistyped fields surface as a 400, not axum's default 422.
    let Json(municipality) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let created = state
        .repo
        .create_municipality(&municipality)
        .await
        .map_err(|e| ApiError::from_repository("municipality", municipality.municipal_id, e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /municipalities/{id} - fetch one municipality
async fn get_municipality(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Municipality>, ApiError> {
    let municipality = state
        .repo
        .get_municipality(id)
        .await
        .map_err(|e| ApiError::from_repository("municipality", id, e))?;
    Ok(Json(municipality))
}

/// PUT /municipalities/{id} - partial update; absent fields keep their value
async fn update_municipality(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<MunicipalityPatch>, JsonRejection>,
) -> Result<Json<Municipality>, ApiError> {
    let Json(patch) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let updated = state
        .repo
        .update_municipality(id, patch)
        .await
        .map_err(|e| ApiError::from_repository("municipality", id, e))?;
    Ok(Json(updated))
}

/// DELETE /municipalities/{id} - remove a municipality
///
/// Properties referencing the municipality are left in place; their
/// references dangle.
async fn delete_municipality(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .repo
        .delete_municipality(id)
        .await
        .map_err(|e| ApiError::from_repository("municipality", id, e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Municipality routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/municipalities",
            get(list_municipalities).post(create_municipality),
        )
        .route(
            "/municipalities/{id}",
            get(get_municipality)
                .put(update_municipality)
                .delete(delete_municipality),
        )
}
