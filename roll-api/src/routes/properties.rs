//! Property endpoints, keyed by assessment roll number.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};

use roll_core::{Property, PropertyPatch};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /properties - list every property
async fn list_properties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = state
        .repo
        .list_properties()
        .await
        .map_err(ApiError::database)?;
    Ok(Json(properties))
}

/// POST /properties - create a property; all fields required
///
/// `municipal_id` is not checked against the municipalities table; the
/// reference may point at nothing.
async fn create_property(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Property>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let Json(property) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let created = state
        .repo
        .create_property(&property)
        .await
        .map_err(|e| ApiError::from_repository("property", property.assessment_roll_number, e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /properties/{roll} - fetch one property
async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(roll): Path<i64>,
) -> Result<Json<Property>, ApiError> {
    let property = state
        .repo
        .get_property(roll)
        .await
        .map_err(|e| ApiError::from_repository("property", roll, e))?;
    Ok(Json(property))
}

/// PUT /properties/{roll} - partial update; absent fields keep their value
async fn update_property(
    State(state): State<Arc<AppState>>,
    Path(roll): Path<i64>,
    payload: Result<Json<PropertyPatch>, JsonRejection>,
) -> Result<Json<Property>, ApiError> {
    let Json(patch) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let updated = state
        .repo
        .update_property(roll, patch)
        .await
        .map_err(|e| ApiError::from_repository("property", roll, e))?;
    Ok(Json(updated))
}

/// DELETE /properties/{roll} - remove a property
async fn delete_property(
    State(state): State<Arc<AppState>>,
    Path(roll): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .repo
        .delete_property(roll)
        .await
        .map_err(|e| ApiError::from_repository("property", roll, e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Property routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/properties", get(list_properties).post(create_property))
        .route(
            "/properties/{roll}",
            get(get_property).put(update_property).delete(delete_property),
        )
}
