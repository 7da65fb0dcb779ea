use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
};
use serde_json::Value;

use super::collection::scalar_attributes;
use super::resolve_entity;
use crate::auth::SessionContext;
use crate::error::ApiError;
use crate::policy::Operation;
use crate::query::translate::parse_string_array;
use crate::validation::validate_attributes;
use crate::AppState;

/// GET /api/:entity/:id - fetch one record, optionally with `relations`.
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path((slug, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let entity = resolve_entity(&slug)?;
    if !state.policy.check_access(entity, Operation::Read, &session) {
        return Err(ApiError::forbidden());
    }

    let relations = params.get("relations").map(|raw| parse_string_array(raw)).unwrap_or_default();
    let record = state
        .engine
        .find_by_id(entity, &id, &relations)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Record {} not found in {}", id, entity.table())))?;
    Ok(Json(record))
}

/// PUT /api/:entity/:id - validate and replace the provided fields.
pub async fn put(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path((slug, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let entity = resolve_entity(&slug)?;
    if !state.policy.check_access(entity, Operation::Update, &session) {
        return Err(ApiError::forbidden());
    }

    validate_attributes(entity, &payload)?;
    let attributes = scalar_attributes(payload);

    let record = state.engine.update(entity, &id, attributes).await?;
    state.notifier.notify(entity, Operation::Update, &id);
    Ok(Json(record))
}

/// DELETE /api/:entity/:id - delete and return the removed record.
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let entity = resolve_entity(&slug)?;
    if !state.policy.check_access(entity, Operation::Delete, &session) {
        return Err(ApiError::forbidden());
    }

    let record = state.engine.delete(entity, &id).await?;
    state.notifier.notify(entity, Operation::Delete, &id);
    Ok(Json(record))
}
