use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
};
use serde_json::Value;

use super::resolve_entity;
use crate::auth::SessionContext;
use crate::error::ApiError;
use crate::policy::Operation;
use crate::query::{translate, Page};
use crate::validation::validate_attributes;
use crate::AppState;

/// GET /api/:entity - translated list query with the `{data, totalCount}`
/// envelope.
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Page<Value>>, ApiError> {
    let entity = resolve_entity(&slug)?;
    if !state.policy.check_access(entity, Operation::Read, &session) {
        return Err(ApiError::forbidden());
    }

    let query = translate(params)?;
    let page = state.engine.find_many_paginated(entity, &query).await?;
    Ok(Json(page))
}

/// POST /api/:entity - validate and create one record.
pub async fn post(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(slug): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let entity = resolve_entity(&slug)?;
    if !state.policy.check_access(entity, Operation::Create, &session) {
        return Err(ApiError::forbidden());
    }

    validate_attributes(entity, &payload)?;
    let attributes = scalar_attributes(payload);

    let record = state.engine.create(entity, attributes).await?;
    if let Some(id) = record.get("id").and_then(Value::as_str) {
        state.notifier.notify(entity, Operation::Create, id);
    }
    Ok(Json(record))
}

/// Drop nested child collections from the attribute bag; only flat scalar
/// attributes are written. Nested create is not supported.
pub(crate) fn scalar_attributes(payload: Value) -> Value {
    match payload {
        Value::Object(obj) => Value::Object(
            obj.into_iter()
                .filter(|(_, value)| !matches!(value, Value::Array(_) | Value::Object(_)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_attributes_drop_nested_collections() {
        let body = json!({
            "crypto_id": "m1",
            "user_id": "u1",
            "crypto_portfolio": [{"amount": 1}],
            "user": {"email": "x"},
        });
        let stripped = scalar_attributes(body);
        let obj = stripped.as_object().unwrap();
        assert!(obj.contains_key("crypto_id"));
        assert!(!obj.contains_key("crypto_portfolio"));
        assert!(!obj.contains_key("user"));
    }
}
