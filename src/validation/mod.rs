//! Schema-driven validation of entity attribute bags, applied before create
//! and update. Field schemas live in the entity registry; unknown extra
//! attributes are allowed and passed through to the engine.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{Entity, FieldKind};
use crate::error::ApiError;

pub fn validate_attributes(entity: Entity, body: &Value) -> Result<(), ApiError> {
    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Request body must be a JSON object"))?;

    let mut field_errors: HashMap<String, String> = HashMap::new();
    for spec in entity.fields() {
        match obj.get(spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    field_errors.insert(spec.name.to_string(), "This field is required".to_string());
                }
            }
            Some(value) => {
                if let Some(message) = check_kind(spec.kind, value) {
                    field_errors.insert(spec.name.to_string(), message);
                }
            }
        }
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Validation failed", field_errors))
    }
}

fn check_kind(kind: FieldKind, value: &Value) -> Option<String> {
    match kind {
        FieldKind::Text => {
            if value.is_string() {
                None
            } else {
                Some("Expected a string value".to_string())
            }
        }
        FieldKind::Integer => {
            if value.as_i64().is_some() {
                None
            } else {
                Some("Expected an integer value".to_string())
            }
        }
        FieldKind::Timestamp => match value.as_str() {
            Some(s) if parse_timestamp(s) => None,
            _ => Some(format!("Invalid timestamp format: {}", value)),
        },
        FieldKind::Uuid => match value.as_str() {
            Some(s) if Uuid::parse_str(s).is_ok() => None,
            _ => Some(format!("Invalid UUID format: {}", value)),
        },
    }
}

fn parse_timestamp(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
