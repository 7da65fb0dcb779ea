//! In-memory engine. Interprets the same `EngineQuery` contract as the
//! Postgres engine against process-local tables; used by the integration
//! test suite and local demos, never in production.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::engine::{Engine, EngineError};
use crate::entities::Entity;
use crate::query::{EngineQuery, FilterSpec, Page, SortDirection};

#[derive(Clone, Default)]
pub struct MemoryEngine {
    tables: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows directly, stamping any missing system columns.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().await;
        let entries = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Value::Object(mut obj) = row {
                stamp(&mut obj, true);
                entries.push(Value::Object(obj));
            }
        }
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    async fn find_many_paginated(&self, entity: Entity, query: &EngineQuery) -> Result<Page<Value>, EngineError> {
        let tables = self.tables.read().await;
        let rows = tables.get(entity.table()).cloned().unwrap_or_default();

        let mut matched: Vec<Value> = rows.into_iter().filter(|row| matches_filter(row, &query.filter)).collect();
        let total_count = matched.len() as i64;

        sort_rows(&mut matched, query);

        let skip = query.skip.max(0) as usize;
        let take = query.take.max(0) as usize;
        let mut data: Vec<Value> = matched.into_iter().skip(skip).take(take).collect();

        attach_relations(&tables, entity, &mut data, &query.relations);
        Ok(Page { data, total_count })
    }

    async fn find_by_id(
        &self,
        entity: Entity,
        id: &str,
        relations: &[String],
    ) -> Result<Option<Value>, EngineError> {
        let tables = self.tables.read().await;
        let found = tables
            .get(entity.table())
            .and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id)))
            .cloned();
        match found {
            Some(record) => {
                let mut rows = vec![record];
                attach_relations(&tables, entity, &mut rows, relations);
                Ok(rows.pop())
            }
            None => Ok(None),
        }
    }

    async fn create(&self, entity: Entity, attributes: Value) -> Result<Value, EngineError> {
        let Value::Object(mut obj) = attributes else {
            return Err(EngineError::Query("record attributes must be an object".to_string()));
        };
        stamp(&mut obj, true);
        let record = Value::Object(obj);

        let mut tables = self.tables.write().await;
        tables.entry(entity.table().to_string()).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(&self, entity: Entity, id: &str, attributes: Value) -> Result<Value, EngineError> {
        let Value::Object(mut changes) = attributes else {
            return Err(EngineError::Query("record attributes must be an object".to_string()));
        };
        changes.remove("id");
        stamp(&mut changes, false);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(entity.table().to_string()).or_default();
        let Some(row) = rows.iter_mut().find(|row| row_id(row) == Some(id)) else {
            return Err(EngineError::NotFound(format!("Record {} not found in {}", id, entity.table())));
        };
        if let Some(obj) = row.as_object_mut() {
            for (key, value) in changes {
                obj.insert(key, value);
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, entity: Entity, id: &str) -> Result<Value, EngineError> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(entity.table().to_string()).or_default();
        let Some(index) = rows.iter().position(|row| row_id(row) == Some(id)) else {
            return Err(EngineError::NotFound(format!("Record {} not found in {}", id, entity.table())));
        };
        Ok(rows.remove(index))
    }

    async fn health(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn stamp(obj: &mut Map<String, Value>, creating: bool) {
    let now = Utc::now().to_rfc3339();
    if creating {
        obj.entry("id".to_string()).or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        obj.entry("created_at".to_string()).or_insert_with(|| Value::String(now.clone()));
    }
    obj.insert("updated_at".to_string(), Value::String(now));
}

/// Text coercion mirroring the Postgres `::text` comparisons.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches_filter(row: &Value, filter: &FilterSpec) -> bool {
    for (field, expected) in &filter.equals {
        let actual = row.get(field).map(text_of).unwrap_or_default();
        if &actual != expected {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let term = search.term.to_lowercase();
        let hit = search.keys.iter().any(|key| {
            row.get(key)
                .map(|v| text_of(v).to_lowercase().contains(&term))
                .unwrap_or(false)
        });
        if !hit {
            return false;
        }
    }
    true
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (x, y) => {
            let xs = x.map(text_of).unwrap_or_default();
            let ys = y.map(text_of).unwrap_or_default();
            xs.cmp(&ys)
        }
    }
}

fn sort_rows(rows: &mut [Value], query: &EngineQuery) {
    rows.sort_by(|a, b| {
        if query.order.is_empty() {
            // Same stable default as the SQL builder.
            return compare_values(a.get("id"), b.get("id"));
        }
        for spec in &query.order {
            let ord = compare_values(a.get(&spec.column), b.get(&spec.column));
            let ord = match spec.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn attach_relations(
    tables: &HashMap<String, Vec<Value>>,
    entity: Entity,
    rows: &mut [Value],
    relations: &[String],
) {
    for name in relations {
        let Some(relation) = entity.relations().iter().find(|r| r.name == name) else {
            continue;
        };
        for row in rows.iter_mut() {
            let parent = row
                .get(relation.foreign_key)
                .and_then(Value::as_str)
                .and_then(|fk| {
                    tables
                        .get(relation.table)
                        .and_then(|rows| rows.iter().find(|r| row_id(r) == Some(fk)))
                })
                .cloned()
                .unwrap_or(Value::Null);
            if let Some(obj) = row.as_object_mut() {
                obj.insert(relation.name.to_string(), parent);
            }
        }
    }
}
