use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::engine::{Engine, EngineError};
use super::manager::DatabaseManager;
use crate::entities::Entity;
use crate::query::translate::is_valid_identifier;
use crate::query::{sql, EngineQuery, Page};

/// Production engine over Postgres. Records are read back as JSON attribute
/// bags via `row_to_json`, so the engine needs no per-entity row types.
pub struct PgEngine {
    pool: PgPool,
}

impl PgEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn from_env() -> Result<Self, EngineError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    async fn fetch_rows(&self, result: &crate::query::SqlResult) -> Result<Vec<Value>, EngineError> {
        let mut q = sqlx::query(&result.query);
        for param in &result.params {
            q = q.bind(param);
        }
        let rows = q.fetch_all(&self.pool).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let value: Value = row.try_get("row")?;
            out.push(value);
        }
        Ok(out)
    }

    async fn fetch_one_by_id(&self, entity: Entity, id: &str) -> Result<Option<Value>, EngineError> {
        let query = format!(
            "SELECT row_to_json(t) AS row FROM \"{}\" t WHERE t.\"id\"::text = $1",
            entity.table()
        );
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(row.try_get("row")?)),
            None => Ok(None),
        }
    }

    /// Embed requested belongs-to parents into each record. Relation names
    /// that the entity does not define are ignored.
    async fn attach_relations(
        &self,
        entity: Entity,
        rows: &mut [Value],
        relations: &[String],
    ) -> Result<(), EngineError> {
        for name in relations {
            let Some(relation) = entity.relations().iter().find(|r| r.name == name) else {
                tracing::debug!("ignoring unknown relation {} for {}", name, entity);
                continue;
            };

            let ids: Vec<String> = rows
                .iter()
                .filter_map(|row| row.get(relation.foreign_key).and_then(Value::as_str))
                .map(|s| s.to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if ids.is_empty() {
                continue;
            }

            let query = format!(
                "SELECT row_to_json(t) AS row FROM \"{}\" t WHERE t.\"id\"::text = ANY($1)",
                relation.table
            );
            let parent_rows = sqlx::query(&query).bind(&ids).fetch_all(&self.pool).await?;
            let mut parents: HashMap<String, Value> = HashMap::new();
            for row in parent_rows {
                let value: Value = row.try_get("row")?;
                if let Some(id) = value.get("id").and_then(Value::as_str) {
                    parents.insert(id.to_string(), value.clone());
                }
            }

            for row in rows.iter_mut() {
                let parent = row
                    .get(relation.foreign_key)
                    .and_then(Value::as_str)
                    .and_then(|fk| parents.get(fk).cloned())
                    .unwrap_or(Value::Null);
                if let Some(obj) = row.as_object_mut() {
                    obj.insert(relation.name.to_string(), parent);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Engine for PgEngine {
    async fn find_many_paginated(&self, entity: Entity, query: &EngineQuery) -> Result<Page<Value>, EngineError> {
        let select = sql::build_select(entity.table(), query)?;
        let mut data = self.fetch_rows(&select).await?;

        let count = sql::build_count(entity.table(), &query.filter)?;
        let mut q = sqlx::query(&count.query);
        for param in &count.params {
            q = q.bind(param);
        }
        let total_count: i64 = q.fetch_one(&self.pool).await?.try_get("count")?;

        self.attach_relations(entity, &mut data, &query.relations).await?;
        Ok(Page { data, total_count })
    }

    async fn find_by_id(
        &self,
        entity: Entity,
        id: &str,
        relations: &[String],
    ) -> Result<Option<Value>, EngineError> {
        match self.fetch_one_by_id(entity, id).await? {
            Some(record) => {
                let mut rows = vec![record];
                self.attach_relations(entity, &mut rows, relations).await?;
                Ok(rows.pop())
            }
            None => Ok(None),
        }
    }

    async fn create(&self, entity: Entity, attributes: Value) -> Result<Value, EngineError> {
        let mut attrs = into_object(attributes)?;
        stamp_system_columns(&mut attrs, true);
        let columns = column_list(&attrs)?;

        let query = format!(
            "INSERT INTO \"{table}\" ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::\"{table}\", $1) RETURNING \"id\"::text AS id",
            table = entity.table(),
            columns = columns,
        );
        let row = sqlx::query(&query).bind(Value::Object(attrs)).fetch_one(&self.pool).await?;
        let id: String = row.try_get("id")?;

        self.fetch_one_by_id(entity, &id)
            .await?
            .ok_or_else(|| EngineError::Query(format!("created record {} not readable", id)))
    }

    async fn update(&self, entity: Entity, id: &str, attributes: Value) -> Result<Value, EngineError> {
        let mut attrs = into_object(attributes)?;
        attrs.remove("id");
        stamp_system_columns(&mut attrs, false);
        let columns = column_list(&attrs)?;

        let query = format!(
            "UPDATE \"{table}\" SET ({columns}) = (SELECT {columns} FROM jsonb_populate_record(NULL::\"{table}\", $1)) WHERE \"id\"::text = $2 RETURNING \"id\"::text AS id",
            table = entity.table(),
            columns = columns,
        );
        let row = sqlx::query(&query)
            .bind(Value::Object(attrs))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if row.is_none() {
            return Err(EngineError::NotFound(format!("Record {} not found in {}", id, entity.table())));
        }

        self.fetch_one_by_id(entity, id)
            .await?
            .ok_or_else(|| EngineError::Query(format!("updated record {} not readable", id)))
    }

    async fn delete(&self, entity: Entity, id: &str) -> Result<Value, EngineError> {
        let existing = self
            .fetch_one_by_id(entity, id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Record {} not found in {}", id, entity.table())))?;

        let query = format!("DELETE FROM \"{}\" WHERE \"id\"::text = $1", entity.table());
        sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(existing)
    }

    async fn health(&self) -> Result<(), EngineError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn into_object(attributes: Value) -> Result<Map<String, Value>, EngineError> {
    match attributes {
        Value::Object(map) => Ok(map),
        other => Err(EngineError::Query(format!("record attributes must be an object, got {}", other))),
    }
}

/// Stamp `id` / `created_at` / `updated_at` the way the data layer owns them:
/// ids are v4 UUIDs, timestamps RFC3339.
fn stamp_system_columns(attrs: &mut Map<String, Value>, creating: bool) {
    let now = Utc::now().to_rfc3339();
    if creating {
        attrs
            .entry("id".to_string())
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        attrs
            .entry("created_at".to_string())
            .or_insert_with(|| Value::String(now.clone()));
    }
    attrs.insert("updated_at".to_string(), Value::String(now));
}

fn column_list(attrs: &Map<String, Value>) -> Result<String, EngineError> {
    if attrs.is_empty() {
        return Err(EngineError::Query("no attributes to write".to_string()));
    }
    let mut quoted = Vec::with_capacity(attrs.len());
    for column in attrs.keys() {
        if !is_valid_identifier(column) {
            return Err(EngineError::Query(format!("invalid column name: {}", column)));
        }
        quoted.push(format!("\"{}\"", column));
    }
    Ok(quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_columns_are_stamped_on_create() {
        let mut attrs = into_object(json!({ "name": "Bitcoin" })).unwrap();
        stamp_system_columns(&mut attrs, true);
        assert!(attrs.contains_key("id"));
        assert!(attrs.contains_key("created_at"));
        assert!(attrs.contains_key("updated_at"));
    }

    #[test]
    fn update_stamps_only_updated_at() {
        let mut attrs = into_object(json!({ "name": "Bitcoin" })).unwrap();
        stamp_system_columns(&mut attrs, false);
        assert!(!attrs.contains_key("id"));
        assert!(!attrs.contains_key("created_at"));
        assert!(attrs.contains_key("updated_at"));
    }

    #[test]
    fn column_list_rejects_injection_shaped_names() {
        let attrs = into_object(json!({ "name\"; DROP": 1 })).unwrap();
        assert!(column_list(&attrs).is_err());
    }

    #[test]
    fn column_list_quotes_names() {
        let attrs = into_object(json!({ "name": "x", "symbol": "y" })).unwrap();
        assert_eq!(column_list(&attrs).unwrap(), "\"name\", \"symbol\"");
    }
}
