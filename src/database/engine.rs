//! Persistence seam. The pipeline talks to the engine through this trait
//! only; the Postgres implementation is the production engine and the
//! in-memory one backs the test suite.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::entities::Entity;
use crate::query::{EngineQuery, Page};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<crate::query::QueryError> for EngineError {
    fn from(err: crate::query::QueryError) -> Self {
        EngineError::Query(err.to_string())
    }
}

#[async_trait]
pub trait Engine: Send + Sync {
    /// Paginated find over the filtered set. `total_count` covers the whole
    /// filtered set, independent of take/skip.
    async fn find_many_paginated(&self, entity: Entity, query: &EngineQuery) -> Result<Page<Value>, EngineError>;

    async fn find_by_id(
        &self,
        entity: Entity,
        id: &str,
        relations: &[String],
    ) -> Result<Option<Value>, EngineError>;

    async fn create(&self, entity: Entity, attributes: Value) -> Result<Value, EngineError>;

    /// Full replace of the provided fields; returns the updated record or
    /// `NotFound`.
    async fn update(&self, entity: Entity, id: &str, attributes: Value) -> Result<Value, EngineError>;

    /// Returns the deleted record, or `NotFound`.
    async fn delete(&self, entity: Entity, id: &str) -> Result<Value, EngineError>;

    async fn health(&self) -> Result<(), EngineError>;
}
