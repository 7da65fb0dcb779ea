use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{ClientError, ListFetch};
use crate::entities::Entity;
use crate::query::{Page, QueryOptions};

/// Thin HTTP wrapper over the entity endpoints. One instance per base URL;
/// cheap to clone, the underlying reqwest client is pooled.
#[derive(Debug, Clone)]
pub struct EntityClient {
    base_url: String,
    bearer: Option<String>,
    http: reqwest::Client,
}

impl EntityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn url(&self, entity: Entity) -> String {
        format!("{}/api/{}", self.base_url, entity.route())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// List records with the canonical query options serialized to query
    /// parameters. Returns the `{data, totalCount}` envelope.
    pub async fn list(&self, entity: Entity, options: &QueryOptions) -> Result<Page<Value>, ClientError> {
        let request = self.http.get(self.url(entity)).query(&options.to_query_pairs());
        let response = self.authorize(request).send().await?;
        Self::decode(response).await
    }

    pub async fn get_by_id(
        &self,
        entity: Entity,
        id: &str,
        relations: &[String],
    ) -> Result<Value, ClientError> {
        let mut request = self.http.get(format!("{}/{}", self.url(entity), id));
        if !relations.is_empty() {
            let encoded = serde_json::to_string(relations).unwrap_or_default();
            request = request.query(&[("relations", encoded)]);
        }
        let response = self.authorize(request).send().await?;
        Self::decode(response).await
    }

    pub async fn create(&self, entity: Entity, attributes: &Value) -> Result<Value, ClientError> {
        let request = self.http.post(self.url(entity)).json(attributes);
        let response = self.authorize(request).send().await?;
        Self::decode(response).await
    }

    pub async fn update(&self, entity: Entity, id: &str, attributes: &Value) -> Result<Value, ClientError> {
        let request = self.http.put(format!("{}/{}", self.url(entity), id)).json(attributes);
        let response = self.authorize(request).send().await?;
        Self::decode(response).await
    }

    /// Delete a record. The server echoes the deleted record back.
    pub async fn delete(&self, entity: Entity, id: &str) -> Result<Value, ClientError> {
        let request = self.http.delete(format!("{}/{}", self.url(entity), id));
        let response = self.authorize(request).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.to_string());
        Err(ClientError::Api { status: status.as_u16(), message })
    }
}

/// Adapter wiring `EntityClient::list` into the list executor.
pub struct EntityListFetch {
    client: EntityClient,
    entity: Entity,
}

impl EntityListFetch {
    pub fn new(client: EntityClient, entity: Entity) -> Arc<Self> {
        Arc::new(Self { client, entity })
    }
}

#[async_trait]
impl ListFetch<Value> for EntityListFetch {
    async fn fetch(&self, options: &QueryOptions) -> Result<Page<Value>, ClientError> {
        self.client.list(self.entity, options).await
    }
}
