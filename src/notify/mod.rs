//! Fire-and-forget record-change notifications. Dispatch happens on a
//! spawned task after the mutation commits; failures are logged and never
//! surfaced to the caller.

use chrono::Utc;
use serde_json::json;

use crate::entities::Entity;
use crate::policy::Operation;

#[derive(Clone)]
pub struct Notifier {
    webhook_url: Option<String>,
    http: reqwest::Client,
}

impl Notifier {
    pub fn from_config() -> Self {
        Self {
            webhook_url: crate::config::config().notify.webhook_url.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// A notifier with no destination; notifications become debug logs.
    pub fn disabled() -> Self {
        Self { webhook_url: None, http: reqwest::Client::new() }
    }

    pub fn notify(&self, entity: Entity, operation: Operation, record_id: &str) {
        let Some(url) = self.webhook_url.clone() else {
            tracing::debug!("notification skipped (no webhook): {} {} {}", operation, entity, record_id);
            return;
        };

        let payload = json!({
            "entity": entity.table(),
            "operation": operation.to_string(),
            "record_id": record_id,
            "occurred_at": Utc::now().to_rfc3339(),
        });
        let http = self.http.clone();
        tokio::spawn(async move {
            match http.post(&url).json(&payload).send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!("notification webhook returned {}", resp.status());
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("notification dispatch failed: {}", err);
                }
            }
        });
    }
}
