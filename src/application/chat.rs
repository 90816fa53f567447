//! Relay between the site's chat widget and the workflow webhook.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use tracing::error;

use crate::domain::chat::{ChatSession, extract_reply};
use crate::infra::error::InfraError;
use crate::infra::telemetry::CHAT_PROXY_FAILURES_TOTAL;

/// Status and JSON body exactly as the webhook answered.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ChatWebhook: Send + Sync {
    /// Forward one JSON payload; a non-JSON reply is an error.
    async fn forward(&self, payload: &Value) -> Result<UpstreamReply, InfraError>;
}

#[derive(Clone)]
pub struct ChatService {
    webhook: Arc<dyn ChatWebhook>,
}

impl ChatService {
    pub fn new(webhook: Arc<dyn ChatWebhook>) -> Self {
        Self { webhook }
    }

    /// Forward a widget request body verbatim. Single attempt, no retry.
    pub async fn relay(&self, body: &[u8]) -> Result<UpstreamReply, InfraError> {
        let outcome = match serde_json::from_slice::<Value>(body) {
            Ok(payload) => self.webhook.forward(&payload).await,
            Err(err) => Err(InfraError::from(err)),
        };

        if let Err(err) = &outcome {
            counter!(CHAT_PROXY_FAILURES_TOTAL).increment(1);
            error!(target = "yalors::chat", error = %err, "error proxying to chat webhook");
        }
        outcome
    }

    /// Send one message for `session` and return the assistant's text.
    pub async fn ask(&self, session: &ChatSession, text: &str) -> Result<String, InfraError> {
        let payload = serde_json::to_value(session.message(text))?;
        let reply = self.webhook.forward(&payload).await?;
        if !reply.is_success() {
            return Err(InfraError::upstream(format!(
                "webhook answered with status {}",
                reply.status
            )));
        }
        Ok(extract_reply(&reply.body).to_string())
    }
}
