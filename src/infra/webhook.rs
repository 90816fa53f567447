//! HTTP client for the chat workflow webhook.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::{
    application::chat::{ChatWebhook, UpstreamReply},
    config::ChatSettings,
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct HttpChatWebhook {
    client: Client,
    url: Url,
}

impl HttpChatWebhook {
    pub fn new(settings: &ChatSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("yalors/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            client,
            url: settings.webhook_url.clone(),
        })
    }
}

#[async_trait]
impl ChatWebhook for HttpChatWebhook {
    async fn forward(&self, payload: &Value) -> Result<UpstreamReply, InfraError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).map_err(|err| {
            InfraError::upstream(format!(
                "webhook answered with status {status} and a non-JSON body: {err}"
            ))
        })?;

        Ok(UpstreamReply { status, body })
    }
}
