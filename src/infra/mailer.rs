//! Outbound delivery of contact notifications.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::{
    application::contact::Mailer, config::ContactSettings, infra::error::InfraError,
    presentation::email::OutgoingEmail,
};

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts each email as JSON to an HTTP mail relay. One attempt per message.
#[derive(Debug, Clone)]
pub struct HttpRelayMailer {
    client: Client,
    relay_url: Url,
    sender: String,
    recipient: String,
}

impl HttpRelayMailer {
    pub fn new(settings: &ContactSettings, relay_url: Url) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("yalors/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.relay_timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            client,
            relay_url,
            sender: settings.sender.clone(),
            recipient: settings.recipient.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), InfraError> {
        let message = RelayMessage {
            from: &self.sender,
            to: &self.recipient,
            reply_to: &email.reply_to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(self.relay_url.clone())
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InfraError::upstream(format!(
                "mail relay answered with status {status}"
            )));
        }
        Ok(())
    }
}

/// Used when no relay is configured: records the notification and drops it.
#[derive(Debug, Clone, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), InfraError> {
        warn!(
            target = "yalors::mailer",
            subject = %email.subject,
            "mail relay not configured; notification not delivered"
        );
        Ok(())
    }
}

/// Pick the mailer for the configured contact settings.
pub fn from_settings(settings: &ContactSettings) -> Result<Arc<dyn Mailer>, InfraError> {
    match settings.relay_url.clone() {
        Some(url) => {
            info!(target = "yalors::mailer", relay = %url, "mail relay enabled");
            Ok(Arc::new(HttpRelayMailer::new(settings, url)?))
        }
        None => Ok(Arc::new(DisabledMailer)),
    }
}
