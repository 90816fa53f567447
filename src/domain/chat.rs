//! Chat widget messages exchanged with the workflow webhook.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

pub const FALLBACK_REPLY: &str =
    "Merci pour votre message. Notre équipe vous contactera prochainement.";

const SESSION_SUFFIX_LEN: usize = 7;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Payload the chat widget posts for one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub chat_input: String,
    pub session_id: String,
}

/// Conversation identifier of the form `session_{unix_millis}_{7 base36 chars}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession(String);

impl ChatSession {
    pub fn generate() -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let mut entropy = Uuid::new_v4().as_u128();
        let mut suffix = String::with_capacity(SESSION_SUFFIX_LEN);
        for _ in 0..SESSION_SUFFIX_LEN {
            suffix.push(char::from(BASE36[(entropy % 36) as usize]));
            entropy /= 36;
        }
        Self(format!("session_{millis}_{suffix}"))
    }

    pub fn from_existing(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn message(&self, text: impl Into<String>) -> ChatMessage {
        ChatMessage {
            chat_input: text.into(),
            session_id: self.0.clone(),
        }
    }
}

/// Pick the assistant text out of a webhook reply: `output`, then `response`, then the fallback.
pub fn extract_reply(reply: &Value) -> &str {
    ["output", "response"]
        .iter()
        .filter_map(|key| reply.get(key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(FALLBACK_REPLY)
}
