//! Contact form submissions.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_SOURCE_LABEL: &str = "Website Form";
const MIN_MESSAGE_CHARS: usize = 10;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email pattern"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("submission body is not JSON: {0}")]
    Malformed(String),
    #[error("missing required fields")]
    MissingFields,
}

/// Raw form payload as posted by the site.
///
/// Only the JSON syntax is checked here; a body that is not an object simply
/// carries no fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    fields: Map<String, Value>,
}

impl ContactForm {
    pub fn from_slice(body: &[u8]) -> Result<Self, ContactError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|err| ContactError::Malformed(err.to_string()))?;
        let fields = match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        Ok(Self { fields })
    }

    /// Require `name`, `email` and `message` to be non-empty strings.
    ///
    /// Optional fields that are not strings stay in `extra` untouched.
    pub fn into_submission(mut self) -> Result<ContactSubmission, ContactError> {
        let (Some(name), Some(email), Some(message)) = (
            take_text(&mut self.fields, "name"),
            take_text(&mut self.fields, "email"),
            take_text(&mut self.fields, "message"),
        ) else {
            return Err(ContactError::MissingFields);
        };

        Ok(ContactSubmission {
            name,
            email,
            message,
            company: take_text(&mut self.fields, "company"),
            service: take_text(&mut self.fields, "service"),
            source: take_text(&mut self.fields, "source"),
            extra: self.fields,
        })
    }
}

/// Remove `key` when it holds a string; empty strings count as absent.
fn take_text(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !fields.get(key).is_some_and(Value::is_string) {
        return None;
    }
    match fields.remove(key) {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-field messages produced by [`ContactSubmission::validate`].
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

impl ContactSubmission {
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_SOURCE_LABEL)
    }

    /// Stricter form rules: plausible email, non-blank name, message of ten characters or more.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if !EMAIL_SHAPE.is_match(&self.email) {
            errors.insert("email", "Please enter a valid email address");
        }
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        if self.message.trim().is_empty() {
            errors.insert("message", "Message is required");
        } else if self.message.chars().count() < MIN_MESSAGE_CHARS {
            errors.insert("message", "Message is too short");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
