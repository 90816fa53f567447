//! Contact form intake: validate, notify by email, append to the submission log.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::domain::contact::{ContactError, ContactForm, ContactSubmission, FieldErrors};
use crate::infra::error::InfraError;
use crate::infra::telemetry::{CONTACT_DELIVERY_FAILURES_TOTAL, CONTACT_SUBMISSIONS_TOTAL};
use crate::presentation::email::{OutgoingEmail, contact_notification};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), InfraError>;
}

#[async_trait]
pub trait SubmissionLog: Send + Sync {
    async fn append(&self, entry: &LoggedSubmission) -> Result<(), InfraError>;
    async fn list(&self) -> Result<Vec<Value>, InfraError>;
}

/// One stored submission: the form fields plus the server-side receipt time.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedSubmission {
    #[serde(flatten)]
    pub submission: ContactSubmission,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl LoggedSubmission {
    pub fn new(mut submission: ContactSubmission, timestamp: OffsetDateTime) -> Self {
        // The browser sends its own timestamp; the receipt time replaces it.
        submission.extra.remove("timestamp");
        Self {
            submission,
            timestamp,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactRejection {
    #[error("submission could not be parsed: {0}")]
    Malformed(String),
    #[error("missing required fields")]
    MissingFields,
    #[error("submission failed field validation")]
    Invalid(FieldErrors),
}

impl From<ContactError> for ContactRejection {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Malformed(message) => Self::Malformed(message),
            ContactError::MissingFields => Self::MissingFields,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactReceipt {
    pub timestamp: OffsetDateTime,
}

#[derive(Clone)]
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    log: Arc<dyn SubmissionLog>,
    strict_validation: bool,
}

impl ContactService {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        log: Arc<dyn SubmissionLog>,
        strict_validation: bool,
    ) -> Self {
        Self {
            mailer,
            log,
            strict_validation,
        }
    }

    /// Accept a raw request body.
    ///
    /// Once the body passes validation the submission is accepted; email and
    /// log failures are reported through tracing and metrics only.
    pub async fn submit(&self, body: &[u8]) -> Result<ContactReceipt, ContactRejection> {
        let submission = ContactForm::from_slice(body)?.into_submission()?;
        if self.strict_validation {
            submission.validate().map_err(ContactRejection::Invalid)?;
        }

        let timestamp = OffsetDateTime::now_utc();
        counter!(CONTACT_SUBMISSIONS_TOTAL).increment(1);

        let entry = LoggedSubmission::new(submission, timestamp);
        tokio::join!(self.notify(&entry), self.record(&entry));

        Ok(ContactReceipt { timestamp })
    }

    pub async fn submissions(&self) -> Result<Vec<Value>, InfraError> {
        self.log.list().await
    }

    async fn notify(&self, entry: &LoggedSubmission) {
        let outcome = match contact_notification(&entry.submission, entry.timestamp) {
            Ok(email) => self.mailer.send(&email).await,
            Err(err) => Err(InfraError::upstream(err.to_string())),
        };

        match outcome {
            Ok(()) => info!(
                target = "yalors::contact",
                name = %entry.submission.name,
                "contact email sent"
            ),
            Err(err) => {
                counter!(CONTACT_DELIVERY_FAILURES_TOTAL, "sink" => "email").increment(1);
                error!(target = "yalors::contact", error = %err, "failed to send contact email");
            }
        }
    }

    async fn record(&self, entry: &LoggedSubmission) {
        if let Err(err) = self.log.append(entry).await {
            counter!(CONTACT_DELIVERY_FAILURES_TOTAL, "sink" => "log").increment(1);
            error!(target = "yalors::contact", error = %err, "failed to log contact submission");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), InfraError> {
            if self.fail {
                return Err(InfraError::upstream("relay offline"));
            }
            self.sent.lock().await.push(email.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryLog {
        entries: Mutex<Vec<Value>>,
        appends: AtomicUsize,
    }

    #[async_trait]
    impl SubmissionLog for MemoryLog {
        async fn append(&self, entry: &LoggedSubmission) -> Result<(), InfraError> {
            self.appends.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().await.push(serde_json::to_value(entry)?);
            Ok(())
        }

        async fn list(&self) -> Result<Vec<Value>, InfraError> {
            Ok(self.entries.lock().await.clone())
        }
    }

    const VALID: &str = r#"{"name":"Ada","email":"ada@example.com","message":"Hello there team","source":"cta","timestamp":"2020-01-01T00:00:00Z"}"#;

    #[tokio::test]
    async fn accepted_submission_is_mailed_and_logged() {
        let mailer = Arc::new(RecordingMailer::default());
        let log = Arc::new(MemoryLog::default());
        let service = ContactService::new(mailer.clone(), log.clone(), false);

        let receipt = service.submit(VALID.as_bytes()).await.expect("accepted");

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "New Contact from Ada - cta");

        let entries = service.submissions().await.expect("list");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["name"], "Ada");
        assert_ne!(entries[0]["timestamp"], "2020-01-01T00:00:00Z");
        let logged = entries[0]["timestamp"].as_str().expect("timestamp string");
        assert_eq!(
            OffsetDateTime::parse(logged, &time::format_description::well_known::Rfc3339)
                .expect("rfc3339"),
            receipt.timestamp
        );
    }

    #[tokio::test]
    async fn mail_failure_does_not_reject_submission() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let log = Arc::new(MemoryLog::default());
        let service = ContactService::new(mailer, log.clone(), false);

        assert!(service.submit(VALID.as_bytes()).await.is_ok());
        assert_eq!(log.appends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_fields_skip_both_sinks() {
        let mailer = Arc::new(RecordingMailer::default());
        let log = Arc::new(MemoryLog::default());
        let service = ContactService::new(mailer.clone(), log.clone(), false);

        let result = service.submit(br#"{"name":"Ada"}"#).await;
        assert_eq!(result, Err(ContactRejection::MissingFields));
        assert!(mailer.sent.lock().await.is_empty());
        assert_eq!(log.appends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_string_optional_field_is_accepted_and_logged() {
        let log = Arc::new(MemoryLog::default());
        let service = ContactService::new(Arc::new(RecordingMailer::default()), log, false);

        service
            .submit(br#"{"name":"Ada","email":"ada@example.com","message":"Hello there","company":42}"#)
            .await
            .expect("accepted");

        let entries = service.submissions().await.expect("list");
        assert_eq!(entries[0]["company"], 42);
    }

    #[tokio::test]
    async fn array_body_is_missing_fields() {
        let service = ContactService::new(
            Arc::new(RecordingMailer::default()),
            Arc::new(MemoryLog::default()),
            false,
        );
        assert_eq!(
            service.submit(b"[]").await,
            Err(ContactRejection::MissingFields)
        );
        assert!(matches!(
            service.submit(b"{oops").await,
            Err(ContactRejection::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn strict_mode_rejects_short_messages() {
        let service = ContactService::new(
            Arc::new(RecordingMailer::default()),
            Arc::new(MemoryLog::default()),
            true,
        );

        let result = service
            .submit(br#"{"name":"Ada","email":"ada@example.com","message":"hi"}"#)
            .await;
        match result {
            Err(ContactRejection::Invalid(errors)) => {
                assert_eq!(errors.get("message"), Some(&"Message is too short"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
