use askama::{Error as AskamaError, Template};
use thiserror::Error;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::domain::contact::ContactSubmission;

const SUBMITTED_AT_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");

#[derive(Debug, Error)]
#[error("contact email could not be rendered")]
pub struct EmailRenderError(#[from] AskamaError);

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactEmailTemplate<'a> {
    name: &'a str,
    email: &'a str,
    company: Option<&'a str>,
    service: Option<&'a str>,
    message_lines: Vec<&'a str>,
    source: &'a str,
    submitted_at: String,
}

/// A fully rendered notification ready to hand to a mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub reply_to: String,
    pub html: String,
}

pub fn contact_notification(
    submission: &ContactSubmission,
    submitted_at: OffsetDateTime,
) -> Result<OutgoingEmail, EmailRenderError> {
    let submitted_at = submitted_at
        .format(SUBMITTED_AT_FORMAT)
        .unwrap_or_else(|_| submitted_at.to_string());

    let html = ContactEmailTemplate {
        name: &submission.name,
        email: &submission.email,
        company: submission.company.as_deref(),
        service: submission.service.as_deref(),
        message_lines: submission.message.split('\n').collect(),
        source: submission.source_label(),
        submitted_at,
    }
    .render()?;

    let subject_source = submission.source.as_deref().unwrap_or("Website");

    Ok(OutgoingEmail {
        subject: format!("New Contact from {} - {subject_source}", submission.name),
        reply_to: submission.email.clone(),
        html,
    })
}
