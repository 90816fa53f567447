//! Write-side endpoints used by the site's contact form and chat widget.

use std::error::Error as StdError;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::application::{contact::ContactRejection, error::ErrorReport};

use super::HttpState;

const CONTACT_SOURCE: &str = "infra::http::forms::submit_contact";
const CHAT_SOURCE: &str = "infra::http::forms::relay_chat";

#[derive(Debug, Serialize)]
struct ContactAccepted {
    success: bool,
    message: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

pub(super) async fn submit_contact(State(state): State<HttpState>, body: Bytes) -> Response {
    match state.contact.submit(&body).await {
        Ok(receipt) => Json(ContactAccepted {
            success: true,
            message: "Form submitted successfully",
            timestamp: receipt.timestamp,
        })
        .into_response(),
        Err(rejection) => contact_rejection_response(rejection),
    }
}

fn contact_rejection_response(rejection: ContactRejection) -> Response {
    let (status, body) = match &rejection {
        ContactRejection::Malformed(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Error processing your request" }),
        ),
        ContactRejection::MissingFields => (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Missing required fields" }),
        ),
        ContactRejection::Invalid(fields) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": "Invalid submission", "fields": fields }),
        ),
    };

    let mut response = (status, Json(body)).into_response();
    ErrorReport::from_error(CONTACT_SOURCE, &rejection).attach(&mut response);
    response
}

pub(super) async fn relay_chat(State(state): State<HttpState>, body: Bytes) -> Response {
    let reply = match state.chat.relay(&body).await {
        Ok(reply) => reply,
        Err(err) => return chat_failure_response(&err),
    };

    match StatusCode::from_u16(reply.status) {
        Ok(status) => (status, Json(reply.body)).into_response(),
        Err(err) => chat_failure_response(&err),
    }
}

fn chat_failure_response(err: &dyn StdError) -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let mut response = (
        status,
        Json(json!({ "error": "Failed to connect to service" })),
    )
        .into_response();
    ErrorReport::from_error(CHAT_SOURCE, err).attach(&mut response);
    response
}
