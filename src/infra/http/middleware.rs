use std::time::Instant;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// One failed response, ready to be logged.
struct FailedResponse {
    status: StatusCode,
    method: Method,
    uri: Uri,
    elapsed_ms: u128,
    request_id: String,
    source: &'static str,
    chain: Vec<String>,
}

macro_rules! log_failure {
    ($level:ident, $failure:expr, $message:literal) => {{
        let failure = $failure;
        let detail = failure
            .chain
            .first()
            .map(String::as_str)
            .unwrap_or("no diagnostic available");
        $level!(
            target = "yalors::http::response",
            status = failure.status.as_u16(),
            method = %failure.method,
            path = %failure.uri.path(),
            query = failure.uri.query().unwrap_or(""),
            elapsed_ms = failure.elapsed_ms,
            source = failure.source,
            detail = %detail,
            chain = ?failure.chain,
            request_id = failure.request_id.as_str(),
            $message,
        );
    }};
}

impl FailedResponse {
    fn log(&self) {
        if self.status.is_server_error() {
            log_failure!(error, self, "request failed");
        } else {
            log_failure!(warn, self, "client request error");
        }
    }
}

/// Log every 4xx as a warning and every 5xx as an error, with the handler's report.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let (source, chain) = match response.extensions_mut().remove::<ErrorReport>() {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };

        FailedResponse {
            status,
            method,
            uri,
            elapsed_ms: start.elapsed().as_millis(),
            request_id,
            source,
            chain,
        }
        .log();
    }

    response
}
