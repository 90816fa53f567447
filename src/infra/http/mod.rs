mod blog;
mod forms;
mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::application::{blog::BlogService, chat::ChatService, contact::ContactService};

use self::middleware::{log_responses, set_request_context};

pub use self::middleware::RequestContext;

#[derive(Clone)]
pub struct HttpState {
    pub blog: Arc<BlogService>,
    pub contact: Arc<ContactService>,
    pub chat: Arc<ChatService>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/posts", get(blog::list_posts))
        .route("/api/posts/featured", get(blog::featured_posts))
        .route("/api/posts/{slug}", get(blog::post_detail))
        .route("/api/categories", get(blog::categories))
        .route("/api/tags", get(blog::tags))
        .route("/api/contact", post(forms::submit_contact))
        .route("/api/chat", post(forms::relay_chat))
        .route("/_health", get(health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
