//! Read-only JSON endpoints over the post catalog.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{application::error::ErrorReport, domain::posts::CategoryFilter};

use super::HttpState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PostsQuery {
    category: Option<String>,
    /// Matches a category by exact name, including one literally called `all`.
    category_exact: Option<String>,
    q: Option<String>,
}

impl PostsQuery {
    fn filter(&self) -> CategoryFilter {
        match self.category_exact.as_deref() {
            Some(name) if !name.is_empty() => CategoryFilter::Category(name.to_string()),
            _ => CategoryFilter::from_param(self.category.as_deref()),
        }
    }
}

pub(super) async fn list_posts(
    State(state): State<HttpState>,
    Query(query): Query<PostsQuery>,
) -> Response {
    let posts = state
        .blog
        .list(query.q.as_deref().unwrap_or(""), &query.filter());
    Json(posts).into_response()
}

pub(super) async fn featured_posts(State(state): State<HttpState>) -> Response {
    Json(state.blog.featured()).into_response()
}

pub(super) async fn post_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Response {
    match state.blog.detail(&slug) {
        Some(detail) => Json(detail).into_response(),
        None => {
            let mut response = (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Article not found" })),
            )
                .into_response();
            ErrorReport::from_message(
                "infra::http::blog::post_detail",
                format!("no article with slug `{slug}`"),
            )
            .attach(&mut response);
            response
        }
    }
}

pub(super) async fn categories(State(state): State<HttpState>) -> Response {
    Json(state.blog.categories()).into_response()
}

pub(super) async fn tags(State(state): State<HttpState>) -> Response {
    Json(state.blog.tags()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>, exact: Option<&str>) -> PostsQuery {
        PostsQuery {
            category: category.map(str::to_string),
            category_exact: exact.map(str::to_string),
            q: None,
        }
    }

    #[test]
    fn category_param_all_selects_everything() {
        assert_eq!(query(Some("all"), None).filter(), CategoryFilter::All);
        assert_eq!(query(None, None).filter(), CategoryFilter::All);
    }

    #[test]
    fn exact_category_wins_over_all_keyword() {
        assert_eq!(
            query(Some("chatbots"), Some("all")).filter(),
            CategoryFilter::Category("all".to_string())
        );
        assert_eq!(
            query(Some("trends"), Some("")).filter(),
            CategoryFilter::Category("trends".to_string())
        );
    }
}
