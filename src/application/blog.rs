//! Read-side service the blog pages and JSON API call into.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::posts::{CategoryFilter, Post, PostCatalog, format_human_date};

pub const RELATED_POST_LIMIT: usize = 3;

/// Listing view of a post; omits the article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard {
    pub id: u32,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub category_label: String,
    pub tags: Vec<String>,
    pub date: String,
    pub read_time: String,
    pub author: String,
    pub featured: bool,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category.clone(),
            category_label: crate::domain::posts::category_label(&post.category),
            tags: post.tags.clone(),
            date: format_human_date(post.date),
            read_time: post.read_time.clone(),
            author: post.author.clone(),
            featured: post.featured,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub related: Vec<PostCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    pub label: String,
    pub count: usize,
}

#[derive(Clone)]
pub struct BlogService {
    catalog: Arc<PostCatalog>,
}

impl BlogService {
    pub fn new(catalog: Arc<PostCatalog>) -> Self {
        Self { catalog }
    }

    pub fn list(&self, term: &str, filter: &CategoryFilter) -> Vec<PostCard> {
        cards(self.catalog.query(term, filter))
    }

    pub fn featured(&self) -> Vec<PostCard> {
        cards(self.catalog.featured())
    }

    /// Article plus its related posts; `None` when the slug is unknown.
    pub fn detail(&self, slug: &str) -> Option<PostDetail> {
        let post = self.catalog.find_by_slug(slug)?;
        let related = cards(self.catalog.related(Some(post), RELATED_POST_LIMIT));
        Some(PostDetail {
            post: post.clone(),
            related,
        })
    }

    pub fn categories(&self) -> Vec<CategoryEntry> {
        self.catalog
            .category_counts()
            .into_iter()
            .map(|entry| CategoryEntry {
                label: entry.label(),
                name: entry.name,
                count: entry.count,
            })
            .collect()
    }

    pub fn tags(&self) -> Vec<String> {
        self.catalog
            .all_tags()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

fn cards(posts: Vec<&Post>) -> Vec<PostCard> {
    posts.into_iter().map(PostCard::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posts::builtin;

    fn service() -> BlogService {
        BlogService::new(builtin().expect("builtin catalog"))
    }

    #[test]
    fn detail_includes_three_related_posts() {
        let detail = service()
            .detail("ai-chatbots-transforming-customer-service")
            .expect("known slug");

        assert_eq!(detail.post.id, 1);
        assert_eq!(detail.related.len(), RELATED_POST_LIMIT);
        assert!(detail.related.iter().all(|card| card.id != 1));
    }

    #[test]
    fn unknown_slug_has_no_detail() {
        assert!(service().detail("does-not-exist").is_none());
    }

    #[test]
    fn categories_carry_display_labels() {
        let categories = service().categories();
        let studies = categories
            .iter()
            .find(|entry| entry.name == "case-studies")
            .expect("case studies category");
        assert_eq!(studies.label, "Case studies");
        assert_eq!(studies.count, 1);
        let total: usize = categories.iter().map(|entry| entry.count).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn list_combines_search_and_category() {
        let posts = service().list(
            "chatbot",
            &CategoryFilter::Category("chatbots".to_string()),
        );
        assert!(!posts.is_empty());
        assert!(posts.iter().all(|card| card.category == "chatbots"));
    }

    #[test]
    fn featured_posts_come_from_catalog_flags() {
        let slugs: Vec<String> = service()
            .featured()
            .into_iter()
            .map(|card| card.slug)
            .collect();
        assert_eq!(
            slugs,
            vec![
                "ai-chatbots-transforming-customer-service",
                "future-of-work-automation-changing-job-roles"
            ]
        );
    }
}
