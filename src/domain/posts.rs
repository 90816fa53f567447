//! Blog post catalog and the read-only queries the site runs over it.
//!
//! The catalog is built once (from the embedded TOML or a configured file),
//! validated, and never mutated afterwards. Every query is a single pass over
//! the posts in catalog order.

mod data;
mod search;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use time::{Date, format_description::FormatItem, macros::format_description};

use crate::domain::error::DomainError;

pub use data::{builtin, parse_catalog};
pub use search::{SearchTerm, normalize};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

time::serde::format_description!(
    human_date,
    Date,
    "[month repr:long] [day padding:none], [year]"
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u32,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "human_date")]
    pub date: Date,
    pub read_time: String,
    pub author: String,
    pub author_position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_image: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Post {
    pub fn shares_tag_with(&self, other: &Post) -> bool {
        self.tags.iter().any(|tag| other.tags.contains(tag))
    }
}

/// Category selection for listing queries.
///
/// `All` is distinct from a category whose name happens to be `"all"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    pub const ALL_KEY: &'static str = "all";

    /// Map a request parameter onto a filter; blank and `all` select everything.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(Self::ALL_KEY) => Self::All,
            Some(category) => Self::Category(category.to_string()),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(category) => post.category == *category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

impl CategoryCount {
    pub fn label(&self) -> String {
        category_label(&self.name)
    }
}

/// Display label for a category key: first letter upper-cased, first `-` as a space.
pub fn category_label(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str().replacen('-', " ", 1);
    first.to_uppercase().chain(rest.chars()).collect()
}

/// Non-empty and made only of RFC 3986 unreserved characters.
fn is_url_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~'))
}

pub fn format_human_date(date: Date) -> String {
    date.format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostCatalog {
    posts: Vec<Post>,
}

impl PostCatalog {
    /// Validate and take ownership of a post collection.
    pub fn new(posts: Vec<Post>) -> Result<Self, DomainError> {
        let mut slugs = HashSet::with_capacity(posts.len());
        let mut ids = HashSet::with_capacity(posts.len());

        for post in &posts {
            if !is_url_safe_slug(&post.slug) {
                return Err(DomainError::InvalidSlug {
                    slug: post.slug.clone(),
                });
            }
            if !slugs.insert(post.slug.as_str()) {
                return Err(DomainError::DuplicateSlug {
                    slug: post.slug.clone(),
                });
            }
            if !ids.insert(post.id) {
                return Err(DomainError::DuplicateId { id: post.id });
            }
            if post.category.trim().is_empty() {
                return Err(DomainError::EmptyCategory {
                    slug: post.slug.clone(),
                });
            }
        }

        Ok(Self { posts })
    }

    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.slug == slug)
    }

    /// Post counts per category, ordered by first occurrence in the catalog.
    pub fn category_counts(&self) -> Vec<CategoryCount> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<CategoryCount> = Vec::new();

        for post in &self.posts {
            match positions.get(post.category.as_str()) {
                Some(&index) => counts[index].count += 1,
                None => {
                    positions.insert(post.category.as_str(), counts.len());
                    counts.push(CategoryCount {
                        name: post.category.clone(),
                        count: 1,
                    });
                }
            }
        }

        counts
    }

    pub fn by_category(&self, filter: &CategoryFilter) -> Vec<&Post> {
        self.posts.iter().filter(|post| filter.matches(post)).collect()
    }

    pub fn search(&self, term: &str) -> Vec<&Post> {
        let term = SearchTerm::new(term);
        self.posts.iter().filter(|post| term.matches(post)).collect()
    }

    /// Search and category filter applied together as independent predicates.
    pub fn query(&self, term: &str, filter: &CategoryFilter) -> Vec<&Post> {
        let term = SearchTerm::new(term);
        self.posts
            .iter()
            .filter(|post| term.matches(post) && filter.matches(post))
            .collect()
    }

    /// Other posts sharing the reference's category or at least one tag.
    ///
    /// Results keep catalog order and are cut at `limit`; category and tag
    /// matches are not ranked against each other.
    pub fn related(&self, reference: Option<&Post>, limit: usize) -> Vec<&Post> {
        let Some(reference) = reference else {
            return Vec::new();
        };

        self.posts
            .iter()
            .filter(|post| {
                post.id != reference.id
                    && (post.category == reference.category || post.shares_tag_with(reference))
            })
            .take(limit)
            .collect()
    }

    pub fn featured(&self) -> Vec<&Post> {
        self.posts.iter().filter(|post| post.featured).collect()
    }

    /// Distinct tags in first-occurrence order.
    pub fn all_tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.posts
            .iter()
            .flat_map(|post| post.tags.iter())
            .filter(|tag| seen.insert(tag.as_str()))
            .map(String::as_str)
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::post;
    use super::*;

    fn sample() -> PostCatalog {
        PostCatalog::new(vec![
            post(1, "a", "chatbots", &["AI", "Chatbots"]),
            post(2, "b", "automation", &["AI", "Workflow"]),
            post(3, "c", "chatbots", &["NoCode"]),
            post(4, "d", "case-studies", &["ROI"]),
        ])
        .expect("valid catalog")
    }

    fn slugs(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|post| post.slug.clone()).collect()
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let result = PostCatalog::new(vec![post(1, "same", "x", &[]), post(2, "same", "y", &[])]);
        assert_eq!(
            result,
            Err(DomainError::DuplicateSlug {
                slug: "same".to_string()
            })
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = PostCatalog::new(vec![post(7, "one", "x", &[]), post(7, "two", "y", &[])]);
        assert_eq!(result, Err(DomainError::DuplicateId { id: 7 }));
    }

    #[test]
    fn rejects_blank_category_and_unsafe_slug() {
        let blank = PostCatalog::new(vec![post(1, "one", "  ", &[])]);
        assert!(matches!(blank, Err(DomainError::EmptyCategory { .. })));

        let unsafe_slug = PostCatalog::new(vec![post(1, "Not A Slug", "x", &[])]);
        assert!(matches!(unsafe_slug, Err(DomainError::InvalidSlug { .. })));

        let empty_slug = PostCatalog::new(vec![post(1, "", "x", &[])]);
        assert!(matches!(empty_slug, Err(DomainError::InvalidSlug { .. })));
    }

    #[test]
    fn mixed_case_and_underscore_slugs_are_accepted() {
        let catalog = PostCatalog::new(vec![
            post(1, "Release_Notes", "x", &[]),
            post(2, "release_notes", "x", &[]),
        ])
        .expect("valid catalog");

        assert_eq!(catalog.find_by_slug("Release_Notes").map(|p| p.id), Some(1));
        assert_eq!(catalog.find_by_slug("release_notes").map(|p| p.id), Some(2));
    }

    #[test]
    fn find_by_slug_is_exact_and_case_sensitive() {
        let catalog = sample();
        assert_eq!(catalog.find_by_slug("b").map(|post| post.id), Some(2));
        assert!(catalog.find_by_slug("B").is_none());
        assert!(catalog.find_by_slug("missing").is_none());
    }

    #[test]
    fn category_counts_keep_first_occurrence_order() {
        let counts = sample().category_counts();
        let pairs: Vec<(&str, usize)> = counts
            .iter()
            .map(|entry| (entry.name.as_str(), entry.count))
            .collect();
        assert_eq!(
            pairs,
            vec![("chatbots", 2), ("automation", 1), ("case-studies", 1)]
        );
        assert!(PostCatalog::default().category_counts().is_empty());
    }

    #[test]
    fn category_filter_all_returns_everything_in_order() {
        let catalog = sample();
        let all = catalog.by_category(&CategoryFilter::All);
        assert_eq!(slugs(&all), vec!["a", "b", "c", "d"]);

        let studies = catalog.by_category(&CategoryFilter::Category("case-studies".into()));
        assert_eq!(slugs(&studies), vec!["d"]);

        let unknown = catalog.by_category(&CategoryFilter::Category("unknown".into()));
        assert!(unknown.is_empty());
    }

    #[test]
    fn category_literally_named_all_is_not_the_sentinel() {
        let catalog = PostCatalog::new(vec![post(1, "x", "all", &[]), post(2, "y", "other", &[])])
            .expect("valid catalog");
        let only_all = catalog.by_category(&CategoryFilter::Category("all".into()));
        assert_eq!(slugs(&only_all), vec!["x"]);
        assert_eq!(CategoryFilter::from_param(Some("all")), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_param(None), CategoryFilter::All);
    }

    #[test]
    fn related_posts_match_category_or_tag_in_catalog_order() {
        let catalog = sample();
        let reference = catalog.find_by_slug("a");
        let related = catalog.related(reference, 2);
        assert_eq!(slugs(&related), vec!["b", "c"]);

        let truncated = catalog.related(reference, 1);
        assert_eq!(slugs(&truncated), vec!["b"]);
    }

    #[test]
    fn related_posts_without_reference_are_empty() {
        assert!(sample().related(None, 3).is_empty());
    }

    #[test]
    fn featured_and_tags() {
        let mut featured = post(1, "a", "chatbots", &["AI", "Chatbots"]);
        featured.featured = true;
        let catalog = PostCatalog::new(vec![featured, post(2, "b", "automation", &["AI", "Flow"])])
            .expect("valid catalog");

        assert_eq!(slugs(&catalog.featured()), vec!["a"]);
        assert_eq!(catalog.all_tags(), vec!["AI", "Chatbots", "Flow"]);
    }

    #[test]
    fn category_label_capitalises_and_replaces_first_dash() {
        assert_eq!(category_label("case-studies"), "Case studies");
        assert_eq!(category_label("chatbots"), "Chatbots");
        assert_eq!(category_label("a-b-c"), "A b-c");
        assert_eq!(category_label(""), "");
    }

    #[test]
    fn human_dates_round_trip_through_serde() {
        let source = post(1, "a", "x", &[]);
        let json = serde_json::to_value(&source).expect("serialize");
        assert_eq!(json["date"], "March 1, 2025");
        assert_eq!(format_human_date(source.date), "March 1, 2025");
    }
}
