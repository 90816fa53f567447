use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::{Post, PostCatalog};
use crate::domain::error::DomainError;

const BUILTIN_POSTS: &str = include_str!("../../../content/posts.toml");

static BUILTIN: Lazy<Result<Arc<PostCatalog>, DomainError>> =
    Lazy::new(|| parse_catalog(BUILTIN_POSTS).map(Arc::new));

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    posts: Vec<Post>,
}

/// The articles shipped with the binary.
pub fn builtin() -> Result<Arc<PostCatalog>, DomainError> {
    BUILTIN.clone()
}

/// Parse a TOML document of `[[posts]]` tables into a validated catalog.
pub fn parse_catalog(source: &str) -> Result<PostCatalog, DomainError> {
    let file: CatalogFile =
        toml::from_str(source).map_err(|err| DomainError::parse(err.to_string()))?;
    PostCatalog::new(file.posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::posts::CategoryFilter;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = builtin().expect("builtin catalog");
        assert_eq!(catalog.len(), 8);
        assert_eq!(
            catalog
                .find_by_slug("ai-chatbots-transforming-customer-service")
                .map(|post| post.id),
            Some(1)
        );
    }

    #[test]
    fn builtin_categories_in_first_occurrence_order() {
        let catalog = builtin().expect("builtin catalog");
        let names: Vec<String> = catalog
            .category_counts()
            .into_iter()
            .map(|entry| format!("{}:{}", entry.name, entry.count))
            .collect();
        assert_eq!(
            names,
            vec![
                "chatbots:2",
                "automation:2",
                "case-studies:1",
                "integration:1",
                "trends:2"
            ]
        );
    }

    #[test]
    fn builtin_case_studies_filter() {
        let catalog = builtin().expect("builtin catalog");
        let posts = catalog.by_category(&CategoryFilter::Category("case-studies".into()));
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "roi-of-business-process-automation-case-study");
    }

    #[test]
    fn empty_document_is_an_empty_catalog() {
        let catalog = parse_catalog("").expect("empty catalog");
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_document_reports_parse_error() {
        let result = parse_catalog("[[posts]]\nid = \"one\"\n");
        assert!(matches!(result, Err(DomainError::Parse { .. })));
    }
}
