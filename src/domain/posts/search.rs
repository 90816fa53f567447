use super::Post;

/// Case folding shared by search needles and every searched field.
pub fn normalize(value: &str) -> String {
    value.to_lowercase()
}

/// A normalized substring query over title, excerpt, content and tags.
///
/// The empty term matches every post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    needle: String,
}

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        Self {
            needle: normalize(raw),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, post: &Post) -> bool {
        if self.is_empty() {
            return true;
        }

        self.found_in(&post.title)
            || self.found_in(&post.excerpt)
            || self.found_in(&post.content)
            || post.tags.iter().any(|tag| self.found_in(tag))
    }

    fn found_in(&self, haystack: &str) -> bool {
        normalize(haystack).contains(&self.needle)
    }
}
