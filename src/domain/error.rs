use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate post slug `{slug}`")]
    DuplicateSlug { slug: String },
    #[error("duplicate post id {id}")]
    DuplicateId { id: u32 },
    #[error("post `{slug}` has an empty category")]
    EmptyCategory { slug: String },
    #[error("post slug `{slug}` is not URL-safe")]
    InvalidSlug { slug: String },
    #[error("post catalog could not be parsed: {message}")]
    Parse { message: String },
}

impl DomainError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
