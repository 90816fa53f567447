use std::{fs, sync::Arc};

use tracing::info;

use crate::{
    application::error::AppError,
    config::ContentSettings,
    domain::posts::{self, PostCatalog},
};

/// Resolve the post catalog for this process: the configured file, else the builtin articles.
pub fn load_catalog(settings: &ContentSettings) -> Result<Arc<PostCatalog>, AppError> {
    let catalog = match settings.posts_file.as_ref() {
        Some(path) => {
            let source = fs::read_to_string(path).map_err(|err| {
                AppError::unexpected(format!(
                    "failed to read post catalog `{}`: {err}",
                    path.display()
                ))
            })?;
            Arc::new(posts::parse_catalog(&source)?)
        }
        None => posts::builtin()?,
    };

    info!(
        target = "yalors::content",
        posts = catalog.len(),
        source = settings
            .posts_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "builtin".to_string()),
        "post catalog loaded"
    );

    Ok(catalog)
}
