use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("frontmatter deserialize error in {}: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },

    /// Two records resolve to the same route.
    #[error("duplicate slug `{slug}`: {} and {}", first.display(), second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// `/` is where the post index is written.
    #[error("`{slug}` from {} collides with the post index at /", path.display())]
    ReservedSlug { slug: String, path: PathBuf },

    #[error("failed to initialize templates: {0}")]
    Templates(#[source] tera::Error),

    #[error("template rendering failed for {template}: {source:?}")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },

    #[error("rss feed: {0}")]
    Feed(String),

    #[error("file watcher: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, SiteError>;
