// Error types for the todo store

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, TodoError>;

/// Failures surfaced by the store, the config loader and the renderer.
///
/// An ordinal that matches no task is not an error and has no variant here.
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("{context}: {source}")]
    File {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Database {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{0}")]
    Validation(String),

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl TodoError {
    pub fn file(context: impl Into<String>, source: io::Error) -> Self {
        Self::File {
            context: context.into(),
            source,
        }
    }

    pub fn database(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database {
            context: context.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Attach a context message to io and sqlite results, mirroring `eyre::Context`.
pub(crate) trait ResultExt<T> {
    fn file_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, io::Error> {
    fn file_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TodoError::file(context, e))
    }
}

pub(crate) trait DbResultExt<T> {
    fn db_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> DbResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TodoError::database(context, e))
    }
}
