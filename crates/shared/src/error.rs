use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Message(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("malformed instance: {0}")]
    MalformedInstance(String),
    #[error("corpus instance missing at {0:?}")]
    MissingInstance(PathBuf),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to render plot: {0}")]
    Render(String),
}

impl AppError {
    /// Wrap an I/O error with a description of the operation that failed.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
