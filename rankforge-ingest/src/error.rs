//! Top-level error type for the ingest binary. Each file's errors are
//! caught at the worker boundary and logged rather than propagated, so this
//! type only needs to describe what can fail for a single file.

use miette::Diagnostic;
use thiserror::Error;

use crate::storage::InMemoryError;

#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    #[error("couldn't read log file {path}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while parsing log lines in {path}")]
    Parse {
        path: String,
        #[source]
        source: rankforge_parser::ParseError,
    },

    #[error("failed to commit a match from {path}")]
    Commit {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("database connection pool error")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error(transparent)]
    Migration(#[from] rankforge_db::MigrationError),

    #[error(transparent)]
    Config(#[from] figment::Error),
}

impl From<InMemoryError> for IngestError {
    fn from(e: InMemoryError) -> Self {
        IngestError::Commit {
            path: String::new(),
            source: Box::new(e),
        }
    }
}
