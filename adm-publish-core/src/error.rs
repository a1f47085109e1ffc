use std::path::PathBuf;

use thiserror::Error;

use crate::locate::SourceKind;

/// Every failure the publish pipeline can surface. None of these are retried;
/// the first one aborts the run.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid search pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("record {row} is missing field {field}")]
    MissingField { row: usize, field: &'static str },

    #[error("no {kind} file found under {}", .root.display())]
    SourceNotFound { kind: SourceKind, root: PathBuf },

    #[error("failed to serialize payload for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage rejected write to {bucket}/{key}: {message}")]
    Storage {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("version announcement failed: {0}")]
    Announcement(String),
}

pub type Result<T> = std::result::Result<T, PublishError>;
