//! Error types for every stage of the pipeline.
//!
//! Only [`ConfigError`] is fatal. Everything else is reported per item and
//! logged by the stage that produced it.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is missing or empty")]
    Missing(&'static str),
}

/// Failure of the external extraction tool for a single playlist.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    NonZeroExit { program: String, status: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

impl StorageError {
    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed generator command is empty")]
    EmptyCommand,

    #[error("failed to launch feed generator {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("feed generator exited with {0}")]
    NonZeroExit(String),
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to launch git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} exited with {status}")]
    NonZeroExit { command: String, status: String },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
