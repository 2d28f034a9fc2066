//! # contract: seams between the pipeline and the outside world
//!
//! Every external tool the pipeline drives sits behind one of these traits:
//!
//! - [`Extractor`]: the media extraction tool (one call per playlist URL)
//! - [`ObjectStore`]: the S3-compatible bucket (one call per file)
//! - [`FeedGenerator`]: the external feed generator (one call per run)
//! - [`Git`]: the publishing worktree (one call per git command)
//!
//! The traits are annotated for `mockall`, so tests can assert exactly which
//! calls were made and in which order.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{ExtractError, FeedError, GitError, StorageError};

/// Downloads one playlist into the downloads directory.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, playlist_url: &str) -> Result<(), ExtractError>;
}

/// Stores a local file under a remote key.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_file(&self, path: &Path, key: &str, content_type: &str)
        -> Result<(), StorageError>;
}

/// Parameters handed to the feed generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedParams {
    /// Directory the generator runs in and writes its feeds to.
    pub work_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub account_id: String,
    pub bucket: String,
    /// Empty means "use the storage endpoint".
    pub base_url: String,
}

/// Produces `feed-*.xml` files in [`FeedParams::work_dir`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FeedGenerator: Send + Sync {
    async fn generate(&self, params: &FeedParams) -> Result<(), FeedError>;
}

/// Runs one git command inside a worktree.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Git: Send + Sync {
    async fn run(&self, worktree: &Path, args: &[String]) -> Result<(), GitError>;
}
