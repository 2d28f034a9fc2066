use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything a run needs, resolved from the environment by
/// [`crate::load_config::load_config`].
#[derive(Clone)]
pub struct SyncConfig {
    pub storage: StorageConfig,
    pub playlists: Vec<String>,
    /// Base URL for feed enclosures. Empty means the storage endpoint is used.
    pub rss_base_url: String,
    pub downloads_dir: PathBuf,
    pub download_archive: PathBuf,
    pub feeds_dir: PathBuf,
    pub ytdlp_bin: String,
    pub feed_generator: Vec<String>,
    pub publish: PublishConfig,
}

/// S3-compatible bucket credentials and addressing.
#[derive(Clone)]
pub struct StorageConfig {
    pub account_id: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint_url: String,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Set when running on CI; enables the git steps.
    pub ci: bool,
    pub worktree: PathBuf,
    pub branch: String,
}

impl SyncConfig {
    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.storage.bucket,
            endpoint = %self.storage.endpoint_url,
            playlists = self.playlists.len(),
            downloads_dir = %self.downloads_dir.display(),
            feeds_dir = %self.feeds_dir.display(),
            ci = self.publish.ci,
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("storage", &self.storage)
            .field("playlists", &self.playlists)
            .field("rss_base_url", &self.rss_base_url)
            .field("downloads_dir", &self.downloads_dir)
            .field("download_archive", &self.download_archive)
            .field("feeds_dir", &self.feeds_dir)
            .field("ytdlp_bin", &self.ytdlp_bin)
            .field("feed_generator", &self.feed_generator)
            .field("publish", &self.publish)
            .finish()
    }
}

// Secrets never reach the logs.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("account_id", &self.account_id)
            .field("bucket", &self.bucket)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .finish()
    }
}
