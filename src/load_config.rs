/// `load_config` module: resolves the run configuration from environment variables.
///
/// The environment is the only configuration source; a `.env` file is picked
/// up by `main` before this runs. Required values that are unset or empty
/// are fatal and reported by name.
///
/// Tests drive [`SyncConfig::from_lookup`] with a map instead of mutating the
/// process environment.
use crate::config::{PublishConfig, StorageConfig, SyncConfig};
use crate::error::ConfigError;
use std::path::PathBuf;
use tracing::{error, info};

pub const R2_ACCOUNT_ID: &str = "R2_ACCOUNT_ID";
pub const R2_BUCKET: &str = "R2_BUCKET";
pub const R2_ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
pub const R2_SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";
pub const PLAYLISTS: &str = "PLAYLISTS";

const DEFAULT_FEED_GENERATOR: &str = "python3 generate-rss.py";

/// Loads the configuration from the process environment.
pub fn load_config() -> Result<SyncConfig, ConfigError> {
    SyncConfig::from_lookup(|key| std::env::var(key).ok())
}

impl SyncConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| match optional(key) {
            Some(value) => Ok(value),
            None => {
                error!(var = key, "Required environment variable not set");
                Err(ConfigError::Missing(key))
            }
        };

        let account_id = required(R2_ACCOUNT_ID)?;
        let bucket = required(R2_BUCKET)?;
        let access_key_id = required(R2_ACCESS_KEY_ID)?;
        let secret_access_key = required(R2_SECRET_ACCESS_KEY)?;
        let playlists = parse_playlist_urls(&required(PLAYLISTS)?);
        if playlists.is_empty() {
            error!(var = PLAYLISTS, "Playlist list contains only blank lines");
            return Err(ConfigError::Missing(PLAYLISTS));
        }

        let endpoint_url = optional("R2_ENDPOINT_URL")
            .unwrap_or_else(|| format!("https://{account_id}.r2.cloudflarestorage.com"));
        let region = optional("R2_REGION").unwrap_or_else(|| "auto".to_string());

        let feed_generator = optional("FEED_GENERATOR")
            .unwrap_or_else(|| DEFAULT_FEED_GENERATOR.to_string())
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let publish = PublishConfig {
            ci: optional("GITHUB_ACTIONS").is_some(),
            worktree: optional("GITHUB_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            branch: optional("PUBLISH_BRANCH").unwrap_or_else(|| "gh-pages".to_string()),
        };

        let config = SyncConfig {
            storage: StorageConfig {
                account_id,
                bucket,
                access_key_id,
                secret_access_key,
                endpoint_url,
                region,
            },
            playlists,
            rss_base_url: lookup("RSS_BASE_URL").unwrap_or_default(),
            downloads_dir: PathBuf::from(
                optional("DOWNLOADS_DIR").unwrap_or_else(|| "downloads".to_string()),
            ),
            download_archive: PathBuf::from(
                optional("DOWNLOAD_ARCHIVE").unwrap_or_else(|| "downloaded.txt".to_string()),
            ),
            feeds_dir: PathBuf::from(optional("FEEDS_DIR").unwrap_or_else(|| "feeds".to_string())),
            ytdlp_bin: optional("YTDLP_BIN").unwrap_or_else(|| "yt-dlp".to_string()),
            feed_generator,
            publish,
        };

        info!(
            playlists = config.playlists.len(),
            "Config loaded from environment"
        );
        Ok(config)
    }
}

/// Splits a newline-separated list, dropping carriage returns and blank lines.
/// Order and duplicates are preserved.
pub fn parse_playlist_urls(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(|line| line.replace('\r', ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
