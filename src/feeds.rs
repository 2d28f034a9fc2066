//! Boundary with the external feed generator.
//!
//! The generator reads the downloads tree and writes one `feed-<slug>.xml`
//! per playlist folder into [`FeedParams::work_dir`]. The slug may be empty.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{error, info};

use crate::contract::{FeedGenerator, FeedParams};
use crate::error::FeedError;

pub const FEED_PREFIX: &str = "feed-";
pub const FEED_SUFFIX: &str = ".xml";

/// Whether a file name follows the generator's output naming.
pub fn is_feed_file_name(name: &str) -> bool {
    name.starts_with(FEED_PREFIX) && name.ends_with(FEED_SUFFIX)
}

/// Runs a generator command such as `python3 generate-rss.py`.
#[derive(Debug, Clone)]
pub struct ScriptFeedGenerator {
    command: Vec<String>,
}

impl ScriptFeedGenerator {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

/// Arguments appended to the generator command.
pub fn generator_args(params: &FeedParams) -> Vec<String> {
    vec![
        "--downloads-dir".to_string(),
        params.downloads_dir.display().to_string(),
        "--r2-account".to_string(),
        params.account_id.clone(),
        "--r2-bucket".to_string(),
        params.bucket.clone(),
        "--rss-base".to_string(),
        params.base_url.clone(),
    ]
}

#[async_trait]
impl FeedGenerator for ScriptFeedGenerator {
    async fn generate(&self, params: &FeedParams) -> Result<(), FeedError> {
        let (program, base_args) = self.command.split_first().ok_or(FeedError::EmptyCommand)?;

        let status = Command::new(program)
            .current_dir(&params.work_dir)
            .args(base_args)
            .args(generator_args(params))
            .status()
            .await
            .map_err(|source| FeedError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(FeedError::NonZeroExit(status.to_string()));
        }
        Ok(())
    }
}

/// Invokes the generator; failure is logged and reported as `false`.
pub async fn generate_feeds<G>(generator: &G, params: &FeedParams) -> bool
where
    G: FeedGenerator + ?Sized,
{
    info!(
        downloads_dir = %params.downloads_dir.display(),
        custom_base = !params.base_url.is_empty(),
        "[FEEDS] Generating feeds"
    );
    match generator.generate(params).await {
        Ok(()) => {
            info!("[FEEDS] Feed generation finished");
            true
        }
        Err(e) => {
            error!(error = %e, "[FEEDS][ERROR] Feed generation failed, continuing");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn feed_file_names() {
        assert!(is_feed_file_name("feed-my-show.xml"));
        assert!(is_feed_file_name("feed-.xml"));
        assert!(!is_feed_file_name("feed.xml"));
        assert!(!is_feed_file_name("my-show.xml"));
        assert!(!is_feed_file_name("feed-my-show.xml.bak"));
    }

    #[test]
    fn args_pass_all_four_parameters() {
        let params = FeedParams {
            work_dir: PathBuf::from("."),
            downloads_dir: PathBuf::from("downloads"),
            account_id: "acct".to_string(),
            bucket: "pods".to_string(),
            base_url: String::new(),
        };
        assert_eq!(
            generator_args(&params),
            vec![
                "--downloads-dir",
                "downloads",
                "--r2-account",
                "acct",
                "--r2-bucket",
                "pods",
                "--rss-base",
                ""
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn generator_writes_into_work_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = ScriptFeedGenerator::new(vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo '<rss/>' > feed-from-script.xml".to_string(),
            "sh".to_string(),
        ]);
        let params = FeedParams {
            work_dir: tmp.path().to_path_buf(),
            downloads_dir: PathBuf::from("downloads"),
            account_id: "a".to_string(),
            bucket: "b".to_string(),
            base_url: String::new(),
        };

        generator.generate(&params).await.unwrap();

        assert!(tmp.path().join("feed-from-script.xml").is_file());
    }

    #[tokio::test]
    async fn empty_command_is_an_error() {
        let generator = ScriptFeedGenerator::new(Vec::new());
        let params = FeedParams {
            work_dir: PathBuf::from("."),
            downloads_dir: PathBuf::from("downloads"),
            account_id: "a".to_string(),
            bucket: "b".to_string(),
            base_url: String::new(),
        };
        assert!(matches!(
            generator.generate(&params).await,
            Err(FeedError::EmptyCommand)
        ));
    }
}
