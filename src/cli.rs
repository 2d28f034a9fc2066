//! CLI glue for `pod-bucket`: argument parsing, collaborator wiring and the
//! async [`run`] entrypoint shared by `main` and the integration tests.
//!
//! Configuration is loaded before any stage runs. Only configuration errors
//! make [`run`] fail; stage failures are logged.
use crate::download::{download_playlists, YtDlp};
use crate::feeds::ScriptFeedGenerator;
use crate::load_config::load_config;
use crate::publish::GitCli;
use crate::storage::R2Store;
use crate::synchronise::{generate_and_publish, resolve, synchronise, Collaborators};
use crate::upload::upload_artifacts;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;

/// CLI for pod-bucket: mirror playlists into a bucket and publish podcast feeds.
#[derive(Parser)]
#[clap(
    name = "pod-bucket",
    version,
    about = "Download audio playlists, upload them to an S3-compatible bucket and publish RSS feeds"
)]
pub struct Cli {
    /// Stage to run; the full pipeline when omitted
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the full pipeline: download, upload, generate feeds, publish
    Sync,
    /// Only download the configured playlists
    Download,
    /// Only upload audio, images and metadata from the downloads directory
    Upload,
    /// Only generate feeds and publish them
    Publish,
}

pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = load_config().context("Failed to load configuration")?;
    config.trace_loaded();

    let work_dir = Path::new(".");
    let extractor = YtDlp::new(
        config.ytdlp_bin.clone(),
        config.downloads_dir.clone(),
        config.download_archive.clone(),
    );
    let feeds = ScriptFeedGenerator::new(config.feed_generator.clone());
    let git = GitCli;

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => {
            let store = R2Store::new(&config.storage);
            let deps = Collaborators {
                extractor: &extractor,
                store: &store,
                feeds: &feeds,
                git: &git,
            };
            let report = synchronise(&config, work_dir, deps).await;
            report.trace();
        }
        Commands::Download => {
            let report = download_playlists(&extractor, &config.playlists).await;
            tracing::info!(command = "download", ?report, "Download finished");
        }
        Commands::Upload => {
            let store = R2Store::new(&config.storage);
            let root = resolve(work_dir, &config.downloads_dir);
            let report = upload_artifacts(&store, &root).await;
            tracing::info!(command = "upload", ?report, "Upload finished");
        }
        Commands::Publish => {
            let (generated, report) = generate_and_publish(&config, work_dir, &feeds, &git).await;
            tracing::info!(command = "publish", generated, ?report, "Publish finished");
        }
    }

    Ok(())
}
