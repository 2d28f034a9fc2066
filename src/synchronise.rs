//! High-level pipeline: download → upload → generate feeds → publish.
//!
//! Stages run strictly one after another and every per-item failure is
//! logged and skipped, so a run only fails when its configuration is invalid
//! (which happens before [`synchronise`] is reached).
//!
//! The external tools arrive as [`Collaborators`], which lets tests swap in
//! `mockall` mocks for any of them.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::SyncConfig;
use crate::contract::{Extractor, FeedGenerator, FeedParams, Git, ObjectStore};
use crate::download::{download_playlists, DownloadReport};
use crate::feeds::generate_feeds;
use crate::publish::{publish_feeds, PublishReport};
use crate::upload::{upload_artifacts, UploadReport};

pub struct Collaborators<'a, E: ?Sized, S: ?Sized, F: ?Sized, G: ?Sized> {
    pub extractor: &'a E,
    pub store: &'a S,
    pub feeds: &'a F,
    pub git: &'a G,
}

#[derive(Debug, Default, Serialize)]
pub struct SynchroniseReport {
    pub download: DownloadReport,
    pub upload: UploadReport,
    pub feeds_generated: bool,
    pub publish: PublishReport,
}

impl SynchroniseReport {
    pub fn trace(&self) {
        info!(
            playlists_ok = self.download.succeeded.len(),
            playlists_failed = self.download.failed.len(),
            uploaded = self.upload.uploaded.len(),
            upload_failed = self.upload.failed.len(),
            feeds_generated = self.feeds_generated,
            feeds = self.publish.feeds.len(),
            pushed = self.publish.pushed,
            "[SYNC] Run summary"
        );
        match serde_json::to_string_pretty(self) {
            Ok(json) => debug!(json = %json, "[SYNC][DEBUG] Report as JSON"),
            Err(e) => error!(error = ?e, "[SYNC][DEBUG] Failed to serialize report as JSON"),
        }
    }
}

/// Feed generator parameters for this run.
pub fn feed_params(config: &SyncConfig, work_dir: &Path) -> FeedParams {
    FeedParams {
        work_dir: work_dir.to_path_buf(),
        downloads_dir: config.downloads_dir.clone(),
        account_id: config.storage.account_id.clone(),
        bucket: config.storage.bucket.clone(),
        base_url: config.rss_base_url.clone(),
    }
}

/// Runs the feed generator and moves/publishes its output.
pub async fn generate_and_publish<F, G>(
    config: &SyncConfig,
    work_dir: &Path,
    feeds: &F,
    git: &G,
) -> (bool, PublishReport)
where
    F: FeedGenerator + ?Sized,
    G: Git + ?Sized,
{
    let generated = generate_feeds(feeds, &feed_params(config, work_dir)).await;
    let feeds_dir = resolve(work_dir, &config.feeds_dir);
    let publish = publish_feeds(work_dir, &feeds_dir, &config.publish, git).await;
    (generated, publish)
}

/// Full run. `work_dir` is where the feed generator writes its output.
pub async fn synchronise<E, S, F, G>(
    config: &SyncConfig,
    work_dir: &Path,
    deps: Collaborators<'_, E, S, F, G>,
) -> SynchroniseReport
where
    E: Extractor + ?Sized,
    S: ObjectStore + ?Sized,
    F: FeedGenerator + ?Sized,
    G: Git + ?Sized,
{
    info!(playlists = config.playlists.len(), "[SYNC] Starting full synchronisation pipeline");

    let download = download_playlists(deps.extractor, &config.playlists).await;
    info!(
        succeeded = download.succeeded.len(),
        failed = download.failed.len(),
        "[SYNC] Download stage finished"
    );

    let downloads_root = resolve(work_dir, &config.downloads_dir);
    let upload = upload_artifacts(deps.store, &downloads_root).await;
    info!(
        uploaded = upload.uploaded.len(),
        failed = upload.failed.len(),
        "[SYNC] Upload stage finished"
    );

    let (feeds_generated, publish) =
        generate_and_publish(config, work_dir, deps.feeds, deps.git).await;

    SynchroniseReport {
        download,
        upload,
        feeds_generated,
        publish,
    }
}

/// Joins relative config paths onto the working directory.
pub fn resolve(work_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        work_dir.join(path)
    }
}
