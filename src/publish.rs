//! Feed publisher: collects generated feeds and, on CI, pushes them to the
//! publishing branch.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::config::PublishConfig;
use crate::contract::Git;
use crate::error::{GitError, PublishError};
use crate::feeds::is_feed_file_name;

const BOT_NAME: &str = "github-actions[bot]";
const BOT_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// Shells out to the `git` binary inside the given worktree.
#[derive(Debug, Clone, Default)]
pub struct GitCli;

#[async_trait]
impl Git for GitCli {
    async fn run(&self, worktree: &Path, args: &[String]) -> Result<(), GitError> {
        let status = Command::new("git")
            .current_dir(worktree)
            .args(args)
            .status()
            .await?;

        if !status.success() {
            return Err(GitError::NonZeroExit {
                command: args.join(" "),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// `feed-*.xml` files directly inside `dir`, sorted by name.
pub fn collect_feed_files(dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let mut feeds = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PublishError::io(dir, e))? {
        let entry = entry.map_err(|e| PublishError::io(dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let matches = entry
            .file_name()
            .to_str()
            .map(is_feed_file_name)
            .unwrap_or(false);
        if is_file && matches {
            feeds.push(entry.path());
        }
    }
    feeds.sort();
    Ok(feeds)
}

/// Moves every feed in `from` into `to`, creating `to` first. Returns the new
/// paths. Having no feeds is not an error.
pub fn move_feeds(from: &Path, to: &Path) -> Result<Vec<PathBuf>, PublishError> {
    fs::create_dir_all(to).map_err(|e| PublishError::io(to, e))?;

    let mut moved = Vec::new();
    for feed in collect_feed_files(from)? {
        let Some(name) = feed.file_name() else {
            continue;
        };
        let target = to.join(name);
        move_file(&feed, &target)?;
        debug!(from = %feed.display(), to = %target.display(), "[PUBLISH] Moved feed");
        moved.push(target);
    }
    Ok(moved)
}

fn move_file(from: &Path, to: &Path) -> Result<(), PublishError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    fs::copy(from, to).map_err(|e| PublishError::io(to, e))?;
    fs::remove_file(from).map_err(|e| PublishError::io(from, e))
}

pub fn commit_message(now: DateTime<Utc>) -> String {
    format!("Update feeds {}", now.format("%Y-%m-%d %H:%M:%S UTC"))
}

#[derive(Debug, Default, Serialize)]
pub struct PublishReport {
    pub feeds: Vec<String>,
    pub committed: bool,
    pub pushed: bool,
}

/// Moves feeds from `work_dir` into `feeds_dir`, then publishes them through
/// `git` when `publish.ci` is set. Every failure is logged; none is fatal.
pub async fn publish_feeds<G>(
    work_dir: &Path,
    feeds_dir: &Path,
    publish: &PublishConfig,
    git: &G,
) -> PublishReport
where
    G: Git + ?Sized,
{
    let mut report = PublishReport::default();

    let moved = match move_feeds(work_dir, feeds_dir) {
        Ok(moved) => moved,
        Err(e) => {
            error!(error = %e, "[PUBLISH][ERROR] Failed to move feeds");
            return report;
        }
    };
    report.feeds = moved
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();

    if moved.is_empty() {
        warn!(dir = %work_dir.display(), "[PUBLISH] No feed files found");
    } else {
        info!(feeds = moved.len(), dir = %feeds_dir.display(), "[PUBLISH] Feeds moved to output directory");
    }

    if !publish.ci {
        info!("[PUBLISH] Not running on CI, skipping git publish");
        return report;
    }
    if moved.is_empty() {
        info!("[PUBLISH] No feeds to publish, skipping git publish");
        return report;
    }

    let worktree = publish.worktree.as_path();
    let branch = publish.branch.as_str();

    if let Err(e) = git.run(worktree, &args(&["checkout", branch])).await {
        debug!(error = %e, branch, "[PUBLISH] Branch checkout failed, creating it");
        if let Err(e) = git.run(worktree, &args(&["checkout", "-b", branch])).await {
            error!(error = %e, branch, "[PUBLISH][ERROR] Could not switch to publishing branch");
            return report;
        }
    }

    for feed in &moved {
        let Some(name) = feed.file_name() else {
            continue;
        };
        let target = worktree.join(name);
        if let Err(e) = fs::copy(feed, &target) {
            error!(error = %e, target = %target.display(), "[PUBLISH][ERROR] Failed to copy feed into worktree");
            return report;
        }
    }

    let mut add = args(&["add", "--"]);
    add.extend(report.feeds.iter().cloned());
    if let Err(e) = git.run(worktree, &add).await {
        error!(error = %e, "[PUBLISH][ERROR] Failed to stage feeds");
        return report;
    }

    let message = commit_message(Utc::now());
    let user_name = format!("user.name={BOT_NAME}");
    let user_email = format!("user.email={BOT_EMAIL}");
    let commit = args(&[
        "-c",
        user_name.as_str(),
        "-c",
        user_email.as_str(),
        "commit",
        "-m",
        message.as_str(),
    ]);
    match git.run(worktree, &commit).await {
        Ok(()) => report.committed = true,
        Err(e) => info!(error = %e, "[PUBLISH] Nothing committed"),
    }

    match git
        .run(worktree, &args(&["push", "--force", "origin", branch]))
        .await
    {
        Ok(()) => {
            info!(branch, "[PUBLISH] Feeds pushed");
            report.pushed = true;
        }
        Err(e) => error!(error = %e, branch, "[PUBLISH][ERROR] Push failed"),
    }

    report
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
