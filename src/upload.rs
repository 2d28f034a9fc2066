//! Artifact uploader: walks the downloads tree and pushes files to the bucket.
//!
//! Two passes, audio first, then thumbnails and `.info.json` sidecars. Each
//! file's remote key mirrors its path under the downloads root, so re-running
//! over an unchanged tree overwrites the same objects.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::contract::ObjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Audio,
    Sidecar,
    Png,
    /// Any other image; stored as JPEG.
    Image,
}

impl ArtifactKind {
    /// Classifies a file by extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(Self::Audio),
            "json" => Some(Self::Sidecar),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "webp" => Some(Self::Image),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Audio => "audio/mpeg",
            Self::Sidecar => "application/json",
            Self::Png => "image/png",
            Self::Image => "image/jpeg",
        }
    }

    pub fn is_audio(self) -> bool {
        matches!(self, Self::Audio)
    }
}

/// Derives the remote key for `path`: leading `./` and the `root` prefix are
/// stripped and the remaining components joined with `/`.
pub fn object_key(path: &Path, root: &Path) -> String {
    let path = strip_cur_dir(path);
    let root = strip_cur_dir(root);
    let relative = path.strip_prefix(&root).unwrap_or(path.as_path());

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn strip_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub key: String,
    pub kind: ArtifactKind,
}

/// All uploadable files under `root`, sorted by path. Unreadable entries are
/// logged and skipped.
pub fn scan_artifacts(root: &Path) -> Vec<Artifact> {
    let mut artifacts: Vec<Artifact> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "[UPLOAD] Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let path = entry.into_path();
            let kind = ArtifactKind::from_path(&path)?;
            let key = object_key(&path, root);
            Some(Artifact { path, key, kind })
        })
        .collect();
    artifacts.sort_by(|a, b| a.path.cmp(&b.path));
    artifacts
}

#[derive(Debug, Default, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<String>,
}

impl UploadReport {
    fn merge(&mut self, other: UploadReport) {
        self.uploaded.extend(other.uploaded);
        self.failed.extend(other.failed);
    }
}

/// Uploads audio files, then images and sidecars.
pub async fn upload_artifacts<S>(store: &S, root: &Path) -> UploadReport
where
    S: ObjectStore + ?Sized,
{
    if !root.is_dir() {
        warn!(root = %root.display(), "[UPLOAD] Downloads directory missing, nothing to upload");
        return UploadReport::default();
    }

    let artifacts = scan_artifacts(root);
    let (audio, metadata): (Vec<_>, Vec<_>) =
        artifacts.into_iter().partition(|a| a.kind.is_audio());

    info!(files = audio.len(), "[UPLOAD] Uploading audio");
    let mut report = upload_each(store, &audio).await;

    info!(files = metadata.len(), "[UPLOAD] Uploading images and metadata");
    report.merge(upload_each(store, &metadata).await);

    report
}

async fn upload_each<S>(store: &S, artifacts: &[Artifact]) -> UploadReport
where
    S: ObjectStore + ?Sized,
{
    let mut report = UploadReport::default();
    for artifact in artifacts {
        let content_type = artifact.kind.content_type();
        debug!(path = %artifact.path.display(), key = %artifact.key, content_type, "[UPLOAD] Uploading file");
        match store
            .put_file(&artifact.path, &artifact.key, content_type)
            .await
        {
            Ok(()) => report.uploaded.push(artifact.key.clone()),
            Err(e) => {
                error!(key = %artifact.key, error = %e, "[UPLOAD][ERROR] Upload failed, continuing");
                report.failed.push(artifact.key.clone());
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type_for(path: &str) -> Option<&'static str> {
        ArtifactKind::from_path(Path::new(path)).map(ArtifactKind::content_type)
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("a/b.mp3"), Some("audio/mpeg"));
        assert_eq!(content_type_for("a/b.info.json"), Some("application/json"));
        assert_eq!(content_type_for("a/b.png"), Some("image/png"));
        assert_eq!(content_type_for("a/b.jpg"), Some("image/jpeg"));
        assert_eq!(content_type_for("a/b.jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_for("a/b.webp"), Some("image/jpeg"));
        assert_eq!(content_type_for("a/b.PNG"), Some("image/png"));
        assert_eq!(content_type_for("a/b.part"), None);
        assert_eq!(content_type_for("a/noext"), None);
    }

    #[test]
    fn key_strips_dot_slash_and_root() {
        assert_eq!(
            object_key(Path::new("./downloads/Show/001 - Episode.mp3"), Path::new("downloads")),
            "Show/001 - Episode.mp3"
        );
        assert_eq!(
            object_key(Path::new("downloads/Show/001 - Episode.jpg"), Path::new("./downloads")),
            "Show/001 - Episode.jpg"
        );
    }

    #[test]
    fn key_without_root_prefix_is_kept_relative() {
        assert_eq!(
            object_key(Path::new("./Show/x.mp3"), Path::new("downloads")),
            "Show/x.mp3"
        );
    }

    #[test]
    fn key_is_deterministic() {
        let p = Path::new("/tmp/dl/Show/001 - A.mp3");
        let root = Path::new("/tmp/dl");
        assert_eq!(object_key(p, root), object_key(p, root));
        assert_eq!(object_key(p, root), "Show/001 - A.mp3");
    }
}
