use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tracing::{error, info};

use crate::contract::Extractor;
use crate::error::ExtractError;

/// Output template: `<playlist title>/<zero-padded index> - <truncated title>.<ext>`.
pub const OUTPUT_TEMPLATE: &str = "%(playlist_title)s/%(playlist_index)03d - %(title).200B.%(ext)s";

pub const AUDIO_FORMAT: &str = "mp3";

/// Runs `yt-dlp` for one playlist at a time.
#[derive(Debug, Clone)]
pub struct YtDlp {
    pub program: String,
    pub downloads_dir: PathBuf,
    pub archive: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<String>, downloads_dir: PathBuf, archive: PathBuf) -> Self {
        Self {
            program: program.into(),
            downloads_dir,
            archive,
        }
    }
}

/// Builds the fixed option set for one playlist.
///
/// Already-archived items are skipped, partial downloads resumed, audio
/// extracted at best quality with thumbnail and tags embedded, and an
/// `.info.json` sidecar plus thumbnail file written next to each track.
pub fn ytdlp_args(url: &str, downloads_dir: &Path, archive: &Path) -> Vec<String> {
    let output = downloads_dir.join(OUTPUT_TEMPLATE);
    vec![
        "--download-archive".to_string(),
        archive.display().to_string(),
        "--continue".to_string(),
        "--ignore-errors".to_string(),
        "--extract-audio".to_string(),
        "--audio-format".to_string(),
        AUDIO_FORMAT.to_string(),
        "--audio-quality".to_string(),
        "0".to_string(),
        "--embed-thumbnail".to_string(),
        "--add-metadata".to_string(),
        "--write-thumbnail".to_string(),
        "--write-info-json".to_string(),
        "-o".to_string(),
        output.display().to_string(),
        url.to_string(),
    ]
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract(&self, playlist_url: &str) -> Result<(), ExtractError> {
        let args = ytdlp_args(playlist_url, &self.downloads_dir, &self.archive);
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .map_err(|source| ExtractError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ExtractError::NonZeroExit {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Serialize)]
pub struct DownloadReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

/// Extracts every playlist in order. A failing playlist is logged and skipped.
pub async fn download_playlists<E>(extractor: &E, playlists: &[String]) -> DownloadReport
where
    E: Extractor + ?Sized,
{
    let mut report = DownloadReport::default();
    for url in playlists {
        info!(playlist = %url, "[DOWNLOAD] Extracting playlist");
        match extractor.extract(url).await {
            Ok(()) => {
                info!(playlist = %url, "[DOWNLOAD] Playlist extracted");
                report.succeeded.push(url.clone());
            }
            Err(e) => {
                error!(playlist = %url, error = %e, "[DOWNLOAD][ERROR] Extraction failed, continuing");
                report.failed.push(url.clone());
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_end_with_url_and_use_archive() {
        let args = ytdlp_args(
            "https://x/playlist1",
            Path::new("downloads"),
            Path::new("downloaded.txt"),
        );
        assert_eq!(args.last().map(String::as_str), Some("https://x/playlist1"));
        let pos = args.iter().position(|a| a == "--download-archive").unwrap();
        assert_eq!(args[pos + 1], "downloaded.txt");
        for flag in [
            "--continue",
            "--extract-audio",
            "--embed-thumbnail",
            "--add-metadata",
            "--write-info-json",
        ] {
            assert!(args.iter().any(|a| a == flag), "missing {flag}");
        }
    }

    #[test]
    fn output_template_is_rooted_in_downloads_dir() {
        let args = ytdlp_args("u", Path::new("downloads"), Path::new("a.txt"));
        let pos = args.iter().position(|a| a == "-o").unwrap();
        let expected = Path::new("downloads").join(OUTPUT_TEMPLATE);
        assert_eq!(args[pos + 1], expected.display().to_string());
        assert!(args[pos + 1].contains("%(playlist_index)03d"));
    }

    #[test]
    fn audio_format_is_mp3() {
        let args = ytdlp_args("u", Path::new("d"), Path::new("a"));
        let pos = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[pos + 1], "mp3");
    }
}
