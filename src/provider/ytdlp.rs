//! yt-dlp subprocess provider.
//!
//! Shells out to `yt-dlp -J` and adapts its JSON into the same metadata
//! document the resolver already understands: formats carrying a real audio
//! codec become audio-mime adaptive formats, the top-level language hints
//! become the microformat default. The adapted document has no track ids
//! and no auto-dub flags, so resolution lands in the bare-format fallback
//! tier: every discovered language counts as non-auto and the auto-dub
//! flag stays unknown.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::metadata::{
    AdaptiveFormat, MetadataDocument, Microformat, MicroformatRenderer, StreamingData,
};
use crate::resolve::LanguageStrategy;
use crate::transcript::TranscriptDocument;

use super::{MetadataProvider, PlayerFetch, ProviderError};

const DEFAULT_COMMAND: &str = "yt-dlp";

/// Subprocess-backed provider wrapping the yt-dlp extractor.
pub struct YtDlpProvider {
    command: PathBuf,
    cookies_path: Option<PathBuf>,
}

impl YtDlpProvider {
    /// Creates a provider, resolving the executable up front so a missing
    /// dependency surfaces before any identifier is processed.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Missing`] when the executable cannot be
    /// found on `PATH` (or at the explicitly given location).
    pub fn new(
        command: Option<PathBuf>,
        cookies_path: Option<PathBuf>,
    ) -> Result<Self, ProviderError> {
        let command = command.unwrap_or_else(|| PathBuf::from(DEFAULT_COMMAND));
        let resolved = resolve_command(&command).ok_or_else(|| ProviderError::Missing {
            name: command.display().to_string(),
        })?;
        debug!(command = %resolved.display(), "resolved yt-dlp executable");
        Ok(Self {
            command: resolved,
            cookies_path,
        })
    }
}

/// Locates an executable: explicit paths are checked directly, bare names
/// are searched on `PATH`.
fn resolve_command(command: &Path) -> Option<PathBuf> {
    if command.components().count() > 1 {
        return command.is_file().then(|| command.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}

#[async_trait]
impl MetadataProvider for YtDlpProvider {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn language_strategy(&self) -> Option<&dyn LanguageStrategy> {
        None
    }

    #[instrument(skip(self), fields(provider = "yt-dlp"))]
    async fn fetch_player(&self, video_id: &str) -> Result<PlayerFetch, ProviderError> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        let mut command = Command::new(&self.command);
        command
            .arg("-J")
            .arg("--no-playlist")
            .arg("--skip-download")
            .arg(&watch_url);
        if let Some(cookies) = &self.cookies_path {
            command.arg("--cookies").arg(cookies);
        }

        let output = command.output().await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ProviderError::Missing {
                    name: self.command.display().to_string(),
                }
            } else {
                ProviderError::Spawn {
                    command: self.command.display().to_string(),
                    source,
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let diagnostics = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            let message = if diagnostics.is_empty() {
                "yt-dlp failed".to_string()
            } else {
                diagnostics.to_string()
            };
            return Err(ProviderError::Subprocess { message });
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        let info: YtDlpInfo = serde_json::from_str(raw)?;

        Ok(PlayerFetch {
            document: adapt_ytdlp_document(info),
            http_status: None,
        })
    }

    async fn fetch_transcript(
        &self,
        _video_id: &str,
    ) -> Result<TranscriptDocument, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: "yt-dlp",
            operation: "transcript fetching",
        })
    }
}

/// Subset of the yt-dlp `-J` dump the adapter consumes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct YtDlpInfo {
    pub formats: Vec<YtDlpFormat>,
    pub language: Option<String>,
    pub default_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct YtDlpFormat {
    pub acodec: Option<String>,
    pub language: Option<String>,
    pub audio_ext: Option<String>,
    pub audio_track: Option<YtDlpAudioTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct YtDlpAudioTrack {
    pub language: Option<String>,
}

impl YtDlpFormat {
    fn has_audio(&self) -> bool {
        self.acodec
            .as_deref()
            .is_some_and(|codec| !codec.is_empty() && codec != "none")
    }

    fn language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .filter(|lang| !lang.is_empty())
            .or_else(|| {
                self.audio_track
                    .as_ref()
                    .and_then(|track| track.language.as_deref())
                    .filter(|lang| !lang.is_empty())
            })
    }
}

/// Adapts a yt-dlp info dump into the resolver's document shape.
#[must_use]
pub fn adapt_ytdlp_document(info: YtDlpInfo) -> MetadataDocument {
    let adaptive_formats = info
        .formats
        .iter()
        .filter(|format| format.has_audio())
        .map(|format| AdaptiveFormat {
            mime_type: Some(format!(
                "audio/{}",
                format.audio_ext.as_deref().filter(|ext| !ext.is_empty()).unwrap_or("mp4")
            )),
            language: format.language().map(ToString::to_string),
            audio_track: None,
        })
        .collect();

    let default_audio_language = info
        .language
        .filter(|lang| !lang.is_empty())
        .or(info.default_language)
        .filter(|lang| !lang.is_empty());

    MetadataDocument {
        streaming_data: Some(StreamingData { adaptive_formats }),
        microformat: Some(Microformat {
            player_microformat_renderer: Some(MicroformatRenderer {
                default_audio_language,
                default_language: None,
            }),
        }),
        ..MetadataDocument::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resolve::{AutoDub, resolve_audio_tracks};

    fn info(value: serde_json::Value) -> YtDlpInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_adapter_keeps_only_audio_formats() {
        let adapted = adapt_ytdlp_document(info(serde_json::json!({
            "formats": [
                {"acodec": "opus", "language": "en", "audio_ext": "webm"},
                {"acodec": "none", "language": "xx"},
                {"vcodec": "av01"},
                {"acodec": "mp4a.40.2", "audio_track": {"language": "es"}}
            ]
        })));
        let formats = adapted.adaptive_formats();
        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].mime_type.as_deref(), Some("audio/webm"));
        assert_eq!(formats[0].language.as_deref(), Some("en"));
        assert_eq!(formats[1].mime_type.as_deref(), Some("audio/mp4"));
        assert_eq!(formats[1].language.as_deref(), Some("es"));
    }

    #[test]
    fn test_adapter_maps_default_language_chain() {
        let adapted = adapt_ytdlp_document(info(serde_json::json!({
            "default_language": "fr"
        })));
        assert_eq!(adapted.default_language(), "fr");

        let preferred = adapt_ytdlp_document(info(serde_json::json!({
            "language": "de",
            "default_language": "fr"
        })));
        assert_eq!(preferred.default_language(), "de");
    }

    #[test]
    fn test_adapted_document_resolves_all_non_auto() {
        let adapted = adapt_ytdlp_document(info(serde_json::json!({
            "language": "en",
            "formats": [
                {"acodec": "opus", "language": "en"},
                {"acodec": "opus", "language": "es"},
                {"acodec": "opus", "language": "en"}
            ]
        })));
        let summary = resolve_audio_tracks(&adapted, None, "yt-dlp");
        assert_eq!(summary.languages_all.as_slice(), ["en", "es"]);
        assert_eq!(summary.languages_non_auto.as_slice(), ["en", "es"]);
        assert_eq!(summary.has_auto_dub, AutoDub::Unknown);
        assert_eq!(summary.default_audio_language, "en");
    }

    #[test]
    fn test_missing_executable_is_reported_at_construction() {
        let error = YtDlpProvider::new(
            Some(PathBuf::from("/definitely/not/here/yt-dlp")),
            None,
        )
        .err()
        .unwrap();
        assert!(matches!(error, ProviderError::Missing { .. }));
    }

    #[test]
    fn test_resolve_command_explicit_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let resolved = resolve_command(file.path()).unwrap();
        assert_eq!(resolved, file.path());
    }
}
