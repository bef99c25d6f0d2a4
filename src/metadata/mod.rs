//! Serde model of the provider's player-metadata document.
//!
//! Only the subsections the resolver and classifier consume are modeled;
//! everything else in the provider payload is ignored on deserialize. The
//! document is read-only input: adapters may construct it, the resolver
//! never mutates it.

use std::borrow::Cow;

use serde::Deserialize;

use crate::failure::PlayabilitySignal;

/// One player-metadata document for a single video.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataDocument {
    /// Caption/audio track listings.
    pub captions: Option<Captions>,
    /// Adaptive stream formats.
    pub streaming_data: Option<StreamingData>,
    /// Default-language hints.
    pub microformat: Option<Microformat>,
    /// Playability outcome for the classifier.
    pub playability_status: Option<PlayabilityStatus>,
    /// Top-level error payload, present on some failure responses.
    pub error: Option<ResponseError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Captions {
    pub player_captions_tracklist_renderer: Option<CaptionsRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionsRenderer {
    /// Ordered caption tracks; referenced by index from audio tracks.
    pub caption_tracks: Vec<CaptionTrack>,
    /// Audio track entries; more than one means genuine multi-track audio.
    pub audio_tracks: Vec<AudioTrack>,
    /// Index of the default audio track, captions-level.
    pub default_audio_track_index: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionTrack {
    pub language_code: Option<String>,
    /// Display name, used to match a transcript's selected language back to
    /// a track.
    pub name: Option<Text>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioTrack {
    pub audio_track_id: Option<String>,
    pub caption_track_indices: Vec<i64>,
    pub default_caption_track_index: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamingData {
    pub adaptive_formats: Vec<AdaptiveFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveFormat {
    pub mime_type: Option<String>,
    pub language: Option<String>,
    pub audio_track: Option<FormatAudioTrack>,
}

impl AdaptiveFormat {
    /// Whether the format carries an audio payload.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.contains("audio/"))
    }

    /// The explicit language field, when present and non-empty.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|lang| !lang.is_empty())
    }
}

/// Per-format audio-track annotation.
///
/// `is_auto_dubbed` is optional so that presence is distinguishable from
/// absence: presence (either value) is what feeds the auto-dub index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatAudioTrack {
    pub audio_track_id: Option<String>,
    /// Alternate id field used by some document shapes.
    pub id: Option<String>,
    pub is_auto_dubbed: Option<bool>,
    pub display_name: Option<Text>,
}

impl FormatAudioTrack {
    /// Effective track id: `audioTrackId`, else `id`, non-empty only.
    #[must_use]
    pub fn track_id(&self) -> Option<&str> {
        self.audio_track_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.id.as_deref().filter(|id| !id.is_empty()))
    }

    /// Display-name text, when present and non-empty.
    #[must_use]
    pub fn display_name_text(&self) -> Option<Cow<'_, str>> {
        self.display_name
            .as_ref()
            .map(Text::text)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Microformat {
    pub player_microformat_renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MicroformatRenderer {
    pub default_audio_language: Option<String>,
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayabilityStatus {
    pub status: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseError {
    pub message: Option<String>,
}

/// A text node that may be a bare string, a `simpleText` renderer, or a
/// list of runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Text {
    Plain(String),
    Renderer {
        #[serde(rename = "simpleText")]
        simple_text: String,
    },
    Runs {
        runs: Vec<TextRun>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextRun {
    pub text: String,
}

impl Text {
    /// Flattens the node to its text content.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Plain(text) => Cow::Borrowed(text),
            Self::Renderer { simple_text } => Cow::Borrowed(simple_text),
            Self::Runs { runs } => Cow::Owned(
                runs.iter()
                    .map(|run| run.text.as_str())
                    .collect::<String>(),
            ),
        }
    }
}

impl MetadataDocument {
    fn captions_renderer(&self) -> Option<&CaptionsRenderer> {
        self.captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
    }

    /// Ordered caption tracks (empty when absent).
    #[must_use]
    pub fn caption_tracks(&self) -> &[CaptionTrack] {
        self.captions_renderer()
            .map_or(&[], |renderer| renderer.caption_tracks.as_slice())
    }

    /// Audio track entries (empty when absent).
    #[must_use]
    pub fn audio_tracks(&self) -> &[AudioTrack] {
        self.captions_renderer()
            .map_or(&[], |renderer| renderer.audio_tracks.as_slice())
    }

    /// Captions-level default audio track index, when present.
    #[must_use]
    pub fn default_audio_track_index(&self) -> Option<i64> {
        self.captions_renderer()
            .and_then(|renderer| renderer.default_audio_track_index)
    }

    /// Adaptive formats (empty when absent).
    #[must_use]
    pub fn adaptive_formats(&self) -> &[AdaptiveFormat] {
        self.streaming_data
            .as_ref()
            .map_or(&[], |data| data.adaptive_formats.as_slice())
    }

    /// Default audio language: `defaultAudioLanguage`, else
    /// `defaultLanguage`, else empty.
    #[must_use]
    pub fn default_language(&self) -> &str {
        let Some(renderer) = self
            .microformat
            .as_ref()
            .and_then(|m| m.player_microformat_renderer.as_ref())
        else {
            return "";
        };
        renderer
            .default_audio_language
            .as_deref()
            .filter(|lang| !lang.is_empty())
            .or_else(|| {
                renderer
                    .default_language
                    .as_deref()
                    .filter(|lang| !lang.is_empty())
            })
            .unwrap_or("")
    }

    /// Builds the classifier signal for this document.
    #[must_use]
    pub fn playability_signal(&self, http_status: Option<u16>) -> PlayabilitySignal<'_> {
        PlayabilitySignal {
            http_status,
            status: self
                .playability_status
                .as_ref()
                .and_then(|p| p.status.as_deref()),
            reason: self
                .playability_status
                .as_ref()
                .and_then(|p| p.reason.as_deref()),
            error_message: self.error.as_ref().and_then(|e| e.message.as_deref()),
        }
    }
}
