//! Transcript extraction: a direct field-to-field mapping.
//!
//! The only cross-referencing here is matching the transcript panel's
//! selected language (a display name) back to a caption track to recover
//! its language code.

use serde::Serialize;

use crate::metadata::MetadataDocument;

/// Raw transcript content as fetched from a provider.
#[derive(Debug, Clone, Default)]
pub struct TranscriptDocument {
    /// Display name of the language the panel had selected, may be empty.
    pub selected_language: String,
    /// Ordered transcript segments.
    pub segments: Vec<TranscriptSegment>,
}

/// One timed transcript segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptSegment {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
}

/// Transcript output record payload.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSummary {
    /// Display name of the transcript language.
    pub language: String,
    /// Language code recovered from the caption track list, may be empty.
    pub language_code: String,
    pub segments: Vec<TranscriptSegment>,
}

/// Maps a fetched transcript against the player document's caption tracks.
///
/// The language code comes from the caption track whose display name
/// matches the selected language; when nothing matches (or no language was
/// selected), the first caption track's code is used.
#[must_use]
pub fn map_transcript(doc: &MetadataDocument, transcript: TranscriptDocument) -> TranscriptSummary {
    let caption_tracks = doc.caption_tracks();

    let mut language_code = String::new();
    if !transcript.selected_language.is_empty() {
        let matched = caption_tracks.iter().find(|track| {
            track
                .name
                .as_ref()
                .is_some_and(|name| name.text() == transcript.selected_language)
        });
        if let Some(track) = matched {
            language_code = track.language_code.clone().unwrap_or_default();
        }
    }
    if language_code.is_empty() {
        if let Some(first) = caption_tracks.first() {
            language_code = first.language_code.clone().unwrap_or_default();
        }
    }

    TranscriptSummary {
        language: transcript.selected_language,
        language_code,
        segments: transcript.segments,
    }
}
