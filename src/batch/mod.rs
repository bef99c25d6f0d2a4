//! Per-identifier batch orchestration and JSON output framing.
//!
//! Identifiers are processed strictly sequentially; each failure is
//! recovered locally and appended as a failure record so the batch always
//! runs to completion. Only environment-level failures (reported by the
//! binary, not here) abort a run.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, warn};

use crate::failure::{ClassifiedError, ErrorKind, classify_message, classify_playability};
use crate::provider::{MetadataProvider, ProviderError};
use crate::resolve::{AudioTrackSummary, resolve_audio_tracks};
use crate::transcript::{TranscriptSummary, map_transcript};

/// Processing mode for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Resolve audio-track languages.
    Audio,
    /// Extract the transcript.
    Transcript,
}

impl RunMode {
    /// Fallback kind for thrown failures on this path.
    fn fallback_kind(self) -> ErrorKind {
        match self {
            Self::Audio => ErrorKind::Error,
            Self::Transcript => ErrorKind::Unknown,
        }
    }
}

/// How the batch result is framed on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFraming {
    /// One bare JSON object (exactly one identifier requested).
    Single,
    /// A JSON array of records.
    Array,
    /// One JSON object per line.
    Lines,
}

impl OutputFraming {
    /// Chooses the framing: the stream flag wins, otherwise a single
    /// requested identifier emits a bare object and anything else an array.
    #[must_use]
    pub fn select(stream_lines: bool, requested: usize) -> Self {
        if stream_lines {
            Self::Lines
        } else if requested == 1 {
            Self::Single
        } else {
            Self::Array
        }
    }
}

/// One per-identifier result record.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub video_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_tracks: Option<AudioTrackSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl ResultRecord {
    /// Successful audio-mode record.
    #[must_use]
    pub fn audio_success(
        video_id: &str,
        audio_tracks: AudioTrackSummary,
        http_status: Option<u16>,
    ) -> Self {
        Self {
            video_id: video_id.to_string(),
            ok: true,
            audio_tracks: Some(audio_tracks),
            transcript: None,
            error_type: None,
            error: None,
            http_status,
        }
    }

    /// Successful transcript-mode record.
    #[must_use]
    pub fn transcript_success(video_id: &str, transcript: TranscriptSummary) -> Self {
        Self {
            video_id: video_id.to_string(),
            ok: true,
            audio_tracks: None,
            transcript: Some(transcript),
            error_type: None,
            error: None,
            http_status: None,
        }
    }

    /// Per-identifier failure record.
    #[must_use]
    pub fn failure(video_id: &str, classified: ClassifiedError) -> Self {
        Self {
            video_id: video_id.to_string(),
            ok: false,
            audio_tracks: None,
            transcript: None,
            error_type: Some(classified.kind),
            error: Some(classified.message),
            http_status: classified.http_status,
        }
    }
}

/// Top-level record for failures without an identifier (environment-level
/// aborts and anything escaping per-identifier handling).
#[derive(Debug, Clone, Serialize)]
pub struct RunFailureRecord {
    pub ok: bool,
    pub error_type: ErrorKind,
    pub error: String,
}

impl From<ClassifiedError> for RunFailureRecord {
    fn from(classified: ClassifiedError) -> Self {
        Self {
            ok: false,
            error_type: classified.kind,
            error: classified.message,
        }
    }
}

/// Shape check for platform video identifiers (11 chars of
/// `[0-9A-Za-z_-]`).
#[must_use]
pub fn is_valid_video_id(video_id: &str) -> bool {
    video_id.len() == 11
        && video_id
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}

/// Processes identifiers sequentially, recovering every per-identifier
/// failure into a record.
pub async fn run_batch(
    provider: &dyn MetadataProvider,
    video_ids: &[String],
    mode: RunMode,
) -> Vec<ResultRecord> {
    let mut results = Vec::with_capacity(video_ids.len());
    for video_id in video_ids {
        let record = process_one(provider, video_id, mode).await;
        if !record.ok {
            warn!(
                video_id = %video_id,
                error_type = %record.error_type.unwrap_or(ErrorKind::Error),
                "identifier failed"
            );
        }
        results.push(record);
    }
    results
}

async fn process_one(
    provider: &dyn MetadataProvider,
    video_id: &str,
    mode: RunMode,
) -> ResultRecord {
    if video_id.trim().is_empty() {
        return ResultRecord::failure(
            video_id,
            ClassifiedError::new(ErrorKind::Invalid, "missing_video_id"),
        );
    }
    if !is_valid_video_id(video_id) {
        return ResultRecord::failure(
            video_id,
            ClassifiedError::new(ErrorKind::Invalid, "invalid_video_id"),
        );
    }

    match mode {
        RunMode::Audio => process_audio(provider, video_id).await,
        RunMode::Transcript => process_transcript(provider, video_id).await,
    }
}

async fn process_audio(provider: &dyn MetadataProvider, video_id: &str) -> ResultRecord {
    let fetch = match provider.fetch_player(video_id).await {
        Ok(fetch) => fetch,
        Err(error) => {
            return ResultRecord::failure(
                video_id,
                classify_provider_error(&error, RunMode::Audio.fallback_kind()),
            );
        }
    };

    let signal = fetch.document.playability_signal(fetch.http_status);
    if let Some(classified) = classify_playability(&signal) {
        return ResultRecord::failure(video_id, classified);
    }

    let summary = resolve_audio_tracks(
        &fetch.document,
        provider.language_strategy(),
        provider.name(),
    );
    debug!(
        video_id,
        languages = summary.languages_all.len(),
        has_auto_dub = summary.has_auto_dub.as_str(),
        "resolved audio tracks"
    );
    ResultRecord::audio_success(video_id, summary, fetch.http_status)
}

async fn process_transcript(provider: &dyn MetadataProvider, video_id: &str) -> ResultRecord {
    let fallback = RunMode::Transcript.fallback_kind();

    let fetch = match provider.fetch_player(video_id).await {
        Ok(fetch) => fetch,
        Err(error) => {
            return ResultRecord::failure(video_id, classify_provider_error(&error, fallback));
        }
    };
    let signal = fetch.document.playability_signal(fetch.http_status);
    if let Some(classified) = classify_playability(&signal) {
        return ResultRecord::failure(video_id, classified);
    }

    match provider.fetch_transcript(video_id).await {
        Ok(transcript) => {
            let summary = map_transcript(&fetch.document, transcript);
            ResultRecord::transcript_success(video_id, summary)
        }
        Err(error) => {
            ResultRecord::failure(video_id, classify_provider_error(&error, fallback))
        }
    }
}

fn classify_provider_error(error: &ProviderError, fallback: ErrorKind) -> ClassifiedError {
    match error {
        ProviderError::Missing { .. } => {
            ClassifiedError::new(ErrorKind::ProviderMissing, error.to_string())
        }
        other => classify_message(&other.to_string(), fallback),
    }
}

/// Writes records to `out` in the chosen framing, ending with a newline.
///
/// # Errors
///
/// Returns an I/O error when the writer fails (serialization of records
/// cannot fail).
pub fn write_results(
    out: &mut impl Write,
    results: &[ResultRecord],
    framing: OutputFraming,
) -> std::io::Result<()> {
    match framing {
        OutputFraming::Lines => {
            for record in results {
                serde_json::to_writer(&mut *out, record).map_err(std::io::Error::other)?;
                out.write_all(b"\n")?;
            }
        }
        OutputFraming::Single => {
            if let Some(record) = results.first() {
                serde_json::to_writer(&mut *out, record).map_err(std::io::Error::other)?;
                out.write_all(b"\n")?;
            }
        }
        OutputFraming::Array => {
            serde_json::to_writer(&mut *out, results).map_err(std::io::Error::other)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
