//! Metadata providers: opaque collaborators that fetch a player document
//! (and optionally a transcript) for a video identifier.
//!
//! The orchestrator only sees the [`MetadataProvider`] trait; each
//! implementation declares its provenance tag and the language-extraction
//! strategy matching its document shape, so one resolver serves them all.

mod http_client;
mod innertube;
mod ytdlp;

pub use innertube::{DEFAULT_CLIENT_NAME, InnertubeProvider};
pub use ytdlp::{YtDlpAudioTrack, YtDlpFormat, YtDlpInfo, YtDlpProvider, adapt_ytdlp_document};

use async_trait::async_trait;

use crate::metadata::MetadataDocument;
use crate::resolve::LanguageStrategy;
use crate::transcript::TranscriptDocument;

/// A fetched player document plus the transport status that carried it.
#[derive(Debug)]
pub struct PlayerFetch {
    pub document: MetadataDocument,
    /// HTTP status, when the provider went over HTTP.
    pub http_status: Option<u16>,
}

/// Errors surfaced by provider implementations.
///
/// [`ProviderError::Missing`] is special-cased by callers (it maps to the
/// `provider_missing` kind); every other variant is classified from its
/// message text.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider's executable dependency is not available.
    #[error("{name} not found on PATH")]
    Missing {
        /// Name of the missing executable.
        name: String,
    },

    /// HTTP client construction failed.
    #[error("HTTP client construction failed: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    /// Provider endpoint URL could not be constructed.
    #[error("invalid provider endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Network-level failure calling a provider endpoint.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-JSON payload. The message carries
    /// the transport status so throttling pages still classify correctly.
    #[error("non-JSON payload from {endpoint} (status code {http_status}): {source}")]
    Decode {
        endpoint: String,
        http_status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The payload did not match the expected document shape.
    #[error("unexpected payload shape: {source}")]
    Payload {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to spawn the provider subprocess.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The provider subprocess exited unsuccessfully.
    #[error("{message}")]
    Subprocess {
        /// Raw subprocess diagnostics, kept verbatim for classification.
        message: String,
    },

    /// The provider produced no payload at all.
    #[error("empty provider response")]
    EmptyResponse,

    /// The video has no transcript to fetch.
    #[error("transcript unavailable for this video")]
    TranscriptUnavailable,

    /// The provider does not implement the requested operation.
    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },
}

/// An upstream metadata source for one video identifier.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Provenance tag recorded in output (`source` field).
    fn name(&self) -> &'static str;

    /// Strategy matching this provider's track-id encoding, when it has one.
    fn language_strategy(&self) -> Option<&dyn LanguageStrategy>;

    /// Fetches the player-metadata document for `video_id`.
    async fn fetch_player(&self, video_id: &str) -> Result<PlayerFetch, ProviderError>;

    /// Fetches the transcript for `video_id`.
    async fn fetch_transcript(&self, video_id: &str)
    -> Result<TranscriptDocument, ProviderError>;
}
