//! Failure classification for per-identifier and run-level errors.
//!
//! Maps a raw failure signal — thrown message text, or a structured
//! playability status from a transport-successful response — onto a closed
//! set of error kinds, so a batch caller can distinguish provider
//! throttling, invalid input, authentication requirements, and genuine
//! platform unavailability.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of failure kinds emitted in result records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Identifier missing or malformed; no provider call was made.
    Invalid,
    /// A required provider backend is not available.
    ProviderMissing,
    /// The provider is throttling requests.
    RateLimit,
    /// The video requires an authenticated session.
    LoginRequired,
    /// The platform reports the video as unavailable.
    Unavailable,
    /// Unmatched failure while processing one identifier (audio path).
    Error,
    /// Unmatched failure while processing one identifier (transcript path).
    Unknown,
    /// Environment-level failure before any identifier was processed.
    InitError,
    /// A failure that escaped all per-identifier handling.
    Fatal,
}

impl ErrorKind {
    /// Stable wire name, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::ProviderMissing => "provider_missing",
            Self::RateLimit => "rate_limit",
            Self::LoginRequired => "login_required",
            Self::Unavailable => "unavailable",
            Self::Error => "error",
            Self::Unknown => "unknown",
            Self::InitError => "init_error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure, constructed once per failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedError {
    /// The failure kind.
    #[serde(rename = "error_type")]
    pub kind: ErrorKind,
    /// Human-readable message carried through from the signal.
    #[serde(rename = "error")]
    pub message: String,
    /// HTTP status observed on the transport, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl ClassifiedError {
    /// Creates a classified error without an HTTP status.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
        }
    }

    /// Attaches the HTTP status observed on the transport.
    #[must_use]
    pub fn with_http_status(mut self, http_status: Option<u16>) -> Self {
        self.http_status = http_status;
        self
    }
}

/// Throttling phrases. Checked before the invalid-id phrases when both
/// could match.
pub const RATE_LIMIT_TOKENS: [&str; 7] = [
    "rate limit",
    "too many requests",
    "http error 429",
    "status code 429",
    "temporarily blocked",
    "unusual traffic",
    "slow down",
];

/// Malformed-identifier phrases.
pub const INVALID_ID_TOKENS: [&str; 4] = [
    "invalid video id",
    "invalid url",
    "unsupported url",
    "not a valid url",
];

fn contains_any(message: &str, tokens: &[&str]) -> bool {
    let lower = message.to_lowercase();
    tokens.iter().any(|token| lower.contains(token))
}

/// Returns true when the message matches a known throttling phrase.
#[must_use]
pub fn is_rate_limit_message(message: &str) -> bool {
    contains_any(message, &RATE_LIMIT_TOKENS)
}

/// Returns true when the message matches a known malformed-identifier phrase.
#[must_use]
pub fn is_invalid_id_message(message: &str) -> bool {
    contains_any(message, &INVALID_ID_TOKENS)
}

/// Classifies a thrown failure message.
///
/// Throttling phrases win over invalid-id phrases; anything unmatched gets
/// `fallback` (the audio path uses [`ErrorKind::Error`], the transcript path
/// [`ErrorKind::Unknown`]).
#[must_use]
pub fn classify_message(message: &str, fallback: ErrorKind) -> ClassifiedError {
    let kind = if is_rate_limit_message(message) {
        ErrorKind::RateLimit
    } else if is_invalid_id_message(message) {
        ErrorKind::Invalid
    } else {
        fallback
    };
    ClassifiedError::new(kind, message)
}

/// Structured outcome of a transport-successful provider response.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayabilitySignal<'a> {
    /// HTTP status of the transport, when observed.
    pub http_status: Option<u16>,
    /// Playability status string (e.g. `OK`, `ERROR`, `LOGIN_REQUIRED`).
    pub status: Option<&'a str>,
    /// Human-readable reason accompanying a non-`OK` status.
    pub reason: Option<&'a str>,
    /// Top-level error message riding along on the response body.
    pub error_message: Option<&'a str>,
}

/// Classifies a transport-successful but business-unsuccessful response.
///
/// Returns `None` when the document is playable (status `OK` or absent).
/// Rule order: throttling (HTTP 429 or a throttling phrase in the message
/// or reason), then `LOGIN_REQUIRED`, then any other non-`OK` status as
/// `unavailable` with the reason (or the status itself when the reason is
/// empty).
#[must_use]
pub fn classify_playability(signal: &PlayabilitySignal<'_>) -> Option<ClassifiedError> {
    let error_message = signal.error_message.unwrap_or("");
    let reason = signal.reason.unwrap_or("");

    if signal.http_status == Some(429)
        || is_rate_limit_message(error_message)
        || is_rate_limit_message(reason)
    {
        let message = if error_message.is_empty() {
            "rate_limited"
        } else {
            error_message
        };
        return Some(
            ClassifiedError::new(ErrorKind::RateLimit, message)
                .with_http_status(signal.http_status),
        );
    }

    let status = signal.status.unwrap_or("");
    if status.is_empty() || status == "OK" {
        return None;
    }

    let classified = if status == "LOGIN_REQUIRED" {
        let message = if reason.is_empty() {
            "login_required"
        } else {
            reason
        };
        ClassifiedError::new(ErrorKind::LoginRequired, message)
    } else {
        let message = if reason.is_empty() { status } else { reason };
        ClassifiedError::new(ErrorKind::Unavailable, message)
    };
    Some(classified.with_http_status(signal.http_status))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_wire_names() {
        assert_eq!(ErrorKind::ProviderMissing.as_str(), "provider_missing");
        assert_eq!(ErrorKind::RateLimit.as_str(), "rate_limit");
        assert_eq!(ErrorKind::InitError.as_str(), "init_error");
        let json = serde_json::to_string(&ErrorKind::LoginRequired).unwrap();
        assert_eq!(json, "\"login_required\"");
    }

    #[test]
    fn test_classify_message_http_429_is_rate_limit() {
        let classified = classify_message(
            "Error: HTTP Error 429: Too Many Requests",
            ErrorKind::Error,
        );
        assert_eq!(classified.kind, ErrorKind::RateLimit);
    }

    #[test]
    fn test_classify_message_tokens_are_case_insensitive() {
        let classified = classify_message("TEMPORARILY BLOCKED by upstream", ErrorKind::Error);
        assert_eq!(classified.kind, ErrorKind::RateLimit);
    }

    #[test]
    fn test_classify_message_invalid_id() {
        let classified = classify_message("invalid video id: abc", ErrorKind::Error);
        assert_eq!(classified.kind, ErrorKind::Invalid);
    }

    #[test]
    fn test_classify_message_rate_limit_wins_over_invalid() {
        // Both token families match; throttling is checked first.
        let classified = classify_message(
            "invalid url rejected: too many requests",
            ErrorKind::Error,
        );
        assert_eq!(classified.kind, ErrorKind::RateLimit);
    }

    #[test]
    fn test_classify_message_falls_back_per_path() {
        assert_eq!(
            classify_message("socket closed", ErrorKind::Error).kind,
            ErrorKind::Error
        );
        assert_eq!(
            classify_message("socket closed", ErrorKind::Unknown).kind,
            ErrorKind::Unknown
        );
    }

    #[test]
    fn test_classify_playability_ok_is_none() {
        let signal = PlayabilitySignal {
            http_status: Some(200),
            status: Some("OK"),
            ..Default::default()
        };
        assert!(classify_playability(&signal).is_none());

        let absent = PlayabilitySignal {
            http_status: Some(200),
            ..Default::default()
        };
        assert!(classify_playability(&absent).is_none());
    }

    #[test]
    fn test_classify_playability_http_429() {
        let signal = PlayabilitySignal {
            http_status: Some(429),
            status: Some("OK"),
            ..Default::default()
        };
        let classified = classify_playability(&signal).unwrap();
        assert_eq!(classified.kind, ErrorKind::RateLimit);
        assert_eq!(classified.message, "rate_limited");
        assert_eq!(classified.http_status, Some(429));
    }

    #[test]
    fn test_classify_playability_rate_limit_message_without_429() {
        let signal = PlayabilitySignal {
            http_status: Some(200),
            error_message: Some("please slow down"),
            ..Default::default()
        };
        let classified = classify_playability(&signal).unwrap();
        assert_eq!(classified.kind, ErrorKind::RateLimit);
        assert_eq!(classified.message, "please slow down");
    }

    #[test]
    fn test_classify_playability_login_required() {
        let signal = PlayabilitySignal {
            http_status: Some(200),
            status: Some("LOGIN_REQUIRED"),
            ..Default::default()
        };
        let classified = classify_playability(&signal).unwrap();
        assert_eq!(classified.kind, ErrorKind::LoginRequired);
        assert_eq!(classified.message, "login_required");
    }

    #[test]
    fn test_classify_playability_login_required_keeps_reason() {
        let signal = PlayabilitySignal {
            status: Some("LOGIN_REQUIRED"),
            reason: Some("Sign in to confirm your age"),
            ..Default::default()
        };
        let classified = classify_playability(&signal).unwrap();
        assert_eq!(classified.kind, ErrorKind::LoginRequired);
        assert_eq!(classified.message, "Sign in to confirm your age");
    }

    #[test]
    fn test_classify_playability_unavailable_with_reason() {
        let signal = PlayabilitySignal {
            status: Some("ERROR"),
            reason: Some("Video unavailable"),
            ..Default::default()
        };
        let classified = classify_playability(&signal).unwrap();
        assert_eq!(classified.kind, ErrorKind::Unavailable);
        assert_eq!(classified.message, "Video unavailable");
    }

    #[test]
    fn test_classify_playability_unavailable_falls_back_to_status() {
        let signal = PlayabilitySignal {
            status: Some("UNPLAYABLE"),
            ..Default::default()
        };
        let classified = classify_playability(&signal).unwrap();
        assert_eq!(classified.kind, ErrorKind::Unavailable);
        assert_eq!(classified.message, "UNPLAYABLE");
    }

    #[test]
    fn test_classified_error_serializes_record_fields() {
        let classified = ClassifiedError::new(ErrorKind::Unavailable, "Video unavailable")
            .with_http_status(Some(200));
        let value = serde_json::to_value(&classified).unwrap();
        assert_eq!(value["error_type"], "unavailable");
        assert_eq!(value["error"], "Video unavailable");
        assert_eq!(value["http_status"], 200);
    }

    #[test]
    fn test_classified_error_omits_absent_http_status() {
        let classified = ClassifiedError::new(ErrorKind::Error, "boom");
        let json = serde_json::to_string(&classified).unwrap();
        assert!(!json.contains("http_status"));
    }
}
