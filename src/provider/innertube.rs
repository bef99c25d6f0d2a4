//! InnerTube provider: player and transcript fetching over HTTP.
//!
//! Speaks the platform's internal JSON API directly: one `player` call per
//! identifier for audio-track resolution, plus a `next` + `get_transcript`
//! pair for transcript mode. Track ids in this document shape carry a
//! language prefix (`"de.3"`), so the dotted-prefix strategy applies.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use crate::metadata::Text;
use crate::resolve::{DottedPrefixStrategy, LanguageStrategy};
use crate::transcript::{TranscriptDocument, TranscriptSegment};

use super::http_client::build_provider_http_client;
use super::{MetadataProvider, PlayerFetch, ProviderError};

/// Default InnerTube client name sent with requests.
pub const DEFAULT_CLIENT_NAME: &str = "WEB";

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const PLAYER_PATH: &str = "youtubei/v1/player";
const NEXT_PATH: &str = "youtubei/v1/next";
const TRANSCRIPT_PATH: &str = "youtubei/v1/get_transcript";

/// Client versions paired with the names the API recognizes.
fn client_version(client_name: &str) -> &'static str {
    match client_name {
        "WEB_EMBEDDED" => "1.20250310.01.00",
        "ANDROID" => "19.09.37",
        _ => "2.20250312.04.00",
    }
}

/// HTTP-backed InnerTube metadata provider.
pub struct InnertubeProvider {
    http: Client,
    base_url: Url,
    client_name: String,
    cookie_header: String,
    strategy: DottedPrefixStrategy,
}

impl InnertubeProvider {
    /// Creates a provider for the given client name and cookie header
    /// (empty header means unauthenticated).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::ClientBuild`] when the HTTP client cannot
    /// be constructed.
    pub fn new(client_name: &str, cookie_header: String) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_provider_http_client()?,
            base_url: Url::parse(DEFAULT_BASE_URL)?,
            client_name: client_name.to_string(),
            cookie_header,
            strategy: DottedPrefixStrategy,
        })
    }

    /// Overrides the endpoint base URL (test hook).
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    fn request_context(&self) -> Value {
        json!({
            "client": {
                "clientName": self.client_name,
                "clientVersion": client_version(&self.client_name),
            }
        })
    }

    async fn execute(&self, path: &str, body: Value) -> Result<(u16, Value), ProviderError> {
        let endpoint = self.base_url.join(path)?;

        let mut request = self.http.post(endpoint).json(&body);
        if !self.cookie_header.is_empty() {
            request = request.header(header::COOKIE, &self.cookie_header);
        }

        let response = request.send().await.map_err(|source| ProviderError::Network {
            endpoint: path.to_string(),
            source,
        })?;
        let http_status = response.status().as_u16();
        let raw = response.text().await.map_err(|source| ProviderError::Network {
            endpoint: path.to_string(),
            source,
        })?;
        let payload: Value =
            serde_json::from_str(&raw).map_err(|source| ProviderError::Decode {
                endpoint: path.to_string(),
                http_status,
                source,
            })?;
        debug!(endpoint = path, http_status, "provider call completed");
        Ok((http_status, payload))
    }
}

#[async_trait]
impl MetadataProvider for InnertubeProvider {
    fn name(&self) -> &'static str {
        "innertube"
    }

    fn language_strategy(&self) -> Option<&dyn LanguageStrategy> {
        Some(&self.strategy)
    }

    #[instrument(skip(self), fields(provider = "innertube"))]
    async fn fetch_player(&self, video_id: &str) -> Result<PlayerFetch, ProviderError> {
        let body = json!({
            "context": self.request_context(),
            "videoId": video_id,
        });
        let (http_status, payload) = self.execute(PLAYER_PATH, body).await?;
        let document = serde_json::from_value(payload)?;
        Ok(PlayerFetch {
            document,
            http_status: Some(http_status),
        })
    }

    #[instrument(skip(self), fields(provider = "innertube"))]
    async fn fetch_transcript(
        &self,
        video_id: &str,
    ) -> Result<TranscriptDocument, ProviderError> {
        let body = json!({
            "context": self.request_context(),
            "videoId": video_id,
        });
        let (_, next_payload) = self.execute(NEXT_PATH, body).await?;
        let params = transcript_params(&next_payload)
            .ok_or(ProviderError::TranscriptUnavailable)?
            .to_string();

        let body = json!({
            "context": self.request_context(),
            "params": params,
        });
        let (_, transcript_payload) = self.execute(TRANSCRIPT_PATH, body).await?;

        Ok(TranscriptDocument {
            selected_language: selected_language(&transcript_payload).unwrap_or_default(),
            segments: parse_segments(&transcript_payload),
        })
    }
}

/// Depth-first search for the first value under `key` anywhere in the tree.
fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|child| find_key(child, key))
        }
        Value::Array(items) => items.iter().find_map(|child| find_key(child, key)),
        _ => None,
    }
}

/// Locates the transcript continuation token in a `next` response.
fn transcript_params(next_payload: &Value) -> Option<&str> {
    find_key(next_payload, "getTranscriptEndpoint")?
        .get("params")?
        .as_str()
        .filter(|params| !params.is_empty())
}

/// Millisecond fields arrive as strings in this document shape.
fn ms_field(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|raw| raw.parse().ok()))
}

fn snippet_text(value: &Value) -> String {
    serde_json::from_value::<Text>(value.clone())
        .map(|text| text.text().into_owned())
        .unwrap_or_default()
}

fn parse_segments(transcript_payload: &Value) -> Vec<TranscriptSegment> {
    let Some(initial) = find_key(transcript_payload, "initialSegments").and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    for item in initial {
        let Some(renderer) = item.get("transcriptSegmentRenderer") else {
            continue;
        };
        // Segments without a start are headers, not content.
        let Some(start_ms) = ms_field(renderer.get("startMs")) else {
            continue;
        };
        let end_ms = ms_field(renderer.get("endMs")).unwrap_or(start_ms);
        let text = renderer.get("snippet").map(snippet_text).unwrap_or_default();
        segments.push(TranscriptSegment {
            start_ms,
            end_ms,
            text,
        });
    }
    segments
}

/// The selected entry of the transcript panel's language menu.
fn selected_language(transcript_payload: &Value) -> Option<String> {
    let menu = find_key(transcript_payload, "sortFilterSubMenuRenderer")?;
    let items = menu.get("subMenuItems")?.as_array()?;
    items
        .iter()
        .find(|item| item.get("selected").and_then(Value::as_bool) == Some(true))
        .and_then(|item| item.get("title"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
