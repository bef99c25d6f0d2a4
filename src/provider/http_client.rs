//! Shared HTTP client construction policy for providers.
//!
//! Centralizes networking defaults so providers stay consistent on
//! timeouts, user-agent, and compression.

use std::time::Duration;

use reqwest::Client;

use super::ProviderError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Single shared user-agent for all provider traffic.
pub(crate) fn default_user_agent() -> String {
    format!("audioprobe/{}", env!("CARGO_PKG_VERSION"))
}

/// Builds a provider HTTP client using shared project policy.
pub(crate) fn build_provider_http_client() -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(default_user_agent())
        .gzip(true)
        .build()
        .map_err(|source| ProviderError::ClientBuild { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_carries_version() {
        let ua = default_user_agent();
        assert!(ua.starts_with("audioprobe/"));
        assert!(ua.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_build_provider_http_client_succeeds() {
        assert!(build_provider_http_client().is_ok());
    }
}
