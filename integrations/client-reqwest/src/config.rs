// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use duration_str::deserialize_option_duration;
use serde::{Deserialize, Serialize};

use krpc_runtime::TransportError;

/// Configuration for the reqwest-backed transport.
///
/// All fields are optional; the defaults are reqwest's. Durations accept
/// human-readable strings such as `"30s"` or `"500ms"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpClientConfig {
    /// Total per-request timeout
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,

    /// Timeout for establishing the connection
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub connect_timeout: Option<Duration>,

    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl HttpClientConfig {
    /// Build a reqwest client from this configuration.
    pub fn to_client(&self) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_durations() {
        let config: HttpClientConfig =
            serde_json::from_str(r#"{"timeout": "30s", "connect_timeout": "500ms"}"#).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(500)));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<HttpClientConfig>(r#"{"nope": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_builds() {
        let config = HttpClientConfig::default();
        assert!(config.to_client().is_ok());
    }
}
