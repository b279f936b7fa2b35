// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! reqwest-backed client transport for krpc
//!
//! Implements the runtime's [`Transport`] contract with a shared
//! [`reqwest::Client`]: one `application/json` POST per call, metadata
//! headers forwarded verbatim, response headers and body returned to the
//! executor. Infrastructure failures such as connection errors or
//! non-success HTTP statuses surface as [`TransportError`]s, which the
//! client executor converts to `INTERNAL` errors.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use krpc_runtime::{RpcMessage, Transport, TransportError};

mod config;
pub use config::HttpClientConfig;

/// [`Transport`] implementation over a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport with a default client
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport with a client built from `config`
    pub fn from_config(config: &HttpClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: config.to_client()?,
        })
    }

    /// Transport reusing an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, url: &str, message: RpcMessage) -> Result<RpcMessage, TransportError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in &message.headers {
            request = request.header(name, value);
        }

        let response = request
            .body(message.body)
            .send()
            .await
            .map_err(|e| TransportError::Connection {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, %status, "non-success HTTP status");
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_vec();

        Ok(RpcMessage::new(headers, body))
    }
}
