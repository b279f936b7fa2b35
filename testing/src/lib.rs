// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for krpc
//!
//! Provides common test message types and an in-process transport for
//! exercising a client and server pair without a network.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use krpc_runtime::{Channel, RpcMessage, Server, Transport, TransportError};

/// Simple request message for testing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestRequest {
    pub message: String,
    pub value: i32,
}

/// Simple response message for testing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestResponse {
    pub result: String,
    pub count: i32,
}

/// Transport that feeds requests straight into a [`Server`].
///
/// Use with a channel whose base URL is empty: the composed URL is then the
/// method path itself, which `post` hands to the dispatcher unchanged.
pub struct LocalTransport {
    server: Server,
}

impl LocalTransport {
    pub fn new(server: Server) -> Self {
        Self { server }
    }

    /// Channel base URL to pair this transport with
    pub fn base_url() -> &'static str {
        ""
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn post(&self, url: &str, message: RpcMessage) -> Result<RpcMessage, TransportError> {
        Ok(self
            .server
            .handle_request(url, &message.headers, &message.body)
            .await)
    }
}

/// Build a channel wired to `server` through a [`LocalTransport`].
pub fn local_channel(server: Server) -> Channel {
    Channel::new(
        Arc::new(LocalTransport::new(server)),
        LocalTransport::base_url(),
    )
}

/// Convenience for tests asserting on raw header maps.
pub fn headers(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}
