// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Client transport contract
//!
//! The core never performs socket I/O itself. A [`Transport`] posts an
//! [`RpcMessage`] to a URL and returns the peer's message; anything speaking
//! HTTP can implement it. Application outcomes, including typed errors,
//! always ride a successful HTTP exchange; a [`TransportError`] means the
//! exchange itself failed and surfaces to callers as `Error(INTERNAL, ..)`.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::TransportError;

/// One HTTP message: string-valued headers plus an opaque body.
#[derive(Debug, Clone, Default)]
pub struct RpcMessage {
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RpcMessage {
    pub fn new(headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self { headers, body }
    }
}

/// Minimal contract the client executor needs from an HTTP stack.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `message` to `url` and return the response message.
    async fn post(&self, url: &str, message: RpcMessage) -> Result<RpcMessage, TransportError>;
}
