// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Failures while building a server registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate method registration for path: {0}")]
    DuplicatePath(String),
}

/// Failures while encoding or decoding the response envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("response must be a JSON object, got: {0}")]
    NotAnObject(serde_json::Value),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by a [`Transport`](crate::Transport) implementation.
///
/// The client executor converts every variant into a typed
/// `Error(INTERNAL, ..)` response; these never reach callers as errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to reach {url}: {reason}")]
    Connection { url: String, reason: String },

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid transport configuration: {0}")]
    Config(String),
}
