// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Typed call results
//!
//! Every unary call resolves to a [`Response`]: either a success carrying the
//! method's result, or an error carrying a [`ErrorCode`], a message and
//! optional typed details. Exactly one variant is ever populated; the
//! metadata rides outside the wire body (see [`crate::codec`]).

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// Error codes a call can resolve to.
///
/// The core itself only ever produces `InvalidArgument`, `Unimplemented` and
/// `Internal`; the remaining codes are reserved for handlers and
/// interceptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or empty call target
    InvalidArgument,
    /// Some requested entity was not found
    NotFound,
    /// Trapped failure on either side of the call
    Internal,
    /// The request does not have valid authentication credentials
    Unauthenticated,
    /// The caller does not have permission for this method
    PermissionDenied,
    /// No handler is registered for the requested path
    Unimplemented,
}

impl ErrorCode {
    /// Wire name of this code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::Unimplemented => "UNIMPLEMENTED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a unary call.
///
/// `T` is the success payload, `E` the type of the optional error details.
/// Both variants carry [`Metadata`] that maps to transport headers, never
/// into the response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<T, E> {
    Success {
        result: T,
        metadata: Metadata,
    },
    Error {
        code: ErrorCode,
        message: String,
        details: Option<E>,
        metadata: Metadata,
    },
}

impl<T, E> Response<T, E> {
    /// Successful response with empty metadata
    pub fn success(result: T) -> Self {
        Self::success_with_metadata(result, Metadata::new())
    }

    pub fn success_with_metadata(result: T, metadata: Metadata) -> Self {
        Response::Success { result, metadata }
    }

    /// Failed response with empty metadata
    pub fn error(code: ErrorCode, message: impl Into<String>, details: Option<E>) -> Self {
        Self::error_with_metadata(code, message, details, Metadata::new())
    }

    pub fn error_with_metadata(
        code: ErrorCode,
        message: impl Into<String>,
        details: Option<E>,
        metadata: Metadata,
    ) -> Self {
        Response::Error {
            code,
            message: message.into(),
            details,
            metadata,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Metadata attached to this response
    pub fn metadata(&self) -> &Metadata {
        match self {
            Response::Success { metadata, .. } => metadata,
            Response::Error { metadata, .. } => metadata,
        }
    }

    /// Replace the metadata wholesale, keeping the payload
    pub fn with_metadata(self, metadata: Metadata) -> Self {
        match self {
            Response::Success { result, .. } => Response::Success { result, metadata },
            Response::Error {
                code,
                message,
                details,
                ..
            } => Response::Error {
                code,
                message,
                details,
                metadata,
            },
        }
    }
}
