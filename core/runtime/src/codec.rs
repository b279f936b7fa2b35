// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Response envelope codec
//!
//! On the wire a [`Response`] is a JSON object with exactly one top-level
//! key: `{"success": <result>}` or `{"error": {"code", "message",
//! "details"?}}`. Metadata is not part of the body; it travels as headers.
//!
//! Decoding is deliberately lenient: any JSON *object* decodes to a
//! response; an object carrying neither key yields an `INTERNAL` error
//! response quoting the raw input. Only a non-object input is a
//! [`CodecError`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::CodecError;
use crate::response::{ErrorCode, Response};

/// The type-erased response shape exchanged by interceptor chains and the
/// wire boundary before typed decoding.
pub type RawResponse = Response<Value, Value>;

/// Serialized form of the `error` branch.
#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Encode a response into its wire envelope.
pub fn encode_response<T, E>(response: &Response<T, E>) -> Result<Value, CodecError>
where
    T: Serialize,
    E: Serialize,
{
    let envelope = match response {
        Response::Success { result, .. } => json!({ "success": serde_json::to_value(result)? }),
        Response::Error {
            code,
            message,
            details,
            ..
        } => {
            let body = ErrorBody {
                code: *code,
                message: message.clone(),
                // A details value encoding to JSON null is indistinguishable
                // from absent details on the wire; normalize to absent.
                details: details
                    .as_ref()
                    .map(serde_json::to_value)
                    .transpose()?
                    .filter(|details| !details.is_null()),
            };
            json!({ "error": serde_json::to_value(body)? })
        }
    };
    Ok(envelope)
}

/// Decode a wire envelope into a response with empty metadata.
pub fn decode_response<T, E>(value: &Value) -> Result<Response<T, E>, CodecError>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    let Some(object) = value.as_object() else {
        return Err(CodecError::NotAnObject(value.clone()));
    };

    if let Some(success) = object.get("success") {
        let result = serde_json::from_value(success.clone())?;
        return Ok(Response::success(result));
    }

    if let Some(error) = object.get("error") {
        let body: ErrorBody = serde_json::from_value(error.clone())?;
        let details = match body.details {
            Some(Value::Null) | None => None,
            Some(details) => Some(serde_json::from_value(details)?),
        };
        return Ok(Response::error(body.code, body.message, details));
    }

    Ok(Response::error(
        ErrorCode::Internal,
        format!("Invalid response message: {}", value),
        None,
    ))
}

/// Erase a typed response to the [`RawResponse`] chain shape, keeping the
/// metadata.
pub fn to_raw<T, E>(response: &Response<T, E>) -> Result<RawResponse, CodecError>
where
    T: Serialize,
    E: Serialize,
{
    let raw = match response {
        Response::Success { result, metadata } => {
            Response::success_with_metadata(serde_json::to_value(result)?, metadata.clone())
        }
        Response::Error {
            code,
            message,
            details,
            metadata,
        } => Response::error_with_metadata(
            *code,
            message.clone(),
            details.as_ref().map(serde_json::to_value).transpose()?,
            metadata.clone(),
        ),
    };
    Ok(raw)
}

/// Recover a typed response from the [`RawResponse`] chain shape, keeping
/// the metadata. A `null` details value decodes to `None`.
pub fn from_raw<T, E>(raw: RawResponse) -> Result<Response<T, E>, CodecError>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    let typed = match raw {
        Response::Success { result, metadata } => {
            Response::success_with_metadata(serde_json::from_value(result)?, metadata)
        }
        Response::Error {
            code,
            message,
            details,
            metadata,
        } => {
            let details = match details {
                Some(Value::Null) | None => None,
                Some(details) => Some(serde_json::from_value(details)?),
            };
            Response::error_with_metadata(code, message, details, metadata)
        }
    };
    Ok(typed)
}
