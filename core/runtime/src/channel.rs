// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Client-side call executor
//!
//! A [`Channel`] drives unary calls against a remote server: it encodes the
//! request, runs the client interceptor chain with the transport POST as the
//! terminal, and decodes the reply envelope and headers into a typed
//! [`Response`]. Every failure along the way (encoding, transport,
//! malformed envelope, typed decode) is trapped into `Error(INTERNAL, ..)`;
//! `unary` never returns an `Err` and never panics outward.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::{self, RawResponse};
use crate::interceptor::{Next, UnaryInterceptor, compose};
use crate::metadata::Metadata;
use crate::method::MethodInfo;
use crate::response::{ErrorCode, Response};
use crate::server::panic_message;
use crate::transport::{RpcMessage, Transport};

/// Client handle for one remote endpoint.
///
/// Cheap to clone. The interceptor list is fixed at construction time; the
/// first interceptor added is outermost, exactly as on the server.
#[derive(Clone)]
pub struct Channel {
    transport: Arc<dyn Transport>,
    base_url: String,
    interceptors: Vec<Arc<dyn UnaryInterceptor>>,
}

impl Channel {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            interceptors: Vec::new(),
        }
    }

    /// Append an interceptor; call before issuing traffic.
    pub fn with_interceptor(mut self, interceptor: impl UnaryInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// The URL a method resolves to
    pub fn url_for(&self, info: &MethodInfo) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), info.path())
    }

    /// Execute a unary call.
    ///
    /// The caller-supplied metadata seeds the chain and maps to `krpc-`
    /// request headers; the returned response carries only the metadata
    /// decoded from the *response* headers.
    pub async fn unary<Req, Resp, Err>(
        &self,
        info: &MethodInfo,
        request: Req,
        metadata: Metadata,
    ) -> Response<Resp, Err>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
        Err: DeserializeOwned,
    {
        let request = match serde_json::to_value(&request) {
            Ok(request) => request,
            Err(e) => return Response::error(ErrorCode::Internal, e.to_string(), None),
        };

        let url = self.url_for(info);
        tracing::debug!(%url, method = %info.name(), "starting unary call");

        let transport = Arc::clone(&self.transport);
        let terminal = Next::new(move |request, metadata| {
            Box::pin(async move { execute(transport, url, request, metadata).await })
        });
        let chain = compose(&self.interceptors, info, terminal);

        let raw = match AssertUnwindSafe(chain.run(request, metadata))
            .catch_unwind()
            .await
        {
            Ok(raw) => raw,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(%message, "client interceptor chain panicked");
                Response::error(ErrorCode::Internal, message, None)
            }
        };

        match codec::from_raw(raw) {
            Ok(response) => response,
            Err(e) => Response::error(ErrorCode::Internal, e.to_string(), None),
        }
    }
}

/// Terminal of the client chain: one POST, decoded into the chain shape.
/// The decoded envelope's metadata is overwritten with the metadata from
/// the response headers; request metadata never leaks into the result.
async fn execute(
    transport: Arc<dyn Transport>,
    url: String,
    request: Value,
    metadata: Metadata,
) -> RawResponse {
    let body = match serde_json::to_vec(&request) {
        Ok(body) => body,
        Err(e) => return Response::error(ErrorCode::Internal, e.to_string(), None),
    };
    let message = RpcMessage::new(metadata.to_http_headers(), body);

    let reply = match transport.post(&url, message).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::debug!(%url, error = %e, "transport failure");
            return Response::error(ErrorCode::Internal, e.to_string(), None);
        }
    };

    let reply_metadata = Metadata::from_http_headers(&reply.headers);
    let envelope: Value = match serde_json::from_slice(&reply.body) {
        Ok(envelope) => envelope,
        Err(e) => return Response::error(ErrorCode::Internal, e.to_string(), None),
    };

    match codec::decode_response(&envelope) {
        Ok(response) => response.with_metadata(reply_metadata),
        Err(e) => Response::error(ErrorCode::Internal, e.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::TransportError;

    /// Transport canned to return a fixed reply
    struct Canned {
        reply: Result<RpcMessage, fn() -> TransportError>,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn post(&self, _url: &str, _message: RpcMessage) -> Result<RpcMessage, TransportError> {
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn channel(reply: Result<RpcMessage, fn() -> TransportError>) -> Channel {
        Channel::new(Arc::new(Canned { reply }), "http://test")
    }

    #[test]
    fn test_url_for() {
        let channel = channel(Ok(RpcMessage::default()));
        let info = MethodInfo::new("EchoService", "echo");
        assert_eq!(channel.url_for(&info), "http://test/EchoService/echo");

        let trailing = Channel::new(
            Arc::new(Canned {
                reply: Ok(RpcMessage::default()),
            }),
            "http://test/",
        );
        assert_eq!(trailing.url_for(&info), "http://test/EchoService/echo");
    }

    #[tokio::test]
    async fn test_response_metadata_comes_from_headers() {
        let mut headers = HashMap::new();
        headers.insert("krpc-server".to_owned(), "yes".to_owned());
        let reply = RpcMessage::new(headers, serde_json::to_vec(&json!({"success": "ok"})).unwrap());

        let channel = channel(Ok(reply));
        let info = MethodInfo::new("EchoService", "echo");
        let request_metadata: Metadata = [("client", "only")].into_iter().collect();

        let response: Response<String, ()> =
            channel.unary(&info, "hi".to_owned(), request_metadata).await;

        let expected: Metadata = [("server", "yes")].into_iter().collect();
        assert_eq!(response, Response::success_with_metadata("ok".to_owned(), expected));
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_internal() {
        let channel = channel(Err(|| TransportError::HttpStatus(502)));
        let info = MethodInfo::new("EchoService", "echo");

        let response: Response<String, ()> =
            channel.unary(&info, "hi".to_owned(), Metadata::new()).await;

        match response {
            Response::Error { code, message, .. } => {
                assert_eq!(code, ErrorCode::Internal);
                assert_eq!(message, "HTTP status 502");
            }
            Response::Success { .. } => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_becomes_internal() {
        let reply = RpcMessage::new(HashMap::new(), b"not json".to_vec());
        let channel = channel(Ok(reply));
        let info = MethodInfo::new("EchoService", "echo");

        let response: Response<String, ()> =
            channel.unary(&info, "hi".to_owned(), Metadata::new()).await;
        assert!(matches!(
            response,
            Response::Error {
                code: ErrorCode::Internal,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_envelope_without_keys_becomes_internal() {
        let reply = RpcMessage::new(
            HashMap::new(),
            serde_json::to_vec(&json!({"unexpected": true})).unwrap(),
        );
        let channel = channel(Ok(reply));
        let info = MethodInfo::new("EchoService", "echo");

        let response: Response<String, ()> =
            channel.unary(&info, "hi".to_owned(), Metadata::new()).await;

        match response {
            Response::Error { code, message, .. } => {
                assert_eq!(code, ErrorCode::Internal);
                assert!(message.starts_with("Invalid response message: "));
            }
            Response::Success { .. } => panic!("expected error"),
        }
    }
}
