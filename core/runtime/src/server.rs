// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Server-side dispatcher
//!
//! A [`Server`] owns the immutable path registry and the server interceptor
//! list, both fixed by [`ServerBuilder::build`]. Dispatching is a strict
//! pipeline: normalize the path, look up the handler, parse the body, run
//! the interceptor chain around the handler, encode. Every failure along
//! the way (unknown path, malformed body, handler panic) resolves to an
//! encoded error envelope; `handle_request` never fails and never panics
//! outward.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::codec::{self, RawResponse};
use crate::error::RegistryError;
use crate::interceptor::{Next, UnaryInterceptor, compose};
use crate::metadata::Metadata;
use crate::method::{MethodInfo, ServiceDescriptor};
use crate::response::{ErrorCode, Response};
use crate::transport::RpcMessage;

/// Handler with its service implementation already bound.
type BoundHandler = Arc<dyn Fn(Value, Metadata) -> BoxFuture<'static, RawResponse> + Send + Sync>;

struct RegisteredMethod {
    info: MethodInfo,
    handler: BoundHandler,
}

/// Collects services and interceptors, then builds an immutable [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    interceptors: Vec<Arc<dyn UnaryInterceptor>>,
    methods: Vec<RegisteredMethod>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor. The first one added is outermost.
    pub fn add_interceptor(mut self, interceptor: impl UnaryInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Register every method of a service against its implementation.
    pub fn add_service<S>(mut self, descriptor: ServiceDescriptor<S>, implementation: Arc<S>) -> Self
    where
        S: Send + Sync + 'static,
    {
        for method in descriptor.into_methods() {
            let (info, handler) = method.into_parts();
            let implementation = Arc::clone(&implementation);
            let bound: BoundHandler = Arc::new(move |request, metadata| {
                handler(Arc::clone(&implementation), request, metadata)
            });
            self.methods.push(RegisteredMethod {
                info,
                handler: bound,
            });
        }
        self
    }

    /// Build the registry.
    ///
    /// Two methods resolving to the same path are a configuration error
    /// detected here, never a silent override.
    pub fn build(self) -> Result<Server, RegistryError> {
        let mut handlers = HashMap::with_capacity(self.methods.len());
        for method in self.methods {
            let path = method.info.path().to_owned();
            if handlers.insert(path.clone(), method).is_some() {
                return Err(RegistryError::DuplicatePath(path));
            }
        }

        Ok(Server {
            inner: Arc::new(ServerInner {
                handlers,
                interceptors: self.interceptors,
            }),
        })
    }
}

struct ServerInner {
    handlers: HashMap<String, RegisteredMethod>,
    interceptors: Vec<Arc<dyn UnaryInterceptor>>,
}

/// Dispatches inbound requests to registered handlers.
///
/// Cheap to clone; all state is immutable and shared. Safe for any number
/// of concurrent `handle_request` calls.
#[derive(Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// All registered method paths
    pub fn methods(&self) -> Vec<&str> {
        self.inner.handlers.keys().map(String::as_str).collect()
    }

    /// Dispatch one request.
    ///
    /// `path` is the URL path (an optional single leading `/` is stripped),
    /// `headers` the inbound HTTP headers, `body` the request payload. The
    /// returned message carries the response's own metadata as headers and
    /// the encoded envelope as body.
    pub async fn handle_request(
        &self,
        path: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> RpcMessage {
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.is_empty() {
            return encode_message(&Response::error(
                ErrorCode::InvalidArgument,
                "Path may not be empty",
                None,
            ));
        }

        let Some(method) = self.inner.handlers.get(path) else {
            tracing::debug!(%path, "no handler registered");
            return encode_message(&Response::error(
                ErrorCode::Unimplemented,
                format!("{} not implemented", path),
                None,
            ));
        };

        tracing::debug!(%path, "dispatching request");

        let metadata = Metadata::from_http_headers(headers);
        let request: Value = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                return encode_message(&Response::error(ErrorCode::Internal, e.to_string(), None));
            }
        };

        let handler = Arc::clone(&method.handler);
        let terminal = Next::new(move |request, metadata| handler(request, metadata));
        let chain = compose(&self.inner.interceptors, &method.info, terminal);

        let response = match AssertUnwindSafe(chain.run(request, metadata))
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(%path, %message, "handler panicked");
                Response::error(ErrorCode::Internal, message, None)
            }
        };

        encode_message(&response)
    }
}

/// Encode a response into headers + envelope body. Infallible: an encoding
/// failure degrades to an `INTERNAL` envelope.
fn encode_message(response: &RawResponse) -> RpcMessage {
    let headers = response.metadata().to_http_headers();
    match codec::encode_response(response).and_then(|envelope| Ok(serde_json::to_vec(&envelope)?)) {
        Ok(body) => RpcMessage::new(headers, body),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response envelope");
            let fallback: RawResponse = Response::error(ErrorCode::Internal, e.to_string(), None);
            let body = codec::encode_response(&fallback)
                .ok()
                .and_then(|envelope| serde_json::to_vec(&envelope).ok())
                .unwrap_or_default();
            RpcMessage::new(HashMap::new(), body)
        }
    }
}

/// Best-effort extraction of a panic payload's message.
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "<internal error>".to_owned()
    }
}
