// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Method and service descriptors
//!
//! A [`MethodDescriptor`] binds the wire-level identity of a method (its
//! [`MethodInfo`]) to a typed handler; a [`ServiceDescriptor`] groups the
//! methods of one service. Descriptors are constructed once, by generated
//! code or by hand, and merged into the server registry at build time.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::{self, RawResponse};
use crate::metadata::Metadata;
use crate::response::{ErrorCode, Response};

/// Immutable wire-level identity of a method.
///
/// The path is derived as `{service}/{method}` and is the method's identity:
/// the registry enforces its uniqueness. Request and response codecs are not
/// carried here; they are the serde bounds applied where the concrete
/// message types are in scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodInfo {
    name: String,
    path: String,
}

impl MethodInfo {
    pub fn new(service: &str, method: &str) -> Self {
        Self {
            name: method.to_owned(),
            path: format!("{}/{}", service, method),
        }
    }

    /// The unqualified method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The service-qualified path this method is reachable under
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Type-erased handler: takes the service implementation, the request as a
/// JSON value and the call metadata, and resolves to a [`RawResponse`].
pub type MethodHandler<S> =
    Arc<dyn Fn(Arc<S>, Value, Metadata) -> BoxFuture<'static, RawResponse> + Send + Sync>;

/// A method bound to its handler, generic over the service implementation.
pub struct MethodDescriptor<S> {
    info: MethodInfo,
    handler: MethodHandler<S>,
}

impl<S> MethodDescriptor<S>
where
    S: Send + Sync + 'static,
{
    /// Wrap a typed unary handler.
    ///
    /// The wrapper decodes the JSON request into `Req` (a failure resolves
    /// to `Error(INTERNAL, ..)` without reaching the handler), invokes the
    /// handler, and erases the typed response back to the chain shape.
    pub fn unary<Req, Resp, Err, F, Fut>(info: MethodInfo, handler: F) -> Self
    where
        F: Fn(Arc<S>, Req, Metadata) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response<Resp, Err>> + Send + 'static,
        Req: DeserializeOwned + Send + 'static,
        Resp: Serialize + Send + 'static,
        Err: Serialize + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: MethodHandler<S> = Arc::new(move |service, value, metadata| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let request: Req = match serde_json::from_value(value) {
                    Ok(request) => request,
                    Err(e) => {
                        return Response::error(ErrorCode::Internal, e.to_string(), None);
                    }
                };
                let response = handler(service, request, metadata).await;
                codec::to_raw(&response).unwrap_or_else(|e| {
                    Response::error(ErrorCode::Internal, e.to_string(), None)
                })
            })
        });

        Self {
            info,
            handler: erased,
        }
    }
}

impl<S> MethodDescriptor<S> {
    pub fn info(&self) -> &MethodInfo {
        &self.info
    }

    pub(crate) fn into_parts(self) -> (MethodInfo, MethodHandler<S>) {
        (self.info, self.handler)
    }
}

/// A service's name and its ordered list of methods.
pub struct ServiceDescriptor<S> {
    name: String,
    methods: Vec<MethodDescriptor<S>>,
}

impl<S> ServiceDescriptor<S> {
    pub fn new(name: impl Into<String>, methods: Vec<MethodDescriptor<S>>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodDescriptor<S>] {
        &self.methods
    }

    pub(crate) fn into_methods(self) -> Vec<MethodDescriptor<S>> {
        self.methods
    }
}
