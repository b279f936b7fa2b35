// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Interceptor chains for unary calls
//!
//! An interceptor wraps a single method invocation. The same composition is
//! used on both sides of the wire: the server folds its interceptors around
//! the business handler, the client folds its interceptors around the
//! transport call. The first interceptor added is the outermost one: it
//! sees the request first and the response last.
//!
//! Interceptors exchange the request as a [`serde_json::Value`] and the
//! response as a [`RawResponse`]; typed decoding happens at the chain
//! terminal where the concrete message types are known.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::codec::RawResponse;
use crate::metadata::Metadata;
use crate::method::MethodInfo;

/// Middleware around a single unary call.
///
/// An implementation may pass the call through unchanged, rewrite the
/// request or metadata before calling [`Next::run`], rewrite or replace the
/// response afterwards, or short-circuit by returning without calling
/// `next` at all, in which case nothing downstream runs.
///
/// Interceptor lists are fixed before traffic flows; an interceptor holding
/// mutable state is responsible for its own synchronization.
#[async_trait]
pub trait UnaryInterceptor: Send + Sync {
    async fn intercept(
        &self,
        info: &MethodInfo,
        request: Value,
        metadata: Metadata,
        next: Next<'_>,
    ) -> RawResponse;
}

/// The remainder of an interceptor chain: the next interceptor, or
/// ultimately the business handler (server) / transport call (client).
pub struct Next<'a> {
    run: Box<dyn FnOnce(Value, Metadata) -> BoxFuture<'a, RawResponse> + Send + 'a>,
}

impl<'a> Next<'a> {
    pub(crate) fn new<F>(run: F) -> Self
    where
        F: FnOnce(Value, Metadata) -> BoxFuture<'a, RawResponse> + Send + 'a,
    {
        Self { run: Box::new(run) }
    }

    /// Invoke the rest of the chain
    pub async fn run(self, request: Value, metadata: Metadata) -> RawResponse {
        (self.run)(request, metadata).await
    }
}

/// Fold `interceptors` around `terminal` so that the first element of the
/// slice is outermost: invoked first on the way in, last to observe the
/// response on the way out.
pub(crate) fn compose<'a>(
    interceptors: &'a [Arc<dyn UnaryInterceptor>],
    info: &'a MethodInfo,
    terminal: Next<'a>,
) -> Next<'a> {
    interceptors.iter().rev().fold(terminal, |inner, interceptor| {
        let interceptor = Arc::clone(interceptor);
        Next::new(move |request, metadata| {
            Box::pin(async move { interceptor.intercept(info, request, metadata, inner).await })
        })
    })
}
