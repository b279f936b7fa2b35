// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime protocol engine for krpc unary calls over HTTP
//!
//! Every call resolves to a typed [`Response`]: a success envelope or a
//! coded error, never a propagated failure. Metadata travels as `krpc-`
//! headers, the envelope as a single-key JSON object, and cross-cutting
//! behavior composes through [`UnaryInterceptor`] chains that are identical
//! on the client and the server.

pub mod channel;
pub mod codec;
pub mod error;
pub mod interceptor;
pub mod metadata;
pub mod method;
pub mod response;
pub mod server;
pub mod transport;

pub use channel::Channel;
pub use codec::RawResponse;
pub use error::{CodecError, RegistryError, TransportError};
pub use interceptor::{Next, UnaryInterceptor};
pub use metadata::{METADATA_PREFIX, Metadata};
pub use method::{MethodDescriptor, MethodInfo, ServiceDescriptor};
pub use response::{ErrorCode, Response};
pub use server::{Server, ServerBuilder};
pub use transport::{RpcMessage, Transport};
