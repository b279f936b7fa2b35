// Copyright Krpc Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP-level tests for the reqwest transport
//!
//! Runs the client executor against a mock HTTP server and verifies the
//! wire contract: JSON POST bodies, `krpc-` headers in both directions, and
//! infrastructure failures degrading to `INTERNAL` errors.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use krpc_client_reqwest::ReqwestTransport;
use krpc_runtime::{Channel, ErrorCode, Metadata, MethodInfo, Response};

fn echo_info() -> MethodInfo {
    MethodInfo::new("EchoService", "echo")
}

fn channel_for(server: &MockServer) -> Channel {
    Channel::new(Arc::new(ReqwestTransport::new()), server.uri())
}

#[tokio::test]
async fn test_success_envelope_and_response_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/EchoService/echo"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!("hello")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(json!({"success": "hello"}).to_string(), "application/json")
                .insert_header("krpc-served-by", "mock"),
        )
        .mount(&server)
        .await;

    let channel = channel_for(&server);
    let response: Response<String, ()> = channel
        .unary(&echo_info(), "hello".to_owned(), Metadata::new())
        .await;

    let expected_metadata: Metadata = [("served-by", "mock")].into_iter().collect();
    assert_eq!(
        response,
        Response::success_with_metadata("hello".to_owned(), expected_metadata)
    );
}

#[tokio::test]
async fn test_request_metadata_travels_as_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/EchoService/echo"))
        .and(header("krpc-trace", "abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(json!({"success": "ok"}).to_string(), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let channel = channel_for(&server);
    let metadata: Metadata = [("trace", "abc123")].into_iter().collect();
    let response: Response<String, ()> =
        channel.unary(&echo_info(), "ok".to_owned(), metadata).await;

    assert!(response.is_success());
}

#[tokio::test]
async fn test_error_envelope_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/EchoService/echo"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            json!({"error": {"code": "NOT_FOUND", "message": "nothing here", "details": 404}})
                .to_string(),
            "application/json",
        ))
        .mount(&server)
        .await;

    let channel = channel_for(&server);
    let response: Response<String, i32> = channel
        .unary(&echo_info(), "hello".to_owned(), Metadata::new())
        .await;

    assert_eq!(
        response,
        Response::error(ErrorCode::NotFound, "nothing here", Some(404))
    );
}

#[tokio::test]
async fn test_infrastructure_status_becomes_internal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/EchoService/echo"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let channel = channel_for(&server);
    let response: Response<String, ()> = channel
        .unary(&echo_info(), "hello".to_owned(), Metadata::new())
        .await;

    match response {
        Response::Error { code, message, .. } => {
            assert_eq!(code, ErrorCode::Internal);
            assert_eq!(message, "HTTP status 503");
        }
        Response::Success { .. } => panic!("expected error"),
    }
}

#[tokio::test]
async fn test_connection_failure_becomes_internal() {
    // Nothing is listening on this port
    let channel = Channel::new(Arc::new(ReqwestTransport::new()), "http://127.0.0.1:1");
    let response: Response<String, ()> = channel
        .unary(&echo_info(), "hello".to_owned(), Metadata::new())
        .await;

    assert!(matches!(
        response,
        Response::Error {
            code: ErrorCode::Internal,
            ..
        }
    ));
}
