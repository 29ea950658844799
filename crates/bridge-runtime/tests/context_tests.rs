//! Context lifecycle against an in-process native library

mod common;

use bridge_runtime::error::codes;
use bridge_runtime::{BridgeClient, BridgeError, ContextManager, LogLevel, MemoryLogger, NullLogger};
use common::{assert_eq, CreateResponse, MockBinding};
use rstest::rstest;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_create_returns_handle() {
    let mock = MockBinding::new();
    let context = ContextManager::create(mock.binding(), &json!({}), Arc::new(NullLogger)).unwrap();

    assert!(context.is_initialized());
    assert_eq!(context.handle(), Some(1));
    assert_eq!(mock.live_strings(), 0);
}

#[test]
fn test_distinct_clients_get_distinct_contexts() {
    let mock = MockBinding::new();
    let a = BridgeClient::new(mock.binding(), &json!({})).unwrap();
    let b = BridgeClient::new(mock.binding(), &json!({})).unwrap();

    assert_ne!(a.context(), b.context());
}

#[test]
fn test_config_is_passed_as_json() {
    #[derive(Serialize)]
    struct NetworkConfig {
        server_address: String,
    }

    #[derive(Serialize)]
    struct Config {
        network: NetworkConfig,
    }

    let mock = MockBinding::new();
    let config = Config {
        network: NetworkConfig {
            server_address: "http://localhost".to_string(),
        },
    };
    let _client = BridgeClient::new(mock.binding(), &config).unwrap();

    assert_eq!(
        mock.configs(),
        vec![r#"{"network":{"server_address":"http://localhost"}}"#.to_string()]
    );
}

#[test]
fn test_create_error_envelope() {
    let mock = MockBinding::new();
    mock.respond_to_create(CreateResponse::Text(
        r#"{"error":{"code":5,"message":"bad"}}"#.to_string(),
    ));

    let err = BridgeClient::new(mock.binding(), &json!({})).unwrap_err();

    assert!(matches!(err, BridgeError::ContextCreation(_)));
    let envelope = err.client_error().unwrap();
    assert_eq!(envelope.code, 5);
    assert_eq!(envelope.message, "bad");
    // The response string is returned to the native allocator on failure too
    assert_eq!(mock.live_strings(), 0);
    assert!(mock.destroyed().is_empty());
}

#[test]
fn test_create_unrecognized_response() {
    let mock = MockBinding::new();
    mock.respond_to_create(CreateResponse::Text("internal failure".to_string()));

    let err = BridgeClient::new(mock.binding(), &json!({})).unwrap_err();

    assert_eq!(err.code(), Some(codes::UNPARSEABLE));
    assert_eq!(err.client_error().unwrap().message, "internal failure");
}

#[test]
fn test_create_null_response() {
    let mock = MockBinding::new();
    mock.respond_to_create(CreateResponse::Null);

    let err = BridgeClient::new(mock.binding(), &json!({})).unwrap_err();

    assert_eq!(err.code(), Some(codes::NO_CONTEXT));
}

#[rstest]
#[case::error_envelope(CreateResponse::Text(r#"{"error":{"code":5,"message":"bad"}}"#.to_string()))]
#[case::unrecognized(CreateResponse::Text("internal failure".to_string()))]
#[case::null(CreateResponse::Null)]
fn test_create_failure_is_logged(#[case] response: CreateResponse) {
    let mock = MockBinding::new();
    mock.respond_to_create(response);
    let logger = MemoryLogger::new();

    let err = ContextManager::create(mock.binding(), &json!({}), Arc::new(logger.clone()))
        .err()
        .unwrap();

    assert!(matches!(err, BridgeError::ContextCreation(_)));
    let errors = logger.entries_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("context creation failed"));
}

#[test]
fn test_missing_config_is_rejected_before_native_call() {
    let mock = MockBinding::new();

    let err = BridgeClient::new(mock.binding(), &None::<serde_json::Value>).unwrap_err();

    assert!(matches!(err, BridgeError::Configuration(_)));
    assert!(mock.configs().is_empty());
}

#[test]
fn test_destroy_after_create() {
    let mock = MockBinding::new();
    let logger = MemoryLogger::new();
    let mut context =
        ContextManager::create(mock.binding(), &json!({}), Arc::new(logger.clone())).unwrap();

    context.destroy();

    assert!(!context.is_initialized());
    assert_eq!(mock.destroyed(), vec![1]);
    assert!(logger
        .entries()
        .iter()
        .any(|entry| entry.message == "context 1 destroyed"));
}

#[test]
fn test_destroy_is_idempotent() {
    let mock = MockBinding::new();
    let mut context = ContextManager::create(mock.binding(), &json!({}), Arc::new(NullLogger)).unwrap();

    context.destroy();
    context.destroy();
    drop(context);

    assert_eq!(mock.destroyed(), vec![1]);
}

#[test]
fn test_drop_destroys_context() {
    let mock = MockBinding::new();
    let client = BridgeClient::new(mock.binding(), &json!({})).unwrap();
    let handle = client.context();

    drop(client);

    assert_eq!(mock.destroyed(), vec![handle]);
}

#[test]
fn test_close_destroys_context_once() {
    let mock = MockBinding::new();
    let client = BridgeClient::new(mock.binding(), &json!({})).unwrap();
    let handle = client.context();

    client.close();

    assert_eq!(mock.destroyed(), vec![handle]);
}
