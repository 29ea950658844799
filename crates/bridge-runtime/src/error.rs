//! Bridge error types
//!
//! Two layers:
//! - `ClientError`: the error envelope reported by the native library
//! - `BridgeError`: everything that can go wrong on the host side of a call

use crate::ffi::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error codes synthesized by the bridge itself
pub mod codes {
    /// The native error text was not a structured error envelope
    pub const UNPARSEABLE: i64 = -1;
    /// The request finished without delivering a Success or Failure event
    pub const NO_RESPONSE: i64 = -2;
    /// The native library did not return a context response at all
    pub const NO_CONTEXT: i64 = -3;
    /// A terminal payload was not valid UTF-8
    pub const INVALID_UTF8: i64 = -4;
}

/// Error envelope reported by the native library
///
/// Parsed from `{"code": .., "message": .., "data": ..}`. Text that does not
/// match that shape is kept verbatim as the message with code
/// [`codes::UNPARSEABLE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct ClientError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl ClientError {
    /// Create an error envelope without extra data
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Parse an error envelope from raw JSON text
    ///
    /// # Examples
    ///
    /// ```
    /// # use bridge_runtime::ClientError;
    /// # use bridge_runtime::error::codes;
    /// let err = ClientError::from_text(r#"{"code":3,"message":"bad input"}"#);
    /// assert_eq!(err.code, 3);
    ///
    /// let raw = ClientError::from_text("segfault in worker");
    /// assert_eq!(raw.code, codes::UNPARSEABLE);
    /// assert_eq!(raw.message, "segfault in worker");
    /// ```
    pub fn from_text(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self::new(codes::UNPARSEABLE, text))
    }

    /// Build an error envelope from an already parsed JSON value
    ///
    /// Used when the error is nested inside a larger response, e.g. the
    /// `error` field of a context creation response.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(error) => error,
            Err(_) => match value {
                Value::String(text) => Self::new(codes::UNPARSEABLE, text.clone()),
                other => Self::new(codes::UNPARSEABLE, other.to_string()),
            },
        }
    }
}

/// Host side bridge errors
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Missing or invalid configuration, detected before any native call
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The native library refused or failed to create a context
    #[error("Failed to create context: {0}")]
    ContextCreation(ClientError),

    /// The native library reported a Failure event for a call
    #[error("Call to '{function}' failed: {error}")]
    Call { function: String, error: ClientError },

    /// Call parameters could not be serialized
    #[error("Failed to encode parameters of '{function}': {source}")]
    Encode {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    /// A payload did not match the expected shape
    #[error("Failed to decode response of '{function}': {source}")]
    Decode {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    /// A buffer could not be allocated or does not fit the native ABI
    #[error("Native resource error: {0}")]
    Resource(String),

    /// The native library could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl BridgeError {
    /// The native error envelope carried by this error, if any
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            BridgeError::ContextCreation(error) | BridgeError::Call { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Shorthand for `client_error().map(|e| e.code)`
    pub fn code(&self) -> Option<i64> {
        self.client_error().map(|e| e.code)
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
