//! Native Bridge Runtime - JSON call bridge to dynamically loaded native libraries
//!
//! This library lets a host process call functions exported by a native library
//! through a uniform protocol:
//! - A function name plus JSON parameters goes in
//! - Zero or more progress events and one terminal result come back through a callback
//! - The callback stream is adapted into a single awaitable completion
//!
//! # Example
//!
//! ```no_run
//! use bridge_runtime::BridgeClient;
//! use bridge_runtime::ffi::DynamicBinding;
//! use std::sync::Arc;
//!
//! # async fn demo() -> bridge_runtime::BridgeResult<()> {
//! let binding = DynamicBinding::open("tonclient", &[], "tc_")?;
//! let client = BridgeClient::new(Arc::new(binding), &serde_json::json!({}))?;
//!
//! let version: serde_json::Value = client.call("client.version", &()).await?;
//! println!("{}", version);
//! # Ok(())
//! # }
//! ```

/// Bridge runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adaptor;
pub mod client;
pub mod context;
pub mod envelope;
pub mod error;
pub mod ffi;
pub mod logging;

// Re-export commonly used types
pub use client::BridgeClient;
pub use context::ContextManager;
pub use envelope::{classify, Envelope};
pub use error::{BridgeError, BridgeResult, ClientError};
pub use logging::{BridgeLogger, LogEntry, LogLevel, MemoryLogger, NullLogger, TracingLogger};
