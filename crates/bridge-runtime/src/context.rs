//! Native context lifecycle
//!
//! A context is created once from a JSON configuration and destroyed exactly
//! once, either explicitly or when the manager is dropped.

use crate::error::{codes, BridgeError, BridgeResult, ClientError};
use crate::ffi::{ContextHandle, NativeBinding, NativeString, NativeStringBuffer};
use crate::logging::BridgeLogger;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Owner of one native context handle
pub struct ContextManager {
    binding: Arc<dyn NativeBinding>,
    logger: Arc<dyn BridgeLogger>,
    handle: Option<ContextHandle>,
}

impl ContextManager {
    /// Create a native context from `config`
    ///
    /// A config that serializes to `null` counts as missing.
    pub fn create<C: Serialize + ?Sized>(
        binding: Arc<dyn NativeBinding>,
        config: &C,
        logger: Arc<dyn BridgeLogger>,
    ) -> BridgeResult<Self> {
        let config = serde_json::to_value(config)
            .map_err(|e| BridgeError::Configuration(format!("config is not serializable: {}", e)))?;
        if config.is_null() {
            return Err(BridgeError::Configuration(
                "no configuration supplied".to_string(),
            ));
        }

        let handle = match request_context(binding.as_ref(), &config.to_string()) {
            Ok(handle) => handle,
            Err(e) => {
                logger.error(&format!("context creation failed: {}", e));
                return Err(e);
            }
        };
        logger.debug(&format!("context {} created", handle));

        Ok(Self {
            binding,
            logger,
            handle: Some(handle),
        })
    }

    /// The native context handle, if still alive
    pub fn handle(&self) -> Option<ContextHandle> {
        self.handle
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    /// Destroy the native context; a no-op once destroyed
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            unsafe { self.binding.destroy_context(handle) };
            self.logger.debug(&format!("context {} destroyed", handle));
        }
    }
}

impl Drop for ContextManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Hand `config` to the native library and interpret its answer
fn request_context(binding: &dyn NativeBinding, config: &str) -> BridgeResult<ContextHandle> {
    let response = {
        let buffer = NativeStringBuffer::acquire(config)?;
        let raw = unsafe { binding.create_context(buffer.as_data()) };
        let native = unsafe { NativeString::from_raw(binding, raw) }.ok_or_else(|| {
            BridgeError::ContextCreation(ClientError::new(
                codes::NO_CONTEXT,
                "native library returned no context response",
            ))
        })?;
        native.read()
    };

    parse_create_response(&response)
}

/// Interpret `{"result": <handle>}` / `{"error": {..}}`
fn parse_create_response(text: &str) -> BridgeResult<ContextHandle> {
    let unrecognized = || BridgeError::ContextCreation(ClientError::from_text(text));

    let response: Value = serde_json::from_str(text).map_err(|_| unrecognized())?;

    if let Some(result) = response.get("result") {
        return result
            .as_u64()
            .and_then(|handle| ContextHandle::try_from(handle).ok())
            .ok_or_else(unrecognized);
    }

    if let Some(error) = response.get("error") {
        return Err(BridgeError::ContextCreation(ClientError::from_value(error)));
    }

    Err(unrecognized())
}
