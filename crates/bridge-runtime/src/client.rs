//! Bridge client
//!
//! Composition root: owns one native context and dispatches typed calls on it.

use crate::adaptor::{decode_payload, progress_sink, CallAdaptor, ProgressSink};
use crate::context::ContextManager;
use crate::error::{BridgeError, BridgeResult};
use crate::ffi::{ContextHandle, DynamicBinding, NativeBinding};
use crate::logging::{BridgeLogger, NullLogger};
use bridge_config::BridgeConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Client bound to one native context
///
/// Many calls may be in flight at once; each awaits its own completion.
/// Closing (or dropping) the client destroys the context, so callers must let
/// outstanding calls finish first.
pub struct BridgeClient {
    context: ContextManager,
    handle: ContextHandle,
    adaptor: CallAdaptor,
    logger: Arc<dyn BridgeLogger>,
}

impl BridgeClient {
    /// Create a client with the default (silent) logger
    pub fn new<C: Serialize + ?Sized>(
        binding: Arc<dyn NativeBinding>,
        config: &C,
    ) -> BridgeResult<Self> {
        Self::with_logger(binding, config, Arc::new(NullLogger))
    }

    /// Create a client that reports through `logger`
    pub fn with_logger<C: Serialize + ?Sized>(
        binding: Arc<dyn NativeBinding>,
        config: &C,
        logger: Arc<dyn BridgeLogger>,
    ) -> BridgeResult<Self> {
        let context = ContextManager::create(Arc::clone(&binding), config, Arc::clone(&logger))?;
        let handle = context.handle().ok_or_else(|| {
            BridgeError::Configuration("context was destroyed during construction".to_string())
        })?;

        Ok(Self {
            context,
            handle,
            adaptor: CallAdaptor::new(binding, Arc::clone(&logger)),
            logger,
        })
    }

    /// Load the configured library and create a context from `[context]`
    pub fn from_config(config: &BridgeConfig, logger: Arc<dyn BridgeLogger>) -> BridgeResult<Self> {
        config
            .validate()
            .map_err(|e| BridgeError::Configuration(e.to_string()))?;

        let binding = DynamicBinding::open(
            &config.library.name,
            &config.library.search_paths,
            &config.library.symbol_prefix,
        )?;
        logger.debug(&format!("loaded native library {}", binding.path().display()));

        let context = config
            .context_json()
            .map_err(|e| BridgeError::Configuration(e.to_string()))?;

        Self::with_logger(Arc::new(binding), &context, logger)
    }

    /// The native context handle
    pub fn context(&self) -> ContextHandle {
        self.handle
    }

    /// Call `function` and decode its result
    pub async fn call<P, R>(&self, function: &str, params: &P) -> BridgeResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.dispatch(function, params, None).await
    }

    /// Call `function`, forwarding each progress event to `on_progress`
    ///
    /// The handler runs on the native library's thread and receives the
    /// decoded event together with its raw response code. Events that fail to
    /// decode as `E` are logged and skipped.
    pub async fn call_with_progress<P, R, E, F>(
        &self,
        function: &str,
        params: &P,
        on_progress: F,
    ) -> BridgeResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
        E: DeserializeOwned,
        F: Fn(E, u32) + Send + Sync + 'static,
    {
        self.dispatch(function, params, Some(progress_sink(on_progress)))
            .await
    }

    /// Call `function` with raw JSON text and return the raw result text
    pub async fn call_json(&self, function: &str, params_json: &str) -> BridgeResult<String> {
        self.adaptor
            .call_raw(self.handle, function, params_json, None)
            .await
    }

    /// Destroy the native context
    pub fn close(mut self) {
        self.context.destroy();
    }

    async fn dispatch<P, R>(
        &self,
        function: &str,
        params: &P,
        progress: Option<ProgressSink>,
    ) -> BridgeResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params_json = serde_json::to_string(params).map_err(|source| BridgeError::Encode {
            function: function.to_string(),
            source,
        })?;

        let payload = self
            .adaptor
            .call_raw(self.handle, function, &params_json, progress)
            .await?;

        decode_payload(&payload).map_err(|source| {
            self.logger.error(&format!(
                "failed to decode result of {}: {}",
                function, source
            ));
            BridgeError::Decode {
                function: function.to_string(),
                source,
            }
        })
    }
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("context", &self.handle)
            .finish_non_exhaustive()
    }
}
