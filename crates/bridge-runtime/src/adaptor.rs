//! Call completion adaptor
//!
//! Turns the native push-style callback stream of one request into a single
//! awaitable completion.
//!
//! # Request lifecycle
//!
//! 1. A `PendingRequest` (completion sender, progress sink, logger) is stored
//!    in the process-wide `RequestRegistry` under a fresh request id
//! 2. The native library receives only that id and the `extern "C"`
//!    trampoline; it never sees an address of host state
//! 3. Each callback is routed by id: Success/Failure resolve the completion
//!    once, progress events go to the sink, Nop events are dropped. A payload
//!    that is not valid UTF-8 fails a terminal event with
//!    `codes::INVALID_UTF8` and is skipped for a progress event
//! 4. The event flagged `finished` removes the entry before it is handled, so
//!    later invocations for that id find nothing and are ignored
//!
//! The registry is the only process-wide state of the bridge. It has to be:
//! the native callback signature carries no user data pointer.

use crate::envelope::{classify, Envelope};
use crate::error::{codes, BridgeError, BridgeResult, ClientError};
use crate::ffi::{ContextHandle, NativeBinding, NativeStringBuffer, StringData};
use crate::logging::BridgeLogger;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::str::Utf8Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::oneshot;

/// Type-erased progress handler: decodes the payload and forwards it
pub type ProgressSink = Box<dyn Fn(&str, u32) -> Result<(), serde_json::Error> + Send + Sync>;

type Completion = oneshot::Sender<Result<String, ClientError>>;

/// Wrap a typed progress handler into a `ProgressSink`
pub fn progress_sink<E, F>(handler: F) -> ProgressSink
where
    E: DeserializeOwned,
    F: Fn(E, u32) + Send + Sync + 'static,
{
    Box::new(move |payload, kind| {
        let event = decode_payload::<E>(payload)?;
        handler(event, kind);
        Ok(())
    })
}

/// Decode a JSON payload; an empty payload decodes as `null`
pub fn decode_payload<T: DeserializeOwned>(payload: &str) -> Result<T, serde_json::Error> {
    if payload.trim().is_empty() {
        serde_json::from_str("null")
    } else {
        serde_json::from_str(payload)
    }
}

/// State retained for one in-flight request
struct PendingRequest {
    function: String,
    completion: Mutex<Option<Completion>>,
    progress: Option<ProgressSink>,
    logger: Arc<dyn BridgeLogger>,
}

impl PendingRequest {
    fn handle(&self, request_id: u32, envelope: Envelope<'_>) {
        match envelope {
            Envelope::Success(payload) => self.resolve(request_id, Ok(payload.to_string())),
            Envelope::Failure(payload) => {
                self.resolve(request_id, Err(ClientError::from_text(payload)))
            }
            Envelope::Ignorable => {}
            Envelope::Progress { kind, payload } => self.notify(request_id, kind, payload),
        }
    }

    /// Handle an event whose payload is not valid UTF-8
    ///
    /// Terminal events fail the request; progress events are logged and
    /// skipped like any other undecodable progress payload.
    fn reject(&self, request_id: u32, kind: u32, error: &Utf8Error) {
        let envelope = classify(kind, "");
        if envelope.is_terminal() {
            self.resolve(
                request_id,
                Err(ClientError::new(
                    codes::INVALID_UTF8,
                    format!("response payload is not valid UTF-8: {}", error),
                )),
            );
        } else if let Envelope::Progress { kind, .. } = envelope {
            self.logger.error(&format!(
                "request {} ({}): progress event of kind {} is not valid UTF-8: {}",
                request_id, self.function, kind, error
            ));
        }
    }

    fn resolve(&self, request_id: u32, outcome: Result<String, ClientError>) {
        let Some(completion) = self.completion.lock().take() else {
            self.logger.debug(&format!(
                "request {} ({}): ignoring second terminal event",
                request_id, self.function
            ));
            return;
        };

        match &outcome {
            Ok(_) => self.logger.debug(&format!(
                "request {} ({}): succeeded",
                request_id, self.function
            )),
            Err(error) => self.logger.debug(&format!(
                "request {} ({}): failed: {}",
                request_id, self.function, error
            )),
        }

        // The caller may have stopped waiting; the outcome is then dropped
        let _ = completion.send(outcome);
    }

    fn notify(&self, request_id: u32, kind: u32, payload: &str) {
        let Some(progress) = &self.progress else {
            return;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| progress(payload, kind))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.logger.error(&format!(
                "request {} ({}): failed to decode progress event of kind {}: {}",
                request_id, self.function, kind, e
            )),
            Err(_) => self.logger.error(&format!(
                "request {} ({}): progress handler panicked on event of kind {}",
                request_id, self.function, kind
            )),
        }
    }
}

/// Registry of in-flight requests keyed by request id
pub struct RequestRegistry {
    next_id: AtomicU32,
    pending: Mutex<HashMap<u32, Arc<PendingRequest>>>,
}

impl RequestRegistry {
    fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Store a request under a fresh, non-zero id not currently in use
    fn register(&self, request: PendingRequest) -> u32 {
        let mut pending = self.pending.lock();
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id == 0 || pending.contains_key(&id) {
                continue;
            }
            pending.insert(id, Arc::new(request));
            return id;
        }
    }

    /// Route one native response event
    ///
    /// The lock is released before any handler runs, so handlers may start
    /// new requests.
    pub fn dispatch(&self, request_id: u32, payload: &str, kind: u32, finished: bool) {
        if let Some(request) = self.take(request_id, finished) {
            request.handle(request_id, classify(kind, payload));
            Self::settle(&request, request_id, finished);
        }
    }

    /// Route an event whose payload failed UTF-8 validation
    fn dispatch_invalid(&self, request_id: u32, error: &Utf8Error, kind: u32, finished: bool) {
        if let Some(request) = self.take(request_id, finished) {
            request.reject(request_id, kind, error);
            Self::settle(&request, request_id, finished);
        }
    }

    /// Look up the request; the finishing event removes it
    fn take(&self, request_id: u32, finished: bool) -> Option<Arc<PendingRequest>> {
        let mut pending = self.pending.lock();
        if finished {
            pending.remove(&request_id)
        } else {
            pending.get(&request_id).cloned()
        }
    }

    fn settle(request: &PendingRequest, request_id: u32, finished: bool) {
        if finished && request.completion.lock().is_some() {
            request.logger.error(&format!(
                "request {} ({}): finished without a result",
                request_id, request.function
            ));
        }
    }

    /// Whether the callback state for `request_id` is still retained
    pub fn is_pending(&self, request_id: u32) -> bool {
        self.pending.lock().contains_key(&request_id)
    }
}

/// The process-wide request registry
pub fn registry() -> &'static RequestRegistry {
    static REGISTRY: OnceLock<RequestRegistry> = OnceLock::new();
    REGISTRY.get_or_init(RequestRegistry::new)
}

/// Trampoline handed to the native library for every request
extern "C" fn response_handler(
    request_id: u32,
    params_json: StringData,
    response_type: u32,
    finished: bool,
) {
    // The native buffer is only valid during this call
    let payload = unsafe { params_json.to_utf8() };

    // Unwinding into native frames aborts the process
    let _ = panic::catch_unwind(|| match &payload {
        Ok(payload) => registry().dispatch(request_id, payload, response_type, finished),
        Err(error) => registry().dispatch_invalid(request_id, error, response_type, finished),
    });
}

/// Dispatches requests against one native binding
pub struct CallAdaptor {
    binding: Arc<dyn NativeBinding>,
    logger: Arc<dyn BridgeLogger>,
}

impl CallAdaptor {
    pub fn new(binding: Arc<dyn NativeBinding>, logger: Arc<dyn BridgeLogger>) -> Self {
        Self { binding, logger }
    }

    /// Run one request to completion and return the raw success payload
    pub async fn call_raw(
        &self,
        context: ContextHandle,
        function: &str,
        params_json: &str,
        progress: Option<ProgressSink>,
    ) -> BridgeResult<String> {
        let (sender, receiver) = oneshot::channel();
        let request = PendingRequest {
            function: function.to_string(),
            completion: Mutex::new(Some(sender)),
            progress,
            logger: Arc::clone(&self.logger),
        };

        self.start(context, function, params_json, request)?;

        match receiver.await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(error)) => Err(BridgeError::Call {
                function: function.to_string(),
                error,
            }),
            Err(_) => Err(BridgeError::Call {
                function: function.to_string(),
                error: ClientError::new(
                    codes::NO_RESPONSE,
                    "request finished without a result",
                ),
            }),
        }
    }

    /// Register the request and initiate the native call
    ///
    /// The string buffers only live until the native `request` returns; the
    /// native side is expected to copy what it needs before returning.
    fn start(
        &self,
        context: ContextHandle,
        function: &str,
        params_json: &str,
        request: PendingRequest,
    ) -> BridgeResult<u32> {
        // Allocate before registering so a failure leaves nothing behind
        let function_name = NativeStringBuffer::acquire(function)?;
        let params = NativeStringBuffer::acquire(params_json)?;

        let request_id = registry().register(request);
        self.logger.debug(&format!(
            "request {} ({}): dispatching on context {}",
            request_id, function, context
        ));

        unsafe {
            self.binding.request(
                context,
                function_name.as_data(),
                params.as_data(),
                request_id,
                response_handler,
            );
        }

        Ok(request_id)
    }
}
