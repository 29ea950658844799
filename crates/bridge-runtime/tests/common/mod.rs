//! Shared test utilities
//!
//! `MockBinding` is an in-process stand-in for a native library. It hands out
//! context ids, allocates native strings it can account for, records every
//! request, and replays scripted response events through the real callback
//! trampoline from background threads.

#![allow(dead_code)]

use bridge_runtime::envelope::{RESPONSE_ERROR, RESPONSE_NOP, RESPONSE_SUCCESS};
use bridge_runtime::ffi::{ContextHandle, NativeBinding, ResponseHandler, StringData, StringHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// One scripted callback invocation
#[derive(Debug, Clone)]
pub struct Event {
    pub payload: Vec<u8>,
    pub kind: u32,
    pub finished: bool,
}

impl Event {
    pub fn success(payload: &str) -> Self {
        Self::new(payload, RESPONSE_SUCCESS, true)
    }

    pub fn failure(payload: &str) -> Self {
        Self::new(payload, RESPONSE_ERROR, true)
    }

    pub fn progress(kind: u32, payload: &str) -> Self {
        Self::new(payload, kind, false)
    }

    pub fn nop() -> Self {
        Self::new("", RESPONSE_NOP, false)
    }

    pub fn new(payload: &str, kind: u32, finished: bool) -> Self {
        Self::raw(payload.as_bytes(), kind, finished)
    }

    /// Payload bytes as given, valid UTF-8 or not
    pub fn raw(payload: &[u8], kind: u32, finished: bool) -> Self {
        Self {
            payload: payload.to_vec(),
            kind,
            finished,
        }
    }
}

/// What `create_context` answers
#[derive(Debug, Clone)]
pub enum CreateResponse {
    /// `{"result": n}` with a fresh id per context
    Handle,
    /// The given text, e.g. an error envelope
    Text(String),
    /// A null string handle
    Null,
}

/// A request as the native side saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub context: ContextHandle,
    pub function: String,
    pub params: String,
    pub request_id: u32,
}

pub struct MockBinding {
    create_response: Mutex<CreateResponse>,
    next_context: AtomicU32,
    configs: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<ContextHandle>>,
    scripts: Mutex<HashMap<String, Vec<Event>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    live_strings: AtomicUsize,
    inline: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl MockBinding {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            create_response: Mutex::new(CreateResponse::Handle),
            next_context: AtomicU32::new(1),
            configs: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            live_strings: AtomicUsize::new(0),
            inline: AtomicBool::new(false),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Upcast for APIs taking `Arc<dyn NativeBinding>`
    pub fn binding(self: &Arc<Self>) -> Arc<dyn NativeBinding> {
        Arc::clone(self) as Arc<dyn NativeBinding>
    }

    pub fn respond_to_create(&self, response: CreateResponse) {
        *self.create_response.lock() = response;
    }

    /// Events replayed for every request to `function`
    ///
    /// Unscripted functions echo their params back as a Success event.
    pub fn script(&self, function: &str, events: Vec<Event>) {
        self.scripts.lock().insert(function.to_string(), events);
    }

    /// Deliver events on the caller's thread, before `request` returns
    pub fn deliver_inline(&self) {
        self.inline.store(true, Ordering::SeqCst);
    }

    /// Wait until every scripted event has been delivered
    pub fn join_pending(&self) {
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for worker in workers {
            worker.join().unwrap();
        }
    }

    pub fn configs(&self) -> Vec<String> {
        self.configs.lock().clone()
    }

    pub fn destroyed(&self) -> Vec<ContextHandle> {
        self.destroyed.lock().clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Native strings handed out and not yet destroyed
    pub fn live_strings(&self) -> usize {
        self.live_strings.load(Ordering::SeqCst)
    }

    fn allocate_string(&self, text: String) -> *const StringHandle {
        self.live_strings.fetch_add(1, Ordering::SeqCst);
        Box::into_raw(Box::new(text)) as *const StringHandle
    }
}

fn replay(events: &[Event], request_id: u32, handler: ResponseHandler) {
    for event in events {
        let payload = StringData {
            content: event.payload.as_ptr() as *const c_char,
            len: event.payload.len() as u32,
        };
        handler(request_id, payload, event.kind, event.finished);
    }
}

impl NativeBinding for MockBinding {
    unsafe fn create_context(&self, config: StringData) -> *const StringHandle {
        self.configs.lock().push(config.to_string_lossy());

        let response = self.create_response.lock().clone();
        match response {
            CreateResponse::Handle => {
                let id = self.next_context.fetch_add(1, Ordering::SeqCst);
                self.allocate_string(format!(r#"{{"result":{}}}"#, id))
            }
            CreateResponse::Text(text) => self.allocate_string(text),
            CreateResponse::Null => ptr::null(),
        }
    }

    unsafe fn destroy_context(&self, context: ContextHandle) {
        self.destroyed.lock().push(context);
    }

    unsafe fn request(
        &self,
        context: ContextHandle,
        function_name: StringData,
        params_json: StringData,
        request_id: u32,
        handler: ResponseHandler,
    ) {
        // Copy before returning; the buffers are released afterwards
        let function = function_name.to_string_lossy();
        let params = params_json.to_string_lossy();

        let events = self
            .scripts
            .lock()
            .get(&function)
            .cloned()
            .unwrap_or_else(|| vec![Event::success(&params)]);

        self.requests.lock().push(RecordedRequest {
            context,
            function,
            params,
            request_id,
        });

        if self.inline.load(Ordering::SeqCst) {
            replay(&events, request_id, handler);
        } else {
            let worker = thread::spawn(move || replay(&events, request_id, handler));
            self.workers.lock().push(worker);
        }
    }

    unsafe fn read_string(&self, handle: *const StringHandle) -> StringData {
        let text = &*(handle as *const String);
        StringData {
            content: text.as_ptr() as *const c_char,
            len: text.len() as u32,
        }
    }

    unsafe fn destroy_string(&self, handle: *const StringHandle) {
        drop(Box::from_raw(handle as *mut String));
        self.live_strings.fetch_sub(1, Ordering::SeqCst);
    }
}
