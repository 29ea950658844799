//! The native entry points consumed by the bridge
//!
//! `NativeBinding` is the seam between the bridge and the native library.
//! `DynamicBinding` implements it over a loaded shared library; tests use
//! in-process doubles.

use crate::ffi::types::{ContextHandle, ResponseHandler, StringData, StringHandle};

/// The five native entry points of the call protocol
///
/// # Safety
///
/// Every method forwards to foreign code. Callers must pass string data that
/// stays valid for the duration of the call, handles previously returned by
/// the same binding, and contexts that have not been destroyed.
pub trait NativeBinding: Send + Sync {
    /// Create a context from a JSON configuration
    ///
    /// Returns a native string holding `{"result": <context>}` or
    /// `{"error": {..}}`, or null on hard failure.
    unsafe fn create_context(&self, config: StringData) -> *const StringHandle;

    /// Release a context
    unsafe fn destroy_context(&self, context: ContextHandle);

    /// Start an asynchronous request
    ///
    /// `function_name` and `params_json` only need to stay valid until this
    /// method returns. Responses are delivered through `handler`, tagged with
    /// `request_id`, possibly from another thread.
    unsafe fn request(
        &self,
        context: ContextHandle,
        function_name: StringData,
        params_json: StringData,
        request_id: u32,
        handler: ResponseHandler,
    );

    /// View the content of a native string
    unsafe fn read_string(&self, handle: *const StringHandle) -> StringData;

    /// Return a native string to the native allocator
    unsafe fn destroy_string(&self, handle: *const StringHandle);
}
