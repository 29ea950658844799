//! Native ABI types
//!
//! Strings cross the boundary as `StringData`: a pointer plus an explicit
//! byte length, passed by value and never null terminated. Strings produced
//! by the native side are opaque `StringHandle`s that must be read and then
//! returned to the native allocator.

use std::os::raw::c_char;
use std::str::Utf8Error;

/// Opaque context identifier assigned by the native library
pub type ContextHandle = u32;

/// Borrowed view of a UTF-8 string crossing the boundary
///
/// # Safety
///
/// `content` must point to at least `len` readable bytes for as long as the
/// receiving side uses it. The owner (a `NativeStringBuffer` on our side, the
/// native library on the other) decides how long that is.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StringData {
    pub content: *const c_char,
    pub len: u32,
}

impl StringData {
    pub fn is_empty(&self) -> bool {
        self.content.is_null() || self.len == 0
    }

    /// Copy the referenced bytes into an owned `String`, rejecting invalid UTF-8
    ///
    /// # Safety
    ///
    /// `content` must be null or point to `len` readable bytes.
    pub unsafe fn to_utf8(&self) -> Result<String, Utf8Error> {
        std::str::from_utf8(self.bytes()).map(str::to_owned)
    }

    /// Copy the referenced bytes into an owned `String`
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD. Only for text that is
    /// shown rather than decoded, e.g. context creation responses that end up
    /// in error messages.
    ///
    /// # Safety
    ///
    /// `content` must be null or point to `len` readable bytes.
    pub unsafe fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.bytes()).into_owned()
    }

    unsafe fn bytes(&self) -> &[u8] {
        if self.is_empty() {
            return &[];
        }
        std::slice::from_raw_parts(self.content.cast::<u8>(), self.len as usize)
    }
}

/// Native-owned string (opaque)
#[repr(C)]
pub struct StringHandle {
    _private: [u8; 0],
}

/// Callback invoked by the native library for every response event
///
/// `(request_id, payload, response_type, finished)`
pub type ResponseHandler =
    extern "C" fn(request_id: u32, params_json: StringData, response_type: u32, finished: bool);

pub type CreateContextFn = unsafe extern "C" fn(config: StringData) -> *const StringHandle;
pub type DestroyContextFn = unsafe extern "C" fn(context: ContextHandle);
pub type RequestFn = unsafe extern "C" fn(
    context: ContextHandle,
    function_name: StringData,
    params_json: StringData,
    request_id: u32,
    response_handler: ResponseHandler,
);
pub type ReadStringFn = unsafe extern "C" fn(handle: *const StringHandle) -> StringData;
pub type DestroyStringFn = unsafe extern "C" fn(handle: *const StringHandle);
