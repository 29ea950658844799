//! String marshaling across the native boundary
//!
//! - `NativeStringBuffer`: caller-owned UTF-8 bytes handed to the native side
//!   for the duration of one synchronous native call
//! - `NativeString`: a native-owned string read once, then destroyed through
//!   the native allocator
//!
//! # Memory Safety
//!
//! - Both wrappers release their memory in `Drop`, on every exit path
//! - A buffer's bytes live in a boxed slice and are never moved or resized
//! - Lengths are checked against the `u32` length field of the ABI

use crate::error::{BridgeError, BridgeResult};
use crate::ffi::binding::NativeBinding;
use crate::ffi::types::{StringData, StringHandle};
use std::ptr::NonNull;

/// Caller-owned byte buffer passed by reference into a native call
///
/// # Example
///
/// ```
/// # use bridge_runtime::ffi::NativeStringBuffer;
/// let buffer = NativeStringBuffer::acquire("client.version").unwrap();
/// let data = buffer.as_data();
/// assert_eq!(data.len, 14);
/// // buffer (and the bytes `data` points to) is released here
/// ```
#[derive(Debug)]
pub struct NativeStringBuffer {
    bytes: Box<[u8]>,
}

impl NativeStringBuffer {
    /// Copy `text` into a freshly allocated buffer of exactly its UTF-8 length
    pub fn acquire(text: &str) -> BridgeResult<Self> {
        let len = text.len();
        if u32::try_from(len).is_err() {
            return Err(BridgeError::Resource(format!(
                "string of {} bytes exceeds the native length limit",
                len
            )));
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|e| {
            BridgeError::Resource(format!("failed to allocate {} bytes: {}", len, e))
        })?;
        bytes.extend_from_slice(text.as_bytes());

        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Pointer/length view for pass-by-value into a native call
    ///
    /// The view is only valid while `self` is alive.
    pub fn as_data(&self) -> StringData {
        StringData {
            content: self.bytes.as_ptr().cast(),
            // Checked in `acquire`
            len: self.bytes.len() as u32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Native-owned string returned by the native library
///
/// Destroyed through `NativeBinding::destroy_string` when dropped.
pub struct NativeString<'a> {
    binding: &'a dyn NativeBinding,
    handle: NonNull<StringHandle>,
}

impl<'a> NativeString<'a> {
    /// Take ownership of a native string handle
    ///
    /// Returns `None` for a null handle.
    ///
    /// # Safety
    ///
    /// `handle` must have been returned by `binding` and must not be
    /// destroyed by anyone else.
    pub unsafe fn from_raw(binding: &'a dyn NativeBinding, handle: *const StringHandle) -> Option<Self> {
        NonNull::new(handle as *mut StringHandle).map(|handle| Self { binding, handle })
    }

    /// Copy the native string into host memory
    pub fn read(&self) -> String {
        unsafe {
            let data = self.binding.read_string(self.handle.as_ptr());
            data.to_string_lossy()
        }
    }
}

impl Drop for NativeString<'_> {
    fn drop(&mut self) {
        unsafe { self.binding.destroy_string(self.handle.as_ptr()) }
    }
}
