//! Ownership of host-allocated channel arrays.

use crate::{ChannelKind, Element, GuestError, GuestResult};
use std::os::raw::{c_char, c_void};

/// A [`ffi::ChannelData`] whose array was allocated by the host and is now
/// owned by the guest.
///
/// The array is released exactly once, on drop. For text channels every
/// element is a separately allocated C string; strings that were not taken
/// by [`OwnedChannelData::into_vec`] are released on drop as well.
#[derive(Debug, Default)]
pub struct OwnedChannelData(pub(crate) ffi::ChannelData);

impl OwnedChannelData {
    /// Creates an empty value for the host to fill.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a raw value.
    ///
    /// # Safety
    ///
    /// `data.array` must be null or a `malloc` allocation holding
    /// `data.count` elements of the kind named by `data.kind`. For text, each
    /// element must be null or a `malloc` allocated C string. Nothing else may
    /// free these allocations.
    pub const unsafe fn from_raw(data: ffi::ChannelData) -> Self {
        Self(data)
    }

    /// Pointer for the host to write into.
    pub const fn as_mut_ptr(&mut self) -> *mut ffi::ChannelData {
        &mut self.0
    }

    /// Number of elements in the array.
    pub const fn len(&self) -> usize {
        if self.0.array.is_null() { 0 } else { self.0.count as usize }
    }

    /// Returns `true` if there are no elements.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element kind written by the host.
    pub fn kind(&self) -> GuestResult<ChannelKind> {
        ChannelKind::try_from(self.0.kind)
    }

    /// Copies the elements out, releasing the per-element allocations.
    ///
    /// An empty array converts to an empty vector regardless of its kind.
    pub fn into_vec<T: Element>(mut self, channel: &str) -> GuestResult<Vec<T>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let actual = self.kind()?;
        if actual != T::KIND {
            return Err(GuestError::KindMismatch {
                channel: channel.to_owned(),
                expected: T::KIND,
                actual,
            });
        }
        // SAFETY: the kind matches and the array holds `len` elements, per the
        // contract of `from_raw` or of the host call that filled it.
        unsafe { T::decode_raw(&mut self) }
    }

    /// The array viewed as bytes, `len * width` long.
    ///
    /// # Safety
    ///
    /// The array must hold `len` elements of `kind`.
    pub(crate) const unsafe fn bytes(&self, kind: ChannelKind) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(self.0.array as *const u8, self.len() * kind.raw_width())
        }
    }

    /// The array viewed as C string pointers.
    ///
    /// # Safety
    ///
    /// The array must be a text array holding `len` elements.
    pub(crate) const unsafe fn strings_mut(&mut self) -> &mut [*mut c_char] {
        unsafe { std::slice::from_raw_parts_mut(self.0.array as *mut *mut c_char, self.len()) }
    }
}

impl Drop for OwnedChannelData {
    fn drop(&mut self) {
        if self.0.array.is_null() {
            return;
        }
        if self.0.kind == ffi::CHANNEL_KIND_TEXT {
            // SAFETY: text arrays hold `len` string pointers, null once taken.
            for s in unsafe { self.strings_mut() }.iter_mut() {
                if !s.is_null() {
                    unsafe { libc::free(*s as *mut c_void) };
                    *s = std::ptr::null_mut();
                }
            }
        }
        unsafe { libc::free(self.0.array as *mut c_void) };
        self.0.array = std::ptr::null();
    }
}
