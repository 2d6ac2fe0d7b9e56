use crate::{ChannelKind, GuestError, GuestResult, OwnedChannelData};
use byteorder::{ByteOrder, NativeEndian};
use std::{
    collections::VecDeque,
    ffi::{CStr, CString},
    os::raw::{c_char, c_void},
};

mod sealed {
    pub trait Sealed {}
}

/// An element type that can travel through a channel.
///
/// Implemented for the five channel kinds:
///
/// | type     | kind                      |
/// |----------|---------------------------|
/// | `String` | [`ChannelKind::Text`]     |
/// | `i64`    | [`ChannelKind::Integer`]  |
/// | `f64`    | [`ChannelKind::Float`]    |
/// | `bool`   | [`ChannelKind::Boolean`]  |
/// | `u8`     | [`ChannelKind::Byte`]     |
///
/// Every access pattern in this crate is written once against this trait.
/// Scalars are copied by value across the boundary. Text elements are
/// individually allocated by the host; decoding copies each one into a
/// [`String`] and releases the host allocation exactly once.
///
/// This trait is sealed and cannot be implemented outside this crate.
pub trait Element: sealed::Sealed + Clone + std::fmt::Debug + Send + 'static {
    /// The channel kind carrying this element.
    const KIND: ChannelKind;

    /// The column of `values` holding this element, if the kinds match.
    fn column(values: &mut Values) -> Option<&mut VecDeque<Self>>;

    /// Shared access to the column of `values` holding this element.
    fn column_ref(values: &Values) -> Option<&VecDeque<Self>>;

    /// Moves the elements out of a host-allocated array.
    ///
    /// Text that is not valid UTF-8 is a [`GuestError::Host`]; strings not
    /// yet taken are released when `data` drops.
    ///
    /// # Safety
    ///
    /// `data` must hold `data.len()` elements of [`Self::KIND`].
    unsafe fn decode_raw(data: &mut OwnedChannelData) -> GuestResult<Vec<Self>>;

    /// Lays `items` out as a raw array and passes it to `f`.
    ///
    /// The array borrows from `items` and from temporaries that live until
    /// `f` returns.
    fn with_raw<R>(items: &[Self], f: impl FnOnce(&ffi::ChannelData) -> R) -> GuestResult<R>;
}

/// Typed storage for the elements of one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Text elements.
    Text(VecDeque<String>),
    /// Integer elements.
    Integer(VecDeque<i64>),
    /// Floating-point elements.
    Float(VecDeque<f64>),
    /// Boolean elements.
    Boolean(VecDeque<bool>),
    /// Byte elements.
    Byte(VecDeque<u8>),
}

impl Values {
    /// Creates empty storage for `kind`.
    pub const fn new(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Text => Self::Text(VecDeque::new()),
            ChannelKind::Integer => Self::Integer(VecDeque::new()),
            ChannelKind::Float => Self::Float(VecDeque::new()),
            ChannelKind::Boolean => Self::Boolean(VecDeque::new()),
            ChannelKind::Byte => Self::Byte(VecDeque::new()),
        }
    }

    /// Collects `items` into storage of their kind.
    pub fn from_items<T: Element>(items: impl IntoIterator<Item = T>) -> Self {
        let mut values = Self::new(T::KIND);
        if let Some(column) = T::column(&mut values) {
            column.extend(items);
        }
        values
    }

    /// The kind of the stored elements.
    pub const fn kind(&self) -> ChannelKind {
        match self {
            Self::Text(_) => ChannelKind::Text,
            Self::Integer(_) => ChannelKind::Integer,
            Self::Float(_) => ChannelKind::Float,
            Self::Boolean(_) => ChannelKind::Boolean,
            Self::Byte(_) => ChannelKind::Byte,
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(v) => v.len(),
            Self::Integer(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Byte(v) => v.len(),
        }
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! sealed {
    ($($ty:ty),*) => { $(impl sealed::Sealed for $ty {})* };
}

sealed!(String, i64, f64, bool, u8);

macro_rules! column_fns {
    ($variant:ident) => {
        fn column(values: &mut Values) -> Option<&mut VecDeque<Self>> {
            match values {
                Values::$variant(v) => Some(v),
                _ => None,
            }
        }

        fn column_ref(values: &Values) -> Option<&VecDeque<Self>> {
            match values {
                Values::$variant(v) => Some(v),
                _ => None,
            }
        }
    };
}

/// Converts a slice length to the count type of the host boundary.
pub(crate) fn raw_count(len: usize) -> GuestResult<ffi::ApiSize> {
    ffi::ApiSize::try_from(len).map_err(|_| {
        GuestError::InvalidArgument(format!("{len} elements exceed the host array limit"))
    })
}

fn raw_array(kind: ChannelKind, count: ffi::ApiSize, array: *const c_void) -> ffi::ChannelData {
    ffi::ChannelData { kind: kind.discriminant(), count, array }
}

impl Element for String {
    const KIND: ChannelKind = ChannelKind::Text;

    column_fns!(Text);

    unsafe fn decode_raw(data: &mut OwnedChannelData) -> GuestResult<Vec<Self>> {
        // SAFETY: caller guarantees a text array. Each pointer is taken and
        // nulled so the owner does not release it a second time.
        let strings = unsafe { data.strings_mut() };
        strings
            .iter_mut()
            .enumerate()
            .map(|(i, ptr)| -> GuestResult<String> {
                if ptr.is_null() {
                    return Ok(String::new());
                }
                let s = unsafe { CStr::from_ptr(*ptr) }
                    .to_str()
                    .map_err(|e| {
                        GuestError::Host(format!("text element {i} is not valid UTF-8: {e}"))
                    })?
                    .to_owned();
                unsafe { libc::free(*ptr as *mut c_void) };
                *ptr = std::ptr::null_mut();
                Ok(s)
            })
            .collect()
    }

    fn with_raw<R>(items: &[Self], f: impl FnOnce(&ffi::ChannelData) -> R) -> GuestResult<R> {
        let count = raw_count(items.len())?;
        let owned = items
            .iter()
            .map(|s| {
                CString::new(s.as_str()).map_err(|e| {
                    GuestError::InvalidArgument(format!("text element contains a NUL byte: {e}"))
                })
            })
            .collect::<GuestResult<Vec<_>>>()?;
        let ptrs: Vec<*const c_char> = owned.iter().map(|s| s.as_ptr()).collect();
        Ok(f(&raw_array(Self::KIND, count, ptrs.as_ptr() as *const c_void)))
    }
}

macro_rules! numeric_element {
    ($ty:ty, $variant:ident, $read:ident, $write:ident) => {
        impl Element for $ty {
            const KIND: ChannelKind = ChannelKind::$variant;

            column_fns!($variant);

            unsafe fn decode_raw(data: &mut OwnedChannelData) -> GuestResult<Vec<Self>> {
                let mut out = vec![<$ty>::default(); data.len()];
                // SAFETY: caller guarantees `len` elements of this kind.
                NativeEndian::$read(unsafe { data.bytes(Self::KIND) }, &mut out);
                Ok(out)
            }

            fn with_raw<R>(
                items: &[Self],
                f: impl FnOnce(&ffi::ChannelData) -> R,
            ) -> GuestResult<R> {
                let count = raw_count(items.len())?;
                let mut buf = vec![0u8; size_of_val(items)];
                NativeEndian::$write(items, &mut buf);
                Ok(f(&raw_array(Self::KIND, count, buf.as_ptr() as *const c_void)))
            }
        }
    };
}

numeric_element!(i64, Integer, read_i64_into, write_i64_into);
numeric_element!(f64, Float, read_f64_into, write_f64_into);

impl Element for bool {
    const KIND: ChannelKind = ChannelKind::Boolean;

    column_fns!(Boolean);

    unsafe fn decode_raw(data: &mut OwnedChannelData) -> GuestResult<Vec<Self>> {
        Ok(unsafe { data.bytes(Self::KIND) }.iter().map(|&b| b != 0).collect())
    }

    fn with_raw<R>(items: &[Self], f: impl FnOnce(&ffi::ChannelData) -> R) -> GuestResult<R> {
        let count = raw_count(items.len())?;
        // `bool` is one byte holding 0 or 1.
        Ok(f(&raw_array(Self::KIND, count, items.as_ptr() as *const c_void)))
    }
}

impl Element for u8 {
    const KIND: ChannelKind = ChannelKind::Byte;

    column_fns!(Byte);

    unsafe fn decode_raw(data: &mut OwnedChannelData) -> GuestResult<Vec<Self>> {
        Ok(unsafe { data.bytes(Self::KIND) }.to_vec())
    }

    fn with_raw<R>(items: &[Self], f: impl FnOnce(&ffi::ChannelData) -> R) -> GuestResult<R> {
        let count = raw_count(items.len())?;
        Ok(f(&raw_array(Self::KIND, count, items.as_ptr() as *const c_void)))
    }
}
