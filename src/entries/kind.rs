use crate::GuestError;
use std::fmt;

/// The kind of element a channel carries.
///
/// Every channel has exactly one kind for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// UTF-8 text, one heap-owned string per element.
    Text,
    /// Signed 64-bit integers.
    Integer,
    /// 64-bit floating-point numbers.
    Float,
    /// Booleans.
    Boolean,
    /// Raw bytes.
    Byte,
}

impl ChannelKind {
    /// All kinds, in discriminant order.
    pub const ALL: [Self; 5] = [Self::Text, Self::Integer, Self::Float, Self::Boolean, Self::Byte];

    /// The discriminant used for this kind across the host boundary.
    pub const fn discriminant(self) -> u8 {
        match self {
            Self::Text => ffi::CHANNEL_KIND_TEXT,
            Self::Integer => ffi::CHANNEL_KIND_INTEGER,
            Self::Float => ffi::CHANNEL_KIND_FLOAT,
            Self::Boolean => ffi::CHANNEL_KIND_BOOLEAN,
            Self::Byte => ffi::CHANNEL_KIND_BYTE,
        }
    }

    /// Size in bytes of one element in a raw host array.
    pub(crate) const fn raw_width(self) -> usize {
        match self {
            Self::Text => size_of::<*const std::os::raw::c_char>(),
            Self::Integer => size_of::<i64>(),
            Self::Float => size_of::<f64>(),
            Self::Boolean | Self::Byte => 1,
        }
    }

    /// Returns the lowercase name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
        }
    }
}

impl TryFrom<u8> for ChannelKind {
    type Error = GuestError;

    fn try_from(discriminant: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.discriminant() == discriminant)
            .ok_or(GuestError::UnknownKind(discriminant))
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn discriminants_round_trip() {
        for kind in ChannelKind::ALL {
            assert_eq!(ChannelKind::try_from(kind.discriminant()).unwrap(), kind);
        }
    }

    #[test]
    fn null_and_unknown_are_rejected() {
        assert_eq!(ChannelKind::try_from(ffi::CHANNEL_KIND_NULL), Err(GuestError::UnknownKind(0)));
        assert_eq!(ChannelKind::try_from(42), Err(GuestError::UnknownKind(42)));
    }
}
