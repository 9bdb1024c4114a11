//! Decode error taxonomy.
//!
//! Errors fall in two classes. *Recoverable* errors are scoped to a single
//! field record: the cursor has already been advanced past the offending
//! value, so the message decode loop can absorb the error and continue with
//! the next record. *Fatal* errors mean the byte stream itself is broken
//! (truncated or malformed framing) and the whole decode must abort.

use core::fmt;

use crate::wire::WireType;

/// Error produced while decoding protobuf wire data.
///
/// Carries a [`DecodeErrorKind`] plus the name of the field being decoded
/// when one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    field: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    /// A varint, fixed-width value, or length-delimited payload ran past the
    /// end of the buffer. Fatal.
    #[error("unexpected end of buffer")]
    TruncatedInput,
    /// A varint did not terminate within its maximum width, or overflowed
    /// the target integer. Fatal.
    #[error("invalid varint")]
    InvalidVarint,
    /// A field key carried a wire type with no defined meaning (3, 4, 6, 7).
    /// Fatal: the payload size of such a record is unknowable.
    #[error("invalid 'wire type' value: {value}")]
    InvalidWireType { value: u8 },
    /// A field key was structurally invalid (field number zero or out of
    /// range). Fatal.
    #[error("invalid field key: {reason}")]
    InvalidKey { reason: &'static str },
    /// A length prefix exceeds platform addressable memory. Fatal.
    #[error("length prefix {value} exceeds platform addressable memory")]
    LengthOverflow { value: u64 },
    /// A string field held non-UTF-8 bytes. Fatal.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
    /// The observed wire type disagrees with the field's declared type.
    /// Recoverable: the value has been skipped and the cursor is positioned
    /// at the next record.
    #[error("wire type mismatch: expected {expected}, found {found}")]
    WireTypeMismatch { expected: WireType, found: WireType },
    /// A wire integer has no corresponding entry in the enum's schema.
    /// Recoverable: the varint has been consumed.
    #[error("unknown enum value: {value}")]
    InvalidEnumValue { value: i32 },
    /// A symbolic name has no corresponding entry in the enum's schema.
    #[error("unknown enum name: '{name}'")]
    InvalidEnumName { name: String },
    /// A surrogate conversion could not map a decoded value into its custom
    /// representation. Recoverable: the raw value has been consumed.
    #[error("surrogate conversion rejected the decoded value")]
    InvalidSurrogateFormat,
}

impl DecodeError {
    pub(crate) fn new(kind: DecodeErrorKind) -> Self {
        DecodeError { kind, field: None }
    }

    /// Attach the name of the field that was being decoded.
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// Name of the field being decoded when the error occurred, if known.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Whether the error is scoped to a single field record.
    ///
    /// After a recoverable error the cursor is positioned at the next
    /// record, so the message decode loop may drop the record and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            DecodeErrorKind::WireTypeMismatch { .. }
                | DecodeErrorKind::InvalidEnumValue { .. }
                | DecodeErrorKind::InvalidSurrogateFormat
        )
    }

    pub fn truncated() -> Self {
        Self::new(DecodeErrorKind::TruncatedInput)
    }

    pub fn invalid_varint() -> Self {
        Self::new(DecodeErrorKind::InvalidVarint)
    }

    pub fn invalid_wire_type(value: u8) -> Self {
        Self::new(DecodeErrorKind::InvalidWireType { value })
    }

    pub fn invalid_key(reason: &'static str) -> Self {
        Self::new(DecodeErrorKind::InvalidKey { reason })
    }

    pub fn length_overflow(value: u64) -> Self {
        Self::new(DecodeErrorKind::LengthOverflow { value })
    }

    pub fn invalid_utf8() -> Self {
        Self::new(DecodeErrorKind::InvalidUtf8)
    }

    pub fn wire_type_mismatch(field: &'static str, expected: WireType, found: WireType) -> Self {
        Self::new(DecodeErrorKind::WireTypeMismatch { expected, found }).with_field(field)
    }

    pub fn invalid_enum_value(value: i32) -> Self {
        Self::new(DecodeErrorKind::InvalidEnumValue { value })
    }

    pub fn invalid_enum_name(name: &str) -> Self {
        Self::new(DecodeErrorKind::InvalidEnumName {
            name: name.to_owned(),
        })
    }

    pub fn invalid_surrogate() -> Self {
        Self::new(DecodeErrorKind::InvalidSurrogateFormat)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "field '{field}': {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        let err = DecodeError::wire_type_mismatch("foo", WireType::Varint, WireType::LengthDelim);
        assert!(err.is_recoverable());
        assert!(DecodeError::invalid_enum_value(42).is_recoverable());
        assert!(DecodeError::invalid_surrogate().is_recoverable());

        assert!(!DecodeError::truncated().is_recoverable());
        assert!(!DecodeError::invalid_varint().is_recoverable());
        assert!(!DecodeError::invalid_wire_type(3).is_recoverable());
    }

    #[test]
    fn display_includes_field() {
        let err = DecodeError::truncated().with_field("payload");
        assert_eq!(err.to_string(), "field 'payload': unexpected end of buffer");
    }
}
