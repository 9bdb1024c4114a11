//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev).
//!
//! An encoded message is a sequence of records, each introduced by a *key*:
//! a single varint combining the field number (upper bits) and the
//! [`WireType`] (lower 3 bits). The wire type is what lets a decoder size a
//! payload it does not understand, which makes [`skip_field`] possible.

use core::fmt;

use bytes::Buf;

use crate::error::DecodeError;
use crate::varint::Varint;

/// Minimum valid protobuf field number.
pub const MIN_FIELD_NUMBER: u32 = 1;
/// Maximum valid protobuf field number.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// The physical encoding of a field's payload.
///
/// Raw values 3 and 4 (the deprecated group markers) and 6 and 7 have no
/// defined payload shape and are rejected during key decoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WireType {
    /// Variable-length integer: `int32`, `int64`, `uint32`, `uint64`,
    /// `sint32`, `sint64`, `bool`, enums.
    Varint,
    /// 64-bit little-endian value: `fixed64`, `sfixed64`, `double`.
    Double,
    /// Length-prefixed payload: `string`, `bytes`, messages, packed
    /// repeated fields, map entries.
    LengthDelim,
    /// 32-bit little-endian value: `fixed32`, `sfixed32`, `float`.
    Single,
}

impl WireType {
    /// The raw 3-bit value carried in a field key.
    pub const fn raw(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Double => 1,
            WireType::LengthDelim => 2,
            WireType::Single => 5,
        }
    }

    /// Decode a [`WireType`] from the low 3 bits of a field key.
    pub fn from_raw(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Double),
            2 => Ok(WireType::LengthDelim),
            5 => Ok(WireType::Single),
            other => Err(DecodeError::invalid_wire_type(other)),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::Double => "i64",
            WireType::LengthDelim => "len",
            WireType::Single => "i32",
        };
        f.write_str(name)
    }
}

/// A decoded field key: field number plus wire type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldKey {
    number: u32,
    wire_type: WireType,
}

impl FieldKey {
    pub fn number(self) -> u32 {
        self.number
    }

    pub fn wire_type(self) -> WireType {
        self.wire_type
    }

    pub fn into_parts(self) -> (u32, WireType) {
        (self.number, self.wire_type)
    }
}

/// Encodes a field key for the provided number and wire type.
#[inline]
pub fn encode_key<B: bytes::BufMut>(wire_type: WireType, number: u32, buf: &mut B) {
    debug_assert!((MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&number));
    let key = (number << 3) | u32::from(wire_type.raw());
    key.encode_varint(buf);
}

/// Returns the encoded length of a field key.
///
/// The wire type only occupies the low 3 bits, so it never changes the
/// length.
#[inline]
pub fn key_len(number: u32) -> usize {
    (number << 3).varint_len()
}

/// Decodes a field key, validating the wire type and field number.
///
/// A malformed key is fatal for the whole decode: without a valid wire type
/// there is no way to resynchronize with the stream.
#[inline]
pub fn decode_key<B: Buf>(buf: &mut B) -> Result<FieldKey, DecodeError> {
    let raw = u64::decode_varint(buf)?;
    if raw > u64::from(u32::MAX) {
        return Err(DecodeError::invalid_key("key exceeds 32 bits"));
    }
    let wire_type = WireType::from_raw((raw & 0b111) as u8)?;
    let number = (raw >> 3) as u32;
    if number < MIN_FIELD_NUMBER || number > MAX_FIELD_NUMBER {
        return Err(DecodeError::invalid_key("field number out of range"));
    }
    Ok(FieldKey { number, wire_type })
}

/// Decodes the length prefix of a length-delimited payload.
#[inline]
pub fn decode_len<B: Buf>(buf: &mut B) -> Result<usize, DecodeError> {
    let len = u64::decode_varint(buf)?;
    usize::try_from(len).map_err(|_| DecodeError::length_overflow(len))
}

/// Advances the buffer past one field value of the given wire type.
///
/// This is how a decoder tolerates unknown fields and how a field-level
/// wire-type mismatch stays confined to a single record: the cursor always
/// ends up at the next key.
#[inline]
pub fn skip_field<B: Buf>(wire_type: WireType, buf: &mut B) -> Result<(), DecodeError> {
    let skip = match wire_type {
        WireType::Varint => {
            u64::decode_varint(buf)?;
            return Ok(());
        }
        WireType::Double => 8,
        WireType::LengthDelim => decode_len(buf)?,
        WireType::Single => 4,
    };
    if buf.remaining() < skip {
        return Err(DecodeError::truncated());
    }
    buf.advance(skip);
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn proptest_key_round_trips() {
        fn arb_wire_type() -> impl Strategy<Value = WireType> {
            prop_oneof![
                Just(WireType::Varint),
                Just(WireType::Double),
                Just(WireType::LengthDelim),
                Just(WireType::Single),
            ]
        }

        let strat = (MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER, arb_wire_type());
        proptest!(|((number, wire_type) in strat)| {
            let mut buf = Vec::with_capacity(8);
            encode_key(wire_type, number, &mut buf);
            prop_assert_eq!(buf.len(), key_len(number));

            let key = decode_key(&mut &buf[..]).unwrap();
            prop_assert_eq!(key.number(), number);
            prop_assert_eq!(key.wire_type(), wire_type);
        });
    }

    #[test]
    fn rejects_undefined_wire_types() {
        for raw in [3u8, 4, 6, 7] {
            // Key for field 1 with the offending wire type.
            let mut buf = &[(1 << 3) | raw][..];
            assert!(decode_key(&mut buf).is_err(), "wire type {raw}");
        }
    }

    #[test]
    fn rejects_field_number_zero() {
        // Field number 0, wire type varint.
        let mut buf = &[0x00u8][..];
        assert!(decode_key(&mut buf).is_err());
    }

    #[test]
    fn decode_len_values() {
        let mut buf = &[0u8][..];
        assert_eq!(decode_len(&mut buf).unwrap(), 0);

        let mut buf = &[127u8][..];
        assert_eq!(decode_len(&mut buf).unwrap(), 127);

        let mut buf = &[0xAC, 0x02][..];
        assert_eq!(decode_len(&mut buf).unwrap(), 300);
    }

    #[test]
    fn skip_varint() {
        let mut buf = &[0x80, 0x01, 99][..];
        skip_field(WireType::Varint, &mut buf).unwrap();
        assert_eq!(buf, &[99]);
    }

    #[test]
    fn skip_fixed() {
        let mut buf = &[1, 2, 3, 4, 99][..];
        skip_field(WireType::Single, &mut buf).unwrap();
        assert_eq!(buf, &[99]);

        let mut buf = &[1, 2, 3, 4, 5, 6, 7, 8, 99][..];
        skip_field(WireType::Double, &mut buf).unwrap();
        assert_eq!(buf, &[99]);
    }

    #[test]
    fn skip_length_delimited() {
        let mut buf = &[3, 1, 2, 3, 99][..];
        skip_field(WireType::LengthDelim, &mut buf).unwrap();
        assert_eq!(buf, &[99]);

        let mut buf = &[0, 99][..];
        skip_field(WireType::LengthDelim, &mut buf).unwrap();
        assert_eq!(buf, &[99]);
    }

    #[test]
    fn skip_truncated_payload() {
        let mut buf = &[5, 1, 2][..];
        assert!(skip_field(WireType::LengthDelim, &mut buf).is_err());

        let mut buf = &[1, 2][..];
        assert!(skip_field(WireType::Double, &mut buf).is_err());
    }
}
