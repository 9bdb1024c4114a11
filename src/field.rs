//! Field-level read and write: key handling, wire-type validation, default
//! elision.
//!
//! These helpers sit between the payload codecs in [`crate::codec`] and the
//! message engine in [`crate::message`]. A *field* on the wire is a key
//! followed by a payload; the helpers here deal with exactly one such
//! record.

use bytes::{Buf, BufMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::wire::{self, WireType};

/// Decodes one field payload into `dst`, validating the wire type first.
///
/// When `observed` disagrees with the type's declared wire type the payload
/// is skipped using `observed` so the cursor lands on the next record, and a
/// recoverable [`DecodeError::wire_type_mismatch`] carrying the field name
/// is returned. The caller decides whether to drop the record or abort.
pub fn read_value<T, B>(
    dst: &mut T,
    observed: WireType,
    buf: &mut B,
    field: &'static str,
) -> Result<(), DecodeError>
where
    T: ProtoDecode,
    B: Buf,
{
    if observed != T::WIRE_TYPE {
        wire::skip_field(observed, buf)?;
        return Err(DecodeError::wire_type_mismatch(field, T::WIRE_TYPE, observed));
    }
    dst.merge_from(buf).map_err(|err| err.with_field(field))
}

/// Writes one field (key plus payload) unless the value is the proto3
/// default.
///
/// With `force` set the default check is bypassed; active oneof members and
/// explicitly-present values are written even at their defaults. Returns
/// whether anything was written.
pub fn write_field<T, B>(number: u32, value: &T, force: bool, buf: &mut B) -> bool
where
    T: ProtoEncode,
    B: BufMut,
{
    if !force && value.is_default() {
        return false;
    }
    wire::encode_key(T::WIRE_TYPE, number, buf);
    value.encode(buf);
    true
}

/// Number of bytes [`write_field`] would produce for the same arguments.
pub fn field_len<T: ProtoEncode>(number: u32, value: &T, force: bool) -> usize {
    if !force && value.is_default() {
        return 0;
    }
    wire::key_len(number) + value.encoded_len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Proto;

    #[test]
    fn default_values_elided() {
        let mut buf = Vec::new();
        assert!(!write_field(1, &0u64, false, &mut buf));
        assert!(buf.is_empty());
        assert_eq!(field_len(1, &0u64, false), 0);
    }

    #[test]
    fn force_writes_defaults() {
        let mut buf = Vec::new();
        assert!(write_field(1, &0u64, true, &mut buf));
        assert_eq!(buf, [0x08, 0x00]);
        assert_eq!(field_len(1, &0u64, true), 2);
    }

    #[test]
    fn write_then_read() {
        let mut buf = Vec::new();
        assert!(write_field(3, &150u64, false, &mut buf));
        assert_eq!(buf.len(), field_len(3, &150u64, false));

        let mut slice = &buf[..];
        let key = wire::decode_key(&mut slice).unwrap();
        assert_eq!(key.number(), 3);

        let mut decoded = u64::proto_default();
        read_value(&mut decoded, key.wire_type(), &mut slice, "n").unwrap();
        assert_eq!(decoded, 150);
        assert!(slice.is_empty());
    }

    #[test]
    fn mismatch_skips_and_recovers() {
        // A length-delimited record where a varint field was expected,
        // followed by a good varint record for the same slot.
        let mut buf = Vec::new();
        write_field(1, &"oops".to_string(), false, &mut buf);
        let tail_start = buf.len();
        write_field(1, &99u64, false, &mut buf);

        let mut slice = &buf[..];
        let key = wire::decode_key(&mut slice).unwrap();
        let mut decoded = 0u64;
        let err = read_value(&mut decoded, key.wire_type(), &mut slice, "n").unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.field(), Some("n"));
        // Cursor sits exactly at the next record.
        assert_eq!(slice.len(), buf.len() - tail_start);

        let key = wire::decode_key(&mut slice).unwrap();
        read_value(&mut decoded, key.wire_type(), &mut slice, "n").unwrap();
        assert_eq!(decoded, 99);
    }
}
