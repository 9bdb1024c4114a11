//! Oneof groups: a set of fields of which at most one is ever set.
//!
//! A oneof is modelled as `Option<O>` on the message, where `O` is an enum
//! with one variant per member field. On the wire the members are ordinary
//! fields; the group semantics exist only in the holder. Reading any member
//! replaces whatever member was previously active (last-member-wins), with
//! one exception: re-reading the *currently active* member merges into it,
//! so split message payloads combine the way a plain message field would.
//!
//! Implementations are written by hand per message, one match arm per
//! member, each arm built from [`merge_case`].

use bytes::{Buf, BufMut};

use crate::codec::ProtoDecode;
use crate::error::DecodeError;
use crate::field;
use crate::wire::WireType;

/// A group of mutually-exclusive fields.
pub trait Oneof: Sized {
    /// Field numbers of every member, used by the message descriptor to
    /// route records to this group.
    const NUMBERS: &'static [u32];

    /// Decode one member record into the group cell.
    ///
    /// `number` is guaranteed by the caller to be one of
    /// [`Oneof::NUMBERS`]. A recoverable error leaves the cell as it was.
    fn merge_variant<B: Buf>(
        cell: &mut Option<Self>,
        number: u32,
        wire_type: WireType,
        buf: &mut B,
    ) -> Result<(), DecodeError>;

    /// Write the active member as a field record (key plus payload).
    ///
    /// An active member is always written, even when its value is the
    /// default: presence of the record is what selects the member.
    fn write_variant<B: BufMut>(&self, buf: &mut B);

    /// Number of bytes [`Oneof::write_variant`] will write.
    fn variant_len(&self) -> usize;

    /// Field number of the active member.
    fn variant_number(&self) -> u32;
}

/// Builds the new value for one oneof member from an incoming record.
///
/// `prev` is the current value when the incoming record targets the member
/// that is already active; merging starts from it. For any other incoming
/// member the previous value is discarded and merging starts from the
/// default.
pub fn merge_case<T, B>(
    prev: Option<&T>,
    wire_type: WireType,
    buf: &mut B,
    name: &'static str,
) -> Result<T, DecodeError>
where
    T: ProtoDecode + Clone,
    B: Buf,
{
    let mut value = prev.cloned().unwrap_or_else(T::proto_default);
    field::read_value(&mut value, wire_type, buf, name)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Proto, ProtoEncode};
    use crate::wire;

    // Hand-written group with a varint member and a string member, in the
    // shape the message engine expects.
    #[derive(Debug, Clone, PartialEq)]
    enum Value {
        Count(u64),
        Label(String),
    }

    impl Oneof for Value {
        const NUMBERS: &'static [u32] = &[1, 2];

        fn merge_variant<B: Buf>(
            cell: &mut Option<Self>,
            number: u32,
            wire_type: WireType,
            buf: &mut B,
        ) -> Result<(), DecodeError> {
            match number {
                1 => {
                    let prev = match cell {
                        Some(Value::Count(v)) => Some(&*v),
                        _ => None,
                    };
                    let value = merge_case(prev, wire_type, buf, "count")?;
                    *cell = Some(Value::Count(value));
                }
                2 => {
                    let prev = match cell {
                        Some(Value::Label(v)) => Some(&*v),
                        _ => None,
                    };
                    let value = merge_case(prev, wire_type, buf, "label")?;
                    *cell = Some(Value::Label(value));
                }
                _ => unreachable!("number not in NUMBERS"),
            }
            Ok(())
        }

        fn write_variant<B: BufMut>(&self, buf: &mut B) {
            match self {
                Value::Count(v) => {
                    field::write_field(1, v, true, buf);
                }
                Value::Label(v) => {
                    field::write_field(2, v, true, buf);
                }
            }
        }

        fn variant_len(&self) -> usize {
            match self {
                Value::Count(v) => field::field_len(1, v, true),
                Value::Label(v) => field::field_len(2, v, true),
            }
        }

        fn variant_number(&self) -> u32 {
            match self {
                Value::Count(_) => 1,
                Value::Label(_) => 2,
            }
        }
    }

    fn merge_record(cell: &mut Option<Value>, record: &[u8]) -> Result<(), DecodeError> {
        let mut slice = record;
        let key = wire::decode_key(&mut slice).unwrap();
        Value::merge_variant(cell, key.number(), key.wire_type(), &mut slice)
    }

    fn record_for(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        value.write_variant(&mut buf);
        assert_eq!(buf.len(), value.variant_len());
        buf
    }

    #[test]
    fn last_member_wins() {
        let mut cell = None;
        merge_record(&mut cell, &record_for(&Value::Count(5))).unwrap();
        assert_eq!(cell, Some(Value::Count(5)));

        merge_record(&mut cell, &record_for(&Value::Label("x".into()))).unwrap();
        assert_eq!(cell, Some(Value::Label("x".into())));
    }

    #[test]
    fn same_member_overwrites_scalar() {
        let mut cell = Some(Value::Count(5));
        merge_record(&mut cell, &record_for(&Value::Count(9))).unwrap();
        assert_eq!(cell, Some(Value::Count(9)));
    }

    #[test]
    fn active_member_written_at_default() {
        // Count(0) is a default payload, but the record must still appear.
        let buf = record_for(&Value::Count(0));
        assert_eq!(buf, [0x08, 0x00]);
        assert!(0u64.is_default());
    }

    #[test]
    fn mismatch_leaves_cell_untouched() {
        let mut cell = Some(Value::Count(5));

        // A length-delimited record arriving for the varint member.
        let mut buf = Vec::new();
        field::write_field(1, &"junk".to_string(), false, &mut buf);
        let err = merge_record(&mut cell, &buf).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(cell, Some(Value::Count(5)));
    }

    #[test]
    fn encoded_record_round_trips() {
        let value = Value::Label("hello".into());
        let buf = record_for(&value);

        let mut cell = None;
        merge_record(&mut cell, &buf).unwrap();
        assert_eq!(cell, Some(value.clone()));
        assert_eq!(value.variant_number(), 2);

        let mut relen = Vec::new();
        value.write_variant(&mut relen);
        assert_eq!(relen.len(), "hello".to_string().encoded_len() + 1);
    }
}
