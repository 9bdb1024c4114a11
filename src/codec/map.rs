//! Map field support.
//!
//! On the wire a map field is a repeated message field whose entry messages
//! have the key at field 1 and the value at field 2. Entries follow the
//! usual default-elision rule: a default key or value is simply absent from
//! the entry, and decoding substitutes the default for a missing side.
//! Duplicate keys resolve last-write-wins.
//!
//! [`MapStorage`] abstracts over the concrete container so messages can use
//! either `BTreeMap` (deterministic encode order) or `HashMap`.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use bytes::{Buf, BufMut};

use crate::codec::{Proto, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::field;
use crate::varint::Varint;
use crate::wire;

const KEY_FIELD: u32 = 1;
const VALUE_FIELD: u32 = 2;

/// Marker for types allowed as map keys.
///
/// Protobuf restricts map keys to the integral scalar flavors, `bool`, and
/// `string`; floats, bytes, messages, and enums are not keys.
pub trait MapKey {}

impl MapKey for i32 {}
impl MapKey for i64 {}
impl MapKey for u32 {}
impl MapKey for u64 {}
impl MapKey for bool {}
impl MapKey for String {}
impl MapKey for super::Sint32 {}
impl MapKey for super::Sint64 {}
impl MapKey for super::Fixed32 {}
impl MapKey for super::Fixed64 {}
impl MapKey for super::Sfixed32 {}
impl MapKey for super::Sfixed64 {}

/// A container usable as the storage of a map field.
pub trait MapStorage: Default {
    type Key: MapKey + ProtoDecode + ProtoEncode + 'static;
    type Value: ProtoDecode + ProtoEncode + 'static;

    /// Insert an entry, replacing any previous value for the key.
    fn insert_entry(&mut self, key: Self::Key, value: Self::Value);

    /// Iterate entries in the container's natural order.
    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    fn len_entries(&self) -> usize;
}

impl<K, V> MapStorage for BTreeMap<K, V>
where
    K: MapKey + ProtoDecode + ProtoEncode + Ord + 'static,
    V: ProtoDecode + ProtoEncode + 'static,
{
    type Key = K;
    type Value = V;

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn len_entries(&self) -> usize {
        self.len()
    }
}

impl<K, V> MapStorage for HashMap<K, V>
where
    K: MapKey + ProtoDecode + ProtoEncode + Hash + Eq + 'static,
    V: ProtoDecode + ProtoEncode + 'static,
{
    type Key = K;
    type Value = V;

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn len_entries(&self) -> usize {
        self.len()
    }
}

/// Decodes one map entry payload (length prefix plus entry message).
///
/// Unknown fields inside the entry are skipped. A missing key or value
/// decodes as the respective default.
pub fn decode_entry<K, V, B>(buf: &mut B) -> Result<(K, V), DecodeError>
where
    K: ProtoDecode,
    V: ProtoDecode,
    B: Buf,
{
    let len = wire::decode_len(buf)?;
    if buf.remaining() < len {
        return Err(DecodeError::truncated());
    }
    let entry = buf.copy_to_bytes(len);
    let mut span = &entry[..];

    let mut key = K::proto_default();
    let mut value = V::proto_default();
    while !span.is_empty() {
        let field_key = wire::decode_key(&mut span)?;
        match field_key.number() {
            KEY_FIELD => field::read_value(&mut key, field_key.wire_type(), &mut span, "key")?,
            VALUE_FIELD => {
                field::read_value(&mut value, field_key.wire_type(), &mut span, "value")?
            }
            _ => wire::skip_field(field_key.wire_type(), &mut span)?,
        }
    }
    Ok((key, value))
}

/// Encodes one map entry payload: a length prefix and the key/value fields,
/// default sides elided.
pub fn encode_entry<K, V, B>(key: &K, value: &V, buf: &mut B)
where
    K: ProtoEncode,
    V: ProtoEncode,
    B: BufMut,
{
    let len = field::field_len(KEY_FIELD, key, false) + field::field_len(VALUE_FIELD, value, false);
    (len as u64).encode_varint(buf);
    field::write_field(KEY_FIELD, key, false, buf);
    field::write_field(VALUE_FIELD, value, false, buf);
}

/// Number of bytes [`encode_entry`] would produce.
pub fn encoded_entry_len<K, V>(key: &K, value: &V) -> usize
where
    K: ProtoEncode,
    V: ProtoEncode,
{
    let len = field::field_len(KEY_FIELD, key, false) + field::field_len(VALUE_FIELD, value, false);
    (len as u64).varint_len() + len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_round_trip<K, V>(key: K, value: V) -> (K, V)
    where
        K: ProtoDecode + ProtoEncode,
        V: ProtoDecode + ProtoEncode,
    {
        let mut buf = Vec::new();
        encode_entry(&key, &value, &mut buf);
        assert_eq!(buf.len(), encoded_entry_len(&key, &value));

        let mut slice = &buf[..];
        let decoded = decode_entry(&mut slice).unwrap();
        assert!(slice.is_empty());
        decoded
    }

    #[test]
    fn string_entry() {
        let (k, v) = entry_round_trip("one".to_string(), "uno".to_string());
        assert_eq!(k, "one");
        assert_eq!(v, "uno");
    }

    #[test]
    fn default_sides_elided() {
        // Default key: the entry carries only the value field.
        let mut buf = Vec::new();
        encode_entry(&0u64, &7u64, &mut buf);
        assert_eq!(buf, [2, 0x10, 7]);
        let (k, v): (u64, u64) = decode_entry(&mut &buf[..]).unwrap();
        assert_eq!((k, v), (0, 7));

        // Fully-default entry: just a zero length prefix.
        let mut buf = Vec::new();
        encode_entry(&0u64, &0u64, &mut buf);
        assert_eq!(buf, [0]);
        let (k, v): (u64, u64) = decode_entry(&mut &buf[..]).unwrap();
        assert_eq!((k, v), (0, 0));
    }

    #[test]
    fn bool_keys() {
        let (k, v) = entry_round_trip(true, 9u32);
        assert_eq!((k, v), (true, 9));
    }

    #[test]
    fn unknown_entry_fields_skipped() {
        // key "a", value 5, plus an unknown varint field 3.
        let mut inner = Vec::new();
        field::write_field(KEY_FIELD, &"a".to_string(), false, &mut inner);
        field::write_field(VALUE_FIELD, &5u64, false, &mut inner);
        field::write_field(3, &1u64, true, &mut inner);

        let mut buf = Vec::new();
        (inner.len() as u64).encode_varint(&mut buf);
        buf.extend_from_slice(&inner);

        let (k, v): (String, u64) = decode_entry(&mut &buf[..]).unwrap();
        assert_eq!((k.as_str(), v), ("a", 5));
    }

    #[test]
    fn storage_last_write_wins() {
        let mut map: BTreeMap<String, u64> = BTreeMap::new();
        map.insert_entry("k".to_string(), 1);
        map.insert_entry("k".to_string(), 2);
        assert_eq!(map.len_entries(), 1);
        assert_eq!(map.get("k"), Some(&2));
    }
}
