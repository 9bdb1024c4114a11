//! Message descriptors and the decode/encode engine.
//!
//! A message type is an ordinary Rust struct plus a [`MessageDescriptor`]
//! binding each field number to an accessor pair and a field codec. The
//! descriptor is built once with the chained binder methods and stored in a
//! `std::sync::LazyLock`, which also breaks the cycles recursive and
//! mutually-referencing message types create:
//!
//! ```
//! use std::sync::LazyLock;
//! use prowire::message::{Message, MessageDescriptor};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Message for Point {
//!     fn descriptor() -> &'static MessageDescriptor<Self> {
//!         static DESC: LazyLock<MessageDescriptor<Point>> = LazyLock::new(|| {
//!             MessageDescriptor::new("Point")
//!                 .field(1, "x", |m: &Point| &m.x, |m: &mut Point| &mut m.x)
//!                 .field(2, "y", |m: &Point| &m.y, |m: &mut Point| &mut m.y)
//!         });
//!         &DESC
//!     }
//! }
//! prowire::impl_message!(Point);
//!
//! let bytes = Point { x: 3, y: -1 }.encode_to_vec();
//! assert_eq!(Point::decode(&bytes).unwrap(), Point { x: 3, y: -1 });
//! ```
//!
//! Decoding is a merge: records apply in stream order onto an existing
//! value, so concatenating two encodings decodes to the merge of the two
//! messages. Unknown field numbers are skipped; recoverable per-record
//! errors (wire-type mismatch, unknown enum value, rejected surrogate) are
//! logged and dropped; framing errors abort the decode.

use bytes::Buf;

use crate::codec::{self, MapStorage, Proto, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::field;
use crate::oneof::Oneof;
use crate::surrogate::Conversion;
use crate::varint::Varint;
use crate::wire::{self, WireType, MAX_FIELD_NUMBER, MIN_FIELD_NUMBER};

/// A struct decodable and encodable through a [`MessageDescriptor`].
///
/// The payload-codec impls ([`Proto`], [`ProtoDecode`], [`ProtoEncode`])
/// that let a message nest inside another come from
/// [`impl_message!`](crate::impl_message).
pub trait Message: Default + Clone + Sized + Send + Sync + 'static {
    fn descriptor() -> &'static MessageDescriptor<Self>;

    /// Decode a message from its un-length-prefixed wire contents.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::descriptor().decode(bytes)
    }

    /// Merge wire contents into an existing message.
    fn merge(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        let mut span = bytes;
        Self::descriptor().merge(self, &mut span)
    }

    /// Encode the message contents, without any length prefix.
    fn encode_to_vec(&self) -> Vec<u8> {
        Self::descriptor().encode_to_vec(self)
    }
}

/// Runtime schema for one message type: ordered members plus a field-number
/// dispatch table.
pub struct MessageDescriptor<M> {
    name: &'static str,
    members: Vec<Member<M>>,
    /// Sorted `(field number, member index)` pairs. Oneof groups contribute
    /// one pair per member field, all pointing at the same entry.
    dispatch: Vec<(u32, usize)>,
}

struct Member<M> {
    name: &'static str,
    codec: Box<dyn FieldCodec<M> + Send + Sync>,
}

/// One bound member of a message: routes records in, writes fields out.
///
/// Buffers are concrete here so the trait stays object-safe; the payload
/// codecs underneath remain generic.
trait FieldCodec<M> {
    fn read(
        &self,
        msg: &mut M,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError>;

    /// Returns whether anything was written.
    fn write(&self, msg: &M, buf: &mut Vec<u8>) -> bool;

    fn encoded_len(&self, msg: &M) -> usize;
}

impl<M: 'static> MessageDescriptor<M> {
    pub fn new(name: &'static str) -> Self {
        MessageDescriptor {
            name,
            members: Vec::new(),
            dispatch: Vec::new(),
        }
    }

    /// Type name, used in log output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bind a singular field: scalar, string, bytes, enum, `Option<T>`, or
    /// a nested message.
    pub fn field<T>(
        self,
        number: u32,
        name: &'static str,
        get: fn(&M) -> &T,
        get_mut: fn(&mut M) -> &mut T,
    ) -> Self
    where
        T: ProtoDecode + ProtoEncode + 'static,
    {
        self.bind(
            name,
            &[number],
            PlainField {
                number,
                name,
                get,
                get_mut,
            },
        )
    }

    /// Bind a repeated field over `Vec<T>`.
    ///
    /// Scalar element types accept both packed and per-element records on
    /// decode and encode packed; length-delimited element types are always
    /// per-element.
    pub fn repeated<T>(
        self,
        number: u32,
        name: &'static str,
        get: fn(&M) -> &Vec<T>,
        get_mut: fn(&mut M) -> &mut Vec<T>,
    ) -> Self
    where
        T: ProtoDecode + ProtoEncode + 'static,
    {
        self.bind(
            name,
            &[number],
            RepeatedField {
                number,
                name,
                get,
                get_mut,
            },
        )
    }

    /// Bind a map field over a [`MapStorage`] container.
    pub fn map<S>(
        self,
        number: u32,
        name: &'static str,
        get: fn(&M) -> &S,
        get_mut: fn(&mut M) -> &mut S,
    ) -> Self
    where
        S: MapStorage + 'static,
    {
        self.bind(
            name,
            &[number],
            MapField {
                number,
                name,
                get,
                get_mut,
            },
        )
    }

    /// Bind a oneof group; every number in `O::NUMBERS` routes here.
    pub fn oneof<O>(
        self,
        name: &'static str,
        get: fn(&M) -> &Option<O>,
        get_mut: fn(&mut M) -> &mut Option<O>,
    ) -> Self
    where
        O: Oneof + 'static,
    {
        self.bind(name, O::NUMBERS, OneofField { get, get_mut })
    }

    /// Bind a surrogate field: stored as `C`, carried on the wire as `T`.
    pub fn surrogate<T, C>(
        self,
        number: u32,
        name: &'static str,
        get: fn(&M) -> &C,
        get_mut: fn(&mut M) -> &mut C,
        conversion: Conversion<T, C>,
    ) -> Self
    where
        T: ProtoDecode + ProtoEncode + 'static,
        C: 'static,
    {
        self.bind(
            name,
            &[number],
            SurrogateField {
                number,
                name,
                get,
                get_mut,
                conversion,
            },
        )
    }

    fn bind(
        mut self,
        name: &'static str,
        numbers: &[u32],
        codec: impl FieldCodec<M> + Send + Sync + 'static,
    ) -> Self {
        let index = self.members.len();
        for &number in numbers {
            assert!(
                (MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&number),
                "message '{}' member '{name}': field number {number} out of range",
                self.name,
            );
            assert!(
                !self.dispatch.iter().any(|&(n, _)| n == number),
                "message '{}' member '{name}': duplicate field number {number}",
                self.name,
            );
            self.dispatch.push((number, index));
        }
        self.members.push(Member {
            name,
            codec: Box::new(codec),
        });
        self.dispatch.sort_unstable_by_key(|&(n, _)| n);
        self
    }

    /// Decode a fresh message from wire contents.
    pub fn decode(&self, bytes: &[u8]) -> Result<M, DecodeError>
    where
        M: Default,
    {
        let mut msg = M::default();
        let mut span = bytes;
        self.merge(&mut msg, &mut span)?;
        Ok(msg)
    }

    /// Merge wire contents into `msg`, consuming `buf` to its end.
    ///
    /// Unknown field numbers are skipped. A recoverable error from a member
    /// codec means the offending record has been fully consumed; it is
    /// logged at debug level and the loop continues. Any other error
    /// aborts, leaving `msg` with everything merged so far.
    pub fn merge(&self, msg: &mut M, buf: &mut &[u8]) -> Result<(), DecodeError> {
        while !buf.is_empty() {
            let key = wire::decode_key(buf)?;
            let member = self
                .dispatch
                .binary_search_by_key(&key.number(), |&(n, _)| n)
                .ok()
                .map(|idx| &self.members[self.dispatch[idx].1]);
            match member {
                Some(member) => {
                    match member.codec.read(msg, key.number(), key.wire_type(), buf) {
                        Ok(()) => {}
                        Err(err) if err.is_recoverable() => {
                            log::debug!(
                                "{}.{}: dropped record for field {}: {err}",
                                self.name,
                                member.name,
                                key.number(),
                            );
                        }
                        Err(err) => return Err(err),
                    }
                }
                None => wire::skip_field(key.wire_type(), buf)?,
            }
        }
        Ok(())
    }

    /// Write the message contents (no length prefix), members in
    /// declaration order. Returns whether anything was written.
    pub fn write_contents(&self, msg: &M, buf: &mut Vec<u8>) -> bool {
        let mut wrote = false;
        for member in &self.members {
            wrote |= member.codec.write(msg, buf);
        }
        wrote
    }

    /// Length of the contents [`MessageDescriptor::write_contents`] writes.
    pub fn contents_len(&self, msg: &M) -> usize {
        self.members
            .iter()
            .map(|member| member.codec.encoded_len(msg))
            .sum()
    }

    pub fn encode_to_vec(&self, msg: &M) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.contents_len(msg));
        self.write_contents(msg, &mut buf);
        buf
    }
}

struct PlainField<M, T> {
    number: u32,
    name: &'static str,
    get: fn(&M) -> &T,
    get_mut: fn(&mut M) -> &mut T,
}

impl<M, T> FieldCodec<M> for PlainField<M, T>
where
    T: ProtoDecode + ProtoEncode,
{
    fn read(
        &self,
        msg: &mut M,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        debug_assert_eq!(number, self.number);
        field::read_value((self.get_mut)(msg), wire_type, buf, self.name)
    }

    fn write(&self, msg: &M, buf: &mut Vec<u8>) -> bool {
        field::write_field(self.number, (self.get)(msg), false, buf)
    }

    fn encoded_len(&self, msg: &M) -> usize {
        field::field_len(self.number, (self.get)(msg), false)
    }
}

struct RepeatedField<M, T> {
    number: u32,
    name: &'static str,
    get: fn(&M) -> &Vec<T>,
    get_mut: fn(&mut M) -> &mut Vec<T>,
}

impl<M, T> FieldCodec<M> for RepeatedField<M, T>
where
    T: ProtoDecode + ProtoEncode,
{
    fn read(
        &self,
        msg: &mut M,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        debug_assert_eq!(number, self.number);
        let items = (self.get_mut)(msg);
        if T::WIRE_TYPE != WireType::LengthDelim && wire_type == WireType::LengthDelim {
            // A packed run. Elements append to whatever is already in the
            // list, so a field split across several runs concatenates.
            let len = wire::decode_len(buf)?;
            if buf.remaining() < len {
                return Err(DecodeError::truncated());
            }
            let (mut run, rest) = buf.split_at(len);
            *buf = rest;
            while !run.is_empty() {
                let mut item = T::proto_default();
                item.merge_from(&mut run)
                    .map_err(|err| err.with_field(self.name))?;
                items.push(item);
            }
            Ok(())
        } else if wire_type == T::WIRE_TYPE {
            let mut item = T::proto_default();
            item.merge_from(buf).map_err(|err| err.with_field(self.name))?;
            items.push(item);
            Ok(())
        } else {
            wire::skip_field(wire_type, buf)?;
            Err(DecodeError::wire_type_mismatch(
                self.name,
                T::WIRE_TYPE,
                wire_type,
            ))
        }
    }

    fn write(&self, msg: &M, buf: &mut Vec<u8>) -> bool {
        let items = (self.get)(msg);
        if items.is_empty() {
            return false;
        }
        if T::WIRE_TYPE == WireType::LengthDelim {
            for item in items {
                wire::encode_key(WireType::LengthDelim, self.number, buf);
                item.encode(buf);
            }
        } else {
            wire::encode_key(WireType::LengthDelim, self.number, buf);
            let payload: usize = items.iter().map(ProtoEncode::encoded_len).sum();
            (payload as u64).encode_varint(buf);
            for item in items {
                item.encode(buf);
            }
        }
        true
    }

    fn encoded_len(&self, msg: &M) -> usize {
        let items = (self.get)(msg);
        if items.is_empty() {
            return 0;
        }
        if T::WIRE_TYPE == WireType::LengthDelim {
            items
                .iter()
                .map(|item| wire::key_len(self.number) + item.encoded_len())
                .sum()
        } else {
            let payload: usize = items.iter().map(ProtoEncode::encoded_len).sum();
            wire::key_len(self.number) + (payload as u64).varint_len() + payload
        }
    }
}

struct MapField<M, S> {
    number: u32,
    name: &'static str,
    get: fn(&M) -> &S,
    get_mut: fn(&mut M) -> &mut S,
}

impl<M, S> FieldCodec<M> for MapField<M, S>
where
    S: MapStorage,
{
    fn read(
        &self,
        msg: &mut M,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        debug_assert_eq!(number, self.number);
        if wire_type != WireType::LengthDelim {
            wire::skip_field(wire_type, buf)?;
            return Err(DecodeError::wire_type_mismatch(
                self.name,
                WireType::LengthDelim,
                wire_type,
            ));
        }
        let (key, value) = codec::decode_entry::<S::Key, S::Value, _>(buf)?;
        (self.get_mut)(msg).insert_entry(key, value);
        Ok(())
    }

    fn write(&self, msg: &M, buf: &mut Vec<u8>) -> bool {
        let map = (self.get)(msg);
        if map.len_entries() == 0 {
            return false;
        }
        for (key, value) in map.entries() {
            wire::encode_key(WireType::LengthDelim, self.number, buf);
            codec::encode_entry(key, value, buf);
        }
        true
    }

    fn encoded_len(&self, msg: &M) -> usize {
        (self.get)(msg)
            .entries()
            .map(|(key, value)| {
                wire::key_len(self.number) + codec::encoded_entry_len(key, value)
            })
            .sum()
    }
}

struct OneofField<M, O> {
    get: fn(&M) -> &Option<O>,
    get_mut: fn(&mut M) -> &mut Option<O>,
}

impl<M, O> FieldCodec<M> for OneofField<M, O>
where
    O: Oneof,
{
    fn read(
        &self,
        msg: &mut M,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        O::merge_variant((self.get_mut)(msg), number, wire_type, buf)
    }

    fn write(&self, msg: &M, buf: &mut Vec<u8>) -> bool {
        match (self.get)(msg) {
            Some(active) => {
                active.write_variant(buf);
                true
            }
            None => false,
        }
    }

    fn encoded_len(&self, msg: &M) -> usize {
        (self.get)(msg).as_ref().map_or(0, Oneof::variant_len)
    }
}

struct SurrogateField<M, T, C> {
    number: u32,
    name: &'static str,
    get: fn(&M) -> &C,
    get_mut: fn(&mut M) -> &mut C,
    conversion: Conversion<T, C>,
}

impl<M, T, C> FieldCodec<M> for SurrogateField<M, T, C>
where
    T: ProtoDecode + ProtoEncode,
{
    fn read(
        &self,
        msg: &mut M,
        number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), DecodeError> {
        debug_assert_eq!(number, self.number);
        let slot = (self.get_mut)(msg);
        // Merge starts from the wire image of the current custom value, so
        // scalars overwrite and delimited payloads replace as usual.
        let mut raw = (self.conversion.from_custom)(slot).unwrap_or_else(T::proto_default);
        field::read_value(&mut raw, wire_type, buf, self.name)?;
        *slot = (self.conversion.to_custom)(raw).map_err(|err| err.with_field(self.name))?;
        Ok(())
    }

    fn write(&self, msg: &M, buf: &mut Vec<u8>) -> bool {
        match (self.conversion.from_custom)((self.get)(msg)) {
            Some(raw) => field::write_field(self.number, &raw, false, buf),
            None => false,
        }
    }

    fn encoded_len(&self, msg: &M) -> usize {
        match (self.conversion.from_custom)((self.get)(msg)) {
            Some(raw) => field::field_len(self.number, &raw, false),
            None => 0,
        }
    }
}

/// Implements the payload-codec traits for a [`Message`] type, making it
/// usable as a length-delimited value: a nested field, a repeated element,
/// or a map value.
#[macro_export]
macro_rules! impl_message {
    ($ty:ty) => {
        impl $crate::codec::Proto for $ty {
            const WIRE_TYPE: $crate::wire::WireType = $crate::wire::WireType::LengthDelim;

            fn proto_default() -> Self {
                ::core::default::Default::default()
            }

            fn is_default(&self) -> bool {
                <$ty as $crate::message::Message>::descriptor().contents_len(self) == 0
            }
        }

        impl $crate::codec::ProtoDecode for $ty {
            fn merge_from<B: $crate::bytes::Buf>(
                &mut self,
                buf: &mut B,
            ) -> ::core::result::Result<(), $crate::error::DecodeError> {
                let len = $crate::wire::decode_len(buf)?;
                if $crate::bytes::Buf::remaining(buf) < len {
                    return ::core::result::Result::Err(
                        $crate::error::DecodeError::truncated(),
                    );
                }
                let payload = $crate::bytes::Buf::copy_to_bytes(buf, len);
                let mut span: &[u8] = ::core::convert::AsRef::as_ref(&payload);
                <$ty as $crate::message::Message>::descriptor().merge(self, &mut span)
            }
        }

        impl $crate::codec::ProtoEncode for $ty {
            fn encode<B: $crate::bytes::BufMut>(&self, buf: &mut B) {
                let descriptor = <$ty as $crate::message::Message>::descriptor();
                let contents = descriptor.encode_to_vec(self);
                $crate::varint::Varint::encode_varint(contents.len() as u64, buf);
                $crate::bytes::BufMut::put_slice(buf, &contents);
            }

            fn encoded_len(&self) -> usize {
                let len = <$ty as $crate::message::Message>::descriptor().contents_len(self);
                $crate::varint::Varint::varint_len(len as u64) + len
            }
        }
    };
}
