//! Payload codecs for individual protobuf values.
//!
//! The three traits split the codec capability the way an encoder and a
//! decoder actually use it:
//!
//! * [`Proto`] pins a Rust type to a [`WireType`] and defines its proto3
//!   default, which drives default elision on encode.
//! * [`ProtoDecode`] decodes a payload *into* an existing value. Taking
//!   `&mut self` is what implements merge semantics: scalars overwrite,
//!   strings and bytes replace, messages deep-merge.
//! * [`ProtoEncode`] writes a payload and can pre-compute its length, which
//!   the message engine needs for nested length prefixes.
//!
//! None of these read or write field keys. Key handling lives in
//! [`crate::field`] and the message engine.

use bytes::{Buf, BufMut};

use crate::error::DecodeError;
use crate::wire::WireType;

mod delimited;
mod map;
mod scalar;
mod wrappers;

pub use map::{MapKey, MapStorage, decode_entry, encode_entry, encoded_entry_len};
pub use scalar::{Fixed32, Fixed64, Sfixed32, Sfixed64, Sint32, Sint64};

/// A type with a protobuf payload representation.
pub trait Proto {
    /// Wire type this payload is encoded with.
    const WIRE_TYPE: WireType;

    /// The proto3 default value.
    fn proto_default() -> Self;

    /// Whether this value is the proto3 default and can be elided from the
    /// encoded output.
    fn is_default(&self) -> bool;
}

/// Decoding of a payload into an existing value.
pub trait ProtoDecode: Proto {
    /// Decode one payload from the front of `buf` and merge it into `self`,
    /// advancing the buffer past the payload.
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError>;
}

/// Encoding of a payload.
pub trait ProtoEncode: Proto {
    /// Append the payload encoding of `self` to `buf`.
    ///
    /// Does not write a field key or, for non-length-delimited types, any
    /// length prefix.
    fn encode<B: BufMut>(&self, buf: &mut B);

    /// Number of bytes [`ProtoEncode::encode`] will write.
    fn encoded_len(&self) -> usize;
}
