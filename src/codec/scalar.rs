//! Codecs for the numeric and boolean scalar types.
//!
//! `int32`/`int64`/`uint32`/`uint64`/`bool` map to the bare Rust integers
//! and encode as varints. The remaining scalar flavors pick a different
//! wire representation for the same Rust integer, so they get newtype
//! wrappers: [`Sint32`]/[`Sint64`] (zigzag varint), [`Fixed32`]/[`Fixed64`]
//! (unsigned little-endian), [`Sfixed32`]/[`Sfixed64`] (signed
//! little-endian).

use core::ops::{Deref, DerefMut};

use bytes::{Buf, BufMut};

use crate::codec::{Proto, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::varint::Varint;
use crate::wire::WireType;

/// Zigzag-encode a signed 32-bit integer.
///
/// Maps small magnitudes of either sign to small unsigned values:
/// 0 → 0, -1 → 1, 1 → 2, -2 → 3, ...
pub const fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode_32`].
pub const fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Zigzag-encode a signed 64-bit integer.
pub const fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode_64`].
pub const fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

impl Proto for u64 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_default() -> Self {
        0
    }

    fn is_default(&self) -> bool {
        *self == 0
    }
}

impl ProtoDecode for u64 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        *self = u64::decode_varint(buf)?;
        Ok(())
    }
}

impl ProtoEncode for u64 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_varint(buf);
    }

    fn encoded_len(&self) -> usize {
        self.varint_len()
    }
}

impl Proto for u32 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_default() -> Self {
        0
    }

    fn is_default(&self) -> bool {
        *self == 0
    }
}

impl ProtoDecode for u32 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        *self = u32::decode_varint(buf)?;
        Ok(())
    }
}

impl ProtoEncode for u32 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.encode_varint(buf);
    }

    fn encoded_len(&self) -> usize {
        self.varint_len()
    }
}

impl Proto for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_default() -> Self {
        0
    }

    fn is_default(&self) -> bool {
        *self == 0
    }
}

impl ProtoDecode for i64 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        *self = u64::decode_varint(buf)? as i64;
        Ok(())
    }
}

impl ProtoEncode for i64 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (*self as u64).encode_varint(buf);
    }

    fn encoded_len(&self) -> usize {
        (*self as u64).varint_len()
    }
}

impl Proto for i32 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_default() -> Self {
        0
    }

    fn is_default(&self) -> bool {
        *self == 0
    }
}

impl ProtoDecode for i32 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        *self = u64::decode_varint(buf)? as i32;
        Ok(())
    }
}

impl ProtoEncode for i32 {
    /// Negative `int32` values are sign-extended to 64 bits before varint
    /// encoding, so they always occupy 10 bytes on the wire.
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (*self as i64 as u64).encode_varint(buf);
    }

    fn encoded_len(&self) -> usize {
        (*self as i64 as u64).varint_len()
    }
}

impl Proto for bool {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_default() -> Self {
        false
    }

    fn is_default(&self) -> bool {
        !*self
    }
}

impl ProtoDecode for bool {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        *self = u64::decode_varint(buf)? != 0;
        Ok(())
    }
}

impl ProtoEncode for bool {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(u8::from(*self));
    }

    fn encoded_len(&self) -> usize {
        1
    }
}

impl Proto for f64 {
    const WIRE_TYPE: WireType = WireType::Double;

    fn proto_default() -> Self {
        0.0
    }

    /// Bitwise check: `-0.0` is not the default and gets written, so the
    /// sign bit survives a round trip.
    fn is_default(&self) -> bool {
        self.to_bits() == 0
    }
}

impl ProtoDecode for f64 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 8 {
            return Err(DecodeError::truncated());
        }
        *self = buf.get_f64_le();
        Ok(())
    }
}

impl ProtoEncode for f64 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_f64_le(*self);
    }

    fn encoded_len(&self) -> usize {
        8
    }
}

impl Proto for f32 {
    const WIRE_TYPE: WireType = WireType::Single;

    fn proto_default() -> Self {
        0.0
    }

    fn is_default(&self) -> bool {
        self.to_bits() == 0
    }
}

impl ProtoDecode for f32 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 4 {
            return Err(DecodeError::truncated());
        }
        *self = buf.get_f32_le();
        Ok(())
    }
}

impl ProtoEncode for f32 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_f32_le(*self);
    }

    fn encoded_len(&self) -> usize {
        4
    }
}

macro_rules! scalar_wrapper {
    ($(#[$attr:meta])* $name:ident, $inner:ty) => {
        $(#[$attr])*
        #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl Deref for $name {
            type Target = $inner;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                $name(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

scalar_wrapper! {
    /// An `i32` encoded as a zigzag varint (proto `sint32`).
    Sint32, i32
}
scalar_wrapper! {
    /// An `i64` encoded as a zigzag varint (proto `sint64`).
    Sint64, i64
}
scalar_wrapper! {
    /// A `u32` encoded as 4 little-endian bytes (proto `fixed32`).
    Fixed32, u32
}
scalar_wrapper! {
    /// A `u64` encoded as 8 little-endian bytes (proto `fixed64`).
    Fixed64, u64
}
scalar_wrapper! {
    /// An `i32` encoded as 4 little-endian bytes (proto `sfixed32`).
    Sfixed32, i32
}
scalar_wrapper! {
    /// An `i64` encoded as 8 little-endian bytes (proto `sfixed64`).
    Sfixed64, i64
}

impl Proto for Sint32 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_default() -> Self {
        Sint32(0)
    }

    fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl ProtoDecode for Sint32 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        self.0 = zigzag_decode_32(u32::decode_varint(buf)?);
        Ok(())
    }
}

impl ProtoEncode for Sint32 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        zigzag_encode_32(self.0).encode_varint(buf);
    }

    fn encoded_len(&self) -> usize {
        zigzag_encode_32(self.0).varint_len()
    }
}

impl Proto for Sint64 {
    const WIRE_TYPE: WireType = WireType::Varint;

    fn proto_default() -> Self {
        Sint64(0)
    }

    fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl ProtoDecode for Sint64 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        self.0 = zigzag_decode_64(u64::decode_varint(buf)?);
        Ok(())
    }
}

impl ProtoEncode for Sint64 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        zigzag_encode_64(self.0).encode_varint(buf);
    }

    fn encoded_len(&self) -> usize {
        zigzag_encode_64(self.0).varint_len()
    }
}

impl Proto for Fixed32 {
    const WIRE_TYPE: WireType = WireType::Single;

    fn proto_default() -> Self {
        Fixed32(0)
    }

    fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl ProtoDecode for Fixed32 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 4 {
            return Err(DecodeError::truncated());
        }
        self.0 = buf.get_u32_le();
        Ok(())
    }
}

impl ProtoEncode for Fixed32 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.0);
    }

    fn encoded_len(&self) -> usize {
        4
    }
}

impl Proto for Fixed64 {
    const WIRE_TYPE: WireType = WireType::Double;

    fn proto_default() -> Self {
        Fixed64(0)
    }

    fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl ProtoDecode for Fixed64 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 8 {
            return Err(DecodeError::truncated());
        }
        self.0 = buf.get_u64_le();
        Ok(())
    }
}

impl ProtoEncode for Fixed64 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64_le(self.0);
    }

    fn encoded_len(&self) -> usize {
        8
    }
}

impl Proto for Sfixed32 {
    const WIRE_TYPE: WireType = WireType::Single;

    fn proto_default() -> Self {
        Sfixed32(0)
    }

    fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl ProtoDecode for Sfixed32 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 4 {
            return Err(DecodeError::truncated());
        }
        self.0 = buf.get_i32_le();
        Ok(())
    }
}

impl ProtoEncode for Sfixed32 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32_le(self.0);
    }

    fn encoded_len(&self) -> usize {
        4
    }
}

impl Proto for Sfixed64 {
    const WIRE_TYPE: WireType = WireType::Double;

    fn proto_default() -> Self {
        Sfixed64(0)
    }

    fn is_default(&self) -> bool {
        self.0 == 0
    }
}

impl ProtoDecode for Sfixed64 {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        if buf.remaining() < 8 {
            return Err(DecodeError::truncated());
        }
        self.0 = buf.get_i64_le();
        Ok(())
    }
}

impl ProtoEncode for Sfixed64 {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i64_le(self.0);
    }

    fn encoded_len(&self) -> usize {
        8
    }
}
