//! Base-128 variable-length integer encoding.
//!
//! Protobuf varints store 7 bits per byte, little-endian, with the high bit
//! of each byte acting as a continuation flag. A `u64` occupies at most 10
//! bytes, a `u32` at most 5.

use bytes::{Buf, BufMut};

use crate::error::DecodeError;

/// Integers that can round-trip through the varint encoding.
pub trait Varint: Sized + Copy {
    /// Maximum number of bytes the encoded form can occupy.
    const MAX_BYTES: usize;

    /// Append the varint encoding of `self` to `buf`.
    fn encode_varint<B: BufMut>(self, buf: &mut B);

    /// Decode a varint from the front of `buf`, advancing it.
    ///
    /// Running out of bytes mid-varint is [`DecodeError::truncated`]; a
    /// varint that fails to terminate within [`Varint::MAX_BYTES`] or
    /// overflows the target is [`DecodeError::invalid_varint`]. Both are
    /// fatal: there is no recovery within the current primitive.
    fn decode_varint<B: Buf>(buf: &mut B) -> Result<Self, DecodeError>;

    /// Number of bytes `encode_varint` will write.
    fn varint_len(self) -> usize;
}

impl Varint for u64 {
    const MAX_BYTES: usize = 10;

    fn encode_varint<B: BufMut>(self, buf: &mut B) {
        let mut value = self;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                buf.put_u8(byte);
                return;
            }
            buf.put_u8(byte | 0x80);
        }
    }

    fn decode_varint<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            if !buf.has_remaining() {
                return Err(DecodeError::truncated());
            }
            let byte = buf.get_u8();
            // The 10th byte carries the final single bit of a u64; anything
            // more overflows.
            if shift == 63 && byte > 1 {
                return Err(DecodeError::invalid_varint());
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte < 0x80 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 64 {
                return Err(DecodeError::invalid_varint());
            }
        }
    }

    /// Computed as `ceil(significant_bits / 7)` with a minimum of one byte.
    ///
    /// `self | 1` folds the zero case into the formula: `leading_zeros` is
    /// then at most 63, giving `(70 - 63) / 7 == 1`.
    fn varint_len(self) -> usize {
        ((70 - (self | 1).leading_zeros()) / 7) as usize
    }
}

impl Varint for u32 {
    const MAX_BYTES: usize = 5;

    fn encode_varint<B: BufMut>(self, buf: &mut B) {
        u64::from(self).encode_varint(buf);
    }

    /// Decodes through `u64` and truncates to the low 32 bits, matching
    /// protobuf's rule that 32-bit varints are transmitted sign-extended to
    /// 64 bits.
    fn decode_varint<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        u64::decode_varint(buf).map(|value| value as u32)
    }

    fn varint_len(self) -> usize {
        u64::from(self).varint_len()
    }
}
