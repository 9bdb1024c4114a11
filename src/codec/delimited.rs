//! Codecs for length-delimited byte payloads: `string` and `bytes`.
//!
//! The payload of a length-delimited value is a length varint followed by
//! that many raw bytes. Decoded values own their bytes; nothing borrows from
//! the input buffer. Merging replaces the previous contents wholesale, which
//! is the proto3 rule for strings and bytes (unlike nested messages, which
//! deep-merge).

use bytes::{Buf, BufMut, Bytes};

use crate::codec::{Proto, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::varint::Varint;
use crate::wire::{self, WireType};

impl Proto for String {
    const WIRE_TYPE: WireType = WireType::LengthDelim;

    fn proto_default() -> Self {
        String::new()
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl ProtoDecode for String {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        let len = wire::decode_len(buf)?;
        if buf.remaining() < len {
            return Err(DecodeError::truncated());
        }
        let mut bytes = vec![0u8; len];
        buf.copy_to_slice(&mut bytes);
        *self = String::from_utf8(bytes).map_err(|_| DecodeError::invalid_utf8())?;
        Ok(())
    }
}

impl ProtoEncode for String {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (self.len() as u64).encode_varint(buf);
        buf.put_slice(self.as_bytes());
    }

    fn encoded_len(&self) -> usize {
        (self.len() as u64).varint_len() + self.len()
    }
}

impl Proto for Vec<u8> {
    const WIRE_TYPE: WireType = WireType::LengthDelim;

    fn proto_default() -> Self {
        Vec::new()
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl ProtoDecode for Vec<u8> {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        let len = wire::decode_len(buf)?;
        if buf.remaining() < len {
            return Err(DecodeError::truncated());
        }
        self.clear();
        self.resize(len, 0);
        buf.copy_to_slice(self);
        Ok(())
    }
}

impl ProtoEncode for Vec<u8> {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (self.len() as u64).encode_varint(buf);
        buf.put_slice(self);
    }

    fn encoded_len(&self) -> usize {
        (self.len() as u64).varint_len() + self.len()
    }
}

impl Proto for Bytes {
    const WIRE_TYPE: WireType = WireType::LengthDelim;

    fn proto_default() -> Self {
        Bytes::new()
    }

    fn is_default(&self) -> bool {
        self.is_empty()
    }
}

impl ProtoDecode for Bytes {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        let len = wire::decode_len(buf)?;
        if buf.remaining() < len {
            return Err(DecodeError::truncated());
        }
        *self = buf.copy_to_bytes(len);
        Ok(())
    }
}

impl ProtoEncode for Bytes {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        (self.len() as u64).encode_varint(buf);
        buf.put_slice(self);
    }

    fn encoded_len(&self) -> usize {
        (self.len() as u64).varint_len() + self.len()
    }
}
