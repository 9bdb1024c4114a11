//! Codec impls for container wrappers: `Option<T>` and `Box<T>`.
//!
//! `Option<T>` is the presence-tracking holder, used for message-typed
//! fields. `None` encodes nothing; `Some(value)` always has presence, even
//! when the inner value is itself the default. Decoding into `None`
//! materializes the default first, so repeated records for the same field
//! deep-merge into the same inner value.
//!
//! `Box<T>` delegates everything and exists to break recursive message
//! cycles (`Option<Box<Self>>`).

use bytes::{Buf, BufMut};

use crate::codec::{Proto, ProtoDecode, ProtoEncode};
use crate::error::DecodeError;
use crate::wire::WireType;

impl<T: Proto> Proto for Option<T> {
    const WIRE_TYPE: WireType = T::WIRE_TYPE;

    fn proto_default() -> Self {
        None
    }

    fn is_default(&self) -> bool {
        self.is_none()
    }
}

impl<T: ProtoDecode> ProtoDecode for Option<T> {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        self.get_or_insert_with(T::proto_default).merge_from(buf)
    }
}

impl<T: ProtoEncode> ProtoEncode for Option<T> {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        if let Some(value) = self {
            value.encode(buf);
        }
    }

    fn encoded_len(&self) -> usize {
        self.as_ref().map_or(0, ProtoEncode::encoded_len)
    }
}

impl<T: Proto> Proto for Box<T> {
    const WIRE_TYPE: WireType = T::WIRE_TYPE;

    fn proto_default() -> Self {
        Box::new(T::proto_default())
    }

    fn is_default(&self) -> bool {
        self.as_ref().is_default()
    }
}

impl<T: ProtoDecode> ProtoDecode for Box<T> {
    fn merge_from<B: Buf>(&mut self, buf: &mut B) -> Result<(), DecodeError> {
        self.as_mut().merge_from(buf)
    }
}

impl<T: ProtoEncode> ProtoEncode for Box<T> {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.as_ref().encode(buf);
    }

    fn encoded_len(&self) -> usize {
        self.as_ref().encoded_len()
    }
}
