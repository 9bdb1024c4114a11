//! `prowire` is a runtime codec for the [Protocol Buffers wire
//! format](https://protobuf.dev/programming-guides/encoding/).
//!
//! There is no code generation step: message types are plain Rust structs
//! bound to a [`message::MessageDescriptor`] that maps field numbers to
//! accessors and codecs. The layers, bottom up:
//!
//! * [`varint`] and [`wire`] - varints, field keys, wire types, skipping.
//! * [`codec`] - payload codecs for scalars, strings, bytes, wrappers, and
//!   map entries.
//! * [`field`] - one field record: key handling, wire-type validation,
//!   default elision.
//! * [`message`], [`oneof`], [`enumeration`], [`surrogate`] - the message
//!   engine and the composite field kinds.
//!
//! Decoding always merges into an existing value, matching protobuf's rule
//! that concatenated encodings decode to merged messages. Malformed framing
//! aborts a decode; errors confined to one record (a wire-type mismatch, an
//! unknown enum value, a rejected surrogate) drop that record and continue.

// Macro-generated code refers to these through `$crate`.
pub use bytes;

pub mod codec;
pub mod enumeration;
pub mod error;
pub mod field;
pub mod message;
pub mod oneof;
pub mod surrogate;
pub mod varint;
pub mod wire;

pub use codec::{Proto, ProtoDecode, ProtoEncode};
pub use error::{DecodeError, DecodeErrorKind};
pub use message::{Message, MessageDescriptor};
pub use wire::WireType;
