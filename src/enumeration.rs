//! Protobuf enums.
//!
//! An enum is a varint on the wire and a closed name/number table in the
//! schema. [`proto_enum!`] declares the Rust enum together with its
//! [`EnumDescriptor`] and payload codec impls; the first listed variant is
//! the default and should carry number 0, per proto3 convention.
//!
//! A wire value with no matching variant is a recoverable
//! [`DecodeError::invalid_enum_value`]: the varint has been consumed, so
//! the message engine can drop the record and keep the field's previous
//! value. Callers that want strictness instead use
//! [`EnumDescriptor::resolve`] or [`ProtoEnum::resolve`].

use crate::error::DecodeError;

/// Static name/number table for one enum type.
#[derive(Debug)]
pub struct EnumDescriptor {
    name: &'static str,
    entries: &'static [(&'static str, i32)],
}

impl EnumDescriptor {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, i32)]) -> Self {
        EnumDescriptor { name, entries }
    }

    /// Type name of the enum.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Variant name for a number, if the number is in the schema.
    pub fn name_of(&self, number: i32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| *name)
    }

    /// Number for a variant name, matched case-insensitively.
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, number)| *number)
    }

    /// Strictly resolve a number or a symbolic name to a schema number.
    pub fn resolve<'a>(&self, input: impl Into<EnumInput<'a>>) -> Result<i32, DecodeError> {
        match input.into() {
            EnumInput::Number(number) => match self.name_of(number) {
                Some(_) => Ok(number),
                None => Err(DecodeError::invalid_enum_value(number)),
            },
            EnumInput::Name(name) => self
                .number_of(name)
                .ok_or_else(|| DecodeError::invalid_enum_name(name)),
        }
    }
}

/// Input accepted by [`EnumDescriptor::resolve`].
#[derive(Debug, Clone, Copy)]
pub enum EnumInput<'a> {
    Number(i32),
    Name(&'a str),
}

impl From<i32> for EnumInput<'_> {
    fn from(number: i32) -> Self {
        EnumInput::Number(number)
    }
}

impl<'a> From<&'a str> for EnumInput<'a> {
    fn from(name: &'a str) -> Self {
        EnumInput::Name(name)
    }
}

/// A Rust enum declared through [`proto_enum!`].
pub trait ProtoEnum: Copy + Default + Sized + 'static {
    fn descriptor() -> &'static EnumDescriptor;

    /// The variant for a wire number, if any.
    fn from_number(number: i32) -> Option<Self>;

    /// The wire number of this variant.
    fn number(self) -> i32;

    /// The schema name of this variant.
    fn name(self) -> &'static str;

    /// Strictly resolve a number or name to a variant.
    fn resolve<'a>(input: impl Into<EnumInput<'a>>) -> Result<Self, DecodeError> {
        let number = Self::descriptor().resolve(input)?;
        Self::from_number(number).ok_or_else(|| DecodeError::invalid_enum_value(number))
    }
}

/// Declares a protobuf enum: the Rust type, its [`EnumDescriptor`], and the
/// payload codec impls that make it usable as a varint field.
///
/// ```
/// prowire::proto_enum! {
///     pub enum Status {
///         Unknown = 0,
///         Active = 1,
///         Retired = 2,
///     }
/// }
/// ```
#[macro_export]
macro_rules! proto_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $first:ident = $first_num:expr
            $(, $rest:ident = $rest_num:expr)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $first,
            $($rest,)*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                $name::$first
            }
        }

        impl $crate::enumeration::ProtoEnum for $name {
            fn descriptor() -> &'static $crate::enumeration::EnumDescriptor {
                static DESCRIPTOR: $crate::enumeration::EnumDescriptor =
                    $crate::enumeration::EnumDescriptor::new(
                        ::core::stringify!($name),
                        &[
                            (::core::stringify!($first), $first_num),
                            $((::core::stringify!($rest), $rest_num),)*
                        ],
                    );
                &DESCRIPTOR
            }

            fn from_number(number: i32) -> ::core::option::Option<Self> {
                if number == $first_num {
                    return ::core::option::Option::Some($name::$first);
                }
                $(
                    if number == $rest_num {
                        return ::core::option::Option::Some($name::$rest);
                    }
                )*
                ::core::option::Option::None
            }

            fn number(self) -> i32 {
                match self {
                    $name::$first => $first_num,
                    $($name::$rest => $rest_num,)*
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $name::$first => ::core::stringify!($first),
                    $($name::$rest => ::core::stringify!($rest),)*
                }
            }
        }

        impl $crate::codec::Proto for $name {
            const WIRE_TYPE: $crate::wire::WireType = $crate::wire::WireType::Varint;

            fn proto_default() -> Self {
                ::core::default::Default::default()
            }

            fn is_default(&self) -> bool {
                $crate::enumeration::ProtoEnum::number(*self) == 0
            }
        }

        impl $crate::codec::ProtoDecode for $name {
            fn merge_from<B: $crate::bytes::Buf>(
                &mut self,
                buf: &mut B,
            ) -> ::core::result::Result<(), $crate::error::DecodeError> {
                let number =
                    <u64 as $crate::varint::Varint>::decode_varint(buf)? as i32;
                match <Self as $crate::enumeration::ProtoEnum>::from_number(number) {
                    ::core::option::Option::Some(variant) => {
                        *self = variant;
                        ::core::result::Result::Ok(())
                    }
                    ::core::option::Option::None => ::core::result::Result::Err(
                        $crate::error::DecodeError::invalid_enum_value(number),
                    ),
                }
            }
        }

        impl $crate::codec::ProtoEncode for $name {
            fn encode<B: $crate::bytes::BufMut>(&self, buf: &mut B) {
                let number = $crate::enumeration::ProtoEnum::number(*self);
                $crate::varint::Varint::encode_varint(number as i64 as u64, buf);
            }

            fn encoded_len(&self) -> usize {
                let number = $crate::enumeration::ProtoEnum::number(*self);
                $crate::varint::Varint::varint_len(number as i64 as u64)
            }
        }
    };
}
