//! Surrogate fields: custom in-memory representations over a standard wire
//! type.
//!
//! A surrogate field stores a `Custom` value on the message while encoding
//! and decoding through an ordinary `Raw` payload codec. The two directions
//! are plain function pointers so a [`Conversion`] can live in a `static`
//! descriptor:
//!
//! * `to_custom` runs after decode; rejecting the raw value is a
//!   recoverable [`crate::error::DecodeError::invalid_surrogate`], leaving
//!   the field's previous custom value in place.
//! * `from_custom` runs before encode; returning `None` elides the field,
//!   which is how a surrogate expresses "default".

use crate::error::DecodeError;

/// Conversion pair between a wire representation and a custom one.
pub struct Conversion<Raw, Custom> {
    pub to_custom: fn(Raw) -> Result<Custom, DecodeError>,
    pub from_custom: fn(&Custom) -> Option<Raw>,
}

impl<Raw, Custom> Clone for Conversion<Raw, Custom> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Raw, Custom> Copy for Conversion<Raw, Custom> {}
