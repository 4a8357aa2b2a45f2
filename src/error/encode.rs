//! Error types associated with encoding X.690 elements.

use alloc::{boxed::Box, string::ToString};

use snafu::Snafu;
#[cfg(feature = "backtraces")]
use snafu::{Backtrace, GenerateImplicitData};

use crate::codec::Codec;
use crate::tag::Tag;

/// An error returned when a typed accessor is asked to write a value that has
/// no encoding under the element's rules. Encoders are total on type-valid
/// inputs; only semantic violations fail.
#[derive(Debug)]
pub struct EncodeError {
    /// The inner encoding error.
    pub kind: Box<Kind>,
    /// The codec associated with the error.
    pub codec: Codec,
    /// The backtrace for the given error.
    #[cfg(feature = "backtraces")]
    pub backtrace: Backtrace,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} error: {}", self.codec, self.kind)
    }
}

impl core::error::Error for EncodeError {}

impl EncodeError {
    /// A helper function to construct an `EncodeError` from the given `kind`
    /// and `codec`.
    #[must_use]
    pub fn from_kind(kind: Kind, codec: Codec) -> Self {
        Self {
            kind: Box::new(kind),
            codec,
            #[cfg(feature = "backtraces")]
            backtrace: Backtrace::generate(),
        }
    }

    #[must_use]
    pub fn invalid_object_identifier(codec: Codec) -> Self {
        Self::from_kind(Kind::InvalidObjectIdentifier, codec)
    }

    #[must_use]
    pub fn invalid_character(tag: Tag, character: u32, codec: Codec) -> Self {
        Self::from_kind(Kind::InvalidCharacter { tag, character }, codec)
    }

    #[must_use]
    pub fn invalid_identification(context: &'static str, codec: Codec) -> Self {
        Self::from_kind(Kind::InvalidIdentification { context }, codec)
    }

    #[must_use]
    pub fn custom<D: core::fmt::Display>(msg: D, codec: Codec) -> Self {
        Self::from_kind(
            Kind::Custom {
                msg: msg.to_string(),
            },
            codec,
        )
    }
}

/// Every way an encode can fail.
#[derive(Snafu)]
#[snafu(visibility(pub(crate)))]
#[derive(Debug)]
#[non_exhaustive]
pub enum Kind {
    /// The arcs violate the X.660 object identifier root constraints.
    #[snafu(display("object identifier must have two root arcs within range"))]
    InvalidObjectIdentifier,

    /// A character outside the type's permitted alphabet.
    #[snafu(display("character {character:#x} not permitted by {tag}"))]
    InvalidCharacter {
        /// The universal tag of the string type.
        tag: Tag,
        /// The offending character.
        character: u32,
    },

    /// NaN has no X.690 encoding.
    #[snafu(display("NaN cannot be encoded as a REAL"))]
    RealNotANumber,

    /// A REAL exponent does not fit the 16-bit range the encoder supports.
    #[snafu(display("real exponent does not fit in 16 bits"))]
    ExponentOverflow,

    /// An identification variant the canonical codecs forbid.
    #[snafu(display("identification variant not permitted for {context}"))]
    InvalidIdentification {
        /// The operation that rejected the variant.
        context: &'static str,
    },

    /// Uncategorised error.
    #[snafu(display("{msg}"))]
    Custom {
        /// The error's message.
        msg: alloc::string::String,
    },
}
