//! Error types associated with decoding X.690 elements.

use alloc::{boxed::Box, string::ToString};

use snafu::Snafu;
#[cfg(feature = "backtraces")]
use snafu::{Backtrace, GenerateImplicitData};

use crate::codec::Codec;
use crate::tag::{Class, Tag};

/// An error returned when a buffer does not hold a valid encoding of an
/// element, or when a typed accessor is read from contents that do not form a
/// valid value of that type.
///
/// `kind` is the specific rule that was violated, `codec` the set of encoding
/// rules that was being applied when it happened.
#[derive(Debug)]
pub struct DecodeError {
    /// The kind of decoding error received.
    pub kind: Box<Kind>,
    /// The codec that returned the error.
    pub codec: Codec,
    /// The backtrace associated with the error.
    #[cfg(feature = "backtraces")]
    pub backtrace: Backtrace,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} error: {}", self.codec, self.kind)
    }
}

impl core::error::Error for DecodeError {}

impl DecodeError {
    /// Creates a new error from a given decode error kind and codec.
    #[must_use]
    pub fn from_kind(kind: Kind, codec: Codec) -> Self {
        Self {
            kind: Box::new(kind),
            codec,
            #[cfg(feature = "backtraces")]
            backtrace: Backtrace::generate(),
        }
    }

    /// Checks that contents have the expected number of octets.
    pub fn assert_length(expected: usize, actual: usize, codec: Codec) -> Result<(), DecodeError> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::from_kind(
                Kind::MismatchedLength { expected, actual },
                codec,
            ))
        }
    }

    /// Checks that a child element carries the tag its parent requires.
    pub fn assert_tag(expected: Tag, actual: Tag, codec: Codec) -> Result<(), DecodeError> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::from_kind(
                Kind::MismatchedTag { expected, actual },
                codec,
            ))
        }
    }

    #[must_use]
    pub fn incomplete(needed: nom::Needed, codec: Codec) -> Self {
        Self::from_kind(Kind::Incomplete { needed }, codec)
    }

    #[must_use]
    pub fn recursion_limit_exceeded(limit: usize, codec: Codec) -> Self {
        Self::from_kind(Kind::RecursionLimitExceeded { limit }, codec)
    }

    #[must_use]
    pub fn integer_overflow(max_width: u32, codec: Codec) -> Self {
        Self::from_kind(Kind::IntegerOverflow { max_width }, codec)
    }

    #[must_use]
    pub fn invalid_character(tag: Tag, character: u32, codec: Codec) -> Self {
        Self::from_kind(Kind::InvalidCharacter { tag, character }, codec)
    }

    #[must_use]
    pub fn invalid_date(msg: alloc::string::String, codec: Codec) -> Self {
        Self::from_kind(Kind::InvalidDate { msg }, codec)
    }

    #[must_use]
    pub fn missing_field(name: &'static str, codec: Codec) -> Self {
        Self::from_kind(Kind::MissingField { name }, codec)
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

    pub(crate) fn map_nom_err<T: core::fmt::Debug>(
        error: nom::Err<nom::error::Error<T>>,
        codec: Codec,
    ) -> DecodeError {
        let msg = match error {
            nom::Err::Incomplete(needed) => return DecodeError::incomplete(needed, codec),
            err => alloc::format!("parsing failure: {err}"),
        };
        DecodeError::custom(msg, codec)
    }
}

/// Every way a decode can fail.
#[derive(Snafu)]
#[snafu(visibility(pub(crate)))]
#[derive(Debug)]
#[non_exhaustive]
pub enum Kind {
    /// The buffer ended inside an element.
    #[snafu(display("need more data to continue: ({needed:?})"))]
    Incomplete {
        /// Amount of bytes needed.
        needed: nom::Needed,
    },

    /// Constructed values were nested deeper than the decoder permits.
    #[snafu(display("constructed values nested deeper than the limit of {limit}"))]
    RecursionLimitExceeded {
        /// The nesting budget that was exhausted.
        limit: usize,
    },

    /// A long-form tag number began with the padding octet `0x80`.
    #[snafu(display("long-form tag number encoded with a leading zero octet"))]
    NonMinimalTagNumber,

    /// A long-form tag number does not fit the platform's tag width.
    #[snafu(display("tag number larger than the supported {max_width} bits"))]
    TagOverflow {
        /// The maximum tag width.
        max_width: u32,
    },

    /// A child element carried a different tag than its context requires.
    #[snafu(display("expected {expected} tag, actual tag: {actual}"))]
    MismatchedTag {
        /// The expected tag.
        expected: Tag,
        /// The actual tag.
        actual: Tag,
    },

    /// An element failed a caller-supplied tag validation.
    #[snafu(display("unexpected tag [{class} {value}] in {context}"))]
    UnexpectedTag {
        /// The operation that rejected the tag.
        context: &'static str,
        /// The tag's class.
        class: Class,
        /// The tag's number.
        value: u32,
    },

    /// The reserved length octet `0xFF` was encountered.
    #[snafu(display("reserved length octet 0xFF encountered"))]
    ReservedLengthOctet,

    /// Indefinite length encountered on a primitive element, or at all under
    /// DER.
    #[snafu(display("indefinite length encountered but not allowed"))]
    IndefiniteLengthNotAllowed,

    /// A canonical codec received a length that was not encoded in its
    /// shortest form.
    #[snafu(display("length octets are not in their shortest form"))]
    NonMinimalLength,

    /// The length does not fit the platform's address width.
    #[snafu(display("length larger than possible to address on this platform"))]
    LengthExceedsPlatformWidth,

    /// CER received a primitive string-type element longer than the limit
    /// past which fragmentation is mandatory.
    #[snafu(display(
        "primitive string of {length} octets exceeds the limit of 1000 and must be fragmented"
    ))]
    FragmentationRequired {
        /// The offending contents length.
        length: usize,
    },

    /// The contents do not hold the number of octets the type requires.
    #[snafu(display("expected {expected} octets of contents, actual: {actual}"))]
    MismatchedLength {
        /// The expected length.
        expected: usize,
        /// The actual length.
        actual: usize,
    },

    /// A constructed encoding was found where the codec or the type requires
    /// a primitive one.
    #[snafu(display("constructed encoding encountered but not allowed"))]
    ConstructedEncodingNotAllowed,

    /// A primitive encoding was found where the type requires a constructed
    /// one.
    #[snafu(display("primitive encoding encountered where constructed is required"))]
    ConstructedEncodingRequired,

    /// A decoded integer does not fit the requested fixed-width type.
    #[snafu(display("actual integer larger than expected {max_width} bits"))]
    IntegerOverflow {
        /// The maximum integer width.
        max_width: u32,
    },

    /// A canonical codec received an integer with redundant leading octets.
    #[snafu(display("integer encoded with redundant leading octets"))]
    NonMinimalInteger,

    /// BOOL contents are not `0` or `0xFF` under a canonical codec.
    #[snafu(display("bool value is not `0` or `0xFF` as canonical rules require: {value:#04x}"))]
    InvalidBool {
        /// The offending octet.
        value: u8,
    },

    /// BIT STRING contents declare an invalid amount of unused bits.
    #[snafu(display("bit string declares an invalid amount of unused bits: {bits}"))]
    InvalidBitString {
        /// The declared amount of unused bits.
        bits: u8,
    },

    /// Unused trailing bits hold nonzero values where zeroes are required.
    #[snafu(display("bit string padding bits are not zero"))]
    NonZeroPaddingBits,

    /// A character outside the type's permitted alphabet.
    #[snafu(display("character {character:#x} not permitted by {tag}"))]
    InvalidCharacter {
        /// The universal tag of the string type.
        tag: Tag,
        /// The offending character.
        character: u32,
    },

    /// OBJECT IDENTIFIER with missing or corrupt root arcs.
    #[snafu(display("invalid object identifier with missing or corrupt root arcs"))]
    InvalidObjectIdentifier,

    /// An arc was encoded with a leading `0x80` continuation octet.
    #[snafu(display("object identifier arc encoded with a leading zero octet"))]
    NonMinimalArc,

    /// Invalid date.
    #[snafu(display("invalid date string: {msg}"))]
    InvalidDate {
        /// The reason as string.
        msg: alloc::string::String,
    },

    /// Invalid UTF-8, UTF-16, or UTF-32 data inside a character string.
    #[snafu(display("string contents are not valid in the type's character encoding"))]
    InvalidUtf8,

    /// REAL contents that match none of the defined encodings.
    #[snafu(display("contents do not hold a valid real value"))]
    InvalidReal,

    /// A CHOICE carried an alternative its context forbids.
    #[snafu(display("invalid {tag} alternative for {context}"))]
    InvalidChoice {
        /// The CHOICE that rejected the alternative.
        context: &'static str,
        /// The alternative's tag.
        tag: Tag,
    },

    /// A required component of a constructed value was absent.
    #[snafu(display("missing component `{name}`"))]
    MissingField {
        /// The component's name.
        name: &'static str,
    },

    /// Unexpected extra data found after a complete element.
    #[snafu(display("unexpected extra data found: length `{length}` bytes"))]
    UnexpectedExtraData {
        /// The amount of trailing data.
        length: usize,
    },

    /// Uncategorised error.
    #[snafu(display("{msg}"))]
    Custom {
        /// The error's message.
        msg: alloc::string::String,
    },
}
