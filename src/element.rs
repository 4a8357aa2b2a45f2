//! The element model: one Tag-Length-Value unit per [`Element`], with typed
//! accessors for every universal type. The three codec variants are the three
//! concrete instantiations [`BerElement`], [`CerElement`], and [`DerElement`];
//! all behavioral divergence between them lives in the canonicalization rules
//! applied while framing and in the CER fragmentation of large strings.

mod constructed;
mod strings;
mod time;

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::codec::Codec;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::parser;
use crate::real::{self, RealFormat};
use crate::rules::{Ber, Cer, Der, EncodingRules, Variant};
use crate::tag::{Class, Tag};
use crate::types::{
    oid::{self, MAX_OID_SECOND_OCTET},
    Integer, ObjectIdentifier, RelativeOid,
};

/// A single ASN.1 element: tag, construction, and exclusively owned value
/// octets.
///
/// Typed accessors come in `read`/`write` pairs; writing places the value's
/// contents octets in the canonical form the variant mandates, and
/// [`to_bytes`][Self::to_bytes] prepends the identifier and length octets.
/// Accessors never change the element's tag, so implicitly tagged values can
/// be written by setting the tag first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Element<R: Variant> {
    tag: Tag,
    constructed: bool,
    indefinite: bool,
    value: Vec<u8>,
    rules: PhantomData<R>,
}

/// An element encoded under the Basic Encoding Rules.
pub type BerElement = Element<Ber>;
/// An element encoded under the Canonical Encoding Rules.
pub type CerElement = Element<Cer>;
/// An element encoded under the Distinguished Encoding Rules.
pub type DerElement = Element<Der>;

impl<R: Variant> Default for Element<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Variant> Element<R> {
    /// Creates a new element in the default end-of-content state: universal
    /// class, primitive, tag number 0, empty value.
    pub fn new() -> Self {
        Self {
            tag: Tag::EOC,
            constructed: false,
            indefinite: false,
            value: Vec::new(),
            rules: PhantomData,
        }
    }

    /// Creates an element carrying `tag` and empty contents, ready for an
    /// accessor write.
    pub fn with_tag(tag: Tag) -> Self {
        Self {
            tag,
            ..Self::new()
        }
    }

    pub(crate) fn codec() -> Codec {
        R::RULES.codec()
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    pub fn tag_class(&self) -> Class {
        self.tag.class
    }

    pub fn set_tag_class(&mut self, class: Class) {
        self.tag.class = class;
    }

    pub fn tag_number(&self) -> u32 {
        self.tag.value
    }

    pub fn set_tag_number(&mut self, number: u32) {
        self.tag.value = number;
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub fn is_primitive(&self) -> bool {
        !self.constructed
    }

    pub fn set_constructed(&mut self, constructed: bool) {
        self.constructed = constructed;
    }

    pub fn is_universal(&self) -> bool {
        self.tag.class == Class::Universal
    }

    pub fn is_application(&self) -> bool {
        self.tag.class == Class::Application
    }

    pub fn is_context_specific(&self) -> bool {
        self.tag.class == Class::Context
    }

    pub fn is_private(&self) -> bool {
        self.tag.class == Class::Private
    }

    /// Whether this element is in the end-of-content state.
    pub fn is_end_of_content(&self) -> bool {
        self.tag == Tag::EOC && !self.constructed && self.value.is_empty()
    }

    /// The raw contents octets: abstract contents verbatim for a primitive
    /// element, concatenated child encodings for a constructed one.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Replaces the contents octets verbatim, leaving tag and construction
    /// untouched.
    pub fn set_value(&mut self, value: Vec<u8>) {
        self.value = value;
    }

    /// The number of contents octets.
    pub fn length(&self) -> usize {
        self.value.len()
    }

    /// Guards an element against an unexpected tag, naming `context` in the
    /// error. Empty class or number lists accept anything; `construction` of
    /// `None` accepts either form.
    pub fn validate_tag(
        &self,
        classes: &[Class],
        construction: Option<bool>,
        numbers: &[u32],
        context: &'static str,
    ) -> Result<(), DecodeError> {
        let acceptable = (classes.is_empty() || classes.contains(&self.tag.class))
            && construction.is_none_or(|constructed| constructed == self.constructed)
            && (numbers.is_empty() || numbers.contains(&self.tag.value));

        if acceptable {
            Ok(())
        } else {
            Err(DecodeError::from_kind(
                DecodeErrorKind::UnexpectedTag {
                    context,
                    class: self.tag.class,
                    value: self.tag.value,
                },
                Self::codec(),
            ))
        }
    }

    /// Parses exactly one element from the front of `input`, returning the
    /// element and the unconsumed remainder. On failure the caller's buffer
    /// is untouched and remains inspectable.
    pub fn from_bytes(input: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (rest, parsed) = parser::parse_element(R::RULES, input)?;
        Ok((
            Self {
                tag: parsed.identifier.tag,
                constructed: parsed.identifier.constructed,
                indefinite: parsed.indefinite,
                value: parsed.contents.to_vec(),
                rules: PhantomData,
            },
            rest,
        ))
    }

    /// Parses one element and requires it to span the whole buffer.
    pub fn decode(input: &[u8]) -> Result<Self, DecodeError> {
        let (element, rest) = Self::from_bytes(input)?;
        if rest.is_empty() {
            Ok(element)
        } else {
            Err(DecodeError::from_kind(
                DecodeErrorKind::UnexpectedExtraData { length: rest.len() },
                Self::codec(),
            ))
        }
    }

    /// Serializes the element: identifier octets, length octets, value, and
    /// an end-of-contents marker when the framing is indefinite.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.value.len() + 6);
        encode_identifier(self.tag, self.constructed, &mut output);

        if self.uses_indefinite() {
            output.push(0x80);
            output.extend_from_slice(&self.value);
            output.extend_from_slice(parser::EOC);
        } else {
            encode_definite_length(self.value.len(), &mut output);
            output.extend_from_slice(&self.value);
        }

        output
    }

    fn uses_indefinite(&self) -> bool {
        self.constructed
            && match R::RULES {
                EncodingRules::Ber => self.indefinite,
                EncodingRules::Cer => true,
                EncodingRules::Der => false,
            }
    }

    /// The contents octets of an element that must be primitive for the
    /// requested type.
    fn primitive_contents(&self) -> Result<&[u8], DecodeError> {
        if self.constructed {
            Err(DecodeError::from_kind(
                DecodeErrorKind::ConstructedEncodingNotAllowed,
                Self::codec(),
            ))
        } else {
            Ok(&self.value)
        }
    }

    fn write_primitive(&mut self, contents: Vec<u8>) {
        self.constructed = false;
        self.indefinite = false;
        self.value = contents;
    }

    /// Reads the element as a `BOOLEAN`. BER accepts any nonzero octet as
    /// `true`; CER and DER accept only `0xFF`.
    pub fn boolean(&self) -> Result<bool, DecodeError> {
        let contents = self.primitive_contents()?;
        DecodeError::assert_length(1, contents.len(), Self::codec())?;
        match contents[0] {
            0 => Ok(false),
            0xFF => Ok(true),
            _ if R::RULES.is_ber() => Ok(true),
            value => Err(DecodeError::from_kind(
                DecodeErrorKind::InvalidBool { value },
                Self::codec(),
            )),
        }
    }

    pub fn set_boolean(&mut self, value: bool) {
        self.write_primitive(alloc::vec![if value { 0xFF } else { 0x00 }]);
    }

    /// Reads the element as an `INTEGER` of arbitrary precision.
    pub fn integer(&self) -> Result<Integer, DecodeError> {
        let contents = self.primitive_contents()?;
        if contents.is_empty() {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::MismatchedLength {
                    expected: 1,
                    actual: 0,
                },
                Self::codec(),
            ));
        }
        if R::RULES.is_canonical() && contents.len() > 1 {
            let redundant = (contents[0] == 0x00 && contents[1] & 0x80 == 0)
                || (contents[0] == 0xFF && contents[1] & 0x80 != 0);
            if redundant {
                return Err(DecodeError::from_kind(
                    DecodeErrorKind::NonMinimalInteger,
                    Self::codec(),
                ));
            }
        }

        Ok(Integer::from_signed_bytes_be(contents))
    }

    /// Reads the element as an `INTEGER` narrowed into a fixed-width type,
    /// failing when the decoded value does not fit.
    pub fn integer_into<I: TryFrom<Integer>>(&self) -> Result<I, DecodeError> {
        I::try_from(self.integer()?).map_err(|_| {
            DecodeError::integer_overflow(core::mem::size_of::<I>() as u32 * 8, Self::codec())
        })
    }

    /// Writes an `INTEGER` as two's-complement big-endian contents with no
    /// redundant leading octets; zero is the single octet `0x00`.
    pub fn set_integer(&mut self, value: impl Into<Integer>) {
        self.write_primitive(value.into().to_signed_bytes_be());
    }

    /// Reads the element as an `ENUMERATED` value, encoded identically to
    /// `INTEGER`.
    pub fn enumerated(&self) -> Result<Integer, DecodeError> {
        self.integer()
    }

    pub fn set_enumerated(&mut self, value: impl Into<Integer>) {
        self.set_integer(value);
    }

    /// Reads the element as `NULL`, enforcing empty contents.
    pub fn null(&self) -> Result<(), DecodeError> {
        let contents = self.primitive_contents()?;
        DecodeError::assert_length(0, contents.len(), Self::codec())
    }

    pub fn set_null(&mut self) {
        self.write_primitive(Vec::new());
    }

    /// Reads the element as an `OBJECT IDENTIFIER`.
    pub fn object_identifier(&self) -> Result<ObjectIdentifier, DecodeError> {
        let codec = Self::codec();
        let contents = self.primitive_contents()?;
        if contents.is_empty() {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::InvalidObjectIdentifier,
                codec,
            ));
        }

        let subidentifiers = oid::parse_arcs(contents, codec)?;
        let mut arcs = Vec::with_capacity(subidentifiers.len() + 1);

        // The leading subidentifier folds the first two arcs together as
        // `40 * first + second` (X.690 8.19.4).
        const THRESHOLD: u32 = MAX_OID_SECOND_OCTET + 1;
        let root = subidentifiers[0];
        if root >= u64::from(oid::MAX_OID_FIRST_OCTET * THRESHOLD) {
            arcs.push(oid::MAX_OID_FIRST_OCTET);
            let second = root - u64::from(oid::MAX_OID_FIRST_OCTET * THRESHOLD);
            arcs.push(
                u32::try_from(second)
                    .map_err(|_| DecodeError::integer_overflow(32, codec))?,
            );
        } else {
            let root = root as u32;
            arcs.push(root / THRESHOLD);
            arcs.push(root % THRESHOLD);
        }

        for subidentifier in &subidentifiers[1..] {
            arcs.push(
                u32::try_from(*subidentifier)
                    .map_err(|_| DecodeError::integer_overflow(32, codec))?,
            );
        }

        ObjectIdentifier::new(arcs).ok_or_else(|| {
            DecodeError::from_kind(DecodeErrorKind::InvalidObjectIdentifier, codec)
        })
    }

    /// Writes an `OBJECT IDENTIFIER`; the type's invariants guarantee the
    /// root arcs are encodable.
    pub fn set_object_identifier(&mut self, oid: &ObjectIdentifier) {
        let arcs = oid.arcs();
        let mut contents = Vec::with_capacity(arcs.len() + 1);

        const THRESHOLD: u64 = MAX_OID_SECOND_OCTET as u64 + 1;
        encode_base128(u64::from(arcs[0]) * THRESHOLD + u64::from(arcs[1]), &mut contents);
        for arc in &arcs[2..] {
            encode_base128(u64::from(*arc), &mut contents);
        }

        self.write_primitive(contents);
    }

    /// Reads the element as a `RELATIVE-OID`.
    pub fn relative_oid(&self) -> Result<RelativeOid, DecodeError> {
        let codec = Self::codec();
        let contents = self.primitive_contents()?;
        let arcs = oid::parse_arcs(contents, codec)?
            .into_iter()
            .map(|arc| u32::try_from(arc).map_err(|_| DecodeError::integer_overflow(32, codec)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RelativeOid::new(arcs))
    }

    pub fn set_relative_oid(&mut self, oid: &RelativeOid) {
        let mut contents = Vec::with_capacity(oid.arcs().len());
        for arc in oid.arcs() {
            encode_base128(u64::from(*arc), &mut contents);
        }
        self.write_primitive(contents);
    }

    /// Reads the element as a `REAL`.
    pub fn real(&self) -> Result<f64, DecodeError> {
        real::decode(self.primitive_contents()?, Self::codec())
    }

    /// Writes a `REAL` in the canonical base-2 binary form.
    pub fn set_real(&mut self, value: f64) -> Result<(), EncodeError> {
        self.set_real_with(value, RealFormat::default())
    }

    /// Writes a `REAL` in the requested representation.
    pub fn set_real_with(&mut self, value: f64, format: RealFormat) -> Result<(), EncodeError> {
        let contents = real::encode(value, format, Self::codec())?;
        self.write_primitive(contents);
        Ok(())
    }
}

impl Element<Ber> {
    /// Whether [`to_bytes`][Self::to_bytes] frames this element with an
    /// indefinite length. Only consulted for constructed values.
    pub fn indefinite_length(&self) -> bool {
        self.indefinite
    }

    /// Sets the length-encoding preference. CER chooses its framing
    /// automatically and DER has no such choice, so the preference exists on
    /// BER elements only.
    pub fn set_indefinite_length(&mut self, indefinite: bool) {
        self.indefinite = indefinite;
    }
}

/// Emits the identifier octets for `tag`. Tag numbers below 31 use the short
/// form; larger numbers use the shortest big-endian base-128 long form.
///
/// ```text
/// ---------------------------------
/// | 0 | 0 | 0 | 0 | 0 | 0 | 0 | 0 |
/// ---------------------------------
/// | class | E |    Tag number     |
/// ---------------------------------
/// ```
pub(crate) fn encode_identifier(tag: Tag, constructed: bool, output: &mut Vec<u8>) {
    const FIVE_BITS: u32 = (1 << 5) - 1;
    let mut tag_byte = tag.class as u8;

    // Constructed is a single bit of the identifier octet.
    tag_byte <<= 1;
    tag_byte |= u8::from(constructed);
    tag_byte <<= 5;

    if tag.value >= FIVE_BITS {
        output.push(tag_byte | FIVE_BITS as u8);
        encode_base128(u64::from(tag.value), output);
    } else {
        output.push(tag_byte | tag.value as u8);
    }
}

pub(crate) fn encode_base128(number: u64, buffer: &mut Vec<u8>) {
    // Ten septets cover a full u64. Split from the low end, then emit high
    // to low with the continuation bit on everything but the last.
    let mut septets = [0u8; 10];
    let mut count = 0;
    let mut remaining = number;

    loop {
        septets[count] = (remaining & 0x7F) as u8;
        count += 1;
        remaining >>= 7;
        if remaining == 0 {
            break;
        }
    }

    for index in (1..count).rev() {
        buffer.push(septets[index] | 0x80);
    }
    buffer.push(septets[0]);
}

pub(crate) fn encode_definite_length(length: usize, output: &mut Vec<u8>) {
    if length <= 0x7F {
        output.push(length as u8);
        return;
    }

    let octets = length.to_be_bytes();
    let first = octets
        .iter()
        .position(|octet| *octet != 0)
        .unwrap_or(octets.len() - 1);
    let significant = &octets[first..];

    output.push(0x80 | significant.len() as u8);
    output.extend_from_slice(significant);
}
