//! Streaming parsers for the identifier, length, and contents regions of one
//! X.690 element.

use crate::codec::Codec;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::rules::{EncodingRules, MAX_FRAGMENT_LENGTH};
use crate::tag::{Class, Tag};

pub(crate) const EOC: &[u8] = &[0, 0];

/// How deep indefinite-length values may nest before the parser gives up.
/// Guards against crafted inputs that would otherwise exhaust the stack.
pub(crate) const NESTING_LIMIT: usize = 128;

/// The identifier region of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Identifier {
    pub tag: Tag,
    pub constructed: bool,
}

/// One element lifted off the wire. `contents` excludes the end-of-contents
/// marker when `indefinite` is set.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Parsed<'input> {
    pub identifier: Identifier,
    pub contents: &'input [u8],
    pub indefinite: bool,
}

type Result<T, E = DecodeError> = core::result::Result<T, E>;

fn take(input: &[u8], count: usize, codec: Codec) -> Result<(&[u8], &[u8])> {
    nom::bytes::streaming::take::<_, _, nom::error::Error<&[u8]>>(count)(input)
        .map_err(|e| DecodeError::map_nom_err(e, codec))
}

/// Parses exactly one element, returning the remainder of the input.
pub(crate) fn parse_element(rules: EncodingRules, input: &[u8]) -> Result<(&[u8], Parsed<'_>)> {
    parse_element_at_depth(rules, input, NESTING_LIMIT)
}

fn parse_element_at_depth(
    rules: EncodingRules,
    input: &[u8],
    depth: usize,
) -> Result<(&[u8], Parsed<'_>)> {
    let codec = rules.codec();
    let (input, identifier) = parse_identifier(input, codec)?;
    let (input, first) = take(input, 1, codec)?;

    match first[0] {
        0xFF => Err(DecodeError::from_kind(
            DecodeErrorKind::ReservedLengthOctet,
            codec,
        )),
        0x80 => {
            if !identifier.constructed || !rules.allows_indefinite() {
                return Err(DecodeError::from_kind(
                    DecodeErrorKind::IndefiniteLengthNotAllowed,
                    codec,
                ));
            }

            let mut rest = input;
            loop {
                if rest.starts_with(EOC) {
                    break;
                }
                if rest.is_empty() {
                    return Err(DecodeError::incomplete(
                        nom::Needed::new(EOC.len()),
                        codec,
                    ));
                }
                if depth == 0 {
                    return Err(DecodeError::recursion_limit_exceeded(NESTING_LIMIT, codec));
                }
                let (r, _) = parse_element_at_depth(rules, rest, depth - 1)?;
                rest = r;
            }

            let contents = &input[..input.len() - rest.len()];
            Ok((
                &rest[EOC.len()..],
                Parsed {
                    identifier,
                    contents,
                    indefinite: true,
                },
            ))
        }
        length @ 0..=0x7F => {
            let (rest, contents) = take(input, length as usize, codec)?;
            check_fragmentation(rules, identifier, contents)?;
            Ok((
                rest,
                Parsed {
                    identifier,
                    contents,
                    indefinite: false,
                },
            ))
        }
        length => {
            let (input, length_octets) = take(input, (length & 0x7F) as usize, codec)?;
            let length = parse_long_length(rules, length_octets, codec)?;
            let (rest, contents) = take(input, length, codec)?;
            check_fragmentation(rules, identifier, contents)?;
            Ok((
                rest,
                Parsed {
                    identifier,
                    contents,
                    indefinite: false,
                },
            ))
        }
    }
}

/// Parses the initial identifier octet and any long-form tag number octets.
pub(crate) fn parse_identifier(input: &[u8], codec: Codec) -> Result<(&[u8], Identifier)> {
    let (input, octet) = take(input, 1, codec)?;
    let initial_octet = octet[0];

    let class = Class::from_bits(initial_octet >> 6);
    let constructed = (initial_octet & 0x20) != 0;
    let number = u32::from(initial_octet & 0x1F);

    let (input, number) = if number == 0x1F {
        parse_long_tag_number(input, codec)?
    } else {
        (input, number)
    };

    Ok((
        input,
        Identifier {
            tag: Tag::new(class, number),
            constructed,
        },
    ))
}

/// Big-endian base-128 tag number: 7 bits per octet, continuation in the
/// eighth bit. X.690 8.1.2.4.2 requires the first octet to be nonzero.
fn parse_long_tag_number(input: &[u8], codec: Codec) -> Result<(&[u8], u32)> {
    let mut number: u32 = 0;

    for (consumed, octet) in input.iter().copied().enumerate() {
        if consumed == 0 && octet == 0x80 {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::NonMinimalTagNumber,
                codec,
            ));
        }
        if number > u32::MAX >> 7 {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::TagOverflow { max_width: 32 },
                codec,
            ));
        }
        number = (number << 7) | u32::from(octet & 0x7F);
        if octet & 0x80 == 0 {
            return Ok((&input[consumed + 1..], number));
        }
    }

    Err(DecodeError::incomplete(nom::Needed::new(1), codec))
}

/// Folds definite-long length octets into a `usize`, enforcing the canonical
/// minimality rules for CER and DER.
fn parse_long_length(rules: EncodingRules, octets: &[u8], codec: Codec) -> Result<usize> {
    debug_assert!(!octets.is_empty());

    if rules.is_canonical() && octets[0] == 0 {
        return Err(DecodeError::from_kind(
            DecodeErrorKind::NonMinimalLength,
            codec,
        ));
    }

    let significant = match octets.iter().position(|octet| *octet != 0) {
        Some(first) => &octets[first..],
        None => &[],
    };

    if significant.len() > core::mem::size_of::<usize>() {
        return Err(DecodeError::from_kind(
            DecodeErrorKind::LengthExceedsPlatformWidth,
            codec,
        ));
    }

    let length = significant
        .iter()
        .fold(0usize, |length, octet| (length << 8) | usize::from(*octet));

    if rules.is_canonical() && length <= 0x7F {
        return Err(DecodeError::from_kind(
            DecodeErrorKind::NonMinimalLength,
            codec,
        ));
    }

    Ok(length)
}

/// CER forbids the definite forms for primitive string values past the
/// fragmentation limit (X.690 9.2).
fn check_fragmentation(
    rules: EncodingRules,
    identifier: Identifier,
    contents: &[u8],
) -> Result<()> {
    if rules.is_cer()
        && !identifier.constructed
        && identifier.tag.is_fragmentable_string()
        && contents.len() > MAX_FRAGMENT_LENGTH
    {
        return Err(DecodeError::from_kind(
            DecodeErrorKind::FragmentationRequired {
                length: contents.len(),
            },
            rules.codec(),
        ));
    }

    Ok(())
}
