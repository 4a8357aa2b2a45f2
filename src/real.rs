//! Codec for the `REAL` type (X.690 8.5): special values, ISO 6093 decimal
//! character strings, and base-2/8/16 binary encodings.

use alloc::vec::Vec;

use num_traits::float::FloatCore;

use crate::codec::Codec;
use crate::error::{DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind};
use crate::tag::Tag;

const PLUS_INFINITY: u8 = 0x40;
const MINUS_INFINITY: u8 = 0x41;
const NOT_A_NUMBER: u8 = 0x42;
const MINUS_ZERO: u8 = 0x43;

/// The representation a `REAL` accessor writes.
///
/// This replaces the original process-wide encoding-base switch: the choice
/// travels with the call instead of mutating global state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RealFormat {
    /// Base-2 binary with the mantissa normalized to be odd or zero.
    #[default]
    Binary,
    /// ISO 6093 NR1: an integer character string.
    Nr1,
    /// ISO 6093 NR2: a fixed decimal-point character string.
    Nr2,
    /// ISO 6093 NR3: an exponential character string.
    Nr3,
}

type DecodeResult<T> = Result<T, DecodeError>;

pub(crate) fn decode(contents: &[u8], codec: Codec) -> DecodeResult<f64> {
    let Some((&info, rest)) = contents.split_first() else {
        return Ok(0.0);
    };

    if info & 0x80 != 0 {
        decode_binary(info, rest, codec)
    } else if info & 0x40 != 0 {
        DecodeError::assert_length(1, contents.len(), codec)?;
        match info {
            PLUS_INFINITY => Ok(f64::infinity()),
            MINUS_INFINITY => Ok(f64::neg_infinity()),
            NOT_A_NUMBER => Ok(f64::nan()),
            MINUS_ZERO => Ok(-0.0),
            _ => Err(DecodeError::from_kind(DecodeErrorKind::InvalidReal, codec)),
        }
    } else {
        decode_decimal(info, rest, codec)
    }
}

fn decode_binary(info: u8, rest: &[u8], codec: Codec) -> DecodeResult<f64> {
    let invalid = || DecodeError::from_kind(DecodeErrorKind::InvalidReal, codec);

    let base: f64 = match (info & 0x30) >> 4 {
        0 => 2.0,
        1 => 8.0,
        2 => 16.0,
        _ => return Err(invalid()),
    };
    let scale = i32::from((info & 0x0C) >> 2);

    let (exponent_octets, mantissa_octets) = match info & 0x03 {
        format @ 0..=2 => {
            let count = usize::from(format) + 1;
            rest.split_at_checked(count).ok_or_else(invalid)?
        }
        _ => {
            let (&count, rest) = rest.split_first().ok_or_else(invalid)?;
            if count == 0 {
                return Err(invalid());
            }
            rest.split_at_checked(usize::from(count)).ok_or_else(invalid)?
        }
    };

    let exponent = parse_exponent(exponent_octets, codec)?;

    if mantissa_octets.is_empty() {
        return Err(invalid());
    }
    if mantissa_octets.len() > core::mem::size_of::<u64>() {
        return Err(DecodeError::integer_overflow(64, codec));
    }
    let mantissa = mantissa_octets
        .iter()
        .fold(0u64, |mantissa, octet| (mantissa << 8) | u64::from(*octet));

    let mut value = mantissa as f64 * 2f64.powi(scale) * base.powi(exponent);
    if info & 0x40 != 0 {
        value = -value;
    }
    Ok(value)
}

/// Signed big-endian exponent; the encoders of this family never need more
/// than 16 bits, and wider values are rejected rather than rounded.
fn parse_exponent(octets: &[u8], codec: Codec) -> DecodeResult<i32> {
    if octets.is_empty() {
        return Err(DecodeError::from_kind(DecodeErrorKind::InvalidReal, codec));
    }
    if octets.len() > core::mem::size_of::<i64>() {
        return Err(DecodeError::integer_overflow(16, codec));
    }

    let mut exponent: i64 = if octets[0] & 0x80 != 0 { -1 } else { 0 };
    for octet in octets {
        exponent = (exponent << 8) | i64::from(*octet);
    }

    if i64::from(i16::MIN) <= exponent && exponent <= i64::from(i16::MAX) {
        Ok(exponent as i32)
    } else {
        Err(DecodeError::integer_overflow(16, codec))
    }
}

fn decode_decimal(info: u8, rest: &[u8], codec: Codec) -> DecodeResult<f64> {
    if !matches!(info & 0x3F, 1..=3) {
        return Err(DecodeError::from_kind(DecodeErrorKind::InvalidReal, codec));
    }

    // Only the character set is checked here; ISO 6093 form validation past
    // that is out of scope.
    for &byte in rest {
        if !matches!(byte, b'0'..=b'9' | b'+' | b'-' | b'.' | b',' | b'E' | b'e' | b' ') {
            return Err(DecodeError::invalid_character(
                Tag::REAL,
                u32::from(byte),
                codec,
            ));
        }
    }

    let text: alloc::string::String = rest
        .iter()
        .map(|&byte| if byte == b',' { '.' } else { char::from(byte) })
        .collect();

    text.trim()
        .parse::<f64>()
        .map_err(|_| DecodeError::from_kind(DecodeErrorKind::InvalidReal, codec))
}

pub(crate) fn encode(value: f64, format: RealFormat, codec: Codec) -> Result<Vec<u8>, EncodeError> {
    if value.is_nan() {
        return Err(EncodeError::from_kind(EncodeErrorKind::RealNotANumber, codec));
    }
    if value.is_infinite() {
        return Ok(alloc::vec![if value > 0.0 {
            PLUS_INFINITY
        } else {
            MINUS_INFINITY
        }]);
    }
    if value == 0.0 {
        return Ok(if value.is_sign_negative() {
            alloc::vec![MINUS_ZERO]
        } else {
            Vec::new()
        });
    }

    match format {
        RealFormat::Binary => encode_binary(value, codec),
        RealFormat::Nr1 => Ok(encode_decimal(0x01, alloc::format!("{}", value as i64))),
        RealFormat::Nr2 => Ok(encode_decimal(0x02, alloc::format!("{value:.6}"))),
        RealFormat::Nr3 => Ok(encode_decimal(0x03, alloc::format!("{value:E}"))),
    }
}

fn encode_decimal(info: u8, text: alloc::string::String) -> Vec<u8> {
    let mut output = alloc::vec![info];
    output.extend_from_slice(text.as_bytes());
    output
}

fn encode_binary(value: f64, codec: Codec) -> Result<Vec<u8>, EncodeError> {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & ((1u64 << 52) - 1);

    let (mut mantissa, mut exponent) = if biased == 0 {
        // Subnormal.
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };

    // Canonical base-2 mantissa is odd; `value` is known nonzero here.
    while mantissa & 1 == 0 {
        mantissa >>= 1;
        exponent += 1;
    }

    if exponent < i32::from(i16::MIN) || exponent > i32::from(i16::MAX) {
        return Err(EncodeError::from_kind(EncodeErrorKind::ExponentOverflow, codec));
    }

    let mut info = 0x80u8;
    if value < 0.0 {
        info |= 0x40;
    }

    let mut output = Vec::new();
    if i32::from(i8::MIN) <= exponent && exponent <= i32::from(i8::MAX) {
        output.push(info);
        output.push(exponent as i8 as u8);
    } else {
        output.push(info | 0x01);
        output.extend_from_slice(&(exponent as i16).to_be_bytes());
    }

    let octets = mantissa.to_be_bytes();
    let first = octets
        .iter()
        .position(|octet| *octet != 0)
        .unwrap_or(octets.len() - 1);
    output.extend_from_slice(&octets[first..]);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CODEC: Codec = Codec::Ber;

    #[test]
    fn binary_canonical_form() {
        assert_eq!(
            &[0x80, 0xFB, 0x05],
            &*encode(0.15625, RealFormat::Binary, CODEC).unwrap()
        );
        assert_eq!(0.15625, decode(&[0x80, 0xFB, 0x05], CODEC).unwrap());
    }

    #[test]
    fn binary_round_trips() {
        for value in [1.0, -1.0, 0.5, 3.25, -123.456, 1.0e300, 5.0e-324, 2.0] {
            let encoded = encode(value, RealFormat::Binary, CODEC).unwrap();
            assert_eq!(value, decode(&encoded, CODEC).unwrap(), "value {value}");
        }
    }

    #[test]
    fn zero_and_specials() {
        assert_eq!(0usize, encode(0.0, RealFormat::Binary, CODEC).unwrap().len());
        assert_eq!(0.0, decode(&[], CODEC).unwrap());
        assert_eq!(
            &[MINUS_ZERO],
            &*encode(-0.0, RealFormat::Binary, CODEC).unwrap()
        );
        assert!(decode(&[MINUS_ZERO], CODEC).unwrap().is_sign_negative());
        assert_eq!(
            &[PLUS_INFINITY],
            &*encode(f64::infinity(), RealFormat::Binary, CODEC).unwrap()
        );
        assert_eq!(
            f64::neg_infinity(),
            decode(&[MINUS_INFINITY], CODEC).unwrap()
        );
        assert!(decode(&[NOT_A_NUMBER], CODEC).unwrap().is_nan());
        assert!(matches!(
            *encode(f64::nan(), RealFormat::Binary, CODEC).unwrap_err().kind,
            EncodeErrorKind::RealNotANumber
        ));
    }

    #[test]
    fn base_8_and_16() {
        // 8^1 * 3 = 24
        assert_eq!(24.0, decode(&[0x90, 0x01, 0x03], CODEC).unwrap());
        // 16^-1 * 32 = 2
        assert_eq!(2.0, decode(&[0xA0, 0xFF, 0x20], CODEC).unwrap());
    }

    #[test]
    fn decimal_forms() {
        assert_eq!(1433.0, decode(b"\x011433", CODEC).unwrap());
        assert_eq!(-14.33, decode(b"\x02-14.33", CODEC).unwrap());
        assert_eq!(150.0, decode(b"\x031.5E2", CODEC).unwrap());
        // Comma is a valid ISO 6093 decimal mark.
        assert_eq!(14.33, decode(b"\x0214,33", CODEC).unwrap());

        let encoded = encode(150.0, RealFormat::Nr3, CODEC).unwrap();
        assert_eq!(150.0, decode(&encoded, CODEC).unwrap());
        let encoded = encode(-7.0, RealFormat::Nr1, CODEC).unwrap();
        assert_eq!(-7.0, decode(&encoded, CODEC).unwrap());
    }

    #[test]
    fn decimal_rejects_bad_characters() {
        let error = decode(b"\x0114x3", CODEC).unwrap_err();
        assert!(matches!(
            *error.kind,
            DecodeErrorKind::InvalidCharacter { character: 0x78, .. }
        ));
    }

    #[test]
    fn oversized_exponent() {
        let error = decode(&[0x83, 0x03, 0x01, 0x00, 0x00, 0x05], CODEC).unwrap_err();
        assert!(matches!(
            *error.kind,
            DecodeErrorKind::IntegerOverflow { max_width: 16 }
        ));
    }

    #[test]
    fn reserved_base_rejected() {
        let error = decode(&[0xB0, 0x00, 0x01], CODEC).unwrap_err();
        assert!(matches!(*error.kind, DecodeErrorKind::InvalidReal));
    }
}
