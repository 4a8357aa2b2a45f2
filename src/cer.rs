//! # Canonical Encoding Rules

pub use crate::element::CerElement as Element;
use crate::error::DecodeError;

/// Attempts to decode one element spanning the whole of `input` using CER.
///
/// # Errors
/// Returns a `DecodeError` if `input` is not a single valid CER element.
pub fn decode(input: &[u8]) -> Result<Element, DecodeError> {
    Element::decode(input)
}

/// Attempts to decode one element from the front of `input` using CER,
/// returning the element and the remainder of the input.
///
/// # Errors
/// Returns a `DecodeError` if `input` does not begin with a valid CER
/// element.
pub fn decode_with_remainder(input: &[u8]) -> Result<(Element, &[u8]), DecodeError> {
    Element::from_bytes(input)
}

/// Encodes `element` to its complete CER framing.
pub fn encode(element: &Element) -> alloc::vec::Vec<u8> {
    element.to_bytes()
}
