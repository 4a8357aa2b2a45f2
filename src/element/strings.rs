//! Accessors for the string-type universal types, including the CER
//! fragmentation of values past the primitive limit and the matching
//! reassembly of constructed encodings on read.

use alloc::{string::String, vec::Vec};

use super::{encode_definite_length, encode_identifier, Element};
use crate::error::{DecodeError, DecodeErrorKind, EncodeError};
use crate::parser::{self, NESTING_LIMIT};
use crate::rules::Variant;
use crate::tag::Tag;
use crate::types::BitString;

fn is_graphic(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// The X.680 41.4 printable set: Latin letters, digits, (space) '()+,-./:=?
fn is_printable(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
        )
}

fn is_numeric(byte: u8) -> bool {
    byte.is_ascii_digit() || byte == b' '
}

fn is_ascii7(byte: u8) -> bool {
    byte < 0x80
}

macro_rules! restricted_string {
    ($(#[$meta:meta])* $reader:ident, $writer:ident, $tag:expr, $check:expr) => {
        $(#[$meta])*
        pub fn $reader(&self) -> Result<String, DecodeError> {
            let contents = self.string_contents()?;
            for &byte in &contents {
                if !$check(byte) {
                    return Err(DecodeError::invalid_character(
                        $tag,
                        u32::from(byte),
                        Self::codec(),
                    ));
                }
            }
            String::from_utf8(contents).map_err(|_| {
                DecodeError::from_kind(DecodeErrorKind::InvalidUtf8, Self::codec())
            })
        }

        pub fn $writer(&mut self, value: &str) -> Result<(), EncodeError> {
            for byte in value.bytes() {
                if !$check(byte) {
                    return Err(EncodeError::invalid_character(
                        $tag,
                        u32::from(byte),
                        Self::codec(),
                    ));
                }
            }
            self.write_string_contents(value.as_bytes().to_vec());
            Ok(())
        }
    };
}

impl<R: Variant> Element<R> {
    /// Concatenated semantic contents of a string-type element: the value
    /// verbatim for a primitive element, the reassembled fragments for a
    /// constructed one.
    fn string_contents(&self) -> Result<Vec<u8>, DecodeError> {
        if !self.constructed {
            return Ok(self.value.clone());
        }

        let mut buffer = Vec::with_capacity(self.value.len());
        self.walk_fragments(&mut |fragment| {
            buffer.extend_from_slice(fragment);
            Ok(())
        })?;
        Ok(buffer)
    }

    /// Visits the primitive fragments of a constructed string-type element in
    /// order. Every child must carry the parent's tag; children may
    /// themselves be constructed, bounded by the nesting budget.
    fn walk_fragments(
        &self,
        visit: &mut impl FnMut(&[u8]) -> Result<(), DecodeError>,
    ) -> Result<(), DecodeError> {
        let codec = Self::codec();

        if !R::RULES.allows_constructed_strings() {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::ConstructedEncodingNotAllowed,
                codec,
            ));
        }

        fn walk<R: Variant>(
            tag: Tag,
            mut input: &[u8],
            depth: usize,
            visit: &mut impl FnMut(&[u8]) -> Result<(), DecodeError>,
        ) -> Result<(), DecodeError> {
            let codec = Element::<R>::codec();
            if depth == 0 {
                return Err(DecodeError::recursion_limit_exceeded(NESTING_LIMIT, codec));
            }

            while !input.is_empty() {
                let (rest, parsed) = parser::parse_element(R::RULES, input)?;
                DecodeError::assert_tag(tag, parsed.identifier.tag, codec)?;
                if parsed.identifier.constructed {
                    walk::<R>(tag, parsed.contents, depth - 1, visit)?;
                } else {
                    visit(parsed.contents)?;
                }
                input = rest;
            }

            Ok(())
        }

        walk::<R>(self.tag, &self.value, NESTING_LIMIT, visit)
    }

    /// Writes string contents, fragmenting into a constructed
    /// indefinite-length value when the variant's primitive limit is
    /// exceeded (X.690 9.2: CER, 1000 octets).
    fn write_string_contents(&mut self, contents: Vec<u8>) {
        let limit = R::RULES.max_fragment_length();

        if contents.len() > limit {
            let mut value = Vec::with_capacity(contents.len() + contents.len() / limit * 6);
            for chunk in contents.chunks(limit) {
                encode_identifier(self.tag, false, &mut value);
                encode_definite_length(chunk.len(), &mut value);
                value.extend_from_slice(chunk);
            }
            self.constructed = true;
            self.indefinite = true;
            self.value = value;
        } else {
            self.write_primitive(contents);
        }
    }

    /// Reads the element as an `OCTET STRING`.
    pub fn octet_string(&self) -> Result<Vec<u8>, DecodeError> {
        self.string_contents()
    }

    pub fn set_octet_string(&mut self, value: &[u8]) {
        self.write_string_contents(value.to_vec());
    }

    /// Reads the element as a `UTF8String`, validating the contents as UTF-8.
    pub fn utf8_string(&self) -> Result<String, DecodeError> {
        String::from_utf8(self.string_contents()?)
            .map_err(|_| DecodeError::from_kind(DecodeErrorKind::InvalidUtf8, Self::codec()))
    }

    pub fn set_utf8_string(&mut self, value: &str) {
        self.write_string_contents(value.as_bytes().to_vec());
    }

    /// Reads the element as a `TeletexString`. The T.61 repertoire is not
    /// validated; contents pass through as raw octets.
    pub fn teletex_string(&self) -> Result<Vec<u8>, DecodeError> {
        self.string_contents()
    }

    pub fn set_teletex_string(&mut self, value: &[u8]) {
        self.write_string_contents(value.to_vec());
    }

    /// Reads the element as a `VideotexString`; raw octets, unvalidated.
    pub fn videotex_string(&self) -> Result<Vec<u8>, DecodeError> {
        self.string_contents()
    }

    pub fn set_videotex_string(&mut self, value: &[u8]) {
        self.write_string_contents(value.to_vec());
    }

    restricted_string! {
        /// Reads the element as an `ObjectDescriptor`, restricted to the
        /// graphic characters `0x20..=0x7E`.
        object_descriptor, set_object_descriptor, Tag::OBJECT_DESCRIPTOR, is_graphic
    }

    restricted_string! {
        /// Reads the element as a `GraphicString`, restricted to
        /// `0x20..=0x7E`.
        graphic_string, set_graphic_string, Tag::GRAPHIC_STRING, is_graphic
    }

    restricted_string! {
        /// Reads the element as a `VisibleString`, restricted to
        /// `0x20..=0x7E`.
        visible_string, set_visible_string, Tag::VISIBLE_STRING, is_graphic
    }

    restricted_string! {
        /// Reads the element as a `PrintableString`.
        printable_string, set_printable_string, Tag::PRINTABLE_STRING, is_printable
    }

    restricted_string! {
        /// Reads the element as a `NumericString`, restricted to digits and
        /// space.
        numeric_string, set_numeric_string, Tag::NUMERIC_STRING, is_numeric
    }

    restricted_string! {
        /// Reads the element as an `IA5String`, restricted to 7-bit ASCII.
        ia5_string, set_ia5_string, Tag::IA5_STRING, is_ascii7
    }

    restricted_string! {
        /// Reads the element as a `GeneralString`. Escape-sequence structure
        /// is not interpreted; contents are restricted to 7-bit ASCII.
        general_string, set_general_string, Tag::GENERAL_STRING, is_ascii7
    }

    /// Reads the element as a `BMPString` of big-endian UTF-16 code units.
    pub fn bmp_string(&self) -> Result<String, DecodeError> {
        let codec = Self::codec();
        let contents = self.string_contents()?;
        if contents.len() % 2 != 0 {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::MismatchedLength {
                    expected: contents.len() & !1,
                    actual: contents.len(),
                },
                codec,
            ));
        }

        let units: Vec<u16> = contents
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|_| DecodeError::from_kind(DecodeErrorKind::InvalidUtf8, codec))
    }

    pub fn set_bmp_string(&mut self, value: &str) {
        let mut contents = Vec::with_capacity(value.len() * 2);
        for unit in value.encode_utf16() {
            contents.extend_from_slice(&unit.to_be_bytes());
        }
        self.write_string_contents(contents);
    }

    /// Reads the element as a `UniversalString` of big-endian UTF-32 code
    /// units.
    pub fn universal_string(&self) -> Result<String, DecodeError> {
        let codec = Self::codec();
        let contents = self.string_contents()?;
        if contents.len() % 4 != 0 {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::MismatchedLength {
                    expected: contents.len() - contents.len() % 4,
                    actual: contents.len(),
                },
                codec,
            ));
        }

        contents
            .chunks_exact(4)
            .map(|quad| {
                let unit = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
                char::from_u32(unit)
                    .ok_or_else(|| DecodeError::from_kind(DecodeErrorKind::InvalidUtf8, codec))
            })
            .collect()
    }

    pub fn set_universal_string(&mut self, value: &str) {
        let mut contents = Vec::with_capacity(value.len() * 4);
        for character in value.chars() {
            contents.extend_from_slice(&(character as u32).to_be_bytes());
        }
        self.write_string_contents(contents);
    }

    /// Reads the element as a `BIT STRING`: an unused-bits octet followed by
    /// the bits, most significant first.
    pub fn bit_string(&self) -> Result<BitString, DecodeError> {
        if !self.constructed {
            return decode_bit_string_contents::<R>(&self.value, true);
        }

        let mut fragments: Vec<Vec<u8>> = Vec::new();
        self.walk_fragments(&mut |fragment| {
            fragments.push(fragment.to_vec());
            Ok(())
        })?;

        let mut bits = BitString::new();
        let count = fragments.len();
        for (index, fragment) in fragments.iter().enumerate() {
            let fragment_bits = decode_bit_string_contents::<R>(fragment, index + 1 == count)?;
            bits.extend_from_bitslice(&fragment_bits);
        }
        Ok(bits)
    }

    /// Writes a `BIT STRING`, zeroing the padding bits. Under CER a value
    /// with more than 999 content octets is fragmented; every fragment except
    /// the last carries a zero unused-bits octet.
    pub fn set_bit_string(&mut self, bits: &BitString) {
        let unused = ((8 - bits.len() % 8) % 8) as u8;
        let mut bits = bits.clone();
        bits.set_uninitialized(false);
        let octets = bits.into_vec();

        let limit = R::RULES.max_fragment_length();
        if octets.len() + 1 > limit {
            let chunk_size = limit - 1;
            let count = octets.len().div_ceil(chunk_size);
            let mut value = Vec::with_capacity(octets.len() + count * 7);

            for (index, chunk) in octets.chunks(chunk_size).enumerate() {
                encode_identifier(self.tag, false, &mut value);
                encode_definite_length(chunk.len() + 1, &mut value);
                value.push(if index + 1 == count { unused } else { 0 });
                value.extend_from_slice(chunk);
            }

            self.constructed = true;
            self.indefinite = true;
            self.value = value;
        } else {
            let mut contents = Vec::with_capacity(octets.len() + 1);
            contents.push(unused);
            contents.extend_from_slice(&octets);
            self.write_primitive(contents);
        }
    }
}

fn decode_bit_string_contents<R: Variant>(
    contents: &[u8],
    final_fragment: bool,
) -> Result<BitString, DecodeError> {
    let codec = Element::<R>::codec();

    let Some((&unused, octets)) = contents.split_first() else {
        return Err(DecodeError::from_kind(
            DecodeErrorKind::MismatchedLength {
                expected: 1,
                actual: 0,
            },
            codec,
        ));
    };

    if unused > 7 || (unused != 0 && (octets.is_empty() || !final_fragment)) {
        return Err(DecodeError::from_kind(
            DecodeErrorKind::InvalidBitString { bits: unused },
            codec,
        ));
    }

    if R::RULES.is_canonical() && unused > 0 {
        let mask = (1u8 << unused) - 1;
        if octets.last().is_some_and(|last| last & mask != 0) {
            return Err(DecodeError::from_kind(
                DecodeErrorKind::NonZeroPaddingBits,
                codec,
            ));
        }
    }

    let mut bits = BitString::from_slice(octets);
    bits.truncate(octets.len() * 8 - usize::from(unused));
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{BerElement, CerElement, DerElement};
    use crate::tag::Class;
    use pretty_assertions::assert_eq;

    #[test]
    fn octet_string_round_trip() {
        let mut element = BerElement::with_tag(Tag::OCTET_STRING);
        element.set_octet_string(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(&[0x04, 0x06, 1, 2, 3, 4, 5, 6], &*element.to_bytes());
        assert_eq!(alloc::vec![1, 2, 3, 4, 5, 6], element.octet_string().unwrap());
    }

    #[test]
    fn constructed_octet_string_reassembles() {
        let encoded = &[0x24, 0x80, 0x04, 0x04, 1, 2, 3, 4, 0x04, 0x02, 5, 6, 0x00, 0x00];
        let (element, _) = BerElement::from_bytes(encoded).unwrap();
        assert_eq!(alloc::vec![1, 2, 3, 4, 5, 6], element.octet_string().unwrap());

        // DER forbids the constructed form outright.
        let definite = &[0x24, 0x0A, 0x04, 0x04, 1, 2, 3, 4, 0x04, 0x02, 5, 6];
        let (element, _) = DerElement::from_bytes(definite).unwrap();
        assert!(matches!(
            *element.octet_string().unwrap_err().kind,
            DecodeErrorKind::ConstructedEncodingNotAllowed
        ));
    }

    #[test]
    fn constructed_string_child_tag_must_match() {
        let encoded = &[0x24, 0x80, 0x04, 0x02, 1, 2, 0x0C, 0x01, 3, 0x00, 0x00];
        let (element, _) = BerElement::from_bytes(encoded).unwrap();
        assert!(matches!(
            *element.octet_string().unwrap_err().kind,
            DecodeErrorKind::MismatchedTag { .. }
        ));
    }

    #[test]
    fn utf8_string_round_trip() {
        let mut element = BerElement::with_tag(Tag::UTF8_STRING);
        element.set_utf8_string("Jones");
        assert_eq!(&[0x0C, 0x05, 0x4A, 0x6F, 0x6E, 0x65, 0x73], &*element.to_bytes());
        assert_eq!("Jones", element.utf8_string().unwrap());

        let (bad, _) = BerElement::from_bytes(&[0x0C, 0x02, 0xC3, 0x28]).unwrap();
        assert!(matches!(
            *bad.utf8_string().unwrap_err().kind,
            DecodeErrorKind::InvalidUtf8
        ));
    }

    #[test]
    fn printable_string_alphabet() {
        let mut element = DerElement::with_tag(Tag::PRINTABLE_STRING);
        element.set_printable_string("Test User 1").unwrap();
        assert_eq!("Test User 1", element.printable_string().unwrap());

        assert!(matches!(
            *element.set_printable_string("under_score").unwrap_err().kind,
            crate::error::EncodeErrorKind::InvalidCharacter { character: 0x5F, .. }
        ));

        let (bad, _) = DerElement::from_bytes(&[0x13, 0x01, b'@']).unwrap();
        assert!(matches!(
            *bad.printable_string().unwrap_err().kind,
            DecodeErrorKind::InvalidCharacter { character: 0x40, .. }
        ));
    }

    #[test]
    fn numeric_string_alphabet() {
        let mut element = BerElement::with_tag(Tag::NUMERIC_STRING);
        element.set_numeric_string("1433 01").unwrap();
        assert_eq!("1433 01", element.numeric_string().unwrap());
        assert!(element.set_numeric_string("14.33").is_err());
    }

    #[test]
    fn ia5_string_alphabet() {
        let mut element = BerElement::with_tag(Tag::IA5_STRING);
        element.set_ia5_string("Smith").unwrap();
        assert_eq!(&[0x16, 0x05, 0x53, 0x6D, 0x69, 0x74, 0x68], &*element.to_bytes());
        assert!(element.set_ia5_string("smörgåsbord").is_err());
    }

    #[test]
    fn visible_string_rejects_control_characters() {
        let (bad, _) = BerElement::from_bytes(&[0x1A, 0x02, 0x0A, 0x41]).unwrap();
        assert!(matches!(
            *bad.visible_string().unwrap_err().kind,
            DecodeErrorKind::InvalidCharacter { character: 0x0A, .. }
        ));
    }

    #[test]
    fn bmp_string_round_trip() {
        let mut element = BerElement::with_tag(Tag::BMP_STRING);
        element.set_bmp_string("Jones");
        assert_eq!(
            &[0x1E, 0x0A, 0x00, 0x4A, 0x00, 0x6F, 0x00, 0x6E, 0x00, 0x65, 0x00, 0x73],
            &*element.to_bytes()
        );
        assert_eq!("Jones", element.bmp_string().unwrap());

        // Surrogate pairs survive.
        element.set_bmp_string("𝄞");
        assert_eq!("𝄞", element.bmp_string().unwrap());

        let (odd, _) = BerElement::from_bytes(&[0x1E, 0x03, 0x00, 0x4A, 0x00]).unwrap();
        assert!(matches!(
            *odd.bmp_string().unwrap_err().kind,
            DecodeErrorKind::MismatchedLength { .. }
        ));
    }

    #[test]
    fn universal_string_round_trip() {
        let mut element = BerElement::with_tag(Tag::UNIVERSAL_STRING);
        element.set_universal_string("héllo");
        assert_eq!(20, element.length());
        assert_eq!("héllo", element.universal_string().unwrap());

        let (bad, _) =
            BerElement::from_bytes(&[0x1C, 0x04, 0x00, 0x11, 0x00, 0x00]).unwrap();
        assert!(matches!(
            *bad.universal_string().unwrap_err().kind,
            DecodeErrorKind::InvalidUtf8
        ));
    }

    #[test]
    fn bit_string_round_trip() {
        let mut element = BerElement::with_tag(Tag::BIT_STRING);
        let bits = BitString::from_vec(alloc::vec![0x0A, 0x3B, 0x5F, 0x29, 0x1C, 0xD0]);
        element.set_bit_string(&bits);
        assert_eq!(
            &[0x03, 0x07, 0x00, 0x0A, 0x3B, 0x5F, 0x29, 0x1C, 0xD0],
            &*element.to_bytes()
        );
        assert_eq!(bits, element.bit_string().unwrap());

        // A 4-bit value gets 4 unused bits declared.
        let mut nibble = BitString::new();
        for bit in [true, false, true, true] {
            nibble.push(bit);
        }
        element.set_bit_string(&nibble);
        assert_eq!(&[0x03, 0x02, 0x04, 0xB0], &*element.to_bytes());
        assert_eq!(nibble, element.bit_string().unwrap());

        let mut empty = BerElement::with_tag(Tag::BIT_STRING);
        empty.set_bit_string(&BitString::new());
        assert_eq!(&[0x03, 0x01, 0x00], &*empty.to_bytes());
        assert!(empty.bit_string().unwrap().is_empty());
    }

    #[test]
    fn bit_string_invalid_unused_bits() {
        let (element, _) = BerElement::from_bytes(&[0x03, 0x02, 0x08, 0xFF]).unwrap();
        assert!(matches!(
            *element.bit_string().unwrap_err().kind,
            DecodeErrorKind::InvalidBitString { bits: 8 }
        ));

        let (element, _) = BerElement::from_bytes(&[0x03, 0x00]).unwrap();
        assert!(matches!(
            *element.bit_string().unwrap_err().kind,
            DecodeErrorKind::MismatchedLength { .. }
        ));
    }

    #[test]
    fn bit_string_canonical_padding() {
        // Unused bits declared as 4 but the low nibble is 0b0110.
        let encoded = &[0x03, 0x02, 0x04, 0xB6];
        let (ber, _) = BerElement::from_bytes(encoded).unwrap();
        let decoded = ber.bit_string().unwrap();
        assert_eq!(4, decoded.len());

        let (der, _) = DerElement::from_bytes(encoded).unwrap();
        assert!(matches!(
            *der.bit_string().unwrap_err().kind,
            DecodeErrorKind::NonZeroPaddingBits
        ));
    }

    #[test]
    fn constructed_bit_string_reassembles() {
        let encoded = &[
            0x23, 0x80, // TAG + LENGTH
            0x03, 0x03, 0x00, 0x0A, 0x3B, // fragment 1
            0x03, 0x05, 0x04, 0x5F, 0x29, 0x1C, 0xD0, // fragment 2
            0x00, 0x00, // EOC
        ];
        let (element, _) = BerElement::from_bytes(encoded).unwrap();
        let mut expected = BitString::from_vec(alloc::vec![0x0A, 0x3B, 0x5F, 0x29, 0x1C, 0xD0]);
        expected.truncate(44);
        assert_eq!(expected, element.bit_string().unwrap());
    }

    #[test]
    fn constructed_bit_string_rejects_padded_inner_fragment() {
        let encoded = &[
            0x23, 0x80, //
            0x03, 0x03, 0x04, 0x0A, 0x30, // nonzero unused bits before the end
            0x03, 0x03, 0x00, 0x5F, 0x29, //
            0x00, 0x00,
        ];
        let (element, _) = BerElement::from_bytes(encoded).unwrap();
        assert!(matches!(
            *element.bit_string().unwrap_err().kind,
            DecodeErrorKind::InvalidBitString { bits: 4 }
        ));
    }

    #[test]
    fn cer_fragments_large_octet_string() {
        let contents = alloc::vec![0x0B; 1500];
        let mut element = CerElement::with_tag(Tag::OCTET_STRING);
        element.set_octet_string(&contents);
        assert!(element.is_constructed());

        let encoded = element.to_bytes();
        assert_eq!(&[0x24, 0x80, 0x04, 0x82, 0x03, 0xE8], &encoded[..6]);
        assert_eq!(&[0x00, 0x00], &encoded[encoded.len() - 2..]);

        let (decoded, rest) = CerElement::from_bytes(&encoded).unwrap();
        assert!(rest.is_empty());
        assert_eq!(contents, decoded.octet_string().unwrap());
    }

    #[test]
    fn cer_fragments_keep_the_elements_tag() {
        let mut element = CerElement::new();
        element.set_tag(Tag::new(Class::Context, 5));
        element.set_octet_string(&[0xAA; 1001]);

        let children = element.sequence().unwrap();
        assert_eq!(2, children.len());
        assert!(children
            .iter()
            .all(|child| child.tag() == Tag::new(Class::Context, 5)));
        assert_eq!(1000, children[0].length());
        assert_eq!(1, children[1].length());
    }

    #[test]
    fn cer_fragments_large_bit_string() {
        let mut bits = BitString::from_vec(alloc::vec![0xFF; 1200]);
        bits.truncate(1200 * 8 - 3);

        let mut element = CerElement::with_tag(Tag::BIT_STRING);
        element.set_bit_string(&bits);
        assert!(element.is_constructed());

        let children = element.sequence().unwrap();
        assert_eq!(2, children.len());
        // 999 content octets plus the unused-bits octet per fragment.
        assert_eq!(1000, children[0].length());
        assert_eq!(0x00, children[0].value()[0]);
        assert_eq!(3, *children[1].value().first().unwrap());

        let encoded = element.to_bytes();
        let (decoded, _) = CerElement::from_bytes(&encoded).unwrap();
        assert_eq!(bits, decoded.bit_string().unwrap());
    }

    #[test]
    fn small_strings_stay_primitive_under_cer() {
        let mut element = CerElement::with_tag(Tag::OCTET_STRING);
        element.set_octet_string(&[0x0B; 1000]);
        assert!(element.is_primitive());
        let encoded = element.to_bytes();
        assert_eq!(&[0x04, 0x82, 0x03, 0xE8], &encoded[..4]);
    }
}
