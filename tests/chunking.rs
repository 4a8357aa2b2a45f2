//! CER fragmentation invariants across the interesting contents lengths.

use pretty_assertions::assert_eq;

use x690::types::BitString;
use x690::{ber, cer, der, Tag};

const LENGTHS: &[usize] = &[0, 1, 8, 127, 128, 129, 192, 999, 1000, 1001, 2017];

fn contents(length: usize) -> Vec<u8> {
    (0..length).map(|index| (index % 251) as u8).collect()
}

#[test]
fn cer_octet_strings_fragment_iff_over_the_limit() {
    for &length in LENGTHS {
        let value = contents(length);
        let mut element = cer::Element::with_tag(Tag::OCTET_STRING);
        element.set_octet_string(&value);

        assert_eq!(length > 1000, element.is_constructed(), "length {length}");

        let encoded = cer::encode(&element);
        let decoded = cer::decode(&encoded).unwrap();
        assert_eq!(value, decoded.octet_string().unwrap(), "length {length}");

        if length > 1000 {
            assert_eq!(&[0x00, 0x00], &encoded[encoded.len() - 2..]);
            let children = decoded.sequence().unwrap();
            assert_eq!(length.div_ceil(1000), children.len());
            for child in &children {
                assert!(child.is_primitive());
                assert!(child.length() <= 1000);
                assert_eq!(Tag::OCTET_STRING, child.tag());
            }
        }
    }
}

#[test]
fn ber_and_der_never_fragment() {
    let value = contents(2017);

    let mut element = ber::Element::with_tag(Tag::OCTET_STRING);
    element.set_octet_string(&value);
    assert!(element.is_primitive());
    assert_eq!(value, ber::decode(&ber::encode(&element)).unwrap().octet_string().unwrap());

    let mut element = der::Element::with_tag(Tag::OCTET_STRING);
    element.set_octet_string(&value);
    assert!(element.is_primitive());
    assert_eq!(value, der::decode(&der::encode(&element)).unwrap().octet_string().unwrap());
}

#[test]
fn cer_character_strings_fragment_like_octet_strings() {
    let text = "x".repeat(2017);

    let mut element = cer::Element::with_tag(Tag::UTF8_STRING);
    element.set_utf8_string(&text);
    assert!(element.is_constructed());

    let decoded = cer::decode(&cer::encode(&element)).unwrap();
    assert_eq!(text, decoded.utf8_string().unwrap());

    let mut element = cer::Element::with_tag(Tag::IA5_STRING);
    element.set_ia5_string(&text).unwrap();
    let decoded = cer::decode(&cer::encode(&element)).unwrap();
    assert_eq!(text, decoded.ia5_string().unwrap());
}

#[test]
fn cer_bmp_fragments_align_to_code_units() {
    // 700 characters of 2 octets each: 1400 octets, fragmented at 1000.
    let text = "Ω".repeat(700);

    let mut element = cer::Element::with_tag(Tag::BMP_STRING);
    element.set_bmp_string(&text);
    assert!(element.is_constructed());

    let children = element.sequence().unwrap();
    assert_eq!(2, children.len());
    assert_eq!(0, children[0].length() % 2);

    let decoded = cer::decode(&cer::encode(&element)).unwrap();
    assert_eq!(text, decoded.bmp_string().unwrap());
}

#[test]
fn cer_universal_fragments_align_to_code_units() {
    let text = "a".repeat(700);

    let mut element = cer::Element::with_tag(Tag::UNIVERSAL_STRING);
    element.set_universal_string(&text);
    assert!(element.is_constructed());

    let children = element.sequence().unwrap();
    assert_eq!(3, children.len());
    assert!(children.iter().all(|child| child.length() % 4 == 0));

    let decoded = cer::decode(&cer::encode(&element)).unwrap();
    assert_eq!(text, decoded.universal_string().unwrap());
}

#[test]
fn cer_bit_strings_carry_per_fragment_unused_bits() {
    for &length in LENGTHS {
        let mut bits = BitString::from_vec(contents(length));
        if length > 0 {
            bits.truncate(length * 8 - 5);
        }

        let mut element = cer::Element::with_tag(Tag::BIT_STRING);
        element.set_bit_string(&bits);

        let encoded = cer::encode(&element);
        let decoded = cer::decode(&encoded).unwrap();
        assert_eq!(bits, decoded.bit_string().unwrap(), "length {length}");

        if element.is_constructed() {
            let children = decoded.sequence().unwrap();
            for (index, child) in children.iter().enumerate() {
                assert!(child.length() <= 1000);
                if index + 1 != children.len() {
                    assert_eq!(0, child.value()[0]);
                }
            }
        }
    }
}

#[test]
fn nested_constructed_strings_reassemble_under_ber() {
    // A constructed string whose first child is itself constructed.
    let encoded = [
        0x24, 0x80, //
        0x24, 0x80, 0x04, 0x02, 0x01, 0x02, 0x00, 0x00, //
        0x04, 0x01, 0x03, //
        0x00, 0x00,
    ];
    let decoded = ber::decode(&encoded).unwrap();
    assert_eq!(vec![1, 2, 3], decoded.octet_string().unwrap());
}
