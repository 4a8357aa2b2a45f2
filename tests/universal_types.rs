//! End-to-end byte vectors for the universal types across all three codecs.

use pretty_assertions::assert_eq;

use x690::error::DecodeErrorKind;
use x690::types::{Integer, ObjectIdentifier};
use x690::{ber, cer, der, Class, Tag};

#[test]
fn integer_1433() {
    let mut element = ber::Element::with_tag(Tag::INTEGER);
    element.set_integer(1433);

    let encoded = ber::encode(&element);
    assert_eq!(&[0x02, 0x02, 0x05, 0x99], &*encoded);

    let decoded = ber::decode(&encoded).unwrap();
    assert_eq!(Integer::from(1433), decoded.integer().unwrap());
    assert_eq!(encoded, ber::encode(&decoded));
}

#[test]
fn boolean_canonical_contents() {
    let mut element = ber::Element::with_tag(Tag::BOOL);
    element.set_boolean(true);
    assert_eq!(&[0x01, 0x01, 0xFF], &*ber::encode(&element));

    assert!(ber::decode(&[0x01, 0x01, 0x01]).unwrap().boolean().unwrap());
    assert!(matches!(
        *cer::decode(&[0x01, 0x01, 0x01])
            .unwrap()
            .boolean()
            .unwrap_err()
            .kind,
        DecodeErrorKind::InvalidBool { value: 0x01 }
    ));
    assert!(der::decode(&[0x01, 0x01, 0x01])
        .unwrap()
        .boolean()
        .is_err());
}

#[test]
fn object_identifier_vectors() {
    let mut element = der::Element::with_tag(Tag::OBJECT_IDENTIFIER);

    let oid = ObjectIdentifier::new(vec![1, 3, 6, 4, 1]).unwrap();
    element.set_object_identifier(&oid);
    assert_eq!(&[0x06, 0x04, 0x2B, 0x06, 0x04, 0x01], &*der::encode(&element));

    let oid = ObjectIdentifier::new(vec![1, 3, 6, 4, 1, 65537, 256, 9]).unwrap();
    element.set_object_identifier(&oid);
    let encoded = der::encode(&element);
    let decoded = der::decode(&encoded).unwrap();
    assert_eq!(oid, decoded.object_identifier().unwrap());
    assert_eq!(encoded, der::encode(&decoded));
}

#[test]
fn real_0_15625() {
    let mut element = ber::Element::with_tag(Tag::REAL);
    element.set_real(0.15625).unwrap();

    let encoded = ber::encode(&element);
    assert_eq!(&[0x09, 0x03, 0x80, 0xFB, 0x05], &*encoded);

    let decoded = ber::decode(&encoded).unwrap().real().unwrap();
    assert!((decoded - 0.15625).abs() < f64::EPSILON);
}

#[test]
fn cer_octet_string_definite_until_the_limit() {
    let mut element = cer::Element::with_tag(Tag::OCTET_STRING);
    element.set_octet_string(&[0x0B; 500]);

    let encoded = cer::encode(&element);
    assert_eq!(&[0x04, 0x82, 0x01, 0xF4, 0x0B, 0x0B], &encoded[..6]);
    assert_eq!(504, encoded.len());
    assert_eq!(
        vec![0x0B; 500],
        cer::decode(&encoded).unwrap().octet_string().unwrap()
    );
}

#[test]
fn cer_octet_string_fragments_past_the_limit() {
    let mut element = cer::Element::with_tag(Tag::OCTET_STRING);
    element.set_octet_string(&[0x0B; 1500]);

    let encoded = cer::encode(&element);
    assert_eq!(&[0x24, 0x80, 0x04, 0x82, 0x03, 0xE8], &encoded[..6]);
    assert_eq!(&[0x00, 0x00], &encoded[encoded.len() - 2..]);

    let decoded = cer::decode(&encoded).unwrap();
    let children = decoded.sequence().unwrap();
    assert_eq!(2, children.len());
    assert_eq!(1000, children[0].length());
    assert_eq!(500, children[1].length());
    assert_eq!(vec![0x0B; 1500], decoded.octet_string().unwrap());
}

#[test]
fn identifier_minimality() {
    // Below 31 the identifier is one octet.
    let mut element = der::Element::with_tag(Tag::new(Class::Application, 30));
    element.set_null();
    assert_eq!(&[0x5E, 0x00], &*der::encode(&element));

    // From 31 on, the long form with no leading 0x80.
    element.set_tag(Tag::new(Class::Application, 31));
    assert_eq!(&[0x5F, 0x1F, 0x00], &*der::encode(&element));
    element.set_tag(Tag::new(Class::Application, 128));
    assert_eq!(&[0x5F, 0x81, 0x00, 0x00], &*der::encode(&element));

    let error = der::decode(&[0x5F, 0x80, 0x1F, 0x00]).unwrap_err();
    assert!(matches!(*error.kind, DecodeErrorKind::NonMinimalTagNumber));
}

#[test]
fn length_minimality() {
    let mut element = der::Element::with_tag(Tag::OCTET_STRING);
    element.set_octet_string(&[0xAA; 127]);
    assert_eq!(0x7F, der::encode(&element)[1]);

    element.set_octet_string(&[0xAA; 128]);
    assert_eq!(&[0x81, 0x80], &der::encode(&element)[1..3]);

    // BER tolerates a redundant long form, DER does not.
    let padded = [0x04, 0x81, 0x01, 0xAA];
    assert!(ber::decode(&padded).is_ok());
    assert!(matches!(
        *der::decode(&padded).unwrap_err().kind,
        DecodeErrorKind::NonMinimalLength
    ));
}

#[test]
fn enumerated_matches_integer_encoding() {
    let mut enumerated = ber::Element::with_tag(Tag::ENUMERATED);
    enumerated.set_enumerated(2);
    assert_eq!(&[0x0A, 0x01, 0x02], &*ber::encode(&enumerated));
    assert_eq!(
        Integer::from(2),
        ber::decode(&[0x0A, 0x01, 0x02]).unwrap().enumerated().unwrap()
    );
}

#[test]
fn single_byte_buffers_fail() {
    for byte in 0u8..=255 {
        assert!(ber::decode(&[byte]).is_err());
        assert!(cer::decode(&[byte]).is_err());
        assert!(der::decode(&[byte]).is_err());
    }
}

#[test]
fn reserved_length_octet_fails() {
    let error = ber::decode(&[0x04, 0xFF]).unwrap_err();
    assert!(matches!(*error.kind, DecodeErrorKind::ReservedLengthOctet));
}

#[test]
fn length_wider_than_the_platform_word_fails() {
    let mut encoded = vec![0x04, 0x89];
    encoded.extend_from_slice(&[0x01; 9]);
    let error = ber::decode(&encoded).unwrap_err();
    assert!(matches!(
        *error.kind,
        DecodeErrorKind::LengthExceedsPlatformWidth
    ));
}

#[test]
fn indefinite_without_terminator_fails() {
    let error = ber::decode(&[0x30, 0x80, 0x01, 0x01, 0xFF]).unwrap_err();
    assert!(matches!(*error.kind, DecodeErrorKind::Incomplete { .. }));
}

#[test]
fn canonical_integer_reencodes_identically() {
    // encode(decode(octets)) == octets for canonical inputs.
    for octets in [
        &[0x02, 0x01, 0x00][..],
        &[0x02, 0x01, 0x80][..],
        &[0x02, 0x02, 0x00, 0xFF][..],
        &[0x02, 0x03, 0x7F, 0xFF, 0xFF][..],
    ] {
        let decoded = der::decode(octets).unwrap();
        let mut reencoded = der::Element::with_tag(Tag::INTEGER);
        reencoded.set_integer(decoded.integer().unwrap());
        assert_eq!(octets, &*der::encode(&reencoded));
    }
}

#[test]
fn utc_time_x509_style() {
    let decoded = der::decode(b"\x17\x0D180122132900Z").unwrap();
    let time = decoded.utc_time().unwrap();

    let mut reencoded = der::Element::with_tag(Tag::UTC_TIME);
    reencoded.set_utc_time(time);
    assert_eq!(b"\x17\x0D180122132900Z".as_slice(), der::encode(&reencoded));
}

#[test]
fn concatenated_elements_decode_in_buffer_order() {
    let buffer = [
        0x01, 0x01, 0xFF, // BOOLEAN
        0x02, 0x01, 0x05, // INTEGER
        0x05, 0x00, // NULL
    ];

    let (first, rest) = ber::decode_with_remainder(&buffer).unwrap();
    assert!(first.boolean().unwrap());
    let (second, rest) = ber::decode_with_remainder(rest).unwrap();
    assert_eq!(Integer::from(5), second.integer().unwrap());
    let (third, rest) = ber::decode_with_remainder(rest).unwrap();
    assert!(third.null().is_ok());
    assert!(rest.is_empty());
}
