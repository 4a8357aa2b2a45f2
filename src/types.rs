//! # ASN.1 Data Types
//! Rust types and data structures representing the ASN.1 values the element
//! accessors read and write, renamed to use ASN.1's terminology.

mod identification;
pub(crate) mod oid;

pub use self::{
    identification::{CharacterString, EmbeddedPdv, External, ExternalEncoding, Identification},
    oid::{ObjectIdentifier, ParseOidError, RelativeOid},
};
pub use crate::tag::{Class, Tag};

/// The `INTEGER` type.
pub type Integer = num_bigint::BigInt;
/// The `BIT STRING` type.
pub type BitString = bitvec::vec::BitVec<u8, bitvec::order::Msb0>;
/// The `OCTET STRING` type.
pub type OctetString = alloc::vec::Vec<u8>;
/// The `UTCTime` type.
pub type UtcTime = chrono::DateTime<chrono::Utc>;
/// The `GeneralizedTime` type.
pub type GeneralizedTime = chrono::DateTime<chrono::FixedOffset>;
