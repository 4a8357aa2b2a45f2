//! # x690
//!
//! A safe `no_std` codec for ASN.1 (ITU-T X.680) elements in the three
//! X.690 Tag-Length-Value encodings: Basic (BER), Canonical (CER), and
//! Distinguished (DER) Encoding Rules.
//!
//! The unit of work is the [`Element`]: a single TLV value object exposing a
//! typed accessor pair per universal type. The three codecs are the three
//! concrete element types [`BerElement`], [`CerElement`], and [`DerElement`];
//! they share one implementation and differ only in the canonicalization
//! rules applied while framing and in CER's mandatory fragmentation of large
//! string values.
//!
//! ```
//! use x690::{ber, Tag};
//!
//! let mut element = ber::Element::with_tag(Tag::INTEGER);
//! element.set_integer(1433);
//! assert_eq!(&[0x02, 0x02, 0x05, 0x99], &*element.to_bytes());
//!
//! let decoded = ber::decode(&[0x02, 0x02, 0x05, 0x99])?;
//! assert_eq!(1433i64, decoded.integer_into::<i64>()?);
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```
//!
//! Elements are plain mutable value objects with exclusively owned contents;
//! decoding a buffer of concatenated elements yields them in buffer order
//! through [`Element::from_bytes`]. The library performs no I/O and imposes
//! no threading; a single element must not be mutated concurrently.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod ber;
pub mod cer;
pub mod der;
pub mod error;
pub mod types;

mod codec;
mod element;
mod parser;
mod real;
mod rules;
mod tag;

pub use codec::Codec;
pub use element::{BerElement, CerElement, DerElement, Element};
pub use error::{DecodeError, EncodeError};
pub use real::RealFormat;
pub use rules::{Ber, Cer, Der, EncodingRules, Variant};
pub use tag::{Class, Tag};
