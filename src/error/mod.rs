//! Error module for both encoding and decoding failures.
//! Encoding can result in an `EncodeError` and decoding in a `DecodeError`;
//! both carry the codec that produced them.

#![allow(clippy::module_name_repetitions)]
mod decode;
mod encode;
pub use decode::Kind as DecodeErrorKind;
pub use decode::DecodeError;
pub use encode::Kind as EncodeErrorKind;
pub use encode::EncodeError;
