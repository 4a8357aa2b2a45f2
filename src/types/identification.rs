use alloc::{string::String, vec::Vec};

use super::{BitString, Integer, ObjectIdentifier};

/// The identification `CHOICE` shared by the context-switching types
/// `EXTERNAL`, `EMBEDDED PDV`, and `CHARACTER STRING` (X.680 clauses 34–37,
/// 44).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identification {
    /// Both abstract and transfer syntax are named by object identifiers.
    Syntaxes {
        abstract_syntax: ObjectIdentifier,
        transfer_syntax: ObjectIdentifier,
    },
    /// A single object identifier names the syntax.
    Syntax(ObjectIdentifier),
    /// The syntax was negotiated out-of-band and is referenced by a
    /// presentation context identifier.
    PresentationContextId(Integer),
    /// A presentation context identifier together with the transfer syntax
    /// it negotiates.
    ContextNegotiation {
        presentation_context_id: Integer,
        transfer_syntax: ObjectIdentifier,
    },
    /// Only the transfer syntax is named.
    TransferSyntax(ObjectIdentifier),
    /// The syntax is fixed by the application.
    Fixed,
}

/// How the data value of an `EXTERNAL` is held (X.208 encoding `CHOICE`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExternalEncoding {
    /// The complete encoding of a single ASN.1 value.
    SingleAsn1Type(Vec<u8>),
    /// An octet-aligned opaque value.
    OctetAligned(Vec<u8>),
    /// A value with no octet alignment guarantee.
    Arbitrary(BitString),
}

/// The `EXTERNAL` type.
///
/// Under CER and DER only the [`Identification::Syntax`] alternative is
/// permitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct External {
    pub identification: Identification,
    pub data_value_descriptor: Option<String>,
    pub data_value: ExternalEncoding,
}

/// The `EMBEDDED PDV` type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedPdv {
    pub identification: Identification,
    pub data_value: Vec<u8>,
}

/// The `CHARACTER STRING` type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterString {
    pub identification: Identification,
    pub string_value: Vec<u8>,
}
