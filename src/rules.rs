use crate::codec::Codec;

/// The longest contents, in octets, a primitive string-type element may carry
/// under CER before the encoder must fragment it (X.690 9.2).
pub const MAX_FRAGMENT_LENGTH: usize = 1000;

/// The canonicalization profile of one of the three X.690 codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EncodingRules {
    Ber,
    Cer,
    Der,
}

impl EncodingRules {
    pub fn is_ber(self) -> bool {
        matches!(self, Self::Ber)
    }

    pub fn is_cer(self) -> bool {
        matches!(self, Self::Cer)
    }

    pub fn is_der(self) -> bool {
        matches!(self, Self::Der)
    }

    /// Whether decoded lengths and primitive values must use their shortest
    /// representation.
    pub fn is_canonical(self) -> bool {
        !self.is_ber()
    }

    /// DER forbids string types from being spread over multiple child
    /// elements; BER permits it and CER mandates it past
    /// [`MAX_FRAGMENT_LENGTH`].
    pub fn allows_constructed_strings(self) -> bool {
        !self.is_der()
    }

    pub fn allows_indefinite(self) -> bool {
        !self.is_der()
    }

    pub fn max_fragment_length(self) -> usize {
        match self {
            Self::Cer => MAX_FRAGMENT_LENGTH,
            _ => usize::MAX,
        }
    }

    pub fn codec(self) -> Codec {
        match self {
            Self::Ber => Codec::Ber,
            Self::Cer => Codec::Cer,
            Self::Der => Codec::Der,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Ber {}
    impl Sealed for super::Cer {}
    impl Sealed for super::Der {}
}

/// Marker for the codec variant an [`Element`][crate::Element] belongs to.
///
/// Sealed; the only implementations are [`Ber`], [`Cer`], and [`Der`].
pub trait Variant: sealed::Sealed + Copy + Clone + core::fmt::Debug + Eq + core::hash::Hash + 'static {
    const RULES: EncodingRules;
}

/// Marker for elements encoded under the Basic Encoding Rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ber;

/// Marker for elements encoded under the Canonical Encoding Rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cer;

/// Marker for elements encoded under the Distinguished Encoding Rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Der;

impl Variant for Ber {
    const RULES: EncodingRules = EncodingRules::Ber;
}

impl Variant for Cer {
    const RULES: EncodingRules = EncodingRules::Cer;
}

impl Variant for Der {
    const RULES: EncodingRules = EncodingRules::Der;
}
