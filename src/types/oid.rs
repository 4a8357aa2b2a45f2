use alloc::vec::Vec;
use core::ops;

use crate::codec::Codec;
use crate::error::{DecodeError, DecodeErrorKind};

pub(crate) const MAX_OID_FIRST_OCTET: u32 = 2;
pub(crate) const MAX_OID_SECOND_OCTET: u32 = 39;

/// Splits contents octets into base-128 subidentifiers: 7 bits per octet,
/// big-endian, continuation in the eighth bit. A subidentifier must not begin
/// with the padding octet `0x80` and must not end mid-continuation.
pub(crate) fn parse_arcs(contents: &[u8], codec: Codec) -> Result<Vec<u64>, DecodeError> {
    let mut arcs = Vec::new();
    let mut arc: u64 = 0;
    let mut continuing = false;

    for &octet in contents {
        if !continuing && octet == 0x80 {
            return Err(DecodeError::from_kind(DecodeErrorKind::NonMinimalArc, codec));
        }
        if arc > u64::MAX >> 7 {
            return Err(DecodeError::integer_overflow(64, codec));
        }
        arc = (arc << 7) | u64::from(octet & 0x7F);
        continuing = octet & 0x80 != 0;
        if !continuing {
            arcs.push(arc);
            arc = 0;
        }
    }

    if continuing {
        return Err(DecodeError::incomplete(nom::Needed::new(1), codec));
    }

    Ok(arcs)
}

/// A hierarchical sequence of at least two arcs identifying an object.
///
/// The first arc must be 0, 1, or 2, and for the first two roots the second
/// arc must not exceed 39 (X.660).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ObjectIdentifier(Vec<u32>);

impl ObjectIdentifier {
    /// Creates a new object identifier from `arcs`, returning `None` when the
    /// arcs violate the root constraints.
    pub fn new(arcs: Vec<u32>) -> Option<Self> {
        is_valid(&arcs).then_some(Self(arcs))
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }
}

fn is_valid(arcs: &[u32]) -> bool {
    arcs.len() >= 2
        && arcs[0] <= MAX_OID_FIRST_OCTET
        && (arcs[0] == MAX_OID_FIRST_OCTET || arcs[1] <= MAX_OID_SECOND_OCTET)
}

impl AsRef<[u32]> for ObjectIdentifier {
    fn as_ref(&self) -> &[u32] {
        self.0.as_ref()
    }
}

impl ops::Deref for ObjectIdentifier {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{first}")?;
        }
        for arc in arcs {
            write!(f, ".{arc}")?;
        }
        Ok(())
    }
}

/// The error returned when parsing dotted notation fails.
#[derive(snafu::Snafu, Debug, Clone, PartialEq, Eq)]
#[snafu(display("invalid object identifier in dotted notation"))]
pub struct ParseOidError;

impl core::str::FromStr for ObjectIdentifier {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s
            .split('.')
            .map(|arc| arc.parse::<u32>().map_err(|_| ParseOidError))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(arcs).ok_or(ParseOidError)
    }
}

/// An object identifier fragment relative to some base known from context.
/// Carries no root constraints and may be empty.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct RelativeOid(Vec<u32>);

impl RelativeOid {
    pub fn new(arcs: Vec<u32>) -> Self {
        Self(arcs)
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }
}

impl AsRef<[u32]> for RelativeOid {
    fn as_ref(&self) -> &[u32] {
        self.0.as_ref()
    }
}

impl ops::Deref for RelativeOid {
    type Target = [u32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
