//! Accessors for `UTCTime` and `GeneralizedTime`.

use alloc::string::ToString;

use chrono::{NaiveDateTime, Utc};

use super::Element;
use crate::error::DecodeError;
use crate::rules::Variant;
use crate::types::{GeneralizedTime, UtcTime};

impl<R: Variant> Element<R> {
    /// Reads the element as a `UTCTime` of the form `YYMMDDhhmm[ss](Z|±hhmm)`.
    ///
    /// Two-digit years 00–79 land in 20xx and 80–99 in 19xx.
    pub fn utc_time(&self) -> Result<UtcTime, DecodeError> {
        let codec = Self::codec();
        let contents = self.primitive_contents()?;
        let text = core::str::from_utf8(contents)
            .map_err(|_| DecodeError::invalid_date("not ASCII".to_string(), codec))?;

        let century = match text.as_bytes().first() {
            Some(b'0'..=b'7') => "20",
            Some(b'8'..=b'9') => "19",
            _ => return Err(DecodeError::invalid_date(text.to_string(), codec)),
        };
        let expanded = alloc::format!("{century}{text}");

        let parsed = if expanded.ends_with('Z') {
            NaiveDateTime::parse_from_str(&expanded, "%Y%m%d%H%M%SZ")
                .or_else(|_| NaiveDateTime::parse_from_str(&expanded, "%Y%m%d%H%MZ"))
                .map(|naive| naive.and_utc())
        } else {
            chrono::DateTime::parse_from_str(&expanded, "%Y%m%d%H%M%S%z")
                .or_else(|_| chrono::DateTime::parse_from_str(&expanded, "%Y%m%d%H%M%z"))
                .map(|date| date.with_timezone(&Utc))
        };

        parsed.map_err(|_| DecodeError::invalid_date(text.to_string(), codec))
    }

    /// Writes a `UTCTime` in the canonical `YYMMDDhhmmssZ` form.
    pub fn set_utc_time(&mut self, value: UtcTime) {
        let text = value.format("%y%m%d%H%M%SZ").to_string();
        self.write_primitive(text.into_bytes());
    }

    /// Reads the element as a `GeneralizedTime` of the form
    /// `YYYYMMDDhhmmss[.f…][Z|±hhmm]`; a bare local time is taken as UTC.
    pub fn generalized_time(&self) -> Result<GeneralizedTime, DecodeError> {
        let codec = Self::codec();
        let contents = self.primitive_contents()?;
        let text = core::str::from_utf8(contents)
            .map_err(|_| DecodeError::invalid_date("not ASCII".to_string(), codec))?;

        let fractional = text.contains('.');
        let parsed = if let Some(naive) = text.strip_suffix('Z') {
            let format = if fractional { "%Y%m%d%H%M%S%.f" } else { "%Y%m%d%H%M%S" };
            NaiveDateTime::parse_from_str(naive, format)
                .map(|naive| naive.and_utc().fixed_offset())
        } else if text.contains('+') || text.contains('-') {
            let format = if fractional {
                "%Y%m%d%H%M%S%.f%z"
            } else {
                "%Y%m%d%H%M%S%z"
            };
            chrono::DateTime::parse_from_str(text, format)
        } else {
            let format = if fractional { "%Y%m%d%H%M%S%.f" } else { "%Y%m%d%H%M%S" };
            NaiveDateTime::parse_from_str(text, format)
                .map(|naive| naive.and_utc().fixed_offset())
        };

        parsed.map_err(|error| DecodeError::invalid_date(error.to_string(), codec))
    }

    /// Writes a `GeneralizedTime` normalized to UTC, with any fractional
    /// seconds trimmed of trailing zeroes as the canonical forms require.
    pub fn set_generalized_time(&mut self, value: GeneralizedTime) {
        let utc = value.with_timezone(&Utc);
        let mut text = utc.format("%Y%m%d%H%M%S").to_string();

        let nanos = utc.timestamp_subsec_nanos();
        if nanos > 0 {
            let fraction = alloc::format!("{nanos:09}");
            text.push('.');
            text.push_str(fraction.trim_end_matches('0'));
        }
        text.push('Z');

        self.write_primitive(text.into_bytes());
    }
}
