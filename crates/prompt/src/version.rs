//! Version parsing and the fixed-width encoding used as the storage sort key.
//!
//! A version is a dotted triple such as `1.2.3`. In storage it is written
//! as `0001.0002.0003`: every segment is zero-padded to four digits so that
//! byte-wise ordering of the encoded string agrees with numeric ordering of
//! the version. That only holds while segments stay within four digits, so
//! anything wider is rejected instead of being silently mis-ordered.

use crate::error::{StoreError, StoreResult};
use std::fmt;
use std::str::FromStr;

/// Sort key of the mutable alias that tracks the newest version.
pub const LATEST: &str = "LATEST";

/// Digits per encoded segment.
pub const SEGMENT_WIDTH: usize = 4;

/// Largest value a segment may hold.
pub const MAX_SEGMENT: u16 = 9999;

const ARITY: usize = 3;

/// A parsed `major.minor.patch` version.
///
/// Ordering is numeric and segment-wise, which is exactly the ordering of
/// the encoded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl Version {
    /// Create a version, rejecting segments above [`MAX_SEGMENT`].
    pub fn new(major: u16, minor: u16, patch: u16) -> StoreResult<Self> {
        for segment in [major, minor, patch] {
            if segment > MAX_SEGMENT {
                return Err(StoreError::VersionFormatInvalid {
                    input: format!("{}.{}.{}", major, minor, patch),
                    reason: format!("segment {} exceeds {}", segment, MAX_SEGMENT),
                });
            }
        }
        Ok(Self {
            major,
            minor,
            patch,
        })
    }

    /// Parse a human-readable version. Segments may carry leading zeros
    /// (`01.2.003`) but must be 1 to 4 digits long.
    pub fn parse(input: &str) -> StoreResult<Self> {
        Self::parse_segments(input, 1)
    }

    /// Parse an encoded version, where every segment is exactly 4 digits.
    pub fn from_encoded(encoded: &str) -> StoreResult<Self> {
        Self::parse_segments(encoded, SEGMENT_WIDTH)
    }

    fn parse_segments(input: &str, min_width: usize) -> StoreResult<Self> {
        let invalid = |reason: String| StoreError::VersionFormatInvalid {
            input: input.to_string(),
            reason,
        };

        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != ARITY {
            return Err(invalid(format!(
                "expected {} dot-separated segments, found {}",
                ARITY,
                parts.len()
            )));
        }

        let mut segments = [0u16; ARITY];
        for (slot, part) in segments.iter_mut().zip(&parts) {
            if part.len() < min_width || part.len() > SEGMENT_WIDTH {
                return Err(invalid(format!(
                    "segment '{}' must be {} digits",
                    part,
                    if min_width == SEGMENT_WIDTH {
                        "exactly 4".to_string()
                    } else {
                        format!("{} to {}", min_width, SEGMENT_WIDTH)
                    }
                )));
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(format!("segment '{}' is not numeric", part)));
            }
            // At most four ASCII digits, so this always fits in a u16.
            *slot = part
                .parse()
                .map_err(|e| invalid(format!("segment '{}': {}", part, e)))?;
        }

        Ok(Self {
            major: segments[0],
            minor: segments[1],
            patch: segments[2],
        })
    }

    /// Fixed-width form used as the storage sort key.
    pub fn encode(&self) -> String {
        format!(
            "{:0w$}.{:0w$}.{:0w$}",
            self.major,
            self.minor,
            self.patch,
            w = SEGMENT_WIDTH
        )
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Outcome of [`compare`].
///
/// Only "strictly greater" is distinguished; callers that care about
/// equality check it separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    Greater,
    NotGreater,
}

/// Encode a dotted version: `"1.2.3"` becomes `"0001.0002.0003"`.
pub fn encode(version: &str) -> StoreResult<String> {
    Ok(Version::parse(version)?.encode())
}

/// Decode an encoded version back to dotted form with leading zeros
/// stripped: `"0001.0000.0010"` becomes `"1.0.10"`.
pub fn decode(encoded: &str) -> StoreResult<String> {
    Ok(Version::from_encoded(encoded)?.to_string())
}

/// Whether encoded version `a` is strictly greater than encoded version `b`.
///
/// Both sides are parsed into [`Version`] first, so inputs of different
/// shapes are rejected rather than compared segment by segment.
pub fn compare(a: &str, b: &str) -> StoreResult<Precedence> {
    let a = Version::from_encoded(a)?;
    let b = Version::from_encoded(b)?;
    Ok(if a > b {
        Precedence::Greater
    } else {
        Precedence::NotGreater
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode("1.2.3").unwrap(), "0001.0002.0003");
        assert_eq!(encode("0.0.0").unwrap(), "0000.0000.0000");
        assert_eq!(encode("9999.10.100").unwrap(), "9999.0010.0100");
    }

    #[test]
    fn test_decode_strips_leading_zeros() {
        assert_eq!(decode("0001.0002.0003").unwrap(), "1.2.3");
        assert_eq!(decode("0000.0000.0000").unwrap(), "0.0.0");
        assert_eq!(decode("0010.0100.1000").unwrap(), "10.100.1000");
    }

    #[test]
    fn test_round_trip_normalizes() {
        assert_eq!(decode(&encode("01.2.003").unwrap()).unwrap(), "1.2.3");
        assert_eq!(decode(&encode("0000.00.0").unwrap()).unwrap(), "0.0.0");
        assert_eq!(decode(&encode("1.0.0").unwrap()).unwrap(), "1.0.0");
    }

    #[test]
    fn test_padding_preserves_numeric_order() {
        let a = encode("1.10.0").unwrap();
        let b = encode("1.2.3").unwrap();
        assert_eq!(compare(&a, &b).unwrap(), Precedence::Greater);
        assert_eq!(compare(&b, &a).unwrap(), Precedence::NotGreater);
        // The encoded strings sort the same way.
        assert!(a > b);
    }

    #[test]
    fn test_compare_equal_is_not_greater() {
        let a = encode("2.0.0").unwrap();
        assert_eq!(compare(&a, &a).unwrap(), Precedence::NotGreater);
    }

    #[test]
    fn test_compare_first_differing_segment_wins() {
        let a = encode("2.0.0").unwrap();
        let b = encode("1.9999.9999").unwrap();
        assert_eq!(compare(&a, &b).unwrap(), Precedence::Greater);
    }

    #[test]
    fn test_compare_rejects_mismatched_shapes() {
        assert!(compare("0001.0002", "0001.0002.0003").is_err());
        assert!(compare("1.2.3", "0001.0002.0003").is_err());
    }

    #[test]
    fn test_parse_rejects_wide_segment() {
        let err = Version::parse("1.10000.0").unwrap_err();
        assert!(matches!(err, StoreError::VersionFormatInvalid { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for input in ["", "1", "1.2", "1.2.3.4", "1..3", "a.b.c", "1.2.-3", "1.2.3 ", "+1.2.3"] {
            assert!(Version::parse(input).is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_from_encoded_requires_full_width() {
        assert!(Version::from_encoded("1.2.3").is_err());
        assert_eq!(
            Version::from_encoded("0001.0002.0003").unwrap(),
            Version::new(1, 2, 3).unwrap()
        );
    }

    #[test]
    fn test_new_bounds() {
        assert!(Version::new(9999, 0, 0).is_ok());
        assert!(Version::new(10000, 0, 0).is_err());
    }

    #[test]
    fn test_ordering_and_display() {
        let v1: Version = "1.2.3".parse().unwrap();
        let v2: Version = "1.10.0".parse().unwrap();
        assert!(v2 > v1);
        assert_eq!(v1.to_string(), "1.2.3");
    }
}
