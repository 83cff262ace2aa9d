// src/data/size.rs

//! Exact integer byte-size arithmetic for log tokens like `8192k` or
//! `4096 MB`.
//!
//! The JVM prints sizes with 1024-step units (a "k" is 1024 bytes, not
//! 1000). All conversion here is integer arithmetic; converting back to
//! a coarser unit for display rounds half-to-even so repeated runs
//! produce byte-identical report output.

use crate::common::ByteSz;

/// Bytes per unit step.
pub const BYTES_PER_KIB: ByteSz = 1024;
pub const BYTES_PER_MIB: ByteSz = 1024 * 1024;
pub const BYTES_PER_GIB: ByteSz = 1024 * 1024 * 1024;

/// A size unit suffix from a log line, case-insensitive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SizeUnit {
    Bytes,
    Kib,
    Mib,
    Gib,
}

impl SizeUnit {
    /// Interpret a unit suffix character. Unknown suffixes are `None`;
    /// the classifier regexes only capture `[bBkKmMgG]` so `None` is
    /// unreachable from classified lines.
    pub fn from_suffix(suffix: &str) -> Option<SizeUnit> {
        match suffix {
            "b" | "B" => Some(SizeUnit::Bytes),
            "k" | "K" => Some(SizeUnit::Kib),
            "m" | "M" => Some(SizeUnit::Mib),
            "g" | "G" => Some(SizeUnit::Gib),
            _ => None,
        }
    }

    pub const fn multiplier(self) -> ByteSz {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::Kib => BYTES_PER_KIB,
            SizeUnit::Mib => BYTES_PER_MIB,
            SizeUnit::Gib => BYTES_PER_GIB,
        }
    }
}

/// Convert a captured `(value, unit-suffix)` pair to bytes.
///
/// Returns `None` for an unrecognized suffix or an overflowing value.
pub fn size_to_bytes(
    value: ByteSz,
    suffix: &str,
) -> Option<ByteSz> {
    let unit: SizeUnit = SizeUnit::from_suffix(suffix)?;
    value.checked_mul(unit.multiplier())
}

/// Integer division rounding half-to-even ("banker's rounding").
///
/// Used for all display conversions; round-half-up would drift report
/// output depending on which side of the boundary values fall.
pub fn div_round_half_even(
    numerator: ByteSz,
    denominator: ByteSz,
) -> ByteSz {
    debug_assert!(denominator > 0);
    let quotient: ByteSz = numerator / denominator;
    let remainder: ByteSz = numerator % denominator;
    match (remainder * 2).cmp(&denominator) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => {
            // exactly halfway, round to the even neighbor
            if quotient % 2 == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    }
}

/// Convert a byte count back to a coarser display unit,
/// rounding half-to-even.
pub fn bytes_to_unit(
    bytes: ByteSz,
    unit: SizeUnit,
) -> ByteSz {
    match unit {
        SizeUnit::Bytes => bytes,
        _ => div_round_half_even(bytes, unit.multiplier()),
    }
}

/// Render a byte count scaled to a reasonable display unit, e.g.
/// `"4096M"`. Chooses the largest unit that keeps the value non-zero.
pub fn bytes_to_display(bytes: ByteSz) -> String {
    if bytes >= BYTES_PER_GIB {
        format!("{}G", bytes_to_unit(bytes, SizeUnit::Gib))
    } else if bytes >= BYTES_PER_MIB {
        format!("{}M", bytes_to_unit(bytes, SizeUnit::Mib))
    } else if bytes >= BYTES_PER_KIB {
        format!("{}K", bytes_to_unit(bytes, SizeUnit::Kib))
    } else {
        format!("{}B", bytes)
    }
}

/// Whole-number percentage `part` of `whole`, rounded half-to-even.
/// `None` when `whole` is zero.
pub fn percent_of(
    part: ByteSz,
    whole: ByteSz,
) -> Option<ByteSz> {
    if whole == 0 {
        return None;
    }
    Some(div_round_half_even(part * 100, whole))
}
