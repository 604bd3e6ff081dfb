//! Fixed reference values shared by every dues component.
//!
//! Period ids and month tables live here rather than being re-declared per
//! module; the annual period id in particular is special-cased everywhere.

use std::ops::RangeInclusive;

/// Period id of the annual lump-sum option ("Anual").
pub const ANNUAL_PERIOD_ID: i32 = 7;

/// Bimonthly period ids, in calendar order.
pub const BIMONTHLY_PERIOD_IDS: RangeInclusive<i32> = 1..=6;

/// Earliest year the association keeps dues records for. Requests below
/// this are rejected as invalid input.
pub const MIN_YEAR: i32 = 1990;

/// Fixed month pairs for bimonthly periods 1-6, used when a period's
/// free-text description yields no recognizable month names.
pub const BIMONTHLY_MONTHS: [(u32, u32); 6] = [(1, 2), (3, 4), (5, 6), (7, 8), (9, 10), (11, 12)];

/// Month range meaning "the whole year", the last resort of the month-range
/// fallback chain.
pub const WHOLE_YEAR: (u32, u32) = (1, 12);

/// Spanish month names, lowercase, including the "setiembre" spelling that
/// appears in older period descriptions.
pub const SPANISH_MONTHS: [(&str, u32); 13] = [
    ("enero", 1),
    ("febrero", 2),
    ("marzo", 3),
    ("abril", 4),
    ("mayo", 5),
    ("junio", 6),
    ("julio", 7),
    ("agosto", 8),
    ("septiembre", 9),
    ("setiembre", 9),
    ("octubre", 10),
    ("noviembre", 11),
    ("diciembre", 12),
];
