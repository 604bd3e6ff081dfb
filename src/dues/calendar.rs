//! Period calendar arithmetic: month ranges and price reference dates.
//!
//! Month ranges come from an ordered fallback chain so the resolution order
//! stays auditable: month names found in the period's description, then the
//! fixed bimonthly table, then the whole year.

use chrono::NaiveDate;

use super::constants::{ANNUAL_PERIOD_ID, BIMONTHLY_MONTHS, SPANISH_MONTHS, WHOLE_YEAR};

type RangeRule = fn(i32, Option<&str>) -> Option<(u32, u32)>;

/// Fallback chain, tried in order. The permissive whole-year default is
/// applied when every rule declines.
const RANGE_RULES: [RangeRule; 2] = [range_from_names, range_from_table];

/// Calendar months covered by a period, as an inclusive `(start, end)` pair.
///
/// The annual period and unknown period ids fall through every rule and
/// resolve to the whole year.
pub fn month_range(period_id: i32, meses: Option<&str>) -> (u32, u32) {
    RANGE_RULES
        .iter()
        .find_map(|rule| rule(period_id, meses))
        .unwrap_or(WHOLE_YEAR)
}

/// Rule 1: every Spanish month name found in the description (substring,
/// case-insensitive); the range is (min, max) of the months found.
fn range_from_names(_period_id: i32, meses: Option<&str>) -> Option<(u32, u32)> {
    let text = meses?.to_lowercase();
    let found: Vec<u32> = SPANISH_MONTHS
        .iter()
        .filter(|(name, _)| text.contains(name))
        .map(|&(_, month)| month)
        .collect();
    let start = found.iter().min().copied()?;
    let end = found.iter().max().copied()?;
    Some((start, end))
}

/// Rule 2: the fixed bimonthly table for period ids 1-6.
fn range_from_table(period_id: i32, _meses: Option<&str>) -> Option<(u32, u32)> {
    let index = usize::try_from(period_id - 1).ok()?;
    BIMONTHLY_MONTHS.get(index).copied()
}

/// Last calendar day of `month` in `year`. `None` only for inputs chrono
/// cannot represent.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month >= 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// December 31 of `year`.
pub fn year_end(year: i32) -> NaiveDate {
    // year is range-checked at the request boundary; MAX is unreachable
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Date used to look up which historical price was in force for a period.
///
/// The annual period (and any unrecognized id) resolves prices as of
/// December 31; bimonthly periods use the last day of their end month.
pub fn reference_date(year: i32, period_id: i32, meses: Option<&str>) -> NaiveDate {
    if period_id == ANNUAL_PERIOD_ID {
        return year_end(year);
    }
    let (_, end_month) = month_range(period_id, meses);
    last_day_of_month(year, end_month).unwrap_or_else(|| year_end(year))
}

/// Bimonthly period id a calendar month belongs to (1-2 -> 1, ... 11-12 -> 6).
pub fn period_of_month(month: u32) -> i32 {
    ((month + 1) / 2) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== month_range tests ====================

    #[test]
    fn test_month_range_from_names() {
        assert_eq!(month_range(1, Some("Enero - Febrero")), (1, 2));
        assert_eq!(month_range(3, Some("MAYO y JUNIO")), (5, 6));
        assert_eq!(month_range(5, Some("Septiembre/Octubre")), (9, 10));
    }

    #[test]
    fn test_month_range_accepts_setiembre_spelling() {
        assert_eq!(month_range(5, Some("Setiembre - Octubre")), (9, 10));
    }

    #[test]
    fn test_month_range_single_name() {
        // one recognizable name collapses to a single-month range
        assert_eq!(month_range(2, Some("cuota de marzo")), (3, 3));
    }

    #[test]
    fn test_month_range_names_win_over_table() {
        // description contradicts the period id; the names rule wins
        assert_eq!(month_range(1, Some("Julio - Agosto")), (7, 8));
    }

    #[test]
    fn test_month_range_table_fallback() {
        assert_eq!(month_range(1, None), (1, 2));
        assert_eq!(month_range(4, Some("sin detalle")), (7, 8));
        assert_eq!(month_range(6, Some("")), (11, 12));
    }

    #[test]
    fn test_month_range_whole_year_fallback() {
        assert_eq!(month_range(7, Some("Anual")), (1, 12));
        assert_eq!(month_range(0, None), (1, 12));
        assert_eq!(month_range(-3, None), (1, 12));
        assert_eq!(month_range(99, Some("???")), (1, 12));
    }

    // ==================== date helper tests ====================

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2025, 6), NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(last_day_of_month(2025, 12), NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(last_day_of_month(2025, 2), NaiveDate::from_ymd_opt(2025, 2, 28));
    }

    #[test]
    fn test_last_day_of_month_leap_february() {
        assert_eq!(last_day_of_month(2024, 2), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_reference_date_bimonthly() {
        assert_eq!(
            reference_date(2025, 3, Some("Mayo - Junio")),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        );
        assert_eq!(
            reference_date(2024, 1, None),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_reference_date_annual_is_year_end() {
        assert_eq!(
            reference_date(2025, ANNUAL_PERIOD_ID, Some("Anual")),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_reference_date_unknown_period_is_year_end() {
        assert_eq!(
            reference_date(2025, 42, None),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_period_of_month() {
        assert_eq!(period_of_month(1), 1);
        assert_eq!(period_of_month(2), 1);
        assert_eq!(period_of_month(5), 3);
        assert_eq!(period_of_month(7), 4);
        assert_eq!(period_of_month(12), 6);
    }
}
