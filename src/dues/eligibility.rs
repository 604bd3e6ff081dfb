//! Enrollment-based eligibility for billing periods.
//!
//! The legacy `fecha_alta` column is free text and contains more than one
//! date layout plus the occasional garbage value. Anything that cannot be
//! read fails open: the member is billable. Downstream totals depend on
//! that exact behavior.

use chrono::NaiveDate;

use super::calendar::last_day_of_month;

/// Date layouts accepted for `fecha_alta`, tried in order.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a legacy enrollment date. `None` means unreadable.
pub fn parse_fecha(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Whether a member may be billed for a period closing at `end_month` of
/// `year`.
///
/// Enrollment on or before the period's closing day qualifies; strictly
/// after does not. Missing or unreadable enrollment dates qualify.
pub fn is_eligible(fecha_alta: Option<&str>, end_month: u32, year: i32) -> bool {
    let Some(text) = fecha_alta else { return true };
    let Some(alta) = parse_fecha(text) else { return true };
    match last_day_of_month(year, end_month) {
        Some(close) => alta <= close,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fecha_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_fecha("2024-03-15"), expected);
        assert_eq!(parse_fecha("15/03/2024"), expected);
        assert_eq!(parse_fecha("15-03-2024"), expected);
        assert_eq!(parse_fecha("  2024-03-15  "), expected);
    }

    #[test]
    fn test_parse_fecha_garbage() {
        assert_eq!(parse_fecha("socio fundador"), None);
        assert_eq!(parse_fecha(""), None);
        assert_eq!(parse_fecha("2024-13-40"), None);
    }

    #[test]
    fn test_missing_alta_is_eligible() {
        assert!(is_eligible(None, 2, 2024));
    }

    #[test]
    fn test_unparsable_alta_fails_open() {
        assert!(is_eligible(Some("alta vieja"), 2, 2024));
    }

    #[test]
    fn test_enrollment_before_period_close() {
        // enrolled 2024-03-15; period 2 closes 2024-04-30
        assert!(is_eligible(Some("2024-03-15"), 4, 2024));
    }

    #[test]
    fn test_enrollment_after_period_close() {
        // enrolled 2024-03-15; period 1 closed 2024-02-29
        assert!(!is_eligible(Some("2024-03-15"), 2, 2024));
    }

    #[test]
    fn test_enrollment_on_closing_day_qualifies() {
        assert!(is_eligible(Some("2024-02-29"), 2, 2024));
    }

    #[test]
    fn test_eligibility_is_monotone_across_periods() {
        let alta = Some("2024-05-10");
        let end_months = [2u32, 4, 6, 8, 10, 12];
        let eligible: Vec<bool> = end_months
            .iter()
            .map(|&end| is_eligible(alta, end, 2024))
            .collect();
        // once eligible, eligible for every later-ending period
        let first = eligible.iter().position(|&e| e).unwrap();
        assert!(eligible[first..].iter().all(|&e| e));
        assert_eq!(eligible, [false, false, true, true, true, true]);
        // and for every period of a later year
        assert!(end_months.iter().all(|&end| is_eligible(alta, end, 2025)));
    }
}
