//! Expected revenue at month granularity.
//!
//! A bimonthly period as a whole is worth one monthly amount; a single
//! month within it is worth half of that, rounded per month *before* any
//! summation so that totals reproduce exactly. A member contributes at most
//! the two months that compose a period, no matter how many months were
//! requested.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::calendar::period_of_month;
use super::eligibility::parse_fecha;

/// One member as the aggregator sees it: enrollment, collector and the
/// monthly amount of their category.
#[derive(Debug, Clone)]
pub struct ForecastMember {
    pub socio_id: i32,
    pub cobrador: String,
    pub fecha_alta: Option<String>,
    pub monto_mensual: Decimal,
}

/// Revenue totals broken down by collector and by collector/month. Used for
/// both the expected and the collected side of the aggregate endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RevenueBreakdown {
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub por_cobrador: BTreeMap<String, Decimal>,
    pub por_cobrador_mes: BTreeMap<String, BTreeMap<u32, Decimal>>,
}

impl RevenueBreakdown {
    pub fn add(&mut self, cobrador: &str, mes: u32, monto: Decimal) {
        self.total += monto;
        *self
            .por_cobrador
            .entry(cobrador.to_string())
            .or_insert(Decimal::ZERO) += monto;
        *self
            .por_cobrador_mes
            .entry(cobrador.to_string())
            .or_default()
            .entry(mes)
            .or_insert(Decimal::ZERO) += monto;
    }
}

/// Half of a period's monthly amount, rounded half away from zero the way
/// the legacy system rounded.
pub fn half_month_amount(monto: Decimal) -> Decimal {
    (monto / Decimal::TWO).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Requested months a member can actually be billed for in `year`.
///
/// Members enrolled in an earlier year owe every requested month, members
/// enrolled later owe none, and members enrolled within `year` owe the
/// months from their enrollment month on. Unreadable enrollment dates fail
/// open to every month.
fn billable_months(fecha_alta: Option<&str>, year: i32, months: &[u32]) -> Vec<u32> {
    use chrono::Datelike;

    let Some(alta) = fecha_alta.and_then(parse_fecha) else {
        return months.to_vec();
    };
    if alta.year() < year {
        return months.to_vec();
    }
    if alta.year() > year {
        return Vec::new();
    }
    months.iter().copied().filter(|&m| m >= alta.month()).collect()
}

/// Theoretically-owed revenue for `year` over the requested months.
///
/// Months are sorted and deduplicated first; within each bimonthly period
/// only the first two eligible months receive apportionment, capping every
/// member at one full period's worth per bimester.
pub fn expected_revenue(year: i32, months: &[u32], members: &[ForecastMember]) -> RevenueBreakdown {
    let mut requested: Vec<u32> = months
        .iter()
        .copied()
        .filter(|m| (1..=12).contains(m))
        .collect();
    requested.sort_unstable();
    requested.dedup();

    let mut out = RevenueBreakdown::default();
    for member in members {
        let billable = billable_months(member.fecha_alta.as_deref(), year, &requested);
        let mut months_per_period: BTreeMap<i32, u32> = BTreeMap::new();
        for &mes in &billable {
            let counted = months_per_period.entry(period_of_month(mes)).or_insert(0);
            if *counted >= 2 {
                continue;
            }
            *counted += 1;
            out.add(&member.cobrador, mes, half_month_amount(member.monto_mensual));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn member(cobrador: &str, fecha_alta: Option<&str>, monto: Decimal) -> ForecastMember {
        ForecastMember {
            socio_id: 1,
            cobrador: cobrador.to_string(),
            fecha_alta: fecha_alta.map(str::to_string),
            monto_mensual: monto,
        }
    }

    // ==================== rounding ====================

    #[test]
    fn test_half_month_amount_even() {
        assert_eq!(half_month_amount(dec!(4000)), dec!(2000));
    }

    #[test]
    fn test_half_month_amount_rounds_half_up() {
        // 4001 / 2 = 2000.5 -> 2001, per-month, before summation
        assert_eq!(half_month_amount(dec!(4001)), dec!(2001));
        assert_eq!(half_month_amount(dec!(3999)), dec!(2000));
    }

    // ==================== apportionment ====================

    #[test]
    fn test_full_year_is_six_periods_worth() {
        let months: Vec<u32> = (1..=12).collect();
        let out = expected_revenue(2024, &months, &[member("Lopez", None, dec!(4000))]);
        assert_eq!(out.total, dec!(24000));
        assert_eq!(out.por_cobrador["Lopez"], dec!(24000));
    }

    #[test]
    fn test_apportionment_cap_across_periods() {
        // months 5,6,7 span periods 3 and 4: 1.5 periods' worth, not 3
        let out = expected_revenue(2024, &[5, 6, 7], &[member("Lopez", None, dec!(4000))]);
        assert_eq!(out.total, dec!(6000));
    }

    #[test]
    fn test_duplicate_months_do_not_double_count() {
        let out = expected_revenue(2024, &[5, 5, 5, 6], &[member("Lopez", None, dec!(4000))]);
        assert_eq!(out.total, dec!(4000));
    }

    #[test]
    fn test_months_outside_calendar_are_ignored() {
        let out = expected_revenue(2024, &[0, 1, 13], &[member("Lopez", None, dec!(4000))]);
        assert_eq!(out.total, dec!(2000));
    }

    #[test]
    fn test_rounding_applied_per_month() {
        // round(4001/2) + round(4001/2) = 4002, not round(4001)
        let out = expected_revenue(2024, &[1, 2], &[member("Lopez", None, dec!(4001))]);
        assert_eq!(out.total, dec!(4002));
    }

    // ==================== enrollment filtering ====================

    #[test]
    fn test_member_enrolled_mid_year() {
        let months: Vec<u32> = (1..=12).collect();
        let out = expected_revenue(
            2024,
            &months,
            &[member("Lopez", Some("2024-05-20"), dec!(4000))],
        );
        // months 5..=12: 8 half-months
        assert_eq!(out.total, dec!(16000));
        let por_mes = &out.por_cobrador_mes["Lopez"];
        assert!(!por_mes.contains_key(&4));
        assert_eq!(por_mes[&5], dec!(2000));
    }

    #[test]
    fn test_member_enrolled_prior_year_owes_everything() {
        let out = expected_revenue(2024, &[1, 2], &[member("Lopez", Some("2010-01-01"), dec!(4000))]);
        assert_eq!(out.total, dec!(4000));
    }

    #[test]
    fn test_member_enrolled_future_year_owes_nothing() {
        let months: Vec<u32> = (1..=12).collect();
        let out = expected_revenue(2024, &months, &[member("Lopez", Some("2025-01-01"), dec!(4000))]);
        assert_eq!(out.total, dec!(0));
        assert!(out.por_cobrador.is_empty());
    }

    #[test]
    fn test_unreadable_alta_fails_open() {
        let out = expected_revenue(2024, &[1, 2], &[member("Lopez", Some("fundador"), dec!(4000))]);
        assert_eq!(out.total, dec!(4000));
    }

    // ==================== breakdown ====================

    #[test]
    fn test_per_collector_breakdown() {
        let out = expected_revenue(
            2024,
            &[1, 2],
            &[
                member("Lopez", None, dec!(4000)),
                member("Gomez", None, dec!(3000)),
                member("Lopez", None, dec!(2000)),
            ],
        );
        assert_eq!(out.total, dec!(9000));
        assert_eq!(out.por_cobrador["Lopez"], dec!(6000));
        assert_eq!(out.por_cobrador["Gomez"], dec!(3000));
        assert_eq!(out.por_cobrador_mes["Lopez"][&1], dec!(3000));
        assert_eq!(out.por_cobrador_mes["Gomez"][&2], dec!(1500));
    }
}
