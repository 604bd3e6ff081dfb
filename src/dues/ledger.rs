//! Projection of raw payment rows into per-period payment state.
//!
//! The projection is read-derived: it is rebuilt from the `pagos` rows on
//! every request and never stored, so inserting or deleting a row simply
//! changes what the next projection produces.

use std::collections::BTreeMap;

use serde::Serialize;

use super::constants::{ANNUAL_PERIOD_ID, BIMONTHLY_PERIOD_IDS};
use super::models::Pago;

/// Settled state of a period. Legacy rows may carry NULL or free-form
/// `estado` values; anything that is not an explicit condonation counts as
/// paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Pagado,
    Condonado,
}

impl PaymentState {
    pub fn from_estado(estado: Option<&str>) -> Self {
        match estado {
            Some(e) if e.trim().eq_ignore_ascii_case("condonado") => PaymentState::Condonado,
            _ => PaymentState::Pagado,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentState::Pagado => "pagado",
            PaymentState::Condonado => "condonado",
        }
    }
}

/// Whether a period was settled by its own row or inherited the annual one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOrigin {
    Directo,
    Anual,
}

impl PaymentOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentOrigin::Directo => "directo",
            PaymentOrigin::Anual => "anual",
        }
    }
}

/// Resolved state of one period in the ledger projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedState {
    pub state: PaymentState,
    pub origin: PaymentOrigin,
}

/// Project one member's payment rows for one year onto the period axis.
///
/// Direct rows for periods 1-6 always win; an annual row propagates its
/// state to every bimonthly period without a direct record, and projects
/// itself as the direct state of period 7. Periods with no row at all are
/// absent from the map (the member owes them).
///
/// `pagos` must be ordered by id: when the same period was recorded more
/// than once, the earliest row is kept.
pub fn project_ledger(pagos: &[Pago]) -> BTreeMap<i32, ProjectedState> {
    let mut ledger = BTreeMap::new();
    let mut anual: Option<&Pago> = None;

    for pago in pagos {
        if pago.periodo_id == ANNUAL_PERIOD_ID {
            if anual.is_none() {
                anual = Some(pago);
            }
        } else if !ledger.contains_key(&pago.periodo_id) {
            ledger.insert(
                pago.periodo_id,
                ProjectedState {
                    state: PaymentState::from_estado(pago.estado.as_deref()),
                    origin: PaymentOrigin::Directo,
                },
            );
        }
    }

    if let Some(pago) = anual {
        let state = PaymentState::from_estado(pago.estado.as_deref());
        ledger.insert(
            ANNUAL_PERIOD_ID,
            ProjectedState { state, origin: PaymentOrigin::Directo },
        );
        for periodo in BIMONTHLY_PERIOD_IDS {
            ledger.entry(periodo).or_insert(ProjectedState {
                state,
                origin: PaymentOrigin::Anual,
            });
        }
    }

    ledger
}
