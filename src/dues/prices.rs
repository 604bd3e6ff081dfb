//! Historical price resolution for dues categories.
//!
//! A category carries its current monthly and annual prices; every change
//! is appended to `categoria_historial` with the old price, the new price
//! and the effective date. Resolution answers "what price was in force at
//! this date" from that log.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::models::CategoriaHistorial;

/// Which of a category's two price series a lookup targets. The two series
/// have independent change histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    Mensual,
    Anual,
}

impl PriceKind {
    /// The `tipo` discriminator stored in `categoria_historial`.
    pub fn as_str(self) -> &'static str {
        match self {
            PriceKind::Mensual => "mensual",
            PriceKind::Anual => "anual",
        }
    }
}

/// Both resolved prices for a category at one reference date.
#[derive(Debug, Clone)]
pub struct PreciosVigentes {
    pub categoria_id: i32,
    pub categoria_nombre: String,
    pub mensual: Decimal,
    pub anual: Decimal,
}

/// Price in force at `reference`, given one series' change log sorted
/// ascending by effective date and the category's current price.
///
/// No recorded changes means the current price has always applied. A
/// reference before the first change predates the log, so the first entry's
/// old price was in force. Otherwise the latest change on or before the
/// reference is the "vigente" one.
pub fn resolve_price(
    history: &[CategoriaHistorial],
    reference: NaiveDate,
    current: Decimal,
) -> Decimal {
    let Some(first) = history.first() else {
        return current;
    };
    if reference < first.fecha_cambio {
        return first.precio_viejo;
    }
    history
        .iter()
        .filter(|entry| entry.fecha_cambio <= reference)
        .last()
        .map(|entry| entry.precio_nuevo)
        .unwrap_or(current)
}
