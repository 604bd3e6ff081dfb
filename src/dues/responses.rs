//! Response DTOs for the dues API endpoints.
//!
//! Every payload carries an explicit `success` flag; failures are rendered
//! by `AppError` with the same envelope.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::forecast::RevenueBreakdown;

/// One (member, period) row of the dues listing.
#[derive(Debug, Clone, Serialize)]
pub struct CuotaRow {
    pub socio_id: i32,
    pub socio: String,
    pub domicilio: String,
    pub cobrador: String,
    pub periodo_id: i32,
    pub periodo: String,
    /// "deudor", "pagado" or "condonado".
    pub estado_pago: String,
    /// "directo" or "anual"; absent for debtor rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origen: Option<String>,
    pub categoria_id: Option<i32>,
    pub categoria: Option<String>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub mensual: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub anual: Option<Decimal>,
    /// Date the prices were resolved at.
    pub fecha_referencia: NaiveDate,
}

/// Response for the dues listing.
#[derive(Debug, Serialize)]
pub struct ListadoResponse {
    pub success: bool,
    pub anio: i32,
    pub periodo: i32,
    pub modo: &'static str,
    pub total: usize,
    pub cuotas: Vec<CuotaRow>,
}

/// Response for single price resolution.
#[derive(Debug, Serialize)]
pub struct PrecioResponse {
    pub success: bool,
    pub categoria_id: i32,
    pub categoria: String,
    pub anio: i32,
    pub periodo: i32,
    pub fecha_referencia: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub mensual: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub anual: Decimal,
}

/// Response for the expected-vs-collected aggregates.
#[derive(Debug, Serialize)]
pub struct RecaudacionResponse {
    pub success: bool,
    pub anio: i32,
    pub meses: Vec<u32>,
    pub esperado: RevenueBreakdown,
    pub cobrado: RevenueBreakdown,
}

/// Response for payment deletion.
#[derive(Debug, Serialize)]
pub struct BorrarPagoResponse {
    pub success: bool,
    /// Id of the deleted row.
    pub pago_id: i32,
    /// Whether the direct row or the annual row was deleted.
    pub origen: &'static str,
}
