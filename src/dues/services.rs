//! Dues service functions with database access.
//!
//! These orchestrate the pure engine modules (calendar, eligibility,
//! ledger, prices, forecast) over the store: one request builds one ledger
//! projection and one `RequestMemo`, then emits rows. Everything except
//! payment deletion is read-only and side-effect free.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::cache::AppCache;
use crate::error::{AppError, Result};

use super::calendar::{month_range, reference_date};
use super::constants::ANNUAL_PERIOD_ID;
use super::eligibility::is_eligible;
use super::forecast::{self, ForecastMember, RevenueBreakdown};
use super::ledger::{project_ledger, PaymentOrigin, PaymentState, ProjectedState};
use super::memo::RequestMemo;
use super::models::{Pago, Periodo};
use super::queries;
use super::requests::{BorrarPagoParams, ListadoParams, Modo, PrecioParams, RecaudacionParams};
use super::responses::{BorrarPagoResponse, CuotaRow, PrecioResponse};

/// Label used when a member has no collector assigned.
const SIN_COBRADOR: &str = "Sin cobrador";

/// Whether a projected entry belongs in a listing of the given mode.
fn row_matches_modo(entry: Option<ProjectedState>, modo: Modo) -> bool {
    match modo {
        Modo::Deudor => entry.is_none(),
        Modo::Pagado => matches!(entry, Some(e) if e.state == PaymentState::Pagado),
        Modo::Condonado => matches!(entry, Some(e) if e.state == PaymentState::Condonado),
    }
}

/// The dues listing: one row per (member, period) that survives eligibility
/// and mode filtering.
pub async fn listado(
    pool: &PgPool,
    cache: &AppCache,
    params: &ListadoParams,
) -> Result<Vec<CuotaRow>> {
    let periodos = cache.periodos(pool).await?;
    let socios = queries::get_socios(pool, params.cobrador, params.activo).await?;
    let pagos = queries::get_pagos_por_anio(pool, params.anio).await?;

    let mut pagos_por_socio: HashMap<i32, Vec<Pago>> = HashMap::new();
    for pago in pagos {
        pagos_por_socio.entry(pago.socio_id).or_default().push(pago);
    }

    let objetivo: Vec<&Periodo> = periodos
        .iter()
        .filter(|p| params.periodo == 0 || p.id == params.periodo)
        .collect();

    let mut memo = RequestMemo::new();
    let mut rows = Vec::new();

    for socio in &socios {
        let ledger = project_ledger(
            pagos_por_socio
                .get(&socio.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        );

        for periodo in &objetivo {
            // the annual period falls through to (1, 12): eligible iff
            // enrolled by December 31
            let (_, end_month) = month_range(periodo.id, periodo.meses.as_deref());
            if !is_eligible(socio.fecha_alta.as_deref(), end_month, params.anio) {
                continue;
            }

            let entry = ledger.get(&periodo.id).copied();
            if !row_matches_modo(entry, params.modo) {
                continue;
            }

            let referencia = reference_date(params.anio, periodo.id, periodo.meses.as_deref());
            let precios = match socio.categoria_id {
                Some(id) => memo.precios_categoria(pool, id, referencia).await?,
                None => None,
            };

            rows.push(CuotaRow {
                socio_id: socio.id,
                socio: socio.display_name(),
                domicilio: socio.domicilio(),
                cobrador: socio
                    .cobrador_nombre
                    .clone()
                    .unwrap_or_else(|| SIN_COBRADOR.to_string()),
                periodo_id: periodo.id,
                periodo: periodo.nombre.clone(),
                estado_pago: entry
                    .map(|e| e.state.as_str())
                    .unwrap_or("deudor")
                    .to_string(),
                origen: entry.map(|e| e.origin.as_str().to_string()),
                categoria_id: precios.as_ref().map(|p| p.categoria_id),
                categoria: precios.as_ref().map(|p| p.categoria_nombre.clone()),
                mensual: precios.as_ref().map(|p| p.mensual),
                anual: precios.as_ref().map(|p| p.anual),
                fecha_referencia: referencia,
            });
        }
    }

    debug!(
        "listado anio={} periodo={} modo={}: {} rows from {} members",
        params.anio,
        params.periodo,
        params.modo.as_str(),
        rows.len(),
        socios.len()
    );
    Ok(rows)
}

/// Resolve `{mensual, anual}` for a category (or a member's category) at
/// the reference date of (anio, periodo).
pub async fn precio(
    pool: &PgPool,
    cache: &AppCache,
    params: &PrecioParams,
) -> Result<PrecioResponse> {
    let categoria_id = match (params.categoria, params.socio) {
        (Some(id), _) => id,
        (None, Some(socio_id)) => {
            let socio = queries::get_socio(pool, socio_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("socio {} not found", socio_id)))?;
            socio.categoria_id.ok_or_else(|| {
                AppError::Validation(format!("socio {} has no dues category", socio_id))
            })?
        }
        (None, None) => {
            return Err(AppError::Validation(
                "either 'categoria' or 'socio' is required".to_string(),
            ))
        }
    };

    let periodos = cache.periodos(pool).await?;
    let meses = periodos
        .iter()
        .find(|p| p.id == params.periodo)
        .and_then(|p| p.meses.as_deref());
    let referencia = reference_date(params.anio, params.periodo, meses);

    let mut memo = RequestMemo::new();
    let precios = memo
        .precios_categoria(pool, categoria_id, referencia)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("categoria {} not found", categoria_id)))?;

    Ok(PrecioResponse {
        success: true,
        categoria_id: precios.categoria_id,
        categoria: precios.categoria_nombre,
        anio: params.anio,
        periodo: params.periodo,
        fecha_referencia: referencia,
        mensual: precios.mensual,
        anual: precios.anual,
    })
}

/// Expected-vs-collected revenue for a year over the requested months.
///
/// Expected comes from the forecast aggregator over active members.
/// Collected values every paid row at the price in force at its period's
/// reference date; condoned rows are settled but never revenue.
pub async fn recaudacion(
    pool: &PgPool,
    cache: &AppCache,
    params: &RecaudacionParams,
) -> Result<(RevenueBreakdown, RevenueBreakdown)> {
    let mut memo = RequestMemo::new();

    // expected side
    let socios = queries::get_socios(pool, None, Some(true)).await?;
    let mut members = Vec::with_capacity(socios.len());
    for socio in &socios {
        let Some(categoria_id) = socio.categoria_id else {
            continue;
        };
        let Some(categoria) = memo.categoria(pool, categoria_id).await? else {
            continue;
        };
        members.push(ForecastMember {
            socio_id: socio.id,
            cobrador: socio
                .cobrador_nombre
                .clone()
                .unwrap_or_else(|| SIN_COBRADOR.to_string()),
            fecha_alta: socio.fecha_alta.clone(),
            monto_mensual: categoria.monto_mensual,
        });
    }
    let esperado = forecast::expected_revenue(params.anio, &params.meses, &members);

    // collected side
    let periodos = cache.periodos(pool).await?;
    let pagos = queries::get_pagos_cobranza(pool, params.anio).await?;
    let mut cobrado = RevenueBreakdown::default();
    for pago in &pagos {
        if PaymentState::from_estado(pago.estado.as_deref()) != PaymentState::Pagado {
            continue;
        }
        let mes = chrono::Datelike::month(&pago.fecha_pago);
        if !params.meses.contains(&mes) {
            continue;
        }
        let Some(categoria_id) = pago.categoria_id else {
            continue;
        };
        let meses_texto = periodos
            .iter()
            .find(|p| p.id == pago.periodo_id)
            .and_then(|p| p.meses.as_deref());
        let referencia = reference_date(params.anio, pago.periodo_id, meses_texto);
        let Some(precios) = memo.precios_categoria(pool, categoria_id, referencia).await? else {
            continue;
        };
        let monto: Decimal = if pago.periodo_id == ANNUAL_PERIOD_ID {
            precios.anual
        } else {
            precios.mensual
        };
        let cobrador = pago.cobrador_nombre.as_deref().unwrap_or(SIN_COBRADOR);
        cobrado.add(cobrador, mes, monto);
    }

    Ok((esperado, cobrado))
}

/// Delete one payment row: the direct row for (socio, periodo, anio) when it
/// exists, otherwise the annual row of the same year.
///
/// Runs in a READ COMMITTED transaction with a `FOR UPDATE` lock on the
/// candidate row, so two concurrent deletes of the same payment cannot both
/// observe it. A missing row is a not-found outcome, not a storage error.
pub async fn borrar_pago(pool: &PgPool, params: &BorrarPagoParams) -> Result<BorrarPagoResponse> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
        .execute(&mut *tx)
        .await?;

    let locked =
        match queries::lock_pago(&mut *tx, params.socio, params.periodo, params.anio).await? {
            Some(id) => Some((id, PaymentOrigin::Directo)),
            None if params.periodo != ANNUAL_PERIOD_ID => {
                queries::lock_pago(&mut *tx, params.socio, ANNUAL_PERIOD_ID, params.anio)
                    .await?
                    .map(|id| (id, PaymentOrigin::Anual))
            }
            None => None,
        };

    let Some((pago_id, origen)) = locked else {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!(
            "no payment found for socio {} periodo {} anio {}",
            params.socio, params.periodo, params.anio
        )));
    };

    queries::delete_pago(&mut *tx, pago_id).await?;
    tx.commit().await?;

    info!(
        "deleted pago {} (socio {} periodo {} anio {}, {})",
        pago_id,
        params.socio,
        params.periodo,
        params.anio,
        origen.as_str()
    );
    Ok(BorrarPagoResponse {
        success: true,
        pago_id,
        origen: origen.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(state: PaymentState, origin: PaymentOrigin) -> Option<ProjectedState> {
        Some(ProjectedState { state, origin })
    }

    #[test]
    fn test_row_matches_modo_deudor() {
        assert!(row_matches_modo(None, Modo::Deudor));
        assert!(!row_matches_modo(
            entry(PaymentState::Pagado, PaymentOrigin::Directo),
            Modo::Deudor
        ));
    }

    #[test]
    fn test_row_matches_modo_pagado_any_origin() {
        assert!(row_matches_modo(
            entry(PaymentState::Pagado, PaymentOrigin::Directo),
            Modo::Pagado
        ));
        assert!(row_matches_modo(
            entry(PaymentState::Pagado, PaymentOrigin::Anual),
            Modo::Pagado
        ));
        assert!(!row_matches_modo(None, Modo::Pagado));
        assert!(!row_matches_modo(
            entry(PaymentState::Condonado, PaymentOrigin::Directo),
            Modo::Pagado
        ));
    }

    #[test]
    fn test_row_matches_modo_condonado() {
        assert!(row_matches_modo(
            entry(PaymentState::Condonado, PaymentOrigin::Anual),
            Modo::Condonado
        ));
        assert!(!row_matches_modo(None, Modo::Condonado));
    }

    #[test]
    fn test_mid_year_enrollment_scenario() {
        // member enrolled 2024-03-15 with a direct period-2 payment: period 1
        // is ineligible (closed 2024-02-29) and shows in no mode; period 2 is
        // eligible and paid directly
        use super::super::eligibility::is_eligible;
        use super::super::ledger::project_ledger;
        use super::super::models::Pago;
        use chrono::NaiveDate;

        let alta = Some("2024-03-15");
        let pagos = [Pago {
            id: 1,
            socio_id: 1,
            periodo_id: 2,
            estado: Some("pagado".to_string()),
            fecha_pago: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        }];
        let ledger = project_ledger(&pagos);

        assert!(!is_eligible(alta, 2, 2024));
        assert!(is_eligible(alta, 4, 2024));

        let periodo2 = ledger.get(&2).copied();
        assert!(row_matches_modo(periodo2, Modo::Pagado));
        assert_eq!(periodo2.unwrap().origin, PaymentOrigin::Directo);

        // period 3 has no record: the member owes it
        assert!(row_matches_modo(ledger.get(&3).copied(), Modo::Deudor));
    }
}
