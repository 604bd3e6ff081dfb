//! Route handlers for the dues API.
//!
//! All handlers speak JSON with an explicit `success` flag; failures are
//! rendered with the same envelope by `AppError`.

use axum::{
    extract::{Query, State},
    routing::{delete, get},
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::requests::{BorrarPagoQuery, ListadoQuery, PrecioQuery, RecaudacionQuery};
use super::responses::{
    BorrarPagoResponse, ListadoResponse, PrecioResponse, RecaudacionResponse,
};
use super::services;

/// Router for `/api/cuotas`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(listado))
        .route("/precio", get(precio))
        .route("/recaudacion", get(recaudacion))
        .route("/pago", delete(borrar_pago))
}

/// Dues listing, one row per (member, period).
async fn listado(
    State(state): State<AppState>,
    Query(query): Query<ListadoQuery>,
) -> Result<Json<ListadoResponse>> {
    let params = query.validate()?;
    let cuotas = services::listado(&state.db, &state.cache, &params).await?;

    Ok(Json(ListadoResponse {
        success: true,
        anio: params.anio,
        periodo: params.periodo,
        modo: params.modo.as_str(),
        total: cuotas.len(),
        cuotas,
    }))
}

/// Single price resolution for a category or a member's category.
async fn precio(
    State(state): State<AppState>,
    Query(query): Query<PrecioQuery>,
) -> Result<Json<PrecioResponse>> {
    let params = query.validate()?;
    let response = services::precio(&state.db, &state.cache, &params).await?;
    Ok(Json(response))
}

/// Expected-vs-collected revenue aggregates.
async fn recaudacion(
    State(state): State<AppState>,
    Query(query): Query<RecaudacionQuery>,
) -> Result<Json<RecaudacionResponse>> {
    let params = query.validate()?;
    let (esperado, cobrado) = services::recaudacion(&state.db, &state.cache, &params).await?;

    Ok(Json(RecaudacionResponse {
        success: true,
        anio: params.anio,
        meses: params.meses,
        esperado,
        cobrado,
    }))
}

/// Delete a payment row (direct first, annual fallback).
async fn borrar_pago(
    State(state): State<AppState>,
    Query(query): Query<BorrarPagoQuery>,
) -> Result<Json<BorrarPagoResponse>> {
    let params = query.validate()?;
    let response = services::borrar_pago(&state.db, &params).await?;
    Ok(Json(response))
}
