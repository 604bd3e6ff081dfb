//! Database queries for the dues engine.
//!
//! All queries go through sqlx's query_as with FromRow models. Payment
//! lookups are ordered by id so the projector's first-row-wins rule is
//! deterministic.

use sqlx::{PgConnection, PgPool};

use crate::error::Result;

use super::models::{Categoria, CategoriaHistorial, Pago, PagoCobranza, Periodo, Socio};
use super::prices::PriceKind;

/// The 7-row period catalog, in calendar order.
pub async fn get_periodos(pool: &PgPool) -> Result<Vec<Periodo>> {
    let periodos = sqlx::query_as::<_, Periodo>(
        r#"
        SELECT id, nombre, meses
        FROM periodos
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(periodos)
}

/// A dues category by id.
pub async fn get_categoria(pool: &PgPool, id: i32) -> Result<Option<Categoria>> {
    let categoria = sqlx::query_as::<_, Categoria>(
        r#"
        SELECT id, nombre, monto_mensual, monto_anual
        FROM categorias
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(categoria)
}

/// Price change log for one (categoria, tipo) series, ascending by
/// effective date.
pub async fn get_categoria_historial(
    pool: &PgPool,
    categoria_id: i32,
    kind: PriceKind,
) -> Result<Vec<CategoriaHistorial>> {
    let historial = sqlx::query_as::<_, CategoriaHistorial>(
        r#"
        SELECT id, categoria_id, tipo, precio_viejo, precio_nuevo, fecha_cambio
        FROM categoria_historial
        WHERE categoria_id = $1
          AND tipo = $2
        ORDER BY fecha_cambio, id
        "#,
    )
    .bind(categoria_id)
    .bind(kind.as_str())
    .fetch_all(pool)
    .await?;

    Ok(historial)
}

/// A member by id, with the collector name joined in.
pub async fn get_socio(pool: &PgPool, id: i32) -> Result<Option<Socio>> {
    let socio = sqlx::query_as::<_, Socio>(
        r#"
        SELECT
            s.id, s.nombre, s.apellido, s.calle, s.numero, s.localidad,
            s.fecha_alta, s.activo, s.categoria_id, s.cobrador_id,
            c.nombre AS cobrador_nombre
        FROM socios s
        LEFT JOIN cobradores c ON c.id = s.cobrador_id
        WHERE s.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(socio)
}

/// Members with optional collector and active-flag filters, ordered for the
/// listing.
pub async fn get_socios(
    pool: &PgPool,
    cobrador_id: Option<i32>,
    activo: Option<bool>,
) -> Result<Vec<Socio>> {
    let socios = sqlx::query_as::<_, Socio>(
        r#"
        SELECT
            s.id, s.nombre, s.apellido, s.calle, s.numero, s.localidad,
            s.fecha_alta, s.activo, s.categoria_id, s.cobrador_id,
            c.nombre AS cobrador_nombre
        FROM socios s
        LEFT JOIN cobradores c ON c.id = s.cobrador_id
        WHERE ($1::int IS NULL OR s.cobrador_id = $1)
          AND ($2::bool IS NULL OR s.activo = $2)
        ORDER BY s.apellido, s.nombre, s.id
        "#,
    )
    .bind(cobrador_id)
    .bind(activo)
    .fetch_all(pool)
    .await?;

    Ok(socios)
}

/// Every payment row whose payment date falls in `anio`, ordered so the
/// projector can apply first-row-wins.
pub async fn get_pagos_por_anio(pool: &PgPool, anio: i32) -> Result<Vec<Pago>> {
    let pagos = sqlx::query_as::<_, Pago>(
        r#"
        SELECT id, socio_id, periodo_id, estado, fecha_pago
        FROM pagos
        WHERE EXTRACT(YEAR FROM fecha_pago)::int = $1
        ORDER BY socio_id, id
        "#,
    )
    .bind(anio)
    .fetch_all(pool)
    .await?;

    Ok(pagos)
}

/// Payment rows for `anio` with the member's collector and category joined
/// in, for the collected-revenue aggregation.
pub async fn get_pagos_cobranza(pool: &PgPool, anio: i32) -> Result<Vec<PagoCobranza>> {
    let pagos = sqlx::query_as::<_, PagoCobranza>(
        r#"
        SELECT
            p.periodo_id, p.estado, p.fecha_pago,
            c.nombre AS cobrador_nombre,
            s.categoria_id
        FROM pagos p
        JOIN socios s ON s.id = p.socio_id
        LEFT JOIN cobradores c ON c.id = s.cobrador_id
        WHERE EXTRACT(YEAR FROM p.fecha_pago)::int = $1
        ORDER BY p.id
        "#,
    )
    .bind(anio)
    .fetch_all(pool)
    .await?;

    Ok(pagos)
}

/// Lock the candidate payment row for (socio, periodo, anio) and return its
/// id. `FOR UPDATE` serializes concurrent deletes of the same row; the
/// lowest id is chosen to mirror the projector's first-row-wins rule.
pub async fn lock_pago(
    conn: &mut PgConnection,
    socio_id: i32,
    periodo_id: i32,
    anio: i32,
) -> Result<Option<i32>> {
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT id
        FROM pagos
        WHERE socio_id = $1
          AND periodo_id = $2
          AND EXTRACT(YEAR FROM fecha_pago)::int = $3
        ORDER BY id
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(socio_id)
    .bind(periodo_id)
    .bind(anio)
    .fetch_optional(conn)
    .await?;

    Ok(id)
}

/// Delete a payment row previously locked by [`lock_pago`].
pub async fn delete_pago(conn: &mut PgConnection, id: i32) -> Result<()> {
    sqlx::query("DELETE FROM pagos WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(())
}
