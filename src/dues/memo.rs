//! Per-request memoization of category and price-history loads.
//!
//! One `RequestMemo` lives for the duration of a single request and is
//! passed through the call graph; members sharing a category hit the store
//! once. Nothing here outlives the request or is shared across requests.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::Result;

use super::models::{Categoria, CategoriaHistorial};
use super::prices::{resolve_price, PreciosVigentes, PriceKind};
use super::queries;

#[derive(Default)]
pub struct RequestMemo {
    categorias: HashMap<i32, Option<Categoria>>,
    historiales: HashMap<(i32, PriceKind), Vec<CategoriaHistorial>>,
}

impl RequestMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category by id, loading through the memo. A missing category is also
    /// memoized so repeated lookups stay cheap.
    pub async fn categoria(&mut self, pool: &PgPool, id: i32) -> Result<Option<Categoria>> {
        if !self.categorias.contains_key(&id) {
            let categoria = queries::get_categoria(pool, id).await?;
            self.categorias.insert(id, categoria);
        }
        Ok(self.categorias.get(&id).cloned().flatten())
    }

    /// One series' change log, sorted ascending, loading through the memo.
    async fn historial(
        &mut self,
        pool: &PgPool,
        categoria_id: i32,
        kind: PriceKind,
    ) -> Result<&[CategoriaHistorial]> {
        let key = (categoria_id, kind);
        if !self.historiales.contains_key(&key) {
            let rows = queries::get_categoria_historial(pool, categoria_id, kind).await?;
            self.historiales.insert(key, rows);
        }
        Ok(self
            .historiales
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    /// Price of one series in force at `reference`.
    pub async fn precio_vigente(
        &mut self,
        pool: &PgPool,
        categoria: &Categoria,
        kind: PriceKind,
        reference: NaiveDate,
    ) -> Result<rust_decimal::Decimal> {
        let historial = self.historial(pool, categoria.id, kind).await?;
        Ok(resolve_price(historial, reference, categoria.precio_actual(kind)))
    }

    /// Both resolved prices for a category at `reference`, or `None` when
    /// the category does not exist.
    pub async fn precios_categoria(
        &mut self,
        pool: &PgPool,
        categoria_id: i32,
        reference: NaiveDate,
    ) -> Result<Option<PreciosVigentes>> {
        let Some(categoria) = self.categoria(pool, categoria_id).await? else {
            return Ok(None);
        };
        let mensual = self
            .precio_vigente(pool, &categoria, PriceKind::Mensual, reference)
            .await?;
        let anual = self
            .precio_vigente(pool, &categoria, PriceKind::Anual, reference)
            .await?;
        Ok(Some(PreciosVigentes {
            categoria_id,
            categoria_nombre: categoria.nombre,
            mensual,
            anual,
        }))
    }
}
