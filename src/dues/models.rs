//! Database models for the dues engine.
//!
//! These models use sqlx's FromRow derive for direct database
//! deserialization from the legacy Spanish-named schema.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::prices::PriceKind;

/// Member from `socios`, with the collector name joined in.
#[derive(Debug, Clone, FromRow)]
pub struct Socio {
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
    pub calle: Option<String>,
    pub numero: Option<String>,
    pub localidad: Option<String>,
    /// Legacy free-text enrollment date; parsed fail-open downstream.
    pub fecha_alta: Option<String>,
    pub activo: bool,
    pub categoria_id: Option<i32>,
    pub cobrador_id: Option<i32>,
    pub cobrador_nombre: Option<String>,
}

impl Socio {
    /// Display name in the listing format the front end expects.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.apellido, self.nombre)
    }

    /// Postal address assembled from the optional street fields.
    pub fn domicilio(&self) -> String {
        let street: Vec<&str> = [self.calle.as_deref(), self.numero.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        let mut out = street.join(" ");
        if let Some(localidad) = self.localidad.as_deref().filter(|l| !l.is_empty()) {
            if out.is_empty() {
                out = localidad.to_string();
            } else {
                out = format!("{}, {}", out, localidad);
            }
        }
        out
    }
}

/// One of the 7 fixed billing periods from `periodos`.
#[derive(Debug, Clone, FromRow)]
pub struct Periodo {
    pub id: i32,
    pub nombre: String,
    /// Free-text month description, e.g. "Enero - Febrero".
    pub meses: Option<String>,
}

/// Dues category from `categorias`; carries the *current* prices, which are
/// the fallback when no history entry applies.
#[derive(Debug, Clone, FromRow)]
pub struct Categoria {
    pub id: i32,
    pub nombre: String,
    pub monto_mensual: Decimal,
    pub monto_anual: Decimal,
}

impl Categoria {
    /// Current price for one of the two series.
    pub fn precio_actual(&self, kind: PriceKind) -> Decimal {
        match kind {
            PriceKind::Mensual => self.monto_mensual,
            PriceKind::Anual => self.monto_anual,
        }
    }
}

/// Price change from `categoria_historial`. Entries for a (categoria, tipo)
/// pair never share a `fecha_cambio`.
#[derive(Debug, Clone, FromRow)]
pub struct CategoriaHistorial {
    pub id: i32,
    pub categoria_id: i32,
    pub tipo: String,
    pub precio_viejo: Decimal,
    pub precio_nuevo: Decimal,
    pub fecha_cambio: NaiveDate,
}

/// Payment or condonation from `pagos`. The year of `fecha_pago` selects
/// which annual ledger the row belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct Pago {
    pub id: i32,
    pub socio_id: i32,
    pub periodo_id: i32,
    pub estado: Option<String>,
    pub fecha_pago: NaiveDate,
}

/// Paid-row projection used by the collected-revenue aggregation, with the
/// member's collector and category joined in.
#[derive(Debug, Clone, FromRow)]
pub struct PagoCobranza {
    pub periodo_id: i32,
    pub estado: Option<String>,
    pub fecha_pago: NaiveDate,
    pub cobrador_nombre: Option<String>,
    pub categoria_id: Option<i32>,
}
