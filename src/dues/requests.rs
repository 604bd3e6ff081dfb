//! Query-string DTOs for the dues endpoints.
//!
//! Numeric parameters arrive as text from the legacy front end and are
//! validated here with descriptive messages instead of axum's default
//! rejection, so failures keep the JSON envelope.

use chrono::Datelike;
use serde::Deserialize;

use crate::error::{AppError, Result};

use super::constants::MIN_YEAR;

/// Listing mode: which payment state a (member, period) row must be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modo {
    Deudor,
    Pagado,
    Condonado,
}

impl Modo {
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("deudor") => Ok(Modo::Deudor),
            Some("pagado") => Ok(Modo::Pagado),
            Some("condonado") => Ok(Modo::Condonado),
            Some(other) => Err(AppError::Validation(format!(
                "invalid 'modo' parameter: '{}' (expected deudor, pagado or condonado)",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modo::Deudor => "deudor",
            Modo::Pagado => "pagado",
            Modo::Condonado => "condonado",
        }
    }
}

/// `GET /api/cuotas` query string.
#[derive(Debug, Deserialize)]
pub struct ListadoQuery {
    pub anio: Option<String>,
    pub periodo: Option<String>,
    pub modo: Option<String>,
    pub cobrador: Option<String>,
    pub estado_socio: Option<String>,
}

/// Validated `GET /api/cuotas` parameters.
#[derive(Debug, Clone)]
pub struct ListadoParams {
    pub anio: i32,
    pub periodo: i32,
    pub modo: Modo,
    pub cobrador: Option<i32>,
    pub activo: Option<bool>,
}

impl ListadoQuery {
    pub fn validate(&self) -> Result<ListadoParams> {
        Ok(ListadoParams {
            anio: parse_anio(self.anio.as_deref())?,
            periodo: parse_periodo_filtro(self.periodo.as_deref())?,
            modo: Modo::parse(self.modo.as_deref())?,
            cobrador: parse_opt_id("cobrador", self.cobrador.as_deref())?,
            activo: parse_estado_socio(self.estado_socio.as_deref())?,
        })
    }
}

/// `GET /api/cuotas/precio` query string.
#[derive(Debug, Deserialize)]
pub struct PrecioQuery {
    pub categoria: Option<String>,
    pub socio: Option<String>,
    pub anio: Option<String>,
    pub periodo: Option<String>,
}

/// Validated `GET /api/cuotas/precio` parameters.
#[derive(Debug, Clone)]
pub struct PrecioParams {
    pub categoria: Option<i32>,
    pub socio: Option<i32>,
    pub anio: i32,
    pub periodo: i32,
}

impl PrecioQuery {
    pub fn validate(&self) -> Result<PrecioParams> {
        Ok(PrecioParams {
            categoria: parse_opt_id("categoria", self.categoria.as_deref())?,
            socio: parse_opt_id("socio", self.socio.as_deref())?,
            anio: parse_anio(self.anio.as_deref())?,
            periodo: parse_periodo(self.periodo.as_deref())?,
        })
    }
}

/// `GET /api/cuotas/recaudacion` query string.
#[derive(Debug, Deserialize)]
pub struct RecaudacionQuery {
    pub anio: Option<String>,
    pub meses: Option<String>,
}

/// Validated `GET /api/cuotas/recaudacion` parameters.
#[derive(Debug, Clone)]
pub struct RecaudacionParams {
    pub anio: i32,
    pub meses: Vec<u32>,
}

impl RecaudacionQuery {
    pub fn validate(&self) -> Result<RecaudacionParams> {
        Ok(RecaudacionParams {
            anio: parse_anio(self.anio.as_deref())?,
            meses: parse_meses(self.meses.as_deref())?,
        })
    }
}

/// `DELETE /api/cuotas/pago` query string.
#[derive(Debug, Deserialize)]
pub struct BorrarPagoQuery {
    pub socio: Option<String>,
    pub periodo: Option<String>,
    pub anio: Option<String>,
}

/// Validated `DELETE /api/cuotas/pago` parameters.
#[derive(Debug, Clone)]
pub struct BorrarPagoParams {
    pub socio: i32,
    pub periodo: i32,
    pub anio: i32,
}

impl BorrarPagoQuery {
    pub fn validate(&self) -> Result<BorrarPagoParams> {
        Ok(BorrarPagoParams {
            socio: require_id("socio", self.socio.as_deref())?,
            periodo: parse_periodo(self.periodo.as_deref())?,
            anio: parse_anio(self.anio.as_deref())?,
        })
    }
}

// ==================== parsing helpers ====================

fn parse_id(name: &str, value: &str) -> Result<i32> {
    value.trim().parse().map_err(|_| {
        AppError::Validation(format!("invalid '{}' parameter: '{}'", name, value))
    })
}

fn parse_opt_id(name: &str, value: Option<&str>) -> Result<Option<i32>> {
    match value.map(str::trim) {
        None | Some("") | Some("0") => Ok(None),
        Some(v) => parse_id(name, v).map(Some),
    }
}

fn require_id(name: &str, value: Option<&str>) -> Result<i32> {
    let v = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("missing required parameter '{}'", name)))?;
    parse_id(name, v)
}

/// Year parameter, defaulting to the current year.
fn parse_anio(value: Option<&str>) -> Result<i32> {
    let anio = match value.map(str::trim) {
        None | Some("") => chrono::Utc::now().date_naive().year(),
        Some(v) => parse_id("anio", v)?,
    };
    if anio < MIN_YEAR {
        return Err(AppError::Validation(format!(
            "'anio' must be {} or later, got {}",
            MIN_YEAR, anio
        )));
    }
    Ok(anio)
}

/// Period filter for the listing: 0 (all, the default) through 7.
fn parse_periodo_filtro(value: Option<&str>) -> Result<i32> {
    let periodo = match value.map(str::trim) {
        None | Some("") => 0,
        Some(v) => parse_id("periodo", v)?,
    };
    if !(0..=7).contains(&periodo) {
        return Err(AppError::Validation(format!(
            "'periodo' must be between 0 and 7, got {}",
            periodo
        )));
    }
    Ok(periodo)
}

/// Required period id, 1 through 7.
fn parse_periodo(value: Option<&str>) -> Result<i32> {
    let periodo = require_id("periodo", value)?;
    if !(1..=7).contains(&periodo) {
        return Err(AppError::Validation(format!(
            "'periodo' must be between 1 and 7, got {}",
            periodo
        )));
    }
    Ok(periodo)
}

fn parse_estado_socio(value: Option<&str>) -> Result<Option<bool>> {
    match value.map(str::trim) {
        None | Some("") | Some("todos") => Ok(None),
        Some("activo") => Ok(Some(true)),
        Some("baja") => Ok(Some(false)),
        Some(other) => Err(AppError::Validation(format!(
            "invalid 'estado_socio' parameter: '{}' (expected activo, baja or todos)",
            other
        ))),
    }
}

/// Comma-separated target months, defaulting to the whole year.
fn parse_meses(value: Option<&str>) -> Result<Vec<u32>> {
    let Some(text) = value.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok((1..=12).collect());
    };
    let mut meses = Vec::new();
    for piece in text.split(',') {
        let mes: u32 = piece.trim().parse().map_err(|_| {
            AppError::Validation(format!("invalid month in 'meses': '{}'", piece.trim()))
        })?;
        if !(1..=12).contains(&mes) {
            return Err(AppError::Validation(format!(
                "month in 'meses' out of range: {}",
                mes
            )));
        }
        meses.push(mes);
    }
    Ok(meses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modo_parse() {
        assert_eq!(Modo::parse(None).unwrap(), Modo::Deudor);
        assert_eq!(Modo::parse(Some("")).unwrap(), Modo::Deudor);
        assert_eq!(Modo::parse(Some("pagado")).unwrap(), Modo::Pagado);
        assert_eq!(Modo::parse(Some("condonado")).unwrap(), Modo::Condonado);
        assert!(Modo::parse(Some("moroso")).is_err());
    }

    #[test]
    fn test_parse_anio() {
        assert_eq!(parse_anio(Some("2024")).unwrap(), 2024);
        assert!(parse_anio(Some("123x")).is_err());
        assert!(parse_anio(Some("1900")).is_err());
        assert!(parse_anio(None).unwrap() >= MIN_YEAR);
    }

    #[test]
    fn test_parse_periodo_filtro() {
        assert_eq!(parse_periodo_filtro(None).unwrap(), 0);
        assert_eq!(parse_periodo_filtro(Some("7")).unwrap(), 7);
        assert!(parse_periodo_filtro(Some("8")).is_err());
        assert!(parse_periodo_filtro(Some("-1")).is_err());
    }

    #[test]
    fn test_parse_periodo_required() {
        assert_eq!(parse_periodo(Some("3")).unwrap(), 3);
        assert!(parse_periodo(Some("0")).is_err());
        assert!(parse_periodo(None).is_err());
    }

    #[test]
    fn test_parse_opt_id_treats_zero_as_no_filter() {
        assert_eq!(parse_opt_id("cobrador", Some("0")).unwrap(), None);
        assert_eq!(parse_opt_id("cobrador", Some("5")).unwrap(), Some(5));
        assert_eq!(parse_opt_id("cobrador", None).unwrap(), None);
        assert!(parse_opt_id("cobrador", Some("abc")).is_err());
    }

    #[test]
    fn test_parse_estado_socio() {
        assert_eq!(parse_estado_socio(Some("activo")).unwrap(), Some(true));
        assert_eq!(parse_estado_socio(Some("baja")).unwrap(), Some(false));
        assert_eq!(parse_estado_socio(Some("todos")).unwrap(), None);
        assert_eq!(parse_estado_socio(None).unwrap(), None);
        assert!(parse_estado_socio(Some("???")).is_err());
    }

    #[test]
    fn test_parse_meses() {
        assert_eq!(parse_meses(None).unwrap(), (1..=12).collect::<Vec<u32>>());
        assert_eq!(parse_meses(Some("5, 6,7")).unwrap(), vec![5, 6, 7]);
        assert!(parse_meses(Some("5,x")).is_err());
        assert!(parse_meses(Some("0")).is_err());
        assert!(parse_meses(Some("13")).is_err());
    }
}
