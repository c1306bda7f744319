//! Reprojection d'une table : colonnes planes → `lon`/`lat` WGS84
//!
//! Politique d'erreur : échec immédiat. Une coordonnée absente, non numérique
//! ou hors domaine interrompt toute l'opération avec l'index et l'id de la ligne.

use geo::Point;
use jsonapi_flat::{Table, ID_COLUMN};
use serde_json::Value;
use tracing::debug;

use crate::error::{ForskolorError, Result};
use crate::reproject_lite::SmartReprojector;

pub const LON_COLUMN: &str = "lon";
pub const LAT_COLUMN: &str = "lat";

/// Table reprojetée : colonnes planes retirées, `lon` et `lat` ajoutées
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable {
    table: Table,
    points: Vec<Point<f64>>,
}

impl GeoTable {
    /// Table avec les colonnes `lon`/`lat`
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Points (x = lon, y = lat) dans l'ordre des lignes
    pub fn points(&self) -> &[Point<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Lit une coordonnée numérique
fn coordinate(value: Option<&Value>, column: &str) -> std::result::Result<f64, String> {
    match value {
        None | Some(Value::Null) => Err(format!("missing {} coordinate", column)),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{} coordinate {} is not a finite number", column, n)),
        Some(other) => Err(format!("{} coordinate is not a number: {}", column, other)),
    }
}

/// Identifiant lisible d'une ligne pour les messages d'erreur
fn row_id(table: &Table, row: usize) -> String {
    match table.get(row, ID_COLUMN) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Reprojette les colonnes `east`/`north` d'une table vers WGS84
pub fn reproject_table(
    table: &Table,
    east: &str,
    north: &str,
    reprojector: &SmartReprojector,
) -> Result<GeoTable> {
    // Une collection vide n'a aucune colonne de coordonnées
    let planar: Vec<&str> = [east, north]
        .into_iter()
        .filter(|c| table.has_column(c))
        .collect();
    if planar.len() < 2 && !table.is_empty() {
        let missing = if table.has_column(east) { north } else { east };
        return Err(ForskolorError::Table(
            jsonapi_flat::JsonApiError::UnknownColumn(missing.to_string()),
        ));
    }

    let mut points = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let fail = |reason: String| ForskolorError::reprojection(row, row_id(table, row), reason);

        let x = coordinate(table.get(row, east), east).map_err(fail)?;
        let y = coordinate(table.get(row, north), north).map_err(fail)?;

        let (lon, lat) = reprojector
            .transform_point(x, y)
            .map_err(|e| fail(e.to_string()))?;

        if !lon.is_finite() || !lat.is_finite() || lon.abs() > 180.0 || lat.abs() > 90.0 {
            return Err(fail(format!(
                "({}, {}) maps outside WGS84 bounds: ({}, {})",
                x, y, lon, lat
            )));
        }
        points.push(Point::new(lon, lat));
    }

    let lons = points.iter().map(|p| Value::from(p.x())).collect();
    let lats = points.iter().map(|p| Value::from(p.y())).collect();

    let table = table
        .drop_columns(&planar)?
        .with_column(LON_COLUMN, lons)?
        .with_column(LAT_COLUMN, lats)?;

    debug!(
        rows = points.len(),
        reprojector = reprojector.description(),
        "Reprojected table"
    );

    Ok(GeoTable { table, points })
}
