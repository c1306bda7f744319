//! Agrégation des points en hexagones (densité + élévation)
//!
//! Hexagones « pointy-top » en coordonnées axiales, calculés dans le plan Web
//! Mercator. Le rayon est donné en mètres au sol : il est converti en unités
//! Mercator à la latitude moyenne des points (facteur 1 / cos(lat)).

use std::collections::HashMap;
use std::f64::consts::PI;

use geo::{Coord, Point};
use tracing::debug;

use crate::error::{ForskolorError, Result};
use crate::reproject_lite::mercator::{geographic_to_web_mercator, web_mercator_to_geographic};
use crate::reproject_lite::Geographic;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Paramètres du binning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexbinOptions {
    /// Rayon (centre → sommet) en mètres
    pub radius_m: f64,
    /// Multiplicateur appliqué à l'élévation
    pub elevation_scale: f64,
    /// Élévation min/max avant multiplication
    pub elevation_range: (f64, f64),
}

impl Default for HexbinOptions {
    fn default() -> Self {
        Self {
            radius_m: 100.0,
            elevation_scale: 4.0,
            elevation_range: (0.0, 1000.0),
        }
    }
}

/// Une cellule hexagonale non vide
#[derive(Debug, Clone, PartialEq)]
pub struct HexCell {
    /// Coordonnée axiale q
    pub q: i64,
    /// Coordonnée axiale r
    pub r: i64,
    /// Centre (lon, lat)
    pub center: Point<f64>,
    /// Nombre de points dans la cellule
    pub count: usize,
    /// Élévation de la colonne
    pub elevation: f64,
    /// Contour fermé (7 sommets, lon/lat)
    pub boundary: Vec<Coord<f64>>,
}

/// Arrondi d'une coordonnée axiale fractionnaire vers l'hexagone le plus proche
fn axial_round(qf: f64, rf: f64) -> (i64, i64) {
    let sf = -qf - rf;
    let (mut q, mut r, s) = (qf.round(), rf.round(), sf.round());
    let (dq, dr, ds) = ((q - qf).abs(), (r - rf).abs(), (s - sf).abs());

    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    }
    (q as i64, r as i64)
}

fn hex_center(q: i64, r: i64, size: f64) -> (f64, f64) {
    let (q, r) = (q as f64, r as f64);
    (size * SQRT_3 * (q + r / 2.0), size * 1.5 * r)
}

/// Élévation : comptage ramené linéairement sur la plage, puis multiplié
fn elevation(count: usize, min: usize, max: usize, options: &HexbinOptions) -> f64 {
    let (low, high) = options.elevation_range;
    let level = if max == min {
        high
    } else {
        low + (count - min) as f64 / (max - min) as f64 * (high - low)
    };
    level * options.elevation_scale
}

fn to_lon_lat(x: f64, y: f64) -> Result<Coord<f64>> {
    let (lon, lat) = web_mercator_to_geographic(x, y)
        .map_err(|e| ForskolorError::Export(e.to_string()))?
        .to_degrees();
    Ok(Coord { x: lon, y: lat })
}

/// Agrège les points (lon, lat) en hexagones
///
/// Cellules triées par comptage décroissant, puis par (q, r).
pub fn hexbin(points: &[Point<f64>], options: &HexbinOptions) -> Result<Vec<HexCell>> {
    if !(options.radius_m.is_finite() && options.radius_m > 0.0) {
        return Err(ForskolorError::Config(format!(
            "hexbin radius must be positive, got {}",
            options.radius_m
        )));
    }
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let mean_lat = points.iter().map(|p| p.y()).sum::<f64>() / points.len() as f64;
    let size = options.radius_m / mean_lat.to_radians().cos();

    let mut counts: HashMap<(i64, i64), usize> = HashMap::new();
    for (i, p) in points.iter().enumerate() {
        let (x, y) = geographic_to_web_mercator(Geographic::from_degrees(p.x(), p.y()))
            .map_err(|e| ForskolorError::Export(format!("point {}: {}", i, e)))?;
        let qf = (SQRT_3 / 3.0 * x - y / 3.0) / size;
        let rf = (2.0 / 3.0 * y) / size;
        *counts.entry(axial_round(qf, rf)).or_default() += 1;
    }

    let min = counts.values().copied().min().unwrap_or(0);
    let max = counts.values().copied().max().unwrap_or(0);

    let mut cells = counts
        .into_iter()
        .map(|((q, r), count)| -> Result<HexCell> {
            let (cx, cy) = hex_center(q, r, size);
            let boundary = (0..=6)
                .map(|i| {
                    let angle = PI / 180.0 * (60.0 * (i % 6) as f64 - 30.0);
                    to_lon_lat(cx + size * angle.cos(), cy + size * angle.sin())
                })
                .collect::<Result<Vec<_>>>()?;
            let center = to_lon_lat(cx, cy)?;

            Ok(HexCell {
                q,
                r,
                center: Point::from(center),
                count,
                elevation: elevation(count, min, max, options),
                boundary,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    cells.sort_by(|a, b| b.count.cmp(&a.count).then((a.q, a.r).cmp(&(b.q, b.r))));

    debug!(
        points = points.len(),
        cells = cells.len(),
        radius_m = options.radius_m,
        "Hexagon binning"
    );
    Ok(cells)
}
