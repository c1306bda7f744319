//! Projection Web Mercator (EPSG:3857)
//!
//! Aussi connu sous le nom de Pseudo-Mercator ou Spherical Mercator.
//! Sert de plan métrique pour le binning hexagonal.

use super::ellipsoid::WGS84;
use super::Geographic;
use anyhow::{bail, Result};

/// Latitude maximale représentable (degrés)
pub const MAX_LATITUDE: f64 = 85.06;

/// Convertit coordonnées géographiques vers Web Mercator (EPSG:3857)
pub fn geographic_to_web_mercator(geo: Geographic) -> Result<(f64, f64)> {
    if !geo.lon.is_finite() || !geo.lat.is_finite() {
        bail!("non-finite geographic coordinate");
    }

    // Web Mercator utilise un modèle sphérique avec le rayon équatorial
    let r = WGS84::A;

    // Limiter la latitude pour éviter l'infini
    let lat = geo
        .lat
        .clamp(-MAX_LATITUDE.to_radians(), MAX_LATITUDE.to_radians());

    let x = r * geo.lon;
    let y = r * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();

    Ok((x, y))
}

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Result<Geographic> {
    if !x.is_finite() || !y.is_finite() {
        bail!("non-finite Web Mercator coordinate ({}, {})", x, y);
    }

    let r = WGS84::A;
    let lon = x / r;
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Ok(Geographic::new(lon, lat))
}
