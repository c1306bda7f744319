//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Supporte les projections suédoises :
//! - SWEREF99 TM (EPSG:3006)
//! - SWEREF99 12 00 à 23 15 (EPSG:3007-3018), dont 18 00 (EPSG:3011) pour Stockholm
//!
//! Ainsi que :
//! - WGS84 (EPSG:4326)
//! - Web Mercator (EPSG:3857)
//!
//! Toute paire de ces systèmes passe par les coordonnées géographiques, la
//! transformation inverse est donc toujours disponible.

mod ellipsoid;
pub mod mercator;
#[cfg(feature = "reproject")]
mod proj_backend;
mod smart;
mod tmerc;

pub use ellipsoid::{GRS80, WGS84};
pub use smart::SmartReprojector;
pub use tmerc::TransverseMercator;

use anyhow::{bail, Result};
use geo::Coord;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Système de coordonnées supporté par la reprojection légère
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crs {
    /// Longitude/latitude en degrés (EPSG:4326)
    Wgs84,
    /// Pseudo-Mercator (EPSG:3857)
    WebMercator,
    /// SWEREF99 TM ou zone locale (EPSG:3006-3018)
    Sweref99 { epsg: u32, tm: TransverseMercator },
}

impl Crs {
    /// Résout un code EPSG, `None` s'il n'est pas supporté
    pub fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            4326 => Some(Self::Wgs84),
            3857 => Some(Self::WebMercator),
            _ => TransverseMercator::sweref99(epsg).map(|tm| Self::Sweref99 { epsg, tm }),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
            Self::Sweref99 { epsg, .. } => *epsg,
        }
    }

    fn unproject(&self, x: f64, y: f64) -> Result<Geographic> {
        match self {
            Self::Wgs84 => {
                if !x.is_finite() || !y.is_finite() {
                    bail!("non-finite coordinate ({}, {})", x, y);
                }
                Ok(Geographic::from_degrees(x, y))
            }
            Self::WebMercator => mercator::web_mercator_to_geographic(x, y),
            Self::Sweref99 { tm, .. } => tm.inverse(x, y),
        }
    }

    fn project(&self, geo: Geographic) -> Result<(f64, f64)> {
        match self {
            Self::Wgs84 => Ok(geo.to_degrees()),
            Self::WebMercator => mercator::geographic_to_web_mercator(geo),
            Self::Sweref99 { tm, .. } => tm.forward(geo),
        }
    }
}

/// Reprojection légère pour les grilles suédoises
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    source: Crs,
    target: Crs,
}

impl ReprojectorLite {
    /// Crée un nouveau reprojector
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let Some(source) = Crs::from_epsg(source_epsg) else {
            bail!(
                "EPSG:{} non supporté. Supportés: 3006-3018, 3857, 4326",
                source_epsg
            );
        };
        let Some(target) = Crs::from_epsg(target_epsg) else {
            bail!(
                "EPSG:{} non supporté. Supportés: 3006-3018, 3857, 4326",
                target_epsg
            );
        };

        Ok(Self { source, target })
    }

    /// Vérifie si la reprojection est supportée
    pub fn is_supported(source: u32, target: u32) -> bool {
        Crs::from_epsg(source).is_some() && Crs::from_epsg(target).is_some()
    }

    /// Reprojector de la cible vers la source
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }

    pub fn source_epsg(&self) -> u32 {
        self.source.epsg()
    }

    pub fn target_epsg(&self) -> u32 {
        self.target.epsg()
    }

    /// Transforme un point (x, y) de la source vers la cible
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        // Étape 1: Source → Géographique
        let geo = self.source.unproject(x, y)?;

        // Étape 2: Géographique → Cible
        self.target.project(geo)
    }

    /// Transforme une coordonnée
    pub fn transform_coord(&self, coord: Coord) -> Result<Coord> {
        let (x, y) = self.transform_point(coord.x, coord.y)?;
        Ok(Coord { x, y })
    }
}
