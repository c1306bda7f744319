//! Reprojection de points avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

use anyhow::{Context, Result};
use proj::Proj;

/// Reprojection de points entre deux systèmes de coordonnées via PROJ
pub struct ProjReprojector {
    proj: Proj,
    source_epsg: u32,
    target_epsg: u32,
}

impl ProjReprojector {
    /// Crée un nouveau reprojector entre deux EPSG
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&source, &target, None).context(format!(
            "Failed to create projection from {} to {}",
            source, target
        ))?;

        Ok(Self {
            proj,
            source_epsg,
            target_epsg,
        })
    }

    /// Retourne le SRID source
    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Retourne le SRID cible
    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Reprojector dans le sens inverse
    pub fn inverse(&self) -> Result<Self> {
        Self::new(self.target_epsg, self.source_epsg)
    }

    /// Transforme un point unique
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.proj
            .convert((x, y))
            .context("Coordinate transformation failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utm33_to_wgs84() {
        // Stockholm en UTM 33N (EPSG:32633)
        let reprojector = ProjReprojector::new(32633, 4326).unwrap();
        let (lon, lat) = reprojector.transform_point(674032.0, 6580821.0).unwrap();

        assert!(lon > 17.5 && lon < 18.5, "lon={}", lon);
        assert!(lat > 59.0 && lat < 59.7, "lat={}", lat);
    }

    #[test]
    fn test_invalid_epsg() {
        assert!(ProjReprojector::new(99999, 4326).is_err());
    }
}
