//! Choix du backend de reprojection pour un couple d'EPSG
//!
//! Ordre : identité, transformation pur Rust, puis PROJ (feature `reproject`).

use anyhow::Result;

use super::ReprojectorLite;

/// Reprojection point à point, quel que soit le backend
#[cfg_attr(not(feature = "reproject"), derive(Debug))]
pub enum SmartReprojector {
    Lite(ReprojectorLite),
    #[cfg(feature = "reproject")]
    Proj(super::proj_backend::ProjReprojector),
    /// Source et cible identiques
    Identity { epsg: u32 },
}

impl SmartReprojector {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        if source_epsg == target_epsg {
            return Ok(Self::Identity { epsg: source_epsg });
        }
        if ReprojectorLite::is_supported(source_epsg, target_epsg) {
            return Ok(Self::Lite(ReprojectorLite::new(source_epsg, target_epsg)?));
        }
        Self::fallback(source_epsg, target_epsg)
    }

    #[cfg(feature = "reproject")]
    fn fallback(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        let proj = super::proj_backend::ProjReprojector::new(source_epsg, target_epsg)?;
        Ok(Self::Proj(proj))
    }

    #[cfg(not(feature = "reproject"))]
    fn fallback(source_epsg: u32, target_epsg: u32) -> Result<Self> {
        anyhow::bail!(
            "EPSG:{} -> EPSG:{} is not supported without PROJ.\n\
             Built-in: 3006-3018 (SWEREF99), 3857, 4326. \
             Rebuild with `--features reproject` for other systems.",
            source_epsg,
            target_epsg
        )
    }

    pub fn source_epsg(&self) -> u32 {
        match self {
            Self::Identity { epsg } => *epsg,
            Self::Lite(lite) => lite.source_epsg(),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.source_epsg(),
        }
    }

    pub fn target_epsg(&self) -> u32 {
        match self {
            Self::Identity { epsg } => *epsg,
            Self::Lite(lite) => lite.target_epsg(),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.target_epsg(),
        }
    }

    /// `(x, y)` source → `(x, y)` cible (lon/lat en degrés pour 4326)
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            Self::Identity { .. } => Ok((x, y)),
            Self::Lite(lite) => lite.transform_point(x, y),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_point(x, y),
        }
    }

    /// Même backend, sens cible → source
    pub fn inverse(&self) -> Result<Self> {
        Ok(match self {
            Self::Identity { epsg } => Self::Identity { epsg: *epsg },
            Self::Lite(lite) => Self::Lite(lite.inverse()),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => Self::Proj(proj.inverse()?),
        })
    }

    /// Nom du backend, pour les logs et le rapport
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity { .. } => "identity",
            Self::Lite(_) => "builtin transverse mercator",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj",
        }
    }
}
