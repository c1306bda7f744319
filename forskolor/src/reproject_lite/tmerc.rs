//! Projection Transverse Mercator (formules de Gauss-Krüger)
//!
//! Séries de Krüger à l'ordre 4, précision submillimétrique sur la Suède.
//!
//! Zones supportées (GRS80, false northing 0):
//! - SWEREF99 TM (EPSG:3006) - méridien 15°, k0 0.9996, false easting 500 000
//! - SWEREF99 12 00 à 23 15 (EPSG:3007-3018) - k0 1.0, false easting 150 000

use std::f64::consts::FRAC_PI_2;

use super::ellipsoid::GRS80;
use super::Geographic;
use anyhow::{bail, Result};

/// Paramètres d'une projection Transverse Mercator sur GRS80
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    /// Méridien central (radians)
    lon0: f64,
    /// Facteur d'échelle sur le méridien central
    k0: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
    /// Rayon rectifiant multiplié par k0
    k0_a_roof: f64,
}

/// Méridien central (degrés) des zones locales SWEREF99, EPSG:3007 à 3018
const SWEREF99_LOCAL_MERIDIANS: [f64; 12] = [
    12.0, 13.5, 15.0, 16.5, 18.0, 14.25, 15.75, 17.25, 18.75, 20.25, 21.75, 23.25,
];

impl TransverseMercator {
    pub fn new(lon0_deg: f64, k0: f64, x0: f64, y0: f64) -> Self {
        let n = GRS80::N;
        let a_roof = GRS80::A / (1.0 + n) * (1.0 + n.powi(2) / 4.0 + n.powi(4) / 64.0);
        Self {
            lon0: lon0_deg.to_radians(),
            k0,
            x0,
            y0,
            k0_a_roof: k0 * a_roof,
        }
    }

    /// Projection SWEREF99 correspondant à un EPSG (3006-3018)
    pub fn sweref99(epsg: u32) -> Option<Self> {
        match epsg {
            3006 => Some(Self::new(15.0, 0.9996, 500000.0, 0.0)),
            3007..=3018 => {
                let lon0 = SWEREF99_LOCAL_MERIDIANS[(epsg - 3007) as usize];
                Some(Self::new(lon0, 1.0, 150000.0, 0.0))
            }
            _ => None,
        }
    }

    /// Méridien central en degrés
    pub fn central_meridian(&self) -> f64 {
        self.lon0.to_degrees()
    }

    /// Convertit (est, nord) en coordonnées géographiques
    pub fn inverse(&self, east: f64, north: f64) -> Result<Geographic> {
        if !east.is_finite() || !north.is_finite() {
            bail!("non-finite planar coordinate ({}, {})", east, north);
        }

        let n = GRS80::N;
        let e2 = GRS80::E2;

        let delta = [
            n / 2.0 - 2.0 * n.powi(2) / 3.0 + 37.0 * n.powi(3) / 96.0 - n.powi(4) / 360.0,
            n.powi(2) / 48.0 + n.powi(3) / 15.0 - 437.0 * n.powi(4) / 1440.0,
            17.0 * n.powi(3) / 480.0 - 37.0 * n.powi(4) / 840.0,
            4397.0 * n.powi(4) / 161280.0,
        ];
        let a_star = e2 + e2.powi(2) + e2.powi(3) + e2.powi(4);
        let b_star = -(7.0 * e2.powi(2) + 17.0 * e2.powi(3) + 30.0 * e2.powi(4)) / 6.0;
        let c_star = (224.0 * e2.powi(3) + 889.0 * e2.powi(4)) / 120.0;
        let d_star = -(4279.0 * e2.powi(4)) / 1260.0;

        let xi = (north - self.y0) / self.k0_a_roof;
        let eta = (east - self.x0) / self.k0_a_roof;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (i, d) in delta.iter().enumerate() {
            let k = 2.0 * (i + 1) as f64;
            xi_p -= d * (k * xi).sin() * (k * eta).cosh();
            eta_p -= d * (k * xi).cos() * (k * eta).sinh();
        }

        let phi_star = (xi_p.sin() / eta_p.cosh()).asin();
        let delta_lon = (eta_p.sinh() / xi_p.cos()).atan();

        let s2 = phi_star.sin().powi(2);
        let lat = phi_star
            + phi_star.sin()
                * phi_star.cos()
                * (a_star + b_star * s2 + c_star * s2.powi(2) + d_star * s2.powi(3));
        let lon = self.lon0 + delta_lon;

        Ok(Geographic::new(lon, lat))
    }

    /// Convertit des coordonnées géographiques en (est, nord)
    pub fn forward(&self, geo: Geographic) -> Result<(f64, f64)> {
        let delta_lon = geo.lon - self.lon0;
        if !geo.lon.is_finite() || !geo.lat.is_finite() {
            bail!("non-finite geographic coordinate");
        }
        if delta_lon.abs() >= FRAC_PI_2 || geo.lat.abs() > FRAC_PI_2 {
            bail!(
                "({:.6}, {:.6}) is outside the projection domain",
                geo.lon.to_degrees(),
                geo.lat.to_degrees()
            );
        }

        let n = GRS80::N;
        let e2 = GRS80::E2;

        let beta = [
            n / 2.0 - 2.0 * n.powi(2) / 3.0 + 5.0 * n.powi(3) / 16.0 + 41.0 * n.powi(4) / 180.0,
            13.0 * n.powi(2) / 48.0 - 3.0 * n.powi(3) / 5.0 + 557.0 * n.powi(4) / 1440.0,
            61.0 * n.powi(3) / 240.0 - 103.0 * n.powi(4) / 140.0,
            49561.0 * n.powi(4) / 161280.0,
        ];
        let a = e2;
        let b = (5.0 * e2.powi(2) - e2.powi(3)) / 6.0;
        let c = (104.0 * e2.powi(3) - 45.0 * e2.powi(4)) / 120.0;
        let d = (1237.0 * e2.powi(4)) / 1260.0;

        let s2 = geo.lat.sin().powi(2);
        let phi_star = geo.lat
            - geo.lat.sin() * geo.lat.cos() * (a + b * s2 + c * s2.powi(2) + d * s2.powi(3));

        let xi_p = (phi_star.tan() / delta_lon.cos()).atan();
        let eta_p = (phi_star.cos() * delta_lon.sin()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (i, bt) in beta.iter().enumerate() {
            let k = 2.0 * (i + 1) as f64;
            xi += bt * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += bt * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let east = self.k0_a_roof * eta + self.x0;
        let north = self.k0_a_roof * xi + self.y0;
        Ok((east, north))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweref99_tm_stockholm() {
        let tm = TransverseMercator::sweref99(3006).unwrap();
        let (lon, lat) = tm.inverse(674032.0, 6580821.0).unwrap().to_degrees();

        // Stockholm: 18.06°E, 59.33°N
        assert!((lon - 18.06).abs() < 0.01, "lon={}", lon);
        assert!((lat - 59.33).abs() < 0.01, "lat={}", lat);
    }

    #[test]
    fn test_sweref99_18_00_central_meridian() {
        let tm = TransverseMercator::sweref99(3011).unwrap();
        let (lon, lat) = tm.inverse(150000.0, 6580821.0).unwrap().to_degrees();

        assert!((lon - 18.0).abs() < 1e-9, "lon={}", lon);
        assert!((lat - 59.3425).abs() < 0.001, "lat={}", lat);
    }

    #[test]
    fn test_local_zone_meridians() {
        assert!((TransverseMercator::sweref99(3007).unwrap().central_meridian() - 12.0).abs() < 1e-12);
        assert!((TransverseMercator::sweref99(3012).unwrap().central_meridian() - 14.25).abs() < 1e-12);
        assert!((TransverseMercator::sweref99(3018).unwrap().central_meridian() - 23.25).abs() < 1e-12);
        assert!(TransverseMercator::sweref99(3019).is_none());
        assert!(TransverseMercator::sweref99(2154).is_none());
    }

    #[test]
    fn test_roundtrip_millimetre() {
        for epsg in [3006, 3011] {
            let tm = TransverseMercator::sweref99(epsg).unwrap();
            let geo = Geographic::from_degrees(18.0686, 59.3293);
            let (east, north) = tm.forward(geo).unwrap();
            let back = tm.inverse(east, north).unwrap();
            let (east2, north2) = tm.forward(back).unwrap();

            assert!((east - east2).abs() < 0.001, "epsg={} east={} {}", epsg, east, east2);
            assert!((north - north2).abs() < 0.001, "epsg={} north={} {}", epsg, north, north2);
        }
    }

    #[test]
    fn test_non_finite_input() {
        let tm = TransverseMercator::sweref99(3011).unwrap();
        assert!(tm.inverse(f64::NAN, 6580821.0).is_err());
        assert!(tm.inverse(150000.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_outside_domain() {
        let tm = TransverseMercator::sweref99(3011).unwrap();
        assert!(tm.forward(Geographic::from_degrees(120.0, 59.0)).is_err());
    }
}
