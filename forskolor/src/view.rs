//! État initial de la carte (centre, zoom, inclinaison)

use serde::Serialize;

use crate::reproject::GeoTable;

/// Zoom par défaut de la carte des förskolor
pub const DEFAULT_ZOOM: f64 = 11.0;

/// Inclinaison par défaut (degrés), pour voir l'élévation des hexagones
pub const DEFAULT_PITCH: f64 = 50.0;

/// Vue initiale passée au rendu
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

impl ViewState {
    /// Vue centrée sur la moyenne des points, `None` si la table est vide
    pub fn centered_on(geo: &GeoTable, zoom: f64) -> Option<Self> {
        let (latitude, longitude) = map_center(geo)?;
        Some(Self {
            latitude,
            longitude,
            zoom,
            pitch: DEFAULT_PITCH,
        })
    }
}

/// Moyenne arithmétique `(lat, lon)` des points
pub fn map_center(geo: &GeoTable) -> Option<(f64, f64)> {
    if geo.is_empty() {
        return None;
    }
    let n = geo.len() as f64;
    let (sum_lon, sum_lat) = geo
        .points()
        .iter()
        .fold((0.0, 0.0), |(lon, lat), p| (lon + p.x(), lat + p.y()));
    Some((sum_lat / n, sum_lon / n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproject::reproject_table;
    use crate::reproject_lite::SmartReprojector;
    use jsonapi_flat::Table;
    use serde_json::json;

    fn geo(points: &[(f64, f64)]) -> GeoTable {
        let mut table = Table::new(vec!["id".into(), "x".into(), "y".into()]).unwrap();
        for (i, (x, y)) in points.iter().enumerate() {
            table.push_row(vec![json!(i.to_string()), json!(x), json!(y)]).unwrap();
        }
        let identity = SmartReprojector::new(4326, 4326).unwrap();
        reproject_table(&table, "x", "y", &identity).unwrap()
    }

    #[test]
    fn test_map_center_is_mean() {
        let (lat, lon) = map_center(&geo(&[(18.0, 59.0), (18.2, 59.4)])).unwrap();
        assert!((lon - 18.1).abs() < 1e-12);
        assert!((lat - 59.2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_has_no_center() {
        assert!(map_center(&geo(&[])).is_none());
        assert!(ViewState::centered_on(&geo(&[]), DEFAULT_ZOOM).is_none());
    }

    #[test]
    fn test_view_state() {
        let view = ViewState::centered_on(&geo(&[(18.06, 59.33)]), DEFAULT_ZOOM).unwrap();
        assert_eq!(view.zoom, 11.0);
        assert_eq!(view.pitch, 50.0);
        assert_eq!(view.longitude, 18.06);

        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["latitude"], json!(59.33));
    }
}
