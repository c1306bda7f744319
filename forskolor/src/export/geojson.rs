//! Export GeoJSON des points et des hexagones

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};
use jsonapi_flat::ID_COLUMN;

use crate::error::{ForskolorError, Result};
use crate::hexbin::HexCell;
use crate::reproject::GeoTable;

/// Un Point par ligne, toutes les colonnes en propriétés
pub fn points_to_geojson(geo: &GeoTable) -> FeatureCollection {
    let table = geo.table();
    let features = geo
        .points()
        .iter()
        .enumerate()
        .map(|(row, point)| {
            let properties: JsonObject = table.record(row).unwrap_or_default();
            let id = match table.get(row, ID_COLUMN) {
                Some(serde_json::Value::String(s)) => Some(Id::String(s.clone())),
                _ => None,
            };
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![point.x(), point.y()]))),
                id,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Un Polygon par hexagone, avec `count` et `elevation`
pub fn hexbin_to_geojson(cells: &[HexCell]) -> FeatureCollection {
    let features = cells
        .iter()
        .map(|cell| {
            let ring: Vec<Vec<f64>> = cell.boundary.iter().map(|c| vec![c.x, c.y]).collect();

            let mut properties = JsonObject::new();
            properties.insert("q".to_string(), cell.q.into());
            properties.insert("r".to_string(), cell.r.into());
            properties.insert("count".to_string(), cell.count.into());
            properties.insert("elevation".to_string(), cell.elevation.into());
            properties.insert("lon".to_string(), cell.center.x().into());
            properties.insert("lat".to_string(), cell.center.y().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
                id: Some(Id::String(format!("{}_{}", cell.q, cell.r))),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Écrit une FeatureCollection dans un fichier
pub fn write_geojson(collection: &FeatureCollection, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, collection).map_err(|e| {
        ForskolorError::Export(format!("{}: {}", output_path.display(), e))
    })?;
    writer.flush()?;

    Ok(())
}
