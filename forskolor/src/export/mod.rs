pub mod geojson;

pub use self::geojson::{hexbin_to_geojson, points_to_geojson, write_geojson};
