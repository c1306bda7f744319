//! # forskolor
//!
//! Carte de densité des förskolor (écoles maternelles) de Stockholm.
//!
//! ## Features
//!
//! - Récupération paginée de l'API JSON:API des unités de service
//! - Aplatissement des ressources en table (`jsonapi-flat`)
//! - Reprojection SWEREF99 → WGS84 en pur Rust (PROJ en option)
//! - Binning hexagonal et export GeoJSON
//! - Cache explicite à expiration
//!
//! ## Usage CLI
//!
//! ```bash
//! # Points WGS84
//! forskolor points --output forskolor.geojson
//!
//! # Hexagones de 200 m
//! forskolor hexbin --output hex.geojson --radius 200
//!
//! # Vue initiale de la carte
//! forskolor view --zoom 12
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod hexbin;
pub mod pipeline;
pub mod report;
pub mod reproject;
pub mod reproject_lite;
pub mod view;

pub use cache::{CacheKey, TtlCache};
pub use config::{Config, QueryParam, TARGET_EPSG};
pub use error::{ForskolorError, Result};
pub use fetch::{fetch_all, FetchOutcome, HttpPageSource, PageQuery, PageSource};
pub use hexbin::{hexbin, HexCell, HexbinOptions};
pub use pipeline::Pipeline;
pub use report::{RunReport, RunStatus};
pub use reproject::{reproject_table, GeoTable};
pub use view::{map_center, ViewState};
