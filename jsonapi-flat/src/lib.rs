//! # jsonapi-flat
//!
//! Lecture de pages JSON:API et aplatissement des ressources en table.
//!
//! ## Features
//!
//! - Validation stricte des pages (`meta.totalCount` et `data` obligatoires)
//! - Aplatissement récursif des attributs, relations et liens en noms pointés
//! - Politique de collision explicite entre groupes
//! - Table immuable, une ligne par ressource
//!
//! ## Usage
//!
//! ```rust
//! use jsonapi_flat::{flatten_resources, CollisionPolicy, PageResponse};
//!
//! let body = br#"{"meta":{"totalCount":1},"data":[{"id":"1","attributes":{"location":{"east":153000}}}]}"#;
//! let page = PageResponse::from_slice(body)?;
//! let table = flatten_resources(&page.data, CollisionPolicy::default())?;
//!
//! assert_eq!(table.columns(), ["id", "location.east"]);
//! # Ok::<(), jsonapi_flat::JsonApiError>(())
//! ```

pub mod error;
pub mod flatten;
pub mod table;
pub mod types;

pub use error::JsonApiError;
pub use flatten::{flatten_object, flatten_resources, CollisionPolicy, ID_COLUMN};
pub use table::Table;
pub use types::{Group, Meta, PageResponse, Resource};
