//! Configuration du pipeline
//!
//! Ordre de priorité : valeurs par défaut < fichier JSON < variables
//! d'environnement < options CLI.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use jsonapi_flat::CollisionPolicy;
use serde::{Deserialize, Serialize};

use crate::error::ForskolorError;

/// Endpoint des unités de service de la ville de Stockholm
pub const DEFAULT_ENDPOINT: &str =
    "https://apigw.stockholm.se/NoAuth/VirtualhittaserviceDMZ/Rest/serviceunits";

/// EPSG de sortie (WGS84), fixe pour ce pipeline
pub const TARGET_EPSG: u32 = 4326;

/// Paramètre de requête statique (filtre)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// URL de la collection de ressources
    pub endpoint: String,

    /// Taille de page (`page[limit]`)
    pub batch_size: usize,

    /// Filtres envoyés avec chaque page, dans cet ordre
    pub filters: Vec<QueryParam>,

    /// Tri (`sort`)
    pub sort: Option<String>,

    /// Délai maximal par requête
    pub timeout_secs: u64,

    /// EPSG des colonnes planes (3011 = SWEREF99 18 00)
    pub source_epsg: u32,

    /// Colonne des abscisses (est)
    pub east_column: String,

    /// Colonne des ordonnées (nord)
    pub north_column: String,

    /// Durée de vie des entrées du cache
    pub cache_ttl_secs: u64,

    /// Nommage des colonnes en collision entre groupes
    pub collision_policy: CollisionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: 100,
            filters: vec![QueryParam::new("filter[servicetype.id]", "2,1")],
            sort: Some("name".to_string()),
            timeout_secs: 30,
            source_epsg: 3011,
            east_column: "location.east".to_string(),
            north_column: "location.north".to_string(),
            cache_ttl_secs: 3600,
            collision_policy: CollisionPolicy::PrefixColliding,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "stockholm" => Self::load_embedded(include_str!("presets/stockholm.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: stockholm", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn resolve(spec: &str) -> Result<Self> {
        let path = Path::new(spec);
        if path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(spec)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Lecture d'une variable du processus (absente ou non UTF-8 → `None`)
    pub fn env_var(key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    /// Applique les surcharges `FORSKOLOR_*` lues par `var`
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(endpoint) = var("FORSKOLOR_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(batch) = var("FORSKOLOR_BATCH_SIZE") {
            self.batch_size = batch
                .parse()
                .context(format!("FORSKOLOR_BATCH_SIZE is not an integer: {}", batch))?;
        }
        if let Some(timeout) = var("FORSKOLOR_TIMEOUT_SECS") {
            self.timeout_secs = timeout
                .parse()
                .context(format!("FORSKOLOR_TIMEOUT_SECS is not an integer: {}", timeout))?;
        }
        Ok(())
    }

    /// Vérifie la cohérence de la configuration
    pub fn validate(&self) -> std::result::Result<(), ForskolorError> {
        if self.endpoint.trim().is_empty() {
            return Err(ForskolorError::Config("endpoint is empty".into()));
        }
        if self.batch_size == 0 {
            return Err(ForskolorError::Config("batch_size must be positive".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ForskolorError::Config("timeout_secs must be positive".into()));
        }
        if self.east_column == self.north_column {
            return Err(ForskolorError::Config(format!(
                "east and north columns are both {}",
                self.east_column
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
