//! Chargement complet : pagination → aplatissement → reprojection
//!
//! `run()` recalcule toujours ; `load()` passe par le cache du pipeline.

use std::sync::Arc;
use std::time::Instant;

use jsonapi_flat::flatten_resources;
use tracing::{debug, info};

use crate::cache::{CacheKey, TtlCache, DEFAULT_CAPACITY};
use crate::config::{Config, TARGET_EPSG};
use crate::error::{ForskolorError, Result};
use crate::fetch::{fetch_all, PageSource};
use crate::report::RunReport;
use crate::reproject::{reproject_table, GeoTable};
use crate::reproject_lite::SmartReprojector;

/// Pipeline de chargement des unités de service
pub struct Pipeline<S> {
    source: S,
    config: Config,
    cache: TtlCache<CacheKey, Arc<GeoTable>>,
}

impl<S: PageSource> Pipeline<S> {
    /// Crée un pipeline, la configuration est validée
    pub fn new(source: S, config: Config) -> Result<Self> {
        config.validate()?;
        let cache = TtlCache::new(DEFAULT_CAPACITY, config.cache_ttl());
        Ok(Self {
            source,
            config,
            cache,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clé de cache de la requête configurée
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            endpoint: self.source.endpoint().to_string(),
            filters: self.config.filters.clone(),
            sort: self.config.sort.clone(),
        }
    }

    /// Exécute le chargement complet, sans cache
    pub async fn run(&self) -> Result<(GeoTable, RunReport)> {
        let start = Instant::now();
        let mut report = RunReport::new(
            self.source.endpoint(),
            self.config.source_epsg,
            TARGET_EPSG,
        );

        let reprojector = SmartReprojector::new(self.config.source_epsg, TARGET_EPSG)
            .map_err(|e| ForskolorError::UnsupportedCrs(e.to_string()))?;

        let outcome = fetch_all(
            &self.source,
            &self.config.filters,
            self.config.sort.as_deref(),
            self.config.batch_size,
        )
        .await?;
        report.record_fetch(&outcome);

        let table = flatten_resources(&outcome.items, self.config.collision_policy)?;

        let geo = reproject_table(
            &table,
            &self.config.east_column,
            &self.config.north_column,
            &reprojector,
        )?;

        report.record_table(&geo, reprojector.description());
        report.set_duration(start.elapsed());
        report.finalize();

        info!(
            rows = geo.len(),
            requests = report.requests,
            duration_secs = report.duration_secs,
            "Pipeline complete"
        );

        Ok((geo, report))
    }

    /// Table en cache si valide, sinon chargement puis mise en cache
    pub async fn load(&mut self) -> Result<(Arc<GeoTable>, Option<RunReport>)> {
        let key = self.cache_key();
        if let Some(geo) = self.cache.get(&key) {
            debug!(endpoint = %key.endpoint, "Cache hit");
            return Ok((geo, None));
        }

        let (geo, report) = self.run().await?;
        let geo = Arc::new(geo);
        self.cache.insert(key, Arc::clone(&geo));
        Ok((geo, Some(report)))
    }

    /// Invalide l'entrée de cache de la requête configurée
    pub fn invalidate(&mut self) -> bool {
        let key = self.cache_key();
        self.cache.invalidate(&key)
    }
}
