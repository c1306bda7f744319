//! Rapport d'exécution du pipeline
//!
//! Collecte les compteurs d'un chargement (pages, ressources, colonnes,
//! reprojection) pour affichage console ou sauvegarde JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::fetch::FetchOutcome;
use crate::reproject::GeoTable;

/// Statut global du chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Chargement réussi avec au moins une ligne
    Success,
    /// Chargement réussi, collection vide
    Empty,
    /// Chargement interrompu par une erreur
    Failed,
}

/// Rapport complet d'un chargement
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// URL de la collection
    pub endpoint: String,
    /// Durée du chargement
    pub duration_secs: f64,
    /// Statut global
    pub status: RunStatus,

    // Récupération
    /// Nombre de requêtes HTTP
    pub requests: usize,
    /// `meta.totalCount` annoncé par la première page
    pub total_count: u64,
    /// Nombre de ressources effectivement reçues
    pub items_fetched: usize,

    // Table
    /// Nombre de colonnes après reprojection
    pub columns: usize,
    /// Nombre de lignes
    pub rows: usize,

    // Reprojection
    pub source_epsg: u32,
    pub target_epsg: u32,
    /// Backend utilisé
    pub reprojector: Option<String>,

    pub warnings: Vec<String>,
    /// Erreur fatale (statut `Failed`)
    pub error: Option<String>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            duration_secs: 0.0,
            status: RunStatus::Success,
            requests: 0,
            total_count: 0,
            items_fetched: 0,
            columns: 0,
            rows: 0,
            source_epsg: 0,
            target_epsg: 0,
            reprojector: None,
            warnings: Vec::new(),
            error: None,
        }
    }
}

impl RunReport {
    /// Crée un nouveau rapport pour un endpoint
    pub fn new(endpoint: &str, source_epsg: u32, target_epsg: u32) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            source_epsg,
            target_epsg,
            ..Default::default()
        }
    }

    /// Enregistre le résultat de la pagination
    pub fn record_fetch(&mut self, outcome: &FetchOutcome) {
        self.requests = outcome.requests;
        self.total_count = outcome.total_count;
        self.items_fetched = outcome.items.len();

        if outcome.items.len() as u64 != outcome.total_count {
            self.warnings.push(format!(
                "received {} items but totalCount is {}",
                outcome.items.len(),
                outcome.total_count
            ));
        }
    }

    /// Enregistre la table finale
    pub fn record_table(&mut self, geo: &GeoTable, reprojector: &str) {
        self.columns = geo.table().columns().len();
        self.rows = geo.len();
        self.reprojector = Some(reprojector.to_string());
    }

    /// Enregistre l'erreur qui a interrompu le chargement
    pub fn record_failure(&mut self, error: &dyn std::fmt::Display) {
        self.error = Some(error.to_string());
    }

    /// Définit la durée du chargement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.error.is_some() {
            RunStatus::Failed
        } else if self.rows == 0 {
            RunStatus::Empty
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RUN REPORT - {}", self.endpoint);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Fetch: {} requests, {} items (totalCount {})",
            self.requests, self.items_fetched, self.total_count
        );
        println!("Table: {} rows, {} columns", self.rows, self.columns);
        println!(
            "Reprojection: EPSG:{} -> EPSG:{} ({})",
            self.source_epsg,
            self.target_epsg,
            self.reprojector.as_deref().unwrap_or("none")
        );

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  {}", w);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if let Some(ref error) = self.error {
            println!("\n--- ERROR ---");
            println!("  {}", error);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{:?}: {} rows from {} requests in {:.2}s",
            self.status, self.rows, self.requests, self.duration_secs
        )
    }
}
