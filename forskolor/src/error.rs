//! Types d'erreurs du pipeline

use jsonapi_flat::JsonApiError;
use thiserror::Error;

/// Erreurs pouvant interrompre un chargement
///
/// Aucune n'est rattrapée : toute erreur interrompt le pipeline complet.
#[derive(Debug, Error)]
pub enum ForskolorError {
    /// La requête n'a pas abouti (DNS, connexion, TLS...)
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Pas de réponse dans le délai configuré
    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Réponse HTTP hors 2xx
    #[error("Request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// JSON invalide ou clés attendues absentes
    #[error("Malformed response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: JsonApiError,
    },

    /// Nom de colonne ambigu après aplatissement
    #[error("Flatten collision on column {0}")]
    FlattenCollision(String),

    /// Opération de table invalide (colonne inconnue, largeur de ligne...)
    #[error(transparent)]
    Table(JsonApiError),

    /// Coordonnée absente, non numérique ou hors domaine
    #[error("Reprojection failed at row {row} (id {id}): {reason}")]
    Reprojection {
        row: usize,
        id: String,
        reason: String,
    },

    /// Couple de systèmes de coordonnées non supporté
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export failed: {0}")]
    Export(String),
}

impl From<JsonApiError> for ForskolorError {
    fn from(err: JsonApiError) -> Self {
        match err {
            JsonApiError::ColumnCollision(column) => Self::FlattenCollision(column),
            other => Self::Table(other),
        }
    }
}

impl ForskolorError {
    /// Crée une erreur de reprojection avec contexte
    pub fn reprojection(row: usize, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Reprojection {
            row,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Vrai pour les erreurs de transport (réseau, délai, statut HTTP)
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ForskolorError>;
