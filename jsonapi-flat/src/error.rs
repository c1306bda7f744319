//! Types d'erreurs pour le crate jsonapi-flat

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture ou de l'aplatissement d'une page JSON:API
#[derive(Debug, Error)]
pub enum JsonApiError {
    /// Corps de réponse qui n'est pas du JSON valide
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Clé obligatoire absente (ex: `meta.totalCount`, `data`)
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Clé présente mais de type inattendu
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// Ressource de `data` qui ne respecte pas la forme JSON:API
    #[error("Invalid resource at index {index}: {reason}")]
    InvalidResource { index: usize, reason: String },

    /// Deux colonnes portent le même nom après aplatissement
    #[error("Column name collision: {0}")]
    ColumnCollision(String),

    /// Ligne dont la largeur ne correspond pas au nombre de colonnes
    #[error("Row has {actual} values, table has {expected} columns")]
    RowLength { expected: usize, actual: usize },

    /// Colonne inconnue
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

impl JsonApiError {
    /// Crée une erreur de champ invalide avec contexte
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de ressource invalide
    pub fn invalid_resource(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidResource {
            index,
            reason: reason.into(),
        }
    }
}
