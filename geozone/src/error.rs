//! Types d'erreurs pour le crate geozone

use thiserror::Error;

use crate::zone::ZoneId;

/// Erreurs pouvant survenir lors de la manipulation des zones
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneError {
    /// Coordonnées non finies ou rectangle refusé
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// La zone référencée n'existe plus
    #[error("Zone not found: {0}")]
    NotFound(ZoneId),

    /// Tentative de démarrer une seconde création/édition concurrente
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Le type système (auto_group) ne passe pas par le chemin d'édition
    #[error("Zone {0}: system-managed type cannot be assigned or changed through an edit")]
    SystemManagedType(ZoneId),
}

impl ZoneError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Crée une violation d'invariant avec contexte
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation(reason.into())
    }
}
