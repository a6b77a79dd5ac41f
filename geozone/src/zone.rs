//! Types de données des zones

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bounds::GeoBounds;

/// Identifiant opaque d'une zone, attribué par le registre et jamais réutilisé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(u64);

impl ZoneId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catégorie d'une zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    #[default]
    Empty,
    Wind,
    Rain,
    Visibility,
    Temperature,
    /// Zone dérivée automatiquement d'un regroupement (gérée par le système)
    AutoGroup,
}

impl ZoneType {
    /// Types proposés à l'utilisateur dans le formulaire d'édition
    pub const USER_ASSIGNABLE: [ZoneType; 5] = [
        ZoneType::Empty,
        ZoneType::Wind,
        ZoneType::Rain,
        ZoneType::Visibility,
        ZoneType::Temperature,
    ];

    pub fn is_system_managed(self) -> bool {
        matches!(self, ZoneType::AutoGroup)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneType::Empty => "empty",
            ZoneType::Wind => "wind",
            ZoneType::Rain => "rain",
            ZoneType::Visibility => "visibility",
            ZoneType::Temperature => "temperature",
            ZoneType::AutoGroup => "auto_group",
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(ZoneType::Empty),
            "wind" => Ok(ZoneType::Wind),
            "rain" => Ok(ZoneType::Rain),
            "visibility" => Ok(ZoneType::Visibility),
            "temperature" => Ok(ZoneType::Temperature),
            "auto_group" => Ok(ZoneType::AutoGroup),
            other => Err(format!("Unknown zone type: {}", other)),
        }
    }
}

/// Une zone rectangulaire nommée et typée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub zone_type: ZoneType,
    pub bounds: GeoBounds,

    /// Zone active (dérivé des seuils pour les zones surveillées)
    pub active: bool,

    /// Zone provisoire, en attente de validation
    pub is_creating: bool,

    /// Zone en cours d'édition
    pub is_editing: bool,

    /// Zones membres (uniquement pour `auto_group`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ZoneId>,
}

impl Zone {
    /// Vrai si la zone est dans un état transitoire (création ou édition)
    pub fn is_pending(&self) -> bool {
        self.is_creating || self.is_editing
    }
}
