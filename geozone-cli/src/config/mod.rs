//! Configuration du système

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use geozone::registry::DEFAULT_NAME_PREFIX;
use geozone::session::DEFAULT_FIT_PADDING;
use geozone::{SessionOptions, StylePalette, Thresholds};

/// Presets embarqués, dans l'ordre d'affichage
pub const PRESETS: [&str; 3] = ["default", "high-contrast", "strict"];

/// Configuration principale
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Préfixe du nom donné aux nouvelles zones
    #[serde(default = "default_zone_name")]
    pub default_zone_name: String,

    /// Marge de recadrage (pixels)
    #[serde(default = "default_fit_padding")]
    pub fit_padding: f64,

    /// Accepter les zones de surface nulle
    #[serde(default = "default_true")]
    pub allow_degenerate: bool,

    /// Surcharge des styles de rendu
    #[serde(default)]
    pub palette: StylePalette,

    /// Seuils d'activation par champ de mesure
    #[serde(default)]
    pub thresholds: Thresholds,
}

fn default_zone_name() -> String {
    DEFAULT_NAME_PREFIX.to_string()
}

fn default_fit_padding() -> f64 {
    DEFAULT_FIT_PADDING
}

fn default_true() -> bool {
    true
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
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "high-contrast" => Self::load_embedded(include_str!("presets/high-contrast.json")),
            "strict" => Self::load_embedded(include_str!("presets/strict.json")),
            _ => anyhow::bail!(
                "Unknown preset: {}. Use: {}",
                preset,
                PRESETS.join(", ")
            ),
        }
    }

    /// Résout un nom de preset ou un chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        if PRESETS.contains(&name_or_path) {
            Self::from_preset(name_or_path)
        } else {
            Self::load(Path::new(name_or_path))
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Options de session correspondantes
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            name_prefix: self.default_zone_name.clone(),
            fit_padding: self.fit_padding,
            allow_degenerate: self.allow_degenerate,
            palette: self.palette.clone(),
        }
    }
}
