//! Scripts de session (JSON Lines)
//!
//! Une étape par ligne, étiquetée par `"op"`. Les lignes vides et celles qui
//! commencent par `#` sont ignorées.
//!
//! ```text
//! {"op":"start_creation"}
//! {"op":"pointer_down","lat":51.5,"lng":-0.1}
//! {"op":"pointer_up","lat":51.51,"lng":-0.08}
//! {"op":"save","id":1,"name":"Thames","zone_type":"wind"}
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use geozone::{GeoPoint, Sample, SurfaceEvent, ZoneId, ZoneType};

/// Erreur de lecture d'un script
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Ligne JSON invalide ou opération inconnue
    #[error("Parse error at line {line}: {reason}")]
    ParseError { line: usize, reason: String },
}

/// Une étape de script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    StartCreation,
    StopCreation,
    PointerDown { lat: f64, lng: f64 },
    PointerMove { lat: f64, lng: f64 },
    PointerUp { lat: f64, lng: f64 },
    CaptureLost,
    ShapeClicked { id: ZoneId },
    Select { id: ZoneId },
    StartEdit { id: ZoneId },
    /// Saisie dans le formulaire sans validation
    Edit { name: String, zone_type: ZoneType },
    Save {
        id: ZoneId,
        name: String,
        zone_type: ZoneType,
    },
    Cancel { id: ZoneId },
    Delete { id: ZoneId },
    Localize { id: ZoneId },
    SetActive { id: ZoneId, active: bool },
    /// Mesures à évaluer contre les seuils configurés
    Sample { id: ZoneId, values: Sample },
    Group { name: String, members: Vec<ZoneId> },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::StartCreation => "start_creation",
            Step::StopCreation => "stop_creation",
            Step::PointerDown { .. } => "pointer_down",
            Step::PointerMove { .. } => "pointer_move",
            Step::PointerUp { .. } => "pointer_up",
            Step::CaptureLost => "capture_lost",
            Step::ShapeClicked { .. } => "shape_clicked",
            Step::Select { .. } => "select",
            Step::StartEdit { .. } => "start_edit",
            Step::Edit { .. } => "edit",
            Step::Save { .. } => "save",
            Step::Cancel { .. } => "cancel",
            Step::Delete { .. } => "delete",
            Step::Localize { .. } => "localize",
            Step::SetActive { .. } => "set_active",
            Step::Sample { .. } => "sample",
            Step::Group { .. } => "group",
        }
    }

    /// Événement de surface correspondant, si l'étape en est un
    pub fn surface_event(&self) -> Option<SurfaceEvent> {
        match *self {
            Step::PointerDown { lat, lng } => {
                Some(SurfaceEvent::PointerDown(GeoPoint::new(lat, lng)))
            }
            Step::PointerMove { lat, lng } => {
                Some(SurfaceEvent::PointerMove(GeoPoint::new(lat, lng)))
            }
            Step::PointerUp { lat, lng } => Some(SurfaceEvent::PointerUp(GeoPoint::new(lat, lng))),
            Step::CaptureLost => Some(SurfaceEvent::PointerCaptureLost),
            Step::ShapeClicked { id } => Some(SurfaceEvent::ShapeClicked(id)),
            _ => None,
        }
    }
}

/// Étape avec son numéro de ligne (1-based)
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: Step,
}

/// Parse le contenu d'un script
pub fn parse(content: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut steps = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let step: Step = serde_json::from_str(trimmed).map_err(|e| ScriptError::ParseError {
            line,
            reason: e.to_string(),
        })?;
        steps.push(ScriptLine { line, step });
    }

    Ok(steps)
}

/// Charge et parse un script depuis un fichier
pub fn load(path: &Path) -> Result<Vec<ScriptLine>> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read script: {}", path.display()))?;

    parse(&content).context(format!("Invalid script: {}", path.display()))
}
