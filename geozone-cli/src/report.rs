//! Rapport de rejeu
//!
//! Collecte le résultat de chaque étape d'un script (appliquée, refusée,
//! en erreur) sans interrompre le rejeu.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

/// Statut global du rejeu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReplayStatus {
    /// Toutes les étapes ont été appliquées ou refusées sans erreur
    Success,
    /// Des étapes en erreur, mais au moins une appliquée
    PartialSuccess,
    /// Aucune étape appliquée et au moins une erreur
    Failed,
}

/// Erreur survenue sur une étape
#[derive(Debug, Clone, Serialize)]
pub struct StepError {
    /// Ligne du script
    pub line: usize,
    /// Opération concernée
    pub op: String,
    pub message: String,
}

/// Statistiques par opération
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpStats {
    pub applied: usize,
    /// Commande refusée silencieusement par la session
    pub refused: usize,
    pub errors: usize,
}

impl OpStats {
    pub fn total(&self) -> usize {
        self.applied + self.refused + self.errors
    }
}

/// Rapport complet d'un rejeu
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Script rejoué
    pub script: String,
    pub duration_secs: f64,
    pub status: ReplayStatus,

    pub steps_applied: usize,
    pub steps_refused: usize,
    pub steps_failed: usize,

    /// Zones présentes en fin de session
    pub zones_final: usize,
    /// Zones actives en fin de session
    pub zones_active: usize,
    /// État de la session en fin de script
    pub final_state: String,
    /// Commandes envoyées à la carte
    pub surface_commands: usize,
    pub navigation_enabled: bool,

    pub by_op: HashMap<String, OpStats>,

    pub errors: Vec<StepError>,
    pub warnings: Vec<String>,
}

impl Default for ReplayReport {
    fn default() -> Self {
        Self {
            script: String::new(),
            duration_secs: 0.0,
            status: ReplayStatus::Success,
            steps_applied: 0,
            steps_refused: 0,
            steps_failed: 0,
            zones_final: 0,
            zones_active: 0,
            final_state: String::new(),
            surface_commands: 0,
            navigation_enabled: true,
            by_op: HashMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl ReplayReport {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            ..Default::default()
        }
    }

    /// Enregistre une étape appliquée
    pub fn record_applied(&mut self, op: &str) {
        self.steps_applied += 1;
        self.by_op.entry(op.to_string()).or_default().applied += 1;
    }

    /// Enregistre une étape refusée par la session
    pub fn record_refused(&mut self, op: &str) {
        self.steps_refused += 1;
        self.by_op.entry(op.to_string()).or_default().refused += 1;
    }

    /// Enregistre une étape en erreur
    pub fn record_error(&mut self, error: StepError) {
        self.steps_failed += 1;
        self.by_op.entry(error.op.clone()).or_default().errors += 1;
        self.errors.push(error);
    }

    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final basé sur les erreurs
    pub fn finalize(&mut self) {
        let has_errors = !self.errors.is_empty();
        let has_success = self.steps_applied > 0;

        self.status = if has_errors && has_success {
            ReplayStatus::PartialSuccess
        } else if has_errors {
            ReplayStatus::Failed
        } else {
            ReplayStatus::Success
        };
    }

    pub fn total_steps(&self) -> usize {
        self.steps_applied + self.steps_refused + self.steps_failed
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("REPLAY REPORT - {}", self.script);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.3}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Steps: {} applied, {} refused, {} failed",
            self.steps_applied, self.steps_refused, self.steps_failed
        );
        println!(
            "Zones: {} total, {} active (final state: {})",
            self.zones_final, self.zones_active, self.final_state
        );
        println!(
            "Surface: {} commands, navigation {}",
            self.surface_commands,
            if self.navigation_enabled {
                "enabled"
            } else {
                "disabled"
            }
        );

        if !self.by_op.is_empty() {
            println!("\n--- BY OPERATION ---");
            let mut ops: Vec<_> = self.by_op.iter().collect();
            ops.sort_by_key(|(k, _)| k.as_str());
            for (op, stats) in ops {
                println!(
                    "  {}: {} applied, {} refused, {} errors",
                    op, stats.applied, stats.refused, stats.errors
                );
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  {}", w);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                println!("  [line {}] {}: {}", e.line, e.op, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
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
            "{}: {} applied, {} refused, {} errors, {} zones",
            self.script,
            self.steps_applied,
            self.steps_refused,
            self.errors.len(),
            self.zones_final
        )
    }
}
