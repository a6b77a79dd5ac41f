//! Définition et implémentation des commandes CLI
//!
//! - `replay`: script → session → rapport (+ GeoJSON)
//! - `check`: validation d'un script sans rejeu
//! - `presets`: liste des configurations embarquées

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use geozone::{RecordingSurface, Session};
use geozone_cli::config::{Config, PRESETS};
use geozone_cli::export::export_to_geojson;
use geozone_cli::{replay, script, ReplayReport, ReplayStatus};

/// Variable d'environnement donnant la configuration par défaut
pub const CONFIG_ENV: &str = "GEOZONE_CONFIG";

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a session script and report the result
    Replay {
        /// Path to the script (JSON Lines)
        #[arg(short, long)]
        script: PathBuf,

        /// Config preset name (default/high-contrast/strict) or path to a JSON config
        /// (défaut : env GEOZONE_CONFIG / default)
        #[arg(long)]
        config: Option<String>,

        /// Export resulting zones to GeoJSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the replay report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Parse a script without replaying it
    Check {
        /// Path to the script (JSON Lines)
        #[arg(short, long)]
        script: PathBuf,
    },

    /// List embedded configuration presets
    Presets,
}

/// Résout la configuration: argument, puis environnement, puis preset `default`
fn resolve_config(config: Option<&str>) -> Result<Config> {
    let spec = match config {
        Some(spec) => spec.to_string(),
        None => std::env::var(CONFIG_ENV).unwrap_or_else(|_| "default".to_string()),
    };
    info!(config = %spec, "Loading configuration");
    Config::resolve(&spec)
}

pub fn cmd_replay(
    script_path: &Path,
    config: Option<&str>,
    output: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let config = resolve_config(config)?;
    let steps = script::load(script_path)?;
    info!(steps = steps.len(), "Script loaded");

    let mut session = Session::with_options(RecordingSurface::new(), config.session_options());
    let mut report = ReplayReport::new(&script_path.display().to_string());
    replay::run(&mut session, &steps, &config.thresholds, &mut report);

    if let Some(path) = output {
        export_to_geojson(&session, path)?;
        info!(output = %path.display(), zones = report.zones_final, "GeoJSON written");
    }

    report.display();
    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(report = %path.display(), "Report saved");
    }

    if report.status == ReplayStatus::Failed {
        anyhow::bail!("Replay failed: {}", report.summary());
    }
    Ok(())
}

pub fn cmd_check(script_path: &Path) -> Result<()> {
    let steps = script::load(script_path)?;
    println!("{}: {} steps OK", script_path.display(), steps.len());
    Ok(())
}

pub fn cmd_presets() -> Result<()> {
    for preset in PRESETS {
        let config = Config::from_preset(preset)?;
        println!(
            "{:<14} zone name \"{}\", padding {}, degenerate {}, {} thresholds",
            preset,
            config.default_zone_name,
            config.fit_padding,
            if config.allow_degenerate {
                "allowed"
            } else {
                "rejected"
            },
            config.thresholds.len()
        );
    }
    Ok(())
}
