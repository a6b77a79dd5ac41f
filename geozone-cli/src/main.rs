//! Point d'entrée CLI pour geozone

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Rejouer des sessions de tracé de zones et exporter le résultat
#[derive(Parser)]
#[command(name = "geozone")]
#[command(author, version)]
#[command(about = "Rejouer des sessions de tracé de zones et exporter les zones en GeoJSON")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Replay {
            script,
            config,
            output,
            report,
        } => {
            debug!(script = %script.display(), "Replay");
            cli::cmd_replay(
                &script,
                config.as_deref(),
                output.as_deref(),
                report.as_deref(),
            )?;
        }
        Commands::Check { script } => cli::cmd_check(&script)?,
        Commands::Presets => cli::cmd_presets()?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
