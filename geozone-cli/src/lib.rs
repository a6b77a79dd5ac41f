//! # geozone-cli
//!
//! Rejeu sans interface de sessions de tracé de zones.
//!
//! ## Features
//!
//! - Scripts JSON Lines d'événements carte et de commandes de formulaire
//! - Rapport de rejeu (console + JSON)
//! - Export GeoJSON des zones résultantes
//! - Presets de configuration embarqués
//!
//! ## Usage CLI
//!
//! ```bash
//! geozone replay --script ./session.jsonl --output ./zones.geojson
//! geozone replay --script ./session.jsonl --config strict --report ./report.json
//! geozone check --script ./session.jsonl
//! geozone presets
//! ```

pub mod config;
pub mod export;
pub mod replay;
pub mod report;
pub mod script;

pub use config::Config;
pub use report::{ReplayReport, ReplayStatus};
pub use script::{ScriptLine, Step};
