//! # geozone
//!
//! Cœur d'interaction pour tracer, sélectionner et éditer des zones géographiques
//! rectangulaires sur une carte.
//!
//! ## Features
//!
//! - Machine à états explicite (`Idle`, `ArmedForCreation`, `Dragging`, `PendingAccept`, `Editing`)
//! - Au plus une zone en création ou en édition à la fois
//! - Navigation de la carte suspendue pendant le tracé et toujours rétablie
//! - Aucune dépendance à une bibliothèque de rendu: la carte est derrière le trait [`MapSurface`]
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust
//! use geozone::{GeoPoint, RecordingSurface, Session, SurfaceEvent, ZoneType};
//!
//! let mut session = Session::new(RecordingSurface::new());
//! session.start_creation();
//! session.handle_event(SurfaceEvent::PointerDown(GeoPoint::new(51.500, -0.100)))?;
//! session.handle_event(SurfaceEvent::PointerUp(GeoPoint::new(51.510, -0.080)))?;
//!
//! let id = session.selected_id().expect("zone drawn");
//! session.save_edit(id, "Thames", ZoneType::Wind)?;
//! assert_eq!(session.list_zones().len(), 1);
//! # Ok::<(), geozone::ZoneError>(())
//! ```

pub mod bounds;
pub mod error;
pub mod gesture;
pub mod registry;
pub mod session;
pub mod style;
pub mod surface;
pub mod threshold;
pub mod zone;

pub use bounds::{GeoBounds, GeoPoint};
pub use error::ZoneError;
pub use gesture::DrawingGesture;
pub use registry::ZoneRegistry;
pub use session::{EditBuffer, InteractionState, Session, SessionOptions};
pub use style::{style_of, StylePalette, ZoneStyle};
pub use surface::{MapSurface, RecordingSurface, SurfaceCommand, SurfaceEvent};
pub use threshold::{Condition, Sample, Threshold, Thresholds};
pub use zone::{Zone, ZoneId, ZoneType};
