//! Frontière avec la surface cartographique
//!
//! Le cœur ne dépend d'aucune bibliothèque de rendu: il émet des commandes via
//! le trait [`MapSurface`] et consomme des [`SurfaceEvent`].

use serde::{Deserialize, Serialize};

use crate::bounds::{GeoBounds, GeoPoint};
use crate::style::ZoneStyle;
use crate::zone::ZoneId;

/// Commandes sortantes vers la surface cartographique
pub trait MapSurface {
    /// Suspend pan, zoom molette et zoom double-clic
    fn disable_navigation(&mut self);

    /// Rétablit la navigation. Doit être idempotent.
    fn enable_navigation(&mut self);

    fn fit_viewport_to(&mut self, bounds: GeoBounds, padding: f64);

    fn draw_preview_rectangle(&mut self, bounds: GeoBounds, style: &ZoneStyle);

    fn remove_preview_rectangle(&mut self);

    fn render_zone_shape(&mut self, id: ZoneId, bounds: GeoBounds, style: &ZoneStyle);

    fn remove_zone_shape(&mut self, id: ZoneId);
}

impl<T: MapSurface + ?Sized> MapSurface for &mut T {
    fn disable_navigation(&mut self) {
        (**self).disable_navigation()
    }

    fn enable_navigation(&mut self) {
        (**self).enable_navigation()
    }

    fn fit_viewport_to(&mut self, bounds: GeoBounds, padding: f64) {
        (**self).fit_viewport_to(bounds, padding)
    }

    fn draw_preview_rectangle(&mut self, bounds: GeoBounds, style: &ZoneStyle) {
        (**self).draw_preview_rectangle(bounds, style)
    }

    fn remove_preview_rectangle(&mut self) {
        (**self).remove_preview_rectangle()
    }

    fn render_zone_shape(&mut self, id: ZoneId, bounds: GeoBounds, style: &ZoneStyle) {
        (**self).render_zone_shape(id, bounds, style)
    }

    fn remove_zone_shape(&mut self, id: ZoneId) {
        (**self).remove_zone_shape(id)
    }
}

/// Événements entrants émis par la surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    PointerDown(GeoPoint),
    PointerMove(GeoPoint),
    PointerUp(GeoPoint),
    /// La surface a perdu la capture du pointeur avant le relâchement
    PointerCaptureLost,
    ShapeClicked(ZoneId),
}

/// Trace d'une commande émise (utilisée par [`RecordingSurface`])
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SurfaceCommand {
    DisableNavigation,
    EnableNavigation,
    FitViewportTo {
        bounds: GeoBounds,
        padding: f64,
    },
    DrawPreviewRectangle {
        bounds: GeoBounds,
        style: ZoneStyle,
    },
    RemovePreviewRectangle,
    RenderZoneShape {
        id: ZoneId,
        bounds: GeoBounds,
        style: ZoneStyle,
    },
    RemoveZoneShape {
        id: ZoneId,
    },
}

/// Surface en mémoire qui enregistre les commandes reçues et suit l'état
/// de la navigation et de la prévisualisation.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
    navigation_enabled: bool,
    preview: Option<GeoBounds>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            navigation_enabled: true,
            preview: None,
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Vide l'historique et le retourne
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn navigation_enabled(&self) -> bool {
        self.navigation_enabled
    }

    pub fn preview(&self) -> Option<GeoBounds> {
        self.preview
    }

    /// Nombre de `fit_viewport_to` reçus
    pub fn fit_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::FitViewportTo { .. }))
            .count()
    }
}

impl MapSurface for RecordingSurface {
    fn disable_navigation(&mut self) {
        self.navigation_enabled = false;
        self.commands.push(SurfaceCommand::DisableNavigation);
    }

    fn enable_navigation(&mut self) {
        self.navigation_enabled = true;
        self.commands.push(SurfaceCommand::EnableNavigation);
    }

    fn fit_viewport_to(&mut self, bounds: GeoBounds, padding: f64) {
        self.commands
            .push(SurfaceCommand::FitViewportTo { bounds, padding });
    }

    fn draw_preview_rectangle(&mut self, bounds: GeoBounds, style: &ZoneStyle) {
        self.preview = Some(bounds);
        self.commands.push(SurfaceCommand::DrawPreviewRectangle {
            bounds,
            style: style.clone(),
        });
    }

    fn remove_preview_rectangle(&mut self) {
        self.preview = None;
        self.commands.push(SurfaceCommand::RemovePreviewRectangle);
    }

    fn render_zone_shape(&mut self, id: ZoneId, bounds: GeoBounds, style: &ZoneStyle) {
        self.commands.push(SurfaceCommand::RenderZoneShape {
            id,
            bounds,
            style: style.clone(),
        });
    }

    fn remove_zone_shape(&mut self, id: ZoneId) {
        self.commands.push(SurfaceCommand::RemoveZoneShape { id });
    }
}
