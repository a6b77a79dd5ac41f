//! Contrôleur de geste de tracé
//!
//! Transforme une séquence pointer-down → pointer-move* → pointer-up en
//! `GeoBounds`, en maintenant un rectangle de prévisualisation sur la surface.
//! La suspension de la navigation est portée par la session, pas par le geste.

use tracing::trace;

use crate::bounds::{GeoBounds, GeoPoint};
use crate::style::ZoneStyle;
use crate::surface::MapSurface;
use crate::ZoneError;

/// Geste de tracé en cours (ou inactif)
#[derive(Debug, Default)]
pub struct DrawingGesture {
    anchor: Option<GeoPoint>,
    preview: Option<GeoBounds>,
}

impl DrawingGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<GeoPoint> {
        self.anchor
    }

    /// Dernier rectangle de prévisualisation dessiné
    pub fn preview(&self) -> Option<GeoBounds> {
        self.preview
    }

    /// Enregistre l'ancre et dessine un rectangle de taille nulle.
    ///
    /// En cas de coordonnée invalide, rien n'est dessiné et le geste reste inactif.
    pub fn begin<S: MapSurface + ?Sized>(
        &mut self,
        anchor: GeoPoint,
        surface: &mut S,
        style: &ZoneStyle,
    ) -> Result<GeoBounds, ZoneError> {
        let bounds = GeoBounds::point(anchor)?;

        self.anchor = Some(anchor);
        self.preview = Some(bounds);
        surface.draw_preview_rectangle(bounds, style);

        trace!(lat = anchor.lat, lng = anchor.lng, "Gesture anchored");
        Ok(bounds)
    }

    /// Recalcule la prévisualisation entre l'ancre et la position courante
    pub fn update<S: MapSurface + ?Sized>(
        &mut self,
        current: GeoPoint,
        surface: &mut S,
        style: &ZoneStyle,
    ) -> Result<GeoBounds, ZoneError> {
        let anchor = self
            .anchor
            .ok_or_else(|| ZoneError::invariant("pointer move without an active gesture"))?;
        let bounds = GeoBounds::from_corners(anchor, current)?;

        self.preview = Some(bounds);
        surface.draw_preview_rectangle(bounds, style);
        Ok(bounds)
    }

    /// Termine le geste: retire la prévisualisation et retourne les bornes finales.
    ///
    /// La prévisualisation est retirée même si la position de relâchement est invalide.
    pub fn finish<S: MapSurface + ?Sized>(
        &mut self,
        release: GeoPoint,
        surface: &mut S,
    ) -> Result<GeoBounds, ZoneError> {
        let anchor = self.anchor;
        self.abort(surface);

        let anchor =
            anchor.ok_or_else(|| ZoneError::invariant("pointer up without an active gesture"))?;
        GeoBounds::from_corners(anchor, release)
    }

    /// Interrompt le geste et retire la prévisualisation s'il y en a une
    pub fn abort<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.anchor = None;
        if self.preview.take().is_some() {
            surface.remove_preview_rectangle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceCommand};

    fn style() -> ZoneStyle {
        ZoneStyle::new("blue", 2.0, false)
    }

    #[test]
    fn test_full_gesture() {
        let mut surface = RecordingSurface::new();
        let mut gesture = DrawingGesture::new();

        let start = gesture
            .begin(GeoPoint::new(51.51, -0.08), &mut surface, &style())
            .unwrap();
        assert!(start.is_degenerate());
        assert!(gesture.is_active());

        let moved = gesture
            .update(GeoPoint::new(51.505, -0.09), &mut surface, &style())
            .unwrap();
        assert_eq!(moved.southwest(), GeoPoint::new(51.505, -0.09));
        assert_eq!(surface.preview(), Some(moved));

        let bounds = gesture
            .finish(GeoPoint::new(51.50, -0.10), &mut surface)
            .unwrap();
        assert_eq!(bounds.southwest(), GeoPoint::new(51.50, -0.10));
        assert_eq!(bounds.northeast(), GeoPoint::new(51.51, -0.08));
        assert!(!gesture.is_active());
        assert_eq!(surface.preview(), None);
        assert_eq!(
            surface.commands().last(),
            Some(&SurfaceCommand::RemovePreviewRectangle)
        );
    }

    #[test]
    fn test_invalid_anchor_draws_nothing() {
        let mut surface = RecordingSurface::new();
        let mut gesture = DrawingGesture::new();

        let err = gesture
            .begin(GeoPoint::new(f64::NAN, 0.0), &mut surface, &style())
            .unwrap_err();
        assert!(matches!(err, ZoneError::InvalidGeometry { .. }));
        assert!(!gesture.is_active());
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_invalid_release_still_removes_preview() {
        let mut surface = RecordingSurface::new();
        let mut gesture = DrawingGesture::new();
        gesture
            .begin(GeoPoint::new(1.0, 1.0), &mut surface, &style())
            .unwrap();

        assert!(gesture
            .finish(GeoPoint::new(f64::INFINITY, 1.0), &mut surface)
            .is_err());
        assert!(!gesture.is_active());
        assert_eq!(surface.preview(), None);
    }

    #[test]
    fn test_update_without_anchor() {
        let mut surface = RecordingSurface::new();
        let mut gesture = DrawingGesture::new();
        assert!(matches!(
            gesture.update(GeoPoint::new(0.0, 0.0), &mut surface, &style()),
            Err(ZoneError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_abort_is_idempotent() {
        let mut surface = RecordingSurface::new();
        let mut gesture = DrawingGesture::new();
        gesture
            .begin(GeoPoint::new(1.0, 1.0), &mut surface, &style())
            .unwrap();

        gesture.abort(&mut surface);
        gesture.abort(&mut surface);

        let removals = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::RemovePreviewRectangle))
            .count();
        assert_eq!(removals, 1);
    }
}
