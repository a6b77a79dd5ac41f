//! Machine à états d'interaction
//!
//! La session possède le registre, la surface et l'état transitoire exclusif
//! (création, tracé, validation en attente, édition). Elle garantit qu'au plus
//! une zone est en création ou en édition, et que la navigation de la carte est
//! rétablie sur tous les chemins de sortie du mode création.

use std::mem;

use tracing::{debug, info, warn};

use crate::bounds::{GeoBounds, GeoPoint};
use crate::gesture::DrawingGesture;
use crate::registry::{ZoneRegistry, DEFAULT_NAME_PREFIX};
use crate::style::{StylePalette, ZoneStyle};
use crate::surface::{MapSurface, SurfaceEvent};
use crate::threshold::{self, Sample, Thresholds};
use crate::zone::{Zone, ZoneId, ZoneType};
use crate::ZoneError;

/// Marge par défaut pour le recadrage (pixels)
pub const DEFAULT_FIT_PADDING: f64 = 20.0;

/// Options de la session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Préfixe du nom par défaut des nouvelles zones
    pub name_prefix: String,
    /// Marge passée à `fit_viewport_to`
    pub fit_padding: f64,
    /// Accepter les zones de surface nulle (relâchement sur l'ancre)
    pub allow_degenerate: bool,
    pub palette: StylePalette,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            fit_padding: DEFAULT_FIT_PADDING,
            allow_degenerate: true,
            palette: StylePalette::default(),
        }
    }
}

/// Valeurs saisies dans le formulaire de détail, non encore enregistrées
#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    pub name: String,
    pub zone_type: ZoneType,
}

impl EditBuffer {
    fn from_zone(zone: &Zone) -> Self {
        Self {
            name: zone.name.clone(),
            zone_type: zone.zone_type,
        }
    }
}

/// État d'interaction courant
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Mode création activé, aucun geste commencé
    ArmedForCreation,
    /// Geste de tracé en cours
    Dragging { anchor: GeoPoint },
    /// Zone provisoire créée, en attente de validation ou d'annulation
    PendingAccept { zone: ZoneId, buffer: EditBuffer },
    /// Zone existante en cours d'édition
    Editing { zone: ZoneId, buffer: EditBuffer },
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::ArmedForCreation => "armed_for_creation",
            InteractionState::Dragging { .. } => "dragging",
            InteractionState::PendingAccept { .. } => "pending_accept",
            InteractionState::Editing { .. } => "editing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Mode création (la navigation de la carte est suspendue)
    pub fn is_creating(&self) -> bool {
        matches!(
            self,
            InteractionState::ArmedForCreation | InteractionState::Dragging { .. }
        )
    }

    /// Zone en création ou en édition, s'il y en a une
    pub fn pending_zone(&self) -> Option<ZoneId> {
        match self {
            InteractionState::PendingAccept { zone, .. } | InteractionState::Editing { zone, .. } => {
                Some(*zone)
            }
            _ => None,
        }
    }

    fn buffer(&self) -> Option<&EditBuffer> {
        match self {
            InteractionState::PendingAccept { buffer, .. }
            | InteractionState::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }
}

/// Session d'édition de zones liée à une surface cartographique
pub struct Session<S: MapSurface> {
    registry: ZoneRegistry,
    state: InteractionState,
    selected: Option<ZoneId>,
    gesture: DrawingGesture,
    surface: S,
    options: SessionOptions,
    navigation_suspended: bool,
    pending_fit: Option<GeoBounds>,
}

impl<S: MapSurface> Session<S> {
    pub fn new(surface: S) -> Self {
        Self::with_options(surface, SessionOptions::default())
    }

    pub fn with_options(surface: S, options: SessionOptions) -> Self {
        Self {
            registry: ZoneRegistry::new(options.name_prefix.clone()),
            state: InteractionState::Idle,
            selected: None,
            gesture: DrawingGesture::new(),
            surface,
            options,
            navigation_suspended: false,
            pending_fit: None,
        }
    }

    // ------------------------------------------------------------------
    // Requêtes
    // ------------------------------------------------------------------

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn list_zones(&self) -> Vec<&Zone> {
        self.registry.list()
    }

    pub fn selected_id(&self) -> Option<ZoneId> {
        self.selected
    }

    pub fn selected_zone(&self) -> Option<&Zone> {
        self.selected.and_then(|id| self.registry.get(id))
    }

    /// Saisie en cours (zone provisoire ou en édition)
    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.state.buffer()
    }

    /// Style courant d'une zone, sélection comprise
    pub fn style_of(&self, zone: &Zone) -> &ZoneStyle {
        self.options.palette.style_of(zone, self.selected)
    }

    /// Vrai si au plus une zone est en création ou en édition, et si la zone
    /// provisoire est bien la zone sélectionnée.
    pub fn invariants_hold(&self) -> bool {
        let zones = self.registry.list();
        let pending = zones.iter().filter(|z| z.is_pending()).count();
        let creating_selected = zones
            .iter()
            .filter(|z| z.is_creating)
            .all(|z| self.selected == Some(z.id));
        pending <= 1 && creating_selected
    }

    // ------------------------------------------------------------------
    // Mode création
    // ------------------------------------------------------------------

    /// Active le mode création. Refusé (sans effet) si une création ou une
    /// édition est déjà en cours.
    pub fn start_creation(&mut self) -> bool {
        if !self.state.is_idle() {
            debug!(state = self.state.name(), "start_creation refused");
            return false;
        }

        self.state = InteractionState::ArmedForCreation;
        self.suspend_navigation();
        info!("Creation mode armed");
        true
    }

    /// Désactive le mode création avant la fin d'un geste
    pub fn stop_creation(&mut self) -> bool {
        if !self.state.is_creating() {
            debug!(state = self.state.name(), "stop_creation ignored");
            return false;
        }

        self.abort_creation();
        info!("Creation mode disarmed");
        true
    }

    /// Traite un événement de la surface
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<(), ZoneError> {
        match event {
            SurfaceEvent::PointerDown(point) => self.on_pointer_down(point),
            SurfaceEvent::PointerMove(point) => self.on_pointer_move(point),
            SurfaceEvent::PointerUp(point) => self.on_pointer_up(point),
            SurfaceEvent::PointerCaptureLost => {
                if matches!(self.state, InteractionState::Dragging { .. }) {
                    warn!("Pointer capture lost during gesture, aborting");
                    self.abort_creation();
                }
                Ok(())
            }
            SurfaceEvent::ShapeClicked(id) => {
                if let Err(e) = self.select_zone(id) {
                    warn!(zone = %id, "Shape click ignored: {}", e);
                }
                Ok(())
            }
        }
    }

    fn on_pointer_down(&mut self, point: GeoPoint) -> Result<(), ZoneError> {
        if !matches!(self.state, InteractionState::ArmedForCreation) {
            return Ok(());
        }

        match self
            .gesture
            .begin(point, &mut self.surface, &self.options.palette.preview)
        {
            Ok(_) => {
                self.state = InteractionState::Dragging { anchor: point };
                Ok(())
            }
            Err(e) => {
                warn!("Gesture aborted on pointer down: {}", e);
                self.abort_creation();
                Err(e)
            }
        }
    }

    fn on_pointer_move(&mut self, point: GeoPoint) -> Result<(), ZoneError> {
        if !matches!(self.state, InteractionState::Dragging { .. }) {
            return Ok(());
        }

        if let Err(e) = self
            .gesture
            .update(point, &mut self.surface, &self.options.palette.preview)
        {
            warn!("Gesture aborted on pointer move: {}", e);
            self.abort_creation();
            return Err(e);
        }
        Ok(())
    }

    fn on_pointer_up(&mut self, point: GeoPoint) -> Result<(), ZoneError> {
        if !matches!(self.state, InteractionState::Dragging { .. }) {
            return Ok(());
        }

        let created = self
            .gesture
            .finish(point, &mut self.surface)
            .and_then(|bounds| {
                if bounds.is_degenerate() && !self.options.allow_degenerate {
                    Err(ZoneError::invalid_geometry("zero-area zone rejected"))
                } else {
                    self.registry.create(bounds)
                }
            });

        let id = match created {
            Ok(id) => id,
            Err(e) => {
                warn!("Gesture aborted on pointer up: {}", e);
                self.abort_creation();
                return Err(e);
            }
        };

        self.release_navigation();

        let buffer = match self.registry.get(id) {
            Some(zone) => EditBuffer::from_zone(zone),
            None => return Err(ZoneError::NotFound(id)),
        };
        self.state = InteractionState::PendingAccept { zone: id, buffer };
        self.set_selection(Some(id));

        info!(zone = %id, "Zone drawn, awaiting accept");
        Ok(())
    }

    /// Sortie anormale ou volontaire du mode création: retour à `Idle`
    fn abort_creation(&mut self) {
        self.gesture.abort(&mut self.surface);
        self.release_navigation();
        self.state = InteractionState::Idle;
    }

    fn suspend_navigation(&mut self) {
        if !self.navigation_suspended {
            self.surface.disable_navigation();
            self.navigation_suspended = true;
        }
    }

    /// Rétablit la navigation sans condition
    fn release_navigation(&mut self) {
        self.surface.enable_navigation();
        self.navigation_suspended = false;
    }

    // ------------------------------------------------------------------
    // Sélection et édition
    // ------------------------------------------------------------------

    /// Sélectionne une zone. Refusé en mode création ou si une autre zone est
    /// en attente de validation ou en édition.
    pub fn select_zone(&mut self, id: ZoneId) -> Result<bool, ZoneError> {
        if !self.registry.contains(id) {
            return Err(ZoneError::NotFound(id));
        }

        match &self.state {
            InteractionState::ArmedForCreation | InteractionState::Dragging { .. } => {
                debug!(zone = %id, "select refused in creation mode");
                return Ok(false);
            }
            InteractionState::PendingAccept { zone, .. } | InteractionState::Editing { zone, .. }
                if *zone != id =>
            {
                debug!(zone = %id, pending = %zone, "select refused, another zone is pending");
                return Ok(false);
            }
            _ => {}
        }

        self.set_selection(Some(id));
        Ok(true)
    }

    /// Passe la zone en édition (et la sélectionne). Refusé si une création
    /// ou une édition est déjà en cours.
    pub fn start_edit(&mut self, id: ZoneId) -> Result<bool, ZoneError> {
        let buffer = match self.registry.get(id) {
            Some(zone) => EditBuffer::from_zone(zone),
            None => return Err(ZoneError::NotFound(id)),
        };

        if !self.state.is_idle() {
            debug!(zone = %id, state = self.state.name(), "start_edit refused");
            return Ok(false);
        }
        // L'état dit Idle, mais on ne fait pas confiance aux drapeaux du registre
        if self.registry.list().iter().any(|z| z.is_pending()) {
            warn!(zone = %id, "start_edit refused, registry holds a pending zone");
            return Ok(false);
        }

        self.registry.set_editing(id, true)?;
        self.state = InteractionState::Editing { zone: id, buffer };
        self.set_selection(Some(id));

        info!(zone = %id, "Editing zone");
        Ok(true)
    }

    /// Met à jour la saisie en cours sans toucher au registre
    pub fn set_edit_buffer(
        &mut self,
        name: impl Into<String>,
        zone_type: ZoneType,
    ) -> Result<(), ZoneError> {
        match &mut self.state {
            InteractionState::PendingAccept { buffer, .. }
            | InteractionState::Editing { buffer, .. } => {
                buffer.name = name.into();
                buffer.zone_type = zone_type;
                Ok(())
            }
            other => Err(ZoneError::invariant(format!(
                "no zone is being edited (state: {})",
                other.name()
            ))),
        }
    }

    /// Valide la zone provisoire ou l'édition en cours
    pub fn save_edit(
        &mut self,
        id: ZoneId,
        name: impl Into<String>,
        zone_type: ZoneType,
    ) -> Result<(), ZoneError> {
        if !self.registry.contains(id) {
            self.drop_stale(id);
            return Err(ZoneError::NotFound(id));
        }
        if self.state.pending_zone() != Some(id) {
            return Err(ZoneError::invariant(format!(
                "zone {} is not being created or edited",
                id
            )));
        }

        let Some(current) = self.registry.get(id).map(|z| z.zone_type) else {
            self.drop_stale(id);
            return Err(ZoneError::NotFound(id));
        };
        if zone_type != current && (zone_type.is_system_managed() || current.is_system_managed())
        {
            return Err(ZoneError::SystemManagedType(id));
        }

        let name = name.into();
        if let Err(e) = self.registry.update(id, name.clone(), zone_type) {
            self.drop_stale(id);
            return Err(e);
        }

        self.state = InteractionState::Idle;
        self.render_zone(id);

        info!(zone = %id, name = %name, zone_type = %zone_type, "Zone saved");
        Ok(())
    }

    /// Annule la zone provisoire (supprimée) ou l'édition en cours (inchangée)
    pub fn cancel_edit(&mut self, id: ZoneId) -> Result<(), ZoneError> {
        if !self.registry.contains(id) {
            self.drop_stale(id);
            return Err(ZoneError::NotFound(id));
        }
        if self.state.pending_zone() != Some(id) {
            return Err(ZoneError::invariant(format!(
                "zone {} is not being created or edited",
                id
            )));
        }

        let previous = mem::take(&mut self.state);
        let result = match previous {
            InteractionState::PendingAccept { .. } => self.registry.delete(id).map(|_| {
                self.surface.remove_zone_shape(id);
                if self.selected == Some(id) {
                    self.selected = None;
                }
                info!(zone = %id, "Provisional zone discarded");
            }),
            _ => self.registry.set_editing(id, false).map(|_| {
                self.render_zone(id);
                info!(zone = %id, "Edit cancelled");
            }),
        };

        if result.is_err() {
            self.drop_stale(id);
        }
        result
    }

    /// Supprime une zone; si elle était en attente ou en édition, la session
    /// revient à `Idle`.
    pub fn delete_zone(&mut self, id: ZoneId) -> Result<(), ZoneError> {
        if self.state.pending_zone() == Some(id) {
            self.state = InteractionState::Idle;
        }

        let result = self.registry.delete(id);
        if self.selected == Some(id) {
            self.selected = None;
        }

        match result {
            Ok(_) => {
                self.surface.remove_zone_shape(id);
                info!(zone = %id, "Zone deleted");
                Ok(())
            }
            Err(e) => {
                debug!(zone = %id, "delete on stale zone");
                Err(e)
            }
        }
    }

    /// Référence obsolète: on l'oublie et on revient à `Idle`
    fn drop_stale(&mut self, id: ZoneId) {
        warn!(zone = %id, "Stale zone reference dropped");
        if self.state.pending_zone() == Some(id) {
            self.state = InteractionState::Idle;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    // ------------------------------------------------------------------
    // Recadrage, activité, groupes
    // ------------------------------------------------------------------

    /// Demande un recadrage unique sur la zone. Chaque appel redéclenche le
    /// recadrage; une zone inconnue n'émet rien.
    pub fn request_localize(&mut self, id: ZoneId) -> bool {
        let Some(zone) = self.registry.get(id) else {
            debug!(zone = %id, "localize on unknown zone");
            return false;
        };

        self.pending_fit = Some(zone.bounds);
        self.flush_localize();
        true
    }

    fn flush_localize(&mut self) {
        if let Some(bounds) = self.pending_fit.take() {
            self.surface
                .fit_viewport_to(bounds, self.options.fit_padding);
        }
    }

    pub fn set_zone_active(&mut self, id: ZoneId, active: bool) -> Result<(), ZoneError> {
        self.registry.set_active(id, active)?;
        self.render_zone(id);
        Ok(())
    }

    /// Dérive l'activité d'une zone à partir d'un échantillon de mesures
    pub fn apply_thresholds(
        &mut self,
        id: ZoneId,
        sample: &Sample,
        thresholds: &Thresholds,
    ) -> Result<bool, ZoneError> {
        let active = threshold::evaluate(sample, thresholds);
        self.set_zone_active(id, active)?;
        debug!(zone = %id, active, "Thresholds evaluated");
        Ok(active)
    }

    /// Crée une zone `auto_group` englobant des zones existantes
    pub fn create_group(
        &mut self,
        name: impl Into<String>,
        members: &[ZoneId],
    ) -> Result<ZoneId, ZoneError> {
        if !self.state.is_idle() {
            return Err(ZoneError::invariant(format!(
                "cannot group zones while {}",
                self.state.name()
            )));
        }

        let id = self.registry.create_group(name, members)?;
        self.render_zone(id);
        info!(zone = %id, members = members.len(), "Group zone created");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Rendu
    // ------------------------------------------------------------------

    fn set_selection(&mut self, selected: Option<ZoneId>) {
        let previous = mem::replace(&mut self.selected, selected);
        if previous == selected {
            return;
        }
        if let Some(prev) = previous {
            self.render_zone(prev);
        }
        if let Some(next) = selected {
            self.render_zone(next);
        }
    }

    fn render_zone(&mut self, id: ZoneId) {
        if let Some(zone) = self.registry.get(id) {
            let style = self.options.palette.style_of(zone, self.selected);
            self.surface.render_zone_shape(id, zone.bounds, style);
        }
    }

    /// Redessine toutes les zones avec leur style courant
    pub fn render_all(&mut self) {
        for zone in self.registry.list() {
            let style = self.options.palette.style_of(zone, self.selected);
            self.surface.render_zone_shape(zone.id, zone.bounds, style);
        }
    }
}

impl<S: MapSurface> Drop for Session<S> {
    fn drop(&mut self) {
        if self.navigation_suspended || self.gesture.is_active() {
            self.gesture.abort(&mut self.surface);
            self.surface.enable_navigation();
            self.navigation_suspended = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceCommand};

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    fn draw(session: &mut Session<RecordingSurface>, a: GeoPoint, b: GeoPoint) -> ZoneId {
        assert!(session.start_creation());
        session.handle_event(SurfaceEvent::PointerDown(a)).unwrap();
        session.handle_event(SurfaceEvent::PointerMove(b)).unwrap();
        session.handle_event(SurfaceEvent::PointerUp(b)).unwrap();
        session.state().pending_zone().unwrap()
    }

    #[test]
    fn test_state_names() {
        assert_eq!(InteractionState::Idle.name(), "idle");
        assert!(InteractionState::ArmedForCreation.is_creating());
        assert_eq!(InteractionState::ArmedForCreation.pending_zone(), None);
    }

    #[test]
    fn test_pointer_events_ignored_when_idle() {
        let mut session = Session::new(RecordingSurface::new());
        session
            .handle_event(SurfaceEvent::PointerDown(p(1.0, 1.0)))
            .unwrap();
        session
            .handle_event(SurfaceEvent::PointerUp(p(2.0, 2.0)))
            .unwrap();

        assert!(session.state().is_idle());
        assert!(session.list_zones().is_empty());
        assert!(session.surface().commands().is_empty());
    }

    #[test]
    fn test_drawn_zone_is_selected_and_highlighted() {
        let mut session = Session::new(RecordingSurface::new());
        let id = draw(&mut session, p(51.5, -0.1), p(51.51, -0.08));

        assert_eq!(session.selected_id(), Some(id));
        let zone = session.selected_zone().unwrap();
        assert!(zone.is_creating);
        assert_eq!(session.style_of(zone).stroke_color, "red");
        assert_eq!(
            session.edit_buffer().map(|b| b.name.clone()),
            Some(format!("Zone {}", id))
        );
        assert!(session.surface().navigation_enabled());
        assert!(session.invariants_hold());
    }

    #[test]
    fn test_pending_fit_cleared_after_flush() {
        let mut session = Session::new(RecordingSurface::new());
        let id = draw(&mut session, p(0.0, 0.0), p(1.0, 1.0));
        assert!(session.request_localize(id));
        assert!(session.pending_fit.is_none());
    }

    #[test]
    fn test_drop_releases_navigation_mid_gesture() {
        let mut surface = RecordingSurface::new();
        {
            let mut session = Session::new(&mut surface);
            session.start_creation();
            session
                .handle_event(SurfaceEvent::PointerDown(p(1.0, 1.0)))
                .unwrap();
        }

        assert!(surface.navigation_enabled());
        assert_eq!(surface.preview(), None);
    }

    #[test]
    fn test_drop_when_idle_emits_nothing() {
        let mut surface = RecordingSurface::new();
        drop(Session::new(&mut surface));
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_set_edit_buffer_requires_pending_zone() {
        let mut session = Session::new(RecordingSurface::new());
        assert!(matches!(
            session.set_edit_buffer("x", ZoneType::Rain),
            Err(ZoneError::InvariantViolation(_))
        ));

        let id = draw(&mut session, p(0.0, 0.0), p(1.0, 1.0));
        session.set_edit_buffer("Draft", ZoneType::Rain).unwrap();
        assert_eq!(session.edit_buffer().unwrap().name, "Draft");
        // Le registre n'est pas modifié par la saisie
        assert_eq!(
            session.registry().get(id).unwrap().zone_type,
            ZoneType::Empty
        );
    }

    #[test]
    fn test_render_all_emits_one_shape_per_zone() {
        let mut session = Session::new(RecordingSurface::new());
        let a = draw(&mut session, p(0.0, 0.0), p(1.0, 1.0));
        session.save_edit(a, "A", ZoneType::Wind).unwrap();
        let b = draw(&mut session, p(2.0, 2.0), p(3.0, 3.0));
        session.save_edit(b, "B", ZoneType::Rain).unwrap();

        session.surface_mut().drain();
        session.render_all();
        let shapes = session
            .surface()
            .commands()
            .iter()
            .filter(|c| matches!(c, SurfaceCommand::RenderZoneShape { .. }))
            .count();
        assert_eq!(shapes, 2);
    }
}
