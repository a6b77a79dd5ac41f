//! Registre des zones
//!
//! Le registre possède toutes les zones (par valeur, indexées par identifiant)
//! et attribue les identifiants. Il n'a aucune notion de sélection: c'est la
//! session qui la porte.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::bounds::GeoBounds;
use crate::zone::{Zone, ZoneId, ZoneType};
use crate::ZoneError;

/// Préfixe par défaut du nom des nouvelles zones
pub const DEFAULT_NAME_PREFIX: &str = "Zone";

/// Stockage en mémoire des zones
#[derive(Debug)]
pub struct ZoneRegistry {
    zones: HashMap<ZoneId, Zone>,
    next_id: u64,
    name_prefix: String,
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_PREFIX)
    }
}

impl ZoneRegistry {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            zones: HashMap::new(),
            next_id: 0,
            name_prefix: name_prefix.into(),
        }
    }

    fn allocate_id(&mut self) -> ZoneId {
        self.next_id += 1;
        ZoneId::new(self.next_id)
    }

    /// Insère une zone provisoire (`is_creating = true`) et retourne son identifiant.
    ///
    /// # Errors
    ///
    /// `ZoneError::InvalidGeometry` si les bornes contiennent une coordonnée non finie.
    pub fn create(&mut self, bounds: GeoBounds) -> Result<ZoneId, ZoneError> {
        if !bounds.southwest().is_finite() || !bounds.northeast().is_finite() {
            return Err(ZoneError::invalid_geometry("non-finite bounds"));
        }

        let id = self.allocate_id();
        let zone = Zone {
            id,
            name: format!("{} {}", self.name_prefix, id),
            zone_type: ZoneType::default(),
            bounds,
            active: true,
            is_creating: true,
            is_editing: false,
            members: Vec::new(),
        };
        self.zones.insert(id, zone);

        debug!(zone = %id, "Provisional zone created");
        Ok(id)
    }

    /// Crée une zone `auto_group` englobant les zones membres.
    ///
    /// La zone est créée validée (ni provisoire, ni en édition).
    pub fn create_group(
        &mut self,
        name: impl Into<String>,
        members: &[ZoneId],
    ) -> Result<ZoneId, ZoneError> {
        let mut bounds: Option<GeoBounds> = None;
        for member in members {
            let zone = self.zones.get(member).ok_or(ZoneError::NotFound(*member))?;
            bounds = Some(match bounds {
                Some(acc) => acc.union(&zone.bounds),
                None => zone.bounds,
            });
        }
        let Some(bounds) = bounds else {
            return Err(ZoneError::invalid_geometry("group has no member"));
        };

        let id = self.allocate_id();
        let mut members = members.to_vec();
        members.sort();
        members.dedup();

        self.zones.insert(
            id,
            Zone {
                id,
                name: name.into(),
                zone_type: ZoneType::AutoGroup,
                bounds,
                active: true,
                is_creating: false,
                is_editing: false,
                members,
            },
        );

        debug!(zone = %id, "Group zone created");
        Ok(id)
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn contains(&self, id: ZoneId) -> bool {
        self.zones.contains_key(&id)
    }

    /// Applique nom et type, et sort la zone de tout état transitoire
    pub fn update(
        &mut self,
        id: ZoneId,
        name: impl Into<String>,
        zone_type: ZoneType,
    ) -> Result<(), ZoneError> {
        let zone = self.zones.get_mut(&id).ok_or(ZoneError::NotFound(id))?;
        zone.name = name.into();
        zone.zone_type = zone_type;
        zone.is_creating = false;
        zone.is_editing = false;

        trace!(zone = %id, name = %zone.name, zone_type = %zone_type, "Zone updated");
        Ok(())
    }

    pub fn set_editing(&mut self, id: ZoneId, editing: bool) -> Result<(), ZoneError> {
        let zone = self.zones.get_mut(&id).ok_or(ZoneError::NotFound(id))?;
        zone.is_editing = editing;
        Ok(())
    }

    pub fn set_active(&mut self, id: ZoneId, active: bool) -> Result<(), ZoneError> {
        let zone = self.zones.get_mut(&id).ok_or(ZoneError::NotFound(id))?;
        zone.active = active;
        Ok(())
    }

    /// Supprime une zone et la retire des groupes qui la référencent
    pub fn delete(&mut self, id: ZoneId) -> Result<Zone, ZoneError> {
        let removed = self.zones.remove(&id).ok_or(ZoneError::NotFound(id))?;

        for zone in self.zones.values_mut() {
            zone.members.retain(|m| *m != id);
        }

        debug!(zone = %id, "Zone deleted");
        Ok(removed)
    }

    /// Instantané en lecture seule, trié par identifiant
    pub fn list(&self) -> Vec<&Zone> {
        let mut zones: Vec<&Zone> = self.zones.values().collect();
        zones.sort_by_key(|z| z.id);
        zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
