//! Projection de rendu: zone + sélection → style visuel

use serde::{Deserialize, Serialize};

use crate::zone::{Zone, ZoneId};

/// Style de tracé d'un rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStyle {
    pub stroke_color: String,
    pub stroke_weight: f32,
    pub fill: bool,
}

impl ZoneStyle {
    pub fn new(stroke_color: impl Into<String>, stroke_weight: f32, fill: bool) -> Self {
        Self {
            stroke_color: stroke_color.into(),
            stroke_weight,
            fill,
        }
    }
}

/// Jeu de styles utilisé par la projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePalette {
    /// Zone sélectionnée
    pub highlighted: ZoneStyle,
    /// Zone inactive
    pub inactive: ZoneStyle,
    /// Zone de type système (`auto_group`)
    pub group: ZoneStyle,
    pub default: ZoneStyle,
    /// Rectangle de prévisualisation pendant le tracé
    pub preview: ZoneStyle,
}

impl Default for StylePalette {
    fn default() -> Self {
        Self {
            highlighted: ZoneStyle::new("red", 3.0, true),
            inactive: ZoneStyle::new("gray", 1.0, true),
            group: ZoneStyle::new("purple", 2.0, false),
            default: ZoneStyle::new("blue", 2.0, true),
            preview: ZoneStyle::new("blue", 2.0, false),
        }
    }
}

impl StylePalette {
    /// Style d'une zone; la première règle qui s'applique gagne:
    /// sélection, puis inactivité, puis type système, puis défaut.
    pub fn style_of(&self, zone: &Zone, selected: Option<ZoneId>) -> &ZoneStyle {
        if selected == Some(zone.id) {
            &self.highlighted
        } else if !zone.active {
            &self.inactive
        } else if zone.zone_type.is_system_managed() {
            &self.group
        } else {
            &self.default
        }
    }
}

/// Projection avec la palette par défaut
pub fn style_of(zone: &Zone, selected: Option<ZoneId>) -> ZoneStyle {
    StylePalette::default().style_of(zone, selected).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::GeoBounds;
    use crate::zone::ZoneType;

    fn zone(id: u64, zone_type: ZoneType, active: bool) -> Zone {
        Zone {
            id: ZoneId::new(id),
            name: format!("z{id}"),
            zone_type,
            bounds: GeoBounds::from_corners((0.0, 0.0).into(), (1.0, 1.0).into()).unwrap(),
            active,
            is_creating: false,
            is_editing: false,
            members: Vec::new(),
        }
    }

    #[test]
    fn test_selection_overrides_everything() {
        let palette = StylePalette::default();
        let z = zone(1, ZoneType::AutoGroup, false);
        assert_eq!(palette.style_of(&z, Some(z.id)), &palette.highlighted);
    }

    #[test]
    fn test_inactive_before_group() {
        let palette = StylePalette::default();
        let z = zone(1, ZoneType::AutoGroup, false);
        assert_eq!(palette.style_of(&z, None), &palette.inactive);
        assert_eq!(palette.style_of(&z, Some(ZoneId::new(2))), &palette.inactive);
    }

    #[test]
    fn test_group_and_default() {
        let palette = StylePalette::default();
        let group = zone(1, ZoneType::AutoGroup, true);
        let plain = zone(2, ZoneType::Rain, true);

        let group_style = palette.style_of(&group, None);
        assert_eq!(group_style, &palette.group);
        assert!(!group_style.fill);

        assert_eq!(palette.style_of(&plain, None), &palette.default);
    }

    #[test]
    fn test_free_function_matches_default_palette() {
        let z = zone(3, ZoneType::Wind, true);
        assert_eq!(style_of(&z, Some(z.id)).stroke_color, "red");
        assert_eq!(style_of(&z, None).stroke_color, "blue");
    }

    #[test]
    fn test_partial_palette_deserialize() {
        let palette: StylePalette = serde_json::from_str(
            r#"{"highlighted":{"stroke_color":"orange","stroke_weight":4.0,"fill":true}}"#,
        )
        .unwrap();
        assert_eq!(palette.highlighted.stroke_color, "orange");
        assert_eq!(palette.default, StylePalette::default().default);
    }
}
