//! Rectangles géographiques (coin sud-ouest / coin nord-est)
//!
//! Un `GeoBounds` est toujours normalisé: quel que soit l'ordre des deux coins
//! fournis, `southwest` porte le minimum et `northeast` le maximum sur chaque axe.

use geo::{coord, Coord, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::ZoneError;

/// Point géographique en degrés décimaux
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Vrai si les deux composantes sont finies (ni NaN ni infini)
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    fn ensure_finite(&self) -> Result<(), ZoneError> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(ZoneError::invalid_geometry(format!(
                "non-finite coordinate ({}, {})",
                self.lat, self.lng
            )))
        }
    }

    /// Coordonnée `geo` (x = longitude, y = latitude)
    pub fn to_coord(self) -> Coord {
        coord! { x: self.lng, y: self.lat }
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Rectangle aligné sur les axes, défini par ses coins SW et NE
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    southwest: GeoPoint,
    northeast: GeoPoint,
}

impl GeoBounds {
    /// Construit un rectangle à partir de deux coins opposés quelconques.
    ///
    /// # Errors
    ///
    /// Retourne `ZoneError::InvalidGeometry` si une coordonnée n'est pas finie.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Result<Self, ZoneError> {
        a.ensure_finite()?;
        b.ensure_finite()?;

        Ok(Self {
            southwest: GeoPoint::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            northeast: GeoPoint::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        })
    }

    /// Rectangle de surface nulle centré sur un point
    pub fn point(p: GeoPoint) -> Result<Self, ZoneError> {
        Self::from_corners(p, p)
    }

    pub fn southwest(&self) -> GeoPoint {
        self.southwest
    }

    pub fn northeast(&self) -> GeoPoint {
        self.northeast
    }

    pub fn northwest(&self) -> GeoPoint {
        GeoPoint::new(self.northeast.lat, self.southwest.lng)
    }

    pub fn southeast(&self) -> GeoPoint {
        GeoPoint::new(self.southwest.lat, self.northeast.lng)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.southwest.lat + self.northeast.lat) / 2.0,
            (self.southwest.lng + self.northeast.lng) / 2.0,
        )
    }

    /// Étendue en longitude (degrés)
    pub fn width_deg(&self) -> f64 {
        self.northeast.lng - self.southwest.lng
    }

    /// Étendue en latitude (degrés)
    pub fn height_deg(&self) -> f64 {
        self.northeast.lat - self.southwest.lat
    }

    /// Vrai si le rectangle a une largeur ou une hauteur nulle
    pub fn is_degenerate(&self) -> bool {
        self.width_deg() == 0.0 || self.height_deg() == 0.0
    }

    /// Test d'inclusion, bords compris
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.southwest.lat
            && p.lat <= self.northeast.lat
            && p.lng >= self.southwest.lng
            && p.lng <= self.northeast.lng
    }

    /// Plus petit rectangle englobant les deux rectangles
    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds {
            southwest: GeoPoint::new(
                self.southwest.lat.min(other.southwest.lat),
                self.southwest.lng.min(other.southwest.lng),
            ),
            northeast: GeoPoint::new(
                self.northeast.lat.max(other.northeast.lat),
                self.northeast.lng.max(other.northeast.lng),
            ),
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.southwest.to_coord(), self.northeast.to_coord())
    }

    /// Polygone fermé SW → SE → NE → NW → SW (ordre lng/lat)
    pub fn to_polygon(&self) -> Polygon {
        let ring = vec![
            self.southwest.to_coord(),
            self.southeast().to_coord(),
            self.northeast.to_coord(),
            self.northwest().to_coord(),
            self.southwest.to_coord(),
        ];
        Polygon::new(ring.into(), vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    #[test]
    fn test_from_corners_normalizes_every_direction() {
        let a = p(51.500, -0.100);
        let b = p(51.510, -0.080);
        let expected = GeoBounds::from_corners(a, b).unwrap();

        // NE->SW, NW->SE, SE->NW
        let reversed = GeoBounds::from_corners(b, a).unwrap();
        let nw_se = GeoBounds::from_corners(p(51.510, -0.100), p(51.500, -0.080)).unwrap();
        let se_nw = GeoBounds::from_corners(p(51.500, -0.080), p(51.510, -0.100)).unwrap();

        assert_eq!(expected.southwest(), p(51.500, -0.100));
        assert_eq!(expected.northeast(), p(51.510, -0.080));
        assert_eq!(reversed, expected);
        assert_eq!(nw_se, expected);
        assert_eq!(se_nw, expected);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = GeoBounds::from_corners(p(f64::NAN, 0.0), p(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, ZoneError::InvalidGeometry { .. }));

        assert!(GeoBounds::from_corners(p(0.0, 0.0), p(1.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_derived_corners() {
        let b = GeoBounds::from_corners(p(10.0, 20.0), p(12.0, 25.0)).unwrap();
        assert_eq!(b.northwest(), p(12.0, 20.0));
        assert_eq!(b.southeast(), p(10.0, 25.0));
        assert_eq!(b.center(), p(11.0, 22.5));
        assert_eq!(b.width_deg(), 5.0);
        assert_eq!(b.height_deg(), 2.0);
    }

    #[test]
    fn test_zero_area_is_valid() {
        let b = GeoBounds::point(p(51.5, -0.1)).unwrap();
        assert!(b.is_degenerate());
        assert_eq!(b.southwest(), b.northeast());
        assert!(b.contains(p(51.5, -0.1)));

        // Conversion en polygone sans panique
        let poly = b.to_polygon();
        assert_eq!(poly.exterior().0.len(), 5);
    }

    #[test]
    fn test_union() {
        let a = GeoBounds::from_corners(p(0.0, 0.0), p(1.0, 1.0)).unwrap();
        let b = GeoBounds::from_corners(p(-1.0, 0.5), p(0.5, 3.0)).unwrap();
        let u = a.union(&b);
        assert_eq!(u.southwest(), p(-1.0, 0.0));
        assert_eq!(u.northeast(), p(1.0, 3.0));
    }

    #[test]
    fn test_to_rect_uses_lng_as_x() {
        let b = GeoBounds::from_corners(p(51.5, -0.1), p(51.51, -0.08)).unwrap();
        let rect = b.to_rect();
        assert_eq!(rect.min().x, -0.1);
        assert_eq!(rect.min().y, 51.5);
        assert_eq!(rect.max().x, -0.08);
    }
}
