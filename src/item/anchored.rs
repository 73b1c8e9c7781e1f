//! Point-anchored rectangle geometry.
//!
//! An item is anchored either at a geographic position (the projected anchor
//! is then always derived through the projection) or directly at a projected
//! point. The rectangle is rebuilt from scratch on every [`recompute`] and is
//! never edited in place.
//!
//! [`recompute`]: AnchoredGeometry::recompute

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPos, ProjPoint, ProjRect, ProjSize};
use crate::projection::Projection;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Anchor {
    #[default]
    Unset,
    Geo(GeoPos),
    Proj(ProjPoint),
}

#[derive(Clone, Debug, Default)]
pub struct AnchoredGeometry {
    anchor: Anchor,
    size: ProjSize,
    working_anchor: Option<ProjPoint>,
    rect: ProjRect,
}

impl AnchoredGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// The size asked for by the owner, which may be empty.
    pub fn requested_size(&self) -> ProjSize {
        self.size
    }

    /// Replaces the anchor and size and invalidates the derived rectangle.
    /// The owner must call [`AnchoredGeometry::recompute`] afterwards.
    pub fn set(&mut self, anchor: Anchor, size: ProjSize) {
        self.anchor = anchor;
        self.size = size;
        self.working_anchor = None;
        self.rect = ProjRect::EMPTY;
    }

    pub fn set_geo(&mut self, geo: GeoPos, size: ProjSize) {
        self.set(Anchor::Geo(geo), size);
    }

    pub fn set_proj(&mut self, proj: ProjPoint, size: ProjSize) {
        self.set(Anchor::Proj(proj), size);
    }

    /// Moves the anchor while keeping the anchor kind and size.
    pub fn move_to(&mut self, pos: ProjPoint, projection: &dyn Projection) {
        self.anchor = match self.anchor {
            Anchor::Proj(_) => Anchor::Proj(pos),
            Anchor::Geo(_) | Anchor::Unset => {
                Anchor::Geo(projection.proj_to_geo(pos).normalized())
            }
        };
    }

    /// Rebuilds the rectangle. Without a projection nothing changes and
    /// `false` is returned; the rectangle stays as it was until the owner is
    /// attached to a map.
    pub fn recompute(
        &mut self,
        projection: Option<&dyn Projection>,
        natural_size: Option<ProjSize>,
    ) -> bool {
        let Some(projection) = projection else {
            return false;
        };

        let anchor = match self.anchor {
            Anchor::Geo(geo) => Some(projection.geo_to_proj(geo)),
            Anchor::Proj(proj) => Some(proj),
            Anchor::Unset => None,
        };
        self.working_anchor = anchor;

        let size = self.effective_size(natural_size);
        self.rect = match anchor {
            Some(center) => ProjRect::from_center_size(center, size),
            None => ProjRect::EMPTY,
        };
        true
    }

    /// Requested size when non-empty, else the image's natural size, else empty.
    pub fn effective_size(&self, natural_size: Option<ProjSize>) -> ProjSize {
        if !self.size.is_empty() {
            return self.size;
        }
        natural_size
            .filter(|s| !s.is_empty())
            .unwrap_or(ProjSize::EMPTY)
    }

    pub fn working_anchor(&self) -> Option<ProjPoint> {
        self.working_anchor
    }

    pub fn rect(&self) -> ProjRect {
        self.rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::WebMercator;

    const TOL: f64 = 1e-6;

    #[test]
    fn test_rect_centered_on_projected_anchor() {
        let geo = GeoPos::new(-23.556, -46.618);
        let mut geometry = AnchoredGeometry::new();
        geometry.set_geo(geo, ProjSize::new(32.0, 32.0));
        assert!(geometry.recompute(Some(&WebMercator), None));

        let center = WebMercator.geo_to_proj(geo);
        let rect = geometry.rect();
        assert!((rect.width() - 32.0).abs() < TOL);
        assert!((rect.height() - 32.0).abs() < TOL);
        assert!(rect.center().distance(center) < TOL);
        assert_eq!(geometry.working_anchor(), Some(center));
    }

    #[test]
    fn test_recompute_without_projection_is_noop() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_geo(GeoPos::new(10.0, 10.0), ProjSize::new(8.0, 8.0));
        assert!(!geometry.recompute(None, None));
        assert_eq!(geometry.rect(), ProjRect::EMPTY);
        assert_eq!(geometry.working_anchor(), None);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_geo(GeoPos::new(48.85, 2.35), ProjSize::new(20.0, 10.0));
        geometry.recompute(Some(&WebMercator), None);
        let first = geometry.rect();
        geometry.recompute(Some(&WebMercator), None);
        assert_eq!(geometry.rect(), first);
    }

    #[test]
    fn test_proj_anchor_used_directly() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_proj(ProjPoint::new(100.0, 200.0), ProjSize::new(10.0, 4.0));
        geometry.recompute(Some(&WebMercator), None);
        assert_eq!(geometry.rect().min, ProjPoint::new(95.0, 198.0));
        assert_eq!(geometry.rect().max, ProjPoint::new(105.0, 202.0));
    }

    #[test]
    fn test_set_proj_clears_geo_anchor() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_geo(GeoPos::new(1.0, 1.0), ProjSize::new(1.0, 1.0));
        geometry.set_proj(ProjPoint::new(3.0, 4.0), ProjSize::new(1.0, 1.0));
        assert_eq!(geometry.anchor(), Anchor::Proj(ProjPoint::new(3.0, 4.0)));
    }

    #[test]
    fn test_empty_size_falls_back_to_natural_size() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_proj(ProjPoint::ZERO, ProjSize::EMPTY);
        geometry.recompute(Some(&WebMercator), Some(ProjSize::new(24.0, 12.0)));
        assert_eq!(geometry.rect().size(), ProjSize::new(24.0, 12.0));
    }

    #[test]
    fn test_no_size_and_no_image_gives_empty_rect() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_proj(ProjPoint::new(5.0, 5.0), ProjSize::new(0.0, -3.0));
        assert!(geometry.recompute(Some(&WebMercator), None));
        assert!(geometry.rect().is_empty());
    }

    #[test]
    fn test_move_keeps_anchor_kind() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_proj(ProjPoint::ZERO, ProjSize::new(2.0, 2.0));
        geometry.move_to(ProjPoint::new(7.0, 8.0), &WebMercator);
        assert_eq!(geometry.anchor(), Anchor::Proj(ProjPoint::new(7.0, 8.0)));

        geometry.set_geo(GeoPos::new(0.0, 0.0), ProjSize::new(2.0, 2.0));
        let target = WebMercator.geo_to_proj(GeoPos::new(1.0, 2.0));
        geometry.move_to(target, &WebMercator);
        match geometry.anchor() {
            Anchor::Geo(geo) => {
                assert!((geo.lat - 1.0).abs() < 1e-9);
                assert!((geo.lon - 2.0).abs() < 1e-9);
            }
            other => panic!("expected geo anchor, got {:?}", other),
        }
    }

    #[test]
    fn test_move_past_antimeridian_keeps_valid_longitude() {
        let mut geometry = AnchoredGeometry::new();
        geometry.set_geo(GeoPos::new(0.0, 179.0), ProjSize::new(2.0, 2.0));
        let east = WebMercator.geo_to_proj(GeoPos::new(0.0, 179.0)) + ProjPoint::new(300_000.0, 0.0);
        geometry.move_to(east, &WebMercator);
        let Anchor::Geo(geo) = geometry.anchor() else {
            panic!("expected geo anchor");
        };
        assert!(GeoPos::try_new(geo.lat, geo.lon).is_ok());
        assert!(geo.lon < -170.0);
    }
}
