//! Projected space ↔ screen space.

use egui::{Pos2, Rect, Vec2};

use crate::geo::{ProjPoint, ProjRect};

/// How a single item's geometry is placed on screen on top of the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemTransform {
    /// Rotation and unscaled geometry are applied around this point
    pub anchor: ProjPoint,
    /// Clockwise rotation in degrees
    pub azimuth_deg: f64,
    /// Geometry offsets from the anchor are screen pixels, not projected units
    pub ignore_scale: bool,
}

#[derive(Clone, Debug)]
pub struct Camera {
    center: ProjPoint,
    /// Screen pixels per projected unit
    scale: f64,
    viewport: Rect,
    min_scale: f64,
    max_scale: f64,
}

impl Camera {
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        Self {
            center: ProjPoint::ZERO,
            scale: min_scale,
            viewport: Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0)),
            min_scale,
            max_scale,
        }
    }

    pub fn center(&self) -> ProjPoint {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn set_center(&mut self, center: ProjPoint) {
        self.center = center;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.max(self.min_scale).min(self.max_scale);
    }

    /// Convert projected coords to screen-space
    pub fn to_screen(&self, p: ProjPoint) -> Pos2 {
        let vc = self.viewport.center();
        Pos2::new(
            vc.x + ((p.x - self.center.x) * self.scale) as f32,
            vc.y + ((p.y - self.center.y) * self.scale) as f32,
        )
    }

    /// Convert screen-space coords to projected coords
    pub fn from_screen(&self, pos: Pos2) -> ProjPoint {
        let rel = pos - self.viewport.center();
        ProjPoint::new(
            self.center.x + rel.x as f64 / self.scale,
            self.center.y + rel.y as f64 / self.scale,
        )
    }

    /// Shift the view by a screen-space delta (content follows the pointer).
    pub fn pan(&mut self, delta: Vec2) {
        self.center = ProjPoint::new(
            self.center.x - delta.x as f64 / self.scale,
            self.center.y - delta.y as f64 / self.scale,
        );
    }

    /// Zoom by `factor`, keeping the point under `cursor` fixed on screen.
    pub fn zoom_at(&mut self, cursor: Pos2, factor: f64) {
        let fixed = self.from_screen(cursor);
        self.set_scale(self.scale * factor);
        let rel = cursor - self.viewport.center();
        self.center = ProjPoint::new(
            fixed.x - rel.x as f64 / self.scale,
            fixed.y - rel.y as f64 / self.scale,
        );
    }

    /// Center on `rect` and pick the largest scale that still shows it whole.
    pub fn scale_to(&mut self, rect: ProjRect) {
        self.center = rect.center();
        if rect.is_empty() {
            return;
        }
        let sx = self.viewport.width() as f64 / rect.width();
        let sy = self.viewport.height() as f64 / rect.height();
        self.set_scale(sx.min(sy));
    }

    pub fn item_to_screen(&self, p: ProjPoint, transform: &ItemTransform) -> Pos2 {
        let (sin, cos) = transform.azimuth_deg.to_radians().sin_cos();
        let d = p - transform.anchor;
        let rotated = ProjPoint::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
        let offset = if transform.ignore_scale {
            rotated
        } else {
            rotated * self.scale
        };
        self.to_screen(transform.anchor) + egui::vec2(offset.x as f32, offset.y as f32)
    }

    /// Inverse of [`Camera::item_to_screen`].
    pub fn screen_to_item(&self, pos: Pos2, transform: &ItemTransform) -> ProjPoint {
        let rel = pos - self.to_screen(transform.anchor);
        let mut d = ProjPoint::new(rel.x as f64, rel.y as f64);
        if !transform.ignore_scale {
            d = d * (1.0 / self.scale);
        }
        let (sin, cos) = transform.azimuth_deg.to_radians().sin_cos();
        let unrotated = ProjPoint::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos);
        transform.anchor + unrotated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::new(0.001, 10.0);
        camera.set_viewport(Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0)));
        camera.set_center(ProjPoint::new(1000.0, -2000.0));
        camera.set_scale(0.5);
        camera
    }

    fn close(a: ProjPoint, b: ProjPoint) -> bool {
        a.distance(b) < 1e-2
    }

    #[test]
    fn test_center_maps_to_viewport_center() {
        let camera = camera();
        assert_eq!(camera.to_screen(camera.center()), Pos2::new(400.0, 300.0));
    }

    #[test]
    fn test_screen_roundtrip() {
        let camera = camera();
        let p = ProjPoint::new(1234.0, -1876.0);
        assert!(close(camera.from_screen(camera.to_screen(p)), p));
    }

    #[test]
    fn test_zoom_keeps_cursor_point_fixed() {
        let mut camera = camera();
        let cursor = Pos2::new(100.0, 50.0);
        let before = camera.from_screen(cursor);
        camera.zoom_at(cursor, 2.0);
        assert_eq!(camera.scale(), 1.0);
        assert!(close(camera.from_screen(cursor), before));
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut camera = camera();
        camera.set_scale(1000.0);
        assert_eq!(camera.scale(), 10.0);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let mut camera = Camera::new(20.0, 10.0);
        camera.set_scale(1.0);
        assert_eq!(camera.scale(), 10.0);
    }

    #[test]
    fn test_pan_moves_content_with_pointer() {
        let mut camera = camera();
        let p = ProjPoint::new(1100.0, -2000.0);
        let before = camera.to_screen(p);
        camera.pan(egui::vec2(20.0, -10.0));
        let after = camera.to_screen(p);
        assert!((after.x - before.x - 20.0).abs() < 1e-3);
        assert!((after.y - before.y + 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_scale_to_fits_rect() {
        let mut camera = camera();
        camera.scale_to(ProjRect::from_two_points(ProjPoint::new(0.0, 0.0), ProjPoint::new(400.0, 100.0)));
        assert_eq!(camera.scale(), 2.0);
        assert_eq!(camera.center(), ProjPoint::new(200.0, 50.0));
    }

    #[test]
    fn test_item_transform_roundtrip_with_rotation_and_ignore_scale() {
        let camera = camera();
        let transform = ItemTransform {
            anchor: ProjPoint::new(1000.0, -2000.0),
            azimuth_deg: 45.0,
            ignore_scale: true,
        };
        let p = ProjPoint::new(1016.0, -2016.0);
        let screen = camera.item_to_screen(p, &transform);
        assert!(close(camera.screen_to_item(screen, &transform), p));
    }

    #[test]
    fn test_ignore_scale_uses_pixels() {
        let camera = camera();
        let transform = ItemTransform {
            anchor: camera.center(),
            azimuth_deg: 0.0,
            ignore_scale: true,
        };
        let corner = camera.item_to_screen(camera.center() + ProjPoint::new(16.0, 16.0), &transform);
        assert_eq!(corner, Pos2::new(416.0, 316.0));
    }
}
