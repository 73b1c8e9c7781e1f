use std::path::Path;

use crate::camera::ItemTransform;
use crate::geo::{GeoPos, ProjPoint, ProjRect, ProjSize};
use crate::raster::ItemImage;
use crate::render::Surface;
use crate::session::ItemRecord;

use super::{Anchor, AnchoredGeometry, ItemBase, ItemFlags, MapItem};

/// A raster icon anchored at its center. The size is in screen pixels, so
/// the icon keeps its on-screen size at every zoom level.
pub struct IconItem {
    base: ItemBase,
    geometry: AnchoredGeometry,
    image: Option<ItemImage>,
    /// Catalog entry the icon was created from, used to restore sessions
    entry: Option<String>,
}

impl IconItem {
    pub fn new() -> Self {
        Self {
            base: ItemBase::new(ItemFlags {
                movable: true,
                ignore_scale: true,
                ..Default::default()
            }),
            geometry: AnchoredGeometry::new(),
            image: None,
            entry: None,
        }
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn set_geometry_geo(&mut self, geo: GeoPos, size: ProjSize) {
        self.geometry.set_geo(geo, size);
        self.recompute();
    }

    pub fn set_geometry_proj(&mut self, proj: ProjPoint, size: ProjSize) {
        self.geometry.set_proj(proj, size);
        self.recompute();
    }

    pub fn set_geometry(&mut self, anchor: Anchor, size: ProjSize) {
        self.geometry.set(anchor, size);
        self.recompute();
    }

    pub fn geometry(&self) -> &AnchoredGeometry {
        &self.geometry
    }

    pub fn has_image(&self) -> bool {
        self.image.as_ref().is_some_and(|img| !img.is_null())
    }

    fn recompute(&mut self) {
        let natural = self.image.as_ref().map(ItemImage::size);
        if self.geometry.recompute(self.base.projection(), natural) {
            self.base.mark_changed();
        }
    }
}

impl Default for IconItem {
    fn default() -> Self {
        Self::new()
    }
}

impl MapItem for IconItem {
    fn base(&self) -> &ItemBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ItemBase {
        &mut self.base
    }

    fn on_projection(&mut self) {
        self.recompute();
    }

    fn shape(&self) -> ProjRect {
        self.geometry.rect()
    }

    fn paint(&self, surface: &mut dyn Surface) {
        let rect = self.geometry.rect();
        match &self.image {
            Some(image) if !image.is_null() && !rect.is_empty() => {
                surface.draw_image(rect, image, self.base.opacity());
            }
            _ => {}
        }
    }

    fn set_image(&mut self, image: Option<ItemImage>) {
        self.image = image;
        self.recompute();
    }

    fn record(&self) -> ItemRecord {
        ItemRecord::Icon {
            anchor: self.geometry.anchor(),
            size: self.geometry.requested_size(),
            entry: self.entry.clone(),
            image: self.base.image_source().map(Path::to_path_buf),
        }
    }

    fn label(&self) -> String {
        self.entry.clone().unwrap_or_else(|| "Icon".to_string())
    }

    fn anchor(&self) -> ProjPoint {
        self.geometry
            .working_anchor()
            .unwrap_or_else(|| self.geometry.rect().center())
    }

    fn transform(&self) -> ItemTransform {
        ItemTransform {
            anchor: self.anchor(),
            azimuth_deg: 0.0,
            ignore_scale: self.base.flags.ignore_scale,
        }
    }

    fn tooltip(&self, _pos: ProjPoint) -> Option<String> {
        let projection = self.base.projection()?;
        let geo = projection.proj_to_geo(self.anchor());
        Some(format!("{}\nPosition {}", self.label(), geo))
    }

    fn on_move_start(&mut self, pos: ProjPoint) {
        log::info!("object move started at ({:.1}, {:.1})", pos.x, pos.y);
    }

    fn on_move_pos(&mut self, pos: ProjPoint) {
        let Some(projection) = self.base.projection() else {
            return;
        };
        self.geometry.move_to(pos, projection);
        self.recompute();
        log::debug!("object moved to {:?}", self.geometry.anchor());
    }

    fn on_move_stop(&mut self, pos: ProjPoint) {
        log::info!("object move stopped at ({:.1}, {:.1})", pos.x, pos.y);
    }
}
