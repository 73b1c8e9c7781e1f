use std::path::Path;

use crate::camera::ItemTransform;
use crate::error::ItemError;
use crate::geo::{GeoPos, GeoRect, ProjPoint, ProjRect, ProjSize};
use crate::projection::Projection;
use crate::raster::ItemImage;
use crate::render::{Color4, Stroke, Surface};
use crate::session::ItemRecord;

use super::{ItemBase, ItemFlags, MapItem};

const SYMBOL_AZIMUTH_DEG: f64 = 45.0;

/// A rectangle pinned to a geographic area. It scales with the map and draws
/// an image when one is loaded, otherwise a filled rectangle in its colour.
///
/// The geographic rectangle is the only stored geometry. The point + size
/// constructors compute it once: the rectangle's bottom-center sits on the
/// point.
pub struct SymbolItem {
    base: ItemBase,
    geo_rect: GeoRect,
    proj_rect: ProjRect,
    color: Color4,
    palette: Vec<Color4>,
    image: Option<ItemImage>,
}

impl SymbolItem {
    /// A clickable, selectable, rotated symbol covering `geo_rect`.
    pub fn from_geo_rect(geo_rect: GeoRect, color: Color4, palette: Vec<Color4>) -> Self {
        Self {
            base: ItemBase::new(ItemFlags {
                clickable: true,
                selectable: true,
                transformed: true,
                highlight_custom: true,
                select_custom: true,
                ..Default::default()
            }),
            geo_rect,
            proj_rect: ProjRect::EMPTY,
            color,
            palette,
            image: None,
        }
    }

    /// A movable symbol whose bottom-center is at `geo`, `size` projected
    /// units wide and tall at the time of construction.
    pub fn from_point(
        projection: &dyn Projection,
        geo: GeoPos,
        size: ProjSize,
        palette: Vec<Color4>,
    ) -> Self {
        Self {
            base: ItemBase::new(ItemFlags {
                movable: true,
                clickable: true,
                highlight_custom: true,
                ..Default::default()
            }),
            geo_rect: bottom_anchored_rect(projection, geo, size),
            proj_rect: ProjRect::EMPTY,
            color: Color4::BLUE,
            palette,
            image: None,
        }
    }

    pub fn geo_rect(&self) -> GeoRect {
        self.geo_rect
    }

    pub fn color(&self) -> Color4 {
        self.color
    }

    pub fn set_color(&mut self, color: Color4) {
        self.color = color;
        self.base.mark_changed();
    }

    pub fn set_rect(&mut self, geo_rect: GeoRect) {
        self.geo_rect = geo_rect;
        self.on_projection();
        self.base.mark_changed();
    }

    /// Re-places the symbol from a point and size using the attached
    /// projection. Fails without touching the symbol if it is not on a map.
    pub fn set_point(&mut self, geo: GeoPos, size: ProjSize) -> Result<(), ItemError> {
        let Some(projection) = self.base.projection() else {
            log::warn!("symbol is not attached to a map; ignoring set_point");
            return Err(ItemError::NoProjection);
        };
        let geo_rect = bottom_anchored_rect(projection, geo, size);
        self.color = Color4::GREEN;
        self.set_rect(geo_rect);
        Ok(())
    }

    fn next_color(&self) -> Color4 {
        if self.palette.is_empty() {
            return self.color;
        }
        // an unknown colour counts as one past the end, landing on the second entry
        let next = self
            .palette
            .iter()
            .position(|c| *c == self.color)
            .unwrap_or(self.palette.len())
            + 1;
        let next = next % self.palette.len();
        self.palette[next]
    }
}

fn bottom_anchored_rect(projection: &dyn Projection, geo: GeoPos, size: ProjSize) -> GeoRect {
    let anchor = projection.geo_to_proj(geo);
    let bottom_left = ProjPoint::new(anchor.x - size.width / 2.0, anchor.y);
    let top_right = ProjPoint::new(anchor.x + size.width / 2.0, anchor.y - size.height);
    GeoRect::from_corners(
        projection.proj_to_geo(bottom_left),
        projection.proj_to_geo(top_right),
    )
}

impl MapItem for SymbolItem {
    fn base(&self) -> &ItemBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ItemBase {
        &mut self.base
    }

    fn on_projection(&mut self) {
        if let Some(projection) = self.base.projection() {
            self.proj_rect = projection.geo_rect_to_proj(self.geo_rect);
            self.base.mark_changed();
        }
    }

    fn shape(&self) -> ProjRect {
        self.proj_rect
    }

    fn paint(&self, surface: &mut dyn Surface) {
        let rect = self.proj_rect;
        let opacity = self.base.opacity();
        match &self.image {
            Some(image) if !image.is_null() => surface.draw_image(rect, image, opacity),
            _ => {
                let flags = &self.base.flags;
                let width = if flags.highlighted && flags.highlight_custom {
                    5.0
                } else {
                    1.0
                };
                surface.fill_rect(
                    rect,
                    self.color.with_opacity(opacity),
                    Stroke::new(width, Color4::BLACK.with_opacity(opacity)),
                );
            }
        }

        if self.base.flags.selected && self.base.flags.select_custom {
            let stroke = Stroke::new(1.0, Color4::BLACK);
            surface.line(rect.min, rect.max, stroke);
            surface.line(rect.top_right(), rect.bottom_left(), stroke);
        }
    }

    fn set_image(&mut self, image: Option<ItemImage>) {
        self.image = image;
        self.base.mark_changed();
    }

    fn record(&self) -> ItemRecord {
        ItemRecord::Symbol {
            rect: self.geo_rect,
            color: self.color,
            opacity: self.base.opacity(),
            flags: self.base.flags.persistent(),
            image: self.base.image_source().map(Path::to_path_buf),
        }
    }

    fn label(&self) -> String {
        format!("Symbol {}", self.color.name())
    }

    fn transform(&self) -> ItemTransform {
        ItemTransform {
            anchor: self.anchor(),
            azimuth_deg: if self.base.flags.transformed {
                SYMBOL_AZIMUTH_DEG
            } else {
                0.0
            },
            ignore_scale: self.base.flags.ignore_scale,
        }
    }

    fn tooltip(&self, pos: ProjPoint) -> Option<String> {
        let geo = self.base.projection()?.proj_to_geo(pos);
        Some(format!(
            "Rectangle with color {}\nPosition {} {}",
            self.color.name(),
            geo.lat_to_string(),
            geo.lon_to_string()
        ))
    }

    fn on_click(&mut self, pos: ProjPoint) {
        if !self.base.flags.selectable {
            let opacity = if self.base.opacity() <= 0.5 { 1.0 } else { 0.5 };
            self.base.set_opacity(opacity);
            log::info!("single click at ({:.1}, {:.1})", pos.x, pos.y);
        } else {
            self.base.set_opacity(1.0);
        }
    }

    fn on_double_click(&mut self, pos: ProjPoint) {
        self.color = self.next_color();
        self.base.set_opacity(1.0);
        log::info!("double click at ({:.1}, {:.1})", pos.x, pos.y);
    }

    fn on_move_start(&mut self, pos: ProjPoint) {
        log::info!("object move started at ({:.1}, {:.1})", pos.x, pos.y);
    }

    fn on_move_pos(&mut self, pos: ProjPoint) {
        let Some(projection) = self.base.projection() else {
            return;
        };
        let center = ProjPoint::new(pos.x, pos.y - self.proj_rect.height() / 2.0);
        let moved = projection.proj_rect_to_geo(self.proj_rect.move_center(center));
        self.set_rect(moved);
        log::debug!("object moved {}", self.geo_rect);
    }

    fn on_move_stop(&mut self, pos: ProjPoint) {
        log::info!("object move stopped at ({:.1}, {:.1})", pos.x, pos.y);
    }
}
