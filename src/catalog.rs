//! Entries that can be dragged from the side panel onto the map.

use image::{Rgba, RgbaImage};

use crate::config::AppConfig;
use crate::geo::{GeoPos, ProjSize};
use crate::item::{IconItem, MapItem, SymbolItem};
use crate::projection::Projection;
use crate::raster::ItemImage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Icon,
    Symbol,
}

#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: EntryKind,
    pub icon: Option<ItemImage>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CatalogEntry {
                    name: "Star".to_string(),
                    kind: EntryKind::Icon,
                    icon: Some(ItemImage::from_rgba(star_icon(64))),
                },
                CatalogEntry {
                    name: "Pin".to_string(),
                    kind: EntryKind::Icon,
                    icon: Some(ItemImage::from_rgba(pin_icon(64))),
                },
                CatalogEntry {
                    name: "Rectangle".to_string(),
                    kind: EntryKind::Symbol,
                    icon: None,
                },
            ],
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Builds the item for an entry dropped at `geo`. Icon entries need both a
/// name and an image; anything else is ignored.
pub fn item_for_drop(
    entry: &CatalogEntry,
    geo: GeoPos,
    projection: &dyn Projection,
    config: &AppConfig,
) -> Option<Box<dyn MapItem>> {
    if entry.name.is_empty() {
        return None;
    }
    log::debug!("{} dropped at (lat, lon): {}", entry.name, geo);
    match entry.kind {
        EntryKind::Icon => {
            let image = entry.icon.clone().filter(|img| !img.is_null())?;
            let mut icon = IconItem::new().with_entry(entry.name.clone());
            icon.set_image(Some(image));
            let [w, h] = config.icon_size;
            icon.set_geometry_geo(geo, ProjSize::new(w, h));
            Some(Box::new(icon))
        }
        EntryKind::Symbol => {
            let [w, h] = config.symbol_size;
            let mut symbol =
                SymbolItem::from_point(projection, geo, ProjSize::new(w, h), config.palette.clone());
            if let Some(image) = entry.icon.clone() {
                symbol.set_image(Some(image));
            }
            Some(Box::new(symbol))
        }
    }
}

// ── Built-in artwork ────────────────────────────────────────────────────────

fn star_icon(size: u32) -> RgbaImage {
    let c = size as f32 / 2.0;
    let outer = c * 0.95;
    let inner = outer * 0.4;
    let points: Vec<(f32, f32)> = (0..10)
        .map(|i| {
            let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
            let r = if i % 2 == 0 { outer } else { inner };
            (c + r * angle.cos(), c + r * angle.sin())
        })
        .collect();

    let mut img = RgbaImage::new(size, size);
    for (x, y, px) in img.enumerate_pixels_mut() {
        if point_in_polygon(x as f32 + 0.5, y as f32 + 0.5, &points) {
            *px = Rgba([255, 200, 0, 255]);
        }
    }
    img
}

fn pin_icon(size: u32) -> RgbaImage {
    let s = size as f32;
    let head = (s / 2.0, s * 0.35);
    let radius = s * 0.3;
    let tip = [(s * 0.25, s * 0.45), (s * 0.75, s * 0.45), (s / 2.0, s * 0.98)];

    let mut img = RgbaImage::new(size, size);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        let d = ((fx - head.0).powi(2) + (fy - head.1).powi(2)).sqrt();
        if d < radius * 0.4 {
            *px = Rgba([255, 255, 255, 255]);
        } else if d < radius || point_in_polygon(fx, fy, &tip) {
            *px = Rgba([220, 40, 40, 255]);
        }
    }
    img
}

fn point_in_polygon(x: f32, y: f32, poly: &[(f32, f32)]) -> bool {
    if poly.is_empty() {
        return false;
    }
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
