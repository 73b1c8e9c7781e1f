//! Saving and restoring a layer's items as JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::error::SessionError;
use crate::geo::{GeoRect, ProjSize};
use crate::item::{Anchor, IconItem, ItemFlags, MapItem, SymbolItem};
use crate::layer::Layer;
use crate::render::Color4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemRecord {
    Icon {
        anchor: Anchor,
        size: ProjSize,
        entry: Option<String>,
        /// Image file loaded onto the icon, overriding the catalog artwork
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<PathBuf>,
    },
    Symbol {
        rect: GeoRect,
        color: Color4,
        opacity: f32,
        flags: ItemFlags,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<PathBuf>,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionFile {
    pub items: Vec<ItemRecord>,
}

impl SessionFile {
    pub fn from_layer(layer: &Layer) -> Self {
        Self {
            items: layer.items().map(|(_, item)| item.record()).collect(),
        }
    }

    /// Reads a session; a missing file is an empty session.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        log::info!("saved {} items to {}", self.items.len(), path.display());
        Ok(())
    }

    /// Rebuilds items into `layer`. Images come from the recorded file, or for
    /// icons from the catalog entry they were created from. An image that can
    /// no longer be read leaves the item with its fallback rendering.
    pub fn restore(&self, layer: &mut Layer, catalog: &Catalog, palette: &[Color4]) -> usize {
        for record in &self.items {
            layer.add(build_item(record, catalog, palette));
        }
        self.items.len()
    }
}

pub fn build_item(record: &ItemRecord, catalog: &Catalog, palette: &[Color4]) -> Box<dyn MapItem> {
    match record {
        ItemRecord::Icon {
            anchor,
            size,
            entry,
            image,
        } => {
            let mut icon = IconItem::new();
            if let Some(name) = entry {
                icon = icon.with_entry(name.clone());
                match catalog.find(name).and_then(|e| e.icon.clone()) {
                    Some(artwork) => icon.set_image(Some(artwork)),
                    None if image.is_none() => log::warn!("catalog has no icon for '{}'", name),
                    None => {}
                }
            }
            if let Some(path) = image {
                // failures are logged by load_image_file
                let _ = icon.load_image_file(path);
            }
            icon.set_geometry(*anchor, *size);
            Box::new(icon)
        }
        ItemRecord::Symbol {
            rect,
            color,
            opacity,
            flags,
            image,
        } => {
            let mut symbol = SymbolItem::from_geo_rect(*rect, *color, palette.to_vec());
            symbol.base_mut().flags = flags.persistent();
            symbol.base_mut().set_opacity(*opacity);
            if let Some(path) = image {
                let _ = symbol.load_image_file(path);
            }
            Box::new(symbol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPos;
    use crate::layer::LayerId;
    use crate::projection::WebMercator;
    use crate::render::{CommandList, DrawCommand};
    use std::rc::Rc;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("geoview-items-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_save_and_restore_layer() {
        let catalog = Catalog::builtin();
        let mut layer = Layer::new(LayerId(1), "icons");
        layer.attach(Rc::new(WebMercator));

        let mut icon = IconItem::new().with_entry("Star");
        icon.set_geometry_geo(GeoPos::new(-23.556, -46.618), ProjSize::new(32.0, 32.0));
        layer.add(Box::new(icon));
        layer.add(Box::new(SymbolItem::from_geo_rect(
            GeoRect::around(GeoPos::new(-23.5, -46.6), 0.01),
            Color4::CYAN,
            vec![],
        )));

        let path = temp_path("roundtrip");
        SessionFile::from_layer(&layer).save(&path).unwrap();
        let loaded = SessionFile::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut restored = Layer::new(LayerId(2), "restored");
        restored.attach(Rc::new(WebMercator));
        assert_eq!(loaded.restore(&mut restored, &catalog, &[]), 2);
        assert_eq!(SessionFile::from_layer(&restored).items, loaded.items);

        let (_, first) = restored.items().next().unwrap();
        assert_eq!(first.shape().size(), ProjSize::new(32.0, 32.0));
    }

    fn attached(id: u64) -> Layer {
        let mut layer = Layer::new(LayerId(id), "items");
        layer.attach(Rc::new(WebMercator));
        layer
    }

    #[test]
    fn test_dropped_symbol_keeps_its_flags_after_restore() {
        let mut layer = attached(1);
        let id = layer.add(Box::new(SymbolItem::from_point(
            &WebMercator,
            GeoPos::new(-23.5, -46.6),
            ProjSize::new(2000.0, 2000.0),
            vec![],
        )));
        let before = layer.get(id).unwrap().base().flags;

        let mut restored = attached(2);
        SessionFile::from_layer(&layer).restore(&mut restored, &Catalog::builtin(), &[]);
        let (_, item) = restored.items().next().unwrap();
        assert_eq!(item.base().flags, before);
        assert!(item.base().flags.movable);
        assert!(!item.base().flags.selectable);
        assert_eq!(item.transform().azimuth_deg, 0.0);
    }

    #[test]
    fn test_selection_is_not_saved() {
        let mut layer = attached(1);
        let id = layer.add(Box::new(SymbolItem::from_geo_rect(
            GeoRect::around(GeoPos::new(0.0, 0.0), 0.1),
            Color4::RED,
            vec![],
        )));
        layer.select(Some(id));

        let mut restored = attached(2);
        SessionFile::from_layer(&layer).restore(&mut restored, &Catalog::builtin(), &[]);
        let (_, item) = restored.items().next().unwrap();
        assert!(!item.base().flags.selected);
        assert!(item.base().flags.selectable);
        assert_eq!(item.transform().azimuth_deg, 45.0);
    }

    #[test]
    fn test_loaded_image_file_is_restored() {
        let image_path = std::env::temp_dir().join(format!("geoview-items-img-{}.png", std::process::id()));
        image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 128, 255, 255]))
            .save(&image_path)
            .unwrap();

        let mut layer = attached(1);
        let id = layer.add(Box::new(SymbolItem::from_geo_rect(
            GeoRect::around(GeoPos::new(0.0, 0.0), 0.1),
            Color4::RED,
            vec![],
        )));
        layer
            .with_item_mut(id, |item| item.load_image_file(&image_path))
            .unwrap()
            .unwrap();
        let session = SessionFile::from_layer(&layer);

        let mut restored = attached(2);
        session.restore(&mut restored, &Catalog::builtin(), &[]);
        std::fs::remove_file(&image_path).ok();

        let (_, item) = restored.items().next().unwrap();
        assert_eq!(item.base().image_source(), Some(image_path.as_path()));
        let mut surface = CommandList::new();
        item.paint(&mut surface);
        assert!(matches!(surface.commands[0], DrawCommand::Image { .. }));
    }

    #[test]
    fn test_unreadable_image_file_is_io_error() {
        let mut icon = IconItem::new();
        let result = icon.load_image_file(&temp_path("no-such-image"));
        assert!(matches!(result, Err(crate::error::ItemError::Io(_))));
        assert!(icon.base().image_source().is_none());
    }

    #[test]
    fn test_missing_file_is_empty_session() {
        let session = SessionFile::load(&temp_path("missing")).unwrap();
        assert!(session.items.is_empty());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();
        let result = SessionFile::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SessionError::Parse(_))));
    }
}
