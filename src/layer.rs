//! Layers own items and keep an index of their bounds for hit-testing.

use std::rc::Rc;

use crate::camera::Camera;
use crate::geo::ProjRect;
use crate::item::MapItem;
use crate::projection::Projection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

struct Entry {
    id: ItemId,
    item: Box<dyn MapItem>,
    bounds: ProjRect,
}

pub struct Layer {
    id: LayerId,
    name: String,
    pub visible: bool,
    entries: Vec<Entry>,
    next_item: u64,
    projection: Option<Rc<dyn Projection>>,
    changed: Vec<ItemId>,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            entries: Vec::new(),
            next_item: 1,
            projection: None,
            changed: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hands `projection` to every item, which recomputes its geometry.
    pub fn attach(&mut self, projection: Rc<dyn Projection>) {
        for entry in &mut self.entries {
            entry.item.attach(projection.clone());
        }
        self.projection = Some(projection);
        self.refresh();
    }

    pub fn add(&mut self, mut item: Box<dyn MapItem>) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        if let Some(projection) = &self.projection {
            item.attach(projection.clone());
        }
        item.base_mut().take_changed();
        let bounds = item.shape();
        self.entries.push(Entry { id, item, bounds });
        self.changed.push(id);
        log::debug!("layer '{}': added item {:?}", self.name, id);
        id
    }

    pub fn remove(&mut self, id: ItemId) -> Option<Box<dyn MapItem>> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let mut entry = self.entries.remove(index);
        entry.item.detach();
        self.changed.retain(|c| *c != id);
        log::debug!("layer '{}': removed item {:?}", self.name, id);
        Some(entry.item)
    }

    pub fn clear(&mut self) {
        let ids: Vec<ItemId> = self.ids().collect();
        for id in ids {
            self.remove(id);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Items in paint order, bottom first.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &dyn MapItem)> {
        self.entries.iter().map(|e| (e.id, e.item.as_ref()))
    }

    pub fn get(&self, id: ItemId) -> Option<&dyn MapItem> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.item.as_ref())
    }

    /// Runs `f` on the item and re-indexes it if it reported a change.
    pub fn with_item_mut<R>(&mut self, id: ItemId, f: impl FnOnce(&mut dyn MapItem) -> R) -> Option<R> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        let result = f(entry.item.as_mut());
        if entry.item.base_mut().take_changed() {
            entry.bounds = entry.item.shape();
            self.changed.push(id);
        }
        Some(result)
    }

    /// Picks up changes items made on their own and re-indexes them.
    pub fn refresh(&mut self) {
        for entry in &mut self.entries {
            if entry.item.base_mut().take_changed() {
                entry.bounds = entry.item.shape();
                self.changed.push(entry.id);
            }
        }
    }

    /// Drains the ids whose bounds or appearance changed since the last call.
    pub fn take_changed(&mut self) -> Vec<ItemId> {
        self.refresh();
        let mut changed = std::mem::take(&mut self.changed);
        changed.sort();
        changed.dedup();
        changed
    }

    pub fn bounds(&self, id: ItemId) -> Option<ProjRect> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.bounds)
    }

    /// Topmost item under `screen_pos`.
    pub fn item_at(&self, camera: &Camera, screen_pos: egui::Pos2) -> Option<ItemId> {
        self.entries.iter().rev().find_map(|e| {
            let local = camera.screen_to_item(screen_pos, &e.item.transform());
            e.bounds.contains(local).then_some(e.id)
        })
    }

    /// Selects `id` and deselects everything else; `None` clears selection.
    pub fn select(&mut self, id: Option<ItemId>) {
        for entry in &mut self.entries {
            let selected = Some(entry.id) == id && entry.item.base().flags.selectable;
            if entry.item.base().flags.selected != selected {
                entry.item.base_mut().flags.selected = selected;
                entry.item.base_mut().mark_changed();
            }
        }
        self.refresh();
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.entries
            .iter()
            .find(|e| e.item.base().flags.selected)
            .map(|e| e.id)
    }

    pub fn set_highlighted(&mut self, id: Option<ItemId>) {
        for entry in &mut self.entries {
            let highlighted = Some(entry.id) == id;
            if entry.item.base().flags.highlighted != highlighted {
                entry.item.base_mut().flags.highlighted = highlighted;
                entry.item.base_mut().mark_changed();
            }
        }
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPos, GeoRect, ProjPoint, ProjSize};
    use crate::item::{IconItem, SymbolItem};
    use crate::projection::WebMercator;
    use crate::render::Color4;

    fn icon_at(proj: ProjPoint) -> Box<dyn MapItem> {
        let mut icon = IconItem::new();
        icon.set_geometry_proj(proj, ProjSize::new(32.0, 32.0));
        Box::new(icon)
    }

    fn attached_layer() -> Layer {
        let mut layer = Layer::new(LayerId(1), "icons");
        layer.attach(Rc::new(WebMercator));
        layer
    }

    fn camera_at(center: ProjPoint) -> Camera {
        let mut camera = Camera::new(0.001, 100.0);
        camera.set_viewport(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0)));
        camera.set_center(center);
        camera.set_scale(1.0);
        camera
    }

    #[test]
    fn test_items_added_before_attach_get_geometry_on_attach() {
        let mut layer = Layer::new(LayerId(1), "icons");
        let id = layer.add(icon_at(ProjPoint::new(10.0, 10.0)));
        assert!(layer.bounds(id).unwrap().is_empty());

        layer.attach(Rc::new(WebMercator));
        assert_eq!(layer.bounds(id).unwrap().size(), ProjSize::new(32.0, 32.0));
        assert_eq!(layer.take_changed(), vec![id]);
        assert!(layer.take_changed().is_empty());
    }

    #[test]
    fn test_remove_returns_detached_item() {
        let mut layer = attached_layer();
        let id = layer.add(icon_at(ProjPoint::ZERO));
        let item = layer.remove(id).unwrap();
        assert!(item.base().projection().is_none());
        assert!(layer.is_empty());
        assert!(layer.remove(id).is_none());
    }

    #[test]
    fn test_item_at_prefers_topmost() {
        let mut layer = attached_layer();
        let bottom = layer.add(icon_at(ProjPoint::ZERO));
        let top = layer.add(icon_at(ProjPoint::new(10.0, 0.0)));
        let camera = camera_at(ProjPoint::ZERO);

        assert_eq!(layer.item_at(&camera, egui::pos2(405.0, 300.0)), Some(top));
        assert_eq!(layer.item_at(&camera, egui::pos2(390.0, 300.0)), Some(bottom));
        assert_eq!(layer.item_at(&camera, egui::pos2(100.0, 100.0)), None);
    }

    #[test]
    fn test_with_item_mut_reindexes_bounds() {
        let mut layer = attached_layer();
        let id = layer.add(icon_at(ProjPoint::ZERO));
        layer.take_changed();
        layer.with_item_mut(id, |item| item.on_move_pos(ProjPoint::new(500.0, 0.0)));
        assert!(layer.bounds(id).unwrap().center().distance(ProjPoint::new(500.0, 0.0)) < 1e-6);
        assert_eq!(layer.take_changed(), vec![id]);
    }

    #[test]
    fn test_selection_only_applies_to_selectable_items() {
        let mut layer = attached_layer();
        let icon = layer.add(icon_at(ProjPoint::ZERO));
        let symbol = layer.add(Box::new(SymbolItem::from_geo_rect(
            GeoRect::around(GeoPos::new(0.0, 0.0), 0.1),
            Color4::RED,
            vec![],
        )));

        layer.select(Some(icon));
        assert_eq!(layer.selected(), None);

        layer.select(Some(symbol));
        assert_eq!(layer.selected(), Some(symbol));

        layer.select(None);
        assert_eq!(layer.selected(), None);
    }
}
