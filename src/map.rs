//! The map: one shared projection and an ordered stack of layers.

use std::rc::Rc;

use crate::camera::Camera;
use crate::layer::{ItemId, Layer, LayerId};
use crate::projection::Projection;

pub struct MapModel {
    projection: Rc<dyn Projection>,
    layers: Vec<Layer>,
    next_layer: u64,
}

impl MapModel {
    pub fn new(projection: Rc<dyn Projection>) -> Self {
        Self {
            projection,
            layers: Vec::new(),
            next_layer: 1,
        }
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    /// Swaps the projection and lets every item recompute against it.
    pub fn set_projection(&mut self, projection: Rc<dyn Projection>) {
        log::info!("switching projection to {}", projection.name());
        self.projection = projection;
        for layer in &mut self.layers {
            layer.attach(self.projection.clone());
        }
    }

    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        let mut layer = Layer::new(id, name);
        layer.attach(self.projection.clone());
        log::info!("added layer '{}'", layer.name());
        self.layers.push(layer);
        id
    }

    /// Removes the layer; its items are dropped with it.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id() == id)?;
        let mut layer = self.layers.remove(index);
        layer.clear();
        log::info!("removed layer '{}'", layer.name());
        Some(layer)
    }

    /// Layers bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == id)
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layer_mut(id) {
            layer.visible = visible;
        }
    }

    /// Topmost item of any visible layer under `screen_pos`.
    pub fn item_at(&self, camera: &Camera, screen_pos: egui::Pos2) -> Option<(LayerId, ItemId)> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.visible)
            .find_map(|l| l.item_at(camera, screen_pos).map(|item| (l.id(), item)))
    }

    /// Clears selection everywhere except on `target`.
    pub fn select(&mut self, target: Option<(LayerId, ItemId)>) {
        for layer in &mut self.layers {
            let id = target.filter(|(l, _)| *l == layer.id()).map(|(_, i)| i);
            layer.select(id);
        }
    }

    pub fn selected(&self) -> Option<(LayerId, ItemId)> {
        self.layers
            .iter()
            .find_map(|l| l.selected().map(|item| (l.id(), item)))
    }

    /// Drains bounds-changed notifications from every layer.
    pub fn take_changed(&mut self) -> usize {
        self.layers.iter_mut().map(|l| l.take_changed().len()).sum()
    }

    pub fn set_highlighted(&mut self, target: Option<(LayerId, ItemId)>) {
        for layer in &mut self.layers {
            let id = target.filter(|(l, _)| *l == layer.id()).map(|(_, i)| i);
            layer.set_highlighted(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPos, ProjSize};
    use crate::item::{IconItem, MapItem};
    use crate::projection::WebMercator;

    /// Doubles every projected coordinate of the inner projection.
    struct Doubled;

    impl Projection for Doubled {
        fn name(&self) -> &str {
            "doubled"
        }

        fn geo_to_proj(&self, geo: GeoPos) -> crate::geo::ProjPoint {
            WebMercator.geo_to_proj(geo) * 2.0
        }

        fn proj_to_geo(&self, proj: crate::geo::ProjPoint) -> GeoPos {
            WebMercator.proj_to_geo(proj * 0.5)
        }
    }

    #[test]
    fn test_items_follow_projection_change() {
        let mut map = MapModel::new(Rc::new(WebMercator));
        let layer = map.add_layer("icons");
        let geo = GeoPos::new(-23.556, -46.618);
        let mut icon = IconItem::new();
        icon.set_geometry_geo(geo, ProjSize::new(32.0, 32.0));
        let id = map.layer_mut(layer).unwrap().add(Box::new(icon));

        map.set_projection(Rc::new(Doubled));
        let anchor = map.layer(layer).unwrap().get(id).unwrap().anchor();
        assert!(anchor.distance(WebMercator.geo_to_proj(geo) * 2.0) < 1e-6);
    }

    #[test]
    fn test_add_and_remove_layers() {
        let mut map = MapModel::new(Rc::new(WebMercator));
        let a = map.add_layer("a");
        let b = map.add_layer("b");
        assert_eq!(map.layers().len(), 2);
        assert!(map.remove_layer(a).is_some());
        assert!(map.remove_layer(a).is_none());
        assert_eq!(map.layers()[0].id(), b);
    }
}
