//! Drag-to-move state machine.
//!
//! Pointer dispatch is owned by the UI; it feeds start/update/stop with
//! projected positions and the controller forwards them to the dragged item.

use crate::geo::ProjPoint;
use crate::layer::{ItemId, LayerId};
use crate::map::MapModel;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoveState {
    #[default]
    Idle,
    Dragging { layer: LayerId, item: ItemId },
}

#[derive(Debug, Default)]
pub struct MoveController {
    state: MoveState,
}

impl MoveController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != MoveState::Idle
    }

    /// Starts dragging `item`. Returns `false` (and stays idle) if a drag is
    /// already running or the item is missing or not movable.
    pub fn start(&mut self, map: &mut MapModel, layer: LayerId, item: ItemId, pos: ProjPoint) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(layer_ref) = map.layer_mut(layer) else {
            return false;
        };
        let started = layer_ref
            .with_item_mut(item, |it| {
                if !it.base().flags.movable {
                    return false;
                }
                it.on_move_start(pos);
                true
            })
            .unwrap_or(false);
        if started {
            self.state = MoveState::Dragging { layer, item };
        }
        started
    }

    /// Moves the dragged item to `pos`. Returns `false` when idle. If the item
    /// disappeared mid-drag the controller drops back to idle.
    pub fn update(&mut self, map: &mut MapModel, pos: ProjPoint) -> bool {
        let MoveState::Dragging { layer, item } = self.state else {
            return false;
        };
        let moved = map
            .layer_mut(layer)
            .and_then(|l| l.with_item_mut(item, |it| it.on_move_pos(pos)))
            .is_some();
        if !moved {
            log::warn!("dragged item {:?} is gone; cancelling move", item);
            self.state = MoveState::Idle;
        }
        moved
    }

    /// Finishes the drag. The item keeps the geometry from the last update.
    pub fn stop(&mut self, map: &mut MapModel, pos: ProjPoint) -> Option<(LayerId, ItemId)> {
        let MoveState::Dragging { layer, item } = std::mem::take(&mut self.state) else {
            return None;
        };
        map.layer_mut(layer)
            .and_then(|l| l.with_item_mut(item, |it| it.on_move_stop(pos)))
            .map(|_| (layer, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPos, GeoRect, ProjSize};
    use crate::item::{IconItem, SymbolItem};
    use crate::projection::WebMercator;
    use crate::render::Color4;
    use std::rc::Rc;

    fn map_with_icon() -> (MapModel, LayerId, ItemId) {
        let mut map = MapModel::new(Rc::new(WebMercator));
        let layer = map.add_layer("icons");
        let mut icon = IconItem::new();
        icon.set_geometry_geo(GeoPos::new(0.0, 0.0), ProjSize::new(32.0, 32.0));
        let item = map.layer_mut(layer).unwrap().add(Box::new(icon));
        (map, layer, item)
    }

    #[test]
    fn test_full_cycle_returns_to_idle() {
        let (mut map, layer, item) = map_with_icon();
        let mut mover = MoveController::new();
        assert!(mover.start(&mut map, layer, item, ProjPoint::ZERO));
        assert_eq!(mover.state(), MoveState::Dragging { layer, item });
        assert!(mover.update(&mut map, ProjPoint::new(100.0, 100.0)));
        assert_eq!(mover.stop(&mut map, ProjPoint::new(100.0, 100.0)), Some((layer, item)));
        assert_eq!(mover.state(), MoveState::Idle);
        assert!(!mover.update(&mut map, ProjPoint::new(5.0, 5.0)));
    }

    #[test]
    fn test_non_movable_items_do_not_start() {
        let mut map = MapModel::new(Rc::new(WebMercator));
        let layer = map.add_layer("symbols");
        let symbol = SymbolItem::from_geo_rect(
            GeoRect::around(GeoPos::new(0.0, 0.0), 0.1),
            Color4::RED,
            vec![],
        );
        let item = map.layer_mut(layer).unwrap().add(Box::new(symbol));
        let mut mover = MoveController::new();
        assert!(!mover.start(&mut map, layer, item, ProjPoint::ZERO));
        assert!(!mover.is_dragging());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let (mut map, layer, item) = map_with_icon();
        let mut mover = MoveController::new();
        assert!(mover.start(&mut map, layer, item, ProjPoint::ZERO));
        assert!(!mover.start(&mut map, layer, item, ProjPoint::ZERO));
    }

    #[test]
    fn test_removed_item_cancels_drag() {
        let (mut map, layer, item) = map_with_icon();
        let mut mover = MoveController::new();
        mover.start(&mut map, layer, item, ProjPoint::ZERO);
        map.layer_mut(layer).unwrap().remove(item);
        assert!(!mover.update(&mut map, ProjPoint::new(1.0, 1.0)));
        assert!(!mover.is_dragging());
    }
}
