//! Map items anchored in geographic or projected space.
//!
//! Items hold an anchor and a size and derive a projected rectangle from them
//! through the map's [`projection::Projection`]. The rectangle is rebuilt on
//! projection changes and while the item is dragged. [`app::MapApp`] is an
//! `eframe` front end that lets you drop icons on a map and move them around.

pub mod app;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod drag;
pub mod error;
pub mod geo;
pub mod item;
pub mod layer;
pub mod map;
pub mod projection;
pub mod raster;
pub mod render;
pub mod session;

pub use error::{ConfigError, GeoError, ItemError, SessionError};
pub use geo::{GeoPos, GeoRect, ProjPoint, ProjRect, ProjSize};
pub use item::{Anchor, IconItem, MapItem, SymbolItem};
pub use projection::{Projection, WebMercator};
