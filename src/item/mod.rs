//! Map items: the capability interface plus the concrete icon and symbol
//! variants.

mod anchored;
mod icon;
mod symbol;

pub use anchored::{Anchor, AnchoredGeometry};
pub use icon::IconItem;
pub use symbol::SymbolItem;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::camera::ItemTransform;
use crate::error::ItemError;
use crate::geo::{ProjPoint, ProjRect};
use crate::projection::Projection;
use crate::raster::ItemImage;
use crate::render::Surface;
use crate::session::ItemRecord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFlags {
    pub movable: bool,
    pub selectable: bool,
    pub clickable: bool,
    /// Item supplies its own rotation via [`MapItem::transform`]
    pub transformed: bool,
    /// Size is in screen pixels around the anchor
    pub ignore_scale: bool,
    pub highlight_custom: bool,
    pub select_custom: bool,
    pub selected: bool,
    pub highlighted: bool,
}

impl ItemFlags {
    /// The flags without selection and hover state.
    pub fn persistent(&self) -> Self {
        Self {
            selected: false,
            highlighted: false,
            ..*self
        }
    }
}

/// State every item carries regardless of variant.
pub struct ItemBase {
    pub flags: ItemFlags,
    projection: Option<Rc<dyn Projection>>,
    opacity: f32,
    /// File the current image was read from, if any
    image_source: Option<PathBuf>,
    changed: bool,
}

impl ItemBase {
    pub fn new(flags: ItemFlags) -> Self {
        Self {
            flags,
            projection: None,
            opacity: 1.0,
            image_source: None,
            changed: false,
        }
    }

    /// The map projection, once the item has been added to a layer.
    pub fn projection(&self) -> Option<&dyn Projection> {
        self.projection.as_deref()
    }

    pub fn set_projection(&mut self, projection: Option<Rc<dyn Projection>>) {
        self.projection = projection;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.changed = true;
    }

    pub fn image_source(&self) -> Option<&Path> {
        self.image_source.as_deref()
    }

    pub fn set_image_source(&mut self, source: Option<PathBuf>) {
        self.image_source = source;
    }

    /// Tells the owning layer that bounds or appearance changed.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

/// What a layer needs from an item. Hooks default to no-ops.
pub trait MapItem {
    fn base(&self) -> &ItemBase;

    fn base_mut(&mut self) -> &mut ItemBase;

    /// Called whenever the item gets a projection or the projection changes.
    fn on_projection(&mut self);

    /// Hit-test and bounds rectangle, in the item's own space (see
    /// [`MapItem::transform`]).
    fn shape(&self) -> ProjRect;

    fn paint(&self, surface: &mut dyn Surface);

    fn set_image(&mut self, image: Option<ItemImage>);

    fn record(&self) -> ItemRecord;

    /// Short name shown in lists.
    fn label(&self) -> String;

    fn anchor(&self) -> ProjPoint {
        self.shape().center()
    }

    fn transform(&self) -> ItemTransform {
        ItemTransform {
            anchor: self.anchor(),
            azimuth_deg: 0.0,
            ignore_scale: self.base().flags.ignore_scale,
        }
    }

    fn tooltip(&self, _pos: ProjPoint) -> Option<String> {
        None
    }

    fn on_click(&mut self, _pos: ProjPoint) {}

    fn on_double_click(&mut self, _pos: ProjPoint) {}

    fn on_move_start(&mut self, _pos: ProjPoint) {}

    fn on_move_pos(&mut self, _pos: ProjPoint) {}

    fn on_move_stop(&mut self, _pos: ProjPoint) {}

    fn attach(&mut self, projection: Rc<dyn Projection>) {
        self.base_mut().set_projection(Some(projection));
        self.on_projection();
    }

    fn detach(&mut self) {
        self.base_mut().set_projection(None);
    }

    /// Decodes `bytes` and installs the result. Undecodable data clears the
    /// image so the item falls back to its placeholder rendering.
    fn load_image(&mut self, bytes: &[u8]) -> Result<(), ItemError> {
        self.base_mut().set_image_source(None);
        match ItemImage::decode(bytes) {
            Ok(image) => {
                self.set_image(Some(image));
                Ok(())
            }
            Err(e) => {
                log::warn!("{}: {}", self.label(), e);
                self.set_image(None);
                Err(e)
            }
        }
    }

    /// Reads and installs the image at `path`, remembering the path so the
    /// image can be restored with the session.
    fn load_image_file(&mut self, path: &Path) -> Result<(), ItemError> {
        let bytes = std::fs::read(path).inspect_err(|e| {
            log::warn!("{}: cannot read {}: {}", self.label(), path.display(), e);
        })?;
        self.load_image(&bytes)?;
        self.base_mut().set_image_source(Some(path.to_path_buf()));
        Ok(())
    }
}
