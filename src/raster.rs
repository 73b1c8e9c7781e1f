//! Decoded item images.

use image::{DynamicImage, RgbaImage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::ItemError;
use crate::geo::ProjSize;

static NEXT_IMAGE_KEY: AtomicU64 = AtomicU64::new(1);

/// An RGBA raster attached to an item. Cloning shares the pixels.
#[derive(Clone, Debug)]
pub struct ItemImage {
    key: u64,
    pixels: Arc<RgbaImage>,
}

impl ItemImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            key: NEXT_IMAGE_KEY.fetch_add(1, Ordering::Relaxed),
            pixels: Arc::new(pixels),
        }
    }

    pub fn from_dynamic(img: &DynamicImage) -> Self {
        Self::from_rgba(img.to_rgba8())
    }

    /// Decodes any format the `image` crate recognises.
    pub fn decode(bytes: &[u8]) -> Result<Self, ItemError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(&img))
    }

    /// Identifies these pixels for texture caching; unique per decoded image.
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Natural size in pixels.
    pub fn size(&self) -> ProjSize {
        ProjSize::new(self.pixels.width() as f64, self.pixels.height() as f64)
    }

    pub fn is_null(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }
}
