//! Draw commands produced by items, independent of the windowing toolkit.

use serde::{Deserialize, Serialize};

use crate::geo::{ProjPoint, ProjRect};
use crate::raster::ItemImage;

// ── Color ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Self = Self::rgb(160.0 / 255.0, 160.0 / 255.0, 164.0 / 255.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);
    pub const MAGENTA: Self = Self::rgb(1.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::rgb(1.0, 1.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_egui(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        )
    }

    /// `#rrggbb`, alpha ignored.
    pub fn name(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8
        )
    }

    pub fn with_opacity(&self, opacity: f32) -> Self {
        Self {
            a: self.a * opacity,
            ..*self
        }
    }
}

impl Default for Color4 {
    fn default() -> Self {
        Self::BLUE
    }
}

// ── Commands ────────────────────────────────────────────────────────────────

/// Line width in screen pixels, unaffected by zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: Color4,
}

impl Stroke {
    pub fn new(width: f32, color: Color4) -> Self {
        Self { width, color }
    }
}

#[derive(Clone, Debug)]
pub enum DrawCommand {
    Image {
        rect: ProjRect,
        image: ItemImage,
        opacity: f32,
    },
    FilledRect {
        rect: ProjRect,
        fill: Color4,
        stroke: Stroke,
    },
    Line {
        from: ProjPoint,
        to: ProjPoint,
        stroke: Stroke,
    },
}

/// Paint target handed to items. Geometry is in the item's projected space.
pub trait Surface {
    fn draw_image(&mut self, rect: ProjRect, image: &ItemImage, opacity: f32);
    fn fill_rect(&mut self, rect: ProjRect, fill: Color4, stroke: Stroke);
    fn line(&mut self, from: ProjPoint, to: ProjPoint, stroke: Stroke);
}

/// Records commands in paint order.
#[derive(Debug, Default)]
pub struct CommandList {
    pub commands: Vec<DrawCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for CommandList {
    fn draw_image(&mut self, rect: ProjRect, image: &ItemImage, opacity: f32) {
        self.commands.push(DrawCommand::Image {
            rect,
            image: image.clone(),
            opacity,
        });
    }

    fn fill_rect(&mut self, rect: ProjRect, fill: Color4, stroke: Stroke) {
        self.commands.push(DrawCommand::FilledRect { rect, fill, stroke });
    }

    fn line(&mut self, from: ProjPoint, to: ProjPoint, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }
}
