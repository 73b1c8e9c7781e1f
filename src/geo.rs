//! Geographic and projected-space primitives.
//!
//! Geographic positions are latitude/longitude in degrees. Projected
//! coordinates live in the canvas space of a [`crate::projection::Projection`]
//! where y grows southward, so they line up with screen axes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GeoError;

// ── Geographic ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPos {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPos {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Builds a position, rejecting coordinates outside the valid ranges.
    pub fn try_new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Clamps latitude to the poles and wraps longitude into -180..180.
    pub fn normalized(&self) -> Self {
        Self {
            lat: self.lat.clamp(-90.0, 90.0),
            lon: (self.lon + 180.0).rem_euclid(360.0) - 180.0,
        }
    }

    pub fn lat_to_string(&self) -> String {
        format_dms(self.lat, if self.lat < 0.0 { 'S' } else { 'N' })
    }

    pub fn lon_to_string(&self) -> String {
        format_dms(self.lon, if self.lon < 0.0 { 'W' } else { 'E' })
    }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.lat_to_string(), self.lon_to_string())
    }
}

fn format_dms(value: f64, hemisphere: char) -> String {
    let abs = value.abs();
    let mut degrees = abs.trunc();
    let minutes_f = (abs - degrees) * 60.0;
    let mut minutes = minutes_f.trunc();
    let mut seconds = (minutes_f - minutes) * 60.0;
    // 59.999.. rounds up to 60.00 in the output otherwise
    if seconds >= 59.995 {
        seconds = 0.0;
        minutes += 1.0;
    }
    if minutes >= 60.0 {
        minutes = 0.0;
        degrees += 1.0;
    }
    format!(
        "{}°{:02}'{:05.2}\"{}",
        degrees as u32, minutes as u32, seconds, hemisphere
    )
}

/// Geographic rectangle, stored normalised as north/west/south/east edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
}

impl GeoRect {
    /// Builds a rectangle from any two opposite corners.
    pub fn from_corners(a: GeoPos, b: GeoPos) -> Self {
        Self {
            north: a.lat.max(b.lat),
            west: a.lon.min(b.lon),
            south: a.lat.min(b.lat),
            east: a.lon.max(b.lon),
        }
    }

    /// A square of `span_deg` degrees on each side of `center`.
    pub fn around(center: GeoPos, span_deg: f64) -> Self {
        Self::from_corners(
            GeoPos::new(center.lat - span_deg, center.lon - span_deg),
            GeoPos::new(center.lat + span_deg, center.lon + span_deg),
        )
    }

    pub fn top_left(&self) -> GeoPos {
        GeoPos::new(self.north, self.west)
    }

    pub fn bottom_right(&self) -> GeoPos {
        GeoPos::new(self.south, self.east)
    }

    pub fn center(&self) -> GeoPos {
        GeoPos::new(
            (self.north + self.south) * 0.5,
            (self.west + self.east) * 0.5,
        )
    }
}

impl fmt::Display for GeoRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GeoRect({:.6}, {:.6} .. {:.6}, {:.6})",
            self.north, self.west, self.south, self.east
        )
    }
}

// ── Projected ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjPoint {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: ProjPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::ops::Add for ProjPoint {
    type Output = ProjPoint;
    fn add(self, rhs: ProjPoint) -> ProjPoint {
        ProjPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for ProjPoint {
    type Output = ProjPoint;
    fn sub(self, rhs: ProjPoint) -> ProjPoint {
        ProjPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for ProjPoint {
    type Output = ProjPoint;
    fn mul(self, rhs: f64) -> ProjPoint {
        ProjPoint::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjSize {
    pub width: f64,
    pub height: f64,
}

impl ProjSize {
    pub const EMPTY: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle in projected space. `min` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjRect {
    pub min: ProjPoint,
    pub max: ProjPoint,
}

impl ProjRect {
    pub const EMPTY: Self = Self {
        min: ProjPoint::ZERO,
        max: ProjPoint::ZERO,
    };

    pub fn from_two_points(a: ProjPoint, b: ProjPoint) -> Self {
        Self {
            min: ProjPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: ProjPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle of `size` centered on `center`. Empty sizes collapse to a
    /// zero-area rectangle at `center`.
    pub fn from_center_size(center: ProjPoint, size: ProjSize) -> Self {
        if size.is_empty() {
            return Self {
                min: center,
                max: center,
            };
        }
        let half = ProjPoint::new(size.width * 0.5, size.height * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> ProjSize {
        ProjSize::new(self.width(), self.height())
    }

    pub fn center(&self) -> ProjPoint {
        ProjPoint::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn contains(&self, p: ProjPoint) -> bool {
        !self.is_empty()
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    pub fn top_right(&self) -> ProjPoint {
        ProjPoint::new(self.max.x, self.min.y)
    }

    pub fn bottom_left(&self) -> ProjPoint {
        ProjPoint::new(self.min.x, self.max.y)
    }

    /// Corners clockwise from top-left.
    pub fn corners(&self) -> [ProjPoint; 4] {
        [self.min, self.top_right(), self.max, self.bottom_left()]
    }

    pub fn move_center(&self, center: ProjPoint) -> Self {
        Self::from_center_size(center, self.size())
    }
}
