//! Conversions between geographic and projected coordinates.

use std::f64::consts::PI;

use crate::geo::{GeoPos, GeoRect, ProjPoint, ProjRect};

/// Web Mercator valid latitude range
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;

/// WGS84 semi-major axis in meters
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Read-only transform owned by the map and shared by every attached item.
pub trait Projection {
    fn name(&self) -> &str;

    fn geo_to_proj(&self, geo: GeoPos) -> ProjPoint;

    fn proj_to_geo(&self, proj: ProjPoint) -> GeoPos;

    fn geo_rect_to_proj(&self, rect: GeoRect) -> ProjRect {
        ProjRect::from_two_points(
            self.geo_to_proj(rect.top_left()),
            self.geo_to_proj(rect.bottom_right()),
        )
    }

    fn proj_rect_to_geo(&self, rect: ProjRect) -> GeoRect {
        GeoRect::from_corners(self.proj_to_geo(rect.min), self.proj_to_geo(rect.max))
    }
}

/// Spherical Web Mercator (EPSG:3857) in meters, with y pointing south.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn name(&self) -> &str {
        "EPSG3857"
    }

    fn geo_to_proj(&self, geo: GeoPos) -> ProjPoint {
        let lat = geo.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let lon = geo.lon.clamp(-180.0, 180.0);
        let x = EARTH_RADIUS * lon.to_radians();
        let y = -EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        ProjPoint::new(x, y)
    }

    fn proj_to_geo(&self, proj: ProjPoint) -> GeoPos {
        let lon = (proj.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (-proj.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        GeoPos::new(lat, lon)
    }
}
