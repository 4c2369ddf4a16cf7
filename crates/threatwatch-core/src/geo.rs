//! Spherical geodesy helpers. Distances are metres on a 6 371 km sphere,
//! which is what the map layer measures with as well.

use serde::{Deserialize, Serialize};

use crate::types::Position;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

impl Position {
    /// Haversine great-circle distance in metres.
    pub fn distance_m(&self, other: &Position) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_M * c
    }

    /// Coordinate-wise midpoint. Adequate for the short separations
    /// corridors are drawn between.
    pub fn midpoint(&self, other: &Position) -> Position {
        Position::new((self.lat + other.lat) / 2.0, (self.lon + other.lon) / 2.0)
    }

    /// Linear interpolation in coordinate space; `t = 0` is `self`,
    /// `t = 1` is `other`.
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position::new(
            self.lat + (other.lat - self.lat) * t,
            self.lon + (other.lon - self.lon) * t,
        )
    }

    /// Point reached travelling `distance_m` along the initial bearing
    /// `bearing_deg` (clockwise from north).
    pub fn offset(&self, bearing_deg: f64, distance_m: f64) -> Position {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        let lon_deg = (lon2.to_degrees() + 540.0) % 360.0 - 180.0;
        Position::new(lat2.to_degrees(), lon_deg)
    }
}

// ─── Bounds ───────────────────────────────────────────────────────

/// Axis-aligned lat/lon box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south: first.lat,
            west: first.lon,
            north: first.lat,
            east: first.lon,
        };
        for p in iter {
            bounds.south = bounds.south.min(p.lat);
            bounds.north = bounds.north.max(p.lat);
            bounds.west = bounds.west.min(p.lon);
            bounds.east = bounds.east.max(p.lon);
        }
        Some(bounds)
    }

    /// Grow every side by `ratio` of the corresponding span.
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_buffer = (self.north - self.south).abs() * ratio;
        let lon_buffer = (self.east - self.west).abs() * ratio;
        Self {
            south: self.south - lat_buffer,
            west: self.west - lon_buffer,
            north: self.north + lat_buffer,
            east: self.east + lon_buffer,
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn contains(&self, p: &Position) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lon >= self.west && p.lon <= self.east
    }
}
