//! Geodesic helpers for navigation.
//!
//! Distances use the haversine formula on a spherical Earth, which is
//! accurate to well under one percent at the sub-kilometre scales where
//! announcement thresholds matter.

pub mod route;

pub use route::{route_length_meters, straight_line_route, RouteFollower};

use serde::{Deserialize, Serialize};
use std::fmt;
use voltnav_types::Position;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
///
/// Symmetric in its arguments and exactly `0.0` for identical points.
pub fn distance_meters(a: Position, b: Position) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    // Rounding can push `h` just past 1 for antipodal points.
    let h = ((dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2))
        .min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from `from` to `to` in degrees, in [0, 360).
///
/// When `from == to` there is no direction; the formula reduces to
/// `atan2(0, 0)` and this returns `0.0` (north).
pub fn bearing_degrees(from: Position, to: Position) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlng = (to.lng - from.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Planar heading from `from` to `to` in degrees, in [0, 360).
///
/// Treats longitude and latitude deltas as screen axes. This is what a map
/// marker is rotated by; it is not a true bearing away from the equator.
pub fn heading_degrees(from: Position, to: Position) -> f64 {
    let dlng = to.lng - from.lng;
    let dlat = to.lat - from.lat;
    normalize_degrees(dlng.atan2(dlat).to_degrees())
}

/// Linear interpolation between two positions. `t` is not clamped.
pub fn interpolate(a: Position, b: Position, t: f64) -> Position {
    Position::new(a.lng + (b.lng - a.lng) * t, a.lat + (b.lat - a.lat) * t)
}

fn normalize_degrees(deg: f64) -> f64 {
    let n = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if n >= 360.0 {
        0.0
    } else {
        n
    }
}

/// The eight principal compass directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassDirection {
    const ALL: [Self; 8] = [
        Self::North,
        Self::Northeast,
        Self::East,
        Self::Southeast,
        Self::South,
        Self::Southwest,
        Self::West,
        Self::Northwest,
    ];

    /// Nearest direction to a bearing in degrees, using 45° buckets centred
    /// on each direction. Bearings outside [0, 360) are wrapped first.
    pub fn from_bearing(bearing: f64) -> Self {
        let index = (normalize_degrees(bearing) / 45.0).round() as usize % 8;
        Self::ALL[index]
    }

    /// Lower-case name as spoken in instructions.
    pub fn label(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::Northeast => "northeast",
            Self::East => "east",
            Self::Southeast => "southeast",
            Self::South => "south",
            Self::Southwest => "southwest",
            Self::West => "west",
            Self::Northwest => "northwest",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compass direction name for a bearing.
pub fn direction_name(bearing: f64) -> &'static str {
    CompassDirection::from_bearing(bearing).label()
}
