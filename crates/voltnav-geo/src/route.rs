//! Route polylines: fallback construction, length, and progress tracking.

use crate::{distance_meters, heading_degrees, interpolate};
use voltnav_types::Position;

/// Minimum number of segments in a straight-line fallback route.
const MIN_FALLBACK_STEPS: usize = 5;

/// Builds a straight-line route from `start` to `end`.
///
/// Used when no planned route is available. The line is split into one
/// segment per kilometre, with at least five segments, so a vehicle moving
/// along it passes several sample points. Returns `steps + 1` points
/// including both endpoints.
pub fn straight_line_route(start: Position, end: Position) -> Vec<Position> {
    let distance = distance_meters(start, end);
    let steps = ((distance / 1000.0).floor() as usize).max(MIN_FALLBACK_STEPS);

    (0..=steps)
        .map(|i| interpolate(start, end, i as f64 / steps as f64))
        .collect()
}

/// Total length of a polyline in meters.
pub fn route_length_meters(route: &[Position]) -> f64 {
    route
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .sum()
}

/// Tracks how far a vehicle has travelled along a route.
///
/// Progress is measured in meters from the first point. Advancing past the
/// end clamps to the last point.
#[derive(Debug, Clone)]
pub struct RouteFollower {
    route: Vec<Position>,
    /// Cumulative distance at each point; `offsets[0] == 0`.
    offsets: Vec<f64>,
    travelled: f64,
}

impl RouteFollower {
    pub fn new(route: Vec<Position>) -> Self {
        let mut offsets = Vec::with_capacity(route.len());
        let mut total = 0.0;
        for (i, point) in route.iter().enumerate() {
            if i > 0 {
                total += distance_meters(route[i - 1], *point);
            }
            offsets.push(total);
        }
        Self {
            route,
            offsets,
            travelled: 0.0,
        }
    }

    /// Route length in meters.
    pub fn total_meters(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    pub fn travelled_meters(&self) -> f64 {
        self.travelled
    }

    pub fn remaining_meters(&self) -> f64 {
        (self.total_meters() - self.travelled).max(0.0)
    }

    /// True once the vehicle has reached the last point. An empty or
    /// single-point route is finished from the start.
    pub fn is_finished(&self) -> bool {
        self.route.len() < 2 || self.travelled >= self.total_meters()
    }

    /// Moves forward by `meters`. Negative values are ignored.
    pub fn advance(&mut self, meters: f64) {
        if meters > 0.0 {
            self.travelled = (self.travelled + meters).min(self.total_meters());
        }
    }

    /// Index of the segment currently being driven: the vehicle is between
    /// `route[i]` and `route[i + 1]`. Zero-length segments are never chosen.
    fn segment(&self) -> Option<usize> {
        if self.route.len() < 2 {
            return None;
        }
        let last = self.route.len() - 2;
        // First segment whose end lies beyond the travelled distance.
        let idx = self.offsets[1..]
            .iter()
            .position(|&end| end > self.travelled)
            .unwrap_or(last);
        // At the very end, step back over any trailing zero-length segments.
        let mut idx = idx.min(last);
        while idx > 0 && self.offsets[idx + 1] - self.offsets[idx] <= 0.0 {
            idx -= 1;
        }
        Some(idx)
    }

    /// Current interpolated position, or `None` for an empty route.
    pub fn position(&self) -> Option<Position> {
        match self.segment() {
            None => self.route.first().copied(),
            Some(i) => {
                let start = self.offsets[i];
                let length = self.offsets[i + 1] - start;
                if length <= 0.0 {
                    return Some(self.route[i]);
                }
                let t = ((self.travelled - start) / length).clamp(0.0, 1.0);
                Some(interpolate(self.route[i], self.route[i + 1], t))
            }
        }
    }

    /// Marker heading along the current segment, or `None` if the route has
    /// no segment with length.
    pub fn heading(&self) -> Option<f64> {
        let i = self.segment()?;
        let (a, b) = (self.route[i], self.route[i + 1]);
        if a == b {
            return None;
        }
        Some(heading_degrees(a, b))
    }
}
