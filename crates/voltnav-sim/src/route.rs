//! Route loading for the simulator.

use crate::config::RouteConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use voltnav_geo::straight_line_route;
use voltnav_types::Position;

/// Errors that can occur when loading a route file.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("failed to read route file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse route file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("route needs at least 2 points, got {0}")]
    TooShort(usize),
}

/// Accepted route file shapes: a bare coordinate array, or a GeoJSON
/// `LineString` geometry as returned by directions APIs.
#[derive(Deserialize)]
#[serde(untagged)]
enum RouteFile {
    Points(Vec<Position>),
    LineString { coordinates: Vec<Position> },
}

/// Parses route JSON.
pub fn parse_route(json: &str) -> Result<Vec<Position>, RouteError> {
    let points = match serde_json::from_str::<RouteFile>(json)? {
        RouteFile::Points(points) => points,
        RouteFile::LineString { coordinates } => coordinates,
    };
    if points.len() < 2 {
        return Err(RouteError::TooShort(points.len()));
    }
    Ok(points)
}

/// Reads a route file.
pub fn load_route(path: impl AsRef<Path>) -> Result<Vec<Position>, RouteError> {
    let contents = std::fs::read_to_string(path)?;
    parse_route(&contents)
}

/// The route described by `config`: the route file if one is set, otherwise
/// a straight line between the configured endpoints.
pub fn build_route(config: &RouteConfig) -> Result<Vec<Position>, RouteError> {
    match &config.file {
        Some(file) => {
            let route = load_route(file)?;
            tracing::info!(path = %file, points = route.len(), "loaded route file");
            Ok(route)
        }
        None => {
            let route = straight_line_route(config.start, config.end);
            tracing::info!(
                start = %config.start,
                end = %config.end,
                points = route.len(),
                "using straight-line route"
            );
            Ok(route)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_coordinate_array() {
        let route = parse_route("[[13.37, 52.51], [13.40, 52.52], [13.41, 52.53]]").unwrap();
        assert_eq!(route.len(), 3);
        assert_eq!(route[1], Position::new(13.40, 52.52));
    }

    #[test]
    fn parses_geojson_linestring() {
        let json = r#"{"type": "LineString", "coordinates": [[-122.39, 37.79], [-122.40, 37.78]]}"#;
        let route = parse_route(json).unwrap();
        assert_eq!(route, vec![Position::new(-122.39, 37.79), Position::new(-122.40, 37.78)]);
    }

    #[test]
    fn rejects_short_and_malformed_routes() {
        assert!(matches!(parse_route("[[1.0, 2.0]]"), Err(RouteError::TooShort(1))));
        assert!(matches!(parse_route("[]"), Err(RouteError::TooShort(0))));
        assert!(matches!(parse_route("{\"points\": 3}"), Err(RouteError::Parse(_))));
    }

    #[test]
    fn build_prefers_route_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.json");
        std::fs::write(&path, "[[0.0, 0.0], [0.0, 0.5]]").unwrap();

        let config = RouteConfig {
            file: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        assert_eq!(build_route(&config).unwrap().len(), 2);
    }

    #[test]
    fn build_falls_back_to_straight_line() {
        let config = RouteConfig::default();
        let route = build_route(&config).unwrap();
        assert!(route.len() >= 6);
        assert_eq!(route[0], config.start);
    }

    #[test]
    fn missing_route_file_is_a_read_error() {
        let config = RouteConfig {
            file: Some("/nonexistent/route.json".to_string()),
            ..Default::default()
        };
        assert!(matches!(build_route(&config), Err(RouteError::Read(_))));
    }
}
