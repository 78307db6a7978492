//! Track file loading
//!
//! The consumed track file is JSON: tile size, circuit (capture radius,
//! start, ordered waypoint positions) and the occupancy grid encoded as one
//! string per row, where a space is a free tile and any other character is
//! occupied.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::common::{PlanningError, PlanningResult, Point2D};

use super::{Circuit, Track};

#[derive(Debug, Deserialize)]
struct TrackFile {
    tile_size: f64,
    circuit: CircuitFile,
    grid: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CircuitFile {
    radius: f64,
    start: [f64; 2],
    waypoints: Vec<[f64; 2]>,
}

/// Parse a track and its circuit from a JSON string
pub fn parse_track(json: &str) -> PlanningResult<(Track, Circuit)> {
    let file: TrackFile = serde_json::from_str(json)?;
    if file.tile_size <= 0.0 {
        return Err(PlanningError::TrackFormat(format!(
            "tile size must be positive, got {}",
            file.tile_size
        )));
    }
    if file.grid.is_empty() {
        return Err(PlanningError::TrackFormat("empty occupancy grid".to_string()));
    }
    if file.circuit.waypoints.is_empty() {
        return Err(PlanningError::TrackFormat("circuit has no waypoints".to_string()));
    }

    let track = Track::from_rows(file.tile_size, &file.grid);
    let circuit = Circuit::new(
        Point2D::new(file.circuit.start[0], file.circuit.start[1]),
        file.circuit.radius,
        file.circuit
            .waypoints
            .iter()
            .map(|w| Point2D::new(w[0], w[1]))
            .collect(),
    );
    debug!(
        "loaded track: {}x{} tiles of {} m, {} waypoints",
        track.cols(),
        track.rows(),
        track.tile_size(),
        circuit.waypoints.len()
    );
    Ok((track, circuit))
}

/// Load a track and its circuit from a file
pub fn load_track<P: AsRef<Path>>(path: P) -> PlanningResult<(Track, Circuit)> {
    let json = fs::read_to_string(path)?;
    parse_track(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#######"{
        "tile_size": 2.0,
        "circuit": {
            "radius": 1.5,
            "start": [3.0, 3.0],
            "waypoints": [[9.0, 3.0], [9.0, 7.0]]
        },
        "grid": [
            "######",
            "#    #",
            "#    #",
            "#    #",
            "######"
        ]
    }"#######;

    #[test]
    fn test_parse_track() {
        let (track, circuit) = parse_track(SAMPLE).unwrap();
        assert_eq!(track.cols(), 6);
        assert_eq!(track.rows(), 5);
        assert!((track.tile_size() - 2.0).abs() < 1e-10);
        assert!(track.is_occupied(0, 0));
        assert!(!track.is_occupied(1, 1));
        assert_eq!(circuit.waypoints.len(), 2);
        assert_eq!(circuit.start, Point2D::new(3.0, 3.0));
        assert!((circuit.waypoint_radius - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(matches!(
            parse_track("not json"),
            Err(PlanningError::TrackFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_nonpositive_tile_size() {
        let bad = SAMPLE.replace("\"tile_size\": 2.0", "\"tile_size\": 0.0");
        assert!(matches!(
            parse_track(&bad),
            Err(PlanningError::TrackFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_circuit() {
        let bad = SAMPLE.replace("[[9.0, 3.0], [9.0, 7.0]]", "[]");
        assert!(matches!(
            parse_track(&bad),
            Err(PlanningError::TrackFormat(_))
        ));
    }
}
