//! Collision detection strategies
//!
//! Two checkers query the same occupancy model: a cheap bounding-sphere
//! overlap test for the search's inner loop, and a precise multi-point
//! footprint test for trajectory validation outside the search.

use std::sync::Arc;

use nalgebra::{Rotation2, Vector2};

use crate::common::{normalize_angle_positive, CollisionChecker, Point2D, VehicleState};
use crate::track::Track;
use crate::vehicle::VehicleParams;

/// Vehicle-as-disc collision test.
///
/// The vehicle is a disc of radius equal to the half-diagonal of its
/// bounding rectangle. Only the 3x3 tile neighborhood of the disc center is
/// examined; collision is reported iff the disc overlaps an occupied or
/// out-of-bounds tile in that neighborhood.
#[derive(Debug, Clone)]
pub struct BoundingSphereChecker {
    track: Arc<Track>,
    radius: f64,
}

impl BoundingSphereChecker {
    pub fn new(track: Arc<Track>, params: &VehicleParams) -> Self {
        Self {
            radius: params.bounding_radius(),
            track,
        }
    }

    pub fn with_radius(track: Arc<Track>, radius: f64) -> Self {
        Self { track, radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Disc-vs-tile overlap: squared distance from the disc center to the
    /// closest point of the tile rectangle
    fn disc_overlaps_tile(&self, center: &Point2D, col: i32, row: i32) -> bool {
        let tile = self.track.tile_size();
        let nearest_x = center.x.clamp(col as f64 * tile, (col + 1) as f64 * tile);
        let nearest_y = center.y.clamp(row as f64 * tile, (row + 1) as f64 * tile);
        let dx = center.x - nearest_x;
        let dy = center.y - nearest_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Collision test for a raw disc center, independent of heading
    pub fn point_collides(&self, center: &Point2D) -> bool {
        let (col, row) = self.track.tile_of(center);
        for dr in -1..=1 {
            for dc in -1..=1 {
                let (c, r) = (col + dc, row + dr);
                if self.track.is_occupied(c, r) && self.disc_overlaps_tile(center, c, r) {
                    return true;
                }
            }
        }
        false
    }
}

impl CollisionChecker for BoundingSphereChecker {
    fn is_collision(&self, state: &VehicleState) -> bool {
        self.point_collides(&state.position)
    }
}

/// Precise vehicle-footprint collision test.
///
/// A ring of heading angles is discretized once at construction; for each
/// bucket the three vehicle-frame reference points (front-left, front,
/// front-right) are pre-rotated. A query picks the bucket for the state's
/// heading and checks the offset points against occupancy.
#[derive(Debug, Clone)]
pub struct FootprintChecker {
    track: Arc<Track>,
    // [bucket][reference point]
    offsets: Vec<[Vector2<f64>; 3]>,
    bucket_width: f64,
}

/// Default angular resolution of the precomputed heading ring
pub const DEFAULT_HEADING_SAMPLES: usize = 36;

impl FootprintChecker {
    pub fn new(track: Arc<Track>, params: &VehicleParams) -> Self {
        Self::with_heading_samples(track, params, DEFAULT_HEADING_SAMPLES)
    }

    pub fn with_heading_samples(
        track: Arc<Track>,
        params: &VehicleParams,
        samples: usize,
    ) -> Self {
        let samples = samples.max(1);
        let bucket_width = 2.0 * std::f64::consts::PI / samples as f64;
        let half_len = params.length / 2.0;
        let half_width = params.width / 2.0;
        let reference = [
            Vector2::new(half_len, half_width),
            Vector2::new(half_len, 0.0),
            Vector2::new(half_len, -half_width),
        ];
        let offsets = (0..samples)
            .map(|i| {
                let rot = Rotation2::new(i as f64 * bucket_width);
                [rot * reference[0], rot * reference[1], rot * reference[2]]
            })
            .collect();
        Self { track, offsets, bucket_width }
    }

    fn bucket_of(&self, heading: f64) -> usize {
        let idx = (normalize_angle_positive(heading) / self.bucket_width).floor() as usize;
        idx.min(self.offsets.len() - 1)
    }
}

impl CollisionChecker for FootprintChecker {
    fn is_collision(&self, state: &VehicleState) -> bool {
        let bucket = self.bucket_of(state.heading);
        self.offsets[bucket].iter().any(|offset| {
            let p = Point2D::new(state.position.x + offset.x, state.position.y + offset.y);
            self.track.point_occupied(&p)
        })
    }
}
