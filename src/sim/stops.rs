//! Roadside stops
//!
//! Signposts spaced evenly around the loop just outside the road. They are
//! points of interest only: not destructible and not part of collisions.

use glam::Vec3;
use std::f32::consts::TAU;

use super::track::TrackGeometry;
use crate::polar_to_cartesian;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub index: usize,
    pub position: Vec3,
    /// Faces the infield
    pub yaw: f32,
}

/// Result of a proximity query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestStop {
    pub index: usize,
    pub distance: f32,
}

#[derive(Debug, Clone, Default)]
pub struct StopRing {
    stops: Vec<Stop>,
}

impl StopRing {
    /// Place `count` stops, pushed out radially by `road_width * 0.9 + 2.2`
    pub fn build(track: &TrackGeometry, count: usize) -> Self {
        let offset = track.road_width() * 0.9 + 2.2;
        let stops = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                let (x, z) = track.point_at(i as f32 / count as f32);
                let push = polar_to_cartesian(offset, angle);
                let position = Vec3::new(x + push.x, 0.0, z + push.y);
                Stop {
                    index: i,
                    position,
                    yaw: (-position.x).atan2(-position.z),
                }
            })
            .collect();
        Self { stops }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn get(&self, index: usize) -> Option<&Stop> {
        self.stops.get(index)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Closest stop within `range` (3D distance); ties go to the later stop
    pub fn nearest_within(&self, position: Vec3, range: f32) -> Option<NearestStop> {
        let mut best: Option<(usize, f32)> = None;
        let mut best_dist_sq = range * range;
        for stop in &self.stops {
            let dist_sq = stop.position.distance_squared(position);
            if dist_sq <= best_dist_sq {
                best = Some((stop.index, dist_sq));
                best_dist_sq = dist_sq;
            }
        }
        best.map(|(index, dist_sq)| NearestStop {
            index,
            distance: dist_sq.sqrt(),
        })
    }
}

/// Emissive pulse for the highlighted sign at `time` seconds
#[inline]
pub fn highlight_pulse(time: f32) -> f32 {
    0.4 + (time * 4.0).sin() * 0.2
}
