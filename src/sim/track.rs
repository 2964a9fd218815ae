//! Closed elliptical course geometry
//!
//! The track is parameterised by `t` in [0, 1): `t = 0` sits on the +X axis and
//! the curve runs counter-clockwise seen from above (toward +Z first).

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::error::ConfigError;
use crate::tuning::TrackTuning;
use crate::wrap_unit;

/// Ellipse semi-axes and road width (world units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    radius_x: f32,
    radius_z: f32,
    road_width: f32,
}

impl TrackGeometry {
    pub fn new(radius_x: f32, radius_z: f32, road_width: f32) -> Result<Self, ConfigError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !(valid(radius_x) && valid(radius_z) && valid(road_width)) {
            return Err(ConfigError::NonPositiveTrack {
                radius_x,
                radius_z,
                road_width,
            });
        }
        Ok(Self {
            radius_x,
            radius_z,
            road_width,
        })
    }

    pub fn from_tuning(tuning: &TrackTuning) -> Result<Self, ConfigError> {
        Self::new(tuning.radius_x, tuning.radius_z, tuning.road_width)
    }

    #[inline]
    pub fn radius_x(&self) -> f32 {
        self.radius_x
    }

    #[inline]
    pub fn radius_z(&self) -> f32 {
        self.radius_z
    }

    #[inline]
    pub fn road_width(&self) -> f32 {
        self.road_width
    }

    /// Z/X ratio; scatter bands and infield shapes follow it
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.radius_z / self.radius_x
    }

    /// Ground-plane point `(x, z)` at curve parameter `t`
    pub fn point_at(&self, t: f32) -> (f32, f32) {
        let angle = wrap_unit(t) * TAU;
        (angle.cos() * self.radius_x, angle.sin() * self.radius_z)
    }

    /// Same as [`point_at`](Self::point_at) lifted to a world position at height `y`
    pub fn world_point_at(&self, t: f32, y: f32) -> Vec3 {
        let (x, z) = self.point_at(t);
        Vec3::new(x, y, z)
    }

    /// Y-axis rotation that makes an object face along the direction of travel
    ///
    /// Objects are modelled facing +Z, so the derivative terms are swapped and
    /// negated relative to a plain `atan2(dz, dx)`.
    pub fn tangent_angle_at(&self, t: f32) -> f32 {
        let angle = wrap_unit(t) * TAU;
        (-angle.sin() * self.radius_x).atan2(angle.cos() * self.radius_z)
    }

    /// Y-axis rotation facing away from the infield (curbs, fence posts)
    pub fn outward_angle_at(&self, t: f32) -> f32 {
        let angle = wrap_unit(t) * TAU;
        (angle.cos() * self.radius_x).atan2(-angle.sin() * self.radius_z)
    }

    /// Ramanujan's approximation of the ellipse perimeter
    pub fn circumference(&self) -> f32 {
        let (a, b) = (self.radius_x, self.radius_z);
        PI * (3.0 * (a + b) - ((3.0 * a + b) * (a + 3.0 * b)).sqrt())
    }
}

/// One instanced piece of the course
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPiece {
    pub position: Vec3,
    pub yaw: f32,
}

/// Instance transforms for everything that draws the course itself
#[derive(Debug, Clone, Default)]
pub struct TrackLayout {
    pub road_segments: Vec<TrackPiece>,
    /// Length of each road box so neighbours overlap slightly
    pub road_segment_length: f32,
    /// Width the road boxes are stretched to across the direction of travel
    pub road_width: f32,
    pub lane_markers: Vec<TrackPiece>,
    pub inner_curbs: Vec<TrackPiece>,
    pub outer_curbs: Vec<TrackPiece>,
    pub fence_posts: Vec<TrackPiece>,
}

impl TrackLayout {
    pub fn build(track: &TrackGeometry, tuning: &TrackTuning) -> Self {
        let segments = tuning.road_segment_count.max(1);
        let road_segment_length = track.circumference() / segments as f32 * 1.18;
        let w = track.road_width();

        let along = |count: u32, y: f32| -> Vec<TrackPiece> {
            (0..count)
                .map(|i| {
                    let t = i as f32 / count as f32;
                    TrackPiece {
                        position: track.world_point_at(t, y),
                        yaw: track.tangent_angle_at(t),
                    }
                })
                .collect()
        };

        let ring = |count: u32, grow: f32, y: f32| -> Vec<TrackPiece> {
            // Offset ellipse; only the radii change, so the outward facing is
            // taken from a track with the offset radii
            let rx = track.radius_x() + grow;
            let rz = track.radius_z() + grow;
            let offset = TrackGeometry::new(rx.max(f32::EPSILON), rz.max(f32::EPSILON), w);
            let Ok(offset) = offset else {
                return Vec::new();
            };
            (0..count)
                .map(|i| {
                    let t = i as f32 / count as f32;
                    TrackPiece {
                        position: offset.world_point_at(t, y),
                        yaw: offset.outward_angle_at(t),
                    }
                })
                .collect()
        };

        Self {
            road_segments: along(segments, 0.13),
            road_segment_length,
            road_width: w,
            lane_markers: along(tuning.lane_marker_count, 0.25),
            inner_curbs: ring(tuning.curb_block_count, -w * 0.55, 0.15),
            outer_curbs: ring(tuning.curb_block_count, w * 0.55, 0.15),
            fence_posts: ring(tuning.fence_post_count, w * 0.9 + 0.9, 0.36),
        }
    }

    /// Total instance count across every piece kind
    pub fn len(&self) -> usize {
        self.road_segments.len()
            + self.lane_markers.len()
            + self.inner_curbs.len()
            + self.outer_curbs.len()
            + self.fence_posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
