//! Vehicle vs scenery collision detection
//!
//! Everything is a circle on the ground plane. A linear scan of squared
//! distances over the active objects, O(n) per frame.

use glam::Vec3;

use super::destructible::{DestructibleId, DestructibleRegistry};
use crate::{Rgb, ground_delta};

/// What the debris system needs from a freshly destroyed object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    pub id: DestructibleId,
    pub position: Vec3,
    pub radius: f32,
    pub color: Rgb,
}

/// True when two ground circles touch; touching exactly counts
#[inline]
pub fn circles_overlap_xz(a: Vec3, b: Vec3, reach: f32) -> bool {
    ground_delta(a, b).length_squared() <= reach * reach
}

/// Test the vehicle against every active destructible
///
/// Each hit object is deactivated and appended to `hits`. Objects that are
/// already inactive are skipped, so an object can only ever be reported once.
/// Returns the number of new hits.
pub fn detect_collisions(
    registry: &mut DestructibleRegistry,
    vehicle_position: Vec3,
    vehicle_radius: f32,
    hits: &mut Vec<CollisionHit>,
) -> usize {
    // Gather first, then deactivate; the registry hands out ids, not borrows
    let start = hits.len();
    for obj in registry.active() {
        if circles_overlap_xz(obj.position, vehicle_position, vehicle_radius + obj.radius) {
            hits.push(CollisionHit {
                id: obj.id,
                position: obj.position,
                radius: obj.radius,
                color: obj.color,
            });
        }
    }
    for hit in &hits[start..] {
        registry.deactivate(hit.id);
    }

    hits.len() - start
}
