//! Paper Loop - a destructible-scenery driving course
//!
//! Core modules:
//! - `sim`: Environment simulation (placement, destructibles, debris bursts, chase camera)
//! - `renderer`: Renderer-facing instance buffers
//! - `tuning`: Data-driven world and effect constants
//! - `error`: Configuration errors

pub mod error;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::Tuning;

use glam::{Vec2, Vec3};

/// World configuration constants
pub mod consts {
    /// Largest frame delta fed into the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Default course dimensions
    pub const TRACK_RADIUS_X: f32 = 26.0;
    pub const TRACK_RADIUS_Z: f32 = 18.0;
    pub const ROAD_WIDTH: f32 = 5.0;

    /// Vehicle footprint used for scenery collisions
    pub const VEHICLE_COLLISION_RADIUS: f32 = 1.25;

    /// Debris defaults
    pub const FRAGMENT_MIN_COUNT: u32 = 10;
    pub const FRAGMENT_MAX_COUNT: u32 = 24;
    pub const FRAGMENT_GRAVITY: f32 = 12.0;
    pub const FRAGMENT_MIN_TTL: f32 = 0.75;
    pub const FRAGMENT_MAX_TTL: f32 = 1.2;
    /// Linear velocity decay per second (approximates air drag)
    pub const FRAGMENT_DRAG: f32 = 0.55;

    /// Scenery band: starts this far past the outer road edge
    pub const JUNGLE_MIN_RADIUS_OFFSET: f32 = 5.8;
    pub const JUNGLE_MAX_RADIUS: f32 = 82.0;
    /// Sideways scatter applied to every placed object
    pub const JUNGLE_SIDE_JITTER: f32 = 1.3;
}

/// Wrap a curve parameter into [0, 1)
#[inline]
pub fn wrap_unit(t: f32) -> f32 {
    let wrapped = t.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Planar (x, z) offset between two world positions, ignoring height
#[inline]
pub fn ground_delta(a: Vec3, b: Vec3) -> Vec2 {
    Vec2::new(a.x - b.x, a.z - b.z)
}

/// RGB color in linear 0-1 space
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed 0xRRGGBB value
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// RGBA array with the given alpha
    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}
