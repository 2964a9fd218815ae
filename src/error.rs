//! Configuration errors
//!
//! The simulation itself never fails once built; every error here is raised
//! while validating tuning or assembling the world.

use thiserror::Error;

/// Invalid world or effect configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Track radii and road width must be positive and finite
    #[error("track dimensions must be positive (radius_x={radius_x}, radius_z={radius_z}, road_width={road_width})")]
    NonPositiveTrack {
        radius_x: f32,
        radius_z: f32,
        road_width: f32,
    },

    /// A scenery category has an empty or negative scale range
    #[error("invalid scale range for {category}: {min_scale}..{max_scale} (base radius {base_radius})")]
    InvalidScaleRange {
        category: &'static str,
        min_scale: f32,
        max_scale: f32,
        base_radius: f32,
    },

    /// Placement band is inverted or not positive
    #[error("invalid placement band {min_radius}..{max_radius}")]
    InvalidRadiusBand { min_radius: f32, max_radius: f32 },

    /// Debris settings out of range
    #[error("invalid fragment settings: {0}")]
    InvalidFragments(&'static str),

    /// Camera or vehicle settings out of range
    #[error("invalid camera settings: {0}")]
    InvalidCamera(&'static str),

    /// A planned scenery category has no mesh registered
    #[error("no render resource registered for {0}")]
    MissingResource(&'static str),

    /// Tuning JSON could not be parsed
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
}
