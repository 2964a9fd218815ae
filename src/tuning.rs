//! World and effect tuning
//!
//! Every constant the environment uses is data-driven through [`Tuning`] so a
//! course can be reshaped from JSON without recompiling.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::placement::{CategorySpec, PlacementPlan, SceneryKind};
use crate::sim::track::TrackGeometry;

/// Course shape and how densely the road is tiled
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackTuning {
    pub radius_x: f32,
    pub radius_z: f32,
    pub road_width: f32,
    pub road_segment_count: u32,
    pub lane_marker_count: u32,
    pub curb_block_count: u32,
    pub fence_post_count: u32,
}

impl Default for TrackTuning {
    fn default() -> Self {
        Self {
            radius_x: TRACK_RADIUS_X,
            radius_z: TRACK_RADIUS_Z,
            road_width: ROAD_WIDTH,
            road_segment_count: 210,
            lane_marker_count: 84,
            curb_block_count: 250,
            fence_post_count: 96,
        }
    }
}

/// Scenery scatter band and per-category spawn settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JungleTuning {
    /// Gap between the outer road edge and the start of the band
    pub min_radius_offset: f32,
    /// Outer band radius along the X axis
    pub max_radius: f32,
    /// Half-width of the sideways scatter
    pub side_jitter: f32,
    pub categories: Vec<CategorySpec>,
}

impl Default for JungleTuning {
    fn default() -> Self {
        Self {
            min_radius_offset: JUNGLE_MIN_RADIUS_OFFSET,
            max_radius: JUNGLE_MAX_RADIUS,
            side_jitter: JUNGLE_SIDE_JITTER,
            categories: SceneryKind::ALL.iter().map(|k| k.default_spec()).collect(),
        }
    }
}

/// Debris burst settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentTuning {
    pub min_count: u32,
    pub max_count: u32,
    pub gravity: f32,
    pub min_ttl: f32,
    pub max_ttl: f32,
    pub drag: f32,
}

impl Default for FragmentTuning {
    fn default() -> Self {
        Self {
            min_count: FRAGMENT_MIN_COUNT,
            max_count: FRAGMENT_MAX_COUNT,
            gravity: FRAGMENT_GRAVITY,
            min_ttl: FRAGMENT_MIN_TTL,
            max_ttl: FRAGMENT_MAX_TTL,
            drag: FRAGMENT_DRAG,
        }
    }
}

impl FragmentTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_count == 0 {
            return Err(ConfigError::InvalidFragments("min_count must be at least 1"));
        }
        if self.min_count > self.max_count {
            return Err(ConfigError::InvalidFragments("min_count exceeds max_count"));
        }
        if !(self.min_ttl > 0.0 && self.min_ttl <= self.max_ttl && self.max_ttl.is_finite()) {
            return Err(ConfigError::InvalidFragments("ttl range must be positive and ordered"));
        }
        if !self.gravity.is_finite() || !(self.drag >= 0.0 && self.drag.is_finite()) {
            return Err(ConfigError::InvalidFragments("gravity or drag out of range"));
        }
        Ok(())
    }
}

/// Chase camera settings (offsets are in vehicle space, +Z forward)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub base_offset: Vec3,
    pub target_offset: Vec3,
    /// Fraction of the gap left after one second of smoothing
    pub smoothing_base: f32,
    pub look_ahead_factor: f32,
    pub max_look_ahead: f32,
    /// Look-ahead shorter than this is dropped
    pub look_ahead_threshold: f32,
    pub initial_position: Vec3,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            base_offset: Vec3::new(0.0, 4.8, -8.5),
            target_offset: Vec3::new(0.0, 1.6, 3.0),
            smoothing_base: 0.001,
            look_ahead_factor: 0.12,
            max_look_ahead: 4.0,
            look_ahead_threshold: 0.01,
            initial_position: Vec3::new(0.0, 6.0, -12.0),
        }
    }
}

impl CameraTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing_base > 0.0 && self.smoothing_base < 1.0) {
            return Err(ConfigError::InvalidCamera("smoothing_base must be in (0, 1)"));
        }
        if !(self.max_look_ahead >= 0.0 && self.look_ahead_factor >= 0.0) {
            return Err(ConfigError::InvalidCamera("look-ahead must be non-negative"));
        }
        Ok(())
    }
}

/// Complete environment tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub track: TrackTuning,
    pub jungle: JungleTuning,
    pub fragments: FragmentTuning,
    pub camera: CameraTuning,
    pub vehicle: VehicleTuning,
}

/// What the environment needs to know about the vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub collision_radius: f32,
    pub max_frame_dt: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            collision_radius: VEHICLE_COLLISION_RADIUS,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize for inspection or saving next to a build
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Use the given JSON if it parses and validates, defaults otherwise
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(tuning)) => {
                log::info!("Loaded environment tuning");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Ignoring tuning ({e}), using defaults");
                Self::default()
            }
            None => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }

    /// Check every section; the world builder calls this before placing anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        let track = TrackGeometry::from_tuning(&self.track)?;
        self.fragments.validate()?;
        self.camera.validate()?;
        let vehicle = &self.vehicle;
        if !(vehicle.collision_radius >= 0.0
            && vehicle.collision_radius.is_finite()
            && vehicle.max_frame_dt > 0.0
            && vehicle.max_frame_dt.is_finite())
        {
            return Err(ConfigError::InvalidCamera(
                "vehicle radius must be non-negative and max_frame_dt positive",
            ));
        }
        // Drag is applied as `1 - drag * dt`; it must stay positive for the longest frame
        if self.fragments.drag * vehicle.max_frame_dt >= 1.0 {
            return Err(ConfigError::InvalidFragments(
                "drag too strong for the longest frame",
            ));
        }
        PlacementPlan::for_track(&track, &self.jungle).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.jungle.categories.len(), 8);
        assert_eq!(tuning.fragments.min_count, 10);
        assert_eq!(tuning.fragments.max_count, 24);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning = Tuning::from_json(r#"{ "fragments": { "gravity": 9.8 } }"#).unwrap();
        assert!((tuning.fragments.gravity - 9.8).abs() < 1e-6);
        assert_eq!(tuning.fragments.max_count, FRAGMENT_MAX_COUNT);
        assert!((tuning.track.radius_x - TRACK_RADIUS_X).abs() < 1e-6);
    }

    #[test]
    fn test_json_roundtrip_preserves_categories() {
        let json = Tuning::default().to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back.jungle.categories[0].kind, SceneryKind::Rock);
        assert_eq!(back.jungle.categories[0].count, 88);
    }

    #[test]
    fn test_rejects_degenerate_track() {
        let err = Tuning::from_json(r#"{ "track": { "radius_x": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveTrack { .. }));
    }

    #[test]
    fn test_rejects_inverted_fragment_counts() {
        let err = Tuning::from_json(r#"{ "fragments": { "min_count": 30, "max_count": 5 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFragments(_)));
    }

    #[test]
    fn test_rejects_band_inside_road() {
        let err = Tuning::from_json(r#"{ "jungle": { "max_radius": 10.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRadiusBand { .. }));

        let tuning = Tuning::load_or_default(Some(r#"{ "jungle": { "max_radius": 10.0 } }"#));
        assert!((tuning.jungle.max_radius - JUNGLE_MAX_RADIUS).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_negative_side_jitter() {
        let err = Tuning::from_json(r#"{ "jungle": { "side_jitter": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRadiusBand { .. }));
    }

    #[test]
    fn test_drag_checked_against_longest_frame() {
        let err = Tuning::from_json(
            r#"{ "fragments": { "drag": 5.0 }, "vehicle": { "max_frame_dt": 0.5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFragments(_)));

        // The same drag is fine when frames are clamped short enough
        let tuning = Tuning::from_json(
            r#"{ "fragments": { "drag": 5.0 }, "vehicle": { "max_frame_dt": 0.1 } }"#,
        )
        .unwrap();
        assert!((tuning.fragments.drag - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_unbounded_frame_clamp() {
        let mut tuning = Tuning::default();
        tuning.vehicle.max_frame_dt = f32::INFINITY;
        assert!(matches!(tuning.validate(), Err(ConfigError::InvalidCamera(_))));
    }

    #[test]
    fn test_bad_json_falls_back_to_defaults() {
        let tuning = Tuning::load_or_default(Some("{ not json"));
        assert_eq!(tuning.fragments.min_count, FRAGMENT_MIN_COUNT);
        let tuning = Tuning::load_or_default(None);
        assert!((tuning.vehicle.collision_radius - VEHICLE_COLLISION_RADIUS).abs() < 1e-6);
    }
}
