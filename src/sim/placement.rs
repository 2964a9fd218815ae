//! Procedural scenery placement
//!
//! Pure generation: turns a [`PlacementPlan`] into world transforms using an
//! injected RNG. Nothing here knows about rendering, and overlapping objects
//! are allowed.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::track::TrackGeometry;
use crate::error::ConfigError;
use crate::tuning::JungleTuning;
use crate::Rgb;

/// Scenery categories scattered around the course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneryKind {
    Rock,
    Tree,
    Bush,
    GrassClump,
    Monkey,
    Lion,
    Deer,
    Cow,
}

impl SceneryKind {
    /// Placement order; changing it changes every seeded world
    pub const ALL: [SceneryKind; 8] = [
        SceneryKind::Rock,
        SceneryKind::Tree,
        SceneryKind::Bush,
        SceneryKind::GrassClump,
        SceneryKind::Monkey,
        SceneryKind::Lion,
        SceneryKind::Deer,
        SceneryKind::Cow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneryKind::Rock => "rock",
            SceneryKind::Tree => "tree",
            SceneryKind::Bush => "bush",
            SceneryKind::GrassClump => "grass_clump",
            SceneryKind::Monkey => "monkey",
            SceneryKind::Lion => "lion",
            SceneryKind::Deer => "deer",
            SceneryKind::Cow => "cow",
        }
    }

    pub fn is_animal(&self) -> bool {
        matches!(
            self,
            SceneryKind::Monkey | SceneryKind::Lion | SceneryKind::Deer | SceneryKind::Cow
        )
    }

    /// Color of the dominant block material (used to tint debris)
    pub fn default_color(&self) -> Rgb {
        match self {
            SceneryKind::Rock => Rgb::from_hex(0x8a8f94),
            SceneryKind::Tree | SceneryKind::Monkey | SceneryKind::Deer => Rgb::from_hex(0x9a7447),
            SceneryKind::Bush => Rgb::from_hex(0x4f8b49),
            SceneryKind::GrassClump => Rgb::from_hex(0x7fc55b),
            SceneryKind::Lion => Rgb::from_hex(0xc79b63),
            SceneryKind::Cow => Rgb::from_hex(0xece3bf),
        }
    }

    /// Spawn count, scale range and footprint of the stock jungle
    pub fn default_spec(&self) -> CategorySpec {
        let (count, min_scale, max_scale, base_radius) = match self {
            SceneryKind::Rock => (88, 0.5, 1.15, 0.55),
            SceneryKind::Tree => (136, 0.75, 1.35, 0.96),
            SceneryKind::Bush => (142, 0.7, 1.15, 0.72),
            SceneryKind::GrassClump => (184, 0.6, 1.15, 0.34),
            SceneryKind::Monkey => (22, 0.74, 1.06, 0.66),
            SceneryKind::Lion => (16, 0.88, 1.22, 0.84),
            SceneryKind::Deer => (24, 0.84, 1.2, 0.8),
            SceneryKind::Cow => (28, 0.9, 1.2, 0.82),
        };
        CategorySpec {
            kind: *self,
            count,
            min_scale,
            max_scale,
            base_radius,
        }
    }
}

/// How many of one category to place and how big they get
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    pub kind: SceneryKind,
    pub count: u32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Collision radius at scale 1.0
    pub base_radius: f32,
}

impl CategorySpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.min_scale > 0.0
            && self.min_scale <= self.max_scale
            && self.max_scale.is_finite()
            && self.base_radius > 0.0
            && self.base_radius.is_finite()
            && (self.base_radius * self.max_scale).is_finite();
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidScaleRange {
                category: self.kind.as_str(),
                min_scale: self.min_scale,
                max_scale: self.max_scale,
                base_radius: self.base_radius,
            })
        }
    }
}

/// Static description of what to scatter and where
#[derive(Debug, Clone)]
pub struct PlacementPlan {
    /// Inner edge of the band along X (Z follows the track aspect)
    pub min_radius: f32,
    pub max_radius: f32,
    pub side_jitter: f32,
    pub categories: Vec<CategorySpec>,
}

impl PlacementPlan {
    /// Band starts just outside the road and reaches `max_radius`
    pub fn for_track(track: &TrackGeometry, jungle: &JungleTuning) -> Self {
        Self {
            min_radius: track.radius_x() + track.road_width() * 0.5 + jungle.min_radius_offset,
            max_radius: jungle.max_radius,
            side_jitter: jungle.side_jitter,
            categories: jungle.categories.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_radius > 0.0 && self.min_radius <= self.max_radius && self.max_radius.is_finite())
            || !(self.side_jitter >= 0.0 && self.side_jitter.is_finite())
        {
            return Err(ConfigError::InvalidRadiusBand {
                min_radius: self.min_radius,
                max_radius: self.max_radius,
            });
        }
        for spec in &self.categories {
            spec.validate()?;
        }
        Ok(())
    }

    /// Total number of objects the plan will place
    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.count as usize).sum()
    }

    pub fn count_of(&self, kind: SceneryKind) -> u32 {
        self.categories
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.count)
            .sum()
    }

    /// True when every animal kind gets at least one figurine
    pub fn has_animal_set(&self) -> bool {
        SceneryKind::ALL
            .iter()
            .filter(|k| k.is_animal())
            .all(|k| self.count_of(*k) > 0)
    }
}

/// A generated scenery transform plus its collision footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedObject {
    pub kind: SceneryKind,
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
    pub radius: f32,
}

/// Sample a ground point in the band, stretched to the track's aspect ratio
pub fn sample_band_point<R: Rng + ?Sized>(
    rng: &mut R,
    track: &TrackGeometry,
    min_radius: f32,
    max_radius: f32,
    side_jitter: f32,
) -> Vec3 {
    let angle = rng.random_range(0.0..TAU);
    let radius_x = rng.random_range(min_radius..=max_radius);
    let radius_z = radius_x * track.aspect();
    let jitter = rng.random_range(-side_jitter..=side_jitter);

    Vec3::new(
        angle.cos() * radius_x + (angle + FRAC_PI_2).cos() * jitter,
        0.0,
        angle.sin() * radius_z + (angle + FRAC_PI_2).sin() * jitter,
    )
}

/// Generate every object in the plan, category by category
pub fn plan_placements<R: Rng + ?Sized>(
    rng: &mut R,
    track: &TrackGeometry,
    plan: &PlacementPlan,
) -> Result<Vec<PlacedObject>, ConfigError> {
    plan.validate()?;

    let mut placed = Vec::with_capacity(plan.total());
    for spec in &plan.categories {
        for _ in 0..spec.count {
            let scale = rng.random_range(spec.min_scale..=spec.max_scale);
            let position =
                sample_band_point(rng, track, plan.min_radius, plan.max_radius, plan.side_jitter);
            let yaw = rng.random_range(0.0..TAU);
            placed.push(PlacedObject {
                kind: spec.kind,
                position,
                yaw,
                scale,
                radius: spec.base_radius * scale,
            });
        }
    }
    Ok(placed)
}
