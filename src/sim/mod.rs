//! Deterministic environment simulation
//!
//! Everything the driving loop needs besides the vehicle itself. This module
//! must stay pure and deterministic:
//! - Seeded RNG only, owned by the environment
//! - Stable iteration order (by destructible id, then burst slot)
//! - No rendering or platform dependencies; meshes are opaque handles

pub mod camera;
pub mod collision;
pub mod destructible;
pub mod fragments;
pub mod placement;
pub mod resources;
pub mod state;
pub mod stops;
pub mod tick;
pub mod track;

pub use camera::{CameraPose, FollowCamera, VehiclePose, smoothing_factor};
pub use collision::{CollisionHit, circles_overlap_xz, detect_collisions};
pub use destructible::{Destructible, DestructibleId, DestructibleRegistry};
pub use fragments::{BurstId, Fragment, FragmentBurst, FragmentSimulator, fade_alpha};
pub use placement::{
    CategorySpec, PlacedObject, PlacementPlan, SceneryKind, plan_placements, sample_band_point,
};
pub use resources::{InstanceHandle, RenderHandle, ResourceTable, SceneryResource, TrackMeshes};
pub use state::{Environment, EnvironmentEvent, build_world};
pub use stops::{NearestStop, Stop, StopRing, highlight_pulse};
pub use tick::{TickInput, clamp_frame_dt, step_environment, tick, update_camera};
pub use track::{TrackGeometry, TrackLayout, TrackPiece};
