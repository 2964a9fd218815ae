//! Environment state
//!
//! Everything the per-frame step mutates lives in [`Environment`]. It is built
//! once from a seed, so the same seed and tuning always produce the same world.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::camera::FollowCamera;
use super::destructible::{DestructibleId, DestructibleRegistry};
use super::fragments::{BurstId, FragmentSimulator};
use super::placement::{PlacementPlan, SceneryKind, plan_placements};
use super::collision::CollisionHit;
use super::resources::{InstanceHandle, RenderHandle, ResourceTable};
use super::track::{TrackGeometry, TrackLayout};
use crate::error::ConfigError;
use crate::tuning::Tuning;

/// Something the renderer or game layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvironmentEvent {
    /// An object was hit and replaced by a debris burst
    Destroyed {
        destructible: DestructibleId,
        kind: SceneryKind,
        burst: BurstId,
    },
    /// A burst finished; its per-burst material can be freed
    BurstExpired { burst: BurstId, mesh: RenderHandle },
}

/// The simulated world around the vehicle
#[derive(Debug, Clone)]
pub struct Environment {
    /// World seed for reproducibility
    pub seed: u64,
    pub track: TrackGeometry,
    pub layout: TrackLayout,
    pub destructibles: DestructibleRegistry,
    pub bursts: FragmentSimulator,
    pub camera: FollowCamera,
    pub vehicle_radius: f32,
    pub max_frame_dt: f32,
    /// Total simulated seconds
    pub elapsed: f64,
    /// Frames stepped so far
    pub frame: u64,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<EnvironmentEvent>,
    // Per-frame scratch, cleared at the start of each step
    pub(crate) hits: Vec<CollisionHit>,
    pub(crate) expired: Vec<BurstId>,
}

impl Environment {
    /// Build the stock world described by `tuning`
    pub fn from_tuning(tuning: &Tuning, resources: &ResourceTable, seed: u64) -> Result<Self, ConfigError> {
        let track = TrackGeometry::from_tuning(&tuning.track)?;
        let plan = PlacementPlan::for_track(&track, &tuning.jungle);
        build_world(track, &plan, resources, tuning, seed)
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EnvironmentEvent> {
        self.events.drain(..)
    }

    pub fn pending_events(&self) -> &[EnvironmentEvent] {
        &self.events
    }

    /// Release every live burst before the world is dropped
    ///
    /// Queues a `BurstExpired` for each one so per-burst materials are freed
    /// on this path too. Returns how many were released.
    pub fn teardown(&mut self) -> usize {
        self.expired.clear();
        self.bursts.clear(&mut self.expired);
        let mesh = self.bursts.mesh();
        self.events.extend(
            self.expired
                .iter()
                .map(|&burst| EnvironmentEvent::BurstExpired { burst, mesh }),
        );
        if !self.expired.is_empty() {
            log::debug!("Teardown released {} live bursts", self.expired.len());
        }
        self.expired.len()
    }
}

/// Scatter the plan around the track and register every object
///
/// Fails before placing anything if the tuning or plan is degenerate or a
/// planned category has no render resources.
pub fn build_world(
    track: TrackGeometry,
    plan: &PlacementPlan,
    resources: &ResourceTable,
    tuning: &Tuning,
    seed: u64,
) -> Result<Environment, ConfigError> {
    tuning.validate()?;
    plan.validate()?;
    for spec in plan.categories.iter().filter(|c| c.count > 0) {
        if resources.scenery(spec.kind).is_none() {
            return Err(ConfigError::MissingResource(spec.kind.as_str()));
        }
    }

    let mut rng = Pcg32::seed_from_u64(seed);
    let placed = plan_placements(&mut rng, &track, plan)?;

    let mut destructibles = DestructibleRegistry::with_capacity(placed.len());
    let mut instance_counts = [0u32; SceneryKind::ALL.len()];
    for object in &placed {
        // Checked above for every category with a non-zero count
        let Some(resource) = resources.scenery(object.kind) else {
            continue;
        };
        let slot = &mut instance_counts[object.kind as usize];
        let handle = InstanceHandle {
            mesh: resource.mesh,
            instance: *slot,
        };
        *slot += 1;
        destructibles.register(handle, object, resource.color);
    }

    log::info!(
        "World built: seed {}, {} destructibles, track {}x{} (road {})",
        seed,
        destructibles.len(),
        track.radius_x(),
        track.radius_z(),
        track.road_width()
    );

    Ok(Environment {
        seed,
        track,
        layout: TrackLayout::build(&track, &tuning.track),
        destructibles,
        bursts: FragmentSimulator::new(tuning.fragments.clone(), resources.fragment_mesh),
        camera: FollowCamera::new(tuning.camera.clone()),
        vehicle_radius: tuning.vehicle.collision_radius,
        max_frame_dt: tuning.vehicle.max_frame_dt,
        elapsed: 0.0,
        frame: 0,
        rng,
        events: Vec::new(),
        hits: Vec::new(),
        expired: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_world() {
        let tuning = Tuning::default();
        let env = Environment::from_tuning(&tuning, &ResourceTable::with_defaults(), 1234).unwrap();
        assert_eq!(env.destructibles.len(), 640);
        assert_eq!(env.destructibles.active_count(), 640);
        assert_eq!(env.bursts.live_count(), 0);
        assert!(!env.layout.is_empty());
    }

    #[test]
    fn test_instance_indices_per_kind() {
        let env =
            Environment::from_tuning(&Tuning::default(), &ResourceTable::with_defaults(), 1).unwrap();
        let rocks: Vec<_> = env
            .destructibles
            .iter()
            .filter(|d| d.kind == SceneryKind::Rock)
            .collect();
        assert_eq!(rocks.len(), 88);
        for (i, rock) in rocks.iter().enumerate() {
            assert_eq!(rock.handle.instance, i as u32);
            assert_eq!(rock.color, SceneryKind::Rock.default_color());
        }
        let first_tree = env
            .destructibles
            .iter()
            .find(|d| d.kind == SceneryKind::Tree)
            .unwrap();
        assert_eq!(first_tree.handle.instance, 0);
    }

    #[test]
    fn test_same_seed_reproduces_world() {
        let tuning = Tuning::default();
        let res = ResourceTable::with_defaults();
        let a = Environment::from_tuning(&tuning, &res, 77).unwrap();
        let b = Environment::from_tuning(&tuning, &res, 77).unwrap();
        for (x, y) in a.destructibles.iter().zip(b.destructibles.iter()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.radius, y.radius);
        }
    }

    #[test]
    fn test_missing_resource_rejected() {
        let tuning = Tuning::default();
        let mut res = ResourceTable::new(
            RenderHandle(1),
            ResourceTable::with_defaults().track,
        );
        res.insert(SceneryKind::Rock, RenderHandle(2), SceneryKind::Rock.default_color());
        let err = Environment::from_tuning(&tuning, &res, 0).unwrap_err();
        assert!(matches!(err, ConfigError::MissingResource("tree")));
    }

    #[test]
    fn test_teardown_releases_live_bursts() {
        let mut env =
            Environment::from_tuning(&Tuning::default(), &ResourceTable::with_defaults(), 5).unwrap();
        let targets: Vec<_> = env.destructibles.iter().take(2).map(|d| d.position).collect();
        for target in targets {
            crate::sim::step_environment(&mut env, 0.0, target);
        }
        let live: Vec<BurstId> = env.bursts.iter().map(|b| b.id).collect();
        assert!(!live.is_empty());
        env.drain_events().for_each(drop);

        assert_eq!(env.teardown(), live.len());
        let released: Vec<_> = env.drain_events().collect();
        assert_eq!(released.len(), live.len());
        for event in &released {
            match event {
                EnvironmentEvent::BurstExpired { burst, mesh } => {
                    assert!(live.contains(burst));
                    assert_eq!(*mesh, RenderHandle(100));
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(env.bursts.live_count(), 0);
        assert_eq!(env.teardown(), 0);
        assert!(env.pending_events().is_empty());
    }

    #[test]
    fn test_degenerate_tuning_rejected() {
        let mut tuning = Tuning::default();
        tuning.fragments.max_count = 2;
        let err =
            Environment::from_tuning(&tuning, &ResourceTable::with_defaults(), 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFragments(_)));
    }
}
