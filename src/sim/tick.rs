//! Per-frame environment step
//!
//! Order within a frame: clamp dt, collide, spawn bursts for new hits,
//! integrate bursts, then move the camera.

use glam::Vec3;

use super::camera::{CameraPose, VehiclePose};
use super::collision::detect_collisions;
use super::state::{Environment, EnvironmentEvent};

/// What the mover hands the environment each frame
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Measured wall-clock frame time (seconds)
    pub dt: f32,
    pub vehicle: VehiclePose,
}

/// Clamp a measured frame time so a stall cannot launch debris across the map
///
/// Negative or NaN measurements become 0.
#[inline]
pub fn clamp_frame_dt(measured: f32, max: f32) -> f32 {
    if measured.is_nan() {
        return 0.0;
    }
    measured.clamp(0.0, max)
}

/// Collide, spawn debris for every new hit, and advance live bursts
///
/// `dt` is used as given; call [`clamp_frame_dt`] first.
pub fn step_environment(env: &mut Environment, dt: f32, vehicle_position: Vec3) {
    env.hits.clear();
    detect_collisions(
        &mut env.destructibles,
        vehicle_position,
        env.vehicle_radius,
        &mut env.hits,
    );

    for hit in &env.hits {
        let kind = match env.destructibles.get(hit.id) {
            Some(obj) => obj.kind,
            None => continue,
        };
        let burst = env
            .bursts
            .spawn(&mut env.rng, hit.id, hit.position, hit.radius, hit.color);
        env.events.push(EnvironmentEvent::Destroyed {
            destructible: hit.id,
            kind,
            burst,
        });
    }
    if !env.hits.is_empty() {
        log::debug!(
            "Frame {}: {} destroyed, {} remaining",
            env.frame,
            env.hits.len(),
            env.destructibles.active_count()
        );
    }

    env.expired.clear();
    env.bursts.step(dt, &mut env.expired);
    let mesh = env.bursts.mesh();
    env.events.extend(
        env.expired
            .iter()
            .map(|&burst| EnvironmentEvent::BurstExpired { burst, mesh }),
    );

    env.elapsed += dt as f64;
    env.frame += 1;
}

/// Move the chase camera toward the vehicle
pub fn update_camera(env: &mut Environment, vehicle: &VehiclePose, dt: f32) -> CameraPose {
    env.camera.update(vehicle, dt)
}

/// Advance the environment by one rendered frame
pub fn tick(env: &mut Environment, input: &TickInput) -> CameraPose {
    let dt = clamp_frame_dt(input.dt, env.max_frame_dt);
    step_environment(env, dt, input.vehicle.position);
    update_camera(env, &input.vehicle, dt)
}
