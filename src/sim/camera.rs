//! Chase camera trailing the vehicle
//!
//! Offsets are in vehicle space (+Z forward, +Y up). Smoothing is an
//! exponential lerp, `1 - base^dt`, so the lag is the same at any frame rate.

use glam::{Mat4, Quat, Vec3};

use crate::tuning::CameraTuning;

/// What the mover reports about the vehicle each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehiclePose {
    pub position: Vec3,
    pub orientation: Quat,
    /// Signed speed along the vehicle's forward axis (negative = reversing)
    pub speed: f32,
}

impl VehiclePose {
    /// Pose for a vehicle turned `yaw` radians about +Y
    pub fn from_yaw(position: Vec3, yaw: f32, speed: f32) -> Self {
        Self {
            position,
            orientation: Quat::from_rotation_y(yaw),
            speed,
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Vehicle-space offset to world space
    #[inline]
    pub fn to_world(&self, offset: Vec3) -> Vec3 {
        self.orientation * offset + self.position
    }
}

/// Eye and look-at point for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Right-handed view matrix, +Y up
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/// Fraction of the remaining gap closed in `dt` seconds
#[inline]
pub fn smoothing_factor(dt: f32, base: f32) -> f32 {
    1.0 - base.powf(dt.max(0.0))
}

#[derive(Debug, Clone)]
pub struct FollowCamera {
    settings: CameraTuning,
    position: Vec3,
    target: Vec3,
}

impl FollowCamera {
    pub fn new(settings: CameraTuning) -> Self {
        let position = settings.initial_position;
        Self {
            settings,
            position,
            target: Vec3::ZERO,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
        }
    }

    /// Snap straight to the desired pose (spawn, teleport)
    pub fn reset(&mut self, vehicle: &VehiclePose) {
        self.position = self.desired_position(vehicle);
        self.target = self.look_target(vehicle);
    }

    /// Where the camera would sit with no smoothing lag
    pub fn desired_position(&self, vehicle: &VehiclePose) -> Vec3 {
        vehicle.to_world(self.settings.base_offset)
    }

    /// Look-at point, pushed ahead (or behind, when reversing) with speed
    pub fn look_target(&self, vehicle: &VehiclePose) -> Vec3 {
        let target = vehicle.to_world(self.settings.target_offset);
        let distance =
            (vehicle.speed.abs() * self.settings.look_ahead_factor).min(self.settings.max_look_ahead);
        if distance > self.settings.look_ahead_threshold {
            target + vehicle.forward() * distance * vehicle.speed.signum()
        } else {
            target
        }
    }

    /// Move toward the vehicle and return this frame's pose
    pub fn update(&mut self, vehicle: &VehiclePose, dt: f32) -> CameraPose {
        let desired = self.desired_position(vehicle);
        let t = smoothing_factor(dt, self.settings.smoothing_base);
        self.position = self.position.lerp(desired, t);
        self.target = self.look_target(vehicle);
        self.pose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn camera() -> FollowCamera {
        FollowCamera::new(CameraTuning::default())
    }

    #[test]
    fn test_smoothing_factor_is_frame_rate_independent() {
        // Two half steps close the same gap as one full step
        let full = smoothing_factor(0.1, 0.001);
        let half = smoothing_factor(0.05, 0.001);
        let two_halves = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((full - two_halves).abs() < 1e-5);
        assert_eq!(smoothing_factor(0.0, 0.001), 0.0);
    }

    #[test]
    fn test_desired_position_follows_heading() {
        let cam = camera();
        let pose = VehiclePose::from_yaw(Vec3::new(10.0, 0.35, 5.0), 0.0, 0.0);
        let desired = cam.desired_position(&pose);
        assert!((desired - Vec3::new(10.0, 5.15, -3.5)).length() < 1e-5);

        // Facing +X: behind is -X
        let pose = VehiclePose::from_yaw(Vec3::ZERO, FRAC_PI_2, 0.0);
        let desired = cam.desired_position(&pose);
        assert!((desired - Vec3::new(-8.5, 4.8, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_look_ahead_signed_and_capped() {
        let cam = camera();
        let base = Vec3::new(0.0, 1.6, 3.0);

        let still = VehiclePose::from_yaw(Vec3::ZERO, 0.0, 0.0);
        assert!((cam.look_target(&still) - base).length() < 1e-6);

        let forward = VehiclePose::from_yaw(Vec3::ZERO, 0.0, 10.0);
        assert!((cam.look_target(&forward) - (base + Vec3::Z * 1.2)).length() < 1e-5);

        let reversing = VehiclePose::from_yaw(Vec3::ZERO, 0.0, -5.0);
        assert!((cam.look_target(&reversing) - (base - Vec3::Z * 0.6)).length() < 1e-5);

        let flat_out = VehiclePose::from_yaw(Vec3::ZERO, 0.0, 100.0);
        assert!((cam.look_target(&flat_out) - (base + Vec3::Z * 4.0)).length() < 1e-5);

        // Below the threshold the look-ahead collapses
        let creeping = VehiclePose::from_yaw(Vec3::ZERO, 0.0, 0.05);
        assert!((cam.look_target(&creeping) - base).length() < 1e-6);
    }

    #[test]
    fn test_update_moves_toward_desired() {
        let mut cam = camera();
        let pose = VehiclePose::from_yaw(Vec3::new(26.0, 0.35, 0.0), 0.0, 0.0);
        let desired = cam.desired_position(&pose);
        let before = (cam.position() - desired).length();
        let out = cam.update(&pose, 1.0 / 60.0);
        let after = (out.position - desired).length();
        assert!(after < before);
        // Closes exactly the smoothing fraction of the gap
        let expected = before * (1.0 - smoothing_factor(1.0 / 60.0, 0.001));
        assert!((after - expected).abs() < 1e-3);
    }

    #[test]
    fn test_reset_snaps() {
        let mut cam = camera();
        let pose = VehiclePose::from_yaw(Vec3::new(3.0, 0.0, 4.0), 1.0, 0.0);
        cam.reset(&pose);
        assert!((cam.position() - cam.desired_position(&pose)).length() < 1e-6);
    }

    #[test]
    fn test_view_matrix_looks_at_target() {
        let pose = CameraPose {
            position: Vec3::new(0.0, 5.0, -10.0),
            target: Vec3::ZERO,
        };
        let view = pose.view_matrix();
        // The target lands on the -Z axis in view space
        let p = view.transform_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4 && p.z < 0.0);
    }

    proptest! {
        #[test]
        fn prop_converges_for_stationary_vehicle(
            x in -80.0f32..80.0,
            z in -80.0f32..80.0,
            yaw in -3.2f32..3.2,
            dt in 0.005f32..0.05,
        ) {
            let mut cam = camera();
            let pose = VehiclePose::from_yaw(Vec3::new(x, 0.35, z), yaw, 0.0);
            let desired = cam.desired_position(&pose);
            // 0.001^3 leaves a millionth of the gap after three seconds
            let steps = (3.0 / dt).ceil() as usize;
            for _ in 0..steps {
                cam.update(&pose, dt);
            }
            prop_assert!((cam.position() - desired).length() < 1e-3);
        }
    }
}
