//! Frame instance buffer
//!
//! Flattens the environment into one contiguous `InstanceRaw` array plus a
//! list of draw ranges, one per mesh batch. The buffer is cleared and refilled
//! every frame; its allocations are kept.

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::instance::{InstanceRaw, colors};
use crate::sim::{
    BurstId, DestructibleRegistry, Environment, FragmentSimulator, RenderHandle, TrackLayout,
    TrackMeshes, TrackPiece,
};

/// A run of instances drawn with one mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRange {
    pub mesh: RenderHandle,
    /// Set for debris; the renderer keys its per-burst material on it
    pub burst: Option<BurstId>,
    pub start: u32,
    pub count: u32,
    /// Material opacity
    pub opacity: f32,
}

#[derive(Debug, Clone, Default)]
pub struct InstanceBuffer {
    instances: Vec<InstanceRaw>,
    ranges: Vec<DrawRange>,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.ranges.clear();
    }

    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    pub fn ranges(&self) -> &[DrawRange] {
        &self.ranges
    }

    /// Raw bytes ready for `queue.write_buffer`
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Whole frame: course, scenery, then debris
    pub fn write_environment(&mut self, env: &Environment, track_meshes: &TrackMeshes) {
        self.clear();
        self.write_track_layout(&env.layout, track_meshes);
        self.write_destructibles(&env.destructibles);
        self.write_bursts(&env.bursts);
    }

    fn push_range(&mut self, mesh: RenderHandle, burst: Option<BurstId>, opacity: f32, start: usize) {
        let count = self.instances.len() - start;
        if count > 0 {
            self.ranges.push(DrawRange {
                mesh,
                burst,
                start: start as u32,
                count: count as u32,
                opacity,
            });
        }
    }

    fn write_pieces(&mut self, mesh: RenderHandle, pieces: &[TrackPiece], scale: Vec3) {
        let start = self.instances.len();
        self.instances.extend(
            pieces
                .iter()
                .map(|p| InstanceRaw::from_yaw(p.position, p.yaw, scale, colors::TRACK_TINT, true)),
        );
        self.push_range(mesh, None, 1.0, start);
    }

    /// Road boxes, lane markers, both curb rings and the fence
    pub fn write_track_layout(&mut self, layout: &TrackLayout, meshes: &TrackMeshes) {
        // Road boxes are a unit footprint: X spans the road, Z overlaps neighbours
        self.write_pieces(
            meshes.road,
            &layout.road_segments,
            Vec3::new(layout.road_width, 1.0, layout.road_segment_length),
        );
        self.write_pieces(meshes.lane_marker, &layout.lane_markers, Vec3::ONE);
        let start = self.instances.len();
        for piece in layout.inner_curbs.iter().chain(layout.outer_curbs.iter()) {
            self.instances.push(InstanceRaw::from_yaw(
                piece.position,
                piece.yaw,
                Vec3::ONE,
                colors::TRACK_TINT,
                true,
            ));
        }
        self.push_range(meshes.curb, None, 1.0, start);
        self.write_pieces(meshes.fence_post, &layout.fence_posts, Vec3::ONE);
    }

    /// Every destructible in id order; destroyed ones are written hidden
    pub fn write_destructibles(&mut self, registry: &DestructibleRegistry) {
        let mut run: Option<(RenderHandle, usize)> = None;
        for obj in registry.iter() {
            match run {
                Some((mesh, _)) if mesh == obj.handle.mesh => {}
                Some((mesh, start)) => {
                    self.push_range(mesh, None, 1.0, start);
                    run = Some((obj.handle.mesh, self.instances.len()));
                }
                None => run = Some((obj.handle.mesh, self.instances.len())),
            }
            self.instances.push(InstanceRaw::from_yaw(
                obj.position,
                obj.yaw,
                Vec3::splat(obj.scale),
                obj.color.with_alpha(1.0),
                obj.is_visible(),
            ));
        }
        if let Some((mesh, start)) = run {
            self.push_range(mesh, None, 1.0, start);
        }
    }

    /// One range per live burst, faded and shrunk by its age
    pub fn write_bursts(&mut self, bursts: &FragmentSimulator) {
        for burst in bursts.iter() {
            let alpha = burst.alpha();
            let color = burst.tint.with_alpha(alpha);
            let start = self.instances.len();
            for fragment in &burst.fragments {
                let r = fragment.rotation;
                let rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
                let model = Mat4::from_scale_rotation_translation(
                    Vec3::splat(fragment.rendered_scale(alpha)),
                    rotation,
                    fragment.position,
                );
                self.instances.push(InstanceRaw::new(model, color, true));
            }
            self.push_range(burst.mesh, Some(burst.id), alpha, start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ResourceTable, TickInput, VehiclePose, tick};
    use crate::tuning::Tuning;

    fn env() -> (Environment, ResourceTable) {
        let resources = ResourceTable::with_defaults();
        let env = Environment::from_tuning(&Tuning::default(), &resources, 99).unwrap();
        (env, resources)
    }

    #[test]
    fn test_ranges_cover_buffer() {
        let (env, resources) = env();
        let mut buffer = InstanceBuffer::new();
        buffer.write_environment(&env, &resources.track);

        let total: u32 = buffer.ranges().iter().map(|r| r.count).sum();
        assert_eq!(total as usize, buffer.instances().len());
        let mut next = 0;
        for range in buffer.ranges() {
            assert_eq!(range.start, next);
            next += range.count;
        }
        // Four track batches, then one per scenery kind
        assert_eq!(buffer.ranges().len(), 4 + 8);
        assert_eq!(buffer.ranges()[2].count, 2 * 250);
        assert_eq!(buffer.as_bytes().len(), buffer.instances().len() * 96);
    }

    #[test]
    fn test_road_boxes_span_road_width() {
        let (env, resources) = env();
        let mut buffer = InstanceBuffer::new();
        buffer.write_track_layout(&env.layout, &resources.track);

        let road = buffer.ranges()[0];
        assert_eq!(road.mesh, resources.track.road);
        // First segment sits at t = 0 with yaw 0, so model axes line up with the world
        let model = Mat4::from_cols_array_2d(&buffer.instances()[0].model);
        let (scale, _, _) = model.to_scale_rotation_translation();
        assert!((scale.x - env.track.road_width()).abs() < 1e-4);
        assert!((scale.z - env.layout.road_segment_length).abs() < 1e-4);
        assert!((scale.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_destroyed_objects_stay_in_place_hidden() {
        let (mut env, _) = env();
        let target = env.destructibles.iter().next().unwrap().position;
        let mut buffer = InstanceBuffer::new();
        buffer.write_destructibles(&env.destructibles);
        let before = buffer.instances().len();

        tick(
            &mut env,
            &TickInput {
                dt: 1.0 / 60.0,
                vehicle: VehiclePose::from_yaw(target, 0.0, 0.0),
            },
        );
        buffer.clear();
        buffer.write_destructibles(&env.destructibles);
        assert_eq!(buffer.instances().len(), before);
        assert!(!buffer.instances()[0].is_visible());
        assert!((buffer.instances()[0].translation() - target).length() < 1e-4);
    }

    #[test]
    fn test_burst_ranges_carry_opacity() {
        let (mut env, _) = env();
        let target = env.destructibles.iter().next().unwrap().position;
        tick(
            &mut env,
            &TickInput {
                dt: 0.0,
                vehicle: VehiclePose::from_yaw(target, 0.0, 0.0),
            },
        );
        let mut buffer = InstanceBuffer::new();
        buffer.write_bursts(&env.bursts);
        assert_eq!(buffer.ranges().len(), env.bursts.live_count());
        let range = buffer.ranges()[0];
        assert!(range.burst.is_some());
        assert_eq!(range.mesh, RenderHandle(100));
        assert_eq!(range.opacity, 1.0);
        let color = buffer.instances()[0].color;
        assert_eq!(color[3], 1.0);
    }
}
