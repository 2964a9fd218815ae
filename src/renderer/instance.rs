//! Per-instance data for instanced scenery, track and debris draws

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// One instanced draw: transform, tint and a visibility flag
///
/// Hidden instances keep their slot so instance indices never shift when an
/// object is destroyed; the vertex shader collapses them instead.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub visible: u32,
    pub _pad: [u32; 3],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
        10 => Uint32,
    ];

    pub fn new(model: Mat4, color: [f32; 4], visible: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color,
            visible: visible as u32,
            _pad: [0; 3],
        }
    }

    /// Scale, then yaw about +Y, then translation
    pub fn from_yaw(position: Vec3, yaw: f32, scale: Vec3, color: [f32; 4], visible: bool) -> Self {
        Self::new(
            Mat4::from_scale_rotation_translation(scale, Quat::from_rotation_y(yaw), position),
            color,
            visible,
        )
    }

    pub fn is_visible(&self) -> bool {
        self.visible != 0
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_slice(&self.model[3][..3])
    }

    /// Instance-rate layout; locations 0-4 are left for the mesh vertex
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Stock tints
pub mod colors {
    /// Track meshes are textured; the tint passes the texture through
    pub const TRACK_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 96);
        let desc = InstanceRaw::desc();
        assert_eq!(desc.array_stride, 96);
        assert_eq!(desc.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(desc.attributes.len(), 6);
        assert_eq!(desc.attributes[4].offset, 64);
        assert_eq!(desc.attributes[5].offset, 80);
        assert_eq!(desc.attributes[5].shader_location, 10);
    }

    #[test]
    fn test_from_yaw_places_instance() {
        let inst = InstanceRaw::from_yaw(
            Vec3::new(1.0, 2.0, 3.0),
            0.5,
            Vec3::ONE,
            colors::TRACK_TINT,
            true,
        );
        assert_eq!(inst.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert!(inst.is_visible());
        let bytes: &[u8] = bytemuck::bytes_of(&inst);
        assert_eq!(bytes.len(), 96);
    }
}
