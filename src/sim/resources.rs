//! Render handle tables handed to the world builder
//!
//! The simulation never creates meshes or materials. The caller registers
//! opaque handles here, keeps ownership of the real resources, and frees
//! per-burst material state when it sees a burst expire.

use std::collections::HashMap;

use super::placement::SceneryKind;
use crate::Rgb;

/// Opaque reference to a renderer-owned mesh/material batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u32);

/// One instance slot inside an instanced scenery batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    pub mesh: RenderHandle,
    pub instance: u32,
}

/// Mesh and debris tint for one scenery category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneryResource {
    pub mesh: RenderHandle,
    pub color: Rgb,
}

/// Meshes the course itself is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackMeshes {
    pub road: RenderHandle,
    pub lane_marker: RenderHandle,
    pub curb: RenderHandle,
    pub fence_post: RenderHandle,
}

/// Caller-owned handle table passed into world building
#[derive(Debug, Clone)]
pub struct ResourceTable {
    scenery: HashMap<SceneryKind, SceneryResource>,
    /// Unit cube shared by every debris burst
    pub fragment_mesh: RenderHandle,
    pub track: TrackMeshes,
}

impl ResourceTable {
    pub fn new(fragment_mesh: RenderHandle, track: TrackMeshes) -> Self {
        Self {
            scenery: HashMap::new(),
            fragment_mesh,
            track,
        }
    }

    /// Sequential handles for every category with the stock block colors
    pub fn with_defaults() -> Self {
        let mut table = Self::new(
            RenderHandle(100),
            TrackMeshes {
                road: RenderHandle(200),
                lane_marker: RenderHandle(201),
                curb: RenderHandle(202),
                fence_post: RenderHandle(203),
            },
        );
        for (i, kind) in SceneryKind::ALL.iter().enumerate() {
            table.insert(*kind, RenderHandle(i as u32), kind.default_color());
        }
        table
    }

    pub fn insert(&mut self, kind: SceneryKind, mesh: RenderHandle, color: Rgb) -> &mut Self {
        self.scenery.insert(kind, SceneryResource { mesh, color });
        self
    }

    pub fn scenery(&self, kind: SceneryKind) -> Option<SceneryResource> {
        self.scenery.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_kind() {
        let table = ResourceTable::with_defaults();
        for kind in SceneryKind::ALL {
            let res = table.scenery(kind).unwrap();
            assert_eq!(res.color, kind.default_color());
            assert_ne!(res.mesh, table.fragment_mesh);
        }
    }

    #[test]
    fn test_insert_overrides() {
        let mut table = ResourceTable::with_defaults();
        table.insert(SceneryKind::Cow, RenderHandle(77), Rgb::new(1.0, 0.0, 0.0));
        let cow = table.scenery(SceneryKind::Cow).unwrap();
        assert_eq!(cow.mesh, RenderHandle(77));
        assert_eq!(cow.color.r, 1.0);
    }
}
