//! Destructible scenery registry
//!
//! Objects are hidden when destroyed, never removed, so a [`DestructibleId`]
//! stays valid (and indexes the same slot) for the whole session. Memory is
//! bounded by the placement plan, which is fixed at world build.

use glam::Vec3;

use super::placement::{PlacedObject, SceneryKind};
use super::resources::InstanceHandle;
use crate::Rgb;

/// Stable index into the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestructibleId(pub u32);

/// A placed scenery object that breaks apart on contact
#[derive(Debug, Clone)]
pub struct Destructible {
    pub id: DestructibleId,
    pub kind: SceneryKind,
    pub handle: InstanceHandle,
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
    /// Ground-plane collision radius
    pub radius: f32,
    /// Debris tint
    pub color: Rgb,
    active: bool,
}

impl Destructible {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Renderers draw only active objects
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.active
    }
}

/// Owns every destructible in the world
#[derive(Debug, Clone, Default)]
pub struct DestructibleRegistry {
    objects: Vec<Destructible>,
    destroyed: usize,
}

impl DestructibleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: Vec::with_capacity(capacity),
            destroyed: 0,
        }
    }

    /// Append an active object and return its id
    pub fn register(&mut self, handle: InstanceHandle, object: &PlacedObject, color: Rgb) -> DestructibleId {
        debug_assert!(object.radius > 0.0, "destructible radius must be positive");
        let id = DestructibleId(self.objects.len() as u32);
        self.objects.push(Destructible {
            id,
            kind: object.kind,
            handle,
            position: object.position,
            yaw: object.yaw,
            scale: object.scale,
            radius: object.radius,
            color,
            active: true,
        });
        id
    }

    /// Flip an object to inactive. Returns it only on the first call.
    pub fn deactivate(&mut self, id: DestructibleId) -> Option<&Destructible> {
        let obj = self.objects.get_mut(id.0 as usize)?;
        if !obj.active {
            return None;
        }
        obj.active = false;
        self.destroyed += 1;
        Some(obj)
    }

    pub fn get(&self, id: DestructibleId) -> Option<&Destructible> {
        self.objects.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destructible> {
        self.objects.iter()
    }

    pub fn active(&self) -> impl Iterator<Item = &Destructible> {
        self.objects.iter().filter(|d| d.active)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.objects.len() - self.destroyed
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::resources::RenderHandle;

    fn rock(x: f32, radius: f32) -> PlacedObject {
        PlacedObject {
            kind: SceneryKind::Rock,
            position: Vec3::new(x, 0.0, 0.0),
            yaw: 0.0,
            scale: 1.0,
            radius,
        }
    }

    fn handle(i: u32) -> InstanceHandle {
        InstanceHandle {
            mesh: RenderHandle(0),
            instance: i,
        }
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut reg = DestructibleRegistry::new();
        let a = reg.register(handle(0), &rock(0.0, 1.0), Rgb::new(0.5, 0.5, 0.5));
        let b = reg.register(handle(1), &rock(5.0, 0.5), Rgb::new(0.5, 0.5, 0.5));
        assert_eq!(a, DestructibleId(0));
        assert_eq!(b, DestructibleId(1));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.active_count(), 2);
        assert!(reg.get(b).unwrap().is_visible());
    }

    #[test]
    fn test_deactivate_is_one_shot() {
        let mut reg = DestructibleRegistry::new();
        let id = reg.register(handle(0), &rock(0.0, 1.0), Rgb::new(0.5, 0.5, 0.5));
        assert!(reg.deactivate(id).is_some());
        assert!(reg.deactivate(id).is_none());
        assert_eq!(reg.destroyed_count(), 1);
        assert_eq!(reg.active_count(), 0);
        // Hidden, not removed
        assert_eq!(reg.len(), 1);
        assert!(!reg.get(id).unwrap().is_visible());
    }

    #[test]
    fn test_deactivate_unknown_id() {
        let mut reg = DestructibleRegistry::new();
        assert!(reg.deactivate(DestructibleId(9)).is_none());
        assert_eq!(reg.destroyed_count(), 0);
    }
}
