//! Debris bursts for destroyed scenery
//!
//! Each destroyed object spawns one burst of small cubes that fly outward,
//! fall, tumble and fade. Bursts live in a slot arena: an expired slot goes on
//! a free list and its fragment storage is reused by the next spawn, so a
//! steady stream of destruction does not grow memory.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use super::destructible::DestructibleId;
use super::resources::RenderHandle;
use crate::Rgb;
use crate::tuning::FragmentTuning;

/// Largest source radius the spread and speed draws use; NaN counts as 0
const MAX_SOURCE_RADIUS: f32 = 1000.0;

/// Unique id of a spawned burst (never reused, unlike its slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BurstId(pub u32);

/// A single debris cube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler angles (XYZ order, radians)
    pub rotation: Vec3,
    /// Spin rate per axis (radians/sec)
    pub angular_velocity: Vec3,
    /// Size at full opacity
    pub base_scale: f32,
}

impl Fragment {
    /// Advance one step: gravity, linear drag, then position and spin
    #[inline]
    pub fn integrate(&mut self, dt: f32, gravity: f32, drag: f32) {
        self.velocity.y -= gravity * dt;
        self.velocity *= 1.0 - drag * dt;
        self.position += self.velocity * dt;
        self.rotation += self.angular_velocity * dt;
    }

    /// Drawn size; shrinks to 20% as the burst fades out
    #[inline]
    pub fn rendered_scale(&self, alpha: f32) -> f32 {
        self.base_scale * (0.2 + alpha.clamp(0.0, 1.0) * 0.8)
    }
}

/// Opacity for a burst of the given age; 1 at spawn, 0 at end of life
#[inline]
pub fn fade_alpha(age: f32, ttl: f32) -> f32 {
    1.0 - (age / ttl).clamp(0.0, 1.0)
}

/// Bigger objects break into more pieces, within the configured bounds
pub fn fragment_count_for_radius(radius: f32, min_count: u32, max_count: u32) -> u32 {
    // NaN and negative radii saturate to 0 and clamp up to min_count
    let raw = (min_count as f32 + radius * 8.0).round() as u32;
    raw.clamp(min_count, max_count)
}

/// All debris from one destroyed object
#[derive(Debug, Clone)]
pub struct FragmentBurst {
    pub id: BurstId,
    pub source: DestructibleId,
    /// Shared instanced cube mesh
    pub mesh: RenderHandle,
    pub tint: Rgb,
    pub fragments: Vec<Fragment>,
    age: f32,
    ttl: f32,
}

impl FragmentBurst {
    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn ttl(&self) -> f32 {
        self.ttl
    }

    /// Lifetime fraction in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.age / self.ttl).clamp(0.0, 1.0)
    }

    /// Current opacity of the burst material
    pub fn alpha(&self) -> f32 {
        fade_alpha(self.age, self.ttl)
    }

    pub fn is_expired(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    burst: FragmentBurst,
    live: bool,
}

/// Spawns and integrates every live burst
#[derive(Debug, Clone)]
pub struct FragmentSimulator {
    settings: FragmentTuning,
    mesh: RenderHandle,
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
    next_id: u32,
}

impl FragmentSimulator {
    pub fn new(settings: FragmentTuning, mesh: RenderHandle) -> Self {
        Self {
            settings,
            mesh,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            next_id: 1,
        }
    }

    pub fn settings(&self) -> &FragmentTuning {
        &self.settings
    }

    /// Mesh every burst is drawn with
    pub fn mesh(&self) -> RenderHandle {
        self.mesh
    }

    /// Spawn a burst with a lifetime drawn from the configured range
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        source: DestructibleId,
        origin: Vec3,
        radius: f32,
        tint: Rgb,
    ) -> BurstId {
        let ttl = rng.random_range(self.settings.min_ttl..=self.settings.max_ttl);
        self.spawn_with_ttl(rng, source, origin, radius, tint, ttl)
    }

    /// Spawn a burst with an explicit lifetime
    pub fn spawn_with_ttl<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        source: DestructibleId,
        origin: Vec3,
        radius: f32,
        tint: Rgb,
        ttl: f32,
    ) -> BurstId {
        let id = BurstId(self.next_id);
        self.next_id += 1;

        let count =
            fragment_count_for_radius(radius, self.settings.min_count, self.settings.max_count);
        let r = radius.max(0.0).min(MAX_SOURCE_RADIUS);

        // Reuse a dead slot (and its fragment allocation) when one exists
        let slot_index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot {
                    burst: FragmentBurst {
                        id,
                        source,
                        mesh: self.mesh,
                        tint,
                        fragments: Vec::with_capacity(self.settings.max_count as usize),
                        age: 0.0,
                        ttl,
                    },
                    live: false,
                });
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[slot_index];
        slot.live = true;
        let burst = &mut slot.burst;
        burst.id = id;
        burst.source = source;
        burst.mesh = self.mesh;
        burst.tint = tint;
        burst.age = 0.0;
        burst.ttl = ttl.max(f32::EPSILON);
        burst.fragments.clear();

        for _ in 0..count {
            let theta = rng.random_range(0.0..TAU);
            let lift = rng.random_range(0.45_f32..1.5);
            let spread = rng.random_range(0.68_f32..1.38);
            let magnitude = rng.random_range(2.4_f32..6.1) + r * 0.9;
            let velocity = Vec3::new(theta.cos() * spread, lift, theta.sin() * spread) * magnitude;

            let position = origin
                + Vec3::new(
                    rng.random_range(-0.45 * r..=0.45 * r),
                    0.2 + rng.random_range(0.0..=0.55 * r),
                    rng.random_range(-0.45 * r..=0.45 * r),
                );

            let rotation = Vec3::new(
                rng.random_range(0.0..PI),
                rng.random_range(0.0..PI),
                rng.random_range(0.0..PI),
            );
            let angular_velocity = Vec3::new(
                rng.random_range(-6.0..6.0),
                rng.random_range(-6.0..6.0),
                rng.random_range(-6.0..6.0),
            );
            let base_scale = rng.random_range(0.08_f32..0.25) + r * 0.05;

            burst.fragments.push(Fragment {
                position,
                velocity,
                rotation,
                angular_velocity,
                base_scale,
            });
        }

        self.live += 1;
        log::debug!(
            "Burst {} from destructible {} ({} fragments, ttl {:.2}s)",
            id.0,
            source.0,
            count,
            burst.ttl
        );
        id
    }

    /// Integrate every live burst and retire the ones that reached their ttl
    ///
    /// Ids of retired bursts are appended to `expired` so the caller can free
    /// the per-burst material exactly once.
    pub fn step(&mut self, dt: f32, expired: &mut Vec<BurstId>) {
        let gravity = self.settings.gravity;
        let drag = self.settings.drag;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.live {
                continue;
            }
            let burst = &mut slot.burst;
            burst.age += dt;
            for fragment in burst.fragments.iter_mut() {
                fragment.integrate(dt, gravity, drag);
            }

            if burst.is_expired() {
                slot.live = false;
                self.free.push(index);
                self.live -= 1;
                expired.push(burst.id);
                log::trace!("Burst {} expired", burst.id.0);
            }
        }
    }

    /// Retire every live burst at once (world teardown)
    ///
    /// Ids go to `expired` exactly like a normal expiry; slots stay allocated
    /// for reuse.
    pub fn clear(&mut self, expired: &mut Vec<BurstId>) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.live {
                slot.live = false;
                self.free.push(index);
                expired.push(slot.burst.id);
            }
        }
        self.live = 0;
    }

    /// Live bursts in slot order
    pub fn iter(&self) -> impl Iterator<Item = &FragmentBurst> {
        self.slots.iter().filter(|s| s.live).map(|s| &s.burst)
    }

    pub fn get(&self, id: BurstId) -> Option<&FragmentBurst> {
        self.iter().find(|b| b.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Slots allocated so far (live + free)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live fragments across every burst
    pub fn fragment_count(&self) -> usize {
        self.iter().map(|b| b.fragments.len()).sum()
    }
}
