// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use echo_spatial::{
    make_group_tag, Aabb, EntityId, SpatialActivator, SpatialError, SpatialTrigger, SpatialWorld,
    Vec3,
};

/// Tiny deterministic RNG (xorshift64*) so tests don't need `rand`.
#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Creates a new PRNG; a zero seed is replaced with 1.
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    /// Next value in the xorshift64* sequence.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Value in `[0, upper)` (slightly biased; fine for tests).
    pub fn gen_range_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        (self.next_u64() as usize) % upper
    }

    /// Float in `[lo, hi)`.
    pub fn gen_f32(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32;
        lo + (hi - lo) * unit
    }
}

/// Seeds used by randomized tests.
pub const SEEDS: [u64; 4] = [1, 0xDEAD_BEEF, 42, 0x1234_5678_9ABC_DEF0];

/// Worker counts used by parallel-invariance tests.
pub const WORKER_COUNTS: [usize; 4] = [1, 2, 4, 8];

/// Cube half-extent box at the origin.
pub fn cube(h: f32) -> Result<Aabb, SpatialError> {
    Aabb::from_half_extents(h, h, h)
}

/// Spawns a trigger at `pos` in the given groups.
pub fn spawn_trigger(
    world: &mut SpatialWorld,
    label: &str,
    trigger: SpatialTrigger,
    pos: Vec3,
    groups: &[&str],
) -> Result<EntityId, SpatialError> {
    let id = world.spawn(label);
    world.insert_trigger(id, trigger)?;
    world.set_groups(id, groups.iter().map(|g| make_group_tag(g)))?;
    world.set_position(id, pos)?;
    Ok(id)
}

/// Spawns an activator at `pos` in the given groups.
pub fn spawn_activator(
    world: &mut SpatialWorld,
    label: &str,
    half: f32,
    pos: Vec3,
    groups: &[&str],
) -> Result<EntityId, SpatialError> {
    let id = world.spawn(label);
    world.insert_activator(id, SpatialActivator { bounds: cube(half)? })?;
    world.set_groups(id, groups.iter().map(|g| make_group_tag(g)))?;
    world.set_position(id, pos)?;
    Ok(id)
}

/// Observable overlap state of one trigger.
pub type TriggerState = (EntityId, Option<EntityId>, Option<Vec<EntityId>>, Option<Vec<EntityId>>);

/// Captures marker and logs for every listed trigger.
pub fn observe(world: &SpatialWorld, triggers: &[EntityId]) -> Vec<TriggerState> {
    triggers
        .iter()
        .map(|&t| {
            (
                t,
                world.overlap(t),
                world.entries(t).map(<[EntityId]>::to_vec),
                world.exits(t).map(<[EntityId]>::to_vec),
            )
        })
        .collect()
}
