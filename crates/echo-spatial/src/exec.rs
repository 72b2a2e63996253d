// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Items (moved entities) are partitioned into [`NUM_SHARDS`] virtual shards
//! by [`shard_of`]. Workers claim whole shards through an atomic counter
//! (work-stealing) and record into a private [`SpatialDelta`]; nothing mutable
//! is shared between workers. Execution order is non-deterministic, the merge
//! in [`crate::merge_deltas`] is not.
//!
//! # Shard Routing
//!
//! ```text
//! shard = LE_u64(entity_id.as_bytes()[0..8]) & (NUM_SHARDS - 1)
//! ```
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::delta::SpatialDelta;
use crate::ident::EntityId;

/// Number of virtual shards (power of two for fast modulo).
pub const NUM_SHARDS: usize = 256;

const _: () = assert!(
    NUM_SHARDS.is_power_of_two(),
    "NUM_SHARDS must be a power of two"
);

const SHARD_MASK: u64 = (NUM_SHARDS - 1) as u64;

/// Computes the shard of an entity from the low 8 bytes of its id.
#[inline]
pub fn shard_of(entity: &EntityId) -> usize {
    let bytes = entity.as_bytes();
    let first_8: [u8; 8] = [
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ];
    let val = u64::from_le_bytes(first_8);
    (val & SHARD_MASK) as usize
}

/// Partitions items into exactly [`NUM_SHARDS`] shards (empty shards included).
pub fn partition_into_shards(items: &[EntityId]) -> Vec<Vec<EntityId>> {
    let mut shards: Vec<Vec<EntityId>> = (0..NUM_SHARDS).map(|_| Vec::new()).collect();
    for item in items {
        shards[shard_of(item)].push(*item);
    }
    shards
}

/// Serial baseline: runs `job` for every item on the caller thread.
pub fn execute_serial<F>(items: &[EntityId], job: F) -> SpatialDelta
where
    F: Fn(EntityId, &mut SpatialDelta),
{
    let mut delta = SpatialDelta::new();
    for item in items {
        job(*item, &mut delta);
    }
    delta
}

/// Runs `job` for every item on `workers` scoped threads.
///
/// Workers are capped at [`NUM_SHARDS`] and at least one is always used.
/// Returns one delta per worker. A panic in any worker is resumed on the
/// caller thread.
pub fn execute_parallel<F>(items: &[EntityId], workers: usize, job: F) -> Vec<SpatialDelta>
where
    F: Fn(EntityId, &mut SpatialDelta) + Sync,
{
    let workers = workers.clamp(1, NUM_SHARDS);
    if items.is_empty() {
        return Vec::new();
    }

    let shards = partition_into_shards(items);
    let next_shard = AtomicUsize::new(0);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let shards = &shards;
                let next_shard = &next_shard;
                let job = &job;

                s.spawn(move || {
                    let mut delta = SpatialDelta::new();
                    loop {
                        let shard_id = next_shard.fetch_add(1, Ordering::Relaxed);
                        if shard_id >= NUM_SHARDS {
                            break;
                        }
                        for item in &shards[shard_id] {
                            job(*item, &mut delta);
                        }
                    }
                    delta
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(delta) => delta,
                Err(e) => std::panic::resume_unwind(e),
            })
            .collect()
    })
}
