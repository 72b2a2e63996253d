// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashSet;

use crate::exec::shard_of;
use crate::ident::EntityId;

const SET_SHARDS: usize = 64;

/// Concurrent set of triggers visited by the trigger scan this tick.
///
/// Buckets are routed by [`shard_of`], so concurrent inserts of different
/// triggers rarely contend and no insert is ever lost.
#[derive(Debug)]
pub struct ScannedTriggers {
    buckets: Vec<Mutex<FxHashSet<EntityId>>>,
}

impl Default for ScannedTriggers {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannedTriggers {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: (0..SET_SHARDS)
                .map(|_| Mutex::new(FxHashSet::default()))
                .collect(),
        }
    }

    fn bucket(&self, entity: &EntityId) -> &Mutex<FxHashSet<EntityId>> {
        &self.buckets[shard_of(entity) % SET_SHARDS]
    }

    /// Inserts `trigger`; returns `true` if it was not present.
    pub fn insert(&self, trigger: EntityId) -> bool {
        self.bucket(&trigger)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(trigger)
    }

    /// Returns `true` if `trigger` was visited.
    pub fn contains(&self, trigger: &EntityId) -> bool {
        self.bucket(trigger)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(trigger)
    }

    /// Number of visited triggers.
    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .map(|b| b.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Returns `true` if no trigger was visited.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
