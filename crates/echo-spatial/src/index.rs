// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Maintenance runs in two passes over the tick's tag-list changes:
//!
//! 1. Diff each object's new tag list against its last-observed list and
//!    insert/remove `(tag, object)` pairs in the per-role forward maps.
//! 2. Overwrite the object's recorded tag list with the new snapshot.
//!
//! Pass 1 reads the old snapshot that pass 2 replaces, so the passes never
//! interleave. Maintenance is single-writer; the scans only see `&GroupIndex`.
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::component::Roles;
use crate::ident::{EntityId, GroupTag};

/// A tag-list change observed by the host for one object.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupChange {
    /// The object whose tag list changed.
    pub entity: EntityId,
    /// Roles the object holds at observation time.
    pub roles: Roles,
    /// Complete new tag list (order and duplicates are not significant).
    pub groups: Vec<GroupTag>,
}

/// Counters produced by one maintenance run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Distinct objects processed.
    pub objects: usize,
    /// `(tag, object)` pairs inserted into a forward map.
    pub inserted: usize,
    /// `(tag, object)` pairs removed from a forward map.
    pub removed: usize,
}

impl IndexStats {
    /// Returns `true` if the run changed no forward-map entry.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.removed == 0
    }
}

/// Bidirectional object↔group index.
///
/// Derived state: everything here can be rebuilt from the objects' tag lists.
/// `BTreeMap`/`BTreeSet` keep candidate iteration order canonical.
#[derive(Debug, Default, Clone)]
pub struct GroupIndex {
    entity_groups: BTreeMap<EntityId, Vec<GroupTag>>,
    group_activators: BTreeMap<GroupTag, BTreeSet<EntityId>>,
    group_triggers: BTreeMap<GroupTag, BTreeSet<EntityId>>,
}

impl GroupIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one tick's worth of tag-list changes.
    ///
    /// If an object appears more than once, its last change wins.
    pub fn apply_changes(&mut self, changes: &[GroupChange]) -> IndexStats {
        let mut latest: BTreeMap<EntityId, &GroupChange> = BTreeMap::new();
        for change in changes {
            latest.insert(change.entity, change);
        }

        let mut stats = IndexStats {
            objects: latest.len(),
            ..IndexStats::default()
        };

        for change in latest.values() {
            self.diff_forward_maps(change, &mut stats);
        }
        for change in latest.values() {
            self.record_snapshot(change);
        }

        stats
    }

    /// Pass 1: insert confirmed tags, remove tags the object no longer has.
    fn diff_forward_maps(&mut self, change: &GroupChange, stats: &mut IndexStats) {
        let entity = change.entity;
        let mut seen: FxHashSet<GroupTag> = FxHashSet::default();

        for &tag in &change.groups {
            if !seen.insert(tag) {
                continue;
            }
            if change.roles.is_activator() && insert_member(&mut self.group_activators, tag, entity) {
                stats.inserted += 1;
            }
            if change.roles.is_trigger() && insert_member(&mut self.group_triggers, tag, entity) {
                stats.inserted += 1;
            }
        }

        let previous = self.entity_groups.get(&entity).cloned().unwrap_or_default();
        for tag in previous.iter().chain(&change.groups) {
            let keep = seen.contains(tag);
            let keep_activator = keep && change.roles.is_activator();
            let keep_trigger = keep && change.roles.is_trigger();
            if !keep_activator && remove_member(&mut self.group_activators, *tag, entity) {
                stats.removed += 1;
            }
            if !keep_trigger && remove_member(&mut self.group_triggers, *tag, entity) {
                stats.removed += 1;
            }
        }

        trace!(?entity, roles = ?change.roles, groups = seen.len(), "group index diffed");
    }

    /// Pass 2: replace the recorded tag list (clear-then-reinsert).
    fn record_snapshot(&mut self, change: &GroupChange) {
        if change.groups.is_empty() {
            self.entity_groups.remove(&change.entity);
            return;
        }
        let slot = self.entity_groups.entry(change.entity).or_default();
        slot.clear();
        for tag in &change.groups {
            if !slot.contains(tag) {
                slot.push(*tag);
            }
        }
    }

    /// Removes every trace of `entity` (used when the host destroys it).
    ///
    /// Returns the number of forward-map entries removed.
    pub fn purge(&mut self, entity: EntityId) -> usize {
        let Some(tags) = self.entity_groups.remove(&entity) else {
            return 0;
        };
        let mut removed = 0;
        for tag in tags {
            removed += usize::from(remove_member(&mut self.group_activators, tag, entity));
            removed += usize::from(remove_member(&mut self.group_triggers, tag, entity));
        }
        removed
    }

    /// Activators registered under `tag`, in canonical order.
    pub fn activators_in(&self, tag: &GroupTag) -> impl Iterator<Item = EntityId> + '_ {
        self.group_activators.get(tag).into_iter().flatten().copied()
    }

    /// Triggers registered under `tag`, in canonical order.
    pub fn triggers_in(&self, tag: &GroupTag) -> impl Iterator<Item = EntityId> + '_ {
        self.group_triggers.get(tag).into_iter().flatten().copied()
    }

    /// Last-observed tag list for `entity` (empty if unknown).
    pub fn tags_of(&self, entity: &EntityId) -> &[GroupTag] {
        self.entity_groups.get(entity).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct tags with at least one registered member.
    pub fn group_count(&self) -> usize {
        let mut tags: BTreeSet<&GroupTag> = self.group_activators.keys().collect();
        tags.extend(self.group_triggers.keys());
        tags.len()
    }

    /// Number of objects with a recorded, non-empty tag list.
    pub fn tracked_objects(&self) -> usize {
        self.entity_groups.len()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entity_groups.is_empty()
            && self.group_activators.is_empty()
            && self.group_triggers.is_empty()
    }
}

fn insert_member(
    map: &mut BTreeMap<GroupTag, BTreeSet<EntityId>>,
    tag: GroupTag,
    entity: EntityId,
) -> bool {
    map.entry(tag).or_default().insert(entity)
}

fn remove_member(
    map: &mut BTreeMap<GroupTag, BTreeSet<EntityId>>,
    tag: GroupTag,
    entity: EntityId,
) -> bool {
    let Some(members) = map.get_mut(&tag) else {
        return false;
    };
    let removed = members.remove(&entity);
    if members.is_empty() {
        map.remove(&tag);
    }
    removed
}
