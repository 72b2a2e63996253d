// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host seams for the spatial pipeline.
//!
//! The pipeline reads through [`SpatialView`], writes through [`SpatialSink`]
//! and learns what changed through [`SpatialHost::drain_changes`]. Engines
//! with their own entity storage implement these traits; [`SpatialWorld`] is
//! the in-memory implementation used by tools and tests.
use std::collections::{BTreeMap, BTreeSet};

use crate::component::{Roles, SpatialActivator, SpatialTrigger};
use crate::error::SpatialError;
use crate::ident::{make_entity_id, EntityId, GroupTag};
use crate::index::GroupChange;
use crate::math::Vec3;

/// Read-only access to spatial component data.
///
/// Missing data is `None`/empty; the pipeline skips rather than fails.
pub trait SpatialView {
    /// World-space position of `entity`.
    fn world_position(&self, entity: EntityId) -> Option<Vec3>;
    /// Trigger component of `entity`.
    fn trigger(&self, entity: EntityId) -> Option<SpatialTrigger>;
    /// Activator component of `entity`.
    fn activator(&self, entity: EntityId) -> Option<SpatialActivator>;
    /// Current group tags of `entity` (empty if none).
    fn groups(&self, entity: EntityId) -> &[GroupTag];
    /// Activator currently marked inside `trigger`.
    fn overlap(&self, trigger: EntityId) -> Option<EntityId>;
}

/// Write access used by op playback.
///
/// Writes to unknown entities are ignored.
pub trait SpatialSink {
    /// Marks `activator` as inside `trigger`.
    fn set_overlap(&mut self, trigger: EntityId, activator: EntityId);
    /// Clears the overlap marker of `trigger`.
    fn clear_overlap(&mut self, trigger: EntityId);
    /// Appends `activator` to the entry log of `trigger`.
    fn append_entry(&mut self, trigger: EntityId, activator: EntityId);
    /// Appends `activator` to the exit log of `trigger`.
    fn append_exit(&mut self, trigger: EntityId, activator: EntityId);
}

/// A host the [`crate::SpatialEventSystem`] can drive once per tick.
pub trait SpatialHost: SpatialView + SpatialSink {
    /// Returns everything that changed since the previous call and resets
    /// change tracking.
    fn drain_changes(&mut self) -> ChangeSet;
}

/// Per-tick change notifications from the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Objects whose tag list changed, with their current tags and roles.
    pub group_changes: Vec<GroupChange>,
    /// Triggers whose world position changed.
    pub moved_triggers: Vec<EntityId>,
    /// Activators whose world position changed.
    pub moved_activators: Vec<EntityId>,
    /// Objects destroyed since the previous tick.
    pub despawned: Vec<EntityId>,
}

impl ChangeSet {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group_changes.is_empty()
            && self.moved_triggers.is_empty()
            && self.moved_activators.is_empty()
            && self.despawned.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
struct EntityRecord {
    position: Option<Vec3>,
    trigger: Option<SpatialTrigger>,
    activator: Option<SpatialActivator>,
    groups: Vec<GroupTag>,
    overlap: Option<EntityId>,
    entries: Option<Vec<EntityId>>,
    exits: Option<Vec<EntityId>>,
}

impl EntityRecord {
    fn roles(&self) -> Roles {
        Roles::from_flags(self.activator.is_some(), self.trigger.is_some())
    }
}

/// In-memory spatial object store with change tracking.
///
/// Change tracking follows structural semantics: setting tags marks the tag
/// list changed, moving marks the position changed, and adding or removing a
/// trigger/activator marks both (the object's composition changed).
#[derive(Debug, Clone, Default)]
pub struct SpatialWorld {
    entities: BTreeMap<EntityId, EntityRecord>,
    dirty_groups: BTreeSet<EntityId>,
    dirty_positions: BTreeSet<EntityId>,
    despawned: BTreeSet<EntityId>,
}

impl SpatialWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object with the label-derived id [`make_entity_id`].
    ///
    /// Spawning an existing label returns the existing id untouched. Spawning
    /// a label despawned since the last drain keeps the despawn notice, so
    /// the previous incarnation is still purged from the index.
    pub fn spawn(&mut self, label: &str) -> EntityId {
        let id = make_entity_id(label);
        self.entities.entry(id).or_default();
        id
    }

    /// Destroys an object.
    ///
    /// Triggers whose marker pointed at it are released without an exit
    /// event; the object is reported in the next [`ChangeSet::despawned`].
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), SpatialError> {
        if self.entities.remove(&entity).is_none() {
            return Err(SpatialError::UnknownEntity(entity));
        }
        for record in self.entities.values_mut() {
            if record.overlap == Some(entity) {
                record.overlap = None;
            }
        }
        self.dirty_groups.remove(&entity);
        self.dirty_positions.remove(&entity);
        self.despawned.insert(entity);
        Ok(())
    }

    fn record_mut(&mut self, entity: EntityId) -> Result<&mut EntityRecord, SpatialError> {
        self.entities
            .get_mut(&entity)
            .ok_or(SpatialError::UnknownEntity(entity))
    }

    /// Sets the world position.
    pub fn set_position(&mut self, entity: EntityId, position: Vec3) -> Result<(), SpatialError> {
        self.record_mut(entity)?.position = Some(position);
        self.dirty_positions.insert(entity);
        Ok(())
    }

    /// Moves the object by `offset` (from the origin if it had no position).
    pub fn translate(&mut self, entity: EntityId, offset: Vec3) -> Result<(), SpatialError> {
        let record = self.record_mut(entity)?;
        let base = record.position.unwrap_or(Vec3::ZERO);
        record.position = Some(base.add(&offset));
        self.dirty_positions.insert(entity);
        Ok(())
    }

    /// Replaces the object's group tags.
    pub fn set_groups(
        &mut self,
        entity: EntityId,
        groups: impl IntoIterator<Item = GroupTag>,
    ) -> Result<(), SpatialError> {
        self.record_mut(entity)?.groups = groups.into_iter().collect();
        self.dirty_groups.insert(entity);
        Ok(())
    }

    /// Adds or replaces the trigger component.
    pub fn insert_trigger(
        &mut self,
        entity: EntityId,
        trigger: SpatialTrigger,
    ) -> Result<(), SpatialError> {
        self.record_mut(entity)?.trigger = Some(trigger);
        self.mark_structural(entity);
        Ok(())
    }

    /// Adds or replaces the activator component.
    pub fn insert_activator(
        &mut self,
        entity: EntityId,
        activator: SpatialActivator,
    ) -> Result<(), SpatialError> {
        self.record_mut(entity)?.activator = Some(activator);
        self.mark_structural(entity);
        Ok(())
    }

    /// Removes the trigger component, along with its marker and logs.
    pub fn remove_trigger(&mut self, entity: EntityId) -> Result<Option<SpatialTrigger>, SpatialError> {
        let record = self.record_mut(entity)?;
        let removed = record.trigger.take();
        record.overlap = None;
        record.entries = None;
        record.exits = None;
        self.mark_structural(entity);
        Ok(removed)
    }

    /// Removes the activator component.
    pub fn remove_activator(
        &mut self,
        entity: EntityId,
    ) -> Result<Option<SpatialActivator>, SpatialError> {
        let removed = self.record_mut(entity)?.activator.take();
        self.mark_structural(entity);
        Ok(removed)
    }

    fn mark_structural(&mut self, entity: EntityId) {
        self.dirty_groups.insert(entity);
        self.dirty_positions.insert(entity);
    }

    /// Returns `true` if the object exists.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no object exists.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// World position, if set.
    pub fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).and_then(|r| r.position)
    }

    /// Activator currently inside `trigger`.
    pub fn overlap(&self, trigger: EntityId) -> Option<EntityId> {
        self.entities.get(&trigger).and_then(|r| r.overlap)
    }

    /// Entry log of `trigger`; `None` until the first logged entry.
    pub fn entries(&self, trigger: EntityId) -> Option<&[EntityId]> {
        self.entities
            .get(&trigger)
            .and_then(|r| r.entries.as_deref())
    }

    /// Exit log of `trigger`; `None` until the first logged exit.
    pub fn exits(&self, trigger: EntityId) -> Option<&[EntityId]> {
        self.entities.get(&trigger).and_then(|r| r.exits.as_deref())
    }
}

impl SpatialView for SpatialWorld {
    fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        self.position(entity)
    }

    fn trigger(&self, entity: EntityId) -> Option<SpatialTrigger> {
        self.entities.get(&entity).and_then(|r| r.trigger)
    }

    fn activator(&self, entity: EntityId) -> Option<SpatialActivator> {
        self.entities.get(&entity).and_then(|r| r.activator)
    }

    fn groups(&self, entity: EntityId) -> &[GroupTag] {
        self.entities.get(&entity).map_or(&[], |r| r.groups.as_slice())
    }

    fn overlap(&self, trigger: EntityId) -> Option<EntityId> {
        Self::overlap(self, trigger)
    }
}

impl SpatialSink for SpatialWorld {
    fn set_overlap(&mut self, trigger: EntityId, activator: EntityId) {
        if let Some(record) = self.entities.get_mut(&trigger) {
            record.overlap = Some(activator);
        }
    }

    fn clear_overlap(&mut self, trigger: EntityId) {
        if let Some(record) = self.entities.get_mut(&trigger) {
            record.overlap = None;
        }
    }

    fn append_entry(&mut self, trigger: EntityId, activator: EntityId) {
        if let Some(record) = self.entities.get_mut(&trigger) {
            record.entries.get_or_insert_with(Vec::new).push(activator);
        }
    }

    fn append_exit(&mut self, trigger: EntityId, activator: EntityId) {
        if let Some(record) = self.entities.get_mut(&trigger) {
            record.exits.get_or_insert_with(Vec::new).push(activator);
        }
    }
}

impl SpatialHost for SpatialWorld {
    fn drain_changes(&mut self) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for entity in std::mem::take(&mut self.dirty_groups) {
            if let Some(record) = self.entities.get(&entity) {
                changes.group_changes.push(GroupChange {
                    entity,
                    roles: record.roles(),
                    groups: record.groups.clone(),
                });
            }
        }

        for entity in std::mem::take(&mut self.dirty_positions) {
            let Some(record) = self.entities.get(&entity) else {
                continue;
            };
            if record.trigger.is_some() {
                changes.moved_triggers.push(entity);
            }
            if record.activator.is_some() {
                changes.moved_activators.push(entity);
            }
        }

        changes.despawned = std::mem::take(&mut self.despawned).into_iter().collect();
        changes
    }
}
