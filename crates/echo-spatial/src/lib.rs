// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! echo-spatial: group-scoped AABB entry/exit tracking.
//!
//! Triggers and activators advertise group tags. Each tick the
//! [`SpatialEventSystem`] re-indexes objects whose tags changed, scans moved
//! triggers and moved activators for containment transitions, and plays the
//! resulting ops back into the host once every scan has finished.
//!
//! Design notes:
//! - A trigger tracks at most one activator at a time (the overlap marker).
//! - A pair is evaluated by at most one scan per tick; the activator scan
//!   defers to triggers the trigger scan already visited.
//! - Scans run on work-stealing workers, each emitting into its own
//!   [`SpatialDelta`]. Determinism comes from the canonical merge, not from
//!   execution order.
#![forbid(unsafe_code)]

/// Axis-aligned bounding boxes (center + half extents).
pub mod aabb;
/// Trigger/activator component data and the role bitmask.
pub mod component;
/// Runtime configuration.
pub mod config;
/// Deferred mutation buffer: typed ops, canonical merge, playback.
pub mod delta;
mod error;
/// Work-stealing execution over virtual shards.
pub mod exec;
mod ident;
/// Group index: object↔tag multimaps maintained from tag-list changes.
pub mod index;
/// Minimal vector math.
pub mod math;
mod scan;
mod scanned;
mod system;
/// Host-side traits and the in-memory [`SpatialWorld`].
pub mod world;

pub use aabb::Aabb;
pub use component::{Roles, SpatialActivator, SpatialTrigger};
pub use config::SpatialConfig;
pub use delta::{merge_deltas, playback, DeltaStats, OpOrigin, PlaybackStats, ScanPhase, SpatialDelta, SpatialOp};
pub use error::SpatialError;
pub use exec::{shard_of, NUM_SHARDS};
pub use ident::{make_entity_id, make_group_tag, EntityId, GroupTag, Hash};
pub use index::{GroupChange, GroupIndex, IndexStats};
pub use math::Vec3;
pub use scanned::ScannedTriggers;
pub use system::{SpatialEventSystem, TickReport};
pub use world::{ChangeSet, SpatialHost, SpatialSink, SpatialView, SpatialWorld};
