// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Each scan worker owns a [`SpatialDelta`] and records [`SpatialOp`]s into
//! it instead of touching the host. Once both scans are joined the deltas are
//! merged into canonical `(trigger, origin)` order and played back by a single
//! consumer, so no scan ever observes a partially-applied overlap state.
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::ident::EntityId;
use crate::world::{SpatialSink, SpatialView};

/// Scan that produced an op. Trigger-scan ops sort first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScanPhase {
    /// Driven by moved triggers.
    TriggerScan,
    /// Driven by moved activators.
    ActivatorScan,
}

/// Origin metadata for a recorded op, used as the canonical tie-breaker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpOrigin {
    /// Which scan emitted the op.
    pub phase: ScanPhase,
    /// The moved object whose scan emitted the op.
    pub source: EntityId,
    /// Emission index within the source's scan (auto-assigned by [`ScopedDelta`]).
    pub op_ix: u32,
}

/// A deferred write against a trigger's overlap state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpatialOp {
    /// Mark `activator` as the one inside `trigger`.
    SetOverlap {
        /// Trigger whose marker is written.
        trigger: EntityId,
        /// Activator that entered.
        activator: EntityId,
    },
    /// Clear the marker currently held by `activator`.
    ClearOverlap {
        /// Trigger whose marker is written.
        trigger: EntityId,
        /// Activator that exited.
        activator: EntityId,
    },
    /// Append `activator` to the trigger's entry log.
    AppendEntry {
        /// Trigger whose log grows.
        trigger: EntityId,
        /// Activator that entered.
        activator: EntityId,
    },
    /// Append `activator` to the trigger's exit log.
    AppendExit {
        /// Trigger whose log grows.
        trigger: EntityId,
        /// Activator that exited.
        activator: EntityId,
    },
}

impl SpatialOp {
    /// The trigger this op writes to.
    pub fn trigger(&self) -> EntityId {
        match *self {
            Self::SetOverlap { trigger, .. }
            | Self::ClearOverlap { trigger, .. }
            | Self::AppendEntry { trigger, .. }
            | Self::AppendExit { trigger, .. } => trigger,
        }
    }

    /// The activator this op refers to.
    pub fn activator(&self) -> EntityId {
        match *self {
            Self::SetOverlap { activator, .. }
            | Self::ClearOverlap { activator, .. }
            | Self::AppendEntry { activator, .. }
            | Self::AppendExit { activator, .. } => activator,
        }
    }
}

/// Per-worker command log of [`SpatialOp`]s with their origins.
#[derive(Debug, Default)]
pub struct SpatialDelta {
    ops: Vec<SpatialOp>,
    origins: Vec<OpOrigin>,
}

impl SpatialDelta {
    /// Creates a new empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an op with explicit origin metadata.
    pub fn emit(&mut self, op: SpatialOp, origin: OpOrigin) {
        self.ops.push(op);
        self.origins.push(origin);
    }

    /// Creates a [`ScopedDelta`] that stamps every op with `phase` and `source`.
    pub fn scoped(&mut self, phase: ScanPhase, source: EntityId) -> ScopedDelta<'_> {
        ScopedDelta {
            inner: self,
            phase,
            source,
            next_op_ix: 0,
        }
    }

    /// Returns the number of recorded ops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if no ops have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Ops in emission order (for testing).
    #[must_use]
    pub fn ops(&self) -> &[SpatialOp] {
        &self.ops
    }

    /// Returns ops paired with their origins, in emission order.
    #[must_use]
    pub fn into_parts(self) -> Vec<(OpOrigin, SpatialOp)> {
        self.origins.into_iter().zip(self.ops).collect()
    }

    /// Counts recorded ops by kind.
    #[must_use]
    pub fn stats(&self) -> DeltaStats {
        let mut stats = DeltaStats::default();
        for op in &self.ops {
            match op {
                SpatialOp::SetOverlap { .. } => stats.set_overlap += 1,
                SpatialOp::ClearOverlap { .. } => stats.clear_overlap += 1,
                SpatialOp::AppendEntry { .. } => stats.append_entry += 1,
                SpatialOp::AppendExit { .. } => stats.append_exit += 1,
            }
        }
        stats
    }
}

/// A [`SpatialDelta`] view that applies one scan's origin to every op.
pub struct ScopedDelta<'a> {
    inner: &'a mut SpatialDelta,
    phase: ScanPhase,
    source: EntityId,
    next_op_ix: u32,
}

impl ScopedDelta<'_> {
    /// Records an op with the scoped origin (auto-assigns `op_ix`).
    pub fn emit(&mut self, op: SpatialOp) {
        let origin = OpOrigin {
            phase: self.phase,
            source: self.source,
            op_ix: self.next_op_ix,
        };
        self.next_op_ix += 1;
        self.inner.emit(op, origin);
    }
}

/// Op counts by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeltaStats {
    /// Count of `SetOverlap` ops.
    pub set_overlap: usize,
    /// Count of `ClearOverlap` ops.
    pub clear_overlap: usize,
    /// Count of `AppendEntry` ops.
    pub append_entry: usize,
    /// Count of `AppendExit` ops.
    pub append_exit: usize,
}

impl DeltaStats {
    /// Total number of ops counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.set_overlap + self.clear_overlap + self.append_entry + self.append_exit
    }

    /// Adds another set of counts into this one.
    pub fn absorb(&mut self, other: &Self) {
        self.set_overlap += other.set_overlap;
        self.clear_overlap += other.clear_overlap;
        self.append_entry += other.append_entry;
        self.append_exit += other.append_exit;
    }
}

/// Merges per-worker deltas into canonical order.
///
/// Ops are sorted by `(trigger, origin)`: all writes to one trigger are
/// contiguous, trigger-scan writes precede activator-scan writes, and writes
/// from one scan keep their emission order. The result is independent of how
/// work was distributed across workers.
#[must_use]
pub fn merge_deltas(deltas: Vec<SpatialDelta>) -> Vec<(OpOrigin, SpatialOp)> {
    let mut flat: Vec<(OpOrigin, SpatialOp)> = deltas
        .into_iter()
        .flat_map(SpatialDelta::into_parts)
        .collect();
    flat.sort_by(|a, b| (a.1.trigger(), a.0).cmp(&(b.1.trigger(), b.0)));
    flat
}

/// Outcome counts of one playback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Ops written to the host.
    pub applied: usize,
    /// Ops dropped to keep the one-marker invariant.
    pub rejected: usize,
}

/// Applies merged ops to the host in order.
///
/// The host's marker is re-read before every marker write:
/// - `SetOverlap` is dropped if the trigger already holds a marker (two
///   activators entered the same trigger from different scans this tick).
/// - `ClearOverlap` is dropped if the marker is not held by that activator.
///
/// A dropped marker write also drops the log append paired with it. Each
/// `(trigger, activator)` pair is evaluated at most once per tick, so the pair
/// identifies its append unambiguously.
pub fn playback<H>(ops: &[(OpOrigin, SpatialOp)], host: &mut H) -> PlaybackStats
where
    H: SpatialView + SpatialSink + ?Sized,
{
    let mut stats = PlaybackStats::default();
    let mut dropped: FxHashSet<(EntityId, EntityId)> = FxHashSet::default();

    for (origin, op) in ops {
        let pair = (op.trigger(), op.activator());
        let applied = match *op {
            SpatialOp::SetOverlap { trigger, activator } => {
                if host.overlap(trigger).is_some() {
                    dropped.insert(pair);
                    false
                } else {
                    host.set_overlap(trigger, activator);
                    true
                }
            }
            SpatialOp::ClearOverlap { trigger, activator } => {
                if host.overlap(trigger) == Some(activator) {
                    host.clear_overlap(trigger);
                    true
                } else {
                    dropped.insert(pair);
                    false
                }
            }
            SpatialOp::AppendEntry { trigger, activator } => {
                if dropped.contains(&pair) {
                    false
                } else {
                    host.append_entry(trigger, activator);
                    true
                }
            }
            SpatialOp::AppendExit { trigger, activator } => {
                if dropped.contains(&pair) {
                    false
                } else {
                    host.append_exit(trigger, activator);
                    true
                }
            }
        };

        if applied {
            stats.applied += 1;
        } else {
            stats.rejected += 1;
            trace!(?origin, ?op, "playback rejected op");
        }
    }

    stats
}
