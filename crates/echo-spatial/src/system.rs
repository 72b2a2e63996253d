// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-tick scheduling of the spatial pipeline.
//!
//! ```text
//! group index (diff → snapshot) ─▶ trigger scan ─▶ activator scan ─▶ playback
//!                                      │                ▲
//!                                      └─ scanned set ──┘
//! ```
//!
//! The activator scan starts only after every trigger-scan worker has joined,
//! because it consults the scanned-trigger set. Playback starts only after
//! both scans have joined.
use tracing::{debug, instrument};

use crate::config::SpatialConfig;
use crate::delta::{merge_deltas, playback, DeltaStats, PlaybackStats, SpatialDelta};
use crate::exec::{execute_parallel, execute_serial};
use crate::ident::EntityId;
use crate::index::{GroupIndex, IndexStats};
use crate::scan::{scan_activator, scan_trigger};
use crate::scanned::ScannedTriggers;
use crate::world::{ChangeSet, SpatialHost, SpatialSink, SpatialView};

/// Summary of one [`SpatialEventSystem::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number (1-based, incremented per update).
    pub tick: u64,
    /// Group index maintenance counters.
    pub index: IndexStats,
    /// Forward-map entries removed for despawned objects.
    pub purged: usize,
    /// Distinct moved triggers scanned.
    pub moved_triggers: usize,
    /// Distinct moved activators scanned.
    pub moved_activators: usize,
    /// Triggers in the scanned set after the trigger scan.
    pub scanned_triggers: usize,
    /// Ops recorded by both scans.
    pub emitted: DeltaStats,
    /// Playback outcome.
    pub playback: PlaybackStats,
}

/// Detects activators entering and leaving trigger bounds.
///
/// Owns the [`GroupIndex`]; everything else is read from and written to the
/// host. One tick runs to completion before the next can start (`&mut self`).
#[derive(Debug, Default)]
pub struct SpatialEventSystem {
    config: SpatialConfig,
    index: GroupIndex,
    tick: u64,
}

impl SpatialEventSystem {
    /// Creates a system with [`SpatialConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a system with an explicit config.
    #[must_use]
    pub fn with_config(config: SpatialConfig) -> Self {
        Self {
            config,
            index: GroupIndex::new(),
            tick: 0,
        }
    }

    /// Active config.
    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    /// Read-only access to the group index.
    pub fn index(&self) -> &GroupIndex {
        &self.index
    }

    /// Number of completed updates.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Drains the host's changes and runs one tick.
    pub fn update<H>(&mut self, host: &mut H) -> TickReport
    where
        H: SpatialHost + Sync + ?Sized,
    {
        let changes = host.drain_changes();
        self.process(host, &changes)
    }

    /// Runs one tick against an explicit change set.
    #[instrument(level = "debug", skip_all, fields(tick = self.tick + 1))]
    pub fn process<H>(&mut self, host: &mut H, changes: &ChangeSet) -> TickReport
    where
        H: SpatialView + SpatialSink + Sync + ?Sized,
    {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        for entity in &changes.despawned {
            report.purged += self.index.purge(*entity);
        }
        report.index = self.index.apply_changes(&changes.group_changes);
        debug!(
            objects = report.index.objects,
            inserted = report.index.inserted,
            removed = report.index.removed,
            purged = report.purged,
            "group index updated"
        );

        let moved_triggers = distinct(&changes.moved_triggers);
        let moved_activators = distinct(&changes.moved_activators);
        report.moved_triggers = moved_triggers.len();
        report.moved_activators = moved_activators.len();

        let scanned = ScannedTriggers::new();
        let view: &H = host;
        let index = &self.index;

        let mut deltas = self.run_phase(&moved_triggers, |trigger, delta| {
            scan_trigger(view, index, &scanned, trigger, delta);
        });
        report.scanned_triggers = scanned.len();
        debug!(scanned = report.scanned_triggers, "trigger scan joined");

        deltas.extend(self.run_phase(&moved_activators, |activator, delta| {
            scan_activator(view, index, &scanned, activator, delta);
        }));
        debug!(activators = report.moved_activators, "activator scan joined");

        for delta in &deltas {
            report.emitted.absorb(&delta.stats());
        }
        let ops = merge_deltas(deltas);
        report.playback = playback(&ops, host);
        debug!(
            applied = report.playback.applied,
            rejected = report.playback.rejected,
            "ops played back"
        );

        report
    }

    fn run_phase<F>(&self, items: &[EntityId], job: F) -> Vec<SpatialDelta>
    where
        F: Fn(EntityId, &mut SpatialDelta) + Sync,
    {
        if self.config.parallel_for(items.len()) {
            execute_parallel(items, self.config.workers, job)
        } else {
            vec![execute_serial(items, job)]
        }
    }
}

fn distinct(items: &[EntityId]) -> Vec<EntityId> {
    let mut out = items.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}
