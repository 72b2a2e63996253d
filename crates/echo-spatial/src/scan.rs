// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trigger and activator scans.
//!
//! Both scans classify `(trigger, activator)` pairs against the trigger's
//! overlap marker as it stood at the start of the tick and record the result
//! into a worker-local delta. Neither writes to the host.
//!
//! A trigger releases and acquires its marker across ticks, never within
//! one: after an exit the marker stays held until playback.
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::aabb::Aabb;
use crate::component::SpatialTrigger;
use crate::delta::{ScanPhase, ScopedDelta, SpatialDelta, SpatialOp};
use crate::ident::EntityId;
use crate::index::GroupIndex;
use crate::scanned::ScannedTriggers;
use crate::world::SpatialView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Enter,
    Exit,
    Unchanged,
}

/// Classifies one pair given the trigger's currently held activator.
pub(crate) fn classify(
    trigger_bounds: &Aabb,
    activator_bounds: &Aabb,
    held: Option<EntityId>,
    activator: EntityId,
) -> Transition {
    let inside = trigger_bounds.contains(activator_bounds);
    match held {
        None if inside => Transition::Enter,
        Some(current) if !inside && current == activator => Transition::Exit,
        _ => Transition::Unchanged,
    }
}

fn record(
    out: &mut ScopedDelta<'_>,
    transition: Transition,
    trigger: EntityId,
    spec: &SpatialTrigger,
    activator: EntityId,
) {
    match transition {
        Transition::Enter => {
            out.emit(SpatialOp::SetOverlap { trigger, activator });
            if spec.track_entries {
                out.emit(SpatialOp::AppendEntry { trigger, activator });
            }
        }
        Transition::Exit => {
            out.emit(SpatialOp::ClearOverlap { trigger, activator });
            if spec.track_exits {
                out.emit(SpatialOp::AppendExit { trigger, activator });
            }
        }
        Transition::Unchanged => {}
    }
}

fn world_bounds<V>(local: &Aabb, view: &V, entity: EntityId) -> Option<Aabb>
where
    V: SpatialView + ?Sized,
{
    view.world_position(entity).map(|p| local.translated(p))
}

/// Scans one moved trigger against every activator sharing a group with it.
///
/// An object holding both roles is its own candidate.
/// The trigger is marked visited before anything else, even if it turns out
/// to have no groups, no position or no candidates.
pub(crate) fn scan_trigger<V>(
    view: &V,
    index: &GroupIndex,
    scanned: &ScannedTriggers,
    trigger: EntityId,
    delta: &mut SpatialDelta,
) where
    V: SpatialView + ?Sized,
{
    scanned.insert(trigger);

    let Some(spec) = view.trigger(trigger) else {
        trace!(?trigger, "trigger scan: no trigger component");
        return;
    };
    let groups = view.groups(trigger);
    if groups.is_empty() {
        return;
    }
    let Some(trigger_bounds) = world_bounds(&spec.bounds, view, trigger) else {
        trace!(?trigger, "trigger scan: no world position");
        return;
    };

    let mut held = view.overlap(trigger);
    let mut visited: FxHashSet<EntityId> = FxHashSet::default();
    let mut out = delta.scoped(ScanPhase::TriggerScan, trigger);

    for group in groups {
        for activator in index.activators_in(group) {
            if !visited.insert(activator) {
                continue;
            }
            let Some(activator_bounds) = view
                .activator(activator)
                .and_then(|a| world_bounds(&a.bounds, view, activator))
            else {
                trace!(?trigger, ?activator, "trigger scan: stale activator skipped");
                continue;
            };
            let transition = classify(&trigger_bounds, &activator_bounds, held, activator);
            if transition == Transition::Enter {
                held = Some(activator);
            }
            record(&mut out, transition, trigger, &spec, activator);
        }
    }
}

/// Scans one moved activator against every trigger sharing a group with it,
/// skipping triggers the trigger scan already visited this tick.
pub(crate) fn scan_activator<V>(
    view: &V,
    index: &GroupIndex,
    scanned: &ScannedTriggers,
    activator: EntityId,
    delta: &mut SpatialDelta,
) where
    V: SpatialView + ?Sized,
{
    let Some(component) = view.activator(activator) else {
        trace!(?activator, "activator scan: no activator component");
        return;
    };
    let groups = view.groups(activator);
    if groups.is_empty() {
        return;
    }
    let Some(activator_bounds) = world_bounds(&component.bounds, view, activator) else {
        trace!(?activator, "activator scan: no world position");
        return;
    };

    let mut visited: FxHashSet<EntityId> = FxHashSet::default();
    let mut out = delta.scoped(ScanPhase::ActivatorScan, activator);

    for group in groups {
        for trigger in index.triggers_in(group) {
            if !visited.insert(trigger) || scanned.contains(&trigger) {
                continue;
            }
            let Some(spec) = view.trigger(trigger) else {
                continue;
            };
            let Some(trigger_bounds) = world_bounds(&spec.bounds, view, trigger) else {
                trace!(?trigger, ?activator, "activator scan: stale trigger skipped");
                continue;
            };
            let transition = classify(
                &trigger_bounds,
                &activator_bounds,
                view.overlap(trigger),
                activator,
            );
            record(&mut out, transition, trigger, &spec, activator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::make_entity_id;
    use crate::math::Vec3;

    fn cube(c: [f32; 3], h: f32) -> Aabb {
        match Aabb::try_new(Vec3::from(c), Vec3::splat(h)) {
            Ok(b) => b,
            Err(e) => unreachable!("{e}"),
        }
    }

    #[test]
    fn classification_table() {
        let x = make_entity_id("x");
        let z = make_entity_id("z");
        let t = cube([0.0; 3], 1.0);
        let inside = cube([0.0; 3], 0.1);
        let outside = cube([5.0, 0.0, 0.0], 0.1);
        let straddling = cube([1.0, 0.0, 0.0], 0.1);

        assert_eq!(classify(&t, &inside, None, x), Transition::Enter);
        assert_eq!(classify(&t, &inside, Some(x), x), Transition::Unchanged);
        assert_eq!(classify(&t, &inside, Some(z), x), Transition::Unchanged);
        assert_eq!(classify(&t, &outside, Some(x), x), Transition::Exit);
        assert_eq!(classify(&t, &outside, Some(z), x), Transition::Unchanged);
        assert_eq!(classify(&t, &outside, None, x), Transition::Unchanged);
        assert_eq!(classify(&t, &straddling, None, x), Transition::Unchanged);
        assert_eq!(classify(&t, &straddling, Some(x), x), Transition::Exit);
    }

    #[test]
    fn untracked_trigger_only_writes_the_marker() {
        let t = make_entity_id("t");
        let a = make_entity_id("a");
        let spec = SpatialTrigger::untracked(cube([0.0; 3], 1.0));
        let mut delta = SpatialDelta::new();
        {
            let mut out = delta.scoped(ScanPhase::TriggerScan, t);
            record(&mut out, Transition::Enter, t, &spec, a);
            record(&mut out, Transition::Exit, t, &spec, a);
        }
        assert_eq!(
            delta.ops(),
            &[
                SpatialOp::SetOverlap { trigger: t, activator: a },
                SpatialOp::ClearOverlap { trigger: t, activator: a },
            ]
        );
    }
}
