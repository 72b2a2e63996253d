// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! End-to-end entry/exit scenarios driven through `SpatialWorld`.

use echo_spatial::{
    make_group_tag, SpatialConfig, SpatialError, SpatialEventSystem, SpatialTrigger, SpatialWorld,
    Vec3,
};

mod common;
use common::{cube, spawn_activator, spawn_trigger};

const FAR: Vec3 = Vec3::new(5.0, 0.0, 0.0);

fn system() -> SpatialEventSystem {
    SpatialEventSystem::with_config(SpatialConfig::serial())
}

#[test]
fn scenario_a_activator_moves_into_trigger() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.1, FAR, &["G"])?;
    let mut sys = system();
    sys.update(&mut world);
    assert_eq!(world.overlap(t), None);

    world.set_position(x, Vec3::ZERO)?;
    let report = sys.update(&mut world);

    assert_eq!(world.entries(t), Some(&[x][..]));
    assert_eq!(world.overlap(t), Some(x));
    assert_eq!(report.emitted.set_overlap, 1);
    assert_eq!(report.playback.rejected, 0);
    Ok(())
}

#[test]
fn scenario_b_activator_leaves_trigger() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.1, FAR, &["G"])?;
    let mut sys = system();
    sys.update(&mut world);
    world.set_position(x, Vec3::ZERO)?;
    sys.update(&mut world);

    world.set_position(x, FAR)?;
    sys.update(&mut world);

    assert_eq!(world.exits(t), Some(&[x][..]));
    assert_eq!(world.overlap(t), None);
    assert_eq!(world.entries(t), Some(&[x][..]), "entry log is append-only");
    Ok(())
}

#[test]
fn scenario_c_disjoint_groups_never_pair() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let y = spawn_activator(&mut world, "Y", 0.1, FAR, &["H"])?;
    let mut sys = system();
    sys.update(&mut world);

    world.set_position(y, Vec3::ZERO)?;
    let report = sys.update(&mut world);

    assert_eq!(report.emitted.total(), 0);
    assert_eq!(world.overlap(t), None);
    assert!(world.entries(t).is_none());
    Ok(())
}

#[test]
fn scenario_d_second_activator_waits_for_the_first_to_leave() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.1, FAR, &["G"])?;
    let z = spawn_activator(&mut world, "Z", 0.1, Vec3::new(-5.0, 0.0, 0.0), &["G"])?;
    let mut sys = system();
    sys.update(&mut world);
    world.set_position(x, Vec3::ZERO)?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(x));

    world.set_position(z, Vec3::new(0.5, 0.0, 0.0))?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(x));
    assert_eq!(world.entries(t), Some(&[x][..]));

    // X leaves; Z is inside but has not moved, so nothing re-evaluates it.
    world.set_position(x, FAR)?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), None);
    assert_eq!(world.exits(t), Some(&[x][..]));

    world.translate(z, Vec3::new(-0.1, 0.0, 0.0))?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(z));
    assert_eq!(world.entries(t), Some(&[x, z][..]));
    Ok(())
}

#[test]
fn both_moving_into_overlap_reports_one_entry() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::new(0.0, 10.0, 0.0), &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.1, FAR, &["G"])?;
    let mut sys = system();
    sys.update(&mut world);

    world.set_position(t, Vec3::new(1.0, 1.0, 1.0))?;
    world.set_position(x, Vec3::new(1.0, 1.0, 1.0))?;
    let report = sys.update(&mut world);

    assert_eq!(world.entries(t), Some(&[x][..]));
    assert_eq!(report.emitted.append_entry, 1);
    assert_eq!(report.scanned_triggers, 1);
    Ok(())
}

#[test]
fn trigger_moving_over_a_resting_activator_enters() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), FAR, &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.1, Vec3::ZERO, &["G"])?;
    let mut sys = system();
    sys.update(&mut world);
    assert_eq!(world.overlap(t), None);

    world.set_position(t, Vec3::new(0.2, 0.0, 0.0))?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(x));

    world.set_position(t, FAR)?;
    sys.update(&mut world);
    assert_eq!(world.exits(t), Some(&[x][..]));
    Ok(())
}

#[test]
fn shared_groups_do_not_double_report() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G", "H"])?;
    let x = spawn_activator(&mut world, "X", 0.1, FAR, &["H", "G"])?;
    let mut sys = system();
    sys.update(&mut world);

    world.set_position(x, Vec3::ZERO)?;
    sys.update(&mut world);
    world.set_position(x, FAR)?;
    sys.update(&mut world);

    assert_eq!(world.entries(t), Some(&[x][..]));
    assert_eq!(world.exits(t), Some(&[x][..]));
    Ok(())
}

#[test]
fn partial_overlap_is_not_an_entry() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.5, FAR, &["G"])?;
    let mut sys = system();
    sys.update(&mut world);

    world.set_position(x, Vec3::new(0.8, 0.0, 0.0))?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), None);

    world.set_position(x, Vec3::new(0.5, 0.0, 0.0))?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(x));

    // Straddling the face again counts as leaving.
    world.set_position(x, Vec3::new(0.8, 0.0, 0.0))?;
    sys.update(&mut world);
    assert_eq!(world.exits(t), Some(&[x][..]));
    Ok(())
}

#[test]
fn untracked_trigger_keeps_marker_without_logs() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::untracked(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.1, FAR, &["G"])?;
    let mut sys = system();
    sys.update(&mut world);

    world.set_position(x, Vec3::ZERO)?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(x));
    world.set_position(x, FAR)?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), None);
    assert!(world.entries(t).is_none());
    assert!(world.exits(t).is_none());
    Ok(())
}

#[test]
fn object_with_both_roles_can_contain_itself() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let both = spawn_trigger(&mut world, "B", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    world.insert_activator(both, echo_spatial::SpatialActivator { bounds: cube(0.1)? })?;
    let mut sys = system();
    let report = sys.update(&mut world);
    assert_eq!(report.emitted.set_overlap, 1);
    assert_eq!(world.overlap(both), Some(both));
    assert_eq!(world.entries(both), Some(&[both][..]));

    // Self holds the marker, so a second activator inside is not an entry.
    let x = spawn_activator(&mut world, "X", 0.1, Vec3::ZERO, &["G"])?;
    sys.update(&mut world);
    assert_eq!(world.overlap(both), Some(both));
    assert_eq!(world.entries(both), Some(&[both][..]));
    assert_ne!(world.overlap(both), Some(x));
    Ok(())
}

#[test]
fn simultaneous_entries_pick_one_winner() -> Result<(), SpatialError> {
    for config in [
        SpatialConfig::serial(),
        SpatialConfig {
            workers: 4,
            min_parallel_items: 0,
        },
    ] {
        let mut world = SpatialWorld::new();
        let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
        let x = spawn_activator(&mut world, "X", 0.1, FAR, &["G"])?;
        let y = spawn_activator(&mut world, "Y", 0.1, Vec3::new(-5.0, 0.0, 0.0), &["G"])?;
        let mut sys = SpatialEventSystem::with_config(config);
        sys.update(&mut world);

        world.set_position(x, Vec3::new(0.2, 0.0, 0.0))?;
        world.set_position(y, Vec3::new(-0.2, 0.0, 0.0))?;
        let report = sys.update(&mut world);

        // Both activator scans emit Set + Entry; ops sort by source id.
        let winner = x.min(y);
        assert_eq!(report.emitted.set_overlap, 2);
        assert_eq!(report.playback.applied, 2);
        assert_eq!(report.playback.rejected, 2);
        assert_eq!(world.overlap(t), Some(winner));
        assert_eq!(world.entries(t), Some(&[winner][..]));
    }
    Ok(())
}

#[test]
fn tag_change_alone_does_not_rescan() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let y = spawn_activator(&mut world, "Y", 0.1, Vec3::ZERO, &["H"])?;
    let mut sys = system();
    sys.update(&mut world);
    assert_eq!(world.overlap(t), None);

    world.set_groups(y, [make_group_tag("G")])?;
    let report = sys.update(&mut world);
    assert_eq!(report.index.inserted, 1);
    assert_eq!(report.index.removed, 1);
    assert_eq!(world.overlap(t), None);

    world.translate(y, Vec3::new(0.1, 0.0, 0.0))?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(y));
    Ok(())
}

#[test]
fn empty_tag_list_is_unreachable() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &[])?;
    let x = spawn_activator(&mut world, "X", 0.1, FAR, &["G"])?;
    let mut sys = system();
    let first = sys.update(&mut world);
    assert_eq!(first.scanned_triggers, 1);

    world.set_position(x, Vec3::ZERO)?;
    world.set_position(t, Vec3::new(0.1, 0.0, 0.0))?;
    let report = sys.update(&mut world);
    assert_eq!(report.emitted.total(), 0);
    assert_eq!(world.overlap(t), None);
    Ok(())
}

#[test]
fn despawned_activator_releases_its_trigger() -> Result<(), SpatialError> {
    let mut world = SpatialWorld::new();
    let t = spawn_trigger(&mut world, "T", SpatialTrigger::tracking(cube(1.0)?), Vec3::ZERO, &["G"])?;
    let x = spawn_activator(&mut world, "X", 0.1, Vec3::ZERO, &["G"])?;
    let mut sys = system();
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(x));

    world.despawn(x)?;
    let report = sys.update(&mut world);
    assert_eq!(report.purged, 1);
    assert_eq!(world.overlap(t), None);
    assert!(world.exits(t).is_none());

    let z = spawn_activator(&mut world, "Z", 0.1, Vec3::ZERO, &["G"])?;
    sys.update(&mut world);
    assert_eq!(world.overlap(t), Some(z));
    Ok(())
}
