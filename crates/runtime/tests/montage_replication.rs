//! Simulated-proxy playback: applying authoritative snapshots and
//! reconciling drift against client-reported positions.

use combat_core::{AttributeKind, AttributeStore, CharacterId, CombatConfig};
use sync_runtime::{
    JumpAbility, MeshId, Montage, MontageHandle, NetRole, ReplicatedMontageState, Tick, World,
};

const SWING: MontageHandle = MontageHandle(1);
const MESH: MeshId = MeshId(0);

fn simulated_world() -> (World, CharacterId) {
    let mut world = World::new(CombatConfig::default());
    world.library.register(
        Montage::new(SWING, 2.0, 0.4)
            .with_section("start", 0.0)
            .with_section("loop", 0.8)
            .with_section("end", 1.6),
    );
    let character = world.spawn_character(
        NetRole::Simulated,
        AttributeStore::with_vitals(100.0, 50.0, 600.0),
    );
    (world, character)
}

fn snapshot(position: f32, is_stopped: bool) -> ReplicatedMontageState {
    ReplicatedMontageState {
        mesh: MESH,
        montage: Some(SWING),
        play_rate: 1.0,
        position,
        next_section: None,
        is_stopped,
    }
}

#[test]
fn snapshot_drives_simulated_playback_without_ownership() {
    let (mut world, character) = simulated_world();

    world.apply_replicated_montage(character, &snapshot(0.0, false));
    let table = world.montage_table(character).unwrap();
    assert_eq!(table.current_montage(MESH), Some(SWING));
    assert_eq!(table.owning_ability(MESH), None);

    world.apply_replicated_montage(character, &snapshot(0.0, true));
    let table = world.montage_table(character).unwrap();
    assert!(table.is_stopped(MESH));
}

#[test]
fn drifting_proxy_snaps_to_authoritative_position() {
    let (mut world, character) = simulated_world();
    world.apply_replicated_montage(character, &snapshot(0.0, false));

    // Local playback runs ahead while no snapshot arrives.
    world.update(Tick(1), 0.3);
    world.apply_replicated_montage(character, &snapshot(1.2, false));

    let table = world.montage_table(character).unwrap();
    assert_eq!(table.montage_position(MESH), Some(1.2));
}

#[test]
fn small_drift_is_left_alone() {
    let (mut world, character) = simulated_world();
    world.apply_replicated_montage(character, &snapshot(0.0, false));

    world.update(Tick(1), 0.3);
    world.apply_replicated_montage(character, &snapshot(0.4, false));

    let table = world.montage_table(character).unwrap();
    assert_eq!(table.montage_position(MESH), Some(0.3));
}

#[test]
fn reconcile_applies_section_transition_and_snaps() {
    let (mut world, character) = simulated_world();
    world.apply_replicated_montage(character, &snapshot(0.0, false));

    // Client reports playback deep in "end" while we still sit in "start".
    world.reconcile_montage(character, MESH, SWING, 1.7, "end", "end");

    let table = world.montage_table(character).unwrap();
    assert_eq!(table.current_section(MESH), Some("end"));
    assert_eq!(table.montage_position(MESH), Some(1.7));
}

#[test]
fn replicated_attribute_commits_land_on_simulated_proxies() {
    let (mut world, character) = simulated_world();

    world
        .apply_replicated_attribute(character, AttributeKind::Health, 40.0)
        .unwrap();
    assert_eq!(world.arena.get(character).unwrap().attributes.health(), 40.0);
}

#[test]
fn ability_end_releases_every_mesh_it_held() {
    let mut world = World::new(CombatConfig::default());
    world.library.register(Montage::new(SWING, 2.0, 0.4));
    let character = world.spawn_character(
        NetRole::Authority,
        AttributeStore::with_vitals(100.0, 50.0, 600.0),
    );

    let jump = world.grant_ability(
        character,
        Box::new(JumpAbility::new(
            MESH,
            Montage::new(MontageHandle(7), 1.0, 0.2),
        )),
    );
    assert!(world.activate_ability(jump).unwrap());
    assert_eq!(
        world.montage_table(character).unwrap().owning_ability(MESH),
        Some(jump)
    );

    world.end_ability(jump).unwrap();
    assert_eq!(
        world.montage_table(character).unwrap().owning_ability(MESH),
        None
    );
}
