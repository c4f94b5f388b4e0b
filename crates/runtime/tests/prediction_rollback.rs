//! Prediction key lifecycle: speculative application, rejection rollback,
//! expiry, and idempotent resolution.

use combat_core::{
    AttributeKind, AttributeStore, CharacterId, CombatConfig, DurationPolicy, EffectClassId,
    GameplayEffectDef, Modifier,
};
use sync_runtime::{
    AbilityId, ConnectionId, Event, KeyResolution, MeshId, Montage, MontageHandle, NetRole,
    PredictionEvent, Tick, Topic, World, MONTAGE_PREDICTION_REJECT_FADETIME,
};

const SPRINT: EffectClassId = EffectClassId(1);
const SWING: MontageHandle = MontageHandle(1);
const MESH: MeshId = MeshId(0);

fn predicted_world() -> (World, CharacterId) {
    let mut world = World::new(CombatConfig::default());
    world.effects.register(
        SPRINT,
        GameplayEffectDef::new("buff.sprint", DurationPolicy::Infinite)
            .with_modifier(Modifier::add(AttributeKind::MoveSpeed, 200.0)),
    );
    world.library.register(
        Montage::new(SWING, 2.0, 0.4)
            .with_section("start", 0.0)
            .with_section("end", 1.6),
    );

    let character = world.spawn_character(
        NetRole::Predicting,
        AttributeStore::with_vitals(100.0, 50.0, 600.0),
    );
    (world, character)
}

#[test]
fn rejected_key_reverts_effects_and_stops_montage() {
    let (mut world, character) = predicted_world();
    let digest_before = world.digest();

    let key = world.issue_prediction_key(ConnectionId(1), 100);
    world
        .apply_effect_to_self(character, SPRINT, 1.0, Some(&key))
        .unwrap();
    let duration = world.play_montage(
        character,
        MESH,
        AbilityId(0),
        SWING,
        1.0,
        None,
        Some(&key),
    );
    assert_eq!(duration, 2.0);
    assert_eq!(
        world.arena.get(character).unwrap().attributes.move_speed(),
        800.0
    );

    world.reject_key(key.id);
    world.update(Tick(1), 0.0);

    // Attribute state is back byte-exactly, the active effect is gone, and
    // the montage died with the fixed rejection fade.
    assert_eq!(world.digest(), digest_before);
    assert!(world.arena.get(character).unwrap().active_effects.is_empty());
    let table = world.montage_table(character).unwrap();
    assert!(table.is_stopped(MESH));
    assert_eq!(
        table.last_blend_out(MESH),
        Some(MONTAGE_PREDICTION_REJECT_FADETIME)
    );
}

#[test]
fn confirmed_key_keeps_speculative_state() {
    let (mut world, character) = predicted_world();

    let key = world.issue_prediction_key(ConnectionId(1), 100);
    world
        .apply_effect_to_self(character, SPRINT, 1.0, Some(&key))
        .unwrap();
    world.play_montage(character, MESH, AbilityId(0), SWING, 1.0, None, Some(&key));

    world.confirm_key(key.id);
    world.update(Tick(1), 0.0);

    assert_eq!(
        world.arena.get(character).unwrap().attributes.move_speed(),
        800.0
    );
    assert!(!world.montage_table(character).unwrap().is_stopped(MESH));
}

#[test]
fn unresolved_key_expires_like_a_rejection() {
    let (mut world, character) = predicted_world();
    let digest_before = world.digest();
    let mut prediction = world.bus().subscribe(Topic::Prediction);

    let key = world.issue_prediction_key(ConnectionId(1), 10);
    world
        .apply_effect_to_self(character, SPRINT, 1.0, Some(&key))
        .unwrap();

    // Window elapses with no resolution delivered.
    world.update(Tick(11), 0.0);

    assert_eq!(world.digest(), digest_before);
    let Ok(Event::Prediction(PredictionEvent::KeyResolved { key: id, resolution })) =
        prediction.try_recv()
    else {
        panic!("expected a resolution event");
    };
    assert_eq!(id, key.id);
    assert_eq!(resolution, KeyResolution::Expired);
    assert_eq!(world.ledger.counters(), (0, 0, 1));
}

#[test]
fn resolution_after_confirm_is_ignored() {
    let (mut world, character) = predicted_world();

    let key = world.issue_prediction_key(ConnectionId(1), 100);
    world
        .apply_effect_to_self(character, SPRINT, 1.0, Some(&key))
        .unwrap();

    world.confirm_key(key.id);
    world.reject_key(key.id);
    world.update(Tick(1), 0.0);

    // The late rejection must not roll anything back.
    assert_eq!(
        world.arena.get(character).unwrap().attributes.move_speed(),
        800.0
    );
    assert_eq!(world.ledger.counters(), (1, 0, 0));
}

#[test]
fn rollback_skips_montage_replaced_after_rejection() {
    let (mut world, character) = predicted_world();
    world
        .library
        .register(Montage::new(MontageHandle(2), 1.0, 0.2));

    let key = world.issue_prediction_key(ConnectionId(1), 100);
    world.play_montage(character, MESH, AbilityId(0), SWING, 1.0, None, Some(&key));

    // Another ability legitimately takes the mesh over before the
    // rejection lands.
    world.play_montage(character, MESH, AbilityId(1), MontageHandle(2), 1.0, None, None);

    world.reject_key(key.id);
    world.update(Tick(1), 0.0);

    let table = world.montage_table(character).unwrap();
    assert!(!table.is_stopped(MESH));
    assert_eq!(table.current_montage(MESH), Some(MontageHandle(2)));
}
