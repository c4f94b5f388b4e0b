//! End-to-end damage pipeline through the world facade.

use combat_core::{
    AttributeKind, AttributeStore, CharacterId, CombatConfig, DurationPolicy, EffectClassId,
    GameplayEffectDef, ModOp, Modifier,
};
use sync_runtime::{
    CombatEvent, EffectContainerSpec, Event, EventData, NetRole, TargetDescriptor,
    TargetResolver, Topic, World,
};

const DAMAGE: EffectClassId = EffectClassId(1);
const GROW_MAX_HEALTH: EffectClassId = EffectClassId(2);

fn world() -> (World, CharacterId, CharacterId) {
    let mut world = World::new(CombatConfig::default());
    world.effects.register(
        DAMAGE,
        GameplayEffectDef::new("damage.basic", DurationPolicy::Instant)
            .with_modifier(Modifier::add(AttributeKind::Damage, 50.0)),
    );
    world.effects.register(
        GROW_MAX_HEALTH,
        GameplayEffectDef::new("buff.grow", DurationPolicy::Instant)
            .with_modifier(Modifier::new(AttributeKind::MaxHealth, ModOp::Override, 200.0)),
    );

    let attacker = world.spawn_character(
        NetRole::Authority,
        AttributeStore::with_vitals(100.0, 50.0, 600.0),
    );
    let victim = world.spawn_character_with_bounty(
        NetRole::Authority,
        AttributeStore::with_vitals(100.0, 50.0, 600.0),
        25.0,
        10.0,
    );
    (world, attacker, victim)
}

#[test]
fn ratio_preserving_growth_then_lethal_damage() {
    let (mut world, attacker, victim) = world();
    let mut combat = world.bus().subscribe(Topic::Combat);

    // Half the victim's health: 100 -> 50.
    world
        .apply_effect_to_target(attacker, victim, DAMAGE, 1.0, None)
        .unwrap();
    assert_eq!(world.arena.get(victim).unwrap().attributes.health(), 50.0);

    // MaxHealth 100 -> 200 preserves the 50% ratio: health becomes 100.
    world
        .apply_effect_to_target(attacker, victim, GROW_MAX_HEALTH, 1.0, None)
        .unwrap();
    let attributes = &world.arena.get(victim).unwrap().attributes;
    assert_eq!(attributes.max_health(), 200.0);
    assert!((attributes.health() - 100.0).abs() < 1e-3);

    // Damage 150 (level 3 of the 50-point effect) kills.
    let applied = world
        .apply_effect_to_target(attacker, victim, DAMAGE, 3.0, None)
        .unwrap();
    let damage = applied.damage.unwrap();
    assert_eq!(world.arena.get(victim).unwrap().attributes.health(), 0.0);
    assert_eq!(damage.death.unwrap().killer, Some(attacker));

    let bounty = damage.bounty.unwrap();
    assert_eq!(bounty.receiver, attacker);
    let attacker_attributes = &world.arena.get(attacker).unwrap().attributes;
    assert_eq!(attacker_attributes.experience(), 25.0);
    assert_eq!(attacker_attributes.gold(), 10.0);

    // Event stream: two plain damage events, then the lethal one with its
    // death and bounty.
    let mut deaths = 0;
    let mut bounties = 0;
    let mut hits = 0;
    while let Ok(event) = combat.try_recv() {
        match event {
            Event::Combat(CombatEvent::DamageTaken(_)) => hits += 1,
            Event::Combat(CombatEvent::CharacterDied(_)) => deaths += 1,
            Event::Combat(CombatEvent::BountyGranted(_)) => bounties += 1,
            _ => {}
        }
    }
    assert_eq!(hits, 2);
    assert_eq!(deaths, 1);
    assert_eq!(bounties, 1);
}

#[test]
fn second_lethal_hit_emits_no_second_death() {
    let (mut world, attacker, victim) = world();
    let mut combat = world.bus().subscribe(Topic::Combat);

    world
        .apply_effect_to_target(attacker, victim, DAMAGE, 10.0, None)
        .unwrap();
    world
        .apply_effect_to_target(attacker, victim, DAMAGE, 10.0, None)
        .unwrap();

    let mut deaths = 0;
    while let Ok(event) = combat.try_recv() {
        if let Event::Combat(CombatEvent::CharacterDied(_)) = event {
            deaths += 1;
        }
    }
    assert_eq!(deaths, 1);
}

#[test]
fn self_damage_kills_without_bounty() {
    let (mut world, _, victim) = world();

    let applied = world
        .apply_effect_to_self(victim, DAMAGE, 10.0, None)
        .unwrap();
    let damage = applied.damage.unwrap();
    assert!(damage.death.is_some());
    assert_eq!(damage.death.unwrap().killer, None);
    assert!(damage.bounty.is_none());

    let attributes = &world.arena.get(victim).unwrap().attributes;
    assert_eq!(attributes.experience(), 0.0);
    assert_eq!(attributes.gold(), 0.0);
}

#[test]
fn event_data_targeting_feeds_the_container() {
    let (mut world, attacker, victim) = world();

    // Targets computed upstream arrive through the event payload.
    let event = EventData {
        instigator: Some(attacker),
        targets: vec![TargetDescriptor::new(victim)],
    };
    let targets = TargetResolver::UseEventData.resolve(attacker, Some(&event));

    let mut container = EffectContainerSpec::new(vec![DAMAGE]);
    container.add_targets(&targets);
    let applied = world
        .apply_container(attacker, &container, 1.0, None)
        .unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(world.arena.get(victim).unwrap().attributes.health(), 50.0);
}

#[test]
fn empty_target_set_applies_nothing() {
    let (mut world, attacker, victim) = world();

    let container = EffectContainerSpec::new(vec![DAMAGE]);
    assert!(!container.has_valid_targets());

    let applied = world
        .apply_container(attacker, &container, 1.0, None)
        .unwrap();
    assert!(applied.is_empty());
    assert_eq!(world.arena.get(victim).unwrap().attributes.health(), 100.0);
}

#[test]
fn move_speed_writes_clamp_to_policy_bounds() {
    let (mut world, attacker, _) = world();

    world
        .set_attribute(attacker, AttributeKind::MoveSpeed, 10_000.0)
        .unwrap();
    assert_eq!(
        world.arena.get(attacker).unwrap().attributes.move_speed(),
        CombatConfig::DEFAULT_MOVE_SPEED_MAX
    );

    world
        .set_attribute(attacker, AttributeKind::MoveSpeed, 1.0)
        .unwrap();
    assert_eq!(
        world.arena.get(attacker).unwrap().attributes.move_speed(),
        CombatConfig::DEFAULT_MOVE_SPEED_MIN
    );
}
