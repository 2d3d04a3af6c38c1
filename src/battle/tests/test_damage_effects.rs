use crate::battle::state::BattleEvent;
use crate::battle::tests::common::{
    create_test_battle, damage_to, predictable_rng, run_turn, use_move, TestCombatantBuilder,
};
use crate::pokedex::FixtureDex;
use pretty_assertions::assert_eq;

#[test]
fn stab_and_effectiveness_multiply_the_floored_base() {
    let dex = FixtureDex::bundled();
    let pikachu = TestCombatantBuilder::new(25).build(&dex);
    let squirtle = TestCombatantBuilder::new(7).build(&dex);
    let mut record = create_test_battle(pikachu, squirtle);

    let bus = run_turn(
        &mut record,
        use_move("thunderbolt"),
        use_move("tackle"),
        predictable_rng(),
    );

    // Thunderbolt: base floor(32.9375) = 32, then x1.5 STAB and x2.0 vs Water.
    assert_eq!(damage_to(&bus, "squirtle"), Some(96));
    // Tackle back: base floor(23.12) = 23, no STAB, neutral.
    assert_eq!(damage_to(&bus, "pikachu"), Some(23));

    assert!(bus
        .events()
        .contains(&BattleEvent::AttackTypeEffectiveness { multiplier: 2.0 }));
}

#[test]
fn type_immunity_deals_nothing_and_announces_it() {
    let dex = FixtureDex::bundled();
    let nidoking = TestCombatantBuilder::new(34).build(&dex);
    let gyarados = TestCombatantBuilder::new(130).build(&dex);
    let mut record = create_test_battle(nidoking, gyarados);

    // Ground into Water/Flying is immune; Gyarados spends the turn on a
    // status move so the record survives unscathed for the assertion.
    let bus = run_turn(
        &mut record,
        use_move("earthquake"),
        use_move("dragon-dance"),
        predictable_rng(),
    );

    assert_eq!(damage_to(&bus, "gyarados"), None);
    assert!(bus
        .events()
        .contains(&BattleEvent::AttackTypeEffectiveness { multiplier: 0.0 }));
    assert_eq!(
        record.players[1].active().unwrap().current_hp,
        record.players[1].active().unwrap().max_hp
    );
}

#[test]
fn levitate_nullifies_a_ground_move_that_the_chart_would_double() {
    let dex = FixtureDex::bundled();
    let nidoking = TestCombatantBuilder::new(34).build(&dex);
    let gengar = TestCombatantBuilder::new(94).build(&dex);
    let mut record = create_test_battle(nidoking, gengar);

    let bus = run_turn(
        &mut record,
        use_move("earthquake"),
        use_move("dark-pulse"),
        predictable_rng(),
    );

    assert_eq!(damage_to(&bus, "gengar"), None);
    assert!(bus.events().iter().any(|e| matches!(
        e,
        BattleEvent::AbilityNullifiedAttack {
            ability: schema::Ability::Levitate,
            ..
        }
    )));
    // Dark Pulse still lands on Nidoking.
    assert!(damage_to(&bus, "nidoking").is_some());
}

#[test]
fn volt_absorb_converts_the_hit_into_healing() {
    let dex = FixtureDex::bundled();
    let pikachu = TestCombatantBuilder::new(25).build(&dex);
    let jolteon = TestCombatantBuilder::new(135).with_hp(50).build(&dex);
    let mut record = create_test_battle(pikachu, jolteon);

    let bus = run_turn(
        &mut record,
        use_move("thunderbolt"),
        use_move("agility"),
        predictable_rng(),
    );

    assert_eq!(damage_to(&bus, "jolteon"), None);
    let jolteon_max = record.players[1].active().unwrap().max_hp;
    assert!(bus.events().contains(&BattleEvent::Healed {
        target: "jolteon".to_string(),
        amount: jolteon_max / 4,
        new_hp: 50 + jolteon_max / 4,
    }));
}

#[test]
fn revealed_moves_accumulate_for_the_opposing_ui() {
    let dex = FixtureDex::bundled();
    let pikachu = TestCombatantBuilder::new(25).build(&dex);
    let squirtle = TestCombatantBuilder::new(7).build(&dex);
    let mut record = create_test_battle(pikachu, squirtle);

    run_turn(
        &mut record,
        use_move("thunderbolt"),
        use_move("tackle"),
        predictable_rng(),
    );

    assert!(record.players[0].revealed_moves.contains("thunderbolt"));
    assert!(record.players[1].revealed_moves.contains("tackle"));
    assert!(!record.players[0].revealed_moves.contains("quick-attack"));
}
