use crate::battle::state::{BattleEvent, Outcome, TurnPhase, TurnRng};
use crate::battle::tests::common::{
    create_test_battle, create_test_battle_with_teams, damage_to, move_order, predictable_rng,
    run_turn, use_move, TestCombatantBuilder,
};
use crate::player::PlayerAction;
use crate::pokedex::FixtureDex;
use pretty_assertions::assert_eq;
use schema::StatType;

#[test]
fn higher_effective_speed_acts_first() {
    let dex = FixtureDex::bundled();
    let pikachu = TestCombatantBuilder::new(25).build(&dex);
    let squirtle = TestCombatantBuilder::new(7).build(&dex);
    let mut record = create_test_battle(pikachu, squirtle);

    let bus = run_turn(
        &mut record,
        use_move("quick-attack"),
        use_move("tackle"),
        predictable_rng(),
    );
    assert_eq!(move_order(&bus), vec![0, 1]);

    // Swap the seats: the faster side still goes first.
    let pikachu = TestCombatantBuilder::new(25).build(&dex);
    let squirtle = TestCombatantBuilder::new(7).build(&dex);
    let mut record = create_test_battle(squirtle, pikachu);
    let bus = run_turn(
        &mut record,
        use_move("tackle"),
        use_move("quick-attack"),
        predictable_rng(),
    );
    assert_eq!(move_order(&bus), vec![1, 0]);
}

#[test]
fn speed_tie_defaults_to_player_one() {
    let dex = FixtureDex::bundled();
    let pikachu_a = TestCombatantBuilder::new(25).build(&dex);
    let pikachu_b = TestCombatantBuilder::new(25).build(&dex);
    let mut record = create_test_battle(pikachu_a, pikachu_b);

    let bus = run_turn(
        &mut record,
        use_move("quick-attack"),
        use_move("quick-attack"),
        predictable_rng(),
    );
    assert_eq!(move_order(&bus), vec![0, 1]);
}

#[test]
fn fainting_cancels_the_slower_action() {
    let dex = FixtureDex::bundled();
    let gengar = TestCombatantBuilder::new(94).build(&dex);
    let bulbasaur = TestCombatantBuilder::new(1).with_hp(1).build(&dex);
    let mut record = create_test_battle(gengar, bulbasaur);

    let bus = run_turn(
        &mut record,
        use_move("sludge-bomb"),
        use_move("vine-whip"),
        TurnRng::scripted(vec![16, 50]),
    );

    assert_eq!(move_order(&bus), vec![0]);
    assert!(bus.events().iter().any(|e| matches!(
        e,
        BattleEvent::Fainted { player_index: 1, .. }
    )));
    assert_eq!(record.phase, TurnPhase::Finished);
    assert_eq!(record.outcome, Outcome::Player1Win);
}

#[test]
fn switches_resolve_before_any_move() {
    let dex = FixtureDex::bundled();
    let pikachu = TestCombatantBuilder::new(25).build(&dex);
    let squirtle = TestCombatantBuilder::new(7).build(&dex);
    let charmander = TestCombatantBuilder::new(4).build(&dex);
    let mut record = create_test_battle_with_teams(vec![pikachu, squirtle], vec![charmander]);

    let bus = run_turn(
        &mut record,
        PlayerAction::SwitchPokemon { team_index: 1 },
        use_move("ember"),
        predictable_rng(),
    );

    // The incoming combatant eats the hit, so the switch happened first.
    assert_eq!(record.players[0].active_index, 1);
    assert_eq!(move_order(&bus), vec![1]);
    assert!(damage_to(&bus, "squirtle").is_some());
    assert!(bus.events().iter().any(|e| matches!(
        e,
        BattleEvent::CombatantSwitched { player_index: 0, .. }
    )));
}

#[test]
fn intimidate_fires_on_a_voluntary_switch_in() {
    let dex = FixtureDex::bundled();
    let pikachu = TestCombatantBuilder::new(25).build(&dex);
    let gyarados = TestCombatantBuilder::new(130).build(&dex);
    let charmander = TestCombatantBuilder::new(4).build(&dex);
    let mut record = create_test_battle_with_teams(vec![pikachu, gyarados], vec![charmander]);

    let bus = run_turn(
        &mut record,
        PlayerAction::SwitchPokemon { team_index: 1 },
        use_move("scratch"),
        predictable_rng(),
    );

    assert!(bus.events().iter().any(|e| matches!(
        e,
        BattleEvent::EntryAbilityTriggered {
            ability: schema::Ability::Intimidate,
            ..
        }
    )));
    assert_eq!(
        record.players[1]
            .active()
            .unwrap()
            .stat_stage(StatType::Attack),
        -1
    );
}
