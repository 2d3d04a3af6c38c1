use crate::battle::ai::{Behavior, RandomBehavior};
use crate::battle::engine::{resolve_forced_switch, resolve_turn};
use crate::battle::state::{BattleRecord, TurnPhase, TurnRng};
use crate::battle::tests::common::create_test_battle_with_teams;
use crate::player::PlayerAction;
use crate::pokedex::FixtureDex;
use crate::pokemon::Combatant;

fn build_team(dex: &FixtureDex, ids: &[u16]) -> Vec<Combatant> {
    ids.iter()
        .map(|id| Combatant::from_dex(dex, *id).expect("fixture species should build"))
        .collect()
}

fn assert_invariants(record: &BattleRecord) {
    for player in record.players.iter() {
        for combatant in player.team.iter().flatten() {
            assert!(
                combatant.current_hp <= combatant.max_hp,
                "{} exceeded max HP",
                combatant.name
            );
            assert_eq!(
                combatant.is_fainted(),
                combatant.current_hp == 0,
                "faint flag out of sync for {}",
                combatant.name
            );
            for (stat, stage) in combatant.stat_stages.iter() {
                assert!(
                    (-6..=6).contains(stage),
                    "{} stage for {:?} out of bounds",
                    combatant.name,
                    stat
                );
            }
            for instance in combatant.moves.iter().flatten() {
                assert!(instance.pp <= instance.max_pp());
            }
        }
    }
    if record.phase == TurnPhase::Selecting {
        for player in record.players.iter() {
            assert!(
                player.active().is_some_and(|c| !c.is_fainted()),
                "a fainted active survived into Selecting"
            );
        }
    }
}

/// Drive a full 6v6 battle with the practice behavior on both seats. The
/// seeded oracle makes the run reproducible; every intermediate record must
/// uphold the combatant invariants, and the battle must actually end.
#[test]
fn seeded_practice_battle_runs_to_a_terminal_outcome() {
    let dex = FixtureDex::bundled();
    let team1 = build_team(&dex, &[25, 4, 7, 1, 74, 94]);
    let team2 = build_team(&dex, &[34, 130, 135, 74, 1, 25]);
    let mut record = create_test_battle_with_teams(team1, team2);

    let behavior = RandomBehavior;
    let mut rng = TurnRng::seeded(0xA11CE);

    for _ in 0..400 {
        match record.phase {
            TurnPhase::Finished => break,
            TurnPhase::Selecting => {
                for seat in 0..2 {
                    let action = behavior
                        .choose_action(&record, seat, &mut rng)
                        .expect("selecting phase always offers an action");
                    record.players[seat].pending_action = Some(action);
                }
                let (next, _bus) = resolve_turn(&record, &mut rng).expect("turn should resolve");
                record = next;
            }
            _ => {
                let seat = (0..2)
                    .find(|&s| record.awaits_replacement_from(s))
                    .expect("switch phase names a player");
                let action = behavior
                    .choose_action(&record, seat, &mut rng)
                    .expect("a reserve exists while the battle is ongoing");
                let PlayerAction::SwitchPokemon { team_index } = action else {
                    panic!("replacement phase must produce a switch");
                };
                let (next, _bus) =
                    resolve_forced_switch(&record, seat, team_index).expect("switch should apply");
                record = next;
            }
        }
        assert_invariants(&record);
    }

    assert_eq!(record.phase, TurnPhase::Finished);
    assert!(record.outcome.is_terminal());
    assert!(record.turn_number > 1);
}
