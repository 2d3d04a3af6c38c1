use crate::battle::calculators::resolve_move;
use crate::battle::state::{
    BattleEvent, BattleRecord, EventBus, Outcome, SkipReason, TurnPhase, TurnRng,
};
use crate::battle::stats::effective_speed;
use crate::errors::{ActionError, ArenaResult, StateError};
use crate::player::PlayerAction;
use crate::pokemon::StatusCondition;
use schema::Target;

/// Validate a player intent against the current record. This runs on the
/// submitting client before any network write, and again inside the store
/// transaction against the freshest record; an invalid action never mutates
/// shared state.
pub fn validate_action(
    record: &BattleRecord,
    player_index: usize,
    action: &PlayerAction,
) -> Result<(), ActionError> {
    if record.outcome.is_terminal() {
        return Err(ActionError::BattleFinished);
    }

    match record.phase {
        TurnPhase::Selecting => {
            if record.players[player_index].pending_action.is_some() {
                return Err(ActionError::AlreadySubmitted);
            }
            match action {
                PlayerAction::UseMove { move_name } => {
                    validate_move_choice(record, player_index, move_name)
                }
                PlayerAction::SwitchPokemon { team_index } => {
                    validate_switch_target(record, player_index, *team_index)
                }
                PlayerAction::Forfeit => Ok(()),
            }
        }
        TurnPhase::Player1MustSwitch | TurnPhase::Player2MustSwitch | TurnPhase::BothMustSwitch => {
            if record.awaits_replacement_from(player_index) {
                match action {
                    PlayerAction::SwitchPokemon { team_index } => {
                        validate_switch_target(record, player_index, *team_index)
                    }
                    _ => Err(ActionError::OutOfTurn),
                }
            } else {
                // The unaffected side may queue an unrelated action for the
                // coming turn while the opponent picks a replacement.
                if record.players[player_index].pending_action.is_some() {
                    return Err(ActionError::AlreadySubmitted);
                }
                match action {
                    PlayerAction::UseMove { move_name } => {
                        validate_move_choice(record, player_index, move_name)
                    }
                    PlayerAction::SwitchPokemon { team_index } => {
                        validate_switch_target(record, player_index, *team_index)
                    }
                    PlayerAction::Forfeit => Ok(()),
                }
            }
        }
        TurnPhase::Processing | TurnPhase::Finished => Err(ActionError::OutOfTurn),
    }
}

fn validate_move_choice(
    record: &BattleRecord,
    player_index: usize,
    move_name: &str,
) -> Result<(), ActionError> {
    let player = &record.players[player_index];
    let active = player
        .active()
        .ok_or_else(|| ActionError::InvalidTeamSlot(player.active_index))?;
    let slot = active
        .move_slot(move_name)
        .ok_or_else(|| ActionError::UnknownMove(move_name.to_string()))?;
    let instance = active.moves[slot].as_ref().expect("slot exists by lookup");
    if instance.pp == 0 {
        return Err(ActionError::NoUsesRemaining(move_name.to_string()));
    }
    Ok(())
}

fn validate_switch_target(
    record: &BattleRecord,
    player_index: usize,
    team_index: usize,
) -> Result<(), ActionError> {
    let player = &record.players[player_index];
    if team_index >= player.team.len() {
        return Err(ActionError::InvalidTeamSlot(team_index));
    }
    match &player.team[team_index] {
        None => Err(ActionError::InvalidTeamSlot(team_index)),
        Some(target) if target.is_fainted() => Err(ActionError::FaintedSwitchTarget(team_index)),
        Some(_) if team_index == player.active_index => Err(ActionError::AlreadyActive(team_index)),
        Some(_) => Ok(()),
    }
}

/// All intents currently legal for one player. Used by behaviors and by
/// clients building an action menu.
pub fn valid_actions(record: &BattleRecord, player_index: usize) -> Vec<PlayerAction> {
    let player = &record.players[player_index];
    let mut actions = Vec::new();

    if record.awaits_replacement_from(player_index) {
        for (i, slot) in player.team.iter().enumerate() {
            if let Some(combatant) = slot {
                if i != player.active_index && !combatant.is_fainted() {
                    actions.push(PlayerAction::SwitchPokemon { team_index: i });
                }
            }
        }
        return actions;
    }

    if record.phase != TurnPhase::Selecting || player.pending_action.is_some() {
        return actions;
    }

    if let Some(active) = player.active() {
        for instance in active.moves.iter().flatten() {
            if instance.pp > 0 {
                actions.push(PlayerAction::UseMove {
                    move_name: instance.data.name.clone(),
                });
            }
        }
    }
    for (i, slot) in player.team.iter().enumerate() {
        if let Some(combatant) = slot {
            if i != player.active_index && !combatant.is_fainted() {
                actions.push(PlayerAction::SwitchPokemon { team_index: i });
            }
        }
    }
    actions.push(PlayerAction::Forfeit);

    actions
}

/// Resolve one full turn from both pending actions: switches first, then
/// moves in effective-speed order, then end-of-turn status ticks, then the
/// phase/outcome update. Pure transition: the input record is untouched and
/// a new snapshot is returned alongside the events of the turn.
pub fn resolve_turn(record: &BattleRecord, rng: &mut TurnRng) -> ArenaResult<(BattleRecord, EventBus)> {
    if record.outcome.is_terminal() {
        return Err(StateError::InconsistentState("battle already finished".to_string()).into());
    }
    let (Some(action1), Some(action2)) = (
        record.players[0].pending_action.clone(),
        record.players[1].pending_action.clone(),
    ) else {
        return Err(
            StateError::InconsistentState("turn resolution requires both actions".to_string())
                .into(),
        );
    };

    let mut state = record.clone();
    let mut bus = EventBus::new();
    let actions = [action1, action2];

    state.clear_pending_actions();
    bus.push(BattleEvent::TurnStarted {
        turn_number: state.turn_number,
    });

    // Forfeits end the battle before anything else resolves.
    let forfeits = [
        matches!(actions[0], PlayerAction::Forfeit),
        matches!(actions[1], PlayerAction::Forfeit),
    ];
    if forfeits[0] || forfeits[1] {
        for (index, forfeited) in forfeits.iter().enumerate() {
            if *forfeited {
                bus.push(BattleEvent::PlayerForfeited {
                    player_index: index,
                });
            }
        }
        let outcome = match forfeits {
            [true, true] => Outcome::Draw,
            [true, false] => Outcome::Player2Win,
            _ => Outcome::Player1Win,
        };
        finish_battle(&mut state, outcome, &mut bus);
        return Ok((state, bus));
    }

    // Switches are instantaneous and always precede move execution.
    for (index, action) in actions.iter().enumerate() {
        if let PlayerAction::SwitchPokemon { team_index } = action {
            apply_switch(&mut state, index, *team_index, &mut bus);
        }
    }

    // Moves run in effective-speed order of the (possibly newly switched-in)
    // actives. Ties default to player 1: the sort is stable.
    let mut movers: Vec<usize> = (0..2)
        .filter(|&i| matches!(actions[i], PlayerAction::UseMove { .. }))
        .collect();
    movers.sort_by_key(|&i| {
        std::cmp::Reverse(state.players[i].active().map_or(0, effective_speed))
    });

    for actor in movers {
        if state.outcome.is_terminal() {
            break;
        }
        if let PlayerAction::UseMove { move_name } = &actions[actor] {
            execute_move(&mut state, actor, move_name, &mut bus, rng);
        }
    }

    if !state.outcome.is_terminal() {
        end_of_turn_tick(&mut state, &mut bus);
    }
    if !state.outcome.is_terminal() {
        update_phase_after_resolution(&mut state, &mut bus);
    }

    state.turn_number += 1;
    Ok((state, bus))
}

/// Apply a forced replacement while the record sits in a must-switch phase.
/// Transitions straight back to `Selecting` (or to the other side's switch
/// phase) without requiring the opponent's concurrence, and leaves any
/// unrelated pending action of the opponent untouched.
pub fn resolve_forced_switch(
    record: &BattleRecord,
    player_index: usize,
    team_index: usize,
) -> ArenaResult<(BattleRecord, EventBus)> {
    if !record.awaits_replacement_from(player_index) {
        return Err(ActionError::OutOfTurn.into());
    }
    validate_switch_target(record, player_index, team_index)?;

    let mut state = record.clone();
    let mut bus = EventBus::new();
    apply_switch(&mut state, player_index, team_index, &mut bus);

    state.phase = if state.phase == TurnPhase::BothMustSwitch {
        BattleRecord::must_switch_phase(BattleRecord::opponent_of(player_index))
    } else {
        TurnPhase::Selecting
    };

    Ok((state, bus))
}

fn apply_switch(state: &mut BattleRecord, player_index: usize, team_index: usize, bus: &mut EventBus) {
    // Re-checked here so a stale intent can never activate a fainted slot.
    if validate_switch_target_for_resolution(state, player_index, team_index).is_err() {
        return;
    }

    let player = &mut state.players[player_index];
    let old_name = player.active().map(|c| c.name.clone()).unwrap_or_default();
    player.active_index = team_index;
    let new_name = player.active().map(|c| c.name.clone()).unwrap_or_default();

    bus.push(BattleEvent::CombatantSwitched {
        player_index,
        old_name,
        new_name,
    });

    trigger_entry_abilities(state, player_index, bus);
}

// During resolution the outgoing combatant may already be fainted, so only
// the target slot is checked.
fn validate_switch_target_for_resolution(
    state: &BattleRecord,
    player_index: usize,
    team_index: usize,
) -> Result<(), ActionError> {
    let player = &state.players[player_index];
    if team_index >= player.team.len() || team_index == player.active_index {
        return Err(ActionError::InvalidTeamSlot(team_index));
    }
    match &player.team[team_index] {
        Some(target) if !target.is_fainted() => Ok(()),
        Some(_) => Err(ActionError::FaintedSwitchTarget(team_index)),
        None => Err(ActionError::InvalidTeamSlot(team_index)),
    }
}

/// Entry-trigger abilities fire whenever a combatant newly becomes active,
/// whether the switch was forced or voluntary.
fn trigger_entry_abilities(state: &mut BattleRecord, entering_index: usize, bus: &mut EventBus) {
    let Some(entering) = state.players[entering_index].active() else {
        return;
    };
    let entering_name = entering.name.clone();
    let abilities = entering.abilities.clone();

    for ability in abilities {
        let Some((stat, delta)) = ability.entry_stat_drop() else {
            continue;
        };
        bus.push(BattleEvent::EntryAbilityTriggered {
            combatant: entering_name.clone(),
            ability,
        });

        let opponent_index = BattleRecord::opponent_of(entering_index);
        let Some(opponent) = state.players[opponent_index].active_mut() else {
            continue;
        };
        if opponent.is_fainted() {
            continue;
        }
        let old_stage = opponent.stat_stage(stat);
        let new_stage = (old_stage + delta).clamp(-6, 6);
        if new_stage == old_stage {
            bus.push(BattleEvent::StatStageClamped {
                target: opponent.name.clone(),
                stat,
                raised: delta > 0,
            });
        } else {
            opponent.set_stat_stage(stat, new_stage);
            bus.push(BattleEvent::StatStageChanged {
                target: opponent.name.clone(),
                stat,
                old_stage,
                new_stage,
            });
        }
    }
}

fn execute_move(
    state: &mut BattleRecord,
    actor: usize,
    move_name: &str,
    bus: &mut EventBus,
    rng: &mut TurnRng,
) {
    let defender_index = BattleRecord::opponent_of(actor);

    let Some(attacker) = state.players[actor].active() else {
        return;
    };
    // A combatant fainted earlier in the turn loses its action.
    if attacker.is_fainted() {
        return;
    }
    let attacker_name = attacker.name.clone();

    // Pre-move incapacitation checks.
    match attacker.status {
        Some(StatusCondition::Sleep { turns }) if turns > 0 => {
            if let Some(attacker) = state.players[actor].active_mut() {
                attacker.status = Some(StatusCondition::Sleep { turns: turns - 1 });
            }
            bus.push(BattleEvent::ActionSkipped {
                combatant: attacker_name,
                reason: SkipReason::Asleep,
            });
            return;
        }
        Some(StatusCondition::Sleep { turns: 0 }) => {
            if let Some(attacker) = state.players[actor].active_mut() {
                attacker.status = None;
            }
            bus.push(BattleEvent::StatusRemoved {
                target: attacker_name.clone(),
                status: StatusCondition::Sleep { turns: 0 },
            });
        }
        Some(StatusCondition::Paralysis) => {
            if rng.percent("Paralysis Check") <= 25 {
                bus.push(BattleEvent::ActionSkipped {
                    combatant: attacker_name,
                    reason: SkipReason::Paralyzed,
                });
                return;
            }
        }
        _ => {}
    }

    // Spend a use; a depleted or unknown move fizzles without touching the
    // defender (submission validation normally rejects these upstream).
    let attacker = state.players[actor]
        .active_mut()
        .expect("attacker checked above");
    let Some(slot) = attacker.move_slot(move_name) else {
        bus.push(BattleEvent::MoveFailed {
            combatant: attacker_name,
            move_name: move_name.to_string(),
        });
        return;
    };
    if !attacker.moves[slot].as_mut().expect("slot exists").use_move() {
        bus.push(BattleEvent::MoveFailed {
            combatant: attacker_name,
            move_name: move_name.to_string(),
        });
        return;
    }

    bus.push(BattleEvent::MoveUsed {
        player_index: actor,
        combatant: attacker_name.clone(),
        move_name: move_name.to_string(),
    });
    state.players[actor].reveal_move(move_name);

    let attacker_snapshot = state.players[actor].active().expect("attacker exists").clone();
    let Some(defender_snapshot) = state.players[defender_index].active().cloned() else {
        return;
    };
    if defender_snapshot.is_fainted() {
        bus.push(BattleEvent::MoveFailed {
            combatant: attacker_name,
            move_name: move_name.to_string(),
        });
        return;
    }

    let mv = attacker_snapshot.moves[slot].clone().expect("slot exists");
    let outcome = resolve_move(&attacker_snapshot, &defender_snapshot, &mv, rng);
    for event in &outcome.events {
        bus.push(event.clone());
    }

    // Apply the outcome's deltas to the authoritative record.
    for change in &outcome.stat_changes {
        let target_index = match change.target {
            Target::User => actor,
            Target::Opponent => defender_index,
        };
        if let Some(target) = state.players[target_index].active_mut() {
            target.set_stat_stage(change.stat, change.new_stage);
        }
    }
    if outcome.reset_attacker_stages {
        if let Some(attacker) = state.players[actor].active_mut() {
            attacker.clear_stat_stages();
        }
    }

    if outcome.damage > 0 {
        if let Some(defender) = state.players[defender_index].active_mut() {
            let dealt = defender.take_damage(outcome.damage);
            bus.push(BattleEvent::DamageDealt {
                target: defender.name.clone(),
                damage: dealt,
                remaining_hp: defender.current_hp,
            });
            if defender.is_fainted() {
                bus.push(BattleEvent::Fainted {
                    player_index: defender_index,
                    combatant: defender.name.clone(),
                });
            }
        }
    }

    if outcome.defender_heal > 0 {
        if let Some(defender) = state.players[defender_index].active_mut() {
            let healed = defender.heal(outcome.defender_heal);
            if healed > 0 {
                bus.push(BattleEvent::Healed {
                    target: defender.name.clone(),
                    amount: healed,
                    new_hp: defender.current_hp,
                });
            }
        }
    }
    if outcome.attacker_heal > 0 {
        if let Some(attacker) = state.players[actor].active_mut() {
            let healed = attacker.heal(outcome.attacker_heal);
            if healed > 0 {
                bus.push(BattleEvent::Healed {
                    target: attacker.name.clone(),
                    amount: healed,
                    new_hp: attacker.current_hp,
                });
            }
        }
    }

    if let Some(status) = outcome.defender_status {
        if let Some(defender) = state.players[defender_index].active_mut() {
            if !defender.is_fainted() && defender.status.is_none() {
                defender.status = Some(status);
                bus.push(BattleEvent::StatusApplied {
                    target: defender.name.clone(),
                    status,
                });
            }
        }
    }
    if let Some(status) = outcome.attacker_status {
        if let Some(attacker) = state.players[actor].active_mut() {
            if !attacker.is_fainted() {
                attacker.status = Some(status);
                bus.push(BattleEvent::StatusApplied {
                    target: attacker.name.clone(),
                    status,
                });
            }
        }
    }
}

/// Poison and burn drain `floor(max_hp / 8)` from each afflicted active at
/// the end of the turn; fainting is re-checked after the tick.
fn end_of_turn_tick(state: &mut BattleRecord, bus: &mut EventBus) {
    for index in 0..2 {
        let Some(active) = state.players[index].active_mut() else {
            continue;
        };
        if active.is_fainted() {
            continue;
        }
        let Some(status) = active.status else {
            continue;
        };
        if !status.ticks_at_end_of_turn() {
            continue;
        }

        let damage = active.max_hp / 8;
        let dealt = active.take_damage(damage);
        bus.push(BattleEvent::StatusDamage {
            target: active.name.clone(),
            status,
            damage: dealt,
            remaining_hp: active.current_hp,
        });
        if active.is_fainted() {
            bus.push(BattleEvent::Fainted {
                player_index: index,
                combatant: active.name.clone(),
            });
        }
    }
}

/// Full-team elimination takes precedence over forced-switch signaling.
fn update_phase_after_resolution(state: &mut BattleRecord, bus: &mut EventBus) {
    let eliminated = [
        state.players[0].is_eliminated(),
        state.players[1].is_eliminated(),
    ];
    match eliminated {
        [true, true] => {
            bus.push(BattleEvent::PlayerDefeated { player_index: 0 });
            bus.push(BattleEvent::PlayerDefeated { player_index: 1 });
            // Simultaneous wipe-out has no winner.
            finish_battle(state, Outcome::Draw, bus);
        }
        [true, false] => {
            bus.push(BattleEvent::PlayerDefeated { player_index: 0 });
            finish_battle(state, Outcome::Player2Win, bus);
        }
        [false, true] => {
            bus.push(BattleEvent::PlayerDefeated { player_index: 1 });
            finish_battle(state, Outcome::Player1Win, bus);
        }
        [false, false] => {
            let needs_switch = [
                state.players[0].active().map_or(false, |c| c.is_fainted()),
                state.players[1].active().map_or(false, |c| c.is_fainted()),
            ];
            state.phase = match needs_switch {
                [true, true] => TurnPhase::BothMustSwitch,
                [true, false] => TurnPhase::Player1MustSwitch,
                [false, true] => TurnPhase::Player2MustSwitch,
                [false, false] => TurnPhase::Selecting,
            };
        }
    }
}

pub(crate) fn finish_battle(state: &mut BattleRecord, outcome: Outcome, bus: &mut EventBus) {
    state.phase = TurnPhase::Finished;
    state.outcome = outcome;
    state.clear_pending_actions();
    bus.push(BattleEvent::BattleEnded { outcome });
}
