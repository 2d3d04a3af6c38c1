use crate::battle::engine::valid_actions;
use crate::battle::state::{BattleRecord, TurnRng};
use crate::player::PlayerAction;

/// Decision seam for a locally driven opponent (practice battles, tests).
pub trait Behavior {
    /// Choose an intent for `player_index`, or None when the phase asks
    /// nothing of this player.
    fn choose_action(
        &self,
        record: &BattleRecord,
        player_index: usize,
        rng: &mut TurnRng,
    ) -> Option<PlayerAction>;
}

/// The practice opponent: a uniformly random usable move, the first healthy
/// reserve when a replacement is required or no move has uses left.
pub struct RandomBehavior;

impl Behavior for RandomBehavior {
    fn choose_action(
        &self,
        record: &BattleRecord,
        player_index: usize,
        rng: &mut TurnRng,
    ) -> Option<PlayerAction> {
        if record.awaits_replacement_from(player_index) {
            return record.players[player_index]
                .first_reserve()
                .map(|team_index| PlayerAction::SwitchPokemon { team_index });
        }

        let moves: Vec<PlayerAction> = valid_actions(record, player_index)
            .into_iter()
            .filter(|action| matches!(action, PlayerAction::UseMove { .. }))
            .collect();
        if !moves.is_empty() {
            let choice = rng.pick(moves.len(), "Practice Move Choice");
            return Some(moves[choice].clone());
        }

        record.players[player_index]
            .first_reserve()
            .map(|team_index| PlayerAction::SwitchPokemon { team_index })
            .or(Some(PlayerAction::Forfeit))
    }
}
