use crate::pokemon::Combatant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A player intent for one turn: use a named move, switch to a team slot,
/// or concede the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    UseMove { move_name: String },

    // The index refers to the combatant's position (0-5) in the player's team.
    SwitchPokemon { team_index: usize },

    Forfeit,
}

/// One side of the battle record: identity, the ordered team of up to six
/// combatants, the active slot, this turn's pending intent, and the set of
/// this player's moves the opponent has publicly seen (consumed by the
/// opposing client's UI for information hiding; not gameplay-relevant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattlePlayer {
    pub player_id: String,
    pub player_name: String,

    pub team: [Option<Combatant>; 6],

    // The index (0-5) of the currently battling team member.
    pub active_index: usize,

    pub pending_action: Option<PlayerAction>,

    pub revealed_moves: BTreeSet<String>,
}

impl BattlePlayer {
    pub fn new(player_id: String, player_name: String, team: Vec<Combatant>) -> Self {
        let mut team_array = [const { None }; 6];
        for (i, combatant) in team.into_iter().take(6).enumerate() {
            team_array[i] = Some(combatant);
        }

        BattlePlayer {
            player_id,
            player_name,
            team: team_array,
            active_index: 0,
            pending_action: None,
            revealed_moves: BTreeSet::new(),
        }
    }

    pub fn active(&self) -> Option<&Combatant> {
        self.team
            .get(self.active_index)
            .and_then(|slot| slot.as_ref())
    }

    pub fn active_mut(&mut self) -> Option<&mut Combatant> {
        self.team
            .get_mut(self.active_index)
            .and_then(|slot| slot.as_mut())
    }

    /// A side is eliminated when every team member has fainted.
    pub fn is_eliminated(&self) -> bool {
        self.team.iter().flatten().all(|c| c.is_fainted())
    }

    /// True if a non-fainted, non-active team member exists to switch into.
    pub fn has_reserve(&self) -> bool {
        self.team.iter().enumerate().any(|(i, slot)| {
            i != self.active_index && slot.as_ref().map_or(false, |c| !c.is_fainted())
        })
    }

    /// First usable replacement slot, if any.
    pub fn first_reserve(&self) -> Option<usize> {
        self.team.iter().enumerate().find_map(|(i, slot)| {
            match slot {
                Some(c) if i != self.active_index && !c.is_fainted() => Some(i),
                _ => None,
            }
        })
    }

    pub fn reveal_move(&mut self, move_name: &str) {
        self.revealed_moves.insert(move_name.to_string());
    }

    /// Restore the whole team to its initial battle-ready state.
    pub fn reset_for_rematch(&mut self) {
        for slot in self.team.iter_mut().flatten() {
            slot.reset_for_rematch();
        }
        self.active_index = 0;
        self.pending_action = None;
        self.revealed_moves.clear();
    }
}
