use crate::player::BattlePlayer;
use crate::pokemon::StatusCondition;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{Ability, StatType};
use serde::{Deserialize, Serialize};

/// Phase of the shared battle record. `Selecting -> Processing` fires only
/// once both pending actions are present; a forced-switch phase returns to
/// `Selecting` as soon as the affected player supplies a replacement;
/// `Finished` is irreversible.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Copy)]
pub enum TurnPhase {
    Selecting,
    Processing,
    Player1MustSwitch, // Player 1 needs to send out a new combatant after a faint
    Player2MustSwitch, // Player 2 needs to send out a new combatant after a faint
    BothMustSwitch,    // Both actives fainted in the same resolution step
    Finished,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Copy)]
pub enum Outcome {
    Ongoing,
    Player1Win,
    Player2Win,
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    pub fn winner(&self) -> Option<usize> {
        match self {
            Outcome::Player1Win => Some(0),
            Outcome::Player2Win => Some(1),
            _ => None,
        }
    }

    /// The side that wins when `loser` is eliminated or concedes.
    pub fn win_for_opponent_of(loser: usize) -> Outcome {
        if loser == 0 {
            Outcome::Player2Win
        } else {
            Outcome::Player1Win
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Asleep,
    Paralyzed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Turn management
    TurnStarted {
        turn_number: u32,
    },

    // Switching
    CombatantSwitched {
        player_index: usize,
        old_name: String,
        new_name: String,
    },

    // Move execution
    MoveUsed {
        player_index: usize,
        combatant: String,
        move_name: String,
    },
    MoveFailed {
        combatant: String,
        move_name: String,
    },
    ActionSkipped {
        combatant: String,
        reason: SkipReason,
    },
    CriticalHit,
    AttackTypeEffectiveness {
        multiplier: f64,
    },

    // Damage and healing
    DamageDealt {
        target: String,
        damage: u16,
        remaining_hp: u16,
    },
    Healed {
        target: String,
        amount: u16,
        new_hp: u16,
    },
    Fainted {
        player_index: usize,
        combatant: String,
    },

    // Status conditions
    StatusApplied {
        target: String,
        status: StatusCondition,
    },
    StatusRemoved {
        target: String,
        status: StatusCondition,
    },
    StatusDamage {
        target: String,
        status: StatusCondition,
        damage: u16,
        remaining_hp: u16,
    },

    // Stat stages
    StatStageChanged {
        target: String,
        stat: StatType,
        old_stage: i8,
        new_stage: i8,
    },
    StatStageClamped {
        target: String,
        stat: StatType,
        raised: bool,
    },
    StatStagesReset {
        target: String,
    },

    // Abilities
    AbilityNullifiedAttack {
        target: String,
        ability: Ability,
    },
    AbilityAbsorbedAttack {
        target: String,
        ability: Ability,
    },
    AbilityStatusedAttacker {
        attacker: String,
        ability: Ability,
        status: StatusCondition,
    },
    EntryAbilityTriggered {
        combatant: String,
        ability: Ability,
    },

    // Battle end
    PlayerForfeited {
        player_index: usize,
    },
    TurnTimedOut {
        // The side that failed to act in time; None when neither submitted.
        timed_out_player: Option<usize>,
    },
    PlayerDefeated {
        player_index: usize,
    },
    BattleEnded {
        outcome: Outcome,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, record: &BattleRecord) -> Option<String> {
        match self {
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }

            BattleEvent::CombatantSwitched {
                player_index,
                old_name,
                new_name,
            } => {
                let player_name = &record.players[*player_index].player_name;
                Some(format!(
                    "{} recalled {} and sent out {}!",
                    player_name,
                    display_name(old_name),
                    display_name(new_name)
                ))
            }

            BattleEvent::MoveUsed {
                player_index,
                combatant,
                move_name,
            } => {
                let player_name = &record.players[*player_index].player_name;
                Some(format!(
                    "{}'s {} used {}!",
                    player_name,
                    display_name(combatant),
                    display_name(move_name)
                ))
            }
            BattleEvent::MoveFailed { combatant, .. } => {
                Some(format!("{}'s move failed!", display_name(combatant)))
            }
            BattleEvent::ActionSkipped { combatant, reason } => match reason {
                SkipReason::Asleep => Some(format!("{} is fast asleep.", display_name(combatant))),
                SkipReason::Paralyzed => Some(format!(
                    "{} is paralyzed! It can't move!",
                    display_name(combatant)
                )),
            },
            BattleEvent::CriticalHit => Some("A critical hit!".to_string()),
            BattleEvent::AttackTypeEffectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m > 0.0 && m < 1.0 => Some("It's not very effective...".to_string()),
                m if m == 0.0 => Some("It had no effect!".to_string()),
                _ => None, // Normal effectiveness, no message
            },

            BattleEvent::DamageDealt { target, damage, .. } => {
                Some(format!("{} took {} damage!", display_name(target), damage))
            }
            BattleEvent::Healed { target, amount, .. } => Some(format!(
                "{} recovered {} HP!",
                display_name(target),
                amount
            )),
            BattleEvent::Fainted { combatant, .. } => {
                Some(format!("{} fainted!", display_name(combatant)))
            }

            BattleEvent::StatusApplied { target, status } => Some(format!(
                "{} {}",
                display_name(target),
                status_applied_text(status)
            )),
            BattleEvent::StatusRemoved { target, status } => match status {
                StatusCondition::Sleep { .. } => {
                    Some(format!("{} woke up!", display_name(target)))
                }
                _ => Some(format!(
                    "{} was cured of its {}!",
                    display_name(target),
                    status.status_type()
                )),
            },
            BattleEvent::StatusDamage {
                target,
                status,
                damage,
                ..
            } => Some(format!(
                "{} is hurt by its {}! ({} damage)",
                display_name(target),
                status.status_type(),
                damage
            )),

            BattleEvent::StatStageChanged {
                target,
                stat,
                old_stage,
                new_stage,
            } => {
                if new_stage > old_stage {
                    Some(format!("{}'s {} rose!", display_name(target), stat))
                } else {
                    Some(format!("{}'s {} fell!", display_name(target), stat))
                }
            }
            BattleEvent::StatStageClamped {
                target,
                stat,
                raised,
            } => {
                if *raised {
                    Some(format!(
                        "{}'s {} won't go any higher!",
                        display_name(target),
                        stat
                    ))
                } else {
                    Some(format!(
                        "{}'s {} won't go any lower!",
                        display_name(target),
                        stat
                    ))
                }
            }
            BattleEvent::StatStagesReset { target } => Some(format!(
                "{}'s stat changes were eliminated!",
                display_name(target)
            )),

            BattleEvent::AbilityNullifiedAttack { target, ability } => Some(format!(
                "{}'s {} made the attack ineffective!",
                display_name(target),
                ability
            )),
            BattleEvent::AbilityAbsorbedAttack { target, ability } => Some(format!(
                "{}'s {} absorbed the attack!",
                display_name(target),
                ability
            )),
            BattleEvent::AbilityStatusedAttacker {
                attacker,
                ability,
                status,
            } => Some(format!(
                "{} {} (from {})",
                display_name(attacker),
                status_applied_text(status),
                ability
            )),
            BattleEvent::EntryAbilityTriggered { combatant, ability } => Some(format!(
                "{}'s {} takes effect!",
                display_name(combatant),
                ability
            )),

            BattleEvent::PlayerForfeited { player_index } => {
                let player_name = &record.players[*player_index].player_name;
                Some(format!("{} forfeited the battle!", player_name))
            }
            BattleEvent::TurnTimedOut { timed_out_player } => match timed_out_player {
                Some(index) => {
                    let player_name = &record.players[*index].player_name;
                    Some(format!("{} ran out of time!", player_name))
                }
                None => Some("Neither player chose an action in time!".to_string()),
            },
            BattleEvent::PlayerDefeated { player_index } => {
                let player_name = &record.players[*player_index].player_name;
                Some(format!("{} is out of usable Pokemon!", player_name))
            }
            BattleEvent::BattleEnded { outcome } => match outcome.winner() {
                Some(index) => Some(format!(
                    "{} has won the battle!",
                    record.players[index].player_name
                )),
                None => Some("The battle ended in a draw!".to_string()),
            },
        }
    }
}

fn display_name(raw: &str) -> String {
    // Catalog names are lowercase and hyphenated ("quick-attack"); present
    // them capitalized with spaces.
    raw.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn status_applied_text(status: &StatusCondition) -> &'static str {
    match status {
        StatusCondition::Sleep { .. } => "fell asleep!",
        StatusCondition::Poison => "was poisoned!",
        StatusCondition::Burn => "was burned!",
        StatusCondition::Paralysis => "is paralyzed! It may be unable to move!",
    }
}

/// Ordered collection of the events one resolution produced.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// The human-readable log lines for these events, silent events omitted.
    pub fn formatted_lines(&self, record: &BattleRecord) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| event.format(record))
            .collect()
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Random oracle injected through the engine's call signature so outcomes
/// are reproducible: a seeded generator in production, a scripted value
/// list in tests.
#[derive(Debug, Clone)]
pub enum TurnRng {
    Scripted { outcomes: Vec<u8>, index: usize },
    Seeded { rng: StdRng },
}

impl TurnRng {
    pub fn scripted(outcomes: Vec<u8>) -> Self {
        TurnRng::Scripted { outcomes, index: 0 }
    }

    pub fn seeded(seed: u64) -> Self {
        TurnRng::Seeded {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A roll in 1..=100, used for percent-chance checks.
    pub fn percent(&mut self, reason: &str) -> u8 {
        self.next_value(1, 100, reason)
    }

    /// A roll in 1..=16; a critical hit lands on 1.
    pub fn d16(&mut self, reason: &str) -> u8 {
        self.next_value(1, 16, reason)
    }

    /// An index in 0..len, for uniform choices.
    pub fn pick(&mut self, len: usize, reason: &str) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_value(1, 100, reason) as usize - 1) % len
    }

    fn next_value(&mut self, low: u8, high: u8, reason: &str) -> u8 {
        match self {
            TurnRng::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more scripted values.",
                        reason
                    );
                }
                let outcome = outcomes[*index];
                *index += 1;
                outcome.clamp(low, high)
            }
            TurnRng::Seeded { rng } => rng.random_range(low..=high),
        }
    }
}

/// The authoritative battle record. In the networked mode this is the single
/// shared document both clients read and transact against; every field here
/// is serialized into the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleRecord {
    pub battle_id: String,
    pub players: [BattlePlayer; 2],
    pub turn_number: u32,
    pub phase: TurnPhase,
    pub outcome: Outcome,

    // Append-only, human-readable battle log.
    pub log: Vec<String>,

    // Marker of the turn currently being (or last) resolved. Stamped by the
    // client that flips the phase to Processing; used to detect and drop
    // duplicate resolution attempts.
    pub last_resolved: Option<u64>,

    // Clock stamp (milliseconds) of the last entry into Selecting, for the
    // turn-timeout rule.
    pub selecting_since: u64,
}

impl BattleRecord {
    pub fn new(battle_id: String, player1: BattlePlayer, player2: BattlePlayer, now: u64) -> Self {
        Self {
            battle_id,
            players: [player1, player2],
            turn_number: 1,
            phase: TurnPhase::Selecting,
            outcome: Outcome::Ongoing,
            log: Vec::new(),
            last_resolved: None,
            selecting_since: now,
        }
    }

    pub fn opponent_of(player_index: usize) -> usize {
        1 - player_index
    }

    pub fn both_pending(&self) -> bool {
        self.players.iter().all(|p| p.pending_action.is_some())
    }

    pub fn clear_pending_actions(&mut self) {
        for player in self.players.iter_mut() {
            player.pending_action = None;
        }
    }

    /// The forced-switch phase for one side.
    pub fn must_switch_phase(player_index: usize) -> TurnPhase {
        if player_index == 0 {
            TurnPhase::Player1MustSwitch
        } else {
            TurnPhase::Player2MustSwitch
        }
    }

    /// Whether the phase requires `player_index` to supply a replacement.
    pub fn awaits_replacement_from(&self, player_index: usize) -> bool {
        match self.phase {
            TurnPhase::Player1MustSwitch => player_index == 0,
            TurnPhase::Player2MustSwitch => player_index == 1,
            TurnPhase::BothMustSwitch => true,
            _ => false,
        }
    }
}
