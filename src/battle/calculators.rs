use crate::battle::state::{BattleEvent, TurnRng};
use crate::battle::stats::{effective_attack, effective_defense};
use crate::pokemon::{Combatant, MoveInstance, StatusCondition, BATTLE_LEVEL, SLEEP_TURNS};
use schema::{MoveCategory, StatType, Target};

/// The one status move with bespoke behavior: full self-heal, self-sleep,
/// and a stat-stage wipe, bypassing the generic status-move logic.
pub const REST_MOVE: &str = "rest";

/// A stat-stage write produced by a move, already clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedStatChange {
    pub target: Target,
    pub stat: StatType,
    pub new_stage: i8,
}

/// Everything one move execution wants to change, plus the messages it
/// produced. The caller owns applying these deltas to the record; this
/// keeps the computation itself free of mutation.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub damage: u16,
    pub effectiveness: f64,
    pub critical: bool,
    pub stat_changes: Vec<AppliedStatChange>,
    pub attacker_status: Option<StatusCondition>,
    pub defender_status: Option<StatusCondition>,
    pub attacker_heal: u16,
    pub defender_heal: u16,
    pub reset_attacker_stages: bool,
    pub events: Vec<BattleEvent>,
}

impl MoveOutcome {
    fn new() -> Self {
        MoveOutcome {
            damage: 0,
            effectiveness: 1.0,
            critical: false,
            stat_changes: Vec::new(),
            attacker_status: None,
            defender_status: None,
            attacker_heal: 0,
            defender_heal: 0,
            reset_attacker_stages: false,
            events: Vec::new(),
        }
    }
}

/// Pure computation of one move's results: damage, effectiveness messages,
/// applied status, and stat-stage changes. Neither combatant is mutated.
pub fn resolve_move(
    attacker: &Combatant,
    defender: &Combatant,
    mv: &MoveInstance,
    rng: &mut TurnRng,
) -> MoveOutcome {
    let mut outcome = MoveOutcome::new();
    let data = &mv.data;

    if data.category == MoveCategory::Status {
        if data.name == REST_MOVE {
            outcome.attacker_heal = attacker.max_hp - attacker.current_hp;
            outcome.attacker_status = Some(StatusCondition::Sleep { turns: SLEEP_TURNS });
            outcome.reset_attacker_stages = true;
            if !attacker.stat_stages.is_empty() {
                outcome.events.push(BattleEvent::StatStagesReset {
                    target: attacker.name.clone(),
                });
            }
            return outcome;
        }

        for change in &data.stat_changes {
            let holder = match change.target {
                Target::User => attacker,
                Target::Opponent => defender,
            };
            let old_stage = holder.stat_stage(change.stat);
            let new_stage = (old_stage + change.delta).clamp(-6, 6);
            if new_stage == old_stage {
                outcome.events.push(BattleEvent::StatStageClamped {
                    target: holder.name.clone(),
                    stat: change.stat,
                    raised: change.delta > 0,
                });
            } else {
                outcome.events.push(BattleEvent::StatStageChanged {
                    target: holder.name.clone(),
                    stat: change.stat,
                    old_stage,
                    new_stage,
                });
                outcome.stat_changes.push(AppliedStatChange {
                    target: change.target,
                    stat: change.stat,
                    new_stage,
                });
            }
        }

        if data.healing_percent > 0 {
            outcome.attacker_heal =
                (attacker.max_hp as u32 * data.healing_percent as u32 / 100) as u16;
        }

        roll_ailment(&mut outcome, data, defender, rng);
        return outcome;
    }

    // Damaging move. Ability interactions run before the type chart and
    // short-circuit it entirely.
    for ability in &defender.abilities {
        if ability.immunity_to() == Some(data.move_type) {
            outcome.effectiveness = 0.0;
            outcome.events.push(BattleEvent::AbilityNullifiedAttack {
                target: defender.name.clone(),
                ability: *ability,
            });
            return outcome;
        }
        if ability.absorbs() == Some(data.move_type) {
            outcome.effectiveness = 0.0;
            outcome.defender_heal = defender.max_hp / 4;
            outcome.events.push(BattleEvent::AbilityAbsorbedAttack {
                target: defender.name.clone(),
                ability: *ability,
            });
            return outcome;
        }
    }

    let power = data.power.unwrap_or(0) as f64;
    let attack = effective_attack(attacker, data.category) as f64;
    let defense = effective_defense(defender, data.category).max(1) as f64;
    let level = BATTLE_LEVEL as f64;

    // Rounding order: the base is floored to an integer first; crit, STAB,
    // and type effectiveness then apply as float multipliers; one final
    // floor at the very end.
    let base = (((2.0 * level / 5.0 + 2.0) * power * (attack / defense)) / 50.0 + 2.0).floor();

    let mut multiplier = 1.0;
    if rng.d16("Critical Hit Check") == 1 {
        outcome.critical = true;
        multiplier *= 1.5;
        outcome.events.push(BattleEvent::CriticalHit);
    }
    if attacker.types.contains(&data.move_type) {
        multiplier *= 1.5; // STAB
    }

    let effectiveness = mv.relations.multiplier_against_all(&defender.types);
    outcome.effectiveness = effectiveness;
    if effectiveness != 1.0 {
        outcome.events.push(BattleEvent::AttackTypeEffectiveness {
            multiplier: effectiveness,
        });
    }
    if effectiveness == 0.0 {
        return outcome;
    }

    outcome.damage = ((base * multiplier * effectiveness).floor() as u16).max(1);

    roll_ailment(&mut outcome, data, defender, rng);

    // Contact abilities fire only after a damaging physical hit, and only
    // against a status-free attacker.
    if data.category == MoveCategory::Physical && attacker.status.is_none() {
        for ability in &defender.abilities {
            if let Some((status, chance)) = ability.contact_status() {
                if rng.percent("Contact Ability Check") <= chance {
                    let condition = StatusCondition::from_type(status);
                    outcome.attacker_status = Some(condition);
                    outcome.events.push(BattleEvent::AbilityStatusedAttacker {
                        attacker: attacker.name.clone(),
                        ability: *ability,
                        status: condition,
                    });
                }
                break;
            }
        }
    }

    outcome
}

fn roll_ailment(
    outcome: &mut MoveOutcome,
    data: &schema::MoveData,
    defender: &Combatant,
    rng: &mut TurnRng,
) {
    if let Some(ailment) = &data.ailment {
        if defender.status.is_none() && rng.percent("Ailment Check") <= ailment.chance {
            outcome.defender_status = Some(StatusCondition::from_type(ailment.status));
        }
    }
}
