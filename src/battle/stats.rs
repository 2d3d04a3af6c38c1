use crate::pokemon::Combatant;
use schema::{MoveCategory, StatType};

/// Stat stage multipliers: `(2 + stage) / 2` for non-negative stages,
/// `2 / (2 - stage)` for negative stages. Stages range from -6 to +6.
pub fn stage_multiplier(stage: i8) -> f64 {
    let clamped = stage.clamp(-6, 6) as f64;
    if clamped >= 0.0 {
        (2.0 + clamped) / 2.0
    } else {
        2.0 / (2.0 - clamped)
    }
}

/// A base stat scaled by its stage multiplier.
pub fn effective_stat(base: u8, stage: i8) -> u16 {
    ((base as f64) * stage_multiplier(stage)).round() as u16
}

/// The attacking stat a move draws on: Attack for physical moves,
/// Special Attack for special moves. Status moves use no attack stat.
pub fn effective_attack(combatant: &Combatant, category: MoveCategory) -> u16 {
    let stat = match category {
        MoveCategory::Physical => StatType::Attack,
        MoveCategory::Special => StatType::SpecialAttack,
        MoveCategory::Status => return 0,
    };
    effective_stat(combatant.base_stats.get(stat), combatant.stat_stage(stat))
}

/// The defending stat opposite a move: Defense against physical moves,
/// Special Defense against special moves.
pub fn effective_defense(combatant: &Combatant, category: MoveCategory) -> u16 {
    let stat = match category {
        MoveCategory::Physical => StatType::Defense,
        MoveCategory::Special => StatType::SpecialDefense,
        MoveCategory::Status => return 0,
    };
    effective_stat(combatant.base_stats.get(stat), combatant.stat_stage(stat))
}

/// Effective speed for turn ordering: base speed scaled by its stage.
pub fn effective_speed(combatant: &Combatant) -> u16 {
    effective_stat(
        combatant.base_stats.speed,
        combatant.stat_stage(StatType::Speed),
    )
}
