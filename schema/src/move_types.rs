use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

impl fmt::Display for MoveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveCategory::Physical => write!(f, "Physical"),
            MoveCategory::Special => write!(f, "Special"),
            MoveCategory::Status => write!(f, "Status"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatType::Attack => write!(f, "Attack"),
            StatType::Defense => write!(f, "Defense"),
            StatType::SpecialAttack => write!(f, "Special Attack"),
            StatType::SpecialDefense => write!(f, "Special Defense"),
            StatType::Speed => write!(f, "Speed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusType {
    Sleep,
    Poison,
    Burn,
    Paralysis,
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusType::Sleep => write!(f, "sleep"),
            StatusType::Poison => write!(f, "poison"),
            StatusType::Burn => write!(f, "burn"),
            StatusType::Paralysis => write!(f, "paralysis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    User,
    Opponent,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::User => write!(f, "User"),
            Target::Opponent => write!(f, "Opponent"),
        }
    }
}

/// A stat-stage directive carried by a move. The target is an explicit field;
/// the upstream catalog encodes the target in the sign of the magnitude
/// (positive raises the user, negative lowers the opponent), and that rule is
/// applied once, at ingestion, by [`StatChange::from_signed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub stat: StatType,
    pub delta: i8,
    pub target: Target,
}

impl StatChange {
    /// Ingestion rule for sign-encoded catalog data: positive magnitude
    /// targets the user, negative targets the opponent.
    pub fn from_signed(stat: StatType, delta: i8) -> Self {
        let target = if delta >= 0 {
            Target::User
        } else {
            Target::Opponent
        };
        StatChange {
            stat,
            delta,
            target,
        }
    }
}

/// Secondary ailment descriptor: the status a move may inflict and the
/// percent chance that it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ailment {
    pub status: StatusType,
    pub chance: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_encoded_directives_become_explicit_targets() {
        let raise = StatChange::from_signed(StatType::Attack, 2);
        assert_eq!(raise.target, Target::User);
        assert_eq!(raise.delta, 2);

        let lower = StatChange::from_signed(StatType::Defense, -1);
        assert_eq!(lower.target, Target::Opponent);
        assert_eq!(lower.delta, -1);
    }
}
