use crate::{Ailment, MoveCategory, PokemonType, StatChange, StatType, StatusType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

impl BaseStats {
    pub fn get(&self, stat: StatType) -> u8 {
        match stat {
            StatType::Attack => self.attack,
            StatType::Defense => self.defense,
            StatType::SpecialAttack => self.sp_attack,
            StatType::SpecialDefense => self.sp_defense,
            StatType::Speed => self.speed,
        }
    }
}

/// The battle-relevant abilities. Anything else in the catalog maps to a
/// named ability with no in-battle effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    Levitate,
    VoltAbsorb,
    WaterAbsorb,
    Static,
    PoisonPoint,
    Intimidate,
    Inert,
}

impl Ability {
    /// Element this ability grants full immunity to, nullifying the hit
    /// before the type chart is consulted.
    pub fn immunity_to(&self) -> Option<PokemonType> {
        match self {
            Ability::Levitate => Some(PokemonType::Ground),
            _ => None,
        }
    }

    /// Element this ability absorbs, converting the hit into self-healing.
    pub fn absorbs(&self) -> Option<PokemonType> {
        match self {
            Ability::VoltAbsorb => Some(PokemonType::Electric),
            Ability::WaterAbsorb => Some(PokemonType::Water),
            _ => None,
        }
    }

    /// Status this ability may inflict on a contact attacker, with its
    /// percent chance.
    pub fn contact_status(&self) -> Option<(StatusType, u8)> {
        match self {
            Ability::Static => Some((StatusType::Paralysis, 30)),
            Ability::PoisonPoint => Some((StatusType::Poison, 30)),
            _ => None,
        }
    }

    /// Stat-stage drop applied to the opposing active combatant when the
    /// holder enters the field.
    pub fn entry_stat_drop(&self) -> Option<(StatType, i8)> {
        match self {
            Ability::Intimidate => Some((StatType::Attack, -1)),
            _ => None,
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ability::Levitate => write!(f, "Levitate"),
            Ability::VoltAbsorb => write!(f, "Volt Absorb"),
            Ability::WaterAbsorb => write!(f, "Water Absorb"),
            Ability::Static => write!(f, "Static"),
            Ability::PoisonPoint => write!(f, "Poison Point"),
            Ability::Intimidate => write!(f, "Intimidate"),
            Ability::Inert => write!(f, "Inert"),
        }
    }
}

/// Immutable move metadata from the data provider. `power` is None for
/// status moves; `healing_percent` heals the user by that share of its
/// max health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub category: MoveCategory,
    pub power: Option<u16>,
    pub move_type: PokemonType,
    pub max_uses: u8,
    pub stat_changes: Vec<StatChange>,
    pub ailment: Option<Ailment>,
    pub healing_percent: u8,
}

impl MoveData {
    /// A move is usable in battle if it can deal damage or is a status move.
    pub fn is_usable(&self) -> bool {
        matches!(self.category, MoveCategory::Status) || self.power.map_or(false, |p| p > 0)
    }
}

/// Immutable species stat block from the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub pokedex_number: u16,
    pub name: String,
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
    pub abilities: Vec<Ability>,
    pub moves: Vec<String>,
}
