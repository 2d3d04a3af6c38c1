use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum PokemonType {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Damage relations of one attacking type, as supplied by the data provider.
/// Each list names defending types the attacking type deals double, half,
/// or zero damage to; types in none of the lists take normal damage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeRelations {
    pub double_damage_to: Vec<PokemonType>,
    pub half_damage_to: Vec<PokemonType>,
    pub no_damage_to: Vec<PokemonType>,
}

impl TypeRelations {
    /// Effectiveness multiplier against a single defending type.
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn multiplier_against(&self, defending: PokemonType) -> f64 {
        if self.no_damage_to.contains(&defending) {
            0.0
        } else if self.double_damage_to.contains(&defending) {
            2.0
        } else if self.half_damage_to.contains(&defending) {
            0.5
        } else {
            1.0
        }
    }

    /// Net effectiveness against a defender's full type list, multiplicative
    /// across both defending types.
    pub fn multiplier_against_all(&self, defending: &[PokemonType]) -> f64 {
        defending
            .iter()
            .map(|t| self.multiplier_against(*t))
            .product()
    }
}
