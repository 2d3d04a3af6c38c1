use crate::errors::{DataError, DataResult};
use crate::pokedex::Pokedex;
use schema::{Ability, BaseStats, MoveData, PokemonType, StatType, StatusType, TypeRelations};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All battles run at a fixed level.
pub const BATTLE_LEVEL: u16 = 50;

/// Number of sleep turns a freshly applied sleep lasts (also used by Rest).
pub const SLEEP_TURNS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCondition {
    /// `turns` counts the remaining incapacitated turns; the combatant
    /// wakes when it reaches zero.
    Sleep { turns: u8 },
    Poison,
    Burn,
    Paralysis,
}

impl StatusCondition {
    pub fn from_type(status: StatusType) -> Self {
        match status {
            StatusType::Sleep => StatusCondition::Sleep { turns: SLEEP_TURNS },
            StatusType::Poison => StatusCondition::Poison,
            StatusType::Burn => StatusCondition::Burn,
            StatusType::Paralysis => StatusCondition::Paralysis,
        }
    }

    pub fn status_type(&self) -> StatusType {
        match self {
            StatusCondition::Sleep { .. } => StatusType::Sleep,
            StatusCondition::Poison => StatusType::Poison,
            StatusCondition::Burn => StatusType::Burn,
            StatusCondition::Paralysis => StatusType::Paralysis,
        }
    }

    /// Poison and burn damage the holder at end of turn.
    pub fn ticks_at_end_of_turn(&self) -> bool {
        matches!(self, StatusCondition::Poison | StatusCondition::Burn)
    }
}

/// One of a combatant's four moves: the immutable move metadata, the
/// precomputed damage relations of its elemental type, and depletable uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInstance {
    pub data: MoveData,
    pub relations: TypeRelations,
    pub pp: u8,
}

impl MoveInstance {
    pub fn new(data: MoveData, relations: TypeRelations) -> Self {
        let pp = data.max_uses;
        MoveInstance {
            data,
            relations,
            pp,
        }
    }

    pub fn max_pp(&self) -> u8 {
        self.data.max_uses
    }

    /// Spend one use. Returns false (without going negative) if none remain.
    pub fn use_move(&mut self) -> bool {
        if self.pp > 0 {
            self.pp -= 1;
            true
        } else {
            false
        }
    }

    pub fn restore_pp(&mut self) {
        self.pp = self.max_pp();
    }
}

/// The mutable runtime representation of one team member, derived once from
/// provider data and owned by its team for the lifetime of the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: u16,
    pub name: String,
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
    pub abilities: Vec<Ability>,
    pub moves: [Option<MoveInstance>; 4],
    pub current_hp: u16,
    pub max_hp: u16,
    pub stat_stages: HashMap<StatType, i8>,
    pub status: Option<StatusCondition>,
}

impl Combatant {
    /// Build a battle-ready combatant from a species stat block and a move
    /// pool. Moves are filtered to usable ones (positive power or Status
    /// category) and the first four are fixed for the battle.
    pub fn new(species: &schema::SpeciesData, movepool: Vec<(MoveData, TypeRelations)>) -> Self {
        let max_hp = max_hp_at_battle_level(species.base_stats.hp);

        let mut move_array = [const { None }; 4];
        let usable = movepool
            .into_iter()
            .filter(|(data, _)| data.is_usable())
            .take(4);
        for (i, (data, relations)) in usable.enumerate() {
            move_array[i] = Some(MoveInstance::new(data, relations));
        }

        Combatant {
            id: species.pokedex_number,
            name: species.name.clone(),
            types: species.types.clone(),
            base_stats: species.base_stats.clone(),
            abilities: species.abilities.clone(),
            moves: move_array,
            current_hp: max_hp,
            max_hp,
            stat_stages: HashMap::new(),
            status: None,
        }
    }

    /// Assemble a combatant straight from the provider, fetching the species
    /// record, its move pool, and each move's type relations.
    pub fn from_dex<D: Pokedex>(dex: &D, species_id: u16) -> DataResult<Self> {
        let species = dex.species(species_id)?;
        let mut movepool = Vec::new();
        for name in &species.moves {
            let data = dex.move_data(name)?;
            let relations = dex.type_relations(data.move_type)?;
            movepool.push((data, relations));
        }
        if movepool.iter().filter(|(d, _)| d.is_usable()).count() == 0 {
            return Err(DataError::MalformedData(format!(
                "species {} has no usable moves",
                species.name
            )));
        }
        Ok(Combatant::new(&species, movepool))
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Apply damage, clamped at zero. Returns the amount actually dealt.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Restore health, capped at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let healed = amount.min(self.max_hp - self.current_hp);
        self.current_hp += healed;
        healed
    }

    pub fn stat_stage(&self, stat: StatType) -> i8 {
        self.stat_stages.get(&stat).copied().unwrap_or(0)
    }

    /// Set a stage, clamped to [-6, +6]. Zero entries are dropped.
    pub fn set_stat_stage(&mut self, stat: StatType, stage: i8) {
        let clamped = stage.clamp(-6, 6);
        if clamped == 0 {
            self.stat_stages.remove(&stat);
        } else {
            self.stat_stages.insert(stat, clamped);
        }
    }

    pub fn clear_stat_stages(&mut self) {
        self.stat_stages.clear();
    }

    /// Slot index of a known move by name.
    pub fn move_slot(&self, name: &str) -> Option<usize> {
        self.moves
            .iter()
            .position(|slot| slot.as_ref().map_or(false, |m| m.data.name == name))
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves
            .iter()
            .flatten()
            .any(|m| m.pp > 0)
    }

    /// Restore health, stages, status, and uses to their initial values,
    /// preserving species and move identity.
    pub fn reset_for_rematch(&mut self) {
        self.current_hp = self.max_hp;
        self.stat_stages.clear();
        self.status = None;
        for slot in self.moves.iter_mut().flatten() {
            slot.restore_pp();
        }
    }
}

/// `floor((2 * base_hp * L) / 100 + L + 10)` at the fixed battle level.
pub fn max_hp_at_battle_level(base_hp: u8) -> u16 {
    (2 * base_hp as u16 * BATTLE_LEVEL) / 100 + BATTLE_LEVEL + 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokedex::FixtureDex;

    #[test]
    fn max_hp_formula_at_level_50() {
        // floor((2 * 35 * 50) / 100 + 50 + 10) = 95 for base 35 HP
        assert_eq!(max_hp_at_battle_level(35), 95);
        assert_eq!(max_hp_at_battle_level(100), 160);
    }

    #[test]
    fn combatant_derives_from_provider_data() {
        let dex = FixtureDex::bundled();
        let pikachu = Combatant::from_dex(&dex, 25).expect("pikachu should build");

        assert_eq!(pikachu.name, "pikachu");
        assert_eq!(pikachu.max_hp, 95);
        assert_eq!(pikachu.current_hp, pikachu.max_hp);
        assert!(!pikachu.is_fainted());
        assert_eq!(pikachu.moves.iter().flatten().count(), 4);
        assert!(pikachu.stat_stages.is_empty());
        assert_eq!(pikachu.status, None);
    }

    #[test]
    fn damage_and_heal_respect_bounds() {
        let dex = FixtureDex::bundled();
        let mut pikachu = Combatant::from_dex(&dex, 25).unwrap();

        let dealt = pikachu.take_damage(40);
        assert_eq!(dealt, 40);
        assert_eq!(pikachu.current_hp, 55);

        // Overkill clamps at zero and the faint predicate flips
        let dealt = pikachu.take_damage(500);
        assert_eq!(dealt, 55);
        assert_eq!(pikachu.current_hp, 0);
        assert!(pikachu.is_fainted());

        // Healing past max caps at max
        let healed = pikachu.heal(1000);
        assert_eq!(healed, pikachu.max_hp);
        assert_eq!(pikachu.current_hp, pikachu.max_hp);
    }

    #[test]
    fn pp_never_goes_negative() {
        let dex = FixtureDex::bundled();
        let mut pikachu = Combatant::from_dex(&dex, 25).unwrap();
        let slot = pikachu.move_slot("thunderbolt").unwrap();
        let mv = pikachu.moves[slot].as_mut().unwrap();

        for _ in 0..mv.max_pp() {
            assert!(mv.use_move());
        }
        assert_eq!(mv.pp, 0);
        assert!(!mv.use_move());
        assert_eq!(mv.pp, 0);
    }

    #[test]
    fn rematch_reset_restores_initial_state() {
        let dex = FixtureDex::bundled();
        let mut pikachu = Combatant::from_dex(&dex, 25).unwrap();

        pikachu.take_damage(90);
        pikachu.status = Some(StatusCondition::Burn);
        pikachu.set_stat_stage(StatType::Attack, -3);
        pikachu.moves[0].as_mut().unwrap().use_move();

        pikachu.reset_for_rematch();

        assert_eq!(pikachu.current_hp, pikachu.max_hp);
        assert_eq!(pikachu.status, None);
        assert!(pikachu.stat_stages.is_empty());
        let mv = pikachu.moves[0].as_ref().unwrap();
        assert_eq!(mv.pp, mv.max_pp());
    }

    #[test]
    fn stat_stages_clamp_to_bounds() {
        let dex = FixtureDex::bundled();
        let mut pikachu = Combatant::from_dex(&dex, 25).unwrap();

        pikachu.set_stat_stage(StatType::Attack, 9);
        assert_eq!(pikachu.stat_stage(StatType::Attack), 6);
        pikachu.set_stat_stage(StatType::Attack, -9);
        assert_eq!(pikachu.stat_stage(StatType::Attack), -6);
    }
}
