use crate::battle::engine::resolve_turn;
use crate::battle::state::{BattleEvent, BattleRecord, EventBus, TurnRng};
use crate::player::{BattlePlayer, PlayerAction};
use crate::pokedex::{FixtureDex, Pokedex};
use crate::pokemon::{Combatant, StatusCondition};

/// A builder for creating test combatants from the fixture catalog with
/// common defaults.
///
/// # Example
/// ```rust,ignore
/// let pikachu = TestCombatantBuilder::new(25)
///     .with_moves(vec!["thunderbolt"])
///     .with_status(StatusCondition::Paralysis)
///     .build(&dex);
/// ```
pub struct TestCombatantBuilder {
    species_id: u16,
    moves: Option<Vec<&'static str>>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
}

impl TestCombatantBuilder {
    pub fn new(species_id: u16) -> Self {
        Self {
            species_id,
            moves: None,
            status: None,
            current_hp: None,
        }
    }

    /// Replace the species' default move pool with the named moves.
    pub fn with_moves(mut self, moves: Vec<&'static str>) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn build(self, dex: &FixtureDex) -> Combatant {
        let species = dex
            .species(self.species_id)
            .unwrap_or_else(|err| panic!("species #{} should load: {}", self.species_id, err));

        let names: Vec<String> = match self.moves {
            Some(names) => names.into_iter().map(str::to_string).collect(),
            None => species.moves.clone(),
        };
        let movepool = names
            .iter()
            .map(|name| {
                let data = dex
                    .move_data(name)
                    .unwrap_or_else(|err| panic!("move {} should load: {}", name, err));
                let relations = dex.type_relations(data.move_type).expect("chart should load");
                (data, relations)
            })
            .collect();

        let mut combatant = Combatant::new(&species, movepool);
        combatant.status = self.status;
        if let Some(hp) = self.current_hp {
            combatant.current_hp = hp.min(combatant.max_hp);
        }
        combatant
    }
}

/// Creates a battle record between two teams, one combatant each.
pub fn create_test_battle(p1: Combatant, p2: Combatant) -> BattleRecord {
    create_test_battle_with_teams(vec![p1], vec![p2])
}

pub fn create_test_battle_with_teams(team1: Vec<Combatant>, team2: Vec<Combatant>) -> BattleRecord {
    let player1 = BattlePlayer::new("p1".to_string(), "Player 1".to_string(), team1);
    let player2 = BattlePlayer::new("p2".to_string(), "Player 2".to_string(), team2);
    BattleRecord::new("test-battle".to_string(), player1, player2, 0)
}

/// Queue both actions and resolve one turn, returning the new record.
pub fn run_turn(
    record: &mut BattleRecord,
    p1_action: PlayerAction,
    p2_action: PlayerAction,
    mut rng: TurnRng,
) -> EventBus {
    record.players[0].pending_action = Some(p1_action);
    record.players[1].pending_action = Some(p2_action);
    let (next, bus) = resolve_turn(record, &mut rng).expect("turn should resolve");
    *record = next;
    bus
}

pub fn use_move(name: &str) -> PlayerAction {
    PlayerAction::UseMove {
        move_name: name.to_string(),
    }
}

/// A `TurnRng` with a generous buffer of neutral values: no crits, no
/// secondary ailments below 50%, no paralysis skips.
pub fn predictable_rng() -> TurnRng {
    TurnRng::scripted(vec![50; 100])
}

/// First damage amount dealt to the named target, if any.
pub fn damage_to(bus: &EventBus, target: &str) -> Option<u16> {
    bus.events().iter().find_map(|event| match event {
        BattleEvent::DamageDealt {
            target: hit,
            damage,
            ..
        } if hit == target => Some(*damage),
        _ => None,
    })
}

/// Player indices in the order their moves executed this turn.
pub fn move_order(bus: &EventBus) -> Vec<usize> {
    bus.events()
        .iter()
        .filter_map(|event| match event {
            BattleEvent::MoveUsed { player_index, .. } => Some(*player_index),
            _ => None,
        })
        .collect()
}
