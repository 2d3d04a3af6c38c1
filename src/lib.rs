// In: src/lib.rs

//! Pokemon Arena Battle Engine
//!
//! A turn-based battle system with a synchronized two-player mode: damage
//! computation, type effectiveness, status conditions, stat stages, turn
//! ordering, fainting and forced switches, plus a coordination layer that
//! reconciles two independent clients over one shared battle record using
//! optimistic transactions.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod errors;
pub mod player;
pub mod pokedex;
pub mod pokemon;
pub mod sync;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Re-export the core data definitions.
pub use schema::{
    Ability,
    Ailment,
    BaseStats,
    MoveCategory,
    MoveData,
    PokemonType,
    SpeciesData,
    StatChange,
    StatType,
    StatusType,
    Target,
    TypeRelations,
};

// Core battle engine functions and state.
pub use battle::calculators::{resolve_move, MoveOutcome};
pub use battle::engine::{resolve_forced_switch, resolve_turn, valid_actions, validate_action};
pub use battle::state::{
    BattleEvent, BattleRecord, EventBus, Outcome, SkipReason, TurnPhase, TurnRng,
};

// Core runtime types for a battle.
pub use player::{BattlePlayer, PlayerAction};
pub use pokemon::{Combatant, MoveInstance, StatusCondition, BATTLE_LEVEL};

// Data provider access.
pub use pokedex::{FixtureDex, Pokedex};

// Two-player synchronization over the shared battle record.
pub use sync::clock::{Clock, FixedClock, SystemClock};
pub use sync::matchmaking::{JoinOutcome, Matchmaker};
pub use sync::session::{BattleSession, SubmitOutcome, SyncConfig};
pub use sync::store::{BattleStore, Committed, MemoryBattleStore, Revision, Txn};

// Crate-specific error and result types.
pub use errors::{
    ActionError, ArenaError, ArenaResult, DataError, DataResult, StateError, StoreError,
    StoreResult,
};
