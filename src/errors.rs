use std::fmt;

/// Main error type for the Pokemon Arena battle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// Error related to data provider lookups
    Data(DataError),
    /// Error related to invalid player actions
    Action(ActionError),
    /// Error related to an inconsistent battle record
    State(StateError),
    /// Error related to the shared battle record store
    Store(StoreError),
}

/// Errors from the data provider. These are retryable setup errors: the
/// battle does not start until the provider answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// The species identifier is not in the catalog
    SpeciesNotFound(u16),
    /// The move reference is not in the catalog
    MoveNotFound(String),
    /// Provider data is malformed or incomplete
    MalformedData(String),
}

/// Errors for invalid action submissions. These are rejected locally,
/// before any write to the shared record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The active combatant does not know the named move
    UnknownMove(String),
    /// The named move has no remaining uses
    NoUsesRemaining(String),
    /// Team slot index is out of bounds or empty
    InvalidTeamSlot(usize),
    /// Cannot switch into a fainted team member
    FaintedSwitchTarget(usize),
    /// Cannot switch into the already-active slot
    AlreadyActive(usize),
    /// The submitting player already has a pending action this turn
    AlreadySubmitted,
    /// The battle record's phase does not accept this action from this player
    OutOfTurn,
    /// The battle has already reached a terminal outcome
    BattleFinished,
}

/// Errors for an inconsistent battle record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// No active combatant found when one was expected
    NoActiveCombatant,
    /// Invalid player index
    InvalidPlayerIndex(usize),
    /// The record is in an inconsistent or corrupted state
    InconsistentState(String),
}

/// Errors from the shared battle record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record does not exist (or no longer exists)
    NotFound,
    /// The record changed between read and write and retries were exhausted
    Conflict,
    /// The stored document could not be encoded or decoded
    Encoding(String),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::Data(err) => write!(f, "Data error: {}", err),
            ArenaError::Action(err) => write!(f, "Action error: {}", err),
            ArenaError::State(err) => write!(f, "Battle state error: {}", err),
            ArenaError::Store(err) => write!(f, "Store error: {}", err),
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::SpeciesNotFound(id) => write!(f, "Species not found: #{}", id),
            DataError::MoveNotFound(name) => write!(f, "Move not found: {}", name),
            DataError::MalformedData(details) => write!(f, "Malformed provider data: {}", details),
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::UnknownMove(name) => write!(f, "Unknown move: {}", name),
            ActionError::NoUsesRemaining(name) => write!(f, "No uses remaining for {}", name),
            ActionError::InvalidTeamSlot(index) => write!(f, "Invalid team slot: {}", index),
            ActionError::FaintedSwitchTarget(index) => {
                write!(f, "Cannot switch to fainted team slot {}", index)
            }
            ActionError::AlreadyActive(index) => {
                write!(f, "Team slot {} is already active", index)
            }
            ActionError::AlreadySubmitted => write!(f, "An action is already pending"),
            ActionError::OutOfTurn => write!(f, "Action not accepted in the current phase"),
            ActionError::BattleFinished => write!(f, "The battle is already over"),
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::NoActiveCombatant => write!(f, "No active combatant found"),
            StateError::InvalidPlayerIndex(index) => write!(f, "Invalid player index: {}", index),
            StateError::InconsistentState(details) => {
                write!(f, "Inconsistent battle record: {}", details)
            }
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Battle record not found"),
            StoreError::Conflict => write!(f, "Transaction conflict"),
            StoreError::Encoding(details) => write!(f, "Document encoding error: {}", details),
        }
    }
}

impl std::error::Error for ArenaError {}
impl std::error::Error for DataError {}
impl std::error::Error for ActionError {}
impl std::error::Error for StateError {}
impl std::error::Error for StoreError {}

impl From<DataError> for ArenaError {
    fn from(err: DataError) -> Self {
        ArenaError::Data(err)
    }
}

impl From<ActionError> for ArenaError {
    fn from(err: ActionError) -> Self {
        ArenaError::Action(err)
    }
}

impl From<StateError> for ArenaError {
    fn from(err: StateError) -> Self {
        ArenaError::State(err)
    }
}

impl From<StoreError> for ArenaError {
    fn from(err: StoreError) -> Self {
        ArenaError::Store(err)
    }
}

/// Type alias for Results using ArenaError
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Type alias for Results using DataError
pub type DataResult<T> = Result<T, DataError>;

/// Type alias for Results using StoreError
pub type StoreResult<T> = Result<T, StoreError>;
