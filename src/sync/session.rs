use crate::battle::engine::{finish_battle, resolve_forced_switch, resolve_turn, validate_action};
use crate::battle::state::{BattleEvent, BattleRecord, EventBus, Outcome, TurnPhase, TurnRng};
use crate::errors::{ActionError, ArenaError, ArenaResult, StoreError};
use crate::player::PlayerAction;
use crate::sync::clock::Clock;
use crate::sync::store::{BattleStore, Revision, Txn};
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Synchronization tuning for one battle.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// How long the record may sit in `Selecting` with an action missing
    /// before the turn is forfeited.
    pub turn_timeout_millis: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            turn_timeout_millis: 30_000,
        }
    }
}

/// What a submission did to the shared record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The intent is queued; the opponent has not acted yet.
    Accepted,
    /// Both intents were present: this client resolved the turn.
    TurnResolved(Outcome),
    /// A forced replacement was applied and the record returned to Selecting.
    SwitchApplied,
    /// The record no longer exists: the battle is over, return to the menu.
    BattleOver,
}

enum SubmitTxn {
    Queued,
    Flipped(u64),
    Switched,
}

/// One client's driver over the shared battle record. Two sessions on two
/// machines coordinate exclusively through store transactions; this type
/// holds no authoritative state beyond the dedup watermark.
pub struct BattleSession<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    config: SyncConfig,
    battle_id: String,
    seat: usize,
    // Highest revision this client has already processed; notifications at
    // or below it are dropped as re-deliveries.
    last_processed: Revision,
}

impl<S: BattleStore, C: Clock> BattleSession<S, C> {
    pub fn new(
        store: Arc<S>,
        clock: Arc<C>,
        config: SyncConfig,
        battle_id: String,
        seat: usize,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            battle_id,
            seat,
            last_processed: 0,
        }
    }

    pub fn battle_id(&self) -> &str {
        &self.battle_id
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    /// Current record, or None when it no longer exists (battle over).
    pub async fn snapshot(&self) -> ArenaResult<Option<BattleRecord>> {
        match self.store.load(&self.battle_id).await {
            Ok(committed) => Ok(Some(committed.record)),
            Err(StoreError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn subscribe(&self) -> ArenaResult<broadcast::Receiver<Revision>> {
        Ok(self.store.subscribe(&self.battle_id).await?)
    }

    /// Submit this player's intent for the turn. The whole read-modify-write
    /// is one optimistic transaction: the write that supplies the second
    /// pending action also flips the phase to `Processing` and stamps the
    /// store-allocated marker, and only that client goes on to resolve.
    pub async fn submit_action(
        &mut self,
        action: PlayerAction,
        rng: &mut TurnRng,
    ) -> ArenaResult<SubmitOutcome> {
        let seat = self.seat;
        let clock = Arc::clone(&self.clock);
        let result = self
            .store
            .transact(&self.battle_id, |record, marker| {
                validate_action(record, seat, &action)?;
                match record.phase {
                    TurnPhase::Selecting => {
                        let mut next = record.clone();
                        next.players[seat].pending_action = Some(action.clone());
                        if next.both_pending() {
                            next.phase = TurnPhase::Processing;
                            next.last_resolved = Some(marker);
                            Ok(Txn::Commit(next, SubmitTxn::Flipped(marker)))
                        } else {
                            Ok(Txn::Commit(next, SubmitTxn::Queued))
                        }
                    }
                    TurnPhase::Player1MustSwitch
                    | TurnPhase::Player2MustSwitch
                    | TurnPhase::BothMustSwitch => {
                        if record.awaits_replacement_from(seat) {
                            let PlayerAction::SwitchPokemon { team_index } = &action else {
                                return Err(ActionError::OutOfTurn.into());
                            };
                            let (mut next, bus) = resolve_forced_switch(record, seat, *team_index)?;
                            let lines = bus.formatted_lines(&next);
                            next.log.extend(lines);
                            if next.phase == TurnPhase::Selecting {
                                next.selecting_since = clock.now_millis();
                            }
                            Ok(Txn::Commit(next, SubmitTxn::Switched))
                        } else {
                            // Queue the unaffected side's intent for the
                            // coming turn; it never flips the phase.
                            let mut next = record.clone();
                            next.players[seat].pending_action = Some(action.clone());
                            Ok(Txn::Commit(next, SubmitTxn::Queued))
                        }
                    }
                    _ => Err(ActionError::OutOfTurn.into()),
                }
            })
            .await;

        let (committed, txn) = match result {
            Ok(value) => value,
            Err(ArenaError::Store(StoreError::NotFound)) => return Ok(SubmitOutcome::BattleOver),
            Err(err) => return Err(err),
        };
        self.note_revision(committed.revision);

        match txn {
            SubmitTxn::Queued => Ok(SubmitOutcome::Accepted),
            SubmitTxn::Switched => Ok(SubmitOutcome::SwitchApplied),
            SubmitTxn::Flipped(marker) => match self.resolve_marked_turn(marker, rng).await? {
                Some(outcome) => Ok(SubmitOutcome::TurnResolved(outcome)),
                None => Ok(SubmitOutcome::BattleOver),
            },
        }
    }

    /// Run the turn resolver for the turn stamped with `marker` and commit
    /// the result. Safe to call from either client and safe to call again:
    /// the transaction re-validates that the record is still the stamped
    /// `Processing` turn and becomes a no-op otherwise, so a pair of pending
    /// actions is resolved exactly once. Returns None when the record is
    /// gone.
    pub async fn resolve_marked_turn(
        &mut self,
        marker: u64,
        rng: &mut TurnRng,
    ) -> ArenaResult<Option<Outcome>> {
        let clock = Arc::clone(&self.clock);
        let result = self
            .store
            .transact(&self.battle_id, |record, _next_marker| {
                if record.phase != TurnPhase::Processing || record.last_resolved != Some(marker) {
                    debug!(
                        "turn {} already resolved elsewhere; skipping",
                        marker
                    );
                    return Ok(Txn::Skip(record.outcome));
                }
                let (mut next, bus) = resolve_turn(record, rng)?;
                let lines = bus.formatted_lines(&next);
                next.log.extend(lines);
                if next.phase == TurnPhase::Selecting {
                    next.selecting_since = clock.now_millis();
                }
                let outcome = next.outcome;
                Ok(Txn::Commit(next, outcome))
            })
            .await;

        match result {
            Ok((committed, outcome)) => {
                self.note_revision(committed.revision);
                Ok(Some(outcome))
            }
            Err(ArenaError::Store(StoreError::NotFound)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// React to a change notification. Re-deliveries (at or below the last
    /// processed revision) are dropped; a missing record means the battle
    /// ended. If the record sits in `Processing`, this client attempts the
    /// resolution itself — the marker guard in the transaction keeps that
    /// race safe, and it un-sticks a turn whose stamping client died.
    pub async fn handle_notification(
        &mut self,
        revision: Revision,
        rng: &mut TurnRng,
    ) -> ArenaResult<Option<BattleRecord>> {
        if revision <= self.last_processed {
            debug!("dropping stale notification at revision {}", revision);
            return Ok(None);
        }

        let committed = match self.store.load(&self.battle_id).await {
            Ok(committed) => committed,
            Err(StoreError::NotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        self.note_revision(committed.revision);

        if committed.record.phase == TurnPhase::Processing {
            if let Some(marker) = committed.record.last_resolved {
                self.resolve_marked_turn(marker, rng).await?;
            }
        }

        match self.store.load(&self.battle_id).await {
            Ok(committed) => Ok(Some(committed.record)),
            Err(StoreError::NotFound) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Apply the turn-timeout rule: when the record has sat in `Selecting`
    /// past the window with an action missing, the side that failed to act
    /// loses; when neither side acted, the second listed side wins by
    /// default. Returns the terminal outcome if a timeout fired.
    pub async fn check_timeout(&mut self) -> ArenaResult<Option<Outcome>> {
        let now = self.clock.now_millis();
        let window = self.config.turn_timeout_millis;
        let result = self
            .store
            .transact(&self.battle_id, |record, _marker| {
                if record.phase != TurnPhase::Selecting || record.outcome.is_terminal() {
                    return Ok(Txn::Skip(None));
                }
                let submitted = [
                    record.players[0].pending_action.is_some(),
                    record.players[1].pending_action.is_some(),
                ];
                if submitted[0] && submitted[1] {
                    return Ok(Txn::Skip(None));
                }
                if now.saturating_sub(record.selecting_since) < window {
                    return Ok(Txn::Skip(None));
                }

                let (timed_out_player, outcome) = match submitted {
                    [true, false] => (Some(1), Outcome::Player1Win),
                    [false, true] => (Some(0), Outcome::Player2Win),
                    // Neither side acted: the second listed side wins by
                    // default. Asymmetric on purpose.
                    [false, false] => (None, Outcome::Player2Win),
                    [true, true] => unreachable!("checked above"),
                };

                let mut next = record.clone();
                let mut bus = EventBus::new();
                bus.push(BattleEvent::TurnTimedOut { timed_out_player });
                finish_battle(&mut next, outcome, &mut bus);
                let lines = bus.formatted_lines(&next);
                next.log.extend(lines);
                Ok(Txn::Commit(next, Some(outcome)))
            })
            .await;

        match result {
            Ok((committed, fired)) => {
                self.note_revision(committed.revision);
                if let Some(outcome) = fired {
                    warn!(
                        "battle {} timed out in Selecting; outcome {:?}",
                        self.battle_id, outcome
                    );
                }
                Ok(fired)
            }
            Err(ArenaError::Store(StoreError::NotFound)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Concede the battle. Returns the terminal outcome, or None when the
    /// record is already gone.
    pub async fn forfeit(&mut self) -> ArenaResult<Option<Outcome>> {
        let seat = self.seat;
        let result = self
            .store
            .transact(&self.battle_id, |record, _marker| {
                if record.outcome.is_terminal() {
                    return Ok(Txn::Skip(record.outcome));
                }
                let mut next = record.clone();
                let mut bus = EventBus::new();
                bus.push(BattleEvent::PlayerForfeited { player_index: seat });
                finish_battle(&mut next, Outcome::win_for_opponent_of(seat), &mut bus);
                let lines = bus.formatted_lines(&next);
                next.log.extend(lines);
                let outcome = next.outcome;
                Ok(Txn::Commit(next, outcome))
            })
            .await;

        match result {
            Ok((committed, outcome)) => {
                self.note_revision(committed.revision);
                Ok(Some(outcome))
            }
            Err(ArenaError::Store(StoreError::NotFound)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Leaving the battle screen: an ongoing battle is forfeited for the
    /// leaving side; a vanished record is already over and needs nothing.
    pub async fn leave(&mut self) -> ArenaResult<()> {
        self.forfeit().await?;
        Ok(())
    }

    /// Remove the record once it is terminal (the loser's client cleans up).
    pub async fn delete_battle(&self) -> ArenaResult<()> {
        match self.store.delete(&self.battle_id).await {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn note_revision(&mut self, revision: Revision) {
        if revision > self.last_processed {
            self.last_processed = revision;
        }
    }
}
