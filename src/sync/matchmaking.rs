use crate::battle::state::BattleRecord;
use crate::errors::ArenaResult;
use crate::player::BattlePlayer;
use crate::pokemon::Combatant;
use crate::sync::clock::Clock;
use crate::sync::store::BattleStore;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

/// Result of joining the queue: either an immediate pairing, or a ticket
/// that resolves with the battle record id once a partner arrives.
pub enum JoinOutcome {
    Paired(String),
    Waiting(oneshot::Receiver<String>),
}

struct WaitingEntry {
    participant_id: String,
    name: String,
    team: Vec<Combatant>,
    paired_tx: oneshot::Sender<String>,
}

/// Minimal pairing: two waiting participants become one battle record. The
/// first joiner waits; the second joiner creates the record (waiter listed
/// first) and both learn its id.
pub struct Matchmaker<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    waiting: Mutex<Option<WaitingEntry>>,
    battle_counter: AtomicU64,
}

impl<S: BattleStore, C: Clock> Matchmaker<S, C> {
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            waiting: Mutex::new(None),
            battle_counter: AtomicU64::new(0),
        }
    }

    pub async fn join_queue(
        &self,
        participant_id: &str,
        name: &str,
        team: Vec<Combatant>,
    ) -> ArenaResult<JoinOutcome> {
        let mut waiting = self.waiting.lock().await;

        match waiting.take() {
            Some(entry) if entry.participant_id != participant_id => {
                let battle_id = format!(
                    "battle-{}",
                    self.battle_counter.fetch_add(1, Ordering::SeqCst) + 1
                );
                let player1 =
                    BattlePlayer::new(entry.participant_id.clone(), entry.name.clone(), entry.team);
                let player2 =
                    BattlePlayer::new(participant_id.to_string(), name.to_string(), team);
                let record = BattleRecord::new(
                    battle_id.clone(),
                    player1,
                    player2,
                    self.clock.now_millis(),
                );
                self.store.create(&record).await?;
                debug!(
                    "paired {} with {} into {}",
                    entry.participant_id, participant_id, battle_id
                );

                // The waiter may have abandoned its ticket; the record exists
                // either way and the second client proceeds.
                let _ = entry.paired_tx.send(battle_id.clone());
                Ok(JoinOutcome::Paired(battle_id))
            }
            same_or_empty => {
                // Re-joining while already queued just refreshes the ticket.
                drop(same_or_empty);
                let (paired_tx, paired_rx) = oneshot::channel();
                *waiting = Some(WaitingEntry {
                    participant_id: participant_id.to_string(),
                    name: name.to_string(),
                    team,
                    paired_tx,
                });
                Ok(JoinOutcome::Waiting(paired_rx))
            }
        }
    }

    /// Remove a waiting participant. Returns true if they were in the queue.
    pub async fn leave_queue(&self, participant_id: &str) -> bool {
        let mut waiting = self.waiting.lock().await;
        match waiting.as_ref() {
            Some(entry) if entry.participant_id == participant_id => {
                *waiting = None;
                true
            }
            _ => false,
        }
    }
}
