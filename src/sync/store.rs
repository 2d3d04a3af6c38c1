use crate::battle::state::BattleRecord;
use crate::errors::{ArenaError, StoreError, StoreResult};
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};

/// Store-assigned revision of a committed document. Revisions are unique
/// and monotonically increasing, which lets them double as turn markers.
pub type Revision = u64;

/// A record together with the revision it was read or committed at.
#[derive(Debug, Clone)]
pub struct Committed {
    pub record: BattleRecord,
    pub revision: Revision,
}

/// Decision returned by a transaction closure: commit a replacement record,
/// or leave the document untouched (the designed no-op for stale work).
pub enum Txn<T> {
    Commit(BattleRecord, T),
    Skip(T),
}

/// The coordination store contract. The battle record is the only shared
/// mutable resource, and every mutation goes through `transact`: an
/// optimistic read-modify-write that re-reads the freshest record and aborts
/// and retries when the document changed underneath it. Partial,
/// non-transactional writes to the record do not exist in this interface.
pub trait BattleStore: Send + Sync {
    /// Store a freshly created record under its battle id.
    fn create(
        &self,
        record: &BattleRecord,
    ) -> impl std::future::Future<Output = StoreResult<Revision>> + Send;

    /// Read the current record.
    fn load(
        &self,
        battle_id: &str,
    ) -> impl std::future::Future<Output = StoreResult<Committed>> + Send;

    /// Atomic compare-and-swap transaction. The closure receives the
    /// freshest record and a store-allocated marker (the revision the commit
    /// will carry, unique and monotonic). Conflicts retry silently; closure
    /// errors abort without writing.
    fn transact<T, F>(
        &self,
        battle_id: &str,
        op: F,
    ) -> impl std::future::Future<Output = Result<(Committed, T), ArenaError>> + Send
    where
        T: Send,
        F: FnMut(&BattleRecord, Revision) -> Result<Txn<T>, ArenaError> + Send;

    /// Change notifications carrying the revision of each commit. The
    /// channel closes when the record is deleted.
    fn subscribe(
        &self,
        battle_id: &str,
    ) -> impl std::future::Future<Output = StoreResult<broadcast::Receiver<Revision>>> + Send;

    fn delete(
        &self,
        battle_id: &str,
    ) -> impl std::future::Future<Output = StoreResult<()>> + Send;
}

const TRANSACT_MAX_RETRIES: usize = 16;
const NOTIFY_CHANNEL_CAPACITY: usize = 64;

struct StoredDoc {
    // Records are persisted as JSON documents; every read and write crosses
    // the same serialization boundary a remote document store imposes.
    body: String,
    revision: Revision,
    notify: broadcast::Sender<Revision>,
}

/// In-process implementation of the store contract: JSON documents guarded
/// by revision compare-and-swap, with broadcast change notifications.
#[derive(Default)]
pub struct MemoryBattleStore {
    docs: RwLock<HashMap<String, StoredDoc>>,
    counter: AtomicU64,
}

impl MemoryBattleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_revision(&self) -> Revision {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn encode(record: &BattleRecord) -> StoreResult<String> {
    serde_json::to_string(record).map_err(|e| StoreError::Encoding(e.to_string()))
}

fn decode(body: &str) -> StoreResult<BattleRecord> {
    serde_json::from_str(body).map_err(|e| StoreError::Encoding(e.to_string()))
}

impl BattleStore for MemoryBattleStore {
    async fn create(&self, record: &BattleRecord) -> StoreResult<Revision> {
        let body = encode(record)?;
        let revision = self.next_revision();
        let (notify, _) = broadcast::channel(NOTIFY_CHANNEL_CAPACITY);
        let mut docs = self.docs.write().await;
        docs.insert(
            record.battle_id.clone(),
            StoredDoc {
                body,
                revision,
                notify,
            },
        );
        Ok(revision)
    }

    async fn load(&self, battle_id: &str) -> StoreResult<Committed> {
        let docs = self.docs.read().await;
        let doc = docs.get(battle_id).ok_or(StoreError::NotFound)?;
        Ok(Committed {
            record: decode(&doc.body)?,
            revision: doc.revision,
        })
    }

    async fn transact<T, F>(&self, battle_id: &str, mut op: F) -> Result<(Committed, T), ArenaError>
    where
        T: Send,
        F: FnMut(&BattleRecord, Revision) -> Result<Txn<T>, ArenaError> + Send,
    {
        for attempt in 0..TRANSACT_MAX_RETRIES {
            let (body, read_revision) = {
                let docs = self.docs.read().await;
                let doc = docs.get(battle_id).ok_or(StoreError::NotFound)?;
                (doc.body.clone(), doc.revision)
            };
            let record = decode(&body)?;
            let marker = self.next_revision();

            match op(&record, marker)? {
                Txn::Skip(value) => {
                    return Ok((
                        Committed {
                            record,
                            revision: read_revision,
                        },
                        value,
                    ));
                }
                Txn::Commit(new_record, value) => {
                    let new_body = encode(&new_record)?;
                    let mut docs = self.docs.write().await;
                    match docs.get_mut(battle_id) {
                        None => return Err(StoreError::NotFound.into()),
                        Some(doc) if doc.revision != read_revision => {
                            // Someone committed in between; retry silently
                            // from the freshest document.
                            debug!(
                                "transaction conflict on {} (attempt {}), retrying",
                                battle_id,
                                attempt + 1
                            );
                            continue;
                        }
                        Some(doc) => {
                            doc.body = new_body;
                            doc.revision = marker;
                            let _ = doc.notify.send(marker);
                            return Ok((
                                Committed {
                                    record: new_record,
                                    revision: marker,
                                },
                                value,
                            ));
                        }
                    }
                }
            }
        }
        Err(StoreError::Conflict.into())
    }

    async fn subscribe(&self, battle_id: &str) -> StoreResult<broadcast::Receiver<Revision>> {
        let docs = self.docs.read().await;
        let doc = docs.get(battle_id).ok_or(StoreError::NotFound)?;
        Ok(doc.notify.subscribe())
    }

    async fn delete(&self, battle_id: &str) -> StoreResult<()> {
        let mut docs = self.docs.write().await;
        // Dropping the document drops its notify sender, closing every
        // subscriber's channel.
        docs.remove(battle_id).ok_or(StoreError::NotFound)?;
        Ok(())
    }
}
