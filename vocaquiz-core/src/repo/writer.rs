use crate::repo::{CardStore, ScheduleSink};
use crate::{CardId, CoreError, ScheduleUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::{self, JoinSet};

/// Forwards session updates to a [`CardStore`] as background writes.
///
/// Writes start in the order they are issued and run concurrently; `flush`
/// waits for all of them and reports failed or panicked writes per card.
/// Dropping the writer without flushing detaches the in-flight writes instead
/// of cancelling them.
pub struct StoreWriter {
    store: Arc<dyn CardStore>,
    handle: Handle,
    inflight: JoinSet<Result<(), CoreError>>,
    pending: HashMap<task::Id, CardId>,
    issued: usize,
}

impl StoreWriter {
    pub fn new(store: Arc<dyn CardStore>, handle: Handle) -> Self {
        Self {
            store,
            handle,
            inflight: JoinSet::new(),
            pending: HashMap::new(),
            issued: 0,
        }
    }

    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Waits for every issued write and returns the ones that failed.
    pub async fn flush(&mut self) -> Vec<(CardId, CoreError)> {
        let mut failures = Vec::new();
        while let Some(joined) = self.inflight.join_next_with_id().await {
            let (task_id, outcome) = match joined {
                Ok((task_id, res)) => (task_id, res),
                Err(join_err) => {
                    tracing::error!(error = %join_err, "schedule write task failed");
                    (join_err.id(), Err(CoreError::persistence(join_err)))
                }
            };
            let Some(card_id) = self.pending.remove(&task_id) else {
                continue;
            };
            if let Err(err) = outcome {
                tracing::warn!(%card_id, error = %err, "schedule write failed");
                let err = match err {
                    e @ CoreError::Persistence(_) => e,
                    other => CoreError::persistence(other),
                };
                failures.push((card_id, err));
            }
        }
        failures
    }
}

impl ScheduleSink for StoreWriter {
    fn issue(&mut self, update: ScheduleUpdate) {
        let store = Arc::clone(&self.store);
        self.issued += 1;
        tracing::debug!(card_id = %update.card_id, "issuing schedule write");
        let card_id = update.card_id;
        let abort = self.inflight.spawn_on(
            async move { store.persist(update.card_id, &update.schedule).await },
            &self.handle,
        );
        self.pending.insert(abort.id(), card_id);
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        // JoinSet aborts its tasks on drop; detach them so issued writes still land.
        if !self.inflight.is_empty() {
            tracing::debug!(pending = self.inflight.len(), "detaching unflushed schedule writes");
            self.inflight.detach_all();
        }
    }
}
