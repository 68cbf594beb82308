//! Async workflow driver.
//!
//! Owns one session, folds `step` over incoming events, and executes the
//! effects the machine requests: lookups become `ResultsReady` events,
//! dispatches become `DispatchSucceeded`/`DispatchFailed` events, notices
//! queue up for the operator. Store errors during dispatch never escape as
//! errors; they come back through the machine so the session stays retryable.

use crate::session::{search_inventory, step, Effect, Notice, SessionEvent, SessionState};
use crate::store::{InventoryStore, StoreError};
use std::collections::VecDeque;
use std::sync::Arc;
use tally_protocol::types::MutationKind;
use tracing::{debug, info, warn};

/// One operator's reconciliation session against one store.
pub struct ReconcileDriver {
    state: SessionState,
    store: Arc<dyn InventoryStore>,
    notices: VecDeque<Notice>,
}

impl ReconcileDriver {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            state: SessionState::searching(),
            store,
            notices: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Queued operator notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Feed one operator event and run any produced effects to completion.
    ///
    /// Only lookup failures surface as errors; dispatch failures are routed
    /// back into the machine and end up as a `DispatchFailed` notice.
    pub async fn handle(&mut self, event: SessionEvent) -> Result<(), StoreError> {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            debug!(?event, "session event");
            let (next, effect) = step(std::mem::take(&mut self.state), event);
            self.state = next;
            if let Some(effect) = effect {
                if let Some(follow_up) = self.run_effect(effect).await? {
                    queue.push_back(follow_up);
                }
            }
        }
        Ok(())
    }

    async fn run_effect(&mut self, effect: Effect) -> Result<Option<SessionEvent>, StoreError> {
        match effect {
            Effect::Notify(notice) => {
                self.notices.push_back(notice);
                Ok(None)
            }

            Effect::Search { term, source } => {
                let items = self.store.list_items().await?;
                let outcome = search_inventory(&items, &term);
                debug!(
                    term = %term,
                    candidates = outcome.candidates.len(),
                    exact = outcome.exact_sku_matches.len(),
                    "lookup complete"
                );
                Ok(Some(SessionEvent::ResultsReady {
                    term,
                    source,
                    outcome,
                }))
            }

            Effect::Dispatch { item_id, intent } => {
                info!(
                    item = %item_id,
                    kind = %intent.kind,
                    quantity = intent.quantity,
                    reason = %intent.reason,
                    "dispatching stock mutation"
                );
                let result = match intent.kind {
                    MutationKind::AddStock => {
                        self.store
                            .add_stock(&item_id, intent.quantity, intent.reason, &intent.note)
                            .await
                    }
                    MutationKind::DeductStock => {
                        self.store
                            .adjust_stock(&item_id, intent.quantity, intent.reason, &intent.note)
                            .await
                    }
                    // NoOp intents are handled inside the machine and never
                    // reach dispatch.
                    MutationKind::NoOp => Ok(()),
                };
                match result {
                    Ok(()) => Ok(Some(SessionEvent::DispatchSucceeded)),
                    Err(err) => {
                        warn!(item = %item_id, error = %err, "stock mutation dispatch failed");
                        Ok(Some(SessionEvent::DispatchFailed(err.to_string())))
                    }
                }
            }
        }
    }
}
