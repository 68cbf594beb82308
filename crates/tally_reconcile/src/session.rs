//! Reconciliation session: a pure state machine over recount events.
//!
//! The machine never talks to a store or a screen. It consumes events,
//! returns the next state plus at most one effect, and leaves executing that
//! effect (searching, dispatching, notifying) to the driver. Events that are
//! invalid in the current state are ignored without effect.

use serde::{Deserialize, Serialize};
use tally_protocol::defaults::SEARCH_RESULT_CAP;
use tally_protocol::payload::DecodedIdentity;
use tally_protocol::types::{InventoryItem, ItemId, MutationIntent, MutationKind, ReasonCode};

// ============================================================================
// State
// ============================================================================

/// Session state. One item, one operator, no terminal state: every completed
/// or cancelled cycle returns to `Searching`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    /// Looking for the item to count.
    Searching {
        query: String,
        candidates: Vec<InventoryItem>,
    },
    /// An item is selected; the operator enters the physical count.
    ///
    /// `pending` holds the mutation currently being dispatched; while it is
    /// set, submission, editing and cancellation are all disabled.
    Verifying {
        item: InventoryItem,
        entered_count: String,
        pending: Option<MutationIntent>,
    },
}

impl SessionState {
    /// A fresh, cleared `Searching` state.
    pub fn searching() -> Self {
        SessionState::Searching {
            query: String::new(),
            candidates: Vec::new(),
        }
    }

    pub fn is_searching(&self) -> bool {
        matches!(self, SessionState::Searching { .. })
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self, SessionState::Verifying { .. })
    }

    /// Whether a dispatch for this session is outstanding.
    pub fn is_dispatching(&self) -> bool {
        matches!(
            self,
            SessionState::Verifying {
                pending: Some(_),
                ..
            }
        )
    }

    /// Whether the submit action is currently enabled.
    ///
    /// A non-numeric or empty entered count means "no decision yet", not a
    /// zero delta.
    pub fn can_submit(&self) -> bool {
        match self {
            SessionState::Verifying {
                entered_count,
                pending: None,
                ..
            } => entered_count.trim().parse::<u32>().is_ok(),
            _ => false,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::searching()
    }
}

// ============================================================================
// Events, effects, notices
// ============================================================================

/// Where a search term came from. Only scans may auto-select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchSource {
    Manual,
    Scan,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Operator typed a free-text query.
    QuerySubmitted(String),
    /// The scanner collaborator produced a decoded identity.
    ScanDecoded(DecodedIdentity),
    /// The driver finished a lookup started by `Effect::Search`.
    ResultsReady {
        term: String,
        source: SearchSource,
        outcome: SearchOutcome,
    },
    /// Operator picked one of the displayed candidates.
    CandidatePicked(ItemId),
    /// Operator edited the physical count field.
    CountEdited(String),
    /// Operator confirmed the entered count.
    SubmitPressed,
    /// Operator backed out of verification.
    Cancelled,
    /// The driver resolved an outstanding dispatch.
    DispatchSucceeded,
    DispatchFailed(String),
}

/// Requested side effects, executed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Look the term up against the external item list.
    Search { term: String, source: SearchSource },
    /// Post the derived mutation to the external store.
    Dispatch {
        item_id: ItemId,
        intent: MutationIntent,
    },
    /// Surface an operator-facing notice. Never dropped silently.
    Notify(Notice),
}

/// Operator-facing outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// Counts agreed; nothing was posted.
    CountVerified { sku: String },
    /// A stock mutation was applied by the store.
    StockAdjusted {
        sku: String,
        kind: MutationKind,
        quantity: u32,
    },
    /// The store rejected or failed the mutation; the session is retryable.
    DispatchFailed { message: String },
    /// The search matched nothing.
    NoMatches { term: String },
}

// ============================================================================
// Search
// ============================================================================

/// Result of matching a term against the full item list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Case-insensitive substring matches on name or SKU, capped for display.
    pub candidates: Vec<InventoryItem>,
    /// Case-insensitive exact SKU matches, computed over the full list so the
    /// display cap cannot hide an auto-select hit.
    pub exact_sku_matches: Vec<InventoryItem>,
}

/// Match `term` against `items` per the reconciliation search rules.
pub fn search_inventory(items: &[InventoryItem], term: &str) -> SearchOutcome {
    let needle = term.trim().to_lowercase();
    let mut outcome = SearchOutcome::default();
    if needle.is_empty() {
        return outcome;
    }
    for item in items {
        let sku = item.sku.to_lowercase();
        if sku == needle {
            outcome.exact_sku_matches.push(item.clone());
        }
        if outcome.candidates.len() < SEARCH_RESULT_CAP
            && (item.name.to_lowercase().contains(&needle) || sku.contains(&needle))
        {
            outcome.candidates.push(item.clone());
        }
    }
    outcome
}

// ============================================================================
// Intent derivation
// ============================================================================

/// Derive the stock mutation for an observed count.
///
/// The only constructor of mutation intents: quantity is always the absolute
/// delta, direction lives in the kind, and the reason is always `recount`.
pub fn derive_intent(recorded: u32, entered: u32) -> MutationIntent {
    let delta = i64::from(entered) - i64::from(recorded);
    if delta == 0 {
        MutationIntent {
            kind: MutationKind::NoOp,
            quantity: 0,
            reason: ReasonCode::Recount,
            note: "count verified".to_string(),
        }
    } else if delta > 0 {
        MutationIntent {
            kind: MutationKind::AddStock,
            quantity: delta as u32,
            reason: ReasonCode::Recount,
            note: format!("found {} extra units", delta),
        }
    } else {
        MutationIntent {
            kind: MutationKind::DeductStock,
            quantity: (-delta) as u32,
            reason: ReasonCode::Recount,
            note: format!("missing {} units", -delta),
        }
    }
}

// ============================================================================
// Transition function
// ============================================================================

/// Select `item` into verification, pre-seeding the count field with the
/// recorded quantity so an unmodified confirm is a true no-op.
fn select(item: InventoryItem) -> SessionState {
    let entered_count = item.quantity.to_string();
    SessionState::Verifying {
        item,
        entered_count,
        pending: None,
    }
}

/// Advance the session by one event.
pub fn step(state: SessionState, event: SessionEvent) -> (SessionState, Option<Effect>) {
    match (state, event) {
        // ---- Searching ----------------------------------------------------
        (SessionState::Searching { candidates, .. }, SessionEvent::QuerySubmitted(term)) => (
            SessionState::Searching {
                query: term.clone(),
                candidates,
            },
            Some(Effect::Search {
                term,
                source: SearchSource::Manual,
            }),
        ),

        (SessionState::Searching { candidates, .. }, SessionEvent::ScanDecoded(identity)) => (
            SessionState::Searching {
                query: identity.sku.clone(),
                candidates,
            },
            Some(Effect::Search {
                term: identity.sku,
                source: SearchSource::Scan,
            }),
        ),

        (
            SessionState::Searching { .. },
            SessionEvent::ResultsReady {
                term,
                source,
                mut outcome,
            },
        ) => {
            // A scan resolving to exactly one recorded SKU skips candidate
            // selection entirely.
            if source == SearchSource::Scan && outcome.exact_sku_matches.len() == 1 {
                let item = outcome.exact_sku_matches.remove(0);
                return (select(item), None);
            }
            let effect = if outcome.candidates.is_empty() {
                Some(Effect::Notify(Notice::NoMatches { term: term.clone() }))
            } else {
                None
            };
            (
                SessionState::Searching {
                    query: term,
                    candidates: outcome.candidates,
                },
                effect,
            )
        }

        (SessionState::Searching { query, candidates }, SessionEvent::CandidatePicked(id)) => {
            match candidates.iter().find(|item| item.id == id) {
                Some(item) => (select(item.clone()), None),
                None => (SessionState::Searching { query, candidates }, None),
            }
        }

        // ---- Verifying, no dispatch outstanding ---------------------------
        (
            SessionState::Verifying {
                item,
                pending: None,
                ..
            },
            SessionEvent::CountEdited(entered_count),
        ) => (
            SessionState::Verifying {
                item,
                entered_count,
                pending: None,
            },
            None,
        ),

        (
            SessionState::Verifying {
                item,
                entered_count,
                pending: None,
            },
            SessionEvent::SubmitPressed,
        ) => {
            let entered = match entered_count.trim().parse::<u32>() {
                Ok(entered) => entered,
                // No decision yet; submission stays disabled.
                Err(_) => {
                    return (
                        SessionState::Verifying {
                            item,
                            entered_count,
                            pending: None,
                        },
                        None,
                    )
                }
            };
            let intent = derive_intent(item.quantity, entered);
            if intent.is_no_op() {
                let sku = item.sku;
                return (
                    SessionState::searching(),
                    Some(Effect::Notify(Notice::CountVerified { sku })),
                );
            }
            let effect = Effect::Dispatch {
                item_id: item.id.clone(),
                intent: intent.clone(),
            };
            (
                SessionState::Verifying {
                    item,
                    entered_count,
                    pending: Some(intent),
                },
                Some(effect),
            )
        }

        (
            SessionState::Verifying { pending: None, .. },
            SessionEvent::Cancelled,
        ) => (SessionState::searching(), None),

        // ---- Verifying, dispatch outstanding ------------------------------
        (
            SessionState::Verifying {
                item,
                pending: Some(intent),
                ..
            },
            SessionEvent::DispatchSucceeded,
        ) => (
            SessionState::searching(),
            Some(Effect::Notify(Notice::StockAdjusted {
                sku: item.sku,
                kind: intent.kind,
                quantity: intent.quantity,
            })),
        ),

        (
            SessionState::Verifying {
                item,
                entered_count,
                pending: Some(_),
            },
            SessionEvent::DispatchFailed(message),
        ) => (
            // Fields untouched: the operator may retry or cancel.
            SessionState::Verifying {
                item,
                entered_count,
                pending: None,
            },
            Some(Effect::Notify(Notice::DispatchFailed { message })),
        ),

        // Everything else (submit/edit/cancel mid-dispatch, results while
        // verifying, picks while empty, ...) is a no-op.
        (state, _) => (state, None),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_protocol::types::ItemId;

    fn item(id: &str, sku: &str, name: &str, quantity: u32) -> InventoryItem {
        InventoryItem {
            id: ItemId::from(id),
            sku: sku.to_string(),
            name: name.to_string(),
            quantity,
            min_stock_level: 2,
            price: 9.99,
        }
    }

    fn verifying(quantity: u32, entered: &str) -> SessionState {
        SessionState::Verifying {
            item: item("itm-1", "SHI-BLA-LX-052", "Black Shirt", quantity),
            entered_count: entered.to_string(),
            pending: None,
        }
    }

    #[test]
    fn test_derive_intent_no_op() {
        let intent = derive_intent(10, 10);
        assert_eq!(intent.kind, MutationKind::NoOp);
        assert_eq!(intent.quantity, 0);
        assert_eq!(intent.reason, ReasonCode::Recount);
    }

    #[test]
    fn test_derive_intent_surplus() {
        let intent = derive_intent(10, 13);
        assert_eq!(intent.kind, MutationKind::AddStock);
        assert_eq!(intent.quantity, 3);
        assert_eq!(intent.note, "found 3 extra units");
    }

    #[test]
    fn test_derive_intent_shortfall() {
        let intent = derive_intent(10, 7);
        assert_eq!(intent.kind, MutationKind::DeductStock);
        assert_eq!(intent.quantity, 3);
        assert_eq!(intent.note, "missing 3 units");
    }

    #[test]
    fn test_search_is_case_insensitive_and_capped() {
        let items: Vec<InventoryItem> = (0..8)
            .map(|i| {
                item(
                    &format!("itm-{i}"),
                    &format!("SHI-BLA-LX-{:03}", i + 1),
                    &format!("Shirt {i}"),
                    5,
                )
            })
            .collect();

        let outcome = search_inventory(&items, "SHIRT");
        assert_eq!(outcome.candidates.len(), 5);

        let outcome = search_inventory(&items, "shi-bla-lx-003");
        assert_eq!(outcome.exact_sku_matches.len(), 1);
        assert_eq!(outcome.exact_sku_matches[0].name, "Shirt 2");
    }

    #[test]
    fn test_search_empty_term_matches_nothing() {
        let items = vec![item("itm-1", "SHI-BLA-LX-052", "Black Shirt", 10)];
        assert_eq!(search_inventory(&items, "  "), SearchOutcome::default());
    }

    #[test]
    fn test_query_produces_search_effect() {
        let (state, effect) = step(
            SessionState::searching(),
            SessionEvent::QuerySubmitted("shirt".to_string()),
        );
        assert!(state.is_searching());
        assert_eq!(
            effect,
            Some(Effect::Search {
                term: "shirt".to_string(),
                source: SearchSource::Manual,
            })
        );
    }

    #[test]
    fn test_scan_with_single_exact_match_auto_selects() {
        let target = item("itm-1", "SHI-BLA-LX-052", "Black Shirt", 10);
        let outcome = SearchOutcome {
            candidates: vec![target.clone()],
            exact_sku_matches: vec![target.clone()],
        };
        let (state, effect) = step(
            SessionState::searching(),
            SessionEvent::ResultsReady {
                term: "shi-bla-lx-052".to_string(),
                source: SearchSource::Scan,
                outcome,
            },
        );
        assert_eq!(effect, None);
        match state {
            SessionState::Verifying {
                item,
                entered_count,
                pending,
            } => {
                assert_eq!(item.sku, "SHI-BLA-LX-052");
                assert_eq!(entered_count, "10");
                assert_eq!(pending, None);
            }
            other => panic!("expected Verifying, got {other:?}"),
        }
    }

    #[test]
    fn test_manual_results_never_auto_select() {
        let target = item("itm-1", "SHI-BLA-LX-052", "Black Shirt", 10);
        let outcome = SearchOutcome {
            candidates: vec![target.clone()],
            exact_sku_matches: vec![target],
        };
        let (state, _) = step(
            SessionState::searching(),
            SessionEvent::ResultsReady {
                term: "SHI-BLA-LX-052".to_string(),
                source: SearchSource::Manual,
                outcome,
            },
        );
        assert!(state.is_searching());
    }

    #[test]
    fn test_no_matches_is_notified() {
        let (state, effect) = step(
            SessionState::searching(),
            SessionEvent::ResultsReady {
                term: "zzz".to_string(),
                source: SearchSource::Scan,
                outcome: SearchOutcome::default(),
            },
        );
        assert!(state.is_searching());
        assert_eq!(
            effect,
            Some(Effect::Notify(Notice::NoMatches {
                term: "zzz".to_string()
            }))
        );
    }

    #[test]
    fn test_pick_preseeds_recorded_quantity() {
        let target = item("itm-1", "SHI-BLA-LX-052", "Black Shirt", 10);
        let state = SessionState::Searching {
            query: "shirt".to_string(),
            candidates: vec![target.clone()],
        };
        let (state, effect) = step(state, SessionEvent::CandidatePicked(target.id));
        assert_eq!(effect, None);
        assert!(state.can_submit());
        match state {
            SessionState::Verifying { entered_count, .. } => assert_eq!(entered_count, "10"),
            other => panic!("expected Verifying, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_delta_verifies_and_resets() {
        let (state, effect) = step(verifying(10, "10"), SessionEvent::SubmitPressed);
        assert_eq!(state, SessionState::searching());
        assert_eq!(
            effect,
            Some(Effect::Notify(Notice::CountVerified {
                sku: "SHI-BLA-LX-052".to_string()
            }))
        );
    }

    #[test]
    fn test_surplus_dispatches_add_stock() {
        let (state, effect) = step(verifying(10, "13"), SessionEvent::SubmitPressed);
        assert!(state.is_dispatching());
        match effect {
            Some(Effect::Dispatch { intent, .. }) => {
                assert_eq!(intent.kind, MutationKind::AddStock);
                assert_eq!(intent.quantity, 3);
            }
            other => panic!("expected Dispatch, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_count_disables_submit() {
        for entered in ["", "  ", "ten", "-3", "1.5"] {
            let state = verifying(10, entered);
            assert!(!state.can_submit(), "count {entered:?} must disable submit");
            let (state, effect) = step(state, SessionEvent::SubmitPressed);
            assert!(state.is_verifying());
            assert_eq!(effect, None);
        }
    }

    #[test]
    fn test_submit_is_ignored_while_dispatching() {
        let (state, _) = step(verifying(10, "13"), SessionEvent::SubmitPressed);
        let (state, effect) = step(state, SessionEvent::SubmitPressed);
        assert!(state.is_dispatching());
        assert_eq!(effect, None, "no second dispatch while one is in flight");
    }

    #[test]
    fn test_cancel_is_ignored_while_dispatching() {
        let (state, _) = step(verifying(10, "7"), SessionEvent::SubmitPressed);
        let (state, effect) = step(state, SessionEvent::Cancelled);
        assert!(state.is_dispatching());
        assert_eq!(effect, None);
    }

    #[test]
    fn test_dispatch_success_notifies_and_resets() {
        let (state, _) = step(verifying(10, "7"), SessionEvent::SubmitPressed);
        let (state, effect) = step(state, SessionEvent::DispatchSucceeded);
        assert_eq!(state, SessionState::searching());
        assert_eq!(
            effect,
            Some(Effect::Notify(Notice::StockAdjusted {
                sku: "SHI-BLA-LX-052".to_string(),
                kind: MutationKind::DeductStock,
                quantity: 3,
            }))
        );
    }

    #[test]
    fn test_dispatch_failure_keeps_fields_for_retry() {
        let (state, _) = step(verifying(10, "13"), SessionEvent::SubmitPressed);
        let (state, effect) = step(
            state,
            SessionEvent::DispatchFailed("store unavailable".to_string()),
        );
        assert_eq!(
            effect,
            Some(Effect::Notify(Notice::DispatchFailed {
                message: "store unavailable".to_string()
            }))
        );
        match &state {
            SessionState::Verifying {
                entered_count,
                pending,
                ..
            } => {
                assert_eq!(entered_count, "13");
                assert_eq!(*pending, None);
            }
            other => panic!("expected Verifying, got {other:?}"),
        }
        assert!(state.can_submit(), "retry must be possible");
    }

    #[test]
    fn test_session_state_serde_roundtrip() {
        let state = verifying(10, "13");
        let encoded = serde_json::to_string(&state).unwrap();
        let decoded: SessionState = serde_json::from_str(&encoded).unwrap();
        assert_eq!(state, decoded);
    }

    #[test]
    fn test_cancel_clears_without_mutation() {
        let (state, effect) = step(verifying(10, "13"), SessionEvent::Cancelled);
        assert_eq!(state, SessionState::searching());
        assert_eq!(effect, None);
    }
}
