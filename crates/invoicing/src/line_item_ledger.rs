//! Line-item ledger with optimistic remote persistence.
//!
//! [`LineItemLedger`] owns the [`Ledger`], the [`EditSession`] and the captured
//! header. Every intent is mirrored to the injected [`RemoteLedgerGateway`];
//! when the remote call fails the mutation is committed locally anyway, so the
//! clerk's input is never lost. Remote failures go to the log and to
//! [`ConnectivityState`], never to the outcome the presentation layer sees.
//!
//! Pipeline for a submitted line item:
//! 1. normalize + parse numeric fields (invalid input is rejected here)
//! 2. resolve create vs update from the edit session
//! 3. call the gateway
//! 4. commit the canonical item on success, the local item on failure
//! 5. recompute the total, clear the edit session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;

use invoicepad_core::{DomainError, LineItemId};

use crate::connectivity::{Connectivity, ConnectivityState};
use crate::edit_session::EditSession;
use crate::gateway::RemoteLedgerGateway;
use crate::header::HeaderInfo;
use crate::ledger::{Ledger, LedgerSnapshot};
use crate::line_item::{LineItem, LineItemFields, RawLineItemFields};

/// Errors returned to the presentation layer.
///
/// Remote failures are deliberately absent: they never block an intent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Field-level input problem; nothing was committed.
    #[error("invalid line item: {0}")]
    Validation(DomainError),

    #[error("line item {0} not found")]
    NotFound(LineItemId),

    /// A gateway call is already in flight.
    #[error("another submission is in progress")]
    SubmissionInProgress,

    #[error(transparent)]
    Invariant(DomainError),
}

impl LedgerError {
    /// Offending form field, if this is a validation failure.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            LedgerError::Validation(err) => err.field(),
            _ => None,
        }
    }
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { .. } => Self::Validation(err),
            other => Self::Invariant(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Created,
    Updated,
}

/// Result of an intent, as shown to the clerk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Drives the transient "saved" notification.
    pub completed: bool,
    pub snapshot: LedgerSnapshot,
}

/// Result of a line item submission.
///
/// The presentation layer should reset its pending form values on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub kind: IntentKind,
    pub item: LineItem,
    pub completed: bool,
    pub snapshot: LedgerSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Intent {
    Create,
    Update(LineItemId),
}

impl Intent {
    fn kind(&self) -> IntentKind {
        match self {
            Intent::Create => IntentKind::Created,
            Intent::Update(_) => IntentKind::Updated,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Update(_) => "update",
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    ledger: Ledger,
    session: EditSession,
    header: Option<HeaderInfo>,
    connectivity: Connectivity,
}

/// Claims the single in-flight slot; released on drop.
struct SubmissionGuard<'a>(&'a AtomicBool);

impl<'a> SubmissionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, LedgerError> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| Self(flag))
            .map_err(|_| LedgerError::SubmissionInProgress)
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The invoice line-item state machine.
pub struct LineItemLedger<G> {
    gateway: G,
    state: Mutex<LedgerState>,
    in_flight: AtomicBool,
}

impl<G: RemoteLedgerGateway> LineItemLedger<G> {
    /// Empty ledger backed by `gateway`.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: Mutex::new(LedgerState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.lock_state().ledger.snapshot()
    }

    pub fn items(&self) -> Vec<LineItem> {
        self.lock_state().ledger.items().to_vec()
    }

    pub fn total(&self) -> u128 {
        self.lock_state().ledger.total()
    }

    /// Id of the item currently being edited.
    pub fn editing(&self) -> Option<LineItemId> {
        self.lock_state().session.target().cloned()
    }

    pub fn header(&self) -> Option<HeaderInfo> {
        self.lock_state().header.clone()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.lock_state().connectivity.state()
    }

    pub fn local_only_commits(&self) -> u64 {
        self.lock_state().connectivity.local_only_commits()
    }

    /// True while a gateway call is in flight.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Replace the ledger with the remote store's contents.
    ///
    /// On failure the current ledger is kept and `completed` is false.
    pub async fn hydrate(&self) -> Result<Outcome, LedgerError> {
        let _submission = SubmissionGuard::acquire(&self.in_flight)?;

        let fetched = self.gateway.fetch_all().await;

        let mut state = self.lock_state();
        let completed = match fetched {
            Ok(items) => {
                mark_online(&mut state.connectivity);
                match Ledger::from_items(items) {
                    Ok(ledger) => {
                        tracing::info!("Hydrated ledger with {} line items", ledger.len());
                        state.ledger = ledger;
                        let dangling = state
                            .session
                            .target()
                            .is_some_and(|id| !state.ledger.contains(id));
                        if dangling {
                            state.session.clear();
                        }
                        true
                    }
                    Err(err) => {
                        tracing::warn!("Remote line items rejected, keeping local ledger: {}", err);
                        false
                    }
                }
            }
            Err(err) => {
                tracing::warn!("Failed to fetch line items, keeping local ledger: {}", err);
                state.connectivity.set_offline();
                false
            }
        };

        Ok(Outcome {
            completed,
            snapshot: state.ledger.snapshot(),
        })
    }

    /// Capture invoice header metadata and emit it.
    pub fn submit_header(&self, header: HeaderInfo) -> Outcome {
        let header = header.normalized();
        tracing::info!(
            customer = %header.customer_name,
            invoice_number = %header.invoice_number,
            date = %header.formatted_date(),
            detail = %header.detail,
            "Invoice header captured"
        );

        let mut state = self.lock_state();
        state.header = Some(header);
        Outcome {
            completed: true,
            snapshot: state.ledger.snapshot(),
        }
    }

    /// Submit the form as typed by the clerk.
    pub async fn submit_line_item(
        &self,
        raw: &RawLineItemFields,
    ) -> Result<SubmitOutcome, LedgerError> {
        let fields = raw.parse()?;
        self.submit_fields(fields).await
    }

    /// Submit already-typed fields: update if an edit is active, else create.
    pub async fn submit_fields(&self, fields: LineItemFields) -> Result<SubmitOutcome, LedgerError> {
        fields.validate()?;
        let _submission = SubmissionGuard::acquire(&self.in_flight)?;

        let intent = {
            let state = self.lock_state();
            match state.session.target() {
                Some(id) if state.ledger.contains(id) => Intent::Update(id.clone()),
                Some(id) => return Err(LedgerError::NotFound(id.clone())),
                None => Intent::Create,
            }
        };

        let local = match &intent {
            Intent::Create => LineItem::from_fields(LineItemId::provisional(), fields),
            Intent::Update(id) => LineItem::from_fields(id.clone(), fields),
        };

        tracing::debug!("Mirroring {} of line item {}", intent.verb(), local.id);
        let remote = match &intent {
            Intent::Create => self.gateway.create(&local).await,
            Intent::Update(id) => self.gateway.update(id, &local).await,
        };

        let mut state = self.lock_state();
        let item = match remote {
            Ok(canonical) => {
                mark_online(&mut state.connectivity);
                reconcile(&intent, &state.ledger, local, canonical)
            }
            Err(err) => {
                tracing::warn!(
                    "Remote {} of line item {} failed, committing locally: {}",
                    intent.verb(),
                    local.id,
                    err
                );
                state.connectivity.record_fallback();
                local
            }
        };

        match &intent {
            Intent::Create => state.ledger.append(item.clone())?,
            Intent::Update(id) => state.ledger.replace(id, item.clone())?,
        }
        state.session.clear();

        tracing::info!(
            "Line item {} {} (total: {})",
            item.id,
            match intent.kind() {
                IntentKind::Created => "created",
                IntentKind::Updated => "updated",
            },
            state.ledger.total()
        );

        Ok(SubmitOutcome {
            kind: intent.kind(),
            item,
            completed: true,
            snapshot: state.ledger.snapshot(),
        })
    }

    /// Start editing `id`; returns the fields to pre-populate the form with.
    pub fn begin_edit(&self, id: &LineItemId) -> Result<RawLineItemFields, LedgerError> {
        let _submission = SubmissionGuard::acquire(&self.in_flight)?;

        let mut state = self.lock_state();
        let prefill = state
            .ledger
            .get(id)
            .map(RawLineItemFields::from)
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        state.session.begin(id.clone());
        Ok(prefill)
    }

    /// Abandon the current edit, if any.
    pub fn cancel_edit(&self) {
        self.lock_state().session.clear();
    }

    /// Remove `id` locally, then mirror the delete remotely (best-effort).
    pub async fn delete_item(&self, id: &LineItemId) -> Result<Outcome, LedgerError> {
        let _submission = SubmissionGuard::acquire(&self.in_flight)?;

        {
            let mut state = self.lock_state();
            if state.ledger.remove(id).is_none() {
                return Err(LedgerError::NotFound(id.clone()));
            }
            if state.session.is_targeting(id) {
                state.session.clear();
            }
        }

        let remote = self.gateway.delete(id).await;

        let mut state = self.lock_state();
        match remote {
            Ok(()) => mark_online(&mut state.connectivity),
            Err(err) => {
                tracing::warn!("Remote delete of line item {} failed, removed locally: {}", id, err);
                state.connectivity.record_fallback();
            }
        }
        tracing::info!("Line item {} deleted (total: {})", id, state.ledger.total());

        Ok(Outcome {
            completed: true,
            snapshot: state.ledger.snapshot(),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn mark_online(connectivity: &mut Connectivity) {
    if connectivity.is_offline() {
        tracing::info!(
            "Remote store reachable again ({} local-only commits)",
            connectivity.local_only_commits()
        );
    }
    connectivity.set_online();
}

/// Pick the item to commit after a successful remote call.
///
/// The remote item wins, except that an update never changes identity and a
/// create falls back to the provisional id when the remote one is missing or
/// already taken.
fn reconcile(intent: &Intent, ledger: &Ledger, local: LineItem, canonical: LineItem) -> LineItem {
    if let Err(err) = canonical.fields().validate() {
        tracing::warn!("Remote returned an invalid line item, keeping local values: {}", err);
        return local;
    }

    match intent {
        Intent::Update(id) => {
            if !canonical.id.is_empty() && &canonical.id != id {
                tracing::warn!("Remote changed id of line item {} to {}; keeping {}", id, canonical.id, id);
            }
            LineItem {
                id: id.clone(),
                ..canonical
            }
        }
        Intent::Create if canonical.id.is_empty() => LineItem {
            id: local.id,
            ..canonical
        },
        Intent::Create if ledger.contains(&canonical.id) => {
            tracing::warn!(
                "Remote id {} already present in ledger; keeping provisional id {}",
                canonical.id,
                local.id
            );
            LineItem {
                id: local.id,
                ..canonical
            }
        }
        Intent::Create => canonical,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::gateway::{GatewayError, InMemoryLedgerGateway};

    fn widget(quantity: &str) -> RawLineItemFields {
        RawLineItemFields::new("Widget", quantity, "1000", "")
    }

    fn new_ledger() -> (Arc<InMemoryLedgerGateway>, LineItemLedger<Arc<InMemoryLedgerGateway>>) {
        let gateway = Arc::new(InMemoryLedgerGateway::new());
        let ledger = LineItemLedger::new(gateway.clone());
        (gateway, ledger)
    }

    #[tokio::test]
    async fn failed_create_still_commits_one_item() {
        let (gateway, ledger) = new_ledger();
        gateway.set_failing(true);

        let outcome = ledger.submit_line_item(&widget("2")).await.unwrap();

        assert!(outcome.completed);
        assert_eq!(outcome.kind, IntentKind::Created);
        assert_eq!(outcome.snapshot.items.len(), 1);
        assert_eq!(outcome.snapshot.total, 2000);
        let item = &outcome.snapshot.items[0];
        assert_eq!(item.product_name, "Widget");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit_price, 1000);
        assert!(!item.id.is_empty());

        assert_eq!(ledger.connectivity(), ConnectivityState::Offline);
        assert_eq!(ledger.local_only_commits(), 1);
        assert!(gateway.stored().is_empty());
    }

    #[tokio::test]
    async fn successful_update_replaces_in_place() {
        let (_gateway, ledger) = new_ledger();
        for q in ["1", "2", "3"] {
            ledger.submit_line_item(&widget(q)).await.unwrap();
        }
        let before = ledger.items();
        let target = before[1].id.clone();

        let prefill = ledger.begin_edit(&target).unwrap();
        assert_eq!(prefill.quantity, "2");

        let outcome = ledger
            .submit_line_item(&RawLineItemFields::new("Gadget", "7", "10", "resized"))
            .await
            .unwrap();

        assert_eq!(outcome.kind, IntentKind::Updated);
        let after = ledger.items();
        assert_eq!(after.len(), 3);
        assert_eq!(after[1].id, target);
        assert_eq!(after[1].product_name, "Gadget");
        assert_eq!(after[1].detail.as_deref(), Some("resized"));
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert_eq!(ledger.total(), 1000 + 70 + 3000);
        assert_eq!(ledger.editing(), None);
        assert_eq!(ledger.connectivity(), ConnectivityState::Online);
    }

    #[tokio::test]
    async fn deleting_edit_target_clears_session() {
        let (_gateway, ledger) = new_ledger();
        let created = ledger.submit_line_item(&widget("1")).await.unwrap().item;

        ledger.begin_edit(&created.id).unwrap();
        assert_eq!(ledger.editing(), Some(created.id.clone()));

        ledger.delete_item(&created.id).await.unwrap();
        assert_eq!(ledger.editing(), None);

        // The next submission is a create, not an update of a dangling id.
        let outcome = ledger.submit_line_item(&widget("4")).await.unwrap();
        assert_eq!(outcome.kind, IntentKind::Created);
    }

    #[tokio::test]
    async fn deleting_another_item_keeps_session() {
        let (_gateway, ledger) = new_ledger();
        let a = ledger.submit_line_item(&widget("1")).await.unwrap().item;
        let b = ledger.submit_line_item(&widget("2")).await.unwrap().item;

        ledger.begin_edit(&a.id).unwrap();
        ledger.delete_item(&b.id).await.unwrap();
        assert_eq!(ledger.editing(), Some(a.id));
    }

    #[tokio::test]
    async fn create_update_delete_scenario_through_fallback() {
        let (gateway, ledger) = new_ledger();

        gateway.set_failing(true);
        let created = ledger.submit_line_item(&widget("2")).await.unwrap();
        assert_eq!(ledger.items().len(), 1);
        assert_eq!(ledger.total(), 2000);

        // The item only exists locally, so the remote update answers 404 and
        // the update is committed through the fallback path.
        gateway.set_failing(false);
        ledger.begin_edit(&created.item.id).unwrap();
        let updated = ledger.submit_line_item(&widget("5")).await.unwrap();
        assert_eq!(updated.item.id, created.item.id);
        assert_eq!(ledger.total(), 5000);

        ledger.delete_item(&created.item.id).await.unwrap();
        assert!(ledger.items().is_empty());
        assert_eq!(ledger.total(), 0);
    }

    #[tokio::test]
    async fn create_update_delete_scenario_with_reachable_store() {
        let (gateway, ledger) = new_ledger();

        let created = ledger.submit_line_item(&widget("2")).await.unwrap();
        assert_eq!(ledger.total(), 2000);

        ledger.begin_edit(&created.item.id).unwrap();
        let updated = ledger.submit_line_item(&widget("5")).await.unwrap();
        assert_eq!(updated.kind, IntentKind::Updated);
        assert_eq!(updated.item.id, created.item.id);
        assert_eq!(ledger.total(), 5000);
        assert_eq!(gateway.stored(), ledger.items());
        assert_eq!(ledger.local_only_commits(), 0);

        ledger.delete_item(&created.item.id).await.unwrap();
        assert!(ledger.items().is_empty());
        assert_eq!(ledger.total(), 0);
        assert!(gateway.stored().is_empty());
        assert_eq!(ledger.connectivity(), ConnectivityState::Online);
    }

    #[tokio::test]
    async fn update_mirrors_to_remote_when_item_is_known() {
        let (gateway, ledger) = new_ledger();
        let created = ledger.submit_line_item(&widget("2")).await.unwrap().item;

        ledger.begin_edit(&created.id).unwrap();
        ledger.submit_line_item(&widget("5")).await.unwrap();

        assert_eq!(gateway.stored()[0].quantity, 5);
        assert_eq!(ledger.local_only_commits(), 0);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_gateway() {
        let (gateway, ledger) = new_ledger();
        ledger.submit_line_item(&widget("1")).await.unwrap();
        let target = ledger.items()[0].id.clone();
        ledger.begin_edit(&target).unwrap();
        let calls = gateway.calls();

        let err = ledger
            .submit_line_item(&RawLineItemFields::new("Widget", "abc", "1000", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(err.field(), Some("quantity"));
        assert_eq!(gateway.calls(), calls);
        assert_eq!(ledger.total(), 1000);
        assert_eq!(ledger.editing(), Some(target));
    }

    #[tokio::test]
    async fn server_assigned_id_replaces_provisional_id() {
        let gateway = Arc::new(InMemoryLedgerGateway::assigning_ids());
        let ledger = LineItemLedger::new(gateway.clone());

        let outcome = ledger.submit_line_item(&widget("1")).await.unwrap();
        assert_eq!(outcome.item.id.as_str(), "srv-1");
        assert_eq!(ledger.items()[0].id.as_str(), "srv-1");
    }

    /// Gateway that answers every write with a different id.
    struct RenamingGateway;

    #[async_trait]
    impl RemoteLedgerGateway for RenamingGateway {
        async fn fetch_all(&self) -> Result<Vec<LineItem>, GatewayError> {
            Ok(Vec::new())
        }

        async fn create(&self, item: &LineItem) -> Result<LineItem, GatewayError> {
            Ok(LineItem {
                id: LineItemId::from("renamed"),
                ..item.clone()
            })
        }

        async fn update(&self, _id: &LineItemId, item: &LineItem) -> Result<LineItem, GatewayError> {
            Ok(LineItem {
                id: LineItemId::from("renamed-again"),
                quantity: item.quantity + 1,
                ..item.clone()
            })
        }

        async fn delete(&self, _id: &LineItemId) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn update_never_changes_identity() {
        let ledger = LineItemLedger::new(RenamingGateway);
        let created = ledger.submit_line_item(&widget("1")).await.unwrap().item;
        assert_eq!(created.id.as_str(), "renamed");

        ledger.begin_edit(&created.id).unwrap();
        let updated = ledger.submit_line_item(&widget("2")).await.unwrap().item;

        // Canonical fields are committed, the id is not.
        assert_eq!(updated.id.as_str(), "renamed");
        assert_eq!(updated.quantity, 3);
        assert_eq!(ledger.total(), 3000);

        // A second create colliding on "renamed" keeps its provisional id.
        let second = ledger.submit_line_item(&widget("1")).await.unwrap().item;
        assert_ne!(second.id.as_str(), "renamed");
        assert_eq!(ledger.items().len(), 2);
    }

    /// Gateway whose create blocks until released.
    struct GatedGateway {
        gate: Notify,
        inner: InMemoryLedgerGateway,
    }

    #[async_trait]
    impl RemoteLedgerGateway for GatedGateway {
        async fn fetch_all(&self) -> Result<Vec<LineItem>, GatewayError> {
            self.inner.fetch_all().await
        }

        async fn create(&self, item: &LineItem) -> Result<LineItem, GatewayError> {
            self.gate.notified().await;
            self.inner.create(item).await
        }

        async fn update(&self, id: &LineItemId, item: &LineItem) -> Result<LineItem, GatewayError> {
            self.inner.update(id, item).await
        }

        async fn delete(&self, id: &LineItemId) -> Result<(), GatewayError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn concurrent_submission_is_rejected() {
        let ledger = Arc::new(LineItemLedger::new(GatedGateway {
            gate: Notify::new(),
            inner: InMemoryLedgerGateway::new(),
        }));

        let first = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.submit_line_item(&widget("1")).await })
        };
        while !ledger.is_submitting() {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            ledger.submit_line_item(&widget("2")).await.unwrap_err(),
            LedgerError::SubmissionInProgress
        );
        assert_eq!(
            ledger.delete_item(&"x".into()).await.unwrap_err(),
            LedgerError::SubmissionInProgress
        );
        assert_eq!(
            ledger.begin_edit(&"x".into()).unwrap_err(),
            LedgerError::SubmissionInProgress
        );
        assert_eq!(
            ledger.hydrate().await.unwrap_err(),
            LedgerError::SubmissionInProgress
        );
        assert!(ledger.items().is_empty());
        assert_eq!(ledger.editing(), None);

        ledger.gateway().gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(!ledger.is_submitting());
        assert_eq!(ledger.items().len(), 1);
    }

    #[tokio::test]
    async fn hydrate_loads_remote_items() {
        let stored = LineItem {
            id: LineItemId::from("1"),
            product_name: "Example".into(),
            quantity: 1,
            unit_price: 1000,
            detail: Some("Sample product".into()),
        };
        let gateway = Arc::new(InMemoryLedgerGateway::with_items(vec![stored.clone()]));
        let ledger = LineItemLedger::new(gateway.clone());

        let outcome = ledger.hydrate().await.unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.snapshot.items, vec![stored]);
        assert_eq!(outcome.snapshot.total, 1000);
    }

    #[tokio::test]
    async fn failed_hydrate_keeps_local_ledger() {
        let (gateway, ledger) = new_ledger();
        ledger.submit_line_item(&widget("3")).await.unwrap();
        gateway.set_failing(true);

        let outcome = ledger.hydrate().await.unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.snapshot.total, 3000);
        assert_eq!(ledger.connectivity(), ConnectivityState::Offline);
    }

    #[tokio::test]
    async fn hydrate_rejects_duplicate_remote_ids() {
        let remote = LineItem {
            id: LineItemId::from("1"),
            product_name: "Example".into(),
            quantity: 1,
            unit_price: 1000,
            detail: None,
        };
        let gateway = Arc::new(InMemoryLedgerGateway::with_items(vec![
            remote.clone(),
            LineItem {
                quantity: 4,
                ..remote
            },
        ]));
        let ledger = LineItemLedger::new(gateway.clone());
        gateway.set_failing(true);
        let local = ledger.submit_line_item(&widget("3")).await.unwrap().item;
        gateway.set_failing(false);

        let outcome = ledger.hydrate().await.unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.snapshot.items, vec![local]);
        assert_eq!(outcome.snapshot.total, 3000);
    }

    #[tokio::test]
    async fn delete_is_mirrored_and_masks_failures() {
        let (gateway, ledger) = new_ledger();
        let a = ledger.submit_line_item(&widget("1")).await.unwrap().item;
        let b = ledger.submit_line_item(&widget("2")).await.unwrap().item;

        ledger.delete_item(&a.id).await.unwrap();
        assert_eq!(gateway.stored(), vec![b.clone()]);

        gateway.set_failing(true);
        let outcome = ledger.delete_item(&b.id).await.unwrap();
        assert!(outcome.completed);
        assert!(outcome.snapshot.items.is_empty());
        assert_eq!(ledger.connectivity(), ConnectivityState::Offline);
        assert_eq!(gateway.stored().len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (_gateway, ledger) = new_ledger();
        let id = LineItemId::from("ghost");
        assert_eq!(ledger.begin_edit(&id).unwrap_err(), LedgerError::NotFound(id.clone()));
        assert_eq!(
            ledger.delete_item(&id).await.unwrap_err(),
            LedgerError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn cancel_edit_routes_next_submit_to_create() {
        let (_gateway, ledger) = new_ledger();
        let a = ledger.submit_line_item(&widget("1")).await.unwrap().item;
        ledger.begin_edit(&a.id).unwrap();
        ledger.cancel_edit();
        ledger.cancel_edit();

        let outcome = ledger.submit_line_item(&widget("2")).await.unwrap();
        assert_eq!(outcome.kind, IntentKind::Created);
        assert_eq!(ledger.items().len(), 2);
    }

    #[test]
    fn header_is_captured_normalized() {
        let (_gateway, ledger) = new_ledger();
        let outcome = ledger.submit_header(HeaderInfo {
            customer_name: "Acme".into(),
            invoice_number: "۴۲".into(),
            detail: "March order".into(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 3, 9),
        });
        assert!(outcome.completed);

        let header = ledger.header().unwrap();
        assert_eq!(header.invoice_number, "42");
        assert_eq!(header.formatted_date(), "2024/03/09");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Create(u32, u32, bool),
            Update(usize, u32, u32, bool),
            Delete(usize, bool),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (any::<u32>(), any::<u32>(), any::<bool>())
                    .prop_map(|(q, p, fail)| Op::Create(q, p, fail)),
                (any::<usize>(), any::<u32>(), any::<u32>(), any::<bool>())
                    .prop_map(|(i, q, p, fail)| Op::Update(i, q, p, fail)),
                (any::<usize>(), any::<bool>()).prop_map(|(i, fail)| Op::Delete(i, fail)),
            ]
        }

        fn fields(quantity: u32, unit_price: u32) -> LineItemFields {
            LineItemFields {
                product_name: "p".into(),
                quantity: quantity.into(),
                unit_price: unit_price.into(),
                detail: None,
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: after every intent the total is the exact sum over current items,
            /// whether or not the remote call failed.
            #[test]
            fn total_is_always_the_recomputed_sum(ops in proptest::collection::vec(op(), 0..40)) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                rt.block_on(async {
                    let (gateway, ledger) = new_ledger();
                    for op in ops {
                        match op {
                            Op::Create(q, p, fail) => {
                                gateway.set_failing(fail);
                                ledger.submit_fields(fields(q, p)).await.unwrap();
                            }
                            Op::Update(i, q, p, fail) => {
                                let items = ledger.items();
                                if items.is_empty() {
                                    continue;
                                }
                                let id = items[i % items.len()].id.clone();
                                ledger.begin_edit(&id).unwrap();
                                gateway.set_failing(fail);
                                let outcome = ledger.submit_fields(fields(q, p)).await.unwrap();
                                assert_eq!(outcome.item.id, id);
                                assert_eq!(ledger.items()[i % items.len()].id, id);
                            }
                            Op::Delete(i, fail) => {
                                let items = ledger.items();
                                if items.is_empty() {
                                    continue;
                                }
                                gateway.set_failing(fail);
                                ledger.delete_item(&items[i % items.len()].id).await.unwrap();
                            }
                        }

                        let snapshot = ledger.snapshot();
                        let expected: u128 = snapshot
                            .items
                            .iter()
                            .map(|item| u128::from(item.quantity) * u128::from(item.unit_price))
                            .sum();
                        assert_eq!(snapshot.total, expected);
                    }
                });
            }
        }
    }
}
