use crate::application::engine::WorkflowEngine;
use crate::domain::invoice::InvoiceCatalog;
use crate::domain::selection::{Aggregate, Selection, incentive};
use crate::domain::workflow::{PaymentMethod, PaymentPhase, WorkflowEvent, WorkflowSnapshot};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// One user's payment session: the invoice catalog, the current selection
/// and the workflow engine behind a single API.
///
/// The engine never learns which invoices were chosen; the session hands it
/// the aggregate total at the moment payment is initiated.
pub struct PaymentSession {
    catalog: Arc<InvoiceCatalog>,
    selection: Mutex<Selection>,
    engine: WorkflowEngine,
}

impl PaymentSession {
    pub fn new(catalog: Arc<InvoiceCatalog>, engine: WorkflowEngine) -> Self {
        Self {
            catalog,
            selection: Mutex::new(Selection::new()),
            engine,
        }
    }

    pub fn catalog(&self) -> &InvoiceCatalog {
        &self.catalog
    }

    /// Flips selection of one invoice; `InvalidReference` for unknown ids.
    pub async fn toggle_invoice(&self, id: &str) -> Result<bool> {
        self.selection.lock().await.toggle_one(&self.catalog, id)
    }

    /// Selects every invoice, or clears the selection when everything was
    /// already selected.
    pub async fn toggle_all(&self) {
        self.selection.lock().await.toggle_all(&self.catalog);
    }

    /// Selected invoice ids in catalog order.
    pub async fn selected_ids(&self) -> Vec<String> {
        let selection = self.selection.lock().await;
        selection.ids(&self.catalog).map(str::to_string).collect()
    }

    /// Count and total of the current selection, recomputed on each call.
    pub async fn aggregate(&self) -> Aggregate {
        self.selection.lock().await.aggregate(&self.catalog)
    }

    /// The pay-by-bank rebate for the current method and selection.
    pub async fn incentive(&self) -> Decimal {
        let aggregate = self.aggregate().await;
        incentive(self.engine.method().await, aggregate.total)
    }

    pub async fn change_method(&self, method: PaymentMethod) -> Result<()> {
        self.engine.change_method(method).await
    }

    /// Starts the payment workflow over the selected total. Rejected when
    /// nothing is selected or an attempt is already running.
    pub async fn proceed_to_payment(&self) -> Result<()> {
        let aggregate = self.aggregate().await;
        if aggregate.count == 0 {
            return Err(PaymentError::InvalidTransition(
                "no invoices selected".to_string(),
            ));
        }
        self.engine.start(aggregate.total).await
    }

    pub async fn abort_payment(&self) -> Result<()> {
        self.engine.abort().await
    }

    pub async fn continue_waiting(&self) -> Result<()> {
        self.engine.continue_waiting().await
    }

    /// "Process another payment": resets the workflow, clears the selection
    /// and restores the default method.
    pub async fn reset(&self) {
        self.engine.reset().await;
        // The workflow is in Start after a reset, so this cannot be rejected.
        let _ = self.engine.change_method(PaymentMethod::Bank).await;
        self.selection.lock().await.clear();
    }

    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<WorkflowEvent> {
        self.engine.subscribe().await
    }

    pub async fn phase(&self) -> PaymentPhase {
        self.engine.phase().await
    }

    pub async fn method(&self) -> PaymentMethod {
        self.engine.method().await
    }

    pub async fn delay_notice_visible(&self) -> bool {
        self.engine.delay_notice_visible().await
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.engine.snapshot().await
    }
}
