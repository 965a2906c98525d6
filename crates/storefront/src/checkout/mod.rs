//! Checkout flow: a three-phase state machine over the session cart.
//!
//! Phases run `Form -> Processing -> Success`; there is no failure phase
//! because the payment step is simulated and always succeeds. Submitting the
//! form freezes the cart snapshot and the form values, then schedules the
//! completion transition after a fixed delay. The live cart is never read
//! again after capture, so mutations during the delay cannot affect the
//! order; on completion the order summary and its totals are built from the
//! frozen snapshot and the cart is cleared.
//!
//! The scheduled transition keeps an abort handle and [`CheckoutFlow::cancel`]
//! exists as an extension for tests and future use - the original flow
//! offers no cancellation, and no route exposes it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use bramble_core::{CartState, CheckoutForm, OrderSummary, compute_totals};

use crate::cart::CartStore;

/// Fixed duration of the simulated payment step.
pub const PAYMENT_PROCESSING_DELAY: Duration = Duration::from_millis(3000);

/// The observable phase of a checkout flow.
#[derive(Debug, Clone)]
pub enum CheckoutPhase {
    /// Collecting form input. Initial phase.
    Form,
    /// Simulated payment in progress; completion is already scheduled.
    Processing,
    /// Terminal for this flow instance; holds the immutable order summary.
    Success(Arc<OrderSummary>),
}

impl CheckoutPhase {
    /// Whether this is the `Processing` phase.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }
}

/// Outcome of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Transitioned to `Processing`; completion is scheduled.
    Started,
    /// The cart was empty; nothing happened.
    EmptyCart,
    /// A flow is already in `Processing` or `Success`; nothing happened.
    AlreadyInFlight,
}

/// Handle to the session checkout flow.
///
/// Cheaply cloneable; all clones share one state machine.
#[derive(Clone)]
pub struct CheckoutFlow {
    inner: Arc<FlowInner>,
}

struct FlowInner {
    cart: CartStore,
    delay: Duration,
    state: Mutex<FlowState>,
}

struct FlowState {
    phase: CheckoutPhase,
    pending: Option<AbortHandle>,
}

impl CheckoutFlow {
    /// Create a flow over the given cart with the production payment delay.
    #[must_use]
    pub fn new(cart: CartStore) -> Self {
        Self::with_delay(cart, PAYMENT_PROCESSING_DELAY)
    }

    /// Create a flow with a custom payment delay.
    #[must_use]
    pub fn with_delay(cart: CartStore, delay: Duration) -> Self {
        Self {
            inner: Arc::new(FlowInner {
                cart,
                delay,
                state: Mutex::new(FlowState {
                    phase: CheckoutPhase::Form,
                    pending: None,
                }),
            }),
        }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        self.inner.lock().phase.clone()
    }

    /// Submit the checkout form.
    ///
    /// Captures the cart snapshot, its totals, and the form values at this
    /// instant, transitions to `Processing`, and schedules the completion
    /// transition after the payment delay. The cart itself is not mutated
    /// until completion, which clears it.
    ///
    /// Must run inside a tokio runtime (it spawns the completion task).
    pub fn submit(&self, form: CheckoutForm) -> SubmitOutcome {
        let snapshot = self.inner.cart.state();
        if snapshot.is_empty() {
            return SubmitOutcome::EmptyCart;
        }

        let mut state = self.inner.lock();
        if !matches!(state.phase, CheckoutPhase::Form) {
            return SubmitOutcome::AlreadyInFlight;
        }

        state.phase = CheckoutPhase::Processing;
        debug!(items = snapshot.items.len(), "checkout submitted, payment simulation started");

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.complete(snapshot, form);
        });
        state.pending = Some(task.abort_handle());

        SubmitOutcome::Started
    }

    /// Abort a scheduled completion and return to the form.
    ///
    /// Extension beyond the original flow, which cannot cancel once
    /// processing starts. Returns whether a pending completion was aborted.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.lock();
        let Some(pending) = state.pending.take() else {
            return false;
        };
        pending.abort();
        state.phase = CheckoutPhase::Form;
        debug!("checkout payment simulation cancelled");
        true
    }

    /// Start a fresh flow after a completed one.
    ///
    /// Re-entering checkout after `Success` begins again at `Form` (where
    /// the empty-cart guard applies, the cart having been cleared). A flow
    /// in `Processing` is left alone - its completion always runs.
    pub fn reset_if_complete(&self) {
        let mut state = self.inner.lock();
        if matches!(state.phase, CheckoutPhase::Success(_)) {
            state.phase = CheckoutPhase::Form;
            state.pending = None;
        }
    }
}

impl FlowInner {
    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Finish the flow: build the order from the frozen snapshot, clear the
    /// cart, and enter `Success`.
    fn complete(&self, snapshot: CartState, form: CheckoutForm) {
        let totals = compute_totals(&snapshot.items);
        let order_id = generate_order_id();
        let summary = OrderSummary::build(order_id, snapshot.items, &totals, &form);
        info!(order_id = %summary.order_id, "order confirmed");

        self.cart.clear();

        let mut state = self.lock();
        state.phase = CheckoutPhase::Success(Arc::new(summary));
        state.pending = None;
    }
}

/// Length of the random order ID suffix.
const ORDER_ID_SUFFIX_LEN: usize = 9;

/// Generate an order ID: `ORD-<unix millis>-<9 uppercase alphanumerics>`.
///
/// The timestamp plus 9 random characters make collisions practically
/// impossible for this single-session flow.
#[must_use]
pub fn generate_order_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(ORDER_ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("ORD-{millis}-{suffix}")
}
