//! # Terminal
//!
//! The engine facade a presentation layer binds to. Operator events come in
//! 1:1 (`on_scan`, `on_accept`, ...); rendering state goes out through
//! read-only observers. No widget knowledge lives here.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scanner/buttons ──► on_*() ──► classify ──► Session / CardController   │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │  widgets ◄── observers (invoice, total, mode, notification) ◄── state   │
//! │                                                                         │
//! │  COMMIT:  settle (debit + sale records, all or nothing)                 │
//! │             ├── ok  ──► success message, input locked, auto-reset armed │
//! │             └── insufficient ──► error message, session untouched       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking Discipline
//! All mutable state sits in one `Arc<Mutex<_>>`. Locks are taken, mutated,
//! and released; never held across an `.await`. Ledger calls work on
//! snapshots taken under the lock. Timer callbacks take the same lock and
//! verify their [`ArmToken`](crate::notify::ArmToken) before touching
//! anything, so a reset that already happened makes a late firing a no-op.
//!
//! Recoverable problems (unknown barcode, empty scan, overdrawn card) never
//! escape: they become error notifications and leave the session consistent.
//! Only ledger backend faults propagate, unchanged, for the embedding
//! application to treat as fatal.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, info};

use keg_core::{
    classify, ActiveCard, CoreError, Money, ScanAction, Session, TerminalConfig, TopUpSession,
};

use crate::cards::{CardController, CardError};
use crate::ledger::{Ledger, LedgerError};
use crate::notify::{Notifier, NotificationView, Severity, TimerSlot};

// =============================================================================
// Observer Views
// =============================================================================

/// Settlement mode as shown in the mode label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeView {
    Cash,
    Card { barcode: String, credit: Money },
}

impl fmt::Display for ModeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeView::Cash => write!(f, "Payment in cash"),
            ModeView::Card { barcode, credit } => {
                write!(f, "Card {}, credit {}", barcode, credit)
            }
        }
    }
}

/// One rendered invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub name: String,
    pub price: Money,
}

/// Snapshot of everything the main screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceView {
    pub lines: Vec<InvoiceLine>,
    pub total: Money,
    pub is_member: bool,
    pub mode: ModeView,
    /// True during the post-commit display, while scans and accepts are
    /// ignored and the auto-reset is pending.
    pub input_locked: bool,
}

/// Snapshot of the top-up dialog state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopUpView {
    pub card: Option<ActiveCard>,
    pub amount: Money,
}

// =============================================================================
// Terminal
// =============================================================================

#[derive(Debug, Default)]
struct TerminalState {
    session: Session,
    topup: TopUpSession,
    input_locked: bool,
}

/// One register: session state, card controller, notifier, timers.
///
/// Methods must be called from within a Tokio runtime; the two timer
/// classes spawn their tasks on it.
#[derive(Debug)]
pub struct Terminal<L: Ledger> {
    ledger: Arc<L>,
    cards: CardController<L>,
    config: TerminalConfig,
    state: Arc<Mutex<TerminalState>>,
    notifier: Notifier,
    reset_timer: TimerSlot,
}

impl<L: Ledger> Terminal<L> {
    pub fn new(ledger: Arc<L>, config: TerminalConfig) -> Self {
        let notifier = Notifier::new(config.notify_duration);
        Terminal {
            cards: CardController::new(Arc::clone(&ledger)),
            ledger,
            config,
            state: Arc::new(Mutex::new(TerminalState::default())),
            notifier,
            reset_timer: TimerSlot::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Operator events: main session
    // -------------------------------------------------------------------------

    /// Handles one scanned code from the input field.
    pub async fn on_scan(&self, code: &str) -> Result<(), LedgerError> {
        if self.input_locked() {
            debug!(%code, "scan ignored while awaiting reset");
            return Ok(());
        }

        let action = match classify(code, &self.config) {
            Ok(action) => action,
            Err(err) => {
                self.recover(err);
                return Ok(());
            }
        };

        match action {
            ScanAction::SwitchToCash => {
                self.lock_state().session.switch_to_cash();
                self.notifier
                    .notify(Severity::Info, "Switched to cash payment.");
            }
            ScanAction::ToggleMember => self.toggle_member(),
            ScanAction::Card(barcode) => match self.cards.lookup(&barcode).await? {
                Some(card) => {
                    self.lock_state().session.attach_card(&card);
                    self.notifier.notify(
                        Severity::Info,
                        format!(
                            "Card \"{}\" has {} credit left.",
                            card.barcode, card.credit
                        ),
                    );
                }
                None => {
                    // A failed card lookup drops back to cash settlement.
                    self.lock_state().session.switch_to_cash();
                    self.recover(CoreError::UnknownCard(barcode));
                }
            },
            ScanAction::Product(barcode) => {
                match self.ledger.find_product_by_barcode(&barcode).await? {
                    Some(product) => {
                        if let Err(err) = product.validate() {
                            self.recover(err);
                            return Ok(());
                        }
                        debug!(%barcode, name = %product.name, "product added");
                        self.lock_state().session.add_item(product);
                    }
                    None => self.recover(CoreError::UnknownProduct(barcode)),
                }
            }
        }

        Ok(())
    }

    /// Flips member pricing; identical to scanning the member code.
    pub fn on_toggle_member(&self) {
        if self.input_locked() {
            debug!("toggle ignored while awaiting reset");
            return;
        }
        self.toggle_member();
    }

    /// Commits the current round.
    pub async fn on_accept(&self) -> Result<(), LedgerError> {
        if self.input_locked() {
            debug!("accept ignored while awaiting reset");
            return Ok(());
        }

        let (card, total, items, is_member) = {
            let state = self.lock_state();
            if state.session.is_empty() {
                drop(state);
                self.recover(CoreError::EmptyTransaction);
                self.lock_state().session.reset();
                return Ok(());
            }
            (
                state.session.active_card().cloned(),
                state.session.total(),
                state.session.line_items().to_vec(),
                state.session.is_member(),
            )
        };

        match self.cards.settle(card.as_ref(), total, &items, is_member).await {
            Ok(settlement) => {
                self.lock_state().input_locked = true;
                let text = match settlement.remaining_credit {
                    Some(remaining) => format!(
                        "Transaction complete. Card charged {}; {} credit left.",
                        settlement.charged, remaining
                    ),
                    None => format!(
                        "Transaction complete. Please drop {} in the cash box.",
                        settlement.charged
                    ),
                };
                self.notifier
                    .notify_for(Severity::Success, text, self.config.result_notify_duration);
                self.arm_auto_reset();
                Ok(())
            }
            Err(CardError::InsufficientCredit { balance, requested }) => {
                self.recover(CoreError::InsufficientCredit { balance, requested });
                Ok(())
            }
            Err(CardError::Ledger(err)) => Err(err),
        }
    }

    /// Resets the session to startup values.
    ///
    /// Always available, even during the post-commit display; a pending
    /// auto-reset is canceled so it cannot fire into a later round.
    pub fn on_reset(&self) {
        let mut state = self.lock_state();
        self.reset_timer.cancel();
        state.session.reset();
        state.input_locked = false;
        info!("session reset");
    }

    /// Dismisses the active notification early.
    pub fn on_dismiss(&self) {
        self.notifier.dismiss();
    }

    // -------------------------------------------------------------------------
    // Operator events: top-up dialog
    // -------------------------------------------------------------------------

    /// Handles a card scan inside the top-up dialog.
    pub async fn on_top_up_scan(&self, code: &str) -> Result<(), LedgerError> {
        if code.is_empty() {
            self.recover(CoreError::EmptyScan);
            return Ok(());
        }

        match self.cards.lookup(code).await? {
            Some(card) => {
                self.notifier.notify(
                    Severity::Info,
                    format!(
                        "Card \"{}\" has {} credit. Add the amount deposited in the cash box.",
                        card.barcode, card.credit
                    ),
                );
                self.lock_state().topup.set_card(ActiveCard::from(&card));
            }
            None => {
                self.lock_state().topup.clear_card();
                self.recover(CoreError::UnknownCard(code.to_string()));
            }
        }

        Ok(())
    }

    /// Adds one deposit step (negative steps are clamped away).
    pub fn on_top_up_add(&self, step: Money) {
        let mut state = self.lock_state();
        if state.topup.card().is_none() {
            drop(state);
            self.notifier.notify(Severity::Error, "Scan a card first.");
            return;
        }
        state.topup.add(step);
    }

    /// Commits the accumulated top-up as one positive credit delta.
    pub async fn on_top_up_commit(&self) -> Result<(), LedgerError> {
        let (card, amount) = {
            let state = self.lock_state();
            match state.topup.card() {
                Some(card) => (card.clone(), state.topup.amount()),
                None => {
                    drop(state);
                    self.notifier.notify(Severity::Error, "Scan a card first.");
                    return Ok(());
                }
            }
        };

        if amount.is_zero() {
            self.lock_state().topup.clear();
            self.notifier.notify(Severity::Info, "No deposit entered.");
            return Ok(());
        }

        match self.cards.commit(&card.id, amount).await {
            Ok(balance) => {
                self.lock_state().topup.clear();
                self.notifier.notify_for(
                    Severity::Success,
                    format!(
                        "Make sure {} is in the cash box. Card \"{}\" now has {} credit.",
                        amount, card.barcode, balance
                    ),
                    self.config.result_notify_duration,
                );
                Ok(())
            }
            // Positive deltas are unconditional; this arm guards a
            // misbehaving ledger implementation.
            Err(CardError::InsufficientCredit { balance, requested }) => {
                self.recover(CoreError::InsufficientCredit { balance, requested });
                Ok(())
            }
            Err(CardError::Ledger(err)) => Err(err),
        }
    }

    /// Discards the top-up sub-session. Nothing is written.
    pub fn on_top_up_cancel(&self) {
        self.lock_state().topup.clear();
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    /// Everything the main screen renders, as one consistent snapshot.
    pub fn invoice(&self) -> InvoiceView {
        let state = self.lock_state();
        InvoiceView {
            lines: state
                .session
                .invoice_lines()
                .into_iter()
                .map(|(name, price)| InvoiceLine { name, price })
                .collect(),
            total: state.session.total(),
            is_member: state.session.is_member(),
            mode: Self::mode_of(&state.session),
            input_locked: state.input_locked,
        }
    }

    pub fn total(&self) -> Money {
        self.lock_state().session.total()
    }

    pub fn mode(&self) -> ModeView {
        Self::mode_of(&self.lock_state().session)
    }

    pub fn is_member(&self) -> bool {
        self.lock_state().session.is_member()
    }

    pub fn input_locked(&self) -> bool {
        self.lock_state().input_locked
    }

    pub fn notification(&self) -> Option<NotificationView> {
        self.notifier.active()
    }

    pub fn top_up(&self) -> TopUpView {
        let state = self.lock_state();
        TopUpView {
            card: state.topup.card().cloned(),
            amount: state.topup.amount(),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn lock_state(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().expect("terminal state mutex poisoned")
    }

    fn mode_of(session: &Session) -> ModeView {
        match session.active_card() {
            Some(card) => ModeView::Card {
                barcode: card.barcode.clone(),
                credit: card.credit,
            },
            None => ModeView::Cash,
        }
    }

    fn toggle_member(&self) {
        let detached = self.lock_state().session.toggle_member();
        if detached {
            self.notifier
                .notify(Severity::Info, "Card detached. Switched to cash payment.");
        }
    }

    /// Single chokepoint turning recoverable errors into notifications.
    fn recover(&self, err: CoreError) {
        debug!(%err, "recovered");
        let (severity, text) = match err {
            CoreError::EmptyScan => (Severity::Error, "Scan a barcode first.".to_string()),
            CoreError::UnknownProduct(code) => (
                Severity::Error,
                format!("\"{}\" is not a known product barcode.", code),
            ),
            CoreError::UnknownCard(code) => (
                Severity::Error,
                format!("Card \"{}\" is not registered. Payment mode is cash.", code),
            ),
            CoreError::InsufficientCredit { balance, .. } => (
                Severity::Error,
                format!(
                    "Not enough credit on the card ({} left). Use another card or switch to cash.",
                    balance
                ),
            ),
            CoreError::EmptyTransaction => (
                Severity::Info,
                "Nothing on the invoice. Resetting.".to_string(),
            ),
            CoreError::NegativePrice { barcode } => (
                Severity::Error,
                format!("Product data for \"{}\" is corrupt.", barcode),
            ),
        };
        self.notifier.notify(severity, text);
    }

    /// Arms the auto-reset that follows a successful commit.
    fn arm_auto_reset(&self) {
        let state = Arc::clone(&self.state);
        self.reset_timer
            .arm(self.config.auto_reset_delay, move |token| {
                let mut state = state.lock().expect("terminal state mutex poisoned");
                if !token.is_current() {
                    debug!("stale auto-reset ignored");
                    return;
                }
                state.session.reset();
                state.input_locked = false;
                debug!("session auto-reset");
            });
    }
}
