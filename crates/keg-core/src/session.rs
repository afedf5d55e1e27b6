//! # Session State Machine
//!
//! The in-memory state of the transaction currently being assembled.
//!
//! ## States and Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session State Machine                              │
//! │                                                                         │
//! │            attach_card (ledger hit)                                     │
//! │   ┌──────┐ ──────────────────────────────► ┌──────┐                    │
//! │   │ CASH │                                 │ CARD │                    │
//! │   └──────┘ ◄────────────────────────────── └──────┘                    │
//! │      ▲      switch_to_cash (bare prefix,                                │
//! │      │      card miss, membership toggle)                               │
//! │      │                                                                  │
//! │      └── reset (explicit, or the auto-reset after a commit)             │
//! │                                                                         │
//! │   add_item / toggle_member are valid in both states.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing Policy
//! The total is a pure function of the line items and the current membership
//! flag, recomputed from scratch on every read. Toggling membership re-prices
//! every line already on the invoice: one shared membership discount for the
//! whole round, not a per-item price freeze.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::pricing;
use crate::types::{ActiveCard, Card, Product};

// =============================================================================
// Mode
// =============================================================================

/// How the current transaction will settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Cash,
    Card,
}

// =============================================================================
// Line Item
// =============================================================================

/// One scanned product on the invoice.
///
/// Holds the product snapshot from lookup time. The charged price is not
/// frozen here; it is resolved against the session's membership flag
/// whenever the invoice or total is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: Product,
}

impl LineItem {
    /// The price this line contributes under the given membership flag.
    #[inline]
    pub fn price(&self, is_member: bool) -> Money {
        pricing::resolve(&self.product, is_member)
    }
}

// =============================================================================
// Session
// =============================================================================

/// The transaction being assembled at the terminal.
///
/// ## Invariants
/// - `mode()` is `Card` exactly when a card is attached; the mode is derived
///   so the pair cannot drift apart
/// - line items keep scan order
/// - the total is never stored, only computed
///
/// A session is created fresh at startup and after every successful commit
/// or explicit reset; it is never persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    is_member: bool,
    line_items: Vec<LineItem>,
    active_card: Option<ActiveCard>,
}

impl Session {
    /// Creates a fresh cash-mode session.
    pub fn new() -> Self {
        Session::default()
    }

    /// The settlement mode, derived from card attachment.
    #[inline]
    pub fn mode(&self) -> Mode {
        if self.active_card.is_some() {
            Mode::Card
        } else {
            Mode::Cash
        }
    }

    #[inline]
    pub fn is_member(&self) -> bool {
        self.is_member
    }

    #[inline]
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    #[inline]
    pub fn active_card(&self) -> Option<&ActiveCard> {
        self.active_card.as_ref()
    }

    /// Appends a scanned product to the invoice.
    pub fn add_item(&mut self, product: Product) {
        self.line_items.push(LineItem { product });
    }

    /// Attaches a looked-up card.
    ///
    /// Copies the card's membership flag onto the session, so member pricing
    /// applies (retroactively, per the pricing policy) to every line.
    pub fn attach_card(&mut self, card: &Card) {
        self.active_card = Some(ActiveCard::from(card));
        self.is_member = card.is_member;
    }

    /// Drops any attached card and returns to cash settlement.
    ///
    /// Also clears the membership flag: without a card, membership is a
    /// manual toggle starting from guest pricing.
    pub fn switch_to_cash(&mut self) {
        self.active_card = None;
        self.is_member = false;
    }

    /// Flips the manual membership flag.
    ///
    /// Membership without a card is decoupled from any card's stored flag,
    /// so an attached card is detached first (forcing cash settlement).
    /// Returns `true` when a card was detached, so the caller can surface
    /// the mode switch to the operator.
    pub fn toggle_member(&mut self) -> bool {
        let detached = self.active_card.is_some();
        if detached {
            self.switch_to_cash();
        }
        self.is_member = !self.is_member;
        detached
    }

    /// Returns to a fresh cash session: no items, no card, guest pricing.
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// The running total under the current membership flag.
    ///
    /// Recomputed from scratch on every call; a membership toggle changes
    /// the total of already-scanned items immediately.
    pub fn total(&self) -> Money {
        self.line_items
            .iter()
            .map(|item| item.price(self.is_member))
            .sum()
    }

    /// Invoice lines with prices resolved for the current membership flag,
    /// in scan order.
    pub fn invoice_lines(&self) -> Vec<(String, Money)> {
        self.line_items
            .iter()
            .map(|item| (item.product.name.clone(), item.price(self.is_member)))
            .collect()
    }
}
