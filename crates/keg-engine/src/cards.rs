//! # Card Controller
//!
//! Card lookup, the debit/credit commit, and the all-or-nothing settlement
//! of a finished round.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        settle(...)                                      │
//! │                                                                         │
//! │  card attached?                                                         │
//! │   ├── yes ── conditional debit of the full total                        │
//! │   │            ├── Insufficient ── abort: nothing written, the          │
//! │   │            │                   session stays exactly as it was      │
//! │   │            └── Applied ──────┐                                      │
//! │   └── no (cash) ─────────────────┤                                      │
//! │                                  ▼                                      │
//! │                    one SaleRecord per line item,                        │
//! │                    tagged with card id (if any) and the                 │
//! │                    membership flag in effect right now                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The debit always precedes the sale records, so a rejected debit can
//! never leave partial sales behind.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use keg_core::{ActiveCard, Card, LineItem, Money, SaleRecord};

use crate::ledger::{CreditUpdate, Ledger, LedgerError};

/// Errors from card commits.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CardError {
    /// The debit would overdraw the card; nothing was written.
    #[error("insufficient credit: {balance} available, {requested} requested")]
    InsufficientCredit { balance: Money, requested: Money },

    /// Backend fault, fatal for the surrounding application.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What a successful settlement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// The amount charged (debited from the card, or owed in cash).
    pub charged: Money,

    /// The card's credit after the debit; `None` for cash rounds.
    pub remaining_credit: Option<Money>,

    /// How many sale records were appended.
    pub sales_recorded: usize,
}

/// Mediates every card mutation between the terminal and the ledger.
#[derive(Debug)]
pub struct CardController<L> {
    ledger: Arc<L>,
}

impl<L> Clone for CardController<L> {
    fn clone(&self) -> Self {
        CardController {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L: Ledger> CardController<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        CardController { ledger }
    }

    /// Looks up a card by scanned barcode.
    pub async fn lookup(&self, barcode: &str) -> Result<Option<Card>, LedgerError> {
        self.ledger.find_card_by_barcode(barcode).await
    }

    /// Applies a signed credit delta to a card.
    ///
    /// Top-ups (`delta >= 0`) are unconditional. Debits go through the
    /// ledger's single conditional update; an overdraw comes back as
    /// [`CardError::InsufficientCredit`] with nothing written.
    pub async fn commit(&self, card_id: &str, delta: Money) -> Result<Money, CardError> {
        match self.ledger.update_card_credit(card_id, delta).await? {
            CreditUpdate::Applied { balance } => {
                debug!(card_id, delta = delta.cents(), balance = balance.cents(), "credit committed");
                Ok(balance)
            }
            CreditUpdate::Insufficient { balance } => Err(CardError::InsufficientCredit {
                balance,
                requested: delta.abs(),
            }),
        }
    }

    /// Commits a finished round: debit (card mode), then the sale records.
    ///
    /// The membership flag recorded on every sale is the one in effect at
    /// commit time for the whole round, not a per-item capture.
    pub async fn settle(
        &self,
        card: Option<&ActiveCard>,
        total: Money,
        items: &[LineItem],
        is_member: bool,
    ) -> Result<Settlement, CardError> {
        let remaining_credit = match card {
            Some(card) => Some(self.commit(&card.id, -total).await?),
            None => None,
        };

        let card_id = card.map(|card| card.id.clone());
        let now = Utc::now();
        for item in items {
            let sale = SaleRecord {
                id: Uuid::new_v4().to_string(),
                product_id: item.product.id.clone(),
                card_id: card_id.clone(),
                is_member,
                created_at: now,
            };
            self.ledger.record_sale(&sale).await?;
        }

        info!(
            total = total.cents(),
            items = items.len(),
            card = card_id.as_deref().unwrap_or("cash"),
            "round settled"
        );

        Ok(Settlement {
            charged: total,
            remaining_credit,
            sales_recorded: items.len(),
        })
    }
}
