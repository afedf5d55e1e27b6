//! # Ledger Seam
//!
//! The persistent store of products, cards, and sale records, seen from the
//! engine's side. The store's internals (schema, SQL, files) live behind
//! this trait; the engine only consumes the query surface.
//!
//! ## Call Model
//! Ledger calls are treated as short, synchronous-in-spirit, non-reentrant
//! operations; the engine awaits them one at a time and never holds its
//! state lock across them. A backend fault is fatal for the surrounding
//! application and propagates out of the engine unchanged.
//!
//! ## The One Atomicity Requirement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_card_credit MUST be a single conditional update                 │
//! │                                                                         │
//! │     WRONG:  credit = read(card); if credit + delta >= 0 { write(...) }  │
//! │             (another writer can slip between the read and the write)    │
//! │                                                                         │
//! │     RIGHT:  one guarded update that applies the delta only when the     │
//! │             resulting balance stays non-negative (or delta >= 0),       │
//! │             reporting which branch was taken                            │
//! │                                                                         │
//! │  The terminal is single-session, but the contract holds even if the     │
//! │  ledger is shared across terminals.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use keg_core::{Card, Money, Product, SaleRecord};

/// Outcome of the conditional credit update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditUpdate {
    /// The delta was applied; `balance` is the new committed credit.
    Applied { balance: Money },

    /// A negative delta would have overdrawn the card; nothing was written.
    /// `balance` is the untouched committed credit.
    Insufficient { balance: Money },
}

/// Ledger backend faults.
///
/// None of these are recovered inside the engine; they bubble up for the
/// embedding application to treat as fatal.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// A credit update referenced a card id with no row behind it.
    #[error("card not found in ledger: {0}")]
    CardNotFound(String),

    /// The store could not be reached or the operation failed outright.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// The query surface the engine consumes.
///
/// Implementations must uphold the conditional-update contract documented
/// on [`update_card_credit`](Ledger::update_card_credit); everything else is
/// plain lookup and append.
pub trait Ledger: Send + Sync {
    /// Looks up a product by its scanned barcode.
    fn find_product_by_barcode(
        &self,
        barcode: &str,
    ) -> impl std::future::Future<Output = LedgerResult<Option<Product>>> + Send;

    /// Looks up a card by its scanned barcode.
    fn find_card_by_barcode(
        &self,
        barcode: &str,
    ) -> impl std::future::Future<Output = LedgerResult<Option<Card>>> + Send;

    /// Applies `delta` to the card's credit as one conditional update.
    ///
    /// Non-negative deltas (top-ups) always apply. Negative deltas apply
    /// only when the resulting balance stays non-negative; otherwise the
    /// update reports [`CreditUpdate::Insufficient`] and writes nothing.
    fn update_card_credit(
        &self,
        card_id: &str,
        delta: Money,
    ) -> impl std::future::Future<Output = LedgerResult<CreditUpdate>> + Send;

    /// Appends one sale record.
    fn record_sale(
        &self,
        sale: &SaleRecord,
    ) -> impl std::future::Future<Output = LedgerResult<()>> + Send;

    /// Lists all products. Consumed by the item-picker surface, not by the
    /// transaction flow.
    fn list_products(&self) -> impl std::future::Future<Output = LedgerResult<Vec<Product>>> + Send;
}
