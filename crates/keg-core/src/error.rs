//! # Error Types
//!
//! Recoverable domain errors for keg-core.
//!
//! Every variant here is recovered locally by the terminal: it becomes an
//! operator-facing notification and leaves the session either unchanged or
//! reset, never half-mutated. Fatal faults (a ledger that cannot be reached)
//! are a separate type in the engine crate and propagate upward unchanged.

use thiserror::Error;

use crate::money::Money;

/// Recoverable business errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The operator submitted an empty scan.
    #[error("no barcode was scanned")]
    EmptyScan,

    /// A scanned product barcode has no ledger entry.
    #[error("unknown product barcode: {0}")]
    UnknownProduct(String),

    /// A scanned card barcode has no ledger entry.
    #[error("unknown card: {0}")]
    UnknownCard(String),

    /// A card debit would overdraw the card.
    ///
    /// The commit is aborted whole: no partial debit, no sale records,
    /// session left as it was so the operator can pick another card or
    /// switch to cash.
    #[error("insufficient credit: {balance} available, {requested} requested")]
    InsufficientCredit { balance: Money, requested: Money },

    /// Accept was pressed with nothing on the invoice.
    ///
    /// Treated as a no-op reset rather than a hard failure.
    #[error("no items in the current transaction")]
    EmptyTransaction,

    /// A ledger record carries a negative price.
    #[error("product {barcode} has a negative price")]
    NegativePrice { barcode: String },
}

/// Convenience alias for results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
