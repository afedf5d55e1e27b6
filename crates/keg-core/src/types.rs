//! # Domain Types
//!
//! Core domain types used throughout Keg POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Card       │   │   SaleRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (store key) │   │  id (store key) │   │  id (UUID)      │       │
//! │  │  barcode        │   │  barcode        │   │  product_id     │       │
//! │  │  name           │   │  credit         │   │  card_id?       │       │
//! │  │  member_price   │   │  is_member      │   │  is_member      │       │
//! │  │  guest_price    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products and cards are owned by the ledger and read on demand; the engine
//! never caches them beyond a single lookup. Sale records are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Two price tiers: the member price applies whenever the session's
/// membership flag is set, whether that flag came from a card or from the
/// manual membership toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Opaque store key, immutable.
    pub id: String,

    /// Scannable barcode, unique within the ledger.
    pub barcode: String,

    /// Display name shown on the invoice.
    pub name: String,

    /// Price charged to members.
    pub member_price: Money,

    /// Price charged to everyone else.
    pub guest_price: Money,
}

impl Product {
    /// Rejects malformed price data.
    ///
    /// A negative price is a data-integrity fault in the ledger; it is
    /// caught when the record is loaded, not when a price is resolved.
    pub fn validate(&self) -> CoreResult<()> {
        if self.member_price.is_negative() || self.guest_price.is_negative() {
            return Err(CoreError::NegativePrice {
                barcode: self.barcode.clone(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Card
// =============================================================================

/// A stored-value card associated with a patron.
///
/// This is an internal credit token, not an external payment instrument.
/// Committed credit is never negative; the ledger's conditional update
/// enforces that on every debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Opaque store key.
    pub id: String,

    /// Scannable barcode, in a separate namespace from product barcodes.
    pub barcode: String,

    /// Remaining credit.
    pub credit: Money,

    /// Whether the holder gets member pricing.
    pub is_member: bool,
}

/// A session's snapshot of a looked-up card.
///
/// Holds the credit balance as it was at attach time; the authoritative
/// balance stays in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCard {
    pub id: String,
    pub barcode: String,
    pub credit: Money,
}

impl From<&Card> for ActiveCard {
    fn from(card: &Card) -> Self {
        ActiveCard {
            id: card.id.clone(),
            barcode: card.barcode.clone(),
            credit: card.credit,
        }
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One committed sale line, as appended to the ledger.
///
/// The membership flag is the one in effect at commit time for the whole
/// transaction, not a per-item capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Unique identifier (UUID v4), generated by the engine.
    pub id: String,

    /// The product sold.
    pub product_id: String,

    /// The charged card, or `None` for a cash transaction.
    pub card_id: Option<String>,

    /// Membership flag in effect when the transaction committed.
    pub is_member: bool,

    /// When the transaction committed.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beer() -> Product {
        Product {
            id: "p-1".to_string(),
            barcode: "5449000000996".to_string(),
            name: "Lager 330ml".to_string(),
            member_price: Money::from_cents(200),
            guest_price: Money::from_cents(250),
        }
    }

    #[test]
    fn test_validate_accepts_sane_prices() {
        assert!(beer().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut product = beer();
        product.guest_price = Money::from_cents(-1);

        let err = product.validate().unwrap_err();
        assert!(matches!(err, CoreError::NegativePrice { .. }));
    }

    #[test]
    fn test_active_card_snapshot() {
        let card = Card {
            id: "c-1".to_string(),
            barcode: "KEGCC0001".to_string(),
            credit: Money::from_cents(1000),
            is_member: true,
        };

        let active = ActiveCard::from(&card);
        assert_eq!(active.id, "c-1");
        assert_eq!(active.credit, Money::from_cents(1000));
    }
}
