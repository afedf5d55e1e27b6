//! # In-Memory Ledger
//!
//! A process-local [`Ledger`] backed by plain maps. It is the reference
//! implementation of the conditional credit update and what the engine's
//! tests run against; embedders can also use it for demos and dry runs.
//!
//! All state sits behind one mutex, so the credit check and the credit
//! write are a single critical section.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use keg_core::{Card, CoreError, Money, Product, SaleRecord};

use crate::ledger::{CreditUpdate, Ledger, LedgerError, LedgerResult};

#[derive(Debug, Default)]
struct Inner {
    /// Products keyed by barcode.
    products: HashMap<String, Product>,

    /// Cards keyed by store id.
    cards: HashMap<String, Card>,

    /// Append-only sale log, in commit order.
    sales: Vec<SaleRecord>,
}

/// An in-memory ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger::default()
    }

    /// Loads a product row.
    ///
    /// Price data is validated on the way in; a negative price never makes
    /// it into the store.
    pub fn add_product(&self, product: Product) -> Result<(), CoreError> {
        product.validate()?;
        self.lock().products.insert(product.barcode.clone(), product);
        Ok(())
    }

    /// Loads a card row.
    pub fn add_card(&self, card: Card) {
        self.lock().cards.insert(card.id.clone(), card);
    }

    /// The committed credit of a card, if it exists.
    pub fn card_credit(&self, card_id: &str) -> Option<Money> {
        self.lock().cards.get(card_id).map(|card| card.credit)
    }

    /// Snapshot of the sale log, in commit order.
    pub fn sales(&self) -> Vec<SaleRecord> {
        self.lock().sales.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("ledger mutex poisoned")
    }
}

impl Ledger for MemoryLedger {
    async fn find_product_by_barcode(&self, barcode: &str) -> LedgerResult<Option<Product>> {
        Ok(self.lock().products.get(barcode).cloned())
    }

    async fn find_card_by_barcode(&self, barcode: &str) -> LedgerResult<Option<Card>> {
        Ok(self
            .lock()
            .cards
            .values()
            .find(|card| card.barcode == barcode)
            .cloned())
    }

    async fn update_card_credit(&self, card_id: &str, delta: Money) -> LedgerResult<CreditUpdate> {
        // Check and write under one lock: the conditional-update contract.
        let mut inner = self.lock();
        let card = inner
            .cards
            .get_mut(card_id)
            .ok_or_else(|| LedgerError::CardNotFound(card_id.to_string()))?;

        let candidate = card.credit + delta;
        if delta.is_negative() && candidate.is_negative() {
            debug!(card_id, balance = card.credit.cents(), delta = delta.cents(), "credit update rejected");
            return Ok(CreditUpdate::Insufficient {
                balance: card.credit,
            });
        }

        card.credit = candidate;
        debug!(card_id, balance = card.credit.cents(), delta = delta.cents(), "credit updated");
        Ok(CreditUpdate::Applied {
            balance: card.credit,
        })
    }

    async fn record_sale(&self, sale: &SaleRecord) -> LedgerResult<()> {
        self.lock().sales.push(sale.clone());
        Ok(())
    }

    async fn list_products(&self) -> LedgerResult<Vec<Product>> {
        let mut products: Vec<Product> = self.lock().products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(barcode: &str, guest: i64, member: i64) -> Product {
        Product {
            id: format!("p-{}", barcode),
            barcode: barcode.to_string(),
            name: format!("Product {}", barcode),
            member_price: Money::from_cents(member),
            guest_price: Money::from_cents(guest),
        }
    }

    fn card(id: &str, credit: i64) -> Card {
        Card {
            id: id.to_string(),
            barcode: format!("KEGCC-{}", id),
            credit: Money::from_cents(credit),
            is_member: false,
        }
    }

    #[tokio::test]
    async fn test_product_lookup() {
        let ledger = MemoryLedger::new();
        ledger.add_product(product("111", 250, 200)).unwrap();

        let hit = ledger.find_product_by_barcode("111").await.unwrap();
        assert_eq!(hit.unwrap().name, "Product 111");

        let miss = ledger.find_product_by_barcode("999").await.unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_negative_price_is_rejected_at_load() {
        let ledger = MemoryLedger::new();
        let err = ledger.add_product(product("111", -1, 200)).unwrap_err();
        assert!(matches!(err, CoreError::NegativePrice { .. }));
    }

    #[tokio::test]
    async fn test_conditional_update_rejects_overdraft() {
        let ledger = MemoryLedger::new();
        ledger.add_card(card("c-1", 500));

        let outcome = ledger
            .update_card_credit("c-1", Money::from_cents(-600))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreditUpdate::Insufficient {
                balance: Money::from_cents(500)
            }
        );
        // Nothing written.
        assert_eq!(ledger.card_credit("c-1"), Some(Money::from_cents(500)));
    }

    #[tokio::test]
    async fn test_debit_to_exactly_zero_applies() {
        let ledger = MemoryLedger::new();
        ledger.add_card(card("c-1", 500));

        let outcome = ledger
            .update_card_credit("c-1", Money::from_cents(-500))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreditUpdate::Applied {
                balance: Money::zero()
            }
        );
    }

    #[tokio::test]
    async fn test_topup_is_unconditional() {
        let ledger = MemoryLedger::new();
        ledger.add_card(card("c-1", 0));

        let outcome = ledger
            .update_card_credit("c-1", Money::from_cents(2500))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreditUpdate::Applied {
                balance: Money::from_cents(2500)
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_card_is_a_backend_fault() {
        let ledger = MemoryLedger::new();
        let err = ledger
            .update_card_credit("ghost", Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::CardNotFound(_)));
    }

    #[tokio::test]
    async fn test_sales_append_in_order() {
        let ledger = MemoryLedger::new();
        for n in 0..3 {
            let sale = SaleRecord {
                id: format!("s-{}", n),
                product_id: format!("p-{}", n),
                card_id: None,
                is_member: false,
                created_at: Utc::now(),
            };
            ledger.record_sale(&sale).await.unwrap();
        }

        let sales = ledger.sales();
        assert_eq!(sales.len(), 3);
        assert_eq!(sales[0].id, "s-0");
        assert_eq!(sales[2].id, "s-2");
    }

    #[tokio::test]
    async fn test_list_products_sorted_by_name() {
        let ledger = MemoryLedger::new();
        ledger.add_product(product("2", 100, 80)).unwrap();
        ledger.add_product(product("1", 250, 200)).unwrap();

        let names: Vec<String> = ledger
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Product 1", "Product 2"]);
    }
}
