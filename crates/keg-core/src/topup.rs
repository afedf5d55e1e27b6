//! # Top-Up Sub-Session
//!
//! A parallel, simpler accumulator for loading credit onto a card: scan the
//! card, press denomination buttons to build up the deposited amount, then
//! commit or cancel. State here is independent of the main [`Session`];
//! an in-progress round is not disturbed by a top-up.
//!
//! The commit itself (the positive credit delta against the ledger) belongs
//! to the engine's card controller; this type only tracks what to commit.
//!
//! [`Session`]: crate::session::Session

use crate::money::Money;
use crate::types::ActiveCard;

/// Ephemeral card + accumulated amount for one top-up flow.
#[derive(Debug, Clone, Default)]
pub struct TopUpSession {
    card: Option<ActiveCard>,
    amount: Money,
}

impl TopUpSession {
    pub fn new() -> Self {
        TopUpSession::default()
    }

    #[inline]
    pub fn card(&self) -> Option<&ActiveCard> {
        self.card.as_ref()
    }

    #[inline]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Sets (or replaces) the card being topped up.
    ///
    /// Re-scanning a different card mid-flow keeps the amount entered so
    /// far; only the target card changes.
    pub fn set_card(&mut self, card: ActiveCard) {
        self.card = Some(card);
    }

    /// Drops the card after a failed lookup.
    pub fn clear_card(&mut self) {
        self.card = None;
    }

    /// Adds one deposit step to the accumulated amount.
    ///
    /// Steps are clamped to non-negative; there is no upper bound.
    pub fn add(&mut self, step: Money) {
        self.amount += step.clamp_non_negative();
    }

    /// Discards the whole sub-session (cancel, or cleanup after commit).
    pub fn clear(&mut self) {
        *self = TopUpSession::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ActiveCard {
        ActiveCard {
            id: "c-1".to_string(),
            barcode: "KEGCC0001".to_string(),
            credit: Money::from_cents(500),
        }
    }

    #[test]
    fn test_accumulates_steps() {
        let mut topup = TopUpSession::new();
        topup.set_card(card());
        topup.add(Money::from_cents(500));
        topup.add(Money::from_cents(2000));

        assert_eq!(topup.amount(), Money::from_cents(2500));
    }

    #[test]
    fn test_negative_steps_are_clamped() {
        let mut topup = TopUpSession::new();
        topup.set_card(card());
        topup.add(Money::from_cents(500));
        topup.add(Money::from_cents(-9999));

        assert_eq!(topup.amount(), Money::from_cents(500));
    }

    #[test]
    fn test_rescanning_keeps_amount() {
        let mut topup = TopUpSession::new();
        topup.set_card(card());
        topup.add(Money::from_cents(1000));

        let other = ActiveCard {
            id: "c-2".to_string(),
            barcode: "KEGCC0002".to_string(),
            credit: Money::zero(),
        };
        topup.set_card(other);

        assert_eq!(topup.amount(), Money::from_cents(1000));
        assert_eq!(topup.card().unwrap().id, "c-2");
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut topup = TopUpSession::new();
        topup.set_card(card());
        topup.add(Money::from_cents(500));

        topup.clear();
        assert!(topup.card().is_none());
        assert_eq!(topup.amount(), Money::zero());
    }
}
