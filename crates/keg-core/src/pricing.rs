//! # Pricing
//!
//! Resolves the price of a product for a given membership state.
//!
//! This is the single place the two price tiers meet the membership flag.
//! Malformed (negative) prices are rejected when the ledger record is loaded
//! (`Product::validate`), so resolution itself has no failure mode.

use crate::money::Money;
use crate::types::Product;

/// Returns the price to charge for `product` under the given membership flag.
///
/// ```rust
/// use keg_core::money::Money;
/// use keg_core::pricing::resolve;
/// use keg_core::types::Product;
///
/// let pale_ale = Product {
///     id: "p-7".into(),
///     barcode: "871234".into(),
///     name: "Pale Ale".into(),
///     member_price: Money::from_cents(200),
///     guest_price: Money::from_cents(250),
/// };
///
/// assert_eq!(resolve(&pale_ale, true), Money::from_cents(200));
/// assert_eq!(resolve(&pale_ale, false), Money::from_cents(250));
/// ```
#[inline]
pub fn resolve(product: &Product, is_member: bool) -> Money {
    if is_member {
        product.member_price
    } else {
        product.guest_price
    }
}
