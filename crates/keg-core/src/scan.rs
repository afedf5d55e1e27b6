//! # Scan Classification
//!
//! Classifies a raw scanned string into a typed action before any state is
//! touched. The terminal dispatches on the result; this module never looks
//! at the ledger or the session.
//!
//! ## Classification Rules (priority order)
//! ```text
//! ""                         → error (empty scan)
//! exactly the card prefix    → SwitchToCash
//! card prefix + more         → Card(code)
//! the anonymous-member code  → ToggleMember
//! anything else              → Product(code)
//! ```
//!
//! The prefix rules run before the member-code comparison, so a member code
//! that happens to live inside the card namespace would be treated as a
//! card. Configurations should keep the two apart.

use crate::config::TerminalConfig;
use crate::error::CoreError;

/// A classified scan, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAction {
    /// Drop any attached card and settle in cash.
    SwitchToCash,

    /// Flip member pricing without a card.
    ToggleMember,

    /// Look up a card by barcode.
    Card(String),

    /// Look up a product by barcode.
    Product(String),
}

/// Classifies one scanned code.
pub fn classify(code: &str, config: &TerminalConfig) -> Result<ScanAction, CoreError> {
    if code.is_empty() {
        return Err(CoreError::EmptyScan);
    }
    if code == config.card_prefix {
        return Ok(ScanAction::SwitchToCash);
    }
    if code.starts_with(&config.card_prefix) {
        return Ok(ScanAction::Card(code.to_string()));
    }
    if code == config.member_code {
        return Ok(ScanAction::ToggleMember);
    }
    Ok(ScanAction::Product(code.to_string()))
}
