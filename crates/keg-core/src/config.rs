//! # Terminal Configuration
//!
//! Explicit configuration object passed into the engine's constructor.
//! Nothing here is ambient module state; two terminals with different
//! prefixes can coexist in one process.
//!
//! Currency symbol and number formatting are deliberately absent: those are
//! presentation-layer locale settings, not engine logic.

use std::time::Duration;

/// Scan prefixes and timer durations for one terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalConfig {
    /// Card barcode namespace. A scan equal to the prefix alone switches the
    /// session back to cash; a longer scan starting with it is a card lookup.
    pub card_prefix: String,

    /// The anonymous-member code: toggles member pricing without a card.
    pub member_code: String,

    /// How long an ordinary notification stays up before auto-dismissing.
    pub notify_duration: Duration,

    /// How long transaction-result notifications stay up. Longer, so the
    /// patron can read the charged amount and remaining credit.
    pub result_notify_duration: Duration,

    /// Delay between a successful commit and the automatic session reset.
    pub auto_reset_delay: Duration,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            card_prefix: "KEGCC".to_string(),
            member_code: "KEGMEMBER".to_string(),
            notify_duration: Duration::from_secs(3),
            result_notify_duration: Duration::from_secs(6),
            auto_reset_delay: Duration::from_secs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TerminalConfig::default();
        assert!(config.member_code != config.card_prefix);
        assert!(config.result_notify_duration > config.notify_duration);
    }
}
