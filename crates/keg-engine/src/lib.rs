//! # keg-engine: Transaction Engine for Keg POS
//!
//! The stateful half of the register. Everything that touches time or the
//! store lives here; the rules themselves live in `keg-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Keg POS Data Flow                                │
//! │                                                                         │
//! │  Presentation (widgets, scanner input)                                  │
//! │       │  on_scan / on_accept / on_reset / top-up events                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  keg-engine (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌─────────────────┐  ┌───────────────────┐   │   │
//! │  │   │  Terminal  │  │ CardController  │  │ Notifier + timers │   │   │
//! │  │   │  (facade)  │──│ lookup, commit, │  │ message dismiss,  │   │   │
//! │  │   │            │  │ settle          │  │ auto-reset        │   │   │
//! │  │   └────────────┘  └────────┬────────┘  └───────────────────┘   │   │
//! │  │                            │                                    │   │
//! │  └────────────────────────────┼────────────────────────────────────┘   │
//! │                               ▼                                         │
//! │                    Ledger trait (products, cards, sales)                │
//! │            MemoryLedger here; SQL implementations downstream            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`ledger`] - the store seam: `Ledger` trait, conditional credit update
//! - [`memory`] - in-memory ledger for tests, demos, and dry runs
//! - [`cards`] - card lookup and the all-or-nothing settlement
//! - [`notify`] - notifications and the timer-slot primitive
//! - [`terminal`] - the facade the presentation layer binds to
//!
//! ## Runtime
//! The engine must run inside a Tokio runtime: notification dismissal and
//! the post-commit auto-reset are spawned timer tasks. The engine performs
//! no other I/O than the `Ledger` calls it is handed.

pub mod cards;
pub mod ledger;
pub mod memory;
pub mod notify;
pub mod terminal;

pub use cards::{CardController, CardError, Settlement};
pub use ledger::{CreditUpdate, Ledger, LedgerError, LedgerResult};
pub use memory::MemoryLedger;
pub use notify::{ArmToken, Notifier, NotificationView, Severity, TimerSlot};
pub use terminal::{InvoiceLine, InvoiceView, ModeView, Terminal, TopUpView};
