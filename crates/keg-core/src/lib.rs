//! # keg-core: Pure Business Logic for Keg POS
//!
//! This crate is the heart of the bar register. It contains the transaction
//! rules as pure functions and plain state machines with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Keg POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation (widgets, item picker)                │   │
//! │  │        forwards operator events 1:1, renders observers          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              keg-engine (Terminal, timers, Ledger)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ keg-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │  types  │ │ session │ │  scan  │ │ pricing │  │   │
//! │  │   │  Money  │ │ Product │ │ Session │ │classify│ │ resolve │  │   │
//! │  │   │         │ │  Card   │ │  TopUp  │ │        │ │         │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO LEDGER • PURE FUNCTIONS & STATE      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - integer-cents money type (no floating point!)
//! - [`types`] - domain types (Product, Card, SaleRecord)
//! - [`config`] - explicit per-terminal configuration
//! - [`error`] - recoverable error taxonomy
//! - [`pricing`] - member/guest price resolution
//! - [`scan`] - scanned-code classification
//! - [`session`] - the transaction state machine
//! - [`topup`] - the credit top-up sub-session
//!
//! ## Design Principles
//!
//! 1. **Pure**: same input, same output; totals are derived, never cached
//! 2. **No I/O**: ledger access and timers live in keg-engine
//! 3. **Integer money**: every amount is an i64 cent count
//! 4. **Explicit errors**: typed variants, recovered as notifications

pub mod config;
pub mod error;
pub mod money;
pub mod pricing;
pub mod scan;
pub mod session;
pub mod topup;
pub mod types;

pub use config::TerminalConfig;
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use scan::{classify, ScanAction};
pub use session::{LineItem, Mode, Session};
pub use topup::TopUpSession;
pub use types::{ActiveCard, Card, Product, SaleRecord};
