//! # Ledger Core
//!
//! A multi-tenant double-entry general ledger engine: business documents
//! (invoices, bills, manual journals, payments, depreciation runs) become
//! balanced, immutable transactions against a chart of accounts, with
//! derived financial statements that always reconcile.
//!
//! ## Features
//!
//! - **Double-entry posting**: every document funnels through one posting
//!   engine that derives, validates, and atomically commits balanced
//!   debit/credit lines
//! - **Chart of accounts**: per-organization account hierarchy with
//!   materialized balances maintained exclusively by posting commits
//! - **Multi-tenancy**: an explicit identity context scopes every operation
//!   to one organization
//! - **Financial reporting**: trial balance, profit & loss, and balance
//!   sheet recomputed from journal lines as an independent check
//! - **Fixed assets**: straight-line and declining-balance depreciation
//!   schedules feeding periodic posting
//! - **Storage abstraction**: database-agnostic design with a trait-based
//!   store providing the atomic commit primitive
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_core::{Ledger, OrgContext, NewAccount, AccountType};
//! use ledger_core::utils::MemoryStore;
//!
//! // The engine works over any LedgerStore implementation;
//! // MemoryStore is provided for tests and development.
//! // let mut ledger = Ledger::new(MemoryStore::new());
//! ```

pub mod assets;
pub mod ledger;
pub mod reporting;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use assets::*;
pub use ledger::*;
pub use reporting::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
