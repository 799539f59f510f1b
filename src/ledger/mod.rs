//! Ledger module containing account management, posting, and queries

pub mod account;
pub mod core;
pub mod posting;
pub mod transaction;

pub use account::*;
pub use core::*;
pub use posting::*;
pub use transaction::*;
