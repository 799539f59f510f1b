//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use uuid::Uuid;

use crate::ledger::transaction::TransactionFilter;
use crate::types::*;

/// Storage abstraction for the ledger engine.
///
/// This trait allows the engine to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these
/// methods. Implementations must provide per-organization serialization of
/// `commit_posting`: a transaction, its lines, and the resulting account
/// balance updates are persisted all-or-nothing, and two commits for the
/// same organization never interleave.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Save a newly created account
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// Get an account by id
    async fn get_account(&self, account_id: Uuid) -> LedgerResult<Option<Account>>;

    /// Look up an account by its per-organization code
    async fn find_account_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> LedgerResult<Option<Account>>;

    /// List an organization's accounts, optionally filtered by type
    async fn list_accounts(
        &self,
        organization_id: Uuid,
        account_type: Option<AccountType>,
    ) -> LedgerResult<Vec<Account>>;

    /// Update account metadata (name, category, active flag).
    ///
    /// Balances are never written through this path; they change only inside
    /// `commit_posting`.
    async fn update_account(&mut self, account: &Account) -> LedgerResult<()>;

    /// Remove an account that has never been posted against
    async fn delete_account(&mut self, account_id: Uuid) -> LedgerResult<()>;

    /// Whether any journal line references the account
    async fn has_postings(&self, account_id: Uuid) -> LedgerResult<bool>;

    /// Atomically commit a posting: assign the next sequential entry number
    /// for the organization, persist the transaction with all its lines, and
    /// apply each line's effect to its account balance. Returns the
    /// persisted transaction with its entry number filled in.
    async fn commit_posting(&mut self, transaction: Transaction) -> LedgerResult<Transaction>;

    /// Get a transaction by id
    async fn get_transaction(&self, transaction_id: Uuid) -> LedgerResult<Option<Transaction>>;

    /// Query transactions matching a filter, ordered by date ascending then
    /// entry number ascending
    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Find the reversal referencing the given transaction, if one was posted
    async fn find_reversal_of(
        &self,
        transaction_id: Uuid,
    ) -> LedgerResult<Option<Transaction>>;
}

/// Trait for implementing custom account validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate an account before saving
    fn validate_account(&self, account: &Account) -> LedgerResult<()>;
}

/// Trait for implementing custom journal validation rules
pub trait JournalValidator: Send + Sync {
    /// Validate a transaction before it is committed
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()>;
}

/// Default account validator with basic rules
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        if account.code.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account code cannot be empty".to_string(),
            ));
        }

        if account.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default journal validator enforcing the double-entry rules
pub struct DefaultJournalValidator;

impl JournalValidator for DefaultJournalValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        transaction.validate()
    }
}
