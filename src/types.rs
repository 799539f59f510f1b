//! Core types and data structures for the ledger engine

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency precision: all monetary amounts settle at two decimal places.
pub const MONEY_SCALE: i64 = 2;

/// Round a monetary amount to currency precision.
///
/// Policy: round half away from zero, applied once at a final total rather
/// than per line.
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

/// Account types following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Assets - what the business owns (Cash, Receivables, Equipment, etc.)
    Asset,
    /// Liabilities - what the business owes (Payables, Loans, Tax payable, etc.)
    Liability,
    /// Equity - owner's interest in the business (Capital, Retained Earnings, etc.)
    Equity,
    /// Revenue - money earned by the business
    Revenue,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    /// Assets and Expenses normally carry debit balances;
    /// Liabilities, Equity, and Revenue normally carry credit balances.
    pub fn normal_balance(&self) -> EntryType {
        match self {
            AccountType::Asset | AccountType::Expense => EntryType::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                EntryType::Credit
            }
        }
    }
}

/// The two sides of double-entry bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit - increases Assets and Expenses, decreases Liabilities, Equity, and Revenue
    Debit,
    /// Credit - increases Liabilities, Equity, and Revenue, decreases Assets and Expenses
    Credit,
}

/// Identity context attached to every ledger operation.
///
/// The organization id scopes all reads and writes to one tenant; the acting
/// user id is recorded on every transaction the operation creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgContext {
    /// Tenant the operation acts on behalf of
    pub organization_id: Uuid,
    /// User responsible for the operation
    pub acting_user_id: Uuid,
}

impl OrgContext {
    /// Create a new identity context
    pub fn new(organization_id: Uuid, acting_user_id: Uuid) -> Self {
        Self {
            organization_id,
            acting_user_id,
        }
    }
}

/// A node in an organization's chart of accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: Uuid,
    /// Organization this account belongs to
    pub organization_id: Uuid,
    /// Account code, unique within the organization (e.g. "1200")
    pub code: String,
    /// Human-readable account name
    pub name: String,
    /// Type of account (Asset, Liability, etc.)
    pub account_type: AccountType,
    /// Optional reporting category (e.g. "current_asset")
    pub category: Option<String>,
    /// Optional parent account for a hierarchical chart of accounts
    pub parent_id: Option<Uuid>,
    /// Whether the account accepts new postings
    pub is_active: bool,
    /// Materialized balance, maintained exclusively by posting commits
    pub balance: BigDecimal,
    /// When the account was created
    pub created_at: NaiveDateTime,
    /// When the account was last updated
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(
        organization_id: Uuid,
        code: String,
        name: String,
        account_type: AccountType,
        category: Option<String>,
        parent_id: Option<Uuid>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            code,
            name,
            account_type,
            category,
            parent_id,
            is_active: true,
            balance: BigDecimal::from(0),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply one journal line's effect to the materialized balance.
    ///
    /// This is the only path that mutates `balance`: debit-normal accounts
    /// move by `debit - credit`, credit-normal accounts by `credit - debit`.
    /// Must be invoked exactly once per journal line, inside the same atomic
    /// commit that persists the owning transaction.
    pub fn apply_posting(&mut self, debit: &BigDecimal, credit: &BigDecimal) {
        match self.account_type.normal_balance() {
            EntryType::Debit => self.balance += debit - credit,
            EntryType::Credit => self.balance += credit - debit,
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// One debit or credit within a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account being affected
    pub account_id: Uuid,
    /// Debit amount; zero when the line is a credit
    pub debit: BigDecimal,
    /// Credit amount; zero when the line is a debit
    pub credit: BigDecimal,
    /// Optional description for this specific line
    pub description: Option<String>,
    /// Optional counterparty reference
    pub contact_id: Option<Uuid>,
}

impl JournalLine {
    /// Create a debit line
    pub fn debit(account_id: Uuid, amount: BigDecimal, description: Option<String>) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: BigDecimal::from(0),
            description,
            contact_id: None,
        }
    }

    /// Create a credit line
    pub fn credit(account_id: Uuid, amount: BigDecimal, description: Option<String>) -> Self {
        Self {
            account_id,
            debit: BigDecimal::from(0),
            credit: amount,
            description,
            contact_id: None,
        }
    }

    /// Attach a counterparty reference
    pub fn with_contact(mut self, contact_id: Uuid) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    /// Which side this line posts to
    pub fn side(&self) -> EntryType {
        if self.debit > BigDecimal::from(0) {
            EntryType::Debit
        } else {
            EntryType::Credit
        }
    }

    /// The nonzero amount of this line
    pub fn amount(&self) -> &BigDecimal {
        match self.side() {
            EntryType::Debit => &self.debit,
            EntryType::Credit => &self.credit,
        }
    }

    /// Produce the opposite line: debit and credit swapped
    pub fn reversed(&self) -> Self {
        Self {
            account_id: self.account_id,
            debit: self.credit.clone(),
            credit: self.debit.clone(),
            description: self.description.clone(),
            contact_id: self.contact_id,
        }
    }

    /// Validate the debit-XOR-credit shape of the line
    pub fn validate(&self) -> LedgerResult<()> {
        let zero = BigDecimal::from(0);
        if self.debit < zero || self.credit < zero {
            return Err(LedgerError::Validation(
                "Journal line amounts cannot be negative".to_string(),
            ));
        }
        let has_debit = self.debit > zero;
        let has_credit = self.credit > zero;
        if has_debit == has_credit {
            return Err(LedgerError::Validation(
                "Journal line must carry exactly one of debit or credit".to_string(),
            ));
        }
        Ok(())
    }
}

/// Kinds of business documents that produce transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Sales invoice
    Invoice,
    /// Purchase bill
    Bill,
    /// Payment received or made
    Payment,
    /// User-entered journal
    ManualJournal,
    /// Periodic fixed-asset depreciation charge
    Depreciation,
    /// Reversal of a previously posted transaction
    Reversal,
}

/// Reference from a transaction back to the document that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Kind of originating document
    pub kind: SourceKind,
    /// Id of the originating document, when one exists
    pub document_id: Option<Uuid>,
}

impl DocumentSource {
    /// Create a source reference
    pub fn new(kind: SourceKind, document_id: Option<Uuid>) -> Self {
        Self { kind, document_id }
    }
}

/// A balanced, immutable posting event.
///
/// Transactions are created atomically with all their lines and are never
/// mutated afterwards; corrections post a reversing transaction instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: Uuid,
    /// Organization this transaction belongs to
    pub organization_id: Uuid,
    /// Sequential, per-organization entry number assigned at commit
    pub entry_number: u64,
    /// Date the transaction takes effect
    pub date: NaiveDate,
    /// Narration describing the transaction
    pub description: String,
    /// Originating document reference
    pub source: DocumentSource,
    /// User the transaction was created by
    pub created_by: Uuid,
    /// The debit and credit lines making up this transaction
    pub lines: Vec<JournalLine>,
    /// When the transaction was committed
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Create a transaction pending commit; the entry number is assigned by
    /// the store when the posting commits.
    pub fn new(
        ctx: &OrgContext,
        date: NaiveDate,
        description: String,
        source: DocumentSource,
        lines: Vec<JournalLine>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id: ctx.organization_id,
            entry_number: 0,
            date,
            description,
            source,
            created_by: ctx.acting_user_id,
            lines,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Sum of all debit amounts
    pub fn total_debits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    /// Sum of all credit amounts
    pub fn total_credits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    /// Whether debits equal credits at currency precision
    pub fn is_balanced(&self) -> bool {
        round_money(&self.total_debits()) == round_money(&self.total_credits())
    }

    /// Validate the double-entry invariants of this transaction
    pub fn validate(&self) -> LedgerResult<()> {
        if self.lines.len() < 2 {
            return Err(LedgerError::Validation(
                "Transaction must have at least two lines for double-entry bookkeeping"
                    .to_string(),
            ));
        }

        for line in &self.lines {
            line.validate()?;
        }

        let debits = round_money(&self.total_debits());
        let credits = round_money(&self.total_credits());
        if debits != credits || debits <= BigDecimal::from(0) {
            return Err(LedgerError::UnbalancedEntry { debits, credits });
        }

        Ok(())
    }

    /// Build the reversing transaction that voids this one.
    ///
    /// Every line's debit and credit are swapped; the reversal posts on the
    /// original date so period reports net to zero at any as-of date.
    pub fn reversal(&self, ctx: &OrgContext, reason: &str) -> Transaction {
        Transaction::new(
            ctx,
            self.date,
            format!("Void of entry #{}: {}", self.entry_number, reason),
            DocumentSource::new(SourceKind::Reversal, Some(self.id)),
            self.lines.iter().map(JournalLine::reversed).collect(),
        )
    }
}

/// One row of a trial balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Account information
    pub account: Account,
    /// Debit-side balance, when the account lands on the debit side
    pub debit_balance: Option<BigDecimal>,
    /// Credit-side balance, when the account lands on the credit side
    pub credit_balance: Option<BigDecimal>,
}

impl AccountBalance {
    /// The balance amount regardless of side
    pub fn balance_amount(&self) -> BigDecimal {
        self.debit_balance
            .clone()
            .or_else(|| self.credit_balance.clone())
            .unwrap_or_else(|| BigDecimal::from(0))
    }
}

/// Trial balance: every account's balance at a point in time, with side
/// totals that must agree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Organization reported on
    pub organization_id: Uuid,
    /// Date of the trial balance
    pub as_of_date: NaiveDate,
    /// Rows ordered by account code
    pub rows: Vec<AccountBalance>,
    /// Total of all debit-side balances
    pub total_debits: BigDecimal,
    /// Total of all credit-side balances
    pub total_credits: BigDecimal,
    /// Whether total debits equal total credits
    pub is_balanced: bool,
}

/// Errors surfaced by the ledger engine
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Invalid account {account_id}: {reason}")]
    InvalidAccount { account_id: Uuid, reason: String },
    #[error("Account {0} is inactive and cannot accept new postings")]
    InactiveAccount(Uuid),
    #[error("Account {0} is referenced by posted transactions")]
    AccountInUse(Uuid),
    #[error("Unbalanced entry: debits = {debits}, credits = {credits}")]
    UnbalancedEntry {
        debits: BigDecimal,
        credits: BigDecimal,
    },
    #[error("Operation crosses organizations: expected {expected}, found {found}")]
    CrossTenant { expected: Uuid, found: Uuid },
    #[error("Transaction {0} has already been voided")]
    AlreadyVoided(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Concurrent update detected on account {0}")]
    ConcurrencyConflict(Uuid),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
