//! Transaction retrieval and ledger queries
//!
//! Transactions are append-only: once committed they are never updated or
//! deleted, only reversed by the posting engine's void path. This module
//! owns the read side.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Filter for ledger queries.
///
/// Matching transactions are returned ordered by date ascending, then entry
/// number ascending for same-date ties, so a fixed filter always yields the
/// same sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Organization whose ledger is queried
    pub organization_id: Uuid,
    /// Earliest date included
    pub date_from: Option<NaiveDate>,
    /// Latest date included
    pub date_to: Option<NaiveDate>,
    /// Only transactions touching this account
    pub account_id: Option<Uuid>,
    /// Only transactions from this document kind
    pub source_kind: Option<SourceKind>,
}

impl TransactionFilter {
    /// All transactions of an organization
    pub fn for_org(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            date_from: None,
            date_to: None,
            account_id: None,
            source_kind: None,
        }
    }

    /// Restrict to dates on or after `date`
    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    /// Restrict to dates on or before `date`
    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    /// Restrict to transactions with a line against `account_id`
    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Restrict to one source kind
    pub fn source(mut self, kind: SourceKind) -> Self {
        self.source_kind = Some(kind);
        self
    }

    /// Whether a transaction satisfies this filter
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if transaction.organization_id != self.organization_id {
            return false;
        }
        if let Some(from) = self.date_from {
            if transaction.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if transaction.date > to {
                return false;
            }
        }
        if let Some(account_id) = self.account_id {
            if !transaction.lines.iter().any(|l| l.account_id == account_id) {
                return false;
            }
        }
        if let Some(kind) = self.source_kind {
            if transaction.source.kind != kind {
                return false;
            }
        }
        true
    }
}

/// Read-side access to the transaction ledger
pub struct TransactionQuery<S: LedgerStore> {
    storage: S,
}

impl<S: LedgerStore> TransactionQuery<S> {
    /// Create a query layer over the given store
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get a transaction by id, scoped to the caller's organization
    pub async fn get(
        &self,
        ctx: &OrgContext,
        transaction_id: Uuid,
    ) -> LedgerResult<Option<Transaction>> {
        Ok(self
            .storage
            .get_transaction(transaction_id)
            .await?
            .filter(|t| t.organization_id == ctx.organization_id))
    }

    /// Get a transaction by id, returning an error when absent
    pub async fn get_required(
        &self,
        ctx: &OrgContext,
        transaction_id: Uuid,
    ) -> LedgerResult<Transaction> {
        self.get(ctx, transaction_id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))
    }

    /// Run a ledger query
    pub async fn query(&self, filter: &TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        self.storage.query_transactions(filter).await
    }

    /// All transactions touching one account within an optional date range
    pub async fn account_history(
        &self,
        ctx: &OrgContext,
        account_id: Uuid,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        let mut filter = TransactionFilter::for_org(ctx.organization_id).account(account_id);
        filter.date_from = date_from;
        filter.date_to = date_to;
        self.query(&filter).await
    }

    /// The reversal that voided a transaction, if any
    pub async fn reversal_of(
        &self,
        ctx: &OrgContext,
        transaction_id: Uuid,
    ) -> LedgerResult<Option<Transaction>> {
        Ok(self
            .storage
            .find_reversal_of(transaction_id)
            .await?
            .filter(|t| t.organization_id == ctx.organization_id))
    }
}
