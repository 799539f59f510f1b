//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::ledger::transaction::TransactionFilter;
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<Uuid, Transaction>,
    entry_sequences: HashMap<Uuid, u64>,
}

/// In-memory ledger store.
///
/// `commit_posting` runs entirely under one write lock, so a transaction,
/// its lines, and the account balance updates land all-or-nothing and
/// commits for the same organization are serialized.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.accounts.clear();
        inner.transactions.clear();
        inner.entry_sequences.clear();
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save_account(&mut self, account: &Account) -> LedgerResult<()> {
        self.inner
            .write()
            .unwrap()
            .accounts
            .insert(account.id, account.clone());
        Ok(())
    }

    async fn get_account(&self, account_id: Uuid) -> LedgerResult<Option<Account>> {
        Ok(self.inner.read().unwrap().accounts.get(&account_id).cloned())
    }

    async fn find_account_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> LedgerResult<Option<Account>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .accounts
            .values()
            .find(|account| account.organization_id == organization_id && account.code == code)
            .cloned())
    }

    async fn list_accounts(
        &self,
        organization_id: Uuid,
        account_type: Option<AccountType>,
    ) -> LedgerResult<Vec<Account>> {
        let inner = self.inner.read().unwrap();
        let mut accounts: Vec<Account> = inner
            .accounts
            .values()
            .filter(|account| {
                account.organization_id == organization_id
                    && account_type.is_none_or(|t| account.account_type == t)
            })
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn update_account(&mut self, account: &Account) -> LedgerResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.accounts.contains_key(&account.id) {
            inner.accounts.insert(account.id, account.clone());
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(account.id))
        }
    }

    async fn delete_account(&mut self, account_id: Uuid) -> LedgerResult<()> {
        if self
            .inner
            .write()
            .unwrap()
            .accounts
            .remove(&account_id)
            .is_some()
        {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(account_id))
        }
    }

    async fn has_postings(&self, account_id: Uuid) -> LedgerResult<bool> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .transactions
            .values()
            .any(|txn| txn.lines.iter().any(|line| line.account_id == account_id)))
    }

    async fn commit_posting(&mut self, mut transaction: Transaction) -> LedgerResult<Transaction> {
        let mut inner = self.inner.write().unwrap();

        // All checks happen before the first mutation so a failed commit
        // leaves no partial state.
        for line in &transaction.lines {
            match inner.accounts.get(&line.account_id) {
                Some(account) if account.organization_id == transaction.organization_id => {}
                Some(account) => {
                    return Err(LedgerError::CrossTenant {
                        expected: transaction.organization_id,
                        found: account.organization_id,
                    })
                }
                None => return Err(LedgerError::AccountNotFound(line.account_id)),
            }
        }

        let next_entry = inner
            .entry_sequences
            .get(&transaction.organization_id)
            .copied()
            .unwrap_or(0)
            + 1;
        inner
            .entry_sequences
            .insert(transaction.organization_id, next_entry);
        transaction.entry_number = next_entry;

        for line in &transaction.lines {
            if let Some(account) = inner.accounts.get_mut(&line.account_id) {
                account.apply_posting(&line.debit, &line.credit);
            }
        }

        inner
            .transactions
            .insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn get_transaction(&self, transaction_id: Uuid) -> LedgerResult<Option<Transaction>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .transactions
            .get(&transaction_id)
            .cloned())
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>> {
        let inner = self.inner.read().unwrap();
        let mut transactions: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|txn| filter.matches(txn))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.entry_number.cmp(&b.entry_number)));
        Ok(transactions)
    }

    async fn find_reversal_of(
        &self,
        transaction_id: Uuid,
    ) -> LedgerResult<Option<Transaction>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .transactions
            .values()
            .find(|txn| {
                txn.source.kind == SourceKind::Reversal
                    && txn.source.document_id == Some(transaction_id)
            })
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn sample_account(org: Uuid, code: &str, account_type: AccountType) -> Account {
        Account::new(
            org,
            code.to_string(),
            format!("Account {code}"),
            account_type,
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_commit_assigns_sequential_entry_numbers_per_org() {
        let mut store = MemoryStore::new();
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();

        for org in [org_a, org_b] {
            let cash = sample_account(org, "1000", AccountType::Asset);
            let revenue = sample_account(org, "4000", AccountType::Revenue);
            store.save_account(&cash).await.unwrap();
            store.save_account(&revenue).await.unwrap();

            let ctx = OrgContext::new(org, Uuid::new_v4());
            for n in 1..=3u64 {
                let txn = Transaction::new(
                    &ctx,
                    NaiveDate::from_ymd_opt(2024, 1, n as u32).unwrap(),
                    "sale".to_string(),
                    DocumentSource::new(SourceKind::ManualJournal, None),
                    vec![
                        JournalLine::debit(cash.id, BigDecimal::from(100), None),
                        JournalLine::credit(revenue.id, BigDecimal::from(100), None),
                    ],
                );
                let committed = store.commit_posting(txn).await.unwrap();
                assert_eq!(committed.entry_number, n);
            }
        }
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_no_partial_state() {
        let mut store = MemoryStore::new();
        let org = Uuid::new_v4();
        let cash = sample_account(org, "1000", AccountType::Asset);
        store.save_account(&cash).await.unwrap();

        let ctx = OrgContext::new(org, Uuid::new_v4());
        let txn = Transaction::new(
            &ctx,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "bad".to_string(),
            DocumentSource::new(SourceKind::ManualJournal, None),
            vec![
                JournalLine::debit(cash.id, BigDecimal::from(100), None),
                JournalLine::credit(Uuid::new_v4(), BigDecimal::from(100), None),
            ],
        );

        assert!(matches!(
            store.commit_posting(txn).await,
            Err(LedgerError::AccountNotFound(_))
        ));

        let cash_after = store.get_account(cash.id).await.unwrap().unwrap();
        assert_eq!(cash_after.balance, BigDecimal::from(0));
        let filter = TransactionFilter::for_org(org);
        assert!(store.query_transactions(&filter).await.unwrap().is_empty());
    }
}
