//! Main ledger orchestrator that coordinates accounts, posting, and reports

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::ledger::account::{AccountManager, AccountNode, NewAccount};
use crate::ledger::posting::{Document, PostingEngine};
use crate::ledger::transaction::{TransactionFilter, TransactionQuery};
use crate::reporting::{BalanceSheet, ProfitAndLoss, ReportGenerator};
use crate::traits::*;
use crate::types::*;

/// Main ledger engine orchestrating all accounting operations for any
/// number of organizations.
///
/// All mutating operations take `&mut self`, so one ledger instance is a
/// single writer by construction; stores provide the per-organization
/// atomic commit underneath. Reads may see the state before or after an
/// in-flight posting but never a partially applied one.
pub struct Ledger<S: LedgerStore> {
    accounts: AccountManager<S>,
    posting: PostingEngine<S>,
    query: TransactionQuery<S>,
    reports: ReportGenerator<S>,
}

impl<S: LedgerStore + Clone> Ledger<S> {
    /// Create a new ledger over the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            accounts: AccountManager::new(storage.clone()),
            posting: PostingEngine::new(storage.clone()),
            query: TransactionQuery::new(storage.clone()),
            reports: ReportGenerator::new(storage),
        }
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        storage: S,
        account_validator: Box<dyn AccountValidator>,
        journal_validator: Box<dyn JournalValidator>,
    ) -> Self {
        Self {
            accounts: AccountManager::with_validator(storage.clone(), account_validator),
            posting: PostingEngine::with_validator(storage.clone(), journal_validator),
            query: TransactionQuery::new(storage.clone()),
            reports: ReportGenerator::new(storage),
        }
    }

    // Account operations

    /// Create a new account in the organization's chart
    pub async fn create_account(
        &mut self,
        ctx: &OrgContext,
        new_account: NewAccount,
    ) -> LedgerResult<Account> {
        self.accounts.create_account(ctx, new_account).await
    }

    /// Get an account by id
    pub async fn get_account(
        &self,
        ctx: &OrgContext,
        account_id: Uuid,
    ) -> LedgerResult<Option<Account>> {
        self.accounts.get_account(ctx, account_id).await
    }

    /// Look up an account by its code
    pub async fn find_account_by_code(
        &self,
        ctx: &OrgContext,
        code: &str,
    ) -> LedgerResult<Option<Account>> {
        self.accounts.find_by_code(ctx, code).await
    }

    /// List all accounts of the organization
    pub async fn list_accounts(&self, ctx: &OrgContext) -> LedgerResult<Vec<Account>> {
        self.accounts.list_accounts(ctx).await
    }

    /// List accounts of one type
    pub async fn list_accounts_by_type(
        &self,
        ctx: &OrgContext,
        account_type: AccountType,
    ) -> LedgerResult<Vec<Account>> {
        self.accounts.list_accounts_by_type(ctx, account_type).await
    }

    /// The organization's account hierarchy
    pub async fn chart(&self, ctx: &OrgContext) -> LedgerResult<Vec<AccountNode>> {
        self.accounts.chart(ctx).await
    }

    /// Update an account's name or category
    pub async fn update_account_metadata(
        &mut self,
        ctx: &OrgContext,
        account_id: Uuid,
        name: Option<String>,
        category: Option<String>,
    ) -> LedgerResult<Account> {
        self.accounts
            .update_metadata(ctx, account_id, name, category)
            .await
    }

    /// Soft-deactivate an account; its history stays reportable
    pub async fn deactivate_account(
        &mut self,
        ctx: &OrgContext,
        account_id: Uuid,
    ) -> LedgerResult<Account> {
        self.accounts.deactivate_account(ctx, account_id).await
    }

    /// Remove an account that has never been posted against
    pub async fn delete_account(&mut self, ctx: &OrgContext, account_id: Uuid) -> LedgerResult<()> {
        self.accounts.delete_account(ctx, account_id).await
    }

    /// Seed a standard small-business chart of accounts
    pub async fn setup_standard_chart(
        &mut self,
        ctx: &OrgContext,
    ) -> LedgerResult<HashMap<String, Account>> {
        crate::ledger::account::utils::setup_standard_chart(&mut self.accounts, ctx).await
    }

    // Posting operations

    /// Post a document as a balanced, immutable transaction
    pub async fn post(&mut self, ctx: &OrgContext, document: &Document) -> LedgerResult<Transaction> {
        self.posting.post(ctx, document).await
    }

    /// Void a posted transaction by committing its reversal
    pub async fn void_transaction(
        &mut self,
        ctx: &OrgContext,
        transaction_id: Uuid,
        reason: &str,
    ) -> LedgerResult<Transaction> {
        self.posting
            .void_transaction(ctx, transaction_id, reason)
            .await
    }

    // Queries

    /// Get a transaction by id
    pub async fn get_transaction(
        &self,
        ctx: &OrgContext,
        transaction_id: Uuid,
    ) -> LedgerResult<Option<Transaction>> {
        self.query.get(ctx, transaction_id).await
    }

    /// Run a ledger query
    pub async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> LedgerResult<Vec<Transaction>> {
        self.query.query(filter).await
    }

    /// All transactions touching one account within an optional date range
    pub async fn account_history(
        &self,
        ctx: &OrgContext,
        account_id: Uuid,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.query
            .account_history(ctx, account_id, date_from, date_to)
            .await
    }

    // Reports

    /// Trial balance as of a date
    pub async fn trial_balance(
        &self,
        ctx: &OrgContext,
        as_of_date: NaiveDate,
    ) -> LedgerResult<TrialBalance> {
        self.reports
            .trial_balance(ctx.organization_id, as_of_date)
            .await
    }

    /// Profit and loss over a period
    pub async fn profit_and_loss(
        &self,
        ctx: &OrgContext,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<ProfitAndLoss> {
        self.reports
            .profit_and_loss(ctx.organization_id, start_date, end_date)
            .await
    }

    /// Balance sheet as of a date
    pub async fn balance_sheet(
        &self,
        ctx: &OrgContext,
        as_of_date: NaiveDate,
    ) -> LedgerResult<BalanceSheet> {
        self.reports
            .balance_sheet(ctx.organization_id, as_of_date)
            .await
    }

    /// Validate the integrity of the organization's ledger.
    ///
    /// Cross-checks the trial balance, the balance sheet equation, and the
    /// materialized account balances against balances recomputed from the
    /// journal lines.
    pub async fn validate_integrity(
        &self,
        ctx: &OrgContext,
        as_of_date: NaiveDate,
    ) -> LedgerResult<LedgerIntegrityReport> {
        let trial_balance = self.trial_balance(ctx, as_of_date).await?;
        let balance_sheet = self.balance_sheet(ctx, as_of_date).await?;

        let mut issues = Vec::new();

        if !trial_balance.is_balanced {
            issues.push(format!(
                "Trial balance is not balanced: debits = {}, credits = {}",
                trial_balance.total_debits, trial_balance.total_credits
            ));
        }

        let total_liabilities_equity =
            &balance_sheet.total_liabilities + &balance_sheet.total_equity;

        if !balance_sheet.is_balanced {
            issues.push(format!(
                "Balance sheet is not balanced: assets = {}, liabilities + equity = {}",
                balance_sheet.total_assets, total_liabilities_equity
            ));
        }

        let recomputed = self
            .reports
            .recomputed_balances(ctx.organization_id)
            .await?;
        for account in self.list_accounts(ctx).await? {
            if let Some(expected) = recomputed.get(&account.id) {
                if round_money(&account.balance) != round_money(expected) {
                    issues.push(format!(
                        "Account {} materialized balance {} differs from recomputed {}",
                        account.code, account.balance, expected
                    ));
                }
            }
        }

        Ok(LedgerIntegrityReport {
            organization_id: ctx.organization_id,
            as_of_date,
            is_valid: issues.is_empty(),
            issues,
            trial_balance_total_debits: trial_balance.total_debits,
            trial_balance_total_credits: trial_balance.total_credits,
            balance_sheet_total_assets: balance_sheet.total_assets,
            balance_sheet_total_liabilities_equity: total_liabilities_equity,
        })
    }
}

/// Report on ledger integrity and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    pub organization_id: Uuid,
    pub as_of_date: NaiveDate,
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub trial_balance_total_debits: BigDecimal,
    pub trial_balance_total_credits: BigDecimal,
    pub balance_sheet_total_assets: BigDecimal,
    pub balance_sheet_total_liabilities_equity: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::posting::{DocumentLine, Invoice};
    use crate::utils::memory_store::MemoryStore;
    use std::str::FromStr;

    fn money(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_ledger_basic_operations() {
        let storage = MemoryStore::new();
        let mut ledger = Ledger::new(storage);
        let ctx = OrgContext::new(Uuid::new_v4(), Uuid::new_v4());

        let receivable = ledger
            .create_account(
                &ctx,
                NewAccount::new("1200", "Accounts Receivable", AccountType::Asset),
            )
            .await
            .unwrap();
        let revenue = ledger
            .create_account(&ctx, NewAccount::new("4000", "Sales Revenue", AccountType::Revenue))
            .await
            .unwrap();

        let invoice = Invoice {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            narration: "Sale of goods".to_string(),
            contact_id: None,
            receivable_account_id: receivable.id,
            lines: vec![DocumentLine::new(revenue.id, money("1"), money("1000.00"))],
            tax: None,
        };

        let transaction = ledger.post(&ctx, &Document::Invoice(invoice)).await.unwrap();
        assert_eq!(transaction.entry_number, 1);
        assert!(transaction.is_balanced());

        let receivable_after = ledger
            .get_account(&ctx, receivable.id)
            .await
            .unwrap()
            .unwrap();
        let revenue_after = ledger.get_account(&ctx, revenue.id).await.unwrap().unwrap();
        assert_eq!(receivable_after.balance, money("1000.00"));
        assert_eq!(revenue_after.balance, money("1000.00"));

        let report = ledger
            .validate_integrity(&ctx, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
            .await
            .unwrap();
        assert!(report.is_valid, "issues: {:?}", report.issues);
    }
}
