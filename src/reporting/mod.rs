//! Financial statement generation
//!
//! Statements are recomputed from journal lines rather than from the
//! materialized account balances, so the two representations can validate
//! each other (see `Ledger::validate_integrity`). Nothing in this module
//! mutates state. Report records are plain serializable data; formatting
//! (currency strings, PDF, CSV) belongs to the layers above.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::ledger::transaction::TransactionFilter;
use crate::traits::*;
use crate::types::*;

/// Profit and loss statement over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    /// Organization reported on
    pub organization_id: Uuid,
    /// First day of the period, inclusive
    pub start_date: NaiveDate,
    /// Last day of the period, inclusive
    pub end_date: NaiveDate,
    /// Revenue account movements within the period
    pub revenue: Vec<AccountBalance>,
    /// Expense account movements within the period
    pub expenses: Vec<AccountBalance>,
    /// Total revenue for the period
    pub total_revenue: BigDecimal,
    /// Total expenses for the period
    pub total_expenses: BigDecimal,
    /// Net income: revenue minus expenses
    pub net_income: BigDecimal,
}

/// Balance sheet as of a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    /// Organization reported on
    pub organization_id: Uuid,
    /// Reporting date
    pub as_of_date: NaiveDate,
    /// Asset account balances
    pub assets: Vec<AccountBalance>,
    /// Liability account balances
    pub liabilities: Vec<AccountBalance>,
    /// Equity account balances, including net income to date
    pub equity: Vec<AccountBalance>,
    /// Total assets
    pub total_assets: BigDecimal,
    /// Total liabilities
    pub total_liabilities: BigDecimal,
    /// Total equity
    pub total_equity: BigDecimal,
    /// Whether assets equal liabilities plus equity
    pub is_balanced: bool,
}

/// Per-account debit and credit sums over a set of transactions
#[derive(Debug, Default, Clone)]
struct Movement {
    debits: BigDecimal,
    credits: BigDecimal,
}

impl Movement {
    /// Net movement on the account's normal side
    fn net_for(&self, account_type: AccountType) -> BigDecimal {
        match account_type.normal_balance() {
            EntryType::Debit => &self.debits - &self.credits,
            EntryType::Credit => &self.credits - &self.debits,
        }
    }

    fn is_zero(&self) -> bool {
        let zero = BigDecimal::from(0);
        self.debits == zero && self.credits == zero
    }
}

/// Generator for trial balance, profit and loss, and balance sheet
pub struct ReportGenerator<S: LedgerStore> {
    storage: S,
}

impl<S: LedgerStore> ReportGenerator<S> {
    /// Create a generator over the given store
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Trial balance: every account's balance as of a date, reported on its
    /// normal side.
    ///
    /// Rows cover accounts that are active or carry ledger movement, ordered
    /// by account code; a deactivated account with history still reports,
    /// otherwise total debits could not equal total credits. An account
    /// whose balance goes negative flips to the opposite side.
    pub async fn trial_balance(
        &self,
        organization_id: Uuid,
        as_of_date: NaiveDate,
    ) -> LedgerResult<TrialBalance> {
        let movements = self
            .movements(organization_id, None, Some(as_of_date))
            .await?;

        let mut accounts = self.storage.list_accounts(organization_id, None).await?;
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let mut rows = Vec::new();
        let mut total_debits = BigDecimal::from(0);
        let mut total_credits = BigDecimal::from(0);

        for account in accounts {
            let movement = movements.get(&account.id).cloned().unwrap_or_default();
            if !account.is_active && movement.is_zero() {
                continue;
            }

            let net = movement.net_for(account.account_type);
            let row = classify(account, net);
            if let Some(debit) = &row.debit_balance {
                total_debits += debit;
            }
            if let Some(credit) = &row.credit_balance {
                total_credits += credit;
            }
            rows.push(row);
        }

        let is_balanced = round_money(&total_debits) == round_money(&total_credits);

        Ok(TrialBalance {
            organization_id,
            as_of_date,
            rows,
            total_debits,
            total_credits,
            is_balanced,
        })
    }

    /// Profit and loss: revenue and expense movements strictly within the
    /// period.
    pub async fn profit_and_loss(
        &self,
        organization_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<ProfitAndLoss> {
        let movements = self
            .movements(organization_id, Some(start_date), Some(end_date))
            .await?;

        let mut accounts = self.storage.list_accounts(organization_id, None).await?;
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let mut revenue = Vec::new();
        let mut expenses = Vec::new();
        let mut total_revenue = BigDecimal::from(0);
        let mut total_expenses = BigDecimal::from(0);

        for account in accounts {
            let movement = match movements.get(&account.id) {
                Some(m) => m.clone(),
                None => continue,
            };
            let net = movement.net_for(account.account_type);
            match account.account_type {
                AccountType::Revenue => {
                    total_revenue += &net;
                    revenue.push(classify(account, net));
                }
                AccountType::Expense => {
                    total_expenses += &net;
                    expenses.push(classify(account, net));
                }
                _ => {}
            }
        }

        let net_income = &total_revenue - &total_expenses;

        Ok(ProfitAndLoss {
            organization_id,
            start_date,
            end_date,
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_income,
        })
    }

    /// Balance sheet as of a date.
    ///
    /// Net income to date is folded into equity as a synthetic row, so the
    /// accounting equation (assets = liabilities + equity) holds for any
    /// valid ledger state.
    pub async fn balance_sheet(
        &self,
        organization_id: Uuid,
        as_of_date: NaiveDate,
    ) -> LedgerResult<BalanceSheet> {
        let movements = self
            .movements(organization_id, None, Some(as_of_date))
            .await?;

        let mut accounts = self.storage.list_accounts(organization_id, None).await?;
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let mut assets = Vec::new();
        let mut liabilities = Vec::new();
        let mut equity = Vec::new();
        let mut total_assets = BigDecimal::from(0);
        let mut total_liabilities = BigDecimal::from(0);
        let mut total_equity = BigDecimal::from(0);
        let mut net_income = BigDecimal::from(0);

        for account in &accounts {
            let movement = movements.get(&account.id).cloned().unwrap_or_default();
            if !account.is_active && movement.is_zero() {
                continue;
            }
            let net = movement.net_for(account.account_type);
            match account.account_type {
                AccountType::Asset => {
                    total_assets += &net;
                    assets.push(classify(account.clone(), net));
                }
                AccountType::Liability => {
                    total_liabilities += &net;
                    liabilities.push(classify(account.clone(), net));
                }
                AccountType::Equity => {
                    total_equity += &net;
                    equity.push(classify(account.clone(), net));
                }
                AccountType::Revenue => net_income += &net,
                AccountType::Expense => net_income -= &net,
            }
        }

        if net_income != BigDecimal::from(0) {
            let earnings_account = Account::new(
                organization_id,
                "3999".to_string(),
                "Net Income".to_string(),
                AccountType::Equity,
                None,
                None,
            );
            total_equity += &net_income;
            equity.push(classify(earnings_account, net_income));
        }

        let is_balanced = round_money(&total_assets)
            == round_money(&(&total_liabilities + &total_equity));

        Ok(BalanceSheet {
            organization_id,
            as_of_date,
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            is_balanced,
        })
    }

    /// Recompute every account's all-time balance from journal lines.
    ///
    /// Independent check against the materialized `Account.balance`
    /// aggregates.
    pub async fn recomputed_balances(
        &self,
        organization_id: Uuid,
    ) -> LedgerResult<HashMap<Uuid, BigDecimal>> {
        let movements = self.movements(organization_id, None, None).await?;
        let accounts = self.storage.list_accounts(organization_id, None).await?;

        Ok(accounts
            .into_iter()
            .map(|account| {
                let net = movements
                    .get(&account.id)
                    .cloned()
                    .unwrap_or_default()
                    .net_for(account.account_type);
                (account.id, net)
            })
            .collect())
    }

    async fn movements(
        &self,
        organization_id: Uuid,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> LedgerResult<HashMap<Uuid, Movement>> {
        let mut filter = TransactionFilter::for_org(organization_id);
        filter.date_from = date_from;
        filter.date_to = date_to;

        let transactions = self.storage.query_transactions(&filter).await?;
        let mut movements: HashMap<Uuid, Movement> = HashMap::new();

        for transaction in &transactions {
            for line in &transaction.lines {
                let movement = movements.entry(line.account_id).or_default();
                movement.debits += &line.debit;
                movement.credits += &line.credit;
            }
        }

        Ok(movements)
    }
}

/// Place a net balance on the account's normal side, flipping to the
/// opposite side when negative
fn classify(account: Account, net: BigDecimal) -> AccountBalance {
    let zero = BigDecimal::from(0);
    match account.account_type.normal_balance() {
        EntryType::Debit => {
            if net >= zero {
                AccountBalance {
                    account,
                    debit_balance: Some(net),
                    credit_balance: None,
                }
            } else {
                AccountBalance {
                    account,
                    debit_balance: None,
                    credit_balance: Some(net.abs()),
                }
            }
        }
        EntryType::Credit => {
            if net >= zero {
                AccountBalance {
                    account,
                    debit_balance: None,
                    credit_balance: Some(net),
                }
            } else {
                AccountBalance {
                    account,
                    debit_balance: Some(net.abs()),
                    credit_balance: None,
                }
            }
        }
    }
}
