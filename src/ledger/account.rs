//! Chart of accounts management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Fields for creating a new account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Account code, unique within the organization
    pub code: String,
    /// Human-readable account name
    pub name: String,
    /// Type of account
    pub account_type: AccountType,
    /// Optional reporting category
    pub category: Option<String>,
    /// Optional parent account
    pub parent_id: Option<Uuid>,
}

impl NewAccount {
    /// Create the required fields; category and parent default to none
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            category: None,
            parent_id: None,
        }
    }

    /// Set the reporting category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the parent account
    pub fn parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// One node of the account hierarchy produced by [`build_hierarchy`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNode {
    /// The account at this node
    pub account: Account,
    /// Child accounts, ordered by code
    pub children: Vec<AccountNode>,
}

/// Build the account forest from a flat list of accounts.
///
/// Pure function: nodes are linked by `parent_id`; an account whose parent
/// is not present in the input (deactivated or deleted parent) becomes a
/// root node rather than being dropped. Roots and children are ordered by
/// account code, so repeated calls on the same input produce structurally
/// identical trees.
pub fn build_hierarchy(accounts: &[Account]) -> Vec<AccountNode> {
    let known: std::collections::HashSet<Uuid> = accounts.iter().map(|a| a.id).collect();

    let mut children_of: HashMap<Uuid, Vec<&Account>> = HashMap::new();
    let mut roots: Vec<&Account> = Vec::new();

    for account in accounts {
        match account.parent_id {
            Some(parent_id) if known.contains(&parent_id) => {
                children_of.entry(parent_id).or_default().push(account);
            }
            _ => roots.push(account),
        }
    }

    fn build_node(account: &Account, children_of: &HashMap<Uuid, Vec<&Account>>) -> AccountNode {
        let mut children: Vec<AccountNode> = children_of
            .get(&account.id)
            .map(|kids| {
                kids.iter()
                    .map(|child| build_node(child, children_of))
                    .collect()
            })
            .unwrap_or_default();
        children.sort_by(|a, b| a.account.code.cmp(&b.account.code));
        AccountNode {
            account: account.clone(),
            children,
        }
    }

    let mut forest: Vec<AccountNode> = roots
        .iter()
        .map(|root| build_node(root, &children_of))
        .collect();
    forest.sort_by(|a, b| a.account.code.cmp(&b.account.code));
    forest
}

/// Account manager owning chart-of-accounts operations for all tenants
pub struct AccountManager<S: LedgerStore> {
    pub(crate) storage: S,
    validator: Box<dyn AccountValidator>,
}

impl<S: LedgerStore> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultAccountValidator),
        }
    }

    /// Create a new account manager with a custom validator
    pub fn with_validator(storage: S, validator: Box<dyn AccountValidator>) -> Self {
        Self { storage, validator }
    }

    /// Create a new account in the organization's chart.
    ///
    /// The code must be unused within the organization. When a parent is
    /// given it must exist, belong to the same organization, and share the
    /// child's account type: the chart hierarchy never crosses the
    /// asset/liability/equity/revenue/expense partition.
    pub async fn create_account(
        &mut self,
        ctx: &OrgContext,
        new_account: NewAccount,
    ) -> LedgerResult<Account> {
        let account = Account::new(
            ctx.organization_id,
            new_account.code,
            new_account.name,
            new_account.account_type,
            new_account.category,
            new_account.parent_id,
        );

        self.validator.validate_account(&account)?;

        if self
            .storage
            .find_account_by_code(ctx.organization_id, &account.code)
            .await?
            .is_some()
        {
            return Err(LedgerError::Validation(format!(
                "Account code '{}' already exists in this organization",
                account.code
            )));
        }

        if let Some(parent_id) = account.parent_id {
            let parent = self
                .storage
                .get_account(parent_id)
                .await?
                .ok_or(LedgerError::AccountNotFound(parent_id))?;

            if parent.organization_id != ctx.organization_id {
                return Err(LedgerError::CrossTenant {
                    expected: ctx.organization_id,
                    found: parent.organization_id,
                });
            }

            if parent.account_type != account.account_type {
                return Err(LedgerError::InvalidAccount {
                    account_id: parent_id,
                    reason: format!(
                        "parent account is {:?} but child is {:?}; the hierarchy cannot cross the account type partition",
                        parent.account_type, account.account_type
                    ),
                });
            }
        }

        self.storage.save_account(&account).await?;
        tracing::debug!(
            organization_id = %ctx.organization_id,
            account_id = %account.id,
            code = %account.code,
            "account created"
        );

        Ok(account)
    }

    /// Get an account by id, scoped to the caller's organization
    pub async fn get_account(
        &self,
        ctx: &OrgContext,
        account_id: Uuid,
    ) -> LedgerResult<Option<Account>> {
        Ok(self
            .storage
            .get_account(account_id)
            .await?
            .filter(|account| account.organization_id == ctx.organization_id))
    }

    /// Get an account by id, returning an error if not found in the
    /// caller's organization
    pub async fn get_account_required(
        &self,
        ctx: &OrgContext,
        account_id: Uuid,
    ) -> LedgerResult<Account> {
        self.get_account(ctx, account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Look up an account by its code
    pub async fn find_by_code(
        &self,
        ctx: &OrgContext,
        code: &str,
    ) -> LedgerResult<Option<Account>> {
        self.storage
            .find_account_by_code(ctx.organization_id, code)
            .await
    }

    /// List all accounts of the organization
    pub async fn list_accounts(&self, ctx: &OrgContext) -> LedgerResult<Vec<Account>> {
        self.storage.list_accounts(ctx.organization_id, None).await
    }

    /// List the organization's accounts of one type
    pub async fn list_accounts_by_type(
        &self,
        ctx: &OrgContext,
        account_type: AccountType,
    ) -> LedgerResult<Vec<Account>> {
        self.storage
            .list_accounts(ctx.organization_id, Some(account_type))
            .await
    }

    /// The organization's account hierarchy
    pub async fn chart(&self, ctx: &OrgContext) -> LedgerResult<Vec<AccountNode>> {
        let accounts = self.list_accounts(ctx).await?;
        Ok(build_hierarchy(&accounts))
    }

    /// Update account metadata (name, category).
    ///
    /// Code, type, organization, and balance are not editable through this
    /// path.
    pub async fn update_metadata(
        &mut self,
        ctx: &OrgContext,
        account_id: Uuid,
        name: Option<String>,
        category: Option<String>,
    ) -> LedgerResult<Account> {
        let mut account = self.get_account_required(ctx, account_id).await?;
        if let Some(name) = name {
            account.name = name;
        }
        if let Some(category) = category {
            account.category = Some(category);
        }
        account.updated_at = chrono::Utc::now().naive_utc();
        self.validator.validate_account(&account)?;
        self.storage.update_account(&account).await?;
        Ok(account)
    }

    /// Soft-deactivate an account.
    ///
    /// History is kept and remains reportable; the posting engine refuses
    /// new postings against an inactive account.
    pub async fn deactivate_account(
        &mut self,
        ctx: &OrgContext,
        account_id: Uuid,
    ) -> LedgerResult<Account> {
        let mut account = self.get_account_required(ctx, account_id).await?;
        account.is_active = false;
        account.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_account(&account).await?;
        tracing::info!(
            organization_id = %ctx.organization_id,
            account_id = %account_id,
            code = %account.code,
            "account deactivated"
        );
        Ok(account)
    }

    /// Hard-remove an account that has never been posted against.
    ///
    /// Accounts referenced by any journal line can only be deactivated.
    pub async fn delete_account(&mut self, ctx: &OrgContext, account_id: Uuid) -> LedgerResult<()> {
        let account = self.get_account_required(ctx, account_id).await?;
        if self.storage.has_postings(account.id).await? {
            return Err(LedgerError::AccountInUse(account.id));
        }
        self.storage.delete_account(account.id).await
    }
}

/// Utility functions for working with accounts
pub mod utils {
    use super::*;

    /// Seed a standard chart of accounts for a small business.
    ///
    /// Returns the created accounts keyed by a stable handle.
    pub async fn setup_standard_chart<S: LedgerStore>(
        manager: &mut AccountManager<S>,
        ctx: &OrgContext,
    ) -> LedgerResult<HashMap<String, Account>> {
        let chart = [
            ("cash", "1000", "Cash", AccountType::Asset),
            ("accounts_receivable", "1200", "Accounts Receivable", AccountType::Asset),
            ("inventory", "1300", "Inventory", AccountType::Asset),
            ("fixed_assets", "1500", "Fixed Assets", AccountType::Asset),
            (
                "accumulated_depreciation",
                "1510",
                "Accumulated Depreciation",
                AccountType::Asset,
            ),
            ("accounts_payable", "2000", "Accounts Payable", AccountType::Liability),
            ("tax_payable", "2200", "Tax Payable", AccountType::Liability),
            ("tax_recoverable", "1400", "Tax Recoverable", AccountType::Asset),
            ("owners_equity", "3000", "Owner's Equity", AccountType::Equity),
            ("retained_earnings", "3200", "Retained Earnings", AccountType::Equity),
            ("sales_revenue", "4000", "Sales Revenue", AccountType::Revenue),
            ("service_revenue", "4100", "Service Revenue", AccountType::Revenue),
            ("cost_of_goods_sold", "5000", "Cost of Goods Sold", AccountType::Expense),
            ("rent_expense", "6000", "Rent Expense", AccountType::Expense),
            (
                "depreciation_expense",
                "6200",
                "Depreciation Expense",
                AccountType::Expense,
            ),
        ];

        let mut accounts = HashMap::new();
        for (key, code, name, account_type) in chart {
            let account = manager
                .create_account(ctx, NewAccount::new(code, name, account_type))
                .await?;
            accounts.insert(key.to_string(), account);
        }

        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(org: Uuid, code: &str, parent: Option<Uuid>) -> Account {
        Account::new(
            org,
            code.to_string(),
            format!("Account {code}"),
            AccountType::Asset,
            None,
            parent,
        )
    }

    #[test]
    fn test_hierarchy_links_children_under_parents() {
        let org = Uuid::new_v4();
        let parent = account(org, "1000", None);
        let child_a = account(org, "1020", Some(parent.id));
        let child_b = account(org, "1010", Some(parent.id));

        let forest = build_hierarchy(&[parent.clone(), child_a, child_b]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].account.id, parent.id);
        let codes: Vec<&str> = forest[0]
            .children
            .iter()
            .map(|n| n.account.code.as_str())
            .collect();
        assert_eq!(codes, vec!["1010", "1020"]);
    }

    #[test]
    fn test_hierarchy_orphans_become_roots() {
        let org = Uuid::new_v4();
        let root = account(org, "1000", None);
        let orphan = account(org, "1100", Some(Uuid::new_v4()));

        let forest = build_hierarchy(&[root, orphan.clone()]);

        assert_eq!(forest.len(), 2);
        assert!(forest.iter().any(|n| n.account.id == orphan.id));
    }

    #[test]
    fn test_hierarchy_is_idempotent() {
        let org = Uuid::new_v4();
        let parent = account(org, "1000", None);
        let child = account(org, "1100", Some(parent.id));
        let grandchild = account(org, "1110", Some(child.id));
        let orphan = account(org, "1900", Some(Uuid::new_v4()));
        let accounts = vec![parent, child, grandchild, orphan];

        let first = build_hierarchy(&accounts);
        let second = build_hierarchy(&accounts);

        assert_eq!(first, second);
    }
}
