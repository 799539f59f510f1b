//! Posting engine: turns business documents into balanced transactions
//!
//! Every document kind funnels through [`PostingEngine::post`], which derives
//! the journal lines the document's semantics require, validates account
//! references and balance, and commits the transaction atomically.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tax::TaxCharge;
use crate::traits::*;
use crate::types::*;

/// One line item of an invoice or bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    /// Revenue account (invoice) or expense/asset account (bill) this line
    /// posts against
    pub account_id: Uuid,
    /// Optional line description
    pub description: Option<String>,
    /// Quantity sold or purchased
    pub quantity: BigDecimal,
    /// Price per unit
    pub unit_price: BigDecimal,
}

impl DocumentLine {
    /// Create a line item
    pub fn new(account_id: Uuid, quantity: BigDecimal, unit_price: BigDecimal) -> Self {
        Self {
            account_id,
            description: None,
            quantity,
            unit_price,
        }
    }

    /// Set the line description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Line total before tax
    pub fn total(&self) -> BigDecimal {
        &self.quantity * &self.unit_price
    }
}

/// A sales invoice awaiting posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Document id
    pub id: Uuid,
    /// Issue date
    pub date: NaiveDate,
    /// Narration for the resulting transaction
    pub narration: String,
    /// Customer reference
    pub contact_id: Option<Uuid>,
    /// Accounts-receivable account debited for the total
    pub receivable_account_id: Uuid,
    /// Line items credited to their revenue accounts
    pub lines: Vec<DocumentLine>,
    /// Output tax charge, credited to the tax account
    pub tax: Option<TaxCharge>,
}

impl Invoice {
    /// Sum of line totals before tax
    pub fn subtotal(&self) -> BigDecimal {
        self.lines.iter().map(DocumentLine::total).sum()
    }

    /// Invoice total: subtotal plus tax, rounded once at the final total
    pub fn total(&self) -> BigDecimal {
        let tax = self
            .tax
            .as_ref()
            .map(|t| t.amount.clone())
            .unwrap_or_else(|| BigDecimal::from(0));
        round_money(&(self.subtotal() + tax))
    }
}

/// A purchase bill awaiting posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Document id
    pub id: Uuid,
    /// Issue date
    pub date: NaiveDate,
    /// Narration for the resulting transaction
    pub narration: String,
    /// Supplier reference
    pub contact_id: Option<Uuid>,
    /// Accounts-payable account credited for the total
    pub payable_account_id: Uuid,
    /// Line items debited to their expense or asset accounts
    pub lines: Vec<DocumentLine>,
    /// Input tax charge, debited to the tax recoverable account
    pub tax: Option<TaxCharge>,
}

impl Bill {
    /// Sum of line totals before tax
    pub fn subtotal(&self) -> BigDecimal {
        self.lines.iter().map(DocumentLine::total).sum()
    }

    /// Bill total: subtotal plus tax, rounded once at the final total
    pub fn total(&self) -> BigDecimal {
        let tax = self
            .tax
            .as_ref()
            .map(|t| t.amount.clone())
            .unwrap_or_else(|| BigDecimal::from(0));
        round_money(&(self.subtotal() + tax))
    }
}

/// Direction of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentDirection {
    /// Money received from a customer
    Received,
    /// Money paid to a supplier
    Made,
}

/// A payment received or made.
///
/// The engine posts the numeric movement only; whether the referenced
/// document becomes "paid" (including over- and underpayment policy) is
/// owned by the document layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Document id
    pub id: Uuid,
    /// Payment date
    pub date: NaiveDate,
    /// Narration for the resulting transaction
    pub narration: String,
    /// Direction of the movement
    pub direction: PaymentDirection,
    /// Bank or cash account
    pub bank_account_id: Uuid,
    /// Receivable (received) or payable (made) account being settled
    pub settlement_account_id: Uuid,
    /// Payment amount
    pub amount: BigDecimal,
    /// Invoice or bill this payment settles, for reference only
    pub document_id: Option<Uuid>,
    /// Counterparty reference
    pub contact_id: Option<Uuid>,
}

/// A user-entered journal: lines are specified directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualJournal {
    /// Document id
    pub id: Uuid,
    /// Journal date
    pub date: NaiveDate,
    /// Narration for the resulting transaction
    pub narration: String,
    /// Optional reference (e.g. a source document number)
    pub reference: Option<String>,
    /// User-specified debit and credit lines
    pub lines: Vec<JournalLine>,
}

impl ManualJournal {
    /// Validate the journal's lines without posting it
    pub fn validate(&self) -> LedgerResult<()> {
        if self.lines.len() < 2 {
            return Err(LedgerError::Validation(
                "Journal must have at least two lines".to_string(),
            ));
        }
        for line in &self.lines {
            line.validate()?;
        }
        let debits = round_money(&self.lines.iter().map(|l| &l.debit).sum::<BigDecimal>());
        let credits = round_money(&self.lines.iter().map(|l| &l.credit).sum::<BigDecimal>());
        if debits != credits || debits <= BigDecimal::from(0) {
            return Err(LedgerError::UnbalancedEntry { debits, credits });
        }
        Ok(())
    }
}

/// One period's depreciation charge for a fixed asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationRun {
    /// Document id
    pub id: Uuid,
    /// Asset being depreciated
    pub asset_id: Uuid,
    /// Period number within the asset's life (1-based)
    pub period: u32,
    /// Posting date for the charge
    pub date: NaiveDate,
    /// Narration for the resulting transaction
    pub narration: String,
    /// Depreciation expense account debited
    pub expense_account_id: Uuid,
    /// Accumulated depreciation account credited
    pub accumulated_account_id: Uuid,
    /// The period's depreciation amount
    pub amount: BigDecimal,
}

/// The closed set of documents the posting engine accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Document {
    /// Sales invoice
    Invoice(Invoice),
    /// Purchase bill
    Bill(Bill),
    /// User-entered journal
    ManualJournal(ManualJournal),
    /// Payment received or made
    Payment(Payment),
    /// Fixed-asset depreciation charge
    DepreciationRun(DepreciationRun),
}

impl Document {
    /// The source kind recorded on the resulting transaction
    pub fn kind(&self) -> SourceKind {
        match self {
            Document::Invoice(_) => SourceKind::Invoice,
            Document::Bill(_) => SourceKind::Bill,
            Document::ManualJournal(_) => SourceKind::ManualJournal,
            Document::Payment(_) => SourceKind::Payment,
            Document::DepreciationRun(_) => SourceKind::Depreciation,
        }
    }

    /// The originating document id
    pub fn document_id(&self) -> Uuid {
        match self {
            Document::Invoice(d) => d.id,
            Document::Bill(d) => d.id,
            Document::ManualJournal(d) => d.id,
            Document::Payment(d) => d.id,
            Document::DepreciationRun(d) => d.id,
        }
    }

    /// The date the resulting transaction takes effect
    pub fn date(&self) -> NaiveDate {
        match self {
            Document::Invoice(d) => d.date,
            Document::Bill(d) => d.date,
            Document::ManualJournal(d) => d.date,
            Document::Payment(d) => d.date,
            Document::DepreciationRun(d) => d.date,
        }
    }

    /// The narration of the resulting transaction
    pub fn narration(&self) -> &str {
        match self {
            Document::Invoice(d) => &d.narration,
            Document::Bill(d) => &d.narration,
            Document::ManualJournal(d) => &d.narration,
            Document::Payment(d) => &d.narration,
            Document::DepreciationRun(d) => &d.narration,
        }
    }

    /// Derive the journal lines this document's semantics require.
    ///
    /// Invoice: debit receivable for the total, credit each line's revenue
    /// account, credit tax when charged. Bill: the mirror image. Payment:
    /// bank against receivable/payable. Depreciation: expense against
    /// accumulated depreciation. Manual journals pass through unchanged.
    pub fn derive_lines(&self) -> LedgerResult<Vec<JournalLine>> {
        match self {
            Document::Invoice(invoice) => {
                if invoice.lines.is_empty() {
                    return Err(LedgerError::Validation(
                        "Invoice must have at least one line item".to_string(),
                    ));
                }
                let mut receivable = JournalLine::debit(
                    invoice.receivable_account_id,
                    invoice.total(),
                    Some("Invoice total".to_string()),
                );
                if let Some(contact_id) = invoice.contact_id {
                    receivable = receivable.with_contact(contact_id);
                }
                let mut lines = vec![receivable];
                for item in &invoice.lines {
                    lines.push(JournalLine::credit(
                        item.account_id,
                        item.total(),
                        item.description.clone(),
                    ));
                }
                if let Some(tax) = &invoice.tax {
                    if tax.amount > BigDecimal::from(0) {
                        lines.push(JournalLine::credit(
                            tax.account_id,
                            tax.amount.clone(),
                            Some("Tax on sale".to_string()),
                        ));
                    }
                }
                Ok(lines)
            }
            Document::Bill(bill) => {
                if bill.lines.is_empty() {
                    return Err(LedgerError::Validation(
                        "Bill must have at least one line item".to_string(),
                    ));
                }
                let mut lines = Vec::with_capacity(bill.lines.len() + 2);
                for item in &bill.lines {
                    lines.push(JournalLine::debit(
                        item.account_id,
                        item.total(),
                        item.description.clone(),
                    ));
                }
                if let Some(tax) = &bill.tax {
                    if tax.amount > BigDecimal::from(0) {
                        lines.push(JournalLine::debit(
                            tax.account_id,
                            tax.amount.clone(),
                            Some("Input tax".to_string()),
                        ));
                    }
                }
                let mut payable = JournalLine::credit(
                    bill.payable_account_id,
                    bill.total(),
                    Some("Bill total".to_string()),
                );
                if let Some(contact_id) = bill.contact_id {
                    payable = payable.with_contact(contact_id);
                }
                lines.push(payable);
                Ok(lines)
            }
            Document::ManualJournal(journal) => Ok(journal.lines.clone()),
            Document::Payment(payment) => {
                let amount = round_money(&payment.amount);
                let (debit_account, credit_account) = match payment.direction {
                    PaymentDirection::Received => {
                        (payment.bank_account_id, payment.settlement_account_id)
                    }
                    PaymentDirection::Made => {
                        (payment.settlement_account_id, payment.bank_account_id)
                    }
                };
                let mut debit = JournalLine::debit(debit_account, amount.clone(), None);
                let mut credit = JournalLine::credit(credit_account, amount, None);
                if let Some(contact_id) = payment.contact_id {
                    debit = debit.with_contact(contact_id);
                    credit = credit.with_contact(contact_id);
                }
                Ok(vec![debit, credit])
            }
            Document::DepreciationRun(run) => {
                let amount = round_money(&run.amount);
                Ok(vec![
                    JournalLine::debit(
                        run.expense_account_id,
                        amount.clone(),
                        Some(format!("Depreciation period {}", run.period)),
                    ),
                    JournalLine::credit(
                        run.accumulated_account_id,
                        amount,
                        Some(format!("Accumulated depreciation period {}", run.period)),
                    ),
                ])
            }
        }
    }
}

/// Builder for user-entered journals
#[derive(Debug)]
pub struct JournalBuilder {
    journal: ManualJournal,
}

impl JournalBuilder {
    /// Start a journal for the given date and narration
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            journal: ManualJournal {
                id: Uuid::new_v4(),
                date,
                narration: narration.into(),
                reference: None,
                lines: Vec::new(),
            },
        }
    }

    /// Set the journal reference
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.journal.reference = Some(reference.into());
        self
    }

    /// Add a debit line
    pub fn debit(mut self, account_id: Uuid, amount: BigDecimal) -> Self {
        self.journal
            .lines
            .push(JournalLine::debit(account_id, amount, None));
        self
    }

    /// Add a credit line
    pub fn credit(mut self, account_id: Uuid, amount: BigDecimal) -> Self {
        self.journal
            .lines
            .push(JournalLine::credit(account_id, amount, None));
        self
    }

    /// Add a pre-built line
    pub fn line(mut self, line: JournalLine) -> Self {
        self.journal.lines.push(line);
        self
    }

    /// Validate and build the journal document
    pub fn build(self) -> LedgerResult<ManualJournal> {
        self.journal.validate()?;
        Ok(self.journal)
    }
}

/// The single authority translating documents into committed transactions
pub struct PostingEngine<S: LedgerStore> {
    pub(crate) storage: S,
    validator: Box<dyn JournalValidator>,
}

impl<S: LedgerStore> PostingEngine<S> {
    /// Create a posting engine over the given store
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultJournalValidator),
        }
    }

    /// Create a posting engine with a custom journal validator
    pub fn with_validator(storage: S, validator: Box<dyn JournalValidator>) -> Self {
        Self { storage, validator }
    }

    /// Post a document: derive its journal lines, validate, and commit
    /// atomically.
    ///
    /// Every referenced account must exist, belong to the caller's
    /// organization, and be active; the derived lines must balance at
    /// currency precision with a strictly positive total. Any failure aborts
    /// before the first write, leaving the ledger and all balances
    /// untouched.
    pub async fn post(&mut self, ctx: &OrgContext, document: &Document) -> LedgerResult<Transaction> {
        let lines = document.derive_lines()?;
        let transaction = Transaction::new(
            ctx,
            document.date(),
            document.narration().to_string(),
            DocumentSource::new(document.kind(), Some(document.document_id())),
            lines,
        );

        self.validator.validate_transaction(&transaction)?;
        self.check_accounts(ctx, &transaction).await?;

        let committed = self.storage.commit_posting(transaction).await?;
        tracing::info!(
            organization_id = %ctx.organization_id,
            transaction_id = %committed.id,
            entry_number = committed.entry_number,
            kind = ?committed.source.kind,
            "posting committed"
        );
        Ok(committed)
    }

    /// Void a posted transaction by committing its reversal.
    ///
    /// The original transaction stays in the ledger for audit; the reversal
    /// swaps every debit and credit and posts on the original date. A second
    /// void attempt fails. Reversals skip the active-account check so that
    /// voiding remains possible after an account is deactivated.
    pub async fn void_transaction(
        &mut self,
        ctx: &OrgContext,
        transaction_id: Uuid,
        reason: &str,
    ) -> LedgerResult<Transaction> {
        let original = self
            .storage
            .get_transaction(transaction_id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        if original.organization_id != ctx.organization_id {
            return Err(LedgerError::CrossTenant {
                expected: ctx.organization_id,
                found: original.organization_id,
            });
        }

        if self
            .storage
            .find_reversal_of(transaction_id)
            .await?
            .is_some()
        {
            return Err(LedgerError::AlreadyVoided(transaction_id));
        }

        let reversal = original.reversal(ctx, reason);
        self.validator.validate_transaction(&reversal)?;
        let committed = self.storage.commit_posting(reversal).await?;
        tracing::info!(
            organization_id = %ctx.organization_id,
            voided = %transaction_id,
            reversal = %committed.id,
            "transaction voided"
        );
        Ok(committed)
    }

    async fn check_accounts(&self, ctx: &OrgContext, transaction: &Transaction) -> LedgerResult<()> {
        for line in &transaction.lines {
            let account = self
                .storage
                .get_account(line.account_id)
                .await?
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;

            if account.organization_id != ctx.organization_id {
                return Err(LedgerError::CrossTenant {
                    expected: ctx.organization_id,
                    found: account.organization_id,
                });
            }

            if !account.is_active {
                return Err(LedgerError::InactiveAccount(account.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn money(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_invoice_derivation() {
        let receivable = Uuid::new_v4();
        let revenue = Uuid::new_v4();
        let tax_payable = Uuid::new_v4();

        let invoice = Invoice {
            id: Uuid::new_v4(),
            date: date(),
            narration: "Consulting invoice".to_string(),
            contact_id: None,
            receivable_account_id: receivable,
            lines: vec![DocumentLine::new(revenue, money("2"), money("500.00"))],
            tax: Some(TaxCharge {
                account_id: tax_payable,
                amount: money("82.50"),
            }),
        };

        let lines = Document::Invoice(invoice).derive_lines().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].account_id, receivable);
        assert_eq!(lines[0].debit, money("1082.50"));
        assert_eq!(lines[1].account_id, revenue);
        assert_eq!(lines[1].credit, money("1000.00"));
        assert_eq!(lines[2].account_id, tax_payable);
        assert_eq!(lines[2].credit, money("82.50"));

        let debits: BigDecimal = lines.iter().map(|l| &l.debit).sum();
        let credits: BigDecimal = lines.iter().map(|l| &l.credit).sum();
        assert_eq!(round_money(&debits), round_money(&credits));
    }

    #[test]
    fn test_bill_derivation_mirrors_invoice() {
        let payable = Uuid::new_v4();
        let expense = Uuid::new_v4();
        let tax_recoverable = Uuid::new_v4();

        let bill = Bill {
            id: Uuid::new_v4(),
            date: date(),
            narration: "Office supplies".to_string(),
            contact_id: None,
            payable_account_id: payable,
            lines: vec![DocumentLine::new(expense, money("1"), money("240.00"))],
            tax: Some(TaxCharge {
                account_id: tax_recoverable,
                amount: money("19.80"),
            }),
        };

        let lines = Document::Bill(bill).derive_lines().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].debit, money("240.00"));
        assert_eq!(lines[1].account_id, tax_recoverable);
        assert_eq!(lines[1].debit, money("19.80"));
        assert_eq!(lines[2].account_id, payable);
        assert_eq!(lines[2].credit, money("259.80"));
    }

    #[test]
    fn test_invoice_total_rounds_once_at_final_total() {
        let receivable = Uuid::new_v4();
        let revenue = Uuid::new_v4();

        // Three line totals of 33.335 each: per-line rounding would give
        // 100.02; a single rounding of the 100.005 total gives 100.01.
        let line = DocumentLine::new(revenue, money("1"), money("33.335"));
        let invoice = Invoice {
            id: Uuid::new_v4(),
            date: date(),
            narration: "Fractional pricing".to_string(),
            contact_id: None,
            receivable_account_id: receivable,
            lines: vec![line.clone(), line.clone(), line],
            tax: None,
        };

        assert_eq!(invoice.total(), money("100.01"));

        let lines = Document::Invoice(invoice).derive_lines().unwrap();
        let debits: BigDecimal = lines.iter().map(|l| &l.debit).sum();
        let credits: BigDecimal = lines.iter().map(|l| &l.credit).sum();
        assert_eq!(round_money(&debits), round_money(&credits));
    }

    #[test]
    fn test_payment_directions() {
        let bank = Uuid::new_v4();
        let receivable = Uuid::new_v4();

        let received = Payment {
            id: Uuid::new_v4(),
            date: date(),
            narration: "Customer payment".to_string(),
            direction: PaymentDirection::Received,
            bank_account_id: bank,
            settlement_account_id: receivable,
            amount: money("150.00"),
            document_id: None,
            contact_id: None,
        };

        let lines = Document::Payment(received.clone()).derive_lines().unwrap();
        assert_eq!(lines[0].account_id, bank);
        assert_eq!(lines[0].debit, money("150.00"));
        assert_eq!(lines[1].account_id, receivable);
        assert_eq!(lines[1].credit, money("150.00"));

        let made = Payment {
            direction: PaymentDirection::Made,
            ..received
        };
        let lines = Document::Payment(made).derive_lines().unwrap();
        assert_eq!(lines[0].account_id, receivable);
        assert_eq!(lines[1].account_id, bank);
    }

    #[test]
    fn test_journal_builder_rejects_unbalanced() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let result = JournalBuilder::new(date(), "Unbalanced")
            .debit(a, money("100.00"))
            .credit(b, money("99.99"))
            .build();

        assert!(matches!(
            result,
            Err(LedgerError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_journal_builder_accepts_balanced() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let journal = JournalBuilder::new(date(), "Opening balance")
            .reference("JNL-1")
            .debit(a, money("100.00"))
            .credit(b, money("100.00"))
            .build()
            .unwrap();

        assert_eq!(journal.lines.len(), 2);
        assert_eq!(journal.reference.as_deref(), Some("JNL-1"));
    }
}
