//! Basic ledger usage example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use ledger_core::utils::MemoryStore;
use ledger_core::{
    Document, DocumentLine, Invoice, JournalBuilder, Ledger, OrgContext, Payment,
    PaymentDirection, TaxRate, TransactionFilter,
};
use std::str::FromStr;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Ledger Core - Basic Ledger Example\n");

    // Create a new ledger with in-memory storage and an identity context
    let mut ledger = Ledger::new(MemoryStore::new());
    let ctx = OrgContext::new(Uuid::new_v4(), Uuid::new_v4());

    // 1. Set up a standard chart of accounts
    println!("📊 Setting up Chart of Accounts...");
    let accounts = ledger.setup_standard_chart(&ctx).await?;

    for account in accounts.values() {
        println!(
            "  ✓ Created account: {} - {} ({:?})",
            account.code, account.name, account.account_type
        );
    }
    println!();

    // 2. Record some business activity
    println!("💰 Posting Business Documents...\n");

    // Owner invests cash via a manual journal
    let investment = JournalBuilder::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        "Initial owner investment",
    )
    .debit(accounts["cash"].id, BigDecimal::from(50000))
    .credit(accounts["owners_equity"].id, BigDecimal::from(50000))
    .build()?;
    let posted = ledger.post(&ctx, &Document::ManualJournal(investment)).await?;
    println!(
        "  ✓ Entry #{}: Owner investment of $50,000",
        posted.entry_number
    );

    // Invoice a customer with 8.25% tax
    let tax_rate = TaxRate::new(BigDecimal::from_str("8.25")?)?;
    let subtotal = BigDecimal::from(4000);
    let invoice = Invoice {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        narration: "Consulting services for January".to_string(),
        contact_id: None,
        receivable_account_id: accounts["accounts_receivable"].id,
        lines: vec![DocumentLine::new(
            accounts["service_revenue"].id,
            BigDecimal::from(4),
            BigDecimal::from(1000),
        )],
        tax: Some(tax_rate.charge_on(&subtotal, accounts["tax_payable"].id)),
    };
    let posted = ledger.post(&ctx, &Document::Invoice(invoice)).await?;
    println!(
        "  ✓ Entry #{}: Invoice for ${} (incl. tax)",
        posted.entry_number,
        posted.total_debits()
    );
    let invoice_txn_id = posted.id;

    // Customer pays the invoice in full
    let payment = Payment {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
        narration: "Invoice settled by bank transfer".to_string(),
        direction: PaymentDirection::Received,
        bank_account_id: accounts["cash"].id,
        settlement_account_id: accounts["accounts_receivable"].id,
        amount: BigDecimal::from_str("4330.00")?,
        document_id: None,
        contact_id: None,
    };
    let posted = ledger.post(&ctx, &Document::Payment(payment)).await?;
    println!("  ✓ Entry #{}: Payment received of $4,330", posted.entry_number);
    println!();

    // 3. Reports
    let as_of = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

    println!("📈 Trial Balance as of {as_of}:");
    let trial = ledger.trial_balance(&ctx, as_of).await?;
    for row in &trial.rows {
        println!(
            "  {:<6} {:<28} debit: {:>10}  credit: {:>10}",
            row.account.code,
            row.account.name,
            row.debit_balance
                .clone()
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.credit_balance
                .clone()
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!(
        "  TOTAL debits: {}  credits: {}  balanced: {}\n",
        trial.total_debits, trial.total_credits, trial.is_balanced
    );

    println!("📊 Profit & Loss for January:");
    let pnl = ledger
        .profit_and_loss(&ctx, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), as_of)
        .await?;
    println!("  Revenue:  {}", pnl.total_revenue);
    println!("  Expenses: {}", pnl.total_expenses);
    println!("  Net income: {}\n", pnl.net_income);

    println!("🏦 Balance Sheet as of {as_of}:");
    let sheet = ledger.balance_sheet(&ctx, as_of).await?;
    println!("  Assets:      {}", sheet.total_assets);
    println!("  Liabilities: {}", sheet.total_liabilities);
    println!("  Equity:      {}", sheet.total_equity);
    println!("  Balanced:    {}\n", sheet.is_balanced);

    // 4. Void the invoice and show the ledger trail
    println!("↩️  Voiding the invoice...");
    let reversal = ledger
        .void_transaction(&ctx, invoice_txn_id, "customer cancelled")
        .await?;
    println!("  ✓ Reversal entry #{} posted", reversal.entry_number);

    let history = ledger
        .query_transactions(&TransactionFilter::for_org(ctx.organization_id))
        .await?;
    println!("\n📜 Ledger ({} entries):", history.len());
    for txn in &history {
        println!(
            "  #{:<3} {}  {:<12?} {}",
            txn.entry_number, txn.date, txn.source.kind, txn.description
        );
    }

    let integrity = ledger.validate_integrity(&ctx, as_of).await?;
    println!("\n✅ Ledger integrity valid: {}", integrity.is_valid);

    Ok(())
}
