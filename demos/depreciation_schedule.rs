//! Fixed-asset depreciation example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use ledger_core::utils::MemoryStore;
use ledger_core::{
    depreciation_schedule, DepreciationMethod, Document, FixedAsset, FixedAssetParams,
    JournalBuilder, Ledger, OrgContext,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏭 Ledger Core - Depreciation Example\n");

    // 1. Pure schedule calculation
    let cost = BigDecimal::from(10000);
    let salvage = BigDecimal::from(1000);

    println!("📉 Straight-line: cost 10,000 / salvage 1,000 / 5 years");
    let schedule =
        depreciation_schedule(&cost, &salvage, 5, DepreciationMethod::StraightLine, None)?;
    for period in &schedule {
        println!(
            "  Year {}: charge {:>8}  accumulated {:>8}  book value {:>8}",
            period.period,
            period.depreciation,
            period.accumulated_depreciation,
            period.ending_book_value
        );
    }
    println!();

    println!("📉 Declining balance (double declining, 40%):");
    let schedule = depreciation_schedule(
        &cost,
        &salvage,
        5,
        DepreciationMethod::DecliningBalance,
        None,
    )?;
    for period in &schedule {
        println!(
            "  Year {}: charge {:>8}  accumulated {:>8}  book value {:>8}",
            period.period,
            period.depreciation,
            period.accumulated_depreciation,
            period.ending_book_value
        );
    }
    println!();

    // 2. Posting the charges period by period
    let mut ledger = Ledger::new(MemoryStore::new());
    let ctx = OrgContext::new(Uuid::new_v4(), Uuid::new_v4());
    let accounts = ledger.setup_standard_chart(&ctx).await?;

    let purchase = JournalBuilder::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        "Purchase of delivery van",
    )
    .debit(accounts["fixed_assets"].id, cost.clone())
    .credit(accounts["owners_equity"].id, cost.clone())
    .build()?;
    ledger.post(&ctx, &Document::ManualJournal(purchase)).await?;

    let mut asset = FixedAsset::new(
        ctx.organization_id,
        FixedAssetParams {
            name: "Delivery van".to_string(),
            cost,
            salvage_value: salvage,
            useful_life_years: 5,
            rate: None,
            method: DepreciationMethod::StraightLine,
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            asset_account_id: accounts["fixed_assets"].id,
            expense_account_id: accounts["depreciation_expense"].id,
            accumulated_account_id: accounts["accumulated_depreciation"].id,
        },
    )?;

    println!("🧾 Posting the first two annual charges...");
    for period in asset.schedule()? {
        if period.period > 2 {
            break;
        }
        let post_date =
            NaiveDate::from_ymd_opt(2023 + period.period as i32, 12, 31).unwrap();
        if let Some(run) = asset.depreciation_run(period.period, post_date)? {
            let txn = ledger.post(&ctx, &Document::DepreciationRun(run)).await?;
            println!(
                "  ✓ Entry #{}: {} for {}",
                txn.entry_number, txn.description, period.depreciation
            );
        }
        asset.apply_period(&period)?;
    }

    println!(
        "\n📦 Asset book value after two years: {} ({:?})",
        asset.book_value, asset.status
    );

    let sheet = ledger
        .balance_sheet(&ctx, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap())
        .await?;
    println!(
        "🏦 Balance sheet: assets {} | equity {} | balanced: {}",
        sheet.total_assets, sheet.total_equity, sheet.is_balanced
    );

    Ok(())
}
