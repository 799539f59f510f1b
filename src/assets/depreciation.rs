//! Depreciation schedule calculation for fixed assets
//!
//! The calculator is pure: it produces per-period amounts, and posting
//! happens by feeding the resulting [`DepreciationRun`] documents to the
//! posting engine.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::posting::DepreciationRun;
use crate::types::round_money;

/// Supported depreciation methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepreciationMethod {
    /// Equal charge every year of useful life
    StraightLine,
    /// Fixed rate applied to the declining book value; the rate defaults to
    /// 2/life (double declining)
    DecliningBalance,
}

/// Lifecycle state of a fixed asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    /// Depreciating normally
    Active,
    /// Book value has reached the salvage floor; no further charges
    FullyDepreciated,
    /// Sold or scrapped; terminal
    Disposed,
}

/// One period of a depreciation schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    /// Period number, 1-based
    pub period: u32,
    /// Depreciation charged this period
    pub depreciation: BigDecimal,
    /// Cumulative depreciation through this period
    pub accumulated_depreciation: BigDecimal,
    /// Book value at the end of this period
    pub ending_book_value: BigDecimal,
}

/// Depreciation-related errors
#[derive(Debug, thiserror::Error)]
pub enum DepreciationError {
    #[error("Invalid depreciation input: {0}")]
    InvalidInput(String),
    #[error("Asset is terminal: {0}")]
    Terminal(String),
}

fn validate_inputs(
    cost: &BigDecimal,
    salvage_value: &BigDecimal,
    useful_life_years: u32,
    rate: Option<&BigDecimal>,
) -> Result<(), DepreciationError> {
    let zero = BigDecimal::from(0);
    if *cost <= zero {
        return Err(DepreciationError::InvalidInput(
            "Cost must be positive".to_string(),
        ));
    }
    if *salvage_value < zero {
        return Err(DepreciationError::InvalidInput(
            "Salvage value cannot be negative".to_string(),
        ));
    }
    if salvage_value > cost {
        return Err(DepreciationError::InvalidInput(
            "Salvage value cannot exceed cost".to_string(),
        ));
    }
    if useful_life_years == 0 {
        return Err(DepreciationError::InvalidInput(
            "Useful life must be at least one year".to_string(),
        ));
    }
    if let Some(rate) = rate {
        if *rate <= zero || *rate > BigDecimal::from(1) {
            return Err(DepreciationError::InvalidInput(
                "Declining rate must be within (0, 1]".to_string(),
            ));
        }
    }
    Ok(())
}

/// Compute a full depreciation schedule: one entry per year of useful life.
///
/// Book value decreases monotonically and never drops below the salvage
/// value. Straight-line charges `(cost - salvage) / life` per year, with the
/// final year absorbing the rounding remainder so the ending book value is
/// exactly the salvage value. Declining-balance charges `book * rate`; once
/// the formulaic path can no longer reach the salvage floor (the next
/// period's charge would undershoot it), the current period takes the full
/// remaining `book - salvage` and every later period charges zero.
pub fn depreciation_schedule(
    cost: &BigDecimal,
    salvage_value: &BigDecimal,
    useful_life_years: u32,
    method: DepreciationMethod,
    rate: Option<&BigDecimal>,
) -> Result<Vec<SchedulePeriod>, DepreciationError> {
    validate_inputs(cost, salvage_value, useful_life_years, rate)?;

    let zero = BigDecimal::from(0);
    let mut schedule = Vec::with_capacity(useful_life_years as usize);
    let mut book_value = cost.clone();
    let mut accumulated = zero.clone();

    let annual = round_money(&((cost - salvage_value) / BigDecimal::from(useful_life_years)));
    let declining_rate = match rate {
        Some(rate) => rate.clone(),
        None => BigDecimal::from(2) / BigDecimal::from(useful_life_years),
    };

    for period in 1..=useful_life_years {
        let remaining = &book_value - salvage_value;
        let depreciation = if remaining <= zero {
            zero.clone()
        } else {
            match method {
                DepreciationMethod::StraightLine => {
                    if period == useful_life_years || annual > remaining {
                        remaining.clone()
                    } else {
                        annual.clone()
                    }
                }
                DepreciationMethod::DecliningBalance => {
                    let raw = round_money(&(&book_value * &declining_rate));
                    let after = &book_value - &raw;
                    let next = round_money(&(&after * &declining_rate));
                    if raw >= remaining || &after - &next < *salvage_value {
                        remaining.clone()
                    } else {
                        raw
                    }
                }
            }
        };

        accumulated += &depreciation;
        book_value -= &depreciation;
        schedule.push(SchedulePeriod {
            period,
            depreciation,
            accumulated_depreciation: accumulated.clone(),
            ending_book_value: book_value.clone(),
        });
    }

    Ok(schedule)
}

/// Fields for registering a fixed asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedAssetParams {
    pub name: String,
    pub cost: BigDecimal,
    pub salvage_value: BigDecimal,
    pub useful_life_years: u32,
    /// Declining rate as a fraction (e.g. 0.40); defaults to 2/life
    pub rate: Option<BigDecimal>,
    pub method: DepreciationMethod,
    pub purchase_date: NaiveDate,
    /// Asset account carrying the cost
    pub asset_account_id: Uuid,
    /// Expense account debited by each depreciation run
    pub expense_account_id: Uuid,
    /// Accumulated-depreciation account credited by each run
    pub accumulated_account_id: Uuid,
}

/// A fixed asset tracked through its depreciation life
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedAsset {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub cost: BigDecimal,
    pub salvage_value: BigDecimal,
    pub useful_life_years: u32,
    pub rate: Option<BigDecimal>,
    pub method: DepreciationMethod,
    pub purchase_date: NaiveDate,
    pub asset_account_id: Uuid,
    pub expense_account_id: Uuid,
    pub accumulated_account_id: Uuid,
    pub status: AssetStatus,
    /// Cost minus accumulated depreciation applied so far
    pub book_value: BigDecimal,
}

impl FixedAsset {
    /// Register a fixed asset; book value starts at cost
    pub fn new(organization_id: Uuid, params: FixedAssetParams) -> Result<Self, DepreciationError> {
        validate_inputs(
            &params.cost,
            &params.salvage_value,
            params.useful_life_years,
            params.rate.as_ref(),
        )?;
        Ok(Self {
            id: Uuid::new_v4(),
            organization_id,
            name: params.name,
            book_value: params.cost.clone(),
            cost: params.cost,
            salvage_value: params.salvage_value,
            useful_life_years: params.useful_life_years,
            rate: params.rate,
            method: params.method,
            purchase_date: params.purchase_date,
            asset_account_id: params.asset_account_id,
            expense_account_id: params.expense_account_id,
            accumulated_account_id: params.accumulated_account_id,
            status: AssetStatus::Active,
        })
    }

    /// The asset's full depreciation schedule
    pub fn schedule(&self) -> Result<Vec<SchedulePeriod>, DepreciationError> {
        depreciation_schedule(
            &self.cost,
            &self.salvage_value,
            self.useful_life_years,
            self.method,
            self.rate.as_ref(),
        )
    }

    /// Build the posting document for one period's charge.
    ///
    /// Returns `None` when the period is past the asset's life or its
    /// scheduled charge is zero (book value already at the floor).
    pub fn depreciation_run(
        &self,
        period: u32,
        date: NaiveDate,
    ) -> Result<Option<DepreciationRun>, DepreciationError> {
        if self.status == AssetStatus::Disposed {
            return Err(DepreciationError::Terminal(format!(
                "{} has been disposed",
                self.name
            )));
        }

        let schedule = self.schedule()?;
        let entry = match schedule.iter().find(|p| p.period == period) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if entry.depreciation <= BigDecimal::from(0) {
            return Ok(None);
        }

        Ok(Some(DepreciationRun {
            id: Uuid::new_v4(),
            asset_id: self.id,
            period,
            date,
            narration: format!("Depreciation of {} (period {})", self.name, period),
            expense_account_id: self.expense_account_id,
            accumulated_account_id: self.accumulated_account_id,
            amount: entry.depreciation.clone(),
        }))
    }

    /// Record a posted period against the asset: book value steps down to
    /// the period's ending value and the asset turns `FullyDepreciated`
    /// when the floor is reached.
    pub fn apply_period(&mut self, period: &SchedulePeriod) -> Result<(), DepreciationError> {
        if self.status == AssetStatus::Disposed {
            return Err(DepreciationError::Terminal(format!(
                "{} has been disposed",
                self.name
            )));
        }
        self.book_value = period.ending_book_value.clone();
        if self.book_value <= self.salvage_value {
            self.status = AssetStatus::FullyDepreciated;
        }
        Ok(())
    }

    /// Mark the asset as disposed; no further depreciation is possible
    pub fn dispose(&mut self) {
        self.status = AssetStatus::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn money(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_straight_line_schedule() {
        let schedule = depreciation_schedule(
            &money("10000"),
            &money("1000"),
            5,
            DepreciationMethod::StraightLine,
            None,
        )
        .unwrap();

        let charges: Vec<BigDecimal> =
            schedule.iter().map(|p| p.depreciation.clone()).collect();
        assert_eq!(charges, vec![money("1800.00"); 5]);

        let endings: Vec<BigDecimal> = schedule
            .iter()
            .map(|p| p.ending_book_value.clone())
            .collect();
        assert_eq!(
            endings,
            vec![
                money("8200.00"),
                money("6400.00"),
                money("4600.00"),
                money("2800.00"),
                money("1000.00"),
            ]
        );
    }

    #[test]
    fn test_straight_line_final_period_absorbs_rounding() {
        let schedule = depreciation_schedule(
            &money("1000"),
            &money("0"),
            3,
            DepreciationMethod::StraightLine,
            None,
        )
        .unwrap();

        assert_eq!(schedule[0].depreciation, money("333.33"));
        assert_eq!(schedule[1].depreciation, money("333.33"));
        assert_eq!(schedule[2].depreciation, money("333.34"));
        assert_eq!(schedule[2].ending_book_value, money("0.00"));
    }

    #[test]
    fn test_declining_balance_clamps_at_salvage_floor() {
        let schedule = depreciation_schedule(
            &money("10000"),
            &money("1000"),
            5,
            DepreciationMethod::DecliningBalance,
            None,
        )
        .unwrap();

        let charges: Vec<BigDecimal> =
            schedule.iter().map(|p| p.depreciation.clone()).collect();
        assert_eq!(
            charges,
            vec![
                money("4000.00"),
                money("2400.00"),
                money("1440.00"),
                money("1160.00"),
                money("0"),
            ]
        );
        assert_eq!(schedule[3].ending_book_value, money("1000.00"));
        assert_eq!(schedule[4].ending_book_value, money("1000.00"));

        for window in schedule.windows(2) {
            assert!(window[1].ending_book_value <= window[0].ending_book_value);
        }
    }

    #[test]
    fn test_declining_balance_explicit_rate() {
        let rate = money("0.25");
        let schedule = depreciation_schedule(
            &money("8000"),
            &money("0"),
            4,
            DepreciationMethod::DecliningBalance,
            Some(&rate),
        )
        .unwrap();

        assert_eq!(schedule[0].depreciation, money("2000.00"));
        assert_eq!(schedule[1].depreciation, money("1500.00"));
        assert_eq!(schedule[2].depreciation, money("1125.00"));
        assert_eq!(schedule[3].depreciation, money("843.75"));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(depreciation_schedule(
            &money("0"),
            &money("0"),
            5,
            DepreciationMethod::StraightLine,
            None,
        )
        .is_err());

        assert!(depreciation_schedule(
            &money("1000"),
            &money("2000"),
            5,
            DepreciationMethod::StraightLine,
            None,
        )
        .is_err());

        assert!(depreciation_schedule(
            &money("1000"),
            &money("0"),
            0,
            DepreciationMethod::StraightLine,
            None,
        )
        .is_err());

        let bad_rate = money("1.5");
        assert!(depreciation_schedule(
            &money("1000"),
            &money("0"),
            5,
            DepreciationMethod::DecliningBalance,
            Some(&bad_rate),
        )
        .is_err());
    }

    #[test]
    fn test_asset_lifecycle() {
        let org = Uuid::new_v4();
        let mut asset = FixedAsset::new(
            org,
            FixedAssetParams {
                name: "Delivery van".to_string(),
                cost: money("10000"),
                salvage_value: money("1000"),
                useful_life_years: 5,
                rate: None,
                method: DepreciationMethod::StraightLine,
                purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                asset_account_id: Uuid::new_v4(),
                expense_account_id: Uuid::new_v4(),
                accumulated_account_id: Uuid::new_v4(),
            },
        )
        .unwrap();

        assert_eq!(asset.book_value, money("10000"));
        assert_eq!(asset.status, AssetStatus::Active);

        let schedule = asset.schedule().unwrap();
        for period in &schedule {
            asset.apply_period(period).unwrap();
        }
        assert_eq!(asset.book_value, money("1000.00"));
        assert_eq!(asset.status, AssetStatus::FullyDepreciated);

        asset.dispose();
        let date = NaiveDate::from_ymd_opt(2029, 1, 31).unwrap();
        assert!(asset.depreciation_run(1, date).is_err());
    }

    #[test]
    fn test_depreciation_run_document() {
        let org = Uuid::new_v4();
        let asset = FixedAsset::new(
            org,
            FixedAssetParams {
                name: "Laser cutter".to_string(),
                cost: money("10000"),
                salvage_value: money("1000"),
                useful_life_years: 5,
                rate: None,
                method: DepreciationMethod::DecliningBalance,
                purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                asset_account_id: Uuid::new_v4(),
                expense_account_id: Uuid::new_v4(),
                accumulated_account_id: Uuid::new_v4(),
            },
        )
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let run = asset.depreciation_run(1, date).unwrap().unwrap();
        assert_eq!(run.amount, money("4000.00"));
        assert_eq!(run.period, 1);

        // Period five charges nothing: the floor was reached in period four.
        assert!(asset.depreciation_run(5, date).unwrap().is_none());
        assert!(asset.depreciation_run(6, date).unwrap().is_none());
    }
}
