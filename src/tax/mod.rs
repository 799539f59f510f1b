//! Tax rate calculation for invoice and bill posting
//!
//! Documents carry tax as a concrete [`TaxCharge`] against a tax control
//! account (tax payable on sales, tax recoverable on purchases); this module
//! turns a percentage rate into that charge.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::round_money;

/// A percentage tax rate, carrying two fractional digits of its own scale
/// (e.g. 8.25 for 8.25%)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRate {
    /// Rate as a percentage of the base amount
    pub percent: BigDecimal,
}

impl TaxRate {
    /// Create a validated tax rate
    pub fn new(percent: BigDecimal) -> Result<Self, TaxError> {
        let rate = Self { percent };
        rate.validate()?;
        Ok(rate)
    }

    /// Validate that the rate is a sensible percentage
    pub fn validate(&self) -> Result<(), TaxError> {
        if self.percent < BigDecimal::from(0) || self.percent > BigDecimal::from(100) {
            return Err(TaxError::InvalidRate(format!(
                "Tax rate must be between 0% and 100%, got {}%",
                self.percent
            )));
        }
        Ok(())
    }

    /// The tax amount on a base amount, rounded to currency precision
    pub fn amount_on(&self, base: &BigDecimal) -> BigDecimal {
        round_money(&(base * &self.percent / BigDecimal::from(100)))
    }

    /// Build the tax charge a document carries: the rounded tax amount
    /// posted against the given tax control account
    pub fn charge_on(&self, base: &BigDecimal, account_id: Uuid) -> TaxCharge {
        TaxCharge {
            account_id,
            amount: self.amount_on(base),
        }
    }
}

/// A concrete tax amount against a tax control account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCharge {
    /// Tax payable (sales) or tax recoverable (purchases) account
    pub account_id: Uuid,
    /// Tax amount at currency precision
    pub amount: BigDecimal,
}

impl TaxCharge {
    /// Create a tax charge
    pub fn new(account_id: Uuid, amount: BigDecimal) -> Self {
        Self {
            account_id,
            amount,
        }
    }
}

/// Tax-related errors
#[derive(Debug, thiserror::Error)]
pub enum TaxError {
    #[error("Invalid tax rate: {0}")]
    InvalidRate(String),
}
