//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(LedgerError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an account code is well formed
pub fn validate_account_code(code: &str) -> LedgerResult<()> {
    if code.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account code cannot be empty".to_string(),
        ));
    }

    if code.len() > 20 {
        return Err(LedgerError::Validation(
            "Account code cannot exceed 20 characters".to_string(),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(
            "Account code can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that an account name is well formed
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a transaction narration is well formed
pub fn validate_narration(narration: &str) -> LedgerResult<()> {
    if narration.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Transaction narration cannot be empty".to_string(),
        ));
    }

    if narration.len() > 500 {
        return Err(LedgerError::Validation(
            "Transaction narration cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Account validator with strict field checks
pub struct StrictAccountValidator;

impl AccountValidator for StrictAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        validate_account_code(&account.code)?;
        validate_account_name(&account.name)?;
        Ok(())
    }
}

/// Journal validator with strict field and shape checks
pub struct StrictJournalValidator;

impl JournalValidator for StrictJournalValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> LedgerResult<()> {
        transaction.validate()?;
        validate_narration(&transaction.description)?;

        for line in &transaction.lines {
            validate_positive_amount(line.amount())?;
        }

        // The same account cannot appear twice on the same side; that hides
        // what should be one aggregated line.
        let mut seen = std::collections::HashSet::new();
        for line in &transaction.lines {
            if !seen.insert((line.account_id, line.side())) {
                return Err(LedgerError::Validation(format!(
                    "Account {} appears multiple times on the same side of the transaction",
                    line.account_id
                )));
            }
        }

        Ok(())
    }
}
