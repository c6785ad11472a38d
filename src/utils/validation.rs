//! Validation utilities

use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: Amount) -> VaultResult<()> {
    if amount == 0 {
        Err(VaultError::ZeroAmount)
    } else {
        Ok(())
    }
}

/// Validate that a principal is not the null sentinel
pub fn validate_principal(principal: &Principal) -> VaultResult<()> {
    if principal.is_null() {
        Err(VaultError::ZeroAddress)
    } else {
        Ok(())
    }
}

/// Validate that `available` covers `requested`
pub fn validate_sufficient_balance(requested: Amount, available: Amount) -> VaultResult<()> {
    if available < requested {
        return Err(VaultError::InsufficientBalance {
            requested,
            available,
        });
    }
    Ok(())
}

/// Add two amounts, failing closed on overflow
pub fn checked_credit(current: Amount, amount: Amount) -> VaultResult<Amount> {
    current.checked_add(amount).ok_or(VaultError::Overflow)
}

/// Subtract two amounts, failing closed on underflow
pub fn checked_debit(current: Amount, amount: Amount) -> VaultResult<Amount> {
    current.checked_sub(amount).ok_or(VaultError::Overflow)
}
