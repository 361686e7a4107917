use crate::core::constants::{MAX_ADJUSTMENT_YEAR, MAX_AMOUNT_SCALE, MAX_REASON_LENGTH, MIN_ADJUSTMENT_YEAR};
use crate::core::errors::LedgerError;
use crate::core::models::{adjustment::ExpenseAdjustment, expense::Expense};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

/// Checks a proposed adjustment amount against its parent expense.
///
/// Rules run in order and the first failure wins:
/// 1. the amount is positive with at most two fractional digits;
/// 2. the amount alone does not exceed the expense amount;
/// 3. the siblings' total (every status, minus `exclude_id`) plus the
///    amount does not exceed the expense amount. Reaching it exactly is fine.
///
/// This is a read-then-decide check; callers hold the expense lock around
/// it and the write that follows.
pub fn validate_adjustment_amount(
    expense: &Expense,
    new_amount: Decimal,
    siblings: &[ExpenseAdjustment],
    exclude_id: Option<&str>,
) -> Result<(), LedgerError> {
    validate_amount_format(new_amount)?;

    let limit = expense.amount();
    if new_amount > limit {
        return Err(LedgerError::AdjustmentExceedsExpense {
            amount: new_amount,
            expense_amount: limit,
        });
    }

    let existing_total: Decimal = siblings
        .iter()
        .filter(|a| a.expense_id == expense.id)
        .filter(|a| exclude_id != Some(a.id.as_str()))
        .map(|a| a.adjustment_amount)
        .sum();

    let total = existing_total + new_amount;
    if total > limit {
        return Err(LedgerError::TotalAdjustmentsExceedExpense {
            existing_total,
            new_amount,
            total,
            limit,
        });
    }
    Ok(())
}

pub fn validate_amount_format(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_input(
            "adjustment_amount",
            "Invalid Amount",
            "Amount must be greater than 0",
        ));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(LedgerError::invalid_input(
            "adjustment_amount",
            "Invalid Amount",
            "Amount cannot have more than 2 decimal places",
        ));
    }
    Ok(())
}

pub fn validate_adjustment_date(date: NaiveDate) -> Result<(), LedgerError> {
    if date.year() < MIN_ADJUSTMENT_YEAR || date.year() > MAX_ADJUSTMENT_YEAR {
        return Err(LedgerError::invalid_input(
            "adjustment_date",
            "Date Out Of Range",
            format!(
                "Adjustment date must fall between {} and {}",
                MIN_ADJUSTMENT_YEAR, MAX_ADJUSTMENT_YEAR
            ),
        ));
    }
    Ok(())
}

pub fn validate_reason(reason: &str) -> Result<(), LedgerError> {
    if reason.chars().count() > MAX_REASON_LENGTH {
        return Err(LedgerError::invalid_input(
            "adjustment_reason",
            "Reason Too Long",
            format!("adjustment_reason cannot exceed {} characters", MAX_REASON_LENGTH),
        ));
    }
    if reason.chars().any(|c| c.is_control()) {
        return Err(LedgerError::invalid_input(
            "adjustment_reason",
            "Invalid Reason",
            "adjustment_reason contains invalid characters",
        ));
    }
    Ok(())
}
