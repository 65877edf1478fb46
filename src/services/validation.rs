//! Field validators shared by request bodies.
//!
//! Amounts are stored as `decimal(12,2)`, so every decimal field is limited
//! to two places and to what that column can hold.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use validator::ValidationError;

/// Largest value a `decimal(12,2)` column holds.
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// Largest value a `decimal(14,2)` column holds.
pub const MAX_TOTAL: Decimal = dec!(999999999999.99);

/// Decimal places kept for stock, prices and recipe quantities.
pub const AMOUNT_SCALE: u32 = 2;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn fits_column(value: &Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > AMOUNT_SCALE {
        return Err(invalid("max_scale", "must have at most two decimal places"));
    }
    if value.abs() > MAX_AMOUNT {
        return Err(invalid("max_amount", "must not exceed 9999999999.99"));
    }
    Ok(())
}

/// Stock levels and prices: `0 ..= MAX_AMOUNT`, two places.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("non_negative", "must be zero or greater"));
    }
    fits_column(value)
}

/// Recipe quantities: greater than zero, two places.
pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(invalid("positive", "must be greater than zero"));
    }
    fits_column(value)
}

/// Signed stock corrections, two places.
pub fn signed_amount(value: &Decimal) -> Result<(), ValidationError> {
    fits_column(value)
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("not_blank", "must not be blank"));
    }
    Ok(())
}
