//! Checked fixed-point arithmetic helpers - no unwrap, no panics
//!
//! Every ledger and valuation computation routes through these so that
//! overflow, underflow, and division by zero surface as [`MathError`]
//! instead of a host-level trap.

use crate::error::MathError;
use crate::types::BPS_DENOMINATOR;

/// Add u128, overflow is an error
pub fn checked_add(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Subtract u128, underflow is an error
pub fn checked_sub(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

/// Multiply u128, overflow is an error
pub fn checked_mul(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

/// Divide u128, zero divisor is an error
pub fn checked_div(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_div(b).ok_or(MathError::DivisionByZero)
}

/// `(a * b) / den` with widening done by the caller's choice of u128 inputs
pub fn mul_div(a: u128, b: u128, den: u128) -> Result<u128, MathError> {
    checked_div(checked_mul(a, b)?, den)
}

/// `value * bps / 10_000`
pub fn bps_of(value: u128, bps: u64) -> Result<u128, MathError> {
    mul_div(value, bps as u128, BPS_DENOMINATOR as u128)
}

/// `10^exp` as u128, overflow is an error
pub fn pow10(exp: u32) -> Result<u128, MathError> {
    10u128.checked_pow(exp).ok_or(MathError::Overflow)
}
