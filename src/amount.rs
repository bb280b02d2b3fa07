//! Amount normalization: display quantity → minor-unit integer.
//!
//! `normalize("1.5", 24)` → `"1500000000000000000000000"`.
//!
//! The arithmetic is exact digit manipulation on u128. Floating point
//! is forbidden here: f64 has 53 bits of mantissa and silently corrupts
//! 24-decimal native amounts, which would change what a DAO transfers.
//! Fractional digits below the minor-unit resolution are truncated,
//! never rounded.

use crate::error::{TxError, TxResult};
use crate::tx::TokenAmount;

/// Scale a non-negative decimal string by `10^decimals`, truncating
/// any remainder below minor-unit resolution.
///
/// Fails with `InvalidAmount` when `quantity` is not a plain base-10
/// decimal (`"12"`, `"0.07"`, `"3."`, `".5"`) or the scaled value
/// overflows u128.
pub fn normalize(quantity: &str, decimals: u8) -> TxResult<TokenAmount> {
    let (int_digits, frac_digits) = split_decimal(quantity)?;

    let scale = 10u128
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| TxError::invalid_amount(quantity, "decimals exceed u128 range"))?;

    let int_value: u128 = if int_digits.is_empty() {
        0
    } else {
        int_digits
            .parse()
            .map_err(|_| TxError::invalid_amount(quantity, "integer part overflows u128"))?
    };

    // Keep at most `decimals` fractional digits (truncation), then pad
    // right so the fraction reads as a minor-unit count.
    let kept = &frac_digits[..frac_digits.len().min(usize::from(decimals))];
    let frac_value: u128 = if kept.is_empty() {
        0
    } else {
        let shift = 10u128.pow(u32::from(decimals) - kept.len() as u32);
        let digits: u128 = kept
            .parse()
            .map_err(|_| TxError::invalid_amount(quantity, "fractional part overflows u128"))?;
        digits * shift
    };

    let minor = int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| TxError::invalid_amount(quantity, "scaled amount overflows u128"))?;

    Ok(TokenAmount::from_minor(minor))
}

/// Split `quantity` into integer and fractional digit runs, rejecting
/// anything that is not a non-negative base-10 decimal.
fn split_decimal(quantity: &str) -> TxResult<(&str, &str)> {
    let (int_part, frac_part) = match quantity.split_once('.') {
        Some((i, f)) => (i, f),
        None => (quantity, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(TxError::invalid_amount(quantity, "no digits"));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TxError::invalid_amount(quantity, "integer part is not base-10 digits"));
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TxError::invalid_amount(quantity, "fractional part is not base-10 digits"));
    }

    Ok((int_part, frac_part))
}
