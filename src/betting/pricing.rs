//! Pricing aggregation and the cart minimum.
//!
//! Sums the per-line price snapshots (no weighting, no discounts) and
//! rejects submissions whose total falls short of the cart's minimum.
//! Amounts in error messages are rendered as pt-BR currency.

use rust_decimal::Decimal;

use crate::types::{BetDraft, BetError, Cart};

/// Total price of a validated submission: the plain sum of line prices.
pub fn total_price(drafts: &[BetDraft]) -> Decimal {
    drafts.iter().map(|d| d.price).sum()
}

/// Enforce the cart's minimum purchase value.
///
/// The caller guarantees `drafts` was non-empty (an empty submission is
/// rejected during validation, before pricing has a defined meaning).
pub fn enforce_minimum(total: Decimal, cart: &Cart) -> Result<(), BetError> {
    if total < cart.min_value {
        return Err(BetError::BelowMinimum {
            total: format_brl(total),
            min: format_brl(cart.min_value),
        });
    }
    Ok(())
}

/// Render a decimal as pt-BR currency: `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp(2).abs();
    let plain = format!("{rounded:.2}");
    let (int_part, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
