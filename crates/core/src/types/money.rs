//! Money formatting helpers.
//!
//! All monetary values in Bramble are USD [`Decimal`]s that keep full
//! precision internally. Rounding to cents happens only at display time.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount to cents.
///
/// Midpoint rounds away from zero, matching how prices are conventionally
/// shown to customers (`6.3976` becomes `6.40`).
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a monetary amount as a dollar string with exactly two decimals.
///
/// The stored value is not modified; callers keep full precision until the
/// moment a price is rendered.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    format!("${:.2}", round_cents(amount))
}
