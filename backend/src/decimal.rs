//! Fixed-point money helpers (two decimal places)

use rust_decimal::{Decimal, RoundingStrategy};

/// Scale used for every stored amount
pub const MONEY_SCALE: u32 = 2;

/// Round half away from zero to cents and pin the scale, so `1200` renders as `1200.00`
pub fn to_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// `total / parts` in cents; `None` when the division is undefined
pub fn per_part(total: Decimal, parts: i64) -> Option<Decimal> {
    if parts <= 0 {
        return None;
    }
    total.checked_div(Decimal::from(parts)).map(to_money)
}

/// `total / parts` truncated to cents, so `parts - 1` shares never exceed `total`
pub fn share_down(total: Decimal, parts: i64) -> Option<Decimal> {
    if parts <= 0 {
        return None;
    }
    let mut share = total
        .checked_div(Decimal::from(parts))?
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
    share.rescale(MONEY_SCALE);
    Some(share)
}

/// Largest amount a `NUMERIC(12, 2)` column holds
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Whether `value`, once rounded to cents, can be stored
pub fn fits_money_column(value: Decimal) -> bool {
    to_money(value).abs() <= max_money()
}
