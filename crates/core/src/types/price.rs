//! Chilean peso amounts and their display format.
//!
//! Amounts are carried as [`Decimal`] everywhere; this module only decides
//! how they look on screen. Pesos have no minor unit, so every amount is
//! rounded to whole pesos and grouped the way `es-CL` does it:
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tienda_core::format_clp;
//!
//! assert_eq!(format_clp(Decimal::new(3000, 0)), "$3.000");
//! assert_eq!(format_clp(Decimal::new(1_234_567, 0)), "$1.234.567");
//! assert_eq!(format_clp(Decimal::new(-500, 0)), "-$500");
//! ```

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

/// ISO 4217 code of the store currency.
pub const CURRENCY_CODE: &str = "CLP";

/// Thousands separator for `es-CL`.
const GROUP_SEPARATOR: char = '.';

/// Display wrapper that renders an amount as a peso string.
///
/// Usage: `format!("{}", Clp(totals.total))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clp(pub Decimal);

impl fmt::Display for Clp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        if rounded.is_zero() {
            return f.write_str("$0");
        }

        let digits = rounded.abs().trunc().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(GROUP_SEPARATOR);
            }
            grouped.push(ch);
        }

        if rounded.is_sign_negative() {
            write!(f, "-${grouped}")
        } else {
            write!(f, "${grouped}")
        }
    }
}

/// Format an amount as Chilean pesos with zero fractional digits.
#[must_use]
pub fn format_clp(amount: Decimal) -> String {
    Clp(amount).to_string()
}
