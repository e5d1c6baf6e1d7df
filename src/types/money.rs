//! Money is carried as integer US cents everywhere past the quote boundary.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub type Cents = i64;

/// Round a floating dollar amount (as returned by quote APIs) to whole cents.
pub fn dollars_to_cents(dollars: f64) -> Cents {
    (dollars * 100.0).round() as Cents
}

/// Parse a decimal dollar string such as `10000`, `10000.5` or `$1,250.00`.
/// Negative amounts and fractions of a cent are rejected.
pub fn parse_dollars(input: &str) -> Option<Cents> {
    let cleaned = input.trim().trim_start_matches('$').replace(',', "");
    let amount = Decimal::from_str(&cleaned).ok()?.normalize();
    if amount.is_sign_negative() || amount.scale() > 2 {
        return None;
    }
    amount.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

/// Format cents as US dollars: `$1,234.56`, `-$0.50`.
pub fn usd(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, abs % 100)
}
