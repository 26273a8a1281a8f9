// farmconnect/src/services/money.rs

use rust_decimal::Decimal;
use rusty_money::{iso, iso::Currency, Money};

/// Looks up an ISO 4217 currency by its alphabetic code, e.g. `INR`.
pub fn currency_for(code: &str) -> Option<&'static Currency> {
  iso::find(&code.trim().to_uppercase())
}

/// Renders an amount for display, e.g. `₹90.00` for INR.
pub fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
  Money::from_decimal(amount, currency).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn resolves_currency_codes_case_insensitively() {
    assert_eq!(currency_for("inr").map(|c| c.iso_alpha_code), Some("INR"));
    assert!(currency_for("XYZ").is_none());
  }

  #[test]
  fn formats_with_currency_symbol() {
    let formatted = format_amount(dec!(90), iso::INR);
    assert!(formatted.contains('₹'), "{formatted}");
    assert!(formatted.contains("90"), "{formatted}");
  }
}
