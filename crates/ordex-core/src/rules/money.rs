//! Price and quantity parsing from free text.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ExtractError;
use super::patterns::{PRICE, QUANTITY_MARKER};

/// Locate the first `digits.digits` decimal pattern (thousands
/// separators allowed) and return it as a monetary value.
pub fn parse_price(text: &str) -> Result<Decimal, ExtractError> {
    let caps = PRICE.captures(text).ok_or(ExtractError::NoPriceFound)?;
    let integer_part = caps[1].replace(',', "");
    let amount = format!("{}.{}", integer_part, &caps[2]);
    Decimal::from_str(&amount).map_err(|_| ExtractError::NoPriceFound)
}

/// Locate a digit run immediately preceding a multiplier marker
/// (`2x`, `3 X`). A missing marker means a singular purchase, never
/// zero.
pub fn parse_quantity(text: &str) -> u32 {
    QUANTITY_MARKER
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_price_plain() {
        assert_eq!(parse_price("CDN$ 29.99").unwrap(), dec("29.99"));
        assert_eq!(parse_price("total was 5.00 today").unwrap(), dec("5.00"));
    }

    #[test]
    fn test_parse_price_thousands() {
        assert_eq!(parse_price("CDN$ 1,234.56").unwrap(), dec("1234.56"));
    }

    #[test]
    fn test_parse_price_missing() {
        assert!(matches!(
            parse_price("no amounts here"),
            Err(ExtractError::NoPriceFound)
        ));
        assert!(matches!(parse_price(""), Err(ExtractError::NoPriceFound)));
    }

    #[test]
    fn test_parse_quantity_with_marker() {
        assert_eq!(parse_quantity("2x Widget A"), 2);
        assert_eq!(parse_quantity("Qty: 3 X Gadget"), 3);
    }

    #[test]
    fn test_parse_quantity_missing_is_one() {
        assert_eq!(parse_quantity("Widget A"), 1);
        assert_eq!(parse_quantity(""), 1);
    }
}
