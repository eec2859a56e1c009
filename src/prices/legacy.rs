//! Unit price recovery for manually entered purchases
//!
//! Older entries have no structured price fields; they encode
//! quantity x price at the end of the description, e.g. "Leche (2 x $45)".

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_UNIT_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)x\s*\$\s*(\d+(?:[.,]\d+)?)\s*\)?\s*$").expect("valid unit price pattern")
});

/// Parse a trailing `x $<number>` out of a description
pub fn parse_unit_price(description: &str) -> Option<f64> {
    let captures = TRAILING_UNIT_PRICE.captures(description)?;
    let raw = captures.get(1)?.as_str().replace(',', ".");
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesised_suffix() {
        assert_eq!(parse_unit_price("Leche (2 x $45)"), Some(45.0));
    }

    #[test]
    fn test_decimal_separators() {
        assert_eq!(parse_unit_price("Pan x $ 32.50"), Some(32.5));
        assert_eq!(parse_unit_price("Yerba 1kg X $250,5"), Some(250.5));
    }

    #[test]
    fn test_malformed_descriptions_are_skipped() {
        assert_eq!(parse_unit_price("Queso"), None);
        assert_eq!(parse_unit_price("Arroz x $"), None);
        assert_eq!(parse_unit_price("Fideos x $abc"), None);
        assert_eq!(parse_unit_price("Arroz x $40 en oferta"), None);
        assert_eq!(parse_unit_price(""), None);
    }
}
