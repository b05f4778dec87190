pub mod cart;
pub mod customers;
pub mod directory;
pub mod orders;
pub mod products;
pub mod reports;

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::errors::AppError;

/// Decimals travel as plain strings, e.g. "9.99", to avoid floating-point
/// issues. Exponent notation is rejected.
pub(crate) fn parse_decimal(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    let trimmed = raw.trim();
    if trimmed.contains(['e', 'E']) {
        return Err(AppError::BadRequest(format!(
            "Invalid {} '{}': exponent notation is not accepted",
            field, raw
        )));
    }
    BigDecimal::from_str(trimmed)
        .map_err(|e| AppError::BadRequest(format!("Invalid {} '{}': {}", field, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_accepts_plain_numbers() {
        assert_eq!(
            parse_decimal("price", " 999.99 ").unwrap(),
            BigDecimal::from_str("999.99").unwrap()
        );
    }

    #[test]
    fn parse_decimal_rejects_exponent_notation() {
        for raw in ["1e20000000", "1E3", "2.5e-1"] {
            assert!(matches!(parse_decimal("price", raw), Err(AppError::BadRequest(_))), "{raw}");
        }
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        let err = parse_decimal("price", "nine").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.starts_with("Invalid price 'nine'")));
    }
}
