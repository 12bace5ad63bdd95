use bigdecimal::BigDecimal;
use bigdecimal::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Normalize a price to 2 decimal places for display. Order totals are kept
/// at full precision internally; only rendered values pass through here.
pub fn display_scale(value: &BigDecimal) -> BigDecimal {
    value.with_scale(2)
}

/// Compare two prices allowing a tolerance (in cents) after normalization.
pub fn nearly_equal(a: &BigDecimal, b: &BigDecimal, cents_tolerance: i64) -> bool {
    let na = display_scale(a);
    let nb = display_scale(b);
    // Convert difference to cents to avoid floating comparison.
    let diff = (na - nb).with_scale(2);
    let cents = diff.to_f64().unwrap_or(0.0) * 100.0;
    cents.abs() <= cents_tolerance as f64
}

/// A price normalized to display scale, for response bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayPrice(BigDecimal);

impl DisplayPrice {
    pub fn new(raw: BigDecimal) -> Self {
        Self(display_scale(&raw))
    }
    pub fn into_inner(self) -> BigDecimal {
        self.0
    }
}

impl From<BigDecimal> for DisplayPrice {
    fn from(value: BigDecimal) -> Self {
        Self::new(value)
    }
}

/// Exact half of a price. Half servings are priced at exactly 0.5x the full
/// serving; dividing by two on BigDecimal is exact (base-10 scale grows by
/// at most one digit), so no rounding occurs mid-computation.
pub fn half(value: &BigDecimal) -> BigDecimal {
    value / BigDecimal::from(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[test]
    fn test_display_scale() {
        let v = BigDecimal::parse_bytes(b"12.3456", 10).unwrap();
        assert_eq!(display_scale(&v).to_string(), "12.34");
    }

    #[test]
    fn test_nearly_equal() {
        let a = BigDecimal::parse_bytes(b"10.001", 10).unwrap();
        let b = BigDecimal::parse_bytes(b"10.009", 10).unwrap();
        assert!(nearly_equal(&a, &b, 1)); // 1 cent tolerance
    }

    #[test]
    fn display_price_normalizes_on_construction() {
        let raw = BigDecimal::parse_bytes(b"8", 10).unwrap();
        assert_eq!(DisplayPrice::new(raw).into_inner().to_string(), "8.00");

        let noisy = BigDecimal::parse_bytes(b"12.3456", 10).unwrap();
        assert_eq!(DisplayPrice::from(noisy).into_inner().to_string(), "12.34");
    }

    #[test]
    fn test_half_is_exact() {
        let v = BigDecimal::parse_bytes(b"0.05", 10).unwrap();
        assert_eq!(half(&v).to_string(), "0.025");
        let whole = BigDecimal::from(50);
        assert_eq!(half(&whole), BigDecimal::from(25));
    }
}
