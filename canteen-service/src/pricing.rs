use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::status::OrderStatus;

/// Portion size requested for a cart line. A half serving costs exactly half
/// of the full serving price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingSize {
    #[default]
    Full,
    Half,
}

impl ServingSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ServingSize::Full => "full",
            ServingSize::Half => "half",
        }
    }

    fn apply(self, line_total: BigDecimal) -> BigDecimal {
        match self {
            ServingSize::Full => line_total,
            ServingSize::Half => common_money::half(&line_total),
        }
    }
}

impl std::str::FromStr for ServingSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(ServingSize::Full),
            "half" => Ok(ServingSize::Half),
            _ => Err(()),
        }
    }
}

/// One requested line of a submitted cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub food_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub size: ServingSize,
    #[serde(default)]
    pub note: String,
}

/// A cart line with its price snapshot. `unit_price` is the menu item's
/// unadjusted price at creation time; the size multiplier only affects the
/// order total, so redisplay can recompute the same numbers later.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub food_id: Uuid,
    pub quantity: i32,
    pub size: ServingSize,
    pub note: String,
    pub unit_price: BigDecimal,
}

/// An immutable, fully priced order ready to persist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedOrder {
    pub student_id: Uuid,
    pub lines: Vec<PricedLine>,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("cart contains no lines")]
    EmptyCart,
    #[error("cart line {index} has non-positive quantity {quantity}")]
    InvalidQuantity { index: usize, quantity: i32 },
    #[error("menu item {0} not found")]
    ItemNotFound(Uuid),
}

/// Price a submitted cart against the current menu.
///
/// All-or-nothing: any line that fails to resolve or validate rejects the
/// whole cart, so no partially priced order can ever escape. Pure given a
/// consistent `lookup`; arithmetic is exact decimal with no intermediate
/// rounding.
pub fn price_order<F>(
    student_id: Uuid,
    cart: &[CartLine],
    lookup: F,
) -> Result<PricedOrder, PricingError>
where
    F: Fn(Uuid) -> Option<BigDecimal>,
{
    if cart.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.len());
    let mut total = BigDecimal::from(0);

    for (index, line) in cart.iter().enumerate() {
        if line.quantity < 1 {
            return Err(PricingError::InvalidQuantity {
                index,
                quantity: line.quantity,
            });
        }

        let unit_price = lookup(line.food_id).ok_or(PricingError::ItemNotFound(line.food_id))?;
        let line_total = line.size.apply(&unit_price * BigDecimal::from(line.quantity));
        total += line_total;

        lines.push(PricedLine {
            food_id: line.food_id,
            quantity: line.quantity,
            size: line.size,
            note: line.note.clone(),
            unit_price,
        });
    }

    Ok(PricedOrder {
        student_id,
        lines,
        total,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn price(raw: &str) -> BigDecimal {
        BigDecimal::parse_bytes(raw.as_bytes(), 10).unwrap()
    }

    fn line(food_id: Uuid, quantity: i32, size: ServingSize) -> CartLine {
        CartLine { food_id, quantity, size, note: String::new() }
    }

    #[test]
    fn snapshot_keeps_unadjusted_unit_price_for_half_servings() {
        let food = Uuid::new_v4();
        let menu = HashMap::from([(food, price("8.40"))]);

        let priced = price_order(
            Uuid::new_v4(),
            &[line(food, 3, ServingSize::Half)],
            |id| menu.get(&id).cloned(),
        )
        .unwrap();

        assert_eq!(priced.lines[0].unit_price, price("8.40"));
        assert_eq!(priced.total, price("12.60"));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = price_order(Uuid::new_v4(), &[], |_| Some(price("1"))).unwrap_err();
        assert_eq!(err, PricingError::EmptyCart);
    }

    #[test]
    fn zero_and_negative_quantities_are_rejected() {
        let food = Uuid::new_v4();
        for quantity in [0, -2] {
            let err = price_order(
                Uuid::new_v4(),
                &[line(food, quantity, ServingSize::Full)],
                |_| Some(price("1")),
            )
            .unwrap_err();
            assert_eq!(err, PricingError::InvalidQuantity { index: 0, quantity });
        }
    }

    #[test]
    fn unresolvable_line_rejects_the_whole_cart() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let menu = HashMap::from([(known, price("5.00"))]);

        let err = price_order(
            Uuid::new_v4(),
            &[line(known, 1, ServingSize::Full), line(unknown, 1, ServingSize::Full)],
            |id| menu.get(&id).cloned(),
        )
        .unwrap_err();

        assert_eq!(err, PricingError::ItemNotFound(unknown));
    }

    #[test]
    fn new_orders_start_pending() {
        let food = Uuid::new_v4();
        let priced = price_order(
            Uuid::new_v4(),
            &[line(food, 1, ServingSize::Full)],
            |_| Some(price("2.50")),
        )
        .unwrap();
        assert_eq!(priced.status, OrderStatus::Pending);
    }
}
