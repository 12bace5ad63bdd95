use std::collections::HashMap;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use canteen_service::pricing::{price_order, CartLine, PricingError, ServingSize};

fn price(raw: &str) -> BigDecimal {
    BigDecimal::parse_bytes(raw.as_bytes(), 10).unwrap()
}

fn cart_line(food_id: Uuid, quantity: i32, size: ServingSize) -> CartLine {
    CartLine { food_id, quantity, size, note: String::new() }
}

#[test]
fn worked_example_totals_225() {
    // [A(100) x2 full, B(50) x1 half] -> 200 + 25 = 225
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let menu = HashMap::from([(a, price("100")), (b, price("50"))]);

    let priced = price_order(
        Uuid::new_v4(),
        &[
            cart_line(a, 2, ServingSize::Full),
            cart_line(b, 1, ServingSize::Half),
        ],
        |id| menu.get(&id).cloned(),
    )
    .expect("cart prices");

    assert_eq!(priced.total, price("225"));
    // Snapshots carry the unadjusted menu price.
    assert_eq!(priced.lines[0].unit_price, price("100"));
    assert_eq!(priced.lines[1].unit_price, price("50"));
}

#[test]
fn half_serving_is_exactly_half_the_full_line_price() {
    let food = Uuid::new_v4();
    let menu = HashMap::from([(food, price("7.35"))]);
    let student = Uuid::new_v4();

    for quantity in [1, 2, 3, 7] {
        let full = price_order(student, &[cart_line(food, quantity, ServingSize::Full)], |id| {
            menu.get(&id).cloned()
        })
        .unwrap();
        let half = price_order(student, &[cart_line(food, quantity, ServingSize::Half)], |id| {
            menu.get(&id).cloned()
        })
        .unwrap();

        assert_eq!(half.total.clone() * BigDecimal::from(2), full.total);
    }
}

#[test]
fn total_matches_independent_recomputation() {
    let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let menu = HashMap::from([
        (ids[0], price("3.20")),
        (ids[1], price("12.00")),
        (ids[2], price("0.85")),
        (ids[3], price("6.50")),
    ]);
    let cart = vec![
        cart_line(ids[0], 2, ServingSize::Full),
        cart_line(ids[1], 1, ServingSize::Half),
        cart_line(ids[2], 5, ServingSize::Full),
        cart_line(ids[3], 3, ServingSize::Half),
    ];

    let priced = price_order(Uuid::new_v4(), &cart, |id| menu.get(&id).cloned()).unwrap();

    let mut expected = BigDecimal::from(0);
    for line in &cart {
        let mut line_total = menu[&line.food_id].clone() * BigDecimal::from(line.quantity);
        if line.size == ServingSize::Half {
            line_total = common_money::half(&line_total);
        }
        expected += line_total;
    }
    assert_eq!(priced.total, expected);
    assert!(common_money::nearly_equal(&priced.total, &expected, 0));
}

#[test]
fn snapshot_survives_later_menu_edits() {
    let food = Uuid::new_v4();
    let mut menu = HashMap::from([(food, price("4.00"))]);

    let at_order_time = menu.clone();
    let priced = price_order(
        Uuid::new_v4(),
        &[cart_line(food, 2, ServingSize::Full)],
        |id| at_order_time.get(&id).cloned(),
    )
    .unwrap();

    // Staff raise the price afterwards; the priced order must not move.
    menu.insert(food, price("9.99"));
    assert_eq!(priced.lines[0].unit_price, price("4.00"));
    assert_eq!(priced.total, price("8.00"));
}

#[test]
fn missing_item_voids_the_whole_cart() {
    let known = Uuid::new_v4();
    let missing = Uuid::new_v4();
    let menu = HashMap::from([(known, price("2.00"))]);

    let err = price_order(
        Uuid::new_v4(),
        &[
            cart_line(known, 1, ServingSize::Full),
            cart_line(missing, 1, ServingSize::Full),
        ],
        |id| menu.get(&id).cloned(),
    )
    .expect_err("must reject");

    assert_eq!(err, PricingError::ItemNotFound(missing));
}
