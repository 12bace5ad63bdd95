use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use common_http_errors::{ApiError, ApiResult};
use common_money::DisplayPrice;

use crate::app::AppState;
use crate::identity::{require_role, CurrentUser, STAFF_ONLY, STUDENT_ONLY};
use crate::pricing::{price_order, CartLine, PricingError, ServingSize};
use crate::status::OrderStatus;

#[derive(Debug, Deserialize)]
pub struct NewOrder {
    pub items: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub food: FoodSummary,
    pub quantity: i32,
    pub size: ServingSize,
    pub note: String,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub student_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_username: Option<String>,
    pub items: Vec<OrderLineView>,
    pub total: DisplayPrice,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct OrderRow {
    id: Uuid,
    student_id: Uuid,
    total: BigDecimal,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct StaffOrderRow {
    id: Uuid,
    student_id: Uuid,
    username: String,
    total: BigDecimal,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct FoodPriceRow {
    id: Uuid,
    name: String,
    description: String,
    price: BigDecimal,
}

#[derive(FromRow)]
struct LineRow {
    order_id: Uuid,
    food_id: Uuid,
    name: Option<String>,
    description: Option<String>,
    quantity: i32,
    size: String,
    note: String,
    unit_price: BigDecimal,
}

/// Submit a cart as a new order. Student only. The whole cart prices as one
/// unit: one unresolvable item rejects the order and nothing is written.
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new_order): Json<NewOrder>,
) -> ApiResult<Json<OrderView>> {
    require_role(&user, STUDENT_ONLY)?;

    let ids: Vec<Uuid> = new_order.items.iter().map(|line| line.food_id).collect();
    let foods = sqlx::query_as::<_, FoodPriceRow>(
        "SELECT id, name, description, price FROM foods WHERE id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    let menu: HashMap<Uuid, FoodPriceRow> =
        foods.into_iter().map(|food| (food.id, food)).collect();

    let priced = price_order(user.id, &new_order.items, |id| {
        menu.get(&id).map(|food| food.price.clone())
    })
    .map_err(|err| match err {
        PricingError::ItemNotFound(_) => ApiError::not_found("food_not_found"),
        PricingError::EmptyCart => ApiError::bad_request("empty_cart"),
        PricingError::InvalidQuantity { .. } => ApiError::BadRequest {
            code: "invalid_quantity",
            message: Some(err.to_string()),
        },
    })?;

    let order_id = Uuid::new_v4();
    let mut tx = state
        .db
        .begin()
        .await
        .map_err(ApiError::internal)?;

    sqlx::query(
        "INSERT INTO orders (id, student_id, total, status, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(order_id)
    .bind(priced.student_id)
    .bind(&priced.total)
    .bind(priced.status.as_str())
    .bind(priced.created_at)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::internal)?;

    for (position, line) in priced.lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items (order_id, position, food_id, quantity, size, note, unit_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order_id)
        .bind(position as i32)
        .bind(line.food_id)
        .bind(line.quantity)
        .bind(line.size.as_str())
        .bind(&line.note)
        .bind(&line.unit_price)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::internal)?;
    }

    tx.commit()
        .await
        .map_err(ApiError::internal)?;

    info!(order_id = %order_id, student_id = %user.id, total = %priced.total, "order placed");

    let items = priced
        .lines
        .iter()
        .map(|line| {
            let food = menu
                .get(&line.food_id)
                .map(|food| FoodSummary {
                    id: food.id,
                    name: food.name.clone(),
                    description: food.description.clone(),
                })
                .unwrap_or_else(|| FoodSummary {
                    id: line.food_id,
                    name: String::new(),
                    description: String::new(),
                });
            OrderLineView {
                food,
                quantity: line.quantity,
                size: line.size,
                note: line.note.clone(),
                unit_price: line.unit_price.clone(),
            }
        })
        .collect();

    Ok(Json(OrderView {
        id: order_id,
        student_id: priced.student_id,
        student_username: None,
        items,
        total: DisplayPrice::new(priced.total),
        status: priced.status,
        created_at: priced.created_at,
    }))
}

/// The caller's own orders, newest first. Student only: ownership is the
/// read boundary, so the query is keyed on the authenticated identity.
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<OrderView>>> {
    require_role(&user, STUDENT_ONLY)?;

    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, student_id, total, status, created_at FROM orders \
         WHERE student_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut lines = load_order_lines(&state.db, &order_ids).await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(OrderView {
            id: row.id,
            student_id: row.student_id,
            student_username: None,
            items: lines.remove(&row.id).unwrap_or_default(),
            total: DisplayPrice::new(row.total),
            status: parse_status(&row.status)?,
            created_at: row.created_at,
        });
    }

    Ok(Json(orders))
}

/// Every order in the system, with the owning student resolved. Staff only.
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<OrderView>>> {
    require_role(&user, STAFF_ONLY)?;

    let rows = sqlx::query_as::<_, StaffOrderRow>(
        "SELECT o.id, o.student_id, u.username, o.total, o.status, o.created_at \
         FROM orders o JOIN users u ON u.id = o.student_id \
         ORDER BY o.created_at DESC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut lines = load_order_lines(&state.db, &order_ids).await?;

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        orders.push(OrderView {
            id: row.id,
            student_id: row.student_id,
            student_username: Some(row.username),
            items: lines.remove(&row.id).unwrap_or_default(),
            total: DisplayPrice::new(row.total),
            status: parse_status(&row.status)?,
            created_at: row.created_at,
        });
    }

    Ok(Json(orders))
}

/// Advance an order's status. Staff only, and only along
/// pending -> confirmed -> delivered; anything else is an invalid transition.
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    user: CurrentUser,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Json<OrderView>> {
    require_role(&user, STAFF_ONLY)?;

    let target = update.status.parse::<OrderStatus>().map_err(|_| {
        ApiError::BadRequest {
            code: "invalid_status",
            message: Some(format!(
                "Unknown status '{}'. Expected pending, confirmed or delivered.",
                update.status
            )),
        }
    })?;

    let row = sqlx::query_as::<_, StaffOrderRow>(
        "SELECT o.id, o.student_id, u.username, o.total, o.status, o.created_at \
         FROM orders o JOIN users u ON u.id = o.student_id WHERE o.id = $1",
    )
    .bind(order_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(|| ApiError::not_found("order_not_found"))?;

    let current = parse_status(&row.status)?;
    if !current.can_transition_to(target) {
        return Err(ApiError::BadRequest {
            code: "invalid_transition",
            message: Some(format!("Cannot move order from {current} to {target}")),
        });
    }

    // Guarded update: the write only lands if the order still holds the
    // status the transition was validated against, so a concurrent advance
    // cannot be regressed by a stale request.
    let updated = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1 AND status = $3")
        .bind(order_id)
        .bind(target.as_str())
        .bind(current.as_str())
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::BadRequest {
            code: "invalid_transition",
            message: Some(format!(
                "Order is no longer {current}; refresh and retry."
            )),
        });
    }

    info!(order_id = %order_id, from = %current, to = %target, staff_id = %user.id, "order status updated");

    let mut lines = load_order_lines(&state.db, &[order_id]).await?;

    Ok(Json(OrderView {
        id: row.id,
        student_id: row.student_id,
        student_username: Some(row.username),
        items: lines.remove(&row.id).unwrap_or_default(),
        total: DisplayPrice::new(row.total),
        status: target,
        created_at: row.created_at,
    }))
}

async fn load_order_lines(
    db: &PgPool,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderLineView>>, ApiError> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    // LEFT JOIN: a menu item deleted after ordering must not hide the line;
    // the snapshot price on the line stays authoritative either way.
    let rows = sqlx::query_as::<_, LineRow>(
        "SELECT i.order_id, i.food_id, f.name, f.description, \
                i.quantity, i.size, i.note, i.unit_price \
         FROM order_items i LEFT JOIN foods f ON f.id = i.food_id \
         WHERE i.order_id = ANY($1) ORDER BY i.order_id, i.position",
    )
    .bind(order_ids)
    .fetch_all(db)
    .await
    .map_err(ApiError::internal)?;

    let mut lines: HashMap<Uuid, Vec<OrderLineView>> = HashMap::new();
    for row in rows {
        let size = row.size.parse::<ServingSize>().map_err(|()| {
            ApiError::internal(format!("unrecognised serving size '{}'", row.size))
        })?;
        lines.entry(row.order_id).or_default().push(OrderLineView {
            food: FoodSummary {
                id: row.food_id,
                name: row.name.unwrap_or_default(),
                description: row.description.unwrap_or_default(),
            },
            quantity: row.quantity,
            size,
            note: row.note,
            unit_price: row.unit_price,
        });
    }

    Ok(lines)
}

fn parse_status(raw: &str) -> Result<OrderStatus, ApiError> {
    raw.parse::<OrderStatus>()
        .map_err(ApiError::internal)
}
