use axum::{
    extract::{Path, State},
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use common_http_errors::{ApiError, ApiResult};

use crate::app::AppState;
use crate::identity::{require_role, CurrentUser, STAFF_ONLY};

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub date: DateTime<Utc>,
    pub available: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFood {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub date: DateTime<Utc>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub date: Option<DateTime<Utc>>,
    pub available: Option<bool>,
}

/// Menu for the current local day. Public: students browse before logging in.
pub async fn todays_menu(State(state): State<AppState>) -> ApiResult<Json<Vec<Food>>> {
    menu_for_window(&state, day_window(0)).await
}

/// Menu for the next local day.
pub async fn tomorrows_menu(State(state): State<AppState>) -> ApiResult<Json<Vec<Food>>> {
    menu_for_window(&state, day_window(1)).await
}

async fn menu_for_window(
    state: &AppState,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
) -> ApiResult<Json<Vec<Food>>> {
    let foods = sqlx::query_as::<_, Food>(
        "SELECT id, name, description, price, date, available FROM foods \
         WHERE date >= $1 AND date < $2 AND available = TRUE ORDER BY name",
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(Json(foods))
}

/// Day boundaries are local midnight to the next local midnight.
fn day_window(days_ahead: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = Local::now().date_naive() + Duration::days(days_ahead);
    (local_midnight(day), local_midnight(day + Duration::days(1)))
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let mut naive = day.and_time(NaiveTime::MIN);
    loop {
        if let Some(instant) = naive.and_local_timezone(Local).earliest() {
            return instant.with_timezone(&Utc);
        }
        // Midnight fell into a DST gap; advance to the first representable
        // instant of the day.
        naive = naive + Duration::minutes(30);
    }
}

pub async fn create_food(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(new_food): Json<NewFood>,
) -> ApiResult<Json<Food>> {
    require_role(&user, STAFF_ONLY)?;

    let food = sqlx::query_as::<_, Food>(
        "INSERT INTO foods (id, name, description, price, date, available) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, name, description, price, date, available",
    )
    .bind(Uuid::new_v4())
    .bind(&new_food.name)
    .bind(&new_food.description)
    .bind(&new_food.price)
    .bind(new_food.date)
    .bind(new_food.available)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(Json(food))
}

/// Full menu, including unavailable and past items, for staff management.
pub async fn list_foods(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Food>>> {
    require_role(&user, STAFF_ONLY)?;

    let foods = sqlx::query_as::<_, Food>(
        "SELECT id, name, description, price, date, available FROM foods ORDER BY date DESC, name",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(Json(foods))
}

pub async fn update_food(
    State(state): State<AppState>,
    Path(food_id): Path<Uuid>,
    user: CurrentUser,
    Json(patch): Json<FoodPatch>,
) -> ApiResult<Json<Food>> {
    require_role(&user, STAFF_ONLY)?;

    let food = sqlx::query_as::<_, Food>(
        "UPDATE foods SET \
           name = COALESCE($2, name), \
           description = COALESCE($3, description), \
           price = COALESCE($4, price), \
           date = COALESCE($5, date), \
           available = COALESCE($6, available) \
         WHERE id = $1 \
         RETURNING id, name, description, price, date, available",
    )
    .bind(food_id)
    .bind(patch.name)
    .bind(patch.description)
    .bind(patch.price)
    .bind(patch.date)
    .bind(patch.available)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(|| ApiError::not_found("food_not_found"))?;

    Ok(Json(food))
}

pub async fn delete_food(
    State(state): State<AppState>,
    Path(food_id): Path<Uuid>,
    user: CurrentUser,
) -> ApiResult<Json<serde_json::Value>> {
    require_role(&user, STAFF_ONLY)?;

    let deleted = sqlx::query("DELETE FROM foods WHERE id = $1")
        .bind(food_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("food_not_found"));
    }

    Ok(Json(serde_json::json!({ "msg": "food deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_window_spans_exactly_one_day() {
        let (start, end) = day_window(0);
        let (next_start, _) = day_window(1);
        assert_eq!(end, next_start);
        // One day apart, modulo a DST shift of at most an hour.
        let span = (end - start).num_minutes();
        assert!((23 * 60..=25 * 60).contains(&span), "span was {span} minutes");
    }

    #[test]
    fn local_midnight_is_start_of_day() {
        let day = Local::now().date_naive();
        let midnight = local_midnight(day).with_timezone(&Local);
        assert_eq!(midnight.date_naive(), day);
    }
}
