use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::FeedingRow;
use crate::calc::AmountInput;

#[derive(Debug, Deserialize)]
pub struct FeedingRequest {
    pub pet_id: Uuid,
    pub food_id: Uuid,
    /// Grams served, or the current bowl weight under the bowl-weight policy.
    pub amount_put_out: AmountInput,
    #[serde(default)]
    pub amount_not_eaten: Option<AmountInput>,
    #[serde(default)]
    pub amount_refilled: Option<AmountInput>,
    /// Defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub fed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedingQuery {
    pub pet_id: Option<Uuid>,
    pub food_id: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub since: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub until: Option<OffsetDateTime>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FeedingResponse {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub pet_name: String,
    pub food_id: Uuid,
    pub food_name: String,
    pub food_brand: Option<String>,
    pub amount_put_out: f64,
    pub amount_not_eaten: Option<f64>,
    pub amount_refilled: Option<f64>,
    pub actual_consumed: f64,
    pub calories_consumed: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub fed_at: OffsetDateTime,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<FeedingRow> for FeedingResponse {
    fn from(r: FeedingRow) -> Self {
        Self {
            id: r.id,
            pet_id: r.pet_id,
            pet_name: r.pet_name,
            food_id: r.food_id,
            food_name: r.food_name,
            food_brand: r.food_brand,
            amount_put_out: r.amount_put_out,
            amount_not_eaten: r.amount_not_eaten,
            amount_refilled: r.amount_refilled,
            actual_consumed: r.actual_consumed,
            calories_consumed: r.calories_consumed,
            fed_at: r.fed_at,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
