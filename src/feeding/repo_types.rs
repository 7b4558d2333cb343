use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Feeding entry joined with the pet and food display fields.
#[derive(Debug, Clone, FromRow)]
pub struct FeedingRow {
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub fed_at: OffsetDateTime,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// What gets written for a feeding, derived fields included.
#[derive(Debug, Clone)]
pub struct FeedingWrite {
    pub pet_id: Uuid,
    pub food_id: Uuid,
    pub amount_put_out: f64,
    pub amount_not_eaten: Option<f64>,
    pub amount_refilled: Option<f64>,
    pub actual_consumed: f64,
    pub calories_consumed: Option<f64>,
    pub fed_at: OffsetDateTime,
    pub notes: Option<String>,
}
