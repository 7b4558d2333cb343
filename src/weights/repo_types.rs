use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Weight entry joined with the pet's name.
#[derive(Debug, Clone, FromRow)]
pub struct WeightRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pet_id: Uuid,
    pub pet_name: String,
    pub weight: f64,
    pub weighed_at: OffsetDateTime,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct WeightWrite {
    pub pet_id: Uuid,
    pub weight: f64,
    pub weighed_at: OffsetDateTime,
    pub notes: Option<String>,
}
