use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::calc::compute_calories;

/// Food record in the database. Nutrient densities are per gram.
#[derive(Debug, Clone, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub calories_per_gram: Option<f64>,
    pub protein_per_gram: Option<f64>,
    pub fat_per_gram: Option<f64>,
    pub carbs_per_gram: Option<f64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Food {
    pub fn calories_for(&self, grams: f64) -> Option<f64> {
        compute_calories(grams, self.calories_per_gram)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FoodFields {
    pub name: String,
    pub brand: Option<String>,
    pub calories_per_gram: Option<f64>,
    pub protein_per_gram: Option<f64>,
    pub fat_per_gram: Option<f64>,
    pub carbs_per_gram: Option<f64>,
}
