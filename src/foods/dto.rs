use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Food;
use crate::calc::AmountInput;

#[derive(Debug, Deserialize)]
pub struct FoodRequest {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub calories_per_gram: Option<AmountInput>,
    #[serde(default)]
    pub protein_per_gram: Option<AmountInput>,
    #[serde(default)]
    pub fat_per_gram: Option<AmountInput>,
    #[serde(default)]
    pub carbs_per_gram: Option<AmountInput>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FoodResponse {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub calories_per_gram: Option<f64>,
    pub protein_per_gram: Option<f64>,
    pub fat_per_gram: Option<f64>,
    pub carbs_per_gram: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Food> for FoodResponse {
    fn from(f: Food) -> Self {
        Self {
            id: f.id,
            name: f.name,
            brand: f.brand,
            calories_per_gram: f.calories_per_gram,
            protein_per_gram: f.protein_per_gram,
            fat_per_gram: f.fat_per_gram,
            carbs_per_gram: f.carbs_per_gram,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}
