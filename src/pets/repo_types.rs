use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pet_species", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

/// Pet record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Pet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub birth_date: Option<Date>,
    pub target_weight: Option<f64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Validated fields for insert and update.
#[derive(Debug, Clone)]
pub struct PetFields {
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub birth_date: Option<Date>,
    pub target_weight: Option<f64>,
}
