use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{Pet, Species};
use crate::calc::{pet_age, AmountInput, PetAge};

#[derive(Debug, Deserialize)]
pub struct PetRequest {
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default, with = "crate::formats::iso_date::option")]
    pub birth_date: Option<Date>,
    #[serde(default)]
    pub target_weight: Option<AmountInput>,
    /// Locale the amounts were typed in, e.g. `de-DE`.
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PetResponse {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    #[serde(with = "crate::formats::iso_date::option")]
    pub birth_date: Option<Date>,
    pub age: Option<PetAge>,
    pub target_weight: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PetResponse {
    pub fn from_pet(pet: Pet, today: Date) -> Self {
        Self {
            age: pet.birth_date.and_then(|b| pet_age(b, today)),
            id: pet.id,
            name: pet.name,
            species: pet.species,
            breed: pet.breed,
            birth_date: pet.birth_date,
            target_weight: pet.target_weight,
            created_at: pet.created_at,
            updated_at: pet.updated_at,
        }
    }
}
