//! Data access layer: every query takes the owning user's id and filters on it.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo::UserRepo, feeding::repo::FeedingRepo, foods::repo::FoodRepo,
    pets::repo::PetRepo, weights::repo::WeightRepo,
};

/// Everything a handler can ask of a backend.
pub trait Store: UserRepo + PetRepo + FoodRepo + FeedingRepo + WeightRepo {}

impl<T> Store for T where T: UserRepo + PetRepo + FoodRepo + FeedingRepo + WeightRepo {}

/// Optional narrowing for feeding and weight listings.
///
/// Results come back newest first; `limit` turns a listing into "latest N".
/// `since` is inclusive, `until` exclusive. `food_id` is ignored for weights.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub pet_id: Option<Uuid>,
    pub food_id: Option<Uuid>,
    pub since: Option<OffsetDateTime>,
    pub until: Option<OffsetDateTime>,
    pub limit: Option<i64>,
}

impl ListFilter {
    pub fn for_pet(pet_id: Option<Uuid>) -> Self {
        Self {
            pet_id,
            ..Default::default()
        }
    }

    pub fn since(mut self, since: OffsetDateTime) -> Self {
        self.since = Some(since);
        self
    }

    pub fn latest(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub(crate) fn admits(&self, pet_id: Uuid, food_id: Option<Uuid>, at: OffsetDateTime) -> bool {
        self.pet_id.map_or(true, |p| p == pet_id)
            && match (self.food_id, food_id) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            }
            && self.since.map_or(true, |s| at >= s)
            && self.until.map_or(true, |u| at < u)
    }
}
