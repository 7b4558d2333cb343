use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ListFilter;
use crate::{
    auth::repo::{User, UserRepo},
    feeding::{
        repo::FeedingRepo,
        repo_types::{FeedingRow, FeedingWrite},
    },
    foods::{
        repo::FoodRepo,
        repo_types::{Food, FoodFields},
    },
    pets::{
        repo::PetRepo,
        repo_types::{Pet, PetFields},
    },
    weights::{
        repo::WeightRepo,
        repo_types::{WeightRow, WeightWrite},
    },
};

/// Process-local store with the same ownership and cascade rules as the schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    pets: Vec<Pet>,
    foods: Vec<Food>,
    feedings: Vec<StoredFeeding>,
    weights: Vec<StoredWeight>,
}

struct StoredFeeding {
    id: Uuid,
    user_id: Uuid,
    entry: FeedingWrite,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

struct StoredWeight {
    id: Uuid,
    user_id: Uuid,
    entry: WeightWrite,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl Tables {
    fn pet(&self, user_id: Uuid, pet_id: Uuid) -> Option<&Pet> {
        self.pets
            .iter()
            .find(|p| p.id == pet_id && p.user_id == user_id)
    }

    fn food(&self, user_id: Uuid, food_id: Uuid) -> Option<&Food> {
        self.foods
            .iter()
            .find(|f| f.id == food_id && f.user_id == user_id)
    }

    fn join_feeding(&self, f: &StoredFeeding) -> Option<FeedingRow> {
        let pet = self.pet(f.user_id, f.entry.pet_id)?;
        let food = self.food(f.user_id, f.entry.food_id)?;
        Some(FeedingRow {
            id: f.id,
            user_id: f.user_id,
            pet_id: pet.id,
            pet_name: pet.name.clone(),
            food_id: food.id,
            food_name: food.name.clone(),
            food_brand: food.brand.clone(),
            amount_put_out: f.entry.amount_put_out,
            amount_not_eaten: f.entry.amount_not_eaten,
            amount_refilled: f.entry.amount_refilled,
            actual_consumed: f.entry.actual_consumed,
            calories_consumed: f.entry.calories_consumed,
            fed_at: f.entry.fed_at,
            notes: f.entry.notes.clone(),
            created_at: f.created_at,
            updated_at: f.updated_at,
        })
    }

    fn join_weight(&self, w: &StoredWeight) -> Option<WeightRow> {
        let pet = self.pet(w.user_id, w.entry.pet_id)?;
        Some(WeightRow {
            id: w.id,
            user_id: w.user_id,
            pet_id: pet.id,
            pet_name: pet.name.clone(),
            weight: w.entry.weight,
            weighed_at: w.entry.weighed_at,
            notes: w.entry.notes.clone(),
            created_at: w.created_at,
            updated_at: w.updated_at,
        })
    }

    fn check_refs(&self, user_id: Uuid, pet_id: Uuid, food_id: Option<Uuid>) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.pet(user_id, pet_id).is_some(),
            "foreign key violation: pet {pet_id}"
        );
        if let Some(food_id) = food_id {
            anyhow::ensure!(
                self.food(user_id, food_id).is_some(),
                "foreign key violation: food {food_id}"
            );
        }
        Ok(())
    }
}

fn take_limit<T>(mut rows: Vec<T>, limit: Option<i64>) -> Vec<T> {
    if let Some(n) = limit {
        rows.truncate(usize::try_from(n.max(0)).unwrap_or(usize::MAX));
    }
    rows
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(Some(user))
    }
}

#[async_trait]
impl PetRepo for MemoryStore {
    async fn list_pets(&self, user_id: Uuid) -> anyhow::Result<Vec<Pet>> {
        let t = self.tables.read().await;
        let mut pets: Vec<Pet> = t
            .pets
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        pets.sort_by_key(|p| p.created_at);
        Ok(pets)
    }

    async fn get_pet(&self, user_id: Uuid, pet_id: Uuid) -> anyhow::Result<Option<Pet>> {
        let t = self.tables.read().await;
        Ok(t.pet(user_id, pet_id).cloned())
    }

    async fn create_pet(&self, user_id: Uuid, fields: &PetFields) -> anyhow::Result<Pet> {
        let now = OffsetDateTime::now_utc();
        let pet = Pet {
            id: Uuid::new_v4(),
            user_id,
            name: fields.name.clone(),
            species: fields.species,
            breed: fields.breed.clone(),
            birth_date: fields.birth_date,
            target_weight: fields.target_weight,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.pets.push(pet.clone());
        Ok(pet)
    }

    async fn update_pet(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        fields: &PetFields,
    ) -> anyhow::Result<Option<Pet>> {
        let mut t = self.tables.write().await;
        let Some(pet) = t
            .pets
            .iter_mut()
            .find(|p| p.id == pet_id && p.user_id == user_id)
        else {
            return Ok(None);
        };
        pet.name = fields.name.clone();
        pet.species = fields.species;
        pet.breed = fields.breed.clone();
        pet.birth_date = fields.birth_date;
        pet.target_weight = fields.target_weight;
        pet.updated_at = OffsetDateTime::now_utc();
        Ok(Some(pet.clone()))
    }

    async fn delete_pet(&self, user_id: Uuid, pet_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.pets.len();
        t.pets.retain(|p| !(p.id == pet_id && p.user_id == user_id));
        if t.pets.len() == before {
            return Ok(false);
        }
        t.feedings.retain(|f| f.entry.pet_id != pet_id);
        t.weights.retain(|w| w.entry.pet_id != pet_id);
        Ok(true)
    }
}

#[async_trait]
impl FoodRepo for MemoryStore {
    async fn list_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<Food>> {
        let t = self.tables.read().await;
        let mut foods: Vec<Food> = t
            .foods
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        foods.reverse();
        foods.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(foods)
    }

    async fn get_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Option<Food>> {
        let t = self.tables.read().await;
        Ok(t.food(user_id, food_id).cloned())
    }

    async fn create_food(&self, user_id: Uuid, fields: &FoodFields) -> anyhow::Result<Food> {
        let now = OffsetDateTime::now_utc();
        let food = Food {
            id: Uuid::new_v4(),
            user_id,
            name: fields.name.clone(),
            brand: fields.brand.clone(),
            calories_per_gram: fields.calories_per_gram,
            protein_per_gram: fields.protein_per_gram,
            fat_per_gram: fields.fat_per_gram,
            carbs_per_gram: fields.carbs_per_gram,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.foods.push(food.clone());
        Ok(food)
    }

    async fn update_food(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        fields: &FoodFields,
    ) -> anyhow::Result<Option<Food>> {
        let mut t = self.tables.write().await;
        let Some(food) = t
            .foods
            .iter_mut()
            .find(|f| f.id == food_id && f.user_id == user_id)
        else {
            return Ok(None);
        };
        food.name = fields.name.clone();
        food.brand = fields.brand.clone();
        food.calories_per_gram = fields.calories_per_gram;
        food.protein_per_gram = fields.protein_per_gram;
        food.fat_per_gram = fields.fat_per_gram;
        food.carbs_per_gram = fields.carbs_per_gram;
        food.updated_at = OffsetDateTime::now_utc();
        Ok(Some(food.clone()))
    }

    async fn delete_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.foods.len();
        t.foods.retain(|f| !(f.id == food_id && f.user_id == user_id));
        if t.foods.len() == before {
            return Ok(false);
        }
        t.feedings.retain(|f| f.entry.food_id != food_id);
        Ok(true)
    }
}

#[async_trait]
impl FeedingRepo for MemoryStore {
    async fn list_feedings(
        &self,
        user_id: Uuid,
        filter: &ListFilter,
    ) -> anyhow::Result<Vec<FeedingRow>> {
        let t = self.tables.read().await;
        let mut rows: Vec<FeedingRow> = t
            .feedings
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter(|f| filter.admits(f.entry.pet_id, Some(f.entry.food_id), f.entry.fed_at))
            .filter_map(|f| t.join_feeding(f))
            .collect();
        rows.sort_by(|a, b| b.fed_at.cmp(&a.fed_at));
        Ok(take_limit(rows, filter.limit))
    }

    async fn get_feeding(
        &self,
        user_id: Uuid,
        feeding_id: Uuid,
    ) -> anyhow::Result<Option<FeedingRow>> {
        let t = self.tables.read().await;
        Ok(t.feedings
            .iter()
            .find(|f| f.id == feeding_id && f.user_id == user_id)
            .and_then(|f| t.join_feeding(f)))
    }

    async fn create_feeding(
        &self,
        user_id: Uuid,
        entry: &FeedingWrite,
    ) -> anyhow::Result<FeedingRow> {
        let mut t = self.tables.write().await;
        t.check_refs(user_id, entry.pet_id, Some(entry.food_id))?;
        let now = OffsetDateTime::now_utc();
        let stored = StoredFeeding {
            id: Uuid::new_v4(),
            user_id,
            entry: entry.clone(),
            created_at: now,
            updated_at: now,
        };
        let row = t
            .join_feeding(&stored)
            .ok_or_else(|| anyhow::anyhow!("feeding references missing rows"))?;
        t.feedings.push(stored);
        Ok(row)
    }

    async fn update_feeding(
        &self,
        user_id: Uuid,
        feeding_id: Uuid,
        entry: &FeedingWrite,
    ) -> anyhow::Result<Option<FeedingRow>> {
        let mut t = self.tables.write().await;
        t.check_refs(user_id, entry.pet_id, Some(entry.food_id))?;
        let Some(idx) = t
            .feedings
            .iter()
            .position(|f| f.id == feeding_id && f.user_id == user_id)
        else {
            return Ok(None);
        };
        t.feedings[idx].entry = entry.clone();
        t.feedings[idx].updated_at = OffsetDateTime::now_utc();
        Ok(t.join_feeding(&t.feedings[idx]))
    }

    async fn delete_feeding(&self, user_id: Uuid, feeding_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.feedings.len();
        t.feedings
            .retain(|f| !(f.id == feeding_id && f.user_id == user_id));
        Ok(t.feedings.len() < before)
    }

    async fn previous_put_out(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        before: OffsetDateTime,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<Option<f64>> {
        let t = self.tables.read().await;
        Ok(t.feedings
            .iter()
            .filter(|f| f.user_id == user_id && f.entry.pet_id == pet_id)
            .filter(|f| f.entry.fed_at < before && Some(f.id) != exclude)
            .max_by_key(|f| f.entry.fed_at)
            .map(|f| f.entry.amount_put_out))
    }
}

#[async_trait]
impl WeightRepo for MemoryStore {
    async fn list_weights(
        &self,
        user_id: Uuid,
        filter: &ListFilter,
    ) -> anyhow::Result<Vec<WeightRow>> {
        let t = self.tables.read().await;
        let mut rows: Vec<WeightRow> = t
            .weights
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter(|w| filter.admits(w.entry.pet_id, None, w.entry.weighed_at))
            .filter_map(|w| t.join_weight(w))
            .collect();
        rows.sort_by(|a, b| b.weighed_at.cmp(&a.weighed_at));
        Ok(take_limit(rows, filter.limit))
    }

    async fn get_weight(&self, user_id: Uuid, weight_id: Uuid) -> anyhow::Result<Option<WeightRow>> {
        let t = self.tables.read().await;
        Ok(t.weights
            .iter()
            .find(|w| w.id == weight_id && w.user_id == user_id)
            .and_then(|w| t.join_weight(w)))
    }

    async fn create_weight(&self, user_id: Uuid, entry: &WeightWrite) -> anyhow::Result<WeightRow> {
        let mut t = self.tables.write().await;
        t.check_refs(user_id, entry.pet_id, None)?;
        let now = OffsetDateTime::now_utc();
        let stored = StoredWeight {
            id: Uuid::new_v4(),
            user_id,
            entry: entry.clone(),
            created_at: now,
            updated_at: now,
        };
        let row = t
            .join_weight(&stored)
            .ok_or_else(|| anyhow::anyhow!("weight references missing pet"))?;
        t.weights.push(stored);
        Ok(row)
    }

    async fn update_weight(
        &self,
        user_id: Uuid,
        weight_id: Uuid,
        entry: &WeightWrite,
    ) -> anyhow::Result<Option<WeightRow>> {
        let mut t = self.tables.write().await;
        t.check_refs(user_id, entry.pet_id, None)?;
        let Some(idx) = t
            .weights
            .iter()
            .position(|w| w.id == weight_id && w.user_id == user_id)
        else {
            return Ok(None);
        };
        t.weights[idx].entry = entry.clone();
        t.weights[idx].updated_at = OffsetDateTime::now_utc();
        Ok(t.join_weight(&t.weights[idx]))
    }

    async fn delete_weight(&self, user_id: Uuid, weight_id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        let before = t.weights.len();
        t.weights
            .retain(|w| !(w.id == weight_id && w.user_id == user_id));
        Ok(t.weights.len() < before)
    }
}
