use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Pet, PetFields};
use crate::store::PgStore;

#[async_trait]
pub trait PetRepo: Send + Sync {
    /// Pets of `user_id`, oldest first.
    async fn list_pets(&self, user_id: Uuid) -> anyhow::Result<Vec<Pet>>;
    async fn get_pet(&self, user_id: Uuid, pet_id: Uuid) -> anyhow::Result<Option<Pet>>;
    async fn create_pet(&self, user_id: Uuid, fields: &PetFields) -> anyhow::Result<Pet>;
    async fn update_pet(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        fields: &PetFields,
    ) -> anyhow::Result<Option<Pet>>;
    /// Removes the pet together with its feeding and weight entries.
    async fn delete_pet(&self, user_id: Uuid, pet_id: Uuid) -> anyhow::Result<bool>;
}

const PET_COLUMNS: &str = r#"
    id, user_id, name, species, breed, birth_date,
    target_weight::float8 AS target_weight, created_at, updated_at
"#;

#[async_trait]
impl PetRepo for PgStore {
    async fn list_pets(&self, user_id: Uuid) -> anyhow::Result<Vec<Pet>> {
        let sql = format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE user_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Pet>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list pets")
    }

    async fn get_pet(&self, user_id: Uuid, pet_id: Uuid) -> anyhow::Result<Option<Pet>> {
        let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Pet>(&sql)
            .bind(pet_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("get pet")
    }

    async fn create_pet(&self, user_id: Uuid, fields: &PetFields) -> anyhow::Result<Pet> {
        let sql = format!(
            r#"
            INSERT INTO pets (user_id, name, species, breed, birth_date, target_weight)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PET_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Pet>(&sql)
            .bind(user_id)
            .bind(&fields.name)
            .bind(fields.species)
            .bind(&fields.breed)
            .bind(fields.birth_date)
            .bind(fields.target_weight)
            .fetch_one(&self.db)
            .await
            .context("insert pet")
    }

    async fn update_pet(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        fields: &PetFields,
    ) -> anyhow::Result<Option<Pet>> {
        let sql = format!(
            r#"
            UPDATE pets
               SET name = $3, species = $4, breed = $5, birth_date = $6,
                   target_weight = $7, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {PET_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Pet>(&sql)
            .bind(pet_id)
            .bind(user_id)
            .bind(&fields.name)
            .bind(fields.species)
            .bind(&fields.breed)
            .bind(fields.birth_date)
            .bind(fields.target_weight)
            .fetch_optional(&self.db)
            .await
            .context("update pet")
    }

    async fn delete_pet(&self, user_id: Uuid, pet_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM pets WHERE id = $1 AND user_id = $2")
            .bind(pet_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete pet")?;
        Ok(res.rows_affected() > 0)
    }
}
