use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{Food, FoodFields};
use crate::store::PgStore;

#[async_trait]
pub trait FoodRepo: Send + Sync {
    /// Foods of `user_id`, newest first.
    async fn list_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<Food>>;
    async fn get_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Option<Food>>;
    async fn create_food(&self, user_id: Uuid, fields: &FoodFields) -> anyhow::Result<Food>;
    async fn update_food(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        fields: &FoodFields,
    ) -> anyhow::Result<Option<Food>>;
    /// Removes the food together with the feeding entries that used it.
    async fn delete_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<bool>;
}

const FOOD_COLUMNS: &str = r#"
    id, user_id, name, brand,
    calories_per_gram::float8 AS calories_per_gram,
    protein_per_gram::float8 AS protein_per_gram,
    fat_per_gram::float8 AS fat_per_gram,
    carbs_per_gram::float8 AS carbs_per_gram,
    created_at, updated_at
"#;

#[async_trait]
impl FoodRepo for PgStore {
    async fn list_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<Food>> {
        let sql = format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Food>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list foods")
    }

    async fn get_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Option<Food>> {
        let sql = format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Food>(&sql)
            .bind(food_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("get food")
    }

    async fn create_food(&self, user_id: Uuid, fields: &FoodFields) -> anyhow::Result<Food> {
        let sql = format!(
            r#"
            INSERT INTO foods (user_id, name, brand, calories_per_gram,
                               protein_per_gram, fat_per_gram, carbs_per_gram)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {FOOD_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Food>(&sql)
            .bind(user_id)
            .bind(&fields.name)
            .bind(&fields.brand)
            .bind(fields.calories_per_gram)
            .bind(fields.protein_per_gram)
            .bind(fields.fat_per_gram)
            .bind(fields.carbs_per_gram)
            .fetch_one(&self.db)
            .await
            .context("insert food")
    }

    async fn update_food(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        fields: &FoodFields,
    ) -> anyhow::Result<Option<Food>> {
        let sql = format!(
            r#"
            UPDATE foods
               SET name = $3, brand = $4, calories_per_gram = $5, protein_per_gram = $6,
                   fat_per_gram = $7, carbs_per_gram = $8, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {FOOD_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Food>(&sql)
            .bind(food_id)
            .bind(user_id)
            .bind(&fields.name)
            .bind(&fields.brand)
            .bind(fields.calories_per_gram)
            .bind(fields.protein_per_gram)
            .bind(fields.fat_per_gram)
            .bind(fields.carbs_per_gram)
            .fetch_optional(&self.db)
            .await
            .context("update food")
    }

    async fn delete_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM foods WHERE id = $1 AND user_id = $2")
            .bind(food_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete food")?;
        Ok(res.rows_affected() > 0)
    }
}
