use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{WeightRow, WeightWrite};
use crate::store::{ListFilter, PgStore};

#[async_trait]
pub trait WeightRepo: Send + Sync {
    /// Weights of `user_id`, newest `weighed_at` first.
    async fn list_weights(&self, user_id: Uuid, filter: &ListFilter)
        -> anyhow::Result<Vec<WeightRow>>;
    async fn get_weight(&self, user_id: Uuid, weight_id: Uuid) -> anyhow::Result<Option<WeightRow>>;
    async fn create_weight(&self, user_id: Uuid, entry: &WeightWrite) -> anyhow::Result<WeightRow>;
    async fn update_weight(
        &self,
        user_id: Uuid,
        weight_id: Uuid,
        entry: &WeightWrite,
    ) -> anyhow::Result<Option<WeightRow>>;
    async fn delete_weight(&self, user_id: Uuid, weight_id: Uuid) -> anyhow::Result<bool>;
}

const SELECT_WEIGHT: &str = r#"
    SELECT w.id, w.user_id, w.pet_id, p.name AS pet_name,
           w.weight::float8 AS weight, w.weighed_at, w.notes, w.created_at, w.updated_at
      FROM weight_entries w
      JOIN pets p ON p.id = w.pet_id AND p.user_id = w.user_id
"#;

#[async_trait]
impl WeightRepo for PgStore {
    async fn list_weights(
        &self,
        user_id: Uuid,
        filter: &ListFilter,
    ) -> anyhow::Result<Vec<WeightRow>> {
        let sql = format!(
            r#"{SELECT_WEIGHT}
             WHERE w.user_id = $1
               AND ($2::uuid IS NULL OR w.pet_id = $2)
               AND ($3::timestamptz IS NULL OR w.weighed_at >= $3)
               AND ($4::timestamptz IS NULL OR w.weighed_at < $4)
             ORDER BY w.weighed_at DESC
             LIMIT $5
            "#
        );
        sqlx::query_as::<_, WeightRow>(&sql)
            .bind(user_id)
            .bind(filter.pet_id)
            .bind(filter.since)
            .bind(filter.until)
            .bind(filter.limit)
            .fetch_all(&self.db)
            .await
            .context("list weights")
    }

    async fn get_weight(&self, user_id: Uuid, weight_id: Uuid) -> anyhow::Result<Option<WeightRow>> {
        let sql = format!("{SELECT_WEIGHT} WHERE w.id = $1 AND w.user_id = $2");
        sqlx::query_as::<_, WeightRow>(&sql)
            .bind(weight_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("get weight")
    }

    async fn create_weight(&self, user_id: Uuid, entry: &WeightWrite) -> anyhow::Result<WeightRow> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO weight_entries (user_id, pet_id, weight, weighed_at, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(entry.pet_id)
        .bind(entry.weight)
        .bind(entry.weighed_at)
        .bind(&entry.notes)
        .fetch_one(&self.db)
        .await
        .context("insert weight")?;

        self.get_weight(user_id, id)
            .await?
            .context("weight vanished after insert")
    }

    async fn update_weight(
        &self,
        user_id: Uuid,
        weight_id: Uuid,
        entry: &WeightWrite,
    ) -> anyhow::Result<Option<WeightRow>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE weight_entries
               SET pet_id = $3, weight = $4, weighed_at = $5, notes = $6, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(weight_id)
        .bind(user_id)
        .bind(entry.pet_id)
        .bind(entry.weight)
        .bind(entry.weighed_at)
        .bind(&entry.notes)
        .fetch_optional(&self.db)
        .await
        .context("update weight")?;

        match updated {
            Some(id) => self.get_weight(user_id, id).await,
            None => Ok(None),
        }
    }

    async fn delete_weight(&self, user_id: Uuid, weight_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM weight_entries WHERE id = $1 AND user_id = $2")
            .bind(weight_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete weight")?;
        Ok(res.rows_affected() > 0)
    }
}
