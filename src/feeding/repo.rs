use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{FeedingRow, FeedingWrite};
use crate::store::{ListFilter, PgStore};

#[async_trait]
pub trait FeedingRepo: Send + Sync {
    /// Feedings of `user_id`, newest `fed_at` first.
    async fn list_feedings(
        &self,
        user_id: Uuid,
        filter: &ListFilter,
    ) -> anyhow::Result<Vec<FeedingRow>>;
    async fn get_feeding(&self, user_id: Uuid, feeding_id: Uuid)
        -> anyhow::Result<Option<FeedingRow>>;
    async fn create_feeding(&self, user_id: Uuid, entry: &FeedingWrite)
        -> anyhow::Result<FeedingRow>;
    async fn update_feeding(
        &self,
        user_id: Uuid,
        feeding_id: Uuid,
        entry: &FeedingWrite,
    ) -> anyhow::Result<Option<FeedingRow>>;
    async fn delete_feeding(&self, user_id: Uuid, feeding_id: Uuid) -> anyhow::Result<bool>;

    /// `amount_put_out` of the pet's latest feeding strictly before `before`,
    /// skipping `exclude` (the entry being edited).
    async fn previous_put_out(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        before: OffsetDateTime,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<Option<f64>>;
}

const SELECT_FEEDING: &str = r#"
    SELECT f.id, f.user_id, f.pet_id, p.name AS pet_name,
           f.food_id, fd.name AS food_name, fd.brand AS food_brand,
           f.amount_put_out::float8 AS amount_put_out,
           f.amount_not_eaten::float8 AS amount_not_eaten,
           f.amount_refilled::float8 AS amount_refilled,
           f.actual_consumed::float8 AS actual_consumed,
           f.calories_consumed::float8 AS calories_consumed,
           f.fed_at, f.notes, f.created_at, f.updated_at
      FROM feeding_entries f
      JOIN pets p ON p.id = f.pet_id AND p.user_id = f.user_id
      JOIN foods fd ON fd.id = f.food_id AND fd.user_id = f.user_id
"#;

#[async_trait]
impl FeedingRepo for PgStore {
    async fn list_feedings(
        &self,
        user_id: Uuid,
        filter: &ListFilter,
    ) -> anyhow::Result<Vec<FeedingRow>> {
        let sql = format!(
            r#"{SELECT_FEEDING}
             WHERE f.user_id = $1
               AND ($2::uuid IS NULL OR f.pet_id = $2)
               AND ($3::uuid IS NULL OR f.food_id = $3)
               AND ($4::timestamptz IS NULL OR f.fed_at >= $4)
               AND ($5::timestamptz IS NULL OR f.fed_at < $5)
             ORDER BY f.fed_at DESC
             LIMIT $6
            "#
        );
        sqlx::query_as::<_, FeedingRow>(&sql)
            .bind(user_id)
            .bind(filter.pet_id)
            .bind(filter.food_id)
            .bind(filter.since)
            .bind(filter.until)
            .bind(filter.limit)
            .fetch_all(&self.db)
            .await
            .context("list feedings")
    }

    async fn get_feeding(
        &self,
        user_id: Uuid,
        feeding_id: Uuid,
    ) -> anyhow::Result<Option<FeedingRow>> {
        let sql = format!("{SELECT_FEEDING} WHERE f.id = $1 AND f.user_id = $2");
        sqlx::query_as::<_, FeedingRow>(&sql)
            .bind(feeding_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("get feeding")
    }

    async fn create_feeding(
        &self,
        user_id: Uuid,
        entry: &FeedingWrite,
    ) -> anyhow::Result<FeedingRow> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO feeding_entries
                (user_id, pet_id, food_id, amount_put_out, amount_not_eaten, amount_refilled,
                 actual_consumed, calories_consumed, fed_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(entry.pet_id)
        .bind(entry.food_id)
        .bind(entry.amount_put_out)
        .bind(entry.amount_not_eaten)
        .bind(entry.amount_refilled)
        .bind(entry.actual_consumed)
        .bind(entry.calories_consumed)
        .bind(entry.fed_at)
        .bind(&entry.notes)
        .fetch_one(&self.db)
        .await
        .context("insert feeding")?;

        self.get_feeding(user_id, id)
            .await?
            .context("feeding vanished after insert")
    }

    async fn update_feeding(
        &self,
        user_id: Uuid,
        feeding_id: Uuid,
        entry: &FeedingWrite,
    ) -> anyhow::Result<Option<FeedingRow>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE feeding_entries
               SET pet_id = $3, food_id = $4, amount_put_out = $5, amount_not_eaten = $6,
                   amount_refilled = $7, actual_consumed = $8, calories_consumed = $9,
                   fed_at = $10, notes = $11, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(feeding_id)
        .bind(user_id)
        .bind(entry.pet_id)
        .bind(entry.food_id)
        .bind(entry.amount_put_out)
        .bind(entry.amount_not_eaten)
        .bind(entry.amount_refilled)
        .bind(entry.actual_consumed)
        .bind(entry.calories_consumed)
        .bind(entry.fed_at)
        .bind(&entry.notes)
        .fetch_optional(&self.db)
        .await
        .context("update feeding")?;

        match updated {
            Some(id) => self.get_feeding(user_id, id).await,
            None => Ok(None),
        }
    }

    async fn delete_feeding(&self, user_id: Uuid, feeding_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM feeding_entries WHERE id = $1 AND user_id = $2")
            .bind(feeding_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete feeding")?;
        Ok(res.rows_affected() > 0)
    }

    async fn previous_put_out(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
        before: OffsetDateTime,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<Option<f64>> {
        sqlx::query_scalar::<_, f64>(
            r#"
            SELECT amount_put_out::float8
              FROM feeding_entries
             WHERE user_id = $1 AND pet_id = $2 AND fed_at < $3
               AND ($4::uuid IS NULL OR id <> $4)
             ORDER BY fed_at DESC
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(pet_id)
        .bind(before)
        .bind(exclude)
        .fetch_optional(&self.db)
        .await
        .context("previous put-out")
    }
}
