use anyhow::Context;
use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::PgStore;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<User>>;
    /// Returns `None` when the email is already registered.
    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await
        .context("insert user")
    }
}
