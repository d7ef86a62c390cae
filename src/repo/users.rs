use async_trait::async_trait;
use chrono::Utc;
use mizar_schema::{UserCreate, UserPatch};
use sqlx::SqlitePool;

use super::{PageSpec, UserStore, map_constraint};
use crate::db::DbUser;
use crate::error::ApiError;

const EMAIL_TAKEN: &str = "a user with this email already exists";

#[derive(Clone)]
pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserRepo {
    async fn create(&self, input: &UserCreate) -> Result<DbUser, ApiError> {
        let now = Utc::now();
        sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (name, email, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, EMAIL_TAKEN, EMAIL_TAKEN))
    }

    async fn get_by_id(&self, id: i64) -> Result<DbUser, ApiError> {
        sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("user"))
    }

    async fn list(&self, page: PageSpec) -> Result<Vec<DbUser>, ApiError> {
        let rows = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM users
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> Result<i64, ApiError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<DbUser, ApiError> {
        let now = Utc::now();
        sqlx::query_as::<_, DbUser>(
            r#"
            UPDATE users
            SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint(e, EMAIL_TAKEN, EMAIL_TAKEN))?
        .ok_or(ApiError::NotFound("user"))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        // Strict delete policy: removing an absent row is an error, so a
        // second delete of the same id always fails.
        if res.rows_affected() == 0 {
            return Err(ApiError::NotFound("user"));
        }
        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool, ApiError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n > 0)
    }
}
