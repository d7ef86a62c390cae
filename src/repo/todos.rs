use async_trait::async_trait;
use chrono::Utc;
use mizar_schema::{TodoCreate, TodoPatch};
use sqlx::SqlitePool;

use super::{PageSpec, TodoFilter, TodoStore, map_constraint};
use crate::db::DbTodo;
use crate::error::ApiError;

const OWNER_MISSING: &str = "todo owner does not exist";

#[derive(Clone)]
pub struct SqliteTodoRepo {
    pool: SqlitePool,
}

impl SqliteTodoRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for SqliteTodoRepo {
    async fn create(&self, input: &TodoCreate) -> Result<DbTodo, ApiError> {
        let now = Utc::now();
        sqlx::query_as::<_, DbTodo>(
            r#"
            INSERT INTO todos (owner_id, title, done, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, owner_id, title, done, created_at, updated_at
            "#,
        )
        .bind(input.owner_id)
        .bind(&input.title)
        .bind(input.done)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, OWNER_MISSING, OWNER_MISSING))
    }

    async fn create_many(&self, inputs: &[TodoCreate]) -> Result<Vec<DbTodo>, ApiError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(inputs.len());

        // One transaction for the whole batch; an early return here rolls
        // back every insert above it when `tx` drops.
        for input in inputs {
            let todo = sqlx::query_as::<_, DbTodo>(
                r#"
                INSERT INTO todos (owner_id, title, done, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)
                RETURNING id, owner_id, title, done, created_at, updated_at
                "#,
            )
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(input.done)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_constraint(e, OWNER_MISSING, OWNER_MISSING))?;
            created.push(todo);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<DbTodo, ApiError> {
        sqlx::query_as::<_, DbTodo>(
            r#"
            SELECT id, owner_id, title, done, created_at, updated_at
            FROM todos
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ApiError::NotFound("todo"))
    }

    async fn list(&self, filter: TodoFilter, page: PageSpec) -> Result<Vec<DbTodo>, ApiError> {
        let rows = sqlx::query_as::<_, DbTodo>(
            r#"
            SELECT id, owner_id, title, done, created_at, updated_at
            FROM todos
            WHERE (?1 IS NULL OR owner_id = ?1)
              AND (?2 IS NULL OR done = ?2)
            ORDER BY id
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(filter.owner_id)
        .bind(filter.done)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self, filter: TodoFilter) -> Result<i64, ApiError> {
        let n: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM todos
            WHERE (?1 IS NULL OR owner_id = ?1)
              AND (?2 IS NULL OR done = ?2)
            "#,
        )
        .bind(filter.owner_id)
        .bind(filter.done)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<DbTodo, ApiError> {
        let now = Utc::now();
        sqlx::query_as::<_, DbTodo>(
            r#"
            UPDATE todos
            SET
                title = COALESCE(?, title),
                done = COALESCE(?, done),
                updated_at = ?
            WHERE id = ?
            RETURNING id, owner_id, title, done, created_at, updated_at
            "#,
        )
        .bind(&patch.title)
        .bind(patch.done)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint(e, OWNER_MISSING, OWNER_MISSING))?
        .ok_or(ApiError::NotFound("todo"))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let res = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(ApiError::NotFound("todo"));
        }
        Ok(())
    }
}
