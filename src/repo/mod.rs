//! Repository layer: the only module that issues SQL.
//!
//! Stores are object-safe async traits so services can be wired with the
//! SQLite implementations in production and with in-memory doubles in
//! tests.

mod todos;
mod users;

pub use todos::SqliteTodoRepo;
pub use users::SqliteUserRepo;

use async_trait::async_trait;
use mizar_schema::{TodoCreate, TodoPatch, UserCreate, UserPatch};

use crate::db::{DbTodo, DbUser};
use crate::error::ApiError;

/// Resolved pagination window, ordered by id.
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub limit: i64,
    pub offset: i64,
}

impl PageSpec {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    /// Applies defaults and the hard cap to raw query values.
    pub fn resolve(limit: Option<i64>, offset: Option<i64>) -> Result<Self, ApiError> {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if limit < 1 {
            return Err(ApiError::invalid_field("limit", "must be at least 1"));
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(ApiError::invalid_field("offset", "must not be negative"));
        }
        Ok(Self {
            limit: limit.min(Self::MAX_LIMIT),
            offset,
        })
    }
}

/// Filter for todo listings; `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoFilter {
    pub owner_id: Option<i64>,
    pub done: Option<bool>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, input: &UserCreate) -> Result<DbUser, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<DbUser, ApiError>;
    async fn list(&self, page: PageSpec) -> Result<Vec<DbUser>, ApiError>;
    async fn count(&self) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, patch: &UserPatch) -> Result<DbUser, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    async fn exists(&self, id: i64) -> Result<bool, ApiError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, input: &TodoCreate) -> Result<DbTodo, ApiError>;

    /// Inserts all rows in one transaction; any failure persists nothing.
    async fn create_many(&self, inputs: &[TodoCreate]) -> Result<Vec<DbTodo>, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<DbTodo, ApiError>;
    async fn list(&self, filter: TodoFilter, page: PageSpec) -> Result<Vec<DbTodo>, ApiError>;
    async fn count(&self, filter: TodoFilter) -> Result<i64, ApiError>;
    async fn update(&self, id: i64, patch: &TodoPatch) -> Result<DbTodo, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Maps constraint violations onto the domain taxonomy; everything else
/// stays a database error (surfaced as 500 and logged at the boundary).
fn map_constraint(err: sqlx::Error, on_unique: &str, on_foreign_key: &str) -> ApiError {
    if let sqlx::Error::Database(ref db) = err {
        match db.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                return ApiError::Conflict(on_unique.to_string());
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                return ApiError::Conflict(on_foreign_key.to_string());
            }
            _ => {}
        }
    }
    ApiError::Database(err)
}
