use chrono::{DateTime, Utc};
use mizar_schema::{TodoOut, UserOut};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbTodo {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Rows never cross the router boundary directly; they are mapped into the
// wire shapes below first.

impl From<DbUser> for UserOut {
    fn from(row: DbUser) -> Self {
        UserOut {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DbTodo> for TodoOut {
    fn from(row: DbTodo) -> Self {
        TodoOut {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            done: row.done,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
