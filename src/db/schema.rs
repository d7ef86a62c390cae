//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `users` table (one account per row, unique email)
/// - `todos` table (one task per row, owned by a user)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Users
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    UNIQUE(email)
);

-- ---------------------------------------------------------------------------
-- Todos (each row belongs to exactly one user)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_todos_owner ON todos(owner_id);

CREATE INDEX IF NOT EXISTS idx_todos_done ON todos(done);
"#;
