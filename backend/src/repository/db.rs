//! Database Connection and Setup
//!
//! Opens the SQLite database and runs migrations.

use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the database at `db_path` and bring the schema up to date.
/// `:memory:` opens a private in-memory database.
pub async fn init_db(db_path: &Path) -> Result<Connection, String> {
    let db_path_str = db_path.to_str().ok_or("Invalid DB path")?;

    let conn = if db_path_str == ":memory:" {
        Connection::open_in_memory()
    } else {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create db dir: {}", e))?;
            }
        }
        Connection::open(db_path)
    }
    .map_err(|e| format!("Failed to open db: {}", e))?;

    conn.pragma_update(None, "foreign_keys", true)
        .map_err(|e| format!("Failed to enable foreign keys: {}", e))?;

    run_migrations(&conn)?;
    log::debug!("Database ready at {}", db_path_str);

    Ok(conn)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(mut rows) = stmt.query([]) else {
        return false;
    };
    while let Ok(Some(row)) = rows.next() {
        if let Ok(name) = row.get::<_, String>(1) {
            if name == column {
                return true;
            }
        }
    }
    false
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK(length(trim(name)) > 0),
            icon TEXT NOT NULL DEFAULT '',
            order_index INTEGER NOT NULL,
            created_by TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS problems (
            id TEXT PRIMARY KEY,
            category_id TEXT NOT NULL,
            title TEXT NOT NULL CHECK(length(trim(title)) > 0),
            difficulty TEXT NOT NULL CHECK(difficulty IN ('Easy', 'Medium', 'Hard')),
            order_index INTEGER NOT NULL,
            created_by TEXT,
            is_default INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS completions (
            user_id TEXT NOT NULL,
            problem_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (user_id, problem_id),
            FOREIGN KEY (problem_id) REFERENCES problems(id) ON DELETE CASCADE
        );",
    )
    .map_err(|e| format!("Failed to create tables: {}", e))?;

    // Early databases stored problems without a LeetCode number
    if !column_exists(conn, "problems", "leetcode_number") {
        conn.execute("ALTER TABLE problems ADD COLUMN leetcode_number INTEGER", [])
            .map_err(|e| format!("Failed to add leetcode_number: {}", e))?;
    }

    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_order ON categories(order_index);
         CREATE UNIQUE INDEX IF NOT EXISTS idx_problems_order ON problems(category_id, order_index);
         CREATE INDEX IF NOT EXISTS idx_completions_user ON completions(user_id);",
    )
    .map_err(|e| format!("Failed to create indexes: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let conn = init_db(Path::new(":memory:")).await.expect("init");
        run_migrations(&conn).expect("second run");
        assert!(column_exists(&conn, "problems", "leetcode_number"));
        assert!(!column_exists(&conn, "problems", "memo"));
    }

    #[tokio::test]
    async fn test_file_database_created_with_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("roadmap-db-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("roadmap.db");
        init_db(&path).await.expect("init");
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
