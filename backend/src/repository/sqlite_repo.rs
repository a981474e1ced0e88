//! SQLite Repository
//!
//! Local implementation of the catalog and completion repositories.
//! Each method takes the connection lock for the duration of one statement
//! batch; no lock is held across an await.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{
    Category, CompletionRecord, Difficulty, DomainError, DomainResult, NewCategory, NewProblem,
    Problem,
};
use super::db::init_db;
use super::traits::{CatalogRepository, CompletionRepository, OrderScope};

const CATEGORY_COLUMNS: &str = "id, name, icon, order_index, created_by";
const PROBLEM_COLUMNS: &str =
    "id, category_id, title, difficulty, leetcode_number, order_index, created_by, is_default";

/// SQLite implementation of the persistence collaborator
#[derive(Clone)]
pub struct SqliteRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Open the database file at `path`, running migrations
    pub async fn open(path: &Path) -> DomainResult<Self> {
        let conn = init_db(path).await.map_err(DomainError::Internal)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// Fresh private in-memory database
    pub async fn open_in_memory() -> DomainResult<Self> {
        Self::open(Path::new(":memory:")).await
    }

    async fn category_exists(&self, id: &str) -> DomainResult<bool> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1 FROM categories WHERE id = ?", params![id], |_| Ok(()))
            .optional()
            .map(|found| found.is_some())
            .map_err(|e| DomainError::Internal(e.to_string()))
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Constraint violations (duplicate order_index, missing parent) become conflicts
fn write_error(e: rusqlite::Error) -> DomainError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => DomainError::Conflict(e.to_string()),
        _ => DomainError::Internal(e.to_string()),
    }
}

pub(crate) fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        order_index: row.get(3)?,
        created_by: row.get(4)?,
    })
}

pub(crate) fn row_to_problem(row: &Row<'_>) -> rusqlite::Result<Problem> {
    let difficulty: String = row.get(3)?;
    let difficulty: Difficulty = difficulty.parse().map_err(|e: DomainError| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Problem {
        id: row.get(0)?,
        category_id: row.get(1)?,
        title: row.get(2)?,
        difficulty,
        leetcode_number: row.get(4)?,
        order_index: row.get(5)?,
        created_by: row.get(6)?,
        is_default: row.get::<_, i32>(7)? != 0,
    })
}

#[async_trait]
impl CatalogRepository for SqliteRepository {
    async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM categories ORDER BY order_index ASC, created_at ASC",
                CATEGORY_COLUMNS
            ))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let categories = stmt
            .query_map([], row_to_category)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        categories
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn list_problems(&self, category_id: Option<&str>) -> DomainResult<Vec<Problem>> {
        let conn = self.conn.lock().await;

        let problems = match category_id {
            Some(cid) => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM problems WHERE category_id = ? ORDER BY order_index ASC",
                        PROBLEM_COLUMNS
                    ))
                    .map_err(|e| DomainError::Internal(e.to_string()))?;
                let rows = stmt
                    .query_map(params![cid], row_to_problem)
                    .map_err(|e| DomainError::Internal(e.to_string()))?;
                rows.collect::<Result<Vec<_>, _>>()
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM problems ORDER BY category_id, order_index ASC",
                        PROBLEM_COLUMNS
                    ))
                    .map_err(|e| DomainError::Internal(e.to_string()))?;
                let rows = stmt
                    .query_map([], row_to_problem)
                    .map_err(|e| DomainError::Internal(e.to_string()))?;
                rows.collect::<Result<Vec<_>, _>>()
            }
        };

        problems.map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn max_order_index(&self, scope: OrderScope<'_>) -> DomainResult<Option<i32>> {
        let conn = self.conn.lock().await;

        let max = match scope {
            OrderScope::Categories => conn.query_row(
                "SELECT MAX(order_index) FROM categories",
                [],
                |row| row.get::<_, Option<i32>>(0),
            ),
            OrderScope::Problems(category_id) => conn.query_row(
                "SELECT MAX(order_index) FROM problems WHERE category_id = ?",
                params![category_id],
                |row| row.get::<_, Option<i32>>(0),
            ),
        };

        max.map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn insert_category(&self, category: &NewCategory) -> DomainResult<Category> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("Category name is required".into()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO categories (id, name, icon, order_index, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![id, name, category.icon.trim(), category.order_index, category.created_by, now_ms()],
        )
        .map_err(write_error)?;

        Ok(Category {
            id,
            name: name.to_string(),
            icon: category.icon.trim().to_string(),
            order_index: category.order_index,
            created_by: Some(category.created_by.clone()),
        })
    }

    async fn insert_problem(&self, problem: &NewProblem) -> DomainResult<Problem> {
        let title = problem.title.trim();
        if title.is_empty() {
            return Err(DomainError::InvalidInput("Problem title is required".into()));
        }
        if !self.category_exists(&problem.category_id).await? {
            return Err(DomainError::NotFound(format!("Category {} not found", problem.category_id)));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO problems (id, category_id, title, difficulty, leetcode_number, order_index, created_by, is_default, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                problem.category_id,
                title,
                problem.difficulty.as_str(),
                problem.leetcode_number,
                problem.order_index,
                problem.created_by,
                problem.is_default as i32,
                now_ms(),
            ],
        )
        .map_err(write_error)?;

        Ok(Problem {
            id,
            category_id: problem.category_id.clone(),
            title: title.to_string(),
            difficulty: problem.difficulty,
            leetcode_number: problem.leetcode_number,
            order_index: problem.order_index,
            created_by: Some(problem.created_by.clone()),
            is_default: problem.is_default,
        })
    }

    async fn delete_category(&self, id: &str) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;

        // Cascade explicitly so it holds even with foreign keys disabled
        tx.execute(
            "DELETE FROM completions WHERE problem_id IN (SELECT id FROM problems WHERE category_id = ?)",
            params![id],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
        tx.execute("DELETE FROM problems WHERE category_id = ?", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let deleted = tx
            .execute("DELETE FROM categories WHERE id = ?", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted == 0 {
            return Err(DomainError::NotFound(format!("Category {} not found", id)));
        }
        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn delete_problem(&self, id: &str) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;

        tx.execute("DELETE FROM completions WHERE problem_id = ?", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let deleted = tx
            .execute("DELETE FROM problems WHERE id = ?", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted == 0 {
            return Err(DomainError::NotFound(format!("Problem {} not found", id)));
        }
        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))
    }
}

#[async_trait]
impl CompletionRepository for SqliteRepository {
    async fn list_completions(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare("SELECT problem_id FROM completions WHERE user_id = ? ORDER BY created_at")
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        ids.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn insert_completion(&self, record: &CompletionRecord) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO completions (user_id, problem_id, created_at) VALUES (?, ?, ?)",
            params![record.user_id, record.problem_id, now_ms()],
        )
        .map_err(write_error)?;
        Ok(())
    }

    async fn delete_completion(&self, record: &CompletionRecord) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM completions WHERE user_id = ? AND problem_id = ?",
            params![record.user_id, record.problem_id],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(())
    }
}
