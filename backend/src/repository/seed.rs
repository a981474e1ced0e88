//! Default Catalog Seed
//!
//! System categories and problems shipped with a fresh database.
//! Seed rows have no creator and problems are flagged `is_default`.

use rusqlite::params;

use crate::domain::{Difficulty, DomainError, DomainResult};
use super::sqlite_repo::SqliteRepository;

struct SeedCategory {
    name: &'static str,
    icon: &'static str,
    problems: &'static [(&'static str, Difficulty, u32)],
}

const DEFAULT_CATALOG: &[SeedCategory] = &[
    SeedCategory {
        name: "Arrays & Hashing",
        icon: "🧮",
        problems: &[
            ("Contains Duplicate", Difficulty::Easy, 217),
            ("Valid Anagram", Difficulty::Easy, 242),
            ("Two Sum", Difficulty::Easy, 1),
            ("Group Anagrams", Difficulty::Medium, 49),
            ("Top K Frequent Elements", Difficulty::Medium, 347),
        ],
    },
    SeedCategory {
        name: "Two Pointers",
        icon: "👉",
        problems: &[
            ("Valid Palindrome", Difficulty::Easy, 125),
            ("3Sum", Difficulty::Medium, 15),
            ("Container With Most Water", Difficulty::Medium, 11),
            ("Trapping Rain Water", Difficulty::Hard, 42),
        ],
    },
    SeedCategory {
        name: "Stack",
        icon: "📚",
        problems: &[
            ("Valid Parentheses", Difficulty::Easy, 20),
            ("Min Stack", Difficulty::Medium, 155),
            ("Daily Temperatures", Difficulty::Medium, 739),
            ("Largest Rectangle in Histogram", Difficulty::Hard, 84),
        ],
    },
    SeedCategory {
        name: "Binary Search",
        icon: "🔍",
        problems: &[
            ("Binary Search", Difficulty::Easy, 704),
            ("Search a 2D Matrix", Difficulty::Medium, 74),
            ("Median of Two Sorted Arrays", Difficulty::Hard, 4),
        ],
    },
];

impl SqliteRepository {
    /// Insert the default catalog when no category exists yet.
    /// Returns the number of problems inserted.
    pub async fn seed_defaults(&self) -> DomainResult<usize> {
        let mut conn = self.conn.lock().await;

        let existing: i64 = conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if existing > 0 {
            return Ok(0);
        }

        let tx = conn.transaction().map_err(|e| DomainError::Internal(e.to_string()))?;
        let now = chrono::Utc::now().timestamp_millis();
        let mut inserted = 0;

        for (category_index, category) in DEFAULT_CATALOG.iter().enumerate() {
            let category_id = uuid::Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO categories (id, name, icon, order_index, created_by, created_at) VALUES (?, ?, ?, ?, NULL, ?)",
                params![category_id, category.name, category.icon, category_index as i32, now],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

            for (problem_index, (title, difficulty, number)) in category.problems.iter().enumerate() {
                tx.execute(
                    "INSERT INTO problems (id, category_id, title, difficulty, leetcode_number, order_index, created_by, is_default, created_at)
                     VALUES (?, ?, ?, ?, ?, ?, NULL, 1, ?)",
                    params![
                        uuid::Uuid::new_v4().to_string(),
                        category_id,
                        title,
                        difficulty.as_str(),
                        number,
                        problem_index as i32,
                        now,
                    ],
                )
                .map_err(|e| DomainError::Internal(e.to_string()))?;
                inserted += 1;
            }
        }

        tx.commit().map_err(|e| DomainError::Internal(e.to_string()))?;
        log::info!("Seeded {} default problems", inserted);
        Ok(inserted)
    }
}
