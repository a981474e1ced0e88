//! Shared fixtures for unit tests

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use roadmap_backend::{
    Category, CatalogRepository, CompletionRecord, CompletionRepository, Difficulty, DomainError,
    DomainResult, NewCategory, NewProblem, OrderScope, Problem, SqliteRepository,
};

pub const USER: &str = "user-1";
pub const OTHER_USER: &str = "user-2";

/// SQLite repository that records every call and can be told to fail
pub struct RecordingRepository {
    inner: SqliteRepository,
    failures: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
    inserted_categories: Mutex<Vec<NewCategory>>,
    inserted_problems: Mutex<Vec<NewProblem>>,
}

impl RecordingRepository {
    pub fn new(inner: SqliteRepository) -> Self {
        Self {
            inner,
            failures: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            inserted_categories: Mutex::new(Vec::new()),
            inserted_problems: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &SqliteRepository {
        &self.inner
    }

    /// Make the next call to `op` fail with an internal error
    pub fn fail_next(&self, op: &'static str) {
        self.failures.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn inserted_categories(&self) -> Vec<NewCategory> {
        self.inserted_categories.lock().unwrap().clone()
    }

    pub fn inserted_problems(&self) -> Vec<NewProblem> {
        self.inserted_problems.lock().unwrap().clone()
    }

    /// Id of the first problem of the first category
    pub async fn first_problem_id(&self) -> String {
        let categories = self.inner.list_categories().await.unwrap();
        let problems = self.inner.list_problems(Some(&categories[0].id)).await.unwrap();
        problems[0].id.clone()
    }

    fn check(&self, op: &'static str) -> DomainResult<()> {
        self.calls.lock().unwrap().push(op);
        if self.failures.lock().unwrap().remove(op) {
            return Err(DomainError::Internal(format!("{} unavailable", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for RecordingRepository {
    async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        self.check("list_categories")?;
        self.inner.list_categories().await
    }

    async fn list_problems(&self, category_id: Option<&str>) -> DomainResult<Vec<Problem>> {
        self.check("list_problems")?;
        self.inner.list_problems(category_id).await
    }

    async fn max_order_index(&self, scope: OrderScope<'_>) -> DomainResult<Option<i32>> {
        self.check("max_order_index")?;
        self.inner.max_order_index(scope).await
    }

    async fn insert_category(&self, category: &NewCategory) -> DomainResult<Category> {
        self.check("insert_category")?;
        self.inserted_categories.lock().unwrap().push(category.clone());
        self.inner.insert_category(category).await
    }

    async fn insert_problem(&self, problem: &NewProblem) -> DomainResult<Problem> {
        self.check("insert_problem")?;
        self.inserted_problems.lock().unwrap().push(problem.clone());
        self.inner.insert_problem(problem).await
    }

    async fn delete_category(&self, id: &str) -> DomainResult<()> {
        self.check("delete_category")?;
        self.inner.delete_category(id).await
    }

    async fn delete_problem(&self, id: &str) -> DomainResult<()> {
        self.check("delete_problem")?;
        self.inner.delete_problem(id).await
    }
}

#[async_trait]
impl CompletionRepository for RecordingRepository {
    async fn list_completions(&self, user_id: &str) -> DomainResult<Vec<String>> {
        self.check("list_completions")?;
        self.inner.list_completions(user_id).await
    }

    async fn insert_completion(&self, record: &CompletionRecord) -> DomainResult<()> {
        self.check("insert_completion")?;
        self.inner.insert_completion(record).await
    }

    async fn delete_completion(&self, record: &CompletionRecord) -> DomainResult<()> {
        self.check("delete_completion")?;
        self.inner.delete_completion(record).await
    }
}

/// Empty in-memory store
pub async fn empty_repository() -> Arc<RecordingRepository> {
    let inner = SqliteRepository::open_in_memory().await.unwrap();
    Arc::new(RecordingRepository::new(inner))
}

/// Two categories:
/// - "Arrays" (order 0, by `USER`): three problems at orders 0..=2, the last one seed content
/// - "Graphs" (order 1, by `OTHER_USER`): one Hard problem
pub async fn seeded_repository() -> Arc<RecordingRepository> {
    let inner = SqliteRepository::open_in_memory().await.unwrap();

    let arrays = inner
        .insert_category(&NewCategory {
            name: "Arrays".into(),
            icon: "🧮".into(),
            order_index: 0,
            created_by: USER.into(),
        })
        .await
        .unwrap();
    for (order, title) in ["Two Sum", "Valid Anagram", "Contains Duplicate"].iter().enumerate() {
        inner
            .insert_problem(&NewProblem {
                category_id: arrays.id.clone(),
                title: title.to_string(),
                difficulty: Difficulty::Easy,
                leetcode_number: None,
                order_index: order as i32,
                created_by: USER.into(),
                is_default: order == 2,
            })
            .await
            .unwrap();
    }

    let graphs = inner
        .insert_category(&NewCategory {
            name: "Graphs".into(),
            icon: "🕸".into(),
            order_index: 1,
            created_by: OTHER_USER.into(),
        })
        .await
        .unwrap();
    inner
        .insert_problem(&NewProblem {
            category_id: graphs.id.clone(),
            title: "Word Ladder".into(),
            difficulty: Difficulty::Hard,
            leetcode_number: Some(127),
            order_index: 0,
            created_by: OTHER_USER.into(),
            is_default: false,
        })
        .await
        .unwrap();

    Arc::new(RecordingRepository::new(inner))
}

pub fn problem(id: &str, category_id: &str, order_index: i32) -> Problem {
    Problem::new(id.into(), category_id.into(), format!("Problem {}", id), Difficulty::Medium, order_index)
}
