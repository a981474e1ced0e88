//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces of the persistence collaborator.
//! Implementations can use SQLite, a hosted REST store, etc.

use async_trait::async_trait;
use crate::domain::{Category, CompletionRecord, DomainResult, NewCategory, NewProblem, Problem};

/// Sibling scope for `order_index` queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope<'a> {
    /// All categories
    Categories,
    /// Problems of one category
    Problems(&'a str),
}

/// Catalog structure: categories and their problems
///
/// All operations are async to support various backends.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// List all categories ordered by `order_index`
    async fn list_categories(&self) -> DomainResult<Vec<Category>>;

    /// List problems ordered by `order_index`, optionally limited to one category
    async fn list_problems(&self, category_id: Option<&str>) -> DomainResult<Vec<Problem>>;

    /// Highest `order_index` in the scope, `None` when the scope is empty.
    /// A hint only: a concurrent writer may take the next value first.
    async fn max_order_index(&self, scope: OrderScope<'_>) -> DomainResult<Option<i32>>;

    /// Insert a category; the store assigns the id
    async fn insert_category(&self, category: &NewCategory) -> DomainResult<Category>;

    /// Insert a problem; the store assigns the id
    async fn insert_problem(&self, problem: &NewProblem) -> DomainResult<Problem>;

    /// Delete a category together with its problems and their completion records
    async fn delete_category(&self, id: &str) -> DomainResult<()>;

    /// Delete a single problem
    async fn delete_problem(&self, id: &str) -> DomainResult<()>;
}

/// Per-user completion records
#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Problem ids completed by the user
    async fn list_completions(&self, user_id: &str) -> DomainResult<Vec<String>>;

    /// Record a completion; recording an existing one is not an error
    async fn insert_completion(&self, record: &CompletionRecord) -> DomainResult<()>;

    /// Remove a completion; removing a missing one is not an error
    async fn delete_completion(&self, record: &CompletionRecord) -> DomainResult<()>;
}

/// Everything the sync layer needs from a store
pub trait Persistence: CatalogRepository + CompletionRepository {}

impl<T: CatalogRepository + CompletionRepository> Persistence for T {}
