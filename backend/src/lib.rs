//! Roadmap Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Persistence collaborator traits and the SQLite implementation

pub mod domain;
pub mod repository;

pub use domain::{
    assemble_catalog, total_problems, Category, CategoryWithProblems, CompletionRecord, Difficulty,
    DomainError, DomainResult, Entity, NewCategory, NewProblem, Problem, UserId,
};
pub use repository::{
    init_db, CatalogRepository, CompletionRepository, OrderScope, Persistence, SqliteRepository,
};
