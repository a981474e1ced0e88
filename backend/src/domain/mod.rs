//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO storage dependencies (serde for serialization, log for diagnostics).

mod entity;
mod category;
mod problem;
mod completion;
mod catalog;

pub use entity::{Entity, DomainError, DomainResult, UserId};
pub use category::{Category, NewCategory};
pub use problem::{Difficulty, NewProblem, Problem};
pub use completion::CompletionRecord;
pub use catalog::{assemble_catalog, total_problems, CategoryWithProblems};
