//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod sqlite_repo;
mod seed;


pub use traits::{CatalogRepository, CompletionRepository, OrderScope, Persistence};
pub use db::init_db;
pub use sqlite_repo::SqliteRepository;
