//! Roadmap
//!
//! Client-side state engine for a problem roadmap:
//! - store: ordered catalog of categories and problems
//! - completion: per-user completed problem ids
//! - sync: the only write path to the remote store, with optimistic
//!   completion updates and reload-after-create
//! - context: session state (identity, mode, selection) for the views
//! - remote: hosted PostgREST store

pub mod completion;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod identity;
pub mod ordering;
pub mod progress;
pub mod remote;
pub mod store;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use completion::CompletionTracker;
pub use config::{init_logging, open_backend, RoadmapConfig};
pub use context::{Mode, RoadmapSession, SelectedProblem};
pub use error::{RoadmapError, RoadmapResult};
pub use events::{ChangeNotifier, StoreEvent};
pub use identity::{Identity, SessionIdentity};
pub use ordering::{next_order, reconcile_order, Ordered};
pub use progress::{CategoryProgress, ProgressSummary};
pub use remote::RestRepository;
pub use store::{CatalogSnapshot, CatalogStore};
pub use sync::{parse_leetcode_number, SyncCoordinator};

pub use roadmap_backend::{
    Category, CategoryWithProblems, CompletionRecord, Difficulty, Problem, UserId,
};
