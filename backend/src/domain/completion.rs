//! Completion Record
//!
//! Existence-only marker that a user solved a problem.

use serde::{Deserialize, Serialize};
use super::entity::UserId;

/// A (user, problem) pair; existence means completed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub user_id: UserId,
    pub problem_id: String,
}

impl CompletionRecord {
    pub fn new(user_id: impl Into<UserId>, problem_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            problem_id: problem_id.into(),
        }
    }
}
