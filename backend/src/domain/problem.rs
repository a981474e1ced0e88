//! Problem Entity
//!
//! A single practice problem, always owned by exactly one category.

use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, Entity, UserId};

/// Problem difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim() {
            "Easy" | "easy" => Ok(Difficulty::Easy),
            "Medium" | "medium" => Ok(Difficulty::Medium),
            "Hard" | "hard" => Ok(Difficulty::Hard),
            other => Err(DomainError::InvalidInput(format!("Unknown difficulty '{}'", other))),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A practice problem inside a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Store-assigned identifier
    pub id: String,
    /// Owning category
    pub category_id: String,
    /// Display title, never empty
    pub title: String,
    pub difficulty: Difficulty,
    /// LeetCode problem number, if the problem mirrors one
    pub leetcode_number: Option<u32>,
    /// Position within the owning category
    pub order_index: i32,
    /// Creator, `None` for seed content
    pub created_by: Option<UserId>,
    /// Seed content is never deletable
    #[serde(default)]
    pub is_default: bool,
}

impl Problem {
    pub fn new(id: String, category_id: String, title: String, difficulty: Difficulty, order_index: i32) -> Self {
        Self {
            id,
            category_id,
            title,
            difficulty,
            leetcode_number: None,
            order_index,
            created_by: None,
            is_default: false,
        }
    }

    /// True when `user_id` authored this problem and it is not seed content
    pub fn is_deletable_by(&self, user_id: &str) -> bool {
        !self.is_default && self.created_by.as_deref() == Some(user_id)
    }
}

impl Entity for Problem {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

/// Insert payload for a user-authored problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProblem {
    pub category_id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub leetcode_number: Option<u32>,
    pub order_index: i32,
    pub created_by: UserId,
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("Extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Easy.to_string(), "Easy");
    }

    #[test]
    fn test_difficulty_serialization() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"Hard\"");
    }

    #[test]
    fn test_default_problem_never_deletable() {
        let mut problem = Problem::new("p1".into(), "c1".into(), "Two Sum".into(), Difficulty::Easy, 0);
        problem.created_by = Some("user-1".to_string());
        assert!(problem.is_deletable_by("user-1"));
        assert!(!problem.is_deletable_by("user-2"));

        problem.is_default = true;
        assert!(!problem.is_deletable_by("user-1"));
    }
}
