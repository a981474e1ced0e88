//! Category Entity
//!
//! Top level of the roadmap catalog. Categories hold an ordered list of problems.

use serde::{Deserialize, Serialize};
use super::entity::{Entity, UserId};

/// A roadmap category (e.g. "Two Pointers")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Store-assigned identifier
    pub id: String,
    /// Display name, never empty
    pub name: String,
    /// Short icon string (usually an emoji), may be empty
    #[serde(default)]
    pub icon: String,
    /// Position among all categories
    pub order_index: i32,
    /// Creator, `None` for system default categories
    pub created_by: Option<UserId>,
}

impl Category {
    pub fn new(id: String, name: String, order_index: i32) -> Self {
        Self {
            id,
            name,
            icon: String::new(),
            order_index,
            created_by: None,
        }
    }

    /// System default categories are only ever read by clients
    pub fn is_default(&self) -> bool {
        self.created_by.is_none()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.created_by.as_deref() == Some(user_id)
    }
}

impl Entity for Category {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

/// Insert payload for a user-authored category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub order_index: i32,
    pub created_by: UserId,
}
