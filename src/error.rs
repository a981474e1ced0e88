//! Client Errors
//!
//! Typed failures returned by every mutating roadmap operation.

use roadmap_backend::DomainError;

pub type RoadmapResult<T> = Result<T, RoadmapError>;

/// Failure taxonomy surfaced to the rendering layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadmapError {
    /// Bad or missing input, caught before any remote call
    Validation(String),
    /// Mutation attempted without a signed-in user
    AuthRequired,
    /// Actor does not own the target, or the target is protected seed content
    Authorization(String),
    /// The remote store rejected the call or could not be reached
    Sync(String),
}

impl RoadmapError {
    pub fn validation(msg: impl Into<String>) -> Self {
        RoadmapError::Validation(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        RoadmapError::Authorization(msg.into())
    }

    /// True for failures that never reached the remote store
    pub fn is_local(&self) -> bool {
        !matches!(self, RoadmapError::Sync(_))
    }
}

impl std::fmt::Display for RoadmapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadmapError::Validation(msg) => write!(f, "{}", msg),
            RoadmapError::AuthRequired => write!(f, "You must be signed in to do that"),
            RoadmapError::Authorization(msg) => write!(f, "Not allowed: {}", msg),
            RoadmapError::Sync(msg) => write!(f, "Sync failed: {}", msg),
        }
    }
}

impl std::error::Error for RoadmapError {}

impl From<DomainError> for RoadmapError {
    fn from(e: DomainError) -> Self {
        RoadmapError::Sync(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_become_sync_failures() {
        let err: RoadmapError = DomainError::Conflict("duplicate order_index".into()).into();
        assert_eq!(err, RoadmapError::Sync("Conflict: duplicate order_index".into()));
        assert!(!err.is_local());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(RoadmapError::validation("Category name is required").to_string(), "Category name is required");
        assert!(RoadmapError::AuthRequired.is_local());
    }
}
