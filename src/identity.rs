//! Identity collaborator: who is signed in, if anyone.

use std::sync::{PoisonError, RwLock};

use roadmap_backend::UserId;

pub trait Identity: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

/// In-process identity, set by the sign-in flow
#[derive(Debug, Default)]
pub struct SessionIdentity {
    user: RwLock<Option<UserId>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self {
            user: RwLock::new(Some(user_id.into())),
        }
    }

    pub fn sign_in(&self, user_id: impl Into<UserId>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id.into());
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Identity for SessionIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
