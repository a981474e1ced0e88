//! Application Context
//!
//! Per-client session state shared by every view: the sync coordinator, who
//! is signed in, the current mode and the selected problem.

use std::sync::{Arc, PoisonError, RwLock};

use roadmap_backend::{Category, Difficulty, Problem, UserId};

use crate::error::RoadmapResult;
use crate::identity::{Identity, SessionIdentity};
use crate::sync::SyncCoordinator;

/// Which main view is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Roadmap,
    Interview,
}

/// Problem opened in the detail panel, with its category for the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedProblem {
    pub problem: Problem,
    pub category_id: String,
    pub category_name: String,
}

#[derive(Default)]
struct ViewState {
    mode: Mode,
    selected: Option<SelectedProblem>,
}

pub struct RoadmapSession<I = SessionIdentity> {
    sync: Arc<SyncCoordinator>,
    identity: Arc<I>,
    view: RwLock<ViewState>,
}

impl<I: Identity> RoadmapSession<I> {
    pub fn new(sync: Arc<SyncCoordinator>, identity: Arc<I>) -> Self {
        Self {
            sync,
            identity,
            view: RwLock::new(ViewState::default()),
        }
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.identity.current_user()
    }

    pub fn mode(&self) -> Mode {
        self.view.read().unwrap_or_else(PoisonError::into_inner).mode
    }

    /// Interview mode has no detail panel, so the selection is dropped
    pub fn set_mode(&self, mode: Mode) {
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        view.mode = mode;
        if mode == Mode::Interview {
            view.selected = None;
        }
    }

    pub fn selected(&self) -> Option<SelectedProblem> {
        self.view.read().unwrap_or_else(PoisonError::into_inner).selected.clone()
    }

    /// Select a problem from the catalog. Returns false if it is not there.
    pub fn select_problem(&self, problem_id: &str) -> bool {
        let catalog = self.sync.catalog().categories();
        let found = catalog.iter().find_map(|entry| {
            entry.problems.iter().find(|p| p.id == problem_id).map(|p| SelectedProblem {
                problem: p.clone(),
                category_id: entry.category.id.clone(),
                category_name: entry.category.name.clone(),
            })
        });

        let selected = found.is_some();
        self.view.write().unwrap_or_else(PoisonError::into_inner).selected = found;
        selected
    }

    pub fn clear_selection(&self) {
        self.view.write().unwrap_or_else(PoisonError::into_inner).selected = None;
    }

    /// Re-sync catalog and completions for whoever is signed in now
    pub async fn reload(&self) -> RoadmapResult<()> {
        let user = self.current_user();
        self.sync.refresh_all(user.as_deref()).await
    }

    pub async fn create_category(&self, name: &str, icon: &str) -> RoadmapResult<Category> {
        let user = self.current_user();
        self.sync.create_category(name, icon, user.as_deref()).await
    }

    pub async fn create_problem(
        &self,
        title: &str,
        category_id: &str,
        difficulty: Difficulty,
        leetcode_number: Option<u32>,
    ) -> RoadmapResult<Problem> {
        let user = self.current_user();
        self.sync
            .create_problem(title, category_id, difficulty, leetcode_number, user.as_deref())
            .await
    }

    pub async fn delete_category(&self, category_id: &str) -> RoadmapResult<()> {
        let user = self.current_user();
        self.sync.delete_category(category_id, user.as_deref()).await?;

        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        if view.selected.as_ref().is_some_and(|s| s.category_id == category_id) {
            view.selected = None;
        }
        Ok(())
    }

    pub async fn delete_problem(&self, problem_id: &str) -> RoadmapResult<()> {
        let user = self.current_user();
        self.sync.delete_problem(problem_id, user.as_deref()).await?;

        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        if view.selected.as_ref().is_some_and(|s| s.problem.id == problem_id) {
            view.selected = None;
        }
        Ok(())
    }

    pub async fn toggle_completion(&self, problem_id: &str) -> RoadmapResult<bool> {
        let user = self.current_user();
        self.sync.toggle_completion(problem_id, user.as_deref()).await
    }

    pub fn is_completed(&self, problem_id: &str) -> bool {
        self.sync.is_completed(problem_id)
    }
}

impl RoadmapSession<SessionIdentity> {
    /// The identity only switches once the user's data has loaded
    pub async fn sign_in(&self, user_id: impl Into<UserId>) -> RoadmapResult<()> {
        let user_id = user_id.into();
        self.sync.refresh_all(Some(&user_id)).await?;
        log::info!("Signed in as {}", user_id);
        self.identity.sign_in(user_id);
        Ok(())
    }

    pub async fn sign_out(&self) -> RoadmapResult<()> {
        log::info!("Signed out");
        self.identity.sign_out();
        self.clear_selection();
        self.reload().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoadmapError;
    use roadmap_backend::CompletionRepository;
    use crate::test_support::{seeded_repository, RecordingRepository, OTHER_USER, USER};

    async fn session_with_repo() -> (RoadmapSession, Arc<RecordingRepository>) {
        let repo = seeded_repository().await;
        let session = RoadmapSession::new(
            Arc::new(SyncCoordinator::new(repo.clone())),
            Arc::new(SessionIdentity::new()),
        );
        session.reload().await.unwrap();
        (session, repo)
    }

    async fn session() -> RoadmapSession {
        session_with_repo().await.0
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_previous_user() {
        let (session, repo) = session_with_repo().await;
        let id = session.sync().catalog().categories()[0].problems[0].id.clone();
        session.sign_in(USER).await.unwrap();
        session.toggle_completion(&id).await.unwrap();

        repo.fail_next("list_completions");
        assert!(session.sign_in(OTHER_USER).await.is_err());

        assert_eq!(session.current_user().as_deref(), Some(USER));
        assert!(session.toggle_completion(&id).await.is_ok());
        assert!(!session.is_completed(&id));
        assert!(repo.inner().list_completions(USER).await.unwrap().is_empty());
        assert!(repo.inner().list_completions(OTHER_USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_mutations_are_rejected() {
        let session = session().await;
        let id = session.sync().catalog().categories()[0].problems[0].id.clone();

        assert_eq!(session.toggle_completion(&id).await.unwrap_err(), RoadmapError::AuthRequired);
        assert!(matches!(
            session.create_category("Heap", "").await.unwrap_err(),
            RoadmapError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_loads_completions_and_sign_out_clears_them() {
        let session = session().await;
        let id = session.sync().catalog().categories()[0].problems[0].id.clone();

        session.sign_in(USER).await.unwrap();
        assert!(session.toggle_completion(&id).await.unwrap());
        assert!(session.is_completed(&id));

        session.sign_out().await.unwrap();
        assert!(!session.is_completed(&id));
        assert_eq!(session.current_user(), None);

        session.sign_in(USER).await.unwrap();
        assert!(session.is_completed(&id));
    }

    #[tokio::test]
    async fn test_interview_mode_clears_selection() {
        let session = session().await;
        let entry = session.sync().catalog().categories()[1].clone();

        assert!(session.select_problem(&entry.problems[0].id));
        let selected = session.selected().unwrap();
        assert_eq!(selected.category_name, "Graphs");
        assert_eq!(selected.category_id, entry.category.id);

        session.set_mode(Mode::Roadmap);
        assert!(session.selected().is_some());

        session.set_mode(Mode::Interview);
        assert_eq!(session.mode(), Mode::Interview);
        assert_eq!(session.selected(), None);
        assert!(!session.select_problem("missing"));
    }

    #[tokio::test]
    async fn test_deleting_selected_problem_clears_selection() {
        let session = session().await;
        session.sign_in(USER).await.unwrap();
        let entry = session.sync().catalog().categories()[0].clone();

        session.select_problem(&entry.problems[1].id);
        session.delete_problem(&entry.problems[0].id).await.unwrap();
        assert!(session.selected().is_some());

        session.delete_category(&entry.category.id).await.unwrap();
        assert_eq!(session.selected(), None);
    }
}
