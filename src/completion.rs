//! Completion Tracker
//!
//! Set of problem ids the current user has completed. Independent of the
//! catalog tree: completion is looked up by id and never stored on `Problem`.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roadmap_backend::Persistence;

use crate::error::RoadmapResult;
use crate::events::{ChangeNotifier, StoreEvent};

#[derive(Default)]
struct CompletionState {
    user_id: Option<String>,
    completed: HashSet<String>,
}

pub struct CompletionTracker {
    remote: Arc<dyn Persistence>,
    state: RwLock<CompletionState>,
    notifier: ChangeNotifier,
}

impl CompletionTracker {
    pub fn new(remote: Arc<dyn Persistence>, notifier: ChangeNotifier) -> Self {
        Self {
            remote,
            state: RwLock::new(CompletionState::default()),
            notifier,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CompletionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CompletionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole set with the user's records.
    /// On failure the previous set is kept.
    pub async fn load(&self, user_id: &str) -> RoadmapResult<()> {
        let ids = self.remote.list_completions(user_id).await?;
        log::info!("Loaded {} completions for {}", ids.len(), user_id);

        *self.write() = CompletionState {
            user_id: Some(user_id.to_string()),
            completed: ids.into_iter().collect(),
        };
        self.notifier.notify(StoreEvent::CompletionsReloaded);
        Ok(())
    }

    /// Forget everything, e.g. after sign-out
    pub fn clear(&self) {
        *self.write() = CompletionState::default();
        self.notifier.notify(StoreEvent::CompletionsCleared);
    }

    /// User whose records are currently loaded
    pub fn loaded_user(&self) -> Option<String> {
        self.read().user_id.clone()
    }

    pub fn is_completed(&self, problem_id: &str) -> bool {
        self.read().completed.contains(problem_id)
    }

    /// Returns true if the set changed
    pub fn mark_complete(&self, problem_id: &str) -> bool {
        let changed = self.write().completed.insert(problem_id.to_string());
        if changed {
            self.notifier.notify(StoreEvent::CompletionChanged {
                problem_id: problem_id.to_string(),
                completed: true,
            });
        }
        changed
    }

    /// Returns true if the set changed
    pub fn mark_incomplete(&self, problem_id: &str) -> bool {
        let changed = self.write().completed.remove(problem_id);
        if changed {
            self.notifier.notify(StoreEvent::CompletionChanged {
                problem_id: problem_id.to_string(),
                completed: false,
            });
        }
        changed
    }

    /// Drop ids of problems that no longer exist
    pub fn forget<'a>(&self, problem_ids: impl IntoIterator<Item = &'a str>) {
        let removed: Vec<&str> = {
            let mut state = self.write();
            problem_ids.into_iter().filter(|id| state.completed.remove(*id)).collect()
        };
        for id in removed {
            self.notifier.notify(StoreEvent::CompletionChanged {
                problem_id: id.to_string(),
                completed: false,
            });
        }
    }

    pub fn count(&self) -> usize {
        self.read().completed.len()
    }

    /// How many of `problem_ids` are completed
    pub fn count_among<'a>(&self, problem_ids: impl IntoIterator<Item = &'a str>) -> usize {
        let state = self.read();
        problem_ids.into_iter().filter(|id| state.completed.contains(*id)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seeded_repository, USER};
    use roadmap_backend::{CompletionRecord, CompletionRepository};

    #[tokio::test]
    async fn test_unloaded_tracker_reports_nothing() {
        let repo = seeded_repository().await;
        let tracker = CompletionTracker::new(repo, ChangeNotifier::new());

        assert!(!tracker.is_completed("anything"));
        assert_eq!(tracker.count(), 0);
        assert_eq!(tracker.loaded_user(), None);
    }

    #[tokio::test]
    async fn test_load_replaces_set() {
        let repo = seeded_repository().await;
        let problem_id = repo.first_problem_id().await;
        repo.inner().insert_completion(&CompletionRecord::new(USER, problem_id.clone())).await.unwrap();
        let tracker = CompletionTracker::new(repo, ChangeNotifier::new());
        tracker.mark_complete("stale");

        tracker.load(USER).await.unwrap();

        assert!(tracker.is_completed(&problem_id));
        assert!(!tracker.is_completed("stale"));
        assert_eq!(tracker.count(), 1);
        assert_eq!(tracker.loaded_user().as_deref(), Some(USER));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_set() {
        let repo = seeded_repository().await;
        let tracker = CompletionTracker::new(repo.clone(), ChangeNotifier::new());
        tracker.mark_complete("p1");

        repo.fail_next("list_completions");
        assert!(tracker.load(USER).await.is_err());
        assert!(tracker.is_completed("p1"));
    }

    #[tokio::test]
    async fn test_marking_is_idempotent() {
        let repo = seeded_repository().await;
        let tracker = CompletionTracker::new(repo, ChangeNotifier::new());

        assert!(tracker.mark_complete("p1"));
        assert!(!tracker.mark_complete("p1"));
        assert_eq!(tracker.count(), 1);

        assert!(tracker.mark_incomplete("p1"));
        assert!(!tracker.mark_incomplete("p1"));
        assert_eq!(tracker.count(), 0);
    }

    #[tokio::test]
    async fn test_count_among_and_forget() {
        let repo = seeded_repository().await;
        let tracker = CompletionTracker::new(repo, ChangeNotifier::new());
        for id in ["a", "b", "c"] {
            tracker.mark_complete(id);
        }

        assert_eq!(tracker.count_among(["a", "c", "z"]), 2);
        tracker.forget(["a", "b"]);
        assert_eq!(tracker.count(), 1);

        tracker.clear();
        assert_eq!(tracker.count(), 0);
    }

    #[tokio::test]
    async fn test_forget_notifies_removed_ids_only() {
        let repo = seeded_repository().await;
        let notifier = ChangeNotifier::new();
        let tracker = CompletionTracker::new(repo, notifier.clone());
        tracker.mark_complete("a");
        let mut rx = notifier.subscribe();

        tracker.forget(["a", "never-completed"]);
        tracker.mark_complete("b");

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::CompletionChanged { problem_id: "a".into(), completed: false }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::CompletionChanged { problem_id: "b".into(), completed: true }
        );
    }
}
