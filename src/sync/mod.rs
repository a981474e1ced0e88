//! Sync Coordinator
//!
//! Every mutating roadmap action goes through here. Local validation and
//! authorization run first and never touch the remote store. Structural
//! creations are confirmed by a full catalog reload; deletions and
//! completion flips are applied as local patches, and a completion flip is
//! rolled back when the remote write fails.
//!
//! Calls are expected one at a time from UI handlers. Two creations issued
//! without awaiting the first can still allocate the same `order_index`;
//! the reload converges on whatever order the store serialized.

use std::sync::Arc;

use roadmap_backend::{
    Category, CompletionRecord, Difficulty, NewCategory, NewProblem, OrderScope, Persistence,
    Problem,
};

use crate::completion::CompletionTracker;
use crate::error::{RoadmapError, RoadmapResult};
use crate::events::ChangeNotifier;
use crate::ordering::{next_order, reconcile_order};
use crate::progress::ProgressSummary;
use crate::store::CatalogStore;


/// Parse the optional LeetCode number typed into a form.
/// Blank means none; anything else must be a positive integer.
pub fn parse_leetcode_number(input: &str) -> RoadmapResult<Option<u32>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(RoadmapError::validation("LeetCode number must be a positive integer")),
    }
}

pub struct SyncCoordinator {
    remote: Arc<dyn Persistence>,
    catalog: CatalogStore,
    completions: CompletionTracker,
    notifier: ChangeNotifier,
}

impl SyncCoordinator {
    pub fn new(remote: Arc<dyn Persistence>) -> Self {
        let notifier = ChangeNotifier::new();
        Self {
            catalog: CatalogStore::new(Arc::clone(&remote), notifier.clone()),
            completions: CompletionTracker::new(Arc::clone(&remote), notifier.clone()),
            remote,
            notifier,
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn completions(&self) -> &CompletionTracker {
        &self.completions
    }

    /// Change feed shared by the catalog and the completion tracker
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn is_completed(&self, problem_id: &str) -> bool {
        self.completions.is_completed(problem_id)
    }

    pub fn completed_count(&self) -> usize {
        self.completions.count()
    }

    pub fn progress(&self) -> ProgressSummary {
        ProgressSummary::compute(&self.catalog.categories(), &self.completions)
    }

    /// Reload the catalog and, for a signed-in user, their completions.
    /// Signed out, the completion set is cleared.
    pub async fn refresh_all(&self, user_id: Option<&str>) -> RoadmapResult<()> {
        self.catalog.load().await?;
        match user_id {
            Some(user_id) => self.completions.load(user_id).await?,
            None => self.completions.clear(),
        }
        Ok(())
    }

    /// Local allocation raised to the store's current maximum when it can be read
    async fn allocate_order(&self, local_next: i32, scope: OrderScope<'_>) -> RoadmapResult<i32> {
        match self.remote.max_order_index(scope).await {
            Ok(remote_max) => reconcile_order(local_next, remote_max),
            Err(e) => {
                log::warn!("order_index hint unavailable, using local value {}: {}", local_next, e);
                Ok(local_next)
            }
        }
    }

    pub async fn create_category(
        &self,
        name: &str,
        icon: &str,
        user_id: Option<&str>,
    ) -> RoadmapResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoadmapError::validation("Category name is required"));
        }
        let user_id = user_id
            .ok_or_else(|| RoadmapError::validation("You must be logged in to create categories"))?;

        let local_next = next_order(self.catalog.categories().as_slice())?;
        let order_index = self.allocate_order(local_next, OrderScope::Categories).await?;

        let new_category = NewCategory {
            name: name.to_string(),
            icon: icon.trim().to_string(),
            order_index,
            created_by: user_id.to_string(),
        };
        let created = self.remote.insert_category(&new_category).await.map_err(|e| {
            log::warn!("Creating category '{}' failed: {}", name, e);
            RoadmapError::from(e)
        })?;
        log::info!("Created category {} at order_index {}", created.id, created.order_index);

        if let Err(e) = self.catalog.load().await {
            log::warn!("Reload after creating category {} failed, applying locally: {}", created.id, e);
            self.catalog.insert_category(created.clone());
        }
        Ok(created)
    }

    pub async fn create_problem(
        &self,
        title: &str,
        category_id: &str,
        difficulty: Difficulty,
        leetcode_number: Option<u32>,
        user_id: Option<&str>,
    ) -> RoadmapResult<Problem> {
        let title = title.trim();
        if title.is_empty() {
            return Err(RoadmapError::validation("Problem title is required"));
        }
        if category_id.trim().is_empty() {
            return Err(RoadmapError::validation("Please select a category"));
        }
        let category = self
            .catalog
            .find_category(category_id)
            .ok_or_else(|| RoadmapError::validation(format!("Category {} does not exist", category_id)))?;
        let user_id = user_id
            .ok_or_else(|| RoadmapError::validation("You must be logged in to create problems"))?;
        if leetcode_number == Some(0) {
            return Err(RoadmapError::validation("LeetCode number must be a positive integer"));
        }

        let local_next = next_order(&category.problems)?;
        let order_index = self.allocate_order(local_next, OrderScope::Problems(category_id)).await?;

        let new_problem = NewProblem {
            category_id: category_id.to_string(),
            title: title.to_string(),
            difficulty,
            leetcode_number,
            order_index,
            created_by: user_id.to_string(),
            is_default: false,
        };
        let created = self.remote.insert_problem(&new_problem).await.map_err(|e| {
            log::warn!("Creating problem '{}' failed: {}", title, e);
            RoadmapError::from(e)
        })?;
        log::info!(
            "Created problem {} in category {} at order_index {}",
            created.id,
            category_id,
            created.order_index
        );

        if let Err(e) = self.catalog.load().await {
            log::warn!("Reload after creating problem {} failed, applying locally: {}", created.id, e);
            if let Err(e) = self.catalog.insert_problem(created.clone()) {
                log::warn!("Could not apply problem {} locally: {}", created.id, e);
            }
        }
        Ok(created)
    }

    /// Delete a user-authored category and every problem in it
    pub async fn delete_category(&self, category_id: &str, acting_user: Option<&str>) -> RoadmapResult<()> {
        let user_id = acting_user.ok_or(RoadmapError::AuthRequired)?;
        let entry = self
            .catalog
            .find_category(category_id)
            .ok_or_else(|| RoadmapError::validation(format!("Category {} does not exist", category_id)))?;
        if !entry.category.is_owned_by(user_id) {
            return Err(RoadmapError::authorization("only the creator can delete this category"));
        }

        self.remote.delete_category(category_id).await.map_err(|e| {
            log::warn!("Deleting category {} failed: {}", category_id, e);
            RoadmapError::from(e)
        })?;

        self.catalog.remove_category(category_id);
        self.completions.forget(entry.problem_ids());
        log::info!("Deleted category {} with {} problems", category_id, entry.problems.len());
        Ok(())
    }

    /// Delete a user-authored problem; seed problems are never deletable
    pub async fn delete_problem(&self, problem_id: &str, acting_user: Option<&str>) -> RoadmapResult<()> {
        let user_id = acting_user.ok_or(RoadmapError::AuthRequired)?;
        let problem = self
            .catalog
            .find_problem(problem_id)
            .ok_or_else(|| RoadmapError::validation(format!("Problem {} does not exist", problem_id)))?;
        if problem.is_default {
            return Err(RoadmapError::authorization("default problems cannot be deleted"));
        }
        if !problem.is_deletable_by(user_id) {
            return Err(RoadmapError::authorization("only the creator can delete this problem"));
        }

        self.remote.delete_problem(problem_id).await.map_err(|e| {
            log::warn!("Deleting problem {} failed: {}", problem_id, e);
            RoadmapError::from(e)
        })?;

        self.catalog.remove_problem(problem_id);
        self.completions.forget([problem_id]);
        log::info!("Deleted problem {}", problem_id);
        Ok(())
    }

    async fn ensure_completions_for(&self, user_id: &str) -> RoadmapResult<()> {
        if self.completions.loaded_user().as_deref() != Some(user_id) {
            log::info!("Completion set belongs to another user, loading {}", user_id);
            self.completions.load(user_id).await?;
        }
        Ok(())
    }

    /// Flip the completion state of a problem. Returns the new state.
    pub async fn toggle_completion(&self, problem_id: &str, user_id: Option<&str>) -> RoadmapResult<bool> {
        let user = user_id.ok_or(RoadmapError::AuthRequired)?;
        self.ensure_completions_for(user).await?;
        let completed = !self.completions.is_completed(problem_id);
        self.set_completion(problem_id, completed, user_id).await?;
        Ok(completed)
    }

    /// Bring a problem to the requested completion state.
    ///
    /// The tracker is updated before the remote write and restored if the
    /// write fails, so a state that was not persisted never survives.
    /// If another user's records are loaded, `user_id`'s are loaded first.
    pub async fn set_completion(&self, problem_id: &str, completed: bool, user_id: Option<&str>) -> RoadmapResult<()> {
        let user_id = user_id.ok_or(RoadmapError::AuthRequired)?;
        self.ensure_completions_for(user_id).await?;
        if self.completions.is_completed(problem_id) == completed {
            return Ok(());
        }

        let record = CompletionRecord::new(user_id, problem_id);
        let result = if completed {
            self.completions.mark_complete(problem_id);
            self.remote.insert_completion(&record).await
        } else {
            self.completions.mark_incomplete(problem_id);
            self.remote.delete_completion(&record).await
        };

        if let Err(e) = result {
            if completed {
                self.completions.mark_incomplete(problem_id);
            } else {
                self.completions.mark_complete(problem_id);
            }
            log::warn!("Completion update for {} rolled back: {}", problem_id, e);
            return Err(e.into());
        }
        Ok(())
    }
}
