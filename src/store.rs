//! Catalog Store
//!
//! In-memory tree of categories and their problems: what the UI renders.
//! Readers get an immutable `Arc` snapshot; writers swap in a new tree, so a
//! half-applied reload is never observable.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roadmap_backend::{
    assemble_catalog, total_problems, Category, CategoryWithProblems, Entity, Persistence, Problem,
};

use crate::error::{RoadmapError, RoadmapResult};
use crate::events::{ChangeNotifier, StoreEvent};
use crate::ordering::Ordered;

/// Ordered snapshot of the whole catalog
pub type CatalogSnapshot = Arc<Vec<CategoryWithProblems>>;

pub struct CatalogStore {
    remote: Arc<dyn Persistence>,
    catalog: RwLock<CatalogSnapshot>,
    notifier: ChangeNotifier,
}

/// Insert keeping `order_index` order; an entry with the same id is replaced
fn insert_sorted<T: Entity + Ordered>(list: &mut Vec<T>, item: T) {
    let id = item.id();
    list.retain(|existing| existing.id() != id);
    let at = list.partition_point(|existing| existing.order_index() <= item.order_index());
    list.insert(at, item);
}

impl CatalogStore {
    pub fn new(remote: Arc<dyn Persistence>, notifier: ChangeNotifier) -> Self {
        Self {
            remote,
            catalog: RwLock::new(Arc::new(Vec::new())),
            notifier,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogSnapshot> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogSnapshot> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the full catalog and replace local state in one swap.
    /// On failure the previous snapshot stays in place.
    pub async fn load(&self) -> RoadmapResult<()> {
        let categories = self.remote.list_categories().await?;
        let problems = self.remote.list_problems(None).await?;
        let catalog = assemble_catalog(categories, problems);

        log::info!(
            "Catalog loaded: {} categories, {} problems",
            catalog.len(),
            total_problems(&catalog)
        );
        *self.write() = Arc::new(catalog);
        self.notifier.notify(StoreEvent::CatalogReloaded);
        Ok(())
    }

    /// Current ordered catalog
    pub fn categories(&self) -> CatalogSnapshot {
        Arc::clone(&self.read())
    }

    pub fn find_category(&self, id: &str) -> Option<CategoryWithProblems> {
        self.read().iter().find(|c| c.category.id == id).cloned()
    }

    pub fn find_problem(&self, id: &str) -> Option<Problem> {
        self.read()
            .iter()
            .flat_map(|c| c.problems.iter())
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn total_problems(&self) -> usize {
        total_problems(&self.read())
    }

    /// Local-only insert, used after the remote store confirmed the write.
    /// Re-inserting a known id updates the category and keeps its problems.
    pub fn insert_category(&self, category: Category) {
        let id = category.id.clone();
        {
            let mut guard = self.write();
            let catalog = Arc::make_mut(&mut guard);
            let problems = catalog
                .iter()
                .position(|c| c.category.id == id)
                .map(|at| catalog.remove(at).problems)
                .unwrap_or_default();
            insert_sorted(catalog, CategoryWithProblems { category, problems });
        }
        self.notifier.notify(StoreEvent::CategoryInserted(id));
    }

    /// Local-only insert; the owning category must already be present.
    /// Nothing changes when it is not.
    pub fn insert_problem(&self, problem: Problem) -> RoadmapResult<()> {
        let id = problem.id.clone();
        {
            let mut guard = self.write();
            let owner = guard
                .iter()
                .position(|c| c.category.id == problem.category_id)
                .ok_or_else(|| {
                    RoadmapError::validation(format!("Category {} does not exist", problem.category_id))
                })?;
            let catalog = Arc::make_mut(&mut guard);

            // A problem moving between categories leaves its old list
            for (at, entry) in catalog.iter_mut().enumerate() {
                if at != owner {
                    entry.problems.retain(|p| p.id != id);
                }
            }
            insert_sorted(&mut catalog[owner].problems, problem);
        }
        self.notifier.notify(StoreEvent::ProblemInserted(id));
        Ok(())
    }

    /// Remove a category and, with it, every problem it owns
    pub fn remove_category(&self, id: &str) -> Option<CategoryWithProblems> {
        let removed = {
            let mut guard = self.write();
            let at = guard.iter().position(|c| c.category.id == id)?;
            Arc::make_mut(&mut guard).remove(at)
        };
        self.notifier.notify(StoreEvent::CategoryRemoved(id.to_string()));
        Some(removed)
    }

    pub fn remove_problem(&self, id: &str) -> Option<Problem> {
        let removed = {
            let mut guard = self.write();
            let (ci, pi) = guard.iter().enumerate().find_map(|(ci, c)| {
                c.problems.iter().position(|p| p.id == id).map(|pi| (ci, pi))
            })?;
            Arc::make_mut(&mut guard)[ci].problems.remove(pi)
        };
        self.notifier.notify(StoreEvent::ProblemRemoved(id.to_string()));
        Some(removed)
    }
}
