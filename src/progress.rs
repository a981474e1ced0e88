//! Progress summary shown next to each category and in the sidebar footer.

use serde::Serialize;

use roadmap_backend::CategoryWithProblems;

use crate::completion::CompletionTracker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub category_id: String,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub categories: Vec<CategoryProgress>,
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

impl CategoryProgress {
    /// Share of completed problems, 0 for an empty category
    pub fn percent(&self) -> f64 {
        percent(self.completed, self.total)
    }
}

impl ProgressSummary {
    /// Only completions of problems present in `catalog` count
    pub fn compute(catalog: &[CategoryWithProblems], completions: &CompletionTracker) -> Self {
        let categories: Vec<CategoryProgress> = catalog
            .iter()
            .map(|entry| CategoryProgress {
                category_id: entry.category.id.clone(),
                completed: completions.count_among(entry.problem_ids()),
                total: entry.problems.len(),
            })
            .collect();

        Self {
            completed: categories.iter().map(|c| c.completed).sum(),
            total: categories.iter().map(|c| c.total).sum(),
            categories,
        }
    }

    pub fn percent(&self) -> f64 {
        percent(self.completed, self.total)
    }

    pub fn category(&self, category_id: &str) -> Option<&CategoryProgress> {
        self.categories.iter().find(|c| c.category_id == category_id)
    }
}
