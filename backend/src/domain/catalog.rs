//! Catalog Read Model
//!
//! A category together with its problems, both sorted by `order_index`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::category::Category;
use super::entity::Entity;
use super::problem::Problem;

/// Category plus its problems sorted by `order_index` ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithProblems {
    #[serde(flatten)]
    pub category: Category,
    pub problems: Vec<Problem>,
}

impl CategoryWithProblems {
    pub fn new(category: Category) -> Self {
        Self { category, problems: Vec::new() }
    }

    pub fn problem_ids(&self) -> impl Iterator<Item = &str> {
        self.problems.iter().map(|p| p.id.as_str())
    }
}

impl Entity for CategoryWithProblems {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.category.id.clone()
    }
}

/// Build the ordered catalog from flat category and problem lists.
///
/// Problems whose `category_id` matches no category are dropped: the
/// catalog cannot represent orphans. Ties on `order_index` keep the
/// input order.
pub fn assemble_catalog(categories: Vec<Category>, problems: Vec<Problem>) -> Vec<CategoryWithProblems> {
    let mut by_category: HashMap<String, Vec<Problem>> = HashMap::new();
    for problem in problems {
        by_category.entry(problem.category_id.clone()).or_default().push(problem);
    }

    let mut catalog: Vec<CategoryWithProblems> = categories
        .into_iter()
        .map(|category| {
            let mut problems = by_category.remove(&category.id).unwrap_or_default();
            problems.sort_by_key(|p| p.order_index);
            CategoryWithProblems { category, problems }
        })
        .collect();
    catalog.sort_by_key(|c| c.category.order_index);

    if !by_category.is_empty() {
        log::warn!(
            "Dropped problems for {} unknown categories while assembling catalog",
            by_category.len()
        );
    }
    catalog
}

/// Total number of problems across the catalog
pub fn total_problems(catalog: &[CategoryWithProblems]) -> usize {
    catalog.iter().map(|c| c.problems.len()).sum()
}
