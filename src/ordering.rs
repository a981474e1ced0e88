//! Sibling Ordering
//!
//! Computes the `order_index` for a new sibling. Pure and stateless: two
//! callers reading the same siblings get the same value, and resolving that
//! race is left to the sync layer.

use roadmap_backend::{Category, CategoryWithProblems, Problem};

use crate::error::{RoadmapError, RoadmapResult};

/// Anything positioned among siblings by `order_index`
pub trait Ordered {
    fn order_index(&self) -> i32;
}

impl Ordered for Category {
    fn order_index(&self) -> i32 {
        self.order_index
    }
}

impl Ordered for Problem {
    fn order_index(&self) -> i32 {
        self.order_index
    }
}

impl Ordered for CategoryWithProblems {
    fn order_index(&self) -> i32 {
        self.category.order_index
    }
}

fn after(max: i32) -> RoadmapResult<i32> {
    max.checked_add(1)
        .ok_or_else(|| RoadmapError::validation("No position left after the last sibling"))
}

/// `max(order_index) + 1`, or 0 for no siblings.
/// Fails when the last sibling already sits at `i32::MAX`.
pub fn next_order<T: Ordered>(siblings: &[T]) -> RoadmapResult<i32> {
    match siblings.iter().map(Ordered::order_index).max() {
        Some(max) => after(max),
        None => Ok(0),
    }
}

/// Combine the local allocation with the store's current maximum, if known
pub fn reconcile_order(local_next: i32, remote_max: Option<i32>) -> RoadmapResult<i32> {
    match remote_max {
        Some(max) => Ok(local_next.max(after(max)?)),
        None => Ok(local_next),
    }
}
