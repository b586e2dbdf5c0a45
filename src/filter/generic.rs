//! Generic filtering framework
//!
//! This module provides a trait-based approach to excluding items from a
//! candidate list before they are scored. Filters run in a fixed order and
//! each stage reports how many items it removed.

use std::fmt::Debug;

use crate::models::policy::FilterRecord;

/// A filter over items of type `T`
pub trait Filter<T>: Debug + Send + Sync {
    /// Name recorded in audits
    fn name(&self) -> &'static str;

    /// Whether `item` passes the filter
    ///
    /// # Arguments
    /// * `item` - The value to test
    fn keep(&self, item: &T) -> bool;

    /// Apply the filter, returning the kept items and the number removed
    fn apply(&self, items: Vec<T>) -> (Vec<T>, usize) {
        let before = items.len();
        let kept: Vec<T> = items.into_iter().filter(|item| self.keep(item)).collect();
        let removed = before - kept.len();
        (kept, removed)
    }
}

/// Ordered filter stages with per-stage accounting
#[derive(Debug)]
pub struct FilterChain<T> {
    stages: Vec<Box<dyn Filter<T>>>,
}

impl<T> Default for FilterChain<T> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<T> FilterChain<T> {
    /// Create an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    #[must_use]
    pub fn with_stage(mut self, filter: impl Filter<T> + 'static) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    /// Run every stage in order
    ///
    /// # Returns
    /// The surviving items and one record per stage
    pub fn run(&self, mut items: Vec<T>) -> (Vec<T>, Vec<FilterRecord>) {
        let mut records = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let (kept, removed) = stage.apply(items);
            if removed > 0 {
                log::debug!("Filter '{}' removed {removed} candidates", stage.name());
            }
            records.push(FilterRecord {
                name: stage.name().to_string(),
                removed,
            });
            items = kept;
        }
        (items, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Even;

    impl Filter<u32> for Even {
        fn name(&self) -> &'static str {
            "even"
        }

        fn keep(&self, item: &u32) -> bool {
            item % 2 == 0
        }
    }

    #[derive(Debug)]
    struct Below(u32);

    impl Filter<u32> for Below {
        fn name(&self) -> &'static str {
            "below"
        }

        fn keep(&self, item: &u32) -> bool {
            *item < self.0
        }
    }

    #[test]
    fn test_chain_records_each_stage() {
        let chain = FilterChain::new().with_stage(Even).with_stage(Below(6));
        let (kept, records) = chain.run((0..10).collect());
        assert_eq!(kept, vec![0, 2, 4]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].removed, 5);
        assert_eq!(records[1].name, "below");
        assert_eq!(records[1].removed, 2);
    }
}
