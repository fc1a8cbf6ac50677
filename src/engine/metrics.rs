//! Sort pass metrics.
//!
//! [`crate::Brain::sort_all`] returns a [`SortMetrics`] describing what each
//! topic's resolve-and-sort produced. It is how graph faults reach callers:
//! resolution never fails, it records [`ResolveIssue`]s here instead.
//!
//! - `SortMetrics::total` and `TopicSortMetrics::duration` are wall-clock and
//!   vary between runs; everything else is deterministic.

use super::resolve::ResolveIssue;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

/// Results of one [`crate::Brain::sort_all`] pass.
#[derive(Debug, Default, Clone)]
pub struct SortMetrics {
    /// Total elapsed time for the pass.
    pub total: Duration,
    /// One entry per topic, in topic creation order.
    pub topics: Vec<TopicSortMetrics>,
}

/// What sorting produced for one topic.
#[derive(Debug, Default, Clone)]
pub struct TopicSortMetrics {
    pub topic: String,
    /// Elapsed time for resolving and sorting both lists.
    pub duration: Duration,
    /// Length of the sorted trigger list.
    pub triggers: usize,
    /// Length of the sorted `%previous` list.
    pub previous: usize,
    /// Entries dropped because the same trigger was reachable more than once.
    pub duplicates: usize,
    /// Graph faults met while resolving this topic.
    pub issues: Vec<ResolveIssue>,
}

impl SortMetrics {
    /// Every issue recorded in this pass, across topics.
    pub fn issues(&self) -> impl Iterator<Item = &ResolveIssue> {
        self.topics.iter().flat_map(|t| t.issues.iter())
    }

    /// Whether any topic's walk was cut by the recursion limit.
    pub fn hit_recursion_limit(&self) -> bool {
        self.issues().any(|issue| matches!(issue, ResolveIssue::DepthExceeded { .. }))
    }

    /// Metrics of topic `name`, matched case-insensitively like topic names.
    pub fn topic(&self, name: &str) -> Option<&TopicSortMetrics> {
        let name = name.trim().to_lowercase();
        self.topics.iter().find(|t| t.topic == name)
    }
}
