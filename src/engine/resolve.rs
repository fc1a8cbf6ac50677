//! Topic graph resolution.
//!
//! A topic sees more triggers than it owns: everything reachable through its
//! `include` edges ranks alongside its own triggers, and everything reachable
//! through `inherit` edges ranks *below* them. The resolver walks those edges
//! and produces the unsorted population for one topic, each entry tagged with
//! its inheritance depth. Triggers with a `%previous` constraint are kept out
//! of the main population and collected into a list of their own by the same
//! walk.
//!
//! ```text
//! > topic alpha includes beta inherits gamma
//!
//!   walk(alpha, depth 0, inheritance 0)
//!     ├─ include beta   -> walk(beta,  depth 1, inheritance 0)
//!     ├─ inherit gamma  -> walk(gamma, depth 1, inheritance 1, inherited)
//!     └─ alpha's own triggers, tagged 0 (alpha declares an inherit edge)
//!
//!   alpha + beta pool at depth 0, gamma at depth 1
//! ```
//!
//! `depth` counts recursive calls and is capped by
//! [`crate::Options::recursion_limit`]; `inheritance` counts inherit edges
//! only. A topic's local triggers are tagged with the current inheritance
//! counter when it declares inherit edges or was reached through one;
//! otherwise they stay at depth 0.
//!
//! ## Faults
//!
//! Neither fault aborts the walk. The offending branch is not descended into,
//! is logged, and is recorded as a [`ResolveIssue`]; sibling branches and other
//! topics resolve normally.
//!
//! - Going deeper than the limit: `DepthExceeded`.
//! - Re-entering a topic already on the current path: `Cycle`. The re-entered
//!   topic's own triggers are still listed with the tag of that visit, so
//!   after duplicate collapsing the population equals that of the uncut walk.

use super::graph::TopicGraph;
use crate::{TopicId, Trigger, TriggerId, TriggerRef};
use std::collections::HashSet;
use tracing::{error, warn};

/// Which list a trigger belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Population {
    /// Triggers without a `%previous` constraint.
    Triggers,
    /// Triggers with a `%previous` constraint.
    Previous,
}

impl Population {
    pub(crate) fn of(trigger: &Trigger) -> Population {
        if trigger.previous.is_some() { Population::Previous } else { Population::Triggers }
    }
}

/// A graph fault met while walking a topic's edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolveIssue {
    /// The walk went deeper than the recursion limit at this topic.
    DepthExceeded { topic: String },
    /// This topic was reached again while already on the current path.
    Cycle { topic: String },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Resolution {
    /// Triggers without a `%previous` constraint.
    pub entries: Vec<TriggerRef>,
    /// Triggers with one; resolved by the same walk.
    pub previous: Vec<TriggerRef>,
    pub issues: Vec<ResolveIssue>,
}

pub(crate) struct Resolver<'g> {
    graph: &'g TopicGraph,
    limit: usize,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g TopicGraph, limit: usize) -> Self {
        Resolver { graph, limit }
    }

    /// Collect every trigger visible from `topic`, unsorted.
    pub fn collect(&self, topic: TopicId) -> Resolution {
        let mut out = Resolution::default();
        let mut path = Vec::new();
        self.walk(topic, 0, 0, false, &mut path, &mut out);
        out
    }

    fn walk(
        &self,
        topic: TopicId,
        depth: usize,
        inheritance: usize,
        inherited: bool,
        path: &mut Vec<TopicId>,
        out: &mut Resolution,
    ) {
        let node = self.graph.topic(topic);
        if depth > self.limit {
            error!(topic = %node.name, limit = self.limit, "deep recursion while scanning topic inheritance");
            out.issues.push(ResolveIssue::DepthExceeded { topic: node.name.clone() });
            return;
        }
        let tag = if !node.inherits.is_empty() || inherited { inheritance } else { 0 };
        if path.contains(&topic) {
            // Later laps round the cycle only repeat these tags or raise them,
            // so the local triggers at this re-entry are all they would add.
            warn!(topic = %node.name, "topic graph cycle; not descending again");
            out.issues.push(ResolveIssue::Cycle { topic: node.name.clone() });
            self.push_local(topic, tag, out);
            return;
        }
        path.push(topic);

        for &included in &node.includes {
            self.walk(included, depth + 1, inheritance, false, path, out);
        }
        for &parent in &node.inherits {
            self.walk(parent, depth + 1, inheritance + 1, true, path, out);
        }
        self.push_local(topic, tag, out);

        path.pop();
    }

    fn push_local(&self, topic: TopicId, tag: usize, out: &mut Resolution) {
        for &trigger in &self.graph.topic(topic).triggers {
            let entry = TriggerRef { trigger, depth: tag };
            match Population::of(self.graph.trigger(trigger)) {
                Population::Triggers => out.entries.push(entry),
                Population::Previous => out.previous.push(entry),
            }
        }
    }

    /// Find the trigger with canonical text `pattern` owned by some topic
    /// reachable from `topic`. Inherit edges are searched before include
    /// edges; `topic` itself is not checked.
    pub fn find_owner(&self, topic: TopicId, pattern: &str) -> Option<TriggerId> {
        let mut path = Vec::new();
        self.find_owner_at(topic, pattern, 0, &mut path)
    }

    fn find_owner_at(&self, topic: TopicId, pattern: &str, depth: usize, path: &mut Vec<TopicId>) -> Option<TriggerId> {
        let node = self.graph.topic(topic);
        if depth > self.limit {
            error!(topic = %node.name, limit = self.limit, "deep recursion while searching for trigger owner");
            return None;
        }
        if path.contains(&topic) {
            return None;
        }
        path.push(topic);

        let found = node.inherits.iter().chain(node.includes.iter()).find_map(|&next| {
            self.graph.owned_trigger(next, pattern).or_else(|| self.find_owner_at(next, pattern, depth + 1, path))
        });

        path.pop();
        found
    }

    /// List `topic` and every topic reachable from it, self first, depth
    /// first, includes before inherits. Each topic appears once.
    pub fn flatten(&self, topic: TopicId) -> (Vec<TopicId>, Vec<ResolveIssue>) {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut issues = Vec::new();
        self.flatten_at(topic, 0, &mut seen, &mut order, &mut issues);
        (order, issues)
    }

    fn flatten_at(
        &self,
        topic: TopicId,
        depth: usize,
        seen: &mut HashSet<TopicId>,
        order: &mut Vec<TopicId>,
        issues: &mut Vec<ResolveIssue>,
    ) {
        let node = self.graph.topic(topic);
        if depth > self.limit {
            error!(topic = %node.name, limit = self.limit, "deep recursion while flattening topic tree");
            issues.push(ResolveIssue::DepthExceeded { topic: node.name.clone() });
            return;
        }
        if !seen.insert(topic) {
            return;
        }
        order.push(topic);

        for &included in &node.includes {
            self.flatten_at(included, depth + 1, seen, order, issues);
        }
        for &parent in &node.inherits {
            self.flatten_at(parent, depth + 1, seen, order, issues);
        }
    }
}
