//! Topic graph arena.
//!
//! Every topic and trigger of one [`crate::Brain`] lives in a single
//! `TopicGraph`. Topics refer to each other and to their triggers through
//! [`TopicId`]/[`TriggerId`] indexes, so the resolver, sorter and matcher walk
//! the graph without name lookups.
//!
//! ## Invariants
//!
//! - `TopicId(i)` indexes `topics`, `TriggerId(i)` indexes `triggers`; neither
//!   vector ever shrinks.
//! - Topic names are case-insensitive: every name is trimmed and lowercased
//!   here, on lookup and on creation, and `by_name` holds one entry per topic.
//! - Any mutation (new trigger, new edge) clears every topic's sorted cache,
//!   because any topic may see the mutated one through its edges.

use super::compiler::CompiledPattern;
use crate::{TopicId, Trigger, TriggerId, TriggerRef};
use std::collections::HashMap;

/// Sorted lists cached on a topic by the last sort pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SortedLists {
    pub triggers: Vec<TriggerRef>,
    pub previous: Vec<TriggerRef>,
}

#[derive(Debug, Clone)]
pub(crate) struct Topic {
    pub name: String,
    /// Locally owned triggers, in registration order.
    pub triggers: Vec<TriggerId>,
    pub includes: Vec<TopicId>,
    pub inherits: Vec<TopicId>,
    /// `None` until sorted, and again after any graph mutation.
    pub sorted: Option<SortedLists>,
}

impl Topic {
    fn new(name: &str) -> Self {
        Topic { name: name.to_string(), triggers: Vec::new(), includes: Vec::new(), inherits: Vec::new(), sorted: None }
    }
}

fn topic_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TopicGraph {
    topics: Vec<Topic>,
    triggers: Vec<Trigger>,
    by_name: HashMap<String, TopicId>,
}

impl TopicGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic_id(&self, name: &str) -> Option<TopicId> {
        self.by_name.get(&topic_key(name)).copied()
    }

    /// Return the id of `name`, creating an empty topic if needed.
    pub fn ensure_topic(&mut self, name: &str) -> TopicId {
        let key = topic_key(name);
        if let Some(&id) = self.by_name.get(&key) {
            return id;
        }
        let id = TopicId(self.topics.len());
        self.topics.push(Topic::new(&key));
        self.by_name.insert(key, id);
        self.invalidate();
        id
    }

    pub fn topic(&self, id: TopicId) -> &Topic {
        &self.topics[id.0]
    }

    pub fn trigger(&self, id: TriggerId) -> &Trigger {
        &self.triggers[id.0]
    }

    /// All topic ids in creation order.
    pub fn topic_ids(&self) -> impl Iterator<Item = TopicId> + '_ {
        (0..self.topics.len()).map(TopicId)
    }

    /// Add a trigger to `topic`, or replace the responses of an existing
    /// trigger with the same canonical pattern and `%previous` text. The
    /// weight is not part of the canonical text: re-registering with another
    /// weight replaces the weight too.
    pub fn add_trigger(
        &mut self,
        topic: TopicId,
        raw: &str,
        pattern: CompiledPattern,
        responses: Vec<String>,
        previous: Option<CompiledPattern>,
    ) -> TriggerId {
        let existing = self.topics[topic.0].triggers.iter().copied().find(|&id| {
            let t = &self.triggers[id.0];
            t.pattern.text == pattern.text
                && t.previous.as_ref().map(|p| &p.text) == previous.as_ref().map(|p| &p.text)
        });

        let id = match existing {
            Some(id) => {
                let trigger = &mut self.triggers[id.0];
                trigger.raw = raw.to_string();
                trigger.pattern = pattern;
                trigger.responses = responses;
                id
            }
            None => {
                let id = TriggerId(self.triggers.len());
                self.triggers.push(Trigger { topic, raw: raw.to_string(), pattern, responses, previous });
                self.topics[topic.0].triggers.push(id);
                id
            }
        };
        self.invalidate();
        id
    }

    /// Append an include edge. Repeated edges are ignored.
    pub fn add_include(&mut self, topic: TopicId, included: TopicId) {
        if !self.topics[topic.0].includes.contains(&included) {
            self.topics[topic.0].includes.push(included);
            self.invalidate();
        }
    }

    /// Append an inherit edge. Repeated edges are ignored.
    pub fn add_inherit(&mut self, topic: TopicId, inherited: TopicId) {
        if !self.topics[topic.0].inherits.contains(&inherited) {
            self.topics[topic.0].inherits.push(inherited);
            self.invalidate();
        }
    }

    /// Find a trigger owned directly by `topic` whose canonical text is `text`.
    pub fn owned_trigger(&self, topic: TopicId, text: &str) -> Option<TriggerId> {
        self.topics[topic.0].triggers.iter().copied().find(|&id| self.triggers[id.0].pattern.text == text)
    }

    pub fn set_sorted(&mut self, topic: TopicId, lists: SortedLists) {
        self.topics[topic.0].sorted = Some(lists);
    }

    fn invalidate(&mut self) {
        for topic in &mut self.topics {
            topic.sorted = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compiler::compile;

    fn add(graph: &mut TopicGraph, topic: TopicId, pattern: &str, reply: &str) -> TriggerId {
        graph.add_trigger(topic, pattern, compile(pattern).unwrap(), vec![reply.to_string()], None)
    }

    #[test]
    fn topics_are_created_once() {
        let mut graph = TopicGraph::new();
        let a = graph.ensure_topic("a");
        let b = graph.ensure_topic("b");
        assert_eq!(graph.ensure_topic("a"), a);
        assert_ne!(a, b);
        assert_eq!(graph.topic_ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn topic_names_ignore_case() {
        let mut graph = TopicGraph::new();
        let a = graph.ensure_topic("Sports");
        assert_eq!(graph.ensure_topic(" SPORTS "), a);
        assert_eq!(graph.topic_id("sports"), Some(a));
        assert_eq!(graph.topic(a).name, "sports");
    }

    #[test]
    fn reregistration_replaces_responses() {
        let mut graph = TopicGraph::new();
        let t = graph.ensure_topic("random");
        let first = add(&mut graph, t, "hello bot", "one");
        let second = add(&mut graph, t, "Hello   Bot", "two");
        assert_eq!(first, second);
        assert_eq!(graph.topic(t).triggers.len(), 1);
        assert_eq!(graph.trigger(first).responses, vec!["two".to_string()]);
    }

    #[test]
    fn reregistration_with_weight_replaces_weight() {
        let mut graph = TopicGraph::new();
        let t = graph.ensure_topic("random");
        let plain = add(&mut graph, t, "hello", "one");
        let weighted = add(&mut graph, t, "hello {weight=5}", "two");
        assert_eq!(plain, weighted);
        assert_eq!(graph.topic(t).triggers.len(), 1);
        assert_eq!(graph.trigger(plain).pattern.weight, 5);
        assert_eq!(graph.trigger(plain).raw, "hello {weight=5}");
    }

    #[test]
    fn mutation_clears_sorted_cache() {
        let mut graph = TopicGraph::new();
        let a = graph.ensure_topic("a");
        let b = graph.ensure_topic("b");
        graph.set_sorted(a, SortedLists::default());
        assert!(graph.topic(a).sorted.is_some());

        graph.add_include(b, a);
        assert!(graph.topic(a).sorted.is_none());

        graph.set_sorted(a, SortedLists::default());
        graph.add_include(b, a);
        assert!(graph.topic(a).sorted.is_some(), "duplicate edge is a no-op");
    }

    #[test]
    fn owned_trigger_matches_canonical_text() {
        let mut graph = TopicGraph::new();
        let t = graph.ensure_topic("random");
        let id = add(&mut graph, t, "how are you", "fine");
        assert_eq!(graph.owned_trigger(t, "how are you"), Some(id));
        assert_eq!(graph.owned_trigger(t, "how are we"), None);
    }
}
