use crate::engine::{
    self, ArrayTable, Hit, Matcher, Population, ResolveIssue, Resolver, SortMetrics, SortedLists, TopicGraph,
    TopicSortMetrics,
};
use crate::error::{Error, Result};
use crate::{TopicId, TriggerId, TriggerRef};
use std::time::Instant;
use tracing::debug;

/// Topic that receives triggers registered outside any topic block.
pub const DEFAULT_TOPIC: &str = "random";

/// Interpreter configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum recursion depth when walking include/inherit edges. Walks that
    /// go deeper are cut and reported.
    pub recursion_limit: usize,
    /// Highest script format version the loader accepts.
    pub supported_version: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options { recursion_limit: 50, supported_version: 2.0 }
    }
}

/// Per-message matching context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// The reply the bot gave last, checked against `%previous` patterns.
    pub previous_reply: Option<String>,
}

impl Context {
    pub fn with_previous(reply: impl Into<String>) -> Self {
        Context { previous_reply: Some(reply.into()) }
    }
}

/// A successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub trigger: TriggerId,
    /// Topic the match was requested in.
    pub topic: String,
    /// Topic that owns the matched trigger; differs from `topic` when the
    /// trigger was included or inherited.
    pub owner: String,
    /// Canonical pattern text of the matched trigger.
    pub pattern: String,
    /// Canonical `%previous` text, when matched through context.
    pub previous: Option<String>,
    /// Inheritance depth the trigger was ranked at.
    pub depth: usize,
    pub responses: Vec<String>,
    /// Captures in declaration order.
    pub captures: Vec<String>,
    /// Captures of the `%previous` pattern, in declaration order.
    pub previous_captures: Vec<String>,
}

impl MatchResult {
    /// The `n`th capture, 1-based.
    pub fn star(&self, n: usize) -> Option<&str> {
        n.checked_sub(1).and_then(|i| self.captures.get(i)).map(String::as_str)
    }

    /// The `n`th `%previous` capture, 1-based.
    pub fn botstar(&self, n: usize) -> Option<&str> {
        n.checked_sub(1).and_then(|i| self.previous_captures.get(i)).map(String::as_str)
    }
}

/// One entry of a topic's sorted list, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedTrigger {
    /// Canonical pattern text.
    pub pattern: String,
    /// Pattern text as registered.
    pub raw: String,
    pub previous: Option<String>,
    pub owner: String,
    pub depth: usize,
}

/// An interpreter instance: the topic graph, arrays and options.
///
/// Registration and sorting take `&mut self`, matching takes `&self`, so
/// matching never observes a half-applied registration.
#[derive(Debug, Clone, Default)]
pub struct Brain {
    pub(crate) graph: TopicGraph,
    pub(crate) arrays: ArrayTable,
    pub(crate) options: Options,
}

impl Brain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Brain { graph: TopicGraph::new(), arrays: ArrayTable::new(), options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Register a trigger in `topic`, creating the topic if needed.
    ///
    /// Registering the same pattern and `%previous` text again in the same
    /// topic replaces the earlier responses. A pattern that cannot be compiled
    /// is rejected with [`Error::MalformedPattern`] and nothing is registered.
    pub fn register_trigger<I, S>(
        &mut self,
        topic: &str,
        pattern: &str,
        responses: I,
        previous: Option<&str>,
    ) -> Result<TriggerId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let compiled = engine::compile(pattern)?;
        let previous = previous.map(engine::compile).transpose()?;
        let topic = self.graph.ensure_topic(topic);
        let responses = responses.into_iter().map(Into::into).collect();
        Ok(self.graph.add_trigger(topic, pattern, compiled, responses, previous))
    }

    /// Make `topic` include `other`: their triggers rank together.
    pub fn add_include(&mut self, topic: &str, other: &str) {
        let (a, b) = (self.graph.ensure_topic(topic), self.graph.ensure_topic(other));
        self.graph.add_include(a, b);
    }

    /// Make `topic` inherit `other`: `other`'s triggers rank below `topic`'s.
    pub fn add_inherit(&mut self, topic: &str, other: &str) {
        let (a, b) = (self.graph.ensure_topic(topic), self.graph.ensure_topic(other));
        self.graph.add_inherit(a, b);
    }

    /// Define or replace the word list referenced by `@name`. Each entry may
    /// be several words. Arrays are looked up at match time, so no re-sort is
    /// needed.
    pub fn set_array<I, S>(&mut self, name: &str, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|e| e.as_ref().to_lowercase().split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|words| !words.is_empty())
            .collect();
        self.arrays.insert(name.to_lowercase(), entries);
    }

    /// Resolve every topic's include/inherit graph and rebuild its sorted
    /// trigger and `%previous` lists. Idempotent.
    pub fn sort_all(&mut self) -> SortMetrics {
        let start = Instant::now();
        let resolver = Resolver::new(&self.graph, self.options.recursion_limit);
        let mut metrics = SortMetrics::default();
        let mut results: Vec<(TopicId, SortedLists)> = Vec::new();

        for topic in self.graph.topic_ids() {
            let topic_start = Instant::now();
            let resolution = resolver.collect(topic);

            let (main_entries, main_dups) = engine::collapse(resolution.entries);
            let (previous_entries, previous_dups) = engine::collapse(resolution.previous);
            let lists = SortedLists {
                triggers: engine::sort_population(&self.graph, main_entries, Population::Triggers),
                previous: engine::sort_population(&self.graph, previous_entries, Population::Previous),
            };

            let name = self.graph.topic(topic).name.clone();
            debug!(
                topic = %name,
                triggers = lists.triggers.len(),
                previous = lists.previous.len(),
                duplicates = main_dups + previous_dups,
                "sorted topic"
            );

            metrics.topics.push(TopicSortMetrics {
                topic: name,
                duration: topic_start.elapsed(),
                triggers: lists.triggers.len(),
                previous: lists.previous.len(),
                duplicates: main_dups + previous_dups,
                issues: resolution.issues,
            });
            results.push((topic, lists));
        }

        for (topic, lists) in results {
            self.graph.set_sorted(topic, lists);
        }
        metrics.total = start.elapsed();
        metrics
    }

    /// Match `input` against the sorted triggers of `topic`.
    ///
    /// `Ok(None)` means no trigger matched, a normal outcome. Unknown topics
    /// and topics changed since the last [`Brain::sort_all`] are errors.
    pub fn match_input(&self, topic: &str, input: &str) -> Result<Option<MatchResult>> {
        self.match_with(topic, input, &Context::default())
    }

    /// Like [`Brain::match_input`], consulting `%previous` triggers first when
    /// `context` carries the previous reply.
    pub fn match_with(&self, topic: &str, input: &str, context: &Context) -> Result<Option<MatchResult>> {
        let id = self.graph.topic_id(topic).ok_or_else(|| Error::UnknownTopic(topic.to_string()))?;
        let lists = self.graph.topic(id).sorted.as_ref().ok_or_else(|| Error::SortRequired(topic.to_string()))?;

        let words = engine::normalize(input);
        let matcher = Matcher::new(&self.graph, &self.arrays);

        let contextual = context.previous_reply.as_deref().and_then(|reply| {
            matcher.first_previous_match(&lists.previous, &words, &engine::normalize(reply))
        });
        let hit = contextual.or_else(|| matcher.first_match(&lists.triggers, &words));

        match &hit {
            Some(h) => debug!(topic, input, pattern = %self.graph.trigger(h.entry.trigger).pattern.text, "matched"),
            None => debug!(topic, input, "no trigger matched"),
        }
        Ok(hit.map(|h| self.to_result(&self.graph.topic(id).name, h)))
    }

    fn to_result(&self, topic: &str, hit: Hit) -> MatchResult {
        let trigger = self.graph.trigger(hit.entry.trigger);
        MatchResult {
            trigger: hit.entry.trigger,
            topic: topic.to_string(),
            owner: self.graph.topic(trigger.topic).name.clone(),
            pattern: trigger.pattern.text.clone(),
            previous: if hit.contextual { trigger.previous.as_ref().map(|p| p.text.clone()) } else { None },
            depth: hit.entry.depth,
            responses: trigger.responses.clone(),
            captures: hit.captures,
            previous_captures: hit.previous_captures,
        }
    }

    /// Names of all topics, in creation order.
    pub fn list_topics(&self) -> Vec<&str> {
        self.graph.topic_ids().map(|id| self.graph.topic(id).name.as_str()).collect()
    }

    /// Topics `topic` includes, in declaration order.
    pub fn topic_includes(&self, topic: &str) -> Option<Vec<&str>> {
        let id = self.graph.topic_id(topic)?;
        Some(self.graph.topic(id).includes.iter().map(|&t| self.graph.topic(t).name.as_str()).collect())
    }

    /// Topics `topic` inherits, in declaration order.
    pub fn topic_inherits(&self, topic: &str) -> Option<Vec<&str>> {
        let id = self.graph.topic_id(topic)?;
        Some(self.graph.topic(id).inherits.iter().map(|&t| self.graph.topic(t).name.as_str()).collect())
    }

    /// The sorted trigger list of `topic`, best first.
    pub fn sorted_triggers(&self, topic: &str) -> Result<Vec<SortedTrigger>> {
        self.sorted_view(topic, |lists| &lists.triggers)
    }

    /// The sorted `%previous` list of `topic`, best first.
    pub fn sorted_previous(&self, topic: &str) -> Result<Vec<SortedTrigger>> {
        self.sorted_view(topic, |lists| &lists.previous)
    }

    fn sorted_view(&self, topic: &str, pick: impl Fn(&SortedLists) -> &Vec<TriggerRef>) -> Result<Vec<SortedTrigger>> {
        let id = self.graph.topic_id(topic).ok_or_else(|| Error::UnknownTopic(topic.to_string()))?;
        let lists = self.graph.topic(id).sorted.as_ref().ok_or_else(|| Error::SortRequired(topic.to_string()))?;
        Ok(pick(lists)
            .iter()
            .map(|entry| {
                let trigger = self.graph.trigger(entry.trigger);
                SortedTrigger {
                    pattern: trigger.pattern.text.clone(),
                    raw: trigger.raw.clone(),
                    previous: trigger.previous.as_ref().map(|p| p.text.clone()),
                    owner: self.graph.topic(trigger.topic).name.clone(),
                    depth: entry.depth,
                }
            })
            .collect())
    }

    /// Name of the topic, reachable from `topic` through its edges, that owns
    /// a trigger with this pattern. Inherited topics are searched before
    /// included ones; `topic` itself is not searched.
    pub fn find_owner(&self, topic: &str, pattern: &str) -> Option<&str> {
        let id = self.graph.topic_id(topic)?;
        let text = engine::compile(pattern).ok()?.text;
        let trigger = Resolver::new(&self.graph, self.options.recursion_limit).find_owner(id, &text)?;
        Some(self.graph.topic(self.graph.trigger(trigger).topic).name.as_str())
    }

    /// `topic` followed by every topic reachable through include and inherit
    /// edges, depth first, each listed once. Topics deeper than
    /// [`Options::recursion_limit`] edges are left out and reported as
    /// [`ResolveIssue::DepthExceeded`].
    pub fn topic_tree(&self, topic: &str) -> Option<(Vec<&str>, Vec<ResolveIssue>)> {
        let id = self.graph.topic_id(topic)?;
        let (order, issues) = Resolver::new(&self.graph, self.options.recursion_limit).flatten(id);
        Some((order.into_iter().map(|t| self.graph.topic(t).name.as_str()).collect(), issues))
    }
}
