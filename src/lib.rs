//! colloquy: the trigger-sorting and matching core of a rule-based
//! conversational scripting interpreter.
//!
//! Script authors write triggers (patterns with `*`, `_` and `#` wildcards)
//! grouped into topics that may include or inherit one another. A [`Brain`]
//! owns the topic graph; [`Brain::sort_all`] orders every topic's visible
//! triggers by specificity and [`Brain::match_input`] picks the first trigger
//! whose pattern consumes the whole input.
//!
//! ```
//! use colloquy::Brain;
//!
//! let mut brain = Brain::new();
//! brain.register_trigger("random", "my name is _", ["Hello, <star>."], None).unwrap();
//! brain.sort_all();
//!
//! let hit = brain.match_input("random", "My name is Bob").unwrap().unwrap();
//! assert_eq!(hit.star(1), Some("bob"));
//! ```

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod loader;

pub use api::{Brain, Context, DEFAULT_TOPIC, MatchResult, Options, SortedTrigger};
pub use engine::{ResolveIssue, SortMetrics, TopicSortMetrics};
pub use error::{Error, Result};
pub use loader::LoadReport;

use crate::engine::CompiledPattern;

// --- Arena handles ----------------------------------------------------------

/// Index of a topic inside a [`Brain`]'s topic graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicId(pub(crate) usize);

/// Index of a trigger inside a [`Brain`]'s topic graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(pub(crate) usize);

// --- Internal types ---------------------------------------------------------

/// A registered trigger: a compiled pattern, its responses and an optional
/// `%previous` constraint, owned by exactly one topic.
#[derive(Debug, Clone)]
pub(crate) struct Trigger {
    pub topic: TopicId,
    /// Pattern text as registered, before canonicalization.
    pub raw: String,
    pub pattern: CompiledPattern,
    /// Response templates. Opaque to the core.
    pub responses: Vec<String>,
    pub previous: Option<CompiledPattern>,
}

/// A trigger as seen from some topic after graph resolution: the trigger plus
/// the number of inherit edges crossed to reach its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TriggerRef {
    pub trigger: TriggerId,
    pub depth: usize,
}
