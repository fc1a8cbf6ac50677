//! Sorting and matching engine.
//!
//! This module holds everything between trigger registration and a match
//! result. The public entry point is [`crate::Brain`]; the pieces here are
//! crate-internal except for the metrics types returned by a sort pass.
//!
//! ## How the parts work together
//!
//! ```text
//! register_trigger ── compile (compiler.rs) ──> TopicGraph (graph.rs)
//!                                                   │
//! sort_all, per topic:                              │
//!     Resolver::collect (resolve.rs)   <────────────┘
//!       - walk include edges, then inherit edges
//!       - tag triggers with inheritance depth
//!     collapse (dedup.rs)
//!       - one entry per trigger, minimum depth
//!     sort_population (sort.rs)
//!       - depth, weight, band, literal count, length, text
//!     -> Topic::sorted
//!
//! match_input:
//!     normalize (input.rs) -> words
//!     Matcher (matcher.rs) scans Topic::sorted, first full alignment wins
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiler.rs`: pattern text to tokens, flags and canonical text.
//! - `input.rs`: message text to normalized words.
//! - `graph.rs`: the topic/trigger arena and the sorted-list caches.
//! - `resolve.rs`: include/inherit walks with the recursion cap.
//! - `dedup.rs`: collapsing triggers reached through several paths.
//! - `sort.rs`: the specificity order.
//! - `matcher.rs`: alignment with backtracking and captures.
//! - `metrics.rs`: what a sort pass produced, including graph faults.
//!
//! ## Debugging
//!
//! Everything logs through `tracing`: `debug` for per-topic sort results and
//! match outcomes, `trace` for every attempted trigger, `warn`/`error` for
//! graph faults.

#[path = "engine/compiler.rs"]
mod compiler;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/graph.rs"]
mod graph;
#[path = "engine/input.rs"]
mod input;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/sort.rs"]
mod sort;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub(crate) use compiler::{CompiledPattern, compile};
pub(crate) use dedup::collapse;
pub(crate) use graph::{SortedLists, TopicGraph};
pub(crate) use input::normalize;
pub(crate) use matcher::{ArrayTable, Hit, Matcher};
pub use metrics::{SortMetrics, TopicSortMetrics};
pub(crate) use resolve::{Population, Resolver};
pub use resolve::ResolveIssue;
pub(crate) use sort::sort_population;
