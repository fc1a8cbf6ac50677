//! Specificity sorting.
//!
//! Each topic's visible population is ordered once per sort pass so matching
//! can stop at the first hit. The order is total: two different triggers never
//! compare equal, so the same inputs always produce the same list.
//!
//! ## Keys, most significant first
//!
//! ```text
//! 1. inheritance depth      ascending   own/included before inherited
//! 2. weight                 descending  {weight=N}, default 0
//! 3. band                   ascending   Atomic < Constrained < Wild
//! 4. literal word count     descending
//! 5. pattern text length    descending  (chars of the canonical text)
//! 6. pattern text           ascending
//! 7. owning topic, trigger  ascending   arena indexes
//! ```
//!
//! Bands:
//!
//! - **Atomic**: literal words only.
//! - **Constrained**: uses `_`, `#`, alternations, optionals or arrays, no `*`.
//! - **Wild**: contains `*`.
//!
//! The `%previous` list uses the same keys computed from the `%previous`
//! pattern, with the trigger pattern's specificity as the next tie-break.

use super::compiler::{CompiledPattern, PatternFlags};
use super::graph::TopicGraph;
use super::resolve::Population;
use crate::{TopicId, TriggerId, TriggerRef};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Band {
    Atomic,
    Constrained,
    Wild,
}

impl Band {
    pub(crate) fn of(pattern: &CompiledPattern) -> Band {
        if pattern.flags.contains(PatternFlags::WILD_ANY) {
            Band::Wild
        } else if pattern.flags.is_empty() {
            Band::Atomic
        } else {
            Band::Constrained
        }
    }
}

/// Per-pattern part of the sort key.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Specificity<'a> {
    band: Band,
    literals: Reverse<usize>,
    length: Reverse<usize>,
    text: &'a str,
}

impl<'a> Specificity<'a> {
    fn of(pattern: &'a CompiledPattern) -> Self {
        Specificity {
            band: Band::of(pattern),
            literals: Reverse(pattern.literal_words),
            length: Reverse(pattern.text.chars().count()),
            text: &pattern.text,
        }
    }
}

type SortKey<'a> = (usize, Reverse<u32>, Specificity<'a>, Option<Specificity<'a>>, TopicId, TriggerId);

fn sort_key<'g>(graph: &'g TopicGraph, entry: &TriggerRef, population: Population) -> SortKey<'g> {
    let trigger = graph.trigger(entry.trigger);
    let weight = Reverse(trigger.pattern.weight);
    let (primary, secondary) = match (population, &trigger.previous) {
        (Population::Previous, Some(previous)) => (Specificity::of(previous), Some(Specificity::of(&trigger.pattern))),
        _ => (Specificity::of(&trigger.pattern), None),
    };
    (entry.depth, weight, primary, secondary, trigger.topic, entry.trigger)
}

/// Order `entries` by specificity.
pub(crate) fn sort_population(graph: &TopicGraph, mut entries: Vec<TriggerRef>, population: Population) -> Vec<TriggerRef> {
    entries.sort_by_cached_key(|entry| sort_key(graph, entry, population));
    entries
}
