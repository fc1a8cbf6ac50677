//! Trigger matching.
//!
//! A topic's sorted list is scanned in order and the first trigger whose
//! pattern aligns with the *whole* input wins. Because the list is a total
//! order, the result is deterministic.
//!
//! ## Alignment
//!
//! Alignment is a depth-first search over partial matches. A partial match
//! records the next pattern token, the next input word, and the captures
//! collected so far:
//!
//! ```text
//! pattern: _ told me to say *
//! input:   bob told me to say hello man
//!
//! [tok 0, pos 0] --_ takes 7 words--> [tok 1, pos 7]  "told" missing, dead
//!                --_ takes 6 words--> ...                              dead
//!                --_ takes 1 word---> [tok 1, pos 1] --told me to say--> [tok 5, pos 5]
//!                                     --* takes 2 words--> [tok 6, pos 7]  complete
//! ```
//!
//! - Wildcards first measure the longest run of words satisfying their
//!   constraint, then try run lengths longest first. A run never extends
//!   past a violating word, so `my name is _` cannot match `my name is bob
//!   123` at all rather than capturing a shortened `bob`.
//! - Alternatives (alternation, optional, array) are tried in declaration
//!   order; an optional's "skip" choice is tried last.
//! - A `(token, position)` state is expanded at most once. The search stops
//!   at the first complete match, so a state seen again already failed; this
//!   bounds the work per trigger by tokens × words.

use super::compiler::{CompiledPattern, Token, WildKind};
use super::graph::TopicGraph;
use super::input::InputWord;
use crate::TriggerRef;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use tracing::{debug, trace};

/// Named word lists referenced by `@name` tokens. Each entry is one
/// alternative, possibly several words long.
pub(crate) type ArrayTable = HashMap<String, Vec<Vec<String>>>;

impl WildKind {
    fn admits(self, word: &InputWord) -> bool {
        match self {
            WildKind::Any => true,
            WildKind::Alpha => word.alphabetic,
            WildKind::Number => word.numeric,
        }
    }
}

/// Internal helper representing a pattern partially aligned with the input.
/// `captures` holds word spans; strings are only built for the winner.
struct PartialMatch {
    next_idx: usize,
    position: usize,
    captures: Vec<Range<usize>>,
}

impl PartialMatch {
    fn advance(&self, consumed: usize, capture: bool) -> PartialMatch {
        let mut captures = self.captures.clone();
        if capture {
            captures.push(self.position..self.position + consumed);
        }
        PartialMatch { next_idx: self.next_idx + 1, position: self.position + consumed, captures }
    }
}

fn join(words: &[InputWord]) -> String {
    words.iter().map(|w| w.bare.as_str()).collect::<Vec<_>>().join(" ")
}

/// Push one partial match per alternative that matches at the front of
/// `rest`, in reverse so the first declared alternative is explored first.
fn push_alternatives(
    stack: &mut Vec<PartialMatch>,
    m: &PartialMatch,
    rest: &[InputWord],
    alternatives: &[Vec<String>],
    capture: bool,
) {
    for alt in alternatives.iter().rev() {
        if alt.len() <= rest.len() && alt.iter().zip(rest).all(|(lit, word)| word.is(lit)) {
            stack.push(m.advance(alt.len(), capture));
        }
    }
}

/// Align `pattern` against `words`, returning the captures of the first full
/// alignment found.
pub(crate) fn align(pattern: &CompiledPattern, words: &[InputWord], arrays: &ArrayTable) -> Option<Vec<String>> {
    let tokens = &pattern.tokens;
    let mut stack =
        vec![PartialMatch { next_idx: 0, position: 0, captures: Vec::with_capacity(pattern.captures) }];
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    while let Some(m) = stack.pop() {
        if m.next_idx == tokens.len() {
            if m.position == words.len() {
                return Some(m.captures.into_iter().map(|span| join(&words[span])).collect());
            }
            continue;
        }
        if !seen.insert((m.next_idx, m.position)) {
            continue;
        }

        let rest = &words[m.position..];
        match &tokens[m.next_idx] {
            Token::Literal(lit) => {
                if rest.first().is_some_and(|word| word.is(lit)) {
                    stack.push(m.advance(1, false));
                }
            }
            Token::Wild(kind) => {
                let run = rest.iter().take_while(|word| kind.admits(word)).count();
                // Shortest pushed first: the longest run is popped first.
                for len in 1..=run {
                    stack.push(m.advance(len, true));
                }
            }
            Token::Alternation(alternatives) => push_alternatives(&mut stack, &m, rest, alternatives, true),
            Token::Optional(alternatives) => {
                stack.push(m.advance(0, false));
                push_alternatives(&mut stack, &m, rest, alternatives, false);
            }
            Token::Array { name, capture } => match arrays.get(name) {
                Some(entries) => push_alternatives(&mut stack, &m, rest, entries, *capture),
                None => debug!(array = %name, pattern = %pattern.text, "pattern references an undefined array"),
            },
        }
    }

    None
}

/// A successful scan: the winning entry and its capture sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hit {
    pub entry: TriggerRef,
    pub captures: Vec<String>,
    pub previous_captures: Vec<String>,
    /// Whether the hit came from the `%previous` list.
    pub contextual: bool,
}

pub(crate) struct Matcher<'g> {
    graph: &'g TopicGraph,
    arrays: &'g ArrayTable,
}

impl<'g> Matcher<'g> {
    pub fn new(graph: &'g TopicGraph, arrays: &'g ArrayTable) -> Self {
        Matcher { graph, arrays }
    }

    /// First entry of `list` whose pattern consumes all of `words`.
    pub fn first_match(&self, list: &[TriggerRef], words: &[InputWord]) -> Option<Hit> {
        list.iter().find_map(|&entry| {
            let trigger = self.graph.trigger(entry.trigger);
            trace!(pattern = %trigger.pattern.text, depth = entry.depth, "trying trigger");
            align(&trigger.pattern, words, self.arrays).map(|captures| Hit {
                entry,
                captures,
                previous_captures: Vec::new(),
                contextual: false,
            })
        })
    }

    /// First entry of a `%previous` list whose `%previous` pattern consumes
    /// all of `reply` and whose trigger pattern consumes all of `words`.
    pub fn first_previous_match(&self, list: &[TriggerRef], words: &[InputWord], reply: &[InputWord]) -> Option<Hit> {
        list.iter().find_map(|&entry| {
            let trigger = self.graph.trigger(entry.trigger);
            let previous = trigger.previous.as_ref()?;
            trace!(pattern = %trigger.pattern.text, previous = %previous.text, "trying %previous trigger");
            let previous_captures = align(previous, reply, self.arrays)?;
            let captures = align(&trigger.pattern, words, self.arrays)?;
            Some(Hit { entry, captures, previous_captures, contextual: true })
        })
    }
}
