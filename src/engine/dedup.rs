//! Duplicate collapsing for resolved populations.
//!
//! Include/inherit fan-out simply accumulates everything reachable, so a
//! diamond-shaped graph hands the sorter the same trigger more than once:
//!
//! ```text
//!        top
//!       /   \
//!    left   right      both include `shared`
//!       \   /
//!      shared          -> shared's triggers appear twice
//! ```
//!
//! Copies of one trigger can only differ in depth, and the sorter ranks the
//! lowest-depth copy first, so every later copy is unreachable for matching.
//! Collapsing them keeps the first-seen position and the minimum depth, which
//! leaves match results unchanged and shrinks the list the sorter and matcher
//! walk.

use crate::{TriggerId, TriggerRef};
use std::collections::HashMap;

/// Collapse repeated triggers. Returns the unique entries and how many
/// duplicates were dropped.
pub(crate) fn collapse(entries: Vec<TriggerRef>) -> (Vec<TriggerRef>, usize) {
    let mut position: HashMap<TriggerId, usize> = HashMap::with_capacity(entries.len());
    let mut unique: Vec<TriggerRef> = Vec::with_capacity(entries.len());
    let mut dropped = 0;

    for entry in entries {
        match position.get(&entry.trigger) {
            Some(&idx) => {
                dropped += 1;
                unique[idx].depth = unique[idx].depth.min(entry.depth);
            }
            None => {
                position.insert(entry.trigger, unique.len());
                unique.push(entry);
            }
        }
    }

    (unique, dropped)
}
