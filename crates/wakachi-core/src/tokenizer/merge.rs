//! Combine ranked per-clause alternatives into ranked whole-input alternatives.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use tracing::{debug, debug_span};

use super::viterbi::Morpheme;

/// A segmentation with its total cost.
pub(crate) type Scored = (Vec<Morpheme>, i64);

/// K-way merge of per-clause result lists, each sorted by ascending cost.
///
/// Clause costs add up. A partial combination is dropped as soon as its cost
/// plus the best costs of the remaining clauses exceeds the overall best by
/// more than `cost_slack`. Output is sorted by ascending cost.
pub(crate) fn merge_clauses(clauses: Vec<Vec<Scored>>, max_count: usize, cost_slack: i64) -> Vec<Scored> {
    let _span = debug_span!("merge_clauses", clause_count = clauses.len()).entered();
    if max_count == 0 || clauses.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    // suffix[i]: lower bound on the cost of clauses i.. (sum of their best costs)
    let mut suffix = vec![0i64; clauses.len() + 1];
    for i in (0..clauses.len()).rev() {
        suffix[i] = suffix[i + 1] + clauses[i][0].1;
    }
    let base = suffix[0];
    let within = |cost: i64, next: usize| cost + suffix[next] - base <= cost_slack;

    let mut clauses = clauses.into_iter();
    let Some(first) = clauses.next() else {
        return Vec::new();
    };
    let mut builders: Vec<Scored> = first
        .into_iter()
        .take_while(|(_, cost)| within(*cost, 1))
        .take(max_count)
        .collect();

    for (offset, clause) in clauses.enumerate() {
        let next = offset + 2;
        let mut merged: Vec<Scored> = Vec::with_capacity(max_count);
        let mut heap = BinaryHeap::new();
        let mut seen = HashSet::new();
        heap.push(Reverse((builders[0].1 + clause[0].1, 0usize, 0usize)));
        seen.insert((0usize, 0usize));

        while let Some(Reverse((cost, i, j))) = heap.pop() {
            if !within(cost, next) {
                break;
            }
            let mut morphemes = builders[i].0.clone();
            morphemes.extend_from_slice(&clause[j].0);
            merged.push((morphemes, cost));
            if merged.len() >= max_count {
                break;
            }
            if i + 1 < builders.len() && seen.insert((i + 1, j)) {
                heap.push(Reverse((builders[i + 1].1 + clause[j].1, i + 1, j)));
            }
            if j + 1 < clause.len() && seen.insert((i, j + 1)) {
                heap.push(Reverse((builders[i].1 + clause[j + 1].1, i, j + 1)));
            }
        }
        builders = merged;
    }

    debug!(result_count = builders.len());
    builders
}
