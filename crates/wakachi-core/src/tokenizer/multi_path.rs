//! Cost-ordered enumeration of alternative paths (Eppstein-style).
//!
//! Any path through the lattice is the best path with a sequence of
//! "sidetracks": at some node, enter from a non-best predecessor, then
//! follow best pointers again. Each node keeps a sorted persistent list of
//! the sidetracks available on its best-pointer chain; alternatives are
//! then popped from a heap in order of total extra cost, each pop offering
//! at most two successors.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::cost::CostFunction;
use super::lattice::{Lattice, NodeKind, UNREACHABLE};
use super::viterbi::backtrace;

/// Entering `head` from `pred` instead of its best predecessor.
#[derive(Debug, Clone, Copy)]
struct Sidetrack {
    head: usize,
    pred: usize,
    extra: i64,
}

/// Cell of a persistent list of sidetracks sorted by extra cost.
#[derive(Debug, Clone, Copy)]
struct Cell {
    track: usize,
    next: Option<usize>,
}

/// A partial solution: the sidetrack at `cell` applied after those of `parent`.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cell: usize,
    parent: Option<usize>,
    extra: i64,
}

/// Heap key ordered for a min-heap on extra cost, FIFO among ties.
#[derive(Debug, PartialEq, Eq)]
struct QueueItem {
    extra: i64,
    seq: usize,
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .extra
            .cmp(&self.extra)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A path as node indices (BOS/EOS excluded) with its total cost.
pub(crate) type ScoredPath = (Vec<usize>, i64);

/// Lazy enumeration of paths in ascending cost order, starting with the
/// Viterbi path and ending once the extra cost exceeds the slack.
pub(crate) struct Paths<'a, 't> {
    lattice: &'a Lattice<'t>,
    tracks: Vec<Sidetrack>,
    cells: Vec<Cell>,
    heads: Vec<Option<usize>>,
    candidates: Vec<Candidate>,
    heap: BinaryHeap<QueueItem>,
    base_cost: i64,
    cost_slack: i64,
    best_pending: bool,
}

/// Enumerate the paths of `lattice` whose cost exceeds the best by at most
/// `cost_slack`.
///
/// `lattice` must already have been scored by the forward pass with `cost_fn`.
pub(crate) fn paths<'a, 't>(
    lattice: &'a Lattice<'t>,
    cost_fn: &dyn CostFunction,
    cost_slack: i64,
) -> Paths<'a, 't> {
    let base_cost = lattice.nodes[lattice.eos].best_cost;
    let mut paths = Paths {
        lattice,
        tracks: Vec::new(),
        cells: Vec::new(),
        heads: Vec::new(),
        candidates: Vec::new(),
        heap: BinaryHeap::new(),
        base_cost,
        cost_slack,
        best_pending: base_cost != UNREACHABLE,
    };
    if !paths.best_pending {
        return paths;
    }

    let (tracks, cells, heads) = build_sidetracks(lattice, cost_fn);
    paths.tracks = tracks;
    paths.cells = cells;
    paths.heads = heads;
    if let Some(head) = paths.heads[lattice.eos] {
        let extra = paths.tracks[paths.cells[head].track].extra;
        paths.push(Candidate {
            cell: head,
            parent: None,
            extra,
        });
    }
    paths
}

impl Paths<'_, '_> {
    fn push(&mut self, c: Candidate) {
        self.heap.push(QueueItem {
            extra: c.extra,
            seq: self.candidates.len(),
        });
        self.candidates.push(c);
    }

    pub fn sidetrack_count(&self) -> usize {
        self.tracks.len()
    }
}

impl Iterator for Paths<'_, '_> {
    type Item = ScoredPath;

    fn next(&mut self) -> Option<ScoredPath> {
        if self.best_pending {
            self.best_pending = false;
            return Some((backtrace(self.lattice, self.lattice.eos), self.base_cost));
        }
        let item = self.heap.pop()?;
        if item.extra > self.cost_slack {
            self.heap.clear();
            return None;
        }
        let current = self.candidates[item.seq];
        let path = materialize(
            self.lattice,
            &self.tracks,
            &self.cells,
            &self.candidates,
            item.seq,
        );

        let track = self.tracks[self.cells[current.cell].track];
        if let Some(next) = self.cells[current.cell].next {
            let extra = current.extra - track.extra + self.tracks[self.cells[next].track].extra;
            self.push(Candidate {
                cell: next,
                parent: current.parent,
                extra,
            });
        }
        if let Some(child) = self.heads[track.pred] {
            let extra = current.extra + self.tracks[self.cells[child].track].extra;
            self.push(Candidate {
                cell: child,
                parent: Some(item.seq),
                extra,
            });
        }
        Some((path, self.base_cost + current.extra))
    }
}

/// Compute every node's sidetracks and its persistent sorted list
/// (own sidetracks merged into the list inherited from its best predecessor).
fn build_sidetracks(
    lattice: &Lattice<'_>,
    cost_fn: &dyn CostFunction,
) -> (Vec<Sidetrack>, Vec<Cell>, Vec<Option<usize>>) {
    let nodes = &lattice.nodes;
    let mut tracks: Vec<Sidetrack> = Vec::new();
    let mut cells: Vec<Cell> = Vec::new();
    let mut heads: Vec<Option<usize>> = vec![None; nodes.len()];

    for slot in 1..lattice.nodes_by_start.len() {
        for &v in &lattice.nodes_by_start[slot] {
            let node = &nodes[v];
            let Some(best_pred) = node.prev else {
                continue;
            };
            let word = cost_fn.word_cost(node, &lattice.chars);
            let mut own: Vec<usize> = Vec::new();
            for &u in &lattice.nodes_by_end[slot] {
                let pred = &nodes[u];
                if u == best_pred || pred.best_cost == UNREACHABLE || pred.kind == NodeKind::Bos {
                    continue;
                }
                let extra =
                    pred.best_cost + cost_fn.transition_cost(pred, node) + word - node.best_cost;
                own.push(tracks.len());
                tracks.push(Sidetrack {
                    head: v,
                    pred: u,
                    extra,
                });
            }
            own.sort_by_key(|&t| tracks[t].extra);
            heads[v] = merge_lists(&tracks, &mut cells, &own, heads[best_pred]);
        }
    }
    (tracks, cells, heads)
}

/// Merge sorted `own` into the list at `inherited`, copying only the
/// inherited cells that sort before the last own sidetrack.
fn merge_lists(
    tracks: &[Sidetrack],
    cells: &mut Vec<Cell>,
    own: &[usize],
    inherited: Option<usize>,
) -> Option<usize> {
    let mut prefix: Vec<usize> = Vec::with_capacity(own.len());
    let mut tail = inherited;
    let mut i = 0;
    while i < own.len() {
        match tail {
            Some(c) if tracks[cells[c].track].extra < tracks[own[i]].extra => {
                prefix.push(cells[c].track);
                tail = cells[c].next;
            }
            _ => {
                prefix.push(own[i]);
                i += 1;
            }
        }
    }
    let mut next = tail;
    for &track in prefix.iter().rev() {
        cells.push(Cell { track, next });
        next = Some(cells.len() - 1);
    }
    next
}

/// Apply the sidetracks of candidate `leaf` and its ancestors, root first,
/// walking back from EOS.
fn materialize(
    lattice: &Lattice<'_>,
    tracks: &[Sidetrack],
    cells: &[Cell],
    candidates: &[Candidate],
    leaf: usize,
) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut cur = Some(leaf);
    while let Some(c) = cur {
        chain.push(cells[candidates[c].cell].track);
        cur = candidates[c].parent;
    }
    chain.reverse();

    let mut path = Vec::new();
    let mut node = Some(lattice.eos);
    for &t in &chain {
        let track = tracks[t];
        while let Some(idx) = node {
            if idx == track.head {
                break;
            }
            path.push(idx);
            node = lattice.nodes[idx].prev;
        }
        path.push(track.head);
        node = Some(track.pred);
    }
    while let Some(idx) = node {
        path.push(idx);
        node = lattice.nodes[idx].prev;
    }
    path.retain(|&idx| lattice.nodes[idx].kind.word().is_some());
    path.reverse();
    path
}
