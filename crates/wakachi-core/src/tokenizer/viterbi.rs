use tracing::{debug, debug_span};

use crate::dict::{Dictionary, LexType, WordIdx};

use super::cost::CostFunction;
use super::lattice::{Lattice, NodeKind, UNREACHABLE};

/// A word on a chosen path, positioned in chars of the whole input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Morpheme {
    pub word: WordIdx,
    pub inserted: bool,
    pub start: usize,
    pub end: usize,
}

/// Forward pass: fill `best_cost` and `prev` for every reachable node.
///
/// Among equal-cost predecessors the first one in end-slot order wins.
pub(crate) fn forward(lattice: &mut Lattice<'_>, cost_fn: &dyn CostFunction) {
    let _span = debug_span!("viterbi", char_count = lattice.char_count()).entered();
    let eos = lattice.eos;
    let Lattice {
        nodes,
        nodes_by_start,
        nodes_by_end,
        chars,
        ..
    } = lattice;

    for slot in 1..nodes_by_start.len() {
        for &idx in &nodes_by_start[slot] {
            let word = cost_fn.word_cost(&nodes[idx], chars.as_slice());
            let mut best: Option<(i64, usize)> = None;
            for &pred in &nodes_by_end[slot] {
                let p = &nodes[pred];
                if p.best_cost == UNREACHABLE {
                    continue;
                }
                let total = p.best_cost + cost_fn.transition_cost(p, &nodes[idx]) + word;
                if best.map_or(true, |(b, _)| total < b) {
                    best = Some((total, pred));
                }
            }
            if let Some((total, pred)) = best {
                nodes[idx].best_cost = total;
                nodes[idx].prev = Some(pred);
            }
        }
    }
    debug!(best_cost = nodes[eos].best_cost);
}

/// Node indices of the cheapest path, BOS and EOS excluded.
pub(crate) fn best_path(lattice: &Lattice<'_>) -> Vec<usize> {
    backtrace(lattice, lattice.eos)
}

/// Follow `prev` pointers from `from` back to BOS, returning the nodes in text order.
pub(crate) fn backtrace(lattice: &Lattice<'_>, from: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut cur = Some(from);
    while let Some(idx) = cur {
        if lattice.nodes[idx].kind.word().is_some() {
            path.push(idx);
        }
        cur = lattice.nodes[idx].prev;
    }
    path.reverse();
    path
}

/// Convert node indices to morphemes, shifting positions by `offset` chars.
pub(crate) fn to_morphemes(lattice: &Lattice<'_>, path: &[usize], offset: usize) -> Vec<Morpheme> {
    path.iter()
        .filter_map(|&idx| {
            let node = &lattice.nodes[idx];
            let (word, inserted) = match node.kind {
                NodeKind::Word(w) => (w, false),
                NodeKind::Inserted(w) => (w, true),
                NodeKind::Bos | NodeKind::Eos => return None,
            };
            Some(Morpheme {
                word,
                inserted,
                start: node.start + offset,
                end: node.end + offset,
            })
        })
        .collect()
}

/// Extended mode: break every multi-char unknown word into single-char unknown words.
///
/// Each char takes the first unknown entry of its primary category, or the
/// original word's entry when that category has none.
pub(crate) fn split_unknown(
    dict: &Dictionary,
    morphemes: Vec<Morpheme>,
    chars: &[char],
    offset: usize,
) -> Vec<Morpheme> {
    let mut out = Vec::with_capacity(morphemes.len());
    for m in morphemes {
        if m.inserted || m.word.lex_type != LexType::Unknown || m.end - m.start <= 1 {
            out.push(m);
            continue;
        }
        for pos in m.start..m.end {
            let ch = chars[pos - offset];
            let word_id = dict
                .char_def
                .categories(ch)
                .first()
                .and_then(|&cat| dict.unknown.entries(cat).first().copied())
                .unwrap_or(m.word.word_id);
            out.push(Morpheme {
                word: WordIdx::new(LexType::Unknown, word_id),
                inserted: false,
                start: pos,
                end: pos + 1,
            });
        }
    }
    out
}
