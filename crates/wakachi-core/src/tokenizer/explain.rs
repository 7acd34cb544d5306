use serde::Serialize;

use crate::dict::{LexType, WordIdx};

use super::cost::{CostFunction, ModeCost};
use super::lattice::{build_lattice, Lattice, LatticeNode, NodeKind, UNREACHABLE};
use super::split::Clause;
use super::viterbi::{best_path, forward};
use super::{Mode, Tokenizer};

/// Full diagnostic result for one input.
#[derive(Debug, Serialize)]
pub struct ExplainResult {
    pub text: String,
    pub mode: Mode,
    pub clauses: Vec<ExplainClause>,
    /// Sum of the clause costs.
    pub total_cost: i64,
}

/// Lattice and best path of one clause. Offsets are chars of the whole input.
#[derive(Debug, Serialize)]
pub struct ExplainClause {
    pub text: String,
    pub char_offset: usize,
    pub lattice_char_count: usize,
    pub lattice_nodes: Vec<ExplainNode>,
    pub best_path: Vec<ExplainToken>,
    /// Best cost at EOS, including the final connection.
    pub cost: i64,
}

/// A lattice node for diagnostic display.
#[derive(Debug, Serialize)]
pub struct ExplainNode {
    pub start: usize,
    pub end: usize,
    pub surface: String,
    pub kind: &'static str,
    pub word: Option<WordIdx>,
    pub left_id: u16,
    pub right_id: u16,
    pub word_cost: i32,
    /// `None` when no path reaches the node.
    pub best_cost: Option<i64>,
}

/// A token of the best path with its cost breakdown.
#[derive(Debug, Serialize)]
pub struct ExplainToken {
    pub start: usize,
    pub end: usize,
    pub surface: String,
    pub word: WordIdx,
    pub inserted: bool,
    pub features: Vec<String>,
    pub word_cost: i64,
    pub length_penalty: i64,
    /// Connection cost from BOS or the previous token.
    pub connection_cost: i64,
    pub cumulative_cost: i64,
}

fn kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Bos => "bos",
        NodeKind::Eos => "eos",
        NodeKind::Word(w) => match w.lex_type {
            LexType::System => "known",
            LexType::Unknown => "unknown",
            LexType::User => "user",
        },
        NodeKind::Inserted(_) => "inserted",
    }
}

fn explain_node(lattice: &Lattice<'_>, idx: usize, offset: usize) -> ExplainNode {
    let n: &LatticeNode = &lattice.nodes[idx];
    ExplainNode {
        start: n.start + offset,
        end: n.end + offset,
        surface: lattice.surface(idx).to_string(),
        kind: kind_label(n.kind),
        word: n.kind.word(),
        left_id: n.left_id,
        right_id: n.right_id,
        word_cost: n.word_cost,
        best_cost: (n.best_cost != UNREACHABLE).then_some(n.best_cost),
    }
}

pub(super) fn explain(tokenizer: &Tokenizer, text: &str, clauses: &[Clause<'_>]) -> ExplainResult {
    let dict = tokenizer.dictionary();
    let cost_fn = ModeCost::new(
        dict.connection(),
        dict.char_def(),
        tokenizer.mode,
        tokenizer.penalty,
    );

    let mut explained = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let mut lattice = build_lattice(
            dict,
            tokenizer.user.as_deref(),
            tokenizer.mode,
            clause.text,
        );
        forward(&mut lattice, &cost_fn);
        let offset = clause.char_offset;

        let mut prev = lattice.bos;
        let mut best = Vec::new();
        for idx in best_path(&lattice) {
            let node = &lattice.nodes[idx];
            let Some(word) = node.kind.word() else {
                continue;
            };
            let penalty = cost_fn.penalty(node, &lattice.chars);
            best.push(ExplainToken {
                start: node.start + offset,
                end: node.end + offset,
                surface: lattice.surface(idx).to_string(),
                word,
                inserted: matches!(node.kind, NodeKind::Inserted(_)),
                features: tokenizer
                    .features_of(word)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                word_cost: node.word_cost as i64,
                length_penalty: penalty,
                connection_cost: cost_fn.transition_cost(&lattice.nodes[prev], node),
                cumulative_cost: node.best_cost,
            });
            prev = idx;
        }

        explained.push(ExplainClause {
            text: clause.text.to_string(),
            char_offset: offset,
            lattice_char_count: lattice.char_count(),
            lattice_nodes: (0..lattice.nodes.len())
                .map(|idx| explain_node(&lattice, idx, offset))
                .collect(),
            best_path: best,
            cost: lattice.nodes[lattice.eos].best_cost,
        });
    }

    ExplainResult {
        text: text.to_string(),
        mode: tokenizer.mode,
        total_cost: explained
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(c.cost)),
        clauses: explained,
    }
}
