use crate::dict::{CharDefinitions, ConnectionCosts};
use crate::settings::PenaltySettings;

use super::lattice::LatticeNode;
use super::Mode;

/// Trait for scoring lattice paths.
pub(crate) trait CostFunction: Send + Sync {
    /// Cost of entering `node`, including any mode-specific penalty.
    fn word_cost(&self, node: &LatticeNode, chars: &[char]) -> i64;
    fn transition_cost(&self, prev: &LatticeNode, next: &LatticeNode) -> i64;
}

/// Extra cost for long words, so search mode prefers splitting compounds.
///
/// A kanji-only surface longer than the kanji threshold pays the kanji
/// penalty per extra char; any other surface longer than the other
/// threshold pays the other penalty per extra char.
pub(crate) fn length_penalty(
    penalty: &PenaltySettings,
    surface: &[char],
    char_def: &CharDefinitions,
) -> i64 {
    let len = surface.len();
    if len > penalty.kanji_length_threshold && surface.iter().all(|&c| char_def.is_kanji(c)) {
        (len - penalty.kanji_length_threshold) as i64 * penalty.kanji_penalty
    } else if len > penalty.other_length_threshold {
        (len - penalty.other_length_threshold) as i64 * penalty.other_penalty
    } else {
        0
    }
}

/// Word costs plus connection costs, with length penalties outside normal mode.
pub(crate) struct ModeCost<'a> {
    conn: &'a ConnectionCosts,
    char_def: &'a CharDefinitions,
    penalty: Option<PenaltySettings>,
}

impl<'a> ModeCost<'a> {
    pub fn new(
        conn: &'a ConnectionCosts,
        char_def: &'a CharDefinitions,
        mode: Mode,
        penalty: PenaltySettings,
    ) -> Self {
        Self {
            conn,
            char_def,
            penalty: (mode != Mode::Normal).then_some(penalty),
        }
    }

    /// Penalty part of [`CostFunction::word_cost`].
    pub fn penalty(&self, node: &LatticeNode, chars: &[char]) -> i64 {
        match (&self.penalty, node.kind.word()) {
            (Some(p), Some(_)) => length_penalty(p, &chars[node.start..node.end], self.char_def),
            _ => 0,
        }
    }
}

impl CostFunction for ModeCost<'_> {
    fn word_cost(&self, node: &LatticeNode, chars: &[char]) -> i64 {
        node.word_cost as i64 + self.penalty(node, chars)
    }

    fn transition_cost(&self, prev: &LatticeNode, next: &LatticeNode) -> i64 {
        self.conn.cost(prev.right_id, next.left_id) as i64
    }
}
