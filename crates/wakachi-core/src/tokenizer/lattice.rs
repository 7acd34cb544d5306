use tracing::{debug, debug_span};

use crate::dict::{Dictionary, LexType, WordIdx};
use crate::fst::Step;
use crate::user_dict::UserDictionary;

use super::Mode;

/// Best cost of a node no path reaches.
pub(crate) const UNREACHABLE: i64 = i64::MAX;

/// Where a lattice node comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Bos,
    Eos,
    Word(WordIdx),
    /// Synthetic glue copied from an overlapping node to keep user matches connected.
    Inserted(WordIdx),
}

impl NodeKind {
    pub fn word(&self) -> Option<WordIdx> {
        match *self {
            NodeKind::Word(w) | NodeKind::Inserted(w) => Some(w),
            NodeKind::Bos | NodeKind::Eos => None,
        }
    }
}

/// A candidate word spanning chars `start..end`.
#[derive(Debug, Clone)]
pub struct LatticeNode {
    pub kind: NodeKind,
    /// Start position (char index, inclusive)
    pub start: usize,
    /// End position (char index, exclusive)
    pub end: usize,
    pub left_id: u16,
    pub right_id: u16,
    pub word_cost: i32,
    /// Cheapest path cost from BOS through this node, or [`UNREACHABLE`].
    pub best_cost: i64,
    /// Predecessor on the cheapest path.
    pub prev: Option<usize>,
}

impl LatticeNode {
    fn new(kind: NodeKind, start: usize, end: usize, left_id: u16, right_id: u16, word_cost: i32) -> Self {
        Self {
            kind,
            start,
            end,
            left_id,
            right_id,
            word_cost,
            best_cost: UNREACHABLE,
            prev: None,
        }
    }

    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// All candidate segmentations of one clause.
///
/// Slot `k` of `nodes_by_start` holds nodes starting at char `k - 1` and
/// slot `k` of `nodes_by_end` holds nodes ending at char `k - 1`, so a node
/// in start slot `k` connects to every node in end slot `k`. BOS sits in
/// start slot 0 (and end slot 1); EOS sits in start slot `char_count + 1`.
pub struct Lattice<'t> {
    pub text: &'t str,
    pub chars: Vec<char>,
    /// Byte offset of every char, plus `text.len()`.
    pub byte_offsets: Vec<usize>,
    pub nodes: Vec<LatticeNode>,
    pub nodes_by_start: Vec<Vec<usize>>,
    pub nodes_by_end: Vec<Vec<usize>>,
    pub bos: usize,
    pub eos: usize,
}

impl<'t> Lattice<'t> {
    fn new(text: &'t str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        byte_offsets.push(text.len());
        let slots = chars.len() + 2;
        let mut lattice = Self {
            text,
            chars,
            byte_offsets,
            nodes: Vec::new(),
            nodes_by_start: vec![Vec::new(); slots],
            nodes_by_end: vec![Vec::new(); slots],
            bos: 0,
            eos: 0,
        };
        let mut bos = LatticeNode::new(NodeKind::Bos, 0, 0, 0, 0, 0);
        bos.best_cost = 0;
        lattice.nodes.push(bos);
        lattice.nodes_by_start[0].push(0);
        lattice.nodes_by_end[1].push(0);
        lattice
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    pub fn surface(&self, idx: usize) -> &'t str {
        let node = &self.nodes[idx];
        match node.kind {
            NodeKind::Bos | NodeKind::Eos => "",
            _ => &self.text[self.byte_offsets[node.start]..self.byte_offsets[node.end]],
        }
    }

    fn add(&mut self, node: LatticeNode) -> usize {
        let idx = self.nodes.len();
        self.nodes_by_start[node.start + 1].push(idx);
        self.nodes_by_end[node.end + 1].push(idx);
        self.nodes.push(node);
        idx
    }

    fn add_eos(&mut self) {
        let n = self.chars.len();
        let idx = self.nodes.len();
        self.nodes.push(LatticeNode::new(NodeKind::Eos, n, n, 0, 0, 0));
        self.nodes_by_start[n + 1].push(idx);
        self.eos = idx;
    }

    fn starts_at(&self, pos: usize) -> &[usize] {
        &self.nodes_by_start[pos + 1]
    }

    fn ends_at(&self, pos: usize) -> &[usize] {
        &self.nodes_by_end[pos + 1]
    }
}

/// Build the lattice for `text`: dictionary words, unknown words, then user entries.
pub(crate) fn build_lattice<'t>(
    dict: &Dictionary,
    user: Option<&UserDictionary>,
    mode: Mode,
    text: &'t str,
) -> Lattice<'t> {
    let mut lattice = Lattice::new(text);
    let char_count = lattice.char_count();
    let _span = debug_span!("build_lattice", char_count).entered();

    let mut unknown_end = 0;
    for pos in 0..char_count {
        if lattice.ends_at(pos).is_empty() {
            continue;
        }
        let found = add_known_words(&mut lattice, dict, pos);
        // Normal mode does not restart unknown words inside a previous unknown span.
        if mode != Mode::Normal || !found || pos >= unknown_end {
            if let Some(end) = add_unknown_words(&mut lattice, dict, pos, found) {
                unknown_end = end;
            }
        }
        if lattice.starts_at(pos).is_empty() {
            add_default_words(&mut lattice, dict, pos);
        }
    }

    if let Some(user) = user {
        add_user_words(&mut lattice, user);
    }
    lattice.add_eos();

    debug!(node_count = lattice.nodes.len());
    lattice
}

/// Extend the suffix at `pos` through the surface FST. Returns whether any word matched.
fn add_known_words(lattice: &mut Lattice<'_>, dict: &Dictionary, pos: usize) -> bool {
    let mut walker = dict.surfaces.walker();
    let mut found = false;
    for end in pos + 1..=lattice.char_count() {
        match walker.step(lattice.chars[end - 1]) {
            Step::Dead => break,
            Step::Prefix => {}
            Step::Match(surface_id) => {
                for &word_id in dict.token_info.targets(surface_id) {
                    let Some(param) = dict.token_info.param(word_id) else {
                        continue;
                    };
                    let kind = NodeKind::Word(WordIdx::new(LexType::System, word_id));
                    lattice.add(LatticeNode::new(
                        kind,
                        pos,
                        end,
                        param.left_id,
                        param.right_id,
                        param.cost,
                    ));
                    found = true;
                }
            }
        }
    }
    found
}

/// Emit unknown words for the categories of the char at `pos`.
/// Returns the end of the last unknown word emitted.
fn add_unknown_words(
    lattice: &mut Lattice<'_>,
    dict: &Dictionary,
    pos: usize,
    found: bool,
) -> Option<usize> {
    let ch = lattice.chars[pos];
    let mut last_end = None;
    for &cat in dict.char_def.categories(ch) {
        let Some(category) = dict.char_def.category(cat) else {
            continue;
        };
        if found && !category.invoke {
            continue;
        }
        let len = if category.group {
            1 + lattice.chars[pos + 1..]
                .iter()
                .take_while(|&&c| dict.char_def.has_category(c, cat))
                .count()
        } else {
            1
        };
        for &entry in dict.unknown.entries(cat) {
            if let Some(param) = dict.unknown.param(entry) {
                let kind = NodeKind::Word(WordIdx::new(LexType::Unknown, entry));
                lattice.add(LatticeNode::new(
                    kind,
                    pos,
                    pos + len,
                    param.left_id,
                    param.right_id,
                    param.cost,
                ));
                last_end = Some(pos + len);
            }
        }
    }
    last_end
}

/// Connectivity fallback: single-char DEFAULT unknown words.
fn add_default_words(lattice: &mut Lattice<'_>, dict: &Dictionary, pos: usize) {
    let default = dict.char_def.default_category();
    for &entry in dict.unknown.entries(default) {
        if let Some(param) = dict.unknown.param(entry) {
            let kind = NodeKind::Word(WordIdx::new(LexType::Unknown, entry));
            lattice.add(LatticeNode::new(
                kind,
                pos,
                pos + 1,
                param.left_id,
                param.right_id,
                param.cost,
            ));
        }
    }
}

fn add_user_words(lattice: &mut Lattice<'_>, user: &UserDictionary) {
    let matches = user.find_matches(lattice.text);
    for m in matches {
        let Some(first) = user.first_word_id(m.entry) else {
            continue;
        };
        let mut pos = m.start;
        for (i, piece) in user.pieces(m.entry).iter().enumerate() {
            let kind = NodeKind::Word(WordIdx::new(LexType::User, first + i as u32));
            lattice.add(LatticeNode::new(
                kind,
                pos,
                pos + piece.char_len,
                piece.left_id,
                piece.right_id,
                piece.cost,
            ));
            pos += piece.char_len;
        }
        if m.start > 0 && lattice.ends_at(m.start).is_empty() {
            repair_before(lattice, m.start);
        }
        if pos < lattice.char_count() && lattice.starts_at(pos).is_empty() {
            repair_after(lattice, pos);
        }
    }
}

/// Glue a prefix of the shortest node starting before `at` that reaches it.
fn repair_before(lattice: &mut Lattice<'_>, at: usize) {
    for start in (0..at).rev() {
        let gap = at - start;
        if let Some(base) = shortest_candidate(lattice, lattice.starts_at(start), gap) {
            glue(lattice, base, start, at);
            return;
        }
    }
}

/// Glue a suffix of the shortest node ending after `at` that reaches back to it.
fn repair_after(lattice: &mut Lattice<'_>, at: usize) {
    for end in at + 1..=lattice.char_count() {
        let gap = end - at;
        if let Some(base) = shortest_candidate(lattice, lattice.ends_at(end), gap) {
            glue(lattice, base, at, end);
            return;
        }
    }
}

fn shortest_candidate(lattice: &Lattice<'_>, nodes: &[usize], min_len: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &idx in nodes {
        let node = &lattice.nodes[idx];
        if node.kind.word().is_none() || node.char_len() < min_len {
            continue;
        }
        if best.map_or(true, |b| node.char_len() < lattice.nodes[b].char_len()) {
            best = Some(idx);
        }
    }
    best
}

fn glue(lattice: &mut Lattice<'_>, base: usize, start: usize, end: usize) {
    let b = &lattice.nodes[base];
    let Some(word) = b.kind.word() else {
        return;
    };
    let node = LatticeNode::new(
        NodeKind::Inserted(word),
        start,
        end,
        b.left_id,
        b.right_id,
        b.word_cost,
    );
    lattice.add(node);
}
