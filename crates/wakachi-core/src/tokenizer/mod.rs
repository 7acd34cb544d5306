//! Tokenization via lattice construction and Viterbi search.
//!
//! Each clause of the input gets its own lattice of known, unknown and user
//! words. The cheapest path is found by Viterbi; ranked alternatives come
//! from the sidetrack search in [`multi_path`] and are recombined across
//! clauses by [`merge`].

pub(crate) mod cost;
mod explain;
mod lattice;
mod merge;
mod multi_path;
mod split;
mod viterbi;

#[cfg(test)]
pub(crate) mod testutil;
#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::dict::{DictError, Dictionary, LexType, WordIdx};
use crate::settings::{settings, PenaltySettings};
use crate::token::Token;
use crate::user_dict::{UserDictError, UserDictionary};

use cost::ModeCost;
use lattice::build_lattice;
use merge::{merge_clauses, Scored};
use split::{split_clauses, whole, Clause};
use viterbi::{best_path, forward, split_unknown, to_morphemes, Morpheme};

pub use explain::{ExplainClause, ExplainNode, ExplainResult, ExplainToken};

/// Segmentation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain lowest-cost segmentation.
    #[default]
    Normal,
    /// Long words pay a length penalty, so compounds split into their parts.
    Search,
    /// Search mode, plus unknown words are emitted one char at a time.
    Extended,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Normal => "normal",
            Mode::Search => "search",
            Mode::Extended => "extended",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mode '{0}' (expected normal, search or extended)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "search" => Ok(Mode::Search),
            "extended" => Ok(Mode::Extended),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    #[error("dictionary error: {0}")]
    Dict(#[from] DictError),

    #[error("user dictionary error: {0}")]
    UserDict(#[from] UserDictError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A segmentation and its total path cost.
#[derive(Debug, Clone)]
pub struct Tokenization<'a> {
    pub tokens: Vec<Token<'a>>,
    pub cost: i64,
}

/// Read-only analyzer shared across threads; every call builds its own lattices.
#[derive(Clone)]
pub struct Tokenizer {
    dict: Arc<Dictionary>,
    user: Option<Arc<UserDictionary>>,
    mode: Mode,
    penalty: PenaltySettings,
    split_clauses: bool,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("mode", &self.mode)
            .field("user_dict_entries", &self.user.as_ref().map(|u| u.len()))
            .field("split_clauses", &self.split_clauses)
            .finish()
    }
}

/// Configures a [`Tokenizer`]; unset values come from [`settings()`].
pub struct TokenizerBuilder {
    dict: Arc<Dictionary>,
    user: Option<Arc<UserDictionary>>,
    mode: Mode,
    penalty: PenaltySettings,
    split_clauses: bool,
}

impl TokenizerBuilder {
    pub fn new(dict: Arc<Dictionary>) -> Self {
        let s = settings();
        Self {
            dict,
            user: None,
            mode: s.tokenizer.mode,
            penalty: s.penalty,
            split_clauses: s.tokenizer.split_clauses,
        }
    }

    pub fn user_dictionary(mut self, user: Arc<UserDictionary>) -> Self {
        self.user = Some(user);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn penalty(mut self, penalty: PenaltySettings) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn split_clauses(mut self, split: bool) -> Self {
        self.split_clauses = split;
        self
    }

    pub fn build(self) -> Tokenizer {
        Tokenizer {
            dict: self.dict,
            user: self.user,
            mode: self.mode,
            penalty: self.penalty,
            split_clauses: self.split_clauses,
        }
    }
}

impl Tokenizer {
    /// Load a compiled dictionary directory and an optional user dictionary CSV.
    pub fn open(dir: &Path, user_dict: Option<&Path>, mode: Mode) -> Result<Self, TokenizerError> {
        let dict = Dictionary::open(dir)?;
        let mut builder = Self::builder(Arc::new(dict)).mode(mode);
        if let Some(path) = user_dict {
            builder = builder.user_dictionary(Arc::new(UserDictionary::open(path)?));
        }
        Ok(builder.build())
    }

    /// A tokenizer with the configured defaults and no user dictionary.
    pub fn new(dict: Dictionary) -> Self {
        Self::builder(Arc::new(dict)).build()
    }

    pub fn builder(dict: Arc<Dictionary>) -> TokenizerBuilder {
        TokenizerBuilder::new(dict)
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn user_dictionary(&self) -> Option<&UserDictionary> {
        self.user.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Best segmentation of `text`. Empty input gives no tokens.
    pub fn tokenize<'a>(&'a self, text: &'a str) -> Vec<Token<'a>> {
        self.tokenize_with_cost(text).tokens
    }

    /// Best segmentation of `text` with its total path cost.
    pub fn tokenize_with_cost<'a>(&'a self, text: &'a str) -> Tokenization<'a> {
        let _span = debug_span!("tokenize", mode = %self.mode, len = text.len()).entered();
        let mut morphemes = Vec::new();
        let mut cost = 0i64;
        for clause in self.clauses(text) {
            let (m, c) = self.best_clause(&clause);
            morphemes.extend(m);
            cost = cost.saturating_add(c);
        }
        Tokenization {
            tokens: self.to_tokens(text, &morphemes),
            cost,
        }
    }

    /// Up to `max_count` segmentations in ascending cost order, none costing
    /// more than the best plus `cost_slack`. The first is [`Self::tokenize`]'s.
    pub fn multi_tokenize<'a>(
        &'a self,
        text: &'a str,
        max_count: usize,
        cost_slack: i64,
    ) -> Vec<Vec<Token<'a>>> {
        self.multi_tokenize_with_costs(text, max_count, cost_slack)
            .into_iter()
            .map(|t| t.tokens)
            .collect()
    }

    pub fn multi_tokenize_with_costs<'a>(
        &'a self,
        text: &'a str,
        max_count: usize,
        cost_slack: i64,
    ) -> Vec<Tokenization<'a>> {
        let _span = debug_span!("multi_tokenize", mode = %self.mode, max_count, cost_slack).entered();
        if max_count == 0 {
            return Vec::new();
        }
        let clauses = self.clauses(text);
        if clauses.is_empty() {
            return vec![Tokenization {
                tokens: Vec::new(),
                cost: 0,
            }];
        }
        let per_clause: Vec<Vec<Scored>> = clauses
            .iter()
            .map(|clause| self.multi_clause(clause, max_count, cost_slack))
            .collect();
        let merged = merge_clauses(per_clause, max_count, cost_slack);
        debug!(result_count = merged.len());
        merged
            .into_iter()
            .map(|(morphemes, cost)| Tokenization {
                tokens: self.to_tokens(text, &morphemes),
                cost,
            })
            .collect()
    }

    /// Lattice and cost breakdown of the best segmentation.
    pub fn explain(&self, text: &str) -> ExplainResult {
        explain::explain(self, text, &self.clauses(text))
    }

    fn clauses<'t>(&self, text: &'t str) -> Vec<Clause<'t>> {
        if self.split_clauses {
            split_clauses(text)
        } else {
            whole(text)
        }
    }

    fn cost_fn(&self) -> ModeCost<'_> {
        ModeCost::new(
            self.dict.connection(),
            self.dict.char_def(),
            self.mode,
            self.penalty,
        )
    }

    fn best_clause(&self, clause: &Clause<'_>) -> (Vec<Morpheme>, i64) {
        let cost_fn = self.cost_fn();
        let mut lattice = build_lattice(&self.dict, self.user.as_deref(), self.mode, clause.text);
        forward(&mut lattice, &cost_fn);
        let cost = lattice.nodes[lattice.eos].best_cost;
        debug_assert!(cost != lattice::UNREACHABLE, "EOS must be reachable");
        let morphemes = to_morphemes(&lattice, &best_path(&lattice), clause.char_offset);
        (self.finish(morphemes, &lattice.chars, clause.char_offset), cost)
    }

    /// Ranked segmentations of one clause. Paths that turn into the same
    /// morphemes after [`Self::finish`] are reported once, at their lowest cost.
    fn multi_clause(&self, clause: &Clause<'_>, max_count: usize, cost_slack: i64) -> Vec<Scored> {
        let _span = debug_span!("multi_clause", max_count, cost_slack).entered();
        let cost_fn = self.cost_fn();
        let mut lattice = build_lattice(&self.dict, self.user.as_deref(), self.mode, clause.text);
        forward(&mut lattice, &cost_fn);

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        let mut pulled = 0usize;
        for (path, cost) in multi_path::paths(&lattice, &cost_fn, cost_slack) {
            pulled += 1;
            let morphemes = to_morphemes(&lattice, &path, clause.char_offset);
            let morphemes = self.finish(morphemes, &lattice.chars, clause.char_offset);
            if !seen.insert(morphemes.clone()) {
                continue;
            }
            results.push((morphemes, cost));
            if results.len() >= max_count {
                break;
            }
        }
        debug!(pulled, result_count = results.len());
        results
    }

    fn finish(&self, morphemes: Vec<Morpheme>, chars: &[char], offset: usize) -> Vec<Morpheme> {
        if self.mode == Mode::Extended {
            split_unknown(&self.dict, morphemes, chars, offset)
        } else {
            morphemes
        }
    }

    fn to_tokens<'a>(&'a self, text: &'a str, morphemes: &[Morpheme]) -> Vec<Token<'a>> {
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        morphemes
            .iter()
            .map(|m| {
                let range = bounds[m.start]..bounds[m.end];
                Token::new(
                    &text[range.clone()],
                    m.start,
                    m.end,
                    range,
                    m.word,
                    m.inserted,
                    &self.dict,
                    self.user.as_deref(),
                )
            })
            .collect()
    }

    /// Features of a word from whichever store owns it.
    pub(crate) fn features_of(&self, word: WordIdx) -> Vec<&str> {
        match word.lex_type {
            LexType::System => self.dict.token_info.features(word.word_id),
            LexType::Unknown => self
                .dict
                .unknown
                .features(word.word_id)
                .iter()
                .map(String::as_str)
                .collect(),
            LexType::User => self
                .user
                .as_deref()
                .and_then(|u| u.piece(word.word_id))
                .map(|p| p.features.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }
}
