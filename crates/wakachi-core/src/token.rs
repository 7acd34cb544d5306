//! Tokens returned by the tokenizer.
//!
//! A [`Token`] borrows the input text and the dictionaries it came from;
//! features are resolved lazily from whichever store owns its word id.

use std::fmt;
use std::ops::Range;

use crate::dict::{Dictionary, LexType, WordIdx};
use crate::user_dict::UserDictionary;

const CONJUGATION_TYPE_INDEX: usize = 4;
const CONJUGATION_FORM_INDEX: usize = 5;
const BASE_FORM_INDEX: usize = 6;
const READING_INDEX: usize = 7;
const PRONUNCIATION_INDEX: usize = 8;

/// Where a token's entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TokenKind {
    Known,
    Unknown,
    User,
    /// Glue copied from an overlapping entry so a user match stays connected.
    Inserted,
}

#[derive(Clone)]
pub struct Token<'a> {
    surface: &'a str,
    start: usize,
    end: usize,
    byte_range: Range<usize>,
    word: WordIdx,
    kind: TokenKind,
    dict: &'a Dictionary,
    user: Option<&'a UserDictionary>,
}

impl<'a> Token<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        surface: &'a str,
        start: usize,
        end: usize,
        byte_range: Range<usize>,
        word: WordIdx,
        inserted: bool,
        dict: &'a Dictionary,
        user: Option<&'a UserDictionary>,
    ) -> Self {
        let kind = match (inserted, word.lex_type) {
            (true, _) => TokenKind::Inserted,
            (false, LexType::System) => TokenKind::Known,
            (false, LexType::Unknown) => TokenKind::Unknown,
            (false, LexType::User) => TokenKind::User,
        };
        Self {
            surface,
            start,
            end,
            byte_range,
            word,
            kind,
            dict,
            user,
        }
    }

    pub fn surface(&self) -> &'a str {
        self.surface
    }

    /// Char offset of the first char in the input.
    pub fn position(&self) -> usize {
        self.start
    }

    /// Char range in the input.
    pub fn char_range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.byte_range.clone()
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn is_known(&self) -> bool {
        self.kind == TokenKind::Known
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == TokenKind::Unknown
    }

    pub fn is_user(&self) -> bool {
        self.kind == TokenKind::User
    }

    pub fn is_inserted(&self) -> bool {
        self.kind == TokenKind::Inserted
    }

    pub fn word_idx(&self) -> WordIdx {
        self.word
    }

    pub fn word_id(&self) -> u32 {
        self.word.word_id
    }

    /// Feature `index`, or `None` past the end of the entry's features.
    pub fn feature(&self, index: usize) -> Option<&'a str> {
        let id = self.word.word_id;
        match self.word.lex_type {
            LexType::System => self.dict.token_info.feature(id, index),
            LexType::Unknown => self.dict.unknown.features(id).get(index).map(String::as_str),
            LexType::User => self
                .user
                .and_then(|u| u.piece(id))
                .and_then(|p| p.features.get(index))
                .map(String::as_str),
        }
    }

    pub fn features(&self) -> Vec<&'a str> {
        (0..).map_while(|i| self.feature(i)).collect()
    }

    /// Features joined by commas, in MeCab's output layout.
    pub fn all_features(&self) -> String {
        self.features().join(",")
    }

    /// Part-of-speech field `level` (1 to 4).
    pub fn part_of_speech_level(&self, level: usize) -> Option<&'a str> {
        match level {
            1..=4 => self.feature(level - 1),
            _ => None,
        }
    }

    pub fn part_of_speech(&self) -> Option<&'a str> {
        self.part_of_speech_level(1)
    }

    pub fn conjugation_type(&self) -> Option<&'a str> {
        self.feature(CONJUGATION_TYPE_INDEX)
    }

    pub fn conjugation_form(&self) -> Option<&'a str> {
        self.feature(CONJUGATION_FORM_INDEX)
    }

    pub fn base_form(&self) -> Option<&'a str> {
        self.feature(BASE_FORM_INDEX)
    }

    pub fn reading(&self) -> Option<&'a str> {
        self.feature(READING_INDEX)
    }

    pub fn pronunciation(&self) -> Option<&'a str> {
        self.feature(PRONUNCIATION_INDEX)
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("surface", &self.surface)
            .field("range", &(self.start..self.end))
            .field("kind", &self.kind)
            .field("word_id", &self.word.word_id)
            .finish()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.surface, self.all_features())
    }
}
