//! Caller-supplied user dictionary.
//!
//! Each CSV line is `surface,segmentation,readings,part_of_speech`, where
//! segmentation and readings are space-separated and must line up piece by
//! piece. A matched surface becomes one lattice node per piece, priced low
//! enough (by default) to beat anything the system dictionary offers.

mod patricia;

pub use patricia::PatriciaTrie;

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, debug_span};

use crate::csv::parse_row;
use crate::settings::{settings, UserDictSettings};

/// Features per piece, in the IPADIC layout.
const FEATURE_COUNT: usize = 9;
const BASE_FORM_INDEX: usize = 6;
const READING_INDEX: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum UserDictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("user dictionary line {line}: {kind}")]
    Line { line: usize, kind: UserDictErrorKind },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UserDictErrorKind {
    #[error("malformed CSV")]
    MalformedCsv,

    #[error("expected 4 fields, got {0}")]
    FieldCount(usize),

    #[error("empty surface")]
    EmptySurface,

    #[error("segmentation '{segmentation}' does not spell surface '{surface}'")]
    SegmentationMismatch {
        surface: String,
        segmentation: String,
    },

    #[error("{pieces} pieces but {readings} readings")]
    ReadingCount { pieces: usize, readings: usize },

    #[error("duplicate surface '{0}'")]
    Duplicate(String),
}

/// One segment of a user entry; its index in the dictionary is its word id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPiece {
    pub surface: String,
    pub reading: String,
    pub char_len: usize,
    pub left_id: u16,
    pub right_id: u16,
    pub cost: i32,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub surface: String,
    pub part_of_speech: String,
    first_piece: u32,
    piece_count: u32,
}

/// Longest user entry starting at a char offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserMatch {
    pub start: usize,
    pub entry: u32,
}

#[derive(Debug)]
pub struct UserDictionary {
    trie: PatriciaTrie<u32>,
    entries: Vec<UserEntry>,
    pieces: Vec<UserPiece>,
}

impl UserDictionary {
    /// Parse CSV using the global user dictionary settings.
    pub fn from_csv(text: &str) -> Result<Self, UserDictError> {
        Self::from_csv_with(text, &settings().user_dict)
    }

    /// Parse CSV with explicit cost and context-id parameters.
    ///
    /// Any malformed line aborts the whole build.
    pub fn from_csv_with(text: &str, params: &UserDictSettings) -> Result<Self, UserDictError> {
        let _span = debug_span!("user_dict_build").entered();
        let mut dict = Self {
            trie: PatriciaTrie::new(),
            entries: Vec::new(),
            pieces: Vec::new(),
        };
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            dict.add_line(line, params)
                .map_err(|kind| UserDictError::Line { line: i + 1, kind })?;
        }
        debug!(entries = dict.entries.len(), pieces = dict.pieces.len());
        Ok(dict)
    }

    pub fn open(path: &Path) -> Result<Self, UserDictError> {
        Self::from_csv(&fs::read_to_string(path)?)
    }

    fn add_line(&mut self, line: &str, params: &UserDictSettings) -> Result<(), UserDictErrorKind> {
        let fields = parse_row(line).ok_or(UserDictErrorKind::MalformedCsv)?;
        if fields.len() != 4 {
            return Err(UserDictErrorKind::FieldCount(fields.len()));
        }
        let surface = fields[0].trim();
        if surface.is_empty() {
            return Err(UserDictErrorKind::EmptySurface);
        }
        let segments: Vec<&str> = fields[1].split_whitespace().collect();
        let readings: Vec<&str> = fields[2].split_whitespace().collect();
        if segments.concat() != surface {
            return Err(UserDictErrorKind::SegmentationMismatch {
                surface: surface.to_string(),
                segmentation: fields[1].clone(),
            });
        }
        if segments.len() != readings.len() {
            return Err(UserDictErrorKind::ReadingCount {
                pieces: segments.len(),
                readings: readings.len(),
            });
        }
        if self.trie.get(surface).is_some() {
            return Err(UserDictErrorKind::Duplicate(surface.to_string()));
        }

        let pos = fields[3].trim();
        let cost = piece_cost(surface.chars().count(), params);
        let first_piece = self.pieces.len() as u32;
        for (segment, reading) in segments.iter().zip(&readings) {
            let mut features = vec!["*".to_string(); FEATURE_COUNT];
            features[0] = pos.to_string();
            features[BASE_FORM_INDEX] = segment.to_string();
            features[READING_INDEX] = reading.to_string();
            self.pieces.push(UserPiece {
                surface: segment.to_string(),
                reading: reading.to_string(),
                char_len: segment.chars().count(),
                left_id: params.left_id,
                right_id: params.right_id,
                cost,
                features,
            });
        }
        let entry = self.entries.len() as u32;
        self.entries.push(UserEntry {
            surface: surface.to_string(),
            part_of_speech: pos.to_string(),
            first_piece,
            piece_count: segments.len() as u32,
        });
        self.trie.insert(surface, entry);
        Ok(())
    }

    /// Longest entry at every char offset of `text`. Matches may overlap.
    pub fn find_matches(&self, text: &str) -> Vec<UserMatch> {
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        let mut matches = Vec::new();
        for start in 0..bounds.len().saturating_sub(1) {
            let mut longest = None;
            for end in start + 1..bounds.len() {
                let candidate = &text[bounds[start]..bounds[end]];
                if !self.trie.contains_key_prefix(candidate) {
                    break;
                }
                if let Some(&entry) = self.trie.get(candidate) {
                    longest = Some(entry);
                }
            }
            if let Some(entry) = longest {
                matches.push(UserMatch { start, entry });
            }
        }
        matches
    }

    pub fn entry(&self, entry: u32) -> Option<&UserEntry> {
        self.entries.get(entry as usize)
    }

    /// Pieces of an entry; their word ids are `first_word_id(entry)..`.
    pub fn pieces(&self, entry: u32) -> &[UserPiece] {
        self.entries
            .get(entry as usize)
            .and_then(|e| {
                let from = e.first_piece as usize;
                self.pieces.get(from..from + e.piece_count as usize)
            })
            .unwrap_or(&[])
    }

    pub fn first_word_id(&self, entry: u32) -> Option<u32> {
        self.entries.get(entry as usize).map(|e| e.first_piece)
    }

    /// Piece by word id.
    pub fn piece(&self, word_id: u32) -> Option<&UserPiece> {
        self.pieces.get(word_id as usize)
    }

    pub fn lookup(&self, surface: &str) -> Option<&UserEntry> {
        self.trie.get(surface).and_then(|&e| self.entry(e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `max(char_len * word_cost_base, minimum_word_cost)`, kept inside i32.
fn piece_cost(char_len: usize, params: &UserDictSettings) -> i32 {
    let raw = (char_len as i64).saturating_mul(params.word_cost_base as i64);
    raw.max(params.minimum_word_cost as i64)
        .min(i32::MAX as i64) as i32
}
