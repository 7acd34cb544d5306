//! System dictionary artifacts and their binary formats.
//!
//! A compiled dictionary is a directory of flat files: the surface FST,
//! the token info store (records, part-of-speech table, feature strings,
//! surface → word targets), the connection cost matrix, character
//! definitions and the unknown-word table. [`Dictionary`] loads them all
//! or fails.

pub mod builder;
pub mod character;
pub mod connection;
mod connection_io;
mod entry;
mod framing;
pub mod token_info;
mod token_info_io;
pub mod unknown;

pub use builder::DictSources;
pub use character::{CategoryId, CharCategory, CharDefinitions};
pub use connection::ConnectionCosts;
pub use entry::DictEntry;
pub use token_info::TokenInfo;
pub use token_info_io::TokenInfoBytes;
pub use unknown::UnknownDictionary;

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, debug_span};

use crate::fst::{Fst, FstError};

pub const SURFACE_FST_FILE: &str = "surface.fst";
pub const CONNECTION_FILE: &str = "connection.bin";
pub const TOKEN_INFO_FILE: &str = "token_info.bin";
pub const TOKEN_INFO_POS_FILE: &str = "token_info_pos.bin";
pub const TOKEN_INFO_FEATURES_FILE: &str = "token_info_features.bin";
pub const TOKEN_INFO_TARGETS_FILE: &str = "token_info_targets.bin";
pub const CHAR_DEF_FILE: &str = "char_def.bin";
pub const UNKNOWN_FILE: &str = "unknown.bin";

/// Every file a compiled dictionary directory must contain.
pub const ARTIFACT_FILES: [&str; 8] = [
    SURFACE_FST_FILE,
    CONNECTION_FILE,
    TOKEN_INFO_FILE,
    TOKEN_INFO_POS_FILE,
    TOKEN_INFO_FEATURES_FILE,
    TOKEN_INFO_TARGETS_FILE,
    CHAR_DEF_FILE,
    UNKNOWN_FILE,
];

/// Unified error type for dictionary artifacts and text sources.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("missing dictionary artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected {expected})")]
    InvalidMagic { expected: &'static str },

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("truncated {what}")]
    Truncated { what: &'static str },

    #[error("checksum mismatch in {what}")]
    ChecksumMismatch { what: &'static str },

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("surface index error: {0}")]
    Fst(#[from] FstError),
}

/// Which store owns a word id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum LexType {
    System,
    Unknown,
    User,
}

/// A word id qualified by its owning store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct WordIdx {
    pub lex_type: LexType,
    pub word_id: u32,
}

impl WordIdx {
    pub const fn new(lex_type: LexType, word_id: u32) -> Self {
        Self { lex_type, word_id }
    }
}

/// Connection and cost attributes shared by every dictionary entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordParam {
    pub left_id: u16,
    pub right_id: u16,
    pub cost: i32,
}

/// A complete, read-only system dictionary.
pub struct Dictionary {
    pub(crate) surfaces: Fst,
    pub(crate) token_info: TokenInfo,
    pub(crate) connection: ConnectionCosts,
    pub(crate) char_def: CharDefinitions,
    pub(crate) unknown: UnknownDictionary,
}

impl Dictionary {
    /// Assemble a dictionary from already-built parts.
    pub fn from_parts(
        surfaces: Fst,
        token_info: TokenInfo,
        connection: ConnectionCosts,
        char_def: CharDefinitions,
        unknown: UnknownDictionary,
    ) -> Self {
        Self {
            surfaces,
            token_info,
            connection,
            char_def,
            unknown,
        }
    }

    /// Load every artifact from a compiled dictionary directory.
    ///
    /// The token info records and the connection matrix are memory-mapped.
    pub fn open(dir: &Path) -> Result<Self, DictError> {
        let _span = debug_span!("dict_open", dir = %dir.display()).entered();
        for name in ARTIFACT_FILES {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(DictError::MissingArtifact { path });
            }
        }
        let surfaces = Fst::open(&dir.join(SURFACE_FST_FILE))?;
        let token_info = TokenInfo::open(dir)?;
        let connection = ConnectionCosts::open(&dir.join(CONNECTION_FILE))?;
        let char_def = CharDefinitions::open(&dir.join(CHAR_DEF_FILE))?;
        let unknown = UnknownDictionary::open(&dir.join(UNKNOWN_FILE))?;
        unknown.check_against(&char_def)?;
        unknown.check_context_ids(connection.cardinality())?;
        debug!(
            words = token_info.len(),
            unknown_entries = unknown.len(),
            cardinality = connection.cardinality()
        );
        Ok(Self::from_parts(
            surfaces, token_info, connection, char_def, unknown,
        ))
    }

    /// Write every artifact into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<(), DictError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(SURFACE_FST_FILE), self.surfaces.as_bytes())?;
        self.token_info.save(dir)?;
        self.connection.save(&dir.join(CONNECTION_FILE))?;
        self.char_def.save(&dir.join(CHAR_DEF_FILE))?;
        self.unknown.save(&dir.join(UNKNOWN_FILE))?;
        Ok(())
    }

    pub fn surfaces(&self) -> &Fst {
        &self.surfaces
    }

    pub fn token_info(&self) -> &TokenInfo {
        &self.token_info
    }

    pub fn connection(&self) -> &ConnectionCosts {
        &self.connection
    }

    pub fn char_def(&self) -> &CharDefinitions {
        &self.char_def
    }

    pub fn unknown(&self) -> &UnknownDictionary {
        &self.unknown
    }

    /// Entry attributes for a system or unknown word id.
    ///
    /// User word ids are resolved by [`crate::UserDictionary`] instead.
    pub fn word_param(&self, word: WordIdx) -> Option<WordParam> {
        match word.lex_type {
            LexType::System => self.token_info.param(word.word_id),
            LexType::Unknown => self.unknown.param(word.word_id),
            LexType::User => None,
        }
    }
}
