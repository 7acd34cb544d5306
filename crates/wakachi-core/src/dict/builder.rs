//! Compile MeCab/IPADIC text sources into a [`Dictionary`].
//!
//! Sources must be UTF-8. Lexicon rows are
//! `surface,left_id,right_id,cost,feature...`.

use std::fs;
use std::path::Path;

use tracing::{debug, debug_span};

use super::character::CharDefinitions;
use super::connection::ConnectionCosts;
use super::entry::DictEntry;
use super::token_info::{TokenInfo, IPADIC_POS_COUNT};
use super::unknown::UnknownDictionary;
use super::{DictError, Dictionary};
use crate::csv::parse_row;
use crate::fst::FstBuilder;

/// Text sources of a dictionary, already read into memory.
#[derive(Debug, Clone, Copy)]
pub struct DictSources<'a> {
    /// Lexicon CSV files; rows from all of them are merged.
    pub lexicon: &'a [&'a str],
    pub matrix_def: &'a str,
    pub char_def: &'a str,
    pub unk_def: &'a str,
}

/// Parse lexicon CSV rows.
pub fn parse_lexicon(text: &str) -> Result<Vec<DictEntry>, DictError> {
    let mut entries = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let err = |msg: String| DictError::Parse(format!("lexicon line {}: {msg}", lineno + 1));
        let fields = parse_row(line).ok_or_else(|| err("malformed CSV".to_string()))?;
        if fields.len() < 4 {
            return Err(err(format!("expected at least 4 fields, got {}", fields.len())));
        }
        if fields[0].is_empty() {
            return Err(err("empty surface".to_string()));
        }
        entries.push(DictEntry {
            surface: fields[0].clone(),
            left_id: fields[1].parse().map_err(|e| err(format!("left id: {e}")))?,
            right_id: fields[2].parse().map_err(|e| err(format!("right id: {e}")))?,
            cost: fields[3].parse().map_err(|e| err(format!("cost: {e}")))?,
            features: fields[4..].to_vec(),
        });
    }
    Ok(entries)
}

impl Dictionary {
    /// Build a dictionary from in-memory text sources.
    pub fn from_sources(sources: &DictSources<'_>) -> Result<Self, DictError> {
        let _span = debug_span!("dict_compile").entered();

        let connection = ConnectionCosts::from_text(sources.matrix_def)?;
        let char_def = CharDefinitions::from_text(sources.char_def)?;
        let unknown = UnknownDictionary::from_text(sources.unk_def, &char_def)?;

        let mut entries = Vec::new();
        for text in sources.lexicon {
            entries.extend(parse_lexicon(text)?);
        }
        let cardinality = connection.cardinality();
        unknown.check_context_ids(cardinality)?;
        if let Some(bad) = entries
            .iter()
            .find(|e| e.left_id as usize >= cardinality || e.right_id as usize >= cardinality)
        {
            return Err(DictError::Parse(format!(
                "lexicon entry '{}' uses context ids ({}, {}) outside the {cardinality}x{cardinality} matrix",
                bad.surface, bad.left_id, bad.right_id
            )));
        }

        // Stable: entries sharing a surface keep their source order.
        entries.sort_by(|a, b| a.surface.encode_utf16().cmp(b.surface.encode_utf16()));

        let mut surfaces: Vec<&str> = Vec::new();
        let mut targets: Vec<Vec<u32>> = Vec::new();
        for (word_id, entry) in entries.iter().enumerate() {
            if surfaces.last() != Some(&entry.surface.as_str()) {
                surfaces.push(&entry.surface);
                targets.push(Vec::new());
            }
            if let Some(t) = targets.last_mut() {
                t.push(word_id as u32);
            }
        }

        let fst = FstBuilder::build(surfaces.iter().copied())?;
        let token_info = TokenInfo::build(&entries, &targets, IPADIC_POS_COUNT)?;
        debug!(
            words = entries.len(),
            surfaces = surfaces.len(),
            fst_bytes = fst.as_bytes().len()
        );
        Ok(Self::from_parts(fst, token_info, connection, char_def, unknown))
    }

    /// Compile a MeCab source directory: every `*.csv` lexicon file plus
    /// `matrix.def`, `char.def` and `unk.def`.
    pub fn compile_dir(src: &Path) -> Result<Self, DictError> {
        let mut csv_paths: Vec<_> = fs::read_dir(src)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        csv_paths.sort();
        if csv_paths.is_empty() {
            return Err(DictError::MissingArtifact {
                path: src.join("*.csv"),
            });
        }
        let lexicon: Vec<String> = csv_paths
            .iter()
            .map(fs::read_to_string)
            .collect::<Result<_, _>>()?;
        let lexicon_refs: Vec<&str> = lexicon.iter().map(String::as_str).collect();

        let read = |name: &str| {
            let path = src.join(name);
            if !path.is_file() {
                return Err(DictError::MissingArtifact { path });
            }
            Ok(fs::read_to_string(path)?)
        };
        let matrix_def = read("matrix.def")?;
        let char_def = read("char.def")?;
        let unk_def = read("unk.def")?;

        Self::from_sources(&DictSources {
            lexicon: &lexicon_refs,
            matrix_def: &matrix_def,
            char_def: &char_def,
            unk_def: &unk_def,
        })
    }
}
