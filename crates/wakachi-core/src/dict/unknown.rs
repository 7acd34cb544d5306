//! Unknown-word entries per character category (`unk.def`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::character::{CategoryId, CharDefinitions, DEFAULT_CATEGORY};
use super::framing::{frame, unframe};
use super::{DictError, WordParam};
use crate::csv::parse_row;

const MAGIC: &[u8; 4] = b"WKUK";
const VERSION: u8 = 1;

/// Parallel arrays of unknown-word entries, grouped by category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnknownDictionary {
    left_ids: Vec<u16>,
    right_ids: Vec<u16>,
    costs: Vec<i16>,
    features: Vec<Vec<String>>,
    /// Entry ids per category id, in source order.
    by_category: Vec<Vec<u32>>,
}

impl UnknownDictionary {
    /// Parse `unk.def` lines of the form `CATEGORY,left,right,cost,features...`.
    pub fn from_text(text: &str, char_def: &CharDefinitions) -> Result<Self, DictError> {
        let mut dict = Self {
            left_ids: Vec::new(),
            right_ids: Vec::new(),
            costs: Vec::new(),
            features: Vec::new(),
            by_category: vec![Vec::new(); char_def.category_count()],
        };
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let err = |msg: String| DictError::Parse(format!("unk.def line {}: {msg}", lineno + 1));
            let fields = parse_row(line).ok_or_else(|| err("malformed CSV".to_string()))?;
            if fields.len() < 4 {
                return Err(err(format!("expected at least 4 fields, got {}", fields.len())));
            }
            let category = char_def
                .category_id(&fields[0])
                .ok_or_else(|| err(format!("undefined category '{}'", fields[0])))?;
            let left: u16 = fields[1]
                .parse()
                .map_err(|e| err(format!("left id: {e}")))?;
            let right: u16 = fields[2]
                .parse()
                .map_err(|e| err(format!("right id: {e}")))?;
            let cost: i16 = fields[3].parse().map_err(|e| err(format!("cost: {e}")))?;

            let id = dict.costs.len() as u32;
            dict.left_ids.push(left);
            dict.right_ids.push(right);
            dict.costs.push(cost);
            dict.features.push(fields[4..].to_vec());
            dict.by_category[category.0 as usize].push(id);
        }
        dict.check_against(char_def)?;
        Ok(dict)
    }

    /// Verify the table fits `char_def` and that DEFAULT has entries.
    pub(crate) fn check_against(&self, char_def: &CharDefinitions) -> Result<(), DictError> {
        let n = self.costs.len();
        if self.left_ids.len() != n || self.right_ids.len() != n || self.features.len() != n {
            return Err(DictError::Parse(
                "unknown dictionary: column lengths differ".to_string(),
            ));
        }
        if self.by_category.len() != char_def.category_count() {
            return Err(DictError::Parse(format!(
                "unknown dictionary: {} categories, character definitions have {}",
                self.by_category.len(),
                char_def.category_count()
            )));
        }
        if self
            .by_category
            .iter()
            .flatten()
            .any(|&id| id as usize >= n)
        {
            return Err(DictError::Parse(
                "unknown dictionary: entry id out of range".to_string(),
            ));
        }
        if self.entries(char_def.default_category()).is_empty() {
            return Err(DictError::Parse(format!(
                "unknown dictionary: {DEFAULT_CATEGORY} category has no entries"
            )));
        }
        Ok(())
    }

    /// Verify every entry's context ids index into a `cardinality`-sized matrix.
    pub(crate) fn check_context_ids(&self, cardinality: usize) -> Result<(), DictError> {
        let outside = |id: u16| id as usize >= cardinality;
        match self
            .left_ids
            .iter()
            .zip(&self.right_ids)
            .position(|(&l, &r)| outside(l) || outside(r))
        {
            Some(i) => Err(DictError::Parse(format!(
                "unknown entry {i} uses context ids ({}, {}) outside the {cardinality}x{cardinality} matrix",
                self.left_ids[i], self.right_ids[i]
            ))),
            None => Ok(()),
        }
    }

    /// Entry ids for a category, in source order.
    pub fn entries(&self, category: CategoryId) -> &[u32] {
        self.by_category
            .get(category.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn param(&self, id: u32) -> Option<WordParam> {
        let i = id as usize;
        Some(WordParam {
            left_id: *self.left_ids.get(i)?,
            right_id: *self.right_ids.get(i)?,
            cost: *self.costs.get(i)? as i32,
        })
    }

    pub fn features(&self, id: u32) -> &[String] {
        self.features
            .get(id as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let body = bincode::serialize(self).map_err(DictError::Serialize)?;
        frame(MAGIC, VERSION, &body)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let body = unframe(data, MAGIC, VERSION, "unknown dictionary")?;
        bincode::deserialize(body).map_err(DictError::Deserialize)
    }

    pub fn open(path: &Path) -> Result<Self, DictError> {
        Self::from_bytes(&fs::read(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        Ok(fs::write(path, self.to_bytes()?)?)
    }
}
