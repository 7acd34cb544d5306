//! Per-word attributes stored as fixed-width records.
//!
//! Each record is `left u16, right u16, cost i16`, then `pos_count` u16
//! indices into a deduplicated part-of-speech table, then `other_count`
//! u32 byte offsets into a deduplicated feature string buffer. Absent
//! trailing features are stored as all-ones references.

use std::collections::HashMap;

use super::entry::DictEntry;
use super::framing::{put_str, Blob, ByteReader};
use super::{DictError, WordParam};

pub(super) const ABSENT_POS: u16 = u16::MAX;
pub(super) const ABSENT_OTHER: u32 = u32::MAX;

/// Part-of-speech fields in the IPADIC layout: four levels, conjugation type and form.
pub const IPADIC_POS_COUNT: usize = 6;

pub struct TokenInfo {
    pub(super) pos_count: usize,
    pub(super) other_count: usize,
    pub(super) entry_count: usize,
    pub(super) records: Blob,
    pub(super) records_start: usize,
    pub(super) pos_table: Vec<String>,
    pub(super) strings: Blob,
    pub(super) strings_start: usize,
    pub(super) strings_len: usize,
    /// `target_offsets[s - 1]..target_offsets[s]` indexes `target_ids` for surface id `s`.
    pub(super) target_offsets: Vec<u32>,
    pub(super) target_ids: Vec<u32>,
}

impl TokenInfo {
    /// Encode entries. `targets[s - 1]` lists the word ids of surface id `s`.
    pub fn build(
        entries: &[DictEntry],
        targets: &[Vec<u32>],
        pos_count: usize,
    ) -> Result<Self, DictError> {
        let other_count = entries
            .iter()
            .map(|e| e.features.len().saturating_sub(pos_count))
            .max()
            .unwrap_or(0);

        let mut pos_table: Vec<String> = Vec::new();
        let mut pos_index: HashMap<&str, u16> = HashMap::new();
        let mut strings: Vec<u8> = Vec::new();
        let mut string_index: HashMap<&str, u32> = HashMap::new();
        let mut records = Vec::with_capacity(entries.len() * record_size(pos_count, other_count));

        for entry in entries {
            records.extend_from_slice(&entry.left_id.to_le_bytes());
            records.extend_from_slice(&entry.right_id.to_le_bytes());
            records.extend_from_slice(&entry.cost.to_le_bytes());
            for i in 0..pos_count {
                let r = match entry.features.get(i) {
                    Some(f) => match pos_index.get(f.as_str()) {
                        Some(&r) => r,
                        None => {
                            let r: u16 = pos_table
                                .len()
                                .try_into()
                                .ok()
                                .filter(|&r| r != ABSENT_POS)
                                .ok_or_else(|| {
                                    DictError::Parse("too many part-of-speech strings".to_string())
                                })?;
                            pos_table.push(f.clone());
                            pos_index.insert(f.as_str(), r);
                            r
                        }
                    },
                    None => ABSENT_POS,
                };
                records.extend_from_slice(&r.to_le_bytes());
            }
            for i in pos_count..pos_count + other_count {
                let r = match entry.features.get(i) {
                    Some(f) => match string_index.get(f.as_str()) {
                        Some(&r) => r,
                        None => {
                            let r: u32 = strings
                                .len()
                                .try_into()
                                .ok()
                                .filter(|&r| r != ABSENT_OTHER)
                                .ok_or_else(|| {
                                    DictError::Parse("feature buffer exceeds u32::MAX".to_string())
                                })?;
                            put_str(&mut strings, f)?;
                            string_index.insert(f.as_str(), r);
                            r
                        }
                    },
                    None => ABSENT_OTHER,
                };
                records.extend_from_slice(&r.to_le_bytes());
            }
        }

        let mut target_offsets = Vec::with_capacity(targets.len() + 1);
        let mut target_ids = Vec::new();
        target_offsets.push(0u32);
        for ids in targets {
            target_ids.extend_from_slice(ids);
            let end: u32 = target_ids
                .len()
                .try_into()
                .map_err(|_| DictError::Parse("too many targets".to_string()))?;
            target_offsets.push(end);
        }

        let strings_len = strings.len();
        Ok(Self {
            pos_count,
            other_count,
            entry_count: entries.len(),
            records: Blob::Owned(records),
            records_start: 0,
            pos_table,
            strings: Blob::Owned(strings),
            strings_start: 0,
            strings_len,
            target_offsets,
            target_ids,
        })
    }

    fn record(&self, word_id: u32) -> Option<&[u8]> {
        let size = record_size(self.pos_count, self.other_count);
        let id = word_id as usize;
        if id >= self.entry_count {
            return None;
        }
        let at = self.records_start + id * size;
        self.records.get(at..at + size)
    }

    pub fn param(&self, word_id: u32) -> Option<WordParam> {
        let r = self.record(word_id)?;
        Some(WordParam {
            left_id: u16::from_le_bytes([r[0], r[1]]),
            right_id: u16::from_le_bytes([r[2], r[3]]),
            cost: i16::from_le_bytes([r[4], r[5]]) as i32,
        })
    }

    /// Feature `index` of a word, or `None` past the last stored feature.
    pub fn feature(&self, word_id: u32, index: usize) -> Option<&str> {
        let r = self.record(word_id)?;
        if index < self.pos_count {
            let at = 6 + index * 2;
            let pos = u16::from_le_bytes([r[at], r[at + 1]]);
            if pos == ABSENT_POS {
                return None;
            }
            return self.pos_table.get(pos as usize).map(String::as_str);
        }
        let other = index - self.pos_count;
        if other >= self.other_count {
            return None;
        }
        let at = 6 + self.pos_count * 2 + other * 4;
        let offset = u32::from_le_bytes([r[at], r[at + 1], r[at + 2], r[at + 3]]);
        if offset == ABSENT_OTHER {
            return None;
        }
        self.string_at(offset as usize)
    }

    /// All stored features of a word, in order.
    pub fn features(&self, word_id: u32) -> Vec<&str> {
        (0..self.pos_count + self.other_count)
            .map_while(|i| self.feature(word_id, i))
            .collect()
    }

    fn string_at(&self, offset: usize) -> Option<&str> {
        if offset >= self.strings_len {
            return None;
        }
        let body = self
            .strings
            .get(self.strings_start..self.strings_start + self.strings_len)?;
        ByteReader::new(&body[offset..], "feature strings").str().ok()
    }

    /// Word ids sharing surface id `surface_id` (1-based, as returned by the FST).
    pub fn targets(&self, surface_id: u32) -> &[u32] {
        let s = surface_id as usize;
        if s == 0 || s >= self.target_offsets.len() {
            return &[];
        }
        let (from, to) = (
            self.target_offsets[s - 1] as usize,
            self.target_offsets[s] as usize,
        );
        self.target_ids.get(from..to).unwrap_or(&[])
    }

    /// Number of word entries.
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Number of surfaces with targets.
    pub fn surface_count(&self) -> usize {
        self.target_offsets.len().saturating_sub(1)
    }

    pub fn pos_count(&self) -> usize {
        self.pos_count
    }

    pub fn other_count(&self) -> usize {
        self.other_count
    }
}

pub(super) fn record_size(pos_count: usize, other_count: usize) -> usize {
    6 + pos_count * 2 + other_count * 4
}
