//! Character categories and the code point → category mapping (`char.def`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::framing::{frame, unframe};
use super::DictError;

const MAGIC: &[u8; 4] = b"WKCD";
const VERSION: u8 = 1;

pub const DEFAULT_CATEGORY: &str = "DEFAULT";
pub const KANJI_CATEGORY: &str = "KANJI";

/// Index into the category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u8);

/// Unknown-word behavior of a character class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharCategory {
    pub name: String,
    /// Always run unknown-word processing, even after a dictionary hit.
    pub invoke: bool,
    /// Group a run of same-category characters into one unknown word.
    pub group: bool,
    /// Carried from the source; unknown-word lengths are decided by `group`.
    pub length: u32,
}

/// Inclusive code point range with its ordered categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CharRange {
    start: u32,
    end: u32,
    categories: Vec<CategoryId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharDefinitions {
    categories: Vec<CharCategory>,
    /// Sorted, disjoint.
    ranges: Vec<CharRange>,
    default_set: [CategoryId; 1],
    kanji: Option<CategoryId>,
}

impl CharDefinitions {
    /// Parse MeCab `char.def` text.
    ///
    /// Category lines are `NAME invoke group length`; mapping lines are
    /// `0xAAAA[..0xBBBB] CAT [CAT...]`. Later mappings override earlier ones
    /// where they overlap; unmapped code points fall back to DEFAULT.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        let mut categories: Vec<CharCategory> = Vec::new();
        let mut assignments: Vec<CharRange> = Vec::new();

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let err = |msg: String| DictError::Parse(format!("char.def line {}: {msg}", lineno + 1));

            if fields[0].starts_with("0x") {
                let (start, end) = match fields[0].split_once("..") {
                    Some((a, b)) => (parse_code_point(a), parse_code_point(b)),
                    None => (parse_code_point(fields[0]), parse_code_point(fields[0])),
                };
                let (start, end) = match (start, end) {
                    (Some(s), Some(e)) if s <= e => (s, e),
                    _ => return Err(err(format!("invalid range '{}'", fields[0]))),
                };
                if fields.len() < 2 {
                    return Err(err("mapping without a category".to_string()));
                }
                let mut cats = Vec::with_capacity(fields.len() - 1);
                for name in &fields[1..] {
                    let id = categories
                        .iter()
                        .position(|c| c.name == *name)
                        .ok_or_else(|| err(format!("undefined category '{name}'")))?;
                    let id = CategoryId(id as u8);
                    if !cats.contains(&id) {
                        cats.push(id);
                    }
                }
                assignments.push(CharRange {
                    start,
                    end,
                    categories: cats,
                });
            } else {
                if fields.len() != 4 {
                    return Err(err(format!("expected 4 fields, got {}", fields.len())));
                }
                let flag = |s: &str| match s {
                    "0" => Ok(false),
                    "1" => Ok(true),
                    other => Err(err(format!("invalid flag '{other}'"))),
                };
                let invoke = flag(fields[1])?;
                let group = flag(fields[2])?;
                let length: u32 = fields[3]
                    .parse()
                    .map_err(|e| err(format!("invalid length: {e}")))?;
                if categories.iter().any(|c| c.name == fields[0]) {
                    return Err(err(format!("duplicate category '{}'", fields[0])));
                }
                if categories.len() > u8::MAX as usize {
                    return Err(err("too many categories".to_string()));
                }
                categories.push(CharCategory {
                    name: fields[0].to_string(),
                    invoke,
                    group,
                    length,
                });
            }
        }

        let ranges = normalize(&assignments);
        Self::new(categories, ranges)
    }

    fn new(categories: Vec<CharCategory>, ranges: Vec<CharRange>) -> Result<Self, DictError> {
        let default = categories
            .iter()
            .position(|c| c.name == DEFAULT_CATEGORY)
            .ok_or_else(|| DictError::Parse("char.def: DEFAULT category is required".to_string()))?;
        let kanji = categories
            .iter()
            .position(|c| c.name == KANJI_CATEGORY)
            .map(|i| CategoryId(i as u8));
        Ok(Self {
            categories,
            ranges,
            default_set: [CategoryId(default as u8)],
            kanji,
        })
    }

    /// Ordered categories of `ch`; the first one is its primary category.
    pub fn categories(&self, ch: char) -> &[CategoryId] {
        let cp = ch as u32;
        let idx = self.ranges.partition_point(|r| r.start <= cp);
        if idx > 0 {
            let range = &self.ranges[idx - 1];
            if cp <= range.end {
                return &range.categories;
            }
        }
        &self.default_set
    }

    pub fn has_category(&self, ch: char, id: CategoryId) -> bool {
        self.categories(ch).contains(&id)
    }

    /// Whether `ch` carries the KANJI category.
    pub fn is_kanji(&self, ch: char) -> bool {
        self.kanji.is_some_and(|k| self.has_category(ch, k))
    }

    pub fn category(&self, id: CategoryId) -> Option<&CharCategory> {
        self.categories.get(id.0 as usize)
    }

    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.categories
            .iter()
            .position(|c| c.name == name)
            .map(|i| CategoryId(i as u8))
    }

    pub fn default_category(&self) -> CategoryId {
        self.default_set[0]
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let body = bincode::serialize(self).map_err(DictError::Serialize)?;
        frame(MAGIC, VERSION, &body)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let body = unframe(data, MAGIC, VERSION, "character definitions")?;
        let raw: Self = bincode::deserialize(body).map_err(DictError::Deserialize)?;
        // Re-derive the lookup helpers so a tampered body cannot desync them.
        let defs = Self::new(raw.categories, raw.ranges)?;
        let count = defs.categories.len();
        let sorted = defs
            .ranges
            .windows(2)
            .all(|w| w[0].end < w[1].start);
        let in_range = defs
            .ranges
            .iter()
            .all(|r| r.start <= r.end && r.categories.iter().all(|c| (c.0 as usize) < count));
        if !sorted || !in_range {
            return Err(DictError::Parse(
                "character definitions: malformed range table".to_string(),
            ));
        }
        Ok(defs)
    }

    pub fn open(path: &Path) -> Result<Self, DictError> {
        Self::from_bytes(&fs::read(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        Ok(fs::write(path, self.to_bytes()?)?)
    }
}

fn parse_code_point(s: &str) -> Option<u32> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    let cp = u32::from_str_radix(hex, 16).ok()?;
    (cp <= char::MAX as u32).then_some(cp)
}

/// Flatten possibly-overlapping assignments into sorted disjoint ranges,
/// later assignments taking precedence.
fn normalize(assignments: &[CharRange]) -> Vec<CharRange> {
    let mut bounds: Vec<u32> = assignments
        .iter()
        .flat_map(|a| [a.start, a.end + 1])
        .collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut ranges: Vec<CharRange> = Vec::new();
    for pair in bounds.windows(2) {
        let (lo, hi) = (pair[0], pair[1] - 1);
        let Some(winner) = assignments
            .iter()
            .rev()
            .find(|a| a.start <= lo && hi <= a.end)
        else {
            continue;
        };
        match ranges.last_mut() {
            Some(prev) if prev.end + 1 == lo && prev.categories == winner.categories => {
                prev.end = hi;
            }
            _ => ranges.push(CharRange {
                start: lo,
                end: hi,
                categories: winner.categories.clone(),
            }),
        }
    }
    ranges
}
