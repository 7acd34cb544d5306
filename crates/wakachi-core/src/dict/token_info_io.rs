use std::fs;
use std::path::Path;

use super::framing::{frame, put_str, unframe, Blob, ByteReader, FRAME_HEADER_SIZE};
use super::token_info::{record_size, TokenInfo, ABSENT_OTHER, ABSENT_POS};
use super::{
    DictError, TOKEN_INFO_FEATURES_FILE, TOKEN_INFO_FILE, TOKEN_INFO_POS_FILE,
    TOKEN_INFO_TARGETS_FILE,
};

const RECORDS_MAGIC: &[u8; 4] = b"WKTI";
const POS_MAGIC: &[u8; 4] = b"WKTP";
const STRINGS_MAGIC: &[u8; 4] = b"WKTF";
const TARGETS_MAGIC: &[u8; 4] = b"WKTT";
const VERSION: u8 = 1;

/// pos_count + other_count + entry_count, ahead of the records.
const RECORDS_PREAMBLE: usize = 4 * 3;

/// Serialized token info, one buffer per artifact file.
pub struct TokenInfoBytes {
    pub records: Vec<u8>,
    pub pos: Vec<u8>,
    pub strings: Vec<u8>,
    pub targets: Vec<u8>,
}

impl TokenInfo {
    pub fn to_bytes(&self) -> Result<TokenInfoBytes, DictError> {
        let size = record_size(self.pos_count, self.other_count);
        let records = self
            .records
            .get(self.records_start..self.records_start + self.entry_count * size)
            .ok_or(DictError::Truncated {
                what: "token info records",
            })?;
        let mut body = Vec::with_capacity(RECORDS_PREAMBLE + records.len());
        body.extend_from_slice(&(self.pos_count as u32).to_le_bytes());
        body.extend_from_slice(&(self.other_count as u32).to_le_bytes());
        body.extend_from_slice(&(self.entry_count as u32).to_le_bytes());
        body.extend_from_slice(records);
        let records = frame(RECORDS_MAGIC, VERSION, &body)?;

        let mut body = Vec::new();
        body.extend_from_slice(&(self.pos_table.len() as u32).to_le_bytes());
        for s in &self.pos_table {
            put_str(&mut body, s)?;
        }
        let pos = frame(POS_MAGIC, VERSION, &body)?;

        let strings = self
            .strings
            .get(self.strings_start..self.strings_start + self.strings_len)
            .ok_or(DictError::Truncated {
                what: "feature strings",
            })?;
        let strings = frame(STRINGS_MAGIC, VERSION, strings)?;

        let mut body = Vec::with_capacity(8 + 4 * (self.target_offsets.len() + self.target_ids.len()));
        body.extend_from_slice(&(self.surface_count() as u32).to_le_bytes());
        body.extend_from_slice(&(self.target_ids.len() as u32).to_le_bytes());
        for &o in &self.target_offsets {
            body.extend_from_slice(&o.to_le_bytes());
        }
        for &id in &self.target_ids {
            body.extend_from_slice(&id.to_le_bytes());
        }
        let targets = frame(TARGETS_MAGIC, VERSION, &body)?;

        Ok(TokenInfoBytes {
            records,
            pos,
            strings,
            targets,
        })
    }

    pub fn save(&self, dir: &Path) -> Result<(), DictError> {
        let bytes = self.to_bytes()?;
        fs::write(dir.join(TOKEN_INFO_FILE), bytes.records)?;
        fs::write(dir.join(TOKEN_INFO_POS_FILE), bytes.pos)?;
        fs::write(dir.join(TOKEN_INFO_FEATURES_FILE), bytes.strings)?;
        fs::write(dir.join(TOKEN_INFO_TARGETS_FILE), bytes.targets)?;
        Ok(())
    }

    /// Open the four token info files, memory-mapping records and strings.
    pub fn open(dir: &Path) -> Result<Self, DictError> {
        let records = Blob::map(&dir.join(TOKEN_INFO_FILE))?;
        let strings = Blob::map(&dir.join(TOKEN_INFO_FEATURES_FILE))?;
        let pos = fs::read(dir.join(TOKEN_INFO_POS_FILE))?;
        let targets = fs::read(dir.join(TOKEN_INFO_TARGETS_FILE))?;
        Self::assemble(records, strings, &pos, &targets)
    }

    /// Parse from in-memory buffers.
    pub fn from_bytes(bytes: TokenInfoBytes) -> Result<Self, DictError> {
        Self::assemble(
            Blob::Owned(bytes.records),
            Blob::Owned(bytes.strings),
            &bytes.pos,
            &bytes.targets,
        )
    }

    fn assemble(records: Blob, strings: Blob, pos: &[u8], targets: &[u8]) -> Result<Self, DictError> {
        let body = unframe(&records, RECORDS_MAGIC, VERSION, "token info records")?;
        let mut rd = ByteReader::new(body, "token info records");
        let pos_count = rd.u32()? as usize;
        let other_count = rd.u32()? as usize;
        let entry_count = rd.u32()? as usize;
        let size = record_size(pos_count, other_count);
        let expected = entry_count
            .checked_mul(size)
            .ok_or(DictError::InvalidHeader)?;
        if body.len() - rd.position() != expected {
            return Err(DictError::Truncated {
                what: "token info records",
            });
        }

        let pos_body = unframe(pos, POS_MAGIC, VERSION, "part-of-speech table")?;
        let mut rd = ByteReader::new(pos_body, "part-of-speech table");
        let count = rd.u32()? as usize;
        let mut pos_table = Vec::with_capacity(count.min(pos_body.len()));
        for _ in 0..count {
            pos_table.push(rd.str()?.to_string());
        }

        let strings_len = unframe(&strings, STRINGS_MAGIC, VERSION, "feature strings")?.len();

        let targets_body = unframe(targets, TARGETS_MAGIC, VERSION, "token targets")?;
        let mut rd = ByteReader::new(targets_body, "token targets");
        let surface_count = rd.u32()? as usize;
        let total = rd.u32()? as usize;
        let mut target_offsets = Vec::with_capacity((surface_count + 1).min(targets_body.len()));
        for _ in 0..=surface_count {
            target_offsets.push(rd.u32()?);
        }
        let mut target_ids = Vec::with_capacity(total.min(targets_body.len()));
        for _ in 0..total {
            target_ids.push(rd.u32()?);
        }
        let monotone = target_offsets.windows(2).all(|w| w[0] <= w[1]);
        if !monotone || target_offsets.last().copied().unwrap_or(0) as usize != total {
            return Err(DictError::Parse("token targets: malformed offsets".to_string()));
        }
        if target_ids.iter().any(|&id| id as usize >= entry_count) {
            return Err(DictError::Parse(
                "token targets: word id out of range".to_string(),
            ));
        }

        let info = Self {
            pos_count,
            other_count,
            entry_count,
            records,
            records_start: FRAME_HEADER_SIZE + RECORDS_PREAMBLE,
            pos_table,
            strings,
            strings_start: FRAME_HEADER_SIZE,
            strings_len,
            target_offsets,
            target_ids,
        };
        info.check_references()?;
        Ok(info)
    }

    /// Every record must reference existing table entries.
    fn check_references(&self) -> Result<(), DictError> {
        let size = record_size(self.pos_count, self.other_count);
        for id in 0..self.entry_count {
            let at = self.records_start + id * size;
            let Some(r) = self.records.get(at..at + size) else {
                return Err(DictError::Truncated {
                    what: "token info records",
                });
            };
            for i in 0..self.pos_count {
                let p = u16::from_le_bytes([r[6 + i * 2], r[7 + i * 2]]);
                if p != ABSENT_POS && p as usize >= self.pos_table.len() {
                    return Err(DictError::Parse(format!(
                        "token info: word {id} references missing part-of-speech {p}"
                    )));
                }
            }
            let base = 6 + self.pos_count * 2;
            for i in 0..self.other_count {
                let at = base + i * 4;
                let o = u32::from_le_bytes([r[at], r[at + 1], r[at + 2], r[at + 3]]);
                if o != ABSENT_OTHER && o as usize >= self.strings_len {
                    return Err(DictError::Parse(format!(
                        "token info: word {id} references feature offset {o} out of range"
                    )));
                }
            }
        }
        Ok(())
    }
}
