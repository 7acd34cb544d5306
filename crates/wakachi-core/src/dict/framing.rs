//! Shared header framing for the binary artifacts.
//!
//! Layout: magic (4) + version (1) + reserved (3) + body length (u32 LE)
//! + CRC-32 of the body (u32 LE), then the body.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use super::DictError;

pub(super) const FRAME_HEADER_SIZE: usize = 4 + 1 + 3 + 4 + 4;

/// Backing bytes of an artifact: either owned or memory-mapped.
pub(super) enum Blob {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Blob::Owned(v) => v,
            Blob::Mapped(m) => m,
        }
    }
}

impl Blob {
    pub(super) fn map(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // The mapping lives as long as the owning artifact; dictionary files
        // must not be modified while a tokenizer holds them.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Blob::Mapped(mmap))
    }
}

pub(super) fn frame(magic: &[u8; 4], version: u8, body: &[u8]) -> Result<Vec<u8>, DictError> {
    let body_len: u32 = body
        .len()
        .try_into()
        .map_err(|_| DictError::Parse("artifact body exceeds u32::MAX".to_string()))?;
    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + body.len());
    buf.extend_from_slice(magic);
    buf.push(version);
    buf.extend_from_slice(&[0u8; 3]); // reserved
    buf.extend_from_slice(&body_len.to_le_bytes());
    buf.extend_from_slice(&crc32fast::hash(body).to_le_bytes());
    buf.extend_from_slice(body);
    Ok(buf)
}

/// Validate the frame header and checksum, returning the body.
pub(super) fn unframe<'a>(
    data: &'a [u8],
    magic: &'static [u8; 4],
    version: u8,
    what: &'static str,
) -> Result<&'a [u8], DictError> {
    if data.len() < FRAME_HEADER_SIZE {
        return Err(DictError::InvalidHeader);
    }
    if &data[..4] != magic {
        return Err(DictError::InvalidMagic {
            expected: magic_name(magic),
        });
    }
    if data[4] != version {
        return Err(DictError::UnsupportedVersion(data[4]));
    }
    let mut header = ByteReader::new(&data[8..FRAME_HEADER_SIZE], what);
    let body_len = header.u32()? as usize;
    let checksum = header.u32()?;
    let body = data
        .get(FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + body_len)
        .ok_or(DictError::Truncated { what })?;
    if crc32fast::hash(body) != checksum {
        return Err(DictError::ChecksumMismatch { what });
    }
    Ok(body)
}

fn magic_name(magic: &'static [u8; 4]) -> &'static str {
    std::str::from_utf8(magic).unwrap_or("????")
}

/// Little-endian cursor that reports truncation instead of panicking.
pub(super) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> ByteReader<'a> {
    pub(super) fn new(data: &'a [u8], what: &'static str) -> Self {
        Self { data, pos: 0, what }
    }

    pub(super) fn position(&self) -> usize {
        self.pos
    }

    pub(super) fn bytes(&mut self, len: usize) -> Result<&'a [u8], DictError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(DictError::Truncated { what: self.what })?;
        let out = self
            .data
            .get(self.pos..end)
            .ok_or(DictError::Truncated { what: self.what })?;
        self.pos = end;
        Ok(out)
    }

    pub(super) fn u16(&mut self) -> Result<u16, DictError> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(super) fn u32(&mut self) -> Result<u32, DictError> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(super) fn str(&mut self) -> Result<&'a str, DictError> {
        let len = self.u16()? as usize;
        let bytes = self.bytes(len)?;
        std::str::from_utf8(bytes)
            .map_err(|e| DictError::Parse(format!("{}: invalid UTF-8: {e}", self.what)))
    }
}

/// Append a u16-length-prefixed string.
pub(super) fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<(), DictError> {
    let len: u16 = s
        .len()
        .try_into()
        .map_err(|_| DictError::Parse(format!("string too long: {} bytes", s.len())))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}
