//! Minimal acyclic transducer mapping surface strings to dense ids.
//!
//! Labels are UTF-16 code units; outputs are summed along the path, so the
//! id of an accepted key is the sum of the outputs of its transitions.
//! The serialized form is read in place: states are stored children-first,
//! each as `[arcs][arc count: u32][header: u8]`, and a state is addressed by
//! the position of its header byte. The root is the final byte.

mod builder;

pub use builder::FstBuilder;

use std::fs;
use std::path::Path;

/// Header bit 0: the state accepts.
const ACCEPT_BIT: u8 = 0b0000_0001;
const JUMP_SHIFT: u8 = 1;
const OUTPUT_SHIFT: u8 = 4;
const WIDTH_MASK: u8 = 0b111;
const LABEL_WIDTH: usize = 2;
const COUNT_WIDTH: usize = 4;
const NO_ROOT_ARC: u32 = u32::MAX;

#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("empty key at position {0}")]
    EmptyKey(usize),

    #[error("keys must be strictly increasing (position {0})")]
    Unsorted(usize),

    #[error("too many keys for a 32-bit id space")]
    TooManyKeys,

    #[error("corrupt transducer: {0}")]
    Corrupt(&'static str),
}

/// Result of stepping an [`FstWalker`] by one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The consumed text is a key with this id (it may also prefix longer keys).
    Match(u32),
    /// The consumed text only prefixes longer keys.
    Prefix,
    /// No key starts with the consumed text.
    Dead,
}

/// A decoded transition.
#[derive(Debug, Clone, Copy)]
struct Arc {
    target: usize,
    output: u32,
}

/// Read-only transducer over a serialized buffer.
pub struct Fst {
    data: Vec<u8>,
    root: usize,
    root_targets: Vec<u32>,
    root_outputs: Vec<u32>,
}

impl Fst {
    /// Wrap a serialized buffer, validating the root and building the root cache.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FstError> {
        if data.is_empty() {
            return Err(FstError::Corrupt("empty buffer"));
        }
        let root = data.len() - 1;
        let mut fst = Self {
            data,
            root,
            root_targets: vec![NO_ROOT_ARC; 1 << 16],
            root_outputs: vec![0; 1 << 16],
        };
        let (start, count, jump_w, out_w) = fst.arc_table(root)?;
        let stride = LABEL_WIDTH + jump_w + out_w;
        for i in 0..count {
            let at = start + i * stride;
            let label = read_uint(&fst.data, at, LABEL_WIDTH) as usize;
            let target = read_uint(&fst.data, at + LABEL_WIDTH, jump_w);
            if target as usize >= root {
                return Err(FstError::Corrupt("root arc points forward"));
            }
            let output = read_uint(&fst.data, at + LABEL_WIDTH + jump_w, out_w);
            fst.root_targets[label] = target;
            fst.root_outputs[label] = output;
        }
        Ok(fst)
    }

    pub fn open(path: &Path) -> Result<Self, crate::dict::DictError> {
        let data = fs::read(path)?;
        Ok(Self::from_bytes(data)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Look up a complete string.
    ///
    /// Returns the key's id (> 0), `0` when the string only prefixes
    /// longer keys, or `-1` when no key starts with it.
    pub fn lookup(&self, key: &str) -> i32 {
        let mut walker = self.walker();
        let mut last = Step::Prefix;
        for ch in key.chars() {
            last = walker.step(ch);
            if last == Step::Dead {
                return -1;
            }
        }
        match last {
            Step::Match(id) => id as i32,
            Step::Prefix => 0,
            Step::Dead => -1,
        }
    }

    /// Start an incremental walk at the root.
    pub fn walker(&self) -> FstWalker<'_> {
        FstWalker {
            fst: self,
            state: Some(self.root),
            sum: 0,
        }
    }

    fn header(&self, addr: usize) -> u8 {
        self.data[addr]
    }

    fn is_accept(&self, addr: usize) -> bool {
        self.header(addr) & ACCEPT_BIT != 0
    }

    /// Locate the arc array of the state at `addr`: (start, count, jump width, output width).
    fn arc_table(&self, addr: usize) -> Result<(usize, usize, usize, usize), FstError> {
        let header = self.header(addr);
        let jump_w = ((header >> JUMP_SHIFT) & WIDTH_MASK) as usize;
        let out_w = ((header >> OUTPUT_SHIFT) & WIDTH_MASK) as usize;
        if jump_w > 4 || out_w > 4 {
            return Err(FstError::Corrupt("field width out of range"));
        }
        let count_at = addr
            .checked_sub(COUNT_WIDTH)
            .ok_or(FstError::Corrupt("truncated arc count"))?;
        let count = read_uint(&self.data, count_at, COUNT_WIDTH) as usize;
        let stride = LABEL_WIDTH + jump_w + out_w;
        let start = count
            .checked_mul(stride)
            .and_then(|len| count_at.checked_sub(len))
            .ok_or(FstError::Corrupt("truncated arc table"))?;
        Ok((start, count, jump_w, out_w))
    }

    fn transition(&self, addr: usize, label: u16) -> Option<Arc> {
        if addr == self.root {
            let target = self.root_targets[label as usize];
            if target == NO_ROOT_ARC {
                return None;
            }
            return Some(Arc {
                target: target as usize,
                output: self.root_outputs[label as usize],
            });
        }
        let (start, count, jump_w, out_w) = self.arc_table(addr).ok()?;
        let stride = LABEL_WIDTH + jump_w + out_w;
        let (mut lo, mut hi) = (0usize, count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let at = start + mid * stride;
            let entry_label = read_uint(&self.data, at, LABEL_WIDTH) as u16;
            match entry_label.cmp(&label) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => {
                    let target = read_uint(&self.data, at + LABEL_WIDTH, jump_w) as usize;
                    // Children are always written before their parent.
                    if target >= addr {
                        return None;
                    }
                    let output = read_uint(&self.data, at + LABEL_WIDTH + jump_w, out_w);
                    return Some(Arc { target, output });
                }
            }
        }
        None
    }
}

/// Incremental lookup that extends the consumed text one character at a time.
#[derive(Clone)]
pub struct FstWalker<'a> {
    fst: &'a Fst,
    state: Option<usize>,
    sum: u32,
}

impl FstWalker<'_> {
    pub fn step(&mut self, ch: char) -> Step {
        let mut units = [0u16; 2];
        for &unit in ch.encode_utf16(&mut units).iter() {
            let Some(addr) = self.state else {
                return Step::Dead;
            };
            match self.fst.transition(addr, unit) {
                Some(arc) => {
                    self.state = Some(arc.target);
                    self.sum = self.sum.wrapping_add(arc.output);
                }
                None => {
                    self.state = None;
                    return Step::Dead;
                }
            }
        }
        match self.state {
            Some(addr) if self.fst.is_accept(addr) => Step::Match(self.sum),
            Some(_) => Step::Prefix,
            None => Step::Dead,
        }
    }
}

/// Read a little-endian unsigned integer of `width` bytes (0..=4).
fn read_uint(data: &[u8], at: usize, width: usize) -> u32 {
    let mut value = 0u32;
    for (i, b) in data[at..at + width].iter().enumerate() {
        value |= (*b as u32) << (8 * i);
    }
    value
}

/// Number of bytes needed to store `value`.
fn width_of(value: u32) -> usize {
    match value {
        0 => 0,
        1..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}
