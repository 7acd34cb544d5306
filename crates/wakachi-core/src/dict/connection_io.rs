use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;

use super::connection::{ConnectionCosts, CostStorage, HEADER_SIZE};
use super::DictError;

impl ConnectionCosts {
    /// Build from MeCab `matrix.def` text.
    ///
    /// Line 1 is `forward_size backward_size` (must be equal), then one
    /// `forward backward cost` triple per line. Missing pairs cost 0.
    pub fn from_text(text: &str) -> Result<Self, DictError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| DictError::Parse("matrix.def: empty file".to_string()))?;
        let parts: Vec<&str> = header.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(DictError::Parse(format!(
                "matrix.def: expected 2 values in header, got {}",
                parts.len()
            )));
        }
        let forward_size: usize = parts[0]
            .parse()
            .map_err(|e| DictError::Parse(format!("matrix.def: forward size: {e}")))?;
        let backward_size: usize = parts[1]
            .parse()
            .map_err(|e| DictError::Parse(format!("matrix.def: backward size: {e}")))?;
        if forward_size != backward_size {
            return Err(DictError::Parse(format!(
                "matrix.def: forward size ({forward_size}) != backward size ({backward_size})"
            )));
        }
        let cardinality = forward_size;
        if cardinality > u16::MAX as usize + 1 {
            return Err(DictError::Parse(format!(
                "matrix.def: cardinality {cardinality} exceeds the 16-bit id space"
            )));
        }

        let mut costs = vec![0i16; cardinality * cardinality];
        for (lineno, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(DictError::Parse(format!(
                    "matrix.def line {}: expected 3 fields, got {}",
                    lineno + 2,
                    fields.len()
                )));
            }
            let forward: usize = fields[0]
                .parse()
                .map_err(|e| DictError::Parse(format!("matrix.def: forward id: {e}")))?;
            let backward: usize = fields[1]
                .parse()
                .map_err(|e| DictError::Parse(format!("matrix.def: backward id: {e}")))?;
            let cost: i16 = fields[2]
                .parse()
                .map_err(|e| DictError::Parse(format!("matrix.def: cost: {e}")))?;
            if forward >= cardinality || backward >= cardinality {
                return Err(DictError::Parse(format!(
                    "matrix.def: id out of bounds: ({forward}, {backward})"
                )));
            }
            costs[backward + forward * cardinality] = cost;
        }
        Ok(Self::new_owned(cardinality, costs))
    }

    /// Validate the header against the buffer length and return the cardinality.
    fn validate_header(data: &[u8]) -> Result<usize, DictError> {
        if data.len() < HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }
        let cardinality = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let byte_len = i32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if cardinality < 0 || byte_len < 0 {
            return Err(DictError::InvalidHeader);
        }
        let cardinality = cardinality as usize;
        let expected = cardinality * cardinality * 2;
        if byte_len as usize != expected {
            return Err(DictError::Parse(format!(
                "connection costs: header declares {byte_len} bytes, cardinality implies {expected}"
            )));
        }
        if data.len() - HEADER_SIZE < expected {
            return Err(DictError::Truncated {
                what: "connection costs",
            });
        }
        Ok(cardinality)
    }

    /// Load using memory-mapped I/O.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // We hold the Mmap for the lifetime of this struct.
        let mmap = unsafe { Mmap::map(&file)? };
        let cardinality = Self::validate_header(&mmap)?;
        Ok(Self {
            cardinality,
            storage: CostStorage::Mapped(mmap),
        })
    }

    /// Parse into an owned representation.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let cardinality = Self::validate_header(data)?;
        let costs: Vec<i16> = data[HEADER_SIZE..HEADER_SIZE + cardinality * cardinality * 2]
            .chunks_exact(2)
            .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        Ok(Self::new_owned(cardinality, costs))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let n = self.cardinality * self.cardinality;
        let byte_len: i32 = (n * 2)
            .try_into()
            .map_err(|_| DictError::Parse("connection costs exceed i32::MAX bytes".to_string()))?;
        let mut buf = Vec::with_capacity(HEADER_SIZE + n * 2);
        buf.extend_from_slice(&(self.cardinality as i32).to_le_bytes());
        buf.extend_from_slice(&byte_len.to_le_bytes());
        match &self.storage {
            CostStorage::Owned(costs) => {
                for &cost in costs {
                    buf.extend_from_slice(&cost.to_le_bytes());
                }
            }
            CostStorage::Mapped(mmap) => {
                buf.extend_from_slice(&mmap[HEADER_SIZE..HEADER_SIZE + n * 2]);
            }
        }
        Ok(buf)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        Ok(fs::write(path, self.to_bytes()?)?)
    }
}
