use memmap2::Mmap;

/// Size of the fixed prefix: cardinality (i32) + cost byte length (i32).
pub(super) const HEADER_SIZE: usize = 4 + 4;

/// Backing storage for cost data: either owned or memory-mapped.
pub(super) enum CostStorage {
    Owned(Vec<i16>),
    Mapped(Mmap),
}

/// Square matrix of transition costs between context ids.
///
/// Indexed by the right id of the preceding word ("forward") and the left
/// id of the following word ("backward").
pub struct ConnectionCosts {
    pub(super) cardinality: usize,
    pub(super) storage: CostStorage,
}

impl ConnectionCosts {
    pub fn new_owned(cardinality: usize, costs: Vec<i16>) -> Self {
        Self {
            cardinality,
            storage: CostStorage::Owned(costs),
        }
    }

    /// Transition cost from a word with right id `forward` to one with left id `backward`.
    /// Index: backward + forward * cardinality. Out-of-bounds returns 0.
    pub fn cost(&self, forward: u16, backward: u16) -> i16 {
        let (forward, backward) = (forward as usize, backward as usize);
        if forward >= self.cardinality || backward >= self.cardinality {
            return 0;
        }
        let idx = backward + forward * self.cardinality;
        match &self.storage {
            CostStorage::Owned(costs) => costs.get(idx).copied().unwrap_or(0),
            CostStorage::Mapped(mmap) => {
                let byte_offset = HEADER_SIZE + idx * 2;
                mmap.get(byte_offset..byte_offset + 2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .unwrap_or(0)
            }
        }
    }

    /// Number of context ids along each side.
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }
}
