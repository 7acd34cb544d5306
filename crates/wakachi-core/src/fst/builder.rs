use std::collections::HashMap;

use tracing::{debug, debug_span};

use super::{
    width_of, Fst, FstError, ACCEPT_BIT, COUNT_WIDTH, JUMP_SHIFT, LABEL_WIDTH, OUTPUT_SHIFT,
};

type StateId = usize;

/// A state whose transitions are final. Equal frozen states are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FrozenState {
    accept: bool,
    /// (label, output, target) sorted by label.
    arcs: Vec<(u16, u32, StateId)>,
}

/// A state on the path of the most recently inserted key.
#[derive(Debug, Default)]
struct OpenState {
    accept: bool,
    arcs: Vec<(u16, u32, StateId)>,
    /// The transition towards the next open state, not yet frozen.
    pending: Option<(u16, u32)>,
}

/// Incremental minimal-FST construction from sorted keys.
///
/// Keys must be non-empty and strictly increasing in UTF-16 code-unit
/// order. The n-th key (1-based) receives id n.
pub struct FstBuilder {
    open: Vec<OpenState>,
    registry: HashMap<FrozenState, StateId>,
    frozen: Vec<FrozenState>,
    prev: Vec<u16>,
    count: u32,
}

impl Default for FstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FstBuilder {
    pub fn new() -> Self {
        Self {
            open: vec![OpenState::default()],
            registry: HashMap::new(),
            frozen: Vec::new(),
            prev: Vec::new(),
            count: 0,
        }
    }

    /// Build a transducer from an iterator of sorted keys.
    pub fn build<'a, I>(keys: I) -> Result<Fst, FstError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let _span = debug_span!("fst_build").entered();
        let mut builder = Self::new();
        for key in keys {
            builder.insert(key)?;
        }
        let bytes = builder.finish();
        debug!(bytes = bytes.len());
        Fst::from_bytes(bytes)
    }

    /// Append the next key and return its id.
    pub fn insert(&mut self, key: &str) -> Result<u32, FstError> {
        let position = self.count as usize;
        let labels: Vec<u16> = key.encode_utf16().collect();
        if labels.is_empty() {
            return Err(FstError::EmptyKey(position));
        }
        if self.count > 0 && labels <= self.prev {
            return Err(FstError::Unsorted(position));
        }
        if self.count >= i32::MAX as u32 {
            return Err(FstError::TooManyKeys);
        }
        let id = self.count + 1;

        let common = labels
            .iter()
            .zip(self.prev.iter())
            .take_while(|(a, b)| a == b)
            .count();
        self.freeze_down_to(common);

        let prefix_sum: u32 = self.open[..common]
            .iter()
            .filter_map(|s| s.pending.map(|(_, out)| out))
            .sum();

        // Only the first new transition carries output; later ones carry zero.
        let mut output = id - prefix_sum;
        for &label in &labels[common..] {
            let last = self.open.len() - 1;
            self.open[last].pending = Some((label, output));
            self.open.push(OpenState::default());
            output = 0;
        }
        if let Some(tail) = self.open.last_mut() {
            tail.accept = true;
        }

        self.prev = labels;
        self.count = id;
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Freeze every open state deeper than `depth`.
    fn freeze_down_to(&mut self, depth: usize) {
        while self.open.len() > depth + 1 {
            let Some(state) = self.open.pop() else {
                break;
            };
            let child = self.register(FrozenState {
                accept: state.accept,
                arcs: state.arcs,
            });
            if let Some(parent) = self.open.last_mut() {
                if let Some((label, output)) = parent.pending.take() {
                    parent.arcs.push((label, output, child));
                }
            }
        }
    }

    fn register(&mut self, state: FrozenState) -> StateId {
        if let Some(&id) = self.registry.get(&state) {
            return id;
        }
        let id = self.frozen.len();
        self.frozen.push(state.clone());
        self.registry.insert(state, id);
        id
    }

    /// Freeze the remaining path and serialize, root last.
    pub fn finish(mut self) -> Vec<u8> {
        self.freeze_down_to(0);
        let root = self.open.pop().unwrap_or_default();
        self.frozen.push(FrozenState {
            accept: root.accept,
            arcs: root.arcs,
        });

        let mut buf = Vec::new();
        let mut addresses: Vec<usize> = Vec::with_capacity(self.frozen.len());
        for state in &self.frozen {
            let max_target = state
                .arcs
                .iter()
                .map(|&(_, _, t)| addresses[t] as u32)
                .max()
                .unwrap_or(0);
            let max_output = state.arcs.iter().map(|&(_, o, _)| o).max().unwrap_or(0);
            let jump_w = width_of(max_target);
            let out_w = width_of(max_output);
            for &(label, output, target) in &state.arcs {
                buf.extend_from_slice(&label.to_le_bytes()[..LABEL_WIDTH]);
                buf.extend_from_slice(&(addresses[target] as u32).to_le_bytes()[..jump_w]);
                buf.extend_from_slice(&output.to_le_bytes()[..out_w]);
            }
            buf.extend_from_slice(&(state.arcs.len() as u32).to_le_bytes()[..COUNT_WIDTH]);
            let mut header = ((jump_w as u8) << JUMP_SHIFT) | ((out_w as u8) << OUTPUT_SHIFT);
            if state.accept {
                header |= ACCEPT_BIT;
            }
            addresses.push(buf.len());
            buf.push(header);
        }
        buf
    }
}
