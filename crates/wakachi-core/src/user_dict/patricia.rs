//! Crit-bit (binary Patricia) trie keyed by strings.
//!
//! Keys are viewed as sequences of 9-bit symbols: a presence bit followed by
//! the 8 bits of each UTF-8 byte, with absent positions reading as zero. A
//! key therefore never collides with its own extensions, and branch nodes
//! only test the bits where stored keys actually differ.

const SYMBOL_BITS: usize = 9;

#[derive(Debug)]
enum Node<V> {
    Leaf { key: Box<str>, value: V },
    Branch { bit: usize, children: [usize; 2] },
}

/// Arena-allocated crit-bit trie.
#[derive(Debug)]
pub struct PatriciaTrie<V> {
    nodes: Vec<Node<V>>,
    root: Option<usize>,
    len: usize,
}

impl<V> Default for PatriciaTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PatriciaTrie<V> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a key, returning the previous value if it was present.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let Some(root) = self.root else {
            self.root = Some(self.push_leaf(key, value));
            self.len = 1;
            return None;
        };

        let nearest = self.walk(root, key.as_bytes(), usize::MAX);
        let crit = match &mut self.nodes[nearest] {
            Node::Leaf {
                key: existing,
                value: slot,
            } => match first_difference(key.as_bytes(), existing.as_bytes()) {
                Some(crit) => crit,
                None => return Some(std::mem::replace(slot, value)),
            },
            Node::Branch { .. } => unreachable!("walk stops at leaves"),
        };

        // Find where the new branch belongs: above the first node testing a later bit.
        let mut parent: Option<(usize, usize)> = None;
        let mut cur = root;
        while let Node::Branch { bit, children } = &self.nodes[cur] {
            if *bit > crit {
                break;
            }
            let dir = bit_at(key.as_bytes(), *bit);
            parent = Some((cur, dir));
            cur = children[dir];
        }

        let leaf = self.push_leaf(key, value);
        let children = if bit_at(key.as_bytes(), crit) == 1 {
            [cur, leaf]
        } else {
            [leaf, cur]
        };
        let branch = self.nodes.len();
        self.nodes.push(Node::Branch {
            bit: crit,
            children,
        });
        match parent {
            None => self.root = Some(branch),
            Some((p, dir)) => {
                if let Node::Branch { children, .. } = &mut self.nodes[p] {
                    children[dir] = branch;
                }
            }
        }
        self.len += 1;
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let leaf = self.walk(self.root?, key.as_bytes(), usize::MAX);
        match &self.nodes[leaf] {
            Node::Leaf { key: k, value } if **k == *key => Some(value),
            _ => None,
        }
    }

    /// Whether any stored key starts with `prefix`.
    pub fn contains_key_prefix(&self, prefix: &str) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let limit = prefix.len() * SYMBOL_BITS;
        // Below `limit` every key in the subtree shares the prefix bits, so one leaf decides.
        let top = self.walk(root, prefix.as_bytes(), limit);
        let leaf = self.leftmost_leaf(top);
        match &self.nodes[leaf] {
            Node::Leaf { key, .. } => key.as_bytes().starts_with(prefix.as_bytes()),
            Node::Branch { .. } => false,
        }
    }

    /// Follow `key`'s bits from `from` through branches testing bits below `limit`.
    fn walk(&self, from: usize, key: &[u8], limit: usize) -> usize {
        let mut cur = from;
        while let Node::Branch { bit, children } = &self.nodes[cur] {
            if *bit >= limit {
                break;
            }
            cur = children[bit_at(key, *bit)];
        }
        cur
    }

    fn leftmost_leaf(&self, from: usize) -> usize {
        let mut cur = from;
        while let Node::Branch { children, .. } = &self.nodes[cur] {
            cur = children[0];
        }
        cur
    }

    fn push_leaf(&mut self, key: &str, value: V) -> usize {
        self.nodes.push(Node::Leaf {
            key: key.into(),
            value,
        });
        self.nodes.len() - 1
    }
}

fn symbol(key: &[u8], index: usize) -> u16 {
    key.get(index).map_or(0, |&b| 0x100 | b as u16)
}

/// Bit `pos` of the symbol view of `key`; bit 0 of each symbol is its presence bit.
fn bit_at(key: &[u8], pos: usize) -> usize {
    let s = symbol(key, pos / SYMBOL_BITS);
    let off = pos % SYMBOL_BITS;
    ((s >> (SYMBOL_BITS - 1 - off)) & 1) as usize
}

/// Position of the first differing bit, or `None` for equal keys.
fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    (0..a.len().max(b.len())).find_map(|i| {
        let x = symbol(a, i) ^ symbol(b, i);
        if x == 0 {
            return None;
        }
        let highest = 15 - x.leading_zeros() as usize;
        Some(i * SYMBOL_BITS + (SYMBOL_BITS - 1 - highest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_and_replace() {
        let mut trie = PatriciaTrie::new();
        assert_eq!(trie.insert("クロ", 1), None);
        assert_eq!(trie.insert("クロス", 2), None);
        assert_eq!(trie.insert("ク", 3), None);
        assert_eq!(trie.insert("abc", 4), None);
        assert_eq!(trie.len(), 4);
        assert_eq!(trie.get("クロ"), Some(&1));
        assert_eq!(trie.get("クロス"), Some(&2));
        assert_eq!(trie.get("ク"), Some(&3));
        assert_eq!(trie.get("クロスX"), None);
        assert_eq!(trie.get(""), None);
        assert_eq!(trie.insert("クロ", 9), Some(1));
        assert_eq!(trie.get("クロ"), Some(&9));
        assert_eq!(trie.len(), 4);
    }

    #[test]
    fn prefix_queries() {
        let mut trie = PatriciaTrie::new();
        trie.insert("すし", ());
        trie.insert("すしや", ());
        trie.insert("abd", ());
        assert!(trie.contains_key_prefix(""));
        assert!(trie.contains_key_prefix("す"));
        assert!(trie.contains_key_prefix("すし"));
        assert!(trie.contains_key_prefix("すしや"));
        assert!(!trie.contains_key_prefix("すしやさん"));
        assert!(trie.contains_key_prefix("ab"));
        assert!(!trie.contains_key_prefix("abc"));
        assert!(!trie.contains_key_prefix("b"));
    }

    #[test]
    fn empty_trie() {
        let trie: PatriciaTrie<u32> = PatriciaTrie::new();
        assert!(trie.is_empty());
        assert!(!trie.contains_key_prefix(""));
        assert_eq!(trie.get("a"), None);
    }

    #[test]
    fn many_keys_against_hashmap() {
        let words: Vec<String> = (0..500u32)
            .map(|i| format!("{:x}あ{}", i * 7919 % 1000, i % 13))
            .collect();
        let mut trie = PatriciaTrie::new();
        let mut reference = std::collections::HashMap::new();
        for (i, w) in words.iter().enumerate() {
            assert_eq!(trie.insert(w, i), reference.insert(w.clone(), i));
        }
        for (w, v) in &reference {
            assert_eq!(trie.get(w), Some(v));
            for cut in 0..=w.len() {
                if w.is_char_boundary(cut) {
                    assert!(trie.contains_key_prefix(&w[..cut]));
                }
            }
        }
        assert!(!trie.contains_key_prefix("zz"));
    }
}
