//! Trie of type vectors supporting the dominance query used to skip already-covered faces.

use std::fmt;

use smallvec::SmallVec;

#[derive(Clone, Debug)]
struct Node<const K: usize> {
    /// Arena index of each child; `0` means absent (the root is never a child).
    children: [u32; K],
    terminal: bool,
}

impl<const K: usize> Node<K> {
    #[inline(always)]
    fn new() -> Self {
        Self {
            children: [0; K],
            terminal: false,
        }
    }
}

/// Set of type vectors over the alphabet `0..K`.
///
/// Trailing zeros are insignificant: `[1, 0, 2]` and `[1, 0, 2, 0, 0]` are the same type vector,
/// and the empty vector is stored at the root.
#[derive(Clone, Debug)]
pub struct TypeTrie<const K: usize> {
    nodes: Vec<Node<K>>,
}

impl<const K: usize> Default for TypeTrie<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize> TypeTrie<K> {
    const ALPHABET_OK: () = assert!(K >= 1 && K <= 256, "type trie alphabet must be 1..=256");

    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::ALPHABET_OK;
        Self {
            nodes: vec![Node::new()],
        }
    }

    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0] = Node::new();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && !self.nodes[0].terminal
    }

    /// Inserts a type vector; returns `false` if it was already present.
    ///
    /// # Panics
    ///
    /// Panics if an entry is outside the alphabet `0..K`.
    pub fn insert(&mut self, entries: &[u8]) -> bool {
        let len = entries.iter().rposition(|&x| x != 0).map_or(0, |i| i + 1);
        let mut node = 0usize;
        for &value in &entries[..len] {
            let value = value as usize;
            assert!(value < K, "type value {value} outside alphabet of size {K}");
            let child = self.nodes[node].children[value];
            node = if child == 0 {
                let id = self.nodes.len();
                self.nodes.push(Node::new());
                self.nodes[node].children[value] = id as u32;
                id
            } else {
                child as usize
            };
        }
        !std::mem::replace(&mut self.nodes[node].terminal, true)
    }

    /// True iff some stored `u` has `u[i]` equal to `0` or `v[i]` at every position.
    pub fn dominates(&self, v: &[u8]) -> bool {
        let mut stack: SmallVec<[(u32, usize); 16]> = SmallVec::with_capacity(v.len() + 2);
        stack.push((0, 0));
        while let Some((node, depth)) = stack.pop() {
            let node = &self.nodes[node as usize];
            if node.terminal {
                return true;
            }
            if depth >= v.len() {
                continue;
            }
            let zero = node.children[0];
            if zero != 0 {
                stack.push((zero, depth + 1));
            }
            let value = v[depth] as usize;
            if value != 0 {
                if let Some(&child) = node.children.get(value) {
                    if child != 0 {
                        stack.push((child, depth + 1));
                    }
                }
            }
        }
        false
    }

    pub fn contains(&self, entries: &[u8]) -> bool {
        let len = entries.iter().rposition(|&x| x != 0).map_or(0, |i| i + 1);
        let mut node = 0usize;
        for &value in &entries[..len] {
            match self.nodes[node].children.get(value as usize) {
                Some(&child) if child != 0 => node = child as usize,
                _ => return false,
            }
        }
        self.nodes[node].terminal
    }

    /// Stored type vectors in lexicographic order, without trailing zeros.
    pub fn words(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        self.collect(0, &mut prefix, &mut out);
        out
    }

    fn collect(&self, node: usize, prefix: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
        if self.nodes[node].terminal {
            out.push(prefix.clone());
        }
        for (value, &child) in self.nodes[node].children.iter().enumerate() {
            if child != 0 {
                prefix.push(value as u8);
                self.collect(child as usize, prefix, out);
                prefix.pop();
            }
        }
    }
}

impl<const K: usize> PartialEq for TypeTrie<K> {
    fn eq(&self, other: &Self) -> bool {
        self.words() == other.words()
    }
}

impl<const K: usize> Eq for TypeTrie<K> {}

impl<const K: usize> fmt::Display for TypeTrie<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for word in self.words() {
            f.write_str(" [")?;
            for (i, x) in word.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{x}")?;
            }
            f.write_str("]")?;
        }
        f.write_str(" }")
    }
}
