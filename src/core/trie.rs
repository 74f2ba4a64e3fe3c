//! Ordered trie for prefix lookup.
//!
//! Children are kept in byte order so iteration yields keys in lexicographic
//! order, which is what command listings and autocomplete present.

use std::collections::BTreeMap;

/// A trie (prefix tree) keyed by strings.
///
/// # Complexity
///
/// - `get`, `insert`, `remove`: O(k) where k = key length
/// - `prefix_iter`: O(k + m) where m = size of the matching subtree
///
/// # Examples
///
/// ```
/// use bevy_console_engine::core::Trie;
///
/// let mut trie = Trie::new();
/// trie.insert("spawn", 1);
/// trie.insert("speed", 2);
/// trie.insert("help", 3);
///
/// let keys: Vec<_> = trie.prefix_iter("sp").map(|(k, _)| k).collect();
/// assert_eq!(keys, vec!["spawn", "speed"]);
/// ```
#[derive(Debug, Clone)]
pub struct Trie<V> {
    root: TrieNode<V>,
    len: usize,
}

#[derive(Debug, Clone)]
struct TrieNode<V> {
    children: BTreeMap<u8, TrieNode<V>>,
    entry: Option<(Box<str>, V)>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
            entry: None,
        }
    }
}

impl<V> TrieNode<V> {
    fn is_vacant(&self) -> bool {
        self.entry.is_none() && self.children.is_empty()
    }

    fn find(&self, key: &[u8]) -> Option<&TrieNode<V>> {
        key.iter()
            .try_fold(self, |node, byte| node.children.get(byte))
    }

    /// Remove `key` below this node, pruning branches left empty.
    fn remove(&mut self, key: &[u8]) -> Option<V> {
        let Some((first, rest)) = key.split_first() else {
            return self.entry.take().map(|(_, value)| value);
        };

        let child = self.children.get_mut(first)?;
        let removed = child.remove(rest);
        if child.is_vacant() {
            self.children.remove(first);
        }
        removed
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    /// Create a new empty trie.
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a key-value pair.
    ///
    /// Returns the previous value if the key already existed.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for &byte in key.as_bytes() {
            node = node.children.entry(byte).or_default();
        }

        let old = node.entry.replace((key.into(), value)).map(|(_, v)| v);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.root
            .find(key.as_bytes())?
            .entry
            .as_ref()
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let mut node = &mut self.root;
        for byte in key.as_bytes() {
            node = node.children.get_mut(byte)?;
        }
        node.entry.as_mut().map(|(_, value)| value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key from the trie.
    ///
    /// Returns the removed value if it existed.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let removed = self.root.remove(key.as_bytes());
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Iterate over all entries whose key starts with `prefix`, in
    /// lexicographic order.
    ///
    /// The prefix itself is not required to be a key in the trie.
    pub fn prefix_iter(&self, prefix: &str) -> PrefixIter<'_, V> {
        PrefixIter {
            stack: self.root.find(prefix.as_bytes()).into_iter().collect(),
        }
    }

    /// Iterate over all entries in lexicographic order.
    pub fn iter(&self) -> PrefixIter<'_, V> {
        self.prefix_iter("")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.root = TrieNode::default();
        self.len = 0;
    }
}

/// Pre-order iterator over entries sharing a prefix.
pub struct PrefixIter<'a, V> {
    stack: Vec<&'a TrieNode<V>>,
}

impl<'a, V> Iterator for PrefixIter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            // Reversed so the smallest byte is popped first
            self.stack.extend(node.children.values().rev());

            if let Some((key, value)) = &node.entry {
                return Some((&**key, value));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trie_basic() {
        let mut trie = Trie::new();
        assert!(trie.is_empty());

        trie.insert("hello", 1);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get("hello"), Some(&1));
        assert_eq!(trie.get("hell"), None);
        assert!(!trie.contains("world"));
    }

    #[test]
    fn test_trie_overwrite() {
        let mut trie = Trie::new();
        assert_eq!(trie.insert("key", 1), None);
        assert_eq!(trie.insert("key", 2), Some(1));
        assert_eq!(trie.get("key"), Some(&2));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_trie_remove_prunes() {
        let mut trie = Trie::new();
        trie.insert("test", 1);
        trie.insert("testing", 2);

        assert_eq!(trie.remove("testing"), Some(2));
        assert_eq!(trie.remove("testing"), None);
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get("test"), Some(&1));

        assert_eq!(trie.remove("test"), Some(1));
        assert!(trie.is_empty());
        assert!(trie.root.is_vacant());
    }

    #[test]
    fn test_trie_lexicographic_order() {
        let mut trie = Trie::new();
        for key in ["speed", "help", "spawn", "sp", "spawn_all", "alias"] {
            trie.insert(key, ());
        }

        let keys: Vec<_> = trie.keys().collect();
        assert_eq!(keys, vec!["alias", "help", "sp", "spawn", "spawn_all", "speed"]);

        let keys: Vec<_> = trie.prefix_iter("sp").map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["sp", "spawn", "spawn_all", "speed"]);

        assert_eq!(trie.prefix_iter("xyz").count(), 0);
    }

    #[test]
    fn test_trie_get_mut() {
        let mut trie = Trie::new();
        trie.insert("key", 1);
        if let Some(v) = trie.get_mut("key") {
            *v = 42;
        }
        assert_eq!(trie.get("key"), Some(&42));
    }

    #[test]
    fn test_trie_clear() {
        let mut trie = Trie::new();
        trie.insert("a", 1);
        trie.insert("b", 2);
        trie.clear();
        assert!(trie.is_empty());
        assert_eq!(trie.iter().count(), 0);
    }
}
