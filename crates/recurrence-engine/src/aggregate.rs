//! Set algebra over collections whose elements are compared by an identity key.
//!
//! The expander uses these operations to intersect candidate date sets, to
//! deduplicate them, and to merge explicit additions and exclusions into the
//! rule-generated occurrences. Each operation is linear in `|a| + |b|`, leaves
//! its inputs untouched, and yields elements in the insertion order of the key
//! index it is built on. When one input repeats a key, the element keeps the
//! position of the first appearance and the value of the last.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Set operations keyed by `identify`.
///
/// ```
/// use recurrence_engine::aggregate::IdentitySet;
///
/// let by_id = IdentitySet::new(|pair: &(u32, char)| pair.0);
/// let a = [(1, 'a'), (2, 'b')];
/// let b = [(2, 'x'), (3, 'y')];
/// assert_eq!(by_id.join(&a, &b), vec![(2, 'x')]);
/// assert_eq!(by_id.union(&a, &b), vec![(1, 'a'), (2, 'x'), (3, 'y')]);
/// assert_eq!(by_id.exclude(&a, &b), vec![(1, 'a')]);
/// assert_eq!(by_id.outer_join(&a, &b), vec![(1, 'a'), (3, 'y')]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IdentitySet<F> {
    identify: F,
}

impl<F> IdentitySet<F> {
    pub fn new(identify: F) -> Self {
        Self { identify }
    }

    /// Intersection by key. The surviving values are taken from `b`, in `b`'s
    /// order; `a` only contributes its keys.
    pub fn join<T, K>(&self, a: &[T], b: &[T]) -> Vec<T>
    where
        F: Fn(&T) -> K,
        K: Hash + Eq + Clone,
        T: Clone,
    {
        let keys: HashSet<K> = a.iter().map(&self.identify).collect();
        self.index(b)
            .into_entries()
            .filter(|(key, _)| keys.contains(key))
            .map(|(_, value)| value)
            .collect()
    }

    /// Every key of `a` and `b`; on a collision the value from `b` wins.
    pub fn union<T, K>(&self, a: &[T], b: &[T]) -> Vec<T>
    where
        F: Fn(&T) -> K,
        K: Hash + Eq + Clone,
        T: Clone,
    {
        let mut index = self.index(a);
        for item in b {
            index.insert((self.identify)(item), item.clone());
        }
        index.into_entries().map(|(_, value)| value).collect()
    }

    /// Elements of `a` whose key does not appear in `b`.
    pub fn exclude<T, K>(&self, a: &[T], b: &[T]) -> Vec<T>
    where
        F: Fn(&T) -> K,
        K: Hash + Eq + Clone,
        T: Clone,
    {
        let removed: HashSet<K> = b.iter().map(&self.identify).collect();
        self.index(a)
            .into_entries()
            .filter(|(key, _)| !removed.contains(key))
            .map(|(_, value)| value)
            .collect()
    }

    /// Elements whose key appears in exactly one of `a` and `b`: those of `a`
    /// first, then those of `b`.
    pub fn outer_join<T, K>(&self, a: &[T], b: &[T]) -> Vec<T>
    where
        F: Fn(&T) -> K,
        K: Hash + Eq + Clone,
        T: Clone,
    {
        let left_keys: HashSet<K> = a.iter().map(&self.identify).collect();
        let right_keys: HashSet<K> = b.iter().map(&self.identify).collect();
        let left_only = self
            .index(a)
            .into_entries()
            .filter(|(key, _)| !right_keys.contains(key));
        let right_only = self
            .index(b)
            .into_entries()
            .filter(|(key, _)| !left_keys.contains(key));
        left_only.chain(right_only).map(|(_, value)| value).collect()
    }

    fn index<T, K>(&self, items: &[T]) -> KeyIndex<K, T>
    where
        F: Fn(&T) -> K,
        K: Hash + Eq + Clone,
        T: Clone,
    {
        let mut index = KeyIndex::with_capacity(items.len());
        for item in items {
            index.insert((self.identify)(item), item.clone());
        }
        index
    }
}

/// Insertion-ordered map: re-inserting a key replaces its value in place.
struct KeyIndex<K, T> {
    positions: HashMap<K, usize>,
    entries: Vec<(K, T)>,
}

impl<K: Hash + Eq + Clone, T> KeyIndex<K, T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    fn insert(&mut self, key: K, value: T) {
        match self.positions.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    fn into_entries(self) -> impl Iterator<Item = (K, T)> {
        self.entries.into_iter()
    }
}
