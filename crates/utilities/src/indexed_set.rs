use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A set that assigns a unique, consecutive index to every inserted element,
/// starting at zero. The elements can be retrieved by index and the index of
/// an element can be looked up in expected constant time.
pub struct IndexedSet<T> {
    elements: Vec<T>,
    indices: FxHashMap<T, usize>,
}

impl<T: Clone + Eq + Hash> IndexedSet<T> {
    pub fn new() -> IndexedSet<T> {
        IndexedSet {
            elements: Vec::new(),
            indices: FxHashMap::default(),
        }
    }

    /// Creates an empty set that can hold the given number of elements
    /// without reallocating.
    pub fn with_capacity(capacity: usize) -> IndexedSet<T> {
        IndexedSet {
            elements: Vec::with_capacity(capacity),
            indices: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Inserts the given element and returns its index, together with true iff
    /// the element was not yet present.
    pub fn insert(&mut self, element: T) -> (usize, bool) {
        if let Some(index) = self.indices.get(&element) {
            return (*index, false);
        }

        let index = self.elements.len();
        self.indices.insert(element.clone(), index);
        self.elements.push(element);
        (index, true)
    }

    /// Returns the index of the given element, if present.
    pub fn index(&self, element: &T) -> Option<usize> {
        self.indices.get(element).copied()
    }

    /// Returns the element with the given index.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn contains(&self, element: &T) -> bool {
        self.indices.contains_key(element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over the elements in the order of their indices.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.elements.iter()
    }

    /// Returns the elements ordered by index, consuming the set.
    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

impl<T: Clone + Eq + Hash> Default for IndexedSet<T> {
    fn default() -> Self {
        IndexedSet::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for IndexedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.elements.iter().enumerate()).finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::random_vector_set;

    use super::*;

    #[test]
    fn test_indexed_set() {
        let mut set = IndexedSet::new();

        assert_eq!(set.insert("a"), (0, true));
        assert_eq!(set.insert("b"), (1, true));
        assert_eq!(set.insert("a"), (0, false));

        assert_eq!(set.index(&"b"), Some(1));
        assert_eq!(set.index(&"c"), None);
        assert_eq!(set.get(0), Some(&"a"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_random_indexed_set() {
        let vectors = random_vector_set(100, 5, 10u32);

        let mut set = IndexedSet::new();
        for vector in &vectors {
            let (index, inserted) = set.insert(vector.clone());
            assert!(inserted, "All vectors are unique");
            assert_eq!(set.get(index), Some(vector));
        }

        for (index, vector) in set.iter().enumerate() {
            assert_eq!(set.index(vector), Some(index), "The indices form a bijection");
        }
    }
}
