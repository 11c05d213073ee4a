use rustc_hash::FxHashMap;

use mcrl2::data::DataExpression;

/// The key of a cached enumeration, the index of the summand together with
/// the values of the parameters that occur in its condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub summand: usize,
    pub projection: Vec<DataExpression>,
}

/// Memoises the values of the summation variables for which the condition of
/// a summand holds. Terms are maximally shared, so hashing a projection only
/// hashes the term identities.
#[derive(Default)]
pub struct EnumerationCache {
    solutions: FxHashMap<CacheKey, Vec<Vec<DataExpression>>>,
    hits: usize,
    misses: usize,
}

impl EnumerationCache {
    pub fn new() -> EnumerationCache {
        EnumerationCache::default()
    }

    /// Returns the cached solutions for the given key, if any.
    pub fn get(&mut self, key: &CacheKey) -> Option<&[Vec<DataExpression>]> {
        match self.solutions.get(key) {
            Some(solutions) => {
                self.hits += 1;
                Some(solutions)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, solutions: Vec<Vec<DataExpression>>) {
        self.solutions.insert(key, solutions);
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Returns the number of hits and misses.
    pub fn statistics(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use mcrl2::data::standard::nat;

    use super::*;

    #[test]
    fn test_enumeration_cache() {
        let mut cache = EnumerationCache::new();
        let key = CacheKey {
            summand: 0,
            projection: vec![nat(1)],
        };

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), vec![vec![nat(2)], vec![nat(3)]]);

        assert_eq!(cache.get(&key).map(|solutions| solutions.len()), Some(2));
        assert!(cache
            .get(&CacheKey {
                summand: 1,
                projection: vec![nat(1)]
            })
            .is_none());
        assert_eq!(cache.statistics(), (1, 2));
    }
}
