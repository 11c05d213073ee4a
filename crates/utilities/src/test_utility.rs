use std::collections::HashSet;
use std::hash::Hash;

use rand::distr::uniform::SampleUniform;
use rand::Rng;

/// Returns a vector of the given length with random values (from 0..max_value).
pub fn random_vector<T: Copy + Default + SampleUniform + PartialOrd>(length: usize, max_value: T) -> Vec<T> {
    let mut rng = rand::rng();
    let mut vector: Vec<T> = Vec::new();
    for _ in 0..length {
        vector.push(rng.random_range(T::default()..max_value));
    }

    vector
}

/// Returns a set of 'amount' vectors where every vector has the given length.
pub fn random_vector_set<T: Copy + Default + Eq + Hash + SampleUniform + PartialOrd>(
    amount: usize,
    length: usize,
    max_value: T,
) -> HashSet<Vec<T>> {
    let mut result: HashSet<Vec<T>> = HashSet::new();

    // Insert 'amount' number of vectors into the result.
    for _ in 0..amount {
        result.insert(random_vector(length, max_value));
    }

    result
}
