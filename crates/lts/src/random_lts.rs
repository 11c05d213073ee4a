use rand::Rng;

use crate::LabelledTransitionSystem;
use crate::LtsBuilder;

/// Generates an LTS with the desired number of states and labels, where every
/// state has at most `outdegree - 1` outgoing transitions. The label `tau` is
/// one of the labels.
pub fn random_lts(num_of_states: usize, num_of_labels: u32, outdegree: usize) -> LabelledTransitionSystem {
    let mut builder = LtsBuilder::new();

    // Introduce lower case letters for the labels, the first one being tau.
    let labels: Vec<usize> = (0..num_of_labels.max(1))
        .map(|i| match char::from_digit(i + 10, 36) {
            Some(letter) if i > 0 => builder.label_index(&letter.to_string()),
            _ => builder.label_index("tau"),
        })
        .collect();

    let mut rng = rand::rng();
    for from in 0..num_of_states {
        builder.require_state(from);

        for _ in 0..rng.random_range(0..outdegree.max(1)) {
            let label = labels[rng.random_range(0..labels.len())];
            let to = rng.random_range(0..num_of_states);
            builder.add_transition_index(from, label, to);
        }
    }

    builder.finish(0)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_random_lts() {
        let lts = random_lts(10, 3, 3);

        assert_eq!(lts.num_of_states(), 10);
        assert!(lts.num_of_labels() <= 3);
    }
}
