use mcrl2rust_utilities::IndexedSet;

use crate::LabelIndex;
use crate::LabelledTransitionSystem;
use crate::StateIndex;
use crate::TAU_LABEL;

/// Incrementally constructs a labelled transition system, where states are
/// numbered in the order in which they are added and labels are interned by
/// their name.
pub struct LtsBuilder {
    labels: IndexedSet<String>,
    hidden_labels: Vec<String>,
    transitions: Vec<(StateIndex, LabelIndex, StateIndex)>,
    num_of_states: usize,
}

impl LtsBuilder {
    pub fn new() -> LtsBuilder {
        LtsBuilder::with_hidden_labels(Vec::new())
    }

    /// Creates a builder for which the given labels are renamed to tau.
    pub fn with_hidden_labels(hidden_labels: Vec<String>) -> LtsBuilder {
        let mut labels = IndexedSet::new();
        labels.insert(TAU_LABEL.to_string());

        LtsBuilder {
            labels,
            hidden_labels,
            transitions: Vec::new(),
            num_of_states: 0,
        }
    }

    /// Adds a new state and returns its index.
    pub fn add_state(&mut self) -> StateIndex {
        self.num_of_states += 1;
        self.num_of_states - 1
    }

    /// Makes sure that the states up to and including the given index exist.
    pub fn require_state(&mut self, state: StateIndex) {
        self.num_of_states = self.num_of_states.max(state + 1);
    }

    /// Returns the index of the given label, adding it when necessary.
    pub fn label_index(&mut self, label: &str) -> LabelIndex {
        match self.labels.index(&label.to_string()) {
            Some(index) => index,
            None => self.labels.insert(label.to_string()).0,
        }
    }

    /// Adds the transition `from --label--> to`, the states do not have to be
    /// added before.
    pub fn add_transition(&mut self, from: StateIndex, label: &str, to: StateIndex) {
        let label = self.label_index(label);
        self.add_transition_index(from, label, to);
    }

    /// Adds a transition with a label index obtained from [LtsBuilder::label_index].
    pub fn add_transition_index(&mut self, from: StateIndex, label: LabelIndex, to: StateIndex) {
        debug_assert!(label < self.labels.len(), "Unknown label index {label}");
        self.require_state(from.max(to));
        self.transitions.push((from, label, to));
    }

    pub fn num_of_states(&self) -> usize {
        self.num_of_states
    }

    pub fn num_of_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Returns the labelled transition system with the given initial state.
    pub fn finish(self, initial_state: StateIndex) -> LabelledTransitionSystem {
        let num_of_states = self.num_of_states.max(initial_state + 1);
        LabelledTransitionSystem::new(
            initial_state,
            num_of_states,
            &self.transitions,
            self.labels.into_vec(),
            self.hidden_labels,
        )
    }
}

impl Default for LtsBuilder {
    fn default() -> Self {
        LtsBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_builder() {
        let mut builder = LtsBuilder::with_hidden_labels(vec!["b".to_string()]);
        let s0 = builder.add_state();
        builder.add_transition(s0, "a", 1);
        builder.add_transition(1, "b", 2);
        builder.add_transition(2, "a", s0);

        assert_eq!(builder.num_of_states(), 3);

        let lts = builder.finish(s0);
        assert_eq!(lts.num_of_states(), 3);
        assert_eq!(lts.num_of_transitions(), 3);
        assert_eq!(lts.labels(), &["tau".to_string(), "a".to_string()]);
        assert!(lts.is_hidden_label(lts.outgoing_transitions(1)[0].label));
    }

    #[test]
    fn test_single_state() {
        let lts = LtsBuilder::new().finish(0);

        assert_eq!(lts.num_of_states(), 1);
        assert_eq!(lts.num_of_transitions(), 0);
        assert!(lts.is_deadlock(0));
    }
}
