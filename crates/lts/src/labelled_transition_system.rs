use std::fmt;

/// The index type for a label.
pub type LabelIndex = usize;

/// The index for a state.
pub type StateIndex = usize;

/// The name of the internal action, which always has label index zero.
pub const TAU_LABEL: &str = "tau";

/// An outgoing transition of a state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Transition {
    pub label: LabelIndex,
    pub to: StateIndex,
}

/// Represents a labelled transition system consisting of states with directed
/// labelled edges. The outgoing transitions of a state are stored
/// consecutively, in the order in which they were given.
///
/// The label with index zero is the internal action `tau`, to which all the
/// hidden labels are mapped.
#[derive(PartialEq, Eq)]
pub struct LabelledTransitionSystem {
    states: Vec<State>,
    transitions: Vec<Transition>,

    labels: Vec<String>,
    hidden_labels: Vec<String>,

    initial_state: StateIndex,
}

impl LabelledTransitionSystem {
    /// Creates a labelled transition system with the given number of states
    /// and the transitions (from, label, to), which refer to the given labels.
    ///
    /// The labels in `hidden_labels` are renamed to `tau`, and `tau` is made
    /// the first label.
    pub fn new(
        initial_state: StateIndex,
        num_of_states: usize,
        transitions: &[(StateIndex, LabelIndex, StateIndex)],
        labels: Vec<String>,
        hidden_labels: Vec<String>,
    ) -> LabelledTransitionSystem {
        debug_assert!(
            initial_state < num_of_states.max(1),
            "The initial state {initial_state} does not exist"
        );

        // Determine the new index of every label, where tau and the hidden labels become zero.
        let mut new_labels = vec![TAU_LABEL.to_string()];
        let renaming: Vec<LabelIndex> = labels
            .into_iter()
            .map(|label| {
                if label == TAU_LABEL || hidden_labels.contains(&label) {
                    0
                } else {
                    new_labels.push(label);
                    new_labels.len() - 1
                }
            })
            .collect();

        let num_of_states = transitions
            .iter()
            .fold(num_of_states.max(initial_state + 1), |count, (from, _, to)| {
                count.max(from + 1).max(to + 1)
            });

        // Count the transitions of every state, the start of a state is the end of the previous one.
        let mut states = vec![State::default(); num_of_states];
        for (from, _, _) in transitions {
            states[*from].outgoing_end += 1;
        }

        let mut offset = 0;
        for state in &mut states {
            let count = state.outgoing_end;
            state.outgoing_start = offset;
            state.outgoing_end = offset;
            offset += count;
        }

        let mut placed = vec![
            Transition {
                label: 0,
                to: initial_state
            };
            transitions.len()
        ];
        for (from, label, to) in transitions {
            let state = &mut states[*from];
            placed[state.outgoing_end] = Transition {
                label: renaming[*label],
                to: *to,
            };
            state.outgoing_end += 1;
        }

        LabelledTransitionSystem {
            states,
            transitions: placed,
            labels: new_labels,
            hidden_labels,
            initial_state,
        }
    }

    /// Returns the index of the initial state
    pub fn initial_state_index(&self) -> StateIndex {
        self.initial_state
    }

    /// Returns the outgoing transitions of the given state.
    pub fn outgoing_transitions(&self, state_index: StateIndex) -> &[Transition] {
        let state = &self.states[state_index];
        &self.transitions[state.outgoing_start..state.outgoing_end]
    }

    /// Iterates over all transitions (from, label, to) ordered by source state.
    pub fn iter_transitions(&self) -> impl Iterator<Item = (StateIndex, LabelIndex, StateIndex)> + '_ {
        self.iter_states().flat_map(move |from| {
            self.outgoing_transitions(from)
                .iter()
                .map(move |transition| (from, transition.label, transition.to))
        })
    }

    /// Iterate over all state_index in the labelled transition system
    pub fn iter_states(&self) -> impl Iterator<Item = StateIndex> {
        0..self.states.len()
    }

    /// Returns the number of states.
    pub fn num_of_states(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of labels.
    pub fn num_of_labels(&self) -> usize {
        self.labels.len()
    }

    /// Returns the number of transitions.
    pub fn num_of_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Returns the list of labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the list of hidden labels.
    pub fn hidden_labels(&self) -> &[String] {
        &self.hidden_labels
    }

    /// Returns true iff the given label index is a hidden label.
    pub fn is_hidden_label(&self, label_index: LabelIndex) -> bool {
        label_index == 0
    }

    /// Returns true iff the state has no outgoing transitions.
    pub fn is_deadlock(&self, state_index: StateIndex) -> bool {
        self.outgoing_transitions(state_index).is_empty()
    }
}

/// The range of the outgoing transitions of a state.
#[derive(Clone, Default, PartialEq, Eq)]
struct State {
    outgoing_start: usize,
    outgoing_end: usize,
}

impl fmt::Display for LabelledTransitionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of states: {}", self.states.len())?;
        writeln!(f, "Number of action labels: {}", self.labels.len())?;
        write!(f, "Number of transitions: {}", self.transitions.len())
    }
}

impl fmt::Debug for LabelledTransitionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self)?;
        writeln!(f, "Initial state: {}", self.initial_state)?;
        writeln!(f, "Hidden labels: {:?}", self.hidden_labels)?;

        for (from, label, to) in self.iter_transitions() {
            writeln!(f, "{from} --[{}]-> {to}", self.labels[label])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_hidden_labels() {
        let lts = LabelledTransitionSystem::new(
            0,
            3,
            &[(0, 0, 1), (1, 1, 2), (0, 2, 2)],
            vec!["a".into(), "b".into(), "tau".into()],
            vec!["b".into()],
        );

        assert_eq!(lts.labels(), &["tau".to_string(), "a".to_string()]);
        assert_eq!(lts.num_of_transitions(), 3);

        let labels: Vec<LabelIndex> = lts.iter_transitions().map(|(_, label, _)| label).collect();
        assert_eq!(labels, vec![1, 0, 0]);
        assert!(lts.is_deadlock(2));
    }

    #[test]
    fn test_transition_order_is_kept() {
        let lts = LabelledTransitionSystem::new(
            0,
            2,
            &[(1, 0, 0), (0, 1, 1), (0, 0, 0)],
            vec!["a".into(), "b".into()],
            Vec::new(),
        );

        let transitions: Vec<_> = lts.iter_transitions().collect();
        assert_eq!(transitions, vec![(0, 2, 1), (0, 1, 0), (1, 1, 0)]);
    }
}
