use std::collections::VecDeque;

use log::debug;
use log::trace;
use rustc_hash::FxHashSet;

use crate::LabelIndex;
use crate::LabelledTransitionSystem;
use crate::StateIndex;

/// Returns the LTS restricted to the states that are reachable from the
/// initial state. The reachable states are renumbered in breadth first order,
/// starting with the initial state as zero.
pub fn remove_unreachable_states(lts: &LabelledTransitionSystem) -> LabelledTransitionSystem {
    let mut renaming: Vec<Option<StateIndex>> = vec![None; lts.num_of_states()];
    let mut queue = VecDeque::new();
    let mut transitions = Vec::new();

    renaming[lts.initial_state_index()] = Some(0);
    queue.push_back(lts.initial_state_index());
    let mut num_of_states = 1;

    while let Some(state) = queue.pop_front() {
        let Some(from) = renaming[state] else {
            continue;
        };

        for transition in lts.outgoing_transitions(state) {
            let to = match renaming[transition.to] {
                Some(to) => to,
                None => {
                    renaming[transition.to] = Some(num_of_states);
                    queue.push_back(transition.to);
                    num_of_states += 1;
                    num_of_states - 1
                }
            };

            transitions.push((from, transition.label, to));
        }
    }

    debug!(
        "Removed {} unreachable states",
        lts.num_of_states() - num_of_states
    );

    // The label indices are kept, so tau stays at index zero.
    LabelledTransitionSystem::new(
        0,
        num_of_states,
        &transitions,
        lts.labels().to_vec(),
        lts.hidden_labels().to_vec(),
    )
}

/// Removes all tau transitions. Every state obtains the visible transitions
/// of the states that it reaches by a (possibly empty) tau path, after which
/// the states that are no longer reachable are removed.
pub fn remove_tau_actions(lts: &LabelledTransitionSystem) -> LabelledTransitionSystem {
    let mut transitions: Vec<(StateIndex, LabelIndex, StateIndex)> = Vec::with_capacity(lts.num_of_transitions());

    // Reused between the states.
    let mut closure = Vec::new();
    let mut visited = vec![false; lts.num_of_states()];
    let mut seen: FxHashSet<(LabelIndex, StateIndex)> = FxHashSet::default();

    for state in lts.iter_states() {
        tau_closure(lts, state, &mut closure, &mut visited);
        trace!("The tau closure of {state} is {closure:?}");

        seen.clear();
        for &source in &closure {
            for transition in lts.outgoing_transitions(source) {
                if !lts.is_hidden_label(transition.label) && seen.insert((transition.label, transition.to)) {
                    transitions.push((state, transition.label, transition.to));
                }
            }
        }

        for &source in &closure {
            visited[source] = false;
        }
    }

    debug!(
        "Replaced {} transitions by {} visible transitions",
        lts.num_of_transitions(),
        transitions.len()
    );

    let result = LabelledTransitionSystem::new(
        lts.initial_state_index(),
        lts.num_of_states(),
        &transitions,
        lts.labels().to_vec(),
        lts.hidden_labels().to_vec(),
    );

    remove_unreachable_states(&result)
}

/// Computes the states reachable from `state` by tau transitions, including
/// `state` itself, in depth first order. The visited states are marked and
/// must be reset by the caller.
fn tau_closure(lts: &LabelledTransitionSystem, state: StateIndex, closure: &mut Vec<StateIndex>, visited: &mut [bool]) {
    closure.clear();
    closure.push(state);
    visited[state] = true;

    let mut stack = vec![state];
    while let Some(inner) = stack.pop() {
        for transition in lts.outgoing_transitions(inner) {
            if lts.is_hidden_label(transition.label) && !visited[transition.to] {
                visited[transition.to] = true;
                closure.push(transition.to);
                stack.push(transition.to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::random_lts;
    use crate::LtsBuilder;

    use super::*;

    #[test]
    fn test_remove_unreachable_states() {
        let mut builder = LtsBuilder::new();
        builder.add_transition(0, "a", 2);
        builder.add_transition(1, "b", 0);
        builder.add_transition(2, "c", 3);
        let lts = remove_unreachable_states(&builder.finish(0));

        assert_eq!(lts.num_of_states(), 3);
        let transitions: Vec<_> = lts
            .iter_transitions()
            .map(|(from, label, to)| (from, lts.labels()[label].as_str(), to))
            .collect();
        assert_eq!(transitions, vec![(0, "a", 1), (1, "c", 2)]);
    }

    #[test]
    fn test_remove_tau_actions() {
        let mut builder = LtsBuilder::new();
        builder.add_transition(0, "tau", 1);
        builder.add_transition(1, "tau", 0);
        builder.add_transition(1, "a", 2);
        builder.add_transition(0, "b", 3);
        let lts = remove_tau_actions(&builder.finish(0));

        assert_eq!(lts.num_of_states(), 3);
        assert_eq!(lts.num_of_transitions(), 2);
        assert!(lts.iter_transitions().all(|(from, label, _)| from == 0 && label != 0));
    }

    #[test]
    fn test_random_remove_tau_actions() {
        for _ in 0..20 {
            let lts = random_lts(10, 3, 3);
            let result = remove_tau_actions(&lts);

            assert!(
                result.iter_transitions().all(|(_, label, _)| !result.is_hidden_label(label)),
                "The result {result:?} still contains tau transitions"
            );
            assert!(result.num_of_states() <= lts.num_of_states());
        }
    }
}
