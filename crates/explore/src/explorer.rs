use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::debug;
use log::info;
use log::warn;
use rustc_hash::FxHashMap;
use thiserror::Error;

use mcrl2::data::DataExpression;
use mcrl2::data::DataVariable;
use mcrl2::lps::LinearProcessSpecification;
use mcrl2::Mcrl2Error;
use mcrl2rust_lts::LabelIndex;
use mcrl2rust_lts::LabelledTransitionSystem;
use mcrl2rust_lts::LtsBuilder;
use mcrl2rust_lts::StateIndex;
use mcrl2rust_utilities::IndexedSet;

use crate::ExploreOptions;
use crate::ExploreStatus;
use crate::LevelStatistics;
use crate::NextStateGenerator;
use crate::Successor;

/// The state space of a linear process, which can be partial when the
/// exploration did not complete.
#[derive(Debug)]
pub struct ExploreResult {
    /// The state with index zero is the initial state.
    pub lts: LabelledTransitionSystem,

    pub parameters: Vec<DataVariable>,

    /// The parameter values of every state, when they are stored.
    pub states: Option<Vec<Vec<DataExpression>>>,

    pub deadlocks: Vec<StateIndex>,
    pub nondeterministic_states: Vec<StateIndex>,

    pub status: ExploreStatus,
    pub levels: Vec<LevelStatistics>,
}

/// An error that occurred while exploring, together with the state space
/// that was generated before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ExploreError {
    #[source]
    pub error: Mcrl2Error,
    pub partial: Box<ExploreResult>,
}

/// Generates the state space of a linear process in breadth first order.
pub struct Explorer {
    generator: NextStateGenerator,
    options: ExploreOptions,
    abort: Arc<AtomicBool>,
}

impl Explorer {
    pub fn new(lps: &LinearProcessSpecification, options: ExploreOptions) -> Result<Explorer, Mcrl2Error> {
        Ok(Explorer {
            generator: NextStateGenerator::new(lps, &options)?,
            options,
            abort: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the flag that aborts the exploration when it is set, for
    /// example from a signal handler.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        self.abort.clone()
    }

    /// Replaces the abort flag by one that is owned by the caller.
    pub fn with_abort_handle(mut self, abort: Arc<AtomicBool>) -> Explorer {
        self.abort = abort;
        self
    }

    /// Requests the exploration to stop before the next state is explored.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    /// Explores the reachable states, see [ExploreResult].
    pub fn explore(&mut self) -> Result<ExploreResult, ExploreError> {
        let mut exploration = Exploration::new(self.generator.initial_state().to_vec());
        let mut successors: Vec<Successor> = Vec::new();
        let mut status = ExploreStatus::Completed;

        while let Some((state_index, state)) = exploration.queue.pop_front() {
            if self.abort.load(Ordering::Relaxed) {
                info!("The exploration was aborted");
                exploration.queue.push_front((state_index, state));
                status = ExploreStatus::Aborted;
                break;
            }

            if exploration.states.len() >= self.options.max_states {
                exploration.queue.push_front((state_index, state));
                break;
            }

            exploration.start_state(state_index);

            successors.clear();
            if let Err(error) = self.generator.successors(&state, &mut successors) {
                return Err(ExploreError {
                    error,
                    partial: Box::new(exploration.finish(self.generator.parameters(), &self.options, ExploreStatus::Aborted)),
                });
            }

            exploration.add_successors(state_index, successors.drain(..), &self.options);
        }

        if status == ExploreStatus::Completed && (exploration.truncated || !exploration.queue.is_empty()) {
            info!("The maximum number of {} states was reached", self.options.max_states);
            status = ExploreStatus::MaxStatesReached;
        }

        if let Some((size, hits, misses)) = self.generator.cache_statistics() {
            debug!("The enumeration cache has {size} entries, {hits} hits and {misses} misses");
        }

        Ok(exploration.finish(self.generator.parameters(), &self.options, status))
    }
}

/// Explores the state space of the linear process with the given options.
pub fn explore(lps: &LinearProcessSpecification, options: ExploreOptions) -> Result<ExploreResult, ExploreError> {
    let mut explorer = Explorer::new(lps, options).map_err(|error| ExploreError {
        error,
        partial: Box::new(ExploreResult {
            lts: LtsBuilder::new().finish(0),
            parameters: lps.parameters.clone(),
            states: None,
            deadlocks: Vec::new(),
            nondeterministic_states: Vec::new(),
            status: ExploreStatus::Aborted,
            levels: Vec::new(),
        }),
    })?;

    explorer.explore()
}

/// The data of a single exploration.
struct Exploration {
    states: IndexedSet<Vec<DataExpression>>,
    builder: LtsBuilder,
    queue: VecDeque<(StateIndex, Vec<DataExpression>)>,

    deadlocks: Vec<StateIndex>,
    nondeterministic_states: Vec<StateIndex>,

    levels: Vec<LevelStatistics>,
    level: LevelStatistics,

    /// The first state index of the next level.
    level_end: StateIndex,

    /// Becomes true when a transition was dropped because of the maximum number of states.
    truncated: bool,
    todo_warned: bool,

    outgoing: Vec<(LabelIndex, StateIndex)>,
}

impl Exploration {
    fn new(initial_state: Vec<DataExpression>) -> Exploration {
        let mut states = IndexedSet::new();
        let (initial, _) = states.insert(initial_state.clone());

        let mut builder = LtsBuilder::new();
        builder.require_state(initial);

        let mut queue = VecDeque::new();
        queue.push_back((initial, initial_state));

        Exploration {
            states,
            builder,
            queue,
            deadlocks: Vec::new(),
            nondeterministic_states: Vec::new(),
            levels: Vec::new(),
            level: LevelStatistics {
                new_states: 1,
                ..Default::default()
            },
            level_end: 1,
            truncated: false,
            todo_warned: false,
            outgoing: Vec::new(),
        }
    }

    /// Updates the level statistics before the given state is explored.
    fn start_state(&mut self, state_index: StateIndex) {
        if state_index >= self.level_end {
            debug!("{}", self.level);
            let next = self.level.level + 1;
            self.levels.push(self.level);
            self.level = LevelStatistics {
                level: next,
                ..Default::default()
            };
            self.level_end = self.states.len();
        }

        self.level.explored_states += 1;
    }

    fn add_successors(
        &mut self,
        state_index: StateIndex,
        successors: impl Iterator<Item = Successor>,
        options: &ExploreOptions,
    ) {
        self.outgoing.clear();

        for successor in successors {
            let to = match self.states.index(&successor.state) {
                Some(to) => to,
                None => {
                    if self.states.len() >= options.max_states {
                        self.truncated = true;
                        continue;
                    }

                    let (to, _) = self.states.insert(successor.state.clone());
                    self.level.new_states += 1;

                    if self.queue.len() >= options.todo_max {
                        if !self.todo_warned {
                            warn!(
                                "The number of states to explore exceeds {}, new states are no longer explored",
                                options.todo_max
                            );
                            self.todo_warned = true;
                        }
                    } else {
                        self.queue.push_back((to, successor.state));
                    }

                    to
                }
            };

            let label = self.builder.label_index(&successor.label);
            self.builder.add_transition_index(state_index, label, to);
            self.level.transitions += 1;
            self.outgoing.push((label, to));
        }

        if options.detect_deadlock && self.outgoing.is_empty() {
            info!("Deadlock found in state {state_index}");
            self.deadlocks.push(state_index);
        }

        if options.detect_nondeterminism && is_nondeterministic(&self.outgoing) {
            info!("Nondeterministic state found: {state_index}");
            self.nondeterministic_states.push(state_index);
        }
    }

    fn finish(mut self, parameters: &[DataVariable], options: &ExploreOptions, status: ExploreStatus) -> ExploreResult {
        if self.level.explored_states > 0 {
            debug!("{}", self.level);
            self.levels.push(self.level);
        }

        let lts = self.builder.finish(0);
        info!(
            "Explored {} states and {} transitions in {} levels ({status})",
            lts.num_of_states(),
            lts.num_of_transitions(),
            self.levels.len()
        );

        ExploreResult {
            lts,
            parameters: parameters.to_vec(),
            states: options.store_state_values.then(|| self.states.into_vec()),
            deadlocks: self.deadlocks,
            nondeterministic_states: self.nondeterministic_states,
            status,
            levels: self.levels,
        }
    }
}

/// Returns true iff two of the transitions have the same label but a different target.
fn is_nondeterministic(outgoing: &[(LabelIndex, StateIndex)]) -> bool {
    let mut targets: FxHashMap<LabelIndex, StateIndex> = FxHashMap::default();

    outgoing
        .iter()
        .any(|(label, to)| *targets.entry(*label).or_insert(*to) != *to)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_is_nondeterministic() {
        assert!(!is_nondeterministic(&[(1, 0), (2, 1), (1, 0)]));
        assert!(is_nondeterministic(&[(1, 0), (2, 1), (1, 2)]));
        assert!(!is_nondeterministic(&[]));
    }
}
