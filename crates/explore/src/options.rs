use std::fmt;

use mcrl2rust_sabre::RewriteStrategy;

/// The options of the state space explorer.
#[derive(Clone, Debug)]
pub struct ExploreOptions {
    /// The maximal number of states, exploration stops when it is reached.
    pub max_states: usize,

    /// The maximal number of states that are discovered but not yet explored.
    pub todo_max: usize,

    pub detect_deadlock: bool,
    pub detect_nondeterminism: bool,

    /// Memoises the solutions of summand conditions per state projection.
    pub cached: bool,

    pub rewrite_strategy: RewriteStrategy,

    /// Instantiates the global variables with representative values.
    pub dummy: bool,

    /// Uses all equations of the data specification, instead of only those
    /// reachable from the linear process.
    pub unused_data: bool,

    /// Stores the parameter values of every state in the result.
    pub store_state_values: bool,
}

impl Default for ExploreOptions {
    fn default() -> Self {
        ExploreOptions {
            max_states: usize::MAX,
            todo_max: usize::MAX,
            detect_deadlock: false,
            detect_nondeterminism: false,
            cached: false,
            rewrite_strategy: RewriteStrategy::default(),
            dummy: true,
            unused_data: false,
            store_state_values: true,
        }
    }
}

/// The reason that the exploration stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExploreStatus {
    /// All reachable states have been explored.
    Completed,

    /// The limit on the number of states was reached, the result is partial.
    MaxStatesReached,

    /// The exploration was aborted through the abort flag.
    Aborted,
}

impl fmt::Display for ExploreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploreStatus::Completed => write!(f, "completed"),
            ExploreStatus::MaxStatesReached => write!(f, "maximum number of states reached"),
            ExploreStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// The number of states and transitions found in one breadth first level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelStatistics {
    pub level: usize,

    /// The number of states that were explored in this level.
    pub explored_states: usize,

    /// The number of states that were discovered in this level.
    pub new_states: usize,

    pub transitions: usize,
}

impl fmt::Display for LevelStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {}: explored {} states, found {} new states and {} transitions",
            self.level, self.explored_states, self.new_states, self.transitions
        )
    }
}
