use log::debug;
use log::trace;
use log::warn;
use rustc_hash::FxHashSet;

use mcrl2::data::collect_function_symbols;
use mcrl2::data::free_variables;
use mcrl2::data::DataExpression;
use mcrl2::data::DataFunctionSymbol;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::data::RepresentativeGenerator;
use mcrl2::lps::LinearProcessSpecification;
use mcrl2::process::MultiAction;
use mcrl2::Mcrl2Error;
use mcrl2rust_sabre::create_rewriter;
use mcrl2rust_sabre::Enumerator;
use mcrl2rust_sabre::RewriteEngine;
use mcrl2rust_sabre::UsedEquationSelector;

use crate::CacheKey;
use crate::EnumerationCache;
use crate::ExploreOptions;

/// A summand of which the next state is expressed as one expression per
/// parameter.
struct PreparedSummand {
    summation_variables: Vec<DataVariable>,
    condition: DataExpression,
    multi_action: MultiAction,
    time: Option<DataExpression>,
    next_state: Vec<DataExpression>,

    /// The positions of the parameters that occur in the condition.
    condition_parameters: Vec<usize>,
}

/// A transition from a given state, obtained from a summand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Successor {
    pub summand: usize,
    pub label: String,
    pub state: Vec<DataExpression>,
}

/// Computes the outgoing transitions of states of a linear process, where a
/// state is the vector of the normal forms of the parameters.
pub struct NextStateGenerator {
    rewriter: Box<dyn RewriteEngine>,
    parameters: Vec<DataVariable>,
    summands: Vec<PreparedSummand>,

    /// The values of the global variables.
    globals: DataSubstitution,
    initial_state: Vec<DataExpression>,
    cache: Option<EnumerationCache>,
}

impl NextStateGenerator {
    pub fn new(lps: &LinearProcessSpecification, options: &ExploreOptions) -> Result<NextStateGenerator, Mcrl2Error> {
        if lps.initial_state.len() != lps.parameters.len() {
            return Err(Mcrl2Error::WellTypedness(format!(
                "the initial state has {} values for {} parameters",
                lps.initial_state.len(),
                lps.parameters.len()
            )));
        }

        let selector = if options.unused_data {
            UsedEquationSelector::all()
        } else {
            UsedEquationSelector::new(&lps.data, used_function_symbols(lps))
        };
        let mut rewriter = create_rewriter(&lps.data, options.rewrite_strategy, &selector);

        let mut globals = DataSubstitution::default();
        if options.dummy {
            let mut generator = RepresentativeGenerator::new(&lps.data);
            for variable in &lps.global_variables {
                match generator.representative(&variable.sort()) {
                    Some(value) => {
                        let value = rewriter.rewrite(&value);
                        debug!("Instantiated the global variable {} with {value}", variable.name());
                        globals.insert(variable.clone(), value);
                    }
                    None => warn!(
                        "The global variable {} of sort {} has no representative",
                        variable.name(),
                        variable.sort()
                    ),
                }
            }
        }

        let initial_state = lps
            .initial_state
            .iter()
            .map(|value| rewriter.rewrite_with(value, &globals))
            .collect();

        let summands = lps
            .summands
            .iter()
            .map(|summand| {
                let condition_variables = free_variables(&summand.condition);
                PreparedSummand {
                    summation_variables: summand.summation_variables.clone(),
                    condition: summand.condition.clone(),
                    multi_action: summand.multi_action.clone(),
                    time: summand.time.clone(),
                    next_state: summand.next_state(&lps.parameters),
                    condition_parameters: lps
                        .parameters
                        .iter()
                        .enumerate()
                        .filter(|(_, parameter)| condition_variables.contains(parameter))
                        .map(|(index, _)| index)
                        .collect(),
                }
            })
            .collect();

        Ok(NextStateGenerator {
            rewriter,
            parameters: lps.parameters.clone(),
            summands,
            globals,
            initial_state,
            cache: options.cached.then(EnumerationCache::new),
        })
    }

    /// Returns the initial state in normal form.
    pub fn initial_state(&self) -> &[DataExpression] {
        &self.initial_state
    }

    pub fn parameters(&self) -> &[DataVariable] {
        &self.parameters
    }

    /// Adds the successors of the given state to the result, ordered by
    /// summand and then by the order of enumeration.
    pub fn successors(&mut self, state: &[DataExpression], result: &mut Vec<Successor>) -> Result<(), Mcrl2Error> {
        debug_assert_eq!(state.len(), self.parameters.len(), "The state does not match the parameters");

        let mut sigma = self.globals.clone();
        for (parameter, value) in self.parameters.iter().zip(state) {
            sigma.insert(parameter.clone(), value.clone());
        }

        for (index, summand) in self.summands.iter().enumerate() {
            let solutions = match &mut self.cache {
                Some(cache) => {
                    let key = CacheKey {
                        summand: index,
                        projection: summand
                            .condition_parameters
                            .iter()
                            .map(|position| state[*position].clone())
                            .collect(),
                    };

                    if let Some(solutions) = cache.get(&key) {
                        solutions.to_vec()
                    } else {
                        let solutions = enumerate(self.rewriter.as_mut(), summand, &sigma)?;
                        cache.insert(key, solutions.clone());
                        solutions
                    }
                }
                None => enumerate(self.rewriter.as_mut(), summand, &sigma)?,
            };

            for solution in solutions {
                let mut local = sigma.clone();
                for (variable, value) in summand.summation_variables.iter().zip(solution) {
                    local.insert(variable.clone(), value);
                }

                let rewriter = self.rewriter.as_mut();
                let mut label = summand
                    .multi_action
                    .map_arguments(|argument| rewriter.rewrite_with(argument, &local))
                    .to_string();
                if let Some(time) = &summand.time {
                    label.push_str(&format!("@{}", rewriter.rewrite_with(time, &local)));
                }

                let next = summand
                    .next_state
                    .iter()
                    .map(|value| rewriter.rewrite_with(value, &local))
                    .collect();

                trace!("Summand {index} yields {label}");
                result.push(Successor {
                    summand: index,
                    label,
                    state: next,
                });
            }
        }

        Ok(())
    }

    /// Returns the number of cached enumerations together with the hits and misses.
    pub fn cache_statistics(&self) -> Option<(usize, usize, usize)> {
        self.cache.as_ref().map(|cache| {
            let (hits, misses) = cache.statistics();
            (cache.len(), hits, misses)
        })
    }
}

/// Returns the values of the summation variables for which the condition holds.
fn enumerate(
    rewriter: &mut dyn RewriteEngine,
    summand: &PreparedSummand,
    sigma: &DataSubstitution,
) -> Result<Vec<Vec<DataExpression>>, Mcrl2Error> {
    Enumerator::new(rewriter, &summand.summation_variables, &summand.condition, sigma).collect()
}

/// The function symbols that occur in the linear process.
fn used_function_symbols(lps: &LinearProcessSpecification) -> FxHashSet<DataFunctionSymbol> {
    let mut result = FxHashSet::default();

    for value in &lps.initial_state {
        collect_function_symbols(value, &mut result);
    }

    for summand in &lps.summands {
        collect_function_symbols(&summand.condition, &mut result);
        for action in summand.multi_action.actions() {
            for argument in &action.arguments {
                collect_function_symbols(argument, &mut result);
            }
        }
        if let Some(time) = &summand.time {
            collect_function_symbols(time, &mut result);
        }
        for (_, value) in &summand.assignments {
            collect_function_symbols(value, &mut result);
        }
    }

    // The representatives of global variables consist of constructors and mappings.
    for variable in &lps.global_variables {
        let sort = variable.sort();
        result.extend(lps.data.constructors_of(&sort).iter().cloned());
    }

    result
}
