//! Symbolic enumeration of the solutions of a condition.
//!
//! The enumerator maintains a queue of partial solutions in which every
//! variable is replaced by a constructor applied to fresh variables. A partial
//! solution is dropped as soon as its condition rewrites to false, and reported
//! once no variables remain and the condition rewrites to true.

use std::collections::VecDeque;

use log::trace;

use mcrl2::data::free_variables;
use mcrl2::data::standard::is_false;
use mcrl2::data::standard::is_true;
use mcrl2::data::substitute;
use mcrl2::data::DataExpression;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::Mcrl2Error;
use mcrl2rust_utilities::FreshNameGenerator;

use crate::RewriteEngine;

/// The default number of partial solutions that are expanded before the
/// enumeration is considered to diverge.
pub const MAX_ENUMERATION_STEPS: usize = 10_000;

/// A partial solution.
struct Partial {
    /// The variables that still have to be expanded.
    remaining: VecDeque<DataVariable>,

    /// The values of the enumerated variables, which can contain remaining variables.
    values: Vec<DataExpression>,

    /// The condition in normal form.
    condition: DataExpression,
}

/// A lazy iterator over the values of variables for which a condition
/// rewrites to true, in a deterministic order.
pub struct Enumerator<'a> {
    rewriter: &'a mut dyn RewriteEngine,
    queue: VecDeque<Partial>,
    generator: FreshNameGenerator,
    steps: usize,
    limit: usize,
    failed: bool,
}

impl<'a> Enumerator<'a> {
    /// Enumerates the values of the variables for which the condition, after
    /// applying sigma, rewrites to true.
    pub fn new(
        rewriter: &'a mut dyn RewriteEngine,
        variables: &[DataVariable],
        condition: &DataExpression,
        sigma: &DataSubstitution,
    ) -> Enumerator<'a> {
        let mut generator = FreshNameGenerator::new();
        for variable in variables.iter().chain(free_variables(condition).iter()) {
            generator.add(variable.name());
        }
        for value in sigma.values() {
            for variable in free_variables(value) {
                generator.add(variable.name());
            }
        }

        let condition = rewriter.rewrite_with(condition, sigma);
        let mut queue = VecDeque::new();
        queue.push_back(Partial {
            remaining: variables.iter().cloned().collect(),
            values: variables.iter().map(|variable| variable.clone().into()).collect(),
            condition,
        });

        Enumerator {
            rewriter,
            queue,
            generator,
            steps: 0,
            limit: MAX_ENUMERATION_STEPS,
            failed: false,
        }
    }

    /// Changes the number of partial solutions that can be expanded.
    pub fn with_limit(mut self, limit: usize) -> Enumerator<'a> {
        self.limit = limit;
        self
    }

    /// Replaces the variable by every constructor of its sort applied to
    /// fresh variables.
    fn expand(&mut self, partial: Partial, variable: DataVariable) -> Result<(), Mcrl2Error> {
        let sort = variable.sort();
        if sort.is_function_sort() {
            return Err(Mcrl2Error::EnumerationDiverges(format!(
                "cannot enumerate {} of function sort {sort}",
                variable.name()
            )));
        }

        let constructors = self.rewriter.data_specification().constructors_of(&sort).to_vec();
        if constructors.is_empty() {
            return Err(Mcrl2Error::EnumerationDiverges(format!(
                "the sort {sort} of {} has no constructors",
                variable.name()
            )));
        }

        for constructor in constructors {
            let constructor_sort = constructor.sort();
            let (value, fresh) = if constructor_sort.is_function_sort() {
                let fresh: Vec<DataVariable> = constructor_sort
                    .domain()
                    .iter()
                    .map(|domain| DataVariable::new(&self.generator.fresh(variable.name()), domain))
                    .collect();

                let arguments: Vec<DataExpression> = fresh.iter().map(|variable| variable.clone().into()).collect();
                (DataExpression::application(&constructor.into(), &arguments), fresh)
            } else {
                (constructor.into(), Vec::new())
            };

            let mut sigma = DataSubstitution::default();
            sigma.insert(variable.clone(), value);

            let condition = self.rewriter.rewrite_with(&partial.condition, &sigma);
            if is_false(&condition) {
                continue;
            }

            let mut remaining = partial.remaining.clone();
            remaining.extend(fresh);
            self.queue.push_back(Partial {
                remaining,
                values: partial.values.iter().map(|value| substitute(value, &sigma)).collect(),
                condition,
            });
        }

        Ok(())
    }
}

impl Iterator for Enumerator<'_> {
    type Item = Result<Vec<DataExpression>, Mcrl2Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Some(mut partial) = self.queue.pop_front() {
            if is_false(&partial.condition) {
                continue;
            }

            let Some(variable) = partial.remaining.pop_front() else {
                if is_true(&partial.condition) {
                    trace!("Enumerated solution {:?}", partial.values);
                    return Some(Ok(partial.values));
                }

                self.failed = true;
                return Some(Err(Mcrl2Error::NonBooleanCondition(partial.condition.to_string())));
            };

            self.steps += 1;
            if self.steps > self.limit {
                self.failed = true;
                return Some(Err(Mcrl2Error::EnumerationDiverges(format!(
                    "no result after {} steps while enumerating {} for {}",
                    self.limit,
                    variable.name(),
                    partial.condition
                ))));
            }

            if let Err(error) = self.expand(partial, variable) {
                self.failed = true;
                return Some(Err(error));
            }
        }

        None
    }
}
