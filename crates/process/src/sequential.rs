//! Removes sequential compositions whose left operand is not a multi-action,
//! such as `(a + b) . c` and `P(n = 1) . c`, by introducing new process
//! equations for the continuations.

use log::debug;
use log::trace;
use log::warn;
use rustc_hash::FxHashMap;

use mcrl2::data::DataExpression;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::process::ProcessEquation;
use mcrl2::process::ProcessExpression;
use mcrl2::process::ProcessIdentifier;
use mcrl2::process::ProcessSpecification;
use mcrl2::Mcrl2Error;
use mcrl2rust_utilities::FreshNameGenerator;

use crate::linearize::is_timed_multi_action;
use crate::linearize::map_instances;
use crate::linearize::process_names;
use crate::linearize::variable_names;
use crate::normal_form::distribute_sum;
use crate::normal_form::guard;
use crate::normal_form::negate;
use crate::normal_form::rename_bound;

/// Processes with a recursion such as `P = a . P . b` have infinitely many
/// continuations, the pass gives up after introducing this many equations.
const MAX_EQUATIONS: usize = 10_000;

/// Brings every equation into the form `sum e. c -> m . Q(d = f) + ...`,
/// where `m` is a timed multi-action. A multi-action without a continuation
/// is followed by a process that can no longer do anything.
pub(crate) fn remove_nested_sequences(spec: &mut ProcessSpecification) -> Result<(), Mcrl2Error> {
    let mut composer = SequentialComposer {
        bodies: spec
            .equations
            .iter()
            .map(|equation| (equation.identifier.clone(), equation.body.clone()))
            .collect(),
        process_names: process_names(spec),
        variable_names: variable_names(spec),
        equations: std::mem::take(&mut spec.equations),
        globals: spec.global_variables.clone(),
        continuations: FxHashMap::default(),
        stop: None,
    };

    let original = composer.equations.len();
    let mut index = 0;
    while index < composer.equations.len() {
        if composer.equations.len() > MAX_EQUATIONS {
            return Err(Mcrl2Error::Unsupported(format!(
                "more than {MAX_EQUATIONS} continuations are needed, the recursion is probably not regular"
            )));
        }

        let caller = Caller {
            name: composer.equations[index].identifier.name.clone(),
            parameters: composer.equations[index].parameters.clone(),
        };
        let body = composer.equations[index].body.clone();
        composer.equations[index].body = composer.normalise(&caller, &body)?;
        index += 1;
    }

    debug!(
        "Introduced {} process equations for nested sequential compositions",
        composer.equations.len() - original
    );
    spec.equations = composer.equations;
    Ok(())
}

/// The equation whose body is being normalised.
struct Caller {
    name: String,
    parameters: Vec<DataVariable>,
}

type ContinuationKey = (Option<ProcessIdentifier>, Vec<DataVariable>, ProcessExpression);

struct SequentialComposer {
    equations: Vec<ProcessEquation>,

    /// The bodies of the equations before normalisation, in which termination
    /// is not yet replaced by a call to the stop process.
    bodies: FxHashMap<ProcessIdentifier, ProcessExpression>,

    globals: Vec<DataVariable>,
    process_names: FreshNameGenerator,
    variable_names: FreshNameGenerator,

    /// The process that is introduced for a continuation, together with the
    /// parameters that hold the values of its free variables.
    continuations: FxHashMap<ContinuationKey, (ProcessIdentifier, Vec<DataVariable>)>,

    /// The process without behaviour that follows a terminating multi-action.
    stop: Option<ProcessIdentifier>,
}

impl SequentialComposer {
    fn normalise(&mut self, caller: &Caller, expression: &ProcessExpression) -> Result<ProcessExpression, Mcrl2Error> {
        match expression {
            ProcessExpression::Delta | ProcessExpression::InstanceAssignment { .. } => Ok(expression.clone()),
            ProcessExpression::Choice(left, right) => Ok(ProcessExpression::choice(
                self.normalise(caller, left)?,
                self.normalise(caller, right)?,
            )),
            ProcessExpression::IfThen { condition, then } => Ok(guard(condition, self.normalise(caller, then)?)),
            ProcessExpression::IfThenElse {
                condition,
                then,
                otherwise,
            } => Ok(ProcessExpression::choice(
                guard(condition, self.normalise(caller, then)?),
                guard(&negate(condition), self.normalise(caller, otherwise)?),
            )),
            ProcessExpression::Sum { variables, operand } => {
                Ok(distribute_sum(variables, &self.normalise(caller, operand)?))
            }
            ProcessExpression::Sequence(left, right) => self.seq(caller, left, right),
            _ if is_timed_multi_action(expression) => Ok(ProcessExpression::seq(expression.clone(), self.stop_call())),
            _ => Err(unsupported(expression)),
        }
    }

    /// The normal form of `left . right`.
    fn seq(
        &mut self,
        caller: &Caller,
        left: &ProcessExpression,
        right: &ProcessExpression,
    ) -> Result<ProcessExpression, Mcrl2Error> {
        match left {
            ProcessExpression::Delta => {
                if *right != ProcessExpression::Delta {
                    warn!("The process {right} in {} can never be reached", caller.name);
                }
                Ok(ProcessExpression::Delta)
            }
            ProcessExpression::Choice(first, second) => Ok(ProcessExpression::choice(
                self.seq(caller, first, right)?,
                self.seq(caller, second, right)?,
            )),
            ProcessExpression::IfThen { condition, then } => Ok(guard(condition, self.seq(caller, then, right)?)),
            ProcessExpression::IfThenElse {
                condition,
                then,
                otherwise,
            } => Ok(ProcessExpression::choice(
                guard(condition, self.seq(caller, then, right)?),
                guard(&negate(condition), self.seq(caller, otherwise, right)?),
            )),
            ProcessExpression::Sum { variables, operand } => {
                // The summation variables may not capture the variables of the continuation.
                let (variables, operand) = rename_bound(variables, operand.as_ref().clone(), &right.free_variables());
                Ok(distribute_sum(&variables, &self.seq(caller, &operand, right)?))
            }
            ProcessExpression::Sequence(first, second) => self.seq(
                caller,
                first,
                &ProcessExpression::seq(second.as_ref().clone(), right.clone()),
            ),
            ProcessExpression::InstanceAssignment {
                identifier,
                assignments,
            } => self.continue_with(caller, Some((identifier, assignments.as_slice())), right),
            _ if is_timed_multi_action(left) => Ok(ProcessExpression::seq(
                left.clone(),
                self.continuation(caller, right)?,
            )),
            _ => Err(unsupported(left)),
        }
    }

    /// A process instance that behaves as the given expression.
    fn continuation(&mut self, caller: &Caller, expression: &ProcessExpression) -> Result<ProcessExpression, Mcrl2Error> {
        match expression {
            ProcessExpression::InstanceAssignment { .. } => Ok(expression.clone()),
            ProcessExpression::Delta => Ok(self.stop_call()),
            ProcessExpression::Sequence(left, right) => match left.as_ref() {
                ProcessExpression::Delta => Ok(self.stop_call()),
                ProcessExpression::InstanceAssignment {
                    identifier,
                    assignments,
                } => self.continue_with(caller, Some((identifier, assignments.as_slice())), right),
                ProcessExpression::Sequence(first, second) => self.continuation(
                    caller,
                    &ProcessExpression::seq(
                        first.as_ref().clone(),
                        ProcessExpression::seq(second.as_ref().clone(), right.as_ref().clone()),
                    ),
                ),
                _ => self.continue_with(caller, None, expression),
            },
            _ => self.continue_with(caller, None, expression),
        }
    }

    /// Returns an instance of a process that behaves as `head . rest`, or as
    /// `rest` when there is no head. A process is introduced when there is
    /// none for this continuation yet.
    ///
    /// The head may change every parameter before the rest is executed, so
    /// the free variables of the rest are then stored in new parameters.
    /// Without a head only the variables bound by sums are stored.
    fn continue_with(
        &mut self,
        caller: &Caller,
        head: Option<(&ProcessIdentifier, &[(DataVariable, DataExpression)])>,
        rest: &ProcessExpression,
    ) -> Result<ProcessExpression, Mcrl2Error> {
        let (base, rest) = match head {
            Some((identifier, _)) => (self.equation(identifier)?.parameters.clone(), self.explicit_assignments(rest)),
            None => (caller.parameters.clone(), rest.clone()),
        };

        let stored: Vec<DataVariable> = rest
            .free_variables()
            .into_iter()
            .filter(|variable| {
                !self.globals.contains(variable) && (head.is_some() || !caller.parameters.contains(variable))
            })
            .collect();

        // Continuations that only differ in the names of the stored variables share a process.
        let placeholders: Vec<DataVariable> = stored
            .iter()
            .enumerate()
            .map(|(index, variable)| DataVariable::new(&format!("@{index}"), variable.sort()))
            .collect();
        let sigma: DataSubstitution = stored
            .iter()
            .cloned()
            .zip(placeholders.iter().map(|placeholder| placeholder.clone().into()))
            .collect();
        let key = (head.map(|(identifier, _)| identifier.clone()), base, rest.substitute(&sigma));

        let (identifier, parameters) = match self.continuations.get(&key).cloned() {
            Some(continuation) => continuation,
            None => {
                let fresh: Vec<DataVariable> = stored
                    .iter()
                    .map(|variable| DataVariable::new(&self.variable_names.fresh(variable.name()), variable.sort()))
                    .collect();
                let sigma: DataSubstitution = placeholders
                    .iter()
                    .cloned()
                    .zip(fresh.iter().map(|variable| variable.clone().into()))
                    .collect();

                let (head_identifier, base, rest) = &key;
                let rest = rest.substitute(&sigma);
                let body = match head_identifier {
                    Some(identifier) => {
                        let body = self.bodies.get(identifier).ok_or_else(|| {
                            Mcrl2Error::ScopeError(format!("the process {identifier} is not declared"))
                        })?;
                        ProcessExpression::seq(body.clone(), rest)
                    }
                    None => rest,
                };

                let mut parameters = base.clone();
                parameters.extend(fresh.iter().cloned());

                let hint = head_identifier.as_ref().map_or(caller.name.as_str(), |identifier| identifier.name.as_str());
                let identifier = ProcessIdentifier::new(
                    &self.process_names.fresh(hint),
                    parameters.iter().map(|parameter| parameter.sort()).collect(),
                );
                trace!("Introduced {identifier} = {body}");

                self.bodies.insert(identifier.clone(), body.clone());
                self.equations
                    .push(ProcessEquation::new(identifier.clone(), parameters, body));
                self.continuations.insert(key, (identifier.clone(), fresh.clone()));
                (identifier, fresh)
            }
        };

        let mut assignments = head.map_or_else(Vec::new, |(_, assignments)| assignments.to_vec());
        assignments.extend(parameters.into_iter().zip(stored.into_iter().map(DataExpression::from)));
        Ok(ProcessExpression::InstanceAssignment {
            identifier,
            assignments,
        })
    }

    /// Adds the assignment `d = d` for every parameter `d` that a process
    /// instance in the expression does not assign.
    fn explicit_assignments(&self, expression: &ProcessExpression) -> ProcessExpression {
        map_instances(expression, |instance| {
            let ProcessExpression::InstanceAssignment {
                identifier,
                assignments,
            } = instance
            else {
                return None;
            };

            let equation = self.equation(identifier).ok()?;
            let mut assignments = assignments.clone();
            for parameter in &equation.parameters {
                if !assignments.iter().any(|(variable, _)| variable == parameter) {
                    assignments.push((parameter.clone(), parameter.clone().into()));
                }
            }

            Some(ProcessExpression::InstanceAssignment {
                identifier: identifier.clone(),
                assignments,
            })
        })
    }

    fn stop_call(&mut self) -> ProcessExpression {
        let identifier = match &self.stop {
            Some(identifier) => identifier.clone(),
            None => {
                let identifier = ProcessIdentifier::new(&self.process_names.fresh("Stop"), Vec::new());
                self.equations
                    .push(ProcessEquation::new(identifier.clone(), Vec::new(), ProcessExpression::Delta));
                self.stop = Some(identifier.clone());
                identifier
            }
        };

        ProcessExpression::InstanceAssignment {
            identifier,
            assignments: Vec::new(),
        }
    }

    fn equation(&self, identifier: &ProcessIdentifier) -> Result<&ProcessEquation, Mcrl2Error> {
        self.equations
            .iter()
            .find(|equation| equation.identifier == *identifier)
            .ok_or_else(|| Mcrl2Error::ScopeError(format!("the process {identifier} is not declared")))
    }
}

fn unsupported(expression: &ProcessExpression) -> Mcrl2Error {
    Mcrl2Error::Unsupported(format!(
        "the {} operator in the sequential composition {expression}",
        expression.operator_name()
    ))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use mcrl2::typecheck::TypeCheckOptions;

    use super::*;
    use crate::balance::balance_parameters;
    use crate::normal_form::to_assignment_form;
    use crate::parse_process_specification;

    fn normalised(text: &str) -> ProcessSpecification {
        let mut spec = parse_process_specification(text, &TypeCheckOptions::default()).unwrap();
        to_assignment_form(&mut spec);
        balance_parameters(&mut spec).unwrap();
        remove_nested_sequences(&mut spec).unwrap();
        spec
    }

    /// Every summand must be a multi-action followed by a process instance.
    fn assert_normal_form(spec: &ProcessSpecification) {
        fn check(expression: &ProcessExpression) {
            match expression {
                ProcessExpression::Choice(left, right) => {
                    check(left);
                    check(right);
                }
                ProcessExpression::Sum { operand, .. } => check(operand),
                ProcessExpression::IfThen { then, .. } => check(then),
                ProcessExpression::Sequence(left, right) => {
                    assert!(is_timed_multi_action(left), "{left} is not a multi-action");
                    assert!(
                        matches!(right.as_ref(), ProcessExpression::InstanceAssignment { .. }),
                        "{right} is not a process instance"
                    );
                }
                ProcessExpression::Delta | ProcessExpression::InstanceAssignment { .. } => {}
                _ => panic!("{expression} is not in normal form"),
            }
        }

        for equation in &spec.equations {
            check(&equation.body);
        }
    }

    #[test]
    fn test_choice_before_sequence() {
        let spec = normalised(indoc! {"
            act a, b, c;
            proc P = (a + b) . c . P;
            init P;
        "});

        assert_normal_form(&spec);
        assert_eq!(spec.equations.len(), 2);
    }

    #[test]
    fn test_terminating_action() {
        let spec = normalised(indoc! {"
            act a;
            proc P = a;
            init P;
        "});

        assert_normal_form(&spec);
        assert!(spec.equations.iter().any(|equation| equation.identifier.name == "Stop"));
    }

    #[test]
    fn test_instance_before_sequence() {
        let spec = normalised(indoc! {"
            act a, b: Nat;
                c;
            proc P(n: Nat) = sum m: Nat. (m < 2) -> Q(m) . b(m) . P(n);
                 Q(k: Nat) = a(k) + c . Q(k);
            init P(0);
        "});

        assert_normal_form(&spec);

        // The summation variable m is stored while Q executes.
        let continuation = spec
            .equations
            .iter()
            .find(|equation| equation.identifier.name.starts_with('Q') && equation.identifier.name != "Q")
            .unwrap();
        assert!(continuation.parameters.iter().any(|parameter| parameter.name().starts_with('m')));
    }
}
