use log::trace;

use mcrl2::data::free_variables;
use mcrl2::data::standard::is_false;
use mcrl2::data::standard::join_and;
use mcrl2::data::DataExpression;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::lps::ActionSummand;
use mcrl2::process::Action;
use mcrl2::process::MultiAction;
use mcrl2::process::ProcessEquation;
use mcrl2::process::ProcessExpression;
use mcrl2::Mcrl2Error;
use mcrl2rust_utilities::FreshNameGenerator;

use crate::linearize::equation_variable_names;
use crate::linearize::is_timed_multi_action;

/// Reads the summands of a linear process equation, of which the body is a
/// choice of summands `sum e. c -> m . P(d = f)`.
pub(crate) fn extract_summands(
    equation: &ProcessEquation,
    global_variables: &[DataVariable],
) -> Result<Vec<ActionSummand>, Mcrl2Error> {
    let mut extractor = SummandExtractor {
        equation,
        global_variables,
        names: equation_variable_names(equation, global_variables),
        summands: Vec::new(),
    };

    extractor.walk(&equation.body, &[], &[])?;
    Ok(extractor.summands)
}

struct SummandExtractor<'a> {
    equation: &'a ProcessEquation,
    global_variables: &'a [DataVariable],
    names: FreshNameGenerator,
    summands: Vec<ActionSummand>,
}

impl SummandExtractor<'_> {
    fn walk(
        &mut self,
        expression: &ProcessExpression,
        variables: &[DataVariable],
        conditions: &[DataExpression],
    ) -> Result<(), Mcrl2Error> {
        match expression {
            ProcessExpression::Delta => Ok(()),
            ProcessExpression::Choice(left, right) => {
                self.walk(left, variables, conditions)?;
                self.walk(right, variables, conditions)
            }
            ProcessExpression::Sum {
                variables: bound,
                operand,
            } => {
                // Summation variables may not shadow parameters or other summation variables.
                let mut sigma = DataSubstitution::default();
                let mut inner = variables.to_vec();
                for variable in bound {
                    let clashes = self
                        .equation
                        .parameters
                        .iter()
                        .chain(self.global_variables)
                        .chain(inner.iter())
                        .any(|other| other.name() == variable.name());

                    if clashes {
                        let fresh = DataVariable::new(&self.names.fresh(variable.name()), variable.sort());
                        sigma.insert(variable.clone(), fresh.clone().into());
                        inner.push(fresh);
                    } else {
                        inner.push(variable.clone());
                    }
                }

                self.walk(&operand.substitute(&sigma), &inner, conditions)
            }
            ProcessExpression::IfThen { condition, then } => {
                let mut conditions = conditions.to_vec();
                conditions.push(condition.clone());
                self.walk(then, variables, &conditions)
            }
            ProcessExpression::Sequence(left, right) if is_timed_multi_action(left) => {
                let ProcessExpression::InstanceAssignment { assignments, .. } = right.as_ref() else {
                    return Err(unexpected(expression));
                };

                self.add_summand(left, assignments, variables, conditions)
            }
            _ => Err(unexpected(expression)),
        }
    }

    fn add_summand(
        &mut self,
        multi_action: &ProcessExpression,
        assignments: &[(DataVariable, DataExpression)],
        variables: &[DataVariable],
        conditions: &[DataExpression],
    ) -> Result<(), Mcrl2Error> {
        let condition = join_and(conditions.iter().cloned());
        if conditions.iter().any(is_false) {
            trace!("Skipped the summand {multi_action} with condition {condition}");
            return Ok(());
        }

        let mut actions = Vec::new();
        let mut time = None;
        collect_actions(multi_action, &mut actions, &mut time);

        let mut assignments: Vec<(usize, DataVariable, DataExpression)> = assignments
            .iter()
            .filter(|(variable, value)| *value != DataExpression::from(variable.clone()))
            .map(|(variable, value)| {
                let position = self
                    .equation
                    .parameters
                    .iter()
                    .position(|parameter| parameter == variable)
                    .ok_or_else(|| {
                        Mcrl2Error::ScopeError(format!(
                            "{} is assigned, but is not a parameter of {}",
                            variable.name(),
                            self.equation.identifier
                        ))
                    })?;
                Ok((position, variable.clone(), value.clone()))
            })
            .collect::<Result<_, Mcrl2Error>>()?;
        assignments.sort_by_key(|(position, _, _)| *position);

        let mut used: Vec<DataVariable> = free_variables(&condition);
        for action in &actions {
            for argument in &action.arguments {
                used.extend(free_variables(argument));
            }
        }
        if let Some(time) = &time {
            used.extend(free_variables(time));
        }
        for (_, _, value) in &assignments {
            used.extend(free_variables(value));
        }

        let summand = ActionSummand {
            summation_variables: variables
                .iter()
                .filter(|variable| used.contains(variable))
                .cloned()
                .collect(),
            condition,
            multi_action: MultiAction::new(actions),
            time,
            assignments: assignments
                .into_iter()
                .map(|(_, variable, value)| (variable, value))
                .collect(),
        };

        trace!("Extracted the summand {summand}");
        self.summands.push(summand);
        Ok(())
    }
}

fn collect_actions(expression: &ProcessExpression, actions: &mut Vec<Action>, time: &mut Option<DataExpression>) {
    match expression {
        ProcessExpression::Action(action) => actions.push(action.clone()),
        ProcessExpression::Sync(left, right) => {
            collect_actions(left, actions, time);
            collect_actions(right, actions, time);
        }
        ProcessExpression::At { operand, time: stamp } => {
            *time = Some(stamp.clone());
            collect_actions(operand, actions, time);
        }
        _ => {}
    }
}

fn unexpected(expression: &ProcessExpression) -> Mcrl2Error {
    Mcrl2Error::Unsupported(format!("the summand {expression} is not linear"))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use mcrl2::typecheck::TypeCheckOptions;

    use super::*;
    use crate::normal_form::to_assignment_form;
    use crate::parse_process_specification;

    fn summands(text: &str) -> Vec<ActionSummand> {
        let mut spec = parse_process_specification(text, &TypeCheckOptions::default()).unwrap();
        to_assignment_form(&mut spec);
        extract_summands(&spec.equations[0], &spec.global_variables).unwrap()
    }

    #[test]
    fn test_extract_summands() {
        let summands = summands(indoc! {"
            act a: Nat;
                b;
            proc P(n: Nat) = (sum m: Nat. (m == n) -> a(m) . P(m)) + b . P(n);
            init P(0);
        "});

        assert_eq!(summands.len(), 2);

        let names: Vec<&str> = summands[0]
            .summation_variables
            .iter()
            .map(|variable| variable.name())
            .collect();
        assert_eq!(names, vec!["m"]);
        assert_eq!(summands[0].assignments.len(), 1);
        assert_eq!(summands[0].condition.to_string(), "m == n");

        assert!(summands[1].summation_variables.is_empty());
        assert!(summands[1].assignments.is_empty());
    }

    #[test]
    fn test_shadowing_summation_variable() {
        let summands = summands(indoc! {"
            act a: Nat;
            proc P(n: Nat) = sum n: Nat. a(n) . P(n);
            init P(0);
        "});

        assert_eq!(summands.len(), 1);
        let variable = &summands[0].summation_variables[0];
        assert_ne!(variable.name(), "n");
        assert_eq!(summands[0].assignments[0].1, DataExpression::from(variable.clone()));
    }

    #[test]
    fn test_false_condition_is_skipped() {
        let summands = summands(indoc! {"
            act a;
            proc P = false -> a . P;
            init P;
        "});

        assert!(summands.is_empty());
    }

    #[test]
    fn test_parallel_is_not_linear() {
        let mut spec = parse_process_specification(
            indoc! {"
                act a;
                proc P = a || a;
                init P;
            "},
            &TypeCheckOptions::default(),
        )
        .unwrap();
        to_assignment_form(&mut spec);

        let error = extract_summands(&spec.equations[0], &spec.global_variables).unwrap_err();
        assert!(matches!(error, Mcrl2Error::Unsupported(_)), "{error}");
    }
}
