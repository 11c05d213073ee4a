//! Rewrites process expressions towards a choice of summands of the shape
//! `sum e. c -> a . P(d = e)`.

use rustc_hash::FxHashMap;

use mcrl2::data::free_variables;
use mcrl2::data::standard::and;
use mcrl2::data::standard::false_;
use mcrl2::data::standard::is_false;
use mcrl2::data::standard::is_true;
use mcrl2::data::standard::not;
use mcrl2::data::standard::true_;
use mcrl2::data::DataExpression;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::process::ProcessExpression;
use mcrl2::process::ProcessIdentifier;
use mcrl2::process::ProcessRebuilder;
use mcrl2::process::ProcessSpecification;
use mcrl2rust_utilities::FreshNameGenerator;

/// The negation of a condition, where `true` and `false` are simplified.
pub(crate) fn negate(condition: &DataExpression) -> DataExpression {
    if is_true(condition) {
        false_()
    } else if is_false(condition) {
        true_()
    } else {
        not(condition)
    }
}

/// The conjunction of two conditions, where `true` and `false` are simplified.
pub(crate) fn conjunction(left: &DataExpression, right: &DataExpression) -> DataExpression {
    if is_true(left) || is_false(right) {
        right.clone()
    } else if is_true(right) || is_false(left) {
        left.clone()
    } else {
        and(left, right)
    }
}

/// The conditional `condition -> expression`, where the condition is
/// distributed over choices and moved below sums, and nested conditions are
/// combined into a conjunction.
pub(crate) fn guard(condition: &DataExpression, expression: ProcessExpression) -> ProcessExpression {
    if is_true(condition) {
        return expression;
    }

    if is_false(condition) {
        return ProcessExpression::Delta;
    }

    match expression {
        ProcessExpression::Delta => ProcessExpression::Delta,
        ProcessExpression::Choice(left, right) => {
            ProcessExpression::choice(guard(condition, *left), guard(condition, *right))
        }
        ProcessExpression::IfThen { condition: inner, then } => guard(&conjunction(condition, &inner), *then),
        ProcessExpression::Sum { variables, operand } => {
            let (variables, operand) = rename_bound(&variables, *operand, &free_variables(condition));
            ProcessExpression::sum(variables, guard(condition, operand))
        }
        expression => ProcessExpression::if_then(condition.clone(), expression),
    }
}

/// Renames the bound variables that also occur in `avoid`.
pub(crate) fn rename_bound(
    variables: &[DataVariable],
    operand: ProcessExpression,
    avoid: &[DataVariable],
) -> (Vec<DataVariable>, ProcessExpression) {
    if !variables.iter().any(|variable| avoid.contains(variable)) {
        return (variables.to_vec(), operand);
    }

    let mut names: FreshNameGenerator = avoid
        .iter()
        .chain(variables.iter())
        .chain(operand.free_variables().iter())
        .map(|variable| variable.name().to_string())
        .collect();

    let mut sigma = DataSubstitution::default();
    let renamed = variables
        .iter()
        .map(|variable| {
            if avoid.contains(variable) {
                let fresh = DataVariable::new(&names.fresh(variable.name()), variable.sort());
                sigma.insert(variable.clone(), fresh.clone().into());
                fresh
            } else {
                variable.clone()
            }
        })
        .collect();

    (renamed, operand.substitute(&sigma))
}

/// The sum over the variables distributed over the summands of the
/// expression. Nested sums are merged and variables that do not occur in a
/// summand are dropped from it.
pub(crate) fn distribute_sum(variables: &[DataVariable], expression: &ProcessExpression) -> ProcessExpression {
    ProcessExpression::join_choice(expression.split_choice().into_iter().map(|summand| {
        let (inner, operand) = match summand {
            ProcessExpression::Sum { variables, operand } => (variables.clone(), operand.as_ref().clone()),
            _ => (Vec::new(), summand.clone()),
        };

        let free = operand.free_variables();
        let mut result: Vec<DataVariable> = variables
            .iter()
            .filter(|variable| !inner.contains(variable) && free.contains(variable))
            .cloned()
            .collect();
        result.extend(inner.into_iter().filter(|variable| free.contains(variable)));

        ProcessExpression::sum(result, operand)
    }))
}

/// Replaces `c -> x <> y` by `(c -> x) + (!c -> y)`, and moves conditions
/// inwards over choices.
pub(crate) fn expand_if_then_else(expression: &ProcessExpression) -> ProcessExpression {
    match expression {
        ProcessExpression::IfThenElse {
            condition,
            then,
            otherwise,
        } => ProcessExpression::choice(
            guard(condition, expand_if_then_else(then)),
            guard(&negate(condition), expand_if_then_else(otherwise)),
        ),
        ProcessExpression::IfThen { condition, then } => guard(condition, expand_if_then_else(then)),
        ProcessExpression::Choice(left, right) => {
            ProcessExpression::choice(expand_if_then_else(left), expand_if_then_else(right))
        }
        ProcessExpression::Sequence(left, right) => {
            ProcessExpression::seq(expand_if_then_else(left), expand_if_then_else(right))
        }
        ProcessExpression::Sum { variables, operand } => {
            ProcessExpression::sum(variables.clone(), expand_if_then_else(operand))
        }
        _ => expression.clone(),
    }
}

/// Distributes sums over choices.
pub(crate) fn expand_sums(expression: &ProcessExpression) -> ProcessExpression {
    match expression {
        ProcessExpression::Sum { variables, operand } => distribute_sum(variables, &expand_sums(operand)),
        ProcessExpression::Choice(left, right) => ProcessExpression::choice(expand_sums(left), expand_sums(right)),
        ProcessExpression::Sequence(left, right) => ProcessExpression::seq(expand_sums(left), expand_sums(right)),
        ProcessExpression::IfThen { condition, then } => {
            ProcessExpression::if_then(condition.clone(), expand_sums(then))
        }
        _ => expression.clone(),
    }
}

/// Converts process instances into assignment form, see [to_assignment_form].
struct AssignmentForm<'a> {
    parameters: &'a FxHashMap<ProcessIdentifier, Vec<DataVariable>>,
    caller: &'a [DataVariable],
    bound: Vec<DataVariable>,
}

impl ProcessRebuilder for AssignmentForm<'_> {
    fn data(&mut self, expression: &DataExpression) -> DataExpression {
        expression.clone()
    }

    fn process(&mut self, expression: &ProcessExpression) -> ProcessExpression {
        match expression {
            ProcessExpression::Instance { identifier, arguments } => match self.parameters.get(identifier) {
                Some(parameters) => ProcessExpression::InstanceAssignment {
                    identifier: identifier.clone(),
                    assignments: parameters
                        .iter()
                        .zip(arguments)
                        .filter(|&(parameter, argument)| {
                            // A parameter keeps its value when the caller has the same parameter.
                            *argument != DataExpression::from(parameter.clone())
                                || !self.caller.contains(parameter)
                                || self.bound.contains(parameter)
                        })
                        .map(|(parameter, argument)| (parameter.clone(), argument.clone()))
                        .collect(),
                },
                None => expression.clone(),
            },
            ProcessExpression::Sum { variables, operand } => {
                let size = self.bound.len();
                self.bound.extend(variables.iter().cloned());
                let operand = self.process(operand);
                self.bound.truncate(size);

                ProcessExpression::Sum {
                    variables: variables.clone(),
                    operand: Box::new(operand),
                }
            }
            _ => expression.transform_children(self),
        }
    }
}

/// Replaces every instance `P(e1, ..., en)` by `P(d1 = e1, ..., dn = en)`,
/// where the assignments `d = d` to a parameter of the caller are left out.
pub(crate) fn to_assignment_form(spec: &mut ProcessSpecification) {
    let parameters: FxHashMap<ProcessIdentifier, Vec<DataVariable>> = spec
        .equations
        .iter()
        .map(|equation| (equation.identifier.clone(), equation.parameters.clone()))
        .collect();

    for equation in &mut spec.equations {
        let mut rebuilder = AssignmentForm {
            parameters: &parameters,
            caller: &equation.parameters,
            bound: Vec::new(),
        };
        equation.body = rebuilder.process(&equation.body);
    }
}

/// Prefixes every summand that consists of a process instance only by `tau`.
pub(crate) fn make_guarded(spec: &mut ProcessSpecification) {
    for equation in &mut spec.equations {
        equation.body = guarded(&equation.body);
    }
}

fn guarded(expression: &ProcessExpression) -> ProcessExpression {
    match expression {
        ProcessExpression::Choice(left, right) => ProcessExpression::choice(guarded(left), guarded(right)),
        ProcessExpression::Sum { variables, operand } => ProcessExpression::Sum {
            variables: variables.clone(),
            operand: Box::new(guarded(operand)),
        },
        ProcessExpression::IfThen { condition, then } => ProcessExpression::if_then(condition.clone(), guarded(then)),
        ProcessExpression::Instance { .. } | ProcessExpression::InstanceAssignment { .. } => {
            ProcessExpression::seq(ProcessExpression::Tau, expression.clone())
        }
        _ => expression.clone(),
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use mcrl2::data::standard::bool_sort;
    use mcrl2::data::standard::nat_sort;
    use mcrl2::process::Action;
    use mcrl2::process::ActionLabel;

    use super::*;

    fn action(name: &str) -> ProcessExpression {
        ProcessExpression::Action(Action::new(ActionLabel::new(name, Vec::new()), Vec::new()))
    }

    #[test]
    fn test_expand_if_then_else() {
        let b: DataExpression = DataVariable::new("b", bool_sort()).into();
        let expression = ProcessExpression::IfThenElse {
            condition: b.clone(),
            then: Box::new(ProcessExpression::choice(action("a"), action("c"))),
            otherwise: Box::new(action("d")),
        };

        assert_eq!(
            expand_if_then_else(&expression).to_string(),
            "(((b) -> a) + ((b) -> c)) + ((!b) -> d)"
        );
    }

    #[test]
    fn test_constant_conditions() {
        let expression = ProcessExpression::IfThenElse {
            condition: true_(),
            then: Box::new(action("a")),
            otherwise: Box::new(action("b")),
        };

        assert_eq!(expand_if_then_else(&expression).to_string(), "a + delta");
    }

    #[test]
    fn test_nested_conditions() {
        let b: DataExpression = DataVariable::new("b", bool_sort()).into();
        let c: DataExpression = DataVariable::new("c", bool_sort()).into();
        let expression = ProcessExpression::if_then(b, ProcessExpression::if_then(c, action("a")));

        assert_eq!(expand_if_then_else(&expression).to_string(), "(b && c) -> a");
    }

    #[test]
    fn test_distribute_sum() {
        let n = DataVariable::new("n", nat_sort());
        let m = DataVariable::new("m", nat_sort());
        let label = ActionLabel::new("a", vec![nat_sort()]);

        // sum n: Nat. (a(n) + sum m: Nat. a(m)) + b
        let expression = ProcessExpression::sum(
            vec![n.clone()],
            ProcessExpression::join_choice([
                ProcessExpression::Action(Action::new(label.clone(), vec![n.into()])),
                ProcessExpression::sum(
                    vec![m.clone()],
                    ProcessExpression::Action(Action::new(label, vec![m.into()])),
                ),
                action("b"),
            ]),
        );

        assert_eq!(
            expand_sums(&expression).to_string(),
            "((sum n: Nat. a(n)) + (sum m: Nat. a(m))) + b"
        );
    }
}
