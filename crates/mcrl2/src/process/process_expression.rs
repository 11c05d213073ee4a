use std::fmt;

use mcrl2rust_utilities::FreshNameGenerator;
use rustc_hash::FxHashSet;

use crate::data::collect_free_variables;
use crate::data::free_variables;
use crate::data::substitute;
use crate::data::DataExpression;
use crate::data::DataSubstitution;
use crate::data::DataVariable;
use crate::data::SortExpression;
use crate::process::Action;

/// The identifier `name: S1 # ... # Sn` of a process equation.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProcessIdentifier {
    pub name: String,
    pub sorts: Vec<SortExpression>,
}

impl ProcessIdentifier {
    pub fn new(name: &str, sorts: Vec<SortExpression>) -> ProcessIdentifier {
        ProcessIdentifier {
            name: name.to_string(),
            sorts,
        }
    }
}

impl fmt::Display for ProcessIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Rebuilds the direct subexpressions of a process expression, see
/// [ProcessExpression::transform_children].
pub trait ProcessRebuilder {
    fn data(&mut self, expression: &DataExpression) -> DataExpression;

    fn process(&mut self, expression: &ProcessExpression) -> ProcessExpression;
}

struct MapData<F>(F);

impl<F: FnMut(&DataExpression) -> DataExpression> ProcessRebuilder for MapData<F> {
    fn data(&mut self, expression: &DataExpression) -> DataExpression {
        (self.0)(expression)
    }

    fn process(&mut self, expression: &ProcessExpression) -> ProcessExpression {
        expression.transform_children(self)
    }
}

struct Substituter<'a>(&'a DataSubstitution);

impl ProcessRebuilder for Substituter<'_> {
    fn data(&mut self, expression: &DataExpression) -> DataExpression {
        substitute(expression, self.0)
    }

    fn process(&mut self, expression: &ProcessExpression) -> ProcessExpression {
        expression.substitute(self.0)
    }
}

/// A process expression over typed data expressions.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum ProcessExpression {
    Delta,
    Tau,
    Action(Action),
    /// The instance `P(e1, ..., en)` with positional arguments.
    Instance {
        identifier: ProcessIdentifier,
        arguments: Vec<DataExpression>,
    },
    /// The instance `P(d1 = e1, ...)`, parameters that are not assigned keep their value.
    InstanceAssignment {
        identifier: ProcessIdentifier,
        assignments: Vec<(DataVariable, DataExpression)>,
    },
    Sequence(Box<ProcessExpression>, Box<ProcessExpression>),
    Choice(Box<ProcessExpression>, Box<ProcessExpression>),
    /// The multi-action `x | y`.
    Sync(Box<ProcessExpression>, Box<ProcessExpression>),
    Merge(Box<ProcessExpression>, Box<ProcessExpression>),
    LeftMerge(Box<ProcessExpression>, Box<ProcessExpression>),
    BoundedInit(Box<ProcessExpression>, Box<ProcessExpression>),
    IfThen {
        condition: DataExpression,
        then: Box<ProcessExpression>,
    },
    IfThenElse {
        condition: DataExpression,
        then: Box<ProcessExpression>,
        otherwise: Box<ProcessExpression>,
    },
    Sum {
        variables: Vec<DataVariable>,
        operand: Box<ProcessExpression>,
    },
    At {
        operand: Box<ProcessExpression>,
        time: DataExpression,
    },
    Block {
        actions: Vec<String>,
        operand: Box<ProcessExpression>,
    },
    Hide {
        actions: Vec<String>,
        operand: Box<ProcessExpression>,
    },
    Rename {
        renames: Vec<(String, String)>,
        operand: Box<ProcessExpression>,
    },
    Comm {
        communications: Vec<(Vec<String>, String)>,
        operand: Box<ProcessExpression>,
    },
    Allow {
        multi_actions: Vec<Vec<String>>,
        operand: Box<ProcessExpression>,
    },
}

impl ProcessExpression {
    pub fn seq(left: ProcessExpression, right: ProcessExpression) -> ProcessExpression {
        ProcessExpression::Sequence(Box::new(left), Box::new(right))
    }

    pub fn choice(left: ProcessExpression, right: ProcessExpression) -> ProcessExpression {
        ProcessExpression::Choice(Box::new(left), Box::new(right))
    }

    pub fn if_then(condition: DataExpression, then: ProcessExpression) -> ProcessExpression {
        ProcessExpression::IfThen {
            condition,
            then: Box::new(then),
        }
    }

    /// The summation over the given variables, or the operand itself when
    /// there are no variables.
    pub fn sum(variables: Vec<DataVariable>, operand: ProcessExpression) -> ProcessExpression {
        if variables.is_empty() {
            operand
        } else {
            ProcessExpression::Sum {
                variables,
                operand: Box::new(operand),
            }
        }
    }

    /// Combines the expressions with `+`, the empty choice is `delta`.
    pub fn join_choice(expressions: impl IntoIterator<Item = ProcessExpression>) -> ProcessExpression {
        let mut iter = expressions.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, ProcessExpression::choice),
            None => ProcessExpression::Delta,
        }
    }

    /// Splits a choice into its operands.
    pub fn split_choice(&self) -> Vec<&ProcessExpression> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(expression) = stack.pop() {
            if let ProcessExpression::Choice(left, right) = expression {
                stack.push(right);
                stack.push(left);
            } else {
                result.push(expression);
            }
        }
        result
    }

    /// Returns the free data variables in the order of their first occurrence.
    pub fn free_variables(&self) -> Vec<DataVariable> {
        let mut result = Vec::new();
        self.collect_free_variables(&mut Vec::new(), &mut result);
        result
    }

    fn collect_free_variables(&self, bound: &mut Vec<DataVariable>, result: &mut Vec<DataVariable>) {
        match self {
            ProcessExpression::Delta | ProcessExpression::Tau => {}
            ProcessExpression::Action(action) => {
                for argument in &action.arguments {
                    collect_free_variables(argument, bound, result);
                }
            }
            ProcessExpression::Instance { arguments, .. } => {
                for argument in arguments {
                    collect_free_variables(argument, bound, result);
                }
            }
            ProcessExpression::InstanceAssignment { assignments, .. } => {
                for (_, value) in assignments {
                    collect_free_variables(value, bound, result);
                }
            }
            ProcessExpression::Sequence(left, right)
            | ProcessExpression::Choice(left, right)
            | ProcessExpression::Sync(left, right)
            | ProcessExpression::Merge(left, right)
            | ProcessExpression::LeftMerge(left, right)
            | ProcessExpression::BoundedInit(left, right) => {
                left.collect_free_variables(bound, result);
                right.collect_free_variables(bound, result);
            }
            ProcessExpression::IfThen { condition, then } => {
                collect_free_variables(condition, bound, result);
                then.collect_free_variables(bound, result);
            }
            ProcessExpression::IfThenElse {
                condition,
                then,
                otherwise,
            } => {
                collect_free_variables(condition, bound, result);
                then.collect_free_variables(bound, result);
                otherwise.collect_free_variables(bound, result);
            }
            ProcessExpression::Sum { variables, operand } => {
                let size = bound.len();
                bound.extend(variables.iter().cloned());
                operand.collect_free_variables(bound, result);
                bound.truncate(size);
            }
            ProcessExpression::At { operand, time } => {
                operand.collect_free_variables(bound, result);
                collect_free_variables(time, bound, result);
            }
            ProcessExpression::Block { operand, .. }
            | ProcessExpression::Hide { operand, .. }
            | ProcessExpression::Rename { operand, .. }
            | ProcessExpression::Comm { operand, .. }
            | ProcessExpression::Allow { operand, .. } => operand.collect_free_variables(bound, result),
        }
    }

    /// Applies the function to every data expression in the process
    /// expression, without taking the variables bound by sums into account.
    pub fn map_data(&self, f: impl FnMut(&DataExpression) -> DataExpression) -> ProcessExpression {
        self.transform_children(&mut MapData(f))
    }

    /// Applies the substitution to the free variables of the expression,
    /// renaming summation variables that would capture a substituted variable.
    pub fn substitute(&self, sigma: &DataSubstitution) -> ProcessExpression {
        if sigma.is_empty() {
            return self.clone();
        }

        match self {
            ProcessExpression::Sum { variables, operand } => {
                let mut inner = sigma.clone();
                for variable in variables {
                    inner.remove(variable);
                }

                let body_variables = operand.free_variables();
                let mut introduced: FxHashSet<String> = FxHashSet::default();
                for variable in &body_variables {
                    if let Some(value) = inner.get(variable) {
                        introduced.extend(free_variables(value).iter().map(|variable| variable.name().to_string()));
                    }
                }

                let mut generator: FreshNameGenerator = introduced.iter().cloned().collect();
                for variable in &body_variables {
                    generator.add(variable.name());
                }

                let mut renamed = Vec::with_capacity(variables.len());
                for variable in variables {
                    if introduced.contains(variable.name()) {
                        let fresh = DataVariable::new(&generator.fresh(variable.name()), variable.sort());
                        inner.insert(variable.clone(), fresh.clone().into());
                        renamed.push(fresh);
                    } else {
                        renamed.push(variable.clone());
                    }
                }

                ProcessExpression::Sum {
                    variables: renamed,
                    operand: Box::new(operand.substitute(&inner)),
                }
            }
            _ => self.transform_children(&mut Substituter(sigma)),
        }
    }

    /// Rebuilds the expression by applying the rebuilder to the data
    /// expressions and process expressions directly below the root. A sum is
    /// rebuilt with the same variables.
    pub fn transform_children(&self, rebuilder: &mut impl ProcessRebuilder) -> ProcessExpression {
        match self {
            ProcessExpression::Delta => ProcessExpression::Delta,
            ProcessExpression::Tau => ProcessExpression::Tau,
            ProcessExpression::Action(action) => ProcessExpression::Action(Action::new(
                action.label.clone(),
                action.arguments.iter().map(|argument| rebuilder.data(argument)).collect(),
            )),
            ProcessExpression::Instance { identifier, arguments } => ProcessExpression::Instance {
                identifier: identifier.clone(),
                arguments: arguments.iter().map(|argument| rebuilder.data(argument)).collect(),
            },
            ProcessExpression::InstanceAssignment {
                identifier,
                assignments,
            } => ProcessExpression::InstanceAssignment {
                identifier: identifier.clone(),
                assignments: assignments
                    .iter()
                    .map(|(variable, value)| (variable.clone(), rebuilder.data(value)))
                    .collect(),
            },
            ProcessExpression::Sequence(left, right) => {
                ProcessExpression::Sequence(Box::new(rebuilder.process(left)), Box::new(rebuilder.process(right)))
            }
            ProcessExpression::Choice(left, right) => {
                ProcessExpression::Choice(Box::new(rebuilder.process(left)), Box::new(rebuilder.process(right)))
            }
            ProcessExpression::Sync(left, right) => {
                ProcessExpression::Sync(Box::new(rebuilder.process(left)), Box::new(rebuilder.process(right)))
            }
            ProcessExpression::Merge(left, right) => {
                ProcessExpression::Merge(Box::new(rebuilder.process(left)), Box::new(rebuilder.process(right)))
            }
            ProcessExpression::LeftMerge(left, right) => {
                ProcessExpression::LeftMerge(Box::new(rebuilder.process(left)), Box::new(rebuilder.process(right)))
            }
            ProcessExpression::BoundedInit(left, right) => {
                ProcessExpression::BoundedInit(Box::new(rebuilder.process(left)), Box::new(rebuilder.process(right)))
            }
            ProcessExpression::IfThen { condition, then } => ProcessExpression::IfThen {
                condition: rebuilder.data(condition),
                then: Box::new(rebuilder.process(then)),
            },
            ProcessExpression::IfThenElse {
                condition,
                then,
                otherwise,
            } => ProcessExpression::IfThenElse {
                condition: rebuilder.data(condition),
                then: Box::new(rebuilder.process(then)),
                otherwise: Box::new(rebuilder.process(otherwise)),
            },
            ProcessExpression::Sum { variables, operand } => ProcessExpression::Sum {
                variables: variables.clone(),
                operand: Box::new(rebuilder.process(operand)),
            },
            ProcessExpression::At { operand, time } => ProcessExpression::At {
                operand: Box::new(rebuilder.process(operand)),
                time: rebuilder.data(time),
            },
            ProcessExpression::Block { actions, operand } => ProcessExpression::Block {
                actions: actions.clone(),
                operand: Box::new(rebuilder.process(operand)),
            },
            ProcessExpression::Hide { actions, operand } => ProcessExpression::Hide {
                actions: actions.clone(),
                operand: Box::new(rebuilder.process(operand)),
            },
            ProcessExpression::Rename { renames, operand } => ProcessExpression::Rename {
                renames: renames.clone(),
                operand: Box::new(rebuilder.process(operand)),
            },
            ProcessExpression::Comm {
                communications,
                operand,
            } => ProcessExpression::Comm {
                communications: communications.clone(),
                operand: Box::new(rebuilder.process(operand)),
            },
            ProcessExpression::Allow { multi_actions, operand } => ProcessExpression::Allow {
                multi_actions: multi_actions.clone(),
                operand: Box::new(rebuilder.process(operand)),
            },
        }
    }

    /// Returns the name of the operator, used in diagnostics.
    pub fn operator_name(&self) -> &'static str {
        match self {
            ProcessExpression::Delta => "delta",
            ProcessExpression::Tau => "tau",
            ProcessExpression::Action(_) => "action",
            ProcessExpression::Instance { .. } | ProcessExpression::InstanceAssignment { .. } => "process instance",
            ProcessExpression::Sequence(..) => "sequential composition",
            ProcessExpression::Choice(..) => "choice",
            ProcessExpression::Sync(..) => "synchronisation",
            ProcessExpression::Merge(..) => "parallel composition",
            ProcessExpression::LeftMerge(..) => "left merge",
            ProcessExpression::BoundedInit(..) => "bounded initialisation",
            ProcessExpression::IfThen { .. } => "conditional",
            ProcessExpression::IfThenElse { .. } => "conditional with else branch",
            ProcessExpression::Sum { .. } => "summation",
            ProcessExpression::At { .. } => "time",
            ProcessExpression::Block { .. } => "block",
            ProcessExpression::Hide { .. } => "hide",
            ProcessExpression::Rename { .. } => "rename",
            ProcessExpression::Comm { .. } => "comm",
            ProcessExpression::Allow { .. } => "allow",
        }
    }

    fn is_atomic(&self) -> bool {
        matches!(
            self,
            ProcessExpression::Delta
                | ProcessExpression::Tau
                | ProcessExpression::Action(_)
                | ProcessExpression::Instance { .. }
                | ProcessExpression::InstanceAssignment { .. }
                | ProcessExpression::Block { .. }
                | ProcessExpression::Hide { .. }
                | ProcessExpression::Rename { .. }
                | ProcessExpression::Comm { .. }
                | ProcessExpression::Allow { .. }
        )
    }
}

/// Writes the operand, in parentheses when it is not atomic.
struct Operand<'a>(&'a ProcessExpression);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_atomic() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, elements: &[T], separator: &str) -> fmt::Result {
    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{element}")?;
    }
    Ok(())
}

fn write_variables(f: &mut fmt::Formatter<'_>, variables: &[DataVariable]) -> fmt::Result {
    for (index, variable) in variables.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", variable.name(), variable.sort())?;
    }
    Ok(())
}

impl fmt::Display for ProcessExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessExpression::Delta => write!(f, "delta"),
            ProcessExpression::Tau => write!(f, "tau"),
            ProcessExpression::Action(action) => write!(f, "{action}"),
            ProcessExpression::Instance { identifier, arguments } => {
                write!(f, "{identifier}")?;
                if !arguments.is_empty() {
                    write!(f, "(")?;
                    write_list(f, arguments, ", ")?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            ProcessExpression::InstanceAssignment {
                identifier,
                assignments,
            } => {
                write!(f, "{identifier}(")?;
                for (index, (variable, value)) in assignments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", variable.name(), value)?;
                }
                write!(f, ")")
            }
            ProcessExpression::Sequence(left, right) => write!(f, "{} . {}", Operand(left), Operand(right)),
            ProcessExpression::Choice(left, right) => write!(f, "{} + {}", Operand(left), Operand(right)),
            ProcessExpression::Sync(left, right) => write!(f, "{} | {}", Operand(left), Operand(right)),
            ProcessExpression::Merge(left, right) => write!(f, "{} || {}", Operand(left), Operand(right)),
            ProcessExpression::LeftMerge(left, right) => write!(f, "{} ||_ {}", Operand(left), Operand(right)),
            ProcessExpression::BoundedInit(left, right) => write!(f, "{} << {}", Operand(left), Operand(right)),
            ProcessExpression::IfThen { condition, then } => write!(f, "({condition}) -> {}", Operand(then)),
            ProcessExpression::IfThenElse {
                condition,
                then,
                otherwise,
            } => write!(f, "({condition}) -> {} <> {}", Operand(then), Operand(otherwise)),
            ProcessExpression::Sum { variables, operand } => {
                write!(f, "sum ")?;
                write_variables(f, variables)?;
                write!(f, ". {}", Operand(operand))
            }
            ProcessExpression::At { operand, time } => write!(f, "{} @ ({time})", Operand(operand)),
            ProcessExpression::Block { actions, operand } => {
                write!(f, "block({{")?;
                write_list(f, actions, ", ")?;
                write!(f, "}}, {operand})")
            }
            ProcessExpression::Hide { actions, operand } => {
                write!(f, "hide({{")?;
                write_list(f, actions, ", ")?;
                write!(f, "}}, {operand})")
            }
            ProcessExpression::Rename { renames, operand } => {
                write!(f, "rename({{")?;
                for (index, (from, to)) in renames.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{from} -> {to}")?;
                }
                write!(f, "}}, {operand})")
            }
            ProcessExpression::Comm {
                communications,
                operand,
            } => {
                write!(f, "comm({{")?;
                for (index, (from, to)) in communications.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write_list(f, from, "|")?;
                    write!(f, " -> {to}")?;
                }
                write!(f, "}}, {operand})")
            }
            ProcessExpression::Allow { multi_actions, operand } => {
                write!(f, "allow({{")?;
                for (index, multi_action) in multi_actions.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write_list(f, multi_action, "|")?;
                }
                write!(f, "}}, {operand})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::less;
    use crate::data::standard::nat;
    use crate::data::standard::nat_sort;
    use crate::process::ActionLabel;

    #[test]
    fn test_substitute_renames_summation_variables() {
        let x = DataVariable::new("x", nat_sort());
        let y = DataVariable::new("y", nat_sort());
        let label = ActionLabel::new("a", vec![nat_sort()]);

        // sum x: Nat. (x < y) -> a(x)
        let expression = ProcessExpression::sum(
            vec![x.clone()],
            ProcessExpression::if_then(
                less(&x.clone().into(), &y.clone().into()),
                ProcessExpression::Action(Action::new(label, vec![x.clone().into()])),
            ),
        );
        assert_eq!(expression.free_variables(), vec![y.clone()]);

        let mut sigma = DataSubstitution::default();
        sigma.insert(y, x.into());
        assert_eq!(expression.substitute(&sigma).to_string(), "sum x0: Nat. ((x0 < x) -> a(x0))");
    }

    #[test]
    fn test_split_choice() {
        let expression = ProcessExpression::join_choice([
            ProcessExpression::Tau,
            ProcessExpression::Delta,
            ProcessExpression::Tau,
        ]);
        assert_eq!(expression.split_choice().len(), 3);
        assert_eq!(expression.to_string(), "(tau + delta) + tau");

        let instance = ProcessExpression::Instance {
            identifier: ProcessIdentifier::new("P", vec![nat_sort()]),
            arguments: vec![nat(3)],
        };
        assert_eq!(ProcessExpression::seq(ProcessExpression::Tau, instance).to_string(), "tau . P(3)");
    }
}
