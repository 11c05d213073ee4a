use std::fmt;

use crate::aterm::create_constant;
use crate::aterm::create_term;
use crate::aterm::ATerm;
use crate::aterm::ATermList;
use crate::aterm::ATermTrait;
use crate::aterm::SymbolTrait;
use crate::data::DataAssignment;
use crate::data::DataExpression;
use crate::data::DataSpecification;
use crate::data::DataVariable;
use crate::data::SortExpression;
use crate::process::ActionLabel;
use crate::process::MultiAction;
use crate::Mcrl2Error;

/// The summand `sum e: E. c(d, e) -> a(f(d, e)) @ t(d, e) . P(g(d, e))` of a
/// linear process. Parameters that are not assigned keep their value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActionSummand {
    pub summation_variables: Vec<DataVariable>,
    pub condition: DataExpression,
    pub multi_action: MultiAction,
    pub time: Option<DataExpression>,
    pub assignments: Vec<(DataVariable, DataExpression)>,
}

impl ActionSummand {
    /// Returns the value of every parameter after taking this summand, in
    /// terms of the parameters and summation variables.
    pub fn next_state(&self, parameters: &[DataVariable]) -> Vec<DataExpression> {
        parameters
            .iter()
            .map(|parameter| {
                self.assignments
                    .iter()
                    .find(|(variable, _)| variable == parameter)
                    .map_or_else(|| parameter.clone().into(), |(_, value)| value.clone())
            })
            .collect()
    }

    pub fn is_tau(&self) -> bool {
        self.multi_action.is_tau()
    }
}

impl fmt::Display for ActionSummand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.summation_variables.is_empty() {
            write!(f, "sum ")?;
            for (index, variable) in self.summation_variables.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", variable.name(), variable.sort())?;
            }
            write!(f, ". ")?;
        }

        write!(f, "({}) -> {}", self.condition, self.multi_action)?;
        if let Some(time) = &self.time {
            write!(f, " @ ({time})")?;
        }

        write!(f, " . P(")?;
        for (index, (variable, value)) in self.assignments.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", variable.name(), value)?;
        }
        write!(f, ")")
    }
}

/// A linear process specification, the result of linearisation and the input
/// of state space exploration.
#[derive(Clone, Default)]
pub struct LinearProcessSpecification {
    pub data: DataSpecification,
    pub action_labels: Vec<ActionLabel>,
    pub global_variables: Vec<DataVariable>,
    pub parameters: Vec<DataVariable>,
    pub initial_state: Vec<DataExpression>,
    pub summands: Vec<ActionSummand>,
}

impl LinearProcessSpecification {
    pub fn parameter_sorts(&self) -> Vec<SortExpression> {
        self.parameters.iter().map(|parameter| parameter.sort()).collect()
    }
}

impl fmt::Display for LinearProcessSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)?;

        if !self.action_labels.is_empty() {
            writeln!(f, "act")?;
            for label in &self.action_labels {
                writeln!(f, "  {label};")?;
            }
            writeln!(f)?;
        }

        if !self.global_variables.is_empty() {
            writeln!(f, "glob")?;
            for variable in &self.global_variables {
                writeln!(f, "  {}: {};", variable.name(), variable.sort())?;
            }
            writeln!(f)?;
        }

        write!(f, "proc P")?;
        if !self.parameters.is_empty() {
            write!(f, "(")?;
            for (index, parameter) in self.parameters.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", parameter.name(), parameter.sort())?;
            }
            write!(f, ")")?;
        }
        writeln!(f, " =")?;

        if self.summands.is_empty() {
            writeln!(f, "       delta;")?;
        }
        for (index, summand) in self.summands.iter().enumerate() {
            let prefix = if index == 0 { "    " } else { "  + " };
            let suffix = if index + 1 == self.summands.len() { ";" } else { "" };
            writeln!(f, "  {prefix}{summand}{suffix}")?;
        }
        writeln!(f)?;

        write!(f, "init P")?;
        if !self.initial_state.is_empty() {
            write!(f, "(")?;
            for (index, value) in self.initial_state.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, ")")?;
        }
        writeln!(f, ";")
    }
}

const NIL: &str = "Nil";

impl From<&ActionSummand> for ATerm {
    fn from(summand: &ActionSummand) -> Self {
        let variables: ATermList<DataVariable> = ATermList::new(summand.summation_variables.clone());
        let time = match &summand.time {
            Some(time) => time.clone().into(),
            None => create_constant(NIL),
        };
        let assignments: ATermList<DataAssignment> = ATermList::new(
            summand
                .assignments
                .iter()
                .map(|(variable, value)| DataAssignment::new(variable.clone(), value.clone()))
                .collect(),
        );

        create_term(
            "LinearSummand",
            &[
                variables.into(),
                summand.condition.clone().into(),
                (&summand.multi_action).into(),
                time,
                assignments.into(),
            ],
        )
    }
}

impl TryFrom<&ATerm> for ActionSummand {
    type Error = Mcrl2Error;

    fn try_from(term: &ATerm) -> Result<Self, Self::Error> {
        if term.get_head_symbol().name() != "LinearSummand" || term.get_head_symbol().arity() != 5 {
            return Err(Mcrl2Error::SyntaxError(format!("{term} is not a linear summand")));
        }

        let variables: ATermList<DataVariable> = term.arg(0).into();
        let time = term.arg(3).protect();
        let assignments: ATermList<DataAssignment> = term.arg(4).into();

        Ok(ActionSummand {
            summation_variables: variables.iter().collect(),
            condition: term.arg(1).protect().into(),
            multi_action: MultiAction::try_from(&term.arg(2).protect())?,
            time: if time.get_head_symbol().name() == NIL {
                None
            } else {
                Some(time.into())
            },
            assignments: assignments
                .iter()
                .map(|assignment| (assignment.lhs(), assignment.rhs()))
                .collect(),
        })
    }
}

impl From<&LinearProcessSpecification> for ATerm {
    fn from(lps: &LinearProcessSpecification) -> Self {
        let labels: ATermList<ATerm> = ATermList::new(lps.action_labels.iter().map(ATerm::from).collect());
        let globals: ATermList<DataVariable> = ATermList::new(lps.global_variables.clone());
        let parameters: ATermList<DataVariable> = ATermList::new(lps.parameters.clone());
        let summands: ATermList<ATerm> = ATermList::new(lps.summands.iter().map(ATerm::from).collect());
        let initial: ATermList<DataExpression> = ATermList::new(lps.initial_state.clone());

        create_term(
            "LinProcSpec",
            &[
                (&lps.data).into(),
                create_term("ActSpec", &[labels.into()]),
                create_term("GlobVarSpec", &[globals.into()]),
                create_term("LinearProcess", &[parameters.into(), summands.into()]),
                create_term("LinearProcessInit", &[initial.into()]),
            ],
        )
    }
}

impl TryFrom<ATerm> for LinearProcessSpecification {
    type Error = Mcrl2Error;

    fn try_from(term: ATerm) -> Result<Self, Self::Error> {
        if term.get_head_symbol().name() != "LinProcSpec" || term.get_head_symbol().arity() != 5 {
            return Err(Mcrl2Error::SyntaxError(
                "the term is not a linear process specification".to_string(),
            ));
        }

        let data = DataSpecification::try_from(term.arg(0).protect())?;

        let labels: ATermList<ATerm> = term.arg(1).arg(0).into();
        let action_labels = labels
            .iter()
            .map(|label| ActionLabel::try_from(&label))
            .collect::<Result<Vec<_>, _>>()?;

        let globals: ATermList<DataVariable> = term.arg(2).arg(0).into();
        let process = term.arg(3);
        let parameters: ATermList<DataVariable> = process.arg(0).into();
        let summands: ATermList<ATerm> = process.arg(1).into();
        let summands = summands
            .iter()
            .map(|summand| ActionSummand::try_from(&summand))
            .collect::<Result<Vec<_>, _>>()?;
        let initial: ATermList<DataExpression> = term.arg(4).arg(0).into();

        let lps = LinearProcessSpecification {
            data,
            action_labels,
            global_variables: globals.iter().collect(),
            parameters: parameters.iter().collect(),
            initial_state: initial.iter().collect(),
            summands,
        };

        if lps.parameters.len() != lps.initial_state.len() {
            return Err(Mcrl2Error::SyntaxError(format!(
                "the initial state has {} values for {} parameters",
                lps.initial_state.len(),
                lps.parameters.len()
            )));
        }
        Ok(lps)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::aterm::BinaryATermReader;
    use crate::aterm::BinaryATermWriter;
    use crate::data::standard::bool_sort;
    use crate::data::standard::nat;
    use crate::data::standard::nat_sort;
    use crate::data::standard::not;
    use crate::data::standard::true_;
    use crate::process::Action;

    fn example() -> LinearProcessSpecification {
        let n = DataVariable::new("n", nat_sort());
        let b = DataVariable::new("b", bool_sort());
        let a = ActionLabel::new("a", vec![bool_sort()]);

        LinearProcessSpecification {
            data: DataSpecification::new(),
            action_labels: vec![a.clone()],
            global_variables: Vec::new(),
            parameters: vec![n.clone(), b.clone()],
            initial_state: vec![nat(0), true_()],
            summands: vec![ActionSummand {
                summation_variables: Vec::new(),
                condition: true_(),
                multi_action: MultiAction::new(vec![Action::new(a, vec![b.clone().into()])]),
                time: None,
                assignments: vec![(b.clone(), not(&b.into()))],
            }],
        }
    }

    #[test]
    fn test_next_state() {
        let lps = example();
        let next = lps.summands[0].next_state(&lps.parameters);
        assert_eq!(next[0], lps.parameters[0].clone().into());
        assert_eq!(next[1].to_string(), "!b");
    }

    #[test]
    fn test_binary_lps() {
        let lps = example();

        let mut buffer = Vec::new();
        let mut writer = BinaryATermWriter::new(&mut buffer).unwrap();
        writer.write(&(&lps).into()).unwrap();
        writer.finish().unwrap();

        let mut reader = BinaryATermReader::new(&buffer[..]).unwrap();
        let result = LinearProcessSpecification::try_from(reader.read_term().unwrap()).unwrap();
        assert_eq!(result.parameters, lps.parameters);
        assert_eq!(result.initial_state, lps.initial_state);
        assert_eq!(result.summands, lps.summands);
        assert_eq!(result.action_labels, lps.action_labels);
    }

    #[test]
    fn test_print_lps() {
        let text = example().to_string();
        assert!(text.contains("proc P(n: Nat, b: Bool) ="), "{text}");
        assert!(text.contains("(true) -> a(b) . P(b = !b);"), "{text}");
        assert!(text.contains("init P(0, true);"), "{text}");
    }
}
