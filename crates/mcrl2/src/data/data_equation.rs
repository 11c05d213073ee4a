use std::fmt;

use crate::aterm::create_term;
use crate::aterm::ATerm;
use crate::aterm::ATermList;
use crate::aterm::ATermTrait;
use crate::data::standard::true_;
use crate::data::DataExpression;
use crate::data::DataVariable;

/// A conditional equation `condition -> lhs = rhs` over the given variables,
/// the condition of an unconditional equation is `true`.
#[derive(PartialEq, Eq, Hash, Clone, PartialOrd, Ord, Debug)]
pub struct DataEquation {
    pub variables: Vec<DataVariable>,
    pub condition: DataExpression,
    pub lhs: DataExpression,
    pub rhs: DataExpression,
}

impl DataEquation {
    /// Creates an unconditional equation.
    pub fn new(variables: Vec<DataVariable>, lhs: DataExpression, rhs: DataExpression) -> DataEquation {
        DataEquation {
            variables,
            condition: true_(),
            lhs,
            rhs,
        }
    }

    /// Creates a conditional equation.
    pub fn with_condition(
        variables: Vec<DataVariable>,
        condition: DataExpression,
        lhs: DataExpression,
        rhs: DataExpression,
    ) -> DataEquation {
        DataEquation {
            variables,
            condition,
            lhs,
            rhs,
        }
    }

    /// Returns true iff the condition is not trivially true.
    pub fn has_condition(&self) -> bool {
        self.condition != true_()
    }
}

impl From<ATerm> for DataEquation {
    fn from(value: ATerm) -> Self {
        let variables: ATermList<DataVariable> = value.arg(0).into();

        DataEquation {
            variables: variables.iter().collect(),
            condition: value.arg(1).protect().into(),
            lhs: value.arg(2).protect().into(),
            rhs: value.arg(3).protect().into(),
        }
    }
}

impl From<&DataEquation> for ATerm {
    fn from(equation: &DataEquation) -> Self {
        let variables: ATermList<DataVariable> = ATermList::new(equation.variables.clone());
        create_term(
            "DataEqn",
            &[
                variables.into(),
                equation.condition.clone().into(),
                equation.lhs.clone().into(),
                equation.rhs.clone().into(),
            ],
        )
    }
}

impl fmt::Display for DataEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_condition() {
            write!(f, "{} -> ", self.condition)?;
        }
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::data::standard::*;

    use super::*;

    #[test]
    fn test_equation_term() {
        let b = DataVariable::new("b", bool_sort());
        let equation = DataEquation::new(vec![b.clone()], not(&not(&b.clone().into())), b.clone().into());

        assert!(!equation.has_condition());
        assert_eq!(equation.to_string(), "!!b = b");

        let term: ATerm = (&equation).into();
        assert_eq!(DataEquation::from(term), equation);
    }
}
