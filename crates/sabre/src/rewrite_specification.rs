use std::fmt;

use mcrl2::data::standard::true_;
use mcrl2::data::DataEquation;
use mcrl2::data::DataExpression;
use mcrl2::data::DataFunctionSymbol;
use mcrl2::data::DataSpecification;
use mcrl2::data::DataVariable;

use crate::UsedEquationSelector;

/// A rewrite specification contains the bare info we need for rewriting, the
/// rules obtained from the equations of a data specification.
#[derive(Debug, Clone, Default)]
pub struct RewriteSpecification {
    pub rewrite_rules: Vec<Rule>,
}

/// Either lhs == rhs or lhs != rhs.
#[derive(Hash, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct Condition {
    pub lhs: DataExpression,
    pub rhs: DataExpression,
    pub equality: bool,
}

/// The rule `conditions -> lhs = rhs`.
#[derive(Hash, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct Rule {
    /// A conjunction of clauses.
    pub conditions: Vec<Condition>,
    pub variables: Vec<DataVariable>,
    pub lhs: DataExpression,
    pub rhs: DataExpression,
}

impl Rule {
    /// The function symbol at the head of the left-hand side, rules whose
    /// left-hand side is a variable are not supported.
    pub fn head_symbol(&self) -> Option<DataFunctionSymbol> {
        self.lhs.head_symbol()
    }

    /// Returns true iff the head of the left-hand side is a function symbol,
    /// and not a nested application such as `f(x)(y)`.
    pub fn is_first_order(&self) -> bool {
        self.lhs.is_function_symbol() || (self.lhs.is_application() && self.lhs.head().is_function_symbol())
    }
}

impl From<&DataEquation> for Rule {
    fn from(equation: &DataEquation) -> Self {
        let conditions = if equation.has_condition() {
            vec![Condition {
                lhs: equation.condition.clone(),
                rhs: true_(),
                equality: true,
            }]
        } else {
            Vec::new()
        };

        Rule {
            conditions,
            variables: equation.variables.clone(),
            lhs: equation.lhs.clone(),
            rhs: equation.rhs.clone(),
        }
    }
}

impl RewriteSpecification {
    /// Takes all the equations of the normalised data specification.
    pub fn new(spec: &DataSpecification) -> RewriteSpecification {
        RewriteSpecification::with_selector(spec, &UsedEquationSelector::all())
    }

    /// Takes the equations of the data specification that the selector keeps.
    pub fn with_selector(spec: &DataSpecification, selector: &UsedEquationSelector) -> RewriteSpecification {
        RewriteSpecification {
            rewrite_rules: spec
                .equations()
                .iter()
                .filter(|equation| selector.is_used(equation))
                .filter(|equation| equation.lhs.head_symbol().is_some())
                .map(Rule::from)
                .collect(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.equality {
            write!(f, "{} == {}", self.lhs, self.rhs)
        } else {
            write!(f, "{} <> {}", self.lhs, self.rhs)
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            write!(f, "{} = {}", self.lhs, self.rhs)
        } else {
            write!(f, "{} = {} if ", self.lhs, self.rhs)?;
            for (index, condition) in self.conditions.iter().enumerate() {
                if index > 0 {
                    write!(f, " && ")?;
                }
                write!(f, "{condition}")?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for RewriteSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rewrite rules: ")?;
        for rule in &self.rewrite_rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
