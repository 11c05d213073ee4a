use std::fmt;

use crate::data::DataSpecification;
use crate::data::DataVariable;
use crate::process::ActionLabel;
use crate::process::ProcessExpression;
use crate::process::ProcessIdentifier;

/// The equation `P(d1: D1, ..., dn: Dn) = body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessEquation {
    pub identifier: ProcessIdentifier,
    pub parameters: Vec<DataVariable>,
    pub body: ProcessExpression,
}

impl ProcessEquation {
    pub fn new(identifier: ProcessIdentifier, parameters: Vec<DataVariable>, body: ProcessExpression) -> ProcessEquation {
        debug_assert_eq!(
            identifier.sorts,
            parameters.iter().map(|parameter| parameter.sort()).collect::<Vec<_>>(),
            "The parameters of {} do not match its identifier",
            identifier.name
        );

        ProcessEquation {
            identifier,
            parameters,
            body,
        }
    }
}

impl fmt::Display for ProcessEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier.name)?;
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
        write!(f, " = {}", self.body)
    }
}

/// A type checked process specification.
#[derive(Clone, Default)]
pub struct ProcessSpecification {
    pub data: DataSpecification,
    pub action_labels: Vec<ActionLabel>,
    pub global_variables: Vec<DataVariable>,
    pub equations: Vec<ProcessEquation>,
    pub init: Option<ProcessExpression>,
}

impl ProcessSpecification {
    /// Returns the equation that defines the given process.
    pub fn equation(&self, identifier: &ProcessIdentifier) -> Option<&ProcessEquation> {
        self.equations
            .iter()
            .find(|equation| equation.identifier == *identifier)
    }

    /// Returns the position of the equation that defines the given process.
    pub fn equation_index(&self, identifier: &ProcessIdentifier) -> Option<usize> {
        self.equations
            .iter()
            .position(|equation| equation.identifier == *identifier)
    }
}

impl fmt::Display for ProcessSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)?;

        if !self.action_labels.is_empty() {
            writeln!(f, "act")?;
            for label in &self.action_labels {
                writeln!(f, "  {label};")?;
            }
        }

        if !self.global_variables.is_empty() {
            writeln!(f, "glob")?;
            for variable in &self.global_variables {
                writeln!(f, "  {}: {};", variable.name(), variable.sort())?;
            }
        }

        if !self.equations.is_empty() {
            writeln!(f, "proc")?;
            for equation in &self.equations {
                writeln!(f, "  {equation};")?;
            }
        }

        if let Some(init) = &self.init {
            writeln!(f, "init {init};")?;
        }
        Ok(())
    }
}
