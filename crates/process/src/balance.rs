use itertools::Itertools;
use log::debug;
use log::trace;
use rustc_hash::FxHashMap;

use mcrl2::data::DataExpression;
use mcrl2::data::DataSpecification;
use mcrl2::data::DataVariable;
use mcrl2::data::RepresentativeGenerator;
use mcrl2::process::ProcessEquation;
use mcrl2::process::ProcessExpression;
use mcrl2::process::ProcessIdentifier;
use mcrl2::process::ProcessSpecification;
use mcrl2::Mcrl2Error;
use mcrl2rust_utilities::FreshNameGenerator;

use crate::linearize::initial_instance;
use crate::linearize::map_instances;
use crate::linearize::variable_names;

/// Chooses the values of parameters that are irrelevant for a process.
struct DefaultValues<'a> {
    generator: RepresentativeGenerator<'a>,
    names: FreshNameGenerator,
    values: FxHashMap<DataVariable, DataExpression>,

    /// Global variables that are introduced for sorts without a closed term.
    introduced: Vec<DataVariable>,
}

impl<'a> DefaultValues<'a> {
    fn new(data: &'a DataSpecification, names: FreshNameGenerator) -> DefaultValues<'a> {
        DefaultValues {
            generator: RepresentativeGenerator::new(data),
            names,
            values: FxHashMap::default(),
            introduced: Vec::new(),
        }
    }

    fn value(&mut self, parameter: &DataVariable) -> DataExpression {
        if let Some(value) = self.values.get(parameter) {
            return value.clone();
        }

        let value = match self.generator.representative(&parameter.sort()) {
            Some(value) => value,
            None => {
                let variable = DataVariable::new(&self.names.fresh("dummy"), parameter.sort());
                debug!(
                    "Introduced the global variable {} as the value of {}",
                    variable.name(),
                    parameter.name()
                );
                self.introduced.push(variable.clone());
                variable.into()
            }
        };

        trace!("The default value of {} is {value}", parameter.name());
        self.values.insert(parameter.clone(), value.clone());
        value
    }
}

/// Gives all process equations the same parameters, which are the
/// parameters of all equations in the order of their first occurrence.
///
/// A process instance assigns a default value to the parameters that the
/// process it refers to did not have before, such that these parameters
/// do not distinguish otherwise equal states.
pub(crate) fn balance_parameters(spec: &mut ProcessSpecification) -> Result<(), Mcrl2Error> {
    let mut parameters: Vec<DataVariable> = Vec::new();
    for equation in &spec.equations {
        for parameter in &equation.parameters {
            match parameters.iter().find(|existing| existing.name() == parameter.name()) {
                Some(existing) if existing.sort() != parameter.sort() => {
                    return Err(Mcrl2Error::Unsupported(format!(
                        "the parameter {} of {} has sort {}, but another process has a parameter {} of sort {}",
                        parameter.name(),
                        equation.identifier,
                        parameter.sort(),
                        existing.name(),
                        existing.sort()
                    )));
                }
                Some(_) => {}
                None => parameters.push(parameter.clone()),
            }
        }
    }

    let sorts: Vec<_> = parameters.iter().map(|parameter| parameter.sort()).collect();
    let mut process_names = FreshNameGenerator::new();
    let mut identifiers: FxHashMap<ProcessIdentifier, (ProcessIdentifier, Vec<DataVariable>)> = FxHashMap::default();
    for equation in &spec.equations {
        identifiers.insert(
            equation.identifier.clone(),
            (
                ProcessIdentifier::new(&process_names.fresh(&equation.identifier.name), sorts.clone()),
                equation.parameters.clone(),
            ),
        );
    }

    let (initial, arguments) = initial_instance(spec)?;
    let (initial, initial_parameters) = identifiers
        .get(initial)
        .cloned()
        .ok_or_else(|| Mcrl2Error::ScopeError(format!("the initial process {initial} is not declared")))?;
    let arguments = arguments.to_vec();

    let mut defaults = DefaultValues::new(&spec.data, variable_names(spec));
    for equation in &mut spec.equations {
        let body = map_instances(&equation.body, |instance| {
            let ProcessExpression::InstanceAssignment {
                identifier,
                assignments,
            } = instance
            else {
                return None;
            };

            let (identifier, original) = identifiers.get(identifier)?;
            let mut assignments = assignments.clone();
            for parameter in &parameters {
                if !original.contains(parameter) && !assignments.iter().any(|(variable, _)| variable == parameter) {
                    assignments.push((parameter.clone(), defaults.value(parameter)));
                }
            }

            Some(ProcessExpression::InstanceAssignment {
                identifier: identifier.clone(),
                assignments,
            })
        });

        let identifier = identifiers
            .get(&equation.identifier)
            .map(|(identifier, _)| identifier.clone())
            .ok_or_else(|| Mcrl2Error::ScopeError(format!("the process {} is not declared", equation.identifier)))?;
        *equation = ProcessEquation::new(identifier, parameters.clone(), body);
    }

    let initial_state: Vec<DataExpression> = parameters
        .iter()
        .map(|parameter| {
            match initial_parameters.iter().position(|original| original == parameter) {
                Some(index) => arguments[index].clone(),
                None => defaults.value(parameter),
            }
        })
        .collect();

    let introduced = defaults.introduced;
    spec.global_variables.extend(introduced);
    spec.init = Some(ProcessExpression::Instance {
        identifier: initial,
        arguments: initial_state,
    });

    debug!(
        "Balanced {} process equations to the parameters {}",
        spec.equations.len(),
        parameters
            .iter()
            .format_with(", ", |parameter, f| f(&format_args!("{}: {}", parameter.name(), parameter.sort())))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use mcrl2::typecheck::TypeCheckOptions;

    use super::*;
    use crate::normal_form::to_assignment_form;
    use crate::parse_process_specification;

    #[test]
    fn test_balance_parameters() {
        let mut spec = parse_process_specification(
            indoc! {"
                act a: Nat;
                    b: Bool;
                proc P(n: Nat) = a(n) . Q(true);
                     Q(c: Bool) = b(c) . P(0);
                init P(0);
            "},
            &TypeCheckOptions::default(),
        )
        .unwrap();

        to_assignment_form(&mut spec);
        balance_parameters(&mut spec).unwrap();

        for equation in &spec.equations {
            let names: Vec<&str> = equation.parameters.iter().map(|parameter| parameter.name()).collect();
            assert_eq!(names, vec!["n", "c"]);
        }

        // The call to Q resets n, the call to P resets c.
        assert_eq!(spec.equations[0].body.to_string(), "a(n) . Q(c = true, n = 0)");
        assert_eq!(spec.equations[1].body.to_string(), "b(c) . P(n = 0, c = true)");

        let Some(ProcessExpression::Instance { arguments, .. }) = &spec.init else {
            panic!("the initial process must be an instance");
        };
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn test_conflicting_sorts() {
        let mut spec = parse_process_specification(
            indoc! {"
                act a;
                proc P(n: Nat) = a . Q(true);
                     Q(n: Bool) = a . P(3);
                init P(0);
            "},
            &TypeCheckOptions::default(),
        )
        .unwrap();

        to_assignment_form(&mut spec);
        let error = balance_parameters(&mut spec).unwrap_err();
        assert!(matches!(error, Mcrl2Error::Unsupported(_)), "{error}");
    }
}
