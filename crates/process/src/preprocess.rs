//! The passes that simplify the process equations before they are brought
//! into normal form.

use std::collections::VecDeque;

use log::debug;
use log::trace;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use mcrl2::data::DataExpression;
use mcrl2::data::DataFunctionSymbol;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::data::SortExpression;
use mcrl2::process::ProcessEquation;
use mcrl2::process::ProcessExpression;
use mcrl2::process::ProcessIdentifier;
use mcrl2::process::ProcessSpecification;
use mcrl2rust_sabre::RewriteEngine;

use crate::linearize::equation_variable_names;
use crate::linearize::for_each_instance;
use crate::linearize::map_instances;

/// Brings every data expression in the equations and the initial process
/// into normal form.
pub(crate) fn rewrite_data(spec: &mut ProcessSpecification, rewriter: &mut dyn RewriteEngine) {
    for equation in &mut spec.equations {
        equation.body = equation.body.map_data(|expression| rewriter.rewrite(expression));
    }

    if let Some(init) = &spec.init {
        spec.init = Some(init.map_data(|expression| rewriter.rewrite(expression)));
    }
}

/// A parameter of a structured sort with a single constructor, which is
/// replaced by one parameter per argument of that constructor.
struct Expansion {
    constructor: DataFunctionSymbol,
    projections: Vec<DataFunctionSymbol>,
}

impl Expansion {
    /// Returns the expansion for parameters of the given sort, if any.
    fn of(structured_sorts: &[(SortExpression, SortExpression)], sort: &SortExpression) -> Option<Expansion> {
        let (_, definition) = structured_sorts.iter().find(|(name, _)| name == sort)?;
        if definition.constructors().len() != 1 {
            return None;
        }

        let constructor = definition.constructors().head();
        let arguments: Vec<_> = constructor.arguments().iter().collect();
        if arguments.is_empty() || arguments.iter().any(|argument| argument.name().is_none()) {
            return None;
        }

        let domain: Vec<SortExpression> = arguments.iter().map(|argument| argument.sort()).collect();
        Some(Expansion {
            constructor: DataFunctionSymbol::new(constructor.name(), SortExpression::function(domain, sort.clone())),
            projections: arguments
                .iter()
                .map(|argument| {
                    DataFunctionSymbol::new(
                        argument.name().unwrap_or_default(),
                        SortExpression::function(vec![sort.clone()], argument.sort()),
                    )
                })
                .collect(),
        })
    }

    /// The arguments that replace the given argument of a process instance.
    fn arguments(&self, argument: &DataExpression) -> Vec<DataExpression> {
        let constructor: DataExpression = self.constructor.clone().into();
        if argument.is_application() && argument.head() == constructor {
            (0..argument.arity()).map(|index| argument.argument(index)).collect()
        } else {
            self.projections
                .iter()
                .map(|projection| DataExpression::application(&projection.clone().into(), &[argument.clone()]))
                .collect()
        }
    }
}

/// Replaces every process parameter of a structured sort with a single
/// constructor by the arguments of that constructor. The initial process and
/// all process instances are adjusted accordingly.
pub(crate) fn expand_structured_sorts(spec: &mut ProcessSpecification) {
    let structured_sorts = spec.data.sort_specification().structured_sorts();

    let mut expanded: FxHashMap<ProcessIdentifier, (ProcessIdentifier, Vec<Option<Expansion>>)> = FxHashMap::default();
    for equation in &mut spec.equations {
        let mut names = equation_variable_names(equation, &spec.global_variables);
        let mut parameters = Vec::new();
        let mut expansions = Vec::new();
        let mut sigma = DataSubstitution::default();

        for parameter in &equation.parameters {
            match Expansion::of(&structured_sorts, &parameter.sort()) {
                Some(expansion) => {
                    let fields: Vec<DataVariable> = expansion
                        .projections
                        .iter()
                        .map(|projection| DataVariable::new(&names.fresh(projection.name()), projection.sort().codomain()))
                        .collect();

                    let arguments: Vec<DataExpression> = fields.iter().map(|field| field.clone().into()).collect();
                    sigma.insert(
                        parameter.clone(),
                        DataExpression::application(&expansion.constructor.clone().into(), &arguments),
                    );

                    trace!("Expanded the parameter {} of {} into {:?}", parameter.name(), equation.identifier, fields);
                    parameters.extend(fields);
                    expansions.push(Some(expansion));
                }
                None => {
                    parameters.push(parameter.clone());
                    expansions.push(None);
                }
            }
        }

        if sigma.is_empty() {
            continue;
        }

        let identifier = ProcessIdentifier::new(
            &equation.identifier.name,
            parameters.iter().map(|parameter| parameter.sort()).collect(),
        );
        let body = equation.body.substitute(&sigma);
        expanded.insert(equation.identifier.clone(), (identifier.clone(), expansions));
        *equation = ProcessEquation::new(identifier, parameters, body);
    }

    if expanded.is_empty() {
        return;
    }

    let adjust = |instance: &ProcessExpression| -> Option<ProcessExpression> {
        let ProcessExpression::Instance { identifier, arguments } = instance else {
            return None;
        };

        let (identifier, expansions) = expanded.get(identifier)?;
        let mut result = Vec::new();
        for (argument, expansion) in arguments.iter().zip(expansions) {
            match expansion {
                Some(expansion) => result.extend(expansion.arguments(argument)),
                None => result.push(argument.clone()),
            }
        }

        Some(ProcessExpression::Instance {
            identifier: identifier.clone(),
            arguments: result,
        })
    };

    for equation in &mut spec.equations {
        equation.body = map_instances(&equation.body, adjust);
    }

    if let Some(init) = &spec.init {
        spec.init = Some(map_instances(init, adjust));
    }
}

/// Substitutes the body of every process that is not recursive and is used
/// at most `max_usage` times at the places where it is used. The initial
/// process is never substituted.
pub(crate) fn eliminate_single_usage(spec: &mut ProcessSpecification, max_usage: usize) {
    let initial = match &spec.init {
        Some(ProcessExpression::Instance { identifier, .. }) => Some(identifier.clone()),
        _ => None,
    };

    loop {
        let mut usage: FxHashMap<ProcessIdentifier, usize> = FxHashMap::default();
        for equation in &spec.equations {
            for_each_instance(&equation.body, |identifier| {
                *usage.entry(identifier.clone()).or_default() += 1;
            });
        }

        let candidate = spec.equations.iter().position(|equation| {
            Some(&equation.identifier) != initial.as_ref()
                && usage
                    .get(&equation.identifier)
                    .is_some_and(|count| *count <= max_usage)
                && !is_recursive(equation)
        });

        let Some(index) = candidate else {
            break;
        };

        let eliminated = spec.equations.remove(index);
        debug!(
            "Substituted the process {} at the {} places where it is used",
            eliminated.identifier,
            usage.get(&eliminated.identifier).copied().unwrap_or_default()
        );

        for equation in &mut spec.equations {
            equation.body = map_instances(&equation.body, |instance| match instance {
                ProcessExpression::Instance { identifier, arguments } if *identifier == eliminated.identifier => {
                    let sigma: DataSubstitution = eliminated
                        .parameters
                        .iter()
                        .cloned()
                        .zip(arguments.iter().cloned())
                        .collect();
                    Some(eliminated.body.substitute(&sigma))
                }
                _ => None,
            });
        }
    }
}

fn is_recursive(equation: &ProcessEquation) -> bool {
    let mut result = false;
    for_each_instance(&equation.body, |identifier| {
        result |= *identifier == equation.identifier;
    });
    result
}

/// Removes the equations that cannot be reached from the initial process.
pub(crate) fn remove_unreachable_equations(spec: &mut ProcessSpecification) {
    let mut reachable: FxHashSet<ProcessIdentifier> = FxHashSet::default();
    let mut queue = VecDeque::new();

    if let Some(init) = &spec.init {
        for_each_instance(init, |identifier| queue.push_back(identifier.clone()));
    }

    while let Some(identifier) = queue.pop_front() {
        if !reachable.insert(identifier.clone()) {
            continue;
        }

        if let Some(equation) = spec.equation(&identifier) {
            for_each_instance(&equation.body, |identifier| {
                if !reachable.contains(identifier) {
                    queue.push_back(identifier.clone());
                }
            });
        }
    }

    let before = spec.equations.len();
    spec.equations.retain(|equation| reachable.contains(&equation.identifier));
    if spec.equations.len() < before {
        debug!("Removed {} unreachable process equations", before - spec.equations.len());
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use mcrl2::typecheck::TypeCheckOptions;

    use super::*;
    use crate::parse_process_specification;

    fn specification(text: &str) -> ProcessSpecification {
        parse_process_specification(text, &TypeCheckOptions::default()).unwrap()
    }

    #[test]
    fn test_eliminate_single_usage() {
        let mut spec = specification(indoc! {"
            act a, b: Nat;
            proc P(n: Nat) = a(n) . Q(n);
                 Q(m: Nat) = b(m) . P(m);
            init P(0);
        "});

        eliminate_single_usage(&mut spec, 1);
        assert_eq!(spec.equations.len(), 1);
        assert_eq!(spec.equations[0].body.to_string(), "a(n) . (b(n) . P(n))");
    }

    #[test]
    fn test_recursive_process_is_kept() {
        let mut spec = specification(indoc! {"
            act a;
            proc P = a . Q;
                 Q = a . Q;
            init P;
        "});

        eliminate_single_usage(&mut spec, 1);
        assert_eq!(spec.equations.len(), 2);
    }

    #[test]
    fn test_remove_unreachable_equations() {
        let mut spec = specification(indoc! {"
            act a;
            proc P = a . P;
                 Q = a . Q;
            init P;
        "});

        remove_unreachable_equations(&mut spec);
        assert_eq!(spec.equations.len(), 1);
        assert_eq!(spec.equations[0].identifier.name, "P");
    }

    #[test]
    fn test_expand_structured_sorts() {
        let mut spec = specification(indoc! {"
            sort S = struct c(i: Int, b: Bool);
            act a: Int;
            proc P(s: S) = a(i(s)) . P(c(i(s) + 1, !b(s)));
            init P(c(0, true));
        "});

        expand_structured_sorts(&mut spec);
        let equation = &spec.equations[0];
        let names: Vec<&str> = equation.parameters.iter().map(|parameter| parameter.name()).collect();
        assert_eq!(names, vec!["i", "b"]);

        let init = spec.init.unwrap();
        let ProcessExpression::Instance { arguments, .. } = &init else {
            panic!("the initial process must be an instance");
        };
        assert_eq!(arguments.len(), 2);
    }
}
