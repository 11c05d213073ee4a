use log::debug;
use rustc_hash::FxHashMap;

use mcrl2::data::standard::equal_to;
use mcrl2::data::standard::nat;
use mcrl2::data::standard::nat_sort;
use mcrl2::data::DataExpression;
use mcrl2::data::DataVariable;
use mcrl2::process::ProcessEquation;
use mcrl2::process::ProcessExpression;
use mcrl2::process::ProcessIdentifier;
use mcrl2::process::ProcessSpecification;
use mcrl2::Mcrl2Error;

use crate::linearize::initial_instance;
use crate::linearize::map_instances;
use crate::linearize::process_names;
use crate::linearize::variable_names;
use crate::normal_form::guard;

/// Combines the process equations, which must all have the same parameters,
/// into a single equation. A new parameter `phase: Nat` records which of the
/// equations is active.
///
/// Returns the equation and the initial values of its parameters.
pub(crate) fn join_processes(spec: &ProcessSpecification) -> Result<(ProcessEquation, Vec<DataExpression>), Mcrl2Error> {
    let (initial, arguments) = initial_instance(spec)?;

    if let [equation] = spec.equations.as_slice() {
        return Ok((equation.clone(), arguments.to_vec()));
    }

    let Some(first) = spec.equations.first() else {
        return Err(Mcrl2Error::ScopeError(format!("the process {initial} is not declared")));
    };

    if let Some(equation) = spec
        .equations
        .iter()
        .find(|equation| equation.parameters != first.parameters)
    {
        return Err(Mcrl2Error::Unsupported(format!(
            "the parameters of {} differ from those of {}",
            equation.identifier, first.identifier
        )));
    }

    let phase = DataVariable::new(&variable_names(spec).fresh("phase"), nat_sort());
    let mut parameters = vec![phase.clone()];
    parameters.extend(first.parameters.iter().cloned());

    let identifier = ProcessIdentifier::new(
        &process_names(spec).fresh("P"),
        parameters.iter().map(|parameter| parameter.sort()).collect(),
    );

    let phases: FxHashMap<&ProcessIdentifier, u64> = spec
        .equations
        .iter()
        .zip(0..)
        .map(|(equation, index)| (&equation.identifier, index))
        .collect();

    let phase_expression: DataExpression = phase.clone().into();
    let mut undeclared = None;
    let summands: Vec<ProcessExpression> = spec
        .equations
        .iter()
        .zip(0..)
        .map(|(equation, current)| {
            let body = map_instances(&equation.body, |instance| {
                let ProcessExpression::InstanceAssignment {
                    identifier: target,
                    assignments,
                } = instance
                else {
                    return None;
                };

                let Some(&next) = phases.get(target) else {
                    undeclared = Some(target.clone());
                    return None;
                };

                let mut result = Vec::with_capacity(assignments.len() + 1);
                if next != current {
                    result.push((phase.clone(), nat(next)));
                }
                result.extend(assignments.iter().cloned());

                Some(ProcessExpression::InstanceAssignment {
                    identifier: identifier.clone(),
                    assignments: result,
                })
            });

            guard(&equal_to(&phase_expression, &nat(current)), body)
        })
        .collect();

    if let Some(target) = undeclared {
        return Err(Mcrl2Error::ScopeError(format!("the process {target} is not declared")));
    }

    let initial_phase = phases
        .get(initial)
        .copied()
        .ok_or_else(|| Mcrl2Error::ScopeError(format!("the initial process {initial} is not declared")))?;

    let mut initial_state = vec![nat(initial_phase)];
    initial_state.extend(arguments.iter().cloned());

    debug!("Joined {} process equations using the parameter {}", spec.equations.len(), phase.name());
    Ok((
        ProcessEquation::new(identifier, parameters, ProcessExpression::join_choice(summands)),
        initial_state,
    ))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use mcrl2::process::Action;
    use mcrl2::process::ActionLabel;

    use super::*;

    fn call(identifier: &ProcessIdentifier) -> ProcessExpression {
        ProcessExpression::InstanceAssignment {
            identifier: identifier.clone(),
            assignments: Vec::new(),
        }
    }

    #[test]
    fn test_join_processes() {
        let p = ProcessIdentifier::new("P", Vec::new());
        let q = ProcessIdentifier::new("Q", Vec::new());
        let a = ProcessExpression::Action(Action::new(ActionLabel::new("a", Vec::new()), Vec::new()));

        let spec = ProcessSpecification {
            equations: vec![
                ProcessEquation::new(p.clone(), Vec::new(), ProcessExpression::seq(a.clone(), call(&q))),
                ProcessEquation::new(q.clone(), Vec::new(), ProcessExpression::seq(a, call(&q))),
            ],
            init: Some(ProcessExpression::Instance {
                identifier: q,
                arguments: Vec::new(),
            }),
            ..Default::default()
        };

        let (equation, initial_state) = join_processes(&spec).unwrap();
        assert_eq!(equation.parameters.len(), 1);
        assert_eq!(equation.parameters[0].name(), "phase");
        assert_eq!(initial_state, vec![nat(1)]);

        // The recursive call of Q keeps the phase.
        assert_eq!(
            equation.body.to_string(),
            "((phase == 0) -> (a . P0(phase = 1))) + ((phase == 1) -> (a . P0()))"
        );
    }
}
