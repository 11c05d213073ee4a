use log::debug;
use log::info;

use mcrl2::data::DataExpression;
use mcrl2::data::DataVariable;
use mcrl2::lps::LinearProcessSpecification;
use mcrl2::process::ProcessEquation;
use mcrl2::process::ProcessExpression;
use mcrl2::process::ProcessIdentifier;
use mcrl2::process::ProcessRebuilder;
use mcrl2::process::ProcessSpecification;
use mcrl2::Mcrl2Error;
use mcrl2rust_sabre::create_rewriter;
use mcrl2rust_sabre::RewriteEngine;
use mcrl2rust_sabre::RewriteStrategy;
use mcrl2rust_sabre::UsedEquationSelector;
use mcrl2rust_utilities::FreshNameGenerator;

use crate::balance::balance_parameters;
use crate::extract::extract_summands;
use crate::join::join_processes;
use crate::normal_form::expand_if_then_else;
use crate::normal_form::expand_sums;
use crate::normal_form::make_guarded;
use crate::normal_form::to_assignment_form;
use crate::preprocess::eliminate_single_usage;
use crate::preprocess::expand_structured_sorts;
use crate::preprocess::remove_unreachable_equations;
use crate::preprocess::rewrite_data;
use crate::sequential::remove_nested_sequences;

/// Options of the linearizer.
#[derive(Clone, Debug)]
pub struct LinearizeOptions {
    /// Replace process parameters of a structured sort with a single
    /// constructor by its projections.
    pub expand_structured_sorts: bool,

    /// Processes that are used at most this number of times, and are not
    /// recursive, are substituted at the places where they are used.
    pub max_usage: usize,

    /// The rewriter that is used for the simplification of data expressions.
    pub rewrite_strategy: RewriteStrategy,
}

impl Default for LinearizeOptions {
    fn default() -> Self {
        LinearizeOptions {
            expand_structured_sorts: false,
            max_usage: 1,
            rewrite_strategy: RewriteStrategy::default(),
        }
    }
}

/// Transforms the process specification into a linear process with the
/// same behaviour.
///
/// Returns [Mcrl2Error::Unsupported] when the specification has no initial
/// process or uses an operator outside of the sequential fragment, such as
/// parallel composition.
pub fn linearize(
    spec: &ProcessSpecification,
    options: &LinearizeOptions,
) -> Result<LinearProcessSpecification, Mcrl2Error> {
    check_supported(spec)?;

    let mut spec = spec.clone();
    make_initial_instance(&mut spec)?;

    let mut rewriter = create_rewriter(&spec.data, options.rewrite_strategy, &UsedEquationSelector::all());
    rewrite_data(&mut spec, rewriter.as_mut());

    if options.expand_structured_sorts {
        expand_structured_sorts(&mut spec);
        rewrite_data(&mut spec, rewriter.as_mut());
        debug!("Expanded structured sorts");
    }

    eliminate_single_usage(&mut spec, options.max_usage);
    remove_unreachable_equations(&mut spec);
    debug!("{} process equations remain after preprocessing", spec.equations.len());

    for equation in &mut spec.equations {
        equation.body = expand_sums(&expand_if_then_else(&equation.body));
    }
    to_assignment_form(&mut spec);

    balance_parameters(&mut spec)?;
    remove_nested_sequences(&mut spec)?;
    balance_parameters(&mut spec)?;
    debug!(
        "{} process equations with {} parameters after removing nested sequential compositions",
        spec.equations.len(),
        spec.equations.first().map_or(0, |equation| equation.parameters.len())
    );

    make_guarded(&mut spec);

    let (equation, initial_state) = join_processes(&spec)?;
    let summands = extract_summands(&equation, &spec.global_variables)?;

    let initial_state: Vec<DataExpression> = initial_state.iter().map(|value| rewriter.rewrite(value)).collect();
    info!(
        "Linearised into a process with {} parameters and {} summands",
        equation.parameters.len(),
        summands.len()
    );

    Ok(LinearProcessSpecification {
        data: spec.data,
        action_labels: spec.action_labels,
        global_variables: spec.global_variables,
        parameters: equation.parameters,
        initial_state,
        summands,
    })
}

/// Checks that only operators of the sequential fragment are used.
fn check_supported(spec: &ProcessSpecification) -> Result<(), Mcrl2Error> {
    let Some(init) = &spec.init else {
        return Err(Mcrl2Error::Unsupported(
            "the specification has no initial process".to_string(),
        ));
    };

    for equation in &spec.equations {
        check_expression(&equation.body)
            .map_err(|error| Mcrl2Error::Unsupported(format!("{error} in the equation of {}", equation.identifier)))?;
    }

    check_expression(init).map_err(|error| Mcrl2Error::Unsupported(format!("{error} in the initial process")))
}

fn check_expression(expression: &ProcessExpression) -> Result<(), String> {
    match expression {
        ProcessExpression::Delta
        | ProcessExpression::Tau
        | ProcessExpression::Action(_)
        | ProcessExpression::Instance { .. }
        | ProcessExpression::InstanceAssignment { .. } => Ok(()),
        ProcessExpression::Sequence(left, right) | ProcessExpression::Choice(left, right) => {
            check_expression(left)?;
            check_expression(right)
        }
        ProcessExpression::IfThen { then, .. } => check_expression(then),
        ProcessExpression::IfThenElse { then, otherwise, .. } => {
            check_expression(then)?;
            check_expression(otherwise)
        }
        ProcessExpression::Sum { operand, .. } => check_expression(operand),
        ProcessExpression::Sync(..) => {
            if is_multi_action(expression) {
                Ok(())
            } else {
                Err(format!("the synchronisation {expression} is not a multi-action"))
            }
        }
        ProcessExpression::At { operand, .. } => {
            if is_multi_action(operand) {
                Ok(())
            } else {
                Err(format!("the time constraint on {operand} is not applied to a multi-action"))
            }
        }
        _ => Err(format!("the {} operator", expression.operator_name())),
    }
}

/// Returns true iff the expression is a multi-action: actions and tau
/// combined with `|`.
pub(crate) fn is_multi_action(expression: &ProcessExpression) -> bool {
    match expression {
        ProcessExpression::Tau | ProcessExpression::Action(_) => true,
        ProcessExpression::Sync(left, right) => is_multi_action(left) && is_multi_action(right),
        _ => false,
    }
}

/// Returns true iff the expression is a multi-action, possibly with a time
/// stamp.
pub(crate) fn is_timed_multi_action(expression: &ProcessExpression) -> bool {
    match expression {
        ProcessExpression::At { operand, .. } => is_multi_action(operand),
        _ => is_multi_action(expression),
    }
}

/// Introduces a parameterless process for an initial process expression
/// that is not a process instance.
fn make_initial_instance(spec: &mut ProcessSpecification) -> Result<(), Mcrl2Error> {
    let init = spec
        .init
        .take()
        .ok_or_else(|| Mcrl2Error::Unsupported("the specification has no initial process".to_string()))?;

    let init = match init {
        ProcessExpression::Instance { .. } => init,
        ProcessExpression::InstanceAssignment { identifier, assignments } => {
            // Without a caller every parameter of the initial process must be assigned.
            let equation = spec
                .equation(&identifier)
                .ok_or_else(|| Mcrl2Error::ScopeError(format!("the process {identifier} is not declared")))?;

            let arguments = equation
                .parameters
                .iter()
                .map(|parameter| {
                    assignments
                        .iter()
                        .find(|(variable, _)| variable == parameter)
                        .map(|(_, value)| value.clone())
                        .ok_or_else(|| {
                            Mcrl2Error::ScopeError(format!(
                                "the parameter {} of the initial process {identifier} is not assigned",
                                parameter.name()
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            ProcessExpression::Instance { identifier, arguments }
        }
        body => {
            let identifier = ProcessIdentifier::new(&process_names(spec).fresh("Init"), Vec::new());
            debug!("Introduced the process {identifier} for the initial process {body}");
            spec.equations.push(ProcessEquation::new(identifier.clone(), Vec::new(), body));
            ProcessExpression::Instance {
                identifier,
                arguments: Vec::new(),
            }
        }
    };

    spec.init = Some(init);
    Ok(())
}

/// Returns the identifier and arguments of the initial process instance.
pub(crate) fn initial_instance(spec: &ProcessSpecification) -> Result<(&ProcessIdentifier, &[DataExpression]), Mcrl2Error> {
    match &spec.init {
        Some(ProcessExpression::Instance { identifier, arguments }) => Ok((identifier, arguments)),
        _ => Err(Mcrl2Error::Unsupported(
            "the initial process is not a process instance".to_string(),
        )),
    }
}

/// A generator that avoids the names of the process equations.
pub(crate) fn process_names(spec: &ProcessSpecification) -> FreshNameGenerator {
    spec.equations
        .iter()
        .map(|equation| equation.identifier.name.clone())
        .collect()
}

/// A generator that avoids the names of all variables in the specification.
pub(crate) fn variable_names(spec: &ProcessSpecification) -> FreshNameGenerator {
    let mut generator: FreshNameGenerator = spec
        .global_variables
        .iter()
        .map(|variable| variable.name().to_string())
        .collect();

    for equation in &spec.equations {
        for parameter in &equation.parameters {
            generator.add(parameter.name());
        }
        add_bound_names(&equation.body, &mut generator);
    }

    if let Some(init) = &spec.init {
        add_bound_names(init, &mut generator);
    }
    generator
}

/// A generator that avoids the names of the global variables and the
/// variables that occur in the equation.
pub(crate) fn equation_variable_names(
    equation: &ProcessEquation,
    global_variables: &[DataVariable],
) -> FreshNameGenerator {
    let mut generator: FreshNameGenerator = global_variables
        .iter()
        .chain(equation.parameters.iter())
        .map(|variable| variable.name().to_string())
        .collect();
    add_bound_names(&equation.body, &mut generator);
    generator
}

fn add_bound_names(expression: &ProcessExpression, generator: &mut FreshNameGenerator) {
    for variable in expression.free_variables() {
        generator.add(variable.name());
    }

    for_each_sum(expression, &mut |variables| {
        for variable in variables {
            generator.add(variable.name());
        }
    });
}

fn for_each_sum(expression: &ProcessExpression, f: &mut impl FnMut(&[DataVariable])) {
    match expression {
        ProcessExpression::Sum { variables, operand } => {
            f(variables);
            for_each_sum(operand, f);
        }
        ProcessExpression::Sequence(left, right)
        | ProcessExpression::Choice(left, right)
        | ProcessExpression::Sync(left, right)
        | ProcessExpression::Merge(left, right)
        | ProcessExpression::LeftMerge(left, right)
        | ProcessExpression::BoundedInit(left, right) => {
            for_each_sum(left, f);
            for_each_sum(right, f);
        }
        ProcessExpression::IfThen { then, .. } => for_each_sum(then, f),
        ProcessExpression::IfThenElse { then, otherwise, .. } => {
            for_each_sum(then, f);
            for_each_sum(otherwise, f);
        }
        ProcessExpression::At { operand, .. }
        | ProcessExpression::Block { operand, .. }
        | ProcessExpression::Hide { operand, .. }
        | ProcessExpression::Rename { operand, .. }
        | ProcessExpression::Comm { operand, .. }
        | ProcessExpression::Allow { operand, .. } => for_each_sum(operand, f),
        ProcessExpression::Delta
        | ProcessExpression::Tau
        | ProcessExpression::Action(_)
        | ProcessExpression::Instance { .. }
        | ProcessExpression::InstanceAssignment { .. } => {}
    }
}

/// Replaces every process instance, in positional or assignment form, by the
/// result of the function.
struct InstanceRebuilder<F>(F);

impl<F: FnMut(&ProcessExpression) -> Option<ProcessExpression>> ProcessRebuilder for InstanceRebuilder<F> {
    fn data(&mut self, expression: &DataExpression) -> DataExpression {
        expression.clone()
    }

    fn process(&mut self, expression: &ProcessExpression) -> ProcessExpression {
        match expression {
            ProcessExpression::Instance { .. } | ProcessExpression::InstanceAssignment { .. } => {
                (self.0)(expression).unwrap_or_else(|| expression.clone())
            }
            _ => expression.transform_children(self),
        }
    }
}

/// Applies the function to every process instance in the expression, an
/// instance for which it returns None is kept.
pub(crate) fn map_instances(
    expression: &ProcessExpression,
    f: impl FnMut(&ProcessExpression) -> Option<ProcessExpression>,
) -> ProcessExpression {
    InstanceRebuilder(f).process(expression)
}

/// Calls the function for every process instance in the expression.
pub(crate) fn for_each_instance(expression: &ProcessExpression, mut f: impl FnMut(&ProcessIdentifier)) {
    map_instances(expression, |instance| {
        match instance {
            ProcessExpression::Instance { identifier, .. }
            | ProcessExpression::InstanceAssignment { identifier, .. } => f(identifier),
            _ => {}
        }
        None
    });
}
