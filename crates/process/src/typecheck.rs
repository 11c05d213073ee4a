//! Type checking of the process part of a specification.

use log::debug;
use mcrl2_syntax as syntax;
use mcrl2_syntax::ProcExprBinaryOp;
use mcrl2_syntax::ProcessExpr;
use mcrl2_syntax::UntypedProcessSpecification;

use mcrl2::data::standard::bool_sort;
use mcrl2::data::standard::real_sort;
use mcrl2::data::DataExpression;
use mcrl2::data::DataSpecification;
use mcrl2::data::DataVariable;
use mcrl2::data::SortExpression;
use mcrl2::process::Action;
use mcrl2::process::ActionLabel;
use mcrl2::process::ProcessEquation;
use mcrl2::process::ProcessExpression;
use mcrl2::process::ProcessIdentifier;
use mcrl2::process::ProcessSpecification;
use mcrl2::typecheck::typecheck_data_specification;
use mcrl2::typecheck::DataTypeChecker;
use mcrl2::typecheck::TypeCheckOptions;
use mcrl2::typecheck::VariableContext;
use mcrl2::Mcrl2Error;

/// Parses and type checks a complete specification.
pub fn parse_process_specification(text: &str, options: &TypeCheckOptions) -> Result<ProcessSpecification, Mcrl2Error> {
    let untyped = mcrl2_syntax::parse_specification(text)?;
    typecheck_process_specification(&untyped, options)
}

/// Type checks the data, action, global variable, process and initial
/// sections of a parsed specification.
pub fn typecheck_process_specification(
    untyped: &UntypedProcessSpecification,
    options: &TypeCheckOptions,
) -> Result<ProcessSpecification, Mcrl2Error> {
    let data = typecheck_data_specification(&untyped.data_specification, options)?;
    let mut checker = ProcessTypeChecker::new(&data, options.clone());

    let mut action_labels: Vec<ActionLabel> = Vec::new();
    for declaration in &untyped.action_declarations {
        let sorts = declaration
            .args
            .iter()
            .map(|sort| checker.data.typecheck_sort(sort))
            .collect::<Result<Vec<_>, _>>()?;

        let label = ActionLabel::new(&declaration.identifier, sorts);
        if action_labels.contains(&label) {
            return Err(Mcrl2Error::ScopeError(format!("the action {label} is declared twice")));
        }
        action_labels.push(label);
    }
    checker.action_labels = action_labels.clone();

    let global_variables = checker.data.typecheck_variables(&untyped.global_variables)?;

    // Collect all identifiers first, since processes can refer to each other.
    let mut parameters = Vec::new();
    for declaration in &untyped.process_declarations {
        let variables = checker.data.typecheck_variables(&declaration.params)?;
        let identifier = ProcessIdentifier::new(
            &declaration.identifier,
            variables.iter().map(|variable| variable.sort()).collect(),
        );

        if checker.processes.iter().any(|(existing, _)| *existing == identifier) {
            return Err(Mcrl2Error::ScopeError(format!(
                "the process {} is declared twice",
                declaration.identifier
            )));
        }

        if action_labels.iter().any(|label| label.name == declaration.identifier) {
            return Err(Mcrl2Error::Ambiguous(format!(
                "{} is declared both as an action and as a process",
                declaration.identifier
            )));
        }

        checker.processes.push((identifier, variables.clone()));
        parameters.push(variables);
    }

    let mut equations = Vec::new();
    for (declaration, variables) in untyped.process_declarations.iter().zip(parameters) {
        let context = VariableContext::from_variables(global_variables.iter().chain(variables.iter()));
        let body = checker.check(&declaration.body, &context)?;
        let identifier = ProcessIdentifier::new(
            &declaration.identifier,
            variables.iter().map(|variable| variable.sort()).collect(),
        );
        equations.push(ProcessEquation::new(identifier, variables, body));
    }

    let init = match &untyped.init {
        Some(init) => Some(checker.check(init, &VariableContext::from_variables(global_variables.iter()))?),
        None => None,
    };

    debug!(
        "Type checked {} actions and {} process equations",
        action_labels.len(),
        equations.len()
    );
    Ok(ProcessSpecification {
        data,
        action_labels,
        global_variables,
        equations,
        init,
    })
}

/// Resolves actions and process references on top of the data type checker.
struct ProcessTypeChecker<'a> {
    data: DataTypeChecker<'a>,
    action_labels: Vec<ActionLabel>,
    processes: Vec<(ProcessIdentifier, Vec<DataVariable>)>,
}

impl<'a> ProcessTypeChecker<'a> {
    fn new(spec: &'a DataSpecification, options: TypeCheckOptions) -> ProcessTypeChecker<'a> {
        ProcessTypeChecker {
            data: DataTypeChecker::new(spec, options),
            action_labels: Vec::new(),
            processes: Vec::new(),
        }
    }

    fn check(&mut self, expression: &ProcessExpr, context: &VariableContext) -> Result<ProcessExpression, Mcrl2Error> {
        match expression {
            ProcessExpr::Delta => Ok(ProcessExpression::Delta),
            ProcessExpr::Tau => Ok(ProcessExpression::Tau),
            ProcessExpr::Action(name, arguments) => self.check_action_or_instance(name, arguments, context),
            ProcessExpr::Id(name, assignments) => {
                if assignments.is_empty() {
                    self.check_action_or_instance(name, &[], context)
                } else {
                    self.check_assignments(name, assignments, context)
                }
            }
            ProcessExpr::Sum { variables, operand } => {
                let variables = self.data.typecheck_variables(variables)?;
                let operand = self.check(operand, &context.with(variables.iter()))?;
                Ok(ProcessExpression::sum(variables, operand))
            }
            ProcessExpr::Binary { op, lhs, rhs } => {
                let left = Box::new(self.check(lhs, context)?);
                let right = Box::new(self.check(rhs, context)?);
                Ok(match op {
                    ProcExprBinaryOp::Sequence => ProcessExpression::Sequence(left, right),
                    ProcExprBinaryOp::Choice => ProcessExpression::Choice(left, right),
                    ProcExprBinaryOp::Parallel => ProcessExpression::Merge(left, right),
                    ProcExprBinaryOp::LeftMerge => ProcessExpression::LeftMerge(left, right),
                    ProcExprBinaryOp::CommMerge => ProcessExpression::Sync(left, right),
                    ProcExprBinaryOp::Until => ProcessExpression::BoundedInit(left, right),
                })
            }
            ProcessExpr::Condition { condition, then, else_ } => {
                let condition = self.data.typecheck(condition, &bool_sort(), context)?;
                let then = Box::new(self.check(then, context)?);
                match else_ {
                    Some(otherwise) => Ok(ProcessExpression::IfThenElse {
                        condition,
                        then,
                        otherwise: Box::new(self.check(otherwise, context)?),
                    }),
                    None => Ok(ProcessExpression::IfThen { condition, then }),
                }
            }
            ProcessExpr::At { expr, operand } => Ok(ProcessExpression::At {
                operand: Box::new(self.check(expr, context)?),
                time: self.data.typecheck(operand, &real_sort(), context)?,
            }),
            ProcessExpr::Hide { actions, operand } => {
                self.check_action_names(actions.iter())?;
                Ok(ProcessExpression::Hide {
                    actions: actions.clone(),
                    operand: Box::new(self.check(operand, context)?),
                })
            }
            ProcessExpr::Block { actions, operand } => {
                self.check_action_names(actions.iter())?;
                Ok(ProcessExpression::Block {
                    actions: actions.clone(),
                    operand: Box::new(self.check(operand, context)?),
                })
            }
            ProcessExpr::Rename { renames, operand } => {
                self.check_action_names(renames.iter().flat_map(|rename| [&rename.from, &rename.to]))?;
                Ok(ProcessExpression::Rename {
                    renames: renames.iter().map(|rename| (rename.from.clone(), rename.to.clone())).collect(),
                    operand: Box::new(self.check(operand, context)?),
                })
            }
            ProcessExpr::Comm { comm, operand } => {
                self.check_action_names(
                    comm.iter()
                        .flat_map(|communication| communication.from.actions.iter().chain([&communication.to])),
                )?;
                Ok(ProcessExpression::Comm {
                    communications: comm
                        .iter()
                        .map(|communication| (communication.from.actions.clone(), communication.to.clone()))
                        .collect(),
                    operand: Box::new(self.check(operand, context)?),
                })
            }
            ProcessExpr::Allow { actions, operand } => {
                self.check_action_names(actions.iter().flat_map(|multi_action| multi_action.actions.iter()))?;
                Ok(ProcessExpression::Allow {
                    multi_actions: actions.iter().map(|multi_action| multi_action.actions.clone()).collect(),
                    operand: Box::new(self.check(operand, context)?),
                })
            }
        }
    }

    fn check_action_names<'b>(&self, mut names: impl Iterator<Item = &'b String>) -> Result<(), Mcrl2Error> {
        match names.find(|name| !self.action_labels.iter().any(|label| label.name == **name)) {
            Some(name) => Err(Mcrl2Error::ScopeError(format!("the action {name} is not declared"))),
            None => Ok(()),
        }
    }

    /// Resolves `name(arguments)` to an action or a process instance with
    /// positional arguments.
    fn check_action_or_instance(
        &mut self,
        name: &str,
        arguments: &[syntax::DataExpr],
        context: &VariableContext,
    ) -> Result<ProcessExpression, Mcrl2Error> {
        let labels: Vec<ActionLabel> = self
            .action_labels
            .iter()
            .filter(|label| label.name == name && label.sorts.len() == arguments.len())
            .cloned()
            .collect();

        if !labels.is_empty() {
            let candidates: Vec<Vec<SortExpression>> = labels.iter().map(|label| label.sorts.clone()).collect();
            let (index, arguments) = self.resolve(name, &candidates, arguments, context)?;
            return Ok(ProcessExpression::Action(Action::new(labels[index].clone(), arguments)));
        }

        let identifiers: Vec<ProcessIdentifier> = self
            .processes
            .iter()
            .map(|(identifier, _)| identifier)
            .filter(|identifier| identifier.name == name && identifier.sorts.len() == arguments.len())
            .cloned()
            .collect();

        if identifiers.is_empty() {
            return Err(Mcrl2Error::ScopeError(format!(
                "{name} with {} arguments is not a declared action or process",
                arguments.len()
            )));
        }

        let candidates: Vec<Vec<SortExpression>> = identifiers.iter().map(|identifier| identifier.sorts.clone()).collect();
        let (index, arguments) = self.resolve(name, &candidates, arguments, context)?;
        Ok(ProcessExpression::Instance {
            identifier: identifiers[index].clone(),
            arguments,
        })
    }

    /// Selects the overload whose sorts fit the arguments, an overload that
    /// fits without conversions is preferred.
    fn resolve(
        &mut self,
        name: &str,
        candidates: &[Vec<SortExpression>],
        arguments: &[syntax::DataExpr],
        context: &VariableContext,
    ) -> Result<(usize, Vec<DataExpression>), Mcrl2Error> {
        if candidates.len() > 1 {
            let untyped: Result<Vec<DataExpression>, Mcrl2Error> = arguments
                .iter()
                .map(|argument| self.data.typecheck(argument, &SortExpression::untyped(), context))
                .collect();

            if let Ok(untyped) = untyped {
                let sorts: Vec<SortExpression> = untyped.iter().map(|argument| argument.sort()).collect();
                let exact: Vec<usize> = (0..candidates.len()).filter(|index| candidates[*index] == sorts).collect();
                if exact.len() == 1 {
                    return Ok((exact[0], untyped));
                }
            }
        }

        let mut fitting = Vec::new();
        let mut last_error = None;
        for (index, sorts) in candidates.iter().enumerate() {
            let result: Result<Vec<DataExpression>, Mcrl2Error> = arguments
                .iter()
                .zip(sorts)
                .map(|(argument, sort)| self.data.typecheck(argument, sort, context))
                .collect();

            match result {
                Ok(arguments) => fitting.push((index, arguments)),
                Err(error) => last_error = Some(error),
            }
        }

        match fitting.len() {
            1 => Ok(fitting.remove(0)),
            0 => Err(last_error.unwrap_or_else(|| Mcrl2Error::TypeMismatch(format!("no overload of {name} fits")))),
            _ => Err(Mcrl2Error::Ambiguous(format!(
                "the arguments of {name} fit {} of its declarations",
                fitting.len()
            ))),
        }
    }

    /// Resolves the instance `name(d1 = e1, ...)` and converts it to
    /// positional form, parameters that are not assigned keep the value of
    /// the variable with the same name.
    fn check_assignments(
        &mut self,
        name: &str,
        assignments: &[syntax::Assignment],
        context: &VariableContext,
    ) -> Result<ProcessExpression, Mcrl2Error> {
        let candidates: Vec<(ProcessIdentifier, Vec<DataVariable>)> = self
            .processes
            .iter()
            .filter(|(identifier, parameters)| {
                identifier.name == name
                    && assignments
                        .iter()
                        .all(|assignment| parameters.iter().any(|parameter| parameter.name() == assignment.identifier))
            })
            .cloned()
            .collect();

        let (identifier, parameters) = match candidates.len() {
            1 => candidates.into_iter().next().ok_or_else(|| Mcrl2Error::ScopeError(name.to_string()))?,
            0 => {
                return Err(Mcrl2Error::ScopeError(format!(
                    "there is no process {name} with the assigned parameters"
                )))
            }
            _ => return Err(Mcrl2Error::Ambiguous(format!("the assignments to {name} fit several processes"))),
        };

        for (index, assignment) in assignments.iter().enumerate() {
            if assignments[..index]
                .iter()
                .any(|other| other.identifier == assignment.identifier)
            {
                return Err(Mcrl2Error::ScopeError(format!(
                    "the parameter {} of {name} is assigned twice",
                    assignment.identifier
                )));
            }
        }

        let mut arguments = Vec::with_capacity(parameters.len());
        for parameter in &parameters {
            match assignments.iter().find(|assignment| assignment.identifier == parameter.name()) {
                Some(assignment) => arguments.push(self.data.typecheck(&assignment.expr, &parameter.sort(), context)?),
                None => {
                    if context.get(parameter.name()) != Some(&parameter.sort()) {
                        return Err(Mcrl2Error::ScopeError(format!(
                            "the parameter {} of {name} is not assigned and no variable {}: {} is in scope",
                            parameter.name(),
                            parameter.name(),
                            parameter.sort()
                        )));
                    }
                    arguments.push(parameter.clone().into());
                }
            }
        }

        Ok(ProcessExpression::Instance { identifier, arguments })
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_log::test;

    use super::*;

    fn typecheck(text: &str) -> Result<ProcessSpecification, Mcrl2Error> {
        parse_process_specification(text, &TypeCheckOptions::default())
    }

    #[test]
    fn test_simple_choice() {
        let spec = typecheck(indoc! {"
            sort D = struct d1 | d2;
            act a: D;
            proc P(e: D) = sum d: D. a(e) . P(d);
            init P(d1);
        "})
        .unwrap();

        assert_eq!(spec.action_labels.len(), 1);
        assert_eq!(spec.equations.len(), 1);
        assert_eq!(spec.equations[0].to_string(), "P(e: D) = sum d: D. (a(e) . P(d))");
        assert_eq!(spec.init.unwrap().to_string(), "P(d1)");
    }

    #[test]
    fn test_overloaded_actions() {
        let spec = typecheck(indoc! {"
            act a: Nat;
                a: Bool;
            init a(true) . a(1);
        "})
        .unwrap();

        let ProcessExpression::Sequence(left, right) = spec.init.unwrap() else {
            panic!("expected a sequential composition");
        };
        let (ProcessExpression::Action(left), ProcessExpression::Action(right)) = (*left, *right) else {
            panic!("expected actions");
        };
        assert_eq!(left.label.sorts, vec![bool_sort()]);
        assert_eq!(right.label.sorts[0].to_string(), "Nat");
    }

    #[test]
    fn test_assignment_instance() {
        let spec = typecheck(indoc! {"
            act a;
            proc P(n: Nat, b: Bool) = a . P(b = !b);
            init P(0, false);
        "})
        .unwrap();

        assert_eq!(spec.equations[0].body.to_string(), "a . P(n, !b)");
    }

    #[test]
    fn test_undeclared_action() {
        let error = typecheck("init b;").err().unwrap();
        assert!(matches!(error, Mcrl2Error::ScopeError(_)), "{error}");
    }

    #[test]
    fn test_condition_must_be_boolean() {
        let error = typecheck(indoc! {"
            act a;
            init (1 + 1) -> a;
        "})
        .err().unwrap();
        assert!(matches!(error, Mcrl2Error::TypeMismatch(_)), "{error}");
    }

    #[test]
    fn test_global_variables() {
        let spec = typecheck(indoc! {"
            act a: Nat;
            glob g: Nat;
            proc P = a(g) . P;
            init P;
        "})
        .unwrap();

        assert_eq!(spec.global_variables.len(), 1);
        assert_eq!(spec.equations[0].body.free_variables(), spec.global_variables);
    }
}
