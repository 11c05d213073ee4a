use log::trace;
use log::warn;
use mcrl2_syntax as syntax;
use rustc_hash::FxHashMap;

use crate::data::standard::bag_comprehension;
use crate::data::standard::bag_enumeration;
use crate::data::standard::bool_sort;
use crate::data::standard::convert;
use crate::data::standard::empty_bag;
use crate::data::standard::empty_fbag;
use crate::data::standard::empty_fset;
use crate::data::standard::empty_list;
use crate::data::standard::empty_set;
use crate::data::standard::false_;
use crate::data::standard::fbag_enumeration;
use crate::data::standard::fset_enumeration;
use crate::data::standard::function_update;
use crate::data::standard::int_sort;
use crate::data::standard::list_enumeration;
use crate::data::standard::nat_sort;
use crate::data::standard::number;
use crate::data::standard::number_sort;
use crate::data::standard::pos_sort;
use crate::data::standard::real_sort;
use crate::data::standard::set_comprehension;
use crate::data::standard::set_enumeration;
use crate::data::standard::true_;
use crate::data::BinderKind;
use crate::data::ContainerKind;
use crate::data::DataAbstraction;
use crate::data::DataAssignment;
use crate::data::DataExpression;
use crate::data::DataFunctionSymbol;
use crate::data::DataSpecification;
use crate::data::DataVariable;
use crate::data::DataWhereClause;
use crate::data::SortExpression;
use crate::data::StructuredSortArgument;
use crate::data::StructuredSortConstructor;
use crate::typecheck::signatures::Origin;
use crate::typecheck::signatures::Signatures;
use crate::typecheck::sort_matching::bind_exact;
use crate::typecheck::sort_matching::conversion_cost;
use crate::typecheck::sort_matching::has_placeholder;
use crate::typecheck::sort_matching::instantiate;
use crate::typecheck::sort_matching::join;
use crate::typecheck::sort_matching::SortMatcher;
use crate::Mcrl2Error;

/// Options of the data type checker.
#[derive(Clone, Debug, Default)]
pub struct TypeCheckOptions {
    /// Report an ambiguity when several overloads fit equally well, instead
    /// of taking the one whose sort is printed first.
    pub strictly_ambiguous: bool,
}

/// The sorts of the variables that are in scope, inner declarations shadow
/// outer ones.
#[derive(Clone, Debug, Default)]
pub struct VariableContext {
    variables: FxHashMap<String, SortExpression>,
}

impl VariableContext {
    pub fn new() -> VariableContext {
        VariableContext::default()
    }

    pub fn from_variables<'a>(variables: impl IntoIterator<Item = &'a DataVariable>) -> VariableContext {
        let mut context = VariableContext::new();
        for variable in variables {
            context.insert(variable);
        }
        context
    }

    pub fn insert(&mut self, variable: &DataVariable) {
        self.variables.insert(variable.name().to_string(), variable.sort());
    }

    /// Returns a copy of the context extended with the given variables.
    pub fn with<'a>(&self, variables: impl IntoIterator<Item = &'a DataVariable>) -> VariableContext {
        let mut result = self.clone();
        for variable in variables {
            result.insert(variable);
        }
        result
    }

    pub fn get(&self, name: &str) -> Option<&SortExpression> {
        self.variables.get(name)
    }
}

/// A candidate for an overloaded identifier, ordered such that the best
/// candidate comes first.
struct Candidate {
    cost: usize,
    origin: Origin,
    symbol: DataFunctionSymbol,
}

impl Candidate {
    fn key(&self) -> (usize, Origin, String) {
        (self.cost, self.origin, self.symbol.sort().to_string())
    }
}

/// Elaborates untyped data expressions into typed data expressions, see
/// [DataTypeChecker::typecheck].
pub struct DataTypeChecker<'a> {
    spec: &'a DataSpecification,
    signatures: Signatures,
    options: TypeCheckOptions,

    /// Set when a warning for an implicit conversion has been given for the
    /// current expression.
    warned: bool,

    /// Set during the tentative first pass over arguments.
    quiet: bool,
}

impl<'a> DataTypeChecker<'a> {
    pub fn new(spec: &'a DataSpecification, options: TypeCheckOptions) -> DataTypeChecker<'a> {
        DataTypeChecker {
            spec,
            signatures: Signatures::new(spec),
            options,
            warned: false,
            quiet: false,
        }
    }

    pub fn data_specification(&self) -> &DataSpecification {
        self.spec
    }

    /// Type checks the expression against the expected sort, which can be
    /// [SortExpression::untyped] when the sort is not known. The sort of the
    /// result is the expected sort, after inserting implicit conversions,
    /// when one is given.
    pub fn typecheck(
        &mut self,
        expression: &syntax::DataExpr,
        expected: &SortExpression,
        context: &VariableContext,
    ) -> Result<DataExpression, Mcrl2Error> {
        self.warned = false;
        let expected = if expected.is_untyped() {
            expected.clone()
        } else {
            self.spec.normalise_sorts(expected)
        };

        let result = self.check(expression, &expected, context)?;
        trace!("Type checked {expression} as {result}: {}", result.sort());
        Ok(result)
    }

    /// Converts a sort of the syntax tree, checks that the sorts it refers to
    /// are declared and returns its normal form.
    pub fn typecheck_sort(&self, sort: &syntax::SortExpression) -> Result<SortExpression, Mcrl2Error> {
        let result = sort_from_syntax(sort)?;
        self.spec.sort_specification().check_declared(&result)?;
        Ok(self.spec.normalise_sorts(&result))
    }

    /// Converts variable declarations, checking their sorts.
    pub fn typecheck_variables(&self, declarations: &[syntax::VarDecl]) -> Result<Vec<DataVariable>, Mcrl2Error> {
        let mut result: Vec<DataVariable> = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            if result.iter().any(|variable| variable.name() == declaration.identifier) {
                return Err(Mcrl2Error::ScopeError(format!(
                    "the variable {} is declared more than once",
                    declaration.identifier
                )));
            }
            result.push(DataVariable::new(&declaration.identifier, self.typecheck_sort(&declaration.sort)?));
        }
        Ok(result)
    }

    fn check(
        &mut self,
        expression: &syntax::DataExpr,
        expected: &SortExpression,
        context: &VariableContext,
    ) -> Result<DataExpression, Mcrl2Error> {
        use syntax::DataExpr;

        match expression {
            DataExpr::Id(name) => self.check_identifier(name, expected, context, expression),
            DataExpr::Number(digits) => {
                let sort = number_sort(digits);
                let literal = number(digits, &sort)
                    .ok_or_else(|| Mcrl2Error::TypeMismatch(format!("{digits} is not a number")))?;
                self.fit(literal, expected, true, expression)
            }
            DataExpr::Bool(value) => {
                let literal = if *value { true_() } else { false_() };
                self.fit(literal, expected, true, expression)
            }
            DataExpr::Application { function, arguments } => {
                let arguments: Vec<&DataExpr> = arguments.iter().collect();
                match function.as_ref() {
                    DataExpr::Id(name) if context.get(name).is_none() => {
                        self.check_overloaded(name, &arguments, expected, context, expression)
                    }
                    _ => self.check_application(function, &arguments, expected, context, expression),
                }
            }
            DataExpr::Unary { op, expr } => {
                let name = match op {
                    syntax::DataExprUnaryOp::Negation => "!",
                    syntax::DataExprUnaryOp::Minus => "-",
                    syntax::DataExprUnaryOp::Size => "#",
                };
                self.check_overloaded(name, &[expr.as_ref()], expected, context, expression)
            }
            DataExpr::Binary { op, lhs, rhs } => self.check_overloaded(
                binary_operator_name(*op),
                &[lhs.as_ref(), rhs.as_ref()],
                expected,
                context,
                expression,
            ),
            DataExpr::EmptyList => {
                let element = self.expected_element(expected, &[ContainerKind::List], expression)?;
                Ok(empty_list(&element))
            }
            DataExpr::List(elements) => {
                let elements: Vec<&DataExpr> = elements.iter().collect();
                self.check_enumeration(&elements, ContainerKind::List, expected, context, expression)
            }
            DataExpr::EmptySet => {
                let kind = self.expected_kind(expected, ContainerKind::Set);
                let element = self.expected_element(expected, &[ContainerKind::Set, ContainerKind::FSet], expression)?;
                Ok(if kind == ContainerKind::FSet {
                    empty_fset(&element)
                } else {
                    empty_set(&element)
                })
            }
            DataExpr::Set(elements) => {
                let kind = self.expected_kind(expected, ContainerKind::Set);
                let elements: Vec<&DataExpr> = elements.iter().collect();
                self.check_enumeration(&elements, kind, expected, context, expression)
            }
            DataExpr::EmptyBag => {
                let kind = self.expected_kind(expected, ContainerKind::Bag);
                let element = self.expected_element(expected, &[ContainerKind::Bag, ContainerKind::FBag], expression)?;
                Ok(if kind == ContainerKind::FBag {
                    empty_fbag(&element)
                } else {
                    empty_bag(&element)
                })
            }
            DataExpr::Bag(elements) => self.check_bag(elements, expected, context, expression),
            DataExpr::SetBagComp { variable, predicate } => {
                self.check_comprehension(variable, predicate, expected, context, expression)
            }
            DataExpr::Lambda { variables, body } => {
                let variables = self.typecheck_variables(variables)?;
                let inner = context.with(variables.iter());

                let domain: Vec<SortExpression> = variables.iter().map(|variable| variable.sort()).collect();
                let body_sort = if expected.is_function_sort() && expected.domain().iter().eq(domain.iter().cloned()) {
                    expected.codomain()
                } else {
                    SortExpression::untyped()
                };

                let body = self.check(body, &body_sort, &inner)?;
                let lambda: DataExpression = DataAbstraction::new(BinderKind::Lambda, variables, body).into();
                self.fit(lambda, expected, false, expression)
            }
            DataExpr::Quantifier { op, variables, body } => {
                let variables = self.typecheck_variables(variables)?;
                let inner = context.with(variables.iter());
                let body = self.check(body, &bool_sort(), &inner)?;

                let binder = match op {
                    syntax::Quantifier::Forall => BinderKind::Forall,
                    syntax::Quantifier::Exists => BinderKind::Exists,
                };
                let quantifier: DataExpression = DataAbstraction::new(binder, variables, body).into();
                self.fit(quantifier, expected, false, expression)
            }
            DataExpr::FunctionUpdate { expr, update } => {
                let function_sort = if expected.is_function_sort() {
                    expected.clone()
                } else {
                    SortExpression::untyped()
                };

                let function = self.check(expr, &function_sort, context)?;
                let sort = function.sort();
                if !sort.is_function_sort() || sort.domain().len() != 1 {
                    return Err(Mcrl2Error::TypeMismatch(format!(
                        "{expr} of sort {sort} cannot be updated, as it is not a unary function"
                    )));
                }

                let domain: Vec<SortExpression> = sort.domain().iter().collect();
                let argument = self.check(&update.expr, &domain[0], context)?;
                let value = self.check(&update.update, &sort.codomain(), context)?;
                self.fit(function_update(&function, &argument, &value), expected, false, expression)
            }
            DataExpr::Whr { expr, assignments } => {
                let mut typed = Vec::with_capacity(assignments.len());
                for assignment in assignments {
                    if typed
                        .iter()
                        .any(|existing: &DataAssignment| existing.lhs().name() == assignment.identifier)
                    {
                        return Err(Mcrl2Error::ScopeError(format!(
                            "the variable {} is assigned more than once in {expression}",
                            assignment.identifier
                        )));
                    }

                    let value = self.check(&assignment.expr, &SortExpression::untyped(), context)?;
                    let variable = DataVariable::new(&assignment.identifier, value.sort());
                    typed.push(DataAssignment::new(variable, value));
                }

                let variables: Vec<DataVariable> = typed.iter().map(|assignment| assignment.lhs()).collect();
                let inner = context.with(variables.iter());
                let body = self.check(expr, expected, &inner)?;
                Ok(DataWhereClause::new(body, typed).into())
            }
        }
    }

    /// Resolves an identifier that is not applied to arguments. Variables take
    /// priority over constants, and constants over function symbols.
    fn check_identifier(
        &mut self,
        name: &str,
        expected: &SortExpression,
        context: &VariableContext,
        origin: &syntax::DataExpr,
    ) -> Result<DataExpression, Mcrl2Error> {
        if let Some(sort) = context.get(name) {
            let variable: DataExpression = DataVariable::new(name, sort.clone()).into();
            return self.fit(variable, expected, false, origin);
        }

        if !self.signatures.contains(name) {
            return Err(Mcrl2Error::ScopeError(format!("the identifier {name} is not declared")));
        }

        // Constants of the user, constants of the system, then functions of
        // the user and the system.
        let mut groups: [Vec<Candidate>; 4] = Default::default();
        for (symbol_origin, symbol) in self.signatures.symbols(name) {
            let sort = symbol.sort();
            let mut bindings = FxHashMap::default();
            let (symbol, cost) = if has_placeholder(&sort) {
                if expected.is_untyped() || !bind_exact(&sort, expected, &mut bindings) {
                    continue;
                }
                (DataFunctionSymbol::new(name, instantiate(&sort, &bindings)), 0)
            } else if expected.is_untyped() {
                (symbol.clone(), 0)
            } else {
                match conversion_cost(&sort, expected) {
                    Some(cost) => (symbol.clone(), cost),
                    None => continue,
                }
            };

            let group = match (sort.is_function_sort(), symbol_origin) {
                (false, Origin::User) => 0,
                (false, Origin::System) => 1,
                (true, Origin::User) => 2,
                (true, Origin::System) => 3,
            };
            groups[group].push(Candidate {
                cost,
                origin: *symbol_origin,
                symbol,
            });
        }

        let Some(candidates) = groups.into_iter().find(|group| !group.is_empty()) else {
            return Err(Mcrl2Error::TypeMismatch(format!(
                "the identifier {name} has no declaration of sort {expected}"
            )));
        };

        let symbol = self.select(candidates, expected, origin)?;
        self.fit(symbol.into(), expected, false, origin)
    }

    /// Type checks the application of an overloaded function symbol.
    ///
    /// The arguments are first checked without an expected sort, which
    /// determines the candidate signatures and the sorts of the placeholders
    /// in them. The arguments are then checked again against the domain of
    /// the chosen signature, inserting conversions where needed.
    fn check_overloaded(
        &mut self,
        name: &str,
        arguments: &[&syntax::DataExpr],
        expected: &SortExpression,
        context: &VariableContext,
        origin: &syntax::DataExpr,
    ) -> Result<DataExpression, Mcrl2Error> {
        let candidates = self.signatures.functions(name, arguments.len());
        if candidates.is_empty() {
            return if self.signatures.contains(name) {
                Err(Mcrl2Error::TypeMismatch(format!(
                    "{name} cannot be applied to {} arguments in {origin}",
                    arguments.len()
                )))
            } else {
                Err(Mcrl2Error::ScopeError(format!("the function {name} is not declared")))
            };
        }

        // The first pass, failures are resolved by the expected sorts of the second pass.
        let quiet = std::mem::replace(&mut self.quiet, true);
        let tentative: Vec<Option<DataExpression>> = arguments
            .iter()
            .map(|argument| self.check(argument, &SortExpression::untyped(), context).ok())
            .collect();
        self.quiet = quiet;

        let mut viable = Vec::new();
        'candidates: for (symbol_origin, symbol) in candidates {
            let sort = symbol.sort();
            let domain: Vec<SortExpression> = sort.domain().iter().collect();

            let mut matcher = SortMatcher::default();
            for (pattern, argument) in domain.iter().zip(tentative.iter()) {
                if let Some(argument) = argument {
                    if !matcher.argument(pattern, &argument.sort()) {
                        continue 'candidates;
                    }
                }
            }

            let Some((mut bindings, mut cost)) = matcher.resolve() else {
                continue;
            };

            let codomain = instantiate(&sort.codomain(), &bindings);
            if !expected.is_untyped() {
                if has_placeholder(&codomain) {
                    if !bind_exact(&codomain, expected, &mut bindings) {
                        continue;
                    }
                } else {
                    match conversion_cost(&codomain, expected) {
                        Some(extra) => cost += extra,
                        None => continue,
                    }
                }
            }

            let instantiated = instantiate(&sort, &bindings);
            if has_placeholder(&instantiated) {
                if !self.quiet {
                    return Err(Mcrl2Error::Ambiguous(format!("the sort of {origin} cannot be determined")));
                }
                continue;
            }

            viable.push(Candidate {
                cost,
                origin: symbol_origin,
                symbol: DataFunctionSymbol::new(name, instantiated),
            });
        }

        if viable.is_empty() {
            let sorts: Vec<String> = tentative
                .iter()
                .map(|argument| argument.as_ref().map_or("?".to_string(), |argument| argument.sort().to_string()))
                .collect();
            return Err(Mcrl2Error::TypeMismatch(format!(
                "no declaration of {name} matches the argument sorts ({}) in {origin}",
                sorts.join(", ")
            )));
        }

        let symbol = self.select(viable, expected, origin)?;
        let domain: Vec<SortExpression> = symbol.sort().domain().iter().collect();

        // The second pass against the domain of the chosen signature.
        let mut typed = Vec::with_capacity(arguments.len());
        for ((argument, first), sort) in arguments.iter().zip(tentative).zip(domain.iter()) {
            let result = match first {
                Some(first) if first.sort() == *sort => first,
                Some(first) if numeric_conversion(&first.sort(), sort) => {
                    self.fit(first, sort, is_literal(argument), argument)?
                }
                _ => self.check(argument, sort, context)?,
            };
            typed.push(result);
        }

        let application = DataExpression::application(&symbol.into(), &typed);
        self.fit(application, expected, false, origin)
    }

    /// Type checks an application whose head is not an overloaded identifier.
    fn check_application(
        &mut self,
        function: &syntax::DataExpr,
        arguments: &[&syntax::DataExpr],
        expected: &SortExpression,
        context: &VariableContext,
        origin: &syntax::DataExpr,
    ) -> Result<DataExpression, Mcrl2Error> {
        let head = self.check(function, &SortExpression::untyped(), context)?;
        let sort = head.sort();
        if !sort.is_function_sort() || sort.domain().len() != arguments.len() {
            return Err(Mcrl2Error::TypeMismatch(format!(
                "{function} of sort {sort} cannot be applied to {} arguments",
                arguments.len()
            )));
        }

        let mut typed = Vec::with_capacity(arguments.len());
        for (argument, domain) in arguments.iter().zip(sort.domain().iter()) {
            typed.push(self.check(argument, &domain, context)?);
        }

        self.fit(DataExpression::application(&head, &typed), expected, false, origin)
    }

    /// Type checks a list or set enumeration.
    fn check_enumeration(
        &mut self,
        elements: &[&syntax::DataExpr],
        kind: ContainerKind,
        expected: &SortExpression,
        context: &VariableContext,
        origin: &syntax::DataExpr,
    ) -> Result<DataExpression, Mcrl2Error> {
        let element_sort = if expected.is_untyped() {
            self.join_elements(elements, context, origin)?
        } else {
            self.expected_element(expected, &[kind], origin)?
        };

        let mut typed = Vec::with_capacity(elements.len());
        for element in elements {
            typed.push(self.check(element, &element_sort, context)?);
        }

        Ok(match kind {
            ContainerKind::List => list_enumeration(&element_sort, &typed),
            ContainerKind::FSet => fset_enumeration(&element_sort, &typed),
            _ => set_enumeration(&element_sort, &typed),
        })
    }

    /// Type checks a bag enumeration `{d1: n1, ..., dk: nk}`.
    fn check_bag(
        &mut self,
        elements: &[syntax::BagElement],
        expected: &SortExpression,
        context: &VariableContext,
        origin: &syntax::DataExpr,
    ) -> Result<DataExpression, Mcrl2Error> {
        let kind = self.expected_kind(expected, ContainerKind::Bag);
        let element_sort = if expected.is_untyped() {
            let expressions: Vec<&syntax::DataExpr> = elements.iter().map(|element| &element.expr).collect();
            self.join_elements(&expressions, context, origin)?
        } else {
            self.expected_element(expected, &[ContainerKind::Bag, ContainerKind::FBag], origin)?
        };

        let mut typed = Vec::with_capacity(elements.len());
        for element in elements {
            let value = self.check(&element.expr, &element_sort, context)?;
            let multiplicity = self.check(&element.multiplicity, &nat_sort(), context)?;
            typed.push((value, multiplicity));
        }

        Ok(if kind == ContainerKind::FBag {
            fbag_enumeration(&element_sort, &typed)
        } else {
            bag_enumeration(&element_sort, &typed)
        })
    }

    /// Type checks `{ x: S | body }`, which is a set when the body is a
    /// boolean and a bag when it is a number.
    fn check_comprehension(
        &mut self,
        variable: &syntax::VarDecl,
        predicate: &syntax::DataExpr,
        expected: &SortExpression,
        context: &VariableContext,
        origin: &syntax::DataExpr,
    ) -> Result<DataExpression, Mcrl2Error> {
        let variable = DataVariable::new(&variable.identifier, self.typecheck_sort(&variable.sort)?);
        let inner = context.with([&variable]);

        let body_sort = if expected.is_container(ContainerKind::Set) {
            bool_sort()
        } else if expected.is_container(ContainerKind::Bag) {
            nat_sort()
        } else {
            SortExpression::untyped()
        };

        let mut body = self.check(predicate, &body_sort, &inner)?;
        if body.sort() == pos_sort() {
            body = self.fit(body, &nat_sort(), false, predicate)?;
        }

        let lambda: DataExpression = DataAbstraction::new(BinderKind::Lambda, vec![variable], body.clone()).into();
        let result = if body.sort() == bool_sort() {
            set_comprehension(&lambda)
        } else if body.sort() == nat_sort() {
            bag_comprehension(&lambda)
        } else {
            return Err(Mcrl2Error::TypeMismatch(format!(
                "the body of the comprehension {origin} has sort {}, but Bool or Nat is expected",
                body.sort()
            )));
        };

        self.fit(result, expected, false, origin)
    }

    /// Returns the join of the sorts of the elements of an enumeration.
    fn join_elements(
        &mut self,
        elements: &[&syntax::DataExpr],
        context: &VariableContext,
        origin: &syntax::DataExpr,
    ) -> Result<SortExpression, Mcrl2Error> {
        let mut result: Option<SortExpression> = None;
        for element in elements {
            let sort = self.check(element, &SortExpression::untyped(), context)?.sort();
            result = Some(match result {
                None => sort,
                Some(current) => join(&current, &sort).ok_or_else(|| {
                    Mcrl2Error::TypeMismatch(format!(
                        "the elements of {origin} have the incompatible sorts {current} and {sort}"
                    ))
                })?,
            });
        }

        result.ok_or_else(|| Mcrl2Error::Ambiguous(format!("the sort of {origin} cannot be determined")))
    }

    /// The kind of container that is expected, or the default kind.
    fn expected_kind(&self, expected: &SortExpression, default: ContainerKind) -> ContainerKind {
        if expected.is_container_sort() {
            expected.container_kind()
        } else {
            default
        }
    }

    /// Returns the element sort of the expected container sort.
    fn expected_element(
        &self,
        expected: &SortExpression,
        kinds: &[ContainerKind],
        origin: &syntax::DataExpr,
    ) -> Result<SortExpression, Mcrl2Error> {
        if expected.is_untyped() {
            return Err(Mcrl2Error::Ambiguous(format!("the sort of {origin} cannot be determined")));
        }

        if expected.is_container_sort() && kinds.contains(&expected.container_kind()) {
            Ok(expected.element_sort())
        } else {
            Err(Mcrl2Error::TypeMismatch(format!(
                "{origin} is a {}, but sort {expected} is expected",
                kinds[0].name()
            )))
        }
    }

    /// Selects the best candidate: the one needing the fewest conversions,
    /// preferring user declarations, and finally the one whose sort is
    /// printed first.
    fn select(
        &self,
        mut candidates: Vec<Candidate>,
        expected: &SortExpression,
        origin: &syntax::DataExpr,
    ) -> Result<DataFunctionSymbol, Mcrl2Error> {
        candidates.sort_by_cached_key(|candidate| candidate.key());

        if candidates.len() > 1 {
            let (first, second) = (&candidates[0], &candidates[1]);
            let tied = first.cost == second.cost && first.origin == second.origin;
            if tied && (self.options.strictly_ambiguous || (expected.is_untyped() && !self.quiet && first.cost > 0)) {
                return Err(Mcrl2Error::Ambiguous(format!(
                    "{origin} can have sort {} and {}",
                    first.symbol.sort(),
                    second.symbol.sort()
                )));
            }
        }

        Ok(candidates.swap_remove(0).symbol)
    }

    /// Converts the expression to the expected sort, or fails when that is
    /// not possible. A warning is given for the first conversion of every
    /// expression, unless a literal is converted.
    fn fit(
        &mut self,
        expression: DataExpression,
        expected: &SortExpression,
        literal: bool,
        origin: &syntax::DataExpr,
    ) -> Result<DataExpression, Mcrl2Error> {
        if expected.is_untyped() {
            return Ok(expression);
        }

        let sort = expression.sort();
        if sort == *expected {
            return Ok(expression);
        }

        match convert(&expression, expected) {
            Some(converted) => {
                if !literal && !self.warned && !self.quiet {
                    warn!("Implicit conversion of {origin} from sort {sort} to {expected}");
                    self.warned = true;
                }
                Ok(converted)
            }
            None => Err(Mcrl2Error::TypeMismatch(format!(
                "{origin} has sort {sort}, but sort {expected} is expected"
            ))),
        }
    }
}

/// Returns true iff a value of the first sort is converted to the second by
/// one of the conversion functions of the numeric sorts.
fn numeric_conversion(from: &SortExpression, to: &SortExpression) -> bool {
    [pos_sort(), nat_sort(), int_sort(), real_sort()].contains(from) && conversion_cost(from, to).is_some()
}

fn is_literal(expression: &syntax::DataExpr) -> bool {
    matches!(expression, syntax::DataExpr::Number(_) | syntax::DataExpr::Bool(_))
}

/// The name of the system function for a binary operator.
fn binary_operator_name(op: syntax::DataExprBinaryOp) -> &'static str {
    use syntax::DataExprBinaryOp::*;

    match op {
        Conj => "&&",
        Disj => "||",
        Implies => "=>",
        Equal => "==",
        NotEqual => "!=",
        LessThan => "<",
        LessEqual => "<=",
        GreaterThan => ">",
        GreaterEqual => ">=",
        Cons => "|>",
        Snoc => "<|",
        In => "in",
        Concat => "++",
        Add => "+",
        Subtract => "-",
        Div => "/",
        IntDiv => "div",
        Mod => "mod",
        Multiply => "*",
        At => ".",
    }
}

/// Converts a sort of the syntax tree without checking it.
pub fn sort_from_syntax(sort: &syntax::SortExpression) -> Result<SortExpression, Mcrl2Error> {
    use syntax::SortExpression as Syntax;

    Ok(match sort {
        Syntax::Simple(simple) => SortExpression::basic(&simple.to_string()),
        Syntax::Reference(name) => SortExpression::basic(name),
        Syntax::Complex(kind, element) => {
            let kind = match kind {
                syntax::ComplexSort::List => ContainerKind::List,
                syntax::ComplexSort::Set => ContainerKind::Set,
                syntax::ComplexSort::FSet => ContainerKind::FSet,
                syntax::ComplexSort::Bag => ContainerKind::Bag,
                syntax::ComplexSort::FBag => ContainerKind::FBag,
            };
            SortExpression::container(kind, sort_from_syntax(element)?)
        }
        Syntax::Function { domain, codomain } => {
            let mut sorts = Vec::new();
            for element in domain {
                match element {
                    Syntax::Product(product) => {
                        for sort in product {
                            sorts.push(sort_from_syntax(sort)?);
                        }
                    }
                    _ => sorts.push(sort_from_syntax(element)?),
                }
            }
            SortExpression::function(sorts, sort_from_syntax(codomain)?)
        }
        Syntax::Struct { inner } => {
            let mut constructors = Vec::with_capacity(inner.len());
            for constructor in inner {
                let mut arguments = Vec::with_capacity(constructor.args.len());
                for (name, sort) in &constructor.args {
                    arguments.push(StructuredSortArgument::new(name.as_deref(), sort_from_syntax(sort)?));
                }

                if constructors
                    .iter()
                    .any(|existing: &StructuredSortConstructor| existing.name() == constructor.name)
                {
                    return Err(Mcrl2Error::SortDecl(format!(
                        "the constructor {} occurs twice in {sort}",
                        constructor.name
                    )));
                }
                constructors.push(StructuredSortConstructor::new(
                    &constructor.name,
                    arguments,
                    constructor.recogniser.as_deref(),
                ));
            }
            SortExpression::structured(constructors)
        }
        Syntax::Product(_) => {
            return Err(Mcrl2Error::SortDecl(format!(
                "the product sort {sort} can only be used as a domain"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use mcrl2_syntax::parse_data_expression;
    use test_case::test_case;
    use test_log::test;

    use super::*;
    use crate::typecheck::typecheck_data_specification;

    fn typecheck_expression(spec: &DataSpecification, text: &str, expected: &SortExpression) -> Result<DataExpression, Mcrl2Error> {
        let mut checker = DataTypeChecker::new(spec, TypeCheckOptions::default());
        let expression = parse_data_expression(text).unwrap();
        checker.typecheck(&expression, expected, &VariableContext::new())
    }

    #[test_case("1 + 2", "Pos" ; "positive addition")]
    #[test_case("0", "Nat" ; "zero")]
    #[test_case("-1", "Int" ; "negation")]
    #[test_case("3 / 2", "Real" ; "division")]
    #[test_case("1 == 0", "Bool" ; "equality joins sorts")]
    #[test_case("#[true, false]", "Nat" ; "list size")]
    #[test_case("head([1, 2]) + 0", "Pos" ; "list head")]
    #[test_case("{ x: Nat | x < 3 }", "Set(Nat)" ; "set comprehension")]
    #[test_case("{ x: Nat | 1 }", "Bag(Nat)" ; "bag comprehension")]
    #[test_case("lambda x: Nat. x + 1", "Nat -> Pos" ; "lambda")]
    #[test_case("x + 1 whr x = 2 end", "Pos" ; "where clause")]
    #[test_case("forall b: Bool. b || !b", "Bool" ; "quantifier")]
    #[test_case("if(true, 1, -1)", "Int" ; "if joins branches")]
    #[test_case("[] ++ [1]", "List(Pos)" ; "empty list from context")]
    fn test_untyped_expressions(text: &str, sort: &str) {
        let spec = DataSpecification::new();
        let result = typecheck_expression(&spec, text, &SortExpression::untyped()).unwrap();
        assert_eq!(result.sort().to_string(), sort, "{text} is typed as {result}");
    }

    #[test]
    fn test_upcast_argument() {
        let spec = DataSpecification::new();
        let result = typecheck_expression(&spec, "1", &int_sort()).unwrap();
        assert_eq!(result.sort(), int_sort());
        assert!(result.is_application_of("Pos2Int", 1));

        let mut checker = DataTypeChecker::new(&spec, TypeCheckOptions::default());
        let mut context = VariableContext::new();
        context.insert(&DataVariable::new("n", nat_sort()));
        let result = checker
            .typecheck(&parse_data_expression("n").unwrap(), &real_sort(), &context)
            .unwrap();
        assert!(result.is_application_of("Nat2Real", 1));
    }

    #[test]
    fn test_no_downcast() {
        let spec = DataSpecification::new();
        let error = typecheck_expression(&spec, "-1", &nat_sort()).unwrap_err();
        assert!(matches!(error, Mcrl2Error::TypeMismatch(_)), "{error}");

        let error = typecheck_expression(&spec, "0", &pos_sort()).unwrap_err();
        assert!(matches!(error, Mcrl2Error::TypeMismatch(_)), "{error}");
    }

    #[test]
    fn test_ambiguous_empty_list() {
        let spec = DataSpecification::new();
        let error = typecheck_expression(&spec, "[] == []", &SortExpression::untyped()).unwrap_err();
        assert!(matches!(error, Mcrl2Error::Ambiguous(_)), "{error}");
    }

    #[test]
    fn test_undeclared_identifier() {
        let spec = DataSpecification::new();
        let error = typecheck_expression(&spec, "f(1)", &SortExpression::untyped()).unwrap_err();
        assert!(matches!(error, Mcrl2Error::ScopeError(_)), "{error}");
    }

    #[test]
    fn test_user_overloads() {
        let spec = typecheck_data_specification(
            &mcrl2_syntax::parse_specification(indoc! {"
                sort S = struct c(i: Int, b: Bool) | d;
                map f: Nat -> Bool;
                    f: Int -> Bool;
                    g: S -> Int;
                    h: Nat -> Bool;
                    h: Nat -> Int;
            "})
            .unwrap()
            .data_specification,
            &TypeCheckOptions::default(),
        )
        .unwrap();

        // The declaration with the smallest conversion is preferred.
        let result = typecheck_expression(&spec, "f(1)", &bool_sort()).unwrap();
        assert_eq!(result.head().sort().to_string(), "Nat -> Bool");

        let result = typecheck_expression(&spec, "g(c(0, true)) + i(d)", &SortExpression::untyped()).unwrap();
        assert_eq!(result.sort(), int_sort());

        let mut checker = DataTypeChecker::new(
            &spec,
            TypeCheckOptions {
                strictly_ambiguous: true,
            },
        );
        let error = checker
            .typecheck(&parse_data_expression("h(0)").unwrap(), &SortExpression::untyped(), &VariableContext::new())
            .unwrap_err();
        assert!(matches!(error, Mcrl2Error::Ambiguous(_)), "{error}");

        let result = typecheck_expression(&spec, "h(0)", &SortExpression::untyped()).unwrap();
        assert_eq!(result.sort(), bool_sort());
    }
}
