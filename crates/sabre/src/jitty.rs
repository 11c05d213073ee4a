//! The just-in-time rewriter.
//!
//! For every function symbol the equations are combined into a strategy that
//! determines the order in which the arguments are rewritten and the rules are
//! tried. An argument is only rewritten when the next rule inspects it, which
//! for example makes `if(c, x, y)` evaluate only one of its branches.

use std::fmt;

use itertools::Itertools;
use log::trace;
use rustc_hash::FxHashMap;

use mcrl2::aterm::TermPool;
use mcrl2::data::standard::is_false;
use mcrl2::data::standard::is_true;
use mcrl2::data::substitute;
use mcrl2::data::BinderKind;
use mcrl2::data::DataAbstraction;
use mcrl2::data::DataExpression;
use mcrl2::data::DataFunctionSymbol;
use mcrl2::data::DataSpecification;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::data::DataWhereClause;
use mcrl2::data::SortExpression;

use crate::utilities::match_term;
use crate::RewriteEngine;
use crate::RewriteSpecification;
use crate::RewritingStatistics;
use crate::Rule;

/// The maximum number of instantiations tried when eliminating a quantifier.
const MAX_QUANTIFIER_INSTANCES: usize = 1000;

/// A step of the rewrite strategy of a function symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StrategyStep {
    /// Rewrite the argument with the given index to normal form.
    Rewrite(usize),
    /// Try the rule with the given index.
    Try(usize),
}

impl fmt::Display for StrategyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyStep::Rewrite(index) => write!(f, "Rewrite({index})"),
            StrategyStep::Try(index) => write!(f, "Try({index})"),
        }
    }
}

/// Returns the indices of the arguments that must be in normal form before
/// the rule can be tried. These are the non-variable arguments and the
/// arguments that are variables occurring more than once.
fn needed_arguments(rule: &Rule) -> Vec<usize> {
    if !rule.lhs.is_application() {
        return Vec::new();
    }

    let arguments: Vec<DataExpression> = rule.lhs.arguments().map(|argument| argument.protect().into()).collect();
    let mut result = Vec::new();
    for (index, argument) in arguments.iter().enumerate() {
        let non_linear = argument.is_variable()
            && arguments
                .iter()
                .enumerate()
                .any(|(other, expression)| other != index && mcrl2::data::occurs_free(&argument.clone().into(), expression));

        if !argument.is_variable() || non_linear {
            result.push(index);
        }
    }
    result
}

/// Computes the strategy for a function symbol with the given arity and
/// rules, that are given together with their index.
pub(crate) fn jitty_strategy(arity: usize, rules: &[(usize, &Rule)]) -> Vec<StrategyStep> {
    let mut rewritten = vec![false; arity];
    let mut result = Vec::new();

    for (index, rule) in rules {
        for argument in needed_arguments(rule) {
            if !rewritten[argument] {
                rewritten[argument] = true;
                result.push(StrategyStep::Rewrite(argument));
            }
        }
        result.push(StrategyStep::Try(*index));
    }

    for (argument, done) in rewritten.iter().enumerate() {
        if !done {
            result.push(StrategyStep::Rewrite(argument));
        }
    }
    result
}

/// The rules of a rewrite specification organised per function symbol.
pub(crate) struct RuleTable {
    pub rules: Vec<Rule>,

    /// The strategies for the function symbols applied to a number of arguments.
    strategies: FxHashMap<(DataFunctionSymbol, usize), Vec<StrategyStep>>,

    /// Rules whose left-hand side has an application as head, such as
    /// `@not_(f)(d)`, indexed by their innermost head symbol.
    higher_order: FxHashMap<DataFunctionSymbol, Vec<usize>>,

    spec: DataSpecification,
}

impl RuleTable {
    pub fn new(spec: &DataSpecification, rewrite_spec: &RewriteSpecification) -> RuleTable {
        let mut first_order: FxHashMap<(DataFunctionSymbol, usize), Vec<(usize, &Rule)>> = FxHashMap::default();
        let mut higher_order: FxHashMap<DataFunctionSymbol, Vec<usize>> = FxHashMap::default();

        for (index, rule) in rewrite_spec.rewrite_rules.iter().enumerate() {
            let Some(symbol) = rule.head_symbol() else {
                continue;
            };

            if rule.is_first_order() {
                first_order.entry((symbol, rule.lhs.arity())).or_default().push((index, rule));
            } else {
                higher_order.entry(symbol).or_default().push(index);
            }
        }

        let strategies: FxHashMap<(DataFunctionSymbol, usize), Vec<StrategyStep>> = first_order
            .into_iter()
            .map(|(key, rules)| {
                let strategy = jitty_strategy(key.1, &rules);
                trace!("Strategy for {}: {}", key.0, strategy.iter().format(", "));
                (key, strategy)
            })
            .collect();

        RuleTable {
            rules: rewrite_spec.rewrite_rules.clone(),
            strategies,
            higher_order,
            spec: spec.clone(),
        }
    }

    pub fn data_specification(&self) -> &DataSpecification {
        &self.spec
    }
}

/// The mutable state of a rewriter.
#[derive(Default)]
pub(crate) struct RewriteState {
    pub tp: TermPool,
    pub statistics: RewritingStatistics,
}

/// The way rules are matched and instantiated, which is what distinguishes
/// the interpreting and the compiling rewriter.
pub(crate) trait RuleApplication {
    /// Tries the rule with the given index on the term, of which the
    /// arguments needed by the rule are in normal form. Returns the normal
    /// form of the instantiated right-hand side when the rule applies.
    fn apply_rule(
        &self,
        table: &RuleTable,
        state: &mut RewriteState,
        index: usize,
        term: &DataExpression,
    ) -> Option<DataExpression>;
}

/// Rewrites the term, after applying the substitution, to normal form. The
/// values of the substitution can be arbitrary terms, such as the subterms
/// bound by matching a left-hand side.
pub(crate) fn rewrite_term(
    rules: &impl RuleApplication,
    table: &RuleTable,
    state: &mut RewriteState,
    term: &DataExpression,
    sigma: &DataSubstitution,
) -> DataExpression {
    if term.is_variable() {
        let variable: DataVariable = term.clone().into();
        return match sigma.get(&variable) {
            Some(value) => rewrite_term(rules, table, state, value, &DataSubstitution::default()),
            None => term.clone(),
        };
    }

    if term.is_function_symbol() {
        let symbol: DataFunctionSymbol = term.clone().into();
        return rewrite_application(rules, table, state, &symbol, Vec::new());
    }

    if term.is_application() {
        let head = term.head();
        let arguments: Vec<(DataExpression, bool)> = term
            .arguments()
            .map(|argument| (substitute(&argument.protect().into(), sigma), false))
            .collect();

        if head.is_function_symbol() {
            return rewrite_application(rules, table, state, &head.into(), arguments);
        }

        let head = rewrite_term(rules, table, state, &head, sigma);
        return rewrite_higher_order(rules, table, state, head, arguments);
    }

    if term.is_where_clause() {
        let where_clause = DataWhereClause::from(term.clone());
        let mut inner = sigma.clone();
        for assignment in where_clause.assignments().iter() {
            let value = rewrite_term(rules, table, state, &assignment.rhs(), sigma);
            inner.insert(assignment.lhs(), value);
        }
        return rewrite_term(rules, table, state, &where_clause.body(), &inner);
    }

    if term.is_abstraction() {
        return rewrite_abstraction(rules, table, state, &DataAbstraction::from(term.clone()), sigma);
    }

    substitute(term, sigma)
}

/// Rewrites `symbol(arguments)` following the strategy of the symbol, where
/// the flag of an argument indicates that it is in normal form.
fn rewrite_application(
    rules: &impl RuleApplication,
    table: &RuleTable,
    state: &mut RewriteState,
    symbol: &DataFunctionSymbol,
    mut arguments: Vec<(DataExpression, bool)>,
) -> DataExpression {
    let head: DataExpression = symbol.clone().into();
    let no_substitution = DataSubstitution::default();

    if let Some(strategy) = table.strategies.get(&(symbol.clone(), arguments.len())) {
        for step in strategy {
            match step {
                StrategyStep::Rewrite(index) => {
                    let (argument, normal) = &mut arguments[*index];
                    if !*normal {
                        *argument = rewrite_term(rules, table, state, argument, &no_substitution);
                        *normal = true;
                    }
                }
                StrategyStep::Try(index) => {
                    let current = build(&head, &arguments);
                    state.statistics.symbol_comparisons += 1;
                    if let Some(result) = rules.apply_rule(table, state, *index, &current) {
                        return result;
                    }
                }
            }
        }
    }

    for (argument, normal) in arguments.iter_mut() {
        if !*normal {
            *argument = rewrite_term(rules, table, state, argument, &no_substitution);
            *normal = true;
        }
    }

    let result = build(&head, &arguments);
    apply_higher_order(rules, table, state, result)
}

/// Rewrites an application whose head, which is already in normal form, is
/// not a function symbol.
fn rewrite_higher_order(
    rules: &impl RuleApplication,
    table: &RuleTable,
    state: &mut RewriteState,
    head: DataExpression,
    arguments: Vec<(DataExpression, bool)>,
) -> DataExpression {
    if head.is_function_symbol() {
        return rewrite_application(rules, table, state, &head.into(), arguments);
    }

    let no_substitution = DataSubstitution::default();
    let arguments: Vec<DataExpression> = arguments
        .into_iter()
        .map(|(argument, normal)| {
            if normal {
                argument
            } else {
                rewrite_term(rules, table, state, &argument, &no_substitution)
            }
        })
        .collect();

    if head.is_abstraction() {
        // Beta reduction.
        let lambda = DataAbstraction::from(head.clone());
        let variables: Vec<DataVariable> = lambda.variables().iter().collect();
        if lambda.binder() == BinderKind::Lambda && variables.len() == arguments.len() {
            state.statistics.rewrite_steps += 1;
            let sigma: DataSubstitution = variables.into_iter().zip(arguments).collect();
            return rewrite_term(rules, table, state, &lambda.body(), &sigma);
        }
    }

    let result = DataExpression::application(&head, &arguments);
    apply_higher_order(rules, table, state, result)
}

/// Tries the rules whose left-hand side has an application as head on a
/// term in normal form.
fn apply_higher_order(
    rules: &impl RuleApplication,
    table: &RuleTable,
    state: &mut RewriteState,
    term: DataExpression,
) -> DataExpression {
    if !term.is_application() || table.higher_order.is_empty() {
        return term;
    }

    if let Some(candidates) = term.head_symbol().and_then(|symbol| table.higher_order.get(&symbol)) {
        for index in candidates {
            if let Some(result) = rules.apply_rule(table, state, *index, &term) {
                return result;
            }
        }
    }
    term
}

/// Rewrites the body of an abstraction, quantifiers over finite sorts are
/// eliminated by checking all instances of the body.
fn rewrite_abstraction(
    rules: &impl RuleApplication,
    table: &RuleTable,
    state: &mut RewriteState,
    abstraction: &DataAbstraction,
    sigma: &DataSubstitution,
) -> DataExpression {
    let variables: Vec<DataVariable> = abstraction.variables().iter().collect();
    let mut inner = sigma.clone();
    for variable in &variables {
        inner.remove(variable);
    }

    let body = rewrite_term(rules, table, state, &abstraction.body(), &inner);
    let binder = abstraction.binder();
    if !matches!(binder, BinderKind::Forall | BinderKind::Exists) {
        return DataAbstraction::new(binder, variables, body).into();
    }

    if is_true(&body) || is_false(&body) {
        return body;
    }

    // The quantifier can be decided when the body is decided for every instance.
    let domains: Option<Vec<Vec<DataExpression>>> = variables
        .iter()
        .map(|variable| finite_values(table.data_specification(), &variable.sort(), MAX_QUANTIFIER_INSTANCES))
        .collect();

    if let Some(domains) = domains {
        let instances = domains.iter().map(|values| values.len()).product::<usize>();
        if instances <= MAX_QUANTIFIER_INSTANCES {
            let mut undecided = false;
            for values in domains.iter().map(|values| values.iter()).multi_cartesian_product() {
                let sigma: DataSubstitution = variables.iter().cloned().zip(values.into_iter().cloned()).collect();
                let instance = rewrite_term(rules, table, state, &body, &sigma);

                if binder == BinderKind::Exists && is_true(&instance) {
                    return instance;
                } else if binder == BinderKind::Forall && is_false(&instance) {
                    return instance;
                } else if !is_true(&instance) && !is_false(&instance) {
                    undecided = true;
                }
            }

            if !undecided {
                return if binder == BinderKind::Exists {
                    mcrl2::data::standard::false_()
                } else {
                    mcrl2::data::standard::true_()
                };
            }
        }
    }

    DataAbstraction::new(binder, variables, body).into()
}

/// Returns all closed constructor terms of a finite sort, or None when the
/// sort is not certainly finite or has more than `limit` elements.
pub(crate) fn finite_values(spec: &DataSpecification, sort: &SortExpression, limit: usize) -> Option<Vec<DataExpression>> {
    if !spec.is_certainly_finite(sort) {
        return None;
    }

    let mut result = Vec::new();
    for constructor in spec.constructors_of(sort) {
        let constructor_sort = constructor.sort();
        if !constructor_sort.is_function_sort() {
            result.push(constructor.clone().into());
            continue;
        }

        let domains: Option<Vec<Vec<DataExpression>>> = constructor_sort
            .domain()
            .iter()
            .map(|domain| finite_values(spec, &domain, limit))
            .collect();

        for arguments in domains?.iter().map(|values| values.iter().cloned()).multi_cartesian_product() {
            result.push(DataExpression::application(&constructor.clone().into(), &arguments));
            if result.len() > limit {
                return None;
            }
        }
    }

    if result.len() > limit {
        None
    } else {
        Some(result)
    }
}

fn build(head: &DataExpression, arguments: &[(DataExpression, bool)]) -> DataExpression {
    let arguments: Vec<DataExpression> = arguments.iter().map(|(argument, _)| argument.clone()).collect();
    DataExpression::application(head, &arguments)
}

/// Applies rules by matching the left-hand side and interpreting the
/// right-hand side under the resulting substitution.
pub(crate) struct InterpretedRules;

impl RuleApplication for InterpretedRules {
    fn apply_rule(
        &self,
        table: &RuleTable,
        state: &mut RewriteState,
        index: usize,
        term: &DataExpression,
    ) -> Option<DataExpression> {
        let rule = &table.rules[index];

        let mut sigma = DataSubstitution::default();
        if !match_term(&rule.lhs, term, &mut sigma) {
            return None;
        }

        for condition in &rule.conditions {
            let lhs = rewrite_term(self, table, state, &condition.lhs, &sigma);
            let rhs = rewrite_term(self, table, state, &condition.rhs, &sigma);
            if (lhs == rhs) != condition.equality {
                return None;
            }
        }

        trace!("Applying {rule} to {term}");
        state.statistics.rewrite_steps += 1;
        Some(rewrite_term(self, table, state, &rule.rhs, &sigma))
    }
}

/// The just-in-time rewriter that interprets the rewrite rules.
pub struct JittyRewriter {
    table: RuleTable,
    state: RewriteState,
}

impl JittyRewriter {
    pub fn new(spec: &DataSpecification, rewrite_spec: &RewriteSpecification) -> JittyRewriter {
        JittyRewriter {
            table: RuleTable::new(spec, rewrite_spec),
            state: RewriteState::default(),
        }
    }
}

impl RewriteEngine for JittyRewriter {
    fn rewrite_with(&mut self, term: &DataExpression, sigma: &DataSubstitution) -> DataExpression {
        rewrite_term(&InterpretedRules, &self.table, &mut self.state, term, sigma)
    }

    fn data_specification(&self) -> &DataSpecification {
        self.table.data_specification()
    }

    fn statistics(&self) -> &RewritingStatistics {
        &self.state.statistics
    }
}

#[cfg(test)]
mod tests {
    use mcrl2::data::standard::and;
    use mcrl2::data::standard::bool_sort;
    use mcrl2::data::standard::false_;
    use mcrl2::data::standard::if_;
    use mcrl2::data::standard::true_;
    use test_log::test;

    use super::*;

    #[test]
    fn test_if_strategy() {
        let b = DataVariable::new("b", bool_sort());
        let x = DataVariable::new("x", bool_sort());
        let y = DataVariable::new("y", bool_sort());
        let (b, x, y): (DataExpression, DataExpression, DataExpression) = (b.into(), x.into(), y.into());

        let rules = [
            Rule {
                conditions: vec![],
                variables: vec![],
                lhs: if_(&true_(), &x, &y),
                rhs: x.clone(),
            },
            Rule {
                conditions: vec![],
                variables: vec![],
                lhs: if_(&b, &x, &x),
                rhs: x.clone(),
            },
        ];

        let strategy = jitty_strategy(3, &[(0, &rules[0]), (1, &rules[1])]);
        assert_eq!(
            strategy,
            vec![
                StrategyStep::Rewrite(0),
                StrategyStep::Try(0),
                StrategyStep::Rewrite(1),
                StrategyStep::Rewrite(2),
                StrategyStep::Try(1),
            ]
        );

        let rule = Rule {
            conditions: vec![],
            variables: vec![],
            lhs: and(&false_(), &b),
            rhs: false_(),
        };
        assert_eq!(needed_arguments(&rule), vec![0]);
    }
}
