use mcrl2rust_utilities::FreshNameGenerator;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::data::DataAbstraction;
use crate::data::DataAssignment;
use crate::data::DataEquation;
use crate::data::DataExpression;
use crate::data::DataFunctionSymbol;
use crate::data::DataVariable;
use crate::data::DataWhereClause;
use crate::data::SortExpression;
use crate::data::StructuredSortArgument;
use crate::data::StructuredSortConstructor;

/// A mapping from variables to the expressions that replace them.
pub type DataSubstitution = FxHashMap<DataVariable, DataExpression>;

/// Returns the free variables of the expression in the order of their first
/// occurrence.
pub fn free_variables(expression: &DataExpression) -> Vec<DataVariable> {
    let mut result = Vec::new();
    collect_free_variables(expression, &mut Vec::new(), &mut result);
    result
}

/// Adds the free variables of the expression that are not yet in the result.
pub fn collect_free_variables(expression: &DataExpression, bound: &mut Vec<DataVariable>, result: &mut Vec<DataVariable>) {
    if expression.is_variable() {
        let variable = DataVariable::from(expression.clone());
        if !bound.contains(&variable) && !result.contains(&variable) {
            result.push(variable);
        }
    } else if expression.is_application() {
        collect_free_variables(&expression.head(), bound, result);
        for argument in expression.arguments() {
            collect_free_variables(&argument.protect().into(), bound, result);
        }
    } else if expression.is_abstraction() {
        let abstraction = DataAbstraction::from(expression.clone());
        let size = bound.len();
        bound.extend(abstraction.variables().iter());
        collect_free_variables(&abstraction.body(), bound, result);
        bound.truncate(size);
    } else if expression.is_where_clause() {
        let where_clause = DataWhereClause::from(expression.clone());
        for assignment in where_clause.assignments().iter() {
            collect_free_variables(&assignment.rhs(), bound, result);
        }

        let size = bound.len();
        bound.extend(where_clause.assignments().iter().map(|assignment| assignment.lhs()));
        collect_free_variables(&where_clause.body(), bound, result);
        bound.truncate(size);
    }
}

/// Returns true iff the variable occurs free in the expression.
pub fn occurs_free(variable: &DataVariable, expression: &DataExpression) -> bool {
    free_variables(expression).contains(variable)
}

/// Applies the substitution to the free variables of the expression. Bound
/// variables that would capture a variable of a substituted expression are
/// renamed.
pub fn substitute(expression: &DataExpression, sigma: &DataSubstitution) -> DataExpression {
    if sigma.is_empty() {
        return expression.clone();
    }

    if expression.is_variable() {
        let variable = DataVariable::from(expression.clone());
        sigma.get(&variable).cloned().unwrap_or_else(|| expression.clone())
    } else if expression.is_application() {
        let head = substitute(&expression.head(), sigma);
        let arguments: Vec<DataExpression> = expression
            .arguments()
            .map(|argument| substitute(&argument.protect().into(), sigma))
            .collect();
        DataExpression::application(&head, &arguments)
    } else if expression.is_abstraction() {
        let abstraction = DataAbstraction::from(expression.clone());
        let variables: Vec<DataVariable> = abstraction.variables().iter().collect();
        let (variables, inner) = rename_bound(&variables, &abstraction.body(), sigma);

        DataAbstraction::new(abstraction.binder(), variables, substitute(&abstraction.body(), &inner)).into()
    } else if expression.is_where_clause() {
        let where_clause = DataWhereClause::from(expression.clone());
        let assignments: Vec<DataAssignment> = where_clause.assignments().iter().collect();
        let variables: Vec<DataVariable> = assignments.iter().map(|assignment| assignment.lhs()).collect();
        let (variables, inner) = rename_bound(&variables, &where_clause.body(), sigma);

        let assignments = variables
            .into_iter()
            .zip(assignments.iter())
            .map(|(variable, assignment)| DataAssignment::new(variable, substitute(&assignment.rhs(), sigma)))
            .collect();
        DataWhereClause::new(substitute(&where_clause.body(), &inner), assignments).into()
    } else {
        expression.clone()
    }
}

/// Computes the substitution for the body of a binder of the given variables,
/// together with the renamed bound variables.
fn rename_bound(
    variables: &[DataVariable],
    body: &DataExpression,
    sigma: &DataSubstitution,
) -> (Vec<DataVariable>, DataSubstitution) {
    let mut inner = sigma.clone();
    for variable in variables {
        inner.remove(variable);
    }

    // The variables that occur in the substituted expressions of the body.
    let body_variables = free_variables(body);
    let mut introduced: FxHashSet<String> = FxHashSet::default();
    for variable in &body_variables {
        if let Some(value) = inner.get(variable) {
            introduced.extend(free_variables(value).iter().map(|variable| variable.name().to_string()));
        }
    }

    if !variables.iter().any(|variable| introduced.contains(variable.name())) {
        return (variables.to_vec(), inner);
    }

    let mut generator: FreshNameGenerator = introduced.iter().cloned().collect();
    for variable in &body_variables {
        generator.add(variable.name());
    }

    let mut renamed = Vec::with_capacity(variables.len());
    for variable in variables {
        if introduced.contains(variable.name()) {
            let fresh = DataVariable::new(&generator.fresh(variable.name()), variable.sort());
            inner.insert(variable.clone(), fresh.clone().into());
            renamed.push(fresh);
        } else {
            renamed.push(variable.clone());
        }
    }

    (renamed, inner)
}

/// Returns all function symbols that occur in the expression.
pub fn function_symbols(expression: &DataExpression) -> FxHashSet<DataFunctionSymbol> {
    let mut result = FxHashSet::default();
    collect_function_symbols(expression, &mut result);
    result
}

pub fn collect_function_symbols(expression: &DataExpression, result: &mut FxHashSet<DataFunctionSymbol>) {
    if expression.is_function_symbol() {
        result.insert(expression.clone().into());
    } else if expression.is_application() {
        collect_function_symbols(&expression.head(), result);
        for argument in expression.arguments() {
            collect_function_symbols(&argument.protect().into(), result);
        }
    } else if expression.is_abstraction() {
        collect_function_symbols(&DataAbstraction::from(expression.clone()).body(), result);
    } else if expression.is_where_clause() {
        let where_clause = DataWhereClause::from(expression.clone());
        for assignment in where_clause.assignments().iter() {
            collect_function_symbols(&assignment.rhs(), result);
        }
        collect_function_symbols(&where_clause.body(), result);
    }
}

/// Calls the given function on every sort expression that occurs in the sort,
/// including the sort itself, in pre order.
pub fn visit_sorts(sort: &SortExpression, visitor: &mut impl FnMut(&SortExpression)) {
    visitor(sort);

    if sort.is_function_sort() {
        for domain in sort.domain().iter() {
            visit_sorts(&domain, visitor);
        }
        visit_sorts(&sort.codomain(), visitor);
    } else if sort.is_container_sort() {
        visit_sorts(&sort.element_sort(), visitor);
    } else if sort.is_structured_sort() {
        for constructor in sort.constructors().iter() {
            for argument in constructor.arguments().iter() {
                visit_sorts(&argument.sort(), visitor);
            }
        }
    } else if sort.is_possible_sorts() {
        for alternative in sort.possible_sorts().iter() {
            visit_sorts(&alternative, visitor);
        }
    }
}

/// Calls the given function on every sort expression that occurs in the
/// expression, i.e., in the sorts of variables and function symbols.
pub fn visit_expression_sorts(expression: &DataExpression, visitor: &mut impl FnMut(&SortExpression)) {
    if expression.is_variable() || expression.is_function_symbol() {
        visit_sorts(&expression.sort(), visitor);
    } else if expression.is_application() {
        visit_expression_sorts(&expression.head(), visitor);
        for argument in expression.arguments() {
            visit_expression_sorts(&argument.protect().into(), visitor);
        }
    } else if expression.is_abstraction() {
        let abstraction = DataAbstraction::from(expression.clone());
        for variable in abstraction.variables().iter() {
            visit_sorts(&variable.sort(), visitor);
        }
        visit_expression_sorts(&abstraction.body(), visitor);
    } else if expression.is_where_clause() {
        let where_clause = DataWhereClause::from(expression.clone());
        for assignment in where_clause.assignments().iter() {
            visit_sorts(&assignment.lhs().sort(), visitor);
            visit_expression_sorts(&assignment.rhs(), visitor);
        }
        visit_expression_sorts(&where_clause.body(), visitor);
    }
}

/// Rebuilds the sort bottom up, replacing every subsort by the result of the
/// given function.
pub fn replace_sorts(sort: &SortExpression, f: &mut impl FnMut(&SortExpression) -> SortExpression) -> SortExpression {
    let rebuilt = if sort.is_function_sort() {
        let domain = sort.domain().iter().map(|domain| replace_sorts(&domain, f)).collect();
        SortExpression::function(domain, replace_sorts(&sort.codomain(), f))
    } else if sort.is_container_sort() {
        SortExpression::container(sort.container_kind(), replace_sorts(&sort.element_sort(), f))
    } else if sort.is_structured_sort() {
        let constructors = sort
            .constructors()
            .iter()
            .map(|constructor| {
                let arguments = constructor
                    .arguments()
                    .iter()
                    .map(|argument| StructuredSortArgument::new(argument.name(), replace_sorts(&argument.sort(), f)))
                    .collect();
                StructuredSortConstructor::new(constructor.name(), arguments, constructor.recogniser())
            })
            .collect();
        SortExpression::structured(constructors)
    } else {
        sort.clone()
    };

    f(&rebuilt)
}

/// Replaces the sorts of all variables and function symbols in the expression.
pub fn replace_expression_sorts(
    expression: &DataExpression,
    f: &mut impl FnMut(&SortExpression) -> SortExpression,
) -> DataExpression {
    if expression.is_variable() {
        DataVariable::new(expression.name(), f(&expression.sort())).into()
    } else if expression.is_function_symbol() {
        DataFunctionSymbol::new(expression.name(), f(&expression.sort())).into()
    } else if expression.is_application() {
        let head = replace_expression_sorts(&expression.head(), f);
        let arguments: Vec<DataExpression> = expression
            .arguments()
            .map(|argument| replace_expression_sorts(&argument.protect().into(), f))
            .collect();
        DataExpression::application(&head, &arguments)
    } else if expression.is_abstraction() {
        let abstraction = DataAbstraction::from(expression.clone());
        let variables = abstraction
            .variables()
            .iter()
            .map(|variable| DataVariable::new(variable.name(), f(&variable.sort())))
            .collect();
        DataAbstraction::new(
            abstraction.binder(),
            variables,
            replace_expression_sorts(&abstraction.body(), f),
        )
        .into()
    } else if expression.is_where_clause() {
        let where_clause = DataWhereClause::from(expression.clone());
        let assignments = where_clause
            .assignments()
            .iter()
            .map(|assignment| {
                let variable = assignment.lhs();
                DataAssignment::new(
                    DataVariable::new(variable.name(), f(&variable.sort())),
                    replace_expression_sorts(&assignment.rhs(), f),
                )
            })
            .collect();
        DataWhereClause::new(replace_expression_sorts(&where_clause.body(), f), assignments).into()
    } else {
        expression.clone()
    }
}

/// Replaces the sorts in all parts of the equation.
pub fn replace_equation_sorts(equation: &DataEquation, f: &mut impl FnMut(&SortExpression) -> SortExpression) -> DataEquation {
    DataEquation::with_condition(
        equation
            .variables
            .iter()
            .map(|variable| DataVariable::new(variable.name(), f(&variable.sort())))
            .collect(),
        replace_expression_sorts(&equation.condition, f),
        replace_expression_sorts(&equation.lhs, f),
        replace_expression_sorts(&equation.rhs, f),
    )
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::*;
    use crate::data::BinderKind;

    #[test]
    fn test_free_variables() {
        let x = DataVariable::new("x", nat_sort());
        let y = DataVariable::new("y", nat_sort());
        let body = less(&x.clone().into(), &y.clone().into());
        let forall: DataExpression = DataAbstraction::new(BinderKind::Forall, vec![x.clone()], body.clone()).into();

        assert_eq!(free_variables(&body), vec![x.clone(), y.clone()]);
        assert_eq!(free_variables(&forall), vec![y.clone()]);
    }

    #[test]
    fn test_substitute_avoids_capture() {
        let x = DataVariable::new("x", nat_sort());
        let y = DataVariable::new("y", nat_sort());
        let body = less(&x.clone().into(), &y.clone().into());
        let exists: DataExpression = DataAbstraction::new(BinderKind::Exists, vec![x.clone()], body).into();

        let mut sigma = DataSubstitution::default();
        sigma.insert(y.clone(), x.clone().into());

        let result = substitute(&exists, &sigma);
        assert_eq!(result.to_string(), "exists x0: Nat. x0 < x");
    }

    #[test]
    fn test_where_clause_scope() {
        let n = DataVariable::new("n", nat_sort());
        let body = less(&nat(0), &n.clone().into());
        let where_clause: DataExpression =
            DataWhereClause::new(body, vec![DataAssignment::new(n.clone(), n.clone().into())]).into();

        // The right hand side of the assignment is free, the body occurrence is bound.
        assert_eq!(free_variables(&where_clause), vec![n.clone()]);

        let mut sigma = DataSubstitution::default();
        sigma.insert(n.clone(), nat(2));
        assert_eq!(substitute(&where_clause, &sigma).to_string(), "0 < n whr n = 2 end");
    }

    #[test]
    fn test_function_symbols() {
        let x: DataExpression = DataVariable::new("x", nat_sort()).into();
        let symbols = function_symbols(&plus(&x, &nat(1)));
        assert!(symbols.iter().any(|symbol| symbol.name() == "+"));
        assert!(symbols.iter().any(|symbol| symbol.name() == "@c1"));
    }
}
