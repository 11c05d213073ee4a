use crate::data::DataExpression;
use crate::data::SortExpression;

use super::apply;
use super::constant;
use super::equation;
use super::function_symbol;
use super::variable;
use super::SortDefinitions;

pub fn bool_sort() -> SortExpression {
    SortExpression::basic("Bool")
}

pub fn is_bool_sort(sort: &SortExpression) -> bool {
    sort.is_basic_sort() && sort.name() == "Bool"
}

pub fn true_() -> DataExpression {
    constant("true", &bool_sort())
}

pub fn false_() -> DataExpression {
    constant("false", &bool_sort())
}

pub fn is_true(expression: &DataExpression) -> bool {
    expression.is_symbol("true")
}

pub fn is_false(expression: &DataExpression) -> bool {
    expression.is_symbol("false")
}

pub fn not(expression: &DataExpression) -> DataExpression {
    apply("!", &[expression], &bool_sort())
}

pub fn and(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("&&", &[left, right], &bool_sort())
}

pub fn or(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("||", &[left, right], &bool_sort())
}

pub fn implies(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("=>", &[left, right], &bool_sort())
}

/// Conjunction of all the given expressions, `true` when there are none.
pub fn join_and(expressions: impl IntoIterator<Item = DataExpression>) -> DataExpression {
    expressions
        .into_iter()
        .reduce(|result, expression| and(&result, &expression))
        .unwrap_or_else(true_)
}

/// Disjunction of all the given expressions, `false` when there are none.
pub fn join_or(expressions: impl IntoIterator<Item = DataExpression>) -> DataExpression {
    expressions
        .into_iter()
        .reduce(|result, expression| or(&result, &expression))
        .unwrap_or_else(false_)
}

/// Conjunction that removes trivial operands.
pub fn lazy_and(left: &DataExpression, right: &DataExpression) -> DataExpression {
    if is_true(left) {
        right.clone()
    } else if is_true(right) {
        left.clone()
    } else if is_false(left) || is_false(right) {
        false_()
    } else {
        and(left, right)
    }
}

pub(super) fn boolean_definitions() -> SortDefinitions {
    let sort = bool_sort();
    let b = variable("b", &sort);
    let t = true_();
    let f = false_();

    let constructors = vec![
        function_symbol("true", &[], &sort),
        function_symbol("false", &[], &sort),
    ];

    let mappings = vec![
        function_symbol("!", &[&sort], &sort),
        function_symbol("&&", &[&sort, &sort], &sort),
        function_symbol("||", &[&sort, &sort], &sort),
        function_symbol("=>", &[&sort, &sort], &sort),
    ];

    let equations = vec![
        equation(not(&t), f.clone()),
        equation(not(&f), t.clone()),
        equation(not(&not(&b)), b.clone()),
        equation(and(&b, &t), b.clone()),
        equation(and(&b, &f), f.clone()),
        equation(and(&t, &b), b.clone()),
        equation(and(&f, &b), f.clone()),
        equation(or(&b, &t), t.clone()),
        equation(or(&b, &f), b.clone()),
        equation(or(&t, &b), t.clone()),
        equation(or(&f, &b), b.clone()),
        equation(implies(&b, &t), t.clone()),
        equation(implies(&b, &f), not(&b)),
        equation(implies(&t, &b), b.clone()),
        equation(implies(&f, &b), t.clone()),
        equation(apply("==", &[&t, &b], &sort), b.clone()),
        equation(apply("==", &[&f, &b], &sort), not(&b)),
        equation(apply("==", &[&b, &t], &sort), b.clone()),
        equation(apply("==", &[&b, &f], &sort), not(&b)),
        equation(apply("<", &[&f, &b], &sort), b.clone()),
        equation(apply("<", &[&t, &b], &sort), f.clone()),
        equation(apply("<", &[&b, &f], &sort), f.clone()),
        equation(apply("<", &[&b, &t], &sort), not(&b)),
        equation(apply("<=", &[&f, &b], &sort), t.clone()),
        equation(apply("<=", &[&t, &b], &sort), b.clone()),
        equation(apply("<=", &[&b, &f], &sort), not(&b)),
        equation(apply("<=", &[&b, &t], &sort), t.clone()),
    ];

    SortDefinitions {
        constructors,
        mappings,
        equations,
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_join() {
        let b = variable("b", &bool_sort());
        assert_eq!(join_and(vec![]), true_());
        assert_eq!(join_or(vec![b.clone()]), b);
        assert_eq!(lazy_and(&true_(), &b), b);
        assert_eq!(lazy_and(&b, &false_()), false_());
    }
}
