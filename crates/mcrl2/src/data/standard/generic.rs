use crate::data::DataExpression;
use crate::data::SortExpression;

use super::apply;
use super::bool_sort;
use super::equation;
use super::false_;
use super::function_symbol;
use super::not;
use super::true_;
use super::variable;
use super::SortDefinitions;

pub fn equal_to(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("==", &[left, right], &bool_sort())
}

pub fn not_equal_to(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("!=", &[left, right], &bool_sort())
}

/// The conditional `if(condition, then, else)`.
pub fn if_(condition: &DataExpression, then: &DataExpression, otherwise: &DataExpression) -> DataExpression {
    apply("if", &[condition, then, otherwise], &then.sort())
}

pub fn less(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("<", &[left, right], &bool_sort())
}

pub fn less_equal(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply("<=", &[left, right], &bool_sort())
}

pub fn greater(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply(">", &[left, right], &bool_sort())
}

pub fn greater_equal(left: &DataExpression, right: &DataExpression) -> DataExpression {
    apply(">=", &[left, right], &bool_sort())
}

/// The equality, inequality, conditional and the comparison operators that
/// exist for every sort.
pub(super) fn generic_definitions(sort: &SortExpression) -> SortDefinitions {
    let boolean = bool_sort();
    let x = variable("x", sort);
    let y = variable("y", sort);
    let b = variable("b", &boolean);

    let mappings = vec![
        function_symbol("==", &[sort, sort], &boolean),
        function_symbol("!=", &[sort, sort], &boolean),
        function_symbol("if", &[&boolean, sort, sort], sort),
        function_symbol("<", &[sort, sort], &boolean),
        function_symbol("<=", &[sort, sort], &boolean),
        function_symbol(">", &[sort, sort], &boolean),
        function_symbol(">=", &[sort, sort], &boolean),
    ];

    let equations = vec![
        equation(equal_to(&x, &x), true_()),
        equation(not_equal_to(&x, &y), not(&equal_to(&x, &y))),
        equation(if_(&true_(), &x, &y), x.clone()),
        equation(if_(&false_(), &x, &y), y.clone()),
        equation(if_(&b, &x, &x), x.clone()),
        equation(less(&x, &x), false_()),
        equation(less_equal(&x, &x), true_()),
        equation(greater_equal(&x, &y), less_equal(&y, &x)),
        equation(greater(&x, &y), less(&y, &x)),
    ];

    SortDefinitions {
        constructors: Vec::new(),
        mappings,
        equations,
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_generic_symbols() {
        let sort = SortExpression::basic("D");
        let definitions = generic_definitions(&sort);
        assert_eq!(definitions.mappings.len(), 7);

        let x = variable("x", &sort);
        assert_eq!(if_(&true_(), &x, &x).sort(), sort);
        assert_eq!(greater_equal(&x, &x).to_string(), "x >= x");
    }
}
