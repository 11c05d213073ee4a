use crate::data::DataExpression;
use crate::data::SortExpression;

use super::apply;
use super::apply_expression;
use super::conditional_equation;
use super::equal_to;
use super::equation;
use super::function_symbol;
use super::not_equal_to;
use super::variable;
use super::SortDefinitions;

/// The function `function[argument -> value]` that maps argument to value and
/// is equal to function elsewhere.
pub fn function_update(function: &DataExpression, argument: &DataExpression, value: &DataExpression) -> DataExpression {
    apply("@func_update", &[function, argument, value], &function.sort())
}

/// Function update is only defined for unary functions.
pub(super) fn function_update_definitions(sort: &SortExpression) -> SortDefinitions {
    let domain = sort.domain();
    if domain.len() != 1 {
        return SortDefinitions::default();
    }

    let argument_sort = domain.head();
    let value_sort = sort.codomain();

    let f = variable("f", sort);
    let d = variable("d", &argument_sort);
    let x = variable("x", &argument_sort);
    let e = variable("e", &value_sort);
    let e2 = variable("e'", &value_sort);

    let update = function_update(&f, &d, &e);

    let equations = vec![
        conditional_equation(equal_to(&x, &d), apply_expression(&update, &[&x]), e.clone()),
        conditional_equation(
            not_equal_to(&x, &d),
            apply_expression(&update, &[&x]),
            apply_expression(&f, &[&x]),
        ),
        equation(function_update(&update, &d, &e2), function_update(&f, &d, &e2)),
    ];

    SortDefinitions {
        constructors: Vec::new(),
        mappings: vec![function_symbol("@func_update", &[sort, &argument_sort, &value_sort], sort)],
        equations,
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::bool_sort;
    use crate::data::standard::nat;
    use crate::data::standard::nat_sort;
    use crate::data::standard::true_;

    #[test]
    fn test_function_update_print() {
        let sort = SortExpression::function(vec![nat_sort()], bool_sort());
        let f = variable("f", &sort);
        assert_eq!(function_update(&f, &nat(1), &true_()).to_string(), "f[1 -> true]");
        assert_eq!(function_update_definitions(&sort).equations.len(), 3);
    }
}
