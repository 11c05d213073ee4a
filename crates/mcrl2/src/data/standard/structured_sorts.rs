use crate::data::DataExpression;
use crate::data::DataFunctionSymbol;
use crate::data::SortExpression;
use crate::data::StructuredSortConstructor;

use super::and;
use super::apply_expression;
use super::bool_sort;
use super::equal_to;
use super::equation;
use super::false_;
use super::function_symbol;
use super::join_and;
use super::less;
use super::less_equal;
use super::or;
use super::true_;
use super::variable;
use super::SortDefinitions;

/// The lexicographical comparison of two argument lists of the same constructor,
/// where `last` compares the final pair of arguments.
fn lexicographical(
    left: &[DataExpression],
    right: &[DataExpression],
    last: fn(&DataExpression, &DataExpression) -> DataExpression,
) -> DataExpression {
    match (left.split_first(), right.split_first()) {
        (Some((x, [])), Some((y, []))) => last(x, y),
        (Some((x, xs)), Some((y, ys))) => or(
            &less(x, y),
            &and(&equal_to(x, y), &lexicographical(xs, ys, last)),
        ),
        _ => unreachable!("Constructor arguments must be non-empty and of equal length"),
    }
}

/// The constructors, recognisers, projections and the comparison of the
/// structured sort `definition`, where `sort` is the sort that the
/// constructors construct, typically the alias of the structured sort.
pub fn structured_sort_definitions(sort: &SortExpression, definition: &SortExpression) -> SortDefinitions {
    debug_assert!(definition.is_structured_sort(), "{definition} is not a structured sort");

    let boolean = bool_sort();
    let constructors: Vec<StructuredSortConstructor> = definition.constructors().iter().collect();

    let mut result = SortDefinitions::default();

    // The constructor applied to fresh variables with the given prefix.
    let instantiate = |constructor: &StructuredSortConstructor, prefix: &str| -> (DataExpression, Vec<DataExpression>) {
        let arguments: Vec<DataExpression> = constructor
            .arguments()
            .iter()
            .enumerate()
            .map(|(index, argument)| variable(&format!("{prefix}{}", index + 1), &argument.sort()))
            .collect();
        let domain: Vec<SortExpression> = constructor.arguments().iter().map(|argument| argument.sort()).collect();
        let domain_refs: Vec<&SortExpression> = domain.iter().collect();
        let symbol = function_symbol(constructor.name(), &domain_refs, sort);
        let references: Vec<&DataExpression> = arguments.iter().collect();
        (apply_expression(&symbol.into(), &references), arguments)
    };

    for constructor in &constructors {
        let domain: Vec<SortExpression> = constructor.arguments().iter().map(|argument| argument.sort()).collect();
        let domain_refs: Vec<&SortExpression> = domain.iter().collect();
        result
            .constructors
            .push(function_symbol(constructor.name(), &domain_refs, sort));

        if let Some(recogniser) = constructor.recogniser() {
            let symbol: DataExpression = function_symbol(recogniser, &[sort], &boolean).into();
            result.mappings.push(symbol.clone().into());

            for other in &constructors {
                let (term, _) = instantiate(other, "x");
                let value = if other.name() == constructor.name() { true_() } else { false_() };
                result.equations.push(equation(apply_expression(&symbol, &[&term]), value));
            }
        }

        let (term, variables) = instantiate(constructor, "x");
        for (argument, variable) in constructor.arguments().iter().zip(variables.iter()) {
            if let Some(name) = argument.name() {
                let symbol: DataExpression = function_symbol(name, &[sort], &argument.sort()).into();
                let symbol_function: DataFunctionSymbol = symbol.clone().into();
                if !result.mappings.contains(&symbol_function) {
                    result.mappings.push(symbol_function);
                }
                result
                    .equations
                    .push(equation(apply_expression(&symbol, &[&term]), variable.clone()));
            }
        }
    }

    // Equality and the ordering on constructors by their index, followed by
    // the lexicographical ordering on arguments.
    for (i, left) in constructors.iter().enumerate() {
        let (left_term, left_arguments) = instantiate(left, "x");
        for (j, right) in constructors.iter().enumerate() {
            let (right_term, right_arguments) = instantiate(right, "y");

            if i == j {
                let equal = join_and(
                    left_arguments
                        .iter()
                        .zip(right_arguments.iter())
                        .map(|(x, y)| equal_to(x, y)),
                );
                result.equations.push(equation(equal_to(&left_term, &right_term), equal));

                if left_arguments.is_empty() {
                    result.equations.push(equation(less(&left_term, &right_term), false_()));
                    result.equations.push(equation(less_equal(&left_term, &right_term), true_()));
                } else {
                    result.equations.push(equation(
                        less(&left_term, &right_term),
                        lexicographical(&left_arguments, &right_arguments, less),
                    ));
                    result.equations.push(equation(
                        less_equal(&left_term, &right_term),
                        lexicographical(&left_arguments, &right_arguments, less_equal),
                    ));
                }
            } else {
                let ordered = if i < j { true_() } else { false_() };
                result.equations.push(equation(equal_to(&left_term, &right_term), false_()));
                result
                    .equations
                    .push(equation(less(&left_term, &right_term), ordered.clone()));
                result.equations.push(equation(less_equal(&left_term, &right_term), ordered));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::data::standard::int_sort;
    use crate::data::StructuredSortArgument;

    #[test]
    fn test_structured_sort_definitions() {
        let definition = SortExpression::structured(vec![
            StructuredSortConstructor::new(
                "c",
                vec![
                    StructuredSortArgument::new(Some("i"), int_sort()),
                    StructuredSortArgument::new(None, bool_sort()),
                ],
                Some("is_c"),
            ),
            StructuredSortConstructor::new("d", vec![], None),
        ]);
        let sort = SortExpression::basic("S");

        let definitions = structured_sort_definitions(&sort, &definition);
        assert_eq!(definitions.constructors.len(), 2);
        assert_eq!(definitions.mappings.len(), 2);

        let printed: Vec<String> = definitions.equations.iter().map(|equation| equation.to_string()).collect();
        assert!(printed.contains(&"is_c(c(x1, x2)) = true".to_string()));
        assert!(printed.contains(&"is_c(d) = false".to_string()));
        assert!(printed.contains(&"i(c(x1, x2)) = x1".to_string()));
        assert!(printed.contains(&"c(x1, x2) < d = true".to_string()));
        assert!(printed.contains(&"c(x1, x2) == c(y1, y2) = x1 == y1 && x2 == y2".to_string()));

        for equation in &definitions.equations {
            assert_eq!(equation.lhs.sort(), equation.rhs.sort());
        }
    }
}
