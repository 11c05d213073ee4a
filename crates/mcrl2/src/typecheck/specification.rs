use log::debug;
use mcrl2_syntax::UntypedDataSpecification;

use crate::data::free_variables;
use crate::data::standard::bool_sort;
use crate::data::visit_expression_sorts;
use crate::data::DataEquation;
use crate::data::DataExpression;
use crate::data::DataFunctionSymbol;
use crate::data::DataSpecification;
use crate::data::DataVariable;
use crate::data::SortExpression;
use crate::typecheck::sort_from_syntax;
use crate::typecheck::DataTypeChecker;
use crate::typecheck::TypeCheckOptions;
use crate::typecheck::VariableContext;
use crate::Mcrl2Error;

/// Type checks the data part of a parsed specification and returns the
/// resulting data specification.
pub fn typecheck_data_specification(
    untyped: &UntypedDataSpecification,
    options: &TypeCheckOptions,
) -> Result<DataSpecification, Mcrl2Error> {
    let mut spec = DataSpecification::new();

    for declaration in &untyped.sort_declarations {
        let name = SortExpression::basic(&declaration.identifier);
        match &declaration.expr {
            Some(expr) => spec.add_alias(name, sort_from_syntax(expr)?)?,
            None => spec.add_sort(name),
        }
    }

    // All sorts are known now, so references can be checked.
    for alias in spec.aliases() {
        spec.sort_specification().check_declared(&alias.reference)?;
    }

    for (declarations, is_constructor) in [
        (&untyped.constructor_declarations, true),
        (&untyped.map_declarations, false),
    ] {
        for declaration in declarations {
            let sort = sort_from_syntax(&declaration.sort)?;
            spec.sort_specification().check_declared(&sort)?;
            let symbol = DataFunctionSymbol::new(&declaration.identifier, spec.normalise_sorts(&sort));

            if is_constructor {
                let target = symbol.sort().target_sort();
                if !target.is_basic_sort() || spec.sort_specification().alias(&target).is_some() {
                    return Err(Mcrl2Error::SortDecl(format!(
                        "the constructor {} does not construct a declared sort but {target}",
                        declaration.identifier
                    )));
                }
                spec.add_constructor(symbol);
            } else {
                spec.add_mapping(symbol);
            }
        }
    }

    let equations = typecheck_equations(&spec, untyped, options)?;
    for equation in equations {
        let mut sorts = Vec::new();
        for expression in [&equation.lhs, &equation.rhs, &equation.condition] {
            visit_expression_sorts(expression, &mut |sort| {
                if !sort.is_basic_sort() && !sorts.contains(sort) {
                    sorts.push(sort.clone());
                }
            });
        }

        for sort in sorts {
            spec.add_context_sort(sort);
        }
        spec.add_equation(equation);
    }

    spec.check_well_typed()?;
    debug!(
        "Type checked data specification with {} sorts, {} constructors, {} mappings and {} equations",
        spec.user_sorts().len(),
        spec.user_constructors().len(),
        spec.user_mappings().len(),
        spec.user_equations().len()
    );
    Ok(spec)
}

fn typecheck_equations(
    spec: &DataSpecification,
    untyped: &UntypedDataSpecification,
    options: &TypeCheckOptions,
) -> Result<Vec<DataEquation>, Mcrl2Error> {
    let mut checker = DataTypeChecker::new(spec, options.clone());
    let mut result = Vec::new();

    for section in &untyped.equation_declarations {
        let variables = checker.typecheck_variables(&section.variables)?;
        let context = VariableContext::from_variables(variables.iter());

        for equation in &section.equations {
            let untyped_sort = SortExpression::untyped();

            // The left-hand side determines the sort, unless the right-hand
            // side can only be typed in a larger sort.
            let mut lhs = checker.typecheck(&equation.lhs, &untyped_sort, &context)?;
            let rhs = match checker.typecheck(&equation.rhs, &lhs.sort(), &context) {
                Ok(rhs) => rhs,
                Err(error) => {
                    let rhs = checker.typecheck(&equation.rhs, &untyped_sort, &context).map_err(|_| error)?;
                    lhs = checker.typecheck(&equation.lhs, &rhs.sort(), &context)?;
                    rhs
                }
            };

            let condition = match &equation.condition {
                Some(condition) => Some(checker.typecheck(condition, &bool_sort(), &context)?),
                None => None,
            };

            let bound = free_variables(&lhs);
            let mut used = bound.clone();
            for expression in std::iter::once(&rhs).chain(condition.iter()) {
                for variable in free_variables(expression) {
                    if !bound.contains(&variable) {
                        return Err(Mcrl2Error::ScopeError(format!(
                            "the variable {} of {} does not occur in the left-hand side {}",
                            variable.name(),
                            expression,
                            lhs
                        )));
                    }
                    if !used.contains(&variable) {
                        used.push(variable);
                    }
                }
            }

            let variables: Vec<DataVariable> = variables.iter().filter(|v| used.contains(v)).cloned().collect();
            result.push(match condition {
                Some(condition) => DataEquation::with_condition(variables, condition, lhs, rhs),
                None => DataEquation::new(variables, lhs, rhs),
            });
        }
    }

    Ok(result)
}

/// Type checks a single data expression in the context of the given
/// variables, the sort is inferred when it is untyped.
pub fn typecheck_data_expression(
    spec: &DataSpecification,
    expression: &mcrl2_syntax::DataExpr,
    variables: &[DataVariable],
    expected: &SortExpression,
) -> Result<DataExpression, Mcrl2Error> {
    let mut checker = DataTypeChecker::new(spec, TypeCheckOptions::default());
    checker.typecheck(expression, expected, &VariableContext::from_variables(variables.iter()))
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use mcrl2_syntax::parse_data_expression;
    use mcrl2_syntax::parse_specification;
    use test_log::test;

    use super::*;

    fn typecheck(text: &str) -> Result<DataSpecification, Mcrl2Error> {
        typecheck_data_specification(
            &parse_specification(text).unwrap().data_specification,
            &TypeCheckOptions::default(),
        )
    }

    #[test]
    fn test_list_equations() {
        let spec = typecheck(indoc! {"
            map is_null: List(Nat) -> Bool;
            var L: List(Nat);
                n: Nat;
            eqn (n > 0 whr n = #L end) -> is_null(L) = false;
                is_null([]) = true;
        "})
        .unwrap();

        assert_eq!(spec.user_equations().len(), 2);
        let first = &spec.user_equations()[0];
        assert!(first.has_condition());
        assert_eq!(first.variables.len(), 1, "only L occurs in {first}");
        assert_eq!(first.lhs.sort(), bool_sort());

        // The equations of List(Nat) are part of the normalised view.
        assert!(spec.mappings().iter().any(|symbol| symbol.name() == "#"));
    }

    #[test]
    fn test_structured_sort() {
        let spec = typecheck(indoc! {"
            sort Colour = struct red | green | blue;
            map next: Colour -> Colour;
            eqn next(red) = green;
                next(green) = blue;
                next(blue) = red;
        "})
        .unwrap();

        let colour = SortExpression::basic("Colour");
        assert_eq!(spec.constructors_of(&colour).len(), 3);
        assert!(spec.is_certainly_finite(&colour));
    }

    #[test]
    fn test_integer_equation() {
        let spec = typecheck(indoc! {"
            map f: Nat -> Int;
            var n: Nat;
            eqn f(n) = n - 1;
        "})
        .unwrap();

        let equation = &spec.user_equations()[0];
        assert_eq!(equation.rhs.sort().to_string(), "Int");
    }

    #[test]
    fn test_unbound_variable() {
        let error = typecheck(indoc! {"
            map f: Nat -> Nat;
            var n, m: Nat;
            eqn f(n) = m;
        "})
        .err().unwrap();
        assert!(matches!(error, Mcrl2Error::ScopeError(_)), "{error}");
    }

    #[test]
    fn test_undeclared_sort() {
        let error = typecheck("map f: D -> Bool;").err().unwrap();
        assert!(matches!(error, Mcrl2Error::SortDecl(_)), "{error}");
    }

    #[test]
    fn test_expression_in_context() {
        let spec = typecheck("sort D = Nat;").unwrap();
        let n = DataVariable::new("n", SortExpression::basic("Nat"));
        let result = typecheck_data_expression(
            &spec,
            &parse_data_expression("n + 1").unwrap(),
            &[n],
            &SortExpression::untyped(),
        )
        .unwrap();
        assert_eq!(result.sort().to_string(), "Pos");
    }
}
