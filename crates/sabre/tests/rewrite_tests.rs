use indoc::indoc;
use test_case::test_case;
use test_log::test;

use mcrl2::data::standard::bool_sort;
use mcrl2::data::standard::nat_sort;
use mcrl2::data::DataExpression;
use mcrl2::data::DataSpecification;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::data::SortExpression;
use mcrl2::typecheck::typecheck_data_expression;
use mcrl2::typecheck::typecheck_data_specification;
use mcrl2::typecheck::TypeCheckOptions;
use mcrl2::Mcrl2Error;
use mcrl2_syntax::parse_data_expression;
use mcrl2_syntax::parse_specification;
use mcrl2rust_sabre::create_rewriter;
use mcrl2rust_sabre::Enumerator;
use mcrl2rust_sabre::RewriteEngine;
use mcrl2rust_sabre::RewriteStrategy;
use mcrl2rust_sabre::UsedEquationSelector;

fn specification(text: &str) -> DataSpecification {
    typecheck_data_specification(
        &parse_specification(text).unwrap().data_specification,
        &TypeCheckOptions::default(),
    )
    .unwrap()
}

fn expression(spec: &DataSpecification, text: &str, variables: &[DataVariable]) -> DataExpression {
    typed_expression(spec, text, variables, &SortExpression::untyped())
}

fn typed_expression(
    spec: &DataSpecification,
    text: &str,
    variables: &[DataVariable],
    sort: &SortExpression,
) -> DataExpression {
    typecheck_data_expression(spec, &parse_data_expression(text).unwrap(), variables, sort).unwrap()
}

/// Checks that both expressions have the same normal form, where the expected
/// expression is typed against the sort of the input.
fn check_rewrite(spec_text: &str, strategy: RewriteStrategy, input: &str, expected: &str) {
    let spec = specification(spec_text);
    let mut rewriter = create_rewriter(&spec, strategy, &UsedEquationSelector::all());

    let input_term = expression(&spec, input, &[]);
    let result = rewriter.rewrite(&input_term);
    let expected = rewriter.rewrite(&typed_expression(&spec, expected, &[], &input_term.sort()));
    assert_eq!(result, expected, "{input} did not rewrite to {expected}");
}

#[test_case(RewriteStrategy::Jitty, "2 + 3", "5" ; "addition jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "2 + 3", "5" ; "addition compiling")]
#[test_case(RewriteStrategy::Jitty, "2 * 3 + 1", "7" ; "multiplication jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "2 * 3 + 1", "7" ; "multiplication compiling")]
#[test_case(RewriteStrategy::Jitty, "3 - 5", "-2" ; "negative result jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "3 - 5", "-2" ; "negative result compiling")]
#[test_case(RewriteStrategy::Jitty, "max(4, 9) == 9", "true" ; "maximum jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "3 < 5 && !(5 <= 3)", "true" ; "comparison compiling")]
#[test_case(RewriteStrategy::Jitty, "if(1 < 2, 3, 4)", "3" ; "if jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "if(1 < 2, 3, 4)", "3" ; "if compiling")]
fn test_arithmetic(strategy: RewriteStrategy, input: &str, expected: &str) {
    check_rewrite("", strategy, input, expected);
}

#[test_case(RewriteStrategy::Jitty, "#[1, 2, 3]", "3" ; "length jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "#[1, 2, 3]", "3" ; "length compiling")]
#[test_case(RewriteStrategy::Jitty, "head(tail([4, 5, 6]))", "5" ; "head jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "[1] ++ [2] == [1, 2]", "true" ; "concatenation compiling")]
#[test_case(RewriteStrategy::Jitty, "2 in [1, 2]", "true" ; "element jitty")]
#[test_case(RewriteStrategy::JittyCompiling, "3 in [1, 2]", "false" ; "element compiling")]
fn test_lists(strategy: RewriteStrategy, input: &str, expected: &str) {
    check_rewrite("sort L = List(Pos);", strategy, input, expected);
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_binders(strategy: RewriteStrategy) {
    check_rewrite("", strategy, "n > 0 whr n = 3 end", "true");
    check_rewrite("", strategy, "(lambda x: Nat. x + 1)(2)", "3");
    check_rewrite("", strategy, "forall b: Bool. b || !b", "true");
    check_rewrite("", strategy, "exists b: Bool. b && !b", "false");
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_conditional_equations(strategy: RewriteStrategy) {
    let spec = indoc! {"
        map is_null: List(Nat) -> Bool;
        var L: List(Nat);
            n: Nat;
        eqn (n > 0 whr n = #L end) -> is_null(L) = false;
            is_null([]) = true;
    "};

    check_rewrite(spec, strategy, "is_null([])", "true");
    check_rewrite(spec, strategy, "is_null([0, 1])", "false");
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_structured_sort(strategy: RewriteStrategy) {
    let spec = indoc! {"
        sort Colour = struct red | green | blue;
        map next: Colour -> Colour;
        eqn next(red) = green;
            next(green) = blue;
            next(blue) = red;
    "};

    check_rewrite(spec, strategy, "next(next(red))", "blue");
    check_rewrite(spec, strategy, "forall c: Colour. next(next(next(c))) == c", "true");
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_variable_right_hand_side(strategy: RewriteStrategy) {
    let spec = indoc! {"
        map id: Nat -> Nat;
        var n: Nat;
        eqn id(n) = n;
    "};

    // The matched argument is only normalised when the right-hand side is.
    check_rewrite(spec, strategy, "id(1 + 1)", "2");
    check_rewrite(spec, strategy, "if(true, 2 + 3, 0)", "5");
    check_rewrite(spec, strategy, "true && 1 < 2", "true");
    check_rewrite(spec, strategy, "id(1) - 5 < 0", "true");
}

#[test]
fn test_statistics() {
    let spec = specification("");
    let mut rewriter = create_rewriter(&spec, RewriteStrategy::Jitty, &UsedEquationSelector::all());
    rewriter.rewrite(&expression(&spec, "1 + 1", &[]));
    assert!(rewriter.statistics().rewrite_steps > 0);
}

#[test]
fn test_rewrite_with_substitution() {
    let spec = specification("");
    let mut rewriter = create_rewriter(&spec, RewriteStrategy::Jitty, &UsedEquationSelector::all());

    let n = DataVariable::new("n", nat_sort());
    let term = expression(&spec, "n + 1", &[n.clone()]);

    let mut sigma = DataSubstitution::default();
    sigma.insert(n, rewriter.rewrite(&typed_expression(&spec, "4", &[], &nat_sort())));

    let expected = rewriter.rewrite(&typed_expression(&spec, "5", &[], &nat_sort()));
    assert_eq!(rewriter.rewrite_with(&term, &sigma), expected);
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_enumerate_bounded_nat(strategy: RewriteStrategy) {
    let spec = specification("");
    let mut rewriter = create_rewriter(&spec, strategy, &UsedEquationSelector::all());

    let n = DataVariable::new("n", nat_sort());
    let b = DataVariable::new("b", bool_sort());
    let condition = expression(&spec, "n < 3 && b", &[n.clone(), b.clone()]);

    let solutions: Vec<Vec<DataExpression>> = Enumerator::new(rewriter.as_mut(), &[n, b], &condition, &DataSubstitution::default())
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(solutions.len(), 3);
    let mut values: Vec<String> = solutions.iter().map(|solution| solution[0].to_string()).collect();
    values.sort();
    values.dedup();
    assert_eq!(values.len(), 3, "all solutions should be distinct");
}

#[test]
fn test_enumerate_non_boolean_condition() {
    let spec = specification("map f: Bool -> Bool;");
    let mut rewriter = create_rewriter(&spec, RewriteStrategy::Jitty, &UsedEquationSelector::all());

    let b = DataVariable::new("b", bool_sort());
    let condition = expression(&spec, "f(b)", &[b.clone()]);

    let result: Result<Vec<_>, _> =
        Enumerator::new(rewriter.as_mut(), &[b], &condition, &DataSubstitution::default()).collect();
    assert!(matches!(result, Err(Mcrl2Error::NonBooleanCondition(_))), "{result:?}");
}

#[test]
fn test_enumerate_diverges() {
    let spec = specification(indoc! {"
        sort D;
        map p: D -> Bool;
    "});
    let mut rewriter = create_rewriter(&spec, RewriteStrategy::Jitty, &UsedEquationSelector::all());

    let d = DataVariable::new("d", SortExpression::basic("D"));
    let condition = expression(&spec, "p(d)", &[d.clone()]);

    let result: Result<Vec<_>, _> =
        Enumerator::new(rewriter.as_mut(), &[d], &condition, &DataSubstitution::default()).collect();
    assert!(matches!(result, Err(Mcrl2Error::EnumerationDiverges(_))), "{result:?}");

    // An unbounded natural number is not enumerable either.
    let n = DataVariable::new("n", nat_sort());
    let condition = expression(&spec, "n >= 0", &[n.clone()]);
    let result: Result<Vec<_>, _> = Enumerator::new(rewriter.as_mut(), &[n], &condition, &DataSubstitution::default())
        .with_limit(100)
        .collect();
    assert!(matches!(result, Err(Mcrl2Error::EnumerationDiverges(_))), "{result:?}");
}
