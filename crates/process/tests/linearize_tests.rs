use indoc::indoc;
use test_case::test_case;
use test_log::test;

use mcrl2::data::standard::int;
use mcrl2::data::standard::true_;
use mcrl2::lps::LinearProcessSpecification;
use mcrl2::typecheck::TypeCheckOptions;
use mcrl2::Mcrl2Error;
use mcrl2rust_process::linearize;
use mcrl2rust_process::parse_process_specification;
use mcrl2rust_process::LinearizeOptions;
use mcrl2rust_sabre::RewriteStrategy;

fn linearize_text(text: &str, options: &LinearizeOptions) -> Result<LinearProcessSpecification, Mcrl2Error> {
    let spec = parse_process_specification(text, &TypeCheckOptions::default())?;
    linearize(&spec, options)
}

fn parameter_names(lps: &LinearProcessSpecification) -> Vec<&str> {
    lps.parameters.iter().map(|parameter| parameter.name()).collect()
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_simple_choice(rewrite_strategy: RewriteStrategy) {
    let lps = linearize_text(
        indoc! {"
            sort D = struct d1 | d2;
            act a: D;
            proc P(e: D) = sum d: D. a(e) . P(d);
            init P(d1);
        "},
        &LinearizeOptions {
            rewrite_strategy,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(parameter_names(&lps), vec!["e"]);
    assert_eq!(lps.summands.len(), 1);
    assert_eq!(lps.summands[0].summation_variables.len(), 1);
    assert_eq!(lps.summands[0].assignments.len(), 1);
    assert_eq!(lps.initial_state.len(), 1);
    assert_eq!(lps.initial_state[0].to_string(), "d1");
}

#[test]
fn test_unreachable_tau() {
    let lps = linearize_text("init (true -> delta <> delta) . tau;", &LinearizeOptions::default()).unwrap();

    assert!(lps.summands.is_empty(), "{lps}");
}

#[test]
fn test_where_clause_in_condition() {
    let lps = linearize_text(
        indoc! {"
            act a: Bool;

            map is_null: List(Bool) -> Bool;

            var L: List(Bool);
            eqn (n > 0 whr n = #L end) -> is_null(L) = false;
                (n == 0 whr n = #L end) -> is_null(L) = true;

            proc X(L: List(Bool)) = a(is_null(L)) . X([true]);
            init X([]);
        "},
        &LinearizeOptions::default(),
    )
    .unwrap();

    assert_eq!(parameter_names(&lps), vec!["L"]);
    assert_eq!(lps.summands.len(), 1);
}

#[test]
fn test_choice_with_deadlock() {
    let lps = linearize_text(
        indoc! {"
            act a;
            proc P = a . P + a . delta;
            init P;
        "},
        &LinearizeOptions::default(),
    )
    .unwrap();

    // The process after the second a is represented by a separate phase.
    assert_eq!(lps.parameters.len(), 1);
    assert_eq!(lps.summands.len(), 2);
    assert!(lps.summands.iter().all(|summand| summand.multi_action.to_string() == "a"));
}

#[test]
fn test_terminating_action() {
    let lps = linearize_text(
        indoc! {"
            act a;
            proc P = a . delta;
            init P;
        "},
        &LinearizeOptions::default(),
    )
    .unwrap();

    assert_eq!(lps.summands.len(), 1);
}

#[test]
fn test_expand_structured_sorts() {
    let lps = linearize_text(
        indoc! {"
            sort S = struct c(i: Int, b: Bool);
            proc P(s: S) = delta;
            init P(c(0, true));
        "},
        &LinearizeOptions {
            expand_structured_sorts: true,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(parameter_names(&lps), vec!["i", "b"]);
    assert_eq!(lps.initial_state, vec![int(0), true_()]);
}

#[test]
fn test_structured_sorts_are_kept_by_default() {
    let lps = linearize_text(
        indoc! {"
            sort S = struct c(i: Int, b: Bool);
            proc P(s: S) = delta;
            init P(c(0, true));
        "},
        &LinearizeOptions::default(),
    )
    .unwrap();

    assert_eq!(parameter_names(&lps), vec!["s"]);
}

#[test]
fn test_nested_sequential_composition() {
    let lps = linearize_text(
        indoc! {"
            act a, b, c;
            proc P = (a + b) . c . P;
            init P;
        "},
        &LinearizeOptions::default(),
    )
    .unwrap();

    assert_eq!(lps.summands.len(), 3);
}

#[test]
fn test_process_call_in_sequence() {
    let lps = linearize_text(
        indoc! {"
            act a, b: Nat;
            proc P(n: Nat) = Q(n) . b(n) . P(n);
                 Q(m: Nat) = a(m);
            init P(0);
        "},
        &LinearizeOptions {
            max_usage: 0,
            ..Default::default()
        },
    )
    .unwrap();

    let actions: Vec<String> = lps
        .summands
        .iter()
        .flat_map(|summand| summand.multi_action.actions().iter())
        .map(|action| action.label.name.clone())
        .collect();
    assert!(actions.contains(&"a".to_string()), "{lps}");
    assert!(actions.contains(&"b".to_string()), "{lps}");
}

#[test]
fn test_multi_action_and_time() {
    let lps = linearize_text(
        indoc! {"
            act a, b;
            proc P = (a | b) @ 3 . P;
            init P;
        "},
        &LinearizeOptions::default(),
    )
    .unwrap();

    assert_eq!(lps.summands.len(), 1);
    assert_eq!(lps.summands[0].multi_action.actions().len(), 2);
    assert!(lps.summands[0].time.is_some());
}

#[test]
fn test_parallel_composition_is_unsupported() {
    let result = linearize_text(
        indoc! {"
            act a, b;
            proc P = a || b;
            init P;
        "},
        &LinearizeOptions::default(),
    );

    assert!(matches!(result, Err(Mcrl2Error::Unsupported(_))));
}

#[test]
fn test_missing_initial_process() {
    let result = linearize_text(
        indoc! {"
            act a;
            proc P = a . P;
        "},
        &LinearizeOptions::default(),
    );

    assert!(matches!(result, Err(Mcrl2Error::Unsupported(_))));
}
