use indoc::indoc;
use test_case::test_case;
use test_log::test;

use mcrl2::data::standard::int;
use mcrl2::data::standard::true_;
use mcrl2::lps::LinearProcessSpecification;
use mcrl2::typecheck::TypeCheckOptions;
use mcrl2::Mcrl2Error;
use mcrl2rust_explore::explore;
use mcrl2rust_explore::ExploreOptions;
use mcrl2rust_explore::ExploreResult;
use mcrl2rust_explore::ExploreStatus;
use mcrl2rust_explore::Explorer;
use mcrl2rust_io::io_aut::write_aut;
use mcrl2rust_process::linearize;
use mcrl2rust_process::parse_process_specification;
use mcrl2rust_process::LinearizeOptions;
use mcrl2rust_sabre::RewriteStrategy;

fn linearize_text(text: &str, options: &LinearizeOptions) -> LinearProcessSpecification {
    let spec = parse_process_specification(text, &TypeCheckOptions::default()).unwrap();
    linearize(&spec, options).unwrap()
}

fn explore_text(text: &str, options: ExploreOptions) -> ExploreResult {
    explore(&linearize_text(text, &LinearizeOptions::default()), options).unwrap()
}

fn transitions(result: &ExploreResult) -> Vec<(usize, String, usize)> {
    result
        .lts
        .iter_transitions()
        .map(|(from, label, to)| (from, result.lts.labels()[label].clone(), to))
        .collect()
}

fn aut(result: &ExploreResult) -> String {
    let mut buffer = Vec::new();
    write_aut(&mut buffer, &result.lts).unwrap();
    String::from_utf8_lossy(&buffer).to_string()
}

const SIMPLE_CHOICE: &str = indoc! {"
    sort D = struct d1 | d2;
    act a: D;
    proc P(e: D) = sum d: D. a(e) . P(d);
    init P(d1);
"};

const COUNTER: &str = indoc! {"
    act a: Nat;
    proc P(n: Nat) = a(n) . P(n + 1);
    init P(0);
"};

#[test_case(RewriteStrategy::Jitty, false ; "jitty")]
#[test_case(RewriteStrategy::Jitty, true ; "jitty cached")]
#[test_case(RewriteStrategy::JittyCompiling, false ; "compiling")]
#[test_case(RewriteStrategy::JittyCompiling, true ; "compiling cached")]
fn test_simple_choice(rewrite_strategy: RewriteStrategy, cached: bool) {
    let result = explore_text(
        SIMPLE_CHOICE,
        ExploreOptions {
            rewrite_strategy,
            cached,
            ..Default::default()
        },
    );

    assert_eq!(result.status, ExploreStatus::Completed);
    assert_eq!(result.lts.num_of_states(), 2);
    assert_eq!(
        transitions(&result),
        vec![
            (0, "a(d1)".to_string(), 0),
            (0, "a(d1)".to_string(), 1),
            (1, "a(d2)".to_string(), 0),
            (1, "a(d2)".to_string(), 1),
        ]
    );
}

#[test]
fn test_unreachable_tau() {
    let result = explore_text("init (true -> delta <> delta) . tau;", ExploreOptions::default());

    assert_eq!(result.lts.num_of_states(), 1);
    assert_eq!(result.lts.num_of_transitions(), 0);
}

#[test]
fn test_where_clause_in_condition() {
    let result = explore_text(
        indoc! {"
            act a: Bool;

            map is_null: List(Bool) -> Bool;

            var L: List(Bool);
            eqn (n > 0 whr n = #L end) -> is_null(L) = false;
                (n == 0 whr n = #L end) -> is_null(L) = true;

            proc X(L: List(Bool)) = a(is_null(L)) . X([true]);
            init X([]);
        "},
        ExploreOptions::default(),
    );

    assert_eq!(
        aut(&result),
        indoc! {r#"
            des (0,2,2)
            (0,"a(true)",1)
            (1,"a(false)",1)
        "#}
    );
}

#[test]
fn test_nondeterminism_detection() {
    let result = explore_text(
        indoc! {"
            act a;
            proc P = a . P + a . delta;
            init P;
        "},
        ExploreOptions {
            detect_nondeterminism: true,
            ..Default::default()
        },
    );

    assert_eq!(result.lts.num_of_states(), 2);
    assert_eq!(result.lts.num_of_transitions(), 2);
    assert!(transitions(&result).iter().all(|(from, label, _)| *from == 0 && label == "a"));
    assert_eq!(result.nondeterministic_states, vec![0]);
}

#[test]
fn test_deadlock_detection() {
    let result = explore_text(
        indoc! {"
            act a;
            proc P = a . delta;
            init P;
        "},
        ExploreOptions {
            detect_deadlock: true,
            ..Default::default()
        },
    );

    assert_eq!(result.lts.num_of_states(), 2);
    assert_eq!(transitions(&result), vec![(0, "a".to_string(), 1)]);
    assert_eq!(result.deadlocks, vec![1]);
}

#[test]
fn test_structured_sort_expansion() {
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
    );

    let names: Vec<&str> = lps.parameters.iter().map(|parameter| parameter.name()).collect();
    assert_eq!(names, vec!["i", "b"]);

    let result = explore(&lps, ExploreOptions::default()).unwrap();
    assert_eq!(result.lts.num_of_states(), 1);
    assert_eq!(result.states, Some(vec![vec![int(0), true_()]]));
}

#[test]
fn test_max_states() {
    let result = explore_text(
        COUNTER,
        ExploreOptions {
            max_states: 5,
            ..Default::default()
        },
    );

    assert_eq!(result.status, ExploreStatus::MaxStatesReached);
    assert_eq!(result.lts.num_of_states(), 5);
    assert_eq!(result.lts.num_of_transitions(), 4);
    assert_eq!(transitions(&result)[3], (3, "a(3)".to_string(), 4));
}

#[test]
fn test_todo_max() {
    let result = explore_text(
        SIMPLE_CHOICE,
        ExploreOptions {
            todo_max: 0,
            ..Default::default()
        },
    );

    // The second state is numbered, but never explored.
    assert_eq!(result.lts.num_of_states(), 2);
    assert_eq!(result.lts.num_of_transitions(), 2);
}

#[test]
fn test_abort() {
    let lps = linearize_text(COUNTER, &LinearizeOptions::default());
    let mut explorer = Explorer::new(&lps, ExploreOptions::default()).unwrap();

    explorer.abort();
    let result = explorer.explore().unwrap();

    assert_eq!(result.status, ExploreStatus::Aborted);
    assert_eq!(result.lts.num_of_states(), 1);
    assert_eq!(result.lts.num_of_transitions(), 0);
}

#[test]
fn test_levels() {
    let result = explore_text(
        indoc! {"
            act a, b;
            proc P(n: Nat) = (n < 2) -> (a . P(n + 1) + b . P(n + 1));
            init P(0);
        "},
        ExploreOptions::default(),
    );

    assert_eq!(result.lts.num_of_states(), 3);
    assert_eq!(result.levels.len(), 3);
    assert_eq!(result.levels[0].transitions, 2);
    assert_eq!(result.levels[1].new_states, 1);
    assert_eq!(result.levels[2].transitions, 0);
}

const GRID: &str = indoc! {"
    act a, b;
    proc P(x: Nat, y: Nat) = (x < 2) -> a . P(x + 1, y) + (y < 2) -> b . P(x, y + 1);
    init P(0, 0);
"};

#[test]
fn test_equal_states_share_an_index() {
    let result = explore_text(GRID, ExploreOptions::default());

    // P(1, 1) is reached through both a . b and b . a.
    assert_eq!(result.lts.num_of_states(), 9);
    assert_eq!(result.lts.num_of_transitions(), 12);

    let states = result.states.unwrap();
    for (index, state) in states.iter().enumerate() {
        assert_eq!(states.iter().position(|other| other == state), Some(index));
    }
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_exploration_is_deterministic(rewrite_strategy: RewriteStrategy) {
    let lps = linearize_text(GRID, &LinearizeOptions::default());
    let options = |cached| ExploreOptions {
        rewrite_strategy,
        cached,
        ..Default::default()
    };

    let first = explore(&lps, options(false)).unwrap();
    let second = explore(&lps, options(false)).unwrap();
    let cached = explore(&lps, options(true)).unwrap();

    assert_eq!(transitions(&first), transitions(&second));
    assert_eq!(transitions(&first), transitions(&cached));
    assert_eq!(first.states, second.states);
    assert_eq!(first.states, cached.states);
}

#[test_case(RewriteStrategy::Jitty ; "jitty")]
#[test_case(RewriteStrategy::JittyCompiling ; "compiling")]
fn test_integer_arithmetic(rewrite_strategy: RewriteStrategy) {
    let result = explore_text(
        indoc! {"
            act a: Int;
            proc P(n: Nat) = (n < 2) -> a(n - 5) . P(n + 2);
            init P(0);
        "},
        ExploreOptions {
            rewrite_strategy,
            ..Default::default()
        },
    );

    assert_eq!(transitions(&result), vec![(0, "a(-5)".to_string(), 1)]);
}

#[test_case(true, 1 ; "dummy")]
#[test_case(false, 2 ; "no dummy")]
fn test_global_variables(dummy: bool, num_of_states: usize) {
    let result = explore_text(
        indoc! {"
            act a: Bool;
            glob g: Bool;
            proc P(b: Bool) = a(b) . P(g);
            init P(true);
        "},
        ExploreOptions {
            dummy,
            ..Default::default()
        },
    );

    assert_eq!(result.lts.num_of_states(), num_of_states);
}

#[test]
fn test_non_boolean_condition() {
    let lps = linearize_text(
        indoc! {"
            act a;
            map f: Nat -> Bool;
            proc P(n: Nat) = f(n) -> a . P(n + 1);
            init P(0);
        "},
        &LinearizeOptions::default(),
    );

    let error = explore(&lps, ExploreOptions::default()).unwrap_err();
    assert!(matches!(error.error, Mcrl2Error::NonBooleanCondition(_)), "{error}");
    assert_eq!(error.partial.lts.num_of_states(), 1);
}

#[test]
fn test_enumeration_diverges() {
    let lps = linearize_text(
        indoc! {"
            act a: Nat;
            proc P = sum n: Nat. a(n) . P;
            init P;
        "},
        &LinearizeOptions::default(),
    );

    let error = explore(&lps, ExploreOptions::default()).unwrap_err();
    assert!(matches!(error.error, Mcrl2Error::EnumerationDiverges(_)), "{error}");
}

#[test]
fn test_unused_data() {
    let options = ExploreOptions {
        unused_data: true,
        ..Default::default()
    };

    let result = explore_text(SIMPLE_CHOICE, options);
    assert_eq!(result.lts.num_of_transitions(), 4);
}
