use std::env;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use indoc::indoc;
use test_case::test_case;
use test_log::test;

use mcrl2::typecheck::TypeCheckOptions;
use mcrl2rust_io::io_lps::write_lps;
use mcrl2rust_process::linearize;
use mcrl2rust_process::parse_process_specification;
use mcrl2rust_process::LinearizeOptions;
use mcrl3explore::run;
use mcrl3explore::Cli;

/// Returns a path in the temporary directory that is unique for this test process.
fn temporary_file(name: &str) -> PathBuf {
    env::temp_dir().join(format!("mcrl3explore_{}_{name}", std::process::id()))
}

fn command_line(input: &Path, output: &Path, arguments: &[&str]) -> Vec<String> {
    let mut result = vec![
        "mcrl3explore".to_string(),
        input.display().to_string(),
        output.display().to_string(),
    ];
    result.extend(arguments.iter().map(|argument| argument.to_string()));
    result
}

/// Writes the specification to a file and explores it with the given extra
/// arguments, returns the exit code and the contents of the output file.
fn explore_specification(name: &str, text: &str, arguments: &[&str]) -> (ExitCode, String) {
    let input = temporary_file(&format!("{name}.mcrl2"));
    let output = temporary_file(&format!("{name}.aut"));
    fs::write(&input, text).unwrap();

    let cli = Cli::parse_from(command_line(&input, &output, arguments));
    let code = run(&cli, Arc::new(AtomicBool::new(false))).unwrap();
    let result = fs::read_to_string(&output).unwrap();

    fs::remove_file(input).unwrap();
    fs::remove_file(output).unwrap();
    (code, result)
}

#[test_case("jitty" ; "jitty")]
#[test_case("jitty-compiling" ; "compiling")]
fn test_simple_choice(rewriter: &str) {
    let (code, aut) = explore_specification(
        &format!("simple_choice_{rewriter}"),
        indoc! {"
            sort D = struct d1 | d2;
            act a: D;
            proc P(e: D) = sum d: D. a(e) . P(d);
            init P(d1);
        "},
        &["--rewriter", rewriter, "--cached"],
    );

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(
        aut,
        indoc! {r#"
            des (0,4,2)
            (0,"a(d1)",0)
            (0,"a(d1)",1)
            (1,"a(d2)",0)
            (1,"a(d2)",1)
        "#}
    );
}

#[test]
fn test_unreachable_tau() {
    let (_, aut) = explore_specification("unreachable_tau", "init (true -> delta <> delta) . tau;", &[]);
    assert_eq!(aut, "des (0,0,1)\n");
}

#[test]
fn test_where_clause_in_condition() {
    let (_, aut) = explore_specification(
        "where_clause",
        indoc! {"
            act a: Bool;

            map is_null: List(Bool) -> Bool;

            var L: List(Bool);
            eqn (n > 0 whr n = #L end) -> is_null(L) = false;
                (n == 0 whr n = #L end) -> is_null(L) = true;

            proc X(L: List(Bool)) = a(is_null(L)) . X([true]);
            init X([]);
        "},
        &[],
    );

    assert_eq!(
        aut,
        indoc! {r#"
            des (0,2,2)
            (0,"a(true)",1)
            (1,"a(false)",1)
        "#}
    );
}

#[test]
fn test_nondeterminism() {
    let (code, aut) = explore_specification(
        "nondeterminism",
        indoc! {"
            act a;
            proc P = a . P + a . delta;
            init P;
        "},
        &["--nondeterminism"],
    );

    assert_eq!(code, ExitCode::SUCCESS);
    assert!(aut.starts_with("des (0,2,2)\n"), "{aut}");
}

#[test]
fn test_deadlock() {
    let (code, aut) = explore_specification(
        "deadlock",
        indoc! {"
            act a;
            proc P = a . delta;
            init P;
        "},
        &["--deadlock"],
    );

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(aut, "des (0,1,2)\n(0,\"a\",1)\n");
}

#[test]
fn test_structured_sort_expansion() {
    let spec = parse_process_specification(
        indoc! {"
            sort S = struct c(i: Int, b: Bool);
            proc P(s: S) = delta;
            init P(c(0, true));
        "},
        &TypeCheckOptions::default(),
    )
    .unwrap();
    let lps = linearize(
        &spec,
        &LinearizeOptions {
            expand_structured_sorts: true,
            ..Default::default()
        },
    )
    .unwrap();

    let input = temporary_file("expansion.lps");
    let output = temporary_file("expansion.fsm");
    write_lps(File::create(&input).unwrap(), &lps).unwrap();

    let cli = Cli::parse_from(command_line(&input, &output, &[]));
    assert_eq!(run(&cli, Arc::new(AtomicBool::new(false))).unwrap(), ExitCode::SUCCESS);

    let fsm = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = fsm.lines().collect();
    assert!(lines[0].starts_with("i(1) Int"), "{fsm}");
    assert_eq!(lines[1], "b(1) Bool \"true\"");
    assert_eq!(&lines[2..], &["---", "0 0", "---"]);

    fs::remove_file(input).unwrap();
    fs::remove_file(output).unwrap();
}

#[test]
fn test_max_states() {
    let (code, aut) = explore_specification(
        "max_states",
        indoc! {"
            act a: Nat;
            proc P(n: Nat) = a(n) . P(n + 1);
            init P(0);
        "},
        &["--max", "3"],
    );

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(aut, "des (0,2,3)\n(0,\"a(0)\",1)\n(1,\"a(1)\",2)\n");
}

#[test]
fn test_aborted_exploration_fails() {
    let input = temporary_file("aborted.mcrl2");
    let output = temporary_file("aborted.aut");
    fs::write(&input, "act a; proc P = a . P; init P;").unwrap();

    let cli = Cli::parse_from(command_line(&input, &output, &[]));
    let code = run(&cli, Arc::new(AtomicBool::new(true))).unwrap();

    assert_eq!(code, ExitCode::FAILURE);
    assert_eq!(fs::read_to_string(&output).unwrap(), "des (0,0,1)\n");

    fs::remove_file(input).unwrap();
    fs::remove_file(output).unwrap();
}

#[test]
fn test_partial_output_on_error() {
    let input = temporary_file("error.mcrl2");
    let output = temporary_file("error.dot");
    fs::write(
        &input,
        indoc! {"
            act a;
            map f: Nat -> Bool;
            proc P(n: Nat) = f(n) -> a . P(n + 1);
            init P(0);
        "},
    )
    .unwrap();

    let cli = Cli::parse_from(command_line(&input, &output, &[]));
    assert!(run(&cli, Arc::new(AtomicBool::new(false))).is_err());

    let dot = fs::read_to_string(&output).unwrap();
    assert!(dot.starts_with("digraph \"lts\" {"), "{dot}");
    assert!(dot.contains("s0 [ label=\"(0)\", peripheries=2 ];"), "{dot}");

    fs::remove_file(input).unwrap();
    fs::remove_file(output).unwrap();
}

#[test]
fn test_unknown_output_format() {
    let cli = Cli::parse_from(["mcrl3explore", "input.mcrl2", "output.txt"]);
    assert!(cli.output_format().is_err());

    let cli = Cli::parse_from(["mcrl3explore", "input.mcrl2", "output.txt", "--out", "aut"]);
    assert!(cli.output_format().unwrap().is_some());
}
