use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

use mcrl2::data::DataExpression;
use mcrl2::data::DataSpecification;
use mcrl2::data::SortExpression;
use mcrl2::typecheck::typecheck_data_expression;
use mcrl2::typecheck::typecheck_data_specification;
use mcrl2::typecheck::TypeCheckOptions;
use mcrl2_syntax::parse_data_expression;
use mcrl2_syntax::parse_specification;
use mcrl2rust_sabre::create_rewriter;
use mcrl2rust_sabre::RewriteStrategy;
use mcrl2rust_sabre::UsedEquationSelector;

const SPECIFICATION: &str = "
sort L = List(Pos);
map fib: Nat -> Nat;
var n: Nat;
eqn fib(0) = 0;
    fib(1) = 1;
    (n > 1) -> fib(n) = fib(Int2Nat(n - 1)) + fib(Int2Nat(n - 2));
";

/// Type checks the specification and the expressions of a benchmark case.
fn load_case(spec_text: &str, expressions: &[&str]) -> (DataSpecification, Vec<DataExpression>) {
    let spec = typecheck_data_specification(
        &parse_specification(spec_text).unwrap().data_specification,
        &TypeCheckOptions::default(),
    )
    .unwrap();

    let expressions = expressions
        .iter()
        .map(|text| {
            typecheck_data_expression(&spec, &parse_data_expression(text).unwrap(), &[], &SortExpression::untyped()).unwrap()
        })
        .collect();
    (spec, expressions)
}

pub fn criterion_benchmark_jitty(c: &mut Criterion) {
    let (spec, expressions) = load_case(SPECIFICATION, &["fib(15)", "exp(2, 10) * 1000 div 7", "#[1, 2, 3, 4, 5, 6, 7, 8]"]);

    for strategy in [RewriteStrategy::Jitty, RewriteStrategy::JittyCompiling] {
        let mut rewriter = create_rewriter(&spec, strategy, &UsedEquationSelector::all());

        for (index, expression) in expressions.iter().enumerate() {
            c.bench_function(&format!("{strategy} expression {index}"), |bencher| {
                bencher.iter(|| {
                    let _ = black_box(rewriter.rewrite(expression));
                })
            });
        }
    }
}

criterion_group!(benches, criterion_benchmark_jitty);
criterion_main!(benches);
