//!
//! The textual front end of the mCRL2 specification language. The grammar is
//! defined in `mcrl2_grammar.pest`, operator precedence is resolved by Pratt
//! parsers, and the result is an untyped syntax tree that is elaborated by the
//! type checker.
//!

use std::fmt;

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

mod consume;
mod display;
mod precedence;
mod syntax_tree;

pub use precedence::*;
pub use syntax_tree::*;

#[derive(Parser)]
#[grammar = "mcrl2_grammar.pest"]
pub struct Mcrl2Parser;

/// The error returned by the parser, it contains the line and column of the problem.
pub type ParseError = Box<pest::error::Error<Rule>>;

/// Parses a complete mCRL2 specification.
pub fn parse_specification(input: &str) -> Result<UntypedProcessSpecification, ParseError> {
    let mut pairs = Mcrl2Parser::parse(Rule::MCRL2Spec, input)?;
    match pairs.next() {
        Some(spec) => Ok(consume::parse_mcrl2_spec(spec)),
        None => Ok(UntypedProcessSpecification::default()),
    }
}

/// Parses a single data expression.
pub fn parse_data_expression(input: &str) -> Result<DataExpr, ParseError> {
    let pair = parse_single(Rule::DataExprSpec, input)?;
    Ok(consume::parse_data_expr(pair.into_inner()))
}

/// Parses a single sort expression.
pub fn parse_sort_expression(input: &str) -> Result<SortExpression, ParseError> {
    let pair = parse_single(Rule::SortExprSpec, input)?;
    Ok(consume::parse_sort_expr(pair.into_inner()))
}

/// Parses a single process expression.
pub fn parse_process_expression(input: &str) -> Result<ProcessExpr, ParseError> {
    let pair = parse_single(Rule::ProcExprSpec, input)?;
    Ok(consume::parse_proc_expr(pair.into_inner()))
}

/// Parses the input with the given entry rule and returns the expression inside it.
fn parse_single(rule: Rule, input: &str) -> Result<Pair<'_, Rule>, ParseError> {
    let spec = Mcrl2Parser::parse(rule, input)?.next();

    // The entry rules are SOI ~ expression ~ EOI.
    match spec.and_then(|spec| spec.into_inner().next()) {
        Some(expression) => Ok(expression),
        None => Err(Box::new(pest::error::Error::new_from_pos(
            pest::error::ErrorVariant::CustomError {
                message: "expected an expression".to_string(),
            },
            pest::Position::from_start(input),
        ))),
    }
}

/// Prints a pest parse tree, with one pair per line indented by its depth.
pub struct DisplayPair<'i>(pub Pair<'i, Rule>);

impl fmt::Display for DisplayPair<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(f, 0)
    }
}

impl DisplayPair<'_> {
    fn display(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let span = self.0.clone().as_span();
        let rule = self.0.as_rule();
        let inner = self.0.clone().into_inner();
        let indent = "  ".repeat(depth);

        let children: Vec<_> = inner.map(DisplayPair).collect();
        if children.is_empty() {
            writeln!(f, "{}{:?}: {:?}", indent, rule, span.as_str())
        } else {
            writeln!(f, "{}{:?}", indent, rule)?;
            for child in children {
                child.display(f, depth + 1)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use test_case::test_case;
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_ifthen() {
        let spec = parse_specification("init a -> b -> c <> delta;").unwrap();

        // The else branch belongs to the innermost condition.
        let ProcessExpr::Condition { then, else_: None, .. } = spec.init.unwrap() else {
            panic!("Expected a condition without else branch");
        };
        assert!(matches!(*then, ProcessExpr::Condition { else_: Some(_), .. }));
    }

    #[test]
    fn test_parse_keywords() {
        let spec = parse_specification("map or : Boolean # Boolean -> Boolean ;").unwrap();

        let map = &spec.data_specification.map_declarations[0];
        assert_eq!(map.identifier, "or");
        assert_eq!(format!("{}", map.sort), "(Boolean # Boolean -> Boolean)");
    }

    #[test]
    fn test_parse_sort_spec() {
        let sort_spec = indoc! {"
            sort D = Bool -> Int -> Bool;


            % Test
            F     = struct d1 | d2;
            Error = struct e;
            S = struct c(i: Int, b: Bool)?is_c;
        "};

        let spec = parse_specification(sort_spec).unwrap();
        let sorts = &spec.data_specification.sort_declarations;
        assert_eq!(sorts.len(), 4);
        assert_eq!(format!("{}", sorts[0].expr.as_ref().unwrap()), "(Bool -> (Int -> Bool))");
        assert_eq!(format!("{}", sorts[3].expr.as_ref().unwrap()), "struct c(i: Int, b: Bool)?is_c");
    }

    #[test]
    fn test_parse_abp() {
        let abp_spec = indoc! {"
            % This file contains the alternating bit protocol, as described
            % J.F. Groote and M.R. Mousavi. Modeling and analysis of communicating
            % systems. The MIT Press, 2014.

            sort
            D     = struct d1 | d2;
            Error = struct e;

            act
            r1,s4: D;
            s2,r2,c2: D # Bool;
            s3,r3,c3: D # Bool;
            s3,r3,c3: Error;
            s5,r5,c5: Bool;
            s6,r6,c6: Bool;
            s6,r6,c6: Error;
            i;

            proc
            S(b:Bool)     = sum d:D. r1(d).T(d,b);
            T(d:D,b:Bool) = s2(d,b).(r6(b).S(!b)+(r6(!b)+r6(e)).T(d,b));

            R(b:Bool)     = sum d:D. r3(d,b).s4(d).s5(b).R(!b)+
                            (sum d:D.r3(d,!b)+r3(e)).s5(!b).R(b);

            K             = sum d:D,b:Bool. r2(d,b).(i.s3(d,b)+i.s3(e)).K;

            L             = sum b:Bool. r5(b).(i.s6(b)+i.s6(e)).L;

            init
            allow({r1,s4,c2,c3,c5,c6,i},
                comm({r2|s2->c2, r3|s3->c3, r5|s5->c5, r6|s6->c6},
                    S(true) || K || L || R(true)
                )
            );
        "};

        let spec = parse_specification(abp_spec).unwrap();
        assert_eq!(spec.action_declarations.len(), 21);
        assert_eq!(spec.process_declarations.len(), 5);
        assert!(matches!(spec.init, Some(ProcessExpr::Allow { .. })));
    }

    #[test]
    fn test_parse_equations() {
        let spec = parse_specification(indoc! {"
            map is_null: List(Bool) -> Bool;
            var L: List(Bool);
                n: Nat;
            eqn (n > 0 whr n = #L end) -> is_null(L) = false;
                is_null([]) = true;
        "})
        .unwrap();

        let equations = &spec.data_specification.equation_declarations[0];
        assert_eq!(equations.variables.len(), 2);
        assert_eq!(equations.equations.len(), 2);
        assert_eq!(
            format!("{}", equations.equations[0].condition.as_ref().unwrap()),
            "(n > 0) whr n = #L end"
        );
    }

    #[test_case("a && b || c", "(a && b) || c" ; "conjunction binds stronger")]
    #[test_case("x + y * 2 == 3", "(x + (y * 2)) == 3" ; "arithmetic")]
    #[test_case("forall x: Nat. x < 3 => true", "forall x: Nat. (x < 3) => true" ; "quantifier extends right")]
    #[test_case("1 |> [2, 3] ++ []", "1 |> ([2, 3] ++ [])" ; "lists")]
    #[test_case("f[1 -> true](2)", "f[1 -> true](2)" ; "function update")]
    #[test_case("{ x: Nat | x < 2 }", "{ x: Nat | x < 2 }" ; "comprehension")]
    #[test_case("{a: 2, b: 1}", "{a: 2, b: 1}" ; "bag enumeration")]
    #[test_case("-x - 1", "(-x) - 1" ; "minus")]
    fn test_parse_data_expression(input: &str, expected: &str) {
        let expr = parse_data_expression(input).unwrap();
        assert_eq!(format!("{}", expr), expected);
    }

    #[test_case("a.b + c", "((a . b) + c)" ; "sequence binds stronger than choice")]
    #[test_case("sum d: D. a(d) + b", "((sum d: D. a(d)) + b)" ; "sum binds stronger than choice")]
    #[test_case("(true -> delta <> delta) . tau", "((true -> delta <> delta) . tau)" ; "if then else")]
    #[test_case("c -> a . P", "(c -> (a . P))" ; "condition")]
    #[test_case("P(x = 1, y = true)", "P(x = 1, y = true)" ; "assignments")]
    #[test_case("a | b . c", "((a | b) . c)" ; "multi action")]
    fn test_parse_process_expression(input: &str, expected: &str) {
        let expr = parse_process_expression(input).unwrap();
        assert_eq!(format!("{}", expr), expected);
    }

    #[test]
    fn test_parse_sort_expression() {
        assert_eq!(
            parse_sort_expression("Nat # List(Bool) -> Set(Int)").unwrap(),
            SortExpression::Function {
                domain: vec![
                    SortExpression::Simple(Sort::Nat),
                    SortExpression::Complex(ComplexSort::List, Box::new(SortExpression::Simple(Sort::Bool)))
                ],
                codomain: Box::new(SortExpression::Complex(
                    ComplexSort::Set,
                    Box::new(SortExpression::Simple(Sort::Int))
                )),
            }
        );
    }

    #[test]
    fn test_syntax_error() {
        let error = parse_specification("proc P = a.;").unwrap_err();
        assert!(format!("{}", error).contains("1:"), "The error contains a position");
    }

    #[test]
    fn test_display_pair() {
        let mut pairs = Mcrl2Parser::parse(Rule::DataExprSpec, "f(x)").unwrap();
        let text = format!("{}", DisplayPair(pairs.next().unwrap()));
        assert!(text.contains("DataExprApplication"));
    }
}
