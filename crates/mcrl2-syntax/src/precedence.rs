use std::sync::LazyLock;

use pest::pratt_parser::Assoc::*;
use pest::pratt_parser::Op;
use pest::pratt_parser::PrattParser;

use crate::Rule;

// Precedence is defined lowest to highest in all parsers below.

/// The operators of sort expressions, the product binds stronger than the function arrow.
pub static SORT_EXPR_PRATT_PARSER: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::SortExprFunction, Right))
        .op(Op::infix(Rule::SortExprProduct, Left))
});

/// The operators of data expressions.
pub static DATA_EXPR_PRATT_PARSER: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::postfix(Rule::DataExprWhr))
        .op(Op::prefix(Rule::DataExprForall) | Op::prefix(Rule::DataExprExists) | Op::prefix(Rule::DataExprLambda))
        .op(Op::infix(Rule::DataExprImplies, Right))
        .op(Op::infix(Rule::DataExprDisj, Right))
        .op(Op::infix(Rule::DataExprConj, Right))
        .op(Op::infix(Rule::DataExprEq, Left) | Op::infix(Rule::DataExprNeq, Left))
        .op(Op::infix(Rule::DataExprLt, Left)
            | Op::infix(Rule::DataExprLeq, Left)
            | Op::infix(Rule::DataExprGt, Left)
            | Op::infix(Rule::DataExprGeq, Left)
            | Op::infix(Rule::DataExprIn, Left))
        .op(Op::infix(Rule::DataExprCons, Right))
        .op(Op::infix(Rule::DataExprSnoc, Left))
        .op(Op::infix(Rule::DataExprConcat, Left))
        .op(Op::infix(Rule::DataExprAdd, Left) | Op::infix(Rule::DataExprSubtract, Left))
        .op(Op::infix(Rule::DataExprDiv, Left)
            | Op::infix(Rule::DataExprIntDiv, Left)
            | Op::infix(Rule::DataExprMod, Left)
            | Op::infix(Rule::DataExprMult, Left))
        .op(Op::infix(Rule::DataExprAt, Left))
        .op(Op::prefix(Rule::DataExprNegation) | Op::prefix(Rule::DataExprMinus) | Op::prefix(Rule::DataExprSize))
        .op(Op::postfix(Rule::DataExprApplication) | Op::postfix(Rule::DataExprUpdate))
});

/// The operators of process expressions.
pub static PROC_EXPR_PRATT_PARSER: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::ProcExprChoice, Left))
        .op(Op::prefix(Rule::ProcExprSum))
        .op(Op::infix(Rule::ProcExprParallel, Right))
        .op(Op::infix(Rule::ProcExprLeftMerge, Right))
        .op(Op::prefix(Rule::ProcExprIfThen) | Op::prefix(Rule::ProcExprIfThenElse))
        .op(Op::infix(Rule::ProcExprUntil, Left))
        .op(Op::infix(Rule::ProcExprSeq, Right))
        .op(Op::postfix(Rule::ProcExprAt))
        .op(Op::infix(Rule::ProcExprSync, Left))
});
