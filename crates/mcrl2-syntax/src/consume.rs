//! Conversion of the pest parse tree into the untyped syntax tree.
//!
//! The grammar already guarantees the shape of every pair, so these
//! functions only dispatch on the rules that can occur at each position.

use pest::iterators::Pair;
use pest::iterators::Pairs;

use crate::precedence::DATA_EXPR_PRATT_PARSER;
use crate::precedence::PROC_EXPR_PRATT_PARSER;
use crate::precedence::SORT_EXPR_PRATT_PARSER;
use crate::syntax_tree::*;
use crate::Rule;

/// Returns true iff the pair is one of the keyword tokens.
fn is_keyword(pair: &Pair<Rule>) -> bool {
    matches!(
        pair.as_rule(),
        Rule::KwSort
            | Rule::KwCons
            | Rule::KwMap
            | Rule::KwGlob
            | Rule::KwVar
            | Rule::KwEqn
            | Rule::KwAct
            | Rule::KwProc
            | Rule::KwInit
            | Rule::KwStruct
            | Rule::KwWhr
            | Rule::KwEnd
            | Rule::KwLambda
            | Rule::KwForall
            | Rule::KwExists
            | Rule::KwSum
            | Rule::KwBlock
            | Rule::KwAllow
            | Rule::KwHide
            | Rule::KwRename
            | Rule::KwComm
    )
}

/// Returns the inner pairs without the keywords.
fn children(pair: Pair<Rule>) -> impl Iterator<Item = Pair<Rule>> {
    pair.into_inner().filter(|pair| !is_keyword(pair))
}

/// Returns the only child with the given rule.
fn child(pair: Pair<Rule>, rule: Rule) -> Pair<Rule> {
    let text = pair.as_str();
    match children(pair).find(|pair| pair.as_rule() == rule) {
        Some(result) => result,
        None => unreachable!("The grammar guarantees a {:?} in {}", rule, text),
    }
}

pub(crate) fn parse_mcrl2_spec(pair: Pair<Rule>) -> UntypedProcessSpecification {
    let mut result = UntypedProcessSpecification::default();

    for element in pair.into_inner() {
        match element.as_rule() {
            Rule::SortSpec => {
                for decl in children(element) {
                    let span = decl.as_span().into();
                    match decl.as_rule() {
                        Rule::SortDeclAlias => {
                            let mut inner = decl.into_inner();
                            let identifier = next_id(&mut inner);
                            let expr = inner.next().map(|sort| parse_sort_expr(sort.into_inner()));
                            result.data_specification.sort_declarations.push(SortDecl {
                                identifier,
                                expr,
                                span,
                            });
                        }
                        Rule::SortDeclIds => {
                            for identifier in parse_id_list(child(decl, Rule::IdList)) {
                                result.data_specification.sort_declarations.push(SortDecl {
                                    identifier,
                                    expr: None,
                                    span,
                                });
                            }
                        }
                        rule => unreachable!("Unexpected sort declaration {:?}", rule),
                    }
                }
            }
            Rule::ConsSpec => {
                for decl in children(element) {
                    result
                        .data_specification
                        .constructor_declarations
                        .extend(parse_ids_decl(decl));
                }
            }
            Rule::MapSpec => {
                for decl in children(element) {
                    result.data_specification.map_declarations.extend(parse_ids_decl(decl));
                }
            }
            Rule::GlobVarSpec => {
                for decl in children(element) {
                    result.global_variables.extend(parse_vars_decl_list(decl));
                }
            }
            Rule::EqnSpec => {
                let mut variables = Vec::new();
                let mut equations = Vec::new();

                for decl in children(element) {
                    match decl.as_rule() {
                        Rule::VarSpec => {
                            for list in children(decl) {
                                variables.extend(parse_vars_decl_list(list));
                            }
                        }
                        Rule::EqnDecl => equations.push(parse_eqn_decl(decl)),
                        rule => unreachable!("Unexpected equation section element {:?}", rule),
                    }
                }

                result
                    .data_specification
                    .equation_declarations
                    .push(EqnSpec { variables, equations });
            }
            Rule::ActSpec => {
                for decl in children(element) {
                    let span: Span = decl.as_span().into();
                    let mut inner = decl.into_inner();

                    let identifiers = inner.next().map(parse_id_list).unwrap_or_default();
                    let args = match inner.next() {
                        Some(sort) => match parse_sort_expr(sort.into_inner()) {
                            SortExpression::Product(sorts) => sorts,
                            sort => vec![sort],
                        },
                        None => Vec::new(),
                    };

                    for identifier in identifiers {
                        result.action_declarations.push(ActDecl {
                            identifier,
                            args: args.clone(),
                            span,
                        });
                    }
                }
            }
            Rule::ProcSpec => {
                for decl in children(element) {
                    let span = decl.as_span().into();
                    let mut identifier = String::new();
                    let mut params = Vec::new();
                    let mut body = ProcessExpr::Delta;

                    for part in decl.into_inner() {
                        match part.as_rule() {
                            Rule::Id => identifier = part.as_str().to_string(),
                            Rule::VarsDeclList => params = parse_vars_decl_list(part),
                            Rule::ProcExpr => body = parse_proc_expr(part.into_inner()),
                            rule => unreachable!("Unexpected process declaration element {:?}", rule),
                        }
                    }

                    result.process_declarations.push(ProcDecl {
                        identifier,
                        params,
                        body,
                        span,
                    });
                }
            }
            Rule::Init => {
                result.init = Some(parse_proc_expr(child(element, Rule::ProcExpr).into_inner()));
            }
            Rule::EOI => (),
            rule => unreachable!("Unexpected specification element {:?}", rule),
        }
    }

    result
}

fn next_id(pairs: &mut Pairs<Rule>) -> String {
    match pairs.next() {
        Some(pair) => pair.as_str().to_string(),
        None => unreachable!("The grammar guarantees an identifier"),
    }
}

fn parse_id_list(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner().map(|id| id.as_str().to_string()).collect()
}

/// Parses `a, b: S` into a declaration for every identifier.
fn parse_ids_decl(pair: Pair<Rule>) -> Vec<IdDecl> {
    let span: Span = pair.as_span().into();
    let mut inner = pair.into_inner();
    let identifiers = inner.next().map(parse_id_list).unwrap_or_default();
    let sort = match inner.next() {
        Some(sort) => parse_sort_expr(sort.into_inner()),
        None => unreachable!("The grammar guarantees a sort"),
    };

    identifiers
        .into_iter()
        .map(|identifier| IdDecl {
            identifier,
            sort: sort.clone(),
            span,
        })
        .collect()
}

pub(crate) fn parse_vars_decl_list(pair: Pair<Rule>) -> Vec<VarDecl> {
    let mut result = Vec::new();

    for decl in pair.into_inner() {
        let span: Span = decl.as_span().into();
        let mut inner = decl.into_inner();
        let identifiers = inner.next().map(parse_id_list).unwrap_or_default();
        let sort = match inner.next() {
            Some(sort) => parse_sort_expr(sort.into_inner()),
            None => unreachable!("The grammar guarantees a sort"),
        };

        for identifier in identifiers {
            result.push(VarDecl {
                identifier,
                sort: sort.clone(),
                span,
            });
        }
    }

    result
}

fn parse_var_decl(pair: Pair<Rule>) -> VarDecl {
    let span = pair.as_span().into();
    let mut inner = pair.into_inner();
    let identifier = next_id(&mut inner);
    let sort = match inner.next() {
        Some(sort) => parse_sort_expr(sort.into_inner()),
        None => unreachable!("The grammar guarantees a sort"),
    };

    VarDecl { identifier, sort, span }
}

fn parse_eqn_decl(pair: Pair<Rule>) -> EqnDecl {
    let span = pair.as_span().into();
    let mut expressions: Vec<DataExpr> = pair.into_inner().map(|expr| parse_data_expr(expr.into_inner())).collect();

    let rhs = expressions.pop();
    let lhs = expressions.pop();
    let condition = expressions.pop();

    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => EqnDecl {
            condition,
            lhs,
            rhs,
            span,
        },
        _ => unreachable!("The grammar guarantees both sides of an equation"),
    }
}

pub(crate) fn parse_sort_expr(pairs: Pairs<Rule>) -> SortExpression {
    SORT_EXPR_PRATT_PARSER
        .map_primary(|primary| match primary.as_rule() {
            Rule::SortExprBool => SortExpression::Simple(Sort::Bool),
            Rule::SortExprPos => SortExpression::Simple(Sort::Pos),
            Rule::SortExprNat => SortExpression::Simple(Sort::Nat),
            Rule::SortExprInt => SortExpression::Simple(Sort::Int),
            Rule::SortExprReal => SortExpression::Simple(Sort::Real),
            Rule::SortExprList => parse_complex_sort(ComplexSort::List, primary),
            Rule::SortExprSet => parse_complex_sort(ComplexSort::Set, primary),
            Rule::SortExprBag => parse_complex_sort(ComplexSort::Bag, primary),
            Rule::SortExprFSet => parse_complex_sort(ComplexSort::FSet, primary),
            Rule::SortExprFBag => parse_complex_sort(ComplexSort::FBag, primary),
            Rule::SortExprStruct => SortExpression::Struct {
                inner: children(primary).map(parse_constructor_decl).collect(),
            },
            Rule::Id => SortExpression::Reference(primary.as_str().to_string()),
            Rule::SortExpr => parse_sort_expr(primary.into_inner()),
            rule => unreachable!("Unexpected sort expression {:?}", rule),
        })
        .map_infix(|lhs, op, rhs| match op.as_rule() {
            Rule::SortExprProduct => {
                let mut sorts = match lhs {
                    SortExpression::Product(sorts) => sorts,
                    sort => vec![sort],
                };
                match rhs {
                    SortExpression::Product(rest) => sorts.extend(rest),
                    sort => sorts.push(sort),
                }
                SortExpression::Product(sorts)
            }
            Rule::SortExprFunction => SortExpression::Function {
                domain: match lhs {
                    SortExpression::Product(sorts) => sorts,
                    sort => vec![sort],
                },
                codomain: Box::new(rhs),
            },
            rule => unreachable!("Unexpected sort operator {:?}", rule),
        })
        .parse(pairs)
}

fn parse_complex_sort(kind: ComplexSort, pair: Pair<Rule>) -> SortExpression {
    SortExpression::Complex(kind, Box::new(parse_sort_expr(child(pair, Rule::SortExpr).into_inner())))
}

fn parse_constructor_decl(pair: Pair<Rule>) -> ConstructorDecl {
    let mut name = None;
    let mut args = Vec::new();
    let mut recogniser = None;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::Id if name.is_none() => name = Some(part.as_str().to_string()),
            Rule::Id => recogniser = Some(part.as_str().to_string()),
            Rule::ProjDecl => {
                let mut projection = None;
                let mut sort = None;
                for element in part.into_inner() {
                    match element.as_rule() {
                        Rule::Id => projection = Some(element.as_str().to_string()),
                        Rule::SortExpr => sort = Some(parse_sort_expr(element.into_inner())),
                        rule => unreachable!("Unexpected projection element {:?}", rule),
                    }
                }

                if let Some(sort) = sort {
                    args.push((projection, sort));
                }
            }
            rule => unreachable!("Unexpected constructor element {:?}", rule),
        }
    }

    ConstructorDecl {
        name: name.unwrap_or_default(),
        args,
        recogniser,
    }
}

pub(crate) fn parse_data_expr_list(pair: Pair<Rule>) -> Vec<DataExpr> {
    pair.into_inner().map(|expr| parse_data_expr(expr.into_inner())).collect()
}

fn parse_assignment(pair: Pair<Rule>) -> Assignment {
    let mut inner = pair.into_inner();
    let identifier = next_id(&mut inner);
    let expr = match inner.next() {
        Some(expr) => parse_data_expr(expr.into_inner()),
        None => unreachable!("The grammar guarantees an assigned expression"),
    };

    Assignment { identifier, expr }
}

pub(crate) fn parse_data_expr(pairs: Pairs<Rule>) -> DataExpr {
    DATA_EXPR_PRATT_PARSER
        .map_primary(|primary| match primary.as_rule() {
            Rule::DataExprTrue => DataExpr::Bool(true),
            Rule::DataExprFalse => DataExpr::Bool(false),
            Rule::Number => DataExpr::Number(primary.as_str().to_string()),
            Rule::Id => DataExpr::Id(primary.as_str().to_string()),
            Rule::DataExprEmptyList => DataExpr::EmptyList,
            Rule::DataExprEmptySet => DataExpr::EmptySet,
            Rule::DataExprEmptyBag => DataExpr::EmptyBag,
            Rule::DataExprListEnum => DataExpr::List(parse_data_expr_list(child(primary, Rule::DataExprList))),
            Rule::DataExprSetEnum => DataExpr::Set(parse_data_expr_list(child(primary, Rule::DataExprList))),
            Rule::DataExprBagEnum => DataExpr::Bag(
                primary
                    .into_inner()
                    .map(|element| {
                        let mut inner = element.into_inner().map(|expr| parse_data_expr(expr.into_inner()));
                        match (inner.next(), inner.next()) {
                            (Some(expr), Some(multiplicity)) => BagElement { expr, multiplicity },
                            _ => unreachable!("The grammar guarantees an element and a multiplicity"),
                        }
                    })
                    .collect(),
            ),
            Rule::DataExprSetBagComp => {
                let mut inner = primary.into_inner();
                match (inner.next(), inner.next()) {
                    (Some(variable), Some(predicate)) => DataExpr::SetBagComp {
                        variable: parse_var_decl(variable),
                        predicate: Box::new(parse_data_expr(predicate.into_inner())),
                    },
                    _ => unreachable!("The grammar guarantees a variable and a predicate"),
                }
            }
            Rule::DataExpr => parse_data_expr(primary.into_inner()),
            rule => unreachable!("Unexpected data expression {:?}", rule),
        })
        .map_prefix(|op, expr| match op.as_rule() {
            Rule::DataExprForall => DataExpr::Quantifier {
                op: Quantifier::Forall,
                variables: parse_vars_decl_list(child(op, Rule::VarsDeclList)),
                body: Box::new(expr),
            },
            Rule::DataExprExists => DataExpr::Quantifier {
                op: Quantifier::Exists,
                variables: parse_vars_decl_list(child(op, Rule::VarsDeclList)),
                body: Box::new(expr),
            },
            Rule::DataExprLambda => DataExpr::Lambda {
                variables: parse_vars_decl_list(child(op, Rule::VarsDeclList)),
                body: Box::new(expr),
            },
            Rule::DataExprNegation => DataExpr::Unary {
                op: DataExprUnaryOp::Negation,
                expr: Box::new(expr),
            },
            Rule::DataExprMinus => DataExpr::Unary {
                op: DataExprUnaryOp::Minus,
                expr: Box::new(expr),
            },
            Rule::DataExprSize => DataExpr::Unary {
                op: DataExprUnaryOp::Size,
                expr: Box::new(expr),
            },
            rule => unreachable!("Unexpected prefix operator {:?}", rule),
        })
        .map_postfix(|expr, op| match op.as_rule() {
            Rule::DataExprApplication => DataExpr::Application {
                function: Box::new(expr),
                arguments: parse_data_expr_list(child(op, Rule::DataExprList)),
            },
            Rule::DataExprUpdate => {
                let mut inner = op.into_inner().map(|expr| parse_data_expr(expr.into_inner()));
                match (inner.next(), inner.next()) {
                    (Some(argument), Some(update)) => DataExpr::FunctionUpdate {
                        expr: Box::new(expr),
                        update: Box::new(DataExprUpdate { expr: argument, update }),
                    },
                    _ => unreachable!("The grammar guarantees an argument and a value"),
                }
            }
            Rule::DataExprWhr => DataExpr::Whr {
                expr: Box::new(expr),
                assignments: child(op, Rule::AssignmentList)
                    .into_inner()
                    .map(parse_assignment)
                    .collect(),
            },
            rule => unreachable!("Unexpected postfix operator {:?}", rule),
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::DataExprImplies => DataExprBinaryOp::Implies,
                Rule::DataExprDisj => DataExprBinaryOp::Disj,
                Rule::DataExprConj => DataExprBinaryOp::Conj,
                Rule::DataExprEq => DataExprBinaryOp::Equal,
                Rule::DataExprNeq => DataExprBinaryOp::NotEqual,
                Rule::DataExprLt => DataExprBinaryOp::LessThan,
                Rule::DataExprLeq => DataExprBinaryOp::LessEqual,
                Rule::DataExprGt => DataExprBinaryOp::GreaterThan,
                Rule::DataExprGeq => DataExprBinaryOp::GreaterEqual,
                Rule::DataExprIn => DataExprBinaryOp::In,
                Rule::DataExprCons => DataExprBinaryOp::Cons,
                Rule::DataExprSnoc => DataExprBinaryOp::Snoc,
                Rule::DataExprConcat => DataExprBinaryOp::Concat,
                Rule::DataExprAdd => DataExprBinaryOp::Add,
                Rule::DataExprSubtract => DataExprBinaryOp::Subtract,
                Rule::DataExprDiv => DataExprBinaryOp::Div,
                Rule::DataExprIntDiv => DataExprBinaryOp::IntDiv,
                Rule::DataExprMod => DataExprBinaryOp::Mod,
                Rule::DataExprMult => DataExprBinaryOp::Multiply,
                Rule::DataExprAt => DataExprBinaryOp::At,
                rule => unreachable!("Unexpected infix operator {:?}", rule),
            };

            DataExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }
        })
        .parse(pairs)
}

fn parse_multi_action_label(pair: Pair<Rule>) -> MultiActionLabel {
    MultiActionLabel {
        actions: pair.into_inner().map(|id| id.as_str().to_string()).collect(),
    }
}

/// Returns the set of identifiers and the operand of block and hide.
fn parse_action_set_operand(pair: Pair<Rule>) -> (Vec<String>, Box<ProcessExpr>) {
    let mut actions = Vec::new();
    let mut operand = ProcessExpr::Delta;

    for part in children(pair) {
        match part.as_rule() {
            Rule::ActIdSet => {
                actions = part.into_inner().flat_map(parse_id_list).collect();
            }
            Rule::ProcExpr => operand = parse_proc_expr(part.into_inner()),
            rule => unreachable!("Unexpected operator element {:?}", rule),
        }
    }

    (actions, Box::new(operand))
}

pub(crate) fn parse_proc_expr(pairs: Pairs<Rule>) -> ProcessExpr {
    PROC_EXPR_PRATT_PARSER
        .map_primary(|primary| match primary.as_rule() {
            Rule::ProcExprDelta => ProcessExpr::Delta,
            Rule::ProcExprTau => ProcessExpr::Tau,
            Rule::ProcExprId => {
                let mut inner = primary.into_inner();
                let identifier = next_id(&mut inner);
                let arguments = inner.next().map(parse_data_expr_list).unwrap_or_default();
                ProcessExpr::Action(identifier, arguments)
            }
            Rule::ProcExprInstance => {
                let mut inner = primary.into_inner();
                let identifier = next_id(&mut inner);
                ProcessExpr::Id(identifier, inner.map(parse_assignment).collect())
            }
            Rule::ProcExprBlock => {
                let (actions, operand) = parse_action_set_operand(primary);
                ProcessExpr::Block { actions, operand }
            }
            Rule::ProcExprHide => {
                let (actions, operand) = parse_action_set_operand(primary);
                ProcessExpr::Hide { actions, operand }
            }
            Rule::ProcExprAllow => {
                let mut actions = Vec::new();
                let mut operand = ProcessExpr::Delta;
                for part in children(primary) {
                    match part.as_rule() {
                        Rule::MultActIdSet => actions = part.into_inner().map(parse_multi_action_label).collect(),
                        Rule::ProcExpr => operand = parse_proc_expr(part.into_inner()),
                        rule => unreachable!("Unexpected allow element {:?}", rule),
                    }
                }

                ProcessExpr::Allow {
                    actions,
                    operand: Box::new(operand),
                }
            }
            Rule::ProcExprRename => {
                let mut renames = Vec::new();
                let mut operand = ProcessExpr::Delta;
                for part in children(primary) {
                    match part.as_rule() {
                        Rule::RenExprSet => {
                            for rename in part.into_inner() {
                                let mut ids = rename.into_inner();
                                let from = next_id(&mut ids);
                                let to = next_id(&mut ids);
                                renames.push(Rename { from, to });
                            }
                        }
                        Rule::ProcExpr => operand = parse_proc_expr(part.into_inner()),
                        rule => unreachable!("Unexpected rename element {:?}", rule),
                    }
                }

                ProcessExpr::Rename {
                    renames,
                    operand: Box::new(operand),
                }
            }
            Rule::ProcExprComm => {
                let mut comm = Vec::new();
                let mut operand = ProcessExpr::Delta;
                for part in children(primary) {
                    match part.as_rule() {
                        Rule::CommExprSet => {
                            for expr in part.into_inner() {
                                let mut inner = expr.into_inner();
                                match (inner.next(), inner.next()) {
                                    (Some(from), Some(to)) => comm.push(Comm {
                                        from: parse_multi_action_label(from),
                                        to: to.as_str().to_string(),
                                    }),
                                    _ => unreachable!("The grammar guarantees both sides of a communication"),
                                }
                            }
                        }
                        Rule::ProcExpr => operand = parse_proc_expr(part.into_inner()),
                        rule => unreachable!("Unexpected comm element {:?}", rule),
                    }
                }

                ProcessExpr::Comm {
                    comm,
                    operand: Box::new(operand),
                }
            }
            Rule::ProcExpr | Rule::ProcExprNoIf => parse_proc_expr(primary.into_inner()),
            rule => unreachable!("Unexpected process expression {:?}", rule),
        })
        .map_prefix(|op, expr| match op.as_rule() {
            Rule::ProcExprSum => ProcessExpr::Sum {
                variables: parse_vars_decl_list(child(op, Rule::VarsDeclList)),
                operand: Box::new(expr),
            },
            Rule::ProcExprIfThen => ProcessExpr::Condition {
                condition: parse_data_expr(child(op, Rule::DataExprUnit).into_inner()),
                then: Box::new(expr),
                else_: None,
            },
            Rule::ProcExprIfThenElse => {
                let mut inner = op.into_inner();
                match (inner.next(), inner.next()) {
                    (Some(condition), Some(then)) => ProcessExpr::Condition {
                        condition: parse_data_expr(condition.into_inner()),
                        then: Box::new(parse_proc_expr(then.into_inner())),
                        else_: Some(Box::new(expr)),
                    },
                    _ => unreachable!("The grammar guarantees a condition and a then branch"),
                }
            }
            rule => unreachable!("Unexpected process prefix {:?}", rule),
        })
        .map_postfix(|expr, op| match op.as_rule() {
            Rule::ProcExprAt => ProcessExpr::At {
                expr: Box::new(expr),
                operand: parse_data_expr(child(op, Rule::DataExprUnit).into_inner()),
            },
            rule => unreachable!("Unexpected process postfix {:?}", rule),
        })
        .map_infix(|lhs, op, rhs| {
            let op = match op.as_rule() {
                Rule::ProcExprChoice => ProcExprBinaryOp::Choice,
                Rule::ProcExprParallel => ProcExprBinaryOp::Parallel,
                Rule::ProcExprLeftMerge => ProcExprBinaryOp::LeftMerge,
                Rule::ProcExprUntil => ProcExprBinaryOp::Until,
                Rule::ProcExprSeq => ProcExprBinaryOp::Sequence,
                Rule::ProcExprSync => ProcExprBinaryOp::CommMerge,
                rule => unreachable!("Unexpected process operator {:?}", rule),
            };

            ProcessExpr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }
        })
        .parse(pairs)
}
