//! Pretty printing of sort and data expressions in the mCRL2 syntax.

use std::fmt;

use crate::aterm::ATermRef;
use crate::data::is_container_sort;
use crate::data::is_data_abstraction;
use crate::data::is_data_application;
use crate::data::is_data_function_symbol;
use crate::data::is_data_variable;
use crate::data::is_data_where_clause;
use crate::data::is_function_sort;
use crate::data::is_structured_sort;
use crate::data::is_untyped_identifier;
use crate::data::is_untyped_possible_sorts;
use crate::data::is_untyped_sort;
use crate::data::BinderKind;
use crate::data::DataAbstractionRef;
use crate::data::DataExpressionRef;
use crate::data::DataWhereClauseRef;
use crate::data::SortExpressionRef;

pub(crate) fn write_sort(f: &mut fmt::Formatter<'_>, term: &ATermRef<'_>) -> fmt::Result {
    let sort: SortExpressionRef<'_> = (*term).into();

    if sort.is_basic_sort() {
        write!(f, "{}", sort.name())
    } else if is_function_sort(term) {
        for (index, element) in sort.domain().iter().enumerate() {
            if index > 0 {
                write!(f, " # ")?;
            }

            if element.is_function_sort() {
                write!(f, "({})", element)?;
            } else {
                write!(f, "{}", element)?;
            }
        }

        write!(f, " -> {}", sort.codomain())
    } else if is_container_sort(term) {
        write!(f, "{}({})", sort.container_kind().name(), sort.element_sort())
    } else if is_structured_sort(term) {
        write!(f, "struct ")?;
        for (index, constructor) in sort.constructors().iter().enumerate() {
            if index > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", constructor)?;
        }
        Ok(())
    } else if is_untyped_sort(term) {
        write!(f, "Unknown")
    } else if is_untyped_possible_sorts(term) {
        write!(f, "{{")?;
        for (index, alternative) in sort.possible_sorts().iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", alternative)?;
        }
        write!(f, "}}")
    } else {
        write!(f, "{}", term)
    }
}

/// The associativity of an infix operator.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
    None,
}

const PRECEDENCE_WHERE: u32 = 0;
const PRECEDENCE_BINDER: u32 = 1;
const PRECEDENCE_PREFIX: u32 = 13;
const PRECEDENCE_MAX: u32 = 14;

/// Returns the precedence and associativity of the given binary operator.
fn infix_operator(name: &str) -> Option<(u32, Assoc)> {
    let result = match name {
        "=>" => (2, Assoc::Right),
        "||" => (3, Assoc::Right),
        "&&" => (4, Assoc::Right),
        "==" | "!=" => (5, Assoc::None),
        "<" | "<=" | ">" | ">=" | "in" => (6, Assoc::None),
        "|>" => (7, Assoc::Right),
        "<|" => (8, Assoc::Left),
        "++" => (9, Assoc::Left),
        "+" | "-" => (10, Assoc::Left),
        "*" | "/" | "div" | "mod" => (11, Assoc::Left),
        "." => (12, Assoc::Left),
        _ => return None,
    };

    Some(result)
}

fn is_prefix_operator(name: &str) -> bool {
    matches!(name, "!" | "-" | "#")
}

/// Returns the name of a function symbol, or None for other expressions.
fn symbol_name<'a>(term: &ATermRef<'a>) -> Option<&'a str> {
    if is_data_function_symbol(term) {
        Some(term.arg(0).get_head_symbol().name_ref())
    } else {
        None
    }
}

/// Returns the name of the head symbol and the arguments of the application `f(arguments)`.
fn application_of<'a>(term: &ATermRef<'a>) -> Option<(&'a str, Vec<ATermRef<'a>>)> {
    if is_data_application(term) {
        let name = symbol_name(&term.arg(0))?;
        Some((name, term.arguments().skip(1).collect()))
    } else {
        None
    }
}

/// Returns the value of a closed positive number.
pub(crate) fn pos_value(term: &ATermRef<'_>) -> Option<u128> {
    if symbol_name(term) == Some("@c1") {
        return Some(1);
    }

    let (name, arguments) = application_of(term)?;
    if name != "@cDub" {
        return None;
    }

    let bit = match symbol_name(&arguments[0])? {
        "true" => 1,
        "false" => 0,
        _ => return None,
    };

    pos_value(&arguments[1])?.checked_mul(2)?.checked_add(bit)
}

/// Returns the value of a closed natural number.
pub(crate) fn nat_value(term: &ATermRef<'_>) -> Option<u128> {
    if symbol_name(term) == Some("@c0") {
        return Some(0);
    }

    match application_of(term)? {
        ("@cNat", arguments) => pos_value(&arguments[0]),
        _ => None,
    }
}

/// Returns the value of a closed integer.
pub(crate) fn int_value(term: &ATermRef<'_>) -> Option<i128> {
    match application_of(term)? {
        ("@cInt", arguments) => nat_value(&arguments[0]).and_then(|value| i128::try_from(value).ok()),
        ("@cNeg", arguments) => pos_value(&arguments[0]).and_then(|value| i128::try_from(value).ok().map(|value| -value)),
        _ => None,
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, terms: &[ATermRef<'_>], separator: &str) -> fmt::Result {
    for (index, term) in terms.iter().enumerate() {
        if index > 0 {
            write!(f, "{}", separator)?;
        }
        write_expression(f, term, PRECEDENCE_WHERE)?;
    }
    Ok(())
}

/// Collects the elements of a closed cons list, e.g. the elements of `a |> b |> []`.
fn collect_elements<'a>(
    term: &ATermRef<'a>,
    cons: &str,
    empty: &str,
    width: usize,
) -> Option<Vec<Vec<ATermRef<'a>>>> {
    let mut result = Vec::new();
    let mut current = *term;

    loop {
        if symbol_name(&current) == Some(empty) {
            return Some(result);
        }

        let (name, mut arguments) = application_of(&current)?;
        if name != cons || arguments.len() != width + 1 {
            return None;
        }

        current = arguments.pop()?;
        result.push(arguments);
    }
}

pub(crate) fn write_data_expression(f: &mut fmt::Formatter<'_>, term: &ATermRef<'_>) -> fmt::Result {
    write_expression(f, term, PRECEDENCE_WHERE)
}

/// Writes the expression, with parentheses when its precedence is lower than the
/// given precedence of the context.
fn write_expression(f: &mut fmt::Formatter<'_>, term: &ATermRef<'_>, context: u32) -> fmt::Result {
    if is_data_variable(term) || is_untyped_identifier(term) {
        return write!(f, "{}", term.arg(0).get_head_symbol().name_ref());
    }

    if let Some(name) = symbol_name(term) {
        return match name {
            "@c1" => write!(f, "1"),
            "@c0" => write!(f, "0"),
            _ => write!(f, "{}", name),
        };
    }

    if is_data_abstraction(term) {
        let abstraction: DataAbstractionRef<'_> = (*term).into();
        let variables: Vec<String> = abstraction
            .variables()
            .iter()
            .map(|variable| format!("{}: {}", variable.name(), variable.sort()))
            .collect();

        return match abstraction.binder() {
            BinderKind::SetComprehension | BinderKind::BagComprehension | BinderKind::UntypedSetBagComprehension => {
                write!(f, "{{ {} | {} }}", variables.join(", "), abstraction.body())
            }
            binder => {
                let keyword = match binder {
                    BinderKind::Forall => "forall",
                    BinderKind::Exists => "exists",
                    _ => "lambda",
                };

                if context > PRECEDENCE_BINDER {
                    write!(f, "(")?;
                }
                write!(f, "{} {}. {}", keyword, variables.join(", "), abstraction.body())?;
                if context > PRECEDENCE_BINDER {
                    write!(f, ")")?;
                }
                Ok(())
            }
        };
    }

    if is_data_where_clause(term) {
        let where_clause: DataWhereClauseRef<'_> = (*term).into();
        let assignments: Vec<String> = where_clause
            .assignments()
            .iter()
            .map(|assignment| assignment.to_string())
            .collect();

        if context > PRECEDENCE_WHERE {
            write!(f, "(")?;
        }
        write!(f, "{} whr {} end", where_clause.body(), assignments.join(", "))?;
        if context > PRECEDENCE_WHERE {
            write!(f, ")")?;
        }
        return Ok(());
    }

    if !is_data_application(term) {
        return write!(f, "{}", term);
    }

    if let Some((name, arguments)) = application_of(term) {
        if let Some(value) = pos_value(term).or_else(|| nat_value(term)) {
            return write!(f, "{}", value);
        }

        if let Some(value) = int_value(term) {
            return write!(f, "{}", value);
        }

        match (name, arguments.len()) {
            // Implicit conversions are printed as their argument.
            ("@cNat", 1) | ("@cInt", 1) | ("@setfset", 1) | ("@bagfbag", 1) => {
                return write_expression(f, &arguments[0], context);
            }
            ("@cNeg", 1) => {
                write!(f, "-")?;
                return write_expression(f, &arguments[0], PRECEDENCE_MAX);
            }
            ("@cReal", 2) => {
                if pos_value(&arguments[1]) == Some(1) {
                    return write_expression(f, &arguments[0], context);
                }

                let parenthesised = context > 11;
                if parenthesised {
                    write!(f, "(")?;
                }
                write_expression(f, &arguments[0], 11)?;
                write!(f, "/")?;
                write_expression(f, &arguments[1], 12)?;
                if parenthesised {
                    write!(f, ")")?;
                }
                return Ok(());
            }
            ("@set", 2) if symbol_name(&arguments[0]) == Some("@false_") => {
                return write_expression(f, &arguments[1], context);
            }
            ("@bag", 2) if symbol_name(&arguments[0]) == Some("@zero_") => {
                return write_expression(f, &arguments[1], context);
            }
            ("|>", 2) => {
                if let Some(elements) = collect_elements(term, "|>", "[]", 1) {
                    let elements: Vec<ATermRef<'_>> = elements.into_iter().flatten().collect();
                    write!(f, "[")?;
                    write_separated(f, &elements, ", ")?;
                    return write!(f, "]");
                }
            }
            ("@fset_cons", 2) => {
                if let Some(elements) = collect_elements(term, "@fset_cons", "{}", 1) {
                    let elements: Vec<ATermRef<'_>> = elements.into_iter().flatten().collect();
                    write!(f, "{{")?;
                    write_separated(f, &elements, ", ")?;
                    return write!(f, "}}");
                }
            }
            ("@fbag_cons", 3) => {
                if let Some(elements) = collect_elements(term, "@fbag_cons", "{:}", 2) {
                    write!(f, "{{")?;
                    for (index, element) in elements.iter().enumerate() {
                        if index > 0 {
                            write!(f, ", ")?;
                        }
                        write_separated(f, element, ": ")?;
                    }
                    return write!(f, "}}");
                }
            }
            ("@func_update", 3) => {
                write_expression(f, &arguments[0], PRECEDENCE_MAX)?;
                write!(f, "[")?;
                write_expression(f, &arguments[1], PRECEDENCE_WHERE)?;
                write!(f, " -> ")?;
                write_expression(f, &arguments[2], PRECEDENCE_WHERE)?;
                return write!(f, "]");
            }
            (name, 1) if is_prefix_operator(name) => {
                let parenthesised = context > PRECEDENCE_PREFIX;
                if parenthesised {
                    write!(f, "(")?;
                }
                write!(f, "{}", name)?;
                write_expression(f, &arguments[0], PRECEDENCE_PREFIX)?;
                if parenthesised {
                    write!(f, ")")?;
                }
                return Ok(());
            }
            (name, 2) => {
                if let Some((precedence, assoc)) = infix_operator(name) {
                    let (left, right) = match assoc {
                        Assoc::Left => (precedence, precedence + 1),
                        Assoc::Right => (precedence + 1, precedence),
                        Assoc::None => (precedence + 1, precedence + 1),
                    };

                    let parenthesised = context > precedence;
                    if parenthesised {
                        write!(f, "(")?;
                    }
                    write_expression(f, &arguments[0], left)?;
                    if name == "." {
                        write!(f, ".")?;
                    } else {
                        write!(f, " {} ", name)?;
                    }
                    write_expression(f, &arguments[1], right)?;
                    if parenthesised {
                        write!(f, ")")?;
                    }
                    return Ok(());
                }
            }
            _ => {}
        }
    }

    // A generic application, possibly with an application as head.
    let expression: DataExpressionRef<'_> = (*term).into();
    write_expression(f, &term.arg(0), PRECEDENCE_MAX)?;
    write!(f, "(")?;
    let arguments: Vec<ATermRef<'_>> = expression.arguments().collect();
    write_separated(f, &arguments, ", ")?;
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::data::standard::*;
    use crate::data::DataExpression;
    use crate::data::DataVariable;

    #[test]
    fn test_print_numbers() {
        assert_eq!(pos(6).to_string(), "6");
        assert_eq!(nat(0).to_string(), "0");
        assert_eq!(int(-3).to_string(), "-3");
        assert_eq!(real(-3, 4).to_string(), "-3/4");
        assert_eq!(real(5, 1).to_string(), "5");
    }

    #[test]
    fn test_print_operators() {
        let x = DataExpression::from(DataVariable::new("x", nat_sort()));
        let y = DataExpression::from(DataVariable::new("y", nat_sort()));

        let expression = times(&plus(&x, &y), &x);
        assert_eq!(expression.to_string(), "(x + y) * x");

        let expression = plus(&x, &times(&y, &x));
        assert_eq!(expression.to_string(), "x + y * x");

        let condition = and(&not(&less(&x, &y)), &equal_to(&x, &nat(2)));
        assert_eq!(condition.to_string(), "!(x < y) && x == 2");
    }

    #[test]
    fn test_print_containers() {
        let list = list_enumeration(&bool_sort(), &[true_(), false_()]);
        assert_eq!(list.to_string(), "[true, false]");
        assert_eq!(empty_list(&bool_sort()).to_string(), "[]");
    }
}
