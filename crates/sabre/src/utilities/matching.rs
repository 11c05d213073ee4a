use std::collections::VecDeque;

use mcrl2::aterm::ATerm;
use mcrl2::aterm::ATermRef;
use mcrl2::aterm::ATermTrait;
use mcrl2::aterm::Symbol;
use mcrl2::aterm::SymbolTrait;
use mcrl2::data::is_data_application;
use mcrl2::data::is_data_variable;
use mcrl2::data::DataExpression;
use mcrl2::data::DataSubstitution;
use mcrl2::data::DataVariable;
use mcrl2::data::free_variables;

use crate::utilities::get_position;
use crate::utilities::ExplicitPosition;

/// Matches the pattern against the term and extends the substitution with the
/// bindings of the variables in the pattern. Returns false when the term does
/// not match, in which case the substitution can contain partial bindings.
pub fn match_term(pattern: &DataExpression, term: &DataExpression, sigma: &mut DataSubstitution) -> bool {
    if pattern.is_variable() {
        let variable: DataVariable = pattern.clone().into();
        return match sigma.get(&variable) {
            Some(bound) => bound == term,
            None => {
                sigma.insert(variable, term.clone());
                true
            }
        };
    }

    if pattern.is_application() {
        if !term.is_application() || pattern.arity() != term.arity() {
            return false;
        }

        if !match_term(&pattern.head(), &term.head(), sigma) {
            return false;
        }

        return pattern
            .arguments()
            .zip(term.arguments())
            .all(|(p, t)| match_term(&p.protect().into(), &t.protect().into(), sigma));
    }

    pattern == term
}

/// A single check of a compiled pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
enum MatchCheck {
    /// The subterm at the position is exactly the given term.
    Equal(ExplicitPosition, ATerm),
    /// The subterm at the position is an application with the given symbol,
    /// which determines the number of arguments.
    Head(ExplicitPosition, Symbol),
    /// The subterms at both positions are the same, for non-linear patterns.
    Same(ExplicitPosition, ExplicitPosition),
}

/// A left-hand side compiled into a sequence of checks on positions, which
/// avoids the construction of a substitution.
#[derive(Clone, Debug)]
pub struct MatchProgram {
    checks: Vec<MatchCheck>,
}

impl MatchProgram {
    pub fn new(pattern: &DataExpression) -> MatchProgram {
        let mut checks = Vec::new();
        let mut variables: Vec<(DataVariable, ExplicitPosition)> = Vec::new();
        let mut non_linear = Vec::new();

        // Breadth first such that the head of a subterm is checked before its arguments.
        let mut queue: VecDeque<(ATermRef<'_>, ExplicitPosition)> = VecDeque::new();
        queue.push_back((pattern.copy().into(), ExplicitPosition::empty_pos()));

        while let Some((term, position)) = queue.pop_front() {
            if is_data_variable(&term) {
                let variable: DataVariable = term.protect().into();
                match variables.iter().find(|(existing, _)| *existing == variable) {
                    Some((_, first)) => non_linear.push(MatchCheck::Same(first.clone(), position)),
                    None => variables.push((variable, position)),
                }
            } else if is_data_application(&term) && !free_variables(&term.protect().into()).is_empty() {
                checks.push(MatchCheck::Head(position.clone(), term.get_head_symbol().protect()));
                for (index, argument) in term.arguments().enumerate() {
                    queue.push_back((argument, position.child(index + 1)));
                }
            } else {
                checks.push(MatchCheck::Equal(position, term.protect()));
            }
        }

        checks.extend(non_linear);
        MatchProgram { checks }
    }

    /// Returns true iff the term matches the compiled pattern.
    pub fn matches(&self, term: &ATerm) -> bool {
        self.checks.iter().all(|check| match check {
            MatchCheck::Equal(position, expected) => get_position(term, position).protect() == *expected,
            MatchCheck::Head(position, symbol) => {
                let subterm = get_position(term, position);
                is_data_application(&subterm) && subterm.get_head_symbol().arity() == symbol.arity()
            }
            MatchCheck::Same(left, right) => get_position(term, left).identity() == get_position(term, right).identity(),
        })
    }
}

#[cfg(test)]
mod tests {
    use mcrl2::data::standard::and;
    use mcrl2::data::standard::bool_sort;
    use mcrl2::data::standard::false_;
    use mcrl2::data::standard::not;
    use mcrl2::data::standard::true_;
    use test_log::test;

    use super::*;

    #[test]
    fn test_non_linear_pattern() {
        let b = DataVariable::new("b", bool_sort());
        let pattern = and(&b.clone().into(), &b.clone().into());

        let program = MatchProgram::new(&pattern);
        assert!(program.matches(&and(&true_(), &true_())));
        assert!(!program.matches(&and(&true_(), &false_())));
        assert!(!program.matches(&not(&true_())));

        let mut sigma = DataSubstitution::default();
        assert!(match_term(&pattern, &and(&false_(), &false_()), &mut sigma));
        assert_eq!(sigma[&b], false_());

        let mut sigma = DataSubstitution::default();
        assert!(!match_term(&pattern, &and(&false_(), &true_()), &mut sigma));
    }

    #[test]
    fn test_nested_pattern() {
        let b = DataVariable::new("b", bool_sort());
        let pattern = not(&not(&b.clone().into()));

        let program = MatchProgram::new(&pattern);
        assert!(program.matches(&not(&not(&true_()))));
        assert!(!program.matches(&not(&true_())));
    }
}
