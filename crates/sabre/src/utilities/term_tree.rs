use std::collections::VecDeque;

use mcrl2::aterm::ATerm;
use mcrl2::aterm::ATermRef;
use mcrl2::aterm::ATermTrait;
use mcrl2::aterm::Symbol;
use mcrl2::aterm::TermPool;
use mcrl2::data::is_data_application;
use mcrl2::data::is_data_variable;
use mcrl2::data::DataExpression;
use mcrl2::data::DataVariable;
use rustc_hash::FxHashMap;

use crate::utilities::get_position;
use crate::utilities::ExplicitPosition;

/// A SemiCompressedTermTree (SCTT) is a mix between a [ATerm] and a syntax
/// tree and is used to represent the rhs of rewrite rules and the lhs and rhs
/// of conditions.
///
/// It stores as much as possible in the term pool. Due to variables it cannot
/// be fully compressed. For variables it stores the position in the lhs of a
/// rewrite rule where the concrete term can be found that will replace the
/// variable.
///
/// # Examples
/// For the rewrite rule `true && b = b`, the SCTT of the rhs will be of type
/// Variable, storing the position of `b` in the lhs.
///
/// For the rewrite rule `@cNat(p) == @c0 = false`, the SCTT of the rhs will be
/// of type Compressed, with a pointer to the term `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemiCompressedTermTree {
    Explicit(ExplicitNode),
    Compressed(ATerm),
    Variable(ExplicitPosition),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplicitNode {
    pub head: Symbol,
    pub children: Vec<SemiCompressedTermTree>,
}

use SemiCompressedTermTree::*;

impl SemiCompressedTermTree {
    /// Given a [ATerm] left hand side and a term pool this function
    /// instantiates the SCTT and computes a [DataExpression].
    pub fn evaluate(&self, lhs: &ATerm, tp: &mut TermPool) -> DataExpression {
        self.evaluate_term(lhs, tp).into()
    }

    fn evaluate_term(&self, lhs: &ATerm, tp: &mut TermPool) -> ATerm {
        match self {
            Explicit(node) => {
                let arguments: Vec<ATerm> = node.children.iter().map(|child| child.evaluate_term(lhs, tp)).collect();
                tp.create(&node.head, &arguments)
            }
            Compressed(term) => term.clone(),
            Variable(position) => get_position(lhs, position).protect(),
        }
    }

    /// Creates a SCTT from a term. The var_map parameter should specify where
    /// which variable can be found in the lhs of the rewrite rule.
    pub fn from_term(term: &ATermRef<'_>, var_map: &FxHashMap<DataVariable, ExplicitPosition>) -> SemiCompressedTermTree {
        if is_data_variable(term) {
            let variable: DataVariable = term.protect().into();
            if let Some(position) = var_map.get(&variable) {
                return Variable(position.clone());
            }
        }

        if term.arguments().len() == 0 {
            return Compressed(term.protect());
        }

        let children: Vec<SemiCompressedTermTree> = term
            .arguments()
            .map(|argument| SemiCompressedTermTree::from_term(&argument, var_map))
            .collect();

        if children.iter().all(|child| child.is_compressed()) {
            Compressed(term.protect())
        } else {
            Explicit(ExplicitNode {
                head: term.get_head_symbol().protect(),
                children,
            })
        }
    }

    fn is_compressed(&self) -> bool {
        matches!(self, Compressed(_))
    }
}

/// Create a mapping of variables to their position in the given left-hand
/// side, non-linear variables are mapped to their first position in breadth
/// first order.
pub fn create_var_map(lhs: &DataExpression) -> FxHashMap<DataVariable, ExplicitPosition> {
    // Queue of pairs of subterm and position in term t that need to be inspected
    let mut queue: VecDeque<(ATermRef<'_>, ExplicitPosition)> = VecDeque::new();
    queue.push_back((lhs.copy().into(), ExplicitPosition::empty_pos()));

    let mut map = FxHashMap::default();
    while let Some((term, position)) = queue.pop_front() {
        if is_data_variable(&term) {
            map.entry(term.protect().into()).or_insert(position);
        } else if is_data_application(&term) {
            for (index, argument) in term.arguments().enumerate() {
                queue.push_back((argument, position.child(index + 1)));
            }
        }
    }
    map
}

/// Returns the positions of all variables in the left-hand side, including the
/// repeated occurrences of non-linear variables.
pub fn variable_positions(lhs: &DataExpression) -> Vec<(DataVariable, ExplicitPosition)> {
    let mut result = Vec::new();
    let mut queue: VecDeque<(ATermRef<'_>, ExplicitPosition)> = VecDeque::new();
    queue.push_back((lhs.copy().into(), ExplicitPosition::empty_pos()));

    while let Some((term, position)) = queue.pop_front() {
        if is_data_variable(&term) {
            result.push((term.protect().into(), position));
        } else if is_data_application(&term) {
            for (index, argument) in term.arguments().enumerate() {
                queue.push_back((argument, position.child(index + 1)));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use mcrl2::data::standard::and;
    use mcrl2::data::standard::bool_sort;
    use mcrl2::data::standard::true_;
    use test_log::test;

    use super::*;

    #[test]
    fn test_constant() {
        let map = FxHashMap::default();
        let t = true_();
        let sctt = SemiCompressedTermTree::from_term(&t.copy().into(), &map);
        assert_eq!(sctt, Compressed(t.into()));
    }

    #[test]
    fn test_evaluation() {
        let mut tp = TermPool::new();
        let b: DataExpression = DataVariable::new("b", bool_sort()).into();
        let lhs = and(&true_(), &b);
        let rhs = and(&b, &b);

        let map = create_var_map(&lhs);
        assert_eq!(map[&DataVariable::new("b", bool_sort())], ExplicitPosition::new(&[3]));

        let sctt = SemiCompressedTermTree::from_term(&rhs.copy().into(), &map);
        assert!(matches!(sctt, Explicit(_)));

        let term = and(&true_(), &true_());
        assert_eq!(sctt.evaluate(&term, &mut tp), and(&true_(), &true_()));
    }
}
