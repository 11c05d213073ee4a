//! Module for storing positions in terms
use std::fmt;

use mcrl2::aterm::ATerm;
use mcrl2::aterm::ATermRef;
use mcrl2::aterm::ATermTrait;
use smallvec::smallvec;
use smallvec::SmallVec;

type PositionIndex = usize;

/// An ExplicitPosition stores a list of position indices. The index starts at 1
/// and refers to the arguments of the underlying term, for a data application
/// `f(a, b)` the head `f` is at position 1, `a` at 2 and `b` at 3.
///
/// The empty position, aka the root term, is represented by the symbol ε.
/// Indices are stored in a SmallVec, which is configured to store 4 elements.
/// If the position contains a maximum of 4 elements it is stored on the stack.
#[derive(Hash, Clone, Eq, PartialEq, Ord, PartialOrd, Default)]
pub struct ExplicitPosition {
    pub indices: SmallVec<[PositionIndex; 4]>,
}

impl ExplicitPosition {
    pub fn new(indices: &[usize]) -> ExplicitPosition {
        ExplicitPosition {
            indices: SmallVec::from(indices),
        }
    }

    pub fn empty_pos() -> ExplicitPosition {
        ExplicitPosition { indices: smallvec![] }
    }

    /// Returns the position extended with the given index.
    pub fn child(&self, index: usize) -> ExplicitPosition {
        let mut result = self.clone();
        result.indices.push(index);
        result
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Returns the subterm at the given position.
pub fn get_position<'a>(term: &'a ATerm, position: &ExplicitPosition) -> ATermRef<'a> {
    let mut result = term.copy();
    for index in &position.indices {
        result = result.arg(index - 1);
    }
    result
}

/// Returns the subterm at the given position, or None when the position does
/// not exist in the term.
pub fn try_get_position<'a>(term: &'a ATerm, position: &ExplicitPosition) -> Option<ATermRef<'a>> {
    let mut result = term.copy();
    for index in &position.indices {
        if *index == 0 || *index > result.arguments().len() {
            return None;
        }
        result = result.arg(index - 1);
    }
    Some(result)
}

impl fmt::Display for ExplicitPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indices.is_empty() {
            write!(f, "ε")
        } else {
            let mut first = true;
            for p in &self.indices {
                if first {
                    write!(f, "{p}")?;
                    first = false;
                } else {
                    write!(f, ".{p}")?;
                }
            }
            Ok(())
        }
    }
}

impl fmt::Debug for ExplicitPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use mcrl2::aterm::TermPool;
    use test_log::test;

    use super::*;

    #[test]
    fn test_get_position() {
        let mut tp = TermPool::new();
        let t = tp.from_string("f(g(a), b)").unwrap();
        let expected = tp.from_string("a").unwrap();

        let position = ExplicitPosition::new(&[1, 1]);
        assert_eq!(get_position(&t, &position).protect(), expected);
        assert_eq!(position.to_string(), "1.1");
        assert_eq!(ExplicitPosition::empty_pos().to_string(), "ε");
        assert!(try_get_position(&t, &ExplicitPosition::new(&[2, 1])).is_none());
    }
}
