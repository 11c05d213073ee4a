use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;

use crate::aterm::Symbol;
use crate::aterm::SymbolRef;
use crate::aterm::SymbolTrait;

/// The reserved index of the function symbol of integer terms.
pub(crate) const INT_SYMBOL_INDEX: usize = 0;
/// The reserved index of the function symbol of the empty list.
pub(crate) const EMPTY_LIST_SYMBOL_INDEX: usize = 1;
/// The reserved index of the function symbol of a list constructor.
pub(crate) const LIST_CONS_SYMBOL_INDEX: usize = 2;

/// The node of a term, it is only constructed by the term pool.
pub(crate) struct SharedTerm {
    symbol: Symbol,
    arguments: Box<[ATerm]>,
    value: u64,
    index: usize,
}

impl SharedTerm {
    pub(crate) fn new(symbol: Symbol, arguments: Box<[ATerm]>, value: u64, index: usize) -> SharedTerm {
        SharedTerm {
            symbol,
            arguments,
            value,
            index,
        }
    }
}

pub trait ATermTrait {
    /// Returns the indexed argument of the term
    fn arg(&self, index: usize) -> ATermRef<'_>;

    /// Returns the list of arguments as a collection
    fn arguments(&self) -> ATermArgs<'_>;

    /// Take a borrow of the term
    fn copy(&self) -> ATermRef<'_>;

    /// Returns true iff this is an aterm_list
    fn is_list(&self) -> bool;

    /// Returns true iff this is the empty aterm_list
    fn is_empty_list(&self) -> bool;

    /// Returns true iff this is a aterm_int
    fn is_int(&self) -> bool;

    /// Returns the head function symbol of the term.
    fn get_head_symbol(&self) -> SymbolRef<'_>;

    /// Returns an iterator over all arguments of the term that runs in pre order traversal of the term trees.
    fn iter(&self) -> TermIterator<'_>;
}

/// An owned, maximally shared term.
#[derive(Clone)]
pub struct ATerm {
    pub(crate) shared: Rc<SharedTerm>,
}

impl ATerm {
    pub(crate) fn from_shared(shared: Rc<SharedTerm>) -> ATerm {
        ATerm { shared }
    }

    /// Returns the unique identity of this term, which is also its hash.
    pub fn identity(&self) -> usize {
        self.shared.index
    }

    /// Returns the value of an integer term, and zero for other terms.
    pub fn value(&self) -> u64 {
        self.shared.value
    }

    /// Returns the number of owners of this term, including the term pool.
    pub(crate) fn owners(&self) -> usize {
        Rc::strong_count(&self.shared)
    }
}

/// A borrowed term whose lifetime is bound by an existing [ATerm].
#[derive(Clone, Copy)]
pub struct ATermRef<'a> {
    term: &'a ATerm,
}

impl<'a> ATermRef<'a> {
    /// Upgrades the reference to an owned term.
    pub fn protect(&self) -> ATerm {
        self.term.clone()
    }

    /// Returns the indexed argument of the term, with the lifetime of the reference.
    pub fn arg(&self, index: usize) -> ATermRef<'a> {
        debug_assert!(
            index < self.term.shared.arguments.len(),
            "arg({index}) is not defined for term {:?}",
            self
        );

        ATermRef {
            term: &self.term.shared.arguments[index],
        }
    }

    /// Returns the arguments of the term, with the lifetime of the reference.
    pub fn arguments(&self) -> ATermArgs<'a> {
        ATermArgs::new(&self.term.shared.arguments)
    }

    /// Returns the head symbol, with the lifetime of the reference.
    pub fn get_head_symbol(&self) -> SymbolRef<'a> {
        SymbolRef::new(self.term.shared.symbol.shared())
    }

    /// Returns a preorder iterator with the lifetime of the reference.
    pub fn iter(&self) -> TermIterator<'a> {
        TermIterator::new(*self)
    }

    /// Returns the unique identity of this term.
    pub fn identity(&self) -> usize {
        self.term.shared.index
    }

    /// Returns the value of an integer term, and zero for other terms.
    pub fn value(&self) -> u64 {
        self.term.shared.value
    }
}

impl ATermTrait for ATermRef<'_> {
    fn arg(&self, index: usize) -> ATermRef<'_> {
        ATermRef::arg(self, index)
    }

    fn arguments(&self) -> ATermArgs<'_> {
        ATermRef::arguments(self)
    }

    fn copy(&self) -> ATermRef<'_> {
        *self
    }

    fn is_list(&self) -> bool {
        self.term.is_list()
    }

    fn is_empty_list(&self) -> bool {
        self.term.is_empty_list()
    }

    fn is_int(&self) -> bool {
        self.term.is_int()
    }

    fn get_head_symbol(&self) -> SymbolRef<'_> {
        ATermRef::get_head_symbol(self)
    }

    fn iter(&self) -> TermIterator<'_> {
        TermIterator::new(*self)
    }
}

impl ATermTrait for ATerm {
    fn arg(&self, index: usize) -> ATermRef<'_> {
        self.copy().arg(index)
    }

    fn arguments(&self) -> ATermArgs<'_> {
        ATermArgs::new(&self.shared.arguments)
    }

    fn copy(&self) -> ATermRef<'_> {
        ATermRef { term: self }
    }

    fn is_list(&self) -> bool {
        let index = self.shared.symbol.index();
        index == EMPTY_LIST_SYMBOL_INDEX || index == LIST_CONS_SYMBOL_INDEX
    }

    fn is_empty_list(&self) -> bool {
        self.shared.symbol.index() == EMPTY_LIST_SYMBOL_INDEX
    }

    fn is_int(&self) -> bool {
        self.shared.symbol.index() == INT_SYMBOL_INDEX
    }

    fn get_head_symbol(&self) -> SymbolRef<'_> {
        self.shared.symbol.copy()
    }

    fn iter(&self) -> TermIterator<'_> {
        TermIterator::new(self.copy())
    }
}

impl PartialEq for ATerm {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for ATerm {}

impl Hash for ATerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.shared.index)
    }
}

impl PartialOrd for ATerm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Terms are ordered by their creation, which is deterministic for a deterministic program.
impl Ord for ATerm {
    fn cmp(&self, other: &Self) -> Ordering {
        self.shared.index.cmp(&other.shared.index)
    }
}

impl PartialEq for ATermRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}

impl Eq for ATermRef<'_> {}

impl Hash for ATermRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.term.hash(state)
    }
}

impl PartialOrd for ATermRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ATermRef<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.term.cmp(other.term)
    }
}

impl<'a> PartialEq<ATermRef<'a>> for ATerm {
    fn eq(&self, other: &ATermRef<'a>) -> bool {
        self == other.term
    }
}

impl PartialEq<ATerm> for ATermRef<'_> {
    fn eq(&self, other: &ATerm) -> bool {
        self.term == other
    }
}

impl fmt::Display for ATerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.copy())
    }
}

impl fmt::Debug for ATerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.copy())
    }
}

impl fmt::Display for ATermRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_int() {
            write!(f, "{}", self.value())
        } else if self.is_list() {
            write!(f, "[")?;
            let mut current = *self;
            let mut first = true;
            while !current.is_empty_list() {
                if !first {
                    write!(f, ",")?;
                }
                write!(f, "{}", current.arg(0))?;
                current = current.arg(1);
                first = false;
            }
            write!(f, "]")
        } else {
            write!(f, "{}", self.get_head_symbol().name())?;

            let mut arguments = self.arguments().peekable();
            if arguments.peek().is_some() {
                write!(f, "(")?;
                let mut first = true;
                for argument in arguments {
                    if !first {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", argument)?;
                    first = false;
                }
                write!(f, ")")?;
            }

            Ok(())
        }
    }
}

impl fmt::Debug for ATermRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// An iterator over the arguments of a term.
pub struct ATermArgs<'a> {
    arguments: std::slice::Iter<'a, ATerm>,
}

impl<'a> ATermArgs<'a> {
    fn new(arguments: &'a [ATerm]) -> ATermArgs<'a> {
        ATermArgs {
            arguments: arguments.iter(),
        }
    }

    /// Returns an iterator without any elements.
    pub fn empty() -> ATermArgs<'a> {
        ATermArgs::new(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.len() == 0
    }
}

impl<'a> Iterator for ATermArgs<'a> {
    type Item = ATermRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.arguments.next().map(|term| term.copy())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.arguments.size_hint()
    }
}

impl DoubleEndedIterator for ATermArgs<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.arguments.next_back().map(|term| term.copy())
    }
}

impl ExactSizeIterator for ATermArgs<'_> {
    fn len(&self) -> usize {
        self.arguments.len()
    }
}

/// An iterator over all subterms of the given [ATerm] in preorder traversal, i.e.,
/// for f(g(a), b) we visit f(g(a), b), g(a), a, b.
pub struct TermIterator<'a> {
    stack: Vec<ATermRef<'a>>,
}

impl<'a> TermIterator<'a> {
    pub fn new(t: ATermRef<'a>) -> TermIterator<'a> {
        TermIterator { stack: vec![t] }
    }
}

impl<'a> Iterator for TermIterator<'a> {
    type Item = ATermRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let term = self.stack.pop()?;

        // Put subterms on the stack such that the first argument is visited first.
        for argument in term.arguments().rev() {
            self.stack.push(argument);
        }

        Some(term)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::aterm::TermPool;

    use super::*;

    #[test]
    fn test_term_iterator() {
        let mut tp = TermPool::new();
        let t = tp.from_string("f(g(a),b)").unwrap();

        let mut result = t.iter();
        assert_eq!(result.next().unwrap(), tp.from_string("f(g(a),b)").unwrap());
        assert_eq!(result.next().unwrap(), tp.from_string("g(a)").unwrap());
        assert_eq!(result.next().unwrap(), tp.from_string("a").unwrap());
        assert_eq!(result.next().unwrap(), tp.from_string("b").unwrap());
        assert!(result.next().is_none());
    }

    #[test]
    fn test_maximal_sharing() {
        let mut tp = TermPool::new();
        let t = tp.from_string("f(g(a),g(a))").unwrap();
        let u = tp.from_string("f(g(a),g(a))").unwrap();

        assert_eq!(t, u, "Structurally equal terms are identical");
        assert_eq!(t.identity(), u.identity());
        assert_eq!(t.arg(0), t.arg(1));

        let v = tp.from_string("f(g(a),g(b))").unwrap();
        assert_ne!(t, v);
    }

    #[test]
    fn test_display() {
        let mut tp = TermPool::new();
        let t = tp.from_string("f(g(a),[1,b],c)").unwrap();

        assert_eq!(format!("{}", t), "f(g(a),[1,b],c)");
    }
}
