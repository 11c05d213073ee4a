use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

use crate::aterm::ATerm;
use crate::aterm::ATermRef;
use crate::aterm::ATermTrait;
use crate::aterm::THREAD_TERM_POOL;

/// A typed view on a term list [t_0, ..., t_n] that is stored as a sequence of
/// list constructors.
pub struct ATermList<T> {
    term: ATerm,
    _marker: PhantomData<T>,
}

impl<T: From<ATerm>> ATermList<T> {
    /// Obtain the head, i.e. the first element, of the list.
    pub fn head(&self) -> T {
        debug_assert!(!self.is_empty(), "The empty list has no head");
        self.term.arg(0).protect().into()
    }
}

impl<T> ATermList<T> {
    /// Returns true iff the list is empty.
    pub fn is_empty(&self) -> bool {
        self.term.is_empty_list()
    }

    /// Obtain the tail, i.e. the remainder, of the list.
    pub fn tail(&self) -> ATermList<T> {
        self.term.arg(1).protect().into()
    }

    /// Returns an iterator over all elements in the list.
    pub fn iter(&self) -> ATermListIter<T> {
        ATermListIter {
            current: self.clone(),
        }
    }

    /// Returns the number of elements, this is linear in the length of the list.
    pub fn len(&self) -> usize {
        let mut result = 0;
        let mut current = self.term.copy();
        while !current.is_empty_list() {
            result += 1;
            current = current.arg(1);
        }

        result
    }

    /// Returns the underlying term.
    pub fn term(&self) -> &ATerm {
        &self.term
    }
}

impl<T: Into<ATerm>> ATermList<T> {
    /// Creates a list from the given elements.
    pub fn new(elements: Vec<T>) -> ATermList<T> {
        THREAD_TERM_POOL.with_borrow_mut(|tp| {
            let mut result = tp.empty_list();
            for element in elements.into_iter().rev() {
                result = tp.list_cons(element.into(), result);
            }

            result.into()
        })
    }

    /// Returns the empty list.
    pub fn empty() -> ATermList<T> {
        THREAD_TERM_POOL.with_borrow_mut(|tp| tp.empty_list().into())
    }
}

impl<T: From<ATerm> + Into<ATerm>> FromIterator<T> for ATermList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ATermList::new(iter.into_iter().collect())
    }
}

impl<T> Clone for ATermList<T> {
    fn clone(&self) -> Self {
        ATermList {
            term: self.term.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for ATermList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}

impl<T> Eq for ATermList<T> {}

impl<T> Hash for ATermList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.term.hash(state)
    }
}

impl<T> From<ATermList<T>> for ATerm {
    fn from(value: ATermList<T>) -> Self {
        value.term
    }
}

impl<T> From<ATerm> for ATermList<T> {
    fn from(value: ATerm) -> Self {
        debug_assert!(value.is_list(), "Can only convert a aterm_list");
        ATermList::<T> {
            term: value,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> From<ATermRef<'a>> for ATermList<T> {
    fn from(value: ATermRef<'a>) -> Self {
        debug_assert!(value.is_list(), "Can only convert a aterm_list");
        ATermList::<T> {
            term: value.protect(),
            _marker: PhantomData,
        }
    }
}

impl<T: From<ATerm> + fmt::Display> fmt::Display for ATermList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, element) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "]")
    }
}

impl<T: From<ATerm> + fmt::Display> fmt::Debug for ATermList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

pub struct ATermListIter<T> {
    current: ATermList<T>,
}

impl<T: From<ATerm>> Iterator for ATermListIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            None
        } else {
            let head = self.current.head();
            self.current = self.current.tail();
            Some(head)
        }
    }
}

impl<T: From<ATerm>> IntoIterator for &ATermList<T> {
    type Item = T;
    type IntoIter = ATermListIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::aterm::TermPool;

    use super::*;

    #[test]
    fn test_aterm_list() {
        let mut tp = TermPool::new();
        let list: ATermList<ATerm> = tp.from_string("[f,g,h,i]").unwrap().into();

        assert!(!list.is_empty());
        assert_eq!(list.len(), 4);

        // Convert into normal vector.
        let values: Vec<ATerm> = list.iter().collect();

        assert_eq!(values[0], tp.from_string("f").unwrap());
        assert_eq!(values[1], tp.from_string("g").unwrap());
        assert_eq!(values[2], tp.from_string("h").unwrap());
        assert_eq!(values[3], tp.from_string("i").unwrap());

        let constructed: ATermList<ATerm> = ATermList::new(values);
        assert_eq!(constructed, list, "Lists are maximally shared");
    }
}
