use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;

/// The shared part of a function symbol, these are never removed.
pub(crate) struct SharedSymbol {
    name: String,
    arity: usize,
    index: usize,
}

impl SharedSymbol {
    pub(crate) fn new(name: String, arity: usize, index: usize) -> SharedSymbol {
        SharedSymbol { name, arity, index }
    }

    pub(crate) fn arity(&self) -> usize {
        self.arity
    }
}

pub trait SymbolTrait {
    /// Obtain the symbol's name
    fn name(&self) -> &str;

    /// Obtain the symbol's arity
    fn arity(&self) -> usize;

    /// Returns a borrowed version of the symbol.
    fn copy(&self) -> SymbolRef<'_>;
}

/// A Symbol references to an aterm function symbol, which has a name and an arity.
#[derive(Clone, Copy)]
pub struct SymbolRef<'a> {
    shared: &'a Rc<SharedSymbol>,
}

impl<'a> SymbolRef<'a> {
    pub(crate) fn new(shared: &'a Rc<SharedSymbol>) -> SymbolRef<'a> {
        SymbolRef { shared }
    }

    pub fn protect(&self) -> Symbol {
        Symbol {
            shared: self.shared.clone(),
        }
    }

    /// Returns the name of the symbol with the lifetime of the reference.
    pub fn name_ref(&self) -> &'a str {
        &self.shared.name
    }

    /// Returns the unique index of the function symbol.
    pub fn index(&self) -> usize {
        self.shared.index
    }
}

impl SymbolTrait for SymbolRef<'_> {
    fn name(&self) -> &str {
        &self.shared.name
    }

    fn arity(&self) -> usize {
        self.shared.arity
    }

    fn copy(&self) -> SymbolRef<'_> {
        *self
    }
}

impl fmt::Display for SymbolRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for SymbolRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} [{}]", self.name(), self.arity(), self.index())
    }
}

impl PartialEq for SymbolRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self.shared, other.shared)
    }
}

impl Eq for SymbolRef<'_> {}

impl Hash for SymbolRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.shared.index)
    }
}

impl PartialOrd for SymbolRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SymbolRef<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.shared.index.cmp(&other.shared.index)
    }
}

/// The owned version of a [SymbolRef].
#[derive(Clone)]
pub struct Symbol {
    shared: Rc<SharedSymbol>,
}

impl Symbol {
    pub(crate) fn from_shared(shared: Rc<SharedSymbol>) -> Symbol {
        Symbol { shared }
    }

    /// Creates or reuses the function symbol with the given name and arity.
    pub fn new(name: &str, arity: usize) -> Symbol {
        super::THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create_symbol(name, arity))
    }

    pub(crate) fn shared(&self) -> &Rc<SharedSymbol> {
        &self.shared
    }

    /// Returns the unique index of the function symbol.
    pub fn index(&self) -> usize {
        self.shared.index
    }
}

impl SymbolTrait for Symbol {
    fn name(&self) -> &str {
        &self.shared.name
    }

    fn arity(&self) -> usize {
        self.shared.arity
    }

    fn copy(&self) -> SymbolRef<'_> {
        SymbolRef::new(&self.shared)
    }
}

impl<'a> From<&SymbolRef<'a>> for Symbol {
    fn from(value: &SymbolRef) -> Self {
        value.protect()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.copy())
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.copy().hash(state)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.copy().cmp(&other.copy())
    }
}

impl Eq for Symbol {}

impl<'a> PartialEq<SymbolRef<'a>> for Symbol {
    fn eq(&self, other: &SymbolRef<'a>) -> bool {
        Rc::ptr_eq(&self.shared, other.shared)
    }
}

impl<'a> PartialEq<Symbol> for SymbolRef<'a> {
    fn eq(&self, other: &Symbol) -> bool {
        Rc::ptr_eq(self.shared, &other.shared)
    }
}
