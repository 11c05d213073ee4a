use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashSet;
use log::debug;
use log::trace;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::aterm::ATerm;
use crate::aterm::ATermTrait;
use crate::aterm::SharedSymbol;
use crate::aterm::SharedTerm;
use crate::aterm::Symbol;
use crate::aterm::SymbolTrait;
use crate::aterm::EMPTY_LIST_SYMBOL_INDEX;
use crate::aterm::INT_SYMBOL_INDEX;
use crate::aterm::LIST_CONS_SYMBOL_INDEX;
use crate::Mcrl2Error;

thread_local! {
    /// This is the thread specific term pool that stores the maximally shared terms.
    pub(crate) static THREAD_TERM_POOL: RefCell<ThreadTermPool> = RefCell::new(ThreadTermPool::new());
}

/// The minimum number of terms before garbage collection is considered.
const MINIMUM_COLLECT_THRESHOLD: usize = 10_000;

/// The key that uniquely determines a term in the table.
#[derive(Hash, PartialEq, Eq)]
struct TermKey {
    symbol: usize,
    value: u64,
    arguments: SmallVec<[usize; 4]>,
}

pub(crate) struct ThreadTermPool {
    symbols: FxHashMap<String, SmallVec<[Rc<SharedSymbol>; 1]>>,
    terms: FxHashMap<TermKey, ATerm>,

    number_of_symbols: usize,
    number_of_terms: usize,

    /// Garbage collection is triggered when the table exceeds this size.
    collect_threshold: usize,

    int_symbol: Symbol,
    empty_list_symbol: Symbol,
    list_cons_symbol: Symbol,
}

impl ThreadTermPool {
    fn new() -> ThreadTermPool {
        let mut symbols = FxHashMap::default();
        let mut reserve = |name: &str, arity: usize, index: usize| {
            let shared = Rc::new(SharedSymbol::new(name.to_string(), arity, index));
            symbols
                .entry(name.to_string())
                .or_insert_with(SmallVec::new)
                .push(shared.clone());
            Symbol::from_shared(shared)
        };

        let int_symbol = reserve("<aterm_int>", 0, INT_SYMBOL_INDEX);
        let empty_list_symbol = reserve("<empty_list>", 0, EMPTY_LIST_SYMBOL_INDEX);
        let list_cons_symbol = reserve("<list_constructor>", 2, LIST_CONS_SYMBOL_INDEX);

        ThreadTermPool {
            symbols,
            terms: FxHashMap::default(),
            number_of_symbols: 3,
            number_of_terms: 0,
            collect_threshold: MINIMUM_COLLECT_THRESHOLD,
            int_symbol,
            empty_list_symbol,
            list_cons_symbol,
        }
    }

    /// Creates or reuses the function symbol with the given name and arity.
    pub(crate) fn create_symbol(&mut self, name: &str, arity: usize) -> Symbol {
        if let Some(candidates) = self.symbols.get(name) {
            if let Some(shared) = candidates.iter().find(|symbol| symbol.arity() == arity) {
                return Symbol::from_shared(shared.clone());
            }
        }

        let shared = Rc::new(SharedSymbol::new(name.to_string(), arity, self.number_of_symbols));
        self.number_of_symbols += 1;
        self.symbols
            .entry(name.to_string())
            .or_default()
            .push(shared.clone());

        Symbol::from_shared(shared)
    }

    /// Creates the term with the given symbol and arguments.
    pub(crate) fn create(&mut self, symbol: &Symbol, arguments: &[ATerm]) -> ATerm {
        debug_assert_eq!(
            symbol.arity(),
            arguments.len(),
            "Number of arguments does not match arity of {}",
            symbol
        );

        let key = TermKey {
            symbol: symbol.index(),
            value: 0,
            arguments: arguments.iter().map(|argument| argument.identity()).collect(),
        };

        self.insert(key, symbol, arguments.into(), 0)
    }

    /// Creates the integer term with the given value.
    pub(crate) fn create_int(&mut self, value: u64) -> ATerm {
        let key = TermKey {
            symbol: INT_SYMBOL_INDEX,
            value,
            arguments: SmallVec::new(),
        };

        let symbol = self.int_symbol.clone();
        self.insert(key, &symbol, Box::new([]), value)
    }

    pub(crate) fn empty_list(&mut self) -> ATerm {
        let symbol = self.empty_list_symbol.clone();
        self.create(&symbol, &[])
    }

    pub(crate) fn list_cons(&mut self, head: ATerm, tail: ATerm) -> ATerm {
        let symbol = self.list_cons_symbol.clone();
        self.create(&symbol, &[head, tail])
    }

    fn insert(&mut self, key: TermKey, symbol: &Symbol, arguments: Box<[ATerm]>, value: u64) -> ATerm {
        if let Some(term) = self.terms.get(&key) {
            return term.clone();
        }

        let term = ATerm::from_shared(Rc::new(SharedTerm::new(
            symbol.clone(),
            arguments,
            value,
            self.number_of_terms,
        )));
        self.number_of_terms += 1;
        self.terms.insert(key, term.clone());

        if self.terms.len() >= self.collect_threshold {
            self.collect();
        }

        term
    }

    /// Removes all terms that are only referenced by the table itself. Removing a
    /// term only decreases the reference counts of its arguments, so this is
    /// repeated until no more terms can be removed.
    pub(crate) fn collect(&mut self) {
        let before = self.terms.len();

        loop {
            let size = self.terms.len();
            self.terms.retain(|_, term| term.owners() > 1);

            if self.terms.len() == size {
                break;
            }
        }

        self.collect_threshold = (2 * self.terms.len()).max(MINIMUM_COLLECT_THRESHOLD);
        debug!(
            "Garbage collection removed {} terms, {} terms remain",
            before - self.terms.len(),
            self.terms.len()
        );
    }

    pub(crate) fn len(&self) -> usize {
        self.terms.len()
    }
}

impl Drop for ThreadTermPool {
    fn drop(&mut self) {
        // Drop the newest terms first, such that the arguments of a dropped term are
        // still owned by the table and no recursive drop occurs.
        let mut terms: Vec<ATerm> = self.terms.drain().map(|(_, term)| term).collect();
        terms.sort_unstable();
        while terms.pop().is_some() {}
    }
}

/// This is a handle to the thread local term pool.
#[derive(Default)]
pub struct TermPool {}

impl TermPool {
    pub fn new() -> TermPool {
        TermPool {}
    }

    /// Removes the terms that are no longer referenced.
    pub fn collect(&mut self) {
        THREAD_TERM_POOL.with_borrow_mut(|tp| tp.collect());
    }

    /// Returns the number of terms currently stored in the table.
    pub fn len(&self) -> usize {
        THREAD_TERM_POOL.with_borrow(|tp| tp.len())
    }

    /// Returns true iff no terms are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates an [ATerm] with the given symbol and arguments.
    pub fn create(&mut self, symbol: &impl SymbolTrait, arguments: &[impl ATermTrait]) -> ATerm {
        let symbol = symbol.copy().protect();
        let arguments: SmallVec<[ATerm; 4]> = arguments.iter().map(|argument| argument.copy().protect()).collect();

        THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create(&symbol, &arguments))
    }

    /// Creates a function symbol with the given name and arity.
    pub fn create_symbol(&mut self, name: &str, arity: usize) -> Symbol {
        THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create_symbol(name, arity))
    }

    /// Creates an integer term.
    pub fn create_int(&mut self, value: u64) -> ATerm {
        THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create_int(value))
    }

    /// Creates a constant whose name is the given string.
    pub fn create_string(&mut self, value: &str) -> ATerm {
        THREAD_TERM_POOL.with_borrow_mut(|tp| {
            let symbol = tp.create_symbol(value, 0);
            tp.create(&symbol, &[])
        })
    }

    /// Creates an ATerm from a string, in the syntax f(t_0, ..., t_n), [t_0, ..., t_n] or a number.
    pub fn from_string(&mut self, text: &str) -> Result<ATerm, Mcrl2Error> {
        let mut parser = TermParser {
            input: text.as_bytes(),
            position: 0,
        };

        let result = parser.parse_term()?;
        parser.skip_whitespace();
        if parser.position != text.len() {
            return Err(parser.error("unexpected trailing input"));
        }

        trace!("Parsed term {}", result);
        Ok(result)
    }
}

impl fmt::Display for TermPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        THREAD_TERM_POOL.with_borrow(|tp| {
            write!(
                f,
                "{} terms ({} created), {} symbols",
                tp.terms.len(),
                tp.number_of_terms,
                tp.number_of_symbols
            )
        })
    }
}

/// Creates the term `name(arguments)` in the term pool of the current thread.
pub fn create_term(name: &str, arguments: &[ATerm]) -> ATerm {
    THREAD_TERM_POOL.with_borrow_mut(|tp| {
        let symbol = tp.create_symbol(name, arguments.len());
        tp.create(&symbol, arguments)
    })
}

/// Creates the constant `name` in the term pool of the current thread.
pub fn create_constant(name: &str) -> ATerm {
    create_term(name, &[])
}

/// A small recursive descent parser for the textual term syntax.
struct TermParser<'a> {
    input: &'a [u8],
    position: usize,
}

impl TermParser<'_> {
    fn error(&self, message: &str) -> Mcrl2Error {
        Mcrl2Error::SyntaxError(format!("{} at position {} of term", message, self.position))
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.input[self.position].is_ascii_whitespace() {
            self.position += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.position).copied()
    }

    fn expect(&mut self, character: u8) -> Result<(), Mcrl2Error> {
        if self.peek() == Some(character) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", character as char)))
        }
    }

    fn parse_term(&mut self) -> Result<ATerm, Mcrl2Error> {
        match self.peek() {
            Some(b'[') => {
                self.position += 1;
                let elements = self.parse_arguments(b']')?;

                Ok(THREAD_TERM_POOL.with_borrow_mut(|tp| {
                    let mut result = tp.empty_list();
                    for element in elements.into_iter().rev() {
                        result = tp.list_cons(element, result);
                    }
                    result
                }))
            }
            Some(character) if character.is_ascii_digit() => {
                let start = self.position;
                while self.position < self.input.len() && self.input[self.position].is_ascii_digit() {
                    self.position += 1;
                }

                let text = String::from_utf8_lossy(&self.input[start..self.position]);
                let value: u64 = text.parse().map_err(|_| self.error("invalid number"))?;
                Ok(THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create_int(value)))
            }
            Some(_) => {
                let name = self.parse_name()?;

                let arguments = if self.peek() == Some(b'(') {
                    self.position += 1;
                    self.parse_arguments(b')')?
                } else {
                    Vec::new()
                };

                Ok(THREAD_TERM_POOL.with_borrow_mut(|tp| {
                    let symbol = tp.create_symbol(&name, arguments.len());
                    tp.create(&symbol, &arguments)
                }))
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Parses a comma separated list of terms up to and including the given terminator.
    fn parse_arguments(&mut self, terminator: u8) -> Result<Vec<ATerm>, Mcrl2Error> {
        let mut arguments = Vec::new();
        if self.peek() == Some(terminator) {
            self.position += 1;
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_term()?);

            if self.peek() == Some(b',') {
                self.position += 1;
            } else {
                self.expect(terminator)?;
                return Ok(arguments);
            }
        }
    }

    fn parse_name(&mut self) -> Result<String, Mcrl2Error> {
        if self.peek() == Some(b'"') {
            self.position += 1;
            let start = self.position;
            while self.position < self.input.len() && self.input[self.position] != b'"' {
                self.position += 1;
            }

            let name = String::from_utf8_lossy(&self.input[start..self.position]).to_string();
            self.expect(b'"')?;
            return Ok(name);
        }

        let start = self.position;
        while self.position < self.input.len() && !b"(),[] \t\r\n\"".contains(&self.input[self.position]) {
            self.position += 1;
        }

        if start == self.position {
            return Err(self.error("expected a function symbol"));
        }

        Ok(String::from_utf8_lossy(&self.input[start..self.position]).to_string())
    }
}

/// Creates a random term from the given function symbols (name and arity) and
/// constants, by repeatedly applying a random symbol to previously created terms.
pub fn random_term(tp: &mut TermPool, symbols: &[(String, usize)], constants: &[String], iterations: usize) -> ATerm {
    use rand::prelude::IteratorRandom;

    debug_assert!(!constants.is_empty(), "We need constants to be able to create a term");

    let mut subterms = AHashSet::<ATerm>::from_iter(constants.iter().map(|name| tp.create_string(name)));

    let mut rng = rand::rng();
    let mut result = subterms
        .iter()
        .next()
        .cloned()
        .unwrap_or_else(|| tp.create_string("c"));

    for _ in 0..iterations {
        let Some((symbol, arity)) = symbols.iter().choose(&mut rng) else {
            break;
        };

        let mut arguments = vec![];
        for _ in 0..*arity {
            if let Some(argument) = subterms.iter().choose(&mut rng) {
                arguments.push(argument.clone());
            }
        }

        let symbol = tp.create_symbol(symbol, *arity);
        result = tp.create(&symbol, &arguments);

        // Make this term available as another subterm that can be used.
        subterms.insert(result.clone());
    }

    result
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// Make sure that the term has the same number of arguments as its arity.
    fn verify_term(term: &ATerm) {
        for subterm in term.iter() {
            assert_eq!(
                subterm.get_head_symbol().arity(),
                subterm.arguments().len(),
                "The arity matches the number of arguments."
            )
        }
    }

    #[test]
    fn test_random_terms() {
        let mut tp = TermPool::new();

        let terms: Vec<ATerm> = (0..100)
            .map(|_| {
                random_term(
                    &mut tp,
                    &[("f".to_string(), 2), ("g".to_string(), 1)],
                    &["a".to_string(), "b".to_string()],
                    10,
                )
            })
            .collect();

        tp.collect();

        for term in &terms {
            verify_term(term);

            // Reconstructing the term from its printed form yields the same term.
            let text = format!("{}", term);
            assert_eq!(tp.from_string(&text).unwrap(), *term);
        }
    }

    #[test]
    fn test_garbage_collection() {
        let mut tp = TermPool::new();
        tp.collect();
        let before = tp.len();

        let kept = tp.from_string("f(g(a),h(b))").unwrap();
        {
            let _dropped = tp.from_string("u(v(w))").unwrap();
        }

        tp.collect();
        assert_eq!(tp.len(), before + 5, "Only the kept term and its subterms remain");
        assert_eq!(tp.from_string("f(g(a),h(b))").unwrap(), kept);
    }

    #[test]
    fn test_int_and_string() {
        let mut tp = TermPool::new();

        let five = tp.create_int(5);
        assert!(five.is_int());
        assert_eq!(five.value(), 5);
        assert_eq!(five, tp.create_int(5));

        let name = tp.create_string("name");
        assert_eq!(name.get_head_symbol().name(), "name");
        assert_eq!(name, tp.from_string("name").unwrap());
        assert!(tp.from_string("f(a,").is_err());
    }
}
