use std::fmt;

use crate::aterm::ATerm;
use crate::aterm::ATermTrait;
use crate::aterm::Symbol;
use crate::aterm::THREAD_TERM_POOL;

/// This can be used to construct a term from a given input of (inductive) type
/// I, without using the system stack.
///
/// The `transformer` function is applied to every input I. It can push more
/// inputs onto the argument stack and yield some instance C that is used to
/// construct the result term, or it yields a result term directly.
///
/// The `construct` function takes an instance C and the terms that were
/// obtained for the inputs pushed to the argument stack by the transformer.
///
/// A simple example is transforming a term into another term using a function
/// f : ATerm -> Option<ATerm>. Then I is ATerm and C is the head symbol from
/// which the recursive term is reconstructed, see [apply].
pub struct TermBuilder<I, C> {
    /// The stack of (intermediate) results.
    terms: Vec<Option<ATerm>>,
    configs: Vec<Config<I, C>>,
}

impl<I, C> Default for TermBuilder<I, C> {
    fn default() -> Self {
        TermBuilder {
            terms: vec![],
            configs: vec![],
        }
    }
}

impl<I, C> TermBuilder<I, C> {
    pub fn new() -> TermBuilder<I, C> {
        TermBuilder::default()
    }

    /// Evaluates the input and returns the resulting term, or the first error
    /// returned by either of the functions.
    pub fn evaluate<F, G, E>(&mut self, input: I, transformer: F, construct: G) -> Result<ATerm, E>
    where
        F: Fn(&mut ArgStack<I, C>, I) -> Result<Yield<C>, E>,
        G: Fn(C, &[ATerm]) -> Result<ATerm, E>,
    {
        self.terms.clear();
        self.configs.clear();

        self.terms.push(None);
        self.configs.push(Config::Apply(input, 0));

        while let Some(config) = self.configs.pop() {
            match config {
                Config::Apply(input, result) => {
                    let top_of_stack = self.configs.len();
                    let mut args = ArgStack::new(&mut self.terms, &mut self.configs);

                    match transformer(&mut args, input)? {
                        Yield::Construct(input) => {
                            // This must be evaluated after all the arguments that were pushed.
                            let arity = args.len();
                            self.configs.insert(top_of_stack, Config::Construct(input, arity, result));
                        }
                        Yield::Term(term) => {
                            self.terms[result] = Some(term);
                        }
                    }
                }
                Config::Construct(input, arity, result) => {
                    let start = self.terms.len() - arity;
                    let arguments: Vec<ATerm> = self.terms.drain(start..).flatten().collect();
                    debug_assert_eq!(arguments.len(), arity, "All arguments should have been evaluated");

                    self.terms[result] = Some(construct(input, &arguments)?);
                }
            }
        }

        debug_assert!(self.terms.len() == 1, "Expect exactly one term on the result stack");

        let result = self.terms.pop().flatten();
        Ok(result.unwrap_or_else(|| unreachable!("The input has been evaluated to a term")))
    }
}

impl<I, C: fmt::Display> fmt::Display for TermBuilder<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Terms: [")?;
        for (i, term) in self.terms.iter().enumerate() {
            match term {
                Some(term) => writeln!(f, "{}\t{}", i, term)?,
                None => writeln!(f, "{}\t<pending>", i)?,
            }
        }
        writeln!(f, "]")?;

        writeln!(f, "Configs: [")?;
        for config in &self.configs {
            match config {
                Config::Apply(_, result) => writeln!(f, "\tApply({})", result)?,
                Config::Construct(symbol, arity, result) => {
                    writeln!(f, "\tConstruct({}, {}, {})", symbol, arity, result)?
                }
            }
        }
        write!(f, "]")
    }
}

enum Config<I, C> {
    Apply(I, usize),
    Construct(C, usize, usize),
}

pub enum Yield<C> {
    /// Yield this term as is.
    Term(ATerm),
    /// Yield the construction of C applied to the results of the pushed arguments.
    Construct(C),
}

/// A local argument stack on top of the global stack of the builder.
pub struct ArgStack<'a, I, C> {
    terms: &'a mut Vec<Option<ATerm>>,
    configs: &'a mut Vec<Config<I, C>>,
    top_of_stack: usize,
}

impl<'a, I, C> ArgStack<'a, I, C> {
    fn new(terms: &'a mut Vec<Option<ATerm>>, configs: &'a mut Vec<Config<I, C>>) -> ArgStack<'a, I, C> {
        let top_of_stack = terms.len();
        ArgStack {
            terms,
            configs,
            top_of_stack,
        }
    }

    /// Returns the number of arguments added.
    fn len(&self) -> usize {
        self.terms.len() - self.top_of_stack
    }

    /// Adds the input to the argument stack, its result becomes the next argument of the construction.
    pub fn push(&mut self, input: I) {
        self.configs.push(Config::Apply(input, self.terms.len()));
        self.terms.push(None);
    }
}

/// Applies the given function to every subterm of the given term using the [TermBuilder].
///     function(subterm) returns:
///         None   , in which case subterm is kept and it is recursed into its arguments.
///         Some(x), in which case subterm is replaced by x.
pub fn apply<F>(t: &ATerm, function: &F) -> ATerm
where
    F: Fn(&ATerm) -> Option<ATerm>,
{
    let mut builder = TermBuilder::<ATerm, Symbol>::new();

    let result: Result<ATerm, std::convert::Infallible> = builder.evaluate(
        t.clone(),
        |args, t| match function(&t) {
            Some(result) => Ok(Yield::Term(result)),
            None if t.arguments().is_empty() => Ok(Yield::Term(t)),
            None => {
                for arg in t.arguments() {
                    args.push(arg.protect());
                }

                Ok(Yield::Construct(t.get_head_symbol().protect()))
            }
        },
        |symbol, args| Ok(THREAD_TERM_POOL.with_borrow_mut(|tp| tp.create(&symbol, args))),
    );

    match result {
        Ok(term) => term,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::aterm::TermPool;

    use super::*;

    #[test]
    fn test_apply_replaces_subterms() {
        let mut tp = TermPool::new();
        let t = tp.from_string("f(g(a),h(a,b))").unwrap();
        let a = tp.from_string("a").unwrap();
        let c = tp.from_string("c").unwrap();

        let result = apply(&t, &|subterm| if *subterm == a { Some(c.clone()) } else { None });
        assert_eq!(result, tp.from_string("f(g(c),h(c,b))").unwrap());
    }

    #[test]
    fn test_deep_term() {
        let mut tp = TermPool::new();
        let a = tp.from_string("a").unwrap();
        let b = tp.from_string("b").unwrap();
        let s = tp.create_symbol("s", 1);

        // A term that is too deep for a recursive traversal.
        let mut t = a.clone();
        for _ in 0..100_000 {
            t = tp.create(&s, &[t]);
        }

        let result = apply(&t, &|subterm| if *subterm == a { Some(b.clone()) } else { None });
        assert_eq!(result.arg(0).get_head_symbol(), s);
    }
}
