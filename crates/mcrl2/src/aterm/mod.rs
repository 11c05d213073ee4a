//! Maximally shared first-order terms.
//!
//! Terms are first-order terms f(t0, ..., tn) where f is a function symbol of arity
//! n+1 and t0 to tn are terms. They are stored immutably and maximally shared in the
//! main memory using a thread local hash table, so that two terms are equal iff they
//! are the same object. Terms that are only referenced by the table are removed
//! periodically by [TermPool::collect].
//!
//! Next to the owned [ATerm] there are [ATermRef] objects whose lifetime is
//! bound by an existing term, for example a subterm of another term. They can be
//! upgraded to an owned term using "protect" and obtained using "copy".
//!
//! Terms are not [Send], every thread has its own table.

mod aterm;
mod aterm_list;
mod aterm_pool;
mod binary;
mod symbol;
mod term_builder;

pub use aterm::*;
pub use aterm_list::*;
pub use aterm_pool::*;
pub use binary::*;
pub use symbol::*;
pub use term_builder::*;
