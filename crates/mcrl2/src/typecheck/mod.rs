//!
//! The data type checker elaborates the untyped syntax tree of the parser
//! into sort correct data expressions. It resolves overloaded function
//! symbols, determines the sorts of numeric literals and inserts the implicit
//! conversions between Pos, Nat, Int and Real.
//!

mod data_typechecker;
mod signatures;
mod sort_matching;
mod specification;

pub use data_typechecker::*;
pub use specification::*;
