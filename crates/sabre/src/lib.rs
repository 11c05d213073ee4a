//!
//! The rewriter of the toolset, it computes normal forms of data expressions
//! with respect to the equations of a data specification using a just in
//! time strategy, either by interpreting the rules or by compiling them into
//! match programs. The enumerator uses the rewriter to find the solutions of
//! conditions over summation variables.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

pub mod enumerator;
pub mod jitty;
pub mod jitty_compiling;
pub mod rewrite_engine;
pub mod rewrite_specification;
pub mod used_equations;
pub mod utilities;

pub use enumerator::*;
pub use jitty::JittyRewriter;
pub use jitty_compiling::*;
pub use rewrite_engine::*;
pub use rewrite_specification::*;
pub use used_equations::*;
