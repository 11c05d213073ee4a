//!
//! Linear process specifications: a single process equation whose body is a
//! choice between action summands, together with the initial state.
//!

mod linear_process;

pub use linear_process::*;
