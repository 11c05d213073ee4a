//!
//! A crate for the explicit state space exploration of linear processes. The
//! states are vectors of data expressions in normal form, and the outgoing
//! transitions of a state are computed by enumerating the summation
//! variables of every summand.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod cache;
mod explorer;
mod next_state;
mod options;

pub use cache::*;
pub use explorer::*;
pub use next_state::*;
pub use options::*;
