//!
//! Type checking of process specifications and their linearisation into a
//! single linear process.
//!
//! The linearizer handles the sequential fragment of the process language:
//! actions, sequential composition, choice, conditions, summation,
//! multi-actions and time. Parallel composition and the operators on
//! actions are rejected.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod balance;
mod extract;
mod join;
mod linearize;
mod normal_form;
mod preprocess;
mod sequential;
mod typecheck;

pub use linearize::*;
pub use typecheck::*;
