//!
//! This crate defines general utility functions.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

pub mod fresh_name_generator;
pub mod indexed_set;
pub mod test_utility;
pub mod timing;

pub use fresh_name_generator::*;
pub use indexed_set::*;
pub use test_utility::*;
pub use timing::*;
