//!
//! Process expressions, process equations and process specifications whose
//! data parts have been type checked.
//!

mod action;
mod process_expression;
mod process_specification;

pub use action::*;
pub use process_expression::*;
pub use process_specification::*;
