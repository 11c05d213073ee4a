//!
//! The data library: sort expressions, data expressions, data equations and
//! data specifications together with the system defined sorts.
//!
//! Since we avoid implicit conversions and Rust has no inheritance the
//! structure of the data library is slightly different. For every type stored
//! in a term, e.g. a variable or an application, we provide a Rust type, in
//! this case DataVariable and DataApplication, that can be constructed from an
//! ATerm (value conversion). However, when a term only has to be inspected
//! there are also DataVariableRef and DataApplicationRef that mimic the
//! borrowed term structure.
//!
//! Every DataVariableRef can be upgraded to DataVariable with "protect" and
//! borrowed with "copy", there are also into conversions to and from ATerms
//! that perform runtime checking for correctness in debug builds.
//!

mod data_equation;
mod data_specification;
mod data_terms;
mod print;
mod representative_generator;
mod sort_specification;
mod sort_terms;
mod substitution;

pub mod standard;

pub use data_equation::*;
pub use data_specification::*;
pub use data_terms::*;
pub use representative_generator::*;
pub use sort_specification::*;
pub use sort_terms::*;
pub use substitution::*;
