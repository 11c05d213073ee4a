//!
//! A crate containing IO related functionality. This includes the reading and
//! writing of .aut (Aldebaran) files, writing .fsm and .dot files, and the
//! binary formats for labelled transition systems and linear processes.
//!

#![forbid(unsafe_code)]

mod line_iterator;

pub mod io_aut;
pub mod io_dot;
pub mod io_fsm;
pub mod io_lps;
pub mod io_lts;
