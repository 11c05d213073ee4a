//!
//! This crate provides the core libraries of the mCRL2 toolset: maximally
//! shared terms, the data library with its type checker, and the process and
//! linear process specifications that are built on top of them.
//!

#![forbid(unsafe_code)]

pub mod aterm;
pub mod data;
pub mod lps;
pub mod process;
pub mod typecheck;

mod error;

pub use error::*;
