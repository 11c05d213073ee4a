mod matching;
mod position;
mod term_tree;

pub use matching::*;
pub use position::*;
pub use term_tree::*;
