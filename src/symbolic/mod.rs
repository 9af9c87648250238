//! Symbolic analysis: fill-reducing orderings, elimination trees,
//! column counts, the Dulmage-Mendelsohn decomposition and the reusable
//! [`SymbolicFactorization`].
//!
//! Everything in this module depends only on the nonzero pattern of a
//! matrix, never on its values.

mod analysis;
mod dmperm;
mod etree;
mod ordering;
mod pattern;
mod reach;

pub use analysis::*;
pub use dmperm::*;
pub use etree::*;
pub use ordering::*;
pub use pattern::*;
pub use reach::etree_reach;
pub(crate) use reach::ReachWorkspace;

#[path = "test.rs"]
#[cfg(test)]
mod test;
