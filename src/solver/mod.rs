//! Direct solver facade over the four factorization kinds.

mod info;
mod settings;
#[allow(clippy::module_inception)]
mod solver;

pub use info::*;
pub use settings::*;
pub use solver::*;
