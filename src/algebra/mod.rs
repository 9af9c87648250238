//! Sparse matrix storage and dense vector arithmetic.
//!
//! The primary storage format is [`CscMatrix`], with [`CooMatrix`]
//! available for assembly.  All numeric code is generic over
//! [`FloatT`].

mod adjoint;
mod csc;
mod error_types;
mod floats;
mod math_traits;
mod matrix_traits;
mod matrix_types;
pub mod permutation;
mod vecmath;

pub(crate) use csc::*;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_traits::*;
pub use matrix_types::*;
