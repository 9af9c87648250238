#![allow(non_snake_case)]

mod coo;
mod core;
mod matrix_math;
mod permute;
mod transform;
mod utils;
pub(crate) use utils::*;
#[cfg(feature = "serde")]
mod json;
