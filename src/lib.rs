//! __spfactor__ is a library of sparse direct solvers for linear systems
//! `A x = b` with `A` stored in compressed sparse column format.
//!
//! Four factorizations are provided:
//!
//! * __Cholesky__ `P A P' = L L'` for symmetric positive definite matrices,
//!   with rank one update and downdate of the factor.
//! * __LDL'__ `P A P' = L D L'` for symmetric quasidefinite matrices.
//! * __LU__ `P A Q = L U` for general square matrices, using threshold
//!   partial pivoting.
//! * __QR__ `A Q = Q_h R` with Householder reflections, giving least squares
//!   solutions of overdetermined systems and minimum norm solutions of
//!   underdetermined ones.
//!
//! Each factorization is split into a symbolic phase, which depends only
//! on the nonzero pattern of `A` and computes a fill reducing ordering
//! (approximate minimum degree), elimination tree and column counts, and
//! a numeric phase.  The symbolic phase can be reused to refactor
//! matrices with the same pattern.  The Dulmage-Mendelsohn decomposition
//! in [`symbolic`] gives the structural rank and block triangular form of
//! a pattern.
//!
//! The [`solver::DirectSolver`] type wraps the four factorizations behind a
//! single interface configured through [`solver::DirectSolverSettings`].
//!
//! ```
//! use spfactor::algebra::CscMatrix;
//! use spfactor::factor::{CholeskyFactorization, SparseFactorization};
//! use spfactor::symbolic::ColumnOrdering;
//!
//! let A = CscMatrix::from(&[
//!     [4., 1.],
//!     [1., 3.],
//! ]);
//! let F = CholeskyFactorization::new(&A, ColumnOrdering::default()).unwrap();
//!
//! let mut x: [f64; 2] = [5., 4.];
//! F.solve(&mut x).unwrap();
//! assert!((x[0] - 1.).abs() < 1e-12 && (x[1] - 1.).abs() < 1e-12);
//! ```
//!
//! Diagnostic traces are emitted through the [`log`](https://docs.rs/log)
//! facade.  No logger is installed by the library.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// spfactor version
pub fn version() -> &'static str {
    VERSION
}

pub mod algebra;
pub mod symbolic;
// factor must come before solver, since the enum_dispatch
// trait definition has to be seen before the dispatch enum
pub mod factor;
pub mod io;
pub mod solver;
pub mod timers;
