#![allow(non_snake_case)]

use super::{DirectSolverInfo, DirectSolverSettings, SettingsError};
use crate::algebra::*;
use crate::factor::*;
use crate::io::ConfigurablePrintTarget;
use crate::symbolic::{FactorizationKind, SymbolicFactorization};
use crate::timers::*;
use enum_dispatch::*;
use std::io::Write;
use thiserror::Error;

/// Error type returned by the [`DirectSolver`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Bad input matrix: {0}")]
    Format(#[from] SparseFormatError),
    #[error(transparent)]
    Factor(#[from] FactorError),
    #[error("Operation \"{operation}\" is not supported by the {method} factorization")]
    Unsupported {
        operation: &'static str,
        method: FactorizationKind,
    },
}

impl SolverError {
    /// Error category, following [`FactorError::kind`]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolverError::Settings(_) | SolverError::Format(_) => ErrorKind::Argument,
            SolverError::Unsupported { .. } => ErrorKind::Shape,
            SolverError::Factor(e) => e.kind(),
        }
    }
}

/// Numeric factors of any of the supported kinds
#[enum_dispatch(SparseFactorization<T>)]
#[derive(Debug, Clone)]
pub enum SparseFactors<T: FloatT> {
    Cholesky(CholeskyFactorization<T>),
    Ldl(LdlFactorization<T>),
    Lu(LuFactorization<T>),
    Qr(QrFactorization<T>),
}

impl<T> SparseFactors<T>
where
    T: FloatT,
{
    /// the kind of factorization held
    pub fn method(&self) -> FactorizationKind {
        match self {
            SparseFactors::Cholesky(_) => FactorizationKind::Cholesky,
            SparseFactors::Ldl(_) => FactorizationKind::Ldl,
            SparseFactors::Lu(_) => FactorizationKind::Lu,
            SparseFactors::Qr(_) => FactorizationKind::Qr,
        }
    }
}

/// Sparse direct solver for `A x = b`.
///
/// Runs the symbolic analysis and numeric factorization selected by its
/// [`DirectSolverSettings`] and then solves with the stored factors.
/// Least squares and minimum norm solutions of rectangular systems are
/// available through the QR method.
///
/// ```
/// use spfactor::algebra::CscMatrix;
/// use spfactor::solver::{DirectSolver, DirectSolverSettingsBuilder};
/// use spfactor::symbolic::FactorizationKind;
///
/// let A = CscMatrix::from(&[
///     [4., 1., 0.],
///     [1., 3., 1.],
///     [0., 1., 2.],
/// ]);
/// let settings = DirectSolverSettingsBuilder::default()
///     .method(FactorizationKind::Ldl)
///     .build()
///     .unwrap();
///
/// let solver = DirectSolver::new(&A, settings).unwrap();
/// let mut x: [f64; 3] = [5., 5., 3.];
/// solver.solve(&mut x).unwrap();
/// assert!((x[0] - 1.).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct DirectSolver<T: FloatT = f64> {
    factors: SparseFactors<T>,
    settings: DirectSolverSettings<T>,
    info: DirectSolverInfo,
    timers: Timers,
}

impl<T> DirectSolver<T>
where
    T: FloatT,
{
    /// Analyse and factor A according to `settings`
    pub fn new(A: &CscMatrix<T>, settings: DirectSolverSettings<T>) -> Result<Self, SolverError> {
        settings.validate()?;
        if settings.check_format {
            A.check_format()?;
        }

        let mut timers = Timers::default();
        let mut info = DirectSolverInfo {
            method: settings.method,
            size: A.size(),
            nnz_A: A.nnz(),
            ..DirectSolverInfo::default()
        };

        if let Err(e) = info.print_configuration(&settings) {
            log::warn!(target: "spfactor::solver", "failed to print configuration: {}", e);
        }

        let symbolic;
        timeit! {timers => "analysis"; {
            symbolic = analyse(A, &settings);
        }}
        let symbolic = symbolic?;

        let factors;
        timeit! {timers => "factor"; {
            factors = numeric(A, symbolic, &settings);
        }}
        let factors = factors.map_err(|e| {
            log::warn!(
                target: "spfactor::solver",
                "{} factorization failed: {}",
                settings.method,
                e
            );
            SolverError::from(e)
        })?;

        info.factor_count = 1;
        info.nnz_factors = factors.nnz();
        info.update_timing(&timers);

        log::debug!(
            target: "spfactor::solver",
            "{} factorization done, nnz = {}, time = {:?}",
            settings.method,
            info.nnz_factors,
            timers.total_time()
        );

        let mut solver = Self {
            factors,
            settings,
            info,
            timers,
        };
        solver.print_status();
        Ok(solver)
    }

    /// Solve in place.  For QR `b` must have length `max(m, n)`, with
    /// the right hand side in its first `m` entries and the solution
    /// returned in its first `n` entries.
    pub fn solve(&self, b: &mut [T]) -> Result<(), SolverError> {
        Ok(self.factors.solve(b)?)
    }

    /// Solve with `b` of length `m` into `x` of length `n`
    pub fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), SolverError> {
        Ok(self.factors.solve_into(b, x)?)
    }

    /// Numeric factorization of a matrix with the same pattern as the
    /// one the solver was created with.
    pub fn refactor(&mut self, A: &CscMatrix<T>) -> Result<(), SolverError> {
        if self.settings.check_format {
            A.check_format()?;
        }

        let timers = &mut self.timers;
        let result;
        timers.reset_timer("factor");
        timeit! {timers => "factor"; {
            result = self.factors.refactor(A);
        }}

        if let Err(e) = result {
            log::warn!(
                target: "spfactor::solver",
                "{} refactorization failed: {}",
                self.settings.method,
                e
            );
            return Err(e.into());
        }

        self.info.factor_count += 1;
        self.info.nnz_factors = self.factors.nnz();
        self.info.update_timing(&self.timers);
        self.print_status();
        Ok(())
    }

    /// Rank one update of a Cholesky factorization to that of `A + w*w'`.
    /// `w` is a sparse n x 1 column.
    pub fn update(&mut self, w: &CscMatrix<T>) -> Result<(), SolverError> {
        match self.factors {
            SparseFactors::Cholesky(ref mut f) => Ok(f.update(w)?),
            _ => Err(SolverError::Unsupported {
                operation: "update",
                method: self.settings.method,
            }),
        }
    }

    /// Rank one downdate of a Cholesky factorization to that of `A - w*w'`
    pub fn downdate(&mut self, w: &CscMatrix<T>) -> Result<(), SolverError> {
        match self.factors {
            SparseFactors::Cholesky(ref mut f) => Ok(f.downdate(w)?),
            _ => Err(SolverError::Unsupported {
                operation: "downdate",
                method: self.settings.method,
            }),
        }
    }

    /// entries stored in the factors
    pub fn nnz(&self) -> usize {
        self.factors.nnz()
    }

    pub fn factors(&self) -> &SparseFactors<T> {
        &self.factors
    }

    pub fn settings(&self) -> &DirectSolverSettings<T> {
        &self.settings
    }

    pub fn info(&self) -> &DirectSolverInfo {
        &self.info
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    fn print_status(&mut self) {
        if let Err(e) = self.info.print_status(&self.settings) {
            log::warn!(target: "spfactor::solver", "failed to print status: {}", e);
        }
    }
}

impl<T> ConfigurablePrintTarget for DirectSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
    fn print_target(&mut self) -> &mut dyn Write {
        self.info.print_target()
    }
}

fn analyse<T: FloatT>(
    A: &CscMatrix<T>,
    settings: &DirectSolverSettings<T>,
) -> Result<SymbolicFactorization, SolverError> {
    let ordering = settings.ordering;
    let symbolic = match settings.method {
        FactorizationKind::Cholesky => SymbolicFactorization::cholesky(A, ordering),
        FactorizationKind::Ldl => SymbolicFactorization::ldl(A, ordering),
        FactorizationKind::Lu => SymbolicFactorization::lu(A, ordering),
        FactorizationKind::Qr => SymbolicFactorization::qr(A, ordering),
    };
    symbolic.map_err(|e| SolverError::Factor(e.into()))
}

fn numeric<T: FloatT>(
    A: &CscMatrix<T>,
    symbolic: SymbolicFactorization,
    settings: &DirectSolverSettings<T>,
) -> Result<SparseFactors<T>, FactorError> {
    let factors = match settings.method {
        FactorizationKind::Cholesky => CholeskyFactorization::with_symbolic(A, symbolic)?.into(),
        FactorizationKind::Ldl => LdlFactorization::with_symbolic(A, symbolic)?.into(),
        FactorizationKind::Lu => LuFactorization::with_reallocation_limit(
            A,
            symbolic,
            settings.pivot_tolerance,
            settings.max_lu_reallocations,
        )?
        .into(),
        FactorizationKind::Qr => QrFactorization::with_symbolic(A, symbolic)?.into(),
    };
    Ok(factors)
}
