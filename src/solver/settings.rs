use crate::algebra::*;
use crate::symbolic::{ColumnOrdering, FactorizationKind};
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field holds a value outside of its legal range
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
    /// The ordering cannot be used with the factorization method
    #[error("Ordering {ordering} cannot be used with the {method} factorization")]
    IncompatibleOrdering {
        method: FactorizationKind,
        ordering: ColumnOrdering,
    },
}

/// Settings for the [`DirectSolver`](crate::solver::DirectSolver)
///
/// Construct with [`DirectSolverSettingsBuilder`], which validates the
/// fields on `build()`, or start from `Default::default()`.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectSolverSettings<T: FloatT> {
    ///factorization to compute
    #[builder(default = "FactorizationKind::Cholesky")]
    pub method: FactorizationKind,

    ///fill-reducing ordering
    #[builder(default = "ColumnOrdering::MinimumDegreeAtPlusA")]
    pub ordering: ColumnOrdering,

    ///LU pivot tolerance in [0,1].  1 is partial pivoting, 0 prefers the diagonal
    #[builder(default = "(1.0).as_T()")]
    pub pivot_tolerance: T,

    ///check the format of the input matrix before factoring
    #[builder(default = "true")]
    pub check_format: bool,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///limit on growth of the LU factor storage
    #[builder(default = "32")]
    pub max_lu_reallocations: usize,
}

impl<T> Default for DirectSolverSettings<T>
where
    T: FloatT,
{
    fn default() -> DirectSolverSettings<T> {
        DirectSolverSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> DirectSolverSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_pivot_tolerance(self.pivot_tolerance)?;
        validate_ordering(self.method, self.ordering)?;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for DirectSolverSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        DirectSolverSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> DirectSolverSettingsBuilder<T>
where
    T: FloatT,
{
    /// check the fields that have been set explicitly
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(tol) = self.pivot_tolerance {
            validate_pivot_tolerance(tol)?;
        }
        let method = self.method.unwrap_or_default();
        let ordering = self.ordering.unwrap_or_default();
        validate_ordering(method, ordering)?;
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_pivot_tolerance<T: FloatT>(tol: T) -> Result<(), SettingsError> {
    if tol >= T::zero() && tol <= T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("pivot_tolerance"))
    }
}

fn validate_ordering(
    method: FactorizationKind,
    ordering: ColumnOrdering,
) -> Result<(), SettingsError> {
    let ok = match method {
        FactorizationKind::Cholesky | FactorizationKind::Ldl => ordering.is_symmetric(),
        FactorizationKind::Lu | FactorizationKind::Qr => true,
    };
    if ok {
        Ok(())
    } else {
        Err(SettingsError::IncompatibleOrdering { method, ordering })
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    DirectSolverSettingsBuilder::<f64>::default().build().unwrap();

    // fail on out of range pivot tolerance
    assert!(DirectSolverSettingsBuilder::<f64>::default()
        .pivot_tolerance(1.5)
        .build()
        .is_err());

    // fail on an unsymmetric ordering for a symmetric factorization
    assert!(DirectSolverSettingsBuilder::<f64>::default()
        .method(FactorizationKind::Ldl)
        .ordering(ColumnOrdering::MinimumDegreeAtA)
        .build()
        .is_err());

    let settings = DirectSolverSettingsBuilder::<f64>::default()
        .method(FactorizationKind::Lu)
        .ordering(ColumnOrdering::MinimumDegreeStS)
        .pivot_tolerance(0.1)
        .build()
        .unwrap();
    assert!(settings.validate().is_ok());
}
