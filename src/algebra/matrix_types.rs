// All factorizations consume and produce matrices in standard
// compressed sparse column format.   Triplet (coordinate) storage
// exists only for assembly and is converted to CSC before use.

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use spfactor::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// Ths field should have length `n+1`. The last entry corresponds
    /// to the the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

/// Sparse matrix in coordinate (triplet) format, used for assembly.
///
/// Entries are appended in any order with [`push`](CooMatrix::push) and
/// compressed with [`to_csc`](CooMatrix::to_csc).  Exact zeros are never
/// stored, so they do not contribute to the sparsity pattern.
///
/// ```no_run
/// use spfactor::algebra::{CooMatrix, CscMatrix};
///
/// let mut coo = CooMatrix::<f64>::new(2, 2);
/// coo.push(0, 0, 2.0).unwrap();
/// coo.push(1, 0, -1.0).unwrap();
/// coo.push(1, 1, 2.0).unwrap();
/// coo.push(1, 1, 1.0).unwrap();   // summed with the previous entry
///
/// let A: CscMatrix<f64> = coo.to_csc(true);
/// assert_eq!(A.nnz(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    pub(crate) rows: Vec<usize>,
    pub(crate) cols: Vec<usize>,
    pub(crate) vals: Vec<T>,
}

/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MatrixShape {
    /// Normal matrix orientation
    N,
    /// Transposed matrix orientation
    T,
}

/// Adjoint (transposed) view of a matrix.   Produced by
/// [`CscMatrix::t`](crate::algebra::CscMatrix::t) and used for
/// transposed matrix-vector products without forming the transpose.
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}
