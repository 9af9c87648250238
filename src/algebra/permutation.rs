// Permutation vectors are stored as plain index arrays.  For a
// permutation `p`, position `k` of the permuted object is taken
// from position `p[k]` of the original.  The inverse `pinv`
// satisfies `pinv[p[k]] == k`.

use super::SparseFormatError;
use std::iter::zip;

/// Gathers `x[k] = b[p[k]]`, i.e. computes x = P*b.
///
/// # Panics
/// Panics if `x` is longer than `p` or an index in `p` is out of range for `b`.
pub fn permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

/// Scatters `x[p[k]] = b[k]`, i.e. computes x = P'*b.
///
/// # Panics
/// Panics if an index in `p` is out of range for `x`.
pub fn ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

/// Construct an inverse permutation from a permutation.
///
/// Fails if `p` is not a bijection on `0..p.len()`.
pub fn invperm(p: &[usize]) -> Result<Vec<usize>, SparseFormatError> {
    let n = p.len();
    let mut pinv = vec![usize::MAX; n];

    for (k, &j) in p.iter().enumerate() {
        if j >= n || pinv[j] != usize::MAX {
            return Err(SparseFormatError::InvalidPermutation);
        }
        pinv[j] = k;
    }
    Ok(pinv)
}

/// True if `p` is a bijection on `0..p.len()`
pub fn is_permutation(p: &[usize]) -> bool {
    let mut seen = vec![false; p.len()];
    for &j in p {
        if j >= p.len() || seen[j] {
            return false;
        }
        seen[j] = true;
    }
    true
}

/// The identity permutation of length `n`
pub fn identity_permutation(n: usize) -> Vec<usize> {
    (0..n).collect()
}
