#![allow(non_snake_case)]
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spfactor::algebra::*;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

// dense row-major to CSC, keeping only nonzeros
pub fn from_dense(D: &[Vec<f64>]) -> CscMatrix<f64> {
    let mut coo = CooMatrix::new(D.len(), D.first().map_or(0, |r| r.len()));
    for (i, row) in D.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            coo.push(i, j, v).unwrap();
        }
    }
    coo.to_csc(true)
}

/// random symmetric positive definite matrix with both triangles
/// stored, made strictly diagonally dominant
pub fn random_spd(n: usize, density: f64, rng: &mut StdRng) -> CscMatrix<f64> {
    let mut D = vec![vec![0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen::<f64>() < density {
                let v = rng.gen_range(-1.0..1.0);
                D[i][j] = v;
                D[j][i] = v;
            }
        }
    }
    for i in 0..n {
        D[i][i] = 1. + D[i].iter().map(|v| v.abs()).sum::<f64>();
    }
    from_dense(&D)
}

/// random square unsymmetric matrix.  With `dominant` set the diagonal
/// dominates each column, otherwise the diagonal is just nonzero.
pub fn random_square(n: usize, density: f64, dominant: bool, rng: &mut StdRng) -> CscMatrix<f64> {
    let mut D = vec![vec![0f64; n]; n];
    for (i, row) in D.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            if i != j && rng.gen::<f64>() < density {
                *v = rng.gen_range(-1.0..1.0);
            }
        }
    }
    for j in 0..n {
        D[j][j] = if dominant {
            1. + (0..n).map(|i| D[i][j].abs()).sum::<f64>()
        } else {
            rng.gen_range(0.1..1.0)
        };
    }
    from_dense(&D)
}

/// random m x n matrix with full rank min(m,n): a unit "diagonal"
/// plus random entries
pub fn random_rect(m: usize, n: usize, density: f64, rng: &mut StdRng) -> CscMatrix<f64> {
    let mut D = vec![vec![0.; n]; m];
    for (i, row) in D.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            if i == j {
                *v = 2. + rng.gen::<f64>();
            } else if rng.gen::<f64>() < density {
                *v = rng.gen_range(-1.0..1.0);
            }
        }
    }
    from_dense(&D)
}

pub fn random_vector(n: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// || A*x - b ||_inf
pub fn residual(A: &CscMatrix<f64>, x: &[f64], b: &[f64]) -> f64 {
    let mut r = b.to_vec();
    A.gemv(&mut r, x, 1.0, -1.0);
    r.norm_inf()
}

/// dense product A' * A
pub fn dense_ata(A: &CscMatrix<f64>) -> Vec<Vec<f64>> {
    let D = A.to_dense();
    let n = A.n;
    let mut G = vec![vec![0.; n]; n];
    for row in D.iter() {
        for i in 0..n {
            for j in 0..n {
                G[i][j] += row[i] * row[j];
            }
        }
    }
    G
}
