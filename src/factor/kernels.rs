#![allow(non_snake_case)]

// Dense-vector kernels over compressed column factors.  All solves
// work in place on x.  Lower triangular factors hold their diagonal
// as the first entry of each column, upper triangular factors as
// the last.

use crate::algebra::{CscMatrix, FloatT};
use std::iter::zip;

// Solves Lx = b, L lower triangular with diagonal first
pub(crate) fn lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    let (Lp, Li, Lx) = (&L.colptr, &L.rowval, &L.nzval);
    for j in 0..L.n {
        x[j] /= Lx[Lp[j]];
        let xj = x[j];
        let (f, l) = (Lp[j] + 1, Lp[j + 1]);
        for (&i, &v) in zip(&Li[f..l], &Lx[f..l]) {
            x[i] -= v * xj;
        }
    }
}

// Solves L'x = b, L lower triangular with diagonal first
pub(crate) fn ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    let (Lp, Li, Lx) = (&L.colptr, &L.rowval, &L.nzval);
    for j in (0..L.n).rev() {
        let (f, l) = (Lp[j] + 1, Lp[j + 1]);
        let s = zip(&Li[f..l], &Lx[f..l]).fold(T::zero(), |s, (&i, &v)| s + v * x[i]);
        x[j] = (x[j] - s) / Lx[Lp[j]];
    }
}

// Solves Ux = b, U upper triangular with diagonal last
pub(crate) fn usolve<T: FloatT>(U: &CscMatrix<T>, x: &mut [T]) {
    let (Up, Ui, Ux) = (&U.colptr, &U.rowval, &U.nzval);
    for j in (0..U.n).rev() {
        let (f, l) = (Up[j], Up[j + 1] - 1);
        x[j] /= Ux[l];
        let xj = x[j];
        for (&i, &v) in zip(&Ui[f..l], &Ux[f..l]) {
            x[i] -= v * xj;
        }
    }
}

// Solves U'x = b, U upper triangular with diagonal last
pub(crate) fn utsolve<T: FloatT>(U: &CscMatrix<T>, x: &mut [T]) {
    let (Up, Ui, Ux) = (&U.colptr, &U.rowval, &U.nzval);
    for j in 0..U.n {
        let (f, l) = (Up[j], Up[j + 1] - 1);
        let s = zip(&Ui[f..l], &Ux[f..l]).fold(T::zero(), |s, (&i, &v)| s + v * x[i]);
        x[j] = (x[j] - s) / Ux[l];
    }
}

// Solves (L+I)x = b, L strictly lower triangular
pub(crate) fn lsolve_unit<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    let (Lp, Li, Lx) = (&L.colptr, &L.rowval, &L.nzval);
    for j in 0..L.n {
        let xj = x[j];
        let (f, l) = (Lp[j], Lp[j + 1]);
        for (&i, &v) in zip(&Li[f..l], &Lx[f..l]) {
            x[i] -= v * xj;
        }
    }
}

// Solves (L+I)'x = b, L strictly lower triangular
pub(crate) fn ltsolve_unit<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    let (Lp, Li, Lx) = (&L.colptr, &L.rowval, &L.nzval);
    for j in (0..L.n).rev() {
        let (f, l) = (Lp[j], Lp[j + 1]);
        let s = zip(&Li[f..l], &Lx[f..l]).fold(T::zero(), |s, (&i, &v)| s + v * x[i]);
        x[j] -= s;
    }
}

// Applies the Householder reflection (I - beta*v*v') to x, with v the
// sparse vector held in rows vi and values vx
pub(crate) fn happly<T: FloatT>(vi: &[usize], vx: &[T], beta: T, x: &mut [T]) {
    let tau = zip(vi, vx).fold(T::zero(), |tau, (&i, &v)| tau + v * x[i]) * beta;
    for (&i, &v) in zip(vi, vx) {
        x[i] -= v * tau;
    }
}

// Overwrites x with the Householder vector v, with v[0] scaled so that
// (I - beta*v*v')*x = s*e1.  Returns (beta, s) with s >= 0.
pub(crate) fn house<T: FloatT>(x: &mut [T]) -> (T, T) {
    let two = T::one() + T::one();
    let sigma = x[1..].iter().fold(T::zero(), |acc, &v| acc + v * v);
    if sigma == T::zero() {
        let s = x[0].abs();
        let beta = if x[0] <= T::zero() { two } else { T::zero() };
        x[0] = T::one();
        (beta, s)
    } else {
        let s = T::sqrt(x[0] * x[0] + sigma);
        x[0] = if x[0] <= T::zero() {
            x[0] - s
        } else {
            -sigma / (x[0] + s)
        };
        let beta = -T::recip(s * x[0]);
        (beta, s)
    }
}
