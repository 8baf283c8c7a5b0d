#![allow(non_snake_case)]

//! Matrix support functions shared by the estimators.
//!
//! Reciprocal condition number checks and helpers that keep covariance matrices symmetric.

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField};
use nalgebra as na;

/// Checks a the reciprocal condition number is > 0 .
///
/// IEC 559 NaN values are never true
pub fn check_positive<N: RealField>(rcond: N, message: &'static str) -> Result<N, &'static str> {
    if rcond > N::zero() {
        Ok(rcond)
    } else {
        Err(message)
    }
}

/// Checks a the reciprocal condition number is >= 0 .
///
/// IEC 559 NaN values are never true
pub fn check_non_negativ<N: RealField>(rcond: N, message: &'static str) -> Result<N, &'static str> {
    if rcond >= N::zero() {
        Ok(rcond)
    } else {
        Err(message)
    }
}

/// Replace M with (M + M')/2.
pub fn symmetrise<N: RealField, D: Dim>(M: &mut MatrixN<N, D>)
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let half = na::convert::<f64, N>(0.5);
    let n = M.nrows();
    for i in 0..n {
        for j in i + 1..n {
            let m = (M[(i, j)] + M[(j, i)]) * half;
            M[(i, j)] = m;
            M[(j, i)] = m;
        }
    }
}

/// Inverse of a positive definite matrix by its Cholesky factor.
pub fn inverse_pd<N: RealField, D: Dim>(M: &MatrixN<N, D>, message: &'static str) -> Result<MatrixN<N, D>, &'static str>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    Ok(M.clone().cholesky().ok_or(message)?.inverse())
}
