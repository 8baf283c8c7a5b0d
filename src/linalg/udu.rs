#![allow(non_snake_case)]

//! Modified Cholesky factorisation.
//!
//! UdU' factorisation of positive semi-definite matrices. Where:
//! U is unit upper triangular
//! d is diagonal
//!
//! Storage:
//! UD format of UdU' factor
//! strict_upper_triangle(UD) = strict_upper_triangle(U), diagonal(UD) = d, strict_lower_triangle(UD) ignored

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField};
use na::base::storage::Storage;
use nalgebra as na;

use super::rcond;

/// In place modified upper triangular Cholesky factor of a positive definite or semi-definite matrix M.
///
/// Reference: A+G p.219 right side of table
///
/// Strict lower triangle of M is ignored in computation and left unmodified.
///
/// Return: reciprocal condition number, -1 if negative, 0 if semi-definite (including zero)
pub fn factor<N: RealField, D: Dim>(M: &mut MatrixN<N, D>) -> N
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let n = M.nrows();
    for j in (0..n).rev() {
        // Diagonal element
        let mut d = M[(j, j)];
        for k in j + 1..n {
            d -= M[(j, k)] * M[(k, k)] * M[(j, k)];
        }
        M[(j, j)] = d;

        if d > N::zero() {
            for i in (0..j).rev() {
                let mut e = M[(i, j)];
                for k in j + 1..n {
                    e -= M[(i, k)] * M[(k, k)] * M[(j, k)];
                }
                M[(i, j)] = e / d;
            }
        } else if d == N::zero() {
            // Semi-definite only when the remaining column is identically zero
            for i in 0..j {
                let mut e = M[(i, j)];
                for k in j + 1..n {
                    e -= M[(i, k)] * M[(k, k)] * M[(j, k)];
                }
                if e != N::zero() {
                    return -N::one();
                }
            }
        } else {
            // Negative, or NaN falls through the comparisons above
            return -N::one();
        }
    }

    rcond::rcond_symetric(M)
}

/// Reciprocal condition number of a symmetric matrix from its UdU' factor.
///
/// M is not modified. Negative when M is not PSD.
pub fn rcond_psd<N: RealField, D: Dim>(M: &MatrixN<N, D>) -> N
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let mut UD = M.clone();
    factor(&mut UD)
}

/// Inverse of a positive definite matrix.
///
/// inv(UdU') = inv(U)' inv(d) inv(U) where inv(U) is again unit upper triangular.
///
/// Output: M inverse of M, only updated if return value > 0
///
/// Return: reciprocal condition number, -1 if negative, 0 if semi-definite (including zero)
pub fn inverse_pd<N: RealField, D: Dim>(M: &mut MatrixN<N, D>) -> N
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let mut UD = M.clone();
    let rcond = factor(&mut UD);
    if rcond <= N::zero() {
        return rcond;
    }

    let shape = M.data.shape();
    let n = M.nrows();
    // inv(U)
    let mut V = MatrixN::<N, D>::identity_generic(shape.0, shape.1);
    for i in (0..n).rev() {
        for j in i + 1..n {
            let mut e = N::zero();
            for k in i + 1..=j {
                e -= UD[(i, k)] * V[(k, j)];
            }
            V[(i, j)] = e;
        }
    }
    // inv(d) scaled rows of inv(U)
    let mut dV = V.clone();
    for i in 0..n {
        let di = N::one() / UD[(i, i)];
        for j in 0..n {
            dV[(i, j)] *= di;
        }
    }

    *M = V.transpose() * dV;
    rcond
}
