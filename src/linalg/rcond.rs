//! Reciprocal condition numbers.
//!
//! Numerical comparison of reciprocal condition numbers is required for all linear algebra in the estimators.

use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, RealField};

/// Estimate the reciprocal condition number of the diagonal of a matrix for inversion.
///
/// The Condition Number is defined from a matrix norm.
/// Choose max element of the diagonal as the norm of the original matrix.
/// Assume this norm for the inverse matrix is the min element.
/// Therefore rcond = min/max
///
/// Defined to be 0 for an empty or semi-definite matrix and for max and min infinite.
/// Defined to be < 0 for a negative matrix (diagonal element < 0) and with any NaN element.
/// By definition rcond <= 1 as min <= max.
pub fn rcond_symetric<N: RealField, R: Dim, C: Dim>(sm: &MatrixMN<N, R, C>) -> N
where
    DefaultAllocator: Allocator<N, R, C>,
{
    let n = sm.nrows().min(sm.ncols());
    if n == 0 {
        return N::zero();
    }

    let mut mind = sm[(0, 0)];
    let mut maxd = mind;
    for i in 0..n {
        let d = sm[(i, i)];
        if d != d {
            // NaN
            return -N::one();
        }
        if d < mind {
            mind = d;
        }
        if d > maxd {
            maxd = d;
        }
    }

    rcond_min_max(mind, maxd)
}

fn rcond_min_max<N: RealField>(mind: N, maxd: N) -> N {
    if mind < N::zero() {
        // mind < 0 does not represent a rcond but the sign is propagated
        return mind;
    }
    let rcond = mind / maxd;
    if rcond != rcond {
        // NaN, singular due to (mind == maxd) == (zero or infinity)
        N::zero()
    } else {
        rcond
    }
}
