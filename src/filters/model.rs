//! Constant velocity model.
//!
//! State is (position, speed). Observations are of the position, the speed or both.

use na::{Matrix1, Matrix1x2, Matrix2, RealField, Vector1, Vector2, U1, U2};
use nalgebra as na;

use crate::models::Measurement;
use crate::noise::{CorrelatedNoise, UncorrelatedNoise};

/// State transition matrix over `dt`.
pub fn f<N: RealField>(dt: N) -> Matrix2<N> {
    Matrix2::new(N::one(), dt, N::zero(), N::one())
}

pub fn position_h<N: RealField>(x: &Vector2<N>) -> Vector1<N> {
    Vector1::new(x[0])
}

pub fn position_hj<N: RealField>() -> Matrix1x2<N> {
    Matrix1x2::new(N::one(), N::zero())
}

pub fn speed_h<N: RealField>(x: &Vector2<N>) -> Vector1<N> {
    Vector1::new(x[1])
}

pub fn speed_hj<N: RealField>() -> Matrix1x2<N> {
    Matrix1x2::new(N::zero(), N::one())
}

pub fn position_speed_h<N: RealField>(x: &Vector2<N>) -> Vector2<N> {
    *x
}

pub fn position_speed_hj<N: RealField>() -> Matrix2<N> {
    Matrix2::identity()
}

pub fn add<N: RealField>(a: &Vector2<N>, b: &Vector2<N>) -> Vector2<N> {
    a + b
}

pub fn residual<N: RealField, ZD: na::DimName>(a: &na::VectorN<N, ZD>, b: &na::VectorN<N, ZD>) -> na::VectorN<N, ZD>
where
    na::DefaultAllocator: na::allocator::Allocator<N, ZD>,
{
    a - b
}

/// Observation noise of a single channel.
pub fn noise_1<N: RealField>(m: &Measurement<N>) -> CorrelatedNoise<N, U1> {
    CorrelatedNoise {
        Q: Matrix1::new(m.variance),
    }
}

/// Observation noise of the position and speed channels.
pub fn noise_2<N: RealField>(position: &Measurement<N>, speed: &Measurement<N>) -> CorrelatedNoise<N, U2> {
    CorrelatedNoise::from_uncorrelated(&UncorrelatedNoise {
        q: Vector2::new(position.variance, speed.variance),
    })
}
