#![allow(non_snake_case)]

//! Bayesian estimation noise models.
//!
//! Linear Noise models are represented as structs.
//! Process noise of the constant velocity model is specified by a [`NoiseModel`] and converted
//! into a covariance for each time step by [`process_covariance`].

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, Matrix2, MatrixMN, MatrixN, RealField, U2, Vector1, VectorN};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Additive noise.
///
/// Noise represented as a the noise variance vector.
pub struct UncorrelatedNoise<N: RealField, QD: Dim>
where
    DefaultAllocator: Allocator<N, QD>,
{
    /// Noise variance
    pub q: VectorN<N, QD>,
}

/// Additive noise.
///
/// Noise represented as a the noise covariance matrix.
pub struct CorrelatedNoise<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    /// Noise covariance
    pub Q: MatrixN<N, D>,
}

/// Additive noise.
///
/// Noise represented as a the noise variance vector and a noise coupling matrix.
/// The noise covariance is G.q.G'.
pub struct CoupledNoise<N: RealField, D: Dim, QD: Dim>
where
    DefaultAllocator: Allocator<N, D, QD> + Allocator<N, QD>,
{
    /// Noise variance
    pub q: VectorN<N, QD>,
    /// Noise coupling
    pub G: MatrixMN<N, D, QD>,
}

impl<N: RealField, D: Dim> CorrelatedNoise<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Creates a CorrelatedNoise from an CoupledNoise.
    pub fn from_coupled<QD: Dim>(coupled: &CoupledNoise<N, D, QD>) -> Self
    where
        DefaultAllocator: Allocator<N, QD, QD> + Allocator<N, D, QD> + Allocator<N, QD, D> + Allocator<N, QD>,
    {
        let Q = &coupled.G * MatrixN::from_diagonal(&coupled.q) * coupled.G.transpose();
        CorrelatedNoise { Q }
    }

    /// Creates a CorrelatedNoise from an UncorrelatedNoise.
    pub fn from_uncorrelated(uncorrelated: &UncorrelatedNoise<N, D>) -> Self {
        CorrelatedNoise {
            Q: MatrixN::from_diagonal(&uncorrelated.q),
        }
    }

    /// The noise covariance inverse.
    ///
    /// Required by the information form, fails for a singular covariance.
    pub fn inverse(&self) -> Result<MatrixN<N, D>, &'static str> {
        let mut QI = self.Q.clone();
        let rcond = crate::linalg::udu::inverse_pd(&mut QI);
        crate::matrix::check_positive(rcond, "Q not PD")?;
        Ok(QI)
    }

    /// The dimension of the noise.
    pub fn dim(&self) -> D {
        self.Q.data.shape().0
    }
}

/// Process noise specification of the constant velocity model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoiseModel<N> {
    /// Continuous white noise acceleration with the given spectral density.
    Continuous { spectral_density: N },
    /// A single random acceleration impulse per time step with the given variance.
    Discrete { variance: N },
}

/// Process covariance of the constant velocity model over a time step `dt`.
///
/// Continuous: `Q = spectral_density * [[dt³/3, dt²/2], [dt²/2, dt]]`.
/// Discrete: `G = [dt²/2, dt]'`, `Q = G.variance.G'`.
///
/// The result is the zero matrix for `dt == 0`.
pub fn process_covariance<N: RealField>(dt: N, noise: &NoiseModel<N>) -> Result<CorrelatedNoise<N, U2>, &'static str> {
    if !(dt >= N::zero()) {
        return Err("negative dt");
    }
    let two = na::convert::<f64, N>(2.);
    let three = na::convert::<f64, N>(3.);
    let dt_2 = dt * dt / two;

    match *noise {
        NoiseModel::Continuous { spectral_density } => {
            if !(spectral_density > N::zero()) {
                return Err("spectral density not positive");
            }
            let dt_3 = dt * dt * dt / three;
            Ok(CorrelatedNoise {
                Q: Matrix2::new(dt_3, dt_2, dt_2, dt) * spectral_density,
            })
        }
        NoiseModel::Discrete { variance } => {
            if !(variance > N::zero()) {
                return Err("variance not positive");
            }
            let coupled = CoupledNoise {
                q: Vector1::new(variance),
                G: na::Matrix2x1::new(dt_2, dt),
            };
            Ok(CorrelatedNoise::from_coupled(&coupled))
        }
    }
}
