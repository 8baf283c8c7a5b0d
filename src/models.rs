#![allow(non_snake_case)]

//! Bayesian estimation models.
//!
//! State representations are modeled as structs.
//! Common Bayesian discrete system estimation operations are defined as traits.
//! The measurement stream exchanged with the tracker is also modeled here.

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField, VectorN, U1};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Kalman State.
///
/// Linear representation as a state vector and the state covariance (symmetric positive semi-definite) matrix.
#[derive(PartialEq, Clone, Debug)]
pub struct KalmanState<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State vector
    pub x: VectorN<N, D>,
    /// State covariance matrix (symmetric positive semi-definite)
    pub X: MatrixN<N, D>,
}

impl<N: RealField, D: Dim> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn new_zero(d: D) -> KalmanState<N, D> {
        KalmanState {
            x: VectorN::zeros_generic(d, U1),
            X: MatrixN::zeros_generic(d, d),
        }
    }
}

/// Information State.
///
/// Linear representation as a information state vector and the information (symmetric positive semi-definite) matrix.
/// Information is additive, see [`add_information`](../estimators/information/struct.InformationFilter.html#method.add_information).
#[derive(PartialEq, Clone, Debug)]
pub struct InformationState<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Information state vector
    pub i: VectorN<N, D>,
    /// Information matrix (symmetric positive semi-definite)
    pub I: MatrixN<N, D>,
}

/// A Kalman filter (estimator).
///
/// The linear Kalman state representation x,X is used to represent the system.
pub trait KalmanEstimator<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Initialise the estimator with a KalmanState.
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, &'static str>;

    /// The estimator's estimate of the system's KalmanState.
    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), &'static str>;
}

/// Optional parts of an observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions<N> {
    /// Mahalanobis distance gate, observations further away are rejected.
    pub gate: Option<N>,
    /// H infinity risk sensitivity.
    pub theta: Option<N>,
    /// Compute the normalized innovation squared.
    pub normalized_innovation: bool,
    /// Compute the log likelihood of the observation.
    pub likelihood: bool,
}

impl<N> Default for ObserveOptions<N> {
    fn default() -> Self {
        ObserveOptions {
            gate: None,
            theta: None,
            normalized_innovation: false,
            likelihood: false,
        }
    }
}

impl<N> ObserveOptions<N> {
    pub fn gated(gate: Option<N>) -> Self {
        ObserveOptions {
            gate,
            ..Self::default()
        }
    }

    /// True when the innovation covariance is needed for the observation.
    pub fn needs_innovation_covariance(&self) -> bool {
        self.gate.is_some() || self.normalized_innovation || self.likelihood
    }
}

/// Result of an observation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInfo<N: RealField, ZD: Dim>
where
    DefaultAllocator: Allocator<N, ZD>,
{
    /// Residual of the observation and the predicted observation
    pub residual: VectorN<N, ZD>,
    /// The observation was rejected by the gate, the state is unchanged
    pub gated: bool,
    /// Normalized innovation squared y'.inv(S).y
    pub normalized_innovation: Option<N>,
    /// Log likelihood of the observation
    pub log_likelihood: Option<N>,
}

impl<N: RealField, ZD: Dim> UpdateInfo<N, ZD>
where
    DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, ZD>,
{
    /// Update information from the residual and the innovation covariance and its inverse.
    ///
    /// `S` is only required when `options` requests it.
    pub fn new(
        residual: VectorN<N, ZD>,
        S: Option<(&MatrixN<N, ZD>, &MatrixN<N, ZD>)>,
        options: &ObserveOptions<N>,
    ) -> Result<Self, &'static str> {
        let mut info = UpdateInfo {
            residual,
            gated: false,
            normalized_innovation: None,
            log_likelihood: None,
        };
        if !options.needs_innovation_covariance() {
            return Ok(info);
        }
        let (S, SI) = S.ok_or("S required in observe")?;

        // y'.inv(S).y
        let mahalanobis_squared = info.residual.dot(&(SI * &info.residual));

        if let Some(gate) = options.gate {
            info.gated = mahalanobis_squared > gate * gate;
        }
        if options.normalized_innovation {
            info.normalized_innovation = Some(mahalanobis_squared);
        }
        if options.likelihood {
            let S_chol = S.clone().cholesky().ok_or("S not PD in observe")?;
            // ln|S| from the Cholesky diagonal
            let mut ln_det = N::zero();
            for d in S_chol.l_dirty().diagonal().iter() {
                ln_det += d.ln();
            }
            ln_det *= na::convert::<f64, N>(2.);
            let m = na::convert::<f64, N>(info.residual.nrows() as f64);
            let half = na::convert::<f64, N>(0.5);
            info.log_likelihood = Some(-half * (mahalanobis_squared + ln_det + m * N::two_pi().ln()));
        }

        Ok(info)
    }
}

/// A measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement<N> {
    pub value: N,
    pub variance: N,
}

/// Measurements at an instant.
///
/// Each channel is optional. The true values are only used for consistency checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements<N> {
    pub time: N,
    pub position: Option<Measurement<N>>,
    pub speed: Option<Measurement<N>>,
    pub true_position: N,
    pub true_speed: N,
}

impl<N> Measurements<N> {
    /// True when at least one channel is present.
    pub fn any(&self) -> bool {
        self.position.is_some() || self.speed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use na::{Matrix1, Vector1};

    #[test]
    fn update_info_scalar() {
        let S = Matrix1::new(4.0);
        let SI = Matrix1::new(0.25);
        let options = ObserveOptions {
            gate: Some(1.5),
            theta: None,
            normalized_innovation: true,
            likelihood: true,
        };
        let info = UpdateInfo::new(Vector1::new(2.0), Some((&S, &SI)), &options).unwrap();
        assert!(!info.gated);
        assert_eq!(info.normalized_innovation, Some(1.0));
        let expected = -0.5 * (1.0 + 4.0f64.ln() + (2.0 * std::f64::consts::PI).ln());
        assert_relative_eq!(info.log_likelihood.unwrap(), expected, epsilon = 1e-14);

        let rejected = UpdateInfo::new(Vector1::new(4.0), Some((&S, &SI)), &ObserveOptions::gated(Some(1.5))).unwrap();
        assert!(rejected.gated);
        assert_eq!(rejected.normalized_innovation, None);
    }

    #[test]
    fn update_info_without_options() {
        let info = UpdateInfo::<f64, na::U1>::new(Vector1::new(2.0), None, &ObserveOptions::default()).unwrap();
        assert!(!info.gated);
        assert_eq!(info.log_likelihood, None);
        assert!(UpdateInfo::<f64, na::U1>::new(Vector1::new(2.0), None, &ObserveOptions::gated(Some(1.0))).is_err());
    }
}
