#![allow(non_snake_case)]

//! Covariance state estimation.
//!
//! A discrete Bayesian estimator that uses a Kalman state representation [`KalmanState`] of the system for estimation.
//! The Kalman state is simply the x,X pair the dimensions of both are the dimensions of the system.
//!
//! The linear Kalman state representation is used for non-linear systems by using linearised forms of the system model,
//! the Extended Kalman filter. The observation can optionally be made robust with the H infinity gain.
//!
//! [`KalmanState`]: ../../models/struct.KalmanState.html

use na::{allocator::Allocator, storage::Storage, DefaultAllocator, Dim, MatrixMN, MatrixN, RealField, VectorN};
use nalgebra as na;

use crate::linalg::udu;
use crate::matrix::{check_non_negativ, inverse_pd};
use crate::models::{KalmanEstimator, KalmanState, ObserveOptions, UpdateInfo};
use crate::noise::CorrelatedNoise;

impl<N: RealField, D: Dim> KalmanEstimator<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, &'static str> {
        let rcond = udu::rcond_psd(&state.X);
        check_non_negativ(rcond, "X not PSD")?;
        self.x = state.x.clone();
        self.X = state.X.clone();

        Ok(rcond)
    }

    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), &'static str> {
        Ok((N::one(), self.clone()))
    }
}

/// Checks the fading memory factor, it may only discount old information.
pub(crate) fn fading_memory_factor<N: RealField>(fading_memory_alpha: N) -> Result<N, &'static str> {
    if fading_memory_alpha >= N::one() {
        Ok(fading_memory_alpha * fading_memory_alpha)
    } else {
        Err("fading memory alpha < 1")
    }
}

impl<N: RealField, D: Dim> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Extended state prediction with additive noise.
    ///
    /// The state transition Jacobian `fj` is evaluated at the predicted state.
    /// X = alpha².Fx.X.Fx' + Q
    ///
    /// Return: the state transition Jacobian used
    pub fn predict_extended(
        &mut self,
        f: impl Fn(&VectorN<N, D>) -> VectorN<N, D>,
        fj: impl Fn(&VectorN<N, D>) -> MatrixN<N, D>,
        noise: &CorrelatedNoise<N, D>,
        fading_memory_alpha: N,
    ) -> Result<MatrixN<N, D>, &'static str> {
        let factor = fading_memory_factor(fading_memory_alpha)?;

        self.x = f(&self.x);
        let Fx = fj(&self.x);
        self.X.quadform_tr(factor, &Fx, &self.X.clone(), N::zero());
        self.X += &noise.Q;

        Ok(Fx)
    }

    /// Extended observation with additive noise.
    ///
    /// The innovation is `residual(z, h(x))` and the state update is applied with `add`.
    /// The state covariance is updated in the Joseph form (I-K.Hx).X.(I-K.Hx)' + K.R.K'.
    ///
    /// With a gate the observation is rejected, leaving the state unchanged, when the Mahalanobis distance
    /// of the innovation exceeds the gate. With `theta` the gain is the H infinity gain.
    pub fn observe_extended<ZD: Dim>(
        &mut self,
        h: impl Fn(&VectorN<N, D>) -> VectorN<N, ZD>,
        hj: impl Fn(&VectorN<N, D>) -> MatrixMN<N, ZD, D>,
        noise: &CorrelatedNoise<N, ZD>,
        z: &VectorN<N, ZD>,
        add: impl Fn(&VectorN<N, D>, &VectorN<N, D>) -> VectorN<N, D>,
        residual: impl Fn(&VectorN<N, ZD>, &VectorN<N, ZD>) -> VectorN<N, ZD>,
        options: &ObserveOptions<N>,
    ) -> Result<UpdateInfo<N, ZD>, &'static str>
    where
        DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, ZD, D> + Allocator<N, D, ZD> + Allocator<N, ZD>,
    {
        let Hx = hj(&self.x);
        let XHt = &self.X * Hx.transpose();

        // S = Hx.X.Hx' + R, only when required
        let S = if options.theta.is_none() || options.needs_innovation_covariance() {
            let S = &Hx * &XHt + &noise.Q;
            let SI = inverse_pd(&S, "S not PD in observe")?;
            Some((S, SI))
        } else {
            None
        };

        let s = residual(z, &h(&self.x));
        let info = UpdateInfo::new(s, S.as_ref().map(|(S, SI)| (S, SI)), options)?;
        if info.gated {
            return Ok(info);
        }

        let W = match (options.theta, &S) {
            (Some(theta), _) => h_infinity_gain(theta, &self.X, &Hx, &noise.Q)?,
            // Kalman gain, X*Hx'*SI
            (None, Some((_, SI))) => &XHt * SI,
            (None, None) => return Err("S required in observe"),
        };

        // State update
        self.x = add(&self.x, &(&W * &info.residual));

        let shape = self.X.data.shape();
        let IWH = MatrixN::<N, D>::identity_generic(shape.0, shape.1) - &W * &Hx;
        self.X.quadform_tr(N::one(), &IWH, &self.X.clone(), N::zero());
        self.X.quadform_tr(N::one(), &W, &noise.Q, N::one());

        Ok(info)
    }
}

/// H infinity gain.
///
/// K = inv(M).Hx'.inv(R) where M = inv(X) - theta.I + Hx'.inv(R).Hx must be positive definite.
/// Equal to X.inv(I - theta.X + Hx'.inv(R).Hx.X).Hx'.inv(R).
pub fn h_infinity_gain<N: RealField, D: Dim, ZD: Dim>(
    theta: N,
    X: &MatrixN<N, D>,
    Hx: &MatrixMN<N, ZD, D>,
    R: &MatrixN<N, ZD>,
) -> Result<MatrixMN<N, D, ZD>, &'static str>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, ZD, ZD> + Allocator<N, ZD, D> + Allocator<N, D, ZD> + Allocator<N, D>,
{
    let HtRI = Hx.transpose() * inverse_pd(R, "R not PD in observe")?;

    let shape = X.data.shape();
    let M = inverse_pd(X, "X not PD in observe")? - MatrixN::<N, D>::identity_generic(shape.0, shape.1) * theta
        + &HtRI * Hx;
    let M = M.cholesky().ok_or("H infinity condition does not hold, M not PD")?;

    Ok(M.solve(&HtRI))
}
