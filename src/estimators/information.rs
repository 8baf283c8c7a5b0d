#![allow(non_snake_case)]

//! Information state estimation.
//!
//! A discrete Bayesian estimator that uses a linear information representation of the system for estimation.
//! The state vector x is kept explicitly together with the information matrix I, the inverse of the state covariance.
//! The state covariance is only computed when required and is then cached until the next predict or observe.
//!
//! A fundamental property of the information state is that information is additive. So if there is more information
//! about the system (such as by an observation) this can simply be added to i,I of the information state.
//!
//! The linear representation can also be used for non-linear systems by using linearised models.

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, RealField, VectorN, U1};
use nalgebra as na;

use crate::estimators::covariance::fading_memory_factor;
use crate::linalg::udu;
use crate::matrix::{check_positive, inverse_pd, symmetrise};
use crate::models::{InformationState, KalmanEstimator, KalmanState, ObserveOptions, UpdateInfo};

/// Extended information filter.
#[derive(PartialEq, Clone, Debug)]
pub struct InformationFilter<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State vector
    pub x: VectorN<N, D>,
    /// Information matrix (symmetric positive semi-definite)
    pub I: MatrixN<N, D>,
    /// State covariance, when known
    X: Option<MatrixN<N, D>>,
}

impl<N: RealField, D: Dim> InformationState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn new_zero(d: D) -> InformationState<N, D> {
        InformationState {
            i: VectorN::zeros_generic(d, U1),
            I: MatrixN::zeros_generic(d, d),
        }
    }

    /// Accumulate independent information.
    pub fn add(&mut self, information: &InformationState<N, D>) {
        self.i += &information.i;
        self.I += &information.I;
    }
}

impl<N: RealField, D: Dim> InformationFilter<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// A filter with a zero state and no information.
    pub fn new_zero(d: D) -> InformationFilter<N, D> {
        InformationFilter {
            x: VectorN::zeros_generic(d, U1),
            I: MatrixN::zeros_generic(d, d),
            X: None,
        }
    }

    /// The cached state covariance.
    pub fn p(&self) -> Option<&MatrixN<N, D>> {
        self.X.as_ref()
    }

    /// The state covariance, the cached value or the inverse of the information.
    pub fn covariance(&self) -> Result<MatrixN<N, D>, &'static str> {
        match &self.X {
            Some(X) => Ok(X.clone()),
            None => {
                let mut X = self.I.clone();
                let rcond = udu::inverse_pd(&mut X);
                check_positive(rcond, "I not PD")?;
                Ok(X)
            }
        }
    }

    /// Compute and cache the state covariance.
    pub fn cache_covariance(&mut self) -> Result<&MatrixN<N, D>, &'static str> {
        if self.X.is_none() {
            self.X = Some(self.covariance()?);
        }
        self.X.as_ref().ok_or("I not PD")
    }

    /// Extended information prediction with additive noise.
    ///
    /// Computation is through the information only, the covariance prediction X = alpha².Fx.X.Fx' + Q is
    /// applied with the matrix inversion lemma
    /// I = inv(Q) - inv(Q).Fx.inv(I/alpha² + Fx'.inv(Q).Fx).Fx'.inv(Q)
    /// which does not require the information to be invertible.
    ///
    /// `noise_inv` is the inverse of the process noise covariance.
    ///
    /// The Jacobian `fj` is evaluated at the predicted state.
    ///
    /// Return: the state transition Jacobian used
    pub fn predict_extended(
        &mut self,
        f: impl Fn(&VectorN<N, D>) -> VectorN<N, D>,
        fj: impl Fn(&VectorN<N, D>) -> MatrixN<N, D>,
        noise_inv: &MatrixN<N, D>,
        fading_memory_alpha: N,
    ) -> Result<MatrixN<N, D>, &'static str> {
        let factor = fading_memory_factor(fading_memory_alpha)?;

        let x = f(&self.x);
        let Fx = fj(&x);
        // Fx'.inv(Q)
        let FtQI = Fx.transpose() * noise_inv;
        let mut B = &self.I / factor + &FtQI * &Fx;
        let rcond = udu::inverse_pd(&mut B);
        check_positive(rcond, "(I/alpha² + Fx'.inv(Q).Fx) not PD in predict")?;

        self.I = noise_inv.clone();
        self.I.quadform_tr(-N::one(), &FtQI.transpose(), &B, N::one());
        symmetrise(&mut self.I);
        self.x = x;
        self.X = None;

        Ok(Fx)
    }

    /// Prediction over no time, only the fading memory is applied: I = I/alpha².
    pub fn fade(&mut self, fading_memory_alpha: N) -> Result<(), &'static str> {
        let factor = fading_memory_factor(fading_memory_alpha)?;
        if factor != N::one() {
            self.I /= factor;
            self.X = None;
        }
        Ok(())
    }

    /// Extended information observation with additive noise.
    ///
    /// I += Hx'.inv(R).Hx and x = add(x, inv(I).Hx'.inv(R).s) where s = residual(z, h(x)).
    /// The state update is solved through the Cholesky factor of the information.
    ///
    /// `noise_inv` is the inverse of the observation noise covariance.
    /// The innovation covariance is only computed, from the state covariance, when `options` require it.
    pub fn observe_extended<ZD: Dim>(
        &mut self,
        h: impl Fn(&VectorN<N, D>) -> VectorN<N, ZD>,
        hj: impl Fn(&VectorN<N, D>) -> MatrixMN<N, ZD, D>,
        noise_inv: &MatrixN<N, ZD>,
        z: &VectorN<N, ZD>,
        add: impl Fn(&VectorN<N, D>, &VectorN<N, D>) -> VectorN<N, D>,
        residual: impl Fn(&VectorN<N, ZD>, &VectorN<N, ZD>) -> VectorN<N, ZD>,
        options: &ObserveOptions<N>,
    ) -> Result<UpdateInfo<N, ZD>, &'static str>
    where
        DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, ZD, D> + Allocator<N, D, ZD> + Allocator<N, ZD>,
    {
        if options.theta.is_some() {
            return Err("H infinity not supported by the information filter");
        }
        let Hx = hj(&self.x);

        let S = if options.needs_innovation_covariance() {
            // S = Hx.X.Hx' + R
            let mut S = inverse_pd(noise_inv, "inv(R) not PD in observe")?;
            S.quadform_tr(N::one(), &Hx, &self.covariance()?, N::one());
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

        // Observation Information
        let HxTZI = Hx.transpose() * noise_inv;
        self.I += &HxTZI * &Hx;
        symmetrise(&mut self.I);

        let dx = self
            .I
            .clone()
            .cholesky()
            .ok_or("I not PD in observe")?
            .solve(&(&HxTZI * &info.residual));
        self.x = add(&self.x, &dx);
        self.X = None;

        Ok(info)
    }

    /// Linear observation information.
    ///
    /// i = Hx'.inv(R).z, I = Hx'.inv(R).Hx
    pub fn observe_info<ZD: Dim>(
        &self,
        hx: &MatrixMN<N, ZD, D>,
        noise_inv: &MatrixN<N, ZD>,
        z: &VectorN<N, ZD>,
    ) -> InformationState<N, D>
    where
        DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, ZD, D> + Allocator<N, D, ZD> + Allocator<N, ZD>,
    {
        let HxTZI = hx.transpose() * noise_inv;
        InformationState {
            i: &HxTZI * z,
            I: &HxTZI * hx,
        }
    }

    /// Add linear observation information.
    ///
    /// The information state of the filter i = I.x is added to, the state is recovered by solving I.x = i.
    pub fn add_information(&mut self, information: &InformationState<N, D>) -> Result<(), &'static str> {
        let mut state = InformationState {
            i: &self.I * &self.x,
            I: self.I.clone(),
        };
        state.add(information);
        symmetrise(&mut state.I);

        self.x = state
            .I
            .clone()
            .cholesky()
            .ok_or("I not PD in add_information")?
            .solve(&state.i);
        self.I = state.I;
        self.X = None;

        Ok(())
    }
}

impl<N: RealField, D: Dim> KalmanEstimator<N, D> for InformationFilter<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, &'static str> {
        // Information
        let mut I = state.X.clone();
        let rcond = udu::inverse_pd(&mut I);
        check_positive(rcond, "X not PD")?;

        self.I = I;
        self.x = state.x.clone();
        self.X = Some(state.X.clone());

        Ok(rcond)
    }

    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), &'static str> {
        let rcond = udu::rcond_psd(&self.I);
        check_positive(rcond, "I not PD")?;

        Ok((
            rcond,
            KalmanState {
                x: self.x.clone(),
                X: self.covariance()?,
            },
        ))
    }
}
