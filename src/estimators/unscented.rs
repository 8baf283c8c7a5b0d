#![allow(non_snake_case)]

//! 'Unscented' state estimation.
//!
//! A discrete Bayesian estimator that uses the [`KalmanState`] linear representation of the system.
//! The 'Unscented' transform is used for non-linear state predictions and observation.
//!
//! The 'Unscented' transform interpolates the non-linear predict and observe function.
//! Implements the scaled sigma points of Van der Merwe with beta = 2 and kappa = 3 - n.
//!
//! [`KalmanState`]: ../../models/struct.KalmanState.html

use na::{allocator::Allocator, storage::Storage, DefaultAllocator, Dim, MatrixMN, MatrixN, RealField, VectorN, U1};
use nalgebra as na;

use crate::estimators::covariance::fading_memory_factor;
use crate::linalg::udu;
use crate::matrix::{check_non_negativ, inverse_pd, symmetrise};
use crate::models::{KalmanState, ObserveOptions, UpdateInfo};
use crate::noise::CorrelatedNoise;

/// Sigma point generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaPoints<N: RealField> {
    alpha: N,
    beta: N,
}

/// Mean and covariance weights of the sigma points.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights<N> {
    pub wm: Vec<N>,
    pub wc: Vec<N>,
}

impl<N: RealField> SigmaPoints<N> {
    pub fn new(alpha: N) -> Self {
        SigmaPoints {
            alpha,
            beta: na::convert::<f64, N>(2.),
        }
    }

    /// n + lambda, where lambda = alpha².(n + kappa) - n.
    fn scale(&self, n: usize) -> Result<N, &'static str> {
        if !(self.alpha > N::zero()) {
            return Err("sigma points alpha not positive");
        }
        let n = na::convert::<f64, N>(n as f64);
        let kappa = na::convert::<f64, N>(3.) - n;
        Ok(self.alpha * self.alpha * (n + kappa))
    }

    /// The weights of the 2n+1 sigma points of an n dimensional state.
    pub fn weights(&self, n: usize) -> Result<Weights<N>, &'static str> {
        let scale = self.scale(n)?;
        let lambda = scale - na::convert::<f64, N>(n as f64);
        let w = N::one() / (na::convert::<f64, N>(2.) * scale);

        let mut wm = vec![w; 2 * n + 1];
        let mut wc = wm.clone();
        wm[0] = lambda / scale;
        wc[0] = wm[0] + (N::one() - self.alpha * self.alpha + self.beta);

        Ok(Weights { wm, wc })
    }

    /// Sigma points with the mean x and covariance X.
    ///
    /// Point 0 is x, points 2i+1 and 2i+2 are x plus and minus column i of sqrt((n+lambda).X).
    /// The root U.sqrt(d) comes from the UdU' factor of X, so a singular PSD X is accepted.
    pub fn points<D: Dim>(&self, x: &VectorN<N, D>, X: &MatrixN<N, D>) -> Result<(Vec<VectorN<N, D>>, Weights<N>), &'static str>
    where
        DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
    {
        let n = x.nrows();
        let weights = self.weights(n)?;
        let scale = self.scale(n)?.sqrt();

        let mut sigma = X.clone();
        check_non_negativ(udu::factor(&mut sigma), "sigma points X not PSD")?;
        for j in 0..n {
            let s = sigma[(j, j)].sqrt() * scale;
            sigma[(j, j)] = s;
            for i in 0..j {
                sigma[(i, j)] *= s;
            }
            for i in j + 1..n {
                sigma[(i, j)] = N::zero();
            }
        }

        let mut UU: Vec<VectorN<N, D>> = Vec::with_capacity(2 * n + 1);
        UU.push(x.clone());
        for c in 0..n {
            let sigmaCol = sigma.column(c);
            UU.push(x + &sigmaCol);
            UU.push(x - &sigmaCol);
        }

        Ok((UU, weights))
    }
}

/// Weighted mean and covariance of points.
pub fn unscented_transform<N: RealField, D: Dim>(XX: &[VectorN<N, D>], weights: &Weights<N>) -> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, U1, D>,
{
    assert_eq!(XX.len(), weights.wm.len(), "sigma point count");
    let mut state = KalmanState::new_zero(XX[0].data.shape().0);

    for (Xi, w) in XX.iter().zip(&weights.wm) {
        state.x += Xi * *w;
    }
    for (Xi, w) in XX.iter().zip(&weights.wc) {
        let XXi = Xi - &state.x;
        state.X += &XXi * XXi.transpose() * *w;
    }

    state
}

impl<N: RealField, D: Dim> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, U1, D>,
{
    /// State prediction with a functional prediction model and additive noise.
    ///
    /// X = alpha².UT(f) + Q
    pub fn predict_unscented(
        &mut self,
        sigma: &SigmaPoints<N>,
        f: impl Fn(&VectorN<N, D>) -> VectorN<N, D>,
        noise: &CorrelatedNoise<N, D>,
        fading_memory_alpha: N,
    ) -> Result<(), &'static str> {
        let factor = fading_memory_factor(fading_memory_alpha)?;

        // Predict points of XX using supplied predict model
        let (UU, weights) = sigma.points(&self.x, &self.X)?;
        let FF: Vec<_> = UU.iter().map(|u| f(u)).collect();

        let predicted = unscented_transform(&FF, &weights);
        self.x = predicted.x;
        self.X = predicted.X * factor + &noise.Q;
        symmetrise(&mut self.X);

        Ok(())
    }

    /// Observation with a functional observation model and additive noise.
    ///
    /// Sigma points are drawn from the current x,X. The covariance is updated as X - K.S.K'.
    pub fn observe_unscented<ZD: Dim>(
        &mut self,
        sigma: &SigmaPoints<N>,
        h: impl Fn(&VectorN<N, D>) -> VectorN<N, ZD>,
        noise: &CorrelatedNoise<N, ZD>,
        z: &VectorN<N, ZD>,
        add: impl Fn(&VectorN<N, D>, &VectorN<N, D>) -> VectorN<N, D>,
        residual: impl Fn(&VectorN<N, ZD>, &VectorN<N, ZD>) -> VectorN<N, ZD>,
        options: &ObserveOptions<N>,
    ) -> Result<UpdateInfo<N, ZD>, &'static str>
    where
        DefaultAllocator: Allocator<N, D, ZD> + Allocator<N, ZD, ZD> + Allocator<N, U1, ZD> + Allocator<N, ZD>,
    {
        if options.theta.is_some() {
            return Err("H infinity not supported by the unscented filter");
        }

        // Predict points of ZZ using supplied observation model
        let (UU, weights) = sigma.points(&self.x, &self.X)?;
        let ZZ: Vec<_> = UU.iter().map(|u| h(u)).collect();

        // Mean and covariance of observation distribution
        let zZ = unscented_transform(&ZZ, &weights);
        let S = zZ.X + &noise.Q;
        let SI = inverse_pd(&S, "S not PD in observe")?;

        // Correlation of state with observation: Xxz
        let mut XZ = MatrixMN::<N, D, ZD>::zeros_generic(self.x.data.shape().0, zZ.x.data.shape().0);
        for ((Ui, Zi), w) in UU.iter().zip(&ZZ).zip(&weights.wc) {
            XZ += (Ui - &self.x) * (Zi - &zZ.x).transpose() * *w;
        }

        let s = residual(z, &zZ.x);
        let info = UpdateInfo::new(s, Some((&S, &SI)), options)?;
        if info.gated {
            return Ok(info);
        }

        // Kalman gain, Xxz*SI
        let W = &XZ * SI;

        // State update
        self.x = add(&self.x, &(&W * &info.residual));
        // X -= W.S.W'
        self.X.quadform_tr(-N::one(), &W, &S, N::one());
        symmetrise(&mut self.X);

        Ok(info)
    }
}
