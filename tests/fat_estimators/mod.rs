//! Provide FatEstimator trait to allow for testing of many estimators with disparate requirements.
//!
//! This defines predict and observe operations using linearised models to be tested.
//!
//! Where necessary 'fat' estimator states are defined so that different operations of an estimator can be tested using
//! the FatEstimator trait.

use na::base::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, U1};
use na::{Dim, MatrixMN, MatrixN, Vector1, VectorN};
use nalgebra as na;

use bayes_track::estimators::information::InformationFilter;
use bayes_track::estimators::unscented::SigmaPoints;
use bayes_track::models::{KalmanEstimator, KalmanState, ObserveOptions, UpdateInfo};
use bayes_track::noise::CorrelatedNoise;

/// Define the estimator operations to be tested.
pub trait FatEstimator<D: Dim>: KalmanEstimator<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D> + Allocator<f64, U1, D> + Allocator<f64, D, U1>,
{
    fn dim(&self) -> D {
        self.kalman_state().unwrap().1.x.data.shape().0
    }

    fn allow_error_by(&self) -> f64 {
        1f64
    }

    /// Prediction with additive noise
    fn predict_fn(
        &mut self,
        f: fn(&VectorN<f64, D>) -> VectorN<f64, D>,
        fx: &MatrixN<f64, D>,
        noise: &CorrelatedNoise<f64, D>,
    ) -> Result<(), &'static str>;

    /// Observation with correlected noise
    fn observe(
        &mut self,
        z: &Vector1<f64>,
        h: fn(&VectorN<f64, D>) -> Vector1<f64>,
        hx: &MatrixMN<f64, U1, D>,
        noise: &CorrelatedNoise<f64, U1>,
    ) -> Result<UpdateInfo<f64, U1>, &'static str>;
}

/// Test covariance estimator operations defined on a KalmanState.
impl<D: Dim> FatEstimator<D> for KalmanState<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D> + Allocator<f64, U1, D> + Allocator<f64, D, U1>,
{
    fn predict_fn(
        &mut self,
        f: fn(&VectorN<f64, D>) -> VectorN<f64, D>,
        fx: &MatrixN<f64, D>,
        noise: &CorrelatedNoise<f64, D>,
    ) -> Result<(), &'static str> {
        self.predict_extended(f, |_| fx.clone(), noise, 1.).map(|_| ())
    }

    fn observe(
        &mut self,
        z: &Vector1<f64>,
        h: fn(&VectorN<f64, D>) -> Vector1<f64>,
        hx: &MatrixMN<f64, U1, D>,
        noise: &CorrelatedNoise<f64, U1>,
    ) -> Result<UpdateInfo<f64, U1>, &'static str> {
        self.observe_extended::<U1>(h, |_| hx.clone(), noise, z, |a, b| a + b, |a, b| a - b, &ObserveOptions::default())
    }
}

/// Test H infinity operations with a KalmanState.
pub struct FatHInfinity<D: Dim>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    pub state: KalmanState<f64, D>,
    pub theta: f64,
}

impl<D: Dim> FatHInfinity<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    pub fn new_zero(d: D, theta: f64) -> Self {
        FatHInfinity {
            state: KalmanState::new_zero(d),
            theta,
        }
    }
}

impl<D: Dim> KalmanEstimator<f64, D> for FatHInfinity<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    fn init(&mut self, state: &KalmanState<f64, D>) -> Result<f64, &'static str> {
        self.state.init(state)
    }

    fn kalman_state(&self) -> Result<(f64, KalmanState<f64, D>), &'static str> {
        self.state.kalman_state()
    }
}

impl<D: Dim> FatEstimator<D> for FatHInfinity<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D> + Allocator<f64, U1, D> + Allocator<f64, D, U1>,
{
    fn allow_error_by(&self) -> f64 {
        1e4
    }

    fn predict_fn(
        &mut self,
        f: fn(&VectorN<f64, D>) -> VectorN<f64, D>,
        fx: &MatrixN<f64, D>,
        noise: &CorrelatedNoise<f64, D>,
    ) -> Result<(), &'static str> {
        self.state.predict_fn(f, fx, noise)
    }

    fn observe(
        &mut self,
        z: &Vector1<f64>,
        h: fn(&VectorN<f64, D>) -> Vector1<f64>,
        hx: &MatrixMN<f64, U1, D>,
        noise: &CorrelatedNoise<f64, U1>,
    ) -> Result<UpdateInfo<f64, U1>, &'static str> {
        let options = ObserveOptions {
            theta: Some(self.theta),
            ..ObserveOptions::default()
        };
        self.state
            .observe_extended::<U1>(h, |_| hx.clone(), noise, z, |a, b| a + b, |a, b| a - b, &options)
    }
}

/// Test information estimator operations defined on an InformationFilter.
impl<D: Dim> FatEstimator<D> for InformationFilter<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D> + Allocator<f64, U1, D> + Allocator<f64, D, U1>,
{
    /// No information until initialised, the dimension is that of the state vector.
    fn dim(&self) -> D {
        self.x.data.shape().0
    }

    fn allow_error_by(&self) -> f64 {
        100f64
    }

    fn predict_fn(
        &mut self,
        f: fn(&VectorN<f64, D>) -> VectorN<f64, D>,
        fx: &MatrixN<f64, D>,
        noise: &CorrelatedNoise<f64, D>,
    ) -> Result<(), &'static str> {
        self.predict_extended(f, |_| fx.clone(), &noise.inverse()?, 1.).map(|_| ())
    }

    fn observe(
        &mut self,
        z: &Vector1<f64>,
        h: fn(&VectorN<f64, D>) -> Vector1<f64>,
        hx: &MatrixMN<f64, U1, D>,
        noise: &CorrelatedNoise<f64, U1>,
    ) -> Result<UpdateInfo<f64, U1>, &'static str> {
        let noise_inv = noise.inverse()?;
        self.observe_extended::<U1>(h, |_| hx.clone(), &noise_inv, z, |a, b| a + b, |a, b| a - b, &ObserveOptions::default())
    }
}

/// Test unscented operations with a KalmanState and sigma points.
pub struct FatUnscented<D: Dim>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    pub state: KalmanState<f64, D>,
    pub sigma: SigmaPoints<f64>,
}

impl<D: Dim> FatUnscented<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    pub fn new_zero(d: D, alpha: f64) -> Self {
        FatUnscented {
            state: KalmanState::new_zero(d),
            sigma: SigmaPoints::new(alpha),
        }
    }
}

impl<D: Dim> KalmanEstimator<f64, D> for FatUnscented<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    fn init(&mut self, state: &KalmanState<f64, D>) -> Result<f64, &'static str> {
        self.state.init(state)
    }

    fn kalman_state(&self) -> Result<(f64, KalmanState<f64, D>), &'static str> {
        self.state.kalman_state()
    }
}

impl<D: Dim> FatEstimator<D> for FatUnscented<D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D> + Allocator<f64, U1, D> + Allocator<f64, D, U1>,
{
    fn allow_error_by(&self) -> f64 {
        10f64
    }

    fn predict_fn(
        &mut self,
        f: fn(&VectorN<f64, D>) -> VectorN<f64, D>,
        _fx: &MatrixN<f64, D>,
        noise: &CorrelatedNoise<f64, D>,
    ) -> Result<(), &'static str> {
        self.state.predict_unscented(&self.sigma, f, noise, 1.)
    }

    fn observe(
        &mut self,
        z: &Vector1<f64>,
        h: fn(&VectorN<f64, D>) -> Vector1<f64>,
        _hx: &MatrixMN<f64, U1, D>,
        noise: &CorrelatedNoise<f64, U1>,
    ) -> Result<UpdateInfo<f64, U1>, &'static str> {
        self.state
            .observe_unscented::<U1>(&self.sigma, h, noise, z, |a, b| a + b, |a, b| a - b, &ObserveOptions::default())
    }
}
