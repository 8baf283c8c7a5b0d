//! Test the numerical operations of estimator implementations.
//!
//! [`covariance`], [`information`] and [`unscented`] linearised estimator implementations are tested, the covariance
//! estimator both with the Kalman gain and the H infinity gain.
//!
//! Tests are performed with Dynamic matrices and matrices with fixed dimensions.

use na::Dynamic;
use na::U2;
use nalgebra as na;

use bayes_track::estimators::information::InformationFilter;
use bayes_track::models::KalmanState;
use fat_estimators::*;

mod fat_estimators;

#[test]
fn test_covariance() {
    simple::test_estimator(&mut KalmanState::new_zero(U2));
    simple::test_estimator(&mut KalmanState::new_zero(Dynamic::new(2)));
}

#[test]
fn test_h_infinity() {
    simple::test_estimator(&mut FatHInfinity::new_zero(U2, 1e-6));
    simple::test_estimator(&mut FatHInfinity::new_zero(Dynamic::new(2), 1e-6));
}

#[test]
fn test_information() {
    simple::test_estimator(&mut InformationFilter::new_zero(U2));
    simple::test_estimator(&mut InformationFilter::new_zero(Dynamic::new(2)));
}

#[test]
fn test_unscented() {
    simple::test_estimator(&mut FatUnscented::new_zero(U2, 1.));
    simple::test_estimator(&mut FatUnscented::new_zero(Dynamic::new(2), 1.));
}

pub mod simple {
    use approx;
    use na::base::storage::Storage;
    use na::{allocator::Allocator, DefaultAllocator, U1};
    use na::{Dim, RealField};
    use na::{Matrix, Matrix1, Matrix1x2, Matrix2, MatrixMN, Vector1, Vector2, VectorN};
    use nalgebra as na;
    use num_traits::pow;

    use bayes_track::models::{KalmanEstimator, KalmanState};
    use bayes_track::noise::{CorrelatedNoise, UncorrelatedNoise};

    use super::fat_estimators::*;

    const DT: f64 = 0.01;
    // Velocity noise, giving mean squared error bound
    const V_GAMMA: f64 = 1.;
    // Velocity correlation, giving velocity change time constant
    const V_NOISE: f64 = 0.2;
    // Position noise, keeps the prediction noise invertible
    const P_NOISE: f64 = 0.001;

    // Filter's Initial state uncertainty
    const I_P_NOISE: f64 = 2.;
    const I_V_NOISE: f64 = 0.1;
    // Noise on observing system state
    const OBS_NOISE: f64 = 0.1;

    /// Simple prediction model.
    fn fx<D: Dim>(x: &VectorN<f64, D>) -> VectorN<f64, D>
    where
        DefaultAllocator: Allocator<f64, D>,
    {
        let f_vv: f64 = (-DT * V_GAMMA).exp();

        let mut xp = x.clone();
        xp[0] += DT * x[1];
        xp[1] *= f_vv;
        xp
    }

    /// Simple observation model.
    fn hx<D: Dim>(x: &VectorN<f64, D>) -> Vector1<f64>
    where
        DefaultAllocator: Allocator<f64, D>,
    {
        Vector1::new(x[0])
    }

    /// Numerically test the estimation operations of a FatEstimator.
    ///
    /// Prediction und observation operations are performed and the expected KalmanState is checked.
    pub fn test_estimator<D: Dim>(est: &mut dyn FatEstimator<D>)
    where
        DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D> + Allocator<f64, U1, D> + Allocator<f64, D, U1> + Allocator<usize, D, D> + Allocator<usize, D>,
    {
        let d = est.dim();

        let f_vv: f64 = (-DT * V_GAMMA).exp();

        let linear_pred_model = new_copy(d, d, Matrix2::new(1., DT, 0., f_vv));
        let additive_noise = CorrelatedNoise::from_uncorrelated(&UncorrelatedNoise {
            q: new_copy(d, U1, Vector2::new(pow(P_NOISE, 2), DT * pow((1. - f_vv) * V_NOISE, 2))),
        });

        let linear_obs_model = new_copy(U1, d, Matrix1x2::new(1.0, 0.0));
        let co_obs_noise: CorrelatedNoise<f64, U1> = CorrelatedNoise {
            Q: Matrix1::new(pow(OBS_NOISE, 2)),
        };
        let z = &Vector1::new(1000.);

        let init_state: KalmanState<f64, D> = KalmanState {
            x: new_copy(d, U1, Vector2::new(1000., 1.5)),
            X: new_copy(d, d, Matrix2::new(pow(I_P_NOISE, 2), 0.0, 0.0, pow(I_V_NOISE, 2))),
        };

        est.init(&init_state).unwrap();

        for _c in 0..2 {
            est.predict_fn(fx, &linear_pred_model, &additive_noise).unwrap();
            let info = est.observe(z, hx, &linear_obs_model, &co_obs_noise).unwrap();
            assert!(!info.gated);
        }

        est.observe(z, hx, &linear_obs_model, &co_obs_noise).unwrap();

        let (_, xx) = est.kalman_state().unwrap();
        println!("final={:.6}{:.6}", xx.x, xx.X);

        expect_state(&xx, est.allow_error_by());
    }

    /// Test the KalmanState is as expected.
    fn expect_state<D: Dim>(state: &KalmanState<f64, D>, allow_by: f64)
    where
        DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
    {
        let expect_x = Vector2::new(1000.0049703221783, 1.4702009314100237);
        approx::assert_relative_eq!(state.x[0], expect_x[0], max_relative = 1e-10 * allow_by);
        approx::assert_relative_eq!(state.x[1], expect_x[1], max_relative = 1e-7 * allow_by);

        approx::assert_abs_diff_eq!(state.X[(0, 0)], 0.003330779146876059, epsilon = 1e-10 * allow_by);
        approx::assert_abs_diff_eq!(state.X[(0, 1)], 3.2479485595304966e-05, epsilon = 1e-10 * allow_by);
        approx::assert_abs_diff_eq!(state.X[(1, 0)], 3.2479485595304966e-05, epsilon = 1e-10 * allow_by);
        approx::assert_abs_diff_eq!(state.X[(1, 1)], 0.009607338434337673, epsilon = 1e-10 * allow_by);
    }

    /// Create a Dynamic or Static copy.
    fn new_copy<N: RealField, R: Dim, C: Dim, R1: Dim, C1: Dim, S1: Storage<N, R1, C1>>(
        r: R,
        c: C,
        m: Matrix<N, R1, C1, S1>,
    ) -> MatrixMN<N, R, C>
    where
        DefaultAllocator: Allocator<N, R, C>,
    {
        MatrixMN::<N, R, C>::from_iterator_generic(r, c, m.iter().cloned())
    }
}
