#![allow(non_snake_case)]

//! Unscented Kalman filter of position and speed.

use na::{Matrix2, RealField, Vector1, Vector2, U1, U2};
use nalgebra as na;

use super::{model, MoveFilter, NOT_RESET};
use crate::estimators::unscented::SigmaPoints;
use crate::models::{KalmanEstimator, KalmanState, Measurement, ObserveOptions, UpdateInfo};
use crate::noise::{process_covariance, NoiseModel};

pub struct UkfFilter<N: RealField> {
    state: Option<KalmanState<N, U2>>,
    sigma: SigmaPoints<N>,
}

impl<N: RealField> UkfFilter<N> {
    pub fn new(alpha: N) -> Self {
        UkfFilter {
            state: None,
            sigma: SigmaPoints::new(alpha),
        }
    }

    fn state_mut(&mut self) -> Result<(&mut KalmanState<N, U2>, &SigmaPoints<N>), &'static str> {
        Ok((self.state.as_mut().ok_or(NOT_RESET)?, &self.sigma))
    }
}

impl<N: RealField> MoveFilter<N> for UkfFilter<N> {
    fn reset(&mut self, x: &Vector2<N>, X: &Matrix2<N>) -> Result<(), &'static str> {
        let mut state = KalmanState::new_zero(U2);
        state.init(&KalmanState { x: *x, X: *X })?;
        self.state = Some(state);
        Ok(())
    }

    /// The transition matrix is returned for smoothing, the prediction itself is unscented.
    fn predict(&mut self, dt: N, noise: &NoiseModel<N>, fading_memory_alpha: N) -> Result<Matrix2<N>, &'static str> {
        let (state, sigma) = self.state_mut()?;
        let Q = process_covariance(dt, noise)?;
        let F = model::f(dt);
        state.predict_unscented(sigma, |x| F * x, &Q, fading_memory_alpha)?;
        Ok(F)
    }

    fn update_position(&mut self, position: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str> {
        let (state, sigma) = self.state_mut()?;
        state.observe_unscented(
            sigma,
            model::position_h,
            &model::noise_1(position),
            &Vector1::new(position.value),
            model::add,
            model::residual,
            &ObserveOptions::gated(gate),
        )
    }

    fn update_speed(&mut self, speed: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str> {
        let (state, sigma) = self.state_mut()?;
        state.observe_unscented(
            sigma,
            model::speed_h,
            &model::noise_1(speed),
            &Vector1::new(speed.value),
            model::add,
            model::residual,
            &ObserveOptions::gated(gate),
        )
    }

    fn update_position_speed(
        &mut self,
        position: &Measurement<N>,
        speed: &Measurement<N>,
        gate: Option<N>,
    ) -> Result<UpdateInfo<N, U2>, &'static str> {
        let (state, sigma) = self.state_mut()?;
        state.observe_unscented(
            sigma,
            model::position_speed_h,
            &model::noise_2(position, speed),
            &Vector2::new(position.value, speed.value),
            model::add,
            model::residual,
            &ObserveOptions::gated(gate),
        )
    }

    fn position_speed(&self) -> Result<Vector2<N>, &'static str> {
        Ok(self.state.as_ref().ok_or(NOT_RESET)?.x)
    }

    fn position_speed_p(&self) -> Result<Matrix2<N>, &'static str> {
        Ok(self.state.as_ref().ok_or(NOT_RESET)?.X)
    }

    fn name(&self) -> &'static str {
        "UKF"
    }
}
