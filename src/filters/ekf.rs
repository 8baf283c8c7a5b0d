#![allow(non_snake_case)]

//! Extended Kalman filter of position and speed, optionally with the H infinity gain.

use na::{Matrix2, RealField, Vector1, Vector2, U1, U2};
use nalgebra as na;

use super::{model, MoveFilter, NOT_RESET};
use crate::models::{KalmanEstimator, KalmanState, Measurement, ObserveOptions, UpdateInfo};
use crate::noise::{process_covariance, NoiseModel};

pub struct EkfFilter<N: RealField> {
    state: Option<KalmanState<N, U2>>,
    theta: Option<N>,
}

impl<N: RealField> EkfFilter<N> {
    /// With `theta` the observations use the H infinity gain.
    pub fn new(theta: Option<N>) -> Self {
        EkfFilter { state: None, theta }
    }

    fn state_mut(&mut self) -> Result<&mut KalmanState<N, U2>, &'static str> {
        self.state.as_mut().ok_or(NOT_RESET)
    }

    fn options(&self, gate: Option<N>) -> ObserveOptions<N> {
        ObserveOptions {
            theta: self.theta,
            ..ObserveOptions::gated(gate)
        }
    }
}

impl<N: RealField> MoveFilter<N> for EkfFilter<N> {
    fn reset(&mut self, x: &Vector2<N>, X: &Matrix2<N>) -> Result<(), &'static str> {
        let mut state = KalmanState::new_zero(U2);
        state.init(&KalmanState { x: *x, X: *X })?;
        self.state = Some(state);
        Ok(())
    }

    fn predict(&mut self, dt: N, noise: &NoiseModel<N>, fading_memory_alpha: N) -> Result<Matrix2<N>, &'static str> {
        let state = self.state_mut()?;
        let Q = process_covariance(dt, noise)?;
        let F = model::f(dt);
        state.predict_extended(|x| F * x, |_| F, &Q, fading_memory_alpha)
    }

    fn update_position(&mut self, position: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str> {
        let options = self.options(gate);
        self.state_mut()?.observe_extended(
            model::position_h,
            |_| model::position_hj(),
            &model::noise_1(position),
            &Vector1::new(position.value),
            model::add,
            model::residual,
            &options,
        )
    }

    fn update_speed(&mut self, speed: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str> {
        let options = self.options(gate);
        self.state_mut()?.observe_extended(
            model::speed_h,
            |_| model::speed_hj(),
            &model::noise_1(speed),
            &Vector1::new(speed.value),
            model::add,
            model::residual,
            &options,
        )
    }

    fn update_position_speed(
        &mut self,
        position: &Measurement<N>,
        speed: &Measurement<N>,
        gate: Option<N>,
    ) -> Result<UpdateInfo<N, U2>, &'static str> {
        let options = self.options(gate);
        self.state_mut()?.observe_extended(
            model::position_speed_h,
            |_| model::position_speed_hj(),
            &model::noise_2(position, speed),
            &Vector2::new(position.value, speed.value),
            model::add,
            model::residual,
            &options,
        )
    }

    fn position_speed(&self) -> Result<Vector2<N>, &'static str> {
        Ok(self.state.as_ref().ok_or(NOT_RESET)?.x)
    }

    fn position_speed_p(&self) -> Result<Matrix2<N>, &'static str> {
        Ok(self.state.as_ref().ok_or(NOT_RESET)?.X)
    }

    fn name(&self) -> &'static str {
        match self.theta {
            None => "EKF",
            Some(_) => "H_INFINITY",
        }
    }
}
