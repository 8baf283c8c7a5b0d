#![allow(non_snake_case)]

//! Extended information filter of position and speed.
//!
//! Prediction requires the inverse of the process noise, the continuous noise model must be used.

use na::{Matrix2, RealField, Vector1, Vector2, U1, U2};
use nalgebra as na;

use super::{model, MoveFilter, NOT_RESET};
use crate::estimators::information::InformationFilter;
use crate::models::{KalmanEstimator, KalmanState, Measurement, ObserveOptions, UpdateInfo};
use crate::noise::{process_covariance, NoiseModel};

pub struct InfoFilter<N: RealField> {
    filter: Option<InformationFilter<N, U2>>,
}

impl<N: RealField> InfoFilter<N> {
    pub fn new() -> Self {
        InfoFilter { filter: None }
    }

    fn filter_mut(&mut self) -> Result<&mut InformationFilter<N, U2>, &'static str> {
        self.filter.as_mut().ok_or(NOT_RESET)
    }

    fn filter(&self) -> Result<&InformationFilter<N, U2>, &'static str> {
        self.filter.as_ref().ok_or(NOT_RESET)
    }
}

impl<N: RealField> Default for InfoFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: RealField> MoveFilter<N> for InfoFilter<N> {
    fn reset(&mut self, x: &Vector2<N>, X: &Matrix2<N>) -> Result<(), &'static str> {
        let mut filter = InformationFilter::new_zero(U2);
        filter.init(&KalmanState { x: *x, X: *X })?;
        self.filter = Some(filter);
        Ok(())
    }

    fn predict(&mut self, dt: N, noise: &NoiseModel<N>, fading_memory_alpha: N) -> Result<Matrix2<N>, &'static str> {
        let filter = self.filter_mut()?;
        if dt == N::zero() {
            // No process noise to invert
            filter.fade(fading_memory_alpha)?;
            return Ok(Matrix2::identity());
        }
        let QI = process_covariance(dt, noise)?.inverse()?;
        let F = model::f(dt);
        filter.predict_extended(|x| F * x, |_| F, &QI, fading_memory_alpha)
    }

    fn update_position(&mut self, position: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str> {
        let RI = model::noise_1(position).inverse()?;
        self.filter_mut()?.observe_extended(
            model::position_h,
            |_| model::position_hj(),
            &RI,
            &Vector1::new(position.value),
            model::add,
            model::residual,
            &ObserveOptions::gated(gate),
        )
    }

    fn update_speed(&mut self, speed: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str> {
        let RI = model::noise_1(speed).inverse()?;
        self.filter_mut()?.observe_extended(
            model::speed_h,
            |_| model::speed_hj(),
            &RI,
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
        let RI = model::noise_2(position, speed).inverse()?;
        self.filter_mut()?.observe_extended(
            model::position_speed_h,
            |_| model::position_speed_hj(),
            &RI,
            &Vector2::new(position.value, speed.value),
            model::add,
            model::residual,
            &ObserveOptions::gated(gate),
        )
    }

    fn position_speed(&self) -> Result<Vector2<N>, &'static str> {
        Ok(self.filter()?.x)
    }

    fn position_speed_p(&self) -> Result<Matrix2<N>, &'static str> {
        self.filter()?.covariance()
    }

    fn name(&self) -> &'static str {
        "INFO"
    }
}
