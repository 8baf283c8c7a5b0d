#![allow(non_snake_case)]

//! Position and speed filters.
//!
//! The constant velocity [`model`] bound to each of the estimators behind the [`MoveFilter`] trait.
//! Filters are created from a [`FilterKind`].

use na::{Matrix2, RealField, Vector2, U1, U2};
use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::models::{Measurement, UpdateInfo};
use crate::noise::NoiseModel;

pub mod ekf;
pub mod info;
pub mod model;
pub mod ukf;

pub use ekf::EkfFilter;
pub use info::InfoFilter;
pub use ukf::UkfFilter;

pub(crate) const NOT_RESET: &str = "filter not reset";

/// A filter of position and speed.
///
/// All operations fail before the filter is reset.
pub trait MoveFilter<N: RealField>: Send {
    /// Reset to the state x with covariance X.
    fn reset(&mut self, x: &Vector2<N>, X: &Matrix2<N>) -> Result<(), &'static str>;

    /// Predict over `dt`.
    ///
    /// Return: the state transition matrix of the prediction
    fn predict(&mut self, dt: N, noise: &NoiseModel<N>, fading_memory_alpha: N) -> Result<Matrix2<N>, &'static str>;

    fn update_position(&mut self, position: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str>;

    fn update_speed(&mut self, speed: &Measurement<N>, gate: Option<N>) -> Result<UpdateInfo<N, U1>, &'static str>;

    fn update_position_speed(
        &mut self,
        position: &Measurement<N>,
        speed: &Measurement<N>,
        gate: Option<N>,
    ) -> Result<UpdateInfo<N, U2>, &'static str>;

    fn position_speed(&self) -> Result<Vector2<N>, &'static str>;

    fn position_speed_p(&self) -> Result<Matrix2<N>, &'static str>;

    fn name(&self) -> &'static str;

    fn position(&self) -> Result<N, &'static str> {
        Ok(self.position_speed()?[0])
    }

    fn position_p(&self) -> Result<N, &'static str> {
        Ok(self.position_speed_p()?[(0, 0)])
    }

    fn speed(&self) -> Result<N, &'static str> {
        Ok(self.position_speed()?[1])
    }

    fn speed_p(&self) -> Result<N, &'static str> {
        Ok(self.position_speed_p()?[(1, 1)])
    }
}

/// The kinds of filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterKind<N> {
    /// Extended Kalman filter
    Ekf,
    /// Extended Kalman filter with the H infinity gain
    HInfinity { theta: N },
    /// Extended information filter
    Information,
    /// Unscented Kalman filter
    Unscented { alpha: N },
}

/// Create a filter, it must be reset before use.
pub fn create_filter<N: RealField>(kind: FilterKind<N>) -> Box<dyn MoveFilter<N>> {
    match kind {
        FilterKind::Ekf => Box::new(EkfFilter::new(None)),
        FilterKind::HInfinity { theta } => Box::new(EkfFilter::new(Some(theta))),
        FilterKind::Information => Box::new(InfoFilter::new()),
        FilterKind::Unscented { alpha } => Box::new(UkfFilter::new(alpha)),
    }
}
