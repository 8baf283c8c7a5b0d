#![allow(non_snake_case)]

//! Tracking of position and speed from a measurement stream.
//!
//! A [`Tracker`] feeds measurements into a [`MoveFilter`]. The filter is reset with the first position measurement and
//! again after a gap in the measurements, otherwise it predicts to the measurement time and updates with the measured
//! channels. Each accepted measurement gives an [`Estimate`] with the record of the step for smoothing.
//!
//! The normalized estimation error squared of the position and speed is accumulated from the true values of the
//! measurements.

use na::{Matrix2, RealField, Vector2, U2};
use nalgebra as na;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::consistency::NormalizedSquared;
use crate::filters::MoveFilter;
use crate::models::Measurements;
use crate::noise::NoiseModel;
use crate::smoother::{Prediction, StepRecord};

/// Tracker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig<N> {
    /// Speed when resetting without a speed measurement
    pub init_v: N,
    /// Speed variance when resetting without a speed measurement
    pub init_v_variance: N,
    pub noise_model: NoiseModel<N>,
    /// 1 for no fading memory
    pub fading_memory_alpha: N,
    /// The filter is reset when measurements are this far apart
    pub reset_dt: N,
    /// Mahalanobis distance gate of the observations
    pub gate: Option<N>,
}

impl<N: RealField> Default for TrackerConfig<N> {
    fn default() -> Self {
        TrackerConfig {
            init_v: N::zero(),
            init_v_variance: na::convert::<f64, N>(2.),
            noise_model: NoiseModel::Discrete {
                variance: na::convert::<f64, N>(0.01),
            },
            fading_memory_alpha: N::one(),
            reset_dt: na::convert::<f64, N>(10.),
            gate: None,
        }
    }
}

/// Estimate after a measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate<N: RealField> {
    pub time: N,
    pub position: N,
    pub position_stddev: N,
    pub speed: N,
    pub speed_stddev: N,
    /// The measurement was rejected by the gate
    pub gated: bool,
    pub record: StepRecord<N, U2>,
}

impl<N: RealField> Estimate<N> {
    fn new(time: N, predict: Option<Prediction<N, U2>>, x: Vector2<N>, X: Matrix2<N>, gated: bool) -> Self {
        Estimate {
            time,
            position: x[0],
            position_stddev: X[(0, 0)].sqrt(),
            speed: x[1],
            speed_stddev: X[(1, 1)].sqrt(),
            gated,
            record: StepRecord { time, predict, x, X },
        }
    }
}

pub struct Tracker<N: RealField> {
    config: TrackerConfig<N>,
    filter: Box<dyn MoveFilter<N>>,
    nees: NormalizedSquared<N>,
    last_time: Option<N>,
}

impl<N: RealField> Tracker<N> {
    pub fn new(config: TrackerConfig<N>, filter: Box<dyn MoveFilter<N>>) -> Self {
        Tracker {
            config,
            filter,
            nees: NormalizedSquared::new(),
            last_time: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.filter.name()
    }

    /// Forget the last measurement time, the next position measurement resets the filter.
    pub fn reset(&mut self) {
        self.last_time = None;
    }

    /// NEES of the position and speed over all updates.
    pub fn nees(&self) -> &NormalizedSquared<N> {
        &self.nees
    }

    /// Track a measurement.
    ///
    /// Return: None when the measurement is not used
    pub fn update(&mut self, m: &Measurements<N>) -> Result<Option<Estimate<N>>, &'static str> {
        if !m.any() {
            return Ok(None);
        }

        let reset_dt = self.config.reset_dt;
        let last_time = match self.last_time.filter(|&last_time| m.time - last_time < reset_dt) {
            Some(last_time) => last_time,
            None => return self.reset_filter(m),
        };

        let dt = m.time - last_time;
        if dt < N::zero() {
            return Err("measurement time decreasing");
        }

        let F = self
            .filter
            .predict(dt, &self.config.noise_model, self.config.fading_memory_alpha)?;
        self.last_time = Some(m.time);
        let predict = Prediction {
            F,
            x: self.filter.position_speed()?,
            X: self.filter.position_speed_p()?,
        };

        let gate = self.config.gate;
        let gated = match (&m.position, &m.speed) {
            (Some(position), Some(speed)) => self.filter.update_position_speed(position, speed, gate)?.gated,
            (Some(position), None) => self.filter.update_position(position, gate)?.gated,
            (None, Some(speed)) => self.filter.update_speed(speed, gate)?.gated,
            (None, None) => return Ok(None),
        };
        if gated {
            debug!(filter = self.filter.name(), time = ?m.time, "measurement gated");
        }

        let x = self.filter.position_speed()?;
        let X = self.filter.position_speed_p()?;
        self.nees.add(&(Vector2::new(m.true_position, m.true_speed) - x), &X)?;
        trace!(filter = self.filter.name(), time = ?m.time, position = ?x[0], speed = ?x[1], "update");

        Ok(Some(Estimate::new(m.time, Some(predict), x, X, gated)))
    }

    fn reset_filter(&mut self, m: &Measurements<N>) -> Result<Option<Estimate<N>>, &'static str> {
        let position = match &m.position {
            Some(position) => position,
            None => return Ok(None),
        };
        let (v, v_variance) = match &m.speed {
            Some(speed) => (speed.value, speed.variance),
            None => (self.config.init_v, self.config.init_v_variance),
        };

        let x = Vector2::new(position.value, v);
        let X = Matrix2::from_diagonal(&Vector2::new(position.variance, v_variance));
        self.filter.reset(&x, &X)?;
        self.last_time = Some(m.time);
        debug!(filter = self.filter.name(), time = ?m.time, "reset");

        Ok(Some(Estimate::new(m.time, None, x, X, false)))
    }
}
