//! Simulation of a constant velocity motion with measurements of the position and speed.
//!
//! The speed is sampled at each time step and the position advances by the average of consecutive speeds.

use rand_core::RngCore;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::models::{Measurement, Measurements};

/// Simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Number of measurements
    pub length: usize,
    pub dt: f64,
    pub init_position: f64,
    pub velocity_mean: f64,
    pub velocity_variance: f64,
    pub measurement_variance_position: f64,
    pub measurement_variance_speed: f64,
    /// Include the speed channel in the measurements
    pub speed_measurements: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            length: 1000,
            dt: 1.,
            init_position: 0.,
            velocity_mean: 1.,
            velocity_variance: 0.1 * 0.1,
            measurement_variance_position: 3. * 3.,
            measurement_variance_speed: 0.03 * 0.03,
            speed_measurements: true,
        }
    }
}

fn normal(mean: f64, variance: f64) -> Result<Normal<f64>, &'static str> {
    if !(variance >= 0.) {
        return Err("simulator variance negative");
    }
    Normal::new(mean, variance.sqrt()).map_err(|_| "simulator normal distribution")
}

/// Simulate measurements with the random number generator `rng`.
pub fn simulate<R: RngCore>(config: &SimulatorConfig, rng: &mut R) -> Result<Vec<Measurements<f64>>, &'static str> {
    if !(config.dt > 0.) {
        return Err("simulator dt not positive");
    }
    let velocity = normal(config.velocity_mean, config.velocity_variance)?;
    let position_noise = normal(0., config.measurement_variance_position)?;
    let speed_noise = normal(0., config.measurement_variance_speed)?;

    let mut measurements = Vec::with_capacity(config.length);
    let mut x = config.init_position;
    let mut v = velocity.sample(rng);

    for i in 0..config.length {
        let position = Measurement {
            value: x + position_noise.sample(rng),
            variance: config.measurement_variance_position,
        };
        let speed = if config.speed_measurements {
            Some(Measurement {
                value: v + speed_noise.sample(rng),
                variance: config.measurement_variance_speed,
            })
        } else {
            None
        };
        measurements.push(Measurements {
            time: i as f64 * config.dt,
            position: Some(position),
            speed,
            true_position: x,
            true_speed: v,
        });

        let next_v = velocity.sample(rng);
        x += (v + next_v) / 2. * config.dt;
        v = next_v;
    }

    Ok(measurements)
}

/// The measurements without the speed channel.
pub fn without_speed(measurements: &[Measurements<f64>]) -> Vec<Measurements<f64>> {
    measurements.iter().map(|m| Measurements { speed: None, ..*m }).collect()
}
