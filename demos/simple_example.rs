//! Tracking of a simulated constant velocity motion.
//!
//! Each kind of filter tracks the same measurements. The estimates are smoothed and their consistency is checked
//! against the simulated true position and speed.

use rand::rngs::StdRng;
use rand::SeedableRng;

use bayes_track::consistency::{Distribution, NormalizedSquared};
use bayes_track::filters::{create_filter, FilterKind};
use bayes_track::noise::NoiseModel;
use bayes_track::simulator::{simulate, SimulatorConfig};
use bayes_track::smoother::{smooth_all, smooth_lag};
use bayes_track::tracker::{Tracker, TrackerConfig};

fn main() -> Result<(), &'static str> {
    let measurements = simulate(&SimulatorConfig::default(), &mut StdRng::seed_from_u64(1))?;

    let kinds = [
        FilterKind::Ekf,
        FilterKind::HInfinity { theta: 0.01 },
        FilterKind::Information,
        FilterKind::Unscented { alpha: 1. },
    ];
    for kind in kinds.iter() {
        let config = match kind {
            // The information filter requires an invertible process noise
            FilterKind::Information => TrackerConfig {
                noise_model: NoiseModel::Continuous { spectral_density: 0.01 },
                ..TrackerConfig::default()
            },
            _ => TrackerConfig::default(),
        };
        let mut tracker = Tracker::new(config, create_filter(*kind));

        let mut estimates = Vec::with_capacity(measurements.len());
        let mut distribution = Distribution::new();
        for m in measurements.iter() {
            if let Some(estimate) = tracker.update(m)? {
                distribution.add(estimate.position - m.true_position, estimate.position_stddev)?;
                estimates.push(estimate);
            }
        }
        let last = estimates.last().ok_or("no estimates")?;
        println!(
            "{}: position {:.3} ({:.3}) speed {:.4} ({:.4})",
            tracker.name(),
            last.position,
            last.position_stddev,
            last.speed,
            last.speed_stddev
        );
        println!("  NEES {}", tracker.nees());
        println!("  position error distribution {}", distribution);

        let records: Vec<_> = estimates.iter().map(|e| e.record.clone()).collect();
        for (name, smoothed) in [("all", smooth_all(&records)?), ("lag 10", smooth_lag(&records, 10)?)].iter() {
            let mut nees = NormalizedSquared::new();
            for (m, s) in measurements.iter().zip(smoothed) {
                nees.add_1(s.x[0] - m.true_position, s.X[(0, 0)])?;
            }
            println!("  smoothed {} position NEES {}", name, nees);
        }
    }

    Ok(())
}
