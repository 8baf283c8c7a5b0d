//! Test Rauch-Tung-Striebel smoothing of tracked estimates.

use approx::assert_relative_eq;
use na::{Matrix2, Vector2, U2};
use nalgebra as na;
use rand::rngs::StdRng;
use rand::SeedableRng;

use bayes_track::filters::{create_filter, FilterKind};
use bayes_track::models::{KalmanState, Measurements};
use bayes_track::simulator::{simulate, without_speed, SimulatorConfig};
use bayes_track::smoother::{smooth_all, smooth_lag, Prediction, StepRecord};
use bayes_track::tracker::{Tracker, TrackerConfig};

/// Track the measurements, returning the step records.
fn track(ms: &[Measurements<f64>]) -> Vec<StepRecord<f64, U2>> {
    let mut tracker = Tracker::new(TrackerConfig::default(), create_filter(FilterKind::Ekf));
    ms.iter()
        .filter_map(|m| tracker.update(m).unwrap())
        .map(|estimate| estimate.record)
        .collect()
}

fn simulated(length: usize, seed: u64) -> Vec<Measurements<f64>> {
    let config = SimulatorConfig {
        length,
        ..SimulatorConfig::default()
    };
    without_speed(&simulate(&config, &mut StdRng::seed_from_u64(seed)).unwrap())
}

fn expect_same(a: &[KalmanState<f64, U2>], b: &[KalmanState<f64, U2>]) {
    assert_eq!(a.len(), b.len());
    for (sa, sb) in a.iter().zip(b) {
        assert_relative_eq!(sa.x, sb.x, max_relative = 1e-12, epsilon = 1e-12);
        assert_relative_eq!(sa.X, sb.X, max_relative = 1e-12, epsilon = 1e-12);
    }
}

#[test]
fn test_lag_zero_is_filtered() {
    let records = track(&simulated(100, 1));
    let filtered: Vec<_> = records.iter().map(StepRecord::state).collect();
    assert_eq!(smooth_lag(&records, 0).unwrap(), filtered);
}

#[test]
fn test_long_lag_is_all() {
    let records = track(&simulated(100, 2));
    let all = smooth_all(&records).unwrap();
    assert_eq!(all.len(), records.len());
    expect_same(&smooth_lag(&records, records.len()).unwrap(), &all);
    expect_same(&smooth_lag(&records, records.len() + 10).unwrap(), &all);
}

#[test]
fn test_last_is_filtered() {
    let records = track(&simulated(50, 3));
    let all = smooth_all(&records).unwrap();
    let last = records.last().unwrap().state();
    expect_same(&all[all.len() - 1..], &[last]);

    // A lag smoother emits the last record unsmoothed too
    let lagged = smooth_lag(&records, 5).unwrap();
    assert_eq!(lagged.len(), records.len());
    assert_relative_eq!(lagged[lagged.len() - 1].x, records[records.len() - 1].x);
}

#[test]
#[allow(non_snake_case)]
fn test_smoothed_variance_smaller() {
    let records = track(&simulated(200, 4));
    for lag in [1, 5, 20].iter() {
        let smoothed = smooth_lag(&records, *lag).unwrap();
        for (s, r) in smoothed.iter().zip(&records) {
            assert!(s.X[(0, 0)] <= r.X[(0, 0)] * (1. + 1e-12));
            assert!(s.X[(1, 1)] <= r.X[(1, 1)] * (1. + 1e-12));
        }
    }

    // More lag, more smoothing, in the middle of the records
    let lag_1 = smooth_lag(&records, 1).unwrap();
    let lag_20 = smooth_lag(&records, 20).unwrap();
    assert!(lag_20[100].X[(0, 0)] < lag_1[100].X[(0, 0)]);
}

#[test]
fn test_smoothed_error_smaller() {
    let ms = simulated(1000, 5);
    let records = track(&ms);
    let smoothed = smooth_all(&records).unwrap();

    let mut filtered_error = 0.;
    let mut smoothed_error = 0.;
    for ((m, r), s) in ms.iter().zip(&records).zip(&smoothed) {
        filtered_error += (r.x[0] - m.true_position).powi(2);
        smoothed_error += (s.x[0] - m.true_position).powi(2);
    }
    assert!(smoothed_error < filtered_error);
}

#[test]
fn test_segments_not_crossed() {
    let mut ms = simulated(60, 6);
    // A gap resets the tracker at record 30
    for m in ms[30..].iter_mut() {
        m.time += 100.;
    }
    let records = track(&ms);
    assert!(records[30].predict.is_none());
    assert_eq!(records.iter().filter(|r| r.predict.is_none()).count(), 2);

    let first_segment = smooth_all(&records[..30]).unwrap();
    let second_segment = smooth_all(&records[30..]).unwrap();
    let all = smooth_all(&records).unwrap();
    expect_same(&all[..30], &first_segment);
    expect_same(&all[30..], &second_segment);

    for lag in [1, 4].iter() {
        let lagged = smooth_lag(&records, *lag).unwrap();
        let mut separate = smooth_lag(&records[..30], *lag).unwrap();
        separate.extend(smooth_lag(&records[30..], *lag).unwrap());
        expect_same(&lagged, &separate);
        // The end of the first segment is not smoothed
        assert_relative_eq!(lagged[29].x, records[29].x);
    }
}

#[test]
#[allow(non_snake_case)]
fn test_prediction_not_pd() {
    let X = Matrix2::new(1., 0., 0., 1.);
    let records = vec![
        StepRecord {
            time: 0.,
            predict: None,
            x: Vector2::new(0., 1.),
            X,
        },
        StepRecord {
            time: 1.,
            predict: Some(Prediction {
                F: Matrix2::new(1., 1., 0., 1.),
                x: Vector2::new(1., 1.),
                X: Matrix2::zeros(),
            }),
            x: Vector2::new(1., 1.),
            X,
        },
    ];
    assert_eq!(smooth_all(&records), Err("predicted X not PD in smooth"));
    assert_eq!(smooth_lag(&records, 1), Err("predicted X not PD in smooth"));
    assert_eq!(smooth_all::<f64, U2>(&[]), Ok(vec![]));
}
