#![allow(non_snake_case)]

//! Rauch-Tung-Striebel smoothing of filtered states.
//!
//! The smoother is applied to the per step records of a filter. A record without a prediction starts a new segment,
//! the filter was reset there, and smoothing never crosses the start of a segment.
//!
//! For records i and i+1 of a segment, backwards from the end of the segment:
//!   C = X[i].F[i+1]'.inv(Xpred[i+1])
//!   xs[i] = x[i] + C.(xs[i+1] - xpred[i+1])
//!   Xs[i] = X[i] + C.(Xs[i+1] - Xpred[i+1]).C'

use std::collections::VecDeque;

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField, VectorN};
use nalgebra as na;
use tracing::{debug, trace};

use crate::matrix::{inverse_pd, symmetrise};
use crate::models::KalmanState;

/// Prediction of a step.
#[derive(PartialEq, Clone, Debug)]
pub struct Prediction<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State transition Jacobian of the prediction
    pub F: MatrixN<N, D>,
    /// Predicted state
    pub x: VectorN<N, D>,
    /// Predicted state covariance
    pub X: MatrixN<N, D>,
}

/// The record of a filter step.
#[derive(PartialEq, Clone, Debug)]
pub struct StepRecord<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub time: N,
    /// None when the filter was reset at this step
    pub predict: Option<Prediction<N, D>>,
    /// Updated state
    pub x: VectorN<N, D>,
    /// Updated state covariance
    pub X: MatrixN<N, D>,
}

impl<N: RealField, D: Dim> StepRecord<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn state(&self) -> KalmanState<N, D> {
        KalmanState {
            x: self.x.clone(),
            X: self.X.clone(),
        }
    }
}

/// Consecutive records of one segment.
struct Segment<'a, N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    records: VecDeque<&'a StepRecord<N, D>>,
}

impl<'a, N: RealField, D: Dim> Segment<'a, N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn new() -> Self {
        Segment { records: VecDeque::new() }
    }

    fn with_capacity(capacity: usize) -> Self {
        Segment {
            records: VecDeque::with_capacity(capacity),
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn push(&mut self, record: &'a StepRecord<N, D>) {
        self.records.push_back(record);
    }

    fn pop_front(&mut self) {
        self.records.pop_front();
    }

    /// Smoothed states of all records.
    fn smooth(&self) -> Result<Vec<KalmanState<N, D>>, &'static str> {
        let n = self.records.len();
        let mut smoothed: Vec<KalmanState<N, D>> = Vec::with_capacity(n);
        let last = match self.records.back() {
            Some(last) => last,
            None => return Ok(smoothed),
        };
        smoothed.push(last.state());

        for i in (0..n - 1).rev() {
            let record = self.records[i];
            let next = self.records[i + 1].predict.as_ref().ok_or("prediction required in smooth")?;
            let later = &smoothed[smoothed.len() - 1];

            let C = &record.X * next.F.transpose() * inverse_pd(&next.X, "predicted X not PD in smooth")?;
            let x = &record.x + &C * (&later.x - &next.x);
            let mut X = record.X.clone();
            X.quadform_tr(N::one(), &C, &(&later.X - &next.X), N::one());
            symmetrise(&mut X);

            smoothed.push(KalmanState { x, X });
        }

        smoothed.reverse();
        Ok(smoothed)
    }

    /// Smooth and empty the segment, appending the smoothed states.
    fn flush(&mut self, output: &mut Vec<KalmanState<N, D>>) -> Result<(), &'static str> {
        if !self.records.is_empty() {
            debug!(records = self.records.len(), "smooth segment");
        }
        output.extend(self.smooth()?);
        self.records.clear();
        Ok(())
    }
}

/// Smooth all records.
///
/// Each segment is smoothed with all the records of the segment.
/// The output has a smoothed state for each record.
pub fn smooth_all<N: RealField, D: Dim>(records: &[StepRecord<N, D>]) -> Result<Vec<KalmanState<N, D>>, &'static str>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    let mut smoothed = Vec::with_capacity(records.len());
    let mut segment = Segment::new();

    for record in records {
        if record.predict.is_none() {
            segment.flush(&mut smoothed)?;
        }
        segment.push(record);
    }
    segment.flush(&mut smoothed)?;

    Ok(smoothed)
}

/// Fixed lag smoothing of the records.
///
/// A record is smoothed with at most `lag` later records of its segment.
/// With `lag` 0 the records are not smoothed.
pub fn smooth_lag<N: RealField, D: Dim>(
    records: &[StepRecord<N, D>],
    lag: usize,
) -> Result<Vec<KalmanState<N, D>>, &'static str>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    if lag == 0 {
        return Ok(records.iter().map(StepRecord::state).collect());
    }

    let mut smoothed = Vec::with_capacity(records.len());
    let mut window = Segment::with_capacity(lag + 1);

    for record in records {
        if record.predict.is_none() {
            window.flush(&mut smoothed)?;
        }
        window.push(record);
        if window.len() < lag + 1 {
            continue;
        }

        let first = window.smooth()?.swap_remove(0);
        trace!(time = ?window.records[0].time, "smooth lag");
        smoothed.push(first);
        window.pop_front();
    }
    window.flush(&mut smoothed)?;

    Ok(smoothed)
}
