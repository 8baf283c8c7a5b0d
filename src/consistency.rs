#![allow(non_snake_case)]

//! Estimator consistency checks.
//!
//! [`NormalizedSquared`] accumulates the normalized estimation error squared (NEES) e'.inv(X).e.
//! For a consistent n dimensional estimator the average is close to n.
//!
//! [`Distribution`] is a histogram of errors in units of the estimated standard deviation.

use std::fmt;

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField, VectorN};
use nalgebra as na;
use num_traits::ToPrimitive;

use crate::matrix::inverse_pd;

/// Running sum of normalized squared errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSquared<N> {
    sum: N,
    count: usize,
}

impl<N: RealField> Default for NormalizedSquared<N> {
    fn default() -> Self {
        NormalizedSquared {
            sum: N::zero(),
            count: 0,
        }
    }
}

impl<N: RealField> NormalizedSquared<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add error'.inv(X).error.
    pub fn add<D: Dim>(&mut self, error: &VectorN<N, D>, X: &MatrixN<N, D>) -> Result<(), &'static str>
    where
        DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
    {
        let XI = inverse_pd(X, "X not PD in normalized squared")?;
        self.sum += error.dot(&(XI * error));
        self.count += 1;
        Ok(())
    }

    /// Add the scalar error²/variance.
    pub fn add_1(&mut self, error: N, variance: N) -> Result<(), &'static str> {
        if !(variance > N::zero()) {
            return Err("variance not positive in normalized squared");
        }
        self.sum += error * error / variance;
        self.count += 1;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// The average, an error when nothing has been added.
    pub fn average(&self) -> Result<N, &'static str> {
        if self.count == 0 {
            return Err("no normalized squared values");
        }
        Ok(self.sum / na::convert::<f64, N>(self.count as f64))
    }
}

impl<N: RealField> fmt::Display for NormalizedSquared<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.average() {
            Ok(average) => write!(f, "average {} (count {})", average, self.count),
            Err(_) => write!(f, "empty"),
        }
    }
}

/// Histogram of |error| / stddev in bins of width 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    bins: Vec<usize>,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<N: RealField + ToPrimitive>(&mut self, error: N, stddev: N) -> Result<(), &'static str> {
        if !(stddev > N::zero()) {
            return Err("stddev not positive in distribution");
        }
        let bin = (error.abs() / stddev).floor().to_usize().ok_or("error not finite in distribution")?;
        if bin >= self.bins.len() {
            self.bins.resize(bin + 1, 0);
        }
        self.bins[bin] += 1;
        Ok(())
    }

    /// Counts of each bin, bin i counts i <= |error|/stddev < i+1.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    pub fn count(&self) -> usize {
        self.bins.iter().sum()
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.count().max(1) as f64;
        for (i, &n) in self.bins.iter().enumerate() {
            writeln!(f, "{:>3}: {:>6} {:.3}", i, n, n as f64 / count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use na::{Matrix2, Vector2};

    #[test]
    fn normalized_squared() {
        let mut nees = NormalizedSquared::new();
        assert!(nees.average().is_err());
        assert_eq!(nees.to_string(), "empty");

        nees.add(&Vector2::new(2.0, 1.0), &Matrix2::new(4.0, 0.0, 0.0, 1.0)).unwrap();
        nees.add_1(3.0, 9.0).unwrap();
        assert_eq!(nees.count(), 2);
        assert_relative_eq!(nees.average().unwrap(), 1.5, epsilon = 1e-15);
        assert!(nees.add_1(1.0, 0.0).is_err());
    }

    #[test]
    fn distribution() {
        let mut d = Distribution::new();
        d.add(0.5, 1.0).unwrap();
        d.add(-1.5, 1.0).unwrap();
        d.add(6.0, 2.0).unwrap();
        d.add(-0.1, 2.0).unwrap();
        assert_eq!(d.bins(), &[2, 1, 0, 1]);
        assert_eq!(d.count(), 4);
        assert!(d.add(f64::NAN, 1.0).is_err());
        assert!(d.add(1.0, 0.0).is_err());
    }
}
