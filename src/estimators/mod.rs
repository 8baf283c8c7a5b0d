//! A collection of Bayesian state estimators.

pub mod covariance;
pub mod information;
pub mod unscented;
