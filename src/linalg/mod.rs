//! Linear algebra support for the estimators.

pub mod rcond;
pub mod udu;
