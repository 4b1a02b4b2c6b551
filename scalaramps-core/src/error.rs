use thiserror::Error;

/// Errors raised by the checked four-vector accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error("component index {0} out of range (expected 0..=3)")]
    IndexOutOfRange(usize),
}

/// Errors raised by the strict amplitude entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmplitudeError {
    #[error("number of legs and number of external momenta do not match: expected {expected}, got {actual}")]
    LegCountMismatch { expected: usize, actual: usize },
    #[error("a current needs at least one leg")]
    NoLegs,
    #[error("an amplitude needs at least 3 legs, configured with {0}")]
    TooFewLegs(usize),
    #[error("at most {max} legs are supported, configured with {legs}")]
    TooManyLegs { legs: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KinematicsError {
    #[error("leg ordering {0:?} is not a permutation of 0..{1}")]
    InvalidPermutation(Vec<usize>, usize),
}
