// Numeric substrate: four-vectors over real and complex components
pub mod vector;

// Recursion subsystem: leg subsets and the Berends-Giele engine
pub mod legs;
pub mod amplitude;

// Momentum bookkeeping for callers building external states
pub mod kinematics;

pub mod error;

// Public vector API
pub use crate::vector::{spatial_product, sum, Component, ComplexVector, FourVector, RealVector};

// Public engine API
pub use crate::amplitude::{EvaluationStats, ScalarTreeAmplitude, Theory, MAX_LEGS};
pub use crate::legs::{LegIndex, LegSet, Splits};
pub use crate::kinematics::{close_momenta, is_conserved, permute, rotate};
pub use crate::error::{AmplitudeError, KinematicsError, VectorError};

// Scalar types shared with callers
pub use num_complex::Complex64;
