use crate::error::KinematicsError;
use crate::vector::{sum, RealVector};

/// Complete a set of momenta with the leg fixed by momentum conservation:
/// p_n = -(p_1 + ... + p_{n-1}).
pub fn close_momenta(momenta: &[RealVector]) -> Vec<RealVector> {
    let mut closed = momenta.to_vec();
    closed.push(-sum(momenta.iter().copied()));
    closed
}

/// True if every component of the total momentum is within `tol` of zero.
pub fn is_conserved(momenta: &[RealVector], tol: f64) -> bool {
    sum(momenta.iter().copied())
        .components()
        .iter()
        .all(|c| c.abs() <= tol)
}

/// Reorder the legs: position `i` of the result holds `momenta[order[i]]`.
pub fn permute(momenta: &[RealVector], order: &[usize]) -> Result<Vec<RealVector>, KinematicsError> {
    let n = momenta.len();
    let mut seen = vec![false; n];
    if order.len() != n {
        return Err(KinematicsError::InvalidPermutation(order.to_vec(), n));
    }
    for &idx in order {
        if idx >= n || seen[idx] {
            return Err(KinematicsError::InvalidPermutation(order.to_vec(), n));
        }
        seen[idx] = true;
    }
    Ok(order.iter().map(|&idx| momenta[idx]).collect())
}

/// Cyclic reordering: leg `by` comes first.
pub fn rotate(momenta: &[RealVector], by: usize) -> Vec<RealVector> {
    let mut rotated = momenta.to_vec();
    if !rotated.is_empty() {
        rotated.rotate_left(by % momenta.len());
    }
    rotated
}
