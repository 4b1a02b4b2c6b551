//! Four-vectors over real or complex components with the (+,-,-,-) metric.
//!
//! Arithmetic between real and complex vectors is expressed through generic
//! operator impls keyed on the component types, so `real + complex`,
//! `complex * real` and friends promote to complex components exactly like
//! the underlying scalar arithmetic of `num-complex` does.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

use num_complex::Complex64;
use num_traits::{Num, Zero};

use crate::error::VectorError;

/// Scalar types a [`FourVector`] can carry: `f64` and `Complex64`.
pub trait Component:
    Num + Copy + Neg<Output = Self> + Into<Complex64> + fmt::Debug + fmt::Display
{
}

impl<T> Component for T where
    T: Num + Copy + Neg<Output = T> + Into<Complex64> + fmt::Debug + fmt::Display
{
}

/// A four-vector `(c0, c1, c2, c3)`, with `c0` the time-like component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourVector<T> {
    components: [T; 4],
}

pub type RealVector = FourVector<f64>;
pub type ComplexVector = FourVector<Complex64>;

impl<T: Component> FourVector<T> {
    pub fn new(c0: T, c1: T, c2: T, c3: T) -> Self {
        Self {
            components: [c0, c1, c2, c3],
        }
    }

    pub fn from_array(components: [T; 4]) -> Self {
        Self { components }
    }

    pub fn zero() -> Self {
        Self {
            components: [T::zero(); 4],
        }
    }

    pub fn components(&self) -> [T; 4] {
        self.components
    }

    /// Component at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..=3`.
    pub fn component(&self, index: usize) -> T {
        self[index]
    }

    pub fn try_component(&self, index: usize) -> Result<T, VectorError> {
        self.components
            .get(index)
            .copied()
            .ok_or(VectorError::IndexOutOfRange(index))
    }

    /// Overwrite the component at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..=3`.
    pub fn set_component(&mut self, index: usize, value: T) {
        self[index] = value;
    }

    pub fn try_set_component(&mut self, index: usize, value: T) -> Result<(), VectorError> {
        let slot = self
            .components
            .get_mut(index)
            .ok_or(VectorError::IndexOutOfRange(index))?;
        *slot = value;
        Ok(())
    }

    /// Lorentz product `a0*b0 - a1*b1 - a2*b2 - a3*b3`.
    pub fn dot(&self, other: &Self) -> T {
        *self * *other
    }

    /// Lorentz square `self · self`.
    pub fn square(&self) -> T {
        self.dot(self)
    }

    /// `sqrt(|Re(|c0|^2 - |c1|^2 - |c2|^2 - |c3|^2)|)`, evaluated on the
    /// components cast to complex.
    ///
    /// For real vectors this is the magnitude of the invariant mass. For
    /// complex vectors it uses the squared moduli of the components, not the
    /// complex Lorentz square.
    pub fn length(&self) -> f64 {
        let casted: [Complex64; 4] = self.components.map(Into::into);
        let squared = casted[1..]
            .iter()
            .fold(Complex64::from(casted[0].norm_sqr()), |acc, c| {
                acc - c.norm_sqr()
            });
        squared.re.abs().sqrt()
    }

    /// Spatial components `(c1, c2, c3)`.
    pub fn spatial(&self) -> [T; 3] {
        let [_, x, y, z] = self.components;
        [x, y, z]
    }
}

impl<T: Component> Default for FourVector<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Component> From<[T; 4]> for FourVector<T> {
    fn from(components: [T; 4]) -> Self {
        Self::from_array(components)
    }
}

impl From<RealVector> for ComplexVector {
    fn from(v: RealVector) -> Self {
        Self {
            components: v.components.map(Complex64::from),
        }
    }
}

impl<T> Index<usize> for FourVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.components.get(index) {
            Some(c) => c,
            None => panic!("four-vector component index {index} out of range (expected 0..=3)"),
        }
    }
}

impl<T> IndexMut<usize> for FourVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.components.get_mut(index) {
            Some(c) => c,
            None => panic!("four-vector component index {index} out of range (expected 0..=3)"),
        }
    }
}

impl<T: fmt::Display> fmt::Display for FourVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c0, c1, c2, c3] = &self.components;
        write!(f, "( {}, {}, {}, {} )", c0, c1, c2, c3)
    }
}

// --- vector (+|-) vector, same or mixed component kinds ---

impl<A, B> Add<FourVector<B>> for FourVector<A>
where
    A: Add<B> + Copy,
    B: Copy,
{
    type Output = FourVector<A::Output>;

    fn add(self, rhs: FourVector<B>) -> Self::Output {
        FourVector {
            components: std::array::from_fn(|i| self.components[i] + rhs.components[i]),
        }
    }
}

impl<A, B> Sub<FourVector<B>> for FourVector<A>
where
    A: Sub<B> + Copy,
    B: Copy,
{
    type Output = FourVector<A::Output>;

    fn sub(self, rhs: FourVector<B>) -> Self::Output {
        FourVector {
            components: std::array::from_fn(|i| self.components[i] - rhs.components[i]),
        }
    }
}

impl<T: Neg<Output = T> + Copy> Neg for FourVector<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            components: self.components.map(|c| -c),
        }
    }
}

// --- Lorentz product: vector * vector ---

impl<A, B, O> Mul<FourVector<B>> for FourVector<A>
where
    A: Mul<B, Output = O> + Copy,
    B: Copy,
    O: Sub<Output = O>,
{
    type Output = O;

    fn mul(self, rhs: FourVector<B>) -> O {
        let [a0, a1, a2, a3] = self.components;
        let [b0, b1, b2, b3] = rhs.components;
        a0 * b0 - a1 * b1 - a2 * b2 - a3 * b3
    }
}

/// Euclidean product of the spatial parts. Mixing real and complex operands
/// yields a complex result.
pub fn spatial_product<A, B, O>(a: &FourVector<A>, b: &FourVector<B>) -> O
where
    A: Mul<B, Output = O> + Copy,
    B: Copy,
    O: Zero + Add<Output = O>,
{
    (1..4).fold(O::zero(), |acc, i| acc + a.components[i] * b.components[i])
}

// --- scalar multiplication and division ---

impl<T: Mul<f64> + Copy> Mul<f64> for FourVector<T> {
    type Output = FourVector<T::Output>;

    fn mul(self, number: f64) -> Self::Output {
        FourVector {
            components: self.components.map(|c| c * number),
        }
    }
}

impl<T: Mul<Complex64> + Copy> Mul<Complex64> for FourVector<T> {
    type Output = FourVector<T::Output>;

    fn mul(self, number: Complex64) -> Self::Output {
        FourVector {
            components: self.components.map(|c| c * number),
        }
    }
}

impl<T: Copy> Mul<FourVector<T>> for f64
where
    f64: Mul<T>,
{
    type Output = FourVector<<f64 as Mul<T>>::Output>;

    fn mul(self, v: FourVector<T>) -> Self::Output {
        FourVector {
            components: v.components.map(|c| self * c),
        }
    }
}

impl<T: Copy> Mul<FourVector<T>> for Complex64
where
    Complex64: Mul<T>,
{
    type Output = FourVector<<Complex64 as Mul<T>>::Output>;

    fn mul(self, v: FourVector<T>) -> Self::Output {
        FourVector {
            components: v.components.map(|c| self * c),
        }
    }
}

impl<T: Div<f64> + Copy> Div<f64> for FourVector<T> {
    type Output = FourVector<T::Output>;

    fn div(self, number: f64) -> Self::Output {
        FourVector {
            components: self.components.map(|c| c / number),
        }
    }
}

impl<T: Div<Complex64> + Copy> Div<Complex64> for FourVector<T> {
    type Output = FourVector<T::Output>;

    fn div(self, number: Complex64) -> Self::Output {
        FourVector {
            components: self.components.map(|c| c / number),
        }
    }
}

// --- summation ---

/// Sum of a sequence of four-vectors, folded from the zero vector.
pub fn sum<T: Component>(momenta: impl IntoIterator<Item = FourVector<T>>) -> FourVector<T> {
    momenta
        .into_iter()
        .fold(FourVector::zero(), |acc, p| acc + p)
}

impl<T: Component> Sum for FourVector<T> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        sum(iter)
    }
}

impl<'a, T: Component> Sum<&'a FourVector<T>> for FourVector<T> {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        sum(iter.copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v2() -> RealVector {
        FourVector::new(1.0, 2.0, 3.0, 4.0)
    }

    fn v3() -> ComplexVector {
        FourVector::from_array([
            Complex64::new(3.0, 4.0),
            Complex64::new(5.0, 6.0),
            Complex64::new(7.0, 8.0),
            Complex64::new(9.0, 10.0),
        ])
    }

    #[test]
    fn test_default_is_zero() {
        let v: RealVector = FourVector::default();
        assert_eq!(v.components(), [0.0; 4]);
    }

    #[test]
    fn test_component_access() {
        let mut v = v2();
        assert_eq!(v.component(2), 3.0);
        v.set_component(2, 7.5);
        assert_eq!(v[2], 7.5);
        assert_eq!(v.try_component(4), Err(VectorError::IndexOutOfRange(4)));
        assert_eq!(
            v.try_set_component(9, 1.0),
            Err(VectorError::IndexOutOfRange(9))
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_component_out_of_range_panics() {
        let _ = v2().component(4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_component_out_of_range_panics() {
        let mut v = v2();
        v.set_component(7, 0.0);
    }

    #[test]
    fn test_same_kind_arithmetic() {
        let a = v2();
        let b = FourVector::new(0.5, -1.0, 2.0, 0.0);
        assert_eq!((a + b).components(), [1.5, 1.0, 5.0, 4.0]);
        assert_eq!((a - b).components(), [0.5, 3.0, 1.0, 4.0]);
        assert_eq!((-a).components(), [-1.0, -2.0, -3.0, -4.0]);
    }

    #[test]
    fn test_mixed_addition_promotes_to_complex() {
        let sum: ComplexVector = v2() + v3();
        assert_eq!(sum[0], Complex64::new(4.0, 4.0));
        let diff: ComplexVector = v3() - v2();
        assert_eq!(diff[3], Complex64::new(5.0, 10.0));
        let diff: ComplexVector = v2() - v3();
        assert_eq!(diff[1], Complex64::new(-3.0, -6.0));
    }

    #[test]
    fn test_lorentz_product() {
        assert_eq!(v2() * v2(), -28.0);
        assert_eq!(v2().square(), v2().dot(&v2()));
        let mixed: Complex64 = v2() * v3();
        assert_eq!(mixed, Complex64::new(-64.0, -72.0));
        let mixed: Complex64 = v3() * v2();
        assert_eq!(mixed, Complex64::new(-64.0, -72.0));
        assert_eq!(v3().square(), Complex64::new(38.0, -328.0));
    }

    #[test]
    fn test_scalar_multiplication_and_division() {
        let c = Complex64::new(5.0, 6.0);
        assert_eq!((v2() * 5.0).components(), [5.0, 10.0, 15.0, 20.0]);
        assert_eq!((5.0 * v2()).components(), [5.0, 10.0, 15.0, 20.0]);
        let promoted: ComplexVector = v2() * c;
        assert_eq!(promoted[1], Complex64::new(10.0, 12.0));
        let promoted: ComplexVector = c * v2();
        assert_eq!(promoted[1], Complex64::new(10.0, 12.0));
        assert_eq!((v2() / 2.0).components(), [0.5, 1.0, 1.5, 2.0]);
        let divided: ComplexVector = v3() / Complex64::new(0.0, 1.0);
        assert_eq!(divided[0], Complex64::new(4.0, -3.0));
    }

    #[test]
    fn test_length_and_negation() {
        assert_relative_eq!(v2().length(), 28.0_f64.sqrt());
        assert_relative_eq!(v2().length(), (-v2()).length());
        // 25 - 61 - 113 - 181
        assert_relative_eq!(v3().length(), 330.0_f64.sqrt());
        assert_relative_eq!(v3().length(), (-v3()).length());
    }

    #[test]
    fn test_spatial_part_and_product() {
        assert_eq!(v2().spatial(), [2.0, 3.0, 4.0]);
        assert_eq!(spatial_product(&v2(), &v2()), 29.0);
        let mixed: Complex64 = spatial_product(&v2(), &v3());
        assert_eq!(mixed, Complex64::new(67.0, 76.0));
    }

    #[test]
    fn test_sum_edge_cases() {
        let empty: Vec<RealVector> = Vec::new();
        assert_eq!(sum(empty), RealVector::zero());
        assert_eq!(sum([v2()]), v2());
        let total: RealVector = [v2(), -v2(), v2()].iter().sum();
        assert_eq!(total, v2());
    }

    #[test]
    fn test_promotion_and_display() {
        let promoted = ComplexVector::from(v2());
        assert_eq!(promoted[3], Complex64::new(4.0, 0.0));
        assert_eq!(v2().to_string(), "( 1, 2, 3, 4 )");
    }
}
