//! Berends-Giele recursion for tree amplitudes of scalar φ³ theory.
//!
//! The amplitude of `n` legs is the amputated off-shell current of the
//! first `n - 1` legs; the last leg closes the tree through momentum
//! conservation. Currents are built bottom-up over all splits of a leg set
//! into two non-empty parts.

use std::collections::HashMap;

use num_complex::Complex64;
use num_traits::{One, Zero};
use tracing::{debug, trace, warn};

use crate::error::AmplitudeError;
use crate::legs::{LegSet, MAX_LEG_SET};
use crate::vector::{sum, RealVector};

/// Largest leg count the engine accepts: the `n - 1` recursion legs must fit
/// into a [`LegSet`].
pub const MAX_LEGS: usize = MAX_LEG_SET + 1;

const IMAGINARY_UNIT: Complex64 = Complex64::new(0.0, 1.0);

/// Which propagator the internal lines carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Theory {
    /// `i / p²`; currents are memoized per evaluation.
    Massless,
    /// `i / (p² - m²)`; currents are recomputed at every call site.
    Massive { mass: f64 },
}

/// Tree-level amplitude of massless or massive scalar φ³ theory.
///
/// The configuration is immutable. Every call to [`amplitude`] owns its own
/// current cache, so an engine can be reused for any number of evaluations
/// and shared between threads.
///
/// [`amplitude`]: ScalarTreeAmplitude::amplitude
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTreeAmplitude {
    n_legs: usize,
    coupling: f64,
    theory: Theory,
}

/// Bookkeeping of one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationStats {
    /// Off-shell currents evaluated from their splits.
    pub currents_computed: usize,
    /// Currents answered from the cache.
    pub cache_hits: usize,
    /// Splits visited across all amputated currents.
    pub splits_visited: usize,
}

impl Default for ScalarTreeAmplitude {
    /// One leg, unit coupling, massless. Not a configuration that can be
    /// evaluated.
    fn default() -> Self {
        Self {
            n_legs: 1,
            coupling: 1.0,
            theory: Theory::Massless,
        }
    }
}

impl ScalarTreeAmplitude {
    /// Massless theory with unit coupling.
    pub fn with_legs(n_legs: usize) -> Self {
        Self::new(n_legs, 1.0)
    }

    /// Massless theory.
    pub fn new(n_legs: usize, coupling: f64) -> Self {
        Self {
            n_legs,
            coupling,
            theory: Theory::Massless,
        }
    }

    /// Massive theory. A mass of zero still selects the unmemoized massive
    /// recursion; it agrees numerically with [`ScalarTreeAmplitude::new`].
    pub fn with_mass(n_legs: usize, coupling: f64, mass: f64) -> Self {
        Self {
            n_legs,
            coupling,
            theory: Theory::Massive { mass },
        }
    }

    pub fn n_legs(&self) -> usize {
        self.n_legs
    }

    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    pub fn theory(&self) -> Theory {
        self.theory
    }

    pub fn is_massless(&self) -> bool {
        self.theory == Theory::Massless
    }

    pub fn mass(&self) -> f64 {
        match self.theory {
            Theory::Massless => 0.0,
            Theory::Massive { mass } => mass,
        }
    }

    /// Amplitude for the given external momenta.
    ///
    /// If the number of momenta does not match the configured leg count, or
    /// the configuration cannot be evaluated, a warning is logged and zero
    /// is returned. Use [`try_amplitude`](Self::try_amplitude) to get the
    /// error instead.
    pub fn amplitude(&self, momenta: &[RealVector]) -> Complex64 {
        match self.try_amplitude(momenta) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "returning zero amplitude");
                Complex64::zero()
            }
        }
    }

    pub fn try_amplitude(&self, momenta: &[RealVector]) -> Result<Complex64, AmplitudeError> {
        self.amplitude_with_stats(momenta).map(|(value, _)| value)
    }

    /// Amplitude together with the bookkeeping of the recursion.
    pub fn amplitude_with_stats(
        &self,
        momenta: &[RealVector],
    ) -> Result<(Complex64, EvaluationStats), AmplitudeError> {
        self.validate(momenta)?;

        // The last leg is fixed by momentum conservation.
        let recursion_legs = &momenta[..self.n_legs - 1];
        let mut recursion = Recursion::new(self, recursion_legs);
        let amputated = recursion.amputated_current(LegSet::first_n(recursion_legs.len()));
        let value = amputated * self.coupling.powi(self.n_legs as i32 - 2);

        let stats = recursion.finish();
        debug!(
            n_legs = self.n_legs,
            theory = ?self.theory,
            currents = stats.currents_computed,
            cache_hits = stats.cache_hits,
            splits = stats.splits_visited,
            "evaluated amplitude"
        );
        Ok((value, stats))
    }

    /// Off-shell current of all given legs, propagator included, with one
    /// coupling factor per vertex.
    ///
    /// A single leg gives `1`. Two legs give `vertex() * propagator(p1 + p2)`.
    pub fn off_shell_current(&self, momenta: &[RealVector]) -> Result<Complex64, AmplitudeError> {
        if momenta.len() > MAX_LEG_SET {
            return Err(AmplitudeError::TooManyLegs {
                legs: momenta.len(),
                max: MAX_LEG_SET,
            });
        }
        if momenta.is_empty() {
            return Err(AmplitudeError::NoLegs);
        }
        let mut recursion = Recursion::new(self, momenta);
        let current = recursion.current(LegSet::first_n(momenta.len()));
        recursion.finish();
        Ok(current * self.coupling.powi(momenta.len() as i32 - 1))
    }

    /// The cubic vertex with the coupling factored out: `i`.
    pub fn vertex(&self) -> Complex64 {
        IMAGINARY_UNIT
    }

    /// `i / (p · p)`
    pub fn massless_propagator(&self, momentum: &RealVector) -> Complex64 {
        IMAGINARY_UNIT / momentum.square()
    }

    /// `i / (p · p - m²)` with the configured mass.
    pub fn massive_propagator(&self, momentum: &RealVector) -> Complex64 {
        let mass = self.mass();
        IMAGINARY_UNIT / (momentum.square() - mass * mass)
    }

    /// Propagator of the configured theory.
    pub fn propagator(&self, momentum: &RealVector) -> Complex64 {
        match self.theory {
            Theory::Massless => self.massless_propagator(momentum),
            Theory::Massive { .. } => self.massive_propagator(momentum),
        }
    }

    fn validate(&self, momenta: &[RealVector]) -> Result<(), AmplitudeError> {
        if momenta.len() != self.n_legs {
            return Err(AmplitudeError::LegCountMismatch {
                expected: self.n_legs,
                actual: momenta.len(),
            });
        }
        if self.n_legs < 3 {
            return Err(AmplitudeError::TooFewLegs(self.n_legs));
        }
        if self.n_legs > MAX_LEGS {
            return Err(AmplitudeError::TooManyLegs {
                legs: self.n_legs,
                max: MAX_LEGS,
            });
        }
        Ok(())
    }
}

/// Currents computed during one evaluation, one map per recursion level.
/// Level `l` holds the currents of `l + 2` legs, keyed by leg mask.
#[derive(Debug)]
struct CurrentCache {
    levels: Vec<HashMap<u64, Complex64>>,
}

impl CurrentCache {
    fn new(levels: usize) -> Self {
        Self {
            levels: (0..levels).map(|_| HashMap::new()).collect(),
        }
    }

    fn get(&self, level: usize, legs: LegSet) -> Option<Complex64> {
        self.levels.get(level)?.get(&legs.mask()).copied()
    }

    fn insert(&mut self, level: usize, legs: LegSet, value: Complex64) {
        if let Some(entries) = self.levels.get_mut(level) {
            entries.insert(legs.mask(), value);
        }
    }
}

/// State of one evaluation. Dropping it releases the cache.
struct Recursion<'a> {
    engine: &'a ScalarTreeAmplitude,
    momenta: &'a [RealVector],
    cache: Option<CurrentCache>,
    stats: EvaluationStats,
}

impl<'a> Recursion<'a> {
    fn new(engine: &'a ScalarTreeAmplitude, momenta: &'a [RealVector]) -> Self {
        // Only the massless recursion is memoized.
        let cache = match engine.theory {
            Theory::Massless => Some(CurrentCache::new(momenta.len().saturating_sub(1))),
            Theory::Massive { .. } => None,
        };
        Self {
            engine,
            momenta,
            cache,
            stats: EvaluationStats::default(),
        }
    }

    /// Sum over all splits of `legs` of `vertex * J(first) * J(second)`.
    fn amputated_current(&mut self, legs: LegSet) -> Complex64 {
        let vertex = self.engine.vertex();
        let mut result = Complex64::zero();
        for (first, second) in legs.splits() {
            self.stats.splits_visited += 1;
            result += vertex * self.current(first) * self.current(second);
        }
        result
    }

    fn current(&mut self, legs: LegSet) -> Complex64 {
        let Some(level) = legs.level() else {
            return Complex64::one();
        };

        if let Some(value) = self.cache.as_ref().and_then(|c| c.get(level, legs)) {
            self.stats.cache_hits += 1;
            return value;
        }

        let total = sum(legs.iter().map(|leg| self.momenta[usize::from(leg.0)]));
        let value = self.engine.propagator(&total) * self.amputated_current(legs);
        self.stats.currents_computed += 1;

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(level, legs, value);
        }
        value
    }

    fn finish(self) -> EvaluationStats {
        if let Some(cache) = &self.cache {
            for (level, entries) in cache.levels.iter().enumerate() {
                trace!(level, currents = entries.len(), "current cache level");
            }
        }
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::FourVector;
    use approx::assert_relative_eq;

    fn assert_close(actual: Complex64, expected: Complex64) {
        assert_relative_eq!(actual.re, expected.re, epsilon = 1e-15, max_relative = 1e-9);
        assert_relative_eq!(actual.im, expected.im, epsilon = 1e-15, max_relative = 1e-9);
    }

    fn p1() -> RealVector {
        FourVector::new(1.0, 22.0, 3.0, 44.0)
    }

    fn p2() -> RealVector {
        FourVector::new(11.0, 2.0, 33.0, 4.0)
    }

    fn p3() -> RealVector {
        FourVector::new(-1.0, 22.0, -4.0, 55.0)
    }

    #[test]
    fn test_default_configuration() {
        let engine = ScalarTreeAmplitude::default();
        assert_eq!(engine.n_legs(), 1);
        assert_eq!(engine.coupling(), 1.0);
        assert!(engine.is_massless());
        assert_eq!(
            engine.try_amplitude(&[p1()]),
            Err(AmplitudeError::TooFewLegs(1))
        );
    }

    #[test]
    fn test_constructors() {
        assert_eq!(ScalarTreeAmplitude::with_legs(5), ScalarTreeAmplitude::new(5, 1.0));
        let massive = ScalarTreeAmplitude::with_mass(4, 0.5, 0.0);
        assert!(!massive.is_massless());
        assert_eq!(massive.mass(), 0.0);
        assert_eq!(massive.theory(), Theory::Massive { mass: 0.0 });
    }

    #[test]
    fn test_propagators() {
        let engine = ScalarTreeAmplitude::with_mass(4, 1.0, 3.0);
        let p = FourVector::new(5.0, 1.0, 2.0, 0.0);
        // p² = 25 - 1 - 4 = 20
        assert_close(engine.massless_propagator(&p), Complex64::new(0.0, 1.0 / 20.0));
        assert_close(engine.massive_propagator(&p), Complex64::new(0.0, 1.0 / 11.0));
        assert_close(engine.propagator(&p), engine.massive_propagator(&p));
        assert_eq!(engine.vertex(), Complex64::new(0.0, 1.0));
    }

    #[test]
    fn test_three_legs_is_a_single_vertex() {
        let momenta = [p1(), p2(), -(p1() + p2())];
        let engine = ScalarTreeAmplitude::new(3, 1.0);
        assert_close(engine.amplitude(&momenta), engine.vertex());

        let engine = ScalarTreeAmplitude::new(3, 2.5);
        assert_close(engine.amplitude(&momenta), Complex64::new(0.0, 2.5));
    }

    #[test]
    fn test_two_leg_current_carries_one_propagator() {
        let engine = ScalarTreeAmplitude::new(3, 1.0);
        let current = engine.off_shell_current(&[p1(), p2()]).unwrap();
        let expected = IMAGINARY_UNIT * IMAGINARY_UNIT * engine.massless_propagator(&(p1() + p2()));
        assert_close(engine.vertex() * current, expected);
        assert_close(engine.off_shell_current(&[p1()]).unwrap(), Complex64::one());
    }

    #[test]
    fn test_four_legs_matches_three_channels() {
        let p4 = -(p1() + p2() + p3());
        let momenta = [p1(), p2(), p3(), p4];
        let engine = ScalarTreeAmplitude::new(4, 1.0);
        let analytic = IMAGINARY_UNIT
            * IMAGINARY_UNIT
            * (engine.massless_propagator(&(p1() + p4))
                + engine.massless_propagator(&(p1() + p2()))
                + engine.massless_propagator(&(p1() + p3())));
        assert_close(engine.amplitude(&momenta), analytic);

        let coupled = ScalarTreeAmplitude::new(4, 0.3);
        assert_close(coupled.amplitude(&momenta), analytic * 0.09);
    }

    #[test]
    fn test_leg_count_mismatch_returns_zero() {
        let engine = ScalarTreeAmplitude::new(6, 1.0);
        let momenta = [p1(), p2(), p3(), p1(), p2()];
        assert_eq!(engine.amplitude(&momenta), Complex64::zero());
        assert_eq!(
            engine.try_amplitude(&momenta),
            Err(AmplitudeError::LegCountMismatch {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_massless_cache_reuses_currents() {
        let momenta = [
            p1(),
            p2(),
            p3(),
            FourVector::new(-2.0, 32.0, -5.0, 5.0),
            FourVector::new(8.0, 11.0, 21.0, 7.0),
            -(p1() + p2() + p3()),
        ];
        let (memoized, stats) = ScalarTreeAmplitude::new(6, 1.0)
            .amplitude_with_stats(&momenta)
            .unwrap();
        let (plain, plain_stats) = ScalarTreeAmplitude::with_mass(6, 1.0, 0.0)
            .amplitude_with_stats(&momenta)
            .unwrap();

        assert_close(memoized, plain);
        assert_eq!(plain_stats.cache_hits, 0);
        assert!(stats.cache_hits > 0);
        // Each subset of 2..=4 of the five recursion legs is computed once.
        assert_eq!(stats.currents_computed, 10 + 10 + 5);
        assert!(stats.currents_computed < plain_stats.currents_computed);
    }

    #[test]
    fn test_massive_theory_shifts_poles() {
        let p4 = -(p1() + p2() + p3());
        let momenta = [p1(), p2(), p3(), p4];
        let engine = ScalarTreeAmplitude::with_mass(4, 1.0, 7.0);
        let analytic = IMAGINARY_UNIT
            * IMAGINARY_UNIT
            * (engine.massive_propagator(&(p1() + p4))
                + engine.massive_propagator(&(p1() + p2()))
                + engine.massive_propagator(&(p1() + p3())));
        assert_close(engine.amplitude(&momenta), analytic);
    }
}
