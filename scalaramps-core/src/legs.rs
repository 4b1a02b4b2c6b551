//! Subsets of external legs, identified by a bitmask over the original leg
//! indices.

use std::fmt;

/// Index of an external leg, counted from 0 in the order the momenta are
/// passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegIndex(pub u8);

/// Largest number of legs a [`LegSet`] can address.
pub const MAX_LEG_SET: usize = 64;

/// A set of external legs. Bit `j` is set iff leg `j` belongs to the set.
///
/// The raw mask doubles as the cache key of the off-shell current of the
/// set: two recursion paths that reach the same legs produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LegSet(u64);

impl LegSet {
    pub const EMPTY: LegSet = LegSet(0);

    pub fn from_mask(mask: u64) -> Self {
        Self(mask)
    }

    /// The legs `0..n`.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`MAX_LEG_SET`].
    pub fn first_n(n: usize) -> Self {
        assert!(n <= MAX_LEG_SET, "a leg set holds at most {MAX_LEG_SET} legs");
        if n == MAX_LEG_SET {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    pub fn single(leg: LegIndex) -> Self {
        Self(1u64 << leg.0)
    }

    pub fn mask(self) -> u64 {
        self.0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, leg: LegIndex) -> bool {
        self.0 & (1u64 << leg.0) != 0
    }

    pub fn insert(&mut self, leg: LegIndex) {
        self.0 |= 1u64 << leg.0;
    }

    /// Lowest leg of the set.
    pub fn first(self) -> Option<LegIndex> {
        if self.0 == 0 {
            None
        } else {
            Some(LegIndex(self.0.trailing_zeros() as u8))
        }
    }

    /// Recursion depth of the current over this set: `len - 2`, so the
    /// two-leg currents live on level 0. `None` for single legs.
    pub fn level(self) -> Option<usize> {
        self.len().checked_sub(2)
    }

    /// Legs in ascending order.
    pub fn iter(self) -> impl Iterator<Item = LegIndex> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let leg = rest.trailing_zeros() as u8;
            rest &= rest - 1;
            Some(LegIndex(leg))
        })
    }

    /// All ways to split the set into two non-empty parts with the first
    /// leg pinned to the first part.
    ///
    /// With `k` legs after the pinned one, the split with number `i` in
    /// `0..2^k - 1` sends the `(j+1)`-th leg to the first part iff bit `j`
    /// of `i` is set. The all-ones assignment would leave the second part
    /// empty and is never produced, so a set of `k + 1` legs yields
    /// `2^k - 1` splits.
    pub fn splits(self) -> Splits {
        let mut legs = self.iter();
        let pinned = legs.next().map_or(LegSet::EMPTY, LegSet::single);
        let rest: Vec<LegSet> = legs.map(LegSet::single).collect();
        let count = if pinned.is_empty() {
            0
        } else {
            (1u64 << rest.len()) - 1
        };
        Splits {
            pinned,
            rest,
            next: 0,
            count,
        }
    }
}

impl fmt::Display for LegSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, leg) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", leg.0)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<LegIndex> for LegSet {
    fn from_iter<I: IntoIterator<Item = LegIndex>>(iter: I) -> Self {
        let mut set = LegSet::EMPTY;
        for leg in iter {
            set.insert(leg);
        }
        set
    }
}

/// Iterator over the two-part splits of a [`LegSet`], see [`LegSet::splits`].
#[derive(Debug, Clone)]
pub struct Splits {
    pinned: LegSet,
    rest: Vec<LegSet>,
    next: u64,
    count: u64,
}

impl Iterator for Splits {
    type Item = (LegSet, LegSet);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let i = self.next;
        self.next += 1;

        let mut first = self.pinned;
        let mut second = LegSet::EMPTY;
        for (j, leg) in self.rest.iter().enumerate() {
            if i & (1u64 << j) != 0 {
                first.0 |= leg.0;
            } else {
                second.0 |= leg.0;
            }
        }
        Some((first, second))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.count - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Splits {}
