//! Bit-level component compositions.
//!
//! Every registered component type owns one [`BitIndex`]. An entity's
//! composition is the set of bits for the component types it currently
//! holds, stored as a fixed array of `u64` words. Filter matching then
//! becomes a handful of word-wise ANDs and compares, which keeps the
//! per-cycle synchronization loop cheap.
//!
//! The width is fixed at [`MAX_COMPONENTS`] bits. Asking for a bit beyond
//! that is a capacity violation and is refused at construction of the
//! [`BitIndex`], never silently wrapped.

use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

/// Number of distinct bits a [`CompositionSet`] can hold.
pub const MAX_COMPONENTS: usize = 256;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = MAX_COMPONENTS / WORD_BITS;

/// Position of one component type inside a [`CompositionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitIndex(u16);

impl BitIndex {
    /// Returns `None` when `index` does not fit in a composition.
    #[must_use]
    pub const fn new(index: usize) -> Option<Self> {
        if index < MAX_COMPONENTS {
            Some(Self(index as u16))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    const fn word(self) -> usize {
        self.0 as usize / WORD_BITS
    }

    #[inline]
    const fn mask(self) -> u64 {
        1u64 << (self.0 as usize % WORD_BITS)
    }
}

impl std::fmt::Display for BitIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of [`BitIndex`] values.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositionSet {
    words: [u64; WORDS],
}

impl CompositionSet {
    /// The empty composition.
    pub const EMPTY: Self = Self { words: [0; WORDS] };

    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Sets `bit`. Returns `true` if it was not already set.
    #[inline]
    pub fn insert(&mut self, bit: BitIndex) -> bool {
        let word = &mut self.words[bit.word()];
        let was_set = *word & bit.mask() != 0;
        *word |= bit.mask();
        !was_set
    }

    /// Clears `bit`. Returns `true` if it was set.
    #[inline]
    pub fn remove(&mut self, bit: BitIndex) -> bool {
        let word = &mut self.words[bit.word()];
        let was_set = *word & bit.mask() != 0;
        *word &= !bit.mask();
        was_set
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, bit: BitIndex) -> bool {
        self.words[bit.word()] & bit.mask() != 0
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut words = [0; WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.words[i] & other.words[i];
        }
        Self { words }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut words = [0; WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.words[i] | other.words[i];
        }
        Self { words }
    }

    /// Every bit of `other` is also in `self`.
    #[inline]
    #[must_use]
    pub fn is_superset(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == *b)
    }

    /// No bit is in both sets.
    #[inline]
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of bits set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = BitIndex> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let offset = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some(BitIndex((word_idx * WORD_BITS + offset) as u16))
            })
        })
    }
}

impl std::fmt::Debug for CompositionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter().map(BitIndex::index)).finish()
    }
}

impl FromIterator<BitIndex> for CompositionSet {
    fn from_iter<I: IntoIterator<Item = BitIndex>>(iter: I) -> Self {
        let mut set = Self::new();
        for bit in iter {
            set.insert(bit);
        }
        set
    }
}

impl BitAnd for CompositionSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(&rhs)
    }
}

impl BitOr for CompositionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(i: usize) -> BitIndex {
        BitIndex::new(i).unwrap()
    }

    #[test]
    fn test_bit_index_capacity() {
        assert!(BitIndex::new(0).is_some());
        assert!(BitIndex::new(MAX_COMPONENTS - 1).is_some());
        assert!(BitIndex::new(MAX_COMPONENTS).is_none());
    }

    #[test]
    fn test_insert_remove_contains() {
        let mut set = CompositionSet::new();
        assert!(set.is_empty());
        assert!(set.insert(bit(3)));
        assert!(!set.insert(bit(3)), "second insert reports no change");
        assert!(set.contains(bit(3)));
        assert!(!set.contains(bit(4)));
        assert!(set.remove(bit(3)));
        assert!(!set.remove(bit(3)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_bits_across_word_boundaries() {
        let set: CompositionSet = [0, 63, 64, 200, 255].into_iter().map(bit).collect();
        assert_eq!(set.len(), 5);
        let bits: Vec<usize> = set.iter().map(BitIndex::index).collect();
        assert_eq!(bits, vec![0, 63, 64, 200, 255]);
    }

    #[test]
    fn test_intersection_and_union() {
        let a: CompositionSet = [1, 2, 70].into_iter().map(bit).collect();
        let b: CompositionSet = [2, 70, 130].into_iter().map(bit).collect();

        let both: CompositionSet = [2, 70].into_iter().map(bit).collect();
        assert_eq!(a.intersection(&b), both);
        assert_eq!(a & b, both);
        assert_eq!((a | b).len(), 4);
    }

    #[test]
    fn test_superset_and_disjoint() {
        let ab: CompositionSet = [0, 1].into_iter().map(bit).collect();
        let a: CompositionSet = [0].into_iter().map(bit).collect();
        let c: CompositionSet = [2].into_iter().map(bit).collect();

        assert!(ab.is_superset(&a));
        assert!(!a.is_superset(&ab));
        assert!(ab.is_superset(&CompositionSet::EMPTY));
        assert!(ab.is_disjoint(&c));
        assert!(!ab.is_disjoint(&a));
    }

    #[test]
    fn test_debug_lists_bits() {
        let set: CompositionSet = [5, 1].into_iter().map(bit).collect();
        assert_eq!(format!("{set:?}"), "{1, 5}");
    }
}
