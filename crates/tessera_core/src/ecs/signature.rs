//! # Signatures
//!
//! Fixed-width bit vectors over component ids.
//!
//! An entity's signature has bit `i` set when it carries component `i`.
//! A system's signature has bit `i` set when it requires component `i`.
//! Matching is a superset test, never equality: extra components on the
//! entity are irrelevant.
//!
//! ## Layout
//!
//! 64 component ids per `u64` word. The width is fixed at construction from
//! the registrar's limit, so all signatures of one registry are comparable
//! word by word.

use std::fmt;

use super::component::ComponentId;

/// Number of bits per storage word.
const WORD_BITS: usize = 64;

/// Fixed-width component bit set.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    /// Bitset: 1 = present/required. 64 component ids per u64.
    words: Vec<u64>,
    /// Width in bits.
    width: usize,
}

impl Signature {
    /// Creates an empty signature of `width` bits.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            words: vec![0u64; width.div_ceil(WORD_BITS)],
            width,
        }
    }

    /// Width in bits.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Sets the bit for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the signature width. The registrar never
    /// issues such ids for signatures built with its limit.
    #[inline]
    pub fn set(&mut self, id: ComponentId) {
        let (word, mask) = self.locate(id);
        self.words[word] |= mask;
    }

    /// Clears the bit for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the signature width.
    #[inline]
    pub fn unset(&mut self, id: ComponentId) {
        let (word, mask) = self.locate(id);
        self.words[word] &= !mask;
    }

    /// Tests the bit for `id`. Ids beyond the width read as unset.
    #[inline]
    #[must_use]
    pub fn test(&self, id: ComponentId) -> bool {
        let index = id.index();
        if index >= self.width {
            return false;
        }
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Clears every bit.
    pub fn reset(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
    }

    /// Whether `self` has at least every bit of `required`:
    /// `(self & required) == required`.
    #[must_use]
    pub fn is_superset_of(&self, required: &Self) -> bool {
        required.words.iter().enumerate().all(|(i, &req)| {
            let have = self.words.get(i).copied().unwrap_or(0);
            have & req == req
        })
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the set component ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ComponentId> + '_ {
        (0..self.width)
            .filter(move |&i| (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1)
            .map(|i| ComponentId::new(i as u32))
    }

    #[inline]
    fn locate(&self, id: ComponentId) -> (usize, u64) {
        let index = id.index();
        assert!(
            index < self.width,
            "component id {index} outside signature width {}",
            self.width
        );
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(ComponentId::index)).finish()
    }
}
