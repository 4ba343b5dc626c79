// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bitset backed by a `Vec<u64>`. Minimal allocations, direct bitwise ops.
//! Used by [`crate::signature::ArchetypeSignature`] to represent which
//! component types an archetype carries.

#[derive(Debug, Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    /// Create a new BitSet capable of holding at least `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(64).max(1);
        Self {
            words: vec![0; num_words],
        }
    }

    /// Set the bit at `index` to true. Resizes automatically if out of bounds.
    pub fn set(&mut self, index: usize) {
        let (word_idx, bit_idx) = (index / 64, index % 64);
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        self.words[word_idx] |= 1u64 << bit_idx;
    }

    /// Clear the bit at `index`. No-op if already clear or out of bounds.
    pub fn unset(&mut self, index: usize) {
        let (word_idx, bit_idx) = (index / 64, index % 64);
        if word_idx < self.words.len() {
            self.words[word_idx] &= !(1u64 << bit_idx);
        }
    }

    /// Clear every bit without shrinking backing storage.
    pub fn clear(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    /// Check if the bit at `index` is set.
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = (index / 64, index % 64);
        match self.words.get(word_idx) {
            Some(w) => (w & (1u64 << bit_idx)) != 0,
            None => false,
        }
    }

    /// True if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if this set shares any set bits with `other`.
    pub fn intersects(&self, other: &Self) -> bool {
        let len = std::cmp::min(self.words.len(), other.words.len());
        self.words[..len]
            .iter()
            .zip(&other.words[..len])
            .any(|(a, b)| (a & b) != 0)
    }

    /// Number of bits set in both `self` and `other`.
    pub fn intersection_count(&self, other: &Self) -> usize {
        let len = std::cmp::min(self.words.len(), other.words.len());
        self.words[..len]
            .iter()
            .zip(&other.words[..len])
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// True if every bit set in `other` is also set in `self`.
    pub fn is_superset_of(&self, other: &Self) -> bool {
        for (i, &ow) in other.words.iter().enumerate() {
            let sw = self.words.get(i).copied().unwrap_or(0);
            if ow & !sw != 0 {
                return false;
            }
        }
        true
    }

    /// Returns iterator over indices of set bits, ascending.
    pub fn ones(&self) -> OnesIter<'_> {
        OnesIter {
            bitset: self,
            word_idx: 0,
            current_word: if self.words.is_empty() {
                0
            } else {
                self.words[0]
            },
        }
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        let len = std::cmp::max(self.words.len(), other.words.len());
        (0..len).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for BitSet {}

impl std::hash::Hash for BitSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Trim trailing zero words so equal bitsets of different backing
        // lengths (e.g. one grown then cleared) hash identically.
        let mut last_nonzero = 0;
        for (i, &w) in self.words.iter().enumerate() {
            if w != 0 {
                last_nonzero = i + 1;
            }
        }
        for w in &self.words[..last_nonzero] {
            w.hash(state);
        }
    }
}

pub struct OnesIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl<'a> Iterator for OnesIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let trailing = self.current_word.trailing_zeros();
                self.current_word &= self.current_word - 1; // clear lowest set bit
                return Some(self.word_idx * 64 + trailing as usize);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_contains() {
        let mut bs = BitSet::with_capacity(10);
        bs.set(3);
        bs.set(65);
        assert!(bs.contains(3));
        assert!(bs.contains(65));
        assert!(!bs.contains(4));
    }

    #[test]
    fn unset_clears_bit() {
        let mut bs = BitSet::with_capacity(10);
        bs.set(3);
        bs.unset(3);
        assert!(!bs.contains(3));
    }

    #[test]
    fn intersection_and_superset() {
        let mut a = BitSet::with_capacity(10);
        a.set(1);
        a.set(2);
        let mut b = BitSet::with_capacity(10);
        b.set(2);
        assert_eq!(a.intersection_count(&b), 1);
        assert!(a.is_superset_of(&b));
        assert!(!b.is_superset_of(&a));
    }

    #[test]
    fn equality_ignores_trailing_zero_words() {
        let mut a = BitSet::with_capacity(10);
        a.set(1);
        let mut b = BitSet::with_capacity(200);
        b.set(1);
        assert_eq!(a, b);
    }

    #[test]
    fn ones_iterates_ascending() {
        let mut bs = BitSet::with_capacity(130);
        bs.set(5);
        bs.set(64);
        bs.set(129);
        let collected: Vec<usize> = bs.ones().collect();
        assert_eq!(collected, vec![5, 64, 129]);
    }
}
