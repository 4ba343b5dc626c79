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

//! Archetype signatures: immutable bitsets over [`ComponentTypeId`]s.
//!
//! Two archetypes with equal signatures are the same archetype. Signatures
//! are value types — `add`/`remove` return a new signature rather than
//! mutating in place — but their backing `Vec<u64>` is drawn from and
//! returned to [`crate::pool`] so churn from add/remove during archetype
//! graph traversal doesn't show up as allocator pressure.

use std::sync::Arc;

use crate::component::ComponentTypeId;
use crate::pool;

/// Immutable bitset over component type ids. Cloning is a refcount bump, not
/// a copy — the backing word array is shared via `Arc` until an `add` or
/// `remove` needs to diverge from it.
#[derive(Clone)]
pub struct ArchetypeSignature {
    words: Arc<Vec<u64>>,
}

impl ArchetypeSignature {
    /// The empty signature — the archetype with no components.
    pub fn empty() -> Self {
        Self {
            words: Arc::new(Vec::new()),
        }
    }

    pub fn from_ids(ids: &[ComponentTypeId]) -> Self {
        let mut sig = Self::empty();
        for &id in ids {
            sig = sig.add(id);
        }
        sig
    }

    /// Returns a new signature with `id` present, reusing this signature's
    /// words where it already has room.
    pub fn add(&self, id: ComponentTypeId) -> Self {
        let idx = id.as_usize();
        let word_idx = idx / 64;
        if word_idx < self.words.len() && self.has(id) {
            return self.clone();
        }
        let needed = (word_idx + 1).max(self.words.len());
        let mut buf = pool::acquire_words(needed);
        buf[..self.words.len()].copy_from_slice(&self.words);
        buf[word_idx] |= 1u64 << (idx % 64);
        Self {
            words: Arc::new(buf),
        }
    }

    /// Returns a new signature with `id` absent. No-op (returns a clone) if
    /// `id` wasn't present.
    pub fn remove(&self, id: ComponentTypeId) -> Self {
        if !self.has(id) {
            return self.clone();
        }
        let idx = id.as_usize();
        let mut buf = pool::acquire_words(self.words.len());
        buf.copy_from_slice(&self.words);
        buf[idx / 64] &= !(1u64 << (idx % 64));
        Self {
            words: Arc::new(buf),
        }
    }

    pub fn has(&self, id: ComponentTypeId) -> bool {
        let idx = id.as_usize();
        match self.words.get(idx / 64) {
            Some(w) => (w & (1u64 << (idx % 64))) != 0,
            None => false,
        }
    }

    /// Number of component types present.
    pub fn component_count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of component types present in both signatures.
    pub fn intersection_count(&self, other: &Self) -> usize {
        let len = self.words.len().min(other.words.len());
        self.words[..len]
            .iter()
            .zip(&other.words[..len])
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// True if every component type in `other` is also in `self`.
    pub fn is_superset_of(&self, other: &Self) -> bool {
        for (i, &ow) in other.words.iter().enumerate() {
            let sw = self.words.get(i).copied().unwrap_or(0);
            if ow & !sw != 0 {
                return false;
            }
        }
        true
    }

    /// Component type ids present, in ascending id order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.words.iter().enumerate().flat_map(|(word_idx, &w)| {
            (0..64).filter_map(move |bit| {
                if w & (1u64 << bit) != 0 {
                    Some(ComponentTypeId((word_idx * 64 + bit) as u32))
                } else {
                    None
                }
            })
        })
    }

    fn last_nonzero_word(&self) -> usize {
        self.words
            .iter()
            .rposition(|&w| w != 0)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Bit-count of the trimmed backing array — `word_count() * 64`. Used by
    /// the snapshot format, which stores signatures as a bit-count followed
    /// by that many words rather than relying on this type's internal
    /// pooled-capacity layout.
    pub fn bit_count(&self) -> usize {
        self.last_nonzero_word() * 64
    }

    /// Trimmed little-endian words backing this signature, with trailing
    /// all-zero words dropped (mirrors `Eq`/`Hash`, which ignore them too).
    pub fn words(&self) -> &[u64] {
        &self.words[..self.last_nonzero_word()]
    }

    /// Reconstruct a signature from the exact words a snapshot stored.
    pub fn from_words(words: &[u64]) -> Self {
        Self {
            words: Arc::new(words.to_vec()),
        }
    }
}

impl PartialEq for ArchetypeSignature {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.words, &other.words) {
            return true;
        }
        let a = self.last_nonzero_word();
        let b = other.last_nonzero_word();
        if a != b {
            return false;
        }
        self.words[..a] == other.words[..a]
    }
}

impl Eq for ArchetypeSignature {}

impl std::hash::Hash for ArchetypeSignature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let end = self.last_nonzero_word();
        for w in &self.words[..end] {
            w.hash(state);
        }
    }
}

impl std::fmt::Debug for ArchetypeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.ids().map(|id| id.0)).finish()
    }
}

impl Drop for ArchetypeSignature {
    fn drop(&mut self) {
        let words = std::mem::replace(&mut self.words, Arc::new(Vec::new()));
        // Only recycles the backing array once this was genuinely the last
        // signature pointing at it — `try_unwrap` fails (and we just drop)
        // if any clone is still alive.
        if let Ok(vec) = Arc::try_unwrap(words) {
            pool::release_words(vec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> ComponentTypeId {
        ComponentTypeId(n)
    }

    #[test]
    fn add_then_has() {
        let sig = ArchetypeSignature::empty().add(id(3));
        assert!(sig.has(id(3)));
        assert!(!sig.has(id(4)));
        assert_eq!(sig.component_count(), 1);
    }

    #[test]
    fn remove_clears_bit() {
        let sig = ArchetypeSignature::empty().add(id(3)).add(id(70));
        let sig2 = sig.remove(id(3));
        assert!(!sig2.has(id(3)));
        assert!(sig2.has(id(70)));
        assert_eq!(sig.component_count(), 2);
    }

    #[test]
    fn equality_ignores_backing_length() {
        let a = ArchetypeSignature::empty().add(id(1));
        let b = ArchetypeSignature::empty().add(id(1)).add(id(70)).remove(id(70));
        assert_eq!(a, b);
    }

    #[test]
    fn superset_and_intersection() {
        let a = ArchetypeSignature::empty().add(id(1)).add(id(2));
        let b = ArchetypeSignature::empty().add(id(2));
        assert!(a.is_superset_of(&b));
        assert!(!b.is_superset_of(&a));
        assert_eq!(a.intersection_count(&b), 1);
    }

    #[test]
    fn from_ids_is_order_independent() {
        let a = ArchetypeSignature::from_ids(&[id(1), id(2), id(3)]);
        let b = ArchetypeSignature::from_ids(&[id(3), id(2), id(1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn ids_iterates_ascending() {
        let sig = ArchetypeSignature::empty().add(id(70)).add(id(3)).add(id(1));
        let collected: Vec<u32> = sig.ids().map(|i| i.0).collect();
        assert_eq!(collected, vec![1, 3, 70]);
    }

    #[test]
    fn bit_count_and_words_round_trip_through_from_words() {
        let sig = ArchetypeSignature::empty().add(id(1)).add(id(70));
        assert_eq!(sig.bit_count(), sig.words().len() * 64);

        let rebuilt = ArchetypeSignature::from_words(sig.words());
        assert_eq!(sig, rebuilt);
    }
}
