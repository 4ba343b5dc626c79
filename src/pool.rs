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

//! Bounded, per-thread scratch pools.
//!
//! Two kinds of recycled buffers used on hot paths:
//! - [`acquire_words`]/[`release_words`]: `Vec<u64>` backing storage for
//!   [`crate::signature::ArchetypeSignature`], bucketed by word count so a
//!   4-component signature doesn't recycle into a 40-component slot.
//! - [`acquire_archetype_ids`]/[`release_archetype_ids`]: `Vec<u32>` used as
//!   scratch while an [`crate::archetype_index::ArchetypeIndex`] query is
//!   being matched, before the result is frozen into the query cache.
//!
//! Every pool is bounded to [`MAX_POOL_SIZE`] entries per thread; a
//! `release` past that bound just drops the buffer instead of growing
//! without limit. Pools are thread-local: no lock is taken on the
//! acquire/release fast path.

use std::cell::RefCell;

/// Maximum number of buffers retained per bucket, per thread.
pub const MAX_POOL_SIZE: usize = 8;

/// Word-count bucket boundaries for signature backing arrays, per spec: small
/// signatures (1-4 words, i.e. up to 256 component types), medium (5-16),
/// large (17+).
fn word_bucket(word_len: usize) -> usize {
    match word_len {
        0..=4 => 0,
        5..=16 => 1,
        _ => 2,
    }
}

struct WordPool {
    buckets: [Vec<Vec<u64>>; 3],
}

impl WordPool {
    fn new() -> Self {
        Self {
            buckets: [Vec::new(), Vec::new(), Vec::new()],
        }
    }
}

thread_local! {
    static WORD_POOL: RefCell<WordPool> = RefCell::new(WordPool::new());
    static ARCHETYPE_ID_POOL: RefCell<Vec<Vec<u64>>> = const { RefCell::new(Vec::new()) };
}

/// Borrow a zeroed `Vec<u64>` with at least `word_len` capacity from the
/// pool, or allocate a fresh one if the bucket is empty.
pub fn acquire_words(word_len: usize) -> Vec<u64> {
    WORD_POOL.with(|pool| {
        let bucket = word_bucket(word_len);
        let mut pool = pool.borrow_mut();
        match pool.buckets[bucket].pop() {
            Some(mut buf) => {
                buf.clear();
                buf.resize(word_len, 0);
                buf
            }
            None => vec![0u64; word_len],
        }
    })
}

/// Return a `Vec<u64>` to its bucket for reuse. Dropped instead of pooled if
/// the bucket is already at [`MAX_POOL_SIZE`] — the signature that owned it
/// must have released its only reference (callers only call this once an
/// `Arc<[u64]>` backing a signature reaches a strong count of 1), so this
/// never reclaims storage another live signature still points at.
pub fn release_words(buf: Vec<u64>) {
    WORD_POOL.with(|pool| {
        let bucket = word_bucket(buf.len());
        let mut pool = pool.borrow_mut();
        if pool.buckets[bucket].len() < MAX_POOL_SIZE {
            pool.buckets[bucket].push(buf);
        }
    })
}

/// Borrow a scratch `Vec<u64>` for collecting matching archetype ids.
pub fn acquire_archetype_ids() -> Vec<u64> {
    ARCHETYPE_ID_POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        pool.pop().map(|mut v| { v.clear(); v }).unwrap_or_default()
    })
}

/// Return a scratch `Vec<u64>` once its contents have been copied out (e.g.
/// into a query cache entry or a `TinyVec` result).
pub fn release_archetype_ids(buf: Vec<u64>) {
    ARCHETYPE_ID_POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        if pool.len() < MAX_POOL_SIZE {
            pool.push(buf);
        }
    })
}
