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

//! Platform SIMD lane width used by [`crate::storage::ColumnStorage`] to
//! split a column into an aligned prefix span and a scalar remainder.

/// Lane count for a 32-bit-float vector register on this platform.
#[cfg(target_arch = "x86_64")]
pub const F32_LANE_COUNT: usize = 8; // AVX2: 256-bit / 32-bit

#[cfg(not(target_arch = "x86_64"))]
pub const F32_LANE_COUNT: usize = 1; // scalar fallback

/// A component type of byte size `size` is SIMD-eligible iff it is a POD
/// made entirely of 32-bit floats (caller asserts the POD part by only
/// calling this for types it knows are plain float structs) and `size` is a
/// multiple of the platform vector width in bytes.
pub fn is_simd_eligible(size: usize) -> bool {
    size > 0 && size % (F32_LANE_COUNT * std::mem::size_of::<f32>()) == 0
}
