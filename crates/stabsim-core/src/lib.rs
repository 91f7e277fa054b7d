// Copyright 2025 The Stabsim Developers
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

pub mod aligned_bits;
pub mod bit_mat;
pub mod error;
pub mod pauli;
pub mod simd_word;
pub mod sims_rngs;

pub use aligned_bits::{padded_bits, AlignedBits};
pub use bit_mat::BitMat;
pub use error::SimError;
pub use pauli::pauli_string::{mul_into_log_i, slices_commute, PauliString, PauliStringRef};
pub use pauli::sparse::{SparsePauli, SparsePauliString};
pub use pauli::Pauli;
pub use simd_word::{SimdWord, WORD_BITS};

pub use crate::sims_rngs::sim_rng::SimRng;
pub use crate::sims_rngs::{
    ChaCha12Rng, ChaCha20Rng, ChaCha8Rng, Xoshiro256PlusPlus, Xoshiro256StarStar,
};
