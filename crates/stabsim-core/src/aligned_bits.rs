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

use crate::simd_word::{self, SimdWord, WORD_BITS, WORD_LANES};
use rand::RngCore;

/// Rounds a bit count up to a whole number of [`SimdWord`]s worth of bits.
#[must_use]
#[inline]
pub fn padded_bits(num_bits: usize) -> usize {
    num_bits.next_multiple_of(WORD_BITS)
}

/// A heap-allocated bit vector padded to a multiple of 256 bits.
///
/// Invariant: every bit at index `>= num_bits` is zero. All mutating methods
/// preserve this, so word-granularity operations (XOR, popcount, equality)
/// never see garbage in the padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignedBits {
    num_bits: usize,
    words: Vec<SimdWord>,
}

impl AlignedBits {
    /// A zeroed bit vector holding `num_bits` bits.
    #[must_use]
    pub fn new(num_bits: usize) -> AlignedBits {
        AlignedBits {
            num_bits,
            words: vec![SimdWord::ZERO; padded_bits(num_bits) / WORD_BITS],
        }
    }

    #[must_use]
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    #[must_use]
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    #[inline]
    pub fn get(&self, k: usize) -> bool {
        debug_assert!(k < self.num_bits);
        simd_word::get_bit(&self.words, k)
    }

    #[inline]
    pub fn set(&mut self, k: usize, value: bool) {
        debug_assert!(k < self.num_bits);
        simd_word::set_bit(&mut self.words, k, value);
    }

    #[inline]
    pub fn toggle(&mut self, k: usize) {
        debug_assert!(k < self.num_bits);
        simd_word::toggle_bit(&mut self.words, k);
    }

    #[inline]
    pub fn toggle_if(&mut self, k: usize, condition: bool) {
        if condition {
            self.toggle(k);
        }
    }

    #[must_use]
    #[inline]
    pub fn words(&self) -> &[SimdWord] {
        &self.words
    }

    #[must_use]
    #[inline]
    pub fn words_mut(&mut self) -> &mut [SimdWord] {
        &mut self.words
    }

    /// XORs `other` into `self`. Lengths must match.
    pub fn xor_with(&mut self, other: &AlignedBits) {
        assert_eq!(self.num_bits, other.num_bits);
        for (dst, src) in self.words.iter_mut().zip(&other.words) {
            *dst ^= *src;
        }
    }

    #[must_use]
    pub fn popcount(&self) -> usize {
        self.words.iter().map(|w| w.popcount() as usize).sum()
    }

    #[must_use]
    pub fn any_set(&self) -> bool {
        simd_word::any_set(&self.words)
    }

    /// Overwrites the contents with uniform random bits; padding stays zero.
    pub fn randomize<R: RngCore>(&mut self, rng: &mut R) {
        for word in &mut self.words {
            for lane in &mut word.0 {
                *lane = rng.next_u64();
            }
        }
        self.mask_padding();
    }

    fn mask_padding(&mut self) {
        let total_lanes = self.words.len() * WORD_LANES;
        let full_lanes = self.num_bits / 64;
        let rem = self.num_bits % 64;
        if rem != 0 {
            self.words[full_lanes / WORD_LANES].0[full_lanes % WORD_LANES] &= (1 << rem) - 1;
        }
        let first_dead = full_lanes + usize::from(rem != 0);
        for lane in first_dead..total_lanes {
            self.words[lane / WORD_LANES].0[lane % WORD_LANES] = 0;
        }
    }

    /// True iff every padding bit (index `>= num_bits`) is zero.
    #[must_use]
    pub fn padding_is_zero(&self) -> bool {
        let mut probe = self.clone();
        probe.mask_padding();
        probe.words == self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_len_padding() {
        assert_eq!(padded_bits(0), 0);
        assert_eq!(padded_bits(1), 256);
        assert_eq!(padded_bits(256), 256);
        assert_eq!(padded_bits(257), 512);
        let bits = AlignedBits::new(300);
        assert_eq!(bits.num_bits(), 300);
        assert_eq!(bits.num_words(), 2);
    }

    #[test]
    fn test_get_set_toggle() {
        let mut bits = AlignedBits::new(500);
        assert!(!bits.any_set());
        bits.set(0, true);
        bits.set(255, true);
        bits.set(256, true);
        bits.set(499, true);
        assert_eq!(bits.popcount(), 4);
        assert!(bits.get(255) && bits.get(256));
        bits.toggle(255);
        assert!(!bits.get(255));
        bits.toggle_if(255, false);
        assert!(!bits.get(255));
        bits.toggle_if(255, true);
        assert!(bits.get(255));
    }

    #[test]
    fn test_xor_with() {
        let mut a = AlignedBits::new(300);
        let mut b = AlignedBits::new(300);
        a.set(7, true);
        a.set(270, true);
        b.set(7, true);
        b.set(8, true);
        a.xor_with(&b);
        assert!(!a.get(7));
        assert!(a.get(8));
        assert!(a.get(270));
        assert_eq!(a.popcount(), 2);
    }

    #[test]
    fn test_randomize_keeps_padding_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for num_bits in [1, 63, 64, 200, 256, 300, 512] {
            let mut bits = AlignedBits::new(num_bits);
            bits.randomize(&mut rng);
            assert!(bits.padding_is_zero(), "padding dirty at {num_bits}");
        }
    }
}
