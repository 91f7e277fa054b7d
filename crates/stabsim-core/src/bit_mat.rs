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

use crate::aligned_bits::padded_bits;
use crate::simd_word::{self, SimdWord, WORD_BITS, WORD_LANES};

/// A row-major bit matrix whose rows are whole [`SimdWord`]s.
///
/// Row storage is padded to a 256-bit multiple, and the stored row count is
/// padded to the same multiple, so the matrix is square at the padded size.
/// That makes [`BitMat::transpose`] an involution that swaps the roles of the
/// row and column axes in place. Padding rows and padding bits are zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMat {
    num_rows: usize,
    num_cols: usize,
    row_words: usize,
    words: Vec<SimdWord>,
}

impl BitMat {
    /// A zeroed square matrix covering `num_bits` logical rows and columns.
    #[must_use]
    pub fn square(num_bits: usize) -> BitMat {
        let padded = padded_bits(num_bits);
        let row_words = padded / WORD_BITS;
        BitMat {
            num_rows: padded,
            num_cols: num_bits,
            row_words,
            words: vec![SimdWord::ZERO; padded * row_words],
        }
    }

    #[must_use]
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[must_use]
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    #[must_use]
    #[inline]
    pub fn row_words(&self) -> usize {
        self.row_words
    }

    #[must_use]
    #[inline]
    pub fn row(&self, r: usize) -> &[SimdWord] {
        &self.words[r * self.row_words..(r + 1) * self.row_words]
    }

    #[must_use]
    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [SimdWord] {
        &mut self.words[r * self.row_words..(r + 1) * self.row_words]
    }

    /// Simultaneous mutable access to row `dst` and shared access to row `src`.
    ///
    /// # Panics
    /// Panics if `dst == src`.
    #[must_use]
    pub fn row_pair_mut(&mut self, dst: usize, src: usize) -> (&mut [SimdWord], &[SimdWord]) {
        assert_ne!(dst, src);
        let w = self.row_words;
        if dst < src {
            let (lo, hi) = self.words.split_at_mut(src * w);
            (&mut lo[dst * w..(dst + 1) * w], &hi[..w])
        } else {
            let (lo, hi) = self.words.split_at_mut(dst * w);
            (&mut hi[..w], &lo[src * w..(src + 1) * w])
        }
    }

    #[must_use]
    #[inline]
    pub fn bit(&self, r: usize, c: usize) -> bool {
        simd_word::get_bit(self.row(r), c)
    }

    #[inline]
    pub fn set_bit(&mut self, r: usize, c: usize, value: bool) {
        let w = self.row_words;
        simd_word::set_bit(&mut self.words[r * w..(r + 1) * w], c, value);
    }

    /// `row[dst] ^= row[src]`.
    pub fn xor_row_into(&mut self, src: usize, dst: usize) {
        let (dst_row, src_row) = self.row_pair_mut(dst, src);
        for (d, s) in dst_row.iter_mut().zip(src_row) {
            *d ^= *s;
        }
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let w = self.row_words;
        let (lo, hi) = self.words.split_at_mut(a.max(b) * w);
        let low_row = &mut lo[a.min(b) * w..(a.min(b) + 1) * w];
        low_row.swap_with_slice(&mut hi[..w]);
    }

    #[must_use]
    #[inline]
    fn u64_at(&self, r: usize, j: usize) -> u64 {
        self.words[r * self.row_words + j / WORD_LANES].0[j % WORD_LANES]
    }

    #[inline]
    fn set_u64(&mut self, r: usize, j: usize, value: u64) {
        self.words[r * self.row_words + j / WORD_LANES].0[j % WORD_LANES] = value;
    }

    fn load_block(&self, block_row: usize, block_col: usize, out: &mut [u64; 64]) {
        for (r, slot) in out.iter_mut().enumerate() {
            *slot = self.u64_at(block_row * 64 + r, block_col);
        }
    }

    fn store_block(&mut self, block_row: usize, block_col: usize, block: &[u64; 64]) {
        for (r, &value) in block.iter().enumerate() {
            self.set_u64(block_row * 64 + r, block_col, value);
        }
    }

    /// Transposes the matrix in place: bit (r, c) moves to (c, r).
    ///
    /// Works in 64x64 blocks: off-diagonal block pairs are transposed and
    /// swapped, diagonal blocks transposed where they sit. O(n^2/w) word
    /// operations overall.
    pub fn transpose(&mut self) {
        let n64 = self.num_rows / 64;
        debug_assert_eq!(self.num_rows, padded_bits(self.num_cols));
        let mut a = [0u64; 64];
        let mut b = [0u64; 64];
        for bi in 0..n64 {
            self.load_block(bi, bi, &mut a);
            transpose_64x64(&mut a);
            self.store_block(bi, bi, &a);
            for bj in bi + 1..n64 {
                self.load_block(bi, bj, &mut a);
                self.load_block(bj, bi, &mut b);
                transpose_64x64(&mut a);
                transpose_64x64(&mut b);
                self.store_block(bj, bi, &a);
                self.store_block(bi, bj, &b);
            }
        }
    }
}

/// Transposes a 64x64 bit block held as 64 little-endian row words.
///
/// Masked-swap rounds at strides 32, 16, 8, 4, 2, 1: each round exchanges the
/// high half-columns of rows `k` with the low half-columns of rows `k + j`.
fn transpose_64x64(a: &mut [u64; 64]) {
    let mut j = 32;
    let mut m: u64 = 0x0000_0000_FFFF_FFFF;
    while j != 0 {
        for k in 0..64 {
            if k & j == 0 {
                let t = ((a[k] >> j) ^ a[k + j]) & m;
                a[k + j] ^= t;
                a[k] ^= t << j;
            }
        }
        j >>= 1;
        m ^= m << j;
    }
}
