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

use crate::tableau::{Half, Tableau};
use stabsim_core::PauliStringRef;

/// Scoped transposed layout of a tableau's bit planes.
///
/// While the guard is alive the qubit-index axis is contiguous, so the
/// column operations the measurement engine needs run one 256-bit word at a
/// time instead of one bit per row. The guard holds the tableau exclusively;
/// dropping it (on any exit path, including unwinding) rotates the planes
/// back to row-major, so row-major methods never observe the tile layout.
///
/// Only the operations required during collapse are available here: bit
/// reads, sign reads, and appending CX / H / H_YZ / X on a pivot qubit.
pub struct TempTransposedTableau<'a> {
    tableau: &'a mut Tableau,
}

impl<'a> TempTransposedTableau<'a> {
    pub fn new(tableau: &'a mut Tableau) -> TempTransposedTableau<'a> {
        transpose_planes(tableau);
        TempTransposedTableau { tableau }
    }

    #[must_use]
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.tableau.num_qubits
    }

    /// X bit at column `k` of the z-observable row for qubit `q`.
    #[must_use]
    #[inline]
    pub fn z_obs_x_bit(&self, q: usize, k: usize) -> bool {
        self.tableau.z2x.bit(k, q)
    }

    /// Z bit at column `k` of the z-observable row for qubit `q`.
    #[must_use]
    #[inline]
    pub fn z_obs_z_bit(&self, q: usize, k: usize) -> bool {
        self.tableau.z2z.bit(k, q)
    }

    /// Sign of the z-observable row for qubit `q`.
    #[must_use]
    #[inline]
    pub fn z_sign(&self, q: usize) -> bool {
        self.tableau.z_signs.get(q)
    }

    /// Appends CX(control, target), processing whole sign columns at a time.
    pub fn append_cx(&mut self, control: usize, target: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.tableau.half_mut(half);
            {
                let xc = xm.row(control);
                let xt = xm.row(target);
                let zc = zm.row(control);
                let zt = zm.row(target);
                let sw = signs.words_mut();
                for i in 0..xc.len() {
                    sw[i] ^= xc[i] & zt[i] & !(xt[i] ^ zc[i]);
                }
            }
            let (dst, src) = xm.row_pair_mut(target, control);
            for (d, s) in dst.iter_mut().zip(src) {
                *d ^= *s;
            }
            let (dst, src) = zm.row_pair_mut(control, target);
            for (d, s) in dst.iter_mut().zip(src) {
                *d ^= *s;
            }
        }
    }

    /// Appends H(q): swaps the x and z columns, sign flips on Y terms.
    pub fn append_h(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.tableau.half_mut(half);
            {
                let x = xm.row(q);
                let z = zm.row(q);
                let sw = signs.words_mut();
                for i in 0..x.len() {
                    sw[i] ^= x[i] & z[i];
                }
            }
            xm.row_mut(q).swap_with_slice(zm.row_mut(q));
        }
    }

    /// Appends H_YZ(q): x column absorbs z, sign flips on X terms.
    pub fn append_h_yz(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.tableau.half_mut(half);
            {
                let x = xm.row(q);
                let z = zm.row(q);
                let sw = signs.words_mut();
                for i in 0..x.len() {
                    sw[i] ^= z[i].andnot(x[i]);
                }
            }
            let x = xm.row_mut(q);
            let z = zm.row(q);
            for (d, s) in x.iter_mut().zip(z) {
                *d ^= *s;
            }
        }
    }

    /// Appends X(q): sign flips on every row with a Z part at q.
    pub fn append_x(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (_, zm, signs) = self.tableau.half_mut(half);
            let z = zm.row(q);
            let sw = signs.words_mut();
            for i in 0..z.len() {
                sw[i] ^= z[i];
            }
        }
    }

    /// The forward-picture destabilizer of a collapsed measurement: the
    /// transposed layout makes the pivot column of each plane contiguous, and
    /// the symplectic-inverse relation turns those columns into the forward
    /// tableau's destabilizer row.
    #[must_use]
    pub fn pivot_destabilizer(&self, pivot: usize, sign: bool) -> PauliStringRef<'_> {
        PauliStringRef::new(
            sign,
            self.tableau.num_qubits,
            self.tableau.z2z.row(pivot),
            self.tableau.x2z.row(pivot),
        )
    }
}

impl Drop for TempTransposedTableau<'_> {
    fn drop(&mut self) {
        transpose_planes(self.tableau);
    }
}

fn transpose_planes(tableau: &mut Tableau) {
    tableau.x2x.transpose();
    tableau.x2z.transpose();
    tableau.z2x.transpose();
    tableau.z2z.transpose();
}
