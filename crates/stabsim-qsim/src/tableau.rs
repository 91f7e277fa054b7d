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

use stabsim_core::pauli::pauli_string::mul_into_log_i;
use stabsim_core::{AlignedBits, BitMat, Pauli, PauliString, PauliStringRef, SimRng};

/// A Clifford operator as its action on the 2n Pauli generators.
///
/// Row k of the destabilizer half is the image of X_k; row k of the
/// stabilizer half is the image of Z_k. Each half stores its rows as an
/// x bit plane and a z bit plane, and the four planes are square at the
/// padded size so they can be tile-transposed in place. Signs live in two
/// n-bit vectors alongside the planes.
///
/// Public operations keep the symplectic invariants: stabilizer rows commute
/// pairwise, destabilizer rows commute pairwise, and destabilizer k
/// anticommutes with exactly stabilizer k.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tableau {
    pub(crate) num_qubits: usize,
    pub(crate) x2x: BitMat,
    pub(crate) x2z: BitMat,
    pub(crate) z2x: BitMat,
    pub(crate) z2z: BitMat,
    pub(crate) x_signs: AlignedBits,
    pub(crate) z_signs: AlignedBits,
}

/// Selects a tableau row: the image of X_k (destabilizer) or Z_k (stabilizer).
#[derive(Clone, Copy, PartialEq, Eq)]
enum Row {
    Destab(usize),
    Stab(usize),
}

/// Selects one half of the tableau: all destabilizer or all stabilizer rows.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Half {
    Destab,
    Stab,
}

impl Tableau {
    /// The identity Clifford: X_k -> X_k, Z_k -> Z_k, all signs positive.
    #[must_use]
    pub fn identity(num_qubits: usize) -> Tableau {
        let mut result = Tableau {
            num_qubits,
            x2x: BitMat::square(num_qubits),
            x2z: BitMat::square(num_qubits),
            z2x: BitMat::square(num_qubits),
            z2z: BitMat::square(num_qubits),
            x_signs: AlignedBits::new(num_qubits),
            z_signs: AlignedBits::new(num_qubits),
        };
        for k in 0..num_qubits {
            result.x2x.set_bit(k, k, true);
            result.z2z.set_bit(k, k, true);
        }
        result
    }

    /// Samples a uniformly random Clifford modulo global phase.
    ///
    /// Symplectic elimination: for each k, draw a uniform nonzero Pauli pair
    /// on qubits k..n (the partner is made anticommuting by flipping the
    /// symplectic partner of one of its coordinates, which maps the commuting
    /// half of the draws bijectively onto the anticommuting half), then
    /// reduce the pair to (X_k, Z_k) with self-inverse generators while
    /// prepending those same generators. The finished tableau carries each
    /// (X_k, Z_k) back onto the sampled pair. Signs are then independent
    /// uniform bits.
    pub fn random<R: SimRng>(num_qubits: usize, rng: &mut R) -> Tableau {
        let mut result = Tableau::identity(num_qubits);
        let mut p = PauliString::identity(num_qubits);
        let mut q = PauliString::identity(num_qubits);
        for k in 0..num_qubits {
            sample_anticommuting_pair(&mut p, &mut q, k, rng);
            eliminate_pair(&mut result, &mut p, &mut q, k);
        }
        result.x_signs.randomize(rng);
        result.z_signs.randomize(rng);
        result
    }

    #[must_use]
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The image of X_k, as a view into the tableau's storage.
    #[must_use]
    pub fn destab(&self, k: usize) -> PauliStringRef<'_> {
        assert!(k < self.num_qubits);
        PauliStringRef::new(
            self.x_signs.get(k),
            self.num_qubits,
            self.x2x.row(k),
            self.x2z.row(k),
        )
    }

    /// The image of Z_k, as a view into the tableau's storage.
    #[must_use]
    pub fn stab(&self, k: usize) -> PauliStringRef<'_> {
        assert!(k < self.num_qubits);
        PauliStringRef::new(
            self.z_signs.get(k),
            self.num_qubits,
            self.z2x.row(k),
            self.z2z.row(k),
        )
    }

    fn write_destab(&mut self, k: usize, value: &PauliString) {
        self.x2x.row_mut(k).copy_from_slice(value.x_words());
        self.x2z.row_mut(k).copy_from_slice(value.z_words());
        self.x_signs.set(k, value.sign());
    }

    fn write_stab(&mut self, k: usize, value: &PauliString) {
        self.z2x.row_mut(k).copy_from_slice(value.x_words());
        self.z2z.row_mut(k).copy_from_slice(value.z_words());
        self.z_signs.set(k, value.sign());
    }

    /// Multiplies row `src` into row `dst`, returning the kernel's power of i.
    fn row_mul(&mut self, dst: Row, src: Row) -> u8 {
        match (dst, src) {
            (Row::Destab(d), Row::Stab(s)) => {
                let src_sign = self.z_signs.get(s);
                mul_into_log_i(
                    self.x2x.row_mut(d),
                    self.x2z.row_mut(d),
                    self.z2x.row(s),
                    self.z2z.row(s),
                    src_sign,
                )
            }
            (Row::Stab(d), Row::Destab(s)) => {
                let src_sign = self.x_signs.get(s);
                mul_into_log_i(
                    self.z2x.row_mut(d),
                    self.z2z.row_mut(d),
                    self.x2x.row(s),
                    self.x2z.row(s),
                    src_sign,
                )
            }
            (Row::Destab(d), Row::Destab(s)) => {
                let src_sign = self.x_signs.get(s);
                let (dx, sx) = self.x2x.row_pair_mut(d, s);
                let (dz, sz) = self.x2z.row_pair_mut(d, s);
                mul_into_log_i(dx, dz, sx, sz, src_sign)
            }
            (Row::Stab(d), Row::Stab(s)) => {
                let src_sign = self.z_signs.get(s);
                let (dx, sx) = self.z2x.row_pair_mut(d, s);
                let (dz, sz) = self.z2z.row_pair_mut(d, s);
                mul_into_log_i(dx, dz, sx, sz, src_sign)
            }
        }
    }

    /// Row multiply with a fixed extra power of i, folding the (necessarily
    /// real) total phase into the destination row's sign.
    fn mul_rows_fold_sign(&mut self, dst: Row, src: Row, log_i_offset: u8) {
        let total = self.row_mul(dst, src) + log_i_offset;
        debug_assert_eq!(total & 1, 0, "pauli row product must be real");
        if total & 2 != 0 {
            match dst {
                Row::Destab(k) => self.x_signs.toggle(k),
                Row::Stab(k) => self.z_signs.toggle(k),
            }
        }
    }

    // ---- prepend: the tableau becomes C * G instead of C ----

    /// X: X -> X, Z -> -Z.
    pub fn prepend_x(&mut self, q: usize) {
        self.z_signs.toggle(q);
    }

    /// Y: X -> -X, Z -> -Z.
    pub fn prepend_y(&mut self, q: usize) {
        self.x_signs.toggle(q);
        self.z_signs.toggle(q);
    }

    /// Z: X -> -X, Z -> Z.
    pub fn prepend_z(&mut self, q: usize) {
        self.x_signs.toggle(q);
    }

    /// H: X <-> Z, so the destabilizer and stabilizer rows trade places.
    pub fn prepend_h(&mut self, q: usize) {
        self.x2x.row_mut(q).swap_with_slice(self.z2x.row_mut(q));
        self.x2z.row_mut(q).swap_with_slice(self.z2z.row_mut(q));
        let xs = self.x_signs.get(q);
        let zs = self.z_signs.get(q);
        self.x_signs.set(q, zs);
        self.z_signs.set(q, xs);
    }

    /// H_XY: X <-> Y, Z -> -Z. The X image becomes i * D_q * S_q.
    pub fn prepend_h_xy(&mut self, q: usize) {
        self.mul_rows_fold_sign(Row::Destab(q), Row::Stab(q), 1);
        self.z_signs.toggle(q);
    }

    /// H_YZ: Y <-> Z, X -> -X. The Z image becomes i^3 * S_q * D_q.
    pub fn prepend_h_yz(&mut self, q: usize) {
        self.mul_rows_fold_sign(Row::Stab(q), Row::Destab(q), 3);
        self.x_signs.toggle(q);
    }

    /// SQRT_Z: X -> Y, Z -> Z.
    pub fn prepend_s(&mut self, q: usize) {
        self.mul_rows_fold_sign(Row::Destab(q), Row::Stab(q), 1);
    }

    /// SQRT_Z_DAG: X -> -Y, Z -> Z.
    pub fn prepend_s_dag(&mut self, q: usize) {
        self.mul_rows_fold_sign(Row::Destab(q), Row::Stab(q), 3);
    }

    /// SQRT_X: X -> X, Z -> -Y.
    pub fn prepend_sqrt_x(&mut self, q: usize) {
        self.mul_rows_fold_sign(Row::Stab(q), Row::Destab(q), 1);
    }

    /// SQRT_X_DAG: X -> X, Z -> Y.
    pub fn prepend_sqrt_x_dag(&mut self, q: usize) {
        self.mul_rows_fold_sign(Row::Stab(q), Row::Destab(q), 3);
    }

    /// SQRT_Y: X -> -Z, Z -> X.
    pub fn prepend_sqrt_y(&mut self, q: usize) {
        self.prepend_h(q);
        self.x_signs.toggle(q);
    }

    /// SQRT_Y_DAG: X -> Z, Z -> -X.
    pub fn prepend_sqrt_y_dag(&mut self, q: usize) {
        self.prepend_h(q);
        self.z_signs.toggle(q);
    }

    /// CX: X_c -> X_c X_t, Z_t -> Z_c Z_t.
    pub fn prepend_cx(&mut self, control: usize, target: usize) {
        self.mul_rows_fold_sign(Row::Destab(control), Row::Destab(target), 0);
        self.mul_rows_fold_sign(Row::Stab(target), Row::Stab(control), 0);
    }

    /// CY: X_c -> X_c Y_t, X_t -> Z_c X_t, Z_t -> Z_c Z_t.
    pub fn prepend_cy(&mut self, control: usize, target: usize) {
        let s1 = self.row_mul(Row::Destab(control), Row::Destab(target));
        let s2 = self.row_mul(Row::Destab(control), Row::Stab(target));
        let total = s1 + s2 + 1;
        debug_assert_eq!(total & 1, 0, "pauli row product must be real");
        if total & 2 != 0 {
            self.x_signs.toggle(control);
        }
        self.mul_rows_fold_sign(Row::Destab(target), Row::Stab(control), 0);
        self.mul_rows_fold_sign(Row::Stab(target), Row::Stab(control), 0);
    }

    /// CZ: X_c -> X_c Z_t, X_t -> Z_c X_t.
    pub fn prepend_cz(&mut self, control: usize, target: usize) {
        self.mul_rows_fold_sign(Row::Destab(control), Row::Stab(target), 0);
        self.mul_rows_fold_sign(Row::Destab(target), Row::Stab(control), 0);
    }

    pub fn prepend_swap(&mut self, q1: usize, q2: usize) {
        self.x2x.swap_rows(q1, q2);
        self.x2z.swap_rows(q1, q2);
        self.z2x.swap_rows(q1, q2);
        self.z2z.swap_rows(q1, q2);
        let (a, b) = (self.x_signs.get(q1), self.x_signs.get(q2));
        self.x_signs.set(q1, b);
        self.x_signs.set(q2, a);
        let (a, b) = (self.z_signs.get(q1), self.z_signs.get(q2));
        self.z_signs.set(q1, b);
        self.z_signs.set(q2, a);
    }

    // Composite two-qubit Cliffords, prepended as products of the primitives
    // above (matrix-product order, leftmost factor first).

    pub fn prepend_iswap(&mut self, q1: usize, q2: usize) {
        self.prepend_h(q2);
        self.prepend_cx(q2, q1);
        self.prepend_cx(q1, q2);
        self.prepend_h(q1);
        self.prepend_s(q2);
        self.prepend_s(q1);
    }

    pub fn prepend_iswap_dag(&mut self, q1: usize, q2: usize) {
        self.prepend_s_dag(q1);
        self.prepend_s_dag(q2);
        self.prepend_h(q1);
        self.prepend_cx(q1, q2);
        self.prepend_cx(q2, q1);
        self.prepend_h(q2);
    }

    pub fn prepend_xcx(&mut self, q1: usize, q2: usize) {
        self.prepend_h(q1);
        self.prepend_cx(q1, q2);
        self.prepend_h(q1);
    }

    pub fn prepend_xcy(&mut self, q1: usize, q2: usize) {
        self.prepend_h(q1);
        self.prepend_cy(q1, q2);
        self.prepend_h(q1);
    }

    /// X-controlled Z is CX with the roles of the qubits exchanged.
    pub fn prepend_xcz(&mut self, q1: usize, q2: usize) {
        self.prepend_cx(q2, q1);
    }

    pub fn prepend_ycx(&mut self, q1: usize, q2: usize) {
        self.prepend_xcy(q2, q1);
    }

    pub fn prepend_ycy(&mut self, q1: usize, q2: usize) {
        self.prepend_h_yz(q1);
        self.prepend_cy(q1, q2);
        self.prepend_h_yz(q1);
    }

    pub fn prepend_ycz(&mut self, q1: usize, q2: usize) {
        self.prepend_cy(q2, q1);
    }

    // ---- append: the tableau becomes G * C instead of C ----
    //
    // Every row is conjugated by G's Heisenberg action: a fixed (x, z)
    // rewrite at the named qubit columns plus a scalar sign rule per row.

    pub fn append_x(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (_, zm, signs) = self.half_mut(half);
            for k in 0..zm.num_cols() {
                if zm.bit(k, q) {
                    signs.toggle(k);
                }
            }
        }
    }

    pub fn append_z(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, _, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                if xm.bit(k, q) {
                    signs.toggle(k);
                }
            }
        }
    }

    pub fn append_y(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                if xm.bit(k, q) ^ zm.bit(k, q) {
                    signs.toggle(k);
                }
            }
        }
    }

    pub fn append_h(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let x = xm.bit(k, q);
                let z = zm.bit(k, q);
                if x && z {
                    signs.toggle(k);
                }
                xm.set_bit(k, q, z);
                zm.set_bit(k, q, x);
            }
        }
    }

    pub fn append_h_xy(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let x = xm.bit(k, q);
                let z = zm.bit(k, q);
                if z && !x {
                    signs.toggle(k);
                }
                zm.set_bit(k, q, z ^ x);
            }
        }
    }

    pub fn append_h_yz(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let x = xm.bit(k, q);
                let z = zm.bit(k, q);
                if x && !z {
                    signs.toggle(k);
                }
                xm.set_bit(k, q, x ^ z);
            }
        }
    }

    pub fn append_s(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let x = xm.bit(k, q);
                let z = zm.bit(k, q);
                if x && z {
                    signs.toggle(k);
                }
                zm.set_bit(k, q, z ^ x);
            }
        }
    }

    pub fn append_s_dag(&mut self, q: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let x = xm.bit(k, q);
                let z = zm.bit(k, q);
                if x && !z {
                    signs.toggle(k);
                }
                zm.set_bit(k, q, z ^ x);
            }
        }
    }

    pub fn append_cx(&mut self, control: usize, target: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let cx = xm.bit(k, control);
                let cz = zm.bit(k, control);
                let tx = xm.bit(k, target);
                let tz = zm.bit(k, target);
                if cx && tz && !(tx ^ cz) {
                    signs.toggle(k);
                }
                xm.set_bit(k, target, tx ^ cx);
                zm.set_bit(k, control, cz ^ tz);
            }
        }
    }

    pub fn append_cz(&mut self, control: usize, target: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, signs) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let cx = xm.bit(k, control);
                let cz = zm.bit(k, control);
                let tx = xm.bit(k, target);
                let tz = zm.bit(k, target);
                if cx && tx && (cz ^ tz) {
                    signs.toggle(k);
                }
                zm.set_bit(k, target, tz ^ cx);
                zm.set_bit(k, control, cz ^ tx);
            }
        }
    }

    pub fn append_swap(&mut self, q1: usize, q2: usize) {
        for half in [Half::Destab, Half::Stab] {
            let (xm, zm, _) = self.half_mut(half);
            for k in 0..xm.num_cols() {
                let (a, b) = (xm.bit(k, q1), xm.bit(k, q2));
                xm.set_bit(k, q1, b);
                xm.set_bit(k, q2, a);
                let (a, b) = (zm.bit(k, q1), zm.bit(k, q2));
                zm.set_bit(k, q1, b);
                zm.set_bit(k, q2, a);
            }
        }
    }

    /// Evaluates the image of a Pauli string supported on `scattered_indices`.
    ///
    /// The image is the signed product of destabilizer/stabilizer rows
    /// selected by the string's bits, with the Y-count phase correction
    /// (Y = i X Z) tracked exactly through the raw multiply kernel.
    #[must_use]
    pub fn scatter_eval(
        &self,
        gathered: PauliStringRef<'_>,
        scattered_indices: &[usize],
    ) -> PauliString {
        assert_eq!(gathered.num_qubits, scattered_indices.len());
        let mut result = PauliString::identity(self.num_qubits);
        let mut log_i: u32 = 0;
        for (k, &q) in scattered_indices.iter().enumerate() {
            let x = gathered.x_bit(k);
            let z = gathered.z_bit(k);
            if x && z {
                log_i += 1;
            }
            if x {
                log_i += u32::from(result.mul_with_log_i(self.destab(q)));
            }
            if z {
                log_i += u32::from(result.mul_with_log_i(self.stab(q)));
            }
        }
        debug_assert_eq!(log_i & 1, 0, "pauli image phase must be real");
        result.set_sign((log_i & 2 != 0) ^ gathered.sign);
        result
    }

    /// The image of a full-width Pauli string under this Clifford.
    #[must_use]
    pub fn eval(&self, p: PauliStringRef<'_>) -> PauliString {
        assert_eq!(p.num_qubits, self.num_qubits);
        let indices: Vec<usize> = (0..self.num_qubits).collect();
        self.scatter_eval(p, &indices)
    }

    /// Composition: the Clifford `self` followed by `second`.
    #[must_use]
    pub fn then(&self, second: &Tableau) -> Tableau {
        assert_eq!(self.num_qubits, second.num_qubits);
        let mut result = Tableau::identity(self.num_qubits);
        for k in 0..self.num_qubits {
            let d = second.eval(self.destab(k));
            let s = second.eval(self.stab(k));
            result.write_destab(k, &d);
            result.write_stab(k, &s);
        }
        result
    }

    /// The inverse Clifford.
    ///
    /// The symplectic inverse of the bit planes swaps the destabilizer and
    /// stabilizer blocks and the x and z planes while transposing each
    /// quadrant; signs are then recomputed so every generator maps back to
    /// itself exactly.
    #[must_use]
    pub fn inverse(&self) -> Tableau {
        let n = self.num_qubits;
        let mut result = Tableau {
            num_qubits: n,
            x2x: self.z2z.clone(),
            x2z: self.x2z.clone(),
            z2x: self.z2x.clone(),
            z2z: self.x2x.clone(),
            x_signs: AlignedBits::new(n),
            z_signs: AlignedBits::new(n),
        };
        result.x2x.transpose();
        result.x2z.transpose();
        result.z2x.transpose();
        result.z2z.transpose();
        for k in 0..n {
            let img = self.eval(result.destab(k));
            result.x_signs.set(k, img.sign());
            let img = self.eval(result.stab(k));
            result.z_signs.set(k, img.sign());
        }
        result
    }

    /// Composes with a small tableau acting on the named qubit subset.
    pub fn inplace_scatter_prepend(&mut self, operation: &Tableau, targets: &[usize]) {
        assert_eq!(operation.num_qubits, targets.len());
        let new_destabs: Vec<PauliString> = (0..operation.num_qubits)
            .map(|k| self.scatter_eval(operation.destab(k), targets))
            .collect();
        let new_stabs: Vec<PauliString> = (0..operation.num_qubits)
            .map(|k| self.scatter_eval(operation.stab(k), targets))
            .collect();
        for (k, &q) in targets.iter().enumerate() {
            self.write_destab(q, &new_destabs[k]);
            self.write_stab(q, &new_stabs[k]);
        }
    }

    /// Grows the tableau to `new_num_qubits`, identity on the new qubits.
    pub fn expand(&mut self, new_num_qubits: usize) {
        assert!(new_num_qubits >= self.num_qubits);
        if new_num_qubits == self.num_qubits {
            return;
        }
        let old = std::mem::replace(self, Tableau::identity(new_num_qubits));
        let w = old.x2x.row_words();
        for k in 0..old.num_qubits {
            self.x2x.row_mut(k)[..w].copy_from_slice(old.x2x.row(k));
            self.x2z.row_mut(k)[..w].copy_from_slice(old.x2z.row(k));
            self.z2x.row_mut(k)[..w].copy_from_slice(old.z2x.row(k));
            self.z2z.row_mut(k)[..w].copy_from_slice(old.z2z.row(k));
        }
        let sw = old.x_signs.num_words();
        self.x_signs.words_mut()[..sw].copy_from_slice(old.x_signs.words());
        self.z_signs.words_mut()[..sw].copy_from_slice(old.z_signs.words());
    }

    /// Checks the symplectic commutation relations and the padding invariant.
    #[must_use]
    pub fn satisfies_invariants(&self) -> bool {
        let n = self.num_qubits;
        for i in 0..n {
            for j in 0..n {
                if !self.destab(i).commutes(self.destab(j)) {
                    return false;
                }
                if !self.stab(i).commutes(self.stab(j)) {
                    return false;
                }
                if self.destab(i).commutes(self.stab(j)) != (i != j) {
                    return false;
                }
            }
        }
        self.padding_is_zero()
    }

    fn padding_is_zero(&self) -> bool {
        let n = self.num_qubits;
        for mat in [&self.x2x, &self.x2z, &self.z2x, &self.z2z] {
            let padded = mat.num_rows();
            for r in 0..padded {
                let live_cols = if r < n { n } else { 0 };
                for c in live_cols..padded {
                    if mat.bit(r, c) {
                        return false;
                    }
                }
            }
        }
        self.x_signs.padding_is_zero() && self.z_signs.padding_is_zero()
    }

    pub(crate) fn half_mut(&mut self, half: Half) -> (&mut BitMat, &mut BitMat, &mut AlignedBits) {
        match half {
            Half::Destab => (&mut self.x2x, &mut self.x2z, &mut self.x_signs),
            Half::Stab => (&mut self.z2x, &mut self.z2z, &mut self.z_signs),
        }
    }
}

fn sample_anticommuting_pair<R: SimRng>(
    p: &mut PauliString,
    q: &mut PauliString,
    k: usize,
    rng: &mut R,
) {
    use rand::Rng;
    let n = p.num_qubits();
    if k > 0 {
        // The previous round left p = X_{k-1} and q = Z_{k-1}.
        p.set_x_bit(k - 1, false);
        p.set_z_bit(k - 1, false);
        q.set_x_bit(k - 1, false);
        q.set_z_bit(k - 1, false);
    }
    loop {
        let mut any = false;
        for j in k..n {
            let x: bool = rng.random();
            let z: bool = rng.random();
            p.set_x_bit(j, x);
            p.set_z_bit(j, z);
            any |= x | z;
        }
        if any {
            break;
        }
    }
    for j in k..n {
        q.set_x_bit(j, rng.random());
        q.set_z_bit(j, rng.random());
    }
    if p.commutes(q.view()) {
        let pivot = (k..n)
            .find(|&j| p.pauli(j) != Pauli::I)
            .expect("sampled pauli string is non-identity");
        if p.x_bit(pivot) {
            q.toggle_z_bit(pivot);
        } else {
            q.toggle_x_bit(pivot);
        }
    }
}

/// One self-inverse generator used by the random-tableau elimination.
enum Generator {
    H(usize),
    HXy(usize),
    HYz(usize),
    Cx(usize, usize),
    Swap(usize, usize),
}

/// Conjugates the working pair by `g` while prepending `g` to the tableau.
fn conj_pair(t: &mut Tableau, p: &mut PauliString, q: &mut PauliString, g: &Generator) {
    match *g {
        Generator::H(a) => {
            t.prepend_h(a);
            p.unsigned_conjugate_by_h(a);
            q.unsigned_conjugate_by_h(a);
        }
        Generator::HXy(a) => {
            t.prepend_h_xy(a);
            p.unsigned_conjugate_by_h_xy(a);
            q.unsigned_conjugate_by_h_xy(a);
        }
        Generator::HYz(a) => {
            t.prepend_h_yz(a);
            p.unsigned_conjugate_by_h_yz(a);
            q.unsigned_conjugate_by_h_yz(a);
        }
        Generator::Cx(a, b) => {
            t.prepend_cx(a, b);
            p.unsigned_conjugate_by_cx(a, b);
            q.unsigned_conjugate_by_cx(a, b);
        }
        Generator::Swap(a, b) => {
            t.prepend_swap(a, b);
            p.unsigned_conjugate_by_swap(a, b);
            q.unsigned_conjugate_by_swap(a, b);
        }
    }
}

/// Reduces the sampled anticommuting pair to (X_k, Z_k) modulo sign.
fn eliminate_pair(t: &mut Tableau, p: &mut PauliString, q: &mut PauliString, k: usize) {
    let n = t.num_qubits();
    // Rotate every non-identity term of p onto the X axis.
    for j in k..n {
        if p.z_bit(j) {
            if p.x_bit(j) {
                conj_pair(t, p, q, &Generator::HXy(j));
            } else {
                conj_pair(t, p, q, &Generator::H(j));
            }
        }
    }
    // Fold the X support onto one pivot and move it to qubit k.
    let pivot = (k..n)
        .find(|&j| p.x_bit(j))
        .expect("sampled pauli string is non-identity");
    for j in pivot + 1..n {
        if p.x_bit(j) {
            conj_pair(t, p, q, &Generator::Cx(pivot, j));
        }
    }
    if pivot != k {
        conj_pair(t, p, q, &Generator::Swap(k, pivot));
    }
    // q anticommutes with X_k, so it carries a Z part at k. Clear its X part
    // there, rotate its tail onto the Z axis, and cancel the tail into Z_k.
    if q.x_bit(k) {
        conj_pair(t, p, q, &Generator::HYz(k));
    }
    for j in k + 1..n {
        if q.x_bit(j) {
            if q.z_bit(j) {
                conj_pair(t, p, q, &Generator::HYz(j));
            } else {
                conj_pair(t, p, q, &Generator::H(j));
            }
        }
    }
    for j in k + 1..n {
        if q.z_bit(j) {
            conj_pair(t, p, q, &Generator::Cx(j, k));
        }
    }
    debug_assert!((k..n).all(|j| (p.pauli(j) == Pauli::I) == (j != k)));
    debug_assert_eq!(p.pauli(k), Pauli::X);
    debug_assert_eq!(q.pauli(k), Pauli::Z);
}
