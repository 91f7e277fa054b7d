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

use crate::gate::Gate;
use crate::tableau::Tableau;
use crate::transposed::TempTransposedTableau;
use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stabsim_core::{PauliString, SimError, SimRng, SparsePauliString};

/// The result of a single projective Z-basis measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasurementResult {
    /// Measured bit: `false` for the +1 eigenstate, `true` for -1.
    pub outcome: bool,
    /// True if the state was already in a Z eigenstate on the target, in
    /// which case no randomness was consumed.
    pub is_deterministic: bool,
}

/// A stabilizer-circuit simulator over the Clifford gate set.
///
/// The simulator stores the *inverse* of the Clifford accumulated so far:
/// the operator taking the current state back to |0...0>. With that
/// representation the Heisenberg image of a Z measurement at the start of
/// time is a single stabilizer row of the stored tableau, so the hot path of
/// measurement is a row scan instead of a column scan. Every gate hook
/// therefore prepends the *inverse* of the requested gate.
///
/// Qubit indices are unbounded: touching a qubit past the current capacity
/// grows the tableau (in 256-qubit steps) with fresh |0> qubits.
///
/// # Examples
/// ```rust
/// use stabsim_qsim::TableauSim;
///
/// let mut sim = TableauSim::new(2);
/// sim.h(0).cx(0, 1);
/// let bits = sim.measure_many(&[0, 1]);
/// assert_eq!(bits[0], bits[1]);
/// ```
#[derive(Clone, Debug)]
pub struct TableauSim<R = ChaCha8Rng>
where
    R: SimRng,
{
    inv_state: Tableau,
    rng: R,
}

impl TableauSim {
    /// A fresh |0...0> state on `num_qubits` qubits, seeded from OS entropy.
    #[must_use]
    pub fn new(num_qubits: usize) -> TableauSim<ChaCha8Rng> {
        TableauSim::with_rng(num_qubits, ChaCha8Rng::from_os_rng())
    }
}

impl<R> TableauSim<R>
where
    R: SimRng,
{
    /// A fresh |0...0> state using a caller-seeded generator.
    pub fn with_rng(num_qubits: usize, rng: R) -> TableauSim<R> {
        TableauSim {
            inv_state: Tableau::identity(num_qubits),
            rng,
        }
    }

    #[must_use]
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.inv_state.num_qubits()
    }

    /// The stored inverse tableau (the Clifford mapping the state to |0..0>).
    #[must_use]
    pub fn inv_state(&self) -> &Tableau {
        &self.inv_state
    }

    /// Grows the state so that qubit `q` is addressable.
    pub fn ensure_capacity_for(&mut self, q: usize) {
        if q < self.inv_state.num_qubits() {
            return;
        }
        let new_size = (q + 1).next_multiple_of(256);
        debug!(
            "growing tableau from {} to {new_size} qubits",
            self.inv_state.num_qubits()
        );
        self.inv_state.expand(new_size);
    }

    // ---- gates ----
    //
    // Each hook prepends the inverse of the named gate; self-inverse gates
    // prepend themselves.

    #[inline]
    pub fn identity(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        self
    }

    pub fn x(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        self.inv_state.prepend_x(q);
        self
    }

    pub fn y(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        self.inv_state.prepend_y(q);
        self
    }

    pub fn z(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        self.inv_state.prepend_z(q);
        self
    }

    /// Hadamard.
    ///
    /// # Pauli Transformation
    /// ```text
    /// X -> Z
    /// Y -> -Y
    /// Z -> X
    /// ```
    pub fn h(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        self.inv_state.prepend_h(q);
        self
    }

    pub fn h_xy(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        self.inv_state.prepend_h_xy(q);
        self
    }

    pub fn h_yz(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        self.inv_state.prepend_h_yz(q);
        self
    }

    /// S gate (square root of Z).
    ///
    /// # Pauli Transformation
    /// ```text
    /// X -> Y
    /// Y -> -X
    /// Z -> Z
    /// ```
    pub fn sz(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_s_dag(q);
        self
    }

    pub fn szdg(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_s(q);
        self
    }

    pub fn sx(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_sqrt_x_dag(q);
        self
    }

    pub fn sxdg(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_sqrt_x(q);
        self
    }

    pub fn sy(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_sqrt_y_dag(q);
        self
    }

    pub fn sydg(&mut self, q: usize) -> &mut Self {
        self.ensure_capacity_for(q);
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_sqrt_y(q);
        self
    }

    /// Controlled-X.
    ///
    /// # Pauli Transformation
    /// ```text
    /// XI -> XX
    /// IX -> IX
    /// ZI -> ZI
    /// IZ -> ZZ
    /// ```
    pub fn cx(&mut self, control: usize, target: usize) -> &mut Self {
        self.ensure_capacity_for(control.max(target));
        self.inv_state.prepend_cx(control, target);
        self
    }

    pub fn cy(&mut self, control: usize, target: usize) -> &mut Self {
        self.ensure_capacity_for(control.max(target));
        self.inv_state.prepend_cy(control, target);
        self
    }

    pub fn cz(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_cz(q1, q2);
        self
    }

    pub fn swap(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_swap(q1, q2);
        self
    }

    pub fn iswap(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_iswap_dag(q1, q2);
        self
    }

    pub fn iswapdg(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        // Note: inverted because we're tracking the inverse tableau.
        self.inv_state.prepend_iswap(q1, q2);
        self
    }

    pub fn xcx(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_xcx(q1, q2);
        self
    }

    pub fn xcy(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_xcy(q1, q2);
        self
    }

    pub fn xcz(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_xcz(q1, q2);
        self
    }

    pub fn ycx(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_ycx(q1, q2);
        self
    }

    pub fn ycy(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_ycy(q1, q2);
        self
    }

    pub fn ycz(&mut self, q1: usize, q2: usize) -> &mut Self {
        self.ensure_capacity_for(q1.max(q2));
        self.inv_state.prepend_ycz(q1, q2);
        self
    }

    // ---- measurement ----

    /// True iff measuring qubit `q` would return a predetermined bit.
    ///
    /// The measurement is deterministic exactly when the Heisenberg image of
    /// Z_q at the start of time has no X part: every x bit of the
    /// z-observable row is zero. Deterministic reads consume no randomness.
    #[must_use]
    pub fn is_deterministic(&self, q: usize) -> bool {
        if q >= self.inv_state.num_qubits() {
            // Untouched qubits are in |0>.
            return true;
        }
        !stabsim_core::simd_word::any_set(self.inv_state.stab(q).xs)
    }

    /// Measures qubit `q` in the Z basis with a fair coin.
    pub fn mz(&mut self, q: usize) -> MeasurementResult {
        self.mz_biased(q, 0.5)
    }

    /// Measures qubit `q`, drawing indeterminate outcomes from
    /// Bernoulli(`bias`). `bias` must lie in [0, 1]; 0 forces outcome 0 and
    /// 1 forces outcome 1 when the measurement is indeterminate.
    pub fn mz_biased(&mut self, q: usize, bias: f64) -> MeasurementResult {
        self.ensure_capacity_for(q);
        let is_deterministic = self.is_deterministic(q);
        let outcome = self.measure_many_biased(&[q], bias)[0];
        MeasurementResult {
            outcome,
            is_deterministic,
        }
    }

    /// Measures every target with a fair coin, in target order.
    pub fn measure_many(&mut self, targets: &[usize]) -> Vec<bool> {
        self.measure_many_biased(targets, 0.5)
    }

    /// Batched measurement: all indeterminate targets are collapsed under a
    /// single transposed view, so the layout rotation cost is paid once;
    /// afterwards every result is a deterministic row-sign read.
    pub fn measure_many_biased(&mut self, targets: &[usize], bias: f64) -> Vec<bool> {
        for &t in targets {
            self.ensure_capacity_for(t);
        }
        self.collapse_many(targets, bias);
        targets
            .iter()
            .map(|&t| self.inv_state.stab(t).sign)
            .collect()
    }

    /// Measures qubit `q` and restores it to |0>.
    pub fn reset(&mut self, q: usize) -> &mut Self {
        if self.mz(q).outcome {
            self.x(q);
        }
        self
    }

    /// Resets every target to |0>.
    pub fn reset_many(&mut self, targets: &[usize]) -> &mut Self {
        let outcomes = self.measure_many(targets);
        for (&t, outcome) in targets.iter().zip(outcomes) {
            if outcome {
                self.x(t);
            }
        }
        self
    }

    fn collapse_many(&mut self, targets: &[usize], bias: f64) {
        let collapse_targets: Vec<usize> = targets
            .iter()
            .copied()
            .filter(|&t| !self.is_deterministic(t))
            .collect();
        if collapse_targets.is_empty() {
            return;
        }
        let mut transposed = TempTransposedTableau::new(&mut self.inv_state);
        for t in collapse_targets {
            collapse_while_transposed(&mut transposed, &mut self.rng, t, bias);
        }
    }

    /// Diagnostic collapse: instead of sampling outcomes, reports the
    /// destabilizer generating each post-measurement coset. Consumes no
    /// randomness. Deterministic targets yield a signed identity.
    pub fn inspected_collapse(&mut self, targets: &[usize]) -> Vec<SparsePauliString> {
        for &t in targets {
            self.ensure_capacity_for(t);
        }
        let mut out = vec![SparsePauliString::default(); targets.len()];
        let mut remaining = Vec::new();
        for (k, &t) in targets.iter().enumerate() {
            if self.is_deterministic(t) {
                out[k].sign = self.inv_state.stab(t).sign;
            } else {
                remaining.push(k);
            }
        }
        if !remaining.is_empty() {
            let mut transposed = TempTransposedTableau::new(&mut self.inv_state);
            for k in remaining {
                out[k] = inspect_while_transposed(&mut transposed, targets[k]);
            }
        }
        out
    }

    /// The current stabilizer generators, for cross-checking against a dense
    /// simulator: the z-observable rows of the forward (un-inverted) tableau.
    #[must_use]
    pub fn stabilizers(&self) -> Vec<PauliString> {
        let forward = self.inv_state.inverse();
        (0..forward.num_qubits())
            .map(|k| forward.stab(k).to_owned())
            .collect()
    }

    /// Dispatches one operation-stream record.
    ///
    /// M records return one bit per target in target order; every other
    /// record returns an empty vector.
    ///
    /// # Errors
    /// `UnsupportedOperation` when the target count does not match the
    /// gate's arity.
    pub fn apply(&mut self, gate: Gate, targets: &[usize]) -> Result<Vec<bool>, SimError> {
        let arity_error = || {
            SimError::UnsupportedOperation(format!(
                "{} expects {} target(s), got {}",
                gate.name(),
                gate.arity(),
                targets.len()
            ))
        };
        match gate {
            Gate::M => return Ok(self.measure_many(targets)),
            Gate::R => {
                self.reset_many(targets);
                return Ok(Vec::new());
            }
            _ => {}
        }
        match gate.arity() {
            1 => {
                let &[q] = targets else {
                    return Err(arity_error());
                };
                match gate {
                    Gate::I => self.identity(q),
                    Gate::X => self.x(q),
                    Gate::Y => self.y(q),
                    Gate::Z => self.z(q),
                    Gate::H => self.h(q),
                    Gate::HXY => self.h_xy(q),
                    Gate::HYZ => self.h_yz(q),
                    Gate::S => self.sz(q),
                    Gate::SDag => self.szdg(q),
                    Gate::SqrtX => self.sx(q),
                    Gate::SqrtXDag => self.sxdg(q),
                    Gate::SqrtY => self.sy(q),
                    Gate::SqrtYDag => self.sydg(q),
                    _ => unreachable!(),
                }
            }
            _ => {
                let &[a, b] = targets else {
                    return Err(arity_error());
                };
                match gate {
                    Gate::Swap => self.swap(a, b),
                    Gate::ISwap => self.iswap(a, b),
                    Gate::ISwapDag => self.iswapdg(a, b),
                    Gate::CX => self.cx(a, b),
                    Gate::CY => self.cy(a, b),
                    Gate::CZ => self.cz(a, b),
                    Gate::XCX => self.xcx(a, b),
                    Gate::XCY => self.xcy(a, b),
                    Gate::XCZ => self.xcz(a, b),
                    Gate::YCX => self.ycx(a, b),
                    Gate::YCY => self.ycy(a, b),
                    Gate::YCZ => self.ycz(a, b),
                    _ => unreachable!(),
                }
            }
        };
        Ok(Vec::new())
    }

    /// Looks up a gate by stream name and dispatches it.
    ///
    /// # Errors
    /// `UnsupportedOperation` for unknown names or arity mismatches.
    pub fn apply_named(&mut self, name: &str, targets: &[usize]) -> Result<Vec<bool>, SimError> {
        let gate = Gate::from_name(name)
            .ok_or_else(|| SimError::UnsupportedOperation(name.to_string()))?;
        self.apply(gate, targets)
    }
}

/// Forces one indeterminate measurement to become deterministic.
///
/// Inside the transposed view: find the first anticommuting column (the
/// pivot), cancel every other anticommuting column into it with no-op CX
/// gates appended at the start of time, rotate the pivot Pauli onto the Z
/// axis, then flip the now-free sign with an appended X if the sampled coin
/// disagrees with it.
fn collapse_while_transposed<R: SimRng>(
    transposed: &mut TempTransposedTableau<'_>,
    rng: &mut R,
    target: usize,
    bias: f64,
) {
    let Some(pivot) = eliminate_anticommuting_columns(transposed, target) else {
        // No anticommuting part. Already collapsed.
        return;
    };
    let sign = transposed.z_sign(target);
    let coin_flip = rng.random_bool(bias);
    if sign != coin_flip {
        transposed.append_x(pivot);
    }
}

/// The inspecting variant: no coin; the pivot column is read back out as the
/// destabilizer of the post-measurement coset.
fn inspect_while_transposed(
    transposed: &mut TempTransposedTableau<'_>,
    target: usize,
) -> SparsePauliString {
    let Some(pivot) = eliminate_anticommuting_columns(transposed, target) else {
        return SparsePauliString {
            sign: transposed.z_sign(target),
            paulis: Vec::new(),
        };
    };
    let sign = transposed.z_sign(target);
    transposed.pivot_destabilizer(pivot, sign).sparse()
}

/// Shared collapse body: returns the pivot, or None if the measurement was
/// deterministic after all (then nothing was modified).
fn eliminate_anticommuting_columns(
    transposed: &mut TempTransposedTableau<'_>,
    target: usize,
) -> Option<usize> {
    let n = transposed.num_qubits();
    let mut pivot = 0;
    while pivot < n && !transposed.z_obs_x_bit(target, pivot) {
        pivot += 1;
    }
    if pivot == n {
        return None;
    }
    trace!("collapsing qubit {target} around pivot {pivot}");

    // Cancel all other anticommuting columns into the pivot.
    for k in pivot + 1..n {
        if transposed.z_obs_x_bit(target, k) {
            transposed.append_cx(pivot, k);
        }
    }

    // Rotate the pivot Pauli (X or Y) onto the Z axis; the observable's
    // image is now a single Z, so the measurement reads off the row sign.
    if transposed.z_obs_z_bit(target, pivot) {
        transposed.append_h_yz(pivot);
    } else {
        transposed.append_h(pivot);
    }
    Some(pivot)
}
