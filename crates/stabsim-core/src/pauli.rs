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

pub mod pauli_string;
pub mod sparse;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-qubit Pauli operator in the (x, z) bit encoding.
///
/// The encoding matches the bit planes of the dense string types:
/// I = (0,0), X = (1,0), Z = (0,1), Y = (1,1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    I,
    X,
    Z,
    Y,
}

impl Pauli {
    #[must_use]
    #[inline]
    pub fn from_xz(x: bool, z: bool) -> Pauli {
        match (x, z) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (false, true) => Pauli::Z,
            (true, true) => Pauli::Y,
        }
    }

    #[must_use]
    #[inline]
    pub fn x_part(self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }

    #[must_use]
    #[inline]
    pub fn z_part(self) -> bool {
        matches!(self, Pauli::Z | Pauli::Y)
    }

    #[must_use]
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Z => 'Z',
            Pauli::Y => 'Y',
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
