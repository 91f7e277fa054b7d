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

use crate::error::SimError;
use crate::pauli::pauli_string::PauliString;
use crate::pauli::Pauli;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One non-identity term of a sparse Pauli string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparsePauli {
    pub index: u32,
    pub pauli: Pauli,
}

/// A signed list of non-identity Pauli terms, e.g. `-X0*Y3*Z17`.
///
/// Produced by stringification and by the measurement engine's destabilizer
/// output. Identity qubits are absent; an empty list renders as `+I`/`-I`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparsePauliString {
    pub sign: bool,
    pub paulis: Vec<SparsePauli>,
}

impl SparsePauliString {
    /// Expands into a dense string of `num_qubits` qubits.
    ///
    /// # Panics
    /// Panics if any term's index is out of range.
    #[must_use]
    pub fn to_dense(&self, num_qubits: usize) -> PauliString {
        let mut result = PauliString::identity(num_qubits);
        result.set_sign(self.sign);
        for term in &self.paulis {
            assert!(
                (term.index as usize) < num_qubits,
                "sparse term index {} out of range for {num_qubits} qubits",
                term.index
            );
            result.set_pauli(term.index as usize, term.pauli);
        }
        result
    }
}

impl fmt::Display for SparsePauli {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.pauli, self.index)
    }
}

impl fmt::Display for SparsePauliString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", if self.sign { '-' } else { '+' })?;
        if self.paulis.is_empty() {
            return write!(f, "I");
        }
        for (k, term) in self.paulis.iter().enumerate() {
            if k > 0 {
                write!(f, "*")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl FromStr for SparsePauliString {
    type Err = SimError;

    fn from_str(text: &str) -> Result<SparsePauliString, SimError> {
        let malformed = |detail: &str| SimError::MalformedPauliString(format!("{detail}: {text}"));
        let (sign, body) = match text.as_bytes().first() {
            Some(b'+') => (false, &text[1..]),
            Some(b'-') => (true, &text[1..]),
            _ => (false, text),
        };
        if body == "I" {
            return Ok(SparsePauliString {
                sign,
                paulis: Vec::new(),
            });
        }
        let mut paulis = Vec::new();
        for token in body.split('*') {
            let mut chars = token.chars();
            let pauli = match chars.next() {
                Some('X') => Pauli::X,
                Some('Y') => Pauli::Y,
                Some('Z') => Pauli::Z,
                _ => return Err(malformed("expected pauli token")),
            };
            let index: u32 = chars
                .as_str()
                .parse()
                .map_err(|_| malformed("bad qubit index"))?;
            paulis.push(SparsePauli { index, pauli });
        }
        Ok(SparsePauliString { sign, paulis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let s: SparsePauliString = "-X0*Y3*Z17".parse().unwrap();
        assert!(s.sign);
        assert_eq!(s.paulis.len(), 3);
        assert_eq!(s.to_string(), "-X0*Y3*Z17");

        let id: SparsePauliString = "+I".parse().unwrap();
        assert!(id.paulis.is_empty());
        assert_eq!(id.to_string(), "+I");

        assert!("-X0*Q3".parse::<SparsePauliString>().is_err());
        assert!("+X".parse::<SparsePauliString>().is_err());
    }

    #[test]
    fn test_dense_round_trip() {
        let s: SparsePauliString = "-X0*Y3*Z17".parse().unwrap();
        let dense = s.to_dense(20);
        assert_eq!(dense.sparse().to_string(), "-X0*Y3*Z17");
        assert_eq!(dense.pauli(0), Pauli::X);
        assert_eq!(dense.pauli(3), Pauli::Y);
        assert_eq!(dense.pauli(17), Pauli::Z);
        assert_eq!(dense.pauli(1), Pauli::I);
    }
}
