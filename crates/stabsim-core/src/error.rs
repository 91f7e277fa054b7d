use std::error::Error;
use std::fmt;

/// Errors surfaced to callers of the simulator and the text parsers.
///
/// Size mismatches between Pauli-string operands and bad index arrays are
/// programmer errors and assert instead of returning a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A gate name is not in the table, or the target count does not match
    /// its arity.
    UnsupportedOperation(String),
    /// A Pauli text format contained an unrecognized character or token.
    MalformedPauliString(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::UnsupportedOperation(msg) => write!(f, "unsupported operation: {msg}"),
            SimError::MalformedPauliString(msg) => write!(f, "malformed pauli string: {msg}"),
        }
    }
}

impl Error for SimError {}
