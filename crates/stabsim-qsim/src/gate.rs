use serde::{Deserialize, Serialize};

/// The named operations accepted from an operation stream.
///
/// Canonical names follow the table below; `from_name` also accepts the
/// aliases `H_XZ` (= `H`), `SQRT_Z` (= `S`), `SQRT_Z_DAG` (= `S_DAG`) and
/// `CNOT` (= `CX`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    // Special single-qubit records.
    M,
    R,

    // Pauli gates.
    I,
    X,
    Y,
    Z,

    // Axis exchange gates.
    H,
    HXY,
    HYZ,

    // 90 degree rotation gates.
    SqrtX,
    SqrtXDag,
    SqrtY,
    SqrtYDag,
    S,
    SDag,

    // Swap-like gates.
    Swap,
    ISwap,
    ISwapDag,

    // Controlled Paulis.
    CX,
    CY,
    CZ,

    // Controlled interactions in other bases.
    XCX,
    XCY,
    XCZ,
    YCX,
    YCY,
    YCZ,
}

impl Gate {
    /// Looks a gate up by its stream name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Gate> {
        Some(match name {
            "M" => Gate::M,
            "R" => Gate::R,
            "I" => Gate::I,
            "X" => Gate::X,
            "Y" => Gate::Y,
            "Z" => Gate::Z,
            "H" | "H_XZ" => Gate::H,
            "H_XY" => Gate::HXY,
            "H_YZ" => Gate::HYZ,
            "SQRT_X" => Gate::SqrtX,
            "SQRT_X_DAG" => Gate::SqrtXDag,
            "SQRT_Y" => Gate::SqrtY,
            "SQRT_Y_DAG" => Gate::SqrtYDag,
            "S" | "SQRT_Z" => Gate::S,
            "S_DAG" | "SQRT_Z_DAG" => Gate::SDag,
            "SWAP" => Gate::Swap,
            "ISWAP" => Gate::ISwap,
            "ISWAP_DAG" => Gate::ISwapDag,
            "CX" | "CNOT" => Gate::CX,
            "CY" => Gate::CY,
            "CZ" => Gate::CZ,
            "XCX" => Gate::XCX,
            "XCY" => Gate::XCY,
            "XCZ" => Gate::XCZ,
            "YCX" => Gate::YCX,
            "YCY" => Gate::YCY,
            "YCZ" => Gate::YCZ,
            _ => return None,
        })
    }

    /// The canonical stream name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Gate::M => "M",
            Gate::R => "R",
            Gate::I => "I",
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::HXY => "H_XY",
            Gate::HYZ => "H_YZ",
            Gate::SqrtX => "SQRT_X",
            Gate::SqrtXDag => "SQRT_X_DAG",
            Gate::SqrtY => "SQRT_Y",
            Gate::SqrtYDag => "SQRT_Y_DAG",
            Gate::S => "S",
            Gate::SDag => "S_DAG",
            Gate::Swap => "SWAP",
            Gate::ISwap => "ISWAP",
            Gate::ISwapDag => "ISWAP_DAG",
            Gate::CX => "CX",
            Gate::CY => "CY",
            Gate::CZ => "CZ",
            Gate::XCX => "XCX",
            Gate::XCY => "XCY",
            Gate::XCZ => "XCZ",
            Gate::YCX => "YCX",
            Gate::YCY => "YCY",
            Gate::YCZ => "YCZ",
        }
    }

    /// Targets per record: 2 for the two-qubit gates, otherwise 1.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Gate::Swap
            | Gate::ISwap
            | Gate::ISwapDag
            | Gate::CX
            | Gate::CY
            | Gate::CZ
            | Gate::XCX
            | Gate::XCY
            | Gate::XCZ
            | Gate::YCX
            | Gate::YCY
            | Gate::YCZ => 2,
            _ => 1,
        }
    }

    /// The inverse gate. Daggered pairs swap; everything else is its own
    /// inverse (M and R are mapped to themselves for table completeness).
    #[must_use]
    pub fn inverse(self) -> Gate {
        match self {
            Gate::S => Gate::SDag,
            Gate::SDag => Gate::S,
            Gate::SqrtX => Gate::SqrtXDag,
            Gate::SqrtXDag => Gate::SqrtX,
            Gate::SqrtY => Gate::SqrtYDag,
            Gate::SqrtYDag => Gate::SqrtY,
            Gate::ISwap => Gate::ISwapDag,
            Gate::ISwapDag => Gate::ISwap,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Gate; 27] = [
        Gate::M,
        Gate::R,
        Gate::I,
        Gate::X,
        Gate::Y,
        Gate::Z,
        Gate::H,
        Gate::HXY,
        Gate::HYZ,
        Gate::SqrtX,
        Gate::SqrtXDag,
        Gate::SqrtY,
        Gate::SqrtYDag,
        Gate::S,
        Gate::SDag,
        Gate::Swap,
        Gate::ISwap,
        Gate::ISwapDag,
        Gate::CX,
        Gate::CY,
        Gate::CZ,
        Gate::XCX,
        Gate::XCY,
        Gate::XCZ,
        Gate::YCX,
        Gate::YCY,
        Gate::YCZ,
    ];

    #[test]
    fn test_name_round_trip() {
        for gate in ALL {
            assert_eq!(Gate::from_name(gate.name()), Some(gate));
        }
        assert_eq!(Gate::from_name("H_XZ"), Some(Gate::H));
        assert_eq!(Gate::from_name("SQRT_Z"), Some(Gate::S));
        assert_eq!(Gate::from_name("SQRT_Z_DAG"), Some(Gate::SDag));
        assert_eq!(Gate::from_name("CNOT"), Some(Gate::CX));
        assert_eq!(Gate::from_name("T"), None);
    }

    #[test]
    fn test_inverse_is_involution() {
        for gate in ALL {
            assert_eq!(gate.inverse().inverse(), gate);
            assert_eq!(gate.inverse().arity(), gate.arity());
        }
    }
}
