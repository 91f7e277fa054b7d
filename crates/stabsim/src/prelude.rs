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

// re-exporting stabsim-core
pub use stabsim_core::{
    ChaCha8Rng, Pauli, PauliString, PauliStringRef, SimError, SimRng, SparsePauli,
    SparsePauliString, Xoshiro256PlusPlus,
};

// re-exporting stabsim-qsim
pub use stabsim_qsim::{Gate, MeasurementResult, Tableau, TableauSim, TempTransposedTableau};
