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

pub mod gate;
pub mod simulator;
pub mod tableau;
pub mod transposed;

pub use gate::Gate;
pub use simulator::{MeasurementResult, TableauSim};
pub use tableau::Tableau;
pub use transposed::TempTransposedTableau;
