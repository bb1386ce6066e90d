// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors that can arise while running a pipeline stage.

use itertools::Itertools;
use thiserror::Error;

use crate::params::ValidationError;
use crate::session::Slot;
use crate::sim::SimulationError;
use crate::units::UnitError;

/// A downstream stage was requested before its prerequisite stages were
/// configured. Caught before any simulation-library call, so this is a
/// client mistake, not a server fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Cannot run the {dependent} stage: the {} stage(s) must be configured first",
    .missing.iter().join(", ")
)]
pub struct DependencyError {
    pub dependent: Slot,
    pub missing: Vec<Slot>,
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Unit(#[from] UnitError),
}
