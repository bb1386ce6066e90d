// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// An unexpected failure inside the instrument-simulation library. The
/// library is opaque to us; all we can do is carry its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Simulation library error: {0}")]
pub struct SimulationError(pub String);
