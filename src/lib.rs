// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Session API for an exposure-time-calculator web backend.

A caller progressively configures an instrument-simulation pipeline
(telescope, sky background, astronomical source, then one of aperture
photometry, grism spectroscopy, slit spectroscopy or transit photometry)
through per-stage endpoints; each successful stage is kept in a per-process
session so later stages can depend on it. The physics lives in an external
simulation library behind the [`sim::Simulator`] trait; this crate validates
requests, runs each stage's operations in their fixed order, and projects
the results onto the wire schema.
 */

pub mod constants;
pub mod dispatch;
pub mod encode;
mod error;
pub mod params;
pub mod routes;
pub mod session;
pub mod sim;
pub mod units;
pub mod upload;

#[cfg(test)]
pub(crate) mod tests;

// Re-exports.
pub use dispatch::DispatchError;
pub use error::ApiError;
pub use params::{RequestBody, ValidationError};
pub use routes::ApiResponse;
pub use session::{Session, SharedSession, Slot};
pub use sim::{SimulationError, Simulator};
