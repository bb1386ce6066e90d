// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The stage dispatcher: one `run_*` function per pipeline stage.
//!
//! Each function takes validated params, the session and the simulation
//! library, and (1) checks prerequisite slots, (2) constructs the stage
//! object, (3) applies the stage's operations in their fixed order, (4)
//! stores the object in the session only if everything succeeded, and (5)
//! returns an outcome bundle for the encoder. The operation orders are
//! load-bearing (normalization before vs after spectral lines changes the
//! spectrum) and must not be reordered.
//!
//! A failed dispatch leaves the session exactly as it was.

mod background;
mod error;
mod grism;
mod photometry;
mod source;
mod telescope;
mod transit;
mod uvmos;


pub use background::{run_background, BackgroundOutcome};
pub use error::{DependencyError, DispatchError};
pub use grism::{run_grism, GrismOutcome};
pub use photometry::{run_photometry, PhotometryOutcome};
pub use source::{run_source, SourceOutcome};
pub use telescope::{run_telescope, TelescopeOutcome};
pub use transit::{run_transit, LightCurve, TransitOutcome};
pub use uvmos::{run_uvmos, UvmosOutcome};

use crate::session::{Session, Slot};
use crate::sim::Simulator;

/// Borrow the three slots every downstream stage needs, or report which are
/// absent (in pipeline order).
fn prerequisites<S: Simulator>(
    session: &Session<S>,
    dependent: Slot,
) -> Result<(&S::Telescope, &S::Source, &S::Background), DependencyError> {
    match (&session.telescope, &session.source, &session.background) {
        (Some(telescope), Some(source), Some(background)) => {
            Ok((telescope, source, background))
        }
        _ => Err(DependencyError {
            dependent,
            missing: session.missing(&[Slot::Telescope, Slot::Source, Slot::Background]),
        }),
    }
}
