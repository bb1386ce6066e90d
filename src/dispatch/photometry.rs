// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indexmap::IndexMap;
use log::debug;

use super::{prerequisites, DispatchError};
use crate::params::{Aperture, PhotometryParams, ValidationError};
use crate::session::{Session, Slot};
use crate::sim::{PhotometryAttrs, Simulator};

#[derive(Debug)]
pub struct PhotometryOutcome {
    /// S/N or exposure time per passband, whichever was solved for.
    pub phot_results: IndexMap<String, f64>,

    pub redleak_fracs: IndexMap<String, f64>,
    pub attrs: PhotometryAttrs,
    pub use_log_source_weights: bool,
}

/// Run aperture photometry against the configured telescope, source and
/// background, and store the photometry object.
pub fn run_photometry<S: Simulator>(
    params: &PhotometryParams,
    session: &mut Session<S>,
    sim: &S,
) -> Result<PhotometryOutcome, DispatchError> {
    debug!("photometry params: {params:?}");
    let use_log_source_weights = session.use_log_source_weights;

    let (photometry, outcome) = {
        let (telescope, source, background) = prerequisites(session, Slot::Photometry)?;

        // An optimal aperture is only defined for point sources; reject
        // before touching the library.
        if matches!(params.aperture, Aperture::Optimal { .. }) && !sim.source_is_point(source)
        {
            return Err(ValidationError::OptimalApertureNeedsPointSource.into());
        }

        let mut photometry = sim.build_photometry(telescope, source, background)?;
        sim.use_aperture(&mut photometry, &params.aperture)?;
        let phot_results =
            sim.calc_snr_or_t(&mut photometry, params.target, params.reddening)?;
        let redleak_fracs = sim.redleak_fracs(source, telescope)?;
        let attrs = sim.photometry_attrs(&photometry, &params.source_weights_passband)?;

        (
            photometry,
            PhotometryOutcome {
                phot_results,
                redleak_fracs,
                attrs,
                use_log_source_weights,
            },
        )
    };

    session.photometry = Some(photometry);
    Ok(outcome)
}
